//! Availability extraction.
//!
//! Structured data (schema.org JSON-LD) is consulted first. When it is
//! missing or inconclusive the visible page text is matched against an
//! ordered list of phrase rules. Anything ambiguous resolves to
//! [`Availability::Unknown`]: reporting a product as in stock when it is not
//! is worse than missing a notification.

use serde_json::{Map, Value};

use crate::models::{Assessment, Availability, Evidence, PageContent, Polarity};

/// Phrases that mark the product as unavailable on the shop this tool was
/// built for (Polish storefront with English fallbacks).
pub const DEFAULT_OUT_OF_STOCK_PHRASES: &[&str] = &[
    "wyprzedany",
    "wyprzedane",
    "wyprzedana",
    "niedostępny",
    "niedostępne",
    "brak w magazynie",
    "sold out",
    "out of stock",
];

/// Phrases that mark the product as purchasable.
pub const DEFAULT_IN_STOCK_PHRASES: &[&str] = &[
    "dostępny",
    "dostępne",
    "na stanie",
    "in stock",
    "add to cart",
    "do koszyka",
    "kup teraz",
];

const PRODUCT_TYPES: &[&str] = &["product", "productgroup", "productmodel", "individualproduct"];
const OFFER_TYPES: &[&str] = &["offer", "aggregateoffer"];

/// One phrase rule. Phrases are stored normalized (lowercase, single spaces).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordRule {
    pub phrase: String,
    pub polarity: Polarity,
}

impl KeywordRule {
    pub fn new(phrase: &str, polarity: Polarity) -> Self {
        Self {
            phrase: normalize_text(phrase),
            polarity,
        }
    }

    pub fn positive(phrase: &str) -> Self {
        Self::new(phrase, Polarity::Positive)
    }

    pub fn negative(phrase: &str) -> Self {
        Self::new(phrase, Polarity::Negative)
    }
}

/// Turns parsed page content into an [`Assessment`].
#[derive(Debug, Clone)]
pub struct AvailabilityExtractor {
    rules: Vec<KeywordRule>,
}

impl Default for AvailabilityExtractor {
    fn default() -> Self {
        Self::from_phrases(DEFAULT_IN_STOCK_PHRASES, DEFAULT_OUT_OF_STOCK_PHRASES)
    }
}

impl AvailabilityExtractor {
    /// Create an extractor from explicit rules, applied in the given order.
    ///
    /// Rules with an empty phrase are dropped.
    pub fn new(rules: Vec<KeywordRule>) -> Self {
        let rules = rules.into_iter().filter(|r| !r.phrase.is_empty()).collect();
        Self { rules }
    }

    /// Build rules from phrase lists. Negative phrases take priority so that
    /// e.g. "niedostępny" is never read as the positive "dostępny".
    pub fn from_phrases<S: AsRef<str>>(in_stock: &[S], out_of_stock: &[S]) -> Self {
        let rules = out_of_stock
            .iter()
            .map(|p| KeywordRule::negative(p.as_ref()))
            .chain(in_stock.iter().map(|p| KeywordRule::positive(p.as_ref())))
            .collect();
        Self::new(rules)
    }

    pub fn rules(&self) -> &[KeywordRule] {
        &self.rules
    }

    /// Assess a page: structured data first, phrase rules as fallback.
    pub fn assess(&self, page: &PageContent) -> Assessment {
        let scan = scan_structured(&page.json_ld);

        if let Some((availability, value)) = scan.verdict() {
            return Assessment {
                availability,
                evidence: Evidence::StructuredData { value },
                product_name: scan.product_name,
            };
        }

        let (availability, evidence) = self.match_phrases(&page.visible_text);
        Assessment {
            availability,
            evidence,
            product_name: scan.product_name,
        }
    }

    /// Match the phrase rules against text.
    ///
    /// Rules are applied in order; an occurrence only counts if it does not
    /// overlap text already claimed by an earlier rule.
    pub fn match_phrases(&self, text: &str) -> (Availability, Evidence) {
        let text = normalize_text(text);
        let mut claimed: Vec<(usize, usize)> = Vec::new();
        let mut positive: Option<&str> = None;
        let mut negative: Option<&str> = None;

        for rule in &self.rules {
            for (start, _) in text.match_indices(rule.phrase.as_str()) {
                let end = start + rule.phrase.len();
                if claimed.iter().any(|&(s, e)| start < e && s < end) {
                    continue;
                }
                claimed.push((start, end));
                let slot = match rule.polarity {
                    Polarity::Positive => &mut positive,
                    Polarity::Negative => &mut negative,
                };
                slot.get_or_insert(rule.phrase.as_str());
            }
        }

        match (positive, negative) {
            (Some(p), None) => (
                Availability::InStock,
                Evidence::Phrase {
                    phrase: p.to_string(),
                    polarity: Polarity::Positive,
                },
            ),
            (None, Some(n)) => (
                Availability::OutOfStock,
                Evidence::Phrase {
                    phrase: n.to_string(),
                    polarity: Polarity::Negative,
                },
            ),
            (Some(p), Some(n)) => (
                Availability::Unknown,
                Evidence::ConflictingPhrases {
                    positive: p.to_string(),
                    negative: n.to_string(),
                },
            ),
            (None, None) => (Availability::Unknown, Evidence::NoSignal),
        }
    }
}

/// Collapse whitespace and lowercase.
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Map a schema.org availability value to a status.
///
/// Accepts full IRIs (`http://schema.org/InStock`), compact forms
/// (`schema:InStock`) and bare names. Returns `None` for values that do not
/// settle the question (PreOrder, BackOrder, ...).
pub fn map_schema_availability(value: &str) -> Option<Availability> {
    match strip_schema_prefix(value).to_ascii_lowercase().as_str() {
        "instock" | "limitedavailability" | "onlineonly" => Some(Availability::InStock),
        "outofstock" | "soldout" | "discontinued" => Some(Availability::OutOfStock),
        _ => None,
    }
}

fn strip_schema_prefix(value: &str) -> &str {
    let value = value.trim();
    ["https://schema.org/", "http://schema.org/", "schema:"]
        .iter()
        .find_map(|prefix| value.strip_prefix(prefix))
        .unwrap_or(value)
}

#[derive(Debug, Default)]
struct StructuredScan {
    availability: Vec<String>,
    product_name: Option<String>,
}

impl StructuredScan {
    /// All conclusive values must agree; otherwise there is no verdict.
    fn verdict(&self) -> Option<(Availability, String)> {
        let mut verdict: Option<(Availability, &str)> = None;
        for value in &self.availability {
            let Some(status) = map_schema_availability(value) else {
                continue;
            };
            match verdict {
                None => verdict = Some((status, value.as_str())),
                Some((seen, _)) if seen == status => {}
                Some(_) => {
                    tracing::debug!(
                        values = ?self.availability,
                        "Conflicting structured availability, falling back to text"
                    );
                    return None;
                }
            }
        }
        verdict.map(|(status, value)| (status, value.to_string()))
    }
}

fn scan_structured(blocks: &[Value]) -> StructuredScan {
    let mut scan = StructuredScan::default();
    for block in blocks {
        visit(block, false, &mut scan);
    }
    scan
}

fn visit(node: &Value, in_offers: bool, scan: &mut StructuredScan) {
    match node {
        Value::Array(items) => {
            for item in items {
                visit(item, in_offers, scan);
            }
        }
        Value::Object(map) => visit_object(map, in_offers, scan),
        _ => {}
    }
}

fn visit_object(map: &Map<String, Value>, in_offers: bool, scan: &mut StructuredScan) {
    if let Some(graph) = map.get("@graph") {
        visit(graph, false, scan);
    }
    if let Some(entity) = map.get("mainEntity") {
        visit(entity, false, scan);
    }

    let is_product = has_type(map, PRODUCT_TYPES);
    let is_offer = in_offers || has_type(map, OFFER_TYPES);

    if is_product {
        if scan.product_name.is_none() {
            scan.product_name = map
                .get("name")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string);
        }
        if let Some(variants) = map.get("hasVariant") {
            visit(variants, false, scan);
        }
    }

    if is_offer {
        if let Some(Value::String(value)) = map.get("availability") {
            scan.availability.push(value.clone());
        }
    }

    if is_product || is_offer {
        if let Some(offers) = map.get("offers") {
            visit(offers, true, scan);
        }
    }
}

fn has_type(map: &Map<String, Value>, wanted: &[&str]) -> bool {
    let matches = |t: &str| wanted.contains(&strip_schema_prefix(t).to_ascii_lowercase().as_str());
    match map.get("@type") {
        Some(Value::String(t)) => matches(t.as_str()),
        Some(Value::Array(types)) => types.iter().filter_map(Value::as_str).any(matches),
        _ => false,
    }
}
