use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Availability of the watched product as observed on one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    InStock,
    OutOfStock,
    Unknown,
}

impl Availability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Availability::InStock => "in_stock",
            Availability::OutOfStock => "out_of_stock",
            Availability::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Last observed status, persisted between runs.
///
/// One record per deployment; each run overwrites it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    /// URL the status was observed on. Empty for records written
    /// without one.
    #[serde(default)]
    pub url: String,
    pub status: Availability,
    pub checked_at: DateTime<Utc>,
}

impl StatusRecord {
    pub fn new(url: &str, status: Availability) -> Self {
        Self {
            url: url.to_string(),
            status,
            checked_at: Utc::now(),
        }
    }

    /// Whether this record describes the given URL.
    pub fn is_for(&self, url: &str) -> bool {
        self.url.is_empty() || self.url == url
    }
}

/// Parsed page: what the extractor looks at.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageContent {
    /// Human-visible text, in document order.
    pub visible_text: String,
    /// Every JSON-LD block that parsed as JSON.
    pub json_ld: Vec<serde_json::Value>,
}

/// Whether a phrase speaks for or against availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    Positive,
    Negative,
}

/// Why the extractor reached its verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evidence {
    /// schema.org availability value from JSON-LD.
    StructuredData { value: String },
    /// A single phrase polarity matched in the page text.
    Phrase { phrase: String, polarity: Polarity },
    /// Both positive and negative phrases matched.
    ConflictingPhrases { positive: String, negative: String },
    /// Nothing conclusive found.
    NoSignal,
}

impl fmt::Display for Evidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Evidence::StructuredData { value } => write!(f, "schema.org data ({value})"),
            Evidence::Phrase { phrase, polarity } => match polarity {
                Polarity::Positive => write!(f, "found phrase '{phrase}'"),
                Polarity::Negative => write!(f, "found negative phrase '{phrase}'"),
            },
            Evidence::ConflictingPhrases { positive, negative } => write!(
                f,
                "conflicting phrases '{positive}' and '{negative}'"
            ),
            Evidence::NoSignal => f.write_str("no conclusive indicators"),
        }
    }
}

/// Extractor output for one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assessment {
    pub availability: Availability,
    pub evidence: Evidence,
    /// Product name from structured data, when the page declares one.
    pub product_name: Option<String>,
}

/// Message handed to every notification channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub url: String,
    pub product_name: Option<String>,
    pub evidence: Evidence,
}

impl Alert {
    pub fn new(url: &str, assessment: &Assessment) -> Self {
        Self {
            url: url.to_string(),
            product_name: assessment.product_name.clone(),
            evidence: assessment.evidence.clone(),
        }
    }

    pub fn title(&self) -> String {
        match &self.product_name {
            Some(name) => format!("In stock: {name}"),
            None => "Product is in stock".to_string(),
        }
    }

    pub fn body(&self) -> String {
        format!(
            "The product is available: {}\n\nSource: {}",
            self.url, self.evidence
        )
    }
}
