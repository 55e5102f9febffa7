use scraper::{ElementRef, Html, Node, Selector};
use stockwatch_core::error::AppError;
use stockwatch_core::models::PageContent;
use stockwatch_core::traits::PageParser;

/// Elements whose text never reaches the reader.
const HIDDEN_TAGS: &[&str] = &["script", "style", "noscript", "template", "head"];

/// `<input>` types rendered as buttons showing their `value`.
const BUTTON_INPUT_TYPES: &[&str] = &["submit", "button"];

/// HTML parser using scraper.
///
/// Collects JSON-LD blocks and the human-visible text of a page. Parsing is
/// lenient: malformed markup still yields whatever text it contains, and
/// JSON-LD blocks that are not valid JSON are skipped.
#[derive(Debug, Clone, Default)]
pub struct HtmlPageParser;

impl HtmlPageParser {
    pub fn new() -> Self {
        Self
    }
}

impl PageParser for HtmlPageParser {
    fn parse(&self, html: &str) -> Result<PageContent, AppError> {
        let document = Html::parse_document(html);
        Ok(PageContent {
            visible_text: visible_text(&document),
            json_ld: json_ld_blocks(&document)?,
        })
    }
}

fn json_ld_blocks(document: &Html) -> Result<Vec<serde_json::Value>, AppError> {
    let selector =
        Selector::parse("script").map_err(|e| AppError::ParseError(format!("selector: {e}")))?;

    let blocks = document
        .select(&selector)
        .filter(|script| {
            script.value().attr("type").is_some_and(|t| {
                t.trim()
                    .to_ascii_lowercase()
                    .starts_with("application/ld+json")
            })
        })
        .filter_map(|script| {
            let raw = script.text().collect::<String>();
            match serde_json::from_str(raw.trim()) {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::debug!(error = %e, "Skipping malformed JSON-LD block");
                    None
                }
            }
        })
        .collect();

    Ok(blocks)
}

fn visible_text(document: &Html) -> String {
    let mut parts: Vec<&str> = Vec::new();

    for node in document.root_element().descendants() {
        match node.value() {
            Node::Text(text) => {
                let hidden = node
                    .ancestors()
                    .filter_map(ElementRef::wrap)
                    .any(|el| HIDDEN_TAGS.contains(&el.value().name()));
                let text: &str = text;
                if !hidden && !text.trim().is_empty() {
                    parts.push(text.trim());
                }
            }
            Node::Element(el) if el.name() == "input" => {
                let is_button = el
                    .attr("type")
                    .is_some_and(|t| BUTTON_INPUT_TYPES.contains(&t.to_ascii_lowercase().as_str()));
                if let (true, Some(value)) = (is_button, el.attr("value")) {
                    parts.push(value.trim());
                }
            }
            _ => {}
        }
    }

    parts.join(" ")
}
