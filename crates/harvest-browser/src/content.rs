//! Captured page content.
//!
//! `PageContent` is what a session hands back after evaluating a loaded
//! page: the rendered text, the raw anchor targets and the HTML itself.

use crate::error::{BrowserError, Result};
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Elements whose text never renders.
const HIDDEN_ELEMENTS: [&str; 5] = ["script", "style", "noscript", "template", "head"];

/// Snapshot of a loaded page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageContent {
    /// Final URL after redirects
    pub url: String,
    /// Serialized document
    pub html: String,
    /// Rendered text of the body
    pub visible_text: String,
    /// Raw `href` attribute of every anchor, in document order
    pub anchor_hrefs: Vec<String>,
}

impl PageContent {
    /// Build a snapshot from static HTML, without running scripts.
    pub fn from_html(url: impl Into<String>, html: impl Into<String>) -> Self {
        let html = html.into();
        let document = Html::parse_document(&html);

        Self {
            url: url.into(),
            visible_text: visible_text(&document),
            anchor_hrefs: anchor_hrefs(&document),
            html,
        }
    }

    /// Whether the HTML contains an element matching `selector`.
    pub fn has_element(&self, selector: &str) -> Result<bool> {
        let selector = Selector::parse(selector)
            .map_err(|e| BrowserError::EvaluationError(format!("invalid selector '{selector}': {e}")))?;
        let document = Html::parse_document(&self.html);
        let found = document.select(&selector).next().is_some();
        Ok(found)
    }
}

/// Text of every rendered text node under `<body>`, space separated.
fn visible_text(document: &Html) -> String {
    static BODY: OnceLock<Selector> = OnceLock::new();
    let body_selector = BODY.get_or_init(|| Selector::parse("body").expect("valid selector"));

    let root = document
        .select(body_selector)
        .next()
        .unwrap_or_else(|| document.root_element());

    let mut parts = Vec::new();
    for node in root.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| HIDDEN_ELEMENTS.contains(&el.name()))
        });
        if hidden {
            continue;
        }
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            parts.push(trimmed);
        }
    }
    parts.join(" ")
}

fn anchor_hrefs(document: &Html) -> Vec<String> {
    static ANCHORS: OnceLock<Selector> = OnceLock::new();
    let selector = ANCHORS.get_or_init(|| Selector::parse("a[href]").expect("valid selector"));

    document
        .select(selector)
        .filter_map(|el| el.value().attr("href"))
        .map(ToString::to_string)
        .collect()
}
