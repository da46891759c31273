//! Search results page parsing.

use crate::error::{Result, ScanError};
use harvest_core::{SearchConfig, SearchResultLink};
use scraper::{Html, Selector};
use url::Url;

/// Pulls organic result links out of a results page.
#[derive(Debug, Clone)]
pub struct SerpParser {
    container: Selector,
    link: Selector,
    title: Selector,
    next_page: Selector,
}

impl SerpParser {
    /// Compile the selectors from `[search]`.
    pub fn new(search: &SearchConfig) -> Result<Self> {
        Ok(Self {
            container: parse_selector(&search.result_container_selector)?,
            link: parse_selector(&search.link_selector)?,
            title: parse_selector(&search.title_selector)?,
            next_page: parse_selector(&search.next_page_selector)?,
        })
    }

    /// Result links in page order.
    ///
    /// Containers missing an anchor with an `href` or a title are skipped.
    /// Relative targets are resolved against `page_url`.
    #[must_use]
    pub fn parse_links(&self, html: &str, page_url: &str) -> Vec<SearchResultLink> {
        let document = Html::parse_document(html);
        let base = Url::parse(page_url).ok();

        let mut links = Vec::new();
        for item in document.select(&self.container) {
            let Some(anchor) = item.select(&self.link).next() else {
                continue;
            };
            let Some(title) = item.select(&self.title).next() else {
                continue;
            };
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };

            links.push(SearchResultLink {
                url: resolve_href(base.as_ref(), href),
                text: title.text().collect::<String>(),
            });
        }
        links
    }

    /// Whether the page offers a next-page control.
    #[must_use]
    pub fn has_next_page(&self, html: &str) -> bool {
        let document = Html::parse_document(html);
        document.select(&self.next_page).next().is_some()
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| ScanError::InvalidSelector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

fn resolve_href(base: Option<&Url>, href: &str) -> String {
    let href = href.trim();
    match base.map(|b| b.join(href)) {
        Some(Ok(url)) => url.to_string(),
        _ => href.to_string(),
    }
}
