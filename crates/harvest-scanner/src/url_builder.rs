use harvest_core::SearchConfig;

/// Results-page URL for `query`, starting at result offset `start`.
pub fn build_search_url(search: &SearchConfig, query: &str, start: usize) -> String {
    format!(
        "{}?q={}&start={}",
        search.base_url,
        urlencoding::encode(query),
        start
    )
}

/// Result offset of the zero-based results page `page_index`.
pub fn page_offset(page_index: usize, results_per_page: usize) -> usize {
    page_index * results_per_page
}
