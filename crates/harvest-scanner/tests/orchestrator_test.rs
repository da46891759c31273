use futures::StreamExt;
use harvest_browser::{
    BrowserDriver, BrowserError, BrowserSession, LaunchOptions, NavigateOptions, PageContent,
};
use harvest_core::{AppConfig, RunRequest, SearchConfig};
use harvest_scanner::{
    build_search_url, ProgressTracker, RunStatus, ScanError, ScrapeEvent, ScrapeOrchestrator,
    StreamOutcome, FATAL_ERROR_MESSAGE,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

const SEARCH_BASE: &str = "http://search.test/search";

/// Static pages served by the fixture browser, keyed by exact URL.
#[derive(Default)]
struct FixtureWeb {
    pages: HashMap<String, String>,
    panic_on: HashSet<String>,
    /// Number of leading navigations to a URL that fail before it loads
    fail_first: HashMap<String, usize>,
}

impl FixtureWeb {
    fn page(&mut self, url: impl Into<String>, html: impl Into<String>) -> &mut Self {
        self.pages.insert(url.into(), html.into());
        self
    }

    fn results_page(&mut self, query: &str, page_index: usize, links: &[String], has_next: bool) -> &mut Self {
        let url = build_search_url(&search_config(), query, page_index * 10);
        self.page(url, serp_html(links, has_next))
    }
}

#[derive(Default)]
struct Stats {
    launches: AtomicUsize,
    closes: AtomicUsize,
    navigations: Mutex<Vec<(usize, String)>>,
    navigated_at: Mutex<Vec<(String, Instant)>>,
}

impl Stats {
    fn navigations_to(&self, url: &str) -> usize {
        self.navigations
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, u)| u == url)
            .count()
    }

    fn navigation_times(&self, url: &str) -> Vec<Instant> {
        self.navigated_at
            .lock()
            .unwrap()
            .iter()
            .filter(|(u, _)| u == url)
            .map(|(_, at)| *at)
            .collect()
    }

    fn search_navigations(&self) -> usize {
        self.navigations
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, u)| u.starts_with(SEARCH_BASE))
            .count()
    }
}

struct FixtureDriver {
    web: Arc<FixtureWeb>,
    stats: Arc<Stats>,
    fail_launch: bool,
}

impl FixtureDriver {
    fn new(web: FixtureWeb) -> Self {
        Self {
            web: Arc::new(web),
            stats: Arc::new(Stats::default()),
            fail_launch: false,
        }
    }

    fn failing() -> Self {
        Self {
            fail_launch: true,
            ..Self::new(FixtureWeb::default())
        }
    }
}

#[async_trait::async_trait]
impl BrowserDriver for FixtureDriver {
    async fn launch(&self, _options: &LaunchOptions) -> harvest_browser::Result<Box<dyn BrowserSession>> {
        let id = self.stats.launches.fetch_add(1, Ordering::SeqCst);
        if self.fail_launch {
            return Err(BrowserError::LaunchFailed("no browser available".to_string()));
        }
        Ok(Box::new(FixtureSession {
            id,
            web: Arc::clone(&self.web),
            stats: Arc::clone(&self.stats),
            current: None,
        }))
    }
}

struct FixtureSession {
    id: usize,
    web: Arc<FixtureWeb>,
    stats: Arc<Stats>,
    current: Option<PageContent>,
}

#[async_trait::async_trait]
impl BrowserSession for FixtureSession {
    async fn navigate(&mut self, url: &str, _options: NavigateOptions) -> harvest_browser::Result<()> {
        self.stats
            .navigations
            .lock()
            .unwrap()
            .push((self.id, url.to_string()));
        self.stats
            .navigated_at
            .lock()
            .unwrap()
            .push((url.to_string(), Instant::now()));
        let attempt = self.stats.navigations_to(url);

        // Simulated network latency
        tokio::time::sleep(Duration::from_millis(50)).await;

        if self.web.fail_first.get(url).is_some_and(|n| attempt <= *n) {
            self.current = None;
            return Err(BrowserError::NavigationError(format!("{url}: connection reset")));
        }

        match self.web.pages.get(url) {
            Some(html) => {
                self.current = Some(PageContent::from_html(url, html.clone()));
                Ok(())
            }
            None => {
                self.current = None;
                Err(BrowserError::NavigationError(format!("{url}: unreachable")))
            }
        }
    }

    async fn wait_for_selector(&mut self, selector: &str, _timeout: Duration) -> harvest_browser::Result<()> {
        let found = match &self.current {
            Some(page) => page.has_element(selector)?,
            None => false,
        };
        if found {
            Ok(())
        } else {
            Err(BrowserError::SelectorNotFound(selector.to_string()))
        }
    }

    async fn capture(&mut self) -> harvest_browser::Result<PageContent> {
        let page = self.current.clone().unwrap_or_default();
        if self.web.panic_on.contains(&page.url) {
            panic!("renderer crashed on {}", page.url);
        }
        Ok(page)
    }

    async fn close(&mut self) -> harvest_browser::Result<()> {
        self.stats.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn search_config() -> SearchConfig {
    SearchConfig {
        base_url: SEARCH_BASE.to_string(),
        ..SearchConfig::default()
    }
}

fn config(max_concurrent_runs: usize) -> AppConfig {
    let mut config = AppConfig::default();
    config.search = search_config();
    config.scraping.max_concurrent_runs = max_concurrent_runs;
    config
}

fn serp_html(links: &[String], has_next: bool) -> String {
    let mut html = String::from("<html><body><div id=\"search\">");
    for (i, link) in links.iter().enumerate() {
        html.push_str(&format!(
            "<div class=\"g\"><a href=\"{link}\"><h3>Result {}</h3></a></div>",
            i + 1
        ));
    }
    if has_next {
        html.push_str("<a id=\"pnnext\" href=\"#next\">Next</a>");
    }
    html.push_str("</div></body></html>");
    html
}

fn site_urls(prefix: &str, count: usize) -> Vec<String> {
    (1..=count)
        .map(|i| format!("https://{prefix}{i}.test/"))
        .collect()
}

fn request(query: &str, limit: usize, retries: u32) -> RunRequest {
    RunRequest {
        limit: Some(limit),
        min_delay: Some(0.0),
        max_delay: Some(0.0),
        timeout: Some(1_000),
        retries: Some(retries),
        ..RunRequest::new(query)
    }
}

/// Request shaped like a typical interactive run.
fn paced_request(query: &str) -> RunRequest {
    RunRequest {
        limit: Some(10),
        min_delay: Some(1.0),
        max_delay: Some(2.0),
        timeout: Some(15_000),
        retries: Some(2),
        ..RunRequest::new(query)
    }
}

/// One results page for `query` plus a shop page per site: the first three
/// carry a mailto link, the next two a tel link, the rest nothing.
fn shop_web(query: &str, sites: &[String]) -> FixtureWeb {
    let mut web = FixtureWeb::default();
    web.results_page(query, 0, sites, true);
    for (i, url) in sites.iter().enumerate() {
        let body = match i {
            0..=2 => format!(
                "<p>Welcome to shop {i}</p><a href=\"mailto:owner{i}@shop.test?subject=Hello\">Mail us</a>"
            ),
            3 | 4 => format!("<p>Shop {i}</p><a href=\"tel:+1-555-010-000{i}\">Call us</a>"),
            _ => format!("<p>Shop {i} has no contact details</p><a href=\"/about\">About</a>"),
        };
        web.page(url.clone(), format!("<html><body>{body}</body></html>"));
    }
    web
}

/// Millisecond values of every "Waiting for Nms ..." message.
fn waits(events: &[ScrapeEvent]) -> Vec<u128> {
    messages(events)
        .into_iter()
        .filter_map(|m| m.strip_prefix("Waiting for "))
        .filter_map(|rest| rest.split_once("ms"))
        .map(|(ms, _)| ms.parse().unwrap())
        .collect()
}

fn results(events: &[ScrapeEvent]) -> Vec<&harvest_core::SiteExtractionResult> {
    events
        .iter()
        .filter_map(|e| match e {
            ScrapeEvent::Result { result } => Some(result),
            _ => None,
        })
        .collect()
}

fn messages(events: &[ScrapeEvent]) -> Vec<&str> {
    events
        .iter()
        .filter_map(|e| match e {
            ScrapeEvent::Message { message } => Some(message.as_str()),
            _ => None,
        })
        .collect()
}

fn totals(events: &[ScrapeEvent]) -> Vec<usize> {
    events
        .iter()
        .filter_map(|e| match e {
            ScrapeEvent::TotalSites { total_sites } => Some(*total_sites),
            _ => None,
        })
        .collect()
}

#[tokio::test(start_paused = true)]
async fn test_end_to_end_contact_harvest() {
    let sites = site_urls("site", 10);
    let web = shop_web("acme", &sites);

    let driver = Arc::new(FixtureDriver::new(web));
    let orchestrator = ScrapeOrchestrator::new(driver.clone(), config(1)).unwrap();

    let run = orchestrator.start(request("acme", 10, 3)).await.unwrap();
    let events: Vec<ScrapeEvent> = run.events.collect().await;

    let results = results(&events);
    assert_eq!(results.len(), 10);
    assert_eq!(results.iter().filter(|r| !r.emails.is_empty()).count(), 3);
    assert_eq!(results.iter().filter(|r| !r.phone_numbers.is_empty()).count(), 2);
    assert_eq!(
        results.iter().map(|r| r.rank).collect::<Vec<_>>(),
        (1..=10).collect::<Vec<_>>()
    );
    assert!(results[0].emails.contains("owner0@shop.test"));
    assert!(results[3].phone_numbers.contains("+1-555-010-0003"));
    assert_eq!(results[0].text, "Result 1");

    assert_eq!(totals(&events), vec![10]);
    assert_eq!(events.last(), Some(&ScrapeEvent::done()));

    let messages = messages(&events);
    assert_eq!(messages[0], "Starting search for query 1: \"acme\"");
    assert_eq!(messages[1], "Searching page 1 for query: \"acme\"");
    assert_eq!(messages[2], "Waiting for 0ms before searching...");
    assert_eq!(messages[3], "Found 10 links on this page");
    assert!(messages.contains(&"Visiting 10 sites to extract emails and phone numbers for query: \"acme\""));
    assert!(messages.contains(&"Visiting site 1/10: https://site1.test/"));
    assert!(messages.contains(&"Search completed for query: \"acme\". Found data for 10 sites."));
    assert_eq!(
        messages.last(),
        Some(&"All searches completed. Found data for 10 sites across all queries.")
    );

    // Enough links on page one, so no second results page
    assert_eq!(driver.stats.search_navigations(), 1);
    assert_eq!(driver.stats.launches.load(Ordering::SeqCst), 1);
    assert_eq!(driver.stats.closes.load(Ordering::SeqCst), 1);

    let snapshot = orchestrator.snapshot(&run.id).await.unwrap();
    assert_eq!(snapshot.status, RunStatus::Completed);
    assert_eq!(snapshot.results.len(), 10);
    assert_eq!(orchestrator.latest_snapshot().await.unwrap().run_id, run.id);
}

#[tokio::test(start_paused = true)]
async fn test_paced_run_waits_and_backs_off() {
    let sites = site_urls("paced", 10);
    let mut web = shop_web("acme", &sites);
    // The last site never answers
    web.pages.remove(&sites[9]);

    let driver = Arc::new(FixtureDriver::new(web));
    let orchestrator = ScrapeOrchestrator::new(driver.clone(), config(1)).unwrap();

    let started = Instant::now();
    let run = orchestrator.start(paced_request("acme")).await.unwrap();
    let events: Vec<ScrapeEvent> = run.events.collect().await;

    let results = results(&events);
    assert_eq!(results.len(), 10);
    assert_eq!(results.iter().filter(|r| !r.emails.is_empty()).count(), 3);
    assert_eq!(results.iter().filter(|r| !r.phone_numbers.is_empty()).count(), 2);
    assert!(results[9].emails.is_empty() && results[9].phone_numbers.is_empty());
    assert_eq!(events.last(), Some(&ScrapeEvent::done()));

    // One wait before the results page, one after every site
    let waits = waits(&events);
    assert_eq!(waits.len(), 11);
    for ms in &waits {
        assert!((1000..=2000).contains(ms), "waited {ms}ms");
    }
    let waited: u128 = waits.iter().sum();
    assert!(started.elapsed().as_millis() >= waited);

    // Two attempts for the dead site, separated by the 5s backoff plus latency
    let attempts = driver.stats.navigation_times(&sites[9]);
    assert_eq!(attempts.len(), 2);
    let gap = attempts[1] - attempts[0];
    assert!(gap >= Duration::from_millis(5_050), "retried after {gap:?}");
    assert!(gap < Duration::from_millis(5_100), "retried after {gap:?}");
}

#[tokio::test(start_paused = true)]
async fn test_site_recovers_on_second_attempt() {
    let sites = site_urls("flaky", 3);
    let mut web = shop_web("acme", &sites);
    web.fail_first.insert(sites[0].clone(), 1);

    let driver = Arc::new(FixtureDriver::new(web));
    let orchestrator = ScrapeOrchestrator::new(driver.clone(), config(1)).unwrap();

    let run = orchestrator.start(paced_request("acme")).await.unwrap();
    let events: Vec<ScrapeEvent> = run.events.collect().await;

    let results = results(&events);
    assert_eq!(results.len(), 3);
    assert!(results[0].emails.contains("owner0@shop.test"));
    assert_eq!(driver.stats.navigations_to(&sites[0]), 2);
    assert_eq!(driver.stats.navigations_to(&sites[1]), 1);
    assert_eq!(events.last(), Some(&ScrapeEvent::done()));
}

#[tokio::test(start_paused = true)]
async fn test_progress_tracker_follows_run() {
    let sites = site_urls("tracked", 2);
    let mut web = FixtureWeb::default();
    web.results_page("acme", 0, &sites, false);
    for url in &sites {
        web.page(url.clone(), "<html><body>hello</body></html>");
    }

    let orchestrator =
        ScrapeOrchestrator::new(Arc::new(FixtureDriver::new(web)), config(1)).unwrap();
    let mut run = orchestrator.start(request("acme", 5, 1)).await.unwrap();

    let mut tracker = ProgressTracker::new();
    while let Some(event) = run.events.next().await {
        tracker.observe(&event);
    }
    assert_eq!(tracker.total_sites(), 2);
    assert_eq!(tracker.processed_sites(), 2);
    assert_eq!(tracker.finish(), StreamOutcome::Completed);
}

#[tokio::test(start_paused = true)]
async fn test_launch_failure_emits_single_error() {
    let driver = Arc::new(FixtureDriver::failing());
    let orchestrator = ScrapeOrchestrator::new(driver.clone(), config(1)).unwrap();

    let run = orchestrator.start(request("acme", 10, 3)).await.unwrap();
    let events: Vec<ScrapeEvent> = run.events.collect().await;

    assert_eq!(
        events,
        vec![ScrapeEvent::Error {
            error: FATAL_ERROR_MESSAGE.to_string()
        }]
    );
    assert_eq!(driver.stats.closes.load(Ordering::SeqCst), 0);

    let snapshot = orchestrator.snapshot(&run.id).await.unwrap();
    assert_eq!(snapshot.status, RunStatus::Failed);
    assert!(snapshot.results.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_unreachable_sites_yield_empty_results() {
    let sites = site_urls("down", 3);
    let mut web = FixtureWeb::default();
    web.results_page("acme", 0, &sites, false);

    let driver = Arc::new(FixtureDriver::new(web));
    let orchestrator = ScrapeOrchestrator::new(driver.clone(), config(1)).unwrap();

    let run = orchestrator.start(request("acme", 10, 2)).await.unwrap();
    let events: Vec<ScrapeEvent> = run.events.collect().await;

    let results = results(&events);
    assert_eq!(results.len(), 3);
    assert!(results
        .iter()
        .all(|r| r.emails.is_empty() && r.phone_numbers.is_empty()));
    assert_eq!(events.last(), Some(&ScrapeEvent::done()));

    // Every site gets the full retry budget
    for url in &sites {
        assert_eq!(driver.stats.navigations_to(url), 2);
    }
    assert_eq!(driver.stats.closes.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_limit_caps_results_pages() {
    let mut web = FixtureWeb::default();
    for page_index in 0..5 {
        let links = site_urls(&format!("p{page_index}x"), 10);
        web.results_page("acme", page_index, &links, true);
    }

    let driver = Arc::new(FixtureDriver::new(web));
    let orchestrator = ScrapeOrchestrator::new(driver.clone(), config(1)).unwrap();

    let run = orchestrator.start(request("acme", 25, 1)).await.unwrap();
    let events: Vec<ScrapeEvent> = run.events.collect().await;

    assert_eq!(driver.stats.search_navigations(), 3);
    assert_eq!(results(&events).len(), 25);
    assert_eq!(totals(&events), vec![25]);
    assert_eq!(events.last(), Some(&ScrapeEvent::done()));
}

#[tokio::test(start_paused = true)]
async fn test_missing_next_control_stops_pagination() {
    let mut web = FixtureWeb::default();
    web.results_page("acme", 0, &site_urls("only", 4), false);
    web.results_page("acme", 1, &site_urls("never", 10), true);

    let driver = Arc::new(FixtureDriver::new(web));
    let orchestrator = ScrapeOrchestrator::new(driver.clone(), config(1)).unwrap();

    let run = orchestrator.start(request("acme", 20, 1)).await.unwrap();
    let events: Vec<ScrapeEvent> = run.events.collect().await;

    assert_eq!(driver.stats.search_navigations(), 1);
    assert_eq!(results(&events).len(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_queries_run_in_order() {
    let alpha = site_urls("alpha", 2);
    let beta = site_urls("beta", 3);
    let mut web = FixtureWeb::default();
    web.results_page("alpha", 0, &alpha, false);
    web.results_page("beta", 0, &beta, false);

    let orchestrator =
        ScrapeOrchestrator::new(Arc::new(FixtureDriver::new(web)), config(1)).unwrap();
    let run = orchestrator.start(request("alpha; beta", 10, 1)).await.unwrap();
    let events: Vec<ScrapeEvent> = run.events.collect().await;

    let results = results(&events);
    let queries: Vec<&str> = results.iter().map(|r| r.query.as_str()).collect();
    assert_eq!(queries, vec!["alpha", "alpha", "beta", "beta", "beta"]);
    let ranks: Vec<usize> = results.iter().map(|r| r.rank).collect();
    assert_eq!(ranks, vec![1, 2, 1, 2, 3]);

    assert_eq!(totals(&events), vec![2, 5]);
    let messages = messages(&events);
    assert!(messages.contains(&"Starting search for query 2: \"beta\""));
    assert_eq!(
        messages.last(),
        Some(&"All searches completed. Found data for 5 sites across all queries.")
    );
}

#[tokio::test(start_paused = true)]
async fn test_search_failure_is_fatal() {
    // No results page is served at all
    let driver = Arc::new(FixtureDriver::new(FixtureWeb::default()));
    let orchestrator = ScrapeOrchestrator::new(driver.clone(), config(1)).unwrap();

    let run = orchestrator.start(request("acme", 10, 3)).await.unwrap();
    let events: Vec<ScrapeEvent> = run.events.collect().await;

    assert_eq!(events.last(), Some(&ScrapeEvent::fatal()));
    assert!(!events.contains(&ScrapeEvent::done()));
    assert_eq!(
        events.iter().filter(|e| e.is_terminal()).count(),
        1
    );
    assert_eq!(driver.stats.closes.load(Ordering::SeqCst), 1);
    assert_eq!(
        orchestrator.snapshot(&run.id).await.unwrap().status,
        RunStatus::Failed
    );
}

#[tokio::test(start_paused = true)]
async fn test_panic_closes_session_and_fails_run() {
    let sites = site_urls("crash", 2);
    let mut web = FixtureWeb::default();
    web.results_page("acme", 0, &sites, false);
    web.page(sites[0].clone(), "<html><body>ok</body></html>");
    web.page(sites[1].clone(), "<html><body>boom</body></html>");
    web.panic_on.insert(sites[1].clone());

    let driver = Arc::new(FixtureDriver::new(web));
    let orchestrator = ScrapeOrchestrator::new(driver.clone(), config(1)).unwrap();

    let run = orchestrator.start(request("acme", 10, 1)).await.unwrap();
    let events: Vec<ScrapeEvent> = run.events.collect().await;

    assert_eq!(events.last(), Some(&ScrapeEvent::fatal()));
    assert_eq!(driver.stats.closes.load(Ordering::SeqCst), 1);

    // Results gathered before the crash stay readable
    let snapshot = orchestrator.snapshot(&run.id).await.unwrap();
    assert_eq!(snapshot.status, RunStatus::Failed);
    assert_eq!(snapshot.results.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_runs_are_isolated_and_serialized() {
    let alpha = site_urls("alpha", 2);
    let beta = site_urls("beta", 2);
    let mut web = FixtureWeb::default();
    web.results_page("alpha", 0, &alpha, false);
    web.results_page("beta", 0, &beta, false);
    for url in alpha.iter().chain(&beta) {
        web.page(url.clone(), "<html><body>contact info@example.test</body></html>");
    }

    let driver = Arc::new(FixtureDriver::new(web));
    let orchestrator = ScrapeOrchestrator::new(driver.clone(), config(1)).unwrap();

    let first = orchestrator.start(request("alpha", 10, 1)).await.unwrap();
    let second = orchestrator.start(request("beta", 10, 1)).await.unwrap();
    assert_ne!(first.id, second.id);

    let (first_events, second_events): (Vec<ScrapeEvent>, Vec<ScrapeEvent>) =
        tokio::join!(first.events.collect(), second.events.collect());
    assert_eq!(first_events.last(), Some(&ScrapeEvent::done()));
    assert_eq!(second_events.last(), Some(&ScrapeEvent::done()));

    let first_snapshot = orchestrator.snapshot(&first.id).await.unwrap();
    let second_snapshot = orchestrator.snapshot(&second.id).await.unwrap();
    assert!(first_snapshot.results.iter().all(|r| r.query == "alpha"));
    assert!(second_snapshot.results.iter().all(|r| r.query == "beta"));
    assert_eq!(first_snapshot.results.len(), 2);
    assert_eq!(second_snapshot.results.len(), 2);

    // The second run's session only starts after the first one finished
    let navigations = driver.stats.navigations.lock().unwrap().clone();
    let first_session_last = navigations.iter().rposition(|(id, _)| *id == 0).unwrap();
    let second_session_first = navigations.iter().position(|(id, _)| *id == 1).unwrap();
    assert!(first_session_last < second_session_first);

    assert_eq!(driver.stats.launches.load(Ordering::SeqCst), 2);
    assert_eq!(driver.stats.closes.load(Ordering::SeqCst), 2);
    assert_eq!(orchestrator.latest_snapshot().await.unwrap().run_id, second.id);
}

#[tokio::test(start_paused = true)]
async fn test_run_completes_after_consumer_drops_stream() {
    let sites = site_urls("bg", 2);
    let mut web = FixtureWeb::default();
    web.results_page("acme", 0, &sites, false);

    let driver = Arc::new(FixtureDriver::new(web));
    let orchestrator = ScrapeOrchestrator::new(driver.clone(), config(1)).unwrap();

    let run = orchestrator.start(request("acme", 10, 1)).await.unwrap();
    let id = run.id.clone();
    drop(run);

    let mut snapshot = orchestrator.snapshot(&id).await.unwrap();
    while !snapshot.status.is_finished() {
        tokio::time::sleep(Duration::from_millis(100)).await;
        snapshot = orchestrator.snapshot(&id).await.unwrap();
    }
    assert_eq!(snapshot.status, RunStatus::Completed);
    assert_eq!(snapshot.results.len(), 2);
    assert_eq!(driver.stats.closes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_invalid_request_is_rejected_synchronously() {
    let driver = Arc::new(FixtureDriver::new(FixtureWeb::default()));
    let orchestrator = ScrapeOrchestrator::new(driver.clone(), config(1)).unwrap();

    let err = orchestrator.start(RunRequest::new("   ")).await.unwrap_err();
    assert!(matches!(err, ScanError::InvalidRequest(ref m) if m == "Search query is required"));

    let err = orchestrator
        .start(RunRequest {
            min_delay: Some(5.0),
            max_delay: Some(1.0),
            ..RunRequest::new("acme")
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ScanError::InvalidRequest(_)));

    assert_eq!(driver.stats.launches.load(Ordering::SeqCst), 0);
}
