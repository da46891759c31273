//! Scrape orchestrator for multi-query contact harvesting.
//!
//! This module provides the `ScrapeOrchestrator`, which validates requests,
//! queues them behind a FIFO run gate, and drives each admitted run through
//! search pagination and sequential site visits on its own browser session.

use crate::error::{Result, ScanError};
use crate::events::{self, EventSink, EventStream, ScrapeEvent};
use crate::extractor::{self, ExtractedContacts};
use crate::pacing::{DelayRange, Pauses};
use crate::retry::{retry_with_delay, RetryPolicy};
use crate::runs::{RunRegistry, RunSnapshot, RunStatus};
use crate::serp::SerpParser;
use crate::url_builder::{build_search_url, page_offset};
use futures::FutureExt;
use harvest_browser::{
    BrowserDriver, BrowserError, BrowserSession, LaunchOptions, NavigateOptions, WaitUntil,
};
use harvest_core::{
    AppConfig, Query, RunConfiguration, RunId, RunRequest, SearchResultLink, SiteExtractionResult,
};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tokio::sync::{mpsc, Mutex, OwnedSemaphorePermit, Semaphore};
use tracing::Instrument;

/// Selector every visited page must render before it is captured.
const READY_SELECTOR: &str = "body";

/// A submitted run: its id and the stream of its events.
#[derive(Debug)]
pub struct ScrapeRun {
    /// Key for snapshot reads
    pub id: RunId,
    /// Progress events, ending with `done` or `error`
    pub events: EventStream,
}

/// A validated request waiting for the run gate.
struct QueuedRun {
    id: RunId,
    run: RunConfiguration,
    sink: EventSink,
}

/// State shared by the orchestrator, its dispatcher and every run task.
struct Shared {
    driver: Arc<dyn BrowserDriver>,
    config: AppConfig,
    parser: SerpParser,
    registry: Arc<RunRegistry>,
}

type SessionSlot = Mutex<Box<dyn BrowserSession>>;

/// Orchestrates scrape runs over a browser capability.
pub struct ScrapeOrchestrator {
    shared: Arc<Shared>,
    gate: Arc<Semaphore>,
    dispatcher: OnceLock<mpsc::UnboundedSender<QueuedRun>>,
}

impl ScrapeOrchestrator {
    /// Create an orchestrator driving `driver` with `config`.
    ///
    /// Fails if a configured search selector does not parse.
    pub fn new(driver: Arc<dyn BrowserDriver>, config: AppConfig) -> Result<Self> {
        let parser = SerpParser::new(&config.search)?;
        let registry = Arc::new(RunRegistry::new(config.scraping.max_retained_runs));
        let gate = Arc::new(Semaphore::new(config.scraping.max_concurrent_runs.max(1)));

        Ok(Self {
            shared: Arc::new(Shared {
                driver,
                config,
                parser,
                registry,
            }),
            gate,
            dispatcher: OnceLock::new(),
        })
    }

    /// Validate a request and queue it.
    ///
    /// Rejections are returned here, before any browser work, and never show
    /// up on an event stream. Accepted runs start once the run gate admits
    /// them, in submission order.
    pub async fn start(&self, request: RunRequest) -> Result<ScrapeRun> {
        let run = request.resolve(&self.shared.config.scraping)?;
        let id = RunId::generate();

        let (sink, events) = events::channel(id.clone(), self.shared.config.scraping.event_buffer);
        self.shared.registry.register(id.clone()).await;

        tracing::info!(
            run_id = %id,
            queries = run.queries.len(),
            limit = run.limit,
            timeout_ms = run.timeout_ms,
            retries = run.retries,
            "queued scrape run"
        );

        let queued = QueuedRun {
            id: id.clone(),
            run,
            sink,
        };
        if self.dispatcher().send(queued).is_err() {
            self.shared.registry.finish(&id, RunStatus::Failed).await;
            return Err(ScanError::DispatcherStopped);
        }

        Ok(ScrapeRun { id, events })
    }

    /// Snapshot of a specific run, while it is retained.
    pub async fn snapshot(&self, run_id: &RunId) -> Option<RunSnapshot> {
        self.shared.registry.snapshot(run_id).await
    }

    /// Snapshot of the run that finished most recently.
    pub async fn latest_snapshot(&self) -> Option<RunSnapshot> {
        self.shared.registry.latest_snapshot().await
    }

    /// Queue feeding the run gate, spawned on first use.
    fn dispatcher(&self) -> &mpsc::UnboundedSender<QueuedRun> {
        self.dispatcher.get_or_init(|| {
            let (tx, mut rx) = mpsc::unbounded_channel::<QueuedRun>();
            let shared = Arc::clone(&self.shared);
            let gate = Arc::clone(&self.gate);

            tokio::spawn(async move {
                while let Some(queued) = rx.recv().await {
                    let Ok(permit) = Arc::clone(&gate).acquire_owned().await else {
                        break;
                    };
                    let span = tracing::info_span!("run", run_id = %queued.id);
                    let shared = Arc::clone(&shared);
                    tokio::spawn(
                        async move { shared.execute(queued, permit).await }.instrument(span),
                    );
                }
            });

            tx
        })
    }
}

impl Shared {
    /// Run one admitted request to its terminal event.
    async fn execute(&self, queued: QueuedRun, permit: OwnedSemaphorePermit) {
        let QueuedRun { id, run, sink } = queued;
        self.registry.mark_running(&id).await;

        let options = LaunchOptions::from_config(&self.config.browser);
        let launched = AssertUnwindSafe(self.driver.launch(&options))
            .catch_unwind()
            .await;

        let status = match launched {
            Ok(Ok(session)) => {
                let slot: SessionSlot = Mutex::new(session);
                let outcome = AssertUnwindSafe(self.scrape(&id, &run, &sink, &slot))
                    .catch_unwind()
                    .await;

                let mut session = slot.into_inner();
                if let Err(e) = session.close().await {
                    tracing::warn!("failed to close browser session: {}", e);
                }

                match outcome {
                    Ok(Ok(())) => RunStatus::Completed,
                    Ok(Err(e)) => {
                        tracing::error!("scrape run failed: {}", e);
                        RunStatus::Failed
                    }
                    Err(panic) => {
                        tracing::error!("scrape run panicked: {}", panic_message(&*panic));
                        RunStatus::Failed
                    }
                }
            }
            Ok(Err(e)) => {
                tracing::error!("failed to launch browser session: {}", e);
                RunStatus::Failed
            }
            Err(panic) => {
                tracing::error!("browser launch panicked: {}", panic_message(&*panic));
                RunStatus::Failed
            }
        };

        self.registry.finish(&id, status).await;
        drop(permit);

        let terminal = match status {
            RunStatus::Completed => ScrapeEvent::done(),
            _ => ScrapeEvent::fatal(),
        };
        sink.emit(terminal).await;
    }

    /// Every query in order: paginate, then visit.
    async fn scrape(
        &self,
        id: &RunId,
        run: &RunConfiguration,
        sink: &EventSink,
        session: &SessionSlot,
    ) -> Result<()> {
        let delays = DelayRange::from_run(run);
        let mut total_sites = 0;

        for (index, query) in run.queries.iter().enumerate() {
            sink.message(format!("Starting search for query {}: \"{}\"", index + 1, query))
                .await;

            let links = self.collect_links(run, query, sink, session, delays).await?;
            let sites: Vec<SearchResultLink> = links.into_iter().take(run.limit).collect();
            let site_count = sites.len();

            sink.message(format!(
                "Visiting {site_count} sites to extract emails and phone numbers for query: \"{query}\""
            ))
            .await;
            total_sites += site_count;
            sink.emit(ScrapeEvent::TotalSites { total_sites }).await;

            for (i, link) in sites.into_iter().enumerate() {
                let rank = i + 1;
                sink.message(format!("Visiting site {rank}/{site_count}: {}", link.url))
                    .await;

                let contacts = self.visit_with_retry(run, &link.url, session).await;
                tracing::debug!(
                    url = %link.url,
                    "Found {} emails and {} phone numbers",
                    contacts.emails.len(),
                    contacts.phone_numbers.len()
                );

                let result = SiteExtractionResult {
                    query: query.as_str().to_string(),
                    rank,
                    url: link.url,
                    text: link.text,
                    emails: contacts.emails,
                    phone_numbers: contacts.phone_numbers,
                };
                self.registry.push_result(id, result.clone()).await;
                sink.emit(ScrapeEvent::Result { result }).await;

                let delay = delays.sample();
                sink.message(format!(
                    "Waiting for {}ms before next site...",
                    delay.as_millis()
                ))
                .await;
                tokio::time::sleep(delay).await;
            }

            sink.message(format!(
                "Search completed for query: \"{query}\". Found data for {site_count} sites."
            ))
            .await;
        }

        sink.message(format!(
            "All searches completed. Found data for {total_sites} sites across all queries."
        ))
        .await;
        Ok(())
    }

    /// Walk results pages for one query until enough links are found.
    async fn collect_links(
        &self,
        run: &RunConfiguration,
        query: &Query,
        sink: &EventSink,
        session: &SessionSlot,
        delays: DelayRange,
    ) -> Result<Vec<SearchResultLink>> {
        let per_page = self.config.scraping.results_per_page.max(1);
        let pages = run.pages_to_scrape(per_page);
        let pauses = Pauses::from_config(&self.config.scraping);
        let navigation = NavigateOptions::new(Duration::from_secs(
            self.config.search.navigation_timeout_secs,
        ))
        .wait_until(WaitUntil::NetworkIdle);

        let mut links = Vec::new();
        for page_index in 0..pages {
            sink.message(format!(
                "Searching page {} for query: \"{query}\"",
                page_index + 1
            ))
            .await;

            let delay = delays.sample();
            sink.message(format!(
                "Waiting for {}ms before searching...",
                delay.as_millis()
            ))
            .await;
            tokio::time::sleep(delay).await;

            let url = build_search_url(
                &self.config.search,
                query.as_str(),
                page_offset(page_index, per_page),
            );
            let content = {
                let mut session = session.lock().await;
                session.navigate(&url, navigation).await?;
                session.capture().await?
            };

            let page_url = if content.url.is_empty() {
                url.as_str()
            } else {
                content.url.as_str()
            };
            let found = self.parser.parse_links(&content.html, page_url);
            sink.message(format!("Found {} links on this page", found.len()))
                .await;
            links.extend(found);

            if links.len() >= run.limit
                || !self.parser.has_next_page(&content.html)
                || page_index + 1 >= pages
            {
                break;
            }
            tokio::time::sleep(pauses.page_advance).await;
        }

        Ok(links)
    }

    /// Visit one site under the retry policy; exhausted retries yield no contacts.
    async fn visit_with_retry(
        &self,
        run: &RunConfiguration,
        url: &str,
        session: &SessionSlot,
    ) -> ExtractedContacts {
        let policy = RetryPolicy::for_run(run, &self.config.scraping);
        let timeout = run.timeout();

        retry_with_delay(policy, url, move |_attempt| visit_site(session, url, timeout))
            .await
            .unwrap_or_default()
    }
}

/// One visit attempt: load, wait for the body, extract.
async fn visit_site(
    session: &SessionSlot,
    url: &str,
    timeout: Duration,
) -> std::result::Result<ExtractedContacts, BrowserError> {
    let mut session = session.lock().await;
    session
        .navigate(url, NavigateOptions::new(timeout))
        .await?;
    session.wait_for_selector(READY_SELECTOR, timeout).await?;
    let page = session.capture().await?;
    Ok(extractor::extract(&page))
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
