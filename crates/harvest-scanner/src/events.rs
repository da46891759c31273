//! Run events and their consumer-side fold.
//!
//! A run reports through a bounded channel. The producer half
//! ([`EventSink`]) never blocks a run on a vanished consumer; the consumer
//! half ([`EventStream`]) is a plain `futures::Stream` that ends after the
//! first terminal event.

use futures::Stream;
use harvest_core::{RunId, SiteExtractionResult};
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;

/// Message of the single `error` event emitted on a fatal failure.
pub const FATAL_ERROR_MESSAGE: &str =
    "An unexpected error occurred while fetching search results, emails, and phone numbers";

/// One progress event. Serializes as exactly one of `{"message"}`,
/// `{"result"}`, `{"totalSites"}`, `{"done"}` or `{"error"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScrapeEvent {
    /// Human-readable progress line
    Message {
        /// Text of the progress line
        message: String,
    },
    /// One site finished
    Result {
        /// Contacts for the visited site
        result: SiteExtractionResult,
    },
    /// Running number of sites the request will visit
    TotalSites {
        /// Sites announced so far across all queries
        #[serde(rename = "totalSites")]
        total_sites: usize,
    },
    /// Every query finished
    Done {
        /// Always `true`
        done: bool,
    },
    /// The run failed
    Error {
        /// User-facing failure message
        error: String,
    },
}

impl ScrapeEvent {
    /// Progress line event.
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
        }
    }

    /// Completion event.
    #[must_use]
    pub fn done() -> Self {
        Self::Done { done: true }
    }

    /// Failure event with the fixed user-facing message.
    #[must_use]
    pub fn fatal() -> Self {
        Self::Error {
            error: FATAL_ERROR_MESSAGE.to_string(),
        }
    }

    /// Whether no further events follow this one.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done { .. } | Self::Error { .. })
    }
}

/// Create a connected sink and stream for one run.
#[must_use]
pub fn channel(run_id: RunId, buffer: usize) -> (EventSink, EventStream) {
    let (tx, rx) = mpsc::channel(buffer.max(1));
    (
        EventSink { tx, run_id },
        EventStream {
            rx,
            finished: false,
        },
    )
}

/// Producer half, owned by the run task.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::Sender<ScrapeEvent>,
    run_id: RunId,
}

impl EventSink {
    /// Deliver an event. A dropped consumer is not an error.
    pub async fn emit(&self, event: ScrapeEvent) {
        if self.tx.send(event).await.is_err() {
            tracing::trace!(run_id = %self.run_id, "event consumer gone, dropping event");
        }
    }

    /// Log a progress line and deliver it.
    pub async fn message(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!(run_id = %self.run_id, "{}", message);
        self.emit(ScrapeEvent::message(message)).await;
    }
}

/// Consumer half: a finite stream of one run's events.
#[derive(Debug)]
pub struct EventStream {
    rx: mpsc::Receiver<ScrapeEvent>,
    finished: bool,
}

impl Stream for EventStream {
    type Item = ScrapeEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.finished {
            return Poll::Ready(None);
        }

        match self.rx.poll_recv(cx) {
            Poll::Ready(Some(event)) => {
                if event.is_terminal() {
                    self.finished = true;
                    self.rx.close();
                }
                Poll::Ready(Some(event))
            }
            Poll::Ready(None) => {
                self.finished = true;
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

/// How an event stream ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamOutcome {
    /// `done` was received
    Completed,
    /// `error` was received
    Failed(String),
    /// The stream closed without a terminal event
    Truncated,
}

impl StreamOutcome {
    /// Only `Completed` counts as success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// Folds a run's events into progress counters.
#[derive(Debug, Clone, Default)]
pub struct ProgressTracker {
    total_sites: usize,
    processed_sites: usize,
    outcome: Option<StreamOutcome>,
}

impl ProgressTracker {
    /// Tracker with nothing observed yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one event.
    pub fn observe(&mut self, event: &ScrapeEvent) {
        if self.outcome.is_some() {
            return;
        }
        match event {
            ScrapeEvent::Message { .. } => {}
            ScrapeEvent::Result { .. } => self.processed_sites += 1,
            ScrapeEvent::TotalSites { total_sites } => self.total_sites = *total_sites,
            ScrapeEvent::Done { .. } => self.outcome = Some(StreamOutcome::Completed),
            ScrapeEvent::Error { error } => {
                self.outcome = Some(StreamOutcome::Failed(error.clone()));
            }
        }
    }

    /// Sites announced so far.
    #[must_use]
    pub fn total_sites(&self) -> usize {
        self.total_sites
    }

    /// Results received so far.
    #[must_use]
    pub fn processed_sites(&self) -> usize {
        self.processed_sites
    }

    /// Percent complete, 100 once `done` arrives.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn percent(&self) -> f64 {
        if self.outcome == Some(StreamOutcome::Completed) {
            return 100.0;
        }
        if self.total_sites == 0 {
            return 0.0;
        }
        (self.processed_sites as f64 / self.total_sites as f64 * 100.0).min(100.0)
    }

    /// Final outcome, `Truncated` if no terminal event was seen.
    #[must_use]
    pub fn finish(self) -> StreamOutcome {
        self.outcome.unwrap_or(StreamOutcome::Truncated)
    }
}
