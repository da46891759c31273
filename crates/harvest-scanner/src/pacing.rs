//! Randomized and fixed pauses between page loads.

use harvest_core::{RunConfiguration, ScrapingConfig};
use rand::Rng;
use std::time::Duration;

/// Inclusive range of seconds to wait.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DelayRange {
    min_secs: f64,
    max_secs: f64,
}

impl DelayRange {
    /// Range from seconds. Bounds are expected to be validated already;
    /// a reversed pair is swapped.
    #[must_use]
    pub fn new(min_secs: f64, max_secs: f64) -> Self {
        if min_secs <= max_secs {
            Self { min_secs, max_secs }
        } else {
            Self {
                min_secs: max_secs,
                max_secs: min_secs,
            }
        }
    }

    /// The request's `[minDelay, maxDelay]` range.
    #[must_use]
    pub fn from_run(run: &RunConfiguration) -> Self {
        Self::new(run.min_delay_secs, run.max_delay_secs)
    }

    /// Draw a delay uniformly from the range.
    pub fn sample(&self) -> Duration {
        self.sample_with(&mut rand::thread_rng())
    }

    /// Draw a delay using the given generator.
    pub fn sample_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let min = self.min_secs.max(0.0);
        let max = self.max_secs.max(min);
        Duration::from_secs_f64(rng.gen_range(min..=max))
    }
}

/// Fixed pauses that do not depend on the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pauses {
    /// Pause before loading the next results page
    pub page_advance: Duration,
    /// Pause between failed visit attempts
    pub retry_backoff: Duration,
}

impl Pauses {
    /// Pauses from `[scraping]`.
    #[must_use]
    pub fn from_config(config: &ScrapingConfig) -> Self {
        Self {
            page_advance: Duration::from_millis(config.page_advance_pause_ms),
            retry_backoff: Duration::from_millis(config.retry_backoff_ms),
        }
    }
}

impl Default for Pauses {
    fn default() -> Self {
        Self::from_config(&ScrapingConfig::default())
    }
}
