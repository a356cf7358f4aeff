use tracing::debug;

use crate::repository::{FetchOutcome, JobRepository, SkipReason};
use crate::source::FetchError;

/// Why the shell thinks more rows are needed. Keeps the controller free of
/// any particular scroll or input mechanism; whatever drives the UI just
/// produces these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSignal {
    /// The viewport reached the end of the rendered list.
    NearEnd,
    /// The user explicitly asked for another page (including retry).
    Explicit,
}

/// Turns a stream of load signals into at most one outstanding fetch.
/// Rapid-fire signals while a fetch is running, or after the feed is
/// exhausted, are swallowed without touching the network.
#[derive(Debug, Default)]
pub struct PaginationController {
    signals_seen: u64,
    fetches_started: u64,
}

impl PaginationController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signals_seen(&self) -> u64 {
        self.signals_seen
    }

    pub fn fetches_started(&self) -> u64 {
        self.fetches_started
    }

    pub async fn maybe_load_more(
        &mut self,
        repository: &mut JobRepository,
        signal: LoadSignal,
    ) -> Result<FetchOutcome, FetchError> {
        self.signals_seen += 1;

        if repository.is_loading() {
            debug!(?signal, "ignoring load signal, fetch in flight");
            return Ok(FetchOutcome::Skipped(SkipReason::InFlight));
        }
        if repository.is_exhausted() {
            debug!(?signal, "ignoring load signal, feed exhausted");
            return Ok(FetchOutcome::Skipped(SkipReason::Exhausted));
        }

        self.fetches_started += 1;
        repository.fetch_next_page().await
    }
}
