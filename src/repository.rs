use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::models::Job;
use crate::source::{FetchError, JobSource, PageRequest};

pub const PAGE_SIZE: usize = 12;

/// Cursor state for the paginated feed. Owned by [`JobRepository`]; nothing
/// else mutates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationState {
    /// Count of records requested so far; advances by `page_size` per
    /// successful fetch even when the server returns a short page.
    pub offset: usize,
    pub page_size: usize,
    /// Terminal: set once, never cleared.
    pub exhausted: bool,
    pub fetch_in_flight: bool,
}

impl PaginationState {
    fn new(page_size: usize) -> Self {
        Self {
            offset: 0,
            page_size,
            exhausted: false,
            fetch_in_flight: false,
        }
    }
}

/// What a [`JobRepository::fetch_next_page`] call actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// A page was fetched and this many postings were appended.
    Fetched { appended: usize },
    /// Guard hit; nothing was requested and nothing changed.
    Skipped(SkipReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    InFlight,
    Exhausted,
}

/// Owns the ever-growing job sequence fetched from a [`JobSource`] plus the
/// pagination counters. Jobs are appended in fetch order and never mutated
/// or removed; duplicates across overlapping server pages are kept as-is.
pub struct JobRepository {
    source: Box<dyn JobSource>,
    jobs: Vec<Job>,
    state: PaginationState,
    total_count: Option<usize>,
    last_error: Option<String>,
    last_fetch_at: Option<DateTime<Utc>>,
}

impl JobRepository {
    pub fn new(source: Box<dyn JobSource>) -> Self {
        Self::with_page_size(source, PAGE_SIZE)
    }

    pub fn with_page_size(source: Box<dyn JobSource>, page_size: usize) -> Self {
        Self {
            source,
            jobs: Vec::new(),
            state: PaginationState::new(page_size),
            total_count: None,
            last_error: None,
            last_fetch_at: None,
        }
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn state(&self) -> &PaginationState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state.fetch_in_flight
    }

    pub fn is_exhausted(&self) -> bool {
        self.state.exhausted
    }

    /// Server-reported total from the most recent successful fetch.
    pub fn total_count(&self) -> Option<usize> {
        self.total_count
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn last_fetch_at(&self) -> Option<DateTime<Utc>> {
        self.last_fetch_at
    }

    #[cfg(test)]
    pub(crate) fn state_mut_for_tests(&mut self) -> &mut PaginationState {
        &mut self.state
    }

    /// Fetch the next window of the feed and append it. A no-op returning
    /// `Skipped` when a fetch is already running or the feed is exhausted.
    /// On error the cursor and job sequence are untouched, the message is
    /// kept in `last_error`, and the caller may simply invoke again to
    /// retry the same window.
    pub async fn fetch_next_page(&mut self) -> Result<FetchOutcome, FetchError> {
        if self.state.exhausted {
            return Ok(FetchOutcome::Skipped(SkipReason::Exhausted));
        }
        if self.state.fetch_in_flight {
            return Ok(FetchOutcome::Skipped(SkipReason::InFlight));
        }

        self.state.fetch_in_flight = true;
        let request = PageRequest {
            limit: self.state.page_size,
            offset: self.state.offset,
        };
        let result = self.source.fetch_page(request).await;
        self.state.fetch_in_flight = false;

        match result {
            Ok(page) => {
                let appended = page.jd_list.len();
                let requested_through = self.state.offset + self.state.page_size;
                if page.total_count <= requested_through {
                    self.state.exhausted = true;
                }
                self.state.offset = requested_through;
                self.total_count = Some(page.total_count);
                self.jobs.extend(page.jd_list);
                self.last_error = None;
                self.last_fetch_at = Some(Utc::now());
                info!(
                    appended,
                    offset = self.state.offset,
                    exhausted = self.state.exhausted,
                    "applied page"
                );
                Ok(FetchOutcome::Fetched { appended })
            }
            Err(err) => {
                warn!(offset = self.state.offset, "page fetch failed: {err}");
                self.last_error = Some(err.to_string());
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::testing::{ScriptedSource, page, parse_error};

    #[tokio::test]
    async fn test_fetch_appends_and_advances_cursor() {
        let source = ScriptedSource::new(vec![Ok(page(&["a", "b", "c"], 100))]);
        let mut repo = JobRepository::with_page_size(Box::new(source.clone()), 12);

        let outcome = repo.fetch_next_page().await.unwrap();
        assert_eq!(outcome, FetchOutcome::Fetched { appended: 3 });
        assert_eq!(repo.jobs().len(), 3);
        assert_eq!(repo.state().offset, 12);
        assert!(!repo.is_exhausted());
        assert_eq!(repo.total_count(), Some(100));
        assert!(repo.last_fetch_at().is_some());
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_exhaustion_when_requested_window_reaches_total() {
        // totalCount 20 with page size 12: the second fetch requests
        // through 24 >= 20 and exhausts the feed.
        let uids_a: Vec<String> = (0..12).map(|i| format!("a{i}")).collect();
        let refs_a: Vec<&str> = uids_a.iter().map(String::as_str).collect();
        let uids_b: Vec<String> = (0..8).map(|i| format!("b{i}")).collect();
        let refs_b: Vec<&str> = uids_b.iter().map(String::as_str).collect();

        let source =
            ScriptedSource::new(vec![Ok(page(&refs_a, 20)), Ok(page(&refs_b, 20))]);
        let mut repo = JobRepository::with_page_size(Box::new(source), 12);

        repo.fetch_next_page().await.unwrap();
        assert!(!repo.is_exhausted());
        assert_eq!(repo.state().offset, 12);

        repo.fetch_next_page().await.unwrap();
        assert!(repo.is_exhausted());
        assert_eq!(repo.state().offset, 24);
        assert_eq!(repo.jobs().len(), 20);
    }

    #[tokio::test]
    async fn test_exhausted_feed_noops_without_touching_source() {
        let source = ScriptedSource::new(vec![Ok(page(&["a"], 1))]);
        let mut repo = JobRepository::with_page_size(Box::new(source.clone()), 12);

        repo.fetch_next_page().await.unwrap();
        assert!(repo.is_exhausted());

        let outcome = repo.fetch_next_page().await.unwrap();
        assert_eq!(outcome, FetchOutcome::Skipped(SkipReason::Exhausted));
        assert_eq!(source.calls(), 1);
        assert_eq!(repo.jobs().len(), 1);
        assert_eq!(repo.state().offset, 12);
    }

    #[tokio::test]
    async fn test_in_flight_guard_skips() {
        let source = ScriptedSource::new(vec![Ok(page(&["a"], 100))]);
        let mut repo = JobRepository::with_page_size(Box::new(source.clone()), 12);
        repo.state.fetch_in_flight = true;

        let outcome = repo.fetch_next_page().await.unwrap();
        assert_eq!(outcome, FetchOutcome::Skipped(SkipReason::InFlight));
        assert_eq!(source.calls(), 0);
        assert!(repo.jobs().is_empty());
        assert_eq!(repo.state().offset, 0);
    }

    #[tokio::test]
    async fn test_failed_fetch_leaves_cursor_and_allows_retry() {
        let source = ScriptedSource::new(vec![Err(parse_error()), Ok(page(&["a", "b"], 2))]);
        let mut repo = JobRepository::with_page_size(Box::new(source), 12);

        let err = repo.fetch_next_page().await.unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));
        assert_eq!(repo.state().offset, 0);
        assert!(!repo.is_exhausted());
        assert!(!repo.is_loading());
        assert!(repo.last_error().unwrap().starts_with("malformed response"));
        assert!(repo.jobs().is_empty());

        // Same window again, this time it lands.
        let outcome = repo.fetch_next_page().await.unwrap();
        assert_eq!(outcome, FetchOutcome::Fetched { appended: 2 });
        assert_eq!(repo.state().offset, 12);
        assert!(repo.last_error().is_none());
    }

    #[tokio::test]
    async fn test_empty_page_and_missing_total_exhaust_immediately() {
        let source = ScriptedSource::new(vec![Ok(page(&[], 0))]);
        let mut repo = JobRepository::with_page_size(Box::new(source), 12);

        let outcome = repo.fetch_next_page().await.unwrap();
        assert_eq!(outcome, FetchOutcome::Fetched { appended: 0 });
        assert!(repo.is_exhausted());
        assert!(repo.jobs().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_uids_across_pages_are_kept() {
        let source = ScriptedSource::new(vec![
            Ok(page(&["a", "b"], 100)),
            Ok(page(&["b", "c"], 100)),
        ]);
        let mut repo = JobRepository::with_page_size(Box::new(source), 2);

        repo.fetch_next_page().await.unwrap();
        repo.fetch_next_page().await.unwrap();
        let uids: Vec<&str> = repo.jobs().iter().map(|j| j.jd_uid.as_str()).collect();
        assert_eq!(uids, vec!["a", "b", "b", "c"]);
    }
}
