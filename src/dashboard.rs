use std::cell::RefCell;

use chrono::{DateTime, Utc};

use crate::filter::{self, FilterCriteria};
use crate::models::Job;
use crate::pagination::{LoadSignal, PaginationController};
use crate::repository::{FetchOutcome, JobRepository};
use crate::source::FetchError;

/// Composition root for one dashboard session. Owns the repository (and
/// through it the fetched job sequence), the pagination controller, and the
/// live filter criteria; hands the shell a filtered view plus the loading
/// and exhaustion flags it renders.
pub struct DashboardViewModel {
    repository: JobRepository,
    controller: PaginationController,
    criteria: FilterCriteria,
    // Indices of the currently visible jobs, rebuilt lazily after any
    // criteria change or fetch that appended.
    visible: RefCell<Option<Vec<usize>>>,
}

impl DashboardViewModel {
    /// Opens the dashboard with all-unset criteria and issues the initial
    /// page fetch. A failed initial fetch is kept in `last_error` rather
    /// than returned, so the shell still opens and can offer a retry.
    pub async fn open(repository: JobRepository) -> Self {
        let mut vm = Self {
            repository,
            controller: PaginationController::new(),
            criteria: FilterCriteria::default(),
            visible: RefCell::new(None),
        };
        let _ = vm.repository.fetch_next_page().await;
        vm
    }

    // --- Derived view ---

    /// The fetched jobs that pass the current criteria, in fetch order.
    pub fn visible_jobs(&self) -> Vec<&Job> {
        let mut cache = self.visible.borrow_mut();
        let indices = cache.get_or_insert_with(|| {
            self.repository
                .jobs()
                .iter()
                .enumerate()
                .filter(|(_, job)| filter::matches(job, &self.criteria))
                .map(|(index, _)| index)
                .collect()
        });
        indices
            .iter()
            .map(|&index| &self.repository.jobs()[index])
            .collect()
    }

    fn invalidate(&mut self) {
        *self.visible.borrow_mut() = None;
    }

    // --- Criteria mutation (one dimension at a time) ---

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn set_experience(&mut self, years: Option<u32>) {
        self.criteria.experience = years;
        self.invalidate();
    }

    pub fn set_min_base_salary(&mut self, lakhs: Option<u32>) {
        self.criteria.min_base_salary = lakhs;
        self.invalidate();
    }

    pub fn set_company_query(&mut self, query: impl Into<String>) {
        self.criteria.company_query = query.into();
        self.invalidate();
    }

    pub fn add_role(&mut self, role: impl Into<String>) {
        self.criteria.roles.insert(role.into());
        self.invalidate();
    }

    pub fn remove_role(&mut self, role: &str) {
        self.criteria.roles.remove(role);
        self.invalidate();
    }

    pub fn add_location(&mut self, location: impl Into<String>) {
        self.criteria.locations.insert(location.into());
        self.invalidate();
    }

    pub fn remove_location(&mut self, location: &str) {
        self.criteria.locations.remove(location);
        self.invalidate();
    }

    pub fn reset_filters(&mut self) {
        self.criteria.reset();
        self.invalidate();
    }

    // --- Pagination ---

    /// Feed a trigger signal through the controller. The visible view is
    /// only invalidated when a page actually landed.
    pub async fn load_more(&mut self, signal: LoadSignal) -> Result<FetchOutcome, FetchError> {
        let outcome = self
            .controller
            .maybe_load_more(&mut self.repository, signal)
            .await;
        if let Ok(FetchOutcome::Fetched { appended }) = &outcome {
            if *appended > 0 {
                self.invalidate();
            }
        }
        outcome
    }

    // --- Flags for the shell ---

    pub fn is_loading(&self) -> bool {
        self.repository.is_loading()
    }

    pub fn is_exhausted(&self) -> bool {
        self.repository.is_exhausted()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.repository.last_error()
    }

    pub fn jobs_loaded(&self) -> usize {
        self.repository.jobs().len()
    }

    pub fn total_count(&self) -> Option<usize> {
        self.repository.total_count()
    }

    pub fn last_fetch_at(&self) -> Option<DateTime<Utc>> {
        self.repository.last_fetch_at()
    }
}
