use std::collections::HashSet;

use crate::models::Job;

/// Choices the dashboard offers for each filter dimension. The feed itself
/// is free text, so these are suggestions for the shell, not constraints
/// enforced by the engine.
pub const EXPERIENCE_OPTIONS: [u32; 11] = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10];
pub const LOCATION_OPTIONS: [&str; 3] = ["onsite", "remote", "hybrid"];
pub const ROLE_OPTIONS: [&str; 5] = ["frontend", "ios", "android", "tech lead", "backend"];
/// Minimum base salary steps, in lakhs.
pub const BASE_SALARY_OPTIONS: [u32; 11] = [0, 10, 20, 30, 40, 50, 60, 70, 80, 90, 100];

/// One user's current filter selections. Everything starts unset; a
/// dimension that is unset passes every job through.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    /// Years of experience the candidate has.
    pub experience: Option<u32>,
    /// Multi-select; only "remote" and "onsite" actually constrain, see
    /// [`matches`].
    pub locations: HashSet<String>,
    /// Multi-select, exact membership.
    pub roles: HashSet<String>,
    /// Lakhs. Jobs advertising less than this are dropped.
    pub min_base_salary: Option<u32>,
    /// Case-insensitive substring match on company name. Empty = no filter.
    pub company_query: String,
}

impl FilterCriteria {
    pub fn is_unset(&self) -> bool {
        self.experience.is_none()
            && self.locations.is_empty()
            && self.roles.is_empty()
            && self.min_base_salary.is_none()
            && self.company_query.is_empty()
    }

    /// Back to the all-unset mount state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Stable filter over the fetched sequence: keeps input order, never
/// reorders, never errors. Unset criteria is the identity.
pub fn filter_jobs<'a>(jobs: &'a [Job], criteria: &FilterCriteria) -> Vec<&'a Job> {
    jobs.iter().filter(|job| matches(job, criteria)).collect()
}

/// Per-job inclusion test. A job survives only if no selected dimension
/// mismatches. A job missing a field that a selected dimension needs is
/// excluded, with two exceptions: a present-but-empty company name passes
/// any query, and a zero `min_jd_salary` reads as "not specified".
pub fn matches(job: &Job, criteria: &FilterCriteria) -> bool {
    let role_mismatch = !criteria.roles.is_empty()
        && !job
            .job_role
            .as_deref()
            .is_some_and(|role| criteria.roles.contains(role));

    let experience_mismatch = criteria
        .experience
        .is_some_and(|have| match job.min_exp {
            Some(needed) => have < needed,
            None => true,
        });

    let location = job.location.as_deref().map(str::to_lowercase);
    let location_missing = !criteria.locations.is_empty() && location.is_none();
    let remote_mismatch =
        criteria.locations.contains("remote") && location.as_deref() != Some("remote");
    let onsite_mismatch =
        criteria.locations.contains("onsite") && location.as_deref() == Some("remote");

    let salary_mismatch = criteria
        .min_base_salary
        .is_some_and(|wanted| match job.min_jd_salary {
            Some(0) => false,
            Some(offered) => offered < wanted,
            None => true,
        });

    let company_mismatch = !criteria.company_query.is_empty()
        && match job.company_name.as_deref() {
            Some(name) => {
                !name.is_empty()
                    && !name
                        .to_lowercase()
                        .contains(&criteria.company_query.to_lowercase())
            }
            None => true,
        };

    !(role_mismatch
        || experience_mismatch
        || location_missing
        || remote_mismatch
        || onsite_mismatch
        || salary_mismatch
        || company_mismatch)
}
