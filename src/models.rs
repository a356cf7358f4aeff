use serde::{Deserialize, Serialize};

/// One job posting as the listing API returns it. Everything except the id
/// is nullable on the wire; absent fields stay `None` and the filter rules
/// decide what absence means per dimension.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub jd_uid: String,
    pub company_name: Option<String>,
    pub job_role: Option<String>,
    pub location: Option<String>, // "remote", "onsite", "hybrid", or free text
    pub min_exp: Option<u32>,
    pub max_exp: Option<u32>,
    /// Salary bounds are in lakhs. Zero means "not specified".
    pub min_jd_salary: Option<u32>,
    pub max_jd_salary: Option<u32>,
    pub logo_url: Option<String>,
    pub job_details_from_company: Option<String>,
    pub jd_link: Option<String>,
}

impl Job {
    /// "10L - 25L", "10L+", "up to 25L", or "-" when nothing is advertised.
    pub fn salary_range(&self) -> String {
        match (self.min_jd_salary, self.max_jd_salary) {
            (Some(min), Some(max)) => format!("{}L - {}L", min, max),
            (Some(min), None) => format!("{}L+", min),
            (None, Some(max)) => format!("up to {}L", max),
            (None, None) => "-".to_string(),
        }
    }

    pub fn experience_range(&self) -> String {
        match (self.min_exp, self.max_exp) {
            (Some(min), Some(max)) => format!("{}-{} yrs", min, max),
            (Some(min), None) => format!("{}+ yrs", min),
            (None, Some(max)) => format!("up to {} yrs", max),
            (None, None) => "-".to_string(),
        }
    }
}
