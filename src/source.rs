use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::models::Job;

pub const DEFAULT_API_URL: &str = "https://api.weekday.technology/adhoc/getSampleJdJSON";

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Why a page fetch failed. Skipped fetches (guard hit) are not errors and
/// never produce one of these.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("malformed response: {0}")]
    Parse(#[from] serde_json::Error),
}

/// POST body understood by the listing endpoint.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PageRequest {
    pub limit: usize,
    pub offset: usize,
}

/// Response envelope for one page. Some responses omit `jdList` entirely,
/// so both fields default rather than fail deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobsPage {
    #[serde(default)]
    pub jd_list: Vec<Job>,
    #[serde(default)]
    pub total_count: usize,
}

/// Where pages of postings come from. The repository only talks to this
/// trait, so tests swap in a scripted source instead of a live endpoint.
#[async_trait]
pub trait JobSource: Send + Sync {
    async fn fetch_page(&self, request: PageRequest) -> Result<JobsPage, FetchError>;
}

pub struct HttpJobSource {
    client: reqwest::Client,
    url: String,
}

impl HttpJobSource {
    pub fn new(url: impl Into<String>) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl JobSource for HttpJobSource {
    async fn fetch_page(&self, request: PageRequest) -> Result<JobsPage, FetchError> {
        debug!(limit = request.limit, offset = request.offset, "requesting page");

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        // Deserialize from the raw body so a garbled payload surfaces as
        // Parse rather than Network.
        let body = response.text().await?;
        let page: JobsPage = serde_json::from_str(&body)?;
        Ok(page)
    }
}


#[cfg(test)]
mod tests {
    use super::testing::parse_error;
    use super::*;

    #[test]
    fn test_jobs_page_tolerates_missing_fields() {
        let page: JobsPage = serde_json::from_str("{}").unwrap();
        assert!(page.jd_list.is_empty());
        assert_eq!(page.total_count, 0);

        let page: JobsPage =
            serde_json::from_str(r#"{"totalCount": 7, "jdList": [{"jdUid": "a"}]}"#).unwrap();
        assert_eq!(page.total_count, 7);
        assert_eq!(page.jd_list.len(), 1);
        assert_eq!(page.jd_list[0].jd_uid, "a");
    }

    #[test]
    fn test_page_request_serializes_to_wire_shape() {
        let body = serde_json::to_value(PageRequest {
            limit: 12,
            offset: 24,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"limit": 12, "offset": 24}));
    }

    #[test]
    fn test_error_kinds_render_distinctly() {
        let err = parse_error();
        assert!(err.to_string().starts_with("malformed response"));
    }
}
