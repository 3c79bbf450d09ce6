use async_trait::async_trait;
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::StatusCode;
use tracing::debug;

use super::IssueSource;
use crate::error::SyncError;
use crate::model::issue::{Issue, IssueDetail, IssueList};

/// Page size of the assigned-issues request. Only the first page is read.
pub const PAGE_LIMIT: u32 = 100;

const API_KEY_HEADER: &str = "X-Redmine-API-Key";
const CLIENT_ID: &str = concat!("redmine-notes/", env!("CARGO_PKG_VERSION"));

pub struct RedmineProvider {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl RedmineProvider {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            base_url: normalize_base_url(base_url).to_string(),
            api_key: api_key.to_string(),
            client: reqwest::Client::new(),
        }
    }

    async fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<reqwest::Response, SyncError> {
        debug!(url, "GET");
        let resp = self
            .client
            .get(url)
            .query(query)
            .header(API_KEY_HEADER, &self.api_key)
            .header(ACCEPT, "application/json")
            .header(USER_AGENT, CLIENT_ID)
            .send()
            .await?;

        let status = resp.status();
        if status == StatusCode::OK {
            Ok(resp)
        } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            Err(SyncError::Unauthorized(status.as_u16()))
        } else {
            Err(SyncError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            })
        }
    }
}

pub fn normalize_base_url(base_url: &str) -> &str {
    base_url.trim().trim_end_matches('/')
}

pub fn issue_url(base_url: &str, issue_id: u64) -> String {
    format!("{}/issues/{issue_id}", normalize_base_url(base_url))
}

#[async_trait]
impl IssueSource for RedmineProvider {
    fn name(&self) -> &str {
        "Redmine"
    }

    async fn fetch_assigned_issues(&self) -> Result<Vec<Issue>, SyncError> {
        let url = format!("{}/issues.json", self.base_url);
        let limit = PAGE_LIMIT.to_string();
        let list: IssueList = self
            .get(
                &url,
                &[("assigned_to_id", "me"), ("limit", limit.as_str()), ("offset", "0")],
            )
            .await?
            .json()
            .await?;
        Ok(list.issues)
    }

    async fn fetch_issue_detail(&self, issue_id: u64) -> Result<Issue, SyncError> {
        let url = format!("{}/issues/{issue_id}.json", self.base_url);
        let detail: IssueDetail = self
            .get(&url, &[("include", "journals")])
            .await?
            .json()
            .await?;
        Ok(detail.issue)
    }
}
