pub mod redmine;

use async_trait::async_trait;

use crate::error::SyncError;
use crate::model::issue::Issue;

/// Where issues come from. The sync pipeline only talks to this trait.
#[async_trait]
pub trait IssueSource: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch_assigned_issues(&self) -> Result<Vec<Issue>, SyncError>;

    async fn fetch_issue_detail(&self, issue_id: u64) -> Result<Issue, SyncError>;
}
