use std::path::PathBuf;

use thiserror::Error;

use crate::model::notice::Notice;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("API key is not configured")]
    MissingApiKey,

    #[error("Redmine URL is not configured")]
    MissingUrl,

    #[error("tickets directory {} does not exist or is not a directory", .0.display())]
    InvalidTicketsDir(PathBuf),

    #[error("Redmine rejected the API key (HTTP {0})")]
    Unauthorized(u16),

    #[error("Redmine returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error("request to Redmine failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("failed to write notes for project {project}: {source}")]
    Write {
        project: String,
        #[source]
        source: std::io::Error,
    },
}

impl SyncError {
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            SyncError::MissingApiKey | SyncError::MissingUrl | SyncError::InvalidTicketsDir(_)
        )
    }

    pub fn notice(&self) -> Notice {
        match self {
            SyncError::MissingApiKey => Notice::MissingApiKey,
            SyncError::MissingUrl => Notice::MissingUrl,
            SyncError::InvalidTicketsDir(path) => Notice::InvalidTicketsDir(path.clone()),
            SyncError::Unauthorized(_) => Notice::InvalidApiKey,
            SyncError::Status { .. } | SyncError::Request(_) => Notice::FetchFailed,
            SyncError::Write { .. } => Notice::WriteFailed,
        }
    }
}
