use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    MissingApiKey,
    MissingUrl,
    InvalidTicketsDir(PathBuf),
    InvalidApiKey,
    FetchFailed,
    WriteFailed,
    Synced,
}

impl Notice {
    pub fn is_error(&self) -> bool {
        !matches!(self, Notice::Synced)
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::MissingApiKey => write!(f, "You need to enter your API key in settings"),
            Notice::MissingUrl => write!(f, "You need to enter Redmine URL in settings"),
            Notice::InvalidTicketsDir(path) => write!(
                f,
                "Tickets directory does not exist or is not a folder: {}",
                path.display()
            ),
            Notice::InvalidApiKey => write!(
                f,
                "Enter a valid API key in settings, or check your rights in Redmine"
            ),
            Notice::FetchFailed => write!(f, "Failed to fetch issues from Redmine"),
            Notice::WriteFailed => write!(f, "Failed to write ticket notes"),
            Notice::Synced => write!(f, "Tickets updated successfully"),
        }
    }
}
