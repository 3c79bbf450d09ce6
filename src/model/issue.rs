use serde::{Deserialize, Serialize};

/// An `{ id, name }` reference as Redmine embeds it for projects, statuses,
/// priorities, trackers and users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRef {
    pub id: u64,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRef {
    pub id: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomField {
    pub id: u64,
    pub name: String,
    /// Redmine sends strings, arrays (multi-value fields) or null here.
    #[serde(default)]
    pub value: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalDetail {
    pub property: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Journal {
    pub id: u64,
    pub user: NamedRef,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_on: String,
    #[serde(default)]
    pub details: Vec<JournalDetail>,
}

impl Journal {
    pub fn comment(&self) -> Option<&str> {
        self.notes.as_deref().filter(|n| !n.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub id: u64,
    pub project: NamedRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracker: Option<NamedRef>,
    pub status: NamedRef,
    pub priority: NamedRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<NamedRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<NamedRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<IssueRef>,
    pub subject: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    pub created_on: String,
    pub updated_on: String,
    #[serde(default)]
    pub closed_on: Option<String>,
    #[serde(default)]
    pub done_ratio: u32,
    #[serde(default)]
    pub estimated_hours: Option<f64>,
    #[serde(default)]
    pub total_estimated_hours: Option<f64>,
    #[serde(default)]
    pub spent_hours: Option<f64>,
    #[serde(default)]
    pub total_spent_hours: Option<f64>,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default)]
    pub custom_fields: Vec<CustomField>,
    #[serde(default)]
    pub journals: Vec<Journal>,
}

#[derive(Debug, Deserialize)]
pub struct IssueList {
    pub issues: Vec<Issue>,
}

#[derive(Debug, Deserialize)]
pub struct IssueDetail {
    pub issue: Issue,
}
