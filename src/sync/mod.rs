//! One sync pass: fetch assigned issues, enrich them with journals, group
//! them by project and rewrite each project's notes and board.

pub mod group;
pub mod writer;

use std::fmt;

use futures::future::join_all;
use tracing::{debug, error, info, warn};

use crate::config::AppConfig;
use crate::error::SyncError;
use crate::model::issue::Issue;
use crate::model::notice::Notice;
use crate::providers::redmine::RedmineProvider;
use crate::providers::IssueSource;
use crate::render::NoteOptions;
use group::group_by_project;
use writer::{write_project, OutputLayout};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Idle,
    Fetching,
    Enriching,
    Writing,
}

impl fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SyncPhase::Idle => "idle",
            SyncPhase::Fetching => "fetching",
            SyncPhase::Enriching => "enriching",
            SyncPhase::Writing => "writing",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct SyncTarget {
    pub api_key: String,
    pub base_url: String,
    pub layout: OutputLayout,
    pub show_table: bool,
}

impl SyncTarget {
    // Nothing is fetched or written when this fails.
    pub fn from_config(config: &AppConfig) -> Result<Self, SyncError> {
        let api_key = non_blank(config.api_key.as_deref()).ok_or(SyncError::MissingApiKey)?;
        let base_url = non_blank(config.redmine_url.as_deref()).ok_or(SyncError::MissingUrl)?;

        let layout = OutputLayout::new(&config.vault_root(), &config.tickets_dir);
        if !layout.tickets_root.is_dir() {
            return Err(SyncError::InvalidTicketsDir(layout.tickets_root));
        }

        Ok(Self {
            api_key: api_key.to_string(),
            base_url: base_url.to_string(),
            layout,
            show_table: config.show_table_props,
        })
    }

    fn note_options(&self) -> NoteOptions<'_> {
        NoteOptions {
            base_url: &self.base_url,
            show_table: self.show_table,
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub fetched: usize,
    pub dropped: Vec<u64>,
    pub projects: Vec<String>,
    pub notes_written: usize,
}

/// Fetch every issue's detail record concurrently. Failed fetches are
/// logged and dropped; the rest keep their input order.
pub async fn enrich(source: &dyn IssueSource, issues: &[Issue]) -> (Vec<Issue>, Vec<u64>) {
    let results = join_all(issues.iter().map(|issue| source.fetch_issue_detail(issue.id))).await;

    let mut enriched = Vec::with_capacity(results.len());
    let mut dropped = Vec::new();
    for (issue, result) in issues.iter().zip(results) {
        match result {
            Ok(detail) => enriched.push(detail),
            Err(err) => {
                warn!(issue_id = issue.id, error = %err, "dropping issue, detail fetch failed");
                dropped.push(issue.id);
            }
        }
    }
    (enriched, dropped)
}

pub async fn run(target: &SyncTarget, source: &dyn IssueSource) -> Result<SyncReport, SyncError> {
    let mut phase = SyncPhase::Idle;
    let result = run_phases(target, source, &mut phase).await;
    if let Err(err) = &result {
        debug!(phase = %phase, source = source.name(), error = %err, "sync stopped");
    }
    enter(&mut phase, SyncPhase::Idle);
    result
}

fn enter(phase: &mut SyncPhase, next: SyncPhase) {
    debug!(from = %phase, to = %next, "sync phase");
    *phase = next;
}

async fn run_phases(
    target: &SyncTarget,
    source: &dyn IssueSource,
    phase: &mut SyncPhase,
) -> Result<SyncReport, SyncError> {
    enter(phase, SyncPhase::Fetching);
    let issues = source.fetch_assigned_issues().await?;
    info!(count = issues.len(), source = source.name(), "fetched assigned issues");

    enter(phase, SyncPhase::Enriching);
    let (enriched, dropped) = enrich(source, &issues).await;

    enter(phase, SyncPhase::Writing);
    let mut report = SyncReport {
        fetched: issues.len(),
        dropped,
        ..SyncReport::default()
    };
    for (project, group) in group_by_project(enriched) {
        let written = write_project(&target.layout, &project, &group, target.note_options())
            .await
            .map_err(|err| SyncError::Write {
                project: project.clone(),
                source: err,
            })?;
        info!(project = %project, notes = written, "project synced");
        report.notes_written += written;
        report.projects.push(project);
    }

    Ok(report)
}

pub async fn sync_vault(config: &AppConfig) -> Result<SyncReport, SyncError> {
    let target = SyncTarget::from_config(config)?;
    let provider = RedmineProvider::new(&target.base_url, &target.api_key);
    run(&target, &provider).await
}

/// Entry point for every trigger; the outcome is logged and becomes a notice.
pub async fn sync_and_notify(config: &AppConfig) -> Notice {
    match sync_vault(config).await {
        Ok(report) => {
            info!(
                fetched = report.fetched,
                dropped = report.dropped.len(),
                projects = report.projects.len(),
                notes = report.notes_written,
                "sync complete"
            );
            Notice::Synced
        }
        Err(err) => {
            if err.is_precondition() {
                warn!(operation = "sync_vault", error = %err, "sync not started");
            } else {
                error!(operation = "sync_vault", error = %err, "sync aborted");
            }
            err.notice()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::issue::fixtures::{issue, journal};
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tempfile::TempDir;
    use tokio::sync::Barrier;

    struct MockSource {
        issues: Vec<Issue>,
        unauthorized: bool,
        failing_details: Vec<u64>,
        list_calls: AtomicUsize,
        detail_calls: Arc<Mutex<Vec<u64>>>,
        barrier: Option<Barrier>,
    }

    impl MockSource {
        fn new(issues: Vec<Issue>) -> Self {
            Self {
                issues,
                unauthorized: false,
                failing_details: Vec::new(),
                list_calls: AtomicUsize::new(0),
                detail_calls: Arc::new(Mutex::new(Vec::new())),
                barrier: None,
            }
        }

        fn failing_detail(mut self, id: u64) -> Self {
            self.failing_details.push(id);
            self
        }

        fn unauthorized(mut self) -> Self {
            self.unauthorized = true;
            self
        }

        fn all_at_once(mut self) -> Self {
            self.barrier = Some(Barrier::new(self.issues.len()));
            self
        }
    }

    #[async_trait]
    impl IssueSource for MockSource {
        fn name(&self) -> &str {
            "Mock"
        }

        async fn fetch_assigned_issues(&self) -> Result<Vec<Issue>, SyncError> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            if self.unauthorized {
                return Err(SyncError::Unauthorized(401));
            }
            Ok(self.issues.clone())
        }

        async fn fetch_issue_detail(&self, issue_id: u64) -> Result<Issue, SyncError> {
            self.detail_calls.lock().unwrap().push(issue_id);
            if let Some(barrier) = &self.barrier {
                barrier.wait().await;
            }
            if self.failing_details.contains(&issue_id) {
                return Err(SyncError::Status {
                    status: 500,
                    url: format!("http://mock/issues/{issue_id}.json"),
                });
            }
            let mut detail = self
                .issues
                .iter()
                .find(|i| i.id == issue_id)
                .cloned()
                .ok_or(SyncError::Status {
                    status: 404,
                    url: format!("http://mock/issues/{issue_id}.json"),
                })?;
            detail.journals = vec![journal(1, "Sam Ortiz", Some("enriched"))];
            Ok(detail)
        }
    }

    fn config_for(vault: &Path) -> AppConfig {
        AppConfig {
            api_key: Some("secret".into()),
            redmine_url: Some("https://tracker.example.com".into()),
            vault_path: Some(vault.to_path_buf()),
            ..AppConfig::default()
        }
    }

    fn vault_with_tickets_dir() -> TempDir {
        let vault = TempDir::new().unwrap();
        std::fs::create_dir_all(vault.path().join("Tickets")).unwrap();
        vault
    }

    fn sample_issues() -> Vec<Issue> {
        vec![
            issue(1, "A", "New"),
            issue(42, "A", "New"),
            issue(2, "B", "Done"),
        ]
    }

    #[tokio::test]
    async fn enrich_drops_only_failed_issues() {
        let source = MockSource::new(sample_issues()).failing_detail(42);

        let (enriched, dropped) = enrich(&source, &source.issues).await;

        assert_eq!(enriched.iter().map(|i| i.id).collect::<Vec<_>>(), vec![1, 2]);
        assert!(enriched.iter().all(|i| i.journals.len() == 1));
        assert_eq!(dropped, vec![42]);
    }

    #[tokio::test]
    async fn detail_requests_are_in_flight_together() {
        let source = MockSource::new(sample_issues()).all_at_once();

        let (enriched, _) = tokio::time::timeout(
            Duration::from_secs(5),
            enrich(&source, &source.issues),
        )
        .await
        .expect("detail requests were not issued concurrently");

        assert_eq!(enriched.len(), 3);
    }

    #[tokio::test]
    async fn run_writes_each_project() {
        let vault = vault_with_tickets_dir();
        let target = SyncTarget::from_config(&config_for(vault.path())).unwrap();
        let source = MockSource::new(sample_issues()).failing_detail(42);

        let report = run(&target, &source).await.unwrap();

        assert_eq!(report.fetched, 3);
        assert_eq!(report.dropped, vec![42]);
        assert_eq!(report.projects, vec!["A".to_string(), "B".to_string()]);
        assert_eq!(report.notes_written, 2);

        let layout = &target.layout;
        assert!(layout.note_path("A", 1).exists());
        assert!(!layout.note_path("A", 42).exists());
        assert!(layout.note_path("B", 2).exists());
        let note = std::fs::read_to_string(layout.note_path("A", 1)).unwrap();
        assert!(note.contains("> enriched"));
        assert!(layout.board_path("A").exists());
        assert!(layout.board_path("B").exists());
    }

    #[tokio::test]
    async fn repeated_runs_produce_identical_files() {
        let vault = vault_with_tickets_dir();
        let target = SyncTarget::from_config(&config_for(vault.path())).unwrap();
        let source = MockSource::new(sample_issues());

        run(&target, &source).await.unwrap();
        let note = std::fs::read(target.layout.note_path("B", 2)).unwrap();
        let board = std::fs::read(target.layout.board_path("A")).unwrap();

        run(&target, &source).await.unwrap();
        assert_eq!(std::fs::read(target.layout.note_path("B", 2)).unwrap(), note);
        assert_eq!(std::fs::read(target.layout.board_path("A")).unwrap(), board);
    }

    #[tokio::test]
    async fn auth_failure_stops_before_enrichment() {
        let vault = vault_with_tickets_dir();
        let target = SyncTarget::from_config(&config_for(vault.path())).unwrap();
        let source = MockSource::new(sample_issues()).unauthorized();

        let err = run(&target, &source).await.unwrap_err();

        assert!(matches!(err, SyncError::Unauthorized(401)));
        assert_eq!(err.notice(), Notice::InvalidApiKey);
        assert!(source.detail_calls.lock().unwrap().is_empty());
        assert_eq!(std::fs::read_dir(&target.layout.tickets_root).unwrap().count(), 0);
    }

    #[derive(Clone, Default)]
    struct LogCapture(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for LogCapture {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn failed_run_leaves_error_logging_to_the_caller() {
        let logs = LogCapture::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::TRACE)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let vault = vault_with_tickets_dir();
        let target = SyncTarget::from_config(&config_for(vault.path())).unwrap();
        let source = MockSource::new(sample_issues()).unauthorized();
        assert!(run(&target, &source).await.is_err());

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("sync stopped"));
        assert!(!output.contains("ERROR"));
    }

    #[tokio::test]
    async fn missing_api_key_skips_fetch_and_writes() {
        let vault = vault_with_tickets_dir();
        let mut config = config_for(vault.path());
        config.api_key = None;

        assert!(matches!(
            SyncTarget::from_config(&config),
            Err(SyncError::MissingApiKey)
        ));
        assert_eq!(sync_and_notify(&config).await, Notice::MissingApiKey);
        assert_eq!(std::fs::read_dir(vault.path()).unwrap().count(), 1);
        assert_eq!(std::fs::read_dir(vault.path().join("Tickets")).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn blank_url_is_a_missing_url() {
        let vault = vault_with_tickets_dir();
        let mut config = config_for(vault.path());
        config.redmine_url = Some("   ".into());

        assert_eq!(sync_and_notify(&config).await, Notice::MissingUrl);
    }

    #[test]
    fn tickets_dir_must_be_an_existing_folder() {
        let vault = TempDir::new().unwrap();
        let config = config_for(vault.path());
        assert!(matches!(
            SyncTarget::from_config(&config),
            Err(SyncError::InvalidTicketsDir(_))
        ));

        std::fs::write(vault.path().join("Tickets"), "file").unwrap();
        assert!(matches!(
            SyncTarget::from_config(&config),
            Err(SyncError::InvalidTicketsDir(_))
        ));
    }

    #[test]
    fn api_key_is_checked_before_url_and_folder() {
        let config = AppConfig {
            vault_path: Some("/definitely/not/here".into()),
            ..AppConfig::default()
        };
        assert!(matches!(
            SyncTarget::from_config(&config),
            Err(SyncError::MissingApiKey)
        ));
    }

    #[test]
    fn phases_display_lowercase() {
        assert_eq!(SyncPhase::Enriching.to_string(), "enriching");
        assert_eq!(SyncPhase::Idle.to_string(), "idle");
    }
}
