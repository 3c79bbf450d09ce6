use std::io;
use std::path::{Component, Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::model::issue::Issue;
use crate::render::{render_board, render_note, NoteOptions};
use crate::util::text::path_component;

#[derive(Debug, Clone)]
pub struct OutputLayout {
    pub vault_root: PathBuf,
    pub tickets_root: PathBuf,
}

impl OutputLayout {
    pub fn new(vault_root: &Path, tickets_dir: &str) -> Self {
        Self {
            vault_root: vault_root.to_path_buf(),
            tickets_root: vault_root.join(tickets_dir),
        }
    }

    pub fn project_dir(&self, project: &str) -> PathBuf {
        self.tickets_root.join(path_component(project))
    }

    pub fn note_path(&self, project: &str, issue_id: u64) -> PathBuf {
        self.project_dir(project).join(format!("{issue_id}.md"))
    }

    pub fn board_path(&self, project: &str) -> PathBuf {
        self.vault_root
            .join(format!("Kanban board [{}].md", path_component(project)))
    }
}

// Returns the number of notes written.
pub async fn write_project(
    layout: &OutputLayout,
    project: &str,
    issues: &[Issue],
    opts: NoteOptions<'_>,
) -> io::Result<usize> {
    let dir = layout.project_dir(project);
    if !is_project_dir(&layout.tickets_root, &dir) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("project folder {} is outside the tickets folder", dir.display()),
        ));
    }
    if let Err(err) = fs::create_dir_all(&dir).await {
        warn!(project, path = %dir.display(), error = %err, "could not create project folder");
    }
    clear_dir(&dir).await?;

    for issue in issues {
        let path = layout.note_path(project, issue.id);
        append_file(&path, &render_note(issue, opts)).await?;
        debug!(project, issue_id = issue.id, path = %path.display(), "wrote note");
    }

    let board = layout.board_path(project);
    remove_if_exists(&board).await?;
    create_file(&board, &render_board(issues)).await?;
    debug!(project, path = %board.display(), "wrote board");

    Ok(issues.len())
}

// The clear step must only ever touch a direct child of the tickets folder.
fn is_project_dir(tickets_root: &Path, dir: &Path) -> bool {
    matches!(dir.components().next_back(), Some(Component::Normal(_)))
        && dir.parent() == Some(tickets_root)
}

pub async fn clear_dir(dir: &Path) -> io::Result<()> {
    let mut entries = fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if fs::symlink_metadata(&path).await?.is_dir() {
            fs::remove_dir_all(&path).await?;
        } else {
            fs::remove_file(&path).await?;
        }
    }
    Ok(())
}

async fn remove_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path).await {
        Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
        _ => Ok(()),
    }
}

// The folder was just cleared, so appending is the same as creating.
async fn append_file(path: &Path, contents: &str) -> io::Result<()> {
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(contents.as_bytes()).await?;
    file.flush().await
}

async fn create_file(path: &Path, contents: &str) -> io::Result<()> {
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;
    file.write_all(contents.as_bytes()).await?;
    file.flush().await
}
