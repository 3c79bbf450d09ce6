//! Markdown output: one note per issue and one kanban board per project.
//!
//! Everything here is pure; writing the results to disk is the job of
//! [`crate::sync::writer`].

pub mod board;
pub mod note;

pub use board::render_board;
pub use note::{render_note, NoteOptions};
