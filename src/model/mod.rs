pub mod issue;
pub mod notice;
