use indexmap::IndexMap;

use crate::model::issue::{Issue, Journal};
use crate::providers::redmine::issue_url;
use crate::util::text::{capitalize, escape_quoted, field_key, hashtag};
use crate::util::time::{date_part, display_timestamp};
use crate::util::value::value_to_text;

pub const COMPLEXITY_FIELD: &str = "sprint_complexity";

#[derive(Debug, Clone, Copy)]
pub struct NoteOptions<'a> {
    pub base_url: &'a str,
    pub show_table: bool,
}

/// Custom fields keyed by normalized name, in first-seen order. A later
/// field whose name normalizes to the same key replaces the earlier value.
pub fn custom_fields(issue: &Issue) -> IndexMap<String, String> {
    let mut fields = IndexMap::new();
    for field in &issue.custom_fields {
        fields.insert(field_key(&field.name), value_to_text(&field.value));
    }
    fields
}

pub fn render_note(issue: &Issue, opts: NoteOptions<'_>) -> String {
    let fields = custom_fields(issue);
    let complexity = fields.get(COMPLEXITY_FIELD).map(String::as_str).unwrap_or("");
    let url = issue_url(opts.base_url, issue.id);
    let status = issue.status.name.as_str();
    let priority = issue.priority.name.as_str();

    let mut out = String::new();
    out.push_str("---\n");
    out.push_str(&format!("title: \"{}\"\n", escape_quoted(&issue.subject)));
    out.push_str(&format!("ticket_id: {}\n", issue.id));
    out.push_str(&format!("url: \"{url}\"\n"));
    out.push_str(&format!("status: \"{}\"\n", escape_quoted(status)));
    out.push_str(&format!("priority: \"{}\"\n", escape_quoted(priority)));
    out.push_str(&format!("project: \"{}\"\n", escape_quoted(&issue.project.name)));
    out.push_str(&format!("created: {}\n", date_part(&issue.created_on)));
    out.push_str(&format!("updated: {}\n", date_part(&issue.updated_on)));
    out.push_str(&format!("{COMPLEXITY_FIELD}: \"{}\"\n", escape_quoted(complexity)));
    out.push_str("---\n");
    out.push_str(&format!("#{}\n", hashtag(status)));
    out.push_str(&format!("# {}\n", issue.subject));

    if opts.show_table {
        out.push_str(&properties_table(&[
            ("url", url.as_str()),
            ("status", status),
            ("priority", priority),
            (COMPLEXITY_FIELD, complexity),
        ]));
    }

    out.push_str("\n---\n");
    out.push_str(issue.description.as_deref().unwrap_or("").trim());
    out.push_str("\n\n---\n\n");

    if let Some(comments) = render_comments(&issue.journals) {
        out.push_str("# Comments\n");
        out.push_str(&comments);
    }
    out.push_str("\n\n");
    out
}

fn properties_table(rows: &[(&str, &str)]) -> String {
    let mut table = String::from("| Property | Value |\n| --- | --- |\n");
    for (name, value) in rows {
        table.push_str(&format!(
            "| {} | {} |\n",
            capitalize(name),
            value.replace('|', "\\|")
        ));
    }
    table
}

fn render_comments(journals: &[Journal]) -> Option<String> {
    let blocks: Vec<String> = journals
        .iter()
        .filter_map(|journal| {
            let note = journal.comment()?;
            let body: Vec<String> = note.lines().map(|line| format!("> {line}")).collect();
            Some(format!(
                "\n> [!quote] {}\n> =={}==\n{}\n",
                journal.user.name,
                display_timestamp(&journal.created_on),
                body.join("\n")
            ))
        })
        .collect();

    (!blocks.is_empty()).then(|| blocks.concat())
}
