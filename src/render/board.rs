use indexmap::IndexMap;
use serde::Serialize;

use crate::model::issue::Issue;

#[derive(Serialize)]
struct BoardSettings {
    #[serde(rename = "kanban-plugin")]
    kanban_plugin: &'static str,
    #[serde(rename = "list-collapse")]
    list_collapse: Vec<bool>,
}

pub fn group_by_status(issues: &[Issue]) -> IndexMap<&str, Vec<&Issue>> {
    let mut columns: IndexMap<&str, Vec<&Issue>> = IndexMap::new();
    for issue in issues {
        columns.entry(issue.status.name.as_str()).or_default().push(issue);
    }
    columns
}

pub fn render_board(issues: &[Issue]) -> String {
    let columns = group_by_status(issues);

    let sections: Vec<String> = columns
        .iter()
        .map(|(status, cards)| {
            let lines: Vec<String> = cards
                .iter()
                .map(|issue| format!("- [ ] [[{}|{}]]", issue.id, card_label(&issue.subject)))
                .collect();
            format!("## {status}\n\n{}\n", lines.join("\n"))
        })
        .collect();

    let settings = BoardSettings {
        kanban_plugin: "board",
        list_collapse: vec![false; columns.len()],
    };
    // Serializing a struct of a str and bools cannot fail.
    let settings = serde_json::to_string(&settings).unwrap_or_default();

    let mut out = String::from("---\n\nkanban-plugin: board\n\n---\n\n");
    out.push_str(&sections.join("\n"));
    out.push_str("\n%% kanban:settings\n```\n");
    out.push_str(&settings);
    out.push_str("\n```\n%%\n");
    out
}

/// Wiki-link aliases cannot contain `|` or brackets.
fn card_label(subject: &str) -> String {
    subject.replace(['|', '[', ']'], "")
}
