use indexmap::IndexMap;

use crate::model::issue::Issue;

pub fn group_by_project(issues: Vec<Issue>) -> IndexMap<String, Vec<Issue>> {
    let mut groups: IndexMap<String, Vec<Issue>> = IndexMap::new();
    for issue in issues {
        groups.entry(issue.project.name.clone()).or_default().push(issue);
    }
    groups
}
