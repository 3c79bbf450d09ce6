pub fn field_key(name: &str) -> String {
    name.replacen(' ', "_", 1).to_lowercase()
}

// For double-quoted YAML scalars.
pub fn escape_quoted(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

pub fn hashtag(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// Project names become a folder and a file name; they must stay a single
// normal path component.
pub fn path_component(name: &str) -> String {
    let name = name.replace(['/', '\\'], "-");
    match name.trim() {
        "" => "_".to_string(),
        "." | ".." => format!("_{}", name.trim()),
        _ => name,
    }
}
