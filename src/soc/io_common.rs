use std::path::Path;

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(path)
        .to_string()
}

/// Pairs ordered choices with their rank: the first choice gets rank 1.
pub fn rankings_from_ordered(choices: &[String]) -> Vec<(String, String)> {
    choices
        .iter()
        .enumerate()
        .map(|(idx, name)| (name.clone(), (idx + 1).to_string()))
        .collect()
}
