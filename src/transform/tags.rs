// src/transform/tags.rs

pub const FALLBACK_TAG: &str = "Other";
const DELIMITER: char = ';';

/// Split a `;`-separated tag string. Never returns an empty list.
pub fn parse_tags(raw: Option<&str>) -> Vec<String> {
    let tags: Vec<String> = raw
        .unwrap_or_default()
        .split(DELIMITER)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();

    if tags.is_empty() {
        vec![FALLBACK_TAG.to_string()]
    } else {
        tags
    }
}
