pub const HEADER: &str = "Content-Type";
pub const JSON: &str = "application/json";
pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
pub const MULTIPART: &str = "multipart/form-data";

/// Matches `application/json` anywhere in the value, so parameters like `; charset=utf-8` pass.
pub fn is_json_content_type(content_type: Option<&str>) -> bool {
    content_type
        .map(|ct| ct.to_ascii_lowercase().contains(JSON))
        .unwrap_or(false)
}
