use lazy_static::lazy_static;
use regex::Regex;
use std::path::Path;

lazy_static! {
    static ref NAME_REGEX: Regex = Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_/-]*$").unwrap();
}

pub fn validate_path_exists(path: &str) -> Result<String, String> {
    if Path::new(path).exists() {
        Ok(path.to_string())
    } else {
        Err(format!("Path does not exist: {path}"))
    }
}

pub fn validate_name(name: &str) -> Result<String, String> {
    if name.len() > 50 {
        return Err("Name must be 50 characters or less".to_string());
    }
    if !NAME_REGEX.is_match(name) {
        return Err("Name must match pattern: ^[a-zA-Z_][a-zA-Z0-9_/-]*$".to_string());
    }
    Ok(name.to_string())
}

/// Request names are free text in a collection, so only blank names are refused.
pub fn validate_request_name(name: &str) -> Result<String, String> {
    if name.trim().is_empty() {
        return Err("Request name must not be empty".to_string());
    }
    Ok(name.to_string())
}

pub fn validate_variable(variable: &str) -> Result<String, String> {
    let Some((name, _)) = variable.split_once('=') else {
        return Err("Variable must be in format NAME=VALUE".to_string());
    };

    if let Err(e) = validate_name(name) {
        return Err(format!("Invalid variable name: {e}"));
    }

    Ok(variable.to_string())
}
