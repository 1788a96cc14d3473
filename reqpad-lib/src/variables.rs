use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

lazy_static! {
    static ref TOKEN_REGEX: Regex = Regex::new(r"\{\{(.*?)\}\}").unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Variable {
    pub key: String,
    pub value: String,
}

impl Variable {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Flat key to value lookup built from an ordered variable list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableTable {
    values: HashMap<String, String>,
}

impl VariableTable {
    /// Later entries shadow earlier ones. Rows with an empty key are ignored.
    pub fn from_variables(variables: &[Variable]) -> Self {
        let mut values = HashMap::new();
        for var in variables {
            if !var.key.is_empty() {
                values.insert(var.key.clone(), var.value.clone());
            }
        }
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Replaces every `{{ key }}` token whose trimmed key is known.
    ///
    /// Unknown tokens are left exactly as written. Substituted values are not scanned again,
    /// so a value containing `{{other}}` comes out literally.
    pub fn resolve(&self, text: &str) -> String {
        TOKEN_REGEX
            .replace_all(text, |caps: &Captures| {
                let key = caps[1].trim();
                match self.values.get(key) {
                    Some(value) => value.clone(),
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }
}

pub fn resolve(text: &str, variables: &[Variable]) -> String {
    VariableTable::from_variables(variables).resolve(text)
}
