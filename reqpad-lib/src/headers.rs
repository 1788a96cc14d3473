use crate::variables::VariableTable;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub type HeaderObject = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HeaderEntry {
    pub key: String,
    pub value: String,
}

impl HeaderEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Outcome of reading stored header text as a JSON object.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedHeaders {
    ParsedObject(HeaderObject),
    /// Text was not a JSON object; callers continue with an empty one.
    FallbackEmpty,
}

impl ParsedHeaders {
    pub fn is_fallback(&self) -> bool {
        matches!(self, ParsedHeaders::FallbackEmpty)
    }

    pub fn into_object(self) -> HeaderObject {
        match self {
            ParsedHeaders::ParsedObject(map) => map,
            ParsedHeaders::FallbackEmpty => HeaderObject::new(),
        }
    }
}

/// Blank text counts as `{}`. Syntax errors and non-object JSON fall back to empty.
pub fn parse_headers(text: &str) -> ParsedHeaders {
    let source = if text.trim().is_empty() { "{}" } else { text };
    match serde_json::from_str::<Value>(source) {
        Ok(Value::Object(map)) => ParsedHeaders::ParsedObject(map),
        _ => ParsedHeaders::FallbackEmpty,
    }
}

pub fn render_headers(map: &HeaderObject) -> String {
    serde_json::to_string_pretty(map).unwrap_or_else(|_| "{}".to_string())
}

/// Strings are used verbatim, anything else as its JSON text.
pub fn header_value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Removes every key equal to `name` ignoring ASCII case. Returns whether anything was removed.
pub fn remove_key_ignore_case(map: &mut HeaderObject, name: &str) -> bool {
    let matching: Vec<String> = map
        .keys()
        .filter(|k| k.eq_ignore_ascii_case(name))
        .cloned()
        .collect();
    for key in &matching {
        map.shift_remove(key);
    }
    !matching.is_empty()
}

/// Rewrites the stored header text when the per-request global auth toggle flips.
///
/// Enabling places the global set underneath the local one: a local key always keeps its
/// value. Disabling removes exactly the global keys and nothing else.
pub fn toggle_global_auth(headers_text: &str, enabled: bool, globals: &[HeaderEntry]) -> String {
    let local = parse_headers(headers_text).into_object();
    let merged = if enabled {
        let mut merged = HeaderObject::new();
        for entry in globals.iter().filter(|h| !h.key.is_empty()) {
            merged.insert(entry.key.clone(), Value::String(entry.value.clone()));
        }
        for (key, value) in local {
            merged.insert(key, value);
        }
        merged
    } else {
        let mut local = local;
        for entry in globals {
            local.shift_remove(&entry.key);
        }
        local
    };
    render_headers(&merged)
}

/// Final header list computed at send time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EffectiveHeaders {
    entries: Vec<(String, String)>,
    local_fallback: bool,
}

impl EffectiveHeaders {
    /// Inserting an existing key replaces its value in place.
    pub fn set(&mut self, key: &str, value: String) {
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key.to_string(), value));
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn remove_ignore_case(&mut self, key: &str) {
        self.entries.retain(|(k, _)| !k.eq_ignore_ascii_case(key));
    }

    /// True when the local header text could not be read and was treated as `{}`.
    pub fn local_fallback(&self) -> bool {
        self.local_fallback
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_vec(self) -> Vec<(String, String)> {
        self.entries
    }
}

/// Send-time merge: local text is resolved and parsed, then resolved globals are laid on top.
///
/// A global entry replaces a local one with the same key here, the opposite of
/// [`toggle_global_auth`]. Both precedences are kept as they are observed in use.
pub fn compute_effective_headers(
    headers_text: &str,
    use_global_auth: bool,
    globals: &[HeaderEntry],
    table: &VariableTable,
) -> EffectiveHeaders {
    let parsed = parse_headers(&table.resolve(headers_text));
    let mut effective = EffectiveHeaders {
        entries: Vec::new(),
        local_fallback: parsed.is_fallback(),
    };
    for (key, value) in parsed.into_object() {
        effective.set(&key, header_value_text(&value));
    }
    if use_global_auth {
        for entry in globals.iter().filter(|h| !h.key.is_empty()) {
            effective.set(&entry.key, table.resolve(&entry.value));
        }
    }
    effective
}
