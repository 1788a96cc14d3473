use crate::content_type;
use crate::headers::{parse_headers, remove_key_ignore_case, render_headers};
use crate::http_method::HttpMethod;
use crate::variables::VariableTable;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BodyType {
    #[default]
    #[serde(rename = "none")]
    None,
    #[serde(rename = "application/json")]
    Json,
    #[serde(rename = "application/x-www-form-urlencoded")]
    UrlEncoded,
    #[serde(rename = "multipart/form-data")]
    Multipart,
}

impl BodyType {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "none" => Some(Self::None),
            content_type::JSON => Some(Self::Json),
            content_type::FORM_URLENCODED => Some(Self::UrlEncoded),
            content_type::MULTIPART => Some(Self::Multipart),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Json => content_type::JSON,
            Self::UrlEncoded => content_type::FORM_URLENCODED,
            Self::Multipart => content_type::MULTIPART,
        }
    }

    /// The `Content-Type` kept in stored headers for this body type. Multipart has none because
    /// the transport has to generate the boundary.
    pub fn content_type(&self) -> Option<&'static str> {
        match self {
            Self::Json => Some(content_type::JSON),
            Self::UrlEncoded => Some(content_type::FORM_URLENCODED),
            Self::Multipart | Self::None => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePayload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl FilePayload {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormRowKind {
    #[default]
    Text,
    File,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    Text(String),
    /// `None` until a file has been chosen.
    File(Option<FilePayload>),
}

impl Default for FormValue {
    fn default() -> Self {
        FormValue::Text(String::new())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormRow {
    pub key: String,
    pub value: FormValue,
}

impl FormRow {
    pub fn text(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: FormValue::Text(value.into()),
        }
    }

    pub fn file(key: impl Into<String>, payload: FilePayload) -> Self {
        Self {
            key: key.into(),
            value: FormValue::File(Some(payload)),
        }
    }

    pub fn kind(&self) -> FormRowKind {
        match self.value {
            FormValue::Text(_) => FormRowKind::Text,
            FormValue::File(_) => FormRowKind::File,
        }
    }

    /// Switching kind always drops the previous value.
    pub fn set_kind(&mut self, kind: FormRowKind) {
        self.value = match kind {
            FormRowKind::Text => FormValue::Text(String::new()),
            FormRowKind::File => FormValue::File(None),
        };
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MultipartValue {
    Text(String),
    File(FilePayload),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartField {
    pub name: String,
    pub value: MultipartValue,
}

/// Transport-ready payload.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EncodedBody {
    #[default]
    None,
    /// Resolved body text, sent verbatim.
    Json(String),
    UrlEncoded(Vec<(String, String)>),
    Multipart(Vec<MultipartField>),
}

impl EncodedBody {
    pub fn is_none(&self) -> bool {
        matches!(self, EncodedBody::None)
    }

    /// Multipart bodies must not carry the stored `Content-Type`.
    pub fn removes_content_type(&self) -> bool {
        matches!(self, EncodedBody::Multipart(_))
    }

    pub fn to_form_string(pairs: &[(String, String)]) -> String {
        serde_urlencoded::to_string(pairs).unwrap_or_default()
    }

    /// Printable form of the body, with file parts summarised by name and size.
    pub fn describe(&self) -> Option<Value> {
        match self {
            EncodedBody::None => None,
            EncodedBody::Json(text) => Some(Value::String(text.clone())),
            EncodedBody::UrlEncoded(pairs) => Some(Value::String(Self::to_form_string(pairs))),
            EncodedBody::Multipart(fields) => {
                let mut map = serde_json::Map::new();
                for field in fields {
                    let value = match &field.value {
                        MultipartValue::Text(text) => text.clone(),
                        MultipartValue::File(file) => {
                            format!("<file {} ({} bytes)>", file.filename, file.bytes.len())
                        }
                    };
                    map.insert(field.name.clone(), Value::String(value));
                }
                Some(Value::Object(map))
            }
        }
    }
}

/// Keeps the stored `Content-Type` in line with a newly selected body type.
pub fn sync_content_type(headers_text: &str, body_type: BodyType) -> String {
    let mut headers = parse_headers(headers_text).into_object();
    remove_key_ignore_case(&mut headers, content_type::HEADER);
    if let Some(ct) = body_type.content_type() {
        headers.insert(content_type::HEADER.to_string(), Value::String(ct.to_string()));
    }
    render_headers(&headers)
}

pub fn encode_body(
    method: HttpMethod,
    body_type: BodyType,
    body_json: &str,
    rows: &[FormRow],
    table: &VariableTable,
) -> EncodedBody {
    if !method.allows_body() {
        return EncodedBody::None;
    }
    let rows = rows.iter().filter(|row| !row.key.is_empty());
    match body_type {
        BodyType::None => EncodedBody::None,
        BodyType::Json => EncodedBody::Json(table.resolve(body_json)),
        BodyType::UrlEncoded => EncodedBody::UrlEncoded(
            rows.map(|row| {
                let value = match &row.value {
                    FormValue::Text(text) => table.resolve(text),
                    FormValue::File(Some(file)) => file.filename.clone(),
                    FormValue::File(None) => String::new(),
                };
                (row.key.clone(), value)
            })
            .collect(),
        ),
        BodyType::Multipart => EncodedBody::Multipart(
            rows.map(|row| {
                let value = match &row.value {
                    FormValue::Text(text) => MultipartValue::Text(table.resolve(text)),
                    FormValue::File(Some(file)) => MultipartValue::File(file.clone()),
                    FormValue::File(None) => MultipartValue::Text(String::new()),
                };
                MultipartField {
                    name: row.key.clone(),
                    value,
                }
            })
            .collect(),
        ),
    }
}
