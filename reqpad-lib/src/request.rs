use crate::body::{BodyType, FormRow};
use crate::http_method::HttpMethod;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(uuid::Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RequestDefinition {
    pub id: RequestId,
    pub name: String,
    pub endpoint: String,
    pub method: HttpMethod,
    pub body_type: BodyType,
    /// Raw JSON text, possibly invalid.
    pub headers: String,
    pub use_global_auth: bool,
    /// Raw JSON text, possibly invalid.
    pub body_json: String,
    pub body_form_data: Vec<FormRow>,
    pub response: Option<ResponseBody>,
    pub status: Option<ExecutionOutcome>,
}

impl RequestDefinition {
    pub const DEFAULT_NAME: &'static str = "New Request";

    pub fn new_default() -> Self {
        Self {
            id: RequestId::new(),
            name: Self::DEFAULT_NAME.to_string(),
            endpoint: String::new(),
            method: HttpMethod::GET,
            body_type: BodyType::None,
            headers: "{}".to_string(),
            use_global_auth: true,
            body_json: "{}".to_string(),
            body_form_data: vec![FormRow::default()],
            response: None,
            status: None,
        }
    }

    pub fn named(name: impl Into<String>, method: HttpMethod, endpoint: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            method,
            endpoint: endpoint.into(),
            ..Self::new_default()
        }
    }

    pub fn is_idle(&self) -> bool {
        self.response.is_none() && self.status.is_none()
    }
}

impl Default for RequestDefinition {
    fn default() -> Self {
        Self::new_default()
    }
}

/// HTTP status of a settled call, or the synthetic `"Error"` marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    Http(u16),
    Error,
}

impl StatusCode {
    pub const ERROR_LITERAL: &'static str = "Error";

    pub fn is_error(&self) -> bool {
        matches!(self, StatusCode::Error)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusCode::Http(code) => write!(f, "{code}"),
            StatusCode::Error => f.write_str(Self::ERROR_LITERAL),
        }
    }
}

impl Serialize for StatusCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            StatusCode::Http(code) => serializer.serialize_u16(*code),
            StatusCode::Error => serializer.serialize_str(Self::ERROR_LITERAL),
        }
    }
}

impl<'de> Deserialize<'de> for StatusCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Number(n) => n
                .as_u64()
                .and_then(|n| u16::try_from(n).ok())
                .map(StatusCode::Http)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid status code: {n}"))),
            Value::String(s) if s == Self::ERROR_LITERAL => Ok(StatusCode::Error),
            other => Err(serde::de::Error::custom(format!(
                "expected a status code or \"Error\", got {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionOutcome {
    pub code: StatusCode,
    pub text: String,
    pub time_ms: u64,
}

/// Serialised untagged; never read back, since a JSON body `{"error": ..}` would be ambiguous.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Failure { error: String },
    Json(Value),
    Text(String),
}

/// Terminal result of one execution, written to the request record in one step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settlement {
    pub status: ExecutionOutcome,
    pub response: ResponseBody,
}

impl Settlement {
    pub const FAILURE_TEXT: &'static str = "Fail";

    pub fn success(
        code: u16,
        text: impl Into<String>,
        time_ms: u64,
        response: ResponseBody,
    ) -> Self {
        Self {
            status: ExecutionOutcome {
                code: StatusCode::Http(code),
                text: text.into(),
                time_ms,
            },
            response,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            status: ExecutionOutcome {
                code: StatusCode::Error,
                text: Self::FAILURE_TEXT.to_string(),
                time_ms: 0,
            },
            response: ResponseBody::Failure {
                error: message.into(),
            },
        }
    }

    pub fn is_failure(&self) -> bool {
        self.status.code.is_error()
    }
}
