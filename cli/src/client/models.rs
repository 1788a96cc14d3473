use reqpad_lib::{ExecutionOutcome, HeaderEntry, ResponseBody};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Serialize)]
pub struct RequestInfo {
    pub index: usize,
    pub name: String,
    pub method: String,
    pub endpoint: String,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDetails {
    pub name: String,
    pub method: String,
    pub url: String,
    pub body_type: String,
    pub use_global_auth: bool,
    pub headers: Vec<HeaderEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestExecutionResult {
    pub request_name: String,
    pub method: String,
    pub url: String,
    pub status: ExecutionOutcome,
    pub response: ResponseBody,
}

impl RequestExecutionResult {
    pub fn is_failure(&self) -> bool {
        self.status.code.is_error()
    }
}

pub struct ClientConfig {
    pub source_path: String,
    pub request_name: Option<String>,
    pub run_all: bool,
    pub environment: Option<String>,
    pub variables: Vec<String>,
}
