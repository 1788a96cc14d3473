use crate::body::{EncodedBody, MultipartValue};
use crate::http_method::HttpMethod;
use crate::logger::Logger;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::time::{Duration, Instant};

/// Everything the transport needs to issue one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: EncodedBody,
}

impl PreparedRequest {
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
    /// From dispatch until the status line and headers arrived; excludes reading the body.
    pub elapsed: Duration,
}

impl TransportResponse {
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(crate::content_type::HEADER))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    InvalidUrl { url: String, message: String },
    Request(String),
    Body(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::InvalidUrl { url, message } => {
                write!(f, "Invalid URL '{url}': {message}")
            }
            TransportError::Request(message) => write!(f, "Request failed: {message}"),
            TransportError::Body(message) => write!(f, "Failed to read response body: {message}"),
        }
    }
}

impl std::error::Error for TransportError {}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        TransportError::Request(error.to_string())
    }
}

pub type TransportFuture<'a> =
    Pin<Box<dyn Future<Output = Result<TransportResponse, TransportError>> + Send + 'a>>;

pub trait Transport: Send + Sync {
    fn send<'a>(&'a self, request: PreparedRequest) -> TransportFuture<'a>;
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn send<'a>(&'a self, request: PreparedRequest) -> TransportFuture<'a> {
        (**self).send(request)
    }
}

pub struct ReqwestTransport {
    client: reqwest::Client,
    user_agent: Option<String>,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            user_agent: None,
        }
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    fn build(&self, request: PreparedRequest) -> Result<reqwest::RequestBuilder, TransportError> {
        let url = reqwest::Url::parse(&request.url).map_err(|e| TransportError::InvalidUrl {
            url: request.url.clone(),
            message: e.to_string(),
        })?;

        let mut req_builder = self.client.request(request.method.to_reqwest_method(), url);

        if let Some(user_agent) = &self.user_agent {
            req_builder = req_builder.header(reqwest::header::USER_AGENT, user_agent);
        }

        for (key, value) in &request.headers {
            Logger::debug(&format!("Adding header: {key}: {value}"));
            req_builder = req_builder.header(key, value);
        }

        req_builder = match request.body {
            EncodedBody::None => req_builder,
            EncodedBody::Json(text) => req_builder.body(text),
            EncodedBody::UrlEncoded(pairs) => req_builder.form(&pairs),
            EncodedBody::Multipart(fields) => {
                let mut form = reqwest::multipart::Form::new();
                for field in fields {
                    form = match field.value {
                        MultipartValue::Text(text) => form.text(field.name, text),
                        MultipartValue::File(file) => form.part(
                            field.name,
                            reqwest::multipart::Part::bytes(file.bytes).file_name(file.filename),
                        ),
                    };
                }
                req_builder.multipart(form)
            }
        };

        Ok(req_builder)
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for ReqwestTransport {
    fn send<'a>(&'a self, request: PreparedRequest) -> TransportFuture<'a> {
        Box::pin(async move {
            Logger::debug(&format!(
                "Executing {} request to URL: {}",
                request.method.as_str(),
                request.url
            ));
            let req_builder = self.build(request)?;
            let start = Instant::now();
            let response = req_builder.send().await?;
            let elapsed = start.elapsed();

            let status = response.status();
            let mut headers = Vec::new();
            for (key, value) in response.headers() {
                if let Ok(value_str) = value.to_str() {
                    headers.push((key.to_string(), value_str.to_string()));
                }
            }

            let body = response
                .text()
                .await
                .map_err(|e| TransportError::Body(e.to_string()))?;

            Ok(TransportResponse {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
                headers,
                body,
                elapsed,
            })
        })
    }
}
