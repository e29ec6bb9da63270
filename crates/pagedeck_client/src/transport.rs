//! Plain request/response HTTP behind a trait seam.

use pagedeck_error::HttpError;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, instrument};

/// HTTP verbs used by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET
    Get,
    /// POST
    Post,
}

/// One file in a multipart upload.
#[derive(Debug, Clone, PartialEq)]
pub struct FilePart {
    /// Form field name
    pub field: String,
    /// File name reported to the server
    pub file_name: String,
    /// MIME type
    pub mime: String,
    /// File contents
    pub bytes: Vec<u8>,
}

/// Request payload.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestBody {
    /// No body
    #[default]
    Empty,
    /// JSON document
    Json(Value),
    /// multipart/form-data with files and text fields
    Multipart {
        /// File parts
        files: Vec<FilePart>,
        /// Text fields
        fields: Vec<(String, String)>,
    },
}

/// How a successful body should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseFormat {
    /// Parse as JSON; an empty body is `{}`
    #[default]
    Json,
    /// Keep as text, stripped of surrounding whitespace and quotes
    Text,
}

/// A fully described outbound request.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// HTTP verb
    pub method: Method,
    /// Absolute URL
    pub url: String,
    /// Extra headers
    pub headers: Vec<(String, String)>,
    /// Payload
    pub body: RequestBody,
    /// Per-request timeout; `None` relies on the client default
    pub timeout: Option<Duration>,
    /// Body interpretation for the caller
    pub format: ResponseFormat,
}

impl ApiRequest {
    /// GET request without a body.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            headers: Vec::new(),
            body: RequestBody::Empty,
            timeout: None,
            format: ResponseFormat::Json,
        }
    }

    /// POST request with a JSON body.
    pub fn post_json(url: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Post,
            body: RequestBody::Json(body),
            ..Self::get(url)
        }
    }

    /// POST request with a multipart body.
    pub fn post_multipart(
        url: impl Into<String>,
        files: Vec<FilePart>,
        fields: Vec<(String, String)>,
    ) -> Self {
        Self {
            method: Method::Post,
            body: RequestBody::Multipart { files, fields },
            ..Self::get(url)
        }
    }

    /// Add a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Bound the whole request by `timeout`.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Interpret the response body as text.
    pub fn text_response(mut self) -> Self {
        self.format = ResponseFormat::Text;
        self
    }

    /// Value of a header, if present (case-insensitive).
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Status and raw body of a completed request.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    /// HTTP status code
    pub status: u16,
    /// Body bytes
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Build a response from a status and body.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Body as (lossy) UTF-8 text.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Executes requests. Implementations only fail when no status line was
/// received; status policy belongs to the caller.
#[async_trait::async_trait]
pub trait HttpTransport: Send + Sync {
    /// Perform the request.
    async fn execute(&self, request: ApiRequest) -> Result<RawResponse, HttpError>;
}

/// reqwest-backed transport.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a transport with a default reqwest client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl HttpTransport for ReqwestTransport {
    #[instrument(skip(self, request), fields(method = ?request.method, url = %request.url))]
    async fn execute(&self, request: ApiRequest) -> Result<RawResponse, HttpError> {
        let url = request.url.clone();
        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
        };

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(body) => builder.json(&body),
            RequestBody::Multipart { files, fields } => {
                let mut form = reqwest::multipart::Form::new();
                for (name, value) in fields {
                    form = form.text(name, value);
                }
                for file in files {
                    let part = reqwest::multipart::Part::bytes(file.bytes)
                        .file_name(file.file_name)
                        .mime_str(&file.mime)
                        .map_err(|e| HttpError::new(&url, format!("Invalid MIME type: {}", e)))?;
                    form = form.part(file.field, part);
                }
                builder.multipart(form)
            }
        };

        let response = builder.send().await.map_err(|e| {
            error!(error = %e, "Request failed");
            HttpError::new(&url, e.to_string())
        })?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|e| {
            error!(error = %e, status, "Failed to read response body");
            HttpError::new(&url, format!("Failed to read body: {}", e))
        })?;

        debug!(status, bytes = body.len(), "Received response");
        Ok(RawResponse::new(status, body.to_vec()))
    }
}
