//! The remote call layer.
//!
//! Every call goes through [`ApiClient::call`], which attaches credentials,
//! applies the status policy (anything but 200 is a failure), interprets the
//! body, and appends exactly one entry to the audit log before returning.

use crate::{ApiRequest, HttpTransport, RawResponse, ResponseFormat};
use pagedeck_core::AuditLog;
use pagedeck_error::{ApiError, ApiErrorKind};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, error, instrument};

/// Credentials attached to a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Auth<'a> {
    /// Unauthenticated
    None,
    /// `ApiKey` header; only the token endpoint takes this
    ApiKey(&'a str),
    /// `Authorization: Bearer` header
    Bearer(&'a str),
}

/// Interpreted response of a successful call.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// HTTP status code (always 200 when returned from `call`)
    pub status: u16,
    /// Parsed body; `{}` when empty, a string for text responses
    pub body: Value,
    /// Raw body text
    pub text: String,
}

/// Uniform wrapper around an [`HttpTransport`].
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn HttpTransport>,
}

impl ApiClient {
    /// Create a client over `transport`.
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    /// Perform one call and record it under `step`.
    ///
    /// `accept` inspects a 200 response and either extracts the value the
    /// caller needs or rejects the response with a domain message. Rejections
    /// are audited as failures carrying the response body.
    #[instrument(skip(self, audit, auth, request, accept), fields(url = %request.url))]
    pub async fn call<T, F>(
        &self,
        audit: &mut AuditLog,
        step: &str,
        auth: Auth<'_>,
        request: ApiRequest,
        accept: F,
    ) -> Result<T, ApiError>
    where
        F: FnOnce(&ApiResponse) -> Result<T, String>,
    {
        let request = match auth {
            Auth::None => request,
            Auth::ApiKey(key) => request.header("ApiKey", key),
            Auth::Bearer(token) => request.header("Authorization", format!("Bearer {}", token)),
        };
        let format = request.format;

        let raw = match self.transport.execute(request).await {
            Ok(raw) => raw,
            Err(e) => {
                let kind = ApiErrorKind::Transport(e.message.clone());
                error!(step, error = %e, "Request failed");
                audit.record_failure(step, Value::Null, format!("Exception during {}: {}", step, e.message));
                return Err(ApiError::new(step, kind));
            }
        };

        let text = raw.text();
        let parsed = interpret(&raw, format);

        if raw.status != 200 {
            let kind = ApiErrorKind::Status {
                status: raw.status,
                body: text,
            };
            error!(step, status = raw.status, "Call rejected: {}", kind);
            audit.record_failure(step, parsed.unwrap_or(Value::Null), kind.to_string());
            return Err(ApiError::new(step, kind));
        }

        let body = match parsed {
            Ok(body) => body,
            Err(message) => {
                let kind = ApiErrorKind::Parse(message);
                error!(step, "Unparseable body: {}", kind);
                audit.record_failure(step, Value::Null, kind.to_string());
                return Err(ApiError::new(step, kind));
            }
        };

        let response = ApiResponse {
            status: raw.status,
            body,
            text,
        };

        match accept(&response) {
            Ok(value) => {
                debug!(step, "Call succeeded");
                audit.record_success(step, response.body);
                Ok(value)
            }
            Err(message) => {
                error!(step, "{}", message);
                audit.record_failure(step, response.body, message.clone());
                Err(ApiError::new(step, ApiErrorKind::Rejected(message)))
            }
        }
    }

    /// [`call`](Self::call) that keeps the parsed body as-is.
    pub async fn call_json(
        &self,
        audit: &mut AuditLog,
        step: &str,
        auth: Auth<'_>,
        request: ApiRequest,
    ) -> Result<Value, ApiError> {
        self.call(audit, step, auth, request, |r| Ok(r.body.clone()))
            .await
    }
}

fn interpret(raw: &RawResponse, format: ResponseFormat) -> Result<Value, String> {
    match format {
        ResponseFormat::Text => Ok(Value::String(
            raw.text().trim().trim_matches('"').to_string(),
        )),
        ResponseFormat::Json if raw.body.iter().all(u8::is_ascii_whitespace) => {
            Ok(Value::Object(Map::new()))
        }
        ResponseFormat::Json => serde_json::from_slice(&raw.body).map_err(|e| e.to_string()),
    }
}
