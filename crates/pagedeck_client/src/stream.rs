//! Single-request, multi-response streaming exchanges.
//!
//! An exchange opens a duplex session, sends exactly one request message, and
//! collects every response message until the remote side closes the session:
//!
//! ```text
//! Idle -> Opening -> AwaitingResponses -> Closed
//!    \________\_____________\___________-> Errored
//! ```
//!
//! Malformed messages are audited and skipped; they never end the session.
//! A transport error ends it, but messages collected so far are still
//! returned.

use pagedeck_core::AuditLog;
use pagedeck_error::{StreamError, StreamErrorKind};
use serde_json::Value;
use tracing::{debug, error, info, instrument, trace, warn};

/// One inbound frame from a duplex session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Text payload
    Text(String),
    /// Binary payload
    Binary(Vec<u8>),
    /// The remote side closed the session
    Close,
    /// Ping/pong and other control traffic
    Control,
}

/// An open duplex session.
#[async_trait::async_trait]
pub trait Channel: Send {
    /// Send one text message.
    async fn send_text(&mut self, text: String) -> Result<(), StreamError>;

    /// Await the next frame. `None` means the stream ended.
    async fn next_frame(&mut self) -> Option<Result<Frame, StreamError>>;
}

/// Opens duplex sessions to an endpoint.
#[async_trait::async_trait]
pub trait Connector: Send + Sync {
    /// Connect to `url`.
    async fn connect(&self, url: &str) -> Result<Box<dyn Channel>, StreamError>;
}

/// Lifecycle of a [`StreamExchange`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExchangeState {
    /// Not started
    Idle,
    /// Connecting
    Opening,
    /// Request sent, collecting responses
    AwaitingResponses,
    /// Remote side closed the session
    Closed,
    /// A transport error ended the session
    Errored,
}

impl ExchangeState {
    fn is_terminal(self) -> bool {
        matches!(self, Self::Closed | Self::Errored)
    }
}

/// Everything an exchange produced.
#[derive(Debug, Clone)]
pub struct ExchangeOutcome {
    /// Successfully parsed messages, in arrival order
    pub messages: Vec<Value>,
    /// Transport error that ended the session, if any
    pub error: Option<StreamError>,
    /// State the exchange finished in
    pub state: ExchangeState,
}

impl ExchangeOutcome {
    /// No usable message arrived.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// One streaming exchange against a fixed endpoint.
///
/// Audit steps are derived from `step`: `{step}_request`, `{step}_response`
/// and `{step}_error`.
pub struct StreamExchange<'a> {
    connector: &'a dyn Connector,
    endpoint: &'a str,
    step: &'a str,
    state: ExchangeState,
}

impl<'a> StreamExchange<'a> {
    /// Prepare an exchange; nothing is opened until [`run`](Self::run).
    pub fn new(connector: &'a dyn Connector, endpoint: &'a str, step: &'a str) -> Self {
        Self {
            connector,
            endpoint,
            step,
            state: ExchangeState::Idle,
        }
    }

    /// Current state.
    pub fn state(&self) -> ExchangeState {
        self.state
    }

    fn transition(&mut self, next: ExchangeState) {
        debug_assert!(
            !self.state.is_terminal(),
            "transition out of terminal state {:?}",
            self.state
        );
        trace!(step = self.step, from = ?self.state, to = ?next, "exchange transition");
        self.state = next;
    }

    fn fail(&mut self, audit: &mut AuditLog, err: StreamError) -> StreamError {
        error!(step = self.step, error = %err, "Streaming exchange failed");
        audit.record_failure(format!("{}_error", self.step), Value::Null, err.kind.to_string());
        self.transition(ExchangeState::Errored);
        err
    }

    /// Send `request` and collect responses until the remote side closes.
    ///
    /// Waits for natural completion; there is no timeout or cancellation.
    #[instrument(skip(self, request, audit), fields(step = self.step, endpoint = self.endpoint))]
    pub async fn run(mut self, request: &Value, audit: &mut AuditLog) -> ExchangeOutcome {
        let mut messages = Vec::new();
        audit.record_success(format!("{}_request", self.step), redact(request));

        let payload = match serde_json::to_string(request) {
            Ok(payload) => payload,
            Err(e) => {
                let err = self.fail(audit, StreamError::new(StreamErrorKind::Serialize(e.to_string())));
                return self.finish(messages, Some(err));
            }
        };

        self.transition(ExchangeState::Opening);
        let mut channel = match self.connector.connect(self.endpoint).await {
            Ok(channel) => channel,
            Err(e) => {
                let err = self.fail(audit, e);
                return self.finish(messages, Some(err));
            }
        };

        self.transition(ExchangeState::AwaitingResponses);
        debug!(bytes = payload.len(), "Sending request message");
        if let Err(e) = channel.send_text(payload).await {
            let err = self.fail(audit, e);
            return self.finish(messages, Some(err));
        }

        let response_step = format!("{}_response", self.step);
        while let Some(frame) = channel.next_frame().await {
            let text = match frame {
                Ok(Frame::Text(text)) => text,
                Ok(Frame::Binary(bytes)) => match String::from_utf8(bytes) {
                    Ok(text) => text,
                    Err(e) => {
                        warn!(step = self.step, "Binary message is not UTF-8");
                        audit.record_failure(&response_step, Value::Null, e.to_string());
                        continue;
                    }
                },
                Ok(Frame::Close) => break,
                Ok(Frame::Control) => continue,
                Err(e) => {
                    let err = self.fail(audit, e);
                    return self.finish(messages, Some(err));
                }
            };

            trace!(step = self.step, "Received message: {}", text);
            match serde_json::from_str::<Value>(&text) {
                Ok(message) => {
                    audit.record_success(&response_step, message.clone());
                    messages.push(message);
                }
                Err(e) => {
                    warn!(step = self.step, error = %e, "JSON decode error in streamed message");
                    audit.record_failure(
                        &response_step,
                        Value::Null,
                        format!("JSON Decode Error: {}", e),
                    );
                }
            }
        }

        self.transition(ExchangeState::Closed);
        info!(step = self.step, count = messages.len(), "Streaming exchange closed");
        self.finish(messages, None)
    }

    fn finish(self, messages: Vec<Value>, error: Option<StreamError>) -> ExchangeOutcome {
        if messages.is_empty() {
            warn!(step = self.step, "No response messages received");
        }
        ExchangeOutcome {
            messages,
            error,
            state: self.state,
        }
    }
}

/// Copy of a request with the bearer token masked, for the audit log.
fn redact(request: &Value) -> Value {
    let mut copy = request.clone();
    if let Some(token) = copy.get_mut("auth_token") {
        if !token.is_null() {
            *token = Value::String("***".to_string());
        }
    }
    copy
}
