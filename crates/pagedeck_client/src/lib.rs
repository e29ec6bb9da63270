//! Clients for the Alai presentation service.
//!
//! # Architecture
//!
//! - [`HttpTransport`] - seam over plain request/response HTTP; [`ReqwestTransport`]
//!   is the production implementation
//! - [`ApiClient`] - the remote call layer: auth headers, status policy,
//!   JSON parsing and one audit entry per call
//! - [`AlaiApi`] - typed operations (authenticate, create presentation, ...)
//! - [`Connector`] / [`Channel`] - seam over duplex message sessions;
//!   [`WsConnector`] opens WebSockets through tokio-tungstenite
//! - [`StreamExchange`] - single-request, multi-response session state machine

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod alai;
mod api;
pub mod endpoints;
mod stream;
mod tls;
mod transport;
mod ws;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use alai::{AlaiApi, Credentials, DEFAULT_THEME_ID};
pub use api::{ApiClient, ApiResponse, Auth};
pub use stream::{Channel, Connector, ExchangeOutcome, ExchangeState, Frame, StreamExchange};
pub use tls::insecure_client_config;
pub use transport::{
    ApiRequest, FilePart, HttpTransport, Method, RawResponse, RequestBody, ResponseFormat,
    ReqwestTransport,
};
pub use ws::WsConnector;
