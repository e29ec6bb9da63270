//! WebSocket connector built on tokio-tungstenite.

use crate::{Channel, Connector, Frame};
use futures_util::{SinkExt, StreamExt};
use pagedeck_error::{StreamError, StreamErrorKind};
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio_tungstenite::{
    Connector as TlsConnector, MaybeTlsStream, WebSocketStream, connect_async_tls_with_config,
    tungstenite::Message,
};
use tracing::{debug, error, instrument, warn};

/// Opens `wss://` sessions.
///
/// Certificate validation is on unless `accept_invalid_certs` is set, which
/// is only meant for deployments whose certificate does not chain to a
/// public root.
#[derive(Debug, Clone, Default)]
pub struct WsConnector {
    accept_invalid_certs: bool,
}

impl WsConnector {
    /// Connector with full certificate validation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Connector with certificate validation disabled when `accept` is true.
    pub fn accept_invalid_certs(accept: bool) -> Self {
        if accept {
            warn!("TLS certificate validation disabled for streaming connections");
        }
        Self {
            accept_invalid_certs: accept,
        }
    }
}

#[async_trait::async_trait]
impl Connector for WsConnector {
    #[instrument(skip(self))]
    async fn connect(&self, url: &str) -> Result<Box<dyn Channel>, StreamError> {
        let tls = if self.accept_invalid_certs {
            Some(TlsConnector::Rustls(Arc::new(crate::insecure_client_config()?)))
        } else {
            None
        };

        let (stream, _response) = connect_async_tls_with_config(url, None, false, tls)
            .await
            .map_err(|e| {
                error!("WebSocket connection failed: {}", e);
                StreamError::new(StreamErrorKind::Connect(e.to_string()))
            })?;

        debug!("WebSocket connection established");
        Ok(Box::new(WsChannel { stream }))
    }
}

struct WsChannel {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait::async_trait]
impl Channel for WsChannel {
    async fn send_text(&mut self, text: String) -> Result<(), StreamError> {
        self.stream
            .send(Message::Text(text.into()))
            .await
            .map_err(|e| StreamError::new(StreamErrorKind::Send(e.to_string())))
    }

    async fn next_frame(&mut self) -> Option<Result<Frame, StreamError>> {
        let message = match self.stream.next().await? {
            Ok(message) => message,
            Err(e) => {
                return Some(Err(StreamError::new(StreamErrorKind::Receive(
                    e.to_string(),
                ))));
            }
        };

        Some(Ok(match message {
            Message::Text(text) => Frame::Text(text.as_str().to_owned()),
            Message::Binary(bytes) => Frame::Binary(bytes.to_vec()),
            Message::Close(_) => Frame::Close,
            Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => Frame::Control,
        }))
    }
}
