//! Scripted doubles for [`HttpTransport`] and [`Connector`].
//!
//! Used by this workspace's tests to drive the call layer and streaming
//! exchanges without a network.

use crate::{ApiRequest, Channel, Connector, Frame, HttpTransport, Method, RawResponse};
use pagedeck_error::{HttpError, StreamError, StreamErrorKind};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

struct Route {
    method: Method,
    fragment: String,
    responses: VecDeque<Result<RawResponse, HttpError>>,
}

/// Transport answering from a route table keyed by method and URL fragment.
///
/// Each route replays its queued responses in order; the last one repeats.
/// Unmatched requests get a 404.
#[derive(Clone, Default)]
pub struct MockTransport {
    routes: Arc<Mutex<Vec<Route>>>,
    requests: Arc<Mutex<Vec<ApiRequest>>>,
}

impl MockTransport {
    /// Empty route table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for requests whose URL contains `fragment`.
    pub fn respond(
        &self,
        method: Method,
        fragment: &str,
        status: u16,
        body: impl Into<Vec<u8>>,
    ) -> &Self {
        self.push(method, fragment, Ok(RawResponse::new(status, body)))
    }

    /// Queue a transport failure for requests whose URL contains `fragment`.
    pub fn fail(&self, method: Method, fragment: &str, message: &str) -> &Self {
        self.push(method, fragment, Err(HttpError::new(fragment, message)))
    }

    fn push(
        &self,
        method: Method,
        fragment: &str,
        response: Result<RawResponse, HttpError>,
    ) -> &Self {
        let mut routes = self.routes.lock().expect("routes lock poisoned");
        match routes
            .iter_mut()
            .find(|r| r.method == method && r.fragment == fragment)
        {
            Some(route) => route.responses.push_back(response),
            None => routes.push(Route {
                method,
                fragment: fragment.to_string(),
                responses: VecDeque::from([response]),
            }),
        }
        self
    }

    /// Every request executed so far.
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().expect("requests lock poisoned").clone()
    }

    /// Requests whose URL contains `fragment`.
    pub fn requests_to(&self, fragment: &str) -> Vec<ApiRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.url.contains(fragment))
            .collect()
    }
}

#[async_trait::async_trait]
impl HttpTransport for MockTransport {
    async fn execute(&self, request: ApiRequest) -> Result<RawResponse, HttpError> {
        self.requests
            .lock()
            .expect("requests lock poisoned")
            .push(request.clone());

        let mut routes = self.routes.lock().expect("routes lock poisoned");
        let route = routes
            .iter_mut()
            .find(|r| r.method == request.method && request.url.contains(&r.fragment));

        match route {
            Some(route) if route.responses.len() > 1 => route
                .responses
                .pop_front()
                .unwrap_or_else(|| Ok(RawResponse::new(500, "empty route"))),
            Some(route) => route
                .responses
                .front()
                .cloned()
                .unwrap_or_else(|| Ok(RawResponse::new(500, "empty route"))),
            None => Ok(RawResponse::new(404, format!("no route for {}", request.url))),
        }
    }
}

/// One scripted session: either a connect failure or a frame sequence.
#[derive(Debug, Clone)]
pub enum Script {
    /// `connect` fails with this message
    Refuse(String),
    /// Frames returned in order; the stream ends after the last one
    Frames(Vec<Result<Frame, StreamError>>),
}

impl Script {
    /// Session sending each JSON value as a text frame, then closing.
    pub fn messages<I>(messages: I) -> Self
    where
        I: IntoIterator<Item = serde_json::Value>,
    {
        let mut frames: Vec<_> = messages
            .into_iter()
            .map(|m| Ok(Frame::Text(m.to_string())))
            .collect();
        frames.push(Ok(Frame::Close));
        Self::Frames(frames)
    }

    /// Session that closes without sending anything.
    pub fn empty() -> Self {
        Self::Frames(vec![Ok(Frame::Close)])
    }
}

/// Record of one opened session.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    /// Endpoint connected to
    pub url: String,
    /// Text messages the client sent
    pub sent: Vec<String>,
}

/// Connector replaying queued [`Script`]s per endpoint fragment.
///
/// Scripts for the same fragment are consumed in order; an endpoint with no
/// script left closes immediately.
#[derive(Clone, Default)]
pub struct ScriptedConnector {
    scripts: Arc<Mutex<Vec<(String, VecDeque<Script>)>>>,
    sessions: Arc<Mutex<Vec<Arc<Mutex<Session>>>>>,
}

impl ScriptedConnector {
    /// No scripts queued.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `script` for the next connection to an endpoint containing `fragment`.
    pub fn script(&self, fragment: &str, script: Script) -> &Self {
        let mut scripts = self.scripts.lock().expect("scripts lock poisoned");
        match scripts.iter_mut().find(|(f, _)| f == fragment) {
            Some((_, queue)) => queue.push_back(script),
            None => scripts.push((fragment.to_string(), VecDeque::from([script]))),
        }
        self
    }

    /// Sessions opened so far, in order.
    pub fn sessions(&self) -> Vec<Session> {
        self.sessions
            .lock()
            .expect("sessions lock poisoned")
            .iter()
            .map(|s| s.lock().expect("session lock poisoned").clone())
            .collect()
    }

    /// Sessions opened against endpoints containing `fragment`.
    pub fn sessions_to(&self, fragment: &str) -> Vec<Session> {
        self.sessions()
            .into_iter()
            .filter(|s| s.url.contains(fragment))
            .collect()
    }
}

#[async_trait::async_trait]
impl Connector for ScriptedConnector {
    async fn connect(&self, url: &str) -> Result<Box<dyn Channel>, StreamError> {
        let script = {
            let mut scripts = self.scripts.lock().expect("scripts lock poisoned");
            scripts
                .iter_mut()
                .find(|(fragment, _)| url.contains(fragment.as_str()))
                .and_then(|(_, queue)| queue.pop_front())
                .unwrap_or_else(Script::empty)
        };

        let frames = match script {
            Script::Refuse(message) => {
                return Err(StreamError::new(StreamErrorKind::Connect(message)));
            }
            Script::Frames(frames) => frames,
        };

        let session = Arc::new(Mutex::new(Session {
            url: url.to_string(),
            sent: Vec::new(),
        }));
        self.sessions
            .lock()
            .expect("sessions lock poisoned")
            .push(session.clone());

        Ok(Box::new(ScriptedChannel {
            frames: frames.into(),
            session,
        }))
    }
}

struct ScriptedChannel {
    frames: VecDeque<Result<Frame, StreamError>>,
    session: Arc<Mutex<Session>>,
}

#[async_trait::async_trait]
impl Channel for ScriptedChannel {
    async fn send_text(&mut self, text: String) -> Result<(), StreamError> {
        self.session
            .lock()
            .expect("session lock poisoned")
            .sent
            .push(text);
        Ok(())
    }

    async fn next_frame(&mut self) -> Option<Result<Frame, StreamError>> {
        self.frames.pop_front()
    }
}
