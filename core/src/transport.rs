//! Transport Invoker: one synchronous network round trip per call.
//!
//! # Design
//! The client never talks to the network directly. It hands a finished
//! `HttpRequest` to a `Transport`, which returns the status code and the
//! whole body, or a `TransportError`. Closures implement the trait so tests
//! can swap in stubs without defining a type.

use std::io::Read as _;
use std::time::Duration;

use crate::error::TransportError;
use crate::http::{HttpRequest, HttpResponse};

/// Executes exactly one HTTP exchange.
///
/// Implementations must not retry and must report non-2xx statuses as data,
/// leaving status interpretation to the client.
pub trait Transport: Send + Sync {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<F> Transport for F
where
    F: Fn(&HttpRequest) -> Result<HttpResponse, TransportError> + Send + Sync,
{
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self(request)
    }
}

/// Default blocking transport backed by [`ureq`].
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    /// A transport with no timeout: a stalled peer stalls the call.
    pub fn new() -> Self {
        Self::build(None)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::build(Some(timeout))
    }

    /// Wraps an existing agent. Agents that report statuses as errors still
    /// yield the status, without a body.
    pub fn from_agent(agent: ureq::Agent) -> Self {
        Self { agent }
    }

    fn build(timeout: Option<Duration>) -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(timeout)
            // Status codes are interpreted by the client, not by ureq.
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = http::Request::builder()
            .method(request.method.as_str())
            .uri(request.url.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let result = match &request.body {
            Some(body) => {
                let req = builder
                    .body(body.clone().into_bytes())
                    .map_err(|e| TransportError::Other(Box::new(e)))?;
                self.agent.run(req)
            }
            None => {
                let req = builder
                    .body(())
                    .map_err(|e| TransportError::Other(Box::new(e)))?;
                self.agent.run(req)
            }
        };

        match result {
            Ok(response) => read_response(response),
            Err(ureq::Error::StatusCode(status)) => Ok(HttpResponse {
                status,
                body: Vec::new(),
            }),
            Err(ureq::Error::Timeout(_)) => Err(TransportError::Timeout),
            Err(ureq::Error::HostNotFound) => {
                Err(TransportError::Connection("host not found".to_owned()))
            }
            Err(ureq::Error::Io(e)) => Err(TransportError::Connection(e.to_string())),
            Err(e) => Err(TransportError::Other(Box::new(e))),
        }
    }
}

/// Drain the body into memory. The response is dropped on every path,
/// which releases the connection back to the agent or closes it.
fn read_response(response: http::Response<ureq::Body>) -> Result<HttpResponse, TransportError> {
    let (parts, body) = response.into_parts();

    let mut bytes = Vec::new();
    body.into_reader()
        .read_to_end(&mut bytes)
        .map_err(|e| TransportError::Body(e.to_string()))?;

    Ok(HttpResponse {
        status: parts.status.as_u16(),
        body: bytes,
    })
}
