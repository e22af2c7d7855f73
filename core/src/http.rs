//! HTTP envelopes exchanged between the executor and a [`Transport`].
//!
//! # Design
//! Requests and responses are plain data. The executor builds an
//! `HttpRequest`, hands it to the configured transport, and consumes the
//! resulting `HttpResponse` immediately. Owned fields keep both envelopes
//! free of lifetimes so stub transports can record them for later
//! inspection.
//!
//! [`Transport`]: crate::transport::Transport

use std::fmt;

/// Header carrying the portal token, sent verbatim with no scheme prefix.
pub const AUTHORIZATION: &str = "Authorization";

pub const CONTENT_TYPE: &str = "Content-Type";

/// Every request declares a UTF-8 JSON body, even when no body is sent.
pub const JSON_CONTENT_TYPE: &str = "application/json;charset=UTF-8";

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully formed outbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// Case-insensitive header lookup; returns the first match.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Status code and raw body bytes of one round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}
