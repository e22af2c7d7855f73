//! The configured client and its operation executor.
//!
//! # Design
//! `OpenApiClient` holds only the normalized base address, the token, and the
//! options it was built with. Every public operation formats a URL and calls
//! [`OpenApiClient::call`] or [`OpenApiClient::call_no_content`], which share
//! one pipeline:
//!
//! 1. serialize the optional payload,
//! 2. build the request with the token and content-type headers,
//! 3. dispatch it through the transport,
//! 4. map any non-200 status through [`error_message`],
//! 5. decode the body when the caller wants a value.
//!
//! When debug is on, a [`DebugTrace`] guard created before step 1 emits
//! exactly one line as it drops, whichever step ended the call.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug_span;
use url::Url;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, AUTHORIZATION, CONTENT_TYPE, JSON_CONTENT_TYPE};
use crate::options::{ClientOptions, Logger};
use crate::status::error_message;

/// Typed `None` for operations that send no body.
pub(crate) const NO_BODY: Option<&()> = None;

/// Client for the portal's OpenAPI.
///
/// Stateless between calls, so a single instance (or its clones) can be used
/// from many threads at once.
#[derive(Debug, Clone)]
pub struct OpenApiClient {
    base_address: String,
    token: String,
    options: ClientOptions,
}

impl OpenApiClient {
    /// A client with the default `ureq` transport and debug disabled.
    pub fn new(address: &str, token: &str) -> Self {
        Self::with_options(address, token, ClientOptions::default())
    }

    pub fn with_options(address: &str, token: &str, options: ClientOptions) -> Self {
        Self {
            base_address: normalize_address(address),
            token: token.to_string(),
            options,
        }
    }

    pub fn base_address(&self) -> &str {
        &self.base_address
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// `{base}/openapi/v1/{path}`.
    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}/openapi/v1/{path}", self.base_address)
    }

    /// Run the pipeline and decode a 200 body into `R`.
    pub(crate) fn call<P, R>(
        &self,
        method: HttpMethod,
        url: &str,
        payload: Option<&P>,
    ) -> Result<R, ApiError>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.execute(method, url, payload, |body| {
            serde_json::from_slice(body).map_err(ApiError::Deserialization)
        })
    }

    /// Run the pipeline and ignore the body of a 200 response.
    pub(crate) fn call_no_content<P>(
        &self,
        method: HttpMethod,
        url: &str,
        payload: Option<&P>,
    ) -> Result<(), ApiError>
    where
        P: Serialize + ?Sized,
    {
        self.execute(method, url, payload, |_| Ok(()))
    }

    fn execute<P, R, D>(
        &self,
        method: HttpMethod,
        url: &str,
        payload: Option<&P>,
        decode: D,
    ) -> Result<R, ApiError>
    where
        P: Serialize + ?Sized,
        D: FnOnce(&[u8]) -> Result<R, ApiError>,
    {
        let span = debug_span!("openapi.request", method = %method, url);
        let _entered = span.enter();

        let mut trace = DebugTrace::new(&self.options, method, url);

        let body = match payload {
            Some(payload) => {
                let encoded = serde_json::to_string(payload).map_err(ApiError::Serialization)?;
                trace.request_body.clone_from(&encoded);
                Some(encoded)
            }
            None => None,
        };

        let request = self.new_request(method, url, body)?;
        let response = self.options.transport.execute(&request)?;
        trace.response_body = response.body;

        if response.status != 200 {
            return Err(ApiError::Status {
                status: response.status,
                message: error_message(response.status).into_owned(),
            });
        }

        decode(&trace.response_body)
    }

    fn new_request(
        &self,
        method: HttpMethod,
        url: &str,
        body: Option<String>,
    ) -> Result<HttpRequest, ApiError> {
        // Spaces and non-ASCII characters in path parameters are percent-encoded here.
        let parsed = Url::parse(url)
            .map_err(|e| ApiError::RequestConstruction(format!("{url}: {e}")))?;
        if parsed.host_str().is_none() {
            return Err(ApiError::RequestConstruction(format!(
                "{url}: URL has no host"
            )));
        }

        Ok(HttpRequest {
            method,
            url: parsed.into(),
            headers: vec![
                (AUTHORIZATION.to_string(), self.token.clone()),
                (CONTENT_TYPE.to_string(), JSON_CONTENT_TYPE.to_string()),
            ],
            body,
        })
    }
}

/// Emits the debug line for one call when dropped.
///
/// Fields not reached before a failure stay empty.
struct DebugTrace<'a> {
    logger: Option<&'a Logger>,
    method: HttpMethod,
    url: &'a str,
    request_body: String,
    response_body: Vec<u8>,
}

impl<'a> DebugTrace<'a> {
    fn new(options: &'a ClientOptions, method: HttpMethod, url: &'a str) -> Self {
        Self {
            logger: options.debug.then_some(&options.logger),
            method,
            url,
            request_body: String::new(),
            response_body: Vec::new(),
        }
    }
}

impl Drop for DebugTrace<'_> {
    fn drop(&mut self) {
        if let Some(logger) = self.logger {
            logger(&format!(
                "Method: {}, URL: {}, Request body: {}, Response body: {}",
                self.method,
                self.url,
                self.request_body,
                String::from_utf8_lossy(&self.response_body),
            ));
        }
    }
}

/// Prefix `http://` when the address has no scheme and strip trailing `/`.
///
/// Idempotent: `normalize_address(&normalize_address(x)) == normalize_address(x)`.
pub fn normalize_address(address: &str) -> String {
    let (scheme, rest) = if let Some(rest) = address.strip_prefix("http://") {
        ("http://", rest)
    } else if let Some(rest) = address.strip_prefix("https://") {
        ("https://", rest)
    } else {
        ("http://", address)
    };
    format!("{scheme}{}", rest.trim_end_matches('/'))
}

/// Strip one trailing `.properties`; properties is the implied format in URLs.
///
/// A bare `.properties` becomes the empty string.
pub fn normalize_namespace(name: &str) -> &str {
    name.strip_suffix(".properties").unwrap_or(name)
}
