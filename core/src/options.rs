//! Client options.
//!
//! Options are fixed when the client is built and never change afterwards.

use std::fmt;
use std::sync::Arc;

use crate::transport::{Transport, UreqTransport};

/// Sink for debug trace lines.
pub type Logger = Arc<dyn Fn(&str) + Send + Sync>;

/// Prints each trace line to standard output.
pub fn console_logger() -> Logger {
    Arc::new(|line: &str| println!("{line}"))
}

/// Forwards each trace line to `tracing` at debug level.
pub fn tracing_logger() -> Logger {
    Arc::new(|line: &str| tracing::debug!(target: "apollo_openapi::trace", "{line}"))
}

/// Behavioral options for an `OpenApiClient`.
#[derive(Clone)]
pub struct ClientOptions {
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) debug: bool,
    pub(crate) logger: Logger,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            transport: Arc::new(UreqTransport::new()),
            debug: false,
            logger: console_logger(),
        }
    }
}

impl ClientOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the transport used for every round trip.
    #[must_use]
    pub fn with_transport<T: Transport + 'static>(mut self, transport: T) -> Self {
        self.transport = Arc::new(transport);
        self
    }

    /// Enables one trace line per operation with both bodies.
    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    #[must_use]
    pub fn with_logger<F>(mut self, logger: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.logger = Arc::new(logger);
        self
    }

    pub fn debug(&self) -> bool {
        self.debug
    }
}

impl fmt::Debug for ClientOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientOptions")
            .field("debug", &self.debug)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::error::TransportError;
    use crate::http::{HttpRequest, HttpResponse};

    #[test]
    fn defaults_are_silent() {
        let options = ClientOptions::default();
        assert!(!options.debug());
    }

    #[test]
    fn builder_sets_every_option() {
        let lines = Arc::new(Mutex::new(Vec::<String>::new()));
        let sink = Arc::clone(&lines);
        let options = ClientOptions::new()
            .with_debug(true)
            .with_logger(move |line| sink.lock().unwrap().push(line.to_string()))
            .with_transport(|_: &HttpRequest| -> Result<HttpResponse, TransportError> {
                Ok(HttpResponse::new(204, Vec::new()))
            });

        assert!(options.debug());
        (options.logger)("hello");
        assert_eq!(*lines.lock().unwrap(), vec!["hello".to_string()]);

        let req = HttpRequest {
            method: crate::http::HttpMethod::Get,
            url: "http://portal".to_string(),
            headers: Vec::new(),
            body: None,
        };
        assert_eq!(options.transport.execute(&req).unwrap().status, 204);
    }

    #[test]
    fn debug_output_hides_capabilities() {
        let rendered = format!("{:?}", ClientOptions::default().with_debug(true));
        assert_eq!(rendered, "ClientOptions { debug: true, .. }");
    }
}
