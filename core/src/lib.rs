//! Blocking client for the configuration portal's OpenAPI.
//!
//! # Overview
//! Manages applications, namespaces, items and releases across
//! environments and clusters. Each operation is one authenticated HTTP
//! round trip whose JSON answer is decoded into a typed result.
//!
//! # Design
//! - `OpenApiClient` is immutable after construction; it holds the
//!   normalized base address, the token and its `ClientOptions`.
//! - Every operation goes through one executor that serializes, attaches
//!   headers, dispatches through a pluggable `Transport`, maps non-200
//!   statuses and decodes the body.
//! - `UreqTransport` is the default; any closure with the right signature
//!   can stand in for it.
//! - No retries, caching or timeouts beyond what the transport provides.

pub mod client;
pub mod error;
pub mod http;
mod operations;
pub mod options;
pub mod status;
pub mod transport;
pub mod types;

pub use client::{normalize_address, normalize_namespace, OpenApiClient};
pub use error::{ApiError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use options::{console_logger, tracing_logger, ClientOptions, Logger};
pub use status::error_message;
pub use transport::{Transport, UreqTransport};
pub use types::{
    AddItemRequest, App, AppNamespace, CreateNamespaceRequest, EnvWithClusters, Format, Item,
    Namespace, NamespaceLock, PublishReleaseRequest, Release, UpdateItemRequest,
};
