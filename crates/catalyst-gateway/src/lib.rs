//! Entry-point adapter for the Catalyst features API on AWS Lambda.
//!
//! This crate turns API-gateway trigger events into a single canonical
//! request, routes it by URL path to one of a fixed set of handlers, and
//! wraps the result in the response envelope the gateway expects:
//!
//! - [`EventNormalizer`]: one normalizer per supported [`EventShape`]
//! - [`PathRouter`]: `{prefix}/{collection}/items/{extensions}` and
//!   `{prefix}/latest-collections[/{collection}]`
//! - [`resolve`] / [`FeaturesBackend`]: static dispatch table and the seam
//!   to the domain layer
//! - [`build_envelope`]: status, headers and body encoding
//! - [`Gateway`]: the per-invocation state machine tying these together
//! - [`init_tracing`]: JSON-formatted tracing for CloudWatch Logs
//!
//! # Testing Support
//!
//! The [`test_utils`] module provides sample events and collaborator
//! doubles. Enable the `test-utils` feature to access it from dependent
//! crates.

#![deny(warnings)]

mod config;
mod dispatch;
mod envelope;
mod error;
mod events;
mod gateway;
mod request;
mod router;
mod tracing_init;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::{
    GatewayConfig, DEFAULT_ROUTE_PREFIX, ENV_BASE_URL, ENV_BODY_ENCODING, ENV_EVENT_SHAPE,
    ENV_EXTENSION_SEPARATOR, ENV_ROUTE_PREFIX,
};
pub use dispatch::{invoke, resolve, DispatchEntry, FeaturesBackend, QueryFunc, SchemaId};
pub use envelope::{build_envelope, default_headers, BodyEncoding, ResponseEnvelope};
pub use error::{
    handle_error, BoxError, ConfigError, DomainError, GatewayError, GENERIC_ERROR_MESSAGE,
    JSON_CONTENT_TYPE,
};
pub use events::{
    strip_platform_headers, CustomPathNormalizer, EventNormalizer, EventShape, NormalizeEvent,
    ResourceTemplateNormalizer, SimpleProxyNormalizer, PLATFORM_HEADER_DENYLIST,
};
pub use gateway::{Gateway, PreparedRequest, Stage};
pub use request::{CanonicalRequest, COLLECTION_PARAM, TRANSIENT_ROUTE_PARAM};
pub use router::{
    Extension, PathRouter, RouteDescriptor, RouteKey, RouteMatch, RouteOutcome, Separator,
    BASE_LITERAL, ITEMS_SEGMENT, LATEST_COLLECTIONS_SEGMENT,
};
pub use tracing_init::{init_tracing, invocation_span, INVOCATION_SPAN};
