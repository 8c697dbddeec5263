//! Top-level entry point: raw trigger event in, response envelope out.
//!
//! ```text
//! received -> normalized -> routed -> dispatched -> enveloped
//!     \__________\_____________\___________\______-> errored
//! ```
//!
//! A routing miss renders as 404 naming the path. Every other failure
//! renders as a generic 500.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::config::GatewayConfig;
use crate::dispatch::{self, DispatchEntry, FeaturesBackend};
use crate::envelope::{build_envelope, ResponseEnvelope};
use crate::error::{handle_error, ConfigError, DomainError, GatewayError};
use crate::events::{EventNormalizer, NormalizeEvent};
use crate::request::CanonicalRequest;
use crate::router::{PathRouter, RouteMatch, RouteOutcome};

/// Processing stage of a single invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    Normalized,
    Routed,
    Dispatched,
    Enveloped,
    Errored,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Received => "received",
            Stage::Normalized => "normalized",
            Stage::Routed => "routed",
            Stage::Dispatched => "dispatched",
            Stage::Enveloped => "enveloped",
            Stage::Errored => "errored",
        };
        f.write_str(name)
    }
}

/// A request that has been normalized, routed and resolved, but not yet
/// handed to the domain layer.
#[derive(Debug, Clone, Serialize)]
pub struct PreparedRequest {
    pub request: CanonicalRequest,
    pub route: RouteMatch,
    pub dispatch: DispatchEntry,
}

/// Per-deployment gateway. Built once at cold start and shared read-only
/// across invocations.
#[derive(Debug, Clone)]
pub struct Gateway {
    config: GatewayConfig,
    normalizer: EventNormalizer,
    router: PathRouter,
}

impl Gateway {
    pub fn new(config: GatewayConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let normalizer = EventNormalizer::for_shape(config.shape, config.base_url.as_deref())?;
        let router = PathRouter::new(&config.route_prefix, config.separator);

        info!(
            shape = config.shape.as_str(),
            route_prefix = %config.route_prefix,
            separator = ?config.separator,
            body_encoding = ?config.body_encoding,
            "gateway configured"
        );

        Ok(Self {
            config,
            normalizer,
            router,
        })
    }

    /// Build a gateway from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::new(GatewayConfig::from_env()?)
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn router(&self) -> &PathRouter {
        &self.router
    }

    /// Normalize, route and resolve `event` without invoking the domain layer.
    pub fn prepare(&self, event: &Value) -> Result<PreparedRequest, GatewayError> {
        let mut request = self.normalizer.normalize(event)?;
        debug!(stage = %Stage::Normalized, method = %request.method, path = %request.path);

        let route = match self.router.route(&request.path) {
            RouteOutcome::Routed(route) => route,
            RouteOutcome::NotFound { path } => return Err(GatewayError::RouteNotFound { path }),
        };
        request.bind_collection(route.collection.as_deref());
        debug!(
            stage = %Stage::Routed,
            route = %route.key,
            collection = route.collection.as_deref().unwrap_or("")
        );

        let dispatch = dispatch::resolve(route.key).ok_or_else(|| GatewayError::RouteNotFound {
            path: request.path.clone(),
        })?;

        Ok(PreparedRequest {
            request,
            route,
            dispatch,
        })
    }

    /// Run one invocation to completion. Never fails: every error is
    /// rendered into the returned envelope.
    pub fn process_event<B>(&self, event: &Value, backend: &B, request_id: &str) -> ResponseEnvelope
    where
        B: FeaturesBackend + ?Sized,
    {
        debug!(request_id = %request_id, stage = %Stage::Received);

        let result = self.prepare(event).and_then(|prepared| {
            let mapping = invoke_guarded(&prepared, backend)?;
            debug!(
                request_id = %request_id,
                stage = %Stage::Dispatched,
                route = %prepared.route.key
            );
            Ok((prepared, mapping))
        });

        match result {
            Ok((prepared, mapping)) => {
                let envelope = build_envelope(mapping, self.config.body_encoding);
                info!(
                    request_id = %request_id,
                    stage = %Stage::Enveloped,
                    route = %prepared.route.key,
                    collection = prepared.request.collection().unwrap_or(""),
                    status = envelope.status_code,
                    "request handled"
                );
                envelope
            }
            Err(err) => self.render_error(&err, request_id),
        }
    }

    /// Render a failure into the platform envelope.
    pub fn render_error(&self, err: &GatewayError, request_id: &str) -> ResponseEnvelope {
        let status = err.status();
        match err {
            GatewayError::RouteNotFound { path } => {
                warn!(request_id = %request_id, stage = %Stage::Errored, path = %path, "no route matched");
            }
            other => {
                error!(request_id = %request_id, stage = %Stage::Errored, error = %other, "request failed");
            }
        }
        build_envelope(
            handle_error(err, status, Some(request_id)),
            self.config.body_encoding,
        )
    }
}

/// Invoke the domain layer, turning a panic into a [`DomainError`] so it
/// renders as the generic 500 instead of failing the invocation.
fn invoke_guarded<B>(
    prepared: &PreparedRequest,
    backend: &B,
) -> Result<serde_json::Map<String, Value>, DomainError>
where
    B: FeaturesBackend + ?Sized,
{
    panic::catch_unwind(AssertUnwindSafe(|| {
        dispatch::invoke(prepared.dispatch, &prepared.request, backend)
    }))
    .unwrap_or_else(|payload| Err(DomainError::Panicked(panic_message(payload.as_ref()))))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}
