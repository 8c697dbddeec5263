//! Error taxonomy for the gateway and the error-body builder.
//!
//! Only two outcomes are distinguishable by a caller: a routing miss
//! (404, naming the unmatched path) and everything else (500 with a fixed
//! message). Internal error text is logged, never returned.

use http::StatusCode;
use serde_json::{json, Map, Value};
use thiserror::Error;

/// Fixed message returned for every server-side failure.
pub const GENERIC_ERROR_MESSAGE: &str = "An internal error occurred while processing the request";

/// Content type used for every JSON body produced by this crate.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Boxed error type accepted from domain collaborators.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure raised by the domain collaborators behind the dispatch seam.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The domain layer is not linked into this deployment.
    #[error("domain layer unavailable: {0}")]
    Unavailable(String),

    /// The collaborator panicked; the payload text is kept for logging.
    #[error("domain layer panicked: {0}")]
    Panicked(String),

    /// Any other failure raised while building a response.
    #[error(transparent)]
    Other(#[from] BoxError),
}

impl DomainError {
    /// Wrap an arbitrary error raised by a collaborator.
    pub fn other<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Other(Box::new(err))
    }
}

/// Errors produced while turning a raw trigger event into a response.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// A required field was absent from the raw event.
    #[error("malformed trigger event: missing or invalid '{field}'")]
    MalformedEvent { field: &'static str },

    /// No route template matched the request path.
    #[error("No handler for route: {path}")]
    RouteNotFound { path: String },

    /// The domain collaborator raised.
    #[error("domain logic failed: {0}")]
    Domain(#[from] DomainError),
}

impl GatewayError {
    /// HTTP status this error is rendered with.
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::RouteNotFound { .. } => StatusCode::NOT_FOUND,
            GatewayError::MalformedEvent { .. } | GatewayError::Domain(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Errors raised while resolving configuration at cold start.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A setting carried a value outside its closed set.
    #[error("invalid {kind} '{value}'")]
    InvalidValue { kind: &'static str, value: String },

    /// The resource-template shape needs a deployment base URL.
    #[error("a base URL is required for the resource-template event shape")]
    MissingBaseUrl,
}

/// Build the error mapping returned to the platform.
///
/// The mapping carries `code` and `headers` so that it flows through the
/// same envelope builder as a successful result. Only a not-found error
/// echoes its message; every other status gets [`GENERIC_ERROR_MESSAGE`].
pub fn handle_error(
    error: &GatewayError,
    code: StatusCode,
    request_id: Option<&str>,
) -> Map<String, Value> {
    let message = if code == StatusCode::NOT_FOUND {
        error.to_string()
    } else {
        GENERIC_ERROR_MESSAGE.to_string()
    };

    let mut body = Map::new();
    body.insert("code".to_string(), json!(code.as_u16()));
    body.insert(
        "headers".to_string(),
        json!({ "Content-Type": JSON_CONTENT_TYPE }),
    );
    body.insert(
        "error".to_string(),
        json!(code.canonical_reason().unwrap_or("Error")),
    );
    body.insert("message".to_string(), json!(message));
    if let Some(id) = request_id.filter(|id| !id.is_empty()) {
        body.insert("requestId".to_string(), json!(id));
    }
    body
}
