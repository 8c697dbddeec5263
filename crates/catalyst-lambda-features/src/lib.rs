//! AWS Lambda function serving every Catalyst features API route.
//!
//! A single function sits behind the API gateway. Each invocation is
//! normalized, routed and dispatched by [`Gateway`]; the domain layer is
//! supplied as a [`FeaturesBackend`].

use std::sync::Arc;

use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::{Map, Value};
use tracing::{error, info};

use catalyst_gateway::{
    init_tracing, invocation_span, CanonicalRequest, DomainError, FeaturesBackend, Gateway,
    QueryFunc, ResponseEnvelope, SchemaId,
};

/// Backend bound when no domain layer is linked into the binary.
///
/// Every call fails, so every routed request renders as a generic 500.
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedBackend;

impl FeaturesBackend for DetachedBackend {
    fn construct_features_response(
        &self,
        _request: &CanonicalRequest,
        schema: SchemaId,
        query: QueryFunc,
    ) -> Result<Map<String, Value>, DomainError> {
        Err(DomainError::Unavailable(format!(
            "no domain layer linked for {} ({})",
            query, schema
        )))
    }

    fn construct_collections_response(
        &self,
        _request: &CanonicalRequest,
    ) -> Result<Map<String, Value>, DomainError> {
        Err(DomainError::Unavailable(
            "no domain layer linked for collections".to_string(),
        ))
    }
}

/// Entry point used by the Lambda runtime.
pub async fn run() -> Result<(), Error> {
    run_with(DetachedBackend).await
}

/// Run the Lambda event loop against `backend`.
///
/// Configuration is read from the environment once, before the first
/// invocation; an invalid configuration fails the cold start.
pub async fn run_with<B>(backend: B) -> Result<(), Error>
where
    B: FeaturesBackend + 'static,
{
    init_tracing();

    let gateway = match Gateway::from_env() {
        Ok(gateway) => Arc::new(gateway),
        Err(e) => {
            error!(error = %e, "invalid gateway configuration");
            return Err(e.into());
        }
    };
    info!(shape = gateway.config().shape.as_str(), "Lambda gateway initialized");

    let backend = Arc::new(backend);
    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let gateway = Arc::clone(&gateway);
        let backend = Arc::clone(&backend);
        async move { handler(&gateway, backend.as_ref(), event).await }
    }))
    .await
}

/// Lambda handler invoked per request.
///
/// Always answers with an envelope; failures are rendered, not raised.
pub async fn handler<B>(
    gateway: &Gateway,
    backend: &B,
    event: LambdaEvent<Value>,
) -> Result<ResponseEnvelope, Error>
where
    B: FeaturesBackend + ?Sized,
{
    let request_id = event.context.request_id.as_str();
    Ok(invocation_span(request_id)
        .in_scope(|| gateway.process_event(&event.payload, backend, request_id)))
}
