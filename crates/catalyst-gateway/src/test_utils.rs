//! Test utilities for gateway and Lambda handler testing.
//!
//! This module provides sample trigger events for every supported
//! [`EventShape`] and collaborator doubles standing in for the domain layer.
//!
//! # Usage
//!
//! These utilities are only available in test builds or with the
//! `test-utils` feature:
//!
//! ```ignore
//! use catalyst_gateway::test_utils::{sample_event, RecordingBackend};
//!
//! #[test]
//! fn test_handler() {
//!     let event = sample_event(EventShape::SimpleProxy, "/base/c/items", json!({}));
//!     let backend = RecordingBackend::default();
//!     // ... drive the gateway and inspect backend.calls()
//! }
//! ```

use std::sync::Mutex;

use serde_json::{json, Map, Value};

use crate::dispatch::{FeaturesBackend, QueryFunc, SchemaId};
use crate::error::DomainError;
use crate::events::EventShape;
use crate::request::CanonicalRequest;

/// Host used by every sample event.
pub const SAMPLE_HOST: &str = "example.com";

/// Route prefix matching the sample paths (`/base/{collection}/items/...`).
pub const SAMPLE_PREFIX: &str = "base";

/// Custom header present on every sample event.
pub const SAMPLE_API_KEY: &str = "test-api-key";

/// Build a `GET` trigger event of the given shape.
///
/// `query` should be a JSON object (or `null`).
pub fn sample_event(shape: EventShape, path: &str, query: Value) -> Value {
    match shape {
        EventShape::CustomPath => json!({
            "version": "2.0",
            "rawPath": path,
            "http": {"method": "GET"},
            "requestContext": {
                "domainName": SAMPLE_HOST,
                "http": {"method": "GET", "path": path}
            },
            "queryStringParameters": query,
            "headers": {"key": SAMPLE_API_KEY}
        }),
        EventShape::SimpleProxy => json!({
            "httpMethod": "GET",
            "path": path,
            "resource": "/{proxy+}",
            "headers": {
                "Host": SAMPLE_HOST,
                "X-Amzn-Trace-Id": "Root=1-00000000-000000000000000000000000",
                "X-Forwarded-For": "203.0.113.10",
                "X-Forwarded-Port": "443",
                "X-Forwarded-Proto": "https",
                "User-Agent": "catalyst-tests",
                "Accept": "*/*",
                "key": SAMPLE_API_KEY
            },
            "queryStringParameters": query,
            "pathParameters": {"proxy": path.trim_start_matches('/')}
        }),
        EventShape::ResourceTemplate => json!({
            "httpMethod": "GET",
            "path": path,
            "resource": "/{proxy+}",
            "headers": {"key": SAMPLE_API_KEY},
            "queryStringParameters": query
        }),
    }
}

/// Create a mock request ID for testing.
pub fn mock_request_id(suffix: &str) -> String {
    format!("test-request-{}", suffix)
}

/// A call observed by [`RecordingBackend`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    /// `"{schema}/{query}"` for feature routes, `"collections"` otherwise.
    pub handler: String,
    pub collection: Option<String>,
    pub request: CanonicalRequest,
}

/// Backend that records every call and answers with a small feature
/// collection echoing the identifiers it was given.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    calls: Mutex<Vec<RecordedCall>>,
}

impl RecordingBackend {
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    fn record(&self, handler: String, request: &CanonicalRequest) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedCall {
                handler,
                collection: request.collection().map(str::to_string),
                request: request.clone(),
            });
        }
    }
}

impl FeaturesBackend for RecordingBackend {
    fn construct_features_response(
        &self,
        request: &CanonicalRequest,
        schema: SchemaId,
        query: QueryFunc,
    ) -> Result<Map<String, Value>, DomainError> {
        self.record(format!("{}/{}", schema, query), request);
        Ok(object(json!({
            "type": "FeatureCollection",
            "numberReturned": 0,
            "features": [],
            "schema": schema.as_str(),
            "query": query.as_str(),
            "collection": request.collection(),
        })))
    }

    fn construct_collections_response(
        &self,
        request: &CanonicalRequest,
    ) -> Result<Map<String, Value>, DomainError> {
        self.record("collections".to_string(), request);
        Ok(object(json!({
            "collections": [
                {"id": "bld-fts-building-4", "version": 4},
                {"id": "lnd-fts-land-3", "version": 3}
            ]
        })))
    }
}

/// Backend whose every call fails with an error carrying [`FailingBackend::SECRET`].
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingBackend;

impl FailingBackend {
    /// Internal text that must never reach a response body.
    pub const SECRET: &'static str = "upstream token tkn-5f2c rejected at 10.1.2.3";
}

impl FeaturesBackend for FailingBackend {
    fn construct_features_response(
        &self,
        _request: &CanonicalRequest,
        _schema: SchemaId,
        _query: QueryFunc,
    ) -> Result<Map<String, Value>, DomainError> {
        Err(DomainError::Other(Self::SECRET.into()))
    }

    fn construct_collections_response(
        &self,
        _request: &CanonicalRequest,
    ) -> Result<Map<String, Value>, DomainError> {
        Err(DomainError::Other(Self::SECRET.into()))
    }
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
