//! Static dispatch table and the seam to the domain layer.
//!
//! Every feature-items route binds one parameter schema and one query
//! function; the metadata route delegates to the collections builder
//! instead. The table is built once and shared read-only.

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::DomainError;
use crate::request::CanonicalRequest;
use crate::router::{Extension, RouteKey};

/// Optional-parameter schema used to validate a feature-items request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchemaId {
    #[serde(rename = "FeaturesBaseSchema")]
    FeaturesBase,
    #[serde(rename = "LimitSchema")]
    Limit,
    #[serde(rename = "GeomSchema")]
    Geom,
    #[serde(rename = "ColSchema")]
    Col,
    #[serde(rename = "LimitGeomSchema")]
    LimitGeom,
    #[serde(rename = "LimitColSchema")]
    LimitCol,
    #[serde(rename = "GeomColSchema")]
    GeomCol,
    #[serde(rename = "LimitGeomColSchema")]
    LimitGeomCol,
}

impl SchemaId {
    pub fn for_extension(ext: Extension) -> Self {
        match ext {
            Extension::Base => SchemaId::FeaturesBase,
            Extension::Limit => SchemaId::Limit,
            Extension::Geom => SchemaId::Geom,
            Extension::Col => SchemaId::Col,
            Extension::LimitGeom => SchemaId::LimitGeom,
            Extension::LimitCol => SchemaId::LimitCol,
            Extension::GeomCol => SchemaId::GeomCol,
            Extension::LimitGeomCol => SchemaId::LimitGeomCol,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SchemaId::FeaturesBase => "FeaturesBaseSchema",
            SchemaId::Limit => "LimitSchema",
            SchemaId::Geom => "GeomSchema",
            SchemaId::Col => "ColSchema",
            SchemaId::LimitGeom => "LimitGeomSchema",
            SchemaId::LimitCol => "LimitColSchema",
            SchemaId::GeomCol => "GeomColSchema",
            SchemaId::LimitGeomCol => "LimitGeomColSchema",
        }
    }
}

impl fmt::Display for SchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Domain query function executing a feature-items request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryFunc {
    Items,
    ItemsLimit,
    ItemsGeom,
    ItemsCol,
    ItemsLimitGeom,
    ItemsLimitCol,
    ItemsGeomCol,
    ItemsLimitGeomCol,
}

impl QueryFunc {
    pub fn for_extension(ext: Extension) -> Self {
        match ext {
            Extension::Base => QueryFunc::Items,
            Extension::Limit => QueryFunc::ItemsLimit,
            Extension::Geom => QueryFunc::ItemsGeom,
            Extension::Col => QueryFunc::ItemsCol,
            Extension::LimitGeom => QueryFunc::ItemsLimitGeom,
            Extension::LimitCol => QueryFunc::ItemsLimitCol,
            Extension::GeomCol => QueryFunc::ItemsGeomCol,
            Extension::LimitGeomCol => QueryFunc::ItemsLimitGeomCol,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            QueryFunc::Items => "items",
            QueryFunc::ItemsLimit => "items_limit",
            QueryFunc::ItemsGeom => "items_geom",
            QueryFunc::ItemsCol => "items_col",
            QueryFunc::ItemsLimitGeom => "items_limit_geom",
            QueryFunc::ItemsLimitCol => "items_limit_col",
            QueryFunc::ItemsGeomCol => "items_geom_col",
            QueryFunc::ItemsLimitGeomCol => "items_limit_geom_col",
        }
    }
}

impl fmt::Display for QueryFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a route resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "handler", rename_all = "kebab-case")]
pub enum DispatchEntry {
    /// Feature items: validate with `schema`, execute with `query`.
    Features { schema: SchemaId, query: QueryFunc },
    /// List or describe collections.
    Collections,
}

impl DispatchEntry {
    pub fn is_metadata_route(&self) -> bool {
        matches!(self, DispatchEntry::Collections)
    }
}

static DISPATCH_TABLE: Lazy<HashMap<RouteKey, DispatchEntry>> = Lazy::new(|| {
    let mut table: HashMap<RouteKey, DispatchEntry> = Extension::ALL
        .iter()
        .map(|&ext| {
            (
                RouteKey::Items(ext),
                DispatchEntry::Features {
                    schema: SchemaId::for_extension(ext),
                    query: QueryFunc::for_extension(ext),
                },
            )
        })
        .collect();
    table.insert(RouteKey::LatestCollections, DispatchEntry::Collections);
    table
});

/// Look up the dispatch entry for a route.
pub fn resolve(key: RouteKey) -> Option<DispatchEntry> {
    DISPATCH_TABLE.get(&key).copied()
}

/// The domain collaborators this layer delegates to.
///
/// Both calls are synchronous. A returned mapping may carry `code` and
/// `headers`, which become the envelope status and headers. A panic inside
/// either call is caught by the gateway and rendered as a generic 500.
pub trait FeaturesBackend: Send + Sync {
    fn construct_features_response(
        &self,
        request: &CanonicalRequest,
        schema: SchemaId,
        query: QueryFunc,
    ) -> Result<Map<String, Value>, DomainError>;

    fn construct_collections_response(
        &self,
        request: &CanonicalRequest,
    ) -> Result<Map<String, Value>, DomainError>;
}

impl<B: FeaturesBackend + ?Sized> FeaturesBackend for std::sync::Arc<B> {
    fn construct_features_response(
        &self,
        request: &CanonicalRequest,
        schema: SchemaId,
        query: QueryFunc,
    ) -> Result<Map<String, Value>, DomainError> {
        (**self).construct_features_response(request, schema, query)
    }

    fn construct_collections_response(
        &self,
        request: &CanonicalRequest,
    ) -> Result<Map<String, Value>, DomainError> {
        (**self).construct_collections_response(request)
    }
}

/// Invoke the collaborator selected by `entry`.
pub fn invoke<B: FeaturesBackend + ?Sized>(
    entry: DispatchEntry,
    request: &CanonicalRequest,
    backend: &B,
) -> Result<Map<String, Value>, DomainError> {
    match entry {
        DispatchEntry::Features { schema, query } => {
            backend.construct_features_response(request, schema, query)
        }
        DispatchEntry::Collections => backend.construct_collections_response(request),
    }
}
