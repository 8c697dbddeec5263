//! Platform-independent request representation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Route parameter holding the collection identifier taken from the path.
pub const COLLECTION_PARAM: &str = "collection";

/// Route parameter used only by the gateway integration for greedy matching.
pub const TRANSIENT_ROUTE_PARAM: &str = "proxy";

/// Canonical request handed to the domain layer.
///
/// Query parameter values are passed through verbatim; comma-delimited
/// lists (such as `collection=a,b,c`) are split downstream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalRequest {
    /// Upper-case HTTP method.
    pub method: String,

    /// Absolute URL when the host is known, otherwise the bare path.
    pub url: String,

    /// Raw request path as received from the platform.
    pub path: String,

    /// Query string parameters (case-sensitive keys).
    #[serde(default)]
    pub query_parameters: BTreeMap<String, String>,

    /// Path parameters; holds `collection` once the request is routed.
    #[serde(default)]
    pub route_parameters: BTreeMap<String, String>,

    /// Request headers with platform-internal entries removed.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl CanonicalRequest {
    /// Collection identifier bound by the router, if any.
    pub fn collection(&self) -> Option<&str> {
        self.route_parameters
            .get(COLLECTION_PARAM)
            .map(String::as_str)
    }

    /// Bind the routed collection and drop routing-only parameters.
    ///
    /// An empty collection is never bound.
    pub fn bind_collection(&mut self, collection: Option<&str>) {
        self.route_parameters.remove(TRANSIENT_ROUTE_PARAM);
        match collection.filter(|c| !c.is_empty()) {
            Some(collection) => {
                self.route_parameters
                    .insert(COLLECTION_PARAM.to_string(), collection.to_string());
            }
            None => {
                self.route_parameters.remove(COLLECTION_PARAM);
            }
        }
    }

    /// Look up a header by name, ignoring ASCII case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}
