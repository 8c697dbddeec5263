//! Normalizers for the supported API-gateway trigger-event shapes.
//!
//! The shape is fixed per deployment through [`EventShape`]; events are
//! never sniffed. Optional mappings (headers, query string, path
//! parameters) default to empty. Only a missing method or path is an
//! error.

use std::collections::BTreeMap;
use std::str::FromStr;

use http::Method;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{ConfigError, GatewayError};
use crate::request::{CanonicalRequest, TRANSIENT_ROUTE_PARAM};

/// Headers injected by the platform that never reach the domain layer.
pub const PLATFORM_HEADER_DENYLIST: &[&str] = &[
    "host",
    "x-amzn-trace-id",
    "x-forwarded-for",
    "x-forwarded-port",
    "x-forwarded-proto",
    "user-agent",
    "accept",
    "accept-encoding",
    "accept-language",
];

/// Trigger-event shape produced by the gateway integration in front of
/// this function.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventShape {
    /// HTTP API payload: `http.method`, `rawPath`, `requestContext.domainName`.
    #[default]
    CustomPath,
    /// REST proxy payload: `httpMethod`, `path`, `Host` header, `pathParameters`.
    SimpleProxy,
    /// Resource-template payload: `httpMethod`, `path`, fixed deployment base URL.
    ResourceTemplate,
}

impl EventShape {
    pub fn as_str(self) -> &'static str {
        match self {
            EventShape::CustomPath => "custom-path",
            EventShape::SimpleProxy => "simple-proxy",
            EventShape::ResourceTemplate => "resource-template",
        }
    }
}

impl FromStr for EventShape {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "custom-path" => Ok(EventShape::CustomPath),
            "simple-proxy" => Ok(EventShape::SimpleProxy),
            "resource-template" => Ok(EventShape::ResourceTemplate),
            _ => Err(ConfigError::InvalidValue {
                kind: "event shape",
                value: s.to_string(),
            }),
        }
    }
}

/// Converts one raw trigger-event shape into a [`CanonicalRequest`].
pub trait NormalizeEvent {
    /// Normalize `event`, failing with [`GatewayError::MalformedEvent`] only
    /// when the method or path is absent.
    fn normalize(&self, event: &Value) -> Result<CanonicalRequest, GatewayError>;
}

/// Raw HTTP API (payload v2 style) event.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HttpApiEvent {
    #[serde(default, deserialize_with = "lenient_string")]
    raw_path: Option<String>,
    #[serde(default, deserialize_with = "or_default")]
    http: HttpDescription,
    #[serde(default, deserialize_with = "or_default")]
    request_context: HttpApiRequestContext,
    #[serde(default, deserialize_with = "string_map")]
    query_string_parameters: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "string_map")]
    headers: BTreeMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HttpApiRequestContext {
    #[serde(default, deserialize_with = "lenient_string")]
    domain_name: Option<String>,
    #[serde(default, deserialize_with = "or_default")]
    http: HttpDescription,
}

#[derive(Debug, Default, Deserialize)]
struct HttpDescription {
    #[serde(default, deserialize_with = "lenient_string")]
    method: Option<String>,
}

/// Raw REST API proxy event, shared by the simple-proxy and
/// resource-template shapes.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProxyEvent {
    #[serde(default, deserialize_with = "lenient_string")]
    http_method: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    path: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    raw_path: Option<String>,
    #[serde(default, deserialize_with = "string_map")]
    headers: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "string_map")]
    query_string_parameters: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "string_map")]
    path_parameters: BTreeMap<String, String>,
}

impl ProxyEvent {
    fn path(&self) -> Result<&str, GatewayError> {
        self.path
            .as_deref()
            .or(self.raw_path.as_deref())
            .ok_or(GatewayError::MalformedEvent { field: "path" })
    }
}

fn decode<'a, T: Deserialize<'a>>(event: &'a Value) -> Result<T, GatewayError> {
    T::deserialize(event).map_err(|_| GatewayError::MalformedEvent { field: "event" })
}

/// Normalizer for HTTP API (payload v2 style) events.
#[derive(Debug, Clone, Copy, Default)]
pub struct CustomPathNormalizer;

impl NormalizeEvent for CustomPathNormalizer {
    fn normalize(&self, event: &Value) -> Result<CanonicalRequest, GatewayError> {
        let event: HttpApiEvent = decode(event)?;
        let method = event.http.method.or(event.request_context.http.method);
        let method = parse_method(method.as_deref(), "http.method")?;
        let path = event
            .raw_path
            .ok_or(GatewayError::MalformedEvent { field: "rawPath" })?;

        Ok(CanonicalRequest {
            method,
            url: host_url(event.request_context.domain_name.as_deref(), &path),
            path,
            query_parameters: event.query_string_parameters,
            route_parameters: BTreeMap::new(),
            headers: event.headers,
        })
    }
}

/// Normalizer for REST API proxy-integration events.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleProxyNormalizer;

impl NormalizeEvent for SimpleProxyNormalizer {
    fn normalize(&self, event: &Value) -> Result<CanonicalRequest, GatewayError> {
        let mut event: ProxyEvent = decode(event)?;
        let method = parse_method(event.http_method.as_deref(), "httpMethod")?;
        let path = event.path()?.to_string();

        let host = event
            .headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("host"))
            .map(|(_, value)| value.as_str());
        let url = host_url(host, &path);

        event.path_parameters.remove(TRANSIENT_ROUTE_PARAM);

        Ok(CanonicalRequest {
            method,
            url,
            path,
            query_parameters: event.query_string_parameters,
            route_parameters: event.path_parameters,
            headers: strip_platform_headers(event.headers),
        })
    }
}

/// Normalizer for resource-template events served under a fixed base URL.
#[derive(Debug, Clone)]
pub struct ResourceTemplateNormalizer {
    base_url: String,
}

impl ResourceTemplateNormalizer {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl NormalizeEvent for ResourceTemplateNormalizer {
    fn normalize(&self, event: &Value) -> Result<CanonicalRequest, GatewayError> {
        let event: ProxyEvent = decode(event)?;
        let method = parse_method(event.http_method.as_deref(), "httpMethod")?;
        let path = event.path()?.to_string();

        Ok(CanonicalRequest {
            method,
            url: join_url(&self.base_url, &path),
            path,
            query_parameters: event.query_string_parameters,
            route_parameters: BTreeMap::new(),
            headers: event.headers,
        })
    }
}

/// The normalizer selected for this deployment.
#[derive(Debug, Clone)]
pub enum EventNormalizer {
    CustomPath(CustomPathNormalizer),
    SimpleProxy(SimpleProxyNormalizer),
    ResourceTemplate(ResourceTemplateNormalizer),
}

impl EventNormalizer {
    /// Select the normalizer for `shape`.
    ///
    /// `base_url` is required for [`EventShape::ResourceTemplate`] and
    /// ignored otherwise.
    pub fn for_shape(shape: EventShape, base_url: Option<&str>) -> Result<Self, ConfigError> {
        match shape {
            EventShape::CustomPath => Ok(EventNormalizer::CustomPath(CustomPathNormalizer)),
            EventShape::SimpleProxy => Ok(EventNormalizer::SimpleProxy(SimpleProxyNormalizer)),
            EventShape::ResourceTemplate => base_url
                .filter(|url| !url.trim().is_empty())
                .map(|url| EventNormalizer::ResourceTemplate(ResourceTemplateNormalizer::new(url)))
                .ok_or(ConfigError::MissingBaseUrl),
        }
    }

    pub fn shape(&self) -> EventShape {
        match self {
            EventNormalizer::CustomPath(_) => EventShape::CustomPath,
            EventNormalizer::SimpleProxy(_) => EventShape::SimpleProxy,
            EventNormalizer::ResourceTemplate(_) => EventShape::ResourceTemplate,
        }
    }
}

impl NormalizeEvent for EventNormalizer {
    fn normalize(&self, event: &Value) -> Result<CanonicalRequest, GatewayError> {
        match self {
            EventNormalizer::CustomPath(n) => n.normalize(event),
            EventNormalizer::SimpleProxy(n) => n.normalize(event),
            EventNormalizer::ResourceTemplate(n) => n.normalize(event),
        }
    }
}

/// Remove platform-internal headers, matching names case-insensitively.
pub fn strip_platform_headers(headers: BTreeMap<String, String>) -> BTreeMap<String, String> {
    headers
        .into_iter()
        .filter(|(name, _)| {
            !PLATFORM_HEADER_DENYLIST
                .iter()
                .any(|denied| name.eq_ignore_ascii_case(denied))
        })
        .collect()
}

/// Methods accepted from a trigger event. Extension methods are rejected.
const STANDARD_METHODS: [Method; 9] = [
    Method::GET,
    Method::HEAD,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::CONNECT,
    Method::OPTIONS,
    Method::TRACE,
    Method::PATCH,
];

fn parse_method(raw: Option<&str>, field: &'static str) -> Result<String, GatewayError> {
    let raw = raw
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .ok_or(GatewayError::MalformedEvent { field })?;
    Method::from_bytes(raw.to_ascii_uppercase().as_bytes())
        .ok()
        .filter(|method| STANDARD_METHODS.contains(method))
        .map(|method| method.as_str().to_string())
        .ok_or(GatewayError::MalformedEvent { field })
}

/// A string field; any other JSON value counts as absent.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(Some(s)),
        _ => Ok(None),
    }
}

/// A nested object where `null` means the default.
fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Flatten a JSON object into string pairs. Scalars are stringified, nulls
/// and nested values are dropped, and `null` or a non-object is empty.
fn string_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Object(map) = Value::deserialize(deserializer)? else {
        return Ok(BTreeMap::new());
    };
    Ok(map
        .into_iter()
        .filter_map(|(key, value)| {
            let value = match value {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => return None,
            };
            Some((key, value))
        })
        .collect())
}

fn host_url(host: Option<&str>, path: &str) -> String {
    match host.map(str::trim).filter(|h| !h.is_empty()) {
        Some(host) => join_url(&format!("https://{}", host), path),
        None => path.to_string(),
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
