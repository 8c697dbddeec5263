//! Response envelope expected by the invoking gateway integration.

use std::collections::BTreeMap;
use std::str::FromStr;

use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::{ConfigError, JSON_CONTENT_TYPE};

/// How the body is emitted. Fixed per deployment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyEncoding {
    /// Body is the JSON object itself.
    #[default]
    Object,
    /// Body is the JSON object serialized to a string.
    Text,
}

impl FromStr for BodyEncoding {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "object" | "structured" => Ok(BodyEncoding::Object),
            "text" | "string" => Ok(BodyEncoding::Text),
            _ => Err(ConfigError::InvalidValue {
                kind: "body encoding",
                value: s.to_string(),
            }),
        }
    }
}

/// Platform response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub is_base64_encoded: bool,
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: Value,
}

impl ResponseEnvelope {
    /// Body as a JSON value regardless of encoding.
    ///
    /// A text body that is not valid JSON is returned as a string value.
    pub fn body_json(&self) -> Value {
        match &self.body {
            Value::String(text) => {
                serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.clone()))
            }
            other => other.clone(),
        }
    }
}

/// Headers applied when a result does not carry its own.
pub fn default_headers() -> BTreeMap<String, String> {
    BTreeMap::from([("Content-Type".to_string(), JSON_CONTENT_TYPE.to_string())])
}

/// Wrap a result mapping in the platform envelope.
///
/// `code` and `headers` are lifted out of the mapping into the envelope and
/// never appear in the body.
pub fn build_envelope(mut result: Map<String, Value>, encoding: BodyEncoding) -> ResponseEnvelope {
    let status_code = match result.remove("code") {
        Some(code) => status_from_value(&code).unwrap_or_else(|| {
            warn!(code = %code, "ignoring invalid status code in result");
            StatusCode::OK
        }),
        None => StatusCode::OK,
    };

    let headers = match result.remove("headers") {
        Some(Value::Object(map)) => map
            .into_iter()
            .filter_map(|(name, value)| header_value(value).map(|value| (name, value)))
            .collect(),
        Some(other) => {
            warn!(headers = %other, "ignoring non-object headers in result");
            default_headers()
        }
        None => default_headers(),
    };

    let body = match encoding {
        BodyEncoding::Object => Value::Object(result),
        BodyEncoding::Text => Value::String(Value::Object(result).to_string()),
    };

    ResponseEnvelope {
        is_base64_encoded: false,
        status_code: status_code.as_u16(),
        headers,
        body,
    }
}

fn status_from_value(value: &Value) -> Option<StatusCode> {
    let raw = match value {
        Value::Number(n) => n.as_u64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    let raw = u16::try_from(raw).ok()?;
    if !(100..=599).contains(&raw) {
        return None;
    }
    StatusCode::from_u16(raw).ok()
}

fn header_value(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
