//! Path routing for the features API surface.
//!
//! A path is `{prefix}/{collection}/items[/{extensions}]` or
//! `{prefix}/latest-collections[/{collection}]`. The extension suffix is
//! drawn from a closed set of eight literals built from the feature names
//! `limit`, `geom` and `col`, in that order, joined by the configured
//! [`Separator`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Path segment introducing the feature-items routes.
pub const ITEMS_SEGMENT: &str = "items";

/// Path segment naming the metadata route.
pub const LATEST_COLLECTIONS_SEGMENT: &str = "latest-collections";

/// Literal accepted as an explicit "no extension" suffix.
pub const BASE_LITERAL: &str = "base";

/// Optional query-processing features selected by the path suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Extension {
    /// No extension applied.
    Base,
    Limit,
    Geom,
    Col,
    LimitGeom,
    LimitCol,
    GeomCol,
    LimitGeomCol,
}

impl Extension {
    /// Every extension combination.
    pub const ALL: [Extension; 8] = [
        Extension::Base,
        Extension::Limit,
        Extension::Geom,
        Extension::Col,
        Extension::LimitGeom,
        Extension::LimitCol,
        Extension::GeomCol,
        Extension::LimitGeomCol,
    ];

    /// Feature names making up this combination, in canonical order.
    pub fn features(self) -> &'static [&'static str] {
        match self {
            Extension::Base => &[],
            Extension::Limit => &["limit"],
            Extension::Geom => &["geom"],
            Extension::Col => &["col"],
            Extension::LimitGeom => &["limit", "geom"],
            Extension::LimitCol => &["limit", "col"],
            Extension::GeomCol => &["geom", "col"],
            Extension::LimitGeomCol => &["limit", "geom", "col"],
        }
    }

    /// Path suffix for this combination, or `None` for [`Extension::Base`].
    pub fn literal(self, separator: Separator) -> Option<String> {
        match self {
            Extension::Base => None,
            other => Some(other.features().join(separator.as_str())),
        }
    }
}

/// Delimiter between feature names in multi-extension suffixes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Separator {
    /// `limit-geom-col`
    #[default]
    Hyphen,
    /// `limit_geom_col`
    Underscore,
}

impl Separator {
    pub fn as_str(self) -> &'static str {
        match self {
            Separator::Hyphen => "-",
            Separator::Underscore => "_",
        }
    }
}

impl FromStr for Separator {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hyphen" | "-" => Ok(Separator::Hyphen),
            "underscore" | "_" => Ok(Separator::Underscore),
            _ => Err(ConfigError::InvalidValue {
                kind: "extension separator",
                value: s.to_string(),
            }),
        }
    }
}

/// Identifier of a route in the fixed route table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "extension", rename_all = "kebab-case")]
pub enum RouteKey {
    /// Feature items with the given extension combination.
    Items(Extension),
    /// List or describe the latest collections.
    LatestCollections,
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteKey::Items(Extension::Base) => write!(f, "items"),
            RouteKey::Items(ext) => write!(f, "items/{}", ext.features().join("+")),
            RouteKey::LatestCollections => write!(f, "{}", LATEST_COLLECTIONS_SEGMENT),
        }
    }
}

/// A matched route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteMatch {
    pub key: RouteKey,
    /// Collection segment, verbatim. Absent only for the bare metadata route.
    pub collection: Option<String>,
}

/// Outcome of routing a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    Routed(RouteMatch),
    NotFound { path: String },
}

impl RouteOutcome {
    /// Unwrap a routed outcome.
    pub fn routed(self) -> Option<RouteMatch> {
        match self {
            RouteOutcome::Routed(route) => Some(route),
            RouteOutcome::NotFound { .. } => None,
        }
    }
}

/// One entry of the route table, as documented for operators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteDescriptor {
    pub path_template: String,
    pub handler_id: RouteKey,
}

/// Router over a fixed prefix and extension separator.
///
/// Built once per process; immutable afterwards.
#[derive(Debug, Clone)]
pub struct PathRouter {
    prefix: Vec<String>,
    separator: Separator,
    suffixes: Vec<(String, Extension)>,
}

impl PathRouter {
    /// Create a router for `prefix` (e.g. `catalyst/features`).
    pub fn new(prefix: &str, separator: Separator) -> Self {
        let prefix = prefix
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect();

        let mut suffixes: Vec<(String, Extension)> = Extension::ALL
            .iter()
            .filter_map(|&ext| ext.literal(separator).map(|literal| (literal, ext)))
            .collect();
        suffixes.push((BASE_LITERAL.to_string(), Extension::Base));

        Self {
            prefix,
            separator,
            suffixes,
        }
    }

    pub fn separator(&self) -> Separator {
        self.separator
    }

    /// Route a raw request path.
    pub fn route(&self, path: &str) -> RouteOutcome {
        let not_found = || RouteOutcome::NotFound {
            path: path.to_string(),
        };

        let trimmed = path.trim_matches('/');
        if trimmed.is_empty() {
            return not_found();
        }
        let segments: Vec<&str> = trimmed.split('/').collect();
        if segments.iter().any(|segment| segment.is_empty()) {
            return not_found();
        }

        let Some(rest) = self.strip_prefix(&segments) else {
            return not_found();
        };

        let routed = match rest {
            [marker] if *marker == LATEST_COLLECTIONS_SEGMENT => RouteMatch {
                key: RouteKey::LatestCollections,
                collection: None,
            },
            [marker, collection] if *marker == LATEST_COLLECTIONS_SEGMENT => RouteMatch {
                key: RouteKey::LatestCollections,
                collection: Some((*collection).to_string()),
            },
            [collection, items] if *items == ITEMS_SEGMENT => RouteMatch {
                key: RouteKey::Items(Extension::Base),
                collection: Some((*collection).to_string()),
            },
            [collection, items, suffix] if *items == ITEMS_SEGMENT => {
                match self.extension_for(suffix) {
                    Some(ext) => RouteMatch {
                        key: RouteKey::Items(ext),
                        collection: Some((*collection).to_string()),
                    },
                    None => return not_found(),
                }
            }
            _ => return not_found(),
        };

        RouteOutcome::Routed(routed)
    }

    /// The fixed route table rendered with this router's prefix and separator.
    pub fn descriptors(&self) -> Vec<RouteDescriptor> {
        let base = self.prefix.join("/");
        let join = |rest: &str| {
            if base.is_empty() {
                rest.to_string()
            } else {
                format!("{}/{}", base, rest)
            }
        };

        let mut table: Vec<RouteDescriptor> = Extension::ALL
            .iter()
            .map(|&ext| {
                let tail = match ext.literal(self.separator) {
                    Some(literal) => format!("{{collection}}/{}/{}", ITEMS_SEGMENT, literal),
                    None => format!("{{collection}}/{}", ITEMS_SEGMENT),
                };
                RouteDescriptor {
                    path_template: join(&tail),
                    handler_id: RouteKey::Items(ext),
                }
            })
            .collect();

        table.push(RouteDescriptor {
            path_template: join(&format!("{}[/{{collection}}]", LATEST_COLLECTIONS_SEGMENT)),
            handler_id: RouteKey::LatestCollections,
        });
        table
    }

    fn strip_prefix<'a, 'b>(&self, segments: &'a [&'b str]) -> Option<&'a [&'b str]> {
        if segments.len() < self.prefix.len() {
            return None;
        }
        let (head, rest) = segments.split_at(self.prefix.len());
        head.iter()
            .zip(&self.prefix)
            .all(|(segment, expected)| *segment == expected.as_str())
            .then_some(rest)
    }

    fn extension_for(&self, suffix: &str) -> Option<Extension> {
        self.suffixes
            .iter()
            .find(|(literal, _)| literal == suffix)
            .map(|(_, ext)| *ext)
    }
}
