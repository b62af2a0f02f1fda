use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use super::CrsError;

const GEOGRAPHIC_PROJECTIONS: [&str; 4] = ["longlat", "latlong", "lonlat", "latlon"];

/// Proj4 projection definition, e.g. `+proj=longlat +datum=WGS84 +no_defs`.
///
/// Two definitions are equal if their canonical strings and angular units are the same, so the
/// original formatting of the definition does not matter:
///
/// ```
/// use cartesia::crs::ProjectionDef;
///
/// let a = ProjectionDef::parse("+proj=longlat   +datum=WGS84").unwrap();
/// let b = ProjectionDef::parse("proj=longlat +datum=WGS84").unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a.canonical_str(), "+proj=longlat +datum=WGS84");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionDef {
    params: Vec<(String, Option<String>)>,
    original: Option<String>,
    radians: bool,
}

impl ProjectionDef {
    /// Parses a proj4 definition string.
    pub fn parse(definition: &str) -> Result<Self, CrsError> {
        let definition = definition.trim();
        if definition.is_empty() {
            return Err(CrsError::Proj4("empty definition".into()));
        }

        let params = definition
            .split_whitespace()
            .map(|token| {
                let token = token.strip_prefix('+').unwrap_or(token);
                let (key, value) = match token.split_once('=') {
                    Some((key, value)) => (key, Some(value.to_string())),
                    None => (token, None),
                };

                if key.is_empty() {
                    return Err(CrsError::Proj4(format!("parameter without a name: {token}")));
                }

                Ok((key.to_string(), value))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            params,
            original: Some(definition.to_string()),
            radians: false,
        })
    }

    /// Creates a definition from a list of parameters.
    pub fn from_params<K, V>(
        params: impl IntoIterator<Item = (K, Option<V>)>,
    ) -> Result<Self, CrsError>
    where
        K: Into<String>,
        V: Into<String>,
    {
        let params: Vec<(String, Option<String>)> = params
            .into_iter()
            .map(|(k, v)| (k.into(), v.map(Into::into)))
            .collect();

        if params.is_empty() {
            return Err(CrsError::Proj4("empty definition".into()));
        }
        if params.iter().any(|(k, _)| k.is_empty()) {
            return Err(CrsError::Proj4("parameter without a name".into()));
        }

        Ok(Self {
            params,
            original: None,
            radians: false,
        })
    }

    /// Sets whether geographic coordinates are expressed in radians instead of degrees.
    pub fn with_radians(mut self, radians: bool) -> Self {
        self.radians = radians;
        self
    }

    /// The string this definition was parsed from, if any.
    pub fn original_str(&self) -> Option<&str> {
        self.original.as_deref()
    }

    /// Normalized definition string.
    pub fn canonical_str(&self) -> String {
        self.params
            .iter()
            .map(|(key, value)| match value {
                Some(value) => format!("+{key}={value}"),
                None => format!("+{key}"),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Whether geographic coordinates are in radians.
    pub fn is_radians(&self) -> bool {
        self.radians
    }

    /// Value of the parameter `key`. Returns `Some("")` for flags without a value (e.g.
    /// `+no_defs`).
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_deref().unwrap_or(""))
    }

    /// Whether this is a geographic (latitude/longitude) coordinate system.
    pub fn is_geographic(&self) -> bool {
        self.param("proj")
            .map(|proj| GEOGRAPHIC_PROJECTIONS.contains(&proj))
            .unwrap_or(false)
    }
}

impl PartialEq for ProjectionDef {
    fn eq(&self, other: &Self) -> bool {
        self.radians == other.radians && self.canonical_str() == other.canonical_str()
    }
}

impl Eq for ProjectionDef {}

impl Hash for ProjectionDef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical_str().hash(state);
        self.radians.hash(state);
    }
}

impl Display for ProjectionDef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.canonical_str())
    }
}
