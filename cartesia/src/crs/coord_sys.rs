use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::CrsError;

/// Root element of a WKT coordinate system definition.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoordSysKind {
    /// `GEOGCS`
    Geographic,
    /// `PROJCS`
    Projected,
    /// `GEOCCS`
    Geocentric,
    /// `VERT_CS`
    Vertical,
    /// `LOCAL_CS`
    Local,
    /// `COMPD_CS`
    Compound,
    /// `FITTED_CS`
    Fitted,
}

impl FromStr for CoordSysKind {
    type Err = CrsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GEOGCS" => Ok(Self::Geographic),
            "PROJCS" => Ok(Self::Projected),
            "GEOCCS" => Ok(Self::Geocentric),
            "VERT_CS" => Ok(Self::Vertical),
            "LOCAL_CS" => Ok(Self::Local),
            "COMPD_CS" => Ok(Self::Compound),
            "FITTED_CS" => Ok(Self::Fitted),
            other => Err(CrsError::Wkt(format!("unknown coordinate system type {other}"))),
        }
    }
}

/// Coordinate system descriptor in OGC WKT form.
///
/// Only the root element, its name and its authority are interpreted. The full text is kept as is
/// and returned by [`CoordSys::to_wkt`].
///
/// ```
/// use cartesia::crs::{CoordSys, CoordSysKind};
///
/// let cs = CoordSys::from_wkt(r#"GEOGCS["WGS 84",DATUM["WGS_1984"],AUTHORITY["EPSG","4326"]]"#).unwrap();
/// assert_eq!(cs.kind(), CoordSysKind::Geographic);
/// assert_eq!(cs.name(), "WGS 84");
/// assert_eq!(cs.authority_code(), Some(4326));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CoordSys {
    kind: CoordSysKind,
    name: String,
    authority: Option<(String, String)>,
    wkt: String,
}

impl CoordSys {
    /// Parses a WKT coordinate system definition.
    pub fn from_wkt(wkt: &str) -> Result<Self, CrsError> {
        let wkt = wkt.trim();
        let (keyword, body) = split_element(wkt)
            .ok_or_else(|| CrsError::Wkt("expected KEYWORD[...] element".into()))?;
        let kind = keyword.parse()?;

        let items = split_top_level(body)?;
        let name = items
            .first()
            .and_then(|item| unquote(item))
            .ok_or_else(|| CrsError::Wkt("coordinate system has no name".into()))?
            .to_string();

        let authority = items
            .iter()
            .filter_map(|item| split_element(item))
            .find(|(keyword, _)| keyword.eq_ignore_ascii_case("AUTHORITY"))
            .map(|(_, body)| -> Result<(String, String), CrsError> {
                let parts = split_top_level(body)?;
                match *parts.as_slice() {
                    [name, code] => Ok((
                        unquote(name).unwrap_or(name).to_string(),
                        unquote(code).unwrap_or(code).to_string(),
                    )),
                    _ => Err(CrsError::Wkt("AUTHORITY must have a name and a code".into())),
                }
            })
            .transpose()?;

        Ok(Self {
            kind,
            name,
            authority,
            wkt: wkt.to_string(),
        })
    }

    /// Type of the coordinate system.
    pub fn kind(&self) -> CoordSysKind {
        self.kind
    }

    /// Name of the coordinate system.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the authority, e.g. `EPSG`.
    pub fn authority(&self) -> Option<&str> {
        self.authority.as_ref().map(|(name, _)| name.as_str())
    }

    /// Numeric code of the coordinate system within its authority.
    pub fn authority_code(&self) -> Option<i32> {
        self.authority
            .as_ref()
            .and_then(|(_, code)| code.trim().parse().ok())
    }

    /// WKT text of the coordinate system.
    pub fn to_wkt(&self) -> &str {
        &self.wkt
    }
}

impl Display for CoordSys {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.wkt)
    }
}

impl FromStr for CoordSys {
    type Err = CrsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_wkt(s)
    }
}

/// Splits `KEYWORD[body]` (or `KEYWORD(body)`) into the keyword and the body.
fn split_element(item: &str) -> Option<(&str, &str)> {
    let item = item.trim();
    let open = item.find(|c: char| c == '[' || c == '(')?;
    let close = match item.as_bytes()[open] {
        b'[' => ']',
        _ => ')',
    };
    let body = item[open + 1..].strip_suffix(close)?;
    let keyword = item[..open].trim();

    if keyword.is_empty() {
        return None;
    }

    Some((keyword, body))
}

/// Splits the body of an element by the commas that are not nested in brackets or quotes.
fn split_top_level(body: &str) -> Result<Vec<&str>, CrsError> {
    let mut items = vec![];
    let mut depth = 0usize;
    let mut quoted = false;
    let mut start = 0;

    for (index, c) in body.char_indices() {
        match c {
            '"' => quoted = !quoted,
            '[' | '(' if !quoted => depth += 1,
            ']' | ')' if !quoted => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| CrsError::Wkt("unbalanced brackets".into()))?;
            }
            ',' if !quoted && depth == 0 => {
                items.push(body[start..index].trim());
                start = index + 1;
            }
            _ => {}
        }
    }

    if quoted || depth != 0 {
        return Err(CrsError::Wkt("unbalanced brackets or quotes".into()));
    }

    items.push(body[start..].trim());
    Ok(items)
}

fn unquote(item: &str) -> Option<&str> {
    item.trim().strip_prefix('"')?.strip_suffix('"')
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    const WGS84: &str = r#"GEOGCS["WGS 84",DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563,AUTHORITY["EPSG","7030"]],AUTHORITY["EPSG","6326"]],PRIMEM["Greenwich",0,AUTHORITY["EPSG","8901"]],UNIT["degree",0.0174532925199433,AUTHORITY["EPSG","9122"]],AUTHORITY["EPSG","4326"]]"#;

    #[test]
    fn parses_top_level_authority() {
        let cs = CoordSys::from_wkt(WGS84).unwrap();
        assert_eq!(cs.kind(), CoordSysKind::Geographic);
        assert_eq!(cs.name(), "WGS 84");
        assert_eq!(cs.authority(), Some("EPSG"));
        assert_eq!(cs.authority_code(), Some(4326));
        assert_eq!(cs.to_wkt(), WGS84);
    }

    #[test]
    fn without_authority() {
        let cs = CoordSys::from_wkt(r#"LOCAL_CS["Engineering", UNIT["metre", 1]]"#).unwrap();
        assert_eq!(cs.kind(), CoordSysKind::Local);
        assert_eq!(cs.authority(), None);
        assert_eq!(cs.authority_code(), None);
    }

    #[test]
    fn invalid_wkt() {
        assert_matches!(CoordSys::from_wkt("not a wkt"), Err(CrsError::Wkt(_)));
        assert_matches!(
            CoordSys::from_wkt(r#"GEOGCS["WGS 84",DATUM["x"]"#),
            Err(CrsError::Wkt(_))
        );
        assert_matches!(CoordSys::from_wkt(r#"POINT["a"]"#), Err(CrsError::Wkt(_)));
        assert_matches!(CoordSys::from_wkt(r#"GEOGCS[1]"#), Err(CrsError::Wkt(_)));
    }
}
