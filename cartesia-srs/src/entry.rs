/// A single record of a spatial reference system database.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SrsEntry {
    /// Identifier the entry was looked up by.
    pub identifier: String,
    /// Name of the authority that defined the coordinate system, e.g. `EPSG`.
    pub authority: Option<String>,
    /// Code of the coordinate system within the authority.
    pub authority_code: Option<String>,
    /// Human readable name.
    pub name: Option<String>,
    /// Proj4 definition string.
    pub proj4: Option<String>,
    /// OGC WKT coordinate system definition.
    pub coord_sys: Option<String>,
}

impl SrsEntry {
    /// Creates an entry read from a proj4 data file.
    ///
    /// If `authority` is set, the identifier is also used as the authority code.
    pub(crate) fn from_record(
        identifier: String,
        authority: Option<&str>,
        name: Option<String>,
        proj4: String,
    ) -> Self {
        Self {
            authority_code: authority.map(|_| identifier.clone()),
            authority: authority.map(str::to_string),
            identifier,
            name,
            proj4: Some(proj4),
            coord_sys: None,
        }
    }
}
