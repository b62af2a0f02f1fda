use std::sync::OnceLock;

use cartesia_srs::SrsDatabase;

use super::persist::InternalCodecs;
use super::{Factory, FactoryConfig, Proj4Text};
use crate::codec::{BinaryGenerator, BinaryParser, TextGenerator, TextParser};
use crate::crs::{CoordSys, ProjectionDef};
use crate::error::CartesiaError;

#[derive(Debug, Clone)]
enum ProjectionInput {
    Def(ProjectionDef),
    Text { proj4: String, radians: bool },
}

/// Convenience type to configure a [`Factory`].
///
/// ```
/// use cartesia::Factory;
/// use cartesia::codec::{TagFormat, TextGeneratorConfig};
///
/// let factory = Factory::builder()
///     .with_srid(4326)
///     .with_proj4("+proj=longlat +datum=WGS84 +no_defs")
///     .with_text_generator(TextGeneratorConfig {
///         tag_format: TagFormat::Ewkt,
///         ..Default::default()
///     })
///     .build()
///     .unwrap();
///
/// let point = factory.point(30.0, 60.0, &[]).unwrap();
/// assert_eq!(factory.generate_text(&point).unwrap(), "SRID=4326;POINT(30 60)");
/// ```
#[derive(Default)]
pub struct FactoryBuilder<'a> {
    srid: Option<i32>,
    has_z: bool,
    has_m: bool,
    lenient_assertions: bool,
    buffer_resolution: Option<u32>,
    projection: Option<ProjectionInput>,
    coord_sys: Option<CoordSys>,
    srs_database: Option<&'a dyn SrsDatabase>,
    text_generator: Option<TextGenerator>,
    text_parser: Option<TextParser>,
    binary_generator: Option<BinaryGenerator>,
    binary_parser: Option<BinaryParser>,
}

impl<'a> FactoryBuilder<'a> {
    /// Creates a builder with every option taken from the configuration record.
    pub fn from_config(config: FactoryConfig) -> Self {
        let mut builder = Self::default()
            .with_z_coordinate(config.has_z)
            .with_m_coordinate(config.has_m)
            .with_lenient_assertions(config.lenient_assertions)
            .with_text_generator(config.text_generator)
            .with_text_parser(config.text_parser)
            .with_binary_generator(config.binary_generator)
            .with_binary_parser(config.binary_parser);
        builder.buffer_resolution = Some(config.buffer_resolution.max(1));

        if let Some(srid) = config.srid {
            builder = builder.with_srid(srid);
        }

        builder.projection = config.proj4.map(|proj4| match proj4 {
            Proj4Text::Text(proj4) => ProjectionInput::Text { proj4, radians: false },
            Proj4Text::WithUnits { proj4, radians } => ProjectionInput::Text { proj4, radians },
        });

        match config.coord_sys {
            Some(wkt) => builder.with_coord_sys_wkt(&wkt),
            None => builder,
        }
    }

    /// Geometries of the factory will have a z coordinate.
    pub fn with_z_coordinate(mut self, has_z: bool) -> Self {
        self.has_z = has_z;
        self
    }

    /// Geometries of the factory will have an m coordinate.
    pub fn with_m_coordinate(mut self, has_m: bool) -> Self {
        self.has_m = has_m;
        self
    }

    /// Sets the spatial reference identifier.
    ///
    /// If the srid is not set, it is taken from the authority code of the coordinate system, or
    /// defaults to `0`.
    pub fn with_srid(mut self, srid: i32) -> Self {
        self.srid = Some(srid);
        self
    }

    /// Accept linear rings that are not closed or not simple.
    pub fn with_lenient_assertions(mut self, lenient: bool) -> Self {
        self.lenient_assertions = lenient;
        self
    }

    /// Sets the buffer resolution. Values less than 1 are replaced with 1.
    pub fn with_buffer_resolution(mut self, resolution: i32) -> Self {
        self.buffer_resolution = Some(resolution.max(1).unsigned_abs());
        self
    }

    /// Sets the projection.
    ///
    /// Replaces the value set by [`FactoryBuilder::with_proj4`].
    pub fn with_projection(mut self, projection: ProjectionDef) -> Self {
        self.projection = Some(ProjectionInput::Def(projection));
        self
    }

    /// Sets the projection from a proj4 definition string. An invalid definition makes
    /// [`FactoryBuilder::build`] fail.
    ///
    /// Replaces the value set by [`FactoryBuilder::with_projection`].
    pub fn with_proj4(mut self, proj4: impl Into<String>) -> Self {
        self.projection = Some(ProjectionInput::Text {
            proj4: proj4.into(),
            radians: false,
        });
        self
    }

    /// Sets the coordinate system descriptor.
    pub fn with_coord_sys(mut self, coord_sys: CoordSys) -> Self {
        self.coord_sys = Some(coord_sys);
        self
    }

    /// Sets the coordinate system descriptor from its WKT form. Invalid text is logged and ignored.
    pub fn with_coord_sys_wkt(mut self, wkt: &str) -> Self {
        self.coord_sys = match CoordSys::from_wkt(wkt) {
            Ok(coord_sys) => Some(coord_sys),
            Err(err) => {
                log::warn!("Ignoring coordinate system definition: {err}");
                None
            }
        };
        self
    }

    /// Database used to look up the projection and the coordinate system by the srid, when they are
    /// not set explicitly.
    pub fn with_srs_database(mut self, database: &'a dyn SrsDatabase) -> Self {
        self.srs_database = Some(database);
        self
    }

    /// Sets the text generator, or its configuration.
    pub fn with_text_generator(mut self, generator: impl Into<TextGenerator>) -> Self {
        self.text_generator = Some(generator.into());
        self
    }

    /// Sets the text parser, or its configuration.
    pub fn with_text_parser(mut self, parser: impl Into<TextParser>) -> Self {
        self.text_parser = Some(parser.into());
        self
    }

    /// Sets the binary generator, or its configuration.
    pub fn with_binary_generator(mut self, generator: impl Into<BinaryGenerator>) -> Self {
        self.binary_generator = Some(generator.into());
        self
    }

    /// Sets the binary parser, or its configuration.
    pub fn with_binary_parser(mut self, parser: impl Into<BinaryParser>) -> Self {
        self.binary_parser = Some(parser.into());
        self
    }

    /// Creates the factory.
    ///
    /// Fails if the proj4 definition is invalid or the database cannot be read.
    pub fn build(self) -> Result<Factory, CartesiaError> {
        let mut projection = match self.projection {
            Some(ProjectionInput::Def(def)) => Some(def),
            Some(ProjectionInput::Text { proj4, radians }) => {
                Some(ProjectionDef::parse(&proj4)?.with_radians(radians))
            }
            None => None,
        };
        let mut coord_sys = self.coord_sys;

        if projection.is_none() || coord_sys.is_none() {
            if let (Some(srid), Some(database)) = (self.srid, self.srs_database) {
                match database.get(&srid.to_string())? {
                    Some(entry) => {
                        log::debug!("Resolved srid {srid} from the spatial reference database");
                        if projection.is_none() {
                            projection = entry.proj4.as_deref().and_then(parse_entry_proj4);
                        }
                        if coord_sys.is_none() {
                            coord_sys = entry.coord_sys.as_deref().and_then(parse_entry_coord_sys);
                        }
                    }
                    None => {
                        log::debug!("Srid {srid} is not found in the spatial reference database")
                    }
                }
            }
        }

        let srid = self
            .srid
            .or_else(|| coord_sys.as_ref().and_then(CoordSys::authority_code))
            .unwrap_or(0);

        Ok(Factory {
            srid,
            has_z: self.has_z,
            has_m: self.has_m,
            projection,
            coord_sys,
            lenient_assertions: self.lenient_assertions,
            buffer_resolution: self.buffer_resolution.unwrap_or(1),
            text_generator: self.text_generator.unwrap_or_default(),
            text_parser: self.text_parser.unwrap_or_default(),
            binary_generator: self.binary_generator.unwrap_or_default(),
            binary_parser: self.binary_parser.unwrap_or_default(),
            hash: OnceLock::new(),
            internal: InternalCodecs::default(),
        })
    }
}

fn parse_entry_proj4(proj4: &str) -> Option<ProjectionDef> {
    ProjectionDef::parse(proj4)
        .map_err(|err| log::warn!("Ignoring projection from the spatial reference database: {err}"))
        .ok()
}

fn parse_entry_coord_sys(wkt: &str) -> Option<CoordSys> {
    CoordSys::from_wkt(wkt)
        .map_err(|err| {
            log::warn!("Ignoring coordinate system from the spatial reference database: {err}")
        })
        .ok()
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use cartesia_srs::error::SrsError;
    use cartesia_srs::SrsEntry;

    use super::*;
    use crate::crs::CrsError;

    struct SingleEntry(SrsEntry);

    impl SrsDatabase for SingleEntry {
        fn get(&self, ident: &str) -> Result<Option<SrsEntry>, SrsError> {
            Ok((ident == self.0.identifier).then(|| self.0.clone()))
        }
    }

    fn database() -> SingleEntry {
        SingleEntry(SrsEntry {
            identifier: "4326".into(),
            proj4: Some("+proj=longlat +datum=WGS84 +no_defs".into()),
            coord_sys: Some(r#"GEOGCS["WGS 84",AUTHORITY["EPSG","4326"]]"#.into()),
            ..Default::default()
        })
    }

    #[test]
    fn resolves_from_database() {
        let database = database();
        let factory = Factory::builder()
            .with_srid(4326)
            .with_srs_database(&database)
            .build()
            .unwrap();

        assert!(factory.projection().unwrap().is_geographic());
        assert_eq!(factory.coord_sys().unwrap().name(), "WGS 84");
    }

    #[test]
    fn explicit_values_take_precedence() {
        let database = database();
        let factory = Factory::builder()
            .with_srid(4326)
            .with_proj4("+proj=merc")
            .with_srs_database(&database)
            .build()
            .unwrap();

        assert_eq!(factory.projection().unwrap().param("proj"), Some("merc"));
        assert_eq!(factory.coord_sys().unwrap().authority_code(), Some(4326));
    }

    #[test]
    fn srid_from_coord_sys() {
        let factory = Factory::builder()
            .with_coord_sys_wkt(r#"PROJCS["WGS 84 / Pseudo-Mercator",AUTHORITY["EPSG","3857"]]"#)
            .build()
            .unwrap();
        assert_eq!(factory.srid(), 3857);

        let factory = Factory::builder().with_coord_sys_wkt("not a wkt").build().unwrap();
        assert_eq!(factory.srid(), 0);
        assert!(factory.coord_sys().is_none());
    }

    #[test]
    fn invalid_proj4_fails() {
        assert_matches!(
            Factory::builder().with_proj4("   ").build(),
            Err(CartesiaError::Crs(CrsError::Proj4(_)))
        );
    }

    #[test]
    fn buffer_resolution_is_clamped() {
        let factory = Factory::builder().with_buffer_resolution(-5).build().unwrap();
        assert_eq!(factory.buffer_resolution(), 1);

        let factory = Factory::builder().with_buffer_resolution(8).build().unwrap();
        assert_eq!(factory.buffer_resolution(), 8);
    }
}
