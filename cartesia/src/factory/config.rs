use serde::{Deserialize, Serialize};

use super::Factory;
use crate::codec::{
    BinaryGeneratorConfig, BinaryParserConfig, TextGeneratorConfig, TextParserConfig,
};

/// Proj4 definition of a [`FactoryConfig`].
///
/// Serialized either as a plain string, or as `{"proj4": "...", "radians": true}` when the angular
/// units are radians.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Proj4Text {
    /// Definition with degrees as angular units.
    Text(String),
    /// Definition with explicit angular units.
    WithUnits {
        /// Definition string.
        proj4: String,
        /// Whether the angular units are radians.
        radians: bool,
    },
}

/// Declarative configuration of a [`Factory`]. This is also the portable persisted form of a
/// factory.
///
/// ```
/// use cartesia::{Factory, FactoryBuilder, FactoryConfig};
///
/// let config: FactoryConfig = serde_json::from_str(r#"{"srid": 3857, "has_z": true}"#).unwrap();
/// let factory = FactoryBuilder::from_config(config).build().unwrap();
///
/// assert_eq!(factory.srid(), 3857);
/// assert!(factory.has_z());
/// assert!(!factory.has_m());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactoryConfig {
    /// Spatial reference identifier. If absent, it is taken from the coordinate system.
    pub srid: Option<i32>,
    /// Geometries have a z coordinate.
    pub has_z: bool,
    /// Geometries have an m coordinate.
    pub has_m: bool,
    /// Accept invalid linear rings.
    pub lenient_assertions: bool,
    /// Buffer resolution, at least 1.
    pub buffer_resolution: u32,
    /// Proj4 projection.
    pub proj4: Option<Proj4Text>,
    /// WKT of the coordinate system.
    pub coord_sys: Option<String>,
    /// Text generator configuration.
    pub text_generator: TextGeneratorConfig,
    /// Text parser configuration.
    pub text_parser: TextParserConfig,
    /// Binary generator configuration.
    pub binary_generator: BinaryGeneratorConfig,
    /// Binary parser configuration.
    pub binary_parser: BinaryParserConfig,
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self {
            srid: None,
            has_z: false,
            has_m: false,
            lenient_assertions: false,
            buffer_resolution: 1,
            proj4: None,
            coord_sys: None,
            text_generator: TextGeneratorConfig::default(),
            text_parser: TextParserConfig::default(),
            binary_generator: BinaryGeneratorConfig::default(),
            binary_parser: BinaryParserConfig::default(),
        }
    }
}

impl Factory {
    /// Configuration record that recreates this factory.
    pub fn config(&self) -> FactoryConfig {
        let proj4 = self.projection.as_ref().map(|projection| {
            let proj4 = projection
                .original_str()
                .map(str::to_string)
                .unwrap_or_else(|| projection.canonical_str());

            if projection.is_radians() {
                Proj4Text::WithUnits { proj4, radians: true }
            } else {
                Proj4Text::Text(proj4)
            }
        });

        FactoryConfig {
            srid: Some(self.srid),
            has_z: self.has_z,
            has_m: self.has_m,
            lenient_assertions: self.lenient_assertions,
            buffer_resolution: self.buffer_resolution,
            proj4,
            coord_sys: self.coord_sys.as_ref().map(|cs| cs.to_wkt().to_string()),
            text_generator: *self.text_generator.config(),
            text_parser: *self.text_parser.config(),
            binary_generator: *self.binary_generator.config(),
            binary_parser: *self.binary_parser.config(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crs::ProjectionDef;
    use crate::FactoryBuilder;

    #[test]
    fn proj4_forms() {
        let text: Proj4Text = serde_json::from_str(r#""+proj=merc""#).unwrap();
        assert_eq!(text, Proj4Text::Text("+proj=merc".into()));

        let with_units: Proj4Text =
            serde_json::from_str(r#"{"proj4": "+proj=longlat", "radians": true}"#).unwrap();
        assert_eq!(
            with_units,
            Proj4Text::WithUnits {
                proj4: "+proj=longlat".into(),
                radians: true
            }
        );
    }

    #[test]
    fn config_recreates_factory() {
        let projection = ProjectionDef::from_params([("proj", Some("longlat")), ("no_defs", None)])
            .unwrap()
            .with_radians(true);
        let factory = Factory::builder()
            .with_srid(4326)
            .with_m_coordinate(true)
            .with_projection(projection)
            .build()
            .unwrap();

        let config = factory.config();
        assert_eq!(
            config.proj4,
            Some(Proj4Text::WithUnits {
                proj4: "+proj=longlat +no_defs".into(),
                radians: true
            })
        );

        let rebuilt = FactoryBuilder::from_config(config).build().unwrap();
        assert_eq!(rebuilt, factory);
        assert!(rebuilt.projection().unwrap().is_radians());
    }
}
