use geozero::wkb::{Ewkb, Wkb};
use geozero::{GeozeroGeometry, ToWkb};
use serde::{Deserialize, Serialize};

use super::dimensions;
use super::processor::GeometryBuilder;
use crate::error::CartesiaError;
use crate::geometry::{Geometry, SimpleGeometry};
use crate::Factory;

/// Binary format version.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryFormat {
    /// ISO WKB.
    #[default]
    Wkb,
    /// PostGIS EWKB, which can carry the srid.
    Ewkb,
}

/// Configuration of a [`BinaryGenerator`].
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct BinaryGeneratorConfig {
    /// Format of the output.
    pub type_format: BinaryFormat,
    /// Write the srid of the geometry. Only used by EWKB.
    pub emit_srid: bool,
    /// Encode the output as hex characters.
    pub hex_format: bool,
}

/// Writes geometries as WKB or EWKB.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BinaryGenerator {
    config: BinaryGeneratorConfig,
}

impl BinaryGenerator {
    /// Creates a generator.
    pub fn new(config: BinaryGeneratorConfig) -> Self {
        Self { config }
    }

    /// Configuration of the generator.
    pub fn config(&self) -> &BinaryGeneratorConfig {
        &self.config
    }

    /// Writes the geometry. With `hex_format` the result consists of ASCII hex digits.
    pub fn generate<'f, G>(&self, geometry: &G) -> Result<Vec<u8>, CartesiaError>
    where
        G: SimpleGeometry<'f> + GeozeroGeometry,
    {
        let factory = geometry.factory();
        let bytes = match self.config.type_format {
            BinaryFormat::Wkb => geometry.to_wkb(dimensions(factory))?,
            BinaryFormat::Ewkb => geometry.to_ewkb(
                dimensions(factory),
                self.config.emit_srid.then(|| factory.srid()),
            )?,
        };

        Ok(if self.config.hex_format {
            hex::encode_upper(bytes).into_bytes()
        } else {
            bytes
        })
    }
}

impl From<BinaryGeneratorConfig> for BinaryGenerator {
    fn from(config: BinaryGeneratorConfig) -> Self {
        Self::new(config)
    }
}

/// Configuration of a [`BinaryParser`].
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct BinaryParserConfig {
    /// Read PostGIS EWKB instead of ISO WKB.
    pub support_ewkb: bool,
    /// The input is encoded as hex characters.
    pub hex_format: bool,
}

/// Reads geometries from WKB or EWKB.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BinaryParser {
    config: BinaryParserConfig,
}

impl BinaryParser {
    /// Creates a parser.
    pub fn new(config: BinaryParserConfig) -> Self {
        Self { config }
    }

    /// Configuration of the parser.
    pub fn config(&self) -> &BinaryParserConfig {
        &self.config
    }

    /// Parses the input into a geometry of the `factory`.
    pub fn parse<'f>(
        &self,
        factory: &'f Factory,
        input: &[u8],
    ) -> Result<Geometry<'f>, CartesiaError> {
        let bytes = if self.config.hex_format {
            hex::decode(input)?
        } else {
            input.to_vec()
        };

        let mut builder = GeometryBuilder::new(factory);
        if self.config.support_ewkb {
            Ewkb(bytes).process_geom(&mut builder)?;
        } else {
            Wkb(bytes).process_geom(&mut builder)?;
        }

        if let Some(srid) = builder.parsed_srid() {
            if srid != factory.srid() {
                log::debug!(
                    "Parsing EWKB with srid {srid} into a factory with srid {}",
                    factory.srid()
                );
            }
        }

        builder.finish()
    }
}

impl From<BinaryParserConfig> for BinaryParser {
    fn from(config: BinaryParserConfig) -> Self {
        Self::new(config)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::geometry::GeometryKind;

    fn square(factory: &Factory) -> Geometry<'_> {
        let points: Vec<_> = [(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)]
            .iter()
            .map(|&(x, y)| factory.point(x, y, &[]).unwrap())
            .collect();
        let ring = factory.linear_ring(points).unwrap();
        factory
            .polygon(ring, Vec::<Geometry>::new())
            .unwrap()
            .to_geometry()
    }

    #[test]
    fn wkb_round_trip() {
        let factory = Factory::default();
        let polygon = square(&factory);

        let bytes = BinaryGenerator::default().generate(&polygon).unwrap();
        let parsed = BinaryParser::default().parse(&factory, &bytes).unwrap();

        assert_eq!(parsed.geometry_kind(), GeometryKind::Polygon);
        assert_eq!(parsed, polygon);
    }

    #[test]
    fn hex_ewkb_round_trip() {
        let factory = Factory::builder()
            .with_srid(4326)
            .with_z_coordinate(true)
            .build()
            .unwrap();
        let point = factory.point(1.0, 2.0, &[3.0]).unwrap().to_geometry();

        let generator = BinaryGenerator::new(BinaryGeneratorConfig {
            type_format: BinaryFormat::Ewkb,
            emit_srid: true,
            hex_format: true,
        });
        let hex = generator.generate(&point).unwrap();
        assert!(hex.iter().all(u8::is_ascii_hexdigit));

        let parser = BinaryParser::new(BinaryParserConfig {
            support_ewkb: true,
            hex_format: true,
        });
        assert_eq!(parser.parse(&factory, &hex).unwrap(), point);
    }

    #[test]
    fn invalid_input() {
        let factory = Factory::default();

        assert_matches!(
            BinaryParser::default().parse(&factory, &[1, 2, 3]),
            Err(CartesiaError::Codec(_))
        );

        let hex = BinaryParser::new(BinaryParserConfig {
            support_ewkb: false,
            hex_format: true,
        });
        assert_matches!(hex.parse(&factory, b"not hex"), Err(CartesiaError::Hex(_)));
    }
}
