use geozero::error::GeozeroError;
use geozero::wkt::WktDialect;
use geozero::ToWkt;
use serde::{Deserialize, Serialize};

use super::dimensions;
use super::processor::GeometryBuilder;
use crate::error::CartesiaError;
use crate::geometry::{Geometry, SimpleGeometry};
use crate::Factory;

const SRID_PREFIX: &str = "SRID=";

const GEOMETRY_KEYWORDS: [&str; 7] = [
    "POINT",
    "LINESTRING",
    "POLYGON",
    "MULTIPOINT",
    "MULTILINESTRING",
    "MULTIPOLYGON",
    "GEOMETRYCOLLECTION",
];

/// Dialect of the generated text.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagFormat {
    /// OGC WKT.
    #[default]
    Wkt,
    /// PostGIS EWKT: WKT prefixed with `SRID=<srid>;`.
    Ewkt,
}

/// Letter case of the generated text.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseConversion {
    /// `POINT(1 2)`
    #[default]
    Upper,
    /// `point(1 2)`
    Lower,
    /// Output of the writer as is.
    Preserve,
}

/// Configuration of a [`TextGenerator`].
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct TextGeneratorConfig {
    /// Dialect of the output.
    pub tag_format: TagFormat,
    /// Letter case of the output.
    pub convert_case: CaseConversion,
}

/// Writes geometries as WKT or EWKT.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextGenerator {
    config: TextGeneratorConfig,
}

impl TextGenerator {
    /// Creates a generator.
    pub fn new(config: TextGeneratorConfig) -> Self {
        Self { config }
    }

    /// Configuration of the generator.
    pub fn config(&self) -> &TextGeneratorConfig {
        &self.config
    }

    /// Writes the geometry. The srid written to EWKT is the srid of the factory of the geometry.
    pub fn generate<'f, G>(&self, geometry: &G) -> Result<String, CartesiaError>
    where
        G: SimpleGeometry<'f> + geozero::GeozeroGeometry,
    {
        let factory = geometry.factory();
        let dims = dimensions(factory);
        let text = match self.config.tag_format {
            TagFormat::Wkt => geometry.to_wkt_with_opts(WktDialect::Wkt, dims, None)?,
            TagFormat::Ewkt => {
                geometry.to_wkt_with_opts(WktDialect::Ewkt, dims, Some(factory.srid()))?
            }
        };
        let text = match (dims.z, dims.m) {
            (false, false) => text,
            (true, false) => tag_dimensions(&text, "Z"),
            (false, true) => tag_dimensions(&text, "M"),
            (true, true) => tag_dimensions(&text, "ZM"),
        };

        Ok(match self.config.convert_case {
            CaseConversion::Upper => text.to_uppercase(),
            CaseConversion::Lower => text.to_lowercase(),
            CaseConversion::Preserve => text,
        })
    }
}

/// Inserts the coordinate dimension tag after every geometry keyword, e.g. `POINT(1 2 3)` becomes
/// `POINT Z (1 2 3)`. Without the tag z and m values cannot be told apart.
fn tag_dimensions(text: &str, tag: &str) -> String {
    let mut tagged = String::with_capacity(text.len() + 4 * tag.len());
    let mut rest = text;
    while let Some(start) = rest.find(|c: char| c.is_ascii_alphabetic()) {
        let (before, word) = rest.split_at(start);
        let end = word
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(word.len());
        let (word, tail) = word.split_at(end);

        tagged.push_str(before);
        tagged.push_str(word);
        if GEOMETRY_KEYWORDS.iter().any(|k| k.eq_ignore_ascii_case(word)) {
            tagged.push(' ');
            tagged.push_str(tag);
            if tail.starts_with('(') {
                tagged.push(' ');
            }
        }

        rest = tail;
    }

    tagged.push_str(rest);
    tagged
}

impl From<TextGeneratorConfig> for TextGenerator {
    fn from(config: TextGeneratorConfig) -> Self {
        Self::new(config)
    }
}

/// Configuration of a [`TextParser`].
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct TextParserConfig {
    /// Accept the `SRID=<srid>;` prefix of EWKT.
    pub support_ewkt: bool,
}

/// Reads geometries from WKT, and from EWKT if enabled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextParser {
    config: TextParserConfig,
}

impl TextParser {
    /// Creates a parser.
    pub fn new(config: TextParserConfig) -> Self {
        Self { config }
    }

    /// Configuration of the parser.
    pub fn config(&self) -> &TextParserConfig {
        &self.config
    }

    /// Parses the text into a geometry of the `factory`.
    ///
    /// The srid of an EWKT input is not applied to the geometry: the result always belongs to
    /// `factory`.
    pub fn parse<'f>(
        &self,
        factory: &'f Factory,
        text: &str,
    ) -> Result<Geometry<'f>, CartesiaError> {
        let mut body = text.trim();

        let prefix = body.get(..SRID_PREFIX.len());
        if prefix.is_some_and(|prefix| prefix.eq_ignore_ascii_case(SRID_PREFIX)) {
            if !self.config.support_ewkt {
                return Err(GeozeroError::Geometry("EWKT input is not enabled".into()).into());
            }

            let (srid, rest) = body[SRID_PREFIX.len()..]
                .split_once(';')
                .ok_or_else(|| GeozeroError::Geometry("missing ';' after srid".into()))?;
            let srid: i32 = srid
                .trim()
                .parse()
                .map_err(|_| GeozeroError::Geometry(format!("invalid srid: {srid}")))?;
            if srid != factory.srid() {
                log::debug!(
                    "Parsing EWKT with srid {srid} into a factory with srid {}",
                    factory.srid()
                );
            }

            body = rest.trim_start();
        }

        let mut builder = GeometryBuilder::new(factory);
        geozero::wkt::read_wkt(&mut body.as_bytes(), &mut builder)?;
        builder.finish()
    }
}

impl From<TextParserConfig> for TextParser {
    fn from(config: TextParserConfig) -> Self {
        Self::new(config)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::geometry::GeometryKind;

    #[test]
    fn parse_line_string() {
        let factory = Factory::default();
        let geometry = TextParser::default()
            .parse(&factory, "LINESTRING(0 0, 1 1, 2 0)")
            .unwrap();

        assert_eq!(geometry.geometry_kind(), GeometryKind::LineString);
        assert_eq!(geometry.as_curve().unwrap().num_points(), 3);
    }

    #[test]
    fn parse_invalid_geometry() {
        let factory = Factory::default();
        let parser = TextParser::default();

        assert_matches!(
            parser.parse(&factory, "POLYGON((0 0, 1 1, 1 0, 0 1, 0 0))"),
            Err(CartesiaError::InvalidGeometry(_))
        );
        assert_matches!(
            parser.parse(&factory, "LINESTRING(0 0"),
            Err(CartesiaError::Codec(_))
        );
    }

    #[test]
    fn ewkt_prefix() {
        let factory = Factory::builder().with_srid(4326).build().unwrap();
        let text = "SRID=4326;POINT(1 2)";

        assert_matches!(
            TextParser::default().parse(&factory, text),
            Err(CartesiaError::Codec(_))
        );

        let parser = TextParser::new(TextParserConfig { support_ewkt: true });
        let point = parser.parse(&factory, text).unwrap();
        assert_eq!(point.as_point().unwrap().x(), 1.0);
        assert_eq!(point.srid(), 4326);

        assert_matches!(
            parser.parse(&factory, "SRID=abc;POINT(1 2)"),
            Err(CartesiaError::Codec(_))
        );
    }

    #[test]
    fn generate_case_and_dialect() {
        let factory = Factory::builder().with_srid(3857).build().unwrap();
        let point = factory.point(1.0, 2.0, &[]).unwrap();

        let wkt = TextGenerator::default().generate(&point).unwrap();
        assert_eq!(wkt, "POINT(1 2)");

        let lower = TextGenerator::new(TextGeneratorConfig {
            tag_format: TagFormat::Wkt,
            convert_case: CaseConversion::Lower,
        });
        assert_eq!(lower.generate(&point).unwrap(), "point(1 2)");

        let ewkt = TextGenerator::new(TextGeneratorConfig {
            tag_format: TagFormat::Ewkt,
            convert_case: CaseConversion::Upper,
        });
        assert_eq!(ewkt.generate(&point).unwrap(), "SRID=3857;POINT(1 2)");
    }

    #[test]
    fn text_round_trip_with_z() {
        let factory = Factory::builder().with_z_coordinate(true).build().unwrap();
        let line = factory
            .line_string([
                factory.point(0.0, 0.0, &[1.0]).unwrap(),
                factory.point(1.0, 1.0, &[2.0]).unwrap(),
            ])
            .unwrap();

        let text = TextGenerator::default().generate(&line).unwrap();
        assert_eq!(text, "LINESTRING Z (0 0 1,1 1 2)");
        let parsed = TextParser::default().parse(&factory, &text).unwrap();
        assert_eq!(parsed, line.to_geometry());
    }

    #[test]
    fn m_values_are_not_read_as_z() {
        let factory = Factory::builder().with_m_coordinate(true).build().unwrap();
        let point = factory.point(1.0, 2.0, &[5.0]).unwrap();

        let text = TextGenerator::default().generate(&point).unwrap();
        assert_eq!(text, "POINT M (1 2 5)");

        let parsed = TextParser::default().parse(&factory, &text).unwrap();
        let parsed = parsed.as_point().unwrap();
        assert_eq!(parsed.z(), None);
        assert_eq!(parsed.m(), Some(5.0));
    }

    #[test]
    fn collection_members_are_tagged() {
        let factory = Factory::builder()
            .with_srid(4326)
            .with_z_coordinate(true)
            .with_m_coordinate(true)
            .build()
            .unwrap();
        let point = factory.point(1.0, 2.0, &[3.0, 4.0]).unwrap();
        let line = factory
            .line_string([point.clone(), factory.point(5.0, 6.0, &[7.0, 8.0]).unwrap()])
            .unwrap();
        let collection = factory
            .collection([point.to_geometry(), line.to_geometry()])
            .unwrap();

        let ewkt = TextGenerator::new(TextGeneratorConfig {
            tag_format: TagFormat::Ewkt,
            convert_case: CaseConversion::Lower,
        });
        let text = ewkt.generate(&collection).unwrap();
        assert!(text.starts_with("srid=4326;geometrycollection zm (point zm (1 2 3 4)"));

        let parser = TextParser::new(TextParserConfig { support_ewkt: true });
        let parsed = parser.parse(&factory, &text).unwrap();
        assert_eq!(parsed, collection.to_geometry());
    }

    #[test]
    fn dimension_tags_skip_other_words() {
        assert_eq!(
            tag_dimensions("SRID=1;MULTIPOINT(1 2 3,NaN 2 3)", "Z"),
            "SRID=1;MULTIPOINT Z (1 2 3,NaN 2 3)"
        );
        assert_eq!(tag_dimensions("LINESTRING EMPTY", "M"), "LINESTRING M EMPTY");
    }
}
