//! Native (bincode) and portable (JSON) persisted forms of factories and geometries.

use std::sync::OnceLock;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{Factory, FactoryBuilder, FactoryConfig};
use crate::codec::{
    BinaryFormat, BinaryGenerator, BinaryGeneratorConfig, BinaryParser, BinaryParserConfig,
    CaseConversion, TagFormat, TextGenerator, TextGeneratorConfig, TextParser, TextParserConfig,
};
use crate::crs::ProjectionDef;
use crate::error::CartesiaError;
use crate::geometry::{Geometry, SimpleGeometry};

/// Codecs used to persist geometries, independent of the codecs configured by the user.
#[derive(Debug, Clone, Default)]
pub(crate) struct InternalCodecs {
    binary_generator: OnceLock<BinaryGenerator>,
    binary_parser: OnceLock<BinaryParser>,
    text_generator: OnceLock<TextGenerator>,
    text_parser: OnceLock<TextParser>,
}

impl InternalCodecs {
    fn binary_generator(&self) -> &BinaryGenerator {
        self.binary_generator.get_or_init(|| {
            log::debug!("Creating native geometry generator");
            BinaryGenerator::new(BinaryGeneratorConfig {
                type_format: BinaryFormat::Ewkb,
                emit_srid: true,
                hex_format: false,
            })
        })
    }

    fn binary_parser(&self) -> &BinaryParser {
        self.binary_parser.get_or_init(|| {
            log::debug!("Creating native geometry parser");
            BinaryParser::new(BinaryParserConfig {
                support_ewkb: true,
                hex_format: false,
            })
        })
    }

    fn text_generator(&self) -> &TextGenerator {
        self.text_generator.get_or_init(|| {
            log::debug!("Creating portable geometry generator");
            TextGenerator::new(TextGeneratorConfig {
                tag_format: TagFormat::Ewkt,
                convert_case: CaseConversion::Upper,
            })
        })
    }

    fn text_parser(&self) -> &TextParser {
        self.text_parser.get_or_init(|| {
            log::debug!("Creating portable geometry parser");
            TextParser::new(TextParserConfig { support_ewkt: true })
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct NativeRecord {
    has_z: bool,
    has_m: bool,
    srid: i32,
    lenient_assertions: bool,
    buffer_resolution: u32,
    text_generator: TextGeneratorConfig,
    text_parser: TextParserConfig,
    binary_generator: BinaryGeneratorConfig,
    binary_parser: BinaryParserConfig,
    projection: Option<Vec<u8>>,
    coord_sys: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct NativeGeometry {
    factory: Vec<u8>,
    ewkb: Vec<u8>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PortableGeometry {
    factory: FactoryConfig,
    wkt: String,
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, CartesiaError> {
    Ok(bincode::serde::encode_to_vec(value, bincode::config::legacy())?)
}

fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T, CartesiaError> {
    let (value, _) = bincode::serde::decode_from_slice(bytes, bincode::config::legacy())?;
    Ok(value)
}

impl Factory {
    /// Compact binary form of the factory.
    pub fn to_native(&self) -> Result<Vec<u8>, CartesiaError> {
        let record = NativeRecord {
            has_z: self.has_z,
            has_m: self.has_m,
            srid: self.srid,
            lenient_assertions: self.lenient_assertions,
            buffer_resolution: self.buffer_resolution,
            text_generator: *self.text_generator.config(),
            text_parser: *self.text_parser.config(),
            binary_generator: *self.binary_generator.config(),
            binary_parser: *self.binary_parser.config(),
            projection: self.projection.as_ref().map(encode).transpose()?,
            coord_sys: self.coord_sys.as_ref().map(|cs| cs.to_wkt().to_string()),
        };

        encode(&record)
    }

    /// Restores a factory from the output of [`Factory::to_native`].
    pub fn from_native(bytes: &[u8]) -> Result<Self, CartesiaError> {
        let record: NativeRecord = decode(bytes)?;

        let mut builder = FactoryBuilder::default()
            .with_srid(record.srid)
            .with_z_coordinate(record.has_z)
            .with_m_coordinate(record.has_m)
            .with_lenient_assertions(record.lenient_assertions)
            .with_buffer_resolution(i32::try_from(record.buffer_resolution).unwrap_or(i32::MAX))
            .with_text_generator(record.text_generator)
            .with_text_parser(record.text_parser)
            .with_binary_generator(record.binary_generator)
            .with_binary_parser(record.binary_parser);

        if let Some(projection) = record.projection {
            builder = builder.with_projection(decode::<ProjectionDef>(&projection)?);
        }
        if let Some(wkt) = record.coord_sys {
            builder = builder.with_coord_sys_wkt(&wkt);
        }

        builder.build()
    }

    /// JSON form of the factory: its [`FactoryConfig`].
    pub fn to_portable(&self) -> Result<String, CartesiaError> {
        Ok(serde_json::to_string(&self.config())?)
    }

    /// Restores a factory from the output of [`Factory::to_portable`].
    pub fn from_portable(text: &str) -> Result<Self, CartesiaError> {
        let config: FactoryConfig = serde_json::from_str(text)?;
        FactoryBuilder::from_config(config).build()
    }
}

impl Serialize for Factory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.config().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Factory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let config = FactoryConfig::deserialize(deserializer)?;
        FactoryBuilder::from_config(config)
            .build()
            .map_err(serde::de::Error::custom)
    }
}

impl Geometry<'_> {
    /// Compact binary form of the geometry together with its factory. Restored with
    /// [`GeometryDump::from_native`].
    pub fn to_native(&self) -> Result<Vec<u8>, CartesiaError> {
        let factory = self.factory();
        encode(&NativeGeometry {
            factory: factory.to_native()?,
            ewkb: factory.internal_codecs().binary_generator().generate(self)?,
        })
    }

    /// JSON form of the geometry together with its factory. Restored with
    /// [`GeometryDump::from_portable`].
    pub fn to_portable(&self) -> Result<String, CartesiaError> {
        let factory = self.factory();
        Ok(serde_json::to_string(&PortableGeometry {
            factory: factory.config(),
            wkt: factory.internal_codecs().text_generator().generate(self)?,
        })?)
    }
}

#[derive(Debug, Clone)]
enum Payload {
    Ewkb(Vec<u8>),
    Ewkt(String),
}

/// A restored persisted geometry.
///
/// Geometries borrow their factory, so the dump owns the restored factory and creates the geometry
/// on request.
///
/// ```
/// use cartesia::{Factory, GeometryDump, SimpleGeometry};
///
/// let factory = Factory::builder().with_srid(4326).build().unwrap();
/// let point = factory.point(1.0, 2.0, &[]).unwrap().to_geometry();
///
/// let dump = GeometryDump::from_portable(&point.to_portable().unwrap()).unwrap();
/// assert_eq!(dump.factory(), &factory);
/// assert!(dump.geometry().unwrap().rep_equals(&point));
/// ```
#[derive(Debug, Clone)]
pub struct GeometryDump {
    factory: Factory,
    payload: Payload,
}

impl GeometryDump {
    /// Reads the output of [`Geometry::to_native`].
    pub fn from_native(bytes: &[u8]) -> Result<Self, CartesiaError> {
        let record: NativeGeometry = decode(bytes)?;
        Ok(Self {
            factory: Factory::from_native(&record.factory)?,
            payload: Payload::Ewkb(record.ewkb),
        })
    }

    /// Reads the output of [`Geometry::to_portable`].
    pub fn from_portable(text: &str) -> Result<Self, CartesiaError> {
        let record: PortableGeometry = serde_json::from_str(text)?;
        Ok(Self {
            factory: FactoryBuilder::from_config(record.factory).build()?,
            payload: Payload::Ewkt(record.wkt),
        })
    }

    /// The restored factory.
    pub fn factory(&self) -> &Factory {
        &self.factory
    }

    /// Creates the geometry with the restored factory.
    pub fn geometry(&self) -> Result<Geometry<'_>, CartesiaError> {
        let codecs = self.factory.internal_codecs();
        match &self.payload {
            Payload::Ewkb(bytes) => codecs.binary_parser().parse(&self.factory, bytes),
            Payload::Ewkt(text) => codecs.text_parser().parse(&self.factory, text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crs::CoordSys;

    fn configured_factory() -> Factory {
        Factory::builder()
            .with_srid(3857)
            .with_z_coordinate(true)
            .with_lenient_assertions(true)
            .with_buffer_resolution(4)
            .with_proj4("+proj=merc +a=6378137 +b=6378137 +units=m")
            .with_coord_sys(
                CoordSys::from_wkt(r#"PROJCS["Pseudo-Mercator",AUTHORITY["EPSG","3857"]]"#)
                    .unwrap(),
            )
            .with_text_generator(TextGeneratorConfig {
                tag_format: TagFormat::Ewkt,
                convert_case: CaseConversion::Lower,
            })
            .build()
            .unwrap()
    }

    #[test]
    fn native_factory_round_trip() {
        let factory = configured_factory();
        let restored = Factory::from_native(&factory.to_native().unwrap()).unwrap();

        assert_eq!(restored, factory);
        assert_eq!(restored.srid(), 3857);
        assert_eq!(restored.buffer_resolution(), 4);
        assert!(restored.lenient_assertions());
        assert_eq!(restored.coord_sys(), factory.coord_sys());
        assert_eq!(restored.text_generator(), factory.text_generator());
    }

    #[test]
    fn portable_factory_round_trip() {
        let factory = configured_factory();
        let text = factory.to_portable().unwrap();
        assert!(text.contains("+proj=merc"));

        let restored = Factory::from_portable(&text).unwrap();
        assert_eq!(restored, factory);
        assert_eq!(restored.config(), factory.config());

        let through_serde: Factory =
            serde_json::from_str(&serde_json::to_string(&factory).unwrap()).unwrap();
        assert_eq!(through_serde, factory);
    }

    #[test]
    fn geometry_round_trips() {
        let factory = configured_factory();
        let line = factory
            .line_string([
                factory.point(0.0, 0.0, &[1.0]).unwrap(),
                factory.point(5.0, 5.0, &[2.0]).unwrap(),
            ])
            .unwrap()
            .to_geometry();

        let native = GeometryDump::from_native(&line.to_native().unwrap()).unwrap();
        assert_eq!(native.factory(), &factory);
        assert!(native.geometry().unwrap().rep_equals(&line));

        let portable = GeometryDump::from_portable(&line.to_portable().unwrap()).unwrap();
        let restored = portable.geometry().unwrap();
        assert!(restored.rep_equals(&line));
        assert_eq!(restored.srid(), 3857);
    }

    #[test]
    fn corrupted_input() {
        assert!(matches!(
            Factory::from_native(&[1, 2]),
            Err(CartesiaError::Serialization(_))
        ));
        assert!(matches!(
            Factory::from_portable("{\"srid\": \"x\"}"),
            Err(CartesiaError::Serialization(_))
        ));
    }
}
