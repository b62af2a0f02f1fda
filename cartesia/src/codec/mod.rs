//! Text (WKT, EWKT) and binary (WKB, EWKB) codecs.
//!
//! Every [`Factory`](crate::Factory) carries four codecs: a generator and a parser for each of the
//! two formats. A codec is built from a small serializable configuration record, so the
//! configuration can be stored together with the factory.
//!
//! Reading and writing of the formats is done by [`geozero`]. All geometry types implement
//! [`GeozeroGeometry`](geozero::GeozeroGeometry), so they can also be used with any other geozero
//! processor.

mod binary;
mod processor;
mod text;
mod writer;

pub use binary::{
    BinaryFormat, BinaryGenerator, BinaryGeneratorConfig, BinaryParser, BinaryParserConfig,
};
pub use text::{
    CaseConversion, TagFormat, TextGenerator, TextGeneratorConfig, TextParser, TextParserConfig,
};

use geozero::CoordDimensions;

use crate::Factory;

/// Coordinate dimensions of the geometries of the factory.
pub(crate) fn dimensions(factory: &Factory) -> CoordDimensions {
    let mut dims = CoordDimensions::xy();
    dims.z = factory.has_z();
    dims.m = factory.has_m();
    dims
}
