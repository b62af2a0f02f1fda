//! Spatial reference system databases.
//!
//! A database resolves a spatial reference identifier (usually an EPSG code) into an [`SrsEntry`]
//! that holds the definition of the coordinate system. The only implementation shipped with this
//! crate is [`Proj4Data`], which reads the flat data files installed with the proj4 library (e.g.
//! `epsg`, `esri`).
//!
//! ```no_run
//! use cartesia_srs::{CachePolicy, Proj4Data, Proj4DataOptions, SrsDatabase};
//!
//! let db = Proj4Data::open(
//!     "epsg",
//!     Proj4DataOptions::default()
//!         .with_authority("EPSG")
//!         .with_cache(CachePolicy::Preload),
//! )?;
//! let entry = db.get("4326")?.expect("no entry for 4326");
//! assert_eq!(entry.authority_code.as_deref(), Some("4326"));
//! # Ok::<(), cartesia_srs::error::SrsError>(())
//! ```

mod entry;
pub mod error;
mod proj4_data;
mod scanner;

pub use entry::SrsEntry;
pub use proj4_data::{CachePolicy, DataDir, Proj4Data, Proj4DataOptions, PROJ_DATA_DIRS};

use crate::error::SrsError;

/// A source of spatial reference system definitions.
pub trait SrsDatabase {
    /// Returns the entry with the given identifier, or `None` if the database does not contain it.
    fn get(&self, ident: &str) -> Result<Option<SrsEntry>, SrsError>;

    /// Discards any cached entries. Databases without a cache do nothing.
    fn clear_cache(&self) {}
}
