use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::entry::SrsEntry;
use crate::error::SrsError;
use crate::scanner::RecordScanner;
use crate::SrsDatabase;

/// Directories where proj4 data files are usually installed, in the order they are probed by
/// [`DataDir::Auto`].
pub const PROJ_DATA_DIRS: [&str; 8] = [
    "/usr/local/share/proj",
    "/usr/local/proj/share/proj",
    "/usr/local/proj4/share/proj",
    "/opt/local/share/proj",
    "/opt/proj/share/proj",
    "/opt/proj4/share/proj",
    "/opt/share/proj",
    "/usr/share/proj",
];

/// Where to look for the data file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DataDir {
    /// Use the first existing and readable directory of [`PROJ_DATA_DIRS`]. If none is found, the
    /// file name is used as is.
    #[default]
    Auto,
    /// Look for the file in the given directory.
    Explicit(PathBuf),
    /// Do not use any directory, the file name is a complete path.
    None,
}

/// Caching strategy of a [`Proj4Data`] database.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum CachePolicy {
    /// No caching, the file is scanned on every lookup.
    #[default]
    None,
    /// Results of lookups (including misses) are remembered, each missing identifier triggers a
    /// scan that stops at the first matching record.
    Lookups,
    /// The whole file is read into the cache on the first lookup.
    FillOnFirstMiss,
    /// The whole file is read into the cache when the database is opened.
    Preload,
}

/// Options for [`Proj4Data::open`].
#[derive(Debug, Clone, Default)]
pub struct Proj4DataOptions {
    dir: DataDir,
    cache: CachePolicy,
    authority: Option<String>,
}

impl Proj4DataOptions {
    /// Sets the directory to look for the data file in. Defaults to [`DataDir::Auto`].
    pub fn with_dir(mut self, dir: DataDir) -> Self {
        self.dir = dir;
        self
    }

    /// Sets the caching strategy. Defaults to [`CachePolicy::None`].
    pub fn with_cache(mut self, cache: CachePolicy) -> Self {
        self.cache = cache;
        self
    }

    /// Sets the authority name for all returned entries. The identifier of an entry becomes its
    /// authority code.
    pub fn with_authority(mut self, authority: impl Into<String>) -> Self {
        self.authority = Some(authority.into());
        self
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum FillState {
    Unfilled,
    Filled,
}

#[derive(Debug)]
struct Cache {
    entries: HashMap<String, Option<SrsEntry>, ahash::RandomState>,
    state: FillState,
}

/// Database backed by one of the data files installed as a part of the proj4 library (e.g. `epsg`).
#[derive(Debug)]
pub struct Proj4Data {
    path: PathBuf,
    authority: Option<String>,
    policy: CachePolicy,
    cache: Mutex<Cache>,
}

impl Proj4Data {
    /// Connects to the data file `filename`.
    ///
    /// With [`CachePolicy::Preload`] the whole file is read before this method returns, so a
    /// missing file is reported here. Otherwise the file is only accessed on lookups.
    pub fn open(filename: impl AsRef<Path>, options: Proj4DataOptions) -> Result<Self, SrsError> {
        let Proj4DataOptions {
            dir,
            cache,
            authority,
        } = options;

        let dir = match dir {
            DataDir::Auto => probe_data_dir(),
            DataDir::Explicit(dir) => Some(dir),
            DataDir::None => None,
        };
        let path = match dir {
            Some(dir) => dir.join(filename),
            None => filename.as_ref().to_path_buf(),
        };

        let db = Self {
            path,
            authority,
            policy: cache,
            cache: Mutex::new(Cache {
                entries: HashMap::default(),
                state: FillState::Unfilled,
            }),
        };

        if cache == CachePolicy::Preload {
            db.fill(&mut db.cache.lock())?;
        }

        Ok(db)
    }

    /// Full path of the data file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Caching strategy of the database.
    pub fn cache_policy(&self) -> CachePolicy {
        self.policy
    }

    fn scanner(&self) -> Result<RecordScanner<BufReader<File>>, SrsError> {
        log::debug!("Scanning srs data file {}", self.path.display());
        Ok(RecordScanner::new(BufReader::new(File::open(&self.path)?)))
    }

    /// Scans the file until the first record with the given identifier.
    fn search(&self, ident: &str) -> Result<Option<SrsEntry>, SrsError> {
        for record in self.scanner()? {
            let record = record?;
            if record.ident == ident {
                return Ok(Some(SrsEntry::from_record(
                    record.ident,
                    self.authority.as_deref(),
                    record.name,
                    record.body,
                )));
            }
        }

        Ok(None)
    }

    /// Reads every record of the file into the cache. Records are keyed by their own identifiers,
    /// and the first record wins if an identifier is repeated.
    fn fill(&self, cache: &mut Cache) -> Result<(), SrsError> {
        for record in self.scanner()? {
            let record = record?;
            if cache.entries.contains_key(&record.ident) {
                continue;
            }

            let entry = SrsEntry::from_record(
                record.ident.clone(),
                self.authority.as_deref(),
                record.name,
                record.body,
            );
            cache.entries.insert(record.ident, Some(entry));
        }

        cache.state = FillState::Filled;
        log::debug!(
            "Cached {} srs entries from {}",
            cache.entries.len(),
            self.path.display()
        );

        Ok(())
    }
}

impl SrsDatabase for Proj4Data {
    fn get(&self, ident: &str) -> Result<Option<SrsEntry>, SrsError> {
        match self.policy {
            CachePolicy::None => self.search(ident),
            CachePolicy::Lookups => {
                let mut cache = self.cache.lock();
                if let Some(entry) = cache.entries.get(ident) {
                    log::trace!("Srs cache hit for {ident}");
                    return Ok(entry.clone());
                }

                let entry = self.search(ident)?;
                cache.entries.insert(ident.to_string(), entry.clone());
                Ok(entry)
            }
            CachePolicy::FillOnFirstMiss | CachePolicy::Preload => {
                let mut cache = self.cache.lock();
                if cache.state == FillState::Unfilled {
                    self.fill(&mut cache)?;
                }

                Ok(cache.entries.get(ident).cloned().flatten())
            }
        }
    }

    fn clear_cache(&self) {
        let mut cache = self.cache.lock();
        cache.entries.clear();
        cache.state = FillState::Unfilled;
        log::debug!("Cleared srs cache of {}", self.path.display());
    }
}

fn probe_data_dir() -> Option<PathBuf> {
    PROJ_DATA_DIRS
        .iter()
        .map(PathBuf::from)
        .find(|dir| dir.is_dir() && std::fs::read_dir(dir).is_ok())
}
