//! On-disk layout
//!
//! ```text
//! <root>/
//!   jobs/
//!     <job>/
//!       nextBuildNumber  next number to allocate
//!       builds/
//!         1/
//!           build.json     build record
//!           log            console log (or log.gz)
//!           archive/       artifacts of the standard artifact manager
//!         2/
//!         2013-11-18_10-35-49/   legacy directory, number read from build.json
//! ```
//!
//! A build directory is the unit of deletion. Removing the `archive/`
//! subdirectory is the unit of retention cleanup.

use crate::record::{BuildFile, RECORD_FILE_NAME};
use chrono::{Local, NaiveDateTime, TimeZone, Utc};
use flate2::read::GzDecoder;
use runkeep_core::{BuildNumber, Result, Timestamp};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Format of legacy, timestamp-named build directories
pub const LEGACY_DIR_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

const ARCHIVE_DIR_NAME: &str = "archive";
const LOG_FILE_NAME: &str = "log";
const COMPRESSED_LOG_FILE_NAME: &str = "log.gz";
const NEXT_NUMBER_FILE_NAME: &str = "nextBuildNumber";

/// Parse a legacy build directory name such as `2013-11-18_10-35-49`
///
/// The name is local wall-clock time. Returns `None` for anything that
/// is not in that format.
pub fn parse_timestamp_dir_name(name: &str) -> Option<Timestamp> {
    let naive = NaiveDateTime::parse_from_str(name, LEGACY_DIR_FORMAT).ok()?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|t| t.with_timezone(&Utc))
}

/// Remove a directory tree, treating "already gone" as success
///
/// Returns whether anything was removed.
pub fn remove_dir_if_exists(path: &Path) -> Result<bool> {
    match std::fs::remove_dir_all(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

// ============================================================================
// Job directory
// ============================================================================

/// Directory of one job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobDir {
    path: PathBuf,
}

/// A build found on disk
#[derive(Debug, Clone)]
pub struct StoredBuild {
    /// Where it lives
    pub dir: BuildDir,
    /// Its record, with `start_time` filled from a legacy name if needed
    pub record: BuildFile,
}

impl JobDir {
    /// Job directory `<root>/jobs/<name>`
    pub fn new(root: &Path, name: &str) -> Self {
        JobDir {
            path: root.join("jobs").join(name),
        }
    }

    /// Path of the job directory
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the builds directory
    pub fn builds_dir(&self) -> PathBuf {
        self.path.join("builds")
    }

    /// Create the job and builds directories
    pub fn ensure(&self) -> Result<()> {
        std::fs::create_dir_all(self.builds_dir())?;
        Ok(())
    }

    /// Read the persisted next build number
    ///
    /// `None` when the file is missing or unreadable; callers fall back to
    /// the highest number found on disk.
    pub fn read_next_number(&self) -> Result<Option<BuildNumber>> {
        let path = self.path.join(NEXT_NUMBER_FILE_NAME);
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        match text.trim().parse::<u64>() {
            Ok(n) if n > 0 => Ok(Some(BuildNumber::new(n))),
            _ => {
                warn!("Ignoring malformed {}: {:?}", path.display(), text.trim());
                Ok(None)
            }
        }
    }

    /// Persist the next build number
    pub fn write_next_number(&self, number: BuildNumber) -> Result<()> {
        std::fs::create_dir_all(&self.path)?;
        std::fs::write(self.path.join(NEXT_NUMBER_FILE_NAME), format!("{}\n", number))?;
        Ok(())
    }

    /// Directory of build `number`
    pub fn build(&self, number: BuildNumber) -> BuildDir {
        BuildDir {
            path: self.builds_dir().join(number.to_string()),
        }
    }

    /// Scan the builds directory, ordered by number
    ///
    /// Numeric directories win over legacy timestamp directories carrying
    /// the same number. Directories without a readable record are skipped
    /// with a warning; they are not an error for the job as a whole.
    pub fn list_builds(&self) -> Result<Vec<StoredBuild>> {
        let builds_dir = self.builds_dir();
        let entries = match std::fs::read_dir(&builds_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No builds directory at {}", builds_dir.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let mut found: BTreeMap<BuildNumber, (bool, StoredBuild)> = BTreeMap::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            let numeric = name.parse::<u64>().ok();
            let legacy_time = parse_timestamp_dir_name(&name);
            if numeric.is_none() && legacy_time.is_none() {
                continue;
            }

            let dir = BuildDir { path: entry.path() };
            let mut record = match BuildFile::read_from(&dir.record_file()) {
                Ok(record) => record,
                Err(e) => {
                    warn!("Skipping build directory {}: {}", dir.path().display(), e);
                    continue;
                }
            };
            if let Some(n) = numeric {
                if record.number.get() != n {
                    warn!(
                        "Skipping build directory {}: record says #{}",
                        dir.path().display(),
                        record.number
                    );
                    continue;
                }
            }
            if record.number.get() == 0 {
                warn!("Skipping build directory {}: build numbers start at 1", dir.path().display());
                continue;
            }
            if record.start_time.is_none() {
                record.start_time = legacy_time;
            }

            let is_numeric = numeric.is_some();
            let number = record.number;
            match found.get(&number) {
                Some((true, _)) if !is_numeric => continue,
                Some((false, existing)) if !is_numeric => {
                    warn!(
                        "Duplicate legacy directories for #{}: keeping {}",
                        number,
                        existing.dir.path().display()
                    );
                    continue;
                }
                _ => {}
            }
            found.insert(number, (is_numeric, StoredBuild { dir, record }));
        }

        Ok(found.into_values().map(|(_, b)| b).collect())
    }
}

// ============================================================================
// Build directory
// ============================================================================

/// Directory of one build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildDir {
    path: PathBuf,
}

impl BuildDir {
    /// Wrap an existing path
    pub fn at(path: impl Into<PathBuf>) -> Self {
        BuildDir { path: path.into() }
    }

    /// Path of the build directory
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the directory exists
    pub fn exists(&self) -> bool {
        self.path.is_dir()
    }

    /// Path of `build.json`
    pub fn record_file(&self) -> PathBuf {
        self.path.join(RECORD_FILE_NAME)
    }

    /// Directory of the standard artifact store
    pub fn archive_dir(&self) -> PathBuf {
        self.path.join(ARCHIVE_DIR_NAME)
    }

    /// Console log file
    ///
    /// `log` if it exists, else `log.gz` if that exists, else the path
    /// `log` (which may not exist yet).
    pub fn log_file(&self) -> PathBuf {
        let plain = self.path.join(LOG_FILE_NAME);
        if plain.exists() {
            return plain;
        }
        let compressed = self.path.join(COMPRESSED_LOG_FILE_NAME);
        if compressed.exists() {
            return compressed;
        }
        plain
    }

    /// Open the console log for reading
    ///
    /// A `log.gz` is decompressed on the fly. `None` when neither file
    /// exists.
    pub fn log_reader(&self) -> Result<Option<Box<dyn Read + Send>>> {
        let path = self.log_file();
        let file = match File::open(&path) {
            Ok(file) => BufReader::new(file),
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if path.extension().is_some_and(|ext| ext == "gz") {
            Ok(Some(Box::new(GzDecoder::new(file))))
        } else {
            Ok(Some(Box::new(file)))
        }
    }

    /// Whole console log as text; empty when there is none
    pub fn read_log(&self) -> Result<String> {
        let mut text = String::new();
        if let Some(mut reader) = self.log_reader()? {
            reader.read_to_string(&mut text)?;
        }
        Ok(text)
    }

    /// Save the build record, creating the directory if needed
    pub fn save(&self, record: &BuildFile) -> Result<()> {
        std::fs::create_dir_all(&self.path)?;
        record.write_to(&self.record_file())
    }

    /// Load the build record
    pub fn load(&self) -> Result<BuildFile> {
        BuildFile::read_from(&self.record_file())
    }

    /// Write the console log as plain text
    pub fn write_log(&self, text: &str) -> Result<()> {
        std::fs::create_dir_all(&self.path)?;
        std::fs::write(self.path.join(LOG_FILE_NAME), text)?;
        Ok(())
    }

    /// Remove the whole build directory; absent is fine
    pub fn remove(&self) -> Result<bool> {
        remove_dir_if_exists(&self.path)
    }
}
