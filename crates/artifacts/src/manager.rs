//! Standard artifact manager
//!
//! Archived files live under the build directory's `archive/` subdirectory,
//! at the same relative path they had in the workspace.

use runkeep_core::{ArtifactEntry, ArtifactManager, ArtifactView, Error, Result};
use runkeep_storage::{remove_dir_if_exists, BuildDir};
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Files copied into `<build>/archive/`
#[derive(Debug, Clone)]
pub struct StandardArtifactManager {
    archive_dir: PathBuf,
}

impl StandardArtifactManager {
    /// Manager storing under `dir`'s archive directory
    pub fn new(dir: &BuildDir) -> Self {
        StandardArtifactManager {
            archive_dir: dir.archive_dir(),
        }
    }

    /// Root of the stored files
    pub fn archive_dir(&self) -> &Path {
        &self.archive_dir
    }
}

impl ArtifactManager for StandardArtifactManager {
    fn name(&self) -> &'static str {
        "standard"
    }

    fn archive(&self, workspace: &Path, mapping: &BTreeMap<String, String>) -> Result<()> {
        std::fs::create_dir_all(&self.archive_dir)?;
        for (archived, source) in mapping {
            let target = resolve(&self.archive_dir, archived)?;
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::copy(resolve(workspace, source)?, &target)?;
        }
        debug!(
            files = mapping.len(),
            dir = %self.archive_dir.display(),
            "Archived files"
        );
        Ok(())
    }

    fn delete(&self) -> Result<bool> {
        remove_dir_if_exists(&self.archive_dir)
    }

    fn root(&self) -> Box<dyn ArtifactView> {
        Box::new(FileView {
            root: self.archive_dir.clone(),
        })
    }
}

/// Read-only view of a directory tree
#[derive(Debug, Clone)]
pub struct FileView {
    root: PathBuf,
}

impl FileView {
    /// View of `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FileView { root: root.into() }
    }
}

impl ArtifactView for FileView {
    fn exists(&self) -> bool {
        self.root.is_dir()
    }

    fn list(&self) -> Result<Vec<ArtifactEntry>> {
        if !self.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(&self.root)
                .map_err(|e| Error::Internal(e.to_string()))?;
            entries.push(ArtifactEntry {
                relative_path: slash_path(relative),
                size: entry.metadata()?.len(),
            });
        }
        entries.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
        Ok(entries)
    }

    fn read(&self, relative_path: &str) -> Result<Vec<u8>> {
        Ok(std::fs::read(resolve(&self.root, relative_path)?)?)
    }
}

/// `/`-separated form of a relative path
pub(crate) fn slash_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Join a `/`-separated relative path onto `base`, refusing to leave it
fn resolve(base: &Path, relative: &str) -> Result<PathBuf> {
    let mut path = base.to_path_buf();
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => path.push(part),
            Component::CurDir => {}
            _ => {
                return Err(Error::Config(format!(
                    "'{}' is not a relative path inside {}",
                    relative,
                    base.display()
                )))
            }
        }
    }
    Ok(path)
}
