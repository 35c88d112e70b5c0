//! Include/exclude pattern matching
//!
//! An expression is a list of glob tokens separated by commas or
//! whitespace. Tokens are matched against `/`-separated paths relative to
//! the workspace root:
//!
//! | Token | Matches |
//! |-------|---------|
//! | `*.jar` | `app.jar` (not `lib/app.jar`) |
//! | `**/*.jar` | `app.jar`, `lib/app.jar` |
//! | `docs/` | everything under `docs` |
//!
//! Version-control metadata (`.git/`, `.svn/` and the like) is excluded by
//! default.

use crate::manager::slash_path;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use runkeep_core::{Error, Result};
use std::path::Path;
use walkdir::WalkDir;

/// Files excluded unless the matcher is built with
/// [`GlobMatcher::without_default_excludes`]
pub const DEFAULT_EXCLUDES: &[&str] = &[
    "**/*~",
    "**/#*#",
    "**/.#*",
    "**/%*%",
    "**/._*",
    "**/.DS_Store",
    "**/CVS/**",
    "**/.cvsignore",
    "**/.svn/**",
    "**/.git/**",
    "**/.gitattributes",
    "**/.gitignore",
    "**/.gitmodules",
    "**/.hg/**",
    "**/.hgignore",
    "**/.hgtags",
    "**/.bzr/**",
    "**/.bzrignore",
];

/// Selects workspace files by include/exclude expressions
pub trait PatternMatcher: Send + Sync {
    /// Relative paths of the files under `root` matching `includes` and not
    /// `excludes`, sorted
    fn select(&self, root: &Path, includes: &str, excludes: Option<&str>) -> Result<Vec<String>>;

    /// Explain why `includes` selects nothing
    ///
    /// `Ok(None)` when every token matches at least one file.
    fn validate(&self, root: &Path, includes: &str) -> Result<Option<String>>;
}

/// Split an expression into glob tokens
pub fn tokens(expr: &str) -> Vec<&str> {
    expr.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .collect()
}

/// [`PatternMatcher`] backed by `globset`
#[derive(Debug, Clone)]
pub struct GlobMatcher {
    default_excludes: bool,
}

impl Default for GlobMatcher {
    fn default() -> Self {
        GlobMatcher {
            default_excludes: true,
        }
    }
}

impl GlobMatcher {
    /// Matcher with default excludes
    pub fn new() -> Self {
        Self::default()
    }

    /// Matcher that also selects version-control metadata
    pub fn without_default_excludes() -> Self {
        GlobMatcher {
            default_excludes: false,
        }
    }

    fn files(&self, root: &Path) -> Result<Vec<String>> {
        let defaults = if self.default_excludes {
            Some(compile(DEFAULT_EXCLUDES.iter().copied())?)
        } else {
            None
        };
        let mut files = Vec::new();
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(root)
                .map_err(|e| Error::Internal(e.to_string()))?;
            let relative = slash_path(relative);
            if defaults.as_ref().map_or(false, |d| d.is_match(&relative)) {
                continue;
            }
            files.push(relative);
        }
        Ok(files)
    }

    fn hint(&self, root: &Path, files: &[String], token: &str) -> Result<Option<String>> {
        let matches_any = |pattern: &str| -> Result<bool> {
            let set = compile(std::iter::once(pattern))?;
            Ok(files.iter().any(|f| set.is_match(f)))
        };
        if matches_any(token)? {
            return Ok(None);
        }

        // A shorter suffix might be what was meant
        let parts: Vec<&str> = token.split('/').collect();
        for i in 1..parts.len() {
            let suffix = parts[i..].join("/");
            if suffix.is_empty() {
                continue;
            }
            if matches_any(&suffix)? {
                return Ok(Some(format!(
                    "'{}' doesn't match anything, but '{}' does. Perhaps that's what you mean?",
                    token, suffix
                )));
            }
        }

        // Longest literal prefix that exists
        let mut existing = String::new();
        for part in &parts {
            if part.is_empty() || is_glob(part) {
                break;
            }
            let candidate = if existing.is_empty() {
                part.to_string()
            } else {
                format!("{}/{}", existing, part)
            };
            if !root.join(&candidate).exists() {
                if !existing.is_empty() {
                    return Ok(Some(format!(
                        "'{}' doesn't match anything: '{}' exists but not '{}'",
                        token, existing, candidate
                    )));
                }
                break;
            }
            existing = candidate;
        }

        Ok(Some(format!("'{}' doesn't match anything", token)))
    }
}

impl PatternMatcher for GlobMatcher {
    fn select(&self, root: &Path, includes: &str, excludes: Option<&str>) -> Result<Vec<String>> {
        let includes = tokens(includes);
        if includes.is_empty() {
            return Ok(Vec::new());
        }
        let include_set = compile(includes.into_iter())?;
        let exclude_set = match excludes {
            Some(expr) => Some(compile(tokens(expr).into_iter())?),
            None => None,
        };
        Ok(self
            .files(root)?
            .into_iter()
            .filter(|f| include_set.is_match(f))
            .filter(|f| !exclude_set.as_ref().map_or(false, |x| x.is_match(f)))
            .collect())
    }

    fn validate(&self, root: &Path, includes: &str) -> Result<Option<String>> {
        let files = self.files(root)?;
        for token in tokens(includes) {
            if let Some(hint) = self.hint(root, &files, token)? {
                return Ok(Some(hint));
            }
        }
        Ok(None)
    }
}

fn is_glob(part: &str) -> bool {
    part.contains(|c| matches!(c, '*' | '?' | '[' | '{'))
}

fn compile<'a>(patterns: impl Iterator<Item = &'a str>) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let pattern = pattern.trim_start_matches("./");
        // `dir/` means everything below it
        let pattern = if pattern.ends_with('/') {
            format!("{}**", pattern)
        } else {
            pattern.to_string()
        };
        builder.add(GlobBuilder::new(&pattern).literal_separator(true).build()?);
    }
    Ok(builder.build()?)
}
