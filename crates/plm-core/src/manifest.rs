//! Catalog of files to mirror: category → filename → source URL.
//!
//! The built-in catalog reproduces the original playlist set; `from_path`
//! loads a TOML file of the same shape so synthetic catalogs can drive tests
//! and alternate deployments:
//!
//! ```toml
//! [m3u]
//! "epgbrasil.m3u" = "http://m3u4u.com/m3u/3wk1y24kx7uzdevxygz7"
//!
//! ["xml.gz"]
//! "epgbrasil.xml.gz" = "http://m3u4u.com/epg/3wk1y24kx7uzdevxygz7"
//! ```

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// One (destination, URL) pair produced by flattening the manifest.
/// Immutable; consumed exactly once by the fetcher.
#[derive(Debug, Clone)]
pub struct FetchTask {
    pub category: String,
    pub file_name: String,
    pub url: String,
    /// `<output_root>/<file_name>`.
    pub dest: PathBuf,
}

/// Load-time manifest errors. These are configuration mistakes, surfaced
/// before the output directory is touched, never per-task runtime failures.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("duplicate filename {name:?} (categories {first:?} and {second:?})")]
    DuplicateFilename {
        name: String,
        first: String,
        second: String,
    },
    #[error("unsafe filename {0:?}: must be a bare name without path components")]
    UnsafeFilename(String),
    #[error("manifest {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("manifest {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

/// Static catalog of downloads, grouped by category label.
///
/// Sorted maps keep flatten order deterministic, which the mirror does not
/// need for correctness but makes logs and tests stable.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    categories: BTreeMap<String, BTreeMap<String, String>>,
}

impl Manifest {
    /// The original playlist/EPG catalog.
    pub fn builtin() -> Self {
        let mut m = Manifest::default();
        for (name, url) in [
            (
                "epgbrasil.m3u",
                "http://m3u4u.com/m3u/3wk1y24kx7uzdevxygz7",
            ),
            (
                "epgportugal.m3u",
                "http://m3u4u.com/m3u/jq2zy9epr3bwxmgwyxr5",
            ),
            (
                "epgbrasilportugal.m3u",
                "http://m3u4u.com/m3u/782dyqdrqkh1xegen4zp",
            ),
            (
                "PiauiTV.m3u",
                "https://gitlab.com/josieljefferson12/playlists/-/raw/main/PiauiTV.m3u",
            ),
            (
                "m3u@proton.me.m3u",
                "https://gitlab.com/josieljefferson12/playlists/-/raw/main/m3u4u_proton.me.m3u",
            ),
        ] {
            m.insert("m3u", name, url);
        }
        for (name, url) in [
            (
                "epgbrasil.xml.gz",
                "http://m3u4u.com/epg/3wk1y24kx7uzdevxygz7",
            ),
            (
                "epgportugal.xml.gz",
                "http://m3u4u.com/epg/jq2zy9epr3bwxmgwyxr5",
            ),
            (
                "epgbrasilportugal.xml.gz",
                "http://m3u4u.com/epg/782dyqdrqkh1xegen4zp",
            ),
        ] {
            m.insert("xml.gz", name, url);
        }
        m
    }

    /// Load a manifest from a TOML file.
    pub fn from_path(path: &Path) -> Result<Self, ManifestError> {
        let data = fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&data).map_err(|source| ManifestError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn insert(
        &mut self,
        category: impl Into<String>,
        file_name: impl Into<String>,
        url: impl Into<String>,
    ) {
        self.categories
            .entry(category.into())
            .or_default()
            .insert(file_name.into(), url.into());
    }

    pub fn is_empty(&self) -> bool {
        self.categories.values().all(|files| files.is_empty())
    }

    /// Total number of files across all categories.
    pub fn file_count(&self) -> usize {
        self.categories.values().map(|files| files.len()).sum()
    }

    /// Flatten into an ordered task list with destinations under
    /// `output_root`.
    ///
    /// Fails fast on filenames that collide across categories (the flat
    /// output directory would silently overwrite one with the other) and on
    /// names that are not bare filenames.
    pub fn flatten(&self, output_root: &Path) -> Result<Vec<FetchTask>, ManifestError> {
        let mut seen: BTreeMap<&str, &str> = BTreeMap::new();
        let mut tasks = Vec::with_capacity(self.file_count());
        for (category, files) in &self.categories {
            for (file_name, url) in files {
                validate_filename(file_name)?;
                if let Some(first) = seen.insert(file_name, category) {
                    return Err(ManifestError::DuplicateFilename {
                        name: file_name.clone(),
                        first: first.to_string(),
                        second: category.clone(),
                    });
                }
                tasks.push(FetchTask {
                    category: category.clone(),
                    file_name: file_name.clone(),
                    url: url.clone(),
                    dest: output_root.join(file_name),
                });
            }
        }
        Ok(tasks)
    }
}

/// Reject names that would escape the output root or misbehave on Linux.
/// Validation rather than sanitization: a bad manifest entry is an authoring
/// mistake that should be fixed at the source, not papered over.
fn validate_filename(name: &str) -> Result<(), ManifestError> {
    let bad = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0')
        || name.len() > 255;
    if bad {
        return Err(ManifestError::UnsafeFilename(name.to_string()));
    }
    Ok(())
}
