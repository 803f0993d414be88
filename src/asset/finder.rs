//! Asset lookup across configured source directories
//!
//! Resolution order (first match wins):
//! 1. Exact file `{source}/{name}` in each source directory
//! 2. If `name` has no extension, the first file (sorted) in the same
//!    directory whose stem equals the requested file name

use crate::asset::Asset;
use crate::cache::CacheStore;
use crate::error::{ProximaError, ProximaResult};
use crate::paths::validate_relative;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Finds assets by logical name inside a list of source directories
#[derive(Debug, Clone)]
pub struct AssetFinder {
    sources: Vec<PathBuf>,
}

impl AssetFinder {
    /// Create a finder over the given source directories, searched in order
    pub fn new(sources: Vec<PathBuf>) -> Self {
        Self { sources }
    }

    /// Source directories in search order
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    /// Find and load an asset by logical name
    pub fn find_asset(&self, name: &str) -> ProximaResult<Asset> {
        validate_relative(name)?;
        // Its digest path would land among the cache's side records
        if CacheStore::is_reserved(name) {
            return Err(ProximaError::path_invalid(
                name,
                "assets under .meta/ cannot be proxied",
            ));
        }

        for source in &self.sources {
            if let Some(logical_path) = Self::locate(source, name)? {
                let filename = source.join(&logical_path);
                let content = fs::read(&filename).map_err(|e| {
                    ProximaError::io(format!("reading asset {}", filename.display()), e)
                })?;
                debug!("Found asset {} at {}", name, filename.display());
                return Ok(Asset::new(logical_path, filename, content));
            }
        }

        let searched = self
            .sources
            .iter()
            .map(|s| s.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");

        Err(ProximaError::AssetNotFound {
            name: name.to_string(),
            searched,
        })
    }

    /// Locate `name` inside one source directory, returning its logical path
    fn locate(source: &Path, name: &str) -> ProximaResult<Option<String>> {
        let exact = source.join(name);
        if exact.is_file() {
            return Ok(Some(name.to_string()));
        }

        if Path::new(name).extension().is_some() {
            return Ok(None);
        }

        let (dir, stem) = match name.rsplit_once('/') {
            Some((dir, stem)) => (Some(dir), stem),
            None => (None, name),
        };
        let search_dir = match dir {
            Some(dir) => source.join(dir),
            None => source.to_path_buf(),
        };
        if !search_dir.is_dir() {
            return Ok(None);
        }

        let entries = fs::read_dir(&search_dir).map_err(|e| {
            ProximaError::io(format!("listing directory {}", search_dir.display()), e)
        })?;

        let mut candidates: Vec<String> = entries
            .filter_map(Result::ok)
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
            .filter(|file| Path::new(file).file_stem().and_then(|s| s.to_str()) == Some(stem))
            .collect();
        candidates.sort();

        Ok(candidates.into_iter().next().map(|file| match dir {
            Some(dir) => format!("{}/{}", dir, file),
            None => file,
        }))
    }
}
