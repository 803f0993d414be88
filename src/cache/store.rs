//! On-disk cache store
//!
//! Files live at `<root>/<digest_path>`; side records at
//! `<root>/.meta/<digest_path>.json`. Every write goes to a temp file in the
//! destination directory and is renamed into place, so readers never see a
//! half-written file. Identical concurrent writes are harmless: the last
//! rename wins and the bytes are the same.

use crate::cache::fingerprint::is_digest_name;
use crate::cache::record::CacheRecord;
use crate::error::{ProximaError, ProximaResult};
use crate::paths::validate_relative;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Directory under the root holding side records
const META_DIR: &str = ".meta";

/// Prefix of in-flight temp files
const TEMP_PREFIX: &str = ".proxima-";

/// A file currently held by the cache
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Cache-relative path
    pub digest_path: String,
    /// File size
    pub size_bytes: u64,
    /// Side record, if one was written
    pub record: Option<CacheRecord>,
}

/// Content-addressed cache directory
#[derive(Debug, Clone)]
pub struct CacheStore {
    root: PathBuf,
}

impl CacheStore {
    /// Create a store rooted at `root` (created lazily on first write)
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Cache root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path for a cache-relative path
    pub fn path(&self, rel: &str) -> ProximaResult<PathBuf> {
        validate_relative(rel)?;
        if Self::is_reserved(rel) {
            return Err(ProximaError::path_invalid(rel, "reserved cache directory"));
        }
        Ok(self.root.join(rel))
    }

    /// Whether `rel` falls inside the directory holding side records
    pub fn is_reserved(rel: &str) -> bool {
        rel.split('/').next() == Some(META_DIR)
    }

    /// Whether a file exists at `rel`. Checked live on every call.
    pub fn exists(&self, rel: &str) -> bool {
        match self.path(rel) {
            Ok(path) => path.is_file(),
            Err(e) => {
                debug!("Treating invalid cache path as missing: {}", e);
                false
            }
        }
    }

    /// Read the file at `rel`
    pub fn read(&self, rel: &str) -> ProximaResult<Vec<u8>> {
        let path = self.path(rel)?;
        fs::read(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ProximaError::NotFound(path.clone()),
            _ => ProximaError::io(format!("reading cache file {}", path.display()), e),
        })
    }

    /// Atomically write `bytes` to `rel`, creating parent directories
    pub fn write(&self, rel: &str, bytes: &[u8]) -> ProximaResult<PathBuf> {
        let path = self.path(rel)?;
        write_atomic(&path, bytes)?;
        debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(path)
    }

    /// Read the side record for `rel`, if present and well-formed
    pub fn read_record(&self, rel: &str) -> ProximaResult<Option<CacheRecord>> {
        let path = self.record_path(rel)?;
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(ProximaError::io(
                    format!("reading cache record {}", path.display()),
                    e,
                ))
            }
        };

        match serde_json::from_str(&content) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                debug!("Ignoring unreadable cache record {}: {}", path.display(), e);
                Ok(None)
            }
        }
    }

    /// Atomically write the side record for `rel`
    pub fn write_record(&self, rel: &str, record: &CacheRecord) -> ProximaResult<()> {
        let path = self.record_path(rel)?;
        let content = serde_json::to_string_pretty(record)?;
        write_atomic(&path, content.as_bytes())
    }

    /// Remove the file at `rel` and its side record
    pub fn remove(&self, rel: &str) -> ProximaResult<()> {
        let path = self.path(rel)?;
        fs::remove_file(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ProximaError::NotFound(path.clone()),
            _ => ProximaError::io(format!("removing cache file {}", path.display()), e),
        })?;

        let record = self.record_path(rel)?;
        if record.exists() {
            fs::remove_file(&record).map_err(|e| {
                ProximaError::io(format!("removing cache record {}", record.display()), e)
            })?;
        }

        info!("Removed cache entry {}", rel);
        Ok(())
    }

    /// List cached files, sorted by path.
    ///
    /// Only files with a side record or a digest-shaped name count as
    /// entries; anything else under the root is left alone.
    pub fn entries(&self) -> ProximaResult<Vec<CacheEntry>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();
        let walker = WalkDir::new(&self.root)
            .min_depth(1)
            .into_iter()
            .filter_entry(|e| {
                let name = e.file_name().to_string_lossy();
                !(e.depth() == 1 && name == META_DIR) && !name.starts_with(TEMP_PREFIX)
            });

        for entry in walker {
            let entry = entry.map_err(|e| {
                let context = format!("walking cache directory {}", self.root.display());
                match e.into_io_error() {
                    Some(source) => ProximaError::io(context, source),
                    None => ProximaError::Internal(context),
                }
            })?;
            if !entry.file_type().is_file() {
                continue;
            }

            let Ok(rel) = entry.path().strip_prefix(&self.root) else {
                continue;
            };
            let digest_path = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            let record = self.read_record(&digest_path)?;
            if record.is_none() && !is_digest_name(&entry.file_name().to_string_lossy()) {
                continue;
            }
            let size_bytes = entry.metadata().map(|m| m.len()).unwrap_or(0);

            entries.push(CacheEntry {
                digest_path,
                size_bytes,
                record,
            });
        }

        entries.sort_by(|a, b| a.digest_path.cmp(&b.digest_path));
        Ok(entries)
    }

    /// Remove every entry and its record, returning how many were removed.
    ///
    /// Directories emptied by the removal are pruned; the root and any
    /// unrelated files stay.
    pub fn clear(&self) -> ProximaResult<usize> {
        let entries = self.entries()?;
        let mut touched = Vec::new();

        for entry in &entries {
            self.remove(&entry.digest_path)?;
            touched.push(self.root.join(&entry.digest_path));
            touched.push(self.record_path(&entry.digest_path)?);
        }
        self.prune_empty_dirs(&touched);

        info!(
            "Cleared {} cache entries from {}",
            entries.len(),
            self.root.display()
        );
        Ok(entries.len())
    }

    /// Reserve a scratch file next to where `rel` will be persisted.
    ///
    /// The file keeps `rel`'s extension so external tools can sniff the
    /// format, and is deleted when the handle drops.
    pub fn scratch(&self, rel: &str) -> ProximaResult<NamedTempFile> {
        let path = self.path(rel)?;
        let parent = path.parent().ok_or_else(|| {
            ProximaError::path_invalid(&path, "cache path has no parent directory")
        })?;
        fs::create_dir_all(parent)
            .map_err(|e| ProximaError::io(format!("creating directory {}", parent.display()), e))?;

        let suffix = path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();
        tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(&suffix)
            .tempfile_in(parent)
            .map_err(|e| {
                ProximaError::io(format!("creating scratch file in {}", parent.display()), e)
            })
    }

    /// Remove now-empty directories between `paths` and the root
    fn prune_empty_dirs(&self, paths: &[PathBuf]) {
        let mut dirs: Vec<&Path> = paths
            .iter()
            .flat_map(|p| p.ancestors().skip(1))
            .filter(|d| d.starts_with(&self.root) && *d != self.root)
            .collect();
        // Deepest first, so parents are tried after their children
        dirs.sort_by(|a, b| {
            b.components()
                .count()
                .cmp(&a.components().count())
                .then_with(|| a.cmp(b))
        });
        dirs.dedup();

        for dir in dirs {
            // Fails harmlessly when the directory still has content
            if fs::remove_dir(dir).is_ok() {
                debug!("Pruned empty cache directory {}", dir.display());
            }
        }
    }

    fn record_path(&self, rel: &str) -> ProximaResult<PathBuf> {
        validate_relative(rel)?;
        Ok(self.root.join(META_DIR).join(format!("{}.json", rel)))
    }
}

/// Write via temp file + rename in the destination directory
fn write_atomic(path: &Path, bytes: &[u8]) -> ProximaResult<()> {
    let parent = path
        .parent()
        .ok_or_else(|| ProximaError::path_invalid(path, "cache path has no parent directory"))?;
    fs::create_dir_all(parent)
        .map_err(|e| ProximaError::io(format!("creating directory {}", parent.display()), e))?;

    let mut tmp = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .tempfile_in(parent)
        .map_err(|e| ProximaError::io(format!("creating temp file in {}", parent.display()), e))?;
    tmp.write_all(bytes)
        .map_err(|e| ProximaError::io(format!("writing temp file for {}", path.display()), e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| ProximaError::io(format!("flushing temp file for {}", path.display()), e))?;
    tmp.persist(path).map_err(|e| {
        ProximaError::io(format!("moving cache file into place {}", path.display()), e.error)
    })?;

    Ok(())
}
