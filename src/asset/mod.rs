//! Source assets and the working copy handed to proxies
//!
//! An [`Asset`] is a file tracked by the surrounding pipeline. A
//! [`WorkingAsset`] is the mutable copy that travels through a proxy chain:
//! content and content type may change, identity may not.

pub mod finder;

pub use finder::AssetFinder;

use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Fallback content type for unknown extensions
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// A source asset as exposed by the asset pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    /// Site-relative identity (e.g. `subdir/ubuntu.png`)
    pub logical_path: String,
    /// Absolute on-disk path
    pub filename: PathBuf,
    /// File content
    pub content: Vec<u8>,
    /// MIME type
    pub content_type: String,
    /// Hex SHA256 of `content`
    pub digest: String,
}

impl Asset {
    /// Build an asset from its parts, deriving content type and digest
    pub fn new(logical_path: impl Into<String>, filename: PathBuf, content: Vec<u8>) -> Self {
        let logical_path = logical_path.into();
        let content_type = content_type_for(&logical_path).to_string();
        let digest = content_digest(&content);
        Self {
            logical_path,
            filename,
            content,
            content_type,
            digest,
        }
    }
}

/// Mutable copy of an asset passed by ownership through a proxy chain.
///
/// A staged copy is also backed by a scratch file at [`Self::filename`].
/// Proxies may either call [`Self::set_content`] or write that file
/// directly; if a step does both, the in-memory content wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingAsset {
    logical_path: String,
    filename: PathBuf,
    content: Vec<u8>,
    content_type: String,
    staged: bool,
    in_sync: bool,
}

impl WorkingAsset {
    /// Start an in-memory working copy of `asset`; `filename` is not touched
    pub fn from_asset(asset: &Asset, filename: PathBuf) -> Self {
        Self {
            logical_path: asset.logical_path.clone(),
            filename,
            content: asset.content.clone(),
            content_type: asset.content_type.clone(),
            staged: false,
            in_sync: false,
        }
    }

    /// Start a working copy backed by the scratch file `filename`
    pub fn staged(asset: &Asset, filename: PathBuf) -> io::Result<Self> {
        fs::write(&filename, &asset.content)?;
        Ok(Self {
            staged: true,
            in_sync: true,
            ..Self::from_asset(asset, filename)
        })
    }

    /// Logical path of the base asset
    pub fn logical_path(&self) -> &str {
        &self.logical_path
    }

    /// File holding the current content while the chain runs
    pub fn filename(&self) -> &Path {
        &self.filename
    }

    /// Current content bytes
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Replace the content bytes
    pub fn set_content(&mut self, content: impl Into<Vec<u8>>) {
        self.content = content.into();
        self.in_sync = false;
    }

    /// Current MIME type
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Replace the MIME type
    pub fn set_content_type(&mut self, content_type: impl Into<String>) {
        self.content_type = content_type.into();
    }

    /// Write in-memory changes to the scratch file before a step runs
    pub(crate) fn flush(&mut self) -> io::Result<()> {
        if self.staged && !self.in_sync {
            fs::write(&self.filename, &self.content)?;
            self.in_sync = true;
        }
        Ok(())
    }

    /// Pick up what a step wrote to the scratch file
    pub(crate) fn reload(&mut self) -> io::Result<()> {
        if self.staged && self.in_sync {
            let on_disk = fs::read(&self.filename)?;
            if on_disk != self.content {
                self.content = on_disk;
            }
        }
        Ok(())
    }

    /// Consume the working copy, returning content and content type
    pub fn into_parts(self) -> (Vec<u8>, String) {
        (self.content, self.content_type)
    }
}

/// Hex SHA256 of a byte slice
pub fn content_digest(content: &[u8]) -> String {
    hex::encode(Sha256::digest(content))
}

/// MIME type for a path, based on its extension
pub fn content_type_for(path: &str) -> &'static str {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("css") => "text/css",
        Some("js") => "application/javascript",
        Some("json") => "application/json",
        Some("html") | Some("htm") => "text/html",
        Some("txt") => "text/plain",
        Some("xml") => "application/xml",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",
        Some("pdf") => "application/pdf",
        _ => DEFAULT_CONTENT_TYPE,
    }
}
