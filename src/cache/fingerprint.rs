//! Fingerprints for proxy requests
//!
//! A fingerprint identifies the *request* (which proxies, with which options,
//! in which order), not the bytes it produces. It deliberately ignores the
//! base asset: uniqueness across assets comes from [`digest_path`], which
//! folds the fingerprint into the base asset's own logical path.

use crate::tag::ProxyArgs;
use sha2::{Digest, Sha256};

/// SHA256 hex digest of the canonical form of `args`
pub fn fingerprint(args: &ProxyArgs) -> String {
    let mut hasher = Sha256::new();
    hasher.update(args.canonical().as_bytes());
    hex::encode(hasher.finalize())
}

/// Cache-relative path for a base logical path and a fingerprint.
///
/// `subdir/ubuntu.png` becomes `subdir/ubuntu-<fingerprint>.png`.
pub fn digest_path(logical_path: &str, fingerprint: &str) -> String {
    let (dir, file) = match logical_path.rsplit_once('/') {
        Some((dir, file)) => (Some(dir), file),
        None => (None, logical_path),
    };

    // Leading-dot files (".htaccess") have no extension
    let name = match file.rfind('.') {
        Some(pos) if pos > 0 => format!("{}-{}{}", &file[..pos], fingerprint, &file[pos..]),
        _ => format!("{}-{}", file, fingerprint),
    };

    match dir {
        Some(dir) => format!("{}/{}", dir, name),
        None => name,
    }
}

/// Whether a file name has the shape [`digest_path`] produces
pub fn is_digest_name(file_name: &str) -> bool {
    let has_fingerprint = |stem: &str| {
        stem.len() > 65
            && stem.is_char_boundary(stem.len() - 65)
            && stem[stem.len() - 65..].strip_prefix('-').is_some_and(|fp| {
                fp.bytes()
                    .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
            })
    };

    match file_name.rfind('.') {
        Some(pos) if pos > 0 && has_fingerprint(&file_name[..pos]) => true,
        _ => has_fingerprint(file_name),
    }
}
