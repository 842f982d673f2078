//! Export cache for incremental builds.
//!
//! Printing through the browser is the slow step of the pipeline — launching
//! Chrome and laying out the whole book takes seconds even for a small data
//! set. This module lets the export stage skip the print entirely when the
//! rendered document and the print options haven't changed since the last
//! build.
//!
//! # Design
//!
//! The cache is **content-addressed**: the key is a SHA-256 over the
//! rendered HTML bytes and the serialized print options. Content-based
//! rather than mtime-based so it survives `git checkout` (which resets
//! modification times). A hit requires both a matching hash and the PDF
//! still existing on disk.
//!
//! The manifest is a JSON file at `<output_dir>/.cache-manifest.json`, so it
//! travels with the output directory. Corrupt or version-mismatched
//! manifests load as empty; `--no-cache` loads an empty manifest, forcing a
//! fresh print.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::io;
use std::path::Path;

/// Name of the cache manifest file within the output directory.
const MANIFEST_FILENAME: &str = ".cache-manifest.json";

/// Version of the cache manifest format. Bump this to invalidate all
/// existing caches when the format or key computation changes.
const MANIFEST_VERSION: u32 = 1;

/// A single cached artifact.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CacheEntry {
    pub content_hash: String,
}

/// On-disk cache manifest mapping output filenames to content hashes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheManifest {
    pub version: u32,
    pub entries: HashMap<String, CacheEntry>,
}

impl CacheManifest {
    /// Create an empty manifest (used for `--no-cache` or first build).
    pub fn empty() -> Self {
        Self {
            version: MANIFEST_VERSION,
            entries: HashMap::new(),
        }
    }

    /// Load from the output directory. Returns an empty manifest if the
    /// file doesn't exist or can't be parsed (version mismatch, corruption).
    pub fn load(output_dir: &Path) -> Self {
        let path = output_dir.join(MANIFEST_FILENAME);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(_) => return Self::empty(),
        };
        let manifest: Self = match serde_json::from_str(&content) {
            Ok(m) => m,
            Err(_) => return Self::empty(),
        };
        if manifest.version != MANIFEST_VERSION {
            return Self::empty();
        }
        manifest
    }

    /// Save to the output directory.
    pub fn save(&self, output_dir: &Path) -> io::Result<()> {
        let path = output_dir.join(MANIFEST_FILENAME);
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
    }

    /// Whether `filename` was printed from identical content and is still
    /// on disk.
    pub fn is_fresh(&self, filename: &str, content_hash: &str, output_dir: &Path) -> bool {
        self.entries
            .get(filename)
            .is_some_and(|e| e.content_hash == content_hash)
            && output_dir.join(filename).exists()
    }

    /// Record a freshly printed artifact.
    pub fn record(&mut self, filename: &str, content_hash: &str) {
        self.entries.insert(
            filename.to_string(),
            CacheEntry {
                content_hash: content_hash.to_string(),
            },
        );
    }
}

/// SHA-256 over a sequence of byte slices, hex-encoded.
pub fn hash_content(parts: &[&[u8]]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    let digest = hasher.finalize();
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}
