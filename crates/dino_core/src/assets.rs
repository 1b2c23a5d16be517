//! Read-only asset access.
//!
//! Game code asks an [`AssetSource`] for a path relative to the asset root and
//! gets back an [`Asset`] handle with a known length. Closing is implicit when
//! the handle drops. `DirAssetSource` serves files from disk; `MemoryAssetSource`
//! serves in-memory blobs so tests never touch the filesystem.

use std::collections::HashMap;
use std::fs;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

pub trait AssetSource {
    fn open(&self, path: &str) -> Result<Asset, String>;

    fn read_bytes(&self, path: &str) -> Result<Vec<u8>, String> {
        self.open(path)?.read_all()
    }

    fn read_text(&self, path: &str) -> Result<String, String> {
        let bytes = self.read_bytes(path)?;
        String::from_utf8(bytes).map_err(|e| format!("Asset '{path}' is not valid UTF-8: {e}"))
    }
}

/// An open asset. Dropping it closes the underlying reader.
pub struct Asset {
    path: String,
    length: u64,
    reader: Box<dyn Read>,
}

impl Asset {
    pub fn length(&self) -> u64 {
        self.length
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Read up to `buf.len()` bytes; returns how many were read.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize, String> {
        self.reader
            .read(buf)
            .map_err(|e| format!("Failed to read asset '{}': {e}", self.path))
    }

    pub fn read_all(mut self) -> Result<Vec<u8>, String> {
        let mut bytes = Vec::with_capacity(self.length as usize);
        self.reader
            .read_to_end(&mut bytes)
            .map_err(|e| format!("Failed to read asset '{}': {e}", self.path))?;
        Ok(bytes)
    }
}

impl std::fmt::Debug for Asset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Asset")
            .field("path", &self.path)
            .field("length", &self.length)
            .finish()
    }
}

/// Assets served from a directory on disk.
#[derive(Debug, Clone)]
pub struct DirAssetSource {
    root: PathBuf,
}

impl DirAssetSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }
}

impl AssetSource for DirAssetSource {
    fn open(&self, path: &str) -> Result<Asset, String> {
        let full = self.resolve(path);
        let file = fs::File::open(&full)
            .map_err(|e| format!("Asset not found '{}': {e}", full.display()))?;
        let length = file
            .metadata()
            .map_err(|e| format!("Failed to stat asset '{}': {e}", full.display()))?
            .len();
        Ok(Asset {
            path: path.to_string(),
            length,
            reader: Box::new(file),
        })
    }
}

/// Assets held in memory, keyed by path.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssetSource {
    files: HashMap<String, Vec<u8>>,
}

impl MemoryAssetSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: &str, bytes: impl Into<Vec<u8>>) {
        self.files.insert(path.to_string(), bytes.into());
    }
}

impl AssetSource for MemoryAssetSource {
    fn open(&self, path: &str) -> Result<Asset, String> {
        let bytes = self
            .files
            .get(path)
            .ok_or_else(|| format!("Asset not found '{path}'"))?;
        Ok(Asset {
            path: path.to_string(),
            length: bytes.len() as u64,
            reader: Box::new(Cursor::new(bytes.clone())),
        })
    }
}
