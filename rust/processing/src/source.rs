// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! File-like byte sources fed into the load pipeline.

use futures_util::future::{FutureExt, LocalBoxFuture};
use std::io;

/// A named blob whose bytes are read asynchronously
pub trait FileSource {
    fn name(&self) -> &str;

    /// Declared size in bytes, known before reading
    fn size(&self) -> u64;

    fn read_bytes(&self) -> LocalBoxFuture<'_, io::Result<Vec<u8>>>;
}

/// Bytes already in memory
#[derive(Debug, Clone)]
pub struct InMemoryFile {
    name: String,
    bytes: Vec<u8>,
}

impl InMemoryFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

impl FileSource for InMemoryFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    fn read_bytes(&self) -> LocalBoxFuture<'_, io::Result<Vec<u8>>> {
        let bytes = self.bytes.clone();
        async move { Ok(bytes) }.boxed_local()
    }
}

/// A file on the local filesystem
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct DiskFile {
    path: std::path::PathBuf,
    name: String,
    size: u64,
}

#[cfg(not(target_arch = "wasm32"))]
impl DiskFile {
    pub fn open(path: impl Into<std::path::PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let size = std::fs::metadata(&path)?.len();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { path, name, size })
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl FileSource for DiskFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn read_bytes(&self) -> LocalBoxFuture<'_, io::Result<Vec<u8>>> {
        async move { std::fs::read(&self.path) }.boxed_local()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_file() {
        let file = InMemoryFile::new("wall.ifc", b"ISO-10303-21;".to_vec());
        assert_eq!(file.name(), "wall.ifc");
        assert_eq!(file.size(), 13);
        assert_eq!(file.read_bytes().await.unwrap(), b"ISO-10303-21;");
    }

    #[tokio::test]
    async fn test_disk_file() {
        let path = std::env::temp_dir().join(format!("ifc-view-{}.ifc", std::process::id()));
        std::fs::write(&path, b"ISO-10303-21;\nEND-ISO-10303-21;").unwrap();

        let file = DiskFile::open(&path).unwrap();
        assert_eq!(file.size(), 31);
        assert!(file.name().ends_with(".ifc"));
        assert_eq!(file.read_bytes().await.unwrap().len(), 31);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_disk_file_missing() {
        assert!(DiskFile::open("/definitely/not/here.ifc").is_err());
    }
}
