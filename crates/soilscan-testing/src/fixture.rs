//! Upload fixtures.

use std::path::{Path, PathBuf};

use uuid::Uuid;

/// A scratch upload root under the system temp dir, removed on drop.
pub struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    pub fn new() -> Self {
        let path = std::env::temp_dir().join(format!("soilscan-test-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&path).unwrap();
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of regular files currently stored.
    pub fn file_count(&self) -> usize {
        std::fs::read_dir(&self.path)
            .map(|entries| {
                entries
                    .filter_map(Result::ok)
                    .filter(|e| e.path().is_file())
                    .count()
            })
            .unwrap_or(0)
    }
}

impl Default for ScratchDir {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

/// `len` bytes starting with a JPEG SOI marker. Content is never decoded by the service.
pub fn fake_jpeg(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len.max(2)];
    bytes[0] = 0xFF;
    bytes[1] = 0xD8;
    bytes.truncate(len);
    bytes
}
