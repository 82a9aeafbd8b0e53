use async_trait::async_trait;
use std::io;
use std::path::Path;
#[cfg(test)]
use std::{collections::HashMap, path::PathBuf, sync::Mutex};

/// Whole-file text access used by the action
#[async_trait]
pub trait FileSystem: Send + Sync {
    async fn read_to_string(&self, path: &Path) -> io::Result<String>;

    async fn write(&self, path: &Path, contents: &str) -> io::Result<()>;
}

/// Real file system backed by `tokio::fs`
pub struct TokioFileSystem;

#[async_trait]
impl FileSystem for TokioFileSystem {
    async fn read_to_string(&self, path: &Path) -> io::Result<String> {
        tokio::fs::read_to_string(path).await
    }

    async fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        tokio::fs::write(path, contents).await
    }
}

/// In-memory file system for tests
#[cfg(test)]
#[derive(Default)]
pub struct MemoryFileSystem {
    files: Mutex<HashMap<PathBuf, String>>,
}

#[cfg(test)]
impl MemoryFileSystem {
    pub fn with_file(path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        let fs = Self::default();
        fs.insert(path, contents);
        fs
    }

    pub fn insert(&self, path: impl Into<PathBuf>, contents: impl Into<String>) {
        self.lock().insert(path.into(), contents.into());
    }

    pub fn get(&self, path: &Path) -> Option<String> {
        self.lock().get(path).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<PathBuf, String>> {
        self.files.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
#[async_trait]
impl FileSystem for MemoryFileSystem {
    async fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.get(path).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("{}: no such file", path.display()),
            )
        })
    }

    async fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        self.insert(path, contents);
        Ok(())
    }
}
