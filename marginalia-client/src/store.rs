use std::{
    collections::HashMap,
    path::PathBuf,
    sync::atomic::{AtomicUsize, Ordering},
};

use anyhow::Context;
use parking_lot::Mutex;

/// Durable storage for comment files. Paths are relative to the root of the
/// store and `/`-separated.
#[async_trait::async_trait]
pub trait Store: Send + Sync {
    async fn read(&self, path: &str) -> anyhow::Result<String>;

    /// Writes `contents` to `path`, creating parent directories as needed
    async fn write(&self, path: &str, contents: &str) -> anyhow::Result<()>;

    async fn exists(&self, path: &str) -> anyhow::Result<bool>;

    async fn create_dir(&self, path: &str) -> anyhow::Result<()>;
}

/// Store backed by a directory of the local filesystem
#[derive(Clone, Debug)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> FsStore {
        FsStore { root: root.into() }
    }

    fn full_path(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }
}

#[async_trait::async_trait]
impl Store for FsStore {
    async fn read(&self, path: &str) -> anyhow::Result<String> {
        let full = self.full_path(path);
        tokio::fs::read_to_string(&full)
            .await
            .with_context(|| format!("reading {full:?}"))
    }

    async fn write(&self, path: &str, contents: &str) -> anyhow::Result<()> {
        let full = self.full_path(path);
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("creating directory {parent:?}"))?;
        }
        tokio::fs::write(&full, contents)
            .await
            .with_context(|| format!("writing {full:?}"))
    }

    async fn exists(&self, path: &str) -> anyhow::Result<bool> {
        let full = self.full_path(path);
        match tokio::fs::metadata(&full).await {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e).with_context(|| format!("checking existence of {full:?}")),
        }
    }

    async fn create_dir(&self, path: &str) -> anyhow::Result<()> {
        let full = self.full_path(path);
        tokio::fs::create_dir_all(&full)
            .await
            .with_context(|| format!("creating directory {full:?}"))
    }
}

/// In-memory store, counting reads so tests can check caching
#[derive(Debug, Default)]
pub struct MemoryStore {
    files: Mutex<HashMap<String, String>>,
    dirs: Mutex<Vec<String>>,
    reads: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }

    pub fn get(&self, path: &str) -> Option<String> {
        self.files.lock().get(path).cloned()
    }

    pub fn insert(&self, path: impl Into<String>, contents: impl Into<String>) {
        self.files.lock().insert(path.into(), contents.into());
    }
}

#[async_trait::async_trait]
impl Store for MemoryStore {
    async fn read(&self, path: &str) -> anyhow::Result<String> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        self.get(path)
            .with_context(|| format!("reading {path:?}: no such file"))
    }

    async fn write(&self, path: &str, contents: &str) -> anyhow::Result<()> {
        self.insert(path, contents);
        Ok(())
    }

    async fn exists(&self, path: &str) -> anyhow::Result<bool> {
        if self.files.lock().contains_key(path) {
            return Ok(true);
        }
        Ok(self.dirs.lock().iter().any(|d| d == path))
    }

    async fn create_dir(&self, path: &str) -> anyhow::Result<()> {
        let mut dirs = self.dirs.lock();
        if !dirs.iter().any(|d| d == path) {
            dirs.push(String::from(path));
        }
        Ok(())
    }
}
