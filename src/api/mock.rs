//! In-memory agent for tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use super::{RemoteAgent, Status};
use crate::error::Result;
use crate::workspace::{Delta, FileEntry, Snapshot};

/// Applies uploads to its own snapshot and counts every call.
#[derive(Default)]
pub struct MockAgent {
    files: Mutex<Snapshot>,
    health: Mutex<String>,
    pub get_files_calls: AtomicUsize,
    pub put_files_calls: AtomicUsize,
    pub get_status_calls: AtomicUsize,
}

impl MockAgent {
    pub fn new() -> Self {
        Self::with_files(Snapshot::new())
    }

    pub fn with_files(files: Snapshot) -> Self {
        Self {
            files: Mutex::new(files),
            health: Mutex::new("healthy".to_string()),
            ..Self::default()
        }
    }

    pub fn set_health(&self, health: &str) {
        *self.health.lock().unwrap() = health.to_string();
    }

    pub fn files(&self) -> Snapshot {
        self.files.lock().unwrap().clone()
    }

    pub fn puts(&self) -> usize {
        self.put_files_calls.load(Ordering::SeqCst)
    }

    pub fn gets(&self) -> usize {
        self.get_files_calls.load(Ordering::SeqCst)
    }

    pub fn status_calls(&self) -> usize {
        self.get_status_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteAgent for MockAgent {
    fn endpoint(&self) -> &str {
        "https://mock.example.com/_fastpush"
    }

    async fn fetch_files(&self) -> Result<Snapshot> {
        self.get_files_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.files())
    }

    async fn push_delta(&self, delta: &Delta) -> Result<Status> {
        self.put_files_calls.fetch_add(1, Ordering::SeqCst);
        let mut files = self.files.lock().unwrap();
        for (path, entry) in delta {
            files.insert(
                path.clone(),
                FileEntry::metadata(path.clone(), entry.checksum.clone()),
            );
        }
        Ok(Status {
            health: "applying".to_string(),
        })
    }

    async fn fetch_status(&self) -> Result<Status> {
        self.get_status_calls.fetch_add(1, Ordering::SeqCst);
        Ok(Status {
            health: self.health.lock().unwrap().clone(),
        })
    }
}
