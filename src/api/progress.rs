//! Per-session conversion progress
//!
//! Shared between request handlers and the blocking conversion tasks.
//! Entries are ephemeral: the retention sweep evicts anything not touched
//! within the configured age.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

use serde::Serialize;

/// Lifecycle of one conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressStatus {
    Processing,
    Completed,
    Error,
}

/// Progress snapshot as served to polling clients
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEntry {
    pub current: usize,
    pub total: usize,
    pub status: ProgressStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_file: Option<String>,
    #[serde(skip)]
    updated_at: Instant,
}

impl ProgressEntry {
    fn processing(current: usize, total: usize) -> Self {
        Self {
            current,
            total,
            status: ProgressStatus::Processing,
            error: None,
            output_file: None,
            updated_at: Instant::now(),
        }
    }
}

/// Session id → progress map
#[derive(Debug, Clone, Default)]
pub struct ProgressStore {
    entries: Arc<RwLock<HashMap<String, ProgressEntry>>>,
}

impl ProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    // A panic while holding the lock leaves plain data behind, still usable
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, ProgressEntry>> {
        self.entries.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, ProgressEntry>> {
        self.entries.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Register a session as processing with no rows done
    pub fn start(&self, session_id: &str) {
        self.write()
            .insert(session_id.to_string(), ProgressEntry::processing(0, 0));
    }

    /// Record rows done out of total
    pub fn update(&self, session_id: &str, current: usize, total: usize) {
        self.write()
            .insert(session_id.to_string(), ProgressEntry::processing(current, total));
    }

    /// Mark a session completed with the name of its output file
    pub fn complete(&self, session_id: &str, output_file: &str) {
        let mut entries = self.write();
        let entry = entries
            .entry(session_id.to_string())
            .or_insert_with(|| ProgressEntry::processing(0, 0));
        entry.status = ProgressStatus::Completed;
        entry.output_file = Some(output_file.to_string());
        entry.updated_at = Instant::now();
    }

    /// Mark a session failed
    pub fn fail(&self, session_id: &str, message: &str) {
        let mut entries = self.write();
        let entry = entries
            .entry(session_id.to_string())
            .or_insert_with(|| ProgressEntry::processing(0, 0));
        entry.status = ProgressStatus::Error;
        entry.error = Some(message.to_string());
        entry.updated_at = Instant::now();
    }

    pub fn get(&self, session_id: &str) -> Option<ProgressEntry> {
        self.read().get(session_id).cloned()
    }

    /// Drop entries not updated within `max_age`; returns how many went
    pub fn evict_older_than(&self, max_age: Duration) -> usize {
        let mut entries = self.write();
        let before = entries.len();
        entries.retain(|_, entry| entry.updated_at.elapsed() <= max_age);
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}
