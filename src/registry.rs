//! In-memory task registry
//!
//! The registry is the sole source of truth for task state. It is a
//! process-scoped, concurrency-safe map from task id to task record; nothing
//! survives a restart, which is deliberate — durability is a client concern
//! (resubmit).

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;

use crate::error::{Error, Result};
use crate::types::{TaskId, TaskKind, TaskOutcome, TaskRecord, TaskStatus};

/// Concurrency-safe registry of task records (cloneable handle)
///
/// All mutation goes through the atomic [`create`](TaskRegistry::create) and
/// [`update`](TaskRegistry::update) operations; readers get snapshots, never
/// references into the map. A record that has reached a terminal status
/// (`Completed`/`Failed`) can no longer be written — `update` rejects the
/// attempt rather than silently clobbering it.
#[derive(Clone, Default)]
pub struct TaskRegistry {
    tasks: Arc<Mutex<HashMap<TaskId, TaskRecord>>>,
    /// Disambiguates ids minted within the same clock second.
    next_seq: Arc<AtomicU64>,
}

impl TaskRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh unique id and insert a PENDING record for it
    ///
    /// Safe under concurrent invocation: the id embeds a per-process atomic
    /// sequence counter next to the timestamp, so submissions landing within
    /// the same second still get distinct ids. Returns a snapshot of the new
    /// record.
    pub fn create(&self, kind: TaskKind, source: &str) -> TaskRecord {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let now = Utc::now();
        let id = TaskId::new(format!(
            "task_{}_{seq:04}",
            now.format("%Y%m%d_%H%M%S")
        ));

        let record = TaskRecord {
            id: id.clone(),
            kind,
            source: source.to_string(),
            status: TaskStatus::Pending,
            created_at: now,
            updated_at: now,
            result: None,
        };

        let mut tasks = self.lock();
        tasks.insert(id, record.clone());
        record
    }

    /// Atomically set a task's status (and terminal result, if given)
    ///
    /// Refreshes `updated_at`, which never moves backwards even if the wall
    /// clock does. Returns `NotFound` for an absent id and `TerminalTask`
    /// when the record is already terminal — terminal records are immutable.
    ///
    /// A `result` is only attached alongside a terminal status; passing one
    /// with a non-terminal status is ignored, preserving the invariant that
    /// `result` is present iff the task is terminal.
    pub fn update(
        &self,
        id: &TaskId,
        status: TaskStatus,
        result: Option<TaskOutcome>,
    ) -> Result<TaskRecord> {
        let mut tasks = self.lock();
        let record = tasks
            .get_mut(id)
            .ok_or_else(|| Error::NotFound(format!("task {id}")))?;

        if record.status.is_terminal() {
            return Err(Error::TerminalTask {
                id: id.to_string(),
                status: record.status.to_string(),
            });
        }

        record.status = status;
        record.result = if status.is_terminal() { result } else { None };
        record.updated_at = Utc::now().max(record.updated_at);

        Ok(record.clone())
    }

    /// Read-only snapshot of a single record
    pub fn get(&self, id: &TaskId) -> Result<TaskRecord> {
        let tasks = self.lock();
        tasks
            .get(id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("task {id}")))
    }

    /// Snapshot of every record, newest first
    pub fn list(&self) -> Vec<TaskRecord> {
        let tasks = self.lock();
        let mut records: Vec<TaskRecord> = tasks.values().cloned().collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        records
    }

    /// Number of records currently held
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the registry holds no records
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<TaskId, TaskRecord>> {
        // A poisoned registry mutex means a panic inside one of the short
        // critical sections above; the map itself is still consistent.
        match self.tasks.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
