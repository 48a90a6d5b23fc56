//! Persistence seams for projects and returns, with in-memory implementations.
//!
//! A store must make every call atomic for the record it touches. In
//! particular `append_update` is one read-modify-write, so concurrent appends
//! to the same return are never lost.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde_json::Value;

use crate::types::{Project, ProjectId, ReturnId, ReturnRecord, ReturnStatus};

/// Failure of the backing store itself.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Backend could not be reached or refused the operation
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Stored data could not be read back
    #[error("Corrupt record {id}: {reason}")]
    Corrupt { id: u64, reason: String },
}

/// Result of appending an update to a return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    /// Appended; the return now holds `len` updates
    Appended { len: usize },
    /// The return is submitted and late edits were not allowed
    Locked,
    Missing,
}

/// Result of moving a return to `Submitted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Submitted,
    AlreadySubmitted,
    Missing,
}

pub trait ProjectStore: Send + Sync {
    fn create(&self, project_type: &str, baseline: Value) -> Result<ProjectId, StoreError>;

    fn find(&self, id: ProjectId) -> Result<Option<Project>, StoreError>;

    /// Replace type and baseline. `false` when the project does not exist.
    fn update(&self, id: ProjectId, project_type: &str, baseline: Value) -> Result<bool, StoreError>;
}

pub trait ReturnStore: Send + Sync {
    /// Store a new draft whose only update is `data`.
    fn create(&self, project_id: ProjectId, data: Value) -> Result<ReturnId, StoreError>;

    fn find(&self, id: ReturnId) -> Result<Option<ReturnRecord>, StoreError>;

    /// Append `data` to the return's updates.
    ///
    /// The status check and the append happen under the same lock.
    fn append_update(
        &self,
        id: ReturnId,
        data: Value,
        allow_submitted: bool,
    ) -> Result<AppendOutcome, StoreError>;

    /// Set the status to `Submitted`, stamping `at` on the first transition.
    fn mark_submitted(&self, id: ReturnId, at: DateTime<Utc>) -> Result<SubmitOutcome, StoreError>;

    /// Every return of a project, ordered by id.
    fn for_project(&self, project_id: ProjectId) -> Result<Vec<ReturnRecord>, StoreError>;
}

/// Projects held in process memory.
#[derive(Debug)]
pub struct InMemoryProjectStore {
    projects: DashMap<ProjectId, Project>,
    next_id: AtomicU64,
}

impl InMemoryProjectStore {
    pub fn new() -> Self {
        Self {
            projects: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}

impl Default for InMemoryProjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectStore for InMemoryProjectStore {
    fn create(&self, project_type: &str, baseline: Value) -> Result<ProjectId, StoreError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.projects.insert(
            id,
            Project {
                id,
                project_type: project_type.to_string(),
                baseline,
                baseline_version: 1,
            },
        );
        Ok(id)
    }

    fn find(&self, id: ProjectId) -> Result<Option<Project>, StoreError> {
        Ok(self.projects.get(&id).map(|p| p.clone()))
    }

    fn update(&self, id: ProjectId, project_type: &str, baseline: Value) -> Result<bool, StoreError> {
        let Some(mut project) = self.projects.get_mut(&id) else {
            return Ok(false);
        };
        project.project_type = project_type.to_string();
        project.baseline = baseline;
        project.baseline_version += 1;
        Ok(true)
    }
}

/// Returns held in process memory.
#[derive(Debug)]
pub struct InMemoryReturnStore {
    returns: DashMap<ReturnId, ReturnRecord>,
    next_id: AtomicU64,
}

impl InMemoryReturnStore {
    pub fn new() -> Self {
        Self {
            returns: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn len(&self) -> usize {
        self.returns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.returns.is_empty()
    }
}

impl Default for InMemoryReturnStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ReturnStore for InMemoryReturnStore {
    fn create(&self, project_id: ProjectId, data: Value) -> Result<ReturnId, StoreError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.returns.insert(id, ReturnRecord::new(id, project_id, data));
        Ok(id)
    }

    fn find(&self, id: ReturnId) -> Result<Option<ReturnRecord>, StoreError> {
        Ok(self.returns.get(&id).map(|r| r.clone()))
    }

    fn append_update(
        &self,
        id: ReturnId,
        data: Value,
        allow_submitted: bool,
    ) -> Result<AppendOutcome, StoreError> {
        // the shard write lock is held until `record` drops
        let Some(mut record) = self.returns.get_mut(&id) else {
            return Ok(AppendOutcome::Missing);
        };
        if record.is_submitted() && !allow_submitted {
            return Ok(AppendOutcome::Locked);
        }
        record.updates.push(data);
        Ok(AppendOutcome::Appended {
            len: record.updates.len(),
        })
    }

    fn mark_submitted(&self, id: ReturnId, at: DateTime<Utc>) -> Result<SubmitOutcome, StoreError> {
        let Some(mut record) = self.returns.get_mut(&id) else {
            return Ok(SubmitOutcome::Missing);
        };
        if record.is_submitted() {
            return Ok(SubmitOutcome::AlreadySubmitted);
        }
        record.status = ReturnStatus::Submitted;
        record.submitted_at = Some(at);
        Ok(SubmitOutcome::Submitted)
    }

    fn for_project(&self, project_id: ProjectId) -> Result<Vec<ReturnRecord>, StoreError> {
        let mut records: Vec<ReturnRecord> = self
            .returns
            .iter()
            .filter(|entry| entry.project_id == project_id)
            .map(|entry| entry.value().clone())
            .collect();
        records.sort_by_key(|record| record.id);
        Ok(records)
    }
}
