//! Records and views of projects and their returns.
//!
//! With the `typescript` feature enabled, the types handed to the front end
//! can be exported with ts-rs.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[cfg(feature = "typescript")]
use ts_rs::TS;

pub type ProjectId = u64;
pub type ReturnId = u64;

/// A funded project and the baseline data its returns start from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct Project {
    pub id: ProjectId,
    /// Project type, which selects the return template
    #[serde(rename = "type")]
    pub project_type: String,
    pub baseline: Value,
    /// Incremented each time the baseline is replaced
    pub baseline_version: u32,
}

/// Where a return is in its lifecycle. `Submitted` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub enum ReturnStatus {
    Draft,
    Submitted,
}

impl ReturnStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReturnStatus::Draft => "Draft",
            ReturnStatus::Submitted => "Submitted",
        }
    }
}

impl fmt::Display for ReturnStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored return.
///
/// `updates` is append-only and never empty: the first entry is the data the
/// return was created with and the last is the current payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnRecord {
    pub id: ReturnId,
    pub project_id: ProjectId,
    pub status: ReturnStatus,
    pub updates: Vec<Value>,
    pub created_at: DateTime<Utc>,
    pub submitted_at: Option<DateTime<Utc>>,
}

impl ReturnRecord {
    pub fn new(id: ReturnId, project_id: ProjectId, data: Value) -> Self {
        Self {
            id,
            project_id,
            status: ReturnStatus::Draft,
            updates: vec![data],
            created_at: Utc::now(),
            submitted_at: None,
        }
    }

    /// The current payload.
    pub fn current(&self) -> Option<&Value> {
        self.updates.last()
    }

    pub fn is_submitted(&self) -> bool {
        self.status == ReturnStatus::Submitted
    }

    pub fn view(&self) -> ReturnView {
        ReturnView {
            id: self.id,
            project_id: self.project_id,
            data: self.current().cloned().unwrap_or(Value::Null),
            status: self.status,
            updates: self.updates.clone(),
        }
    }
}

/// A return as presented to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct ReturnView {
    pub id: ReturnId,
    pub project_id: ProjectId,
    /// Last entry of `updates`
    pub data: Value,
    pub status: ReturnStatus,
    pub updates: Vec<Value>,
}

/// Seed data for the next return of a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
pub struct BaseReturn {
    pub project_id: ProjectId,
    pub data: Value,
}

/// Result of checking a payload against a return template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct ValidationOutcome {
    pub valid: bool,
    /// Key paths of the offending fields
    pub invalid_paths: Vec<Vec<String>>,
    /// The same fields named by their schema titles
    pub pretty_invalid_paths: Vec<Vec<String>>,
}

impl ValidationOutcome {
    pub fn valid() -> Self {
        Self {
            valid: true,
            invalid_paths: Vec::new(),
            pretty_invalid_paths: Vec::new(),
        }
    }

    pub fn invalid(invalid_paths: Vec<Vec<String>>, pretty_invalid_paths: Vec<Vec<String>>) -> Self {
        Self {
            valid: invalid_paths.is_empty(),
            invalid_paths,
            pretty_invalid_paths,
        }
    }
}
