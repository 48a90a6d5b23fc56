use crate::store::StoreError;
use crate::types::{ProjectId, ReturnId};

/// Failures of lifecycle operations.
///
/// The not-found variants are expected outcomes that a caller maps to its own
/// "not found" response.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("Project {0} not found")]
    ProjectNotFound(ProjectId),

    #[error("Return {0} not found")]
    ReturnNotFound(ReturnId),

    #[error("No template for project type '{0}'")]
    TemplateNotFound(String),

    /// Soft update on a submitted return while late edits are disabled
    #[error("Return {0} is submitted and can no longer be edited")]
    ReturnLocked(ReturnId),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl LifecycleError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            LifecycleError::ProjectNotFound(_)
                | LifecycleError::ReturnNotFound(_)
                | LifecycleError::TemplateNotFound(_)
        )
    }
}
