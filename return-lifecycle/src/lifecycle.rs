//! ReturnLifecycle - entry point for working with project returns.
//!
//! A return starts as a `Draft` holding the data it was created with. Soft
//! updates append further snapshots and submitting moves it to `Submitted`.
//! The latest submitted return of a project becomes the base for the next.

use std::sync::Arc;

use chrono::Utc;
use return_mapper::{ConverterCache, Direction};
use return_template::{Template, TemplateRegistry};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::LifecycleConfig;
use crate::error::LifecycleError;
use crate::store::{
    AppendOutcome, InMemoryProjectStore, InMemoryReturnStore, ProjectStore, ReturnStore,
    SubmitOutcome,
};
use crate::types::{BaseReturn, Project, ProjectId, ReturnId, ReturnStatus, ReturnView, ValidationOutcome};
use crate::validator::{AcceptAllValidator, ReturnValidator};

/// Coordinates projects, returns, templates and validation.
pub struct ReturnLifecycle {
    config: LifecycleConfig,
    projects: Arc<dyn ProjectStore>,
    returns: Arc<dyn ReturnStore>,
    converters: ConverterCache,
    validator: Arc<dyn ReturnValidator>,
}

impl ReturnLifecycle {
    pub fn new(
        templates: Arc<TemplateRegistry>,
        projects: Arc<dyn ProjectStore>,
        returns: Arc<dyn ReturnStore>,
    ) -> Self {
        Self {
            config: LifecycleConfig::default(),
            projects,
            returns,
            converters: ConverterCache::new(templates),
            validator: Arc::new(AcceptAllValidator),
        }
    }

    /// Lifecycle over fresh in-memory stores.
    pub fn in_memory(templates: Arc<TemplateRegistry>) -> Self {
        Self::new(
            templates,
            Arc::new(InMemoryProjectStore::new()),
            Arc::new(InMemoryReturnStore::new()),
        )
    }

    pub fn with_config(mut self, config: LifecycleConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_validator(mut self, validator: Arc<dyn ReturnValidator>) -> Self {
        self.validator = validator;
        self
    }

    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    pub fn templates(&self) -> &TemplateRegistry {
        self.converters.templates()
    }

    // --- projects ---

    pub fn create_project(&self, project_type: &str, baseline: Value) -> Result<ProjectId, LifecycleError> {
        let id = self.projects.create(project_type, baseline)?;
        info!(project_id = id, project_type, "Created project");
        Ok(id)
    }

    pub fn find_project(&self, project_id: ProjectId) -> Result<Project, LifecycleError> {
        self.projects
            .find(project_id)?
            .ok_or(LifecycleError::ProjectNotFound(project_id))
    }

    /// Replace a project's type and baseline. `false` when it does not exist.
    pub fn update_project(
        &self,
        project_id: ProjectId,
        project_type: &str,
        baseline: Value,
    ) -> Result<bool, LifecycleError> {
        let updated = self.projects.update(project_id, project_type, baseline)?;
        if updated {
            info!(project_id, project_type, "Updated project baseline");
        } else {
            debug!(project_id, "Project to update not found");
        }
        Ok(updated)
    }

    // --- returns ---

    /// Create a draft return from UI-shaped `data`.
    ///
    /// The data is converted to the core shape of the project's type; types
    /// without a mapping keep it as given.
    pub fn create(&self, project_id: ProjectId, data: Value) -> Result<ReturnId, LifecycleError> {
        let project = self.find_project(project_id)?;
        let data = self
            .converters
            .convert(&project.project_type, Direction::UiToCore, data);

        let return_id = self.returns.create(project_id, data)?;
        info!(
            return_id,
            project_id,
            project_type = %project.project_type,
            "Created return"
        );
        Ok(return_id)
    }

    /// Append core-shaped `data` to a return's updates. Identical payloads
    /// are appended again.
    pub fn soft_update(&self, return_id: ReturnId, data: Value) -> Result<(), LifecycleError> {
        match self
            .returns
            .append_update(return_id, data, self.config.allow_late_edits)?
        {
            AppendOutcome::Appended { len } => {
                debug!(return_id, updates = len, "Appended return update");
                Ok(())
            }
            AppendOutcome::Locked => {
                warn!(return_id, "Rejected update to submitted return");
                Err(LifecycleError::ReturnLocked(return_id))
            }
            AppendOutcome::Missing => Err(LifecycleError::ReturnNotFound(return_id)),
        }
    }

    /// Mark a return submitted. Submitting twice changes nothing.
    pub fn submit(&self, return_id: ReturnId) -> Result<(), LifecycleError> {
        match self.returns.mark_submitted(return_id, Utc::now())? {
            SubmitOutcome::Submitted => {
                info!(return_id, "Submitted return");
                Ok(())
            }
            SubmitOutcome::AlreadySubmitted => {
                debug!(return_id, "Return already submitted");
                Ok(())
            }
            SubmitOutcome::Missing => Err(LifecycleError::ReturnNotFound(return_id)),
        }
    }

    pub fn get_return(&self, return_id: ReturnId) -> Result<ReturnView, LifecycleError> {
        self.returns
            .find(return_id)?
            .map(|record| record.view())
            .ok_or(LifecycleError::ReturnNotFound(return_id))
    }

    /// Every return of a project in creation order; empty when there are none.
    pub fn get_returns(&self, project_id: ProjectId) -> Result<Vec<ReturnView>, LifecycleError> {
        Ok(self
            .returns
            .for_project(project_id)?
            .iter()
            .map(|record| record.view())
            .collect())
    }

    /// Data the next return of a project should start from.
    ///
    /// The final update of the most recently submitted return (highest id),
    /// or the project baseline while nothing has been submitted. With
    /// `seed_base_return_from_template` either source is returned in UI shape,
    /// ready to be passed back to `create`.
    pub fn get_base_return(&self, project_id: ProjectId) -> Result<BaseReturn, LifecycleError> {
        let project = self.find_project(project_id)?;
        let returns = self.returns.for_project(project_id)?;

        let submitted = returns
            .iter()
            .filter(|record| record.status == ReturnStatus::Submitted)
            .max_by_key(|record| record.id)
            .and_then(|record| record.current().cloned().map(|data| (record.id, data)));

        let data = match submitted {
            Some((return_id, data)) => {
                debug!(project_id, return_id, "Base return from submitted return");
                data
            }
            None => {
                debug!(project_id, "Base return from baseline");
                project.baseline
            }
        };

        let data = if self.config.seed_base_return_from_template {
            self.converters
                .convert(&project.project_type, Direction::CoreToUi, data)
        } else {
            data
        };

        Ok(BaseReturn { project_id, data })
    }

    // --- templates ---

    /// Check `data` against the template of `project_type`.
    pub fn validate(&self, project_type: &str, data: &Value) -> Result<ValidationOutcome, LifecycleError> {
        let template = self.schema_for_project_type(project_type)?;
        let outcome = self.validator.validate(&template, data);
        debug!(
            project_type,
            valid = outcome.valid,
            invalid = outcome.invalid_paths.len(),
            "Validated return"
        );
        Ok(outcome)
    }

    pub fn schema_for_project_type(&self, project_type: &str) -> Result<Arc<Template>, LifecycleError> {
        self.templates()
            .lookup(project_type)
            .ok_or_else(|| LifecycleError::TemplateNotFound(project_type.to_string()))
    }

    /// Template of the project a return belongs to.
    pub fn schema_for_return(&self, return_id: ReturnId) -> Result<Arc<Template>, LifecycleError> {
        let record = self
            .returns
            .find(return_id)?
            .ok_or(LifecycleError::ReturnNotFound(return_id))?;
        let project = self.find_project(record.project_id)?;
        self.schema_for_project_type(&project.project_type)
    }
}
