//! Lifecycle of project returns.
//!
//! A project carries a baseline and a type. Each return of the project
//! moves from `Draft` to `Submitted`, keeping every snapshot it was given:
//!
//! ```text
//! create ──> Draft ──soft_update*──> Draft ──submit──> Submitted
//! ```
//!
//! [`ReturnLifecycle`] ties the stores, the template registry, the core/UI
//! converters and the validator seam together. Stores sit behind the
//! [`ProjectStore`] and [`ReturnStore`] traits; in-memory implementations are
//! provided.

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod store;
pub mod types;
pub mod validator;

pub use config::LifecycleConfig;
pub use error::LifecycleError;
pub use lifecycle::ReturnLifecycle;
pub use store::{
    AppendOutcome, InMemoryProjectStore, InMemoryReturnStore, ProjectStore, ReturnStore,
    StoreError, SubmitOutcome,
};
pub use types::{
    BaseReturn, Project, ProjectId, ReturnId, ReturnRecord, ReturnStatus, ReturnView,
    ValidationOutcome,
};
pub use validator::{AcceptAllValidator, ReturnValidator};
