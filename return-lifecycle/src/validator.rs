//! Seam for checking return payloads against their template.

use return_template::Template;
use serde_json::Value;

use crate::types::ValidationOutcome;

/// Checks a payload against the template of its project type.
///
/// Schema validation itself lives outside this crate; the lifecycle only
/// picks the template and hands both over.
pub trait ReturnValidator: Send + Sync {
    fn validate(&self, template: &Template, data: &Value) -> ValidationOutcome;
}

/// A validator that accepts every payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAllValidator;

impl ReturnValidator for AcceptAllValidator {
    fn validate(&self, _: &Template, _: &Value) -> ValidationOutcome {
        ValidationOutcome::valid()
    }
}
