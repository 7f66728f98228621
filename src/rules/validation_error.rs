/// Fires while a form shows validation errors (race goal, race history or
/// schedule entry). Skipped for advanced users.
use super::ConditionResult;
use crate::context::{EvaluationContext, ExperienceLevel};

pub const KEY: &str = "form_validation_error";

pub fn check(ctx: &EvaluationContext) -> ConditionResult {
    Ok(ctx.errors.validation_error && ctx.experience_level != ExperienceLevel::Advanced)
}
