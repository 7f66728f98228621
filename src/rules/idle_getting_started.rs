/// Nudges an idle beginner towards the getting-started guide.
///
/// `idle` is only ever set by the engine when the idle detector fires, so this
/// rule can never win an interaction-driven evaluation.
use super::ConditionResult;
use crate::context::{EvaluationContext, ExperienceLevel};

pub const KEY: &str = "idle_beginner";

pub fn check(ctx: &EvaluationContext) -> ConditionResult {
    Ok(ctx.idle && ctx.experience_level == ExperienceLevel::Beginner)
}
