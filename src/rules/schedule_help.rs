/// Fires on an empty training schedule for non-advanced users.
use super::ConditionResult;
use crate::context::{EvaluationContext, ExperienceLevel};

pub const KEY: &str = "empty_training_schedule";

pub fn check(ctx: &EvaluationContext) -> ConditionResult {
    Ok(ctx.in_view("schedule")
        && ctx.counts.scheduled_workouts == 0
        && ctx.experience_level != ExperienceLevel::Advanced)
}
