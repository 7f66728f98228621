/// Suggests the weekly review walkthrough once a week has passed since the
/// user last opened it. Users who have never opened it qualify immediately
/// after their first week of data.
use super::ConditionResult;
use crate::context::EvaluationContext;

pub const KEY: &str = "weekly_review_due";
const REVIEW_INTERVAL_DAYS: u32 = 7;

pub fn check(ctx: &EvaluationContext) -> ConditionResult {
    let due = match ctx.days_since_review {
        Some(days) => days >= REVIEW_INTERVAL_DAYS,
        None       => ctx.counts.race_history > 0 || ctx.counts.scheduled_workouts > 0,
    };
    Ok(due && ctx.in_view("dashboard"))
}
