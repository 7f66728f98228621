/// Explains the training-load chart the first times a user lands on analytics
/// without having opened the chart tooltips.
///
/// The chart renders after its data request resolves, so on a fresh analytics
/// view the element may not exist yet. That is reported as an error (not
/// `false`) and the evaluator skips the rule for this pass; the next context
/// update after mount re-evaluates it.
use super::ConditionResult;
use crate::context::EvaluationContext;

pub const KEY: &str = "training_load_chart_unexplored";
pub const CHART: &str = "training-load-chart";
const FEATURE: &str = "chart-tooltips";

pub fn check(ctx: &EvaluationContext) -> ConditionResult {
    if !ctx.in_view("analytics") {
        return Ok(false);
    }
    let chart = ctx.require_element(CHART)?;
    Ok(chart.visible && !ctx.feature_used(FEATURE))
}
