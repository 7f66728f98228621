/// Fires on the race-goals tab when the goal form is open and the user has
/// not saved any goal yet.
use super::ConditionResult;
use crate::context::EvaluationContext;

pub const KEY: &str = "race_goal_form_empty";
const FORM: &str = "race-goal-form";

pub fn check(ctx: &EvaluationContext) -> ConditionResult {
    Ok(ctx.in_view("race-goals") && ctx.has_element(FORM) && ctx.counts.race_goals == 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{context::ElementState, placement::Rect};

    #[test]
    fn needs_open_form_and_no_goals() {
        let mut ctx = EvaluationContext {
            current_view: "race-goals".to_owned(),
            ..EvaluationContext::default()
        };
        assert_eq!(check(&ctx), Ok(false));

        ctx.elements.insert(
            FORM.to_owned(),
            ElementState { rect: Rect::new(0.0, 0.0, 400.0, 300.0), visible: true },
        );
        assert_eq!(check(&ctx), Ok(true));

        ctx.counts.race_goals = 1;
        assert_eq!(check(&ctx), Ok(false));
    }
}
