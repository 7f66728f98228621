/// Offers the dashboard tour to a beginner on their first visit.
///
/// Fires only on the dashboard view, only for beginners, and only while the
/// tour has not been completed. Once the tour is done the host reports it in
/// `completed_tours` and the rule goes quiet even before its cap is reached.
use super::ConditionResult;
use crate::context::{EvaluationContext, ExperienceLevel};

pub const KEY: &str = "first_dashboard_visit";
const TOUR: &str = "dashboard-tour";

pub fn check(ctx: &EvaluationContext) -> ConditionResult {
    Ok(ctx.experience_level == ExperienceLevel::Beginner
        && ctx.in_view("dashboard")
        && !ctx.tour_completed(TOUR))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn beginner_on_dashboard() -> EvaluationContext {
        EvaluationContext {
            current_view: "dashboard".to_owned(),
            ..EvaluationContext::default()
        }
    }

    #[test]
    fn fires_for_new_beginner() {
        assert_eq!(check(&beginner_on_dashboard()), Ok(true));
    }

    #[test]
    fn quiet_once_tour_completed() {
        let mut ctx = beginner_on_dashboard();
        ctx.completed_tours.insert(TOUR.to_owned());
        assert_eq!(check(&ctx), Ok(false));
    }

    #[test]
    fn quiet_for_advanced_users() {
        let mut ctx = beginner_on_dashboard();
        ctx.experience_level = ExperienceLevel::Advanced;
        assert_eq!(check(&ctx), Ok(false));
    }
}
