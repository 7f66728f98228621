/// Points the user at troubleshooting after a backend or sync failure.
///
/// No view or experience gate: a failed sync is confusing at every level.
use super::ConditionResult;
use crate::context::EvaluationContext;

pub const KEY: &str = "backend_error";

pub fn check(ctx: &EvaluationContext) -> ConditionResult {
    Ok(ctx.errors.any_backend())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_on_sync_failure() {
        let mut ctx = EvaluationContext::default();
        assert_eq!(check(&ctx), Ok(false));
        ctx.errors.sync_failed = true;
        assert_eq!(check(&ctx), Ok(true));
    }
}
