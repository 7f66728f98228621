/// Trigger evaluator: picks at most one rule to present right now.
///
/// Selection is recomputed from scratch on every call: the dashboard changes
/// underneath the engine between calls, so nothing is cached. Given the same
/// catalog, history, context and `now_ms` the result is always the same.
///
/// A rule is eligible when its condition holds and, if it has been shown
/// before, its cooldown has elapsed and its cap is not reached. Survivors are
/// ranked by priority; equal priorities keep catalog order (stable sort).
///
/// A condition that fails is logged and treated as ineligible for this call
/// only. One broken rule never blocks the others.
use crate::{
    catalog::{RuleCatalog, RuleIndex},
    context::EvaluationContext,
    error::ConditionError,
    history::{HistoryEntry, HistoryStore},
    rules::TriggerRule,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Eligibility {
    Eligible,
    ConditionFalse,
    ConditionFailed(ConditionError),
    CoolingDown { remaining_ms: u64 },
    Exhausted,
}

/// Why `rule` is or is not eligible. History is checked before the condition
/// so exhausted rules never inspect the context.
pub fn eligibility(
    rule:    &TriggerRule,
    entry:   Option<HistoryEntry>,
    ctx:     &EvaluationContext,
    now_ms:  u64,
) -> Eligibility {
    if let Some(entry) = entry {
        if let Some(cap) = rule.max_activations {
            if entry.count >= cap {
                return Eligibility::Exhausted;
            }
        }
        if let Some(cooldown) = rule.cooldown_ms() {
            let elapsed = now_ms.saturating_sub(entry.last_shown_ms);
            if elapsed < cooldown {
                return Eligibility::CoolingDown { remaining_ms: cooldown - elapsed };
            }
        }
    }

    match (rule.condition)(ctx) {
        Ok(true)  => Eligibility::Eligible,
        Ok(false) => Eligibility::ConditionFalse,
        Err(e)    => Eligibility::ConditionFailed(e),
    }
}

pub fn evaluate<'a>(
    catalog: &'a RuleCatalog,
    history: &HistoryStore,
    ctx:     &EvaluationContext,
    now_ms:  u64,
) -> Option<(RuleIndex, &'a TriggerRule)> {
    let mut eligible: Vec<(RuleIndex, &TriggerRule)> = catalog
        .iter()
        .filter(|(idx, rule)| match eligibility(rule, history.entry(*idx), ctx, now_ms) {
            Eligibility::Eligible => true,
            Eligibility::ConditionFailed(e) => {
                tracing::warn!(
                    "Condition '{}' of rule '{}' failed: {}; skipping",
                    rule.condition_name, rule.id, e
                );
                false
            }
            other => {
                tracing::trace!("Rule '{}' not eligible: {:?}", rule.id, other);
                false
            }
        })
        .collect();

    // sort_by is stable: equal priorities stay in declaration order
    eligible.sort_by(|a, b| b.1.priority.cmp(&a.1.priority));

    if let Some((_, rule)) = eligible.first() {
        tracing::debug!(
            "Selected rule '{}' ({:?}) out of {} eligible",
            rule.id, rule.priority, eligible.len()
        );
    }
    eligible.into_iter().next()
}
