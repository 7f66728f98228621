pub mod api_error;
pub mod chart_explainer;
pub mod idle_getting_started;
pub mod race_goal_form;
pub mod schedule_help;
pub mod validation_error;
pub mod weekly_review;
pub mod welcome_tour;

use crate::{context::EvaluationContext, error::ConditionError};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Rule metadata
// ---------------------------------------------------------------------------

/// Declaration order is the total order: `High > Medium > Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// What kind of signal a rule reacts to. Informational only; the evaluator
/// does not branch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TriggerKind {
    Interaction,
    FeatureAccess,
    Error,
    Inactivity,
    Scheduled,
}

/// Conditions return Ok(false) when the rule does not apply and Err when the
/// context cannot answer yet (e.g. an element has not mounted).
pub type ConditionResult = Result<bool, ConditionError>;

/// Pure predicate over the evaluation context.
pub type Condition = fn(&EvaluationContext) -> ConditionResult;

#[derive(Debug, Clone)]
pub struct TriggerRule {
    pub id:               String,
    /// Tour id handed to the launcher when the user accepts.
    pub target_action:    String,
    pub kind:             TriggerKind,
    /// Registry name of `condition`, kept for logging.
    pub condition_name:   String,
    pub condition:        Condition,
    pub message:          String,
    pub priority:         Priority,
    pub cooldown_minutes: Option<u32>,
    pub max_activations:  Option<u32>,
    /// `data-tour-id` of the element the tooltip points at.
    pub anchor:           Option<String>,
}

impl TriggerRule {
    pub fn cooldown_ms(&self) -> Option<u64> {
        self.cooldown_minutes.map(|m| u64::from(m) * 60_000)
    }
}

// ---------------------------------------------------------------------------
// Condition registry
// ---------------------------------------------------------------------------

static CONDITIONS: Lazy<HashMap<&'static str, Condition>> = Lazy::new(|| {
    let table: [(&'static str, Condition); 8] = [
        (welcome_tour::KEY,         welcome_tour::check),
        (api_error::KEY,            api_error::check),
        (validation_error::KEY,     validation_error::check),
        (chart_explainer::KEY,      chart_explainer::check),
        (race_goal_form::KEY,       race_goal_form::check),
        (schedule_help::KEY,        schedule_help::check),
        (idle_getting_started::KEY, idle_getting_started::check),
        (weekly_review::KEY,        weekly_review::check),
    ];
    table.into_iter().collect()
});

/// Resolve a condition by the name used in rule files.
pub fn condition_by_name(name: &str) -> Option<Condition> {
    CONDITIONS.get(name).copied()
}
