/// Evaluation context: the read-only snapshot of dashboard state that rule
/// conditions inspect.
///
/// The host (the browser front end) owns this state and pushes a fresh
/// snapshot whenever something relevant changes: the user navigates to another
/// view, an element mounts, an API call fails. The engine never mutates the
/// host's fields; it only sets `idle` on its own copy before an inactivity
/// evaluation.
///
/// The struct is versioned so a host built against an older shape is rejected
/// at the bridge instead of silently evaluating against missing fields.
use crate::error::ConditionError;
use crate::placement::{Rect, Size};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Current context schema version.
pub const CONTEXT_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Component types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

/// A mounted element the host reports, keyed by its `data-tour-id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementState {
    pub rect:    Rect,
    #[serde(default = "default_visible")]
    pub visible: bool,
}

fn default_visible() -> bool { true }

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorFlags {
    /// The last backend request failed (network or 5xx).
    #[serde(default)]
    pub api_error:        bool,
    /// Activity sync from the connected provider failed.
    #[serde(default)]
    pub sync_failed:      bool,
    /// A form is currently showing validation errors.
    #[serde(default)]
    pub validation_error: bool,
}

impl ErrorFlags {
    pub fn any_backend(&self) -> bool {
        self.api_error || self.sync_failed
    }
}

/// Record counts the dashboard already has on screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataCounts {
    #[serde(default)]
    pub race_goals:         u32,
    #[serde(default)]
    pub race_history:       u32,
    #[serde(default)]
    pub scheduled_workouts: u32,
}

// ---------------------------------------------------------------------------
// EvaluationContext
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationContext {
    #[serde(default = "default_version")]
    pub version:          u32,
    #[serde(default)]
    pub experience_level: ExperienceLevel,
    /// Active tab: "dashboard", "analytics", "race-goals", "schedule", ...
    #[serde(default)]
    pub current_view:     String,
    #[serde(default)]
    pub elements:         BTreeMap<String, ElementState>,
    #[serde(default)]
    pub errors:           ErrorFlags,
    #[serde(default)]
    pub completed_tours:  BTreeSet<String>,
    #[serde(default)]
    pub features_used:    BTreeSet<String>,
    #[serde(default)]
    pub counts:           DataCounts,
    /// Days since the user last opened the weekly review; None = never.
    #[serde(default)]
    pub days_since_review: Option<u32>,
    #[serde(default)]
    pub viewport:         Size,
    /// Set by the engine, never by the host.
    #[serde(skip)]
    pub idle:             bool,
}

fn default_version() -> u32 { CONTEXT_VERSION }

impl Default for EvaluationContext {
    fn default() -> Self {
        Self {
            version:           CONTEXT_VERSION,
            experience_level:  ExperienceLevel::default(),
            current_view:      String::new(),
            elements:          BTreeMap::new(),
            errors:            ErrorFlags::default(),
            completed_tours:   BTreeSet::new(),
            features_used:     BTreeSet::new(),
            counts:            DataCounts::default(),
            days_since_review: None,
            viewport:          Size::default(),
            idle:              false,
        }
    }
}

impl EvaluationContext {
    pub fn is_supported(&self) -> bool {
        self.version == CONTEXT_VERSION
    }

    pub fn in_view(&self, view: &str) -> bool {
        self.current_view == view
    }

    /// True when the element is mounted and visible.
    pub fn has_element(&self, id: &str) -> bool {
        self.elements.get(id).map(|e| e.visible).unwrap_or(false)
    }

    /// Look up an element a condition depends on. Absence is an error rather
    /// than `false`: the condition cannot be judged until the view has mounted.
    pub fn require_element(&self, id: &str) -> Result<&ElementState, ConditionError> {
        self.elements
            .get(id)
            .ok_or_else(|| ConditionError::MissingElement(id.to_owned()))
    }

    pub fn tour_completed(&self, tour: &str) -> bool {
        self.completed_tours.contains(tour)
    }

    pub fn feature_used(&self, feature: &str) -> bool {
        self.features_used.contains(feature)
    }
}
