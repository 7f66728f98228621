/// Typed errors for the hint engine.
///
/// Only `CatalogError` is fatal; condition and launch failures are recovered
/// locally by the evaluator and the presentation surface respectively.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("duplicate rule id '{0}'")]
    DuplicateId(String),

    #[error("rule '{rule}' references unknown condition '{condition}'")]
    UnknownCondition { rule: String, condition: String },

    #[error("rule file parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("rule file read error: {0}")]
    Io(#[from] std::io::Error),
}

/// A condition could not be evaluated against the current context.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConditionError {
    #[error("element '{0}' is not mounted")]
    MissingElement(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LaunchError {
    #[error("unknown tour '{0}'")]
    UnknownTour(String),
}
