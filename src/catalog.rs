/// Rule catalog: the fixed, ordered set of hint rules for this process.
///
/// The built-in rules are embedded at compile time from `data/rules.toml`, so
/// no runtime path resolution is needed. A host can point
/// `AppConfig.rules_path` at its own file with the same schema instead.
///
/// Each rule names its condition by string; names are resolved against the
/// registry in `rules::condition_by_name` while the catalog is built. Duplicate
/// ids and unknown condition names are configuration errors and the caller is
/// expected to abort startup on them.
use crate::{
    error::CatalogError,
    rules::{condition_by_name, Priority, TriggerKind, TriggerRule},
};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

// ---------------------------------------------------------------------------
// Embedded TOML data
// ---------------------------------------------------------------------------

const BUILTIN_RULES: &str = include_str!("../data/rules.toml");

// ---------------------------------------------------------------------------
// TOML deserialization structs (private)
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct TomlFile {
    #[serde(default)]
    rule: Vec<TomlRule>,
}

#[derive(Deserialize)]
struct TomlRule {
    id:               String,
    target:           String,
    kind:             TriggerKind,
    condition:        String,
    priority:         Priority,
    message:          String,
    #[serde(default)]
    cooldown_minutes: Option<u32>,
    #[serde(default)]
    max_activations:  Option<u32>,
    #[serde(default)]
    anchor:           Option<String>,
}

impl TomlRule {
    fn into_rule(self) -> Result<TriggerRule, CatalogError> {
        let condition = condition_by_name(&self.condition).ok_or_else(|| {
            CatalogError::UnknownCondition {
                rule:      self.id.clone(),
                condition: self.condition.clone(),
            }
        })?;
        Ok(TriggerRule {
            id:               self.id,
            target_action:    self.target,
            kind:             self.kind,
            condition_name:   self.condition,
            condition,
            message:          self.message,
            priority:         self.priority,
            cooldown_minutes: self.cooldown_minutes,
            max_activations:  self.max_activations,
            anchor:           self.anchor,
        })
    }
}

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Position of a rule in its catalog. Only valid for the catalog that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleIndex(pub(crate) usize);

impl RuleIndex {
    pub fn position(self) -> usize {
        self.0
    }
}

#[derive(Debug)]
pub struct RuleCatalog {
    rules: Vec<TriggerRule>,
}

impl RuleCatalog {
    /// Build a catalog, rejecting duplicate ids. Declaration order is kept.
    pub fn new(rules: Vec<TriggerRule>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(rules.len());
        for rule in &rules {
            if !seen.insert(rule.id.as_str()) {
                return Err(CatalogError::DuplicateId(rule.id.clone()));
            }
        }
        Ok(Self { rules })
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, CatalogError> {
        let file: TomlFile = toml::from_str(raw)?;
        let rules = file
            .rule
            .into_iter()
            .map(TomlRule::into_rule)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(rules)
    }

    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_toml_str(BUILTIN_RULES)
    }

    /// External rule file when configured, embedded rules otherwise.
    pub fn load(rules_path: Option<&Path>) -> Result<Self, CatalogError> {
        let catalog = match rules_path {
            Some(path) => {
                tracing::info!("Loading rule catalog from {:?}", path);
                Self::from_path(path)?
            }
            None => Self::builtin()?,
        };
        tracing::info!("Rule catalog ready: {} rules", catalog.len());
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (RuleIndex, &TriggerRule)> {
        self.rules.iter().enumerate().map(|(i, r)| (RuleIndex(i), r))
    }

    pub fn get(&self, index: RuleIndex) -> Option<&TriggerRule> {
        self.rules.get(index.0)
    }

    pub fn index_of(&self, id: &str) -> Option<RuleIndex> {
        self.rules.iter().position(|r| r.id == id).map(RuleIndex)
    }
}
