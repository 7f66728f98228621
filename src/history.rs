/// Presentation history: how often each rule has been shown and when.
///
/// The rule set is fixed at startup, so history is a slot vector sized to the
/// catalog and indexed by `RuleIndex` rather than a growing map. A slot is
/// `None` until the rule is first presented; after that `count >= 1`.
///
/// The store is owned by the engine task and mutated only there, after a
/// presentation is accepted or dismissed. No locking is needed.
use crate::catalog::{RuleCatalog, RuleIndex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryEntry {
    pub count:         u32,
    pub last_shown_ms: u64,
}

#[derive(Debug, Clone)]
pub struct HistoryStore {
    slots: Vec<Option<HistoryEntry>>,
}

impl HistoryStore {
    pub fn for_catalog(catalog: &RuleCatalog) -> Self {
        Self { slots: vec![None; catalog.len()] }
    }

    /// Count one more presentation of `rule` at `now_ms`.
    pub fn record_presentation(&mut self, rule: RuleIndex, now_ms: u64) {
        let Some(slot) = self.slots.get_mut(rule.0) else {
            tracing::warn!("record_presentation: index {} outside catalog", rule.0);
            return;
        };
        let entry = slot.get_or_insert(HistoryEntry { count: 0, last_shown_ms: now_ms });
        entry.count         = entry.count.saturating_add(1);
        entry.last_shown_ms = now_ms;
    }

    pub fn entry(&self, rule: RuleIndex) -> Option<HistoryEntry> {
        self.slots.get(rule.0).copied().flatten()
    }

    /// Number of rules that have been presented at least once.
    pub fn presented_rules(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }
}
