/// Presentation surface: the single hint slot the overlay renders.
///
/// At most one rule is displayed at a time; `show` is ignored while the slot
/// is taken. Accept and dismiss both record a presentation, so a dismissed
/// hint burns cooldown and cap exactly like an accepted one.
///
/// On accept the target action is dispatched first. A dispatch failure is
/// returned to the caller but does not stop the bookkeeping: the slot is
/// cleared and the presentation is recorded either way.
use crate::{
    catalog::{RuleCatalog, RuleIndex},
    error::LaunchError,
    history::HistoryStore,
};
use serde::{Deserialize, Serialize};

/// Starts a guided tour by id. Implemented by the host bridge.
pub trait TutorialLauncher {
    fn launch(&mut self, tour_id: &str) -> Result<(), LaunchError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Accepted,
    Dismissed,
}

/// What happened to the hint that was on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Closed {
    pub rule:    RuleIndex,
    pub outcome: Outcome,
    /// Always Ok for dismissed hints.
    pub launch:  Result<(), LaunchError>,
}

#[derive(Debug, Default)]
pub struct PresentationSurface {
    displayed: Option<RuleIndex>,
}

impl PresentationSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn displayed(&self) -> Option<RuleIndex> {
        self.displayed
    }

    pub fn is_showing(&self) -> bool {
        self.displayed.is_some()
    }

    /// Returns false (and changes nothing) if a hint is already displayed.
    pub fn show(&mut self, rule: RuleIndex) -> bool {
        if let Some(current) = self.displayed {
            tracing::debug!(
                "show({}) ignored: rule {} still displayed",
                rule.position(), current.position()
            );
            return false;
        }
        self.displayed = Some(rule);
        true
    }

    pub fn on_accept(
        &mut self,
        catalog:  &RuleCatalog,
        history:  &mut HistoryStore,
        launcher: &mut dyn TutorialLauncher,
        now_ms:   u64,
    ) -> Option<Closed> {
        let idx = self.displayed?;
        let launch = match catalog.get(idx) {
            Some(rule) => launcher.launch(&rule.target_action),
            None       => Err(LaunchError::UnknownTour(format!("#{}", idx.position()))),
        };
        if let Err(e) = &launch {
            tracing::warn!("Tour launch for rule {} failed: {}", idx.position(), e);
        }
        history.record_presentation(idx, now_ms);
        self.displayed = None;
        Some(Closed { rule: idx, outcome: Outcome::Accepted, launch })
    }

    pub fn on_dismiss(&mut self, history: &mut HistoryStore, now_ms: u64) -> Option<Closed> {
        let idx = self.displayed.take()?;
        history.record_presentation(idx, now_ms);
        Some(Closed { rule: idx, outcome: Outcome::Dismissed, launch: Ok(()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::HistoryEntry;

    #[derive(Default)]
    struct RecordingLauncher {
        launched: Vec<String>,
        reject:   bool,
    }

    impl TutorialLauncher for RecordingLauncher {
        fn launch(&mut self, tour_id: &str) -> Result<(), LaunchError> {
            if self.reject {
                return Err(LaunchError::UnknownTour(tour_id.to_owned()));
            }
            self.launched.push(tour_id.to_owned());
            Ok(())
        }
    }

    fn setup() -> (RuleCatalog, HistoryStore, PresentationSurface, RuleIndex) {
        let catalog = RuleCatalog::builtin().unwrap();
        let history = HistoryStore::for_catalog(&catalog);
        let idx = catalog.index_of("chart_explainer").unwrap();
        (catalog, history, PresentationSurface::new(), idx)
    }

    #[test]
    fn only_one_hint_at_a_time() {
        let (catalog, _, mut surface, idx) = setup();
        let other = catalog.index_of("schedule_help").unwrap();
        assert!(surface.show(idx));
        assert!(!surface.show(other));
        assert_eq!(surface.displayed(), Some(idx));
    }

    #[test]
    fn accept_launches_records_and_clears() {
        let (catalog, mut history, mut surface, idx) = setup();
        let mut launcher = RecordingLauncher::default();
        surface.show(idx);

        let closed = surface.on_accept(&catalog, &mut history, &mut launcher, 42).unwrap();
        assert_eq!(closed.outcome, Outcome::Accepted);
        assert_eq!(closed.launch, Ok(()));
        assert_eq!(launcher.launched, vec!["analytics-tour".to_owned()]);
        assert_eq!(history.entry(idx), Some(HistoryEntry { count: 1, last_shown_ms: 42 }));
        assert!(!surface.is_showing());
    }

    #[test]
    fn dismiss_counts_like_accept() {
        let (catalog, mut history, mut surface, idx) = setup();
        surface.show(idx);
        let closed = surface.on_dismiss(&mut history, 7).unwrap();
        assert_eq!(closed.outcome, Outcome::Dismissed);
        assert_eq!(history.entry(idx), Some(HistoryEntry { count: 1, last_shown_ms: 7 }));
        assert!(!surface.is_showing());

        // a second dismiss with nothing displayed is a no-op
        assert!(surface.on_dismiss(&mut history, 8).is_none());
        assert_eq!(history.entry(idx).map(|e| e.count), Some(1));
        assert!(catalog.get(idx).is_some());
    }

    #[test]
    fn failed_launch_still_clears_and_records() {
        let (catalog, mut history, mut surface, idx) = setup();
        let mut launcher = RecordingLauncher { reject: true, ..Default::default() };
        surface.show(idx);

        let closed = surface.on_accept(&catalog, &mut history, &mut launcher, 1).unwrap();
        assert_eq!(closed.launch, Err(LaunchError::UnknownTour("analytics-tour".to_owned())));
        assert_eq!(history.entry(idx).map(|e| e.count), Some(1));
        assert!(!surface.is_showing());
    }

    #[test]
    fn accept_without_hint_is_noop() {
        let (catalog, mut history, mut surface, _) = setup();
        let mut launcher = RecordingLauncher::default();
        assert!(surface.on_accept(&catalog, &mut history, &mut launcher, 1).is_none());
        assert!(launcher.launched.is_empty());
        assert_eq!(history.presented_rules(), 0);
    }
}
