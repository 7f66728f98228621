/// Hint engine: the single task that owns all trigger state.
///
/// Receives host messages (context snapshots, activity, accept/dismiss) and
/// idle signals, evaluates the rule catalog, and forwards engine events to the
/// IPC writer.
///
/// Catalog, history, presentation slot and the latest context are all owned
/// here and only touched from this task, so an evaluation and the
/// presentation it leads to can never interleave with another evaluation.
///
/// Evaluation triggers:
///   context / activity → debounced (config.debounce_ms, trailing edge)
///   idle signal        → immediate, with `ctx.idle = true`, gated by level
use crate::{
    catalog::RuleCatalog,
    config::AppConfig,
    context::EvaluationContext,
    evaluator,
    history::HistoryStore,
    idle::{IdleSignal, IdleTimer},
    ipc::{EngineEvent, HintEvent, HostMessage, TourQueue},
    placement::{self, DEFAULT_TOOLTIP},
    presenter::{Closed, PresentationSurface},
};
use anyhow::Result;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::mpsc::{self, Receiver, Sender};
use tokio::time::Instant;

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Wall-clock milliseconds anchored once at startup and advanced by the
/// monotonic tokio clock, so cooldowns follow paused time in tests.
struct EngineClock {
    origin:    Instant,
    origin_ms: u64,
}

impl EngineClock {
    fn new() -> Self {
        let origin_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self { origin: Instant::now(), origin_ms }
    }

    fn now_ms(&self) -> u64 {
        self.origin_ms + self.origin.elapsed().as_millis() as u64
    }
}

// ---------------------------------------------------------------------------
// Engine state
// ---------------------------------------------------------------------------

struct EngineState {
    catalog:  RuleCatalog,
    history:  HistoryStore,
    surface:  PresentationSurface,
    context:  Option<EvaluationContext>,
    config:   AppConfig,
    launcher: TourQueue,
    events:   Sender<EngineEvent>,
    clock:    EngineClock,
}

impl EngineState {
    fn new(catalog: RuleCatalog, config: AppConfig, events: Sender<EngineEvent>) -> Self {
        let history  = HistoryStore::for_catalog(&catalog);
        let launcher = TourQueue::new(config.known_tours.clone());
        Self {
            catalog,
            history,
            surface: PresentationSurface::new(),
            context: None,
            config,
            launcher,
            events,
            clock: EngineClock::new(),
        }
    }

    /// Returns false once the event receiver is gone.
    async fn emit(&self, event: EngineEvent) -> bool {
        self.events.send(event).await.is_ok()
    }

    async fn evaluate_now(&mut self, idle: bool) -> bool {
        if self.surface.is_showing() {
            tracing::trace!("Evaluation skipped: a hint is already displayed");
            return true;
        }
        let Some(host_ctx) = &self.context else {
            tracing::debug!("Evaluation skipped: no context from host yet");
            return true;
        };
        let mut ctx = host_ctx.clone();
        ctx.idle = idle;

        let now_ms = self.clock.now_ms();
        let Some((idx, rule)) = evaluator::evaluate(&self.catalog, &self.history, &ctx, now_ms) else {
            return true;
        };
        if !self.surface.show(idx) {
            return true;
        }

        let placement = rule
            .anchor
            .as_deref()
            .and_then(|anchor| ctx.elements.get(anchor))
            .filter(|el| el.visible)
            .map(|el| placement::place(&el.rect, DEFAULT_TOOLTIP, ctx.viewport));

        tracing::info!("Showing hint '{}' (idle={})", rule.id, idle);
        let event = EngineEvent::HintShown(HintEvent {
            rule_id:     rule.id.clone(),
            message:     rule.message.clone(),
            priority:    rule.priority,
            kind:        rule.kind,
            target:      rule.target_action.clone(),
            shown_at_ms: now_ms,
            placement,
        });
        self.emit(event).await
    }

    async fn on_idle(&mut self) -> bool {
        let enabled = self
            .context
            .as_ref()
            .map(|c| self.config.idle_hints_enabled_for(c.experience_level))
            .unwrap_or(false);
        if !enabled {
            tracing::debug!("Idle signal ignored: inactivity hints not enabled for this user");
            return true;
        }
        self.evaluate_now(true).await
    }

    async fn on_accept(&mut self) -> bool {
        let now_ms = self.clock.now_ms();
        let closed = self.surface.on_accept(&self.catalog, &mut self.history, &mut self.launcher, now_ms);
        self.report_closed(closed).await
    }

    async fn on_dismiss(&mut self) -> bool {
        let now_ms = self.clock.now_ms();
        let closed = self.surface.on_dismiss(&mut self.history, now_ms);
        self.report_closed(closed).await
    }

    async fn report_closed(&mut self, closed: Option<Closed>) -> bool {
        let Some(closed) = closed else {
            tracing::debug!("Accept/dismiss with no hint displayed");
            return true;
        };
        let tours: Vec<String> = self.launcher.drain().collect();
        for tour_id in tours {
            if !self.emit(EngineEvent::LaunchTour { tour_id }).await {
                return false;
            }
        }
        let Some(rule) = self.catalog.get(closed.rule) else {
            return true;
        };
        if let Err(e) = &closed.launch {
            let failed = EngineEvent::LaunchFailed {
                tour_id: rule.target_action.clone(),
                reason:  e.to_string(),
            };
            if !self.emit(failed).await {
                return false;
            }
        }
        tracing::info!("Hint '{}' closed: {:?}", rule.id, closed.outcome);
        self.emit(EngineEvent::HintClosed { rule_id: rule.id.clone(), outcome: closed.outcome })
            .await
    }
}

// ---------------------------------------------------------------------------
// Main engine task
// ---------------------------------------------------------------------------

pub async fn run(
    mut host_rx: Receiver<HostMessage>,
    event_tx:    Sender<EngineEvent>,
    catalog:     RuleCatalog,
    config:      AppConfig,
) -> Result<()> {
    let debounce = config.debounce();
    let (idle_tx, mut idle_rx) = mpsc::channel::<IdleSignal>(4);
    // Dropped with this task, which aborts the timer.
    let idle_timer = IdleTimer::spawn(config.idle_timeout(), idle_tx);

    let mut eng = EngineState::new(catalog, config, event_tx);
    let mut pending: Option<Instant> = None;

    loop {
        let debounce_elapsed = async move {
            match pending {
                Some(at) => tokio::time::sleep_until(at).await,
                None     => std::future::pending::<()>().await,
            }
        };

        let alive = tokio::select! {
            msg = host_rx.recv() => match msg {
                Some(HostMessage::Context(ctx)) => {
                    tracing::debug!("Context update: view='{}'", ctx.current_view);
                    eng.context = Some(ctx);
                    pending = Some(Instant::now() + debounce);
                    true
                }
                Some(HostMessage::Activity { kind }) => {
                    tracing::trace!("Activity: {:?}", kind);
                    idle_timer.touch();
                    pending = Some(Instant::now() + debounce);
                    true
                }
                Some(HostMessage::Accept)  => eng.on_accept().await,
                Some(HostMessage::Dismiss) => eng.on_dismiss().await,
                None => {
                    tracing::info!("Host channel closed; engine stopping");
                    false
                }
            },

            _ = debounce_elapsed => {
                pending = None;
                eng.evaluate_now(false).await
            }

            Some(IdleSignal) = idle_rx.recv() => eng.on_idle().await,
        };

        if !alive {
            break;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        context::{ElementState, ExperienceLevel},
        ipc::ActivityKind,
        placement::Rect,
        presenter::Outcome,
    };
    use std::time::Duration;
    use tokio::task::JoinHandle;

    struct Harness {
        host:   Sender<HostMessage>,
        events: Receiver<EngineEvent>,
        task:   JoinHandle<Result<()>>,
    }

    fn start(config: AppConfig) -> Harness {
        start_with_capacity(config, 32)
    }

    fn start_with_capacity(config: AppConfig, events: usize) -> Harness {
        let (host_tx, host_rx)   = mpsc::channel(32);
        let (event_tx, event_rx) = mpsc::channel(events);
        let catalog = RuleCatalog::builtin().unwrap();
        let task = tokio::spawn(run(host_rx, event_tx, catalog, config));
        Harness { host: host_tx, events: event_rx, task }
    }

    async fn settle() {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    /// Advance past the debounce window and assert the engine stayed quiet.
    async fn assert_quiet(h: &mut Harness) {
        tokio::time::advance(Duration::from_secs(2)).await;
        settle().await;
        assert!(h.events.try_recv().is_err(), "unexpected engine event");
    }

    fn context(level: ExperienceLevel, view: &str) -> HostMessage {
        HostMessage::Context(EvaluationContext {
            experience_level: level,
            current_view:     view.to_owned(),
            ..EvaluationContext::default()
        })
    }

    fn shown_id(event: Option<EngineEvent>) -> String {
        match event {
            Some(EngineEvent::HintShown(hint)) => hint.rule_id,
            other => panic!("expected hint_shown, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn welcome_tour_accept_flow() {
        let mut h = start(AppConfig::default());
        h.host.send(context(ExperienceLevel::Beginner, "dashboard")).await.unwrap();
        assert_eq!(shown_id(h.events.recv().await), "welcome_tour");

        h.host.send(HostMessage::Accept).await.unwrap();
        assert_eq!(
            h.events.recv().await,
            Some(EngineEvent::LaunchTour { tour_id: "dashboard-tour".to_owned() })
        );
        assert_eq!(
            h.events.recv().await,
            Some(EngineEvent::HintClosed {
                rule_id: "welcome_tour".to_owned(),
                outcome: Outcome::Accepted,
            })
        );

        // capped at one presentation
        h.host.send(HostMessage::Activity { kind: ActivityKind::Pointer }).await.unwrap();
        assert_quiet(&mut h).await;
    }

    #[tokio::test(start_paused = true)]
    async fn evaluation_waits_for_debounce() {
        let mut h = start(AppConfig::default());
        h.host.send(context(ExperienceLevel::Beginner, "dashboard")).await.unwrap();
        settle().await;

        tokio::time::advance(Duration::from_millis(600)).await;
        h.host.send(HostMessage::Activity { kind: ActivityKind::Keyboard }).await.unwrap();
        settle().await;
        tokio::time::advance(Duration::from_millis(600)).await;
        settle().await;
        // 1.2s since context, but only 0.6s since the last activity
        assert!(h.events.try_recv().is_err());

        tokio::time::advance(Duration::from_millis(400)).await;
        assert_eq!(shown_id(h.events.recv().await), "welcome_tour");
    }

    #[tokio::test(start_paused = true)]
    async fn dismissed_hint_respects_cooldown() {
        let mut h = start(AppConfig::default());
        let mut ctx = EvaluationContext {
            experience_level: ExperienceLevel::Advanced,
            current_view:     "analytics".to_owned(),
            ..EvaluationContext::default()
        };
        ctx.errors.api_error = true;
        h.host.send(HostMessage::Context(ctx)).await.unwrap();
        assert_eq!(shown_id(h.events.recv().await), "api_error_help");

        h.host.send(HostMessage::Dismiss).await.unwrap();
        assert_eq!(
            h.events.recv().await,
            Some(EngineEvent::HintClosed {
                rule_id: "api_error_help".to_owned(),
                outcome: Outcome::Dismissed,
            })
        );

        // error still present, but the rule is cooling down (30 min)
        h.host.send(HostMessage::Activity { kind: ActivityKind::Change }).await.unwrap();
        assert_quiet(&mut h).await;
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_tour_reports_failure_and_clears() {
        let config = AppConfig { known_tours: vec!["some-other-tour".to_owned()], ..AppConfig::default() };
        let mut h = start(config);
        h.host.send(context(ExperienceLevel::Beginner, "dashboard")).await.unwrap();
        assert_eq!(shown_id(h.events.recv().await), "welcome_tour");

        h.host.send(HostMessage::Accept).await.unwrap();
        match h.events.recv().await {
            Some(EngineEvent::LaunchFailed { tour_id, .. }) => assert_eq!(tour_id, "dashboard-tour"),
            other => panic!("expected launch_failed, got {:?}", other),
        }
        assert!(matches!(
            h.events.recv().await,
            Some(EngineEvent::HintClosed { outcome: Outcome::Accepted, .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn launch_waits_for_slow_event_reader() {
        let mut h = start_with_capacity(AppConfig::default(), 1);
        h.host.send(context(ExperienceLevel::Beginner, "dashboard")).await.unwrap();
        tokio::time::advance(Duration::from_secs(2)).await;
        settle().await;

        // hint_shown is still unread, so the event channel is full on accept
        h.host.send(HostMessage::Accept).await.unwrap();
        settle().await;

        assert_eq!(shown_id(h.events.recv().await), "welcome_tour");
        assert_eq!(
            h.events.recv().await,
            Some(EngineEvent::LaunchTour { tour_id: "dashboard-tour".to_owned() })
        );
        assert_eq!(
            h.events.recv().await,
            Some(EngineEvent::HintClosed {
                rule_id: "welcome_tour".to_owned(),
                outcome: Outcome::Accepted,
            })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn idle_beginner_gets_getting_started_hint() {
        let mut h = start(AppConfig::default());
        h.host.send(context(ExperienceLevel::Beginner, "settings")).await.unwrap();
        assert_quiet(&mut h).await;

        // auto-advance reaches the 5 minute idle deadline
        assert_eq!(shown_id(h.events.recv().await), "idle_getting_started");
    }

    #[tokio::test(start_paused = true)]
    async fn idle_ignored_for_advanced_users() {
        let mut h = start(AppConfig::default());
        h.host.send(context(ExperienceLevel::Advanced, "settings")).await.unwrap();
        settle().await;

        tokio::time::advance(Duration::from_secs(6 * 60)).await;
        settle().await;
        assert!(h.events.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn hint_carries_placement_for_mounted_anchor() {
        let mut h = start(AppConfig::default());
        let mut ctx = EvaluationContext {
            experience_level: ExperienceLevel::Intermediate,
            current_view:     "analytics".to_owned(),
            ..EvaluationContext::default()
        };
        ctx.elements.insert(
            "training-load-chart".to_owned(),
            ElementState { rect: Rect::new(100.0, 100.0, 600.0, 200.0), visible: true },
        );
        h.host.send(HostMessage::Context(ctx)).await.unwrap();

        match h.events.recv().await {
            Some(EngineEvent::HintShown(hint)) => {
                assert_eq!(hint.rule_id, "chart_explainer");
                let p = hint.placement.expect("anchor is mounted");
                assert_eq!(p.y, 312.0);
            }
            other => panic!("expected hint_shown, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stops_when_host_closes() {
        let h = start(AppConfig::default());
        drop(h.host);
        assert!(h.task.await.unwrap().is_ok());
    }
}
