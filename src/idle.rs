/// Idle detection: asks the engine to re-evaluate after a quiet period.
///
/// `IdleDetector` is the pure two-state machine:
///   Active --activity--> Active   (deadline re-armed)
///   Active --deadline--> Idle     (emits exactly one idle signal)
///   Idle   --activity--> Active   (deadline re-armed)
/// There is no Idle -> Idle transition; a second signal needs fresh activity
/// followed by another full quiet period.
///
/// `IdleTimer` drives the machine on a tokio task. The task is aborted when
/// the handle is dropped, so a torn-down engine never receives a late signal.
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant};

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleState {
    Active,
    Idle,
}

#[derive(Debug)]
pub struct IdleDetector {
    state:       IdleState,
    timeout_ms:  u64,
    deadline_ms: u64,
}

impl IdleDetector {
    pub fn new(timeout_ms: u64, now_ms: u64) -> Self {
        Self {
            state:       IdleState::Active,
            timeout_ms,
            deadline_ms: now_ms.saturating_add(timeout_ms),
        }
    }

    pub fn state(&self) -> IdleState {
        self.state
    }

    /// Pending deadline while Active; None while Idle.
    pub fn deadline_ms(&self) -> Option<u64> {
        match self.state {
            IdleState::Active => Some(self.deadline_ms),
            IdleState::Idle   => None,
        }
    }

    pub fn on_activity(&mut self, now_ms: u64) {
        if self.state == IdleState::Idle {
            tracing::debug!("Idle -> Active");
        }
        self.state       = IdleState::Active;
        self.deadline_ms = now_ms.saturating_add(self.timeout_ms);
    }

    /// Returns true exactly when this call moves the detector into Idle.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        if self.state == IdleState::Active && now_ms >= self.deadline_ms {
            self.state = IdleState::Idle;
            tracing::debug!("Active -> Idle after {}ms without activity", self.timeout_ms);
            true
        } else {
            false
        }
    }
}

// ---------------------------------------------------------------------------
// Timer task
// ---------------------------------------------------------------------------

/// Sent once per entry into Idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdleSignal;

pub struct IdleTimer {
    activity_tx: mpsc::Sender<()>,
    task:        JoinHandle<()>,
}

impl IdleTimer {
    pub fn spawn(timeout: Duration, idle_tx: mpsc::Sender<IdleSignal>) -> Self {
        let (activity_tx, activity_rx) = mpsc::channel(16);
        let task = tokio::spawn(run(timeout, activity_rx, idle_tx));
        Self { activity_tx, task }
    }

    /// Report user activity. A full channel already holds a pending reset,
    /// so dropping this one loses nothing.
    pub fn touch(&self) {
        let _ = self.activity_tx.try_send(());
    }
}

impl Drop for IdleTimer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run(
    timeout:         Duration,
    mut activity_rx: mpsc::Receiver<()>,
    idle_tx:         mpsc::Sender<IdleSignal>,
) {
    let origin = Instant::now();
    let now_ms = || origin.elapsed().as_millis() as u64;
    let mut detector = IdleDetector::new(timeout.as_millis() as u64, 0);

    loop {
        match detector.deadline_ms() {
            Some(deadline) => {
                tokio::select! {
                    msg = activity_rx.recv() => match msg {
                        Some(()) => detector.on_activity(now_ms()),
                        None     => break,
                    },
                    _ = tokio::time::sleep_until(origin + Duration::from_millis(deadline)) => {
                        if detector.poll(now_ms()) && idle_tx.send(IdleSignal).await.is_err() {
                            break; // engine gone
                        }
                    }
                }
            }
            None => match activity_rx.recv().await {
                Some(()) => detector.on_activity(now_ms()),
                None     => break,
            },
        }
    }
    tracing::debug!("Idle timer stopped");
}
