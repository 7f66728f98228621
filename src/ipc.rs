/// Host bridge: newline-delimited JSON between the dashboard and the engine.
///
/// Inbound (one object per line, tagged by `type`):
///   {"type":"context", ...EvaluationContext fields}
///   {"type":"activity","kind":"pointer"|"keyboard"|"change"}
///   {"type":"accept"} / {"type":"dismiss"}
///
/// Outbound (tagged by `event`): `hint_shown`, `hint_closed`, `launch_tour`,
/// `launch_failed`. Event and field names are part of the front-end contract.
///
/// Malformed lines are logged and skipped; the bridge never stops the engine
/// because of one bad message.
use crate::{
    context::EvaluationContext,
    error::LaunchError,
    placement::Placement,
    presenter::{Outcome, TutorialLauncher},
    rules::{Priority, TriggerKind},
};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc::{Receiver, Sender};

// ---------------------------------------------------------------------------
// Inbound
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Pointer,
    Keyboard,
    Change,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostMessage {
    Context(EvaluationContext),
    Activity { kind: ActivityKind },
    Accept,
    Dismiss,
}

pub fn parse_host_line(line: &str) -> Result<HostMessage> {
    let msg: HostMessage = serde_json::from_str(line)?;
    if let HostMessage::Context(ctx) = &msg {
        if !ctx.is_supported() {
            anyhow::bail!("unsupported context version {}", ctx.version);
        }
    }
    Ok(msg)
}

/// Reads host messages until EOF or until the engine hangs up.
///
/// Lines are read as raw bytes so a line that is not UTF-8 is skipped like any
/// other malformed message. Only an I/O failure on the reader is an error.
pub async fn read_host<R: AsyncBufRead + Unpin>(mut reader: R, tx: Sender<HostMessage>) -> Result<()> {
    let mut buf = Vec::with_capacity(4096);
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        let line = match std::str::from_utf8(&buf) {
            Ok(line) => line.trim(),
            Err(e) => {
                tracing::warn!("Skipping host message: {}", e);
                continue;
            }
        };
        if line.is_empty() {
            continue;
        }
        match parse_host_line(line) {
            Ok(msg) => {
                if tx.send(msg).await.is_err() {
                    break;
                }
            }
            Err(e) => tracing::warn!("Skipping host message: {}", e),
        }
    }
    tracing::info!("Host input closed");
    Ok(())
}

// ---------------------------------------------------------------------------
// Outbound
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HintEvent {
    pub rule_id:     String,
    pub message:     String,
    pub priority:    Priority,
    pub kind:        TriggerKind,
    pub target:      String,
    pub shown_at_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placement:   Option<Placement>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EngineEvent {
    HintShown(HintEvent),
    HintClosed { rule_id: String, outcome: Outcome },
    LaunchTour { tour_id: String },
    LaunchFailed { tour_id: String, reason: String },
}

pub async fn write_events<W: AsyncWrite + Unpin>(
    mut rx:     Receiver<EngineEvent>,
    mut writer: W,
) -> Result<()> {
    while let Some(event) = rx.recv().await {
        let mut line = serde_json::to_string(&event)?;
        line.push('\n');
        writer.write_all(line.as_bytes()).await?;
        writer.flush().await?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Launcher
// ---------------------------------------------------------------------------

/// Collects accepted tours for the engine to forward as `launch_tour` events.
///
/// Tour ids are checked against `known_tours`; an empty set disables the
/// check. The engine drains the queue and awaits each send, so a slow writer
/// delays a launch but never drops it.
#[derive(Debug, Default)]
pub struct TourQueue {
    known_tours: HashSet<String>,
    queued:      Vec<String>,
}

impl TourQueue {
    pub fn new(known_tours: impl IntoIterator<Item = String>) -> Self {
        Self { known_tours: known_tours.into_iter().collect(), queued: Vec::new() }
    }

    /// Tours accepted since the last drain, oldest first.
    pub fn drain(&mut self) -> std::vec::Drain<'_, String> {
        self.queued.drain(..)
    }
}

impl TutorialLauncher for TourQueue {
    fn launch(&mut self, tour_id: &str) -> Result<(), LaunchError> {
        if !self.known_tours.is_empty() && !self.known_tours.contains(tour_id) {
            return Err(LaunchError::UnknownTour(tour_id.to_owned()));
        }
        tracing::info!("Launching tour '{}'", tour_id);
        self.queued.push(tour_id.to_owned());
        Ok(())
    }
}
