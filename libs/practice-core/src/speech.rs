//! Speech collaborators.
//!
//! The engine never talks to audio hardware. Text-to-speech is a
//! fire-and-forget [`SpeechSynthesizer`]; recognition is a
//! [`SpeechRecognizer`] whose runs are supervised by [`spawn_listener`],
//! which restarts the recognizer after each run ends until it is stopped.
//!
//! The listener is meant for hosts that own the microphone. The HTTP backend
//! does not: its clients recognize speech themselves and post transcripts,
//! so it only advertises that path through its `SPEECH_RECOGNITION` setting.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::EngineError;
use crate::matching::MatchEvaluator;
use crate::types::MatchVerdict;

/// Speaks a word aloud.
pub trait SpeechSynthesizer: Send + Sync {
    fn speak(&self, text: &str);
}

/// Event produced by one recognition run.
#[derive(Debug, Clone, PartialEq)]
pub enum RecognitionEvent {
    Transcript { text: String, confidence: f32 },
    /// The run finished normally.
    End,
    Error(String),
}

/// Platform speech recognition.
pub trait SpeechRecognizer: Send + Sync + 'static {
    /// Whether recognition works on this device.
    fn is_available(&self) -> bool;

    /// Begin one recognition run. The run is over once the channel yields
    /// `End` or `Error`, or closes.
    fn start(&self) -> mpsc::Receiver<RecognitionEvent>;
}

/// Word a listener is matching against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenTarget {
    pub presentation: u64,
    pub word_id: Uuid,
    pub text: String,
}

/// Output of a listener.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum ListenerEvent {
    Verdict {
        presentation: u64,
        word_id: Uuid,
        verdict: MatchVerdict,
    },
    Error { message: String },
    /// Always the last event.
    Stopped,
}

/// Handle to a running listener task.
pub struct ListenerHandle {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ListenerHandle {
    /// Signal the listener to stop. No verdict is emitted after the task
    /// observes the signal.
    pub fn stop(&self) {
        let _ = self.stop_tx.send(true);
    }

    /// Stop and wait for the task to exit.
    pub async fn shutdown(self) {
        self.stop();
        if let Err(e) = self.task.await {
            warn!("speech listener task failed: {e}");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Spawn a continuous listener for one presentation.
///
/// Fails with [`EngineError::CollaboratorUnavailable`] when the recognizer
/// is not available; callers fall back to manual verdicts.
pub fn spawn_listener(
    recognizer: Arc<dyn SpeechRecognizer>,
    evaluator: Arc<MatchEvaluator>,
    target: ListenTarget,
    restart_delay: Duration,
    events: mpsc::Sender<ListenerEvent>,
) -> Result<ListenerHandle, EngineError> {
    if !recognizer.is_available() {
        return Err(EngineError::CollaboratorUnavailable(
            "speech recognition".to_string(),
        ));
    }

    let (stop_tx, stop_rx) = watch::channel(false);
    let task = tokio::spawn(listen_loop(
        recognizer,
        evaluator,
        target,
        restart_delay,
        events,
        stop_rx,
    ));
    Ok(ListenerHandle { stop_tx, task })
}

async fn listen_loop(
    recognizer: Arc<dyn SpeechRecognizer>,
    evaluator: Arc<MatchEvaluator>,
    target: ListenTarget,
    restart_delay: Duration,
    events: mpsc::Sender<ListenerEvent>,
    mut stop_rx: watch::Receiver<bool>,
) {
    'supervise: loop {
        if *stop_rx.borrow() {
            break;
        }

        let mut run = recognizer.start();
        debug!(word = %target.text, "recognition run started");

        loop {
            tokio::select! {
                biased;
                changed = stop_rx.changed() => {
                    if changed.is_err() || *stop_rx.borrow() {
                        break 'supervise;
                    }
                }
                event = run.recv() => match event {
                    Some(RecognitionEvent::Transcript { text, confidence }) => {
                        let verdict = evaluator.verdict(&text, &target.text, confidence);
                        debug!(transcript = %text, is_match = verdict.is_match, "transcript evaluated");
                        let Some(permit) = reserve_unless_stopped(&events, &mut stop_rx).await else {
                            break 'supervise;
                        };
                        permit.send(ListenerEvent::Verdict {
                            presentation: target.presentation,
                            word_id: target.word_id,
                            verdict,
                        });
                    }
                    Some(RecognitionEvent::End) | None => break,
                    Some(RecognitionEvent::Error(message)) => {
                        warn!(%message, "speech recognition failed");
                        let _ = events.send(ListenerEvent::Error { message }).await;
                        break 'supervise;
                    }
                },
            }
        }

        tokio::select! {
            biased;
            changed = stop_rx.changed() => {
                if changed.is_err() || *stop_rx.borrow() {
                    break;
                }
            }
            _ = tokio::time::sleep(restart_delay) => {}
        }
    }

    debug!(word = %target.text, "speech listener stopped");
    let _ = events.send(ListenerEvent::Stopped).await;
}

/// Wait for room in the event channel. Returns `None` once stopped or when
/// the consumer is gone, so a verdict never lands after `stop`.
async fn reserve_unless_stopped<'a>(
    events: &'a mpsc::Sender<ListenerEvent>,
    stop_rx: &mut watch::Receiver<bool>,
) -> Option<mpsc::Permit<'a, ListenerEvent>> {
    loop {
        if *stop_rx.borrow() {
            return None;
        }
        tokio::select! {
            biased;
            changed = stop_rx.changed() => {
                if changed.is_err() {
                    return None;
                }
            }
            permit = events.reserve() => {
                let permit = permit.ok()?;
                if *stop_rx.borrow() {
                    return None;
                }
                return Some(permit);
            }
        }
    }
}
