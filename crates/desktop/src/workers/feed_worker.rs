use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};

use icaowatch_core::analysis::domain::face::Face;
use icaowatch_core::replay::scenario::{Scenario, ScenarioPlayer};

/// Messages sent from the feed thread to the UI.
#[derive(Debug, Clone)]
pub enum FeedMessage {
    Step(String),
    Finished,
    Error(String),
    Cancelled,
}

/// Parameters for a scenario feed.
pub struct FeedParams {
    /// Face graph shared with the UI's binding; mutated from the feed thread.
    pub face: Arc<Face>,
    pub scenario: Scenario,
    /// Restart from the first step after the last one.
    pub loop_playback: bool,
}

/// Spawn a background feed. Returns the channel receiver and cancellation token.
pub fn spawn(params: FeedParams) -> (Receiver<FeedMessage>, Arc<AtomicBool>) {
    let (tx, rx) = crossbeam_channel::unbounded::<FeedMessage>();
    let cancelled = Arc::new(AtomicBool::new(false));
    let cancelled_clone = cancelled.clone();

    thread::spawn(move || {
        if let Err(e) = run_feed(&tx, &cancelled_clone, &params) {
            if cancelled_clone.load(Ordering::Relaxed) {
                let _ = tx.send(FeedMessage::Cancelled);
            } else {
                let _ = tx.send(FeedMessage::Error(e.to_string()));
            }
        }
    });

    (rx, cancelled)
}

fn run_feed(
    tx: &Sender<FeedMessage>,
    cancelled: &Arc<AtomicBool>,
    params: &FeedParams,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut player = ScenarioPlayer::new(params.face.clone());
    log::info!(
        "feed: playing {} steps (loop: {})",
        params.scenario.steps.len(),
        params.loop_playback
    );

    loop {
        for step in &params.scenario.steps {
            if cancelled.load(Ordering::Relaxed) {
                return Err("Cancelled".into());
            }
            let _ = tx.send(FeedMessage::Step(step.label.clone()));
            player.apply(step);
            if !hold(cancelled, step.hold_ms) {
                return Err("Cancelled".into());
            }
        }
        if !params.loop_playback {
            break;
        }
    }

    let _ = tx.send(FeedMessage::Finished);
    Ok(())
}

/// Sleeps in short slices so cancellation lands promptly.
/// Returns `false` when cancelled mid-hold.
fn hold(cancelled: &Arc<AtomicBool>, ms: u64) -> bool {
    let mut remaining = ms;
    while remaining > 0 {
        if cancelled.load(Ordering::Relaxed) {
            return false;
        }
        let chunk = remaining.min(25);
        thread::sleep(Duration::from_millis(chunk));
        remaining -= chunk;
    }
    !cancelled.load(Ordering::Relaxed)
}
