//! Executes the effects returned by `core::action::update`.
//!
//! Everything here is fire-and-forget: results come back, if at all, as
//! `Action`s on the event-loop channel.

use std::collections::HashMap;
use std::sync::{Arc, mpsc};

use log::{debug, info, warn};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::core::action::{Action, Effect};
use crate::core::feedback::COPY_RESET_DELAY;
use crate::platform::{Clipboard, Haptics};
use crate::transport::ChatTransport;

/// Sends `Action::CopyReset(message_id)` once the copy confirmation expires.
pub fn schedule_copy_reset(tx: mpsc::Sender<Action>, message_id: String) -> JoinHandle<()> {
    let deadline = Instant::now() + COPY_RESET_DELAY;
    tokio::spawn(async move {
        tokio::time::sleep_until(deadline).await;
        if tx.send(Action::CopyReset(message_id)).is_err() {
            debug!("Copy reset dropped: event loop gone");
        }
    })
}

pub struct EffectRunner {
    transport: Arc<dyn ChatTransport>,
    clipboard: Arc<dyn Clipboard>,
    haptics: Arc<dyn Haptics>,
    tx: mpsc::Sender<Action>,
    /// Pending copy-reset timers by message id
    timers: HashMap<String, JoinHandle<()>>,
}

impl EffectRunner {
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        clipboard: Arc<dyn Clipboard>,
        haptics: Arc<dyn Haptics>,
        tx: mpsc::Sender<Action>,
    ) -> Self {
        Self {
            transport,
            clipboard,
            haptics,
            tx,
            timers: HashMap::new(),
        }
    }

    /// Runs `effects` in order. Returns true if one of them asked to quit.
    pub fn run_all(&mut self, effects: Vec<Effect>) -> bool {
        let mut quit = false;
        for effect in effects {
            quit |= self.run(effect);
        }
        quit
    }

    fn run(&mut self, effect: Effect) -> bool {
        match effect {
            Effect::SendMessage(text) => self.transport.send_message(text),
            Effect::StopGeneration => self.transport.stop(),
            Effect::CopyToClipboard(text) => {
                let clipboard = self.clipboard.clone();
                tokio::task::spawn_blocking(move || match clipboard.set_text(&text) {
                    Ok(()) => info!("Copied to clipboard ({} bytes)", text.len()),
                    Err(e) => warn!("Clipboard write failed: {}", e),
                });
            }
            Effect::ScheduleCopyReset(id) => {
                self.timers.retain(|_, handle| !handle.is_finished());
                let handle = schedule_copy_reset(self.tx.clone(), id.clone());
                // A second copy restarts the countdown
                if let Some(previous) = self.timers.insert(id, handle) {
                    previous.abort();
                }
            }
            Effect::Haptic(kind) => self.haptics.notify(kind),
            Effect::Quit => return true,
        }
        false
    }

    /// Cancels outstanding timers. Called on shutdown.
    pub fn shutdown(&mut self) {
        for (_, handle) in self.timers.drain() {
            handle.abort();
        }
    }
}
