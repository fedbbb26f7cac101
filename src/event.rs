use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEvent};

use crate::engine::confetti::BurstId;

pub enum AppEvent {
    Key(KeyEvent),
    Tick,
    Resize(u16, u16),
    Frame(BurstId),
    BurstExpired(BurstId),
}

pub struct EventHandler {
    rx: mpsc::Receiver<AppEvent>,
    tx: mpsc::Sender<AppEvent>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::channel();
        let input_tx = tx.clone();

        thread::spawn(move || {
            loop {
                if event::poll(tick_rate).unwrap_or(false) {
                    match event::read() {
                        Ok(Event::Key(key)) => {
                            if input_tx.send(AppEvent::Key(key)).is_err() {
                                return;
                            }
                        }
                        Ok(Event::Resize(w, h)) => {
                            if input_tx.send(AppEvent::Resize(w, h)).is_err() {
                                return;
                            }
                        }
                        _ => {}
                    }
                } else if input_tx.send(AppEvent::Tick).is_err() {
                    return;
                }
            }
        });

        Self { rx, tx }
    }

    pub fn next(&self) -> anyhow::Result<AppEvent> {
        Ok(self.rx.recv()?)
    }

    /// Handle for timers that feed events into the same loop.
    pub fn sender(&self) -> mpsc::Sender<AppEvent> {
        self.tx.clone()
    }
}

/// Runs `tick` every `interval` on a background thread until the task is
/// dropped or `tick` returns false.
pub struct RepeatingTask {
    _cancel: mpsc::Sender<()>,
}

impl RepeatingTask {
    pub fn spawn<F>(interval: Duration, mut tick: F) -> Self
    where
        F: FnMut() -> bool + Send + 'static,
    {
        let (cancel, cancelled) = mpsc::channel::<()>();
        thread::spawn(move || {
            // Dropping the handle disconnects the channel and wakes us early.
            while let Err(RecvTimeoutError::Timeout) = cancelled.recv_timeout(interval) {
                if !tick() {
                    break;
                }
            }
        });
        Self { _cancel: cancel }
    }
}

/// Runs `fire` once after `delay` unless dropped first.
pub struct Timeout {
    _cancel: mpsc::Sender<()>,
}

impl Timeout {
    pub fn spawn<F>(delay: Duration, fire: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let (cancel, cancelled) = mpsc::channel::<()>();
        thread::spawn(move || {
            if let Err(RecvTimeoutError::Timeout) = cancelled.recv_timeout(delay) {
                fire();
            }
        });
        Self { _cancel: cancel }
    }
}
