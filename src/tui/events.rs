use crossterm::event::Event as CrosstermEvent;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

/// Events driving the UI loop
#[derive(Debug, Clone)]
pub enum Event {
    /// Keyboard, mouse or resize input from the terminal
    Terminal(CrosstermEvent),

    /// No input within the tick interval
    Tick,
}

/// Reads terminal input on a blocking thread and forwards it over a channel
pub struct EventHandler {
    receiver: mpsc::UnboundedReceiver<Event>,
    stop: Arc<AtomicBool>,
}

impl EventHandler {
    pub fn new(tick_interval: Duration) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let stop = Arc::new(AtomicBool::new(false));
        let stopped = stop.clone();

        tokio::task::spawn_blocking(move || {
            while !stopped.load(Ordering::Relaxed) {
                let event = match crossterm::event::poll(tick_interval) {
                    Ok(true) => match crossterm::event::read() {
                        Ok(event) => Event::Terminal(event),
                        Err(e) => {
                            debug!("Terminal read failed: {}", e);
                            break;
                        }
                    },
                    Ok(false) => Event::Tick,
                    Err(e) => {
                        debug!("Terminal poll failed: {}", e);
                        break;
                    }
                };
                if sender.send(event).is_err() {
                    break;
                }
            }
        });

        Self { receiver, stop }
    }

    /// Next event; `None` once input can no longer be read
    pub async fn next(&mut self) -> Option<Event> {
        self.receiver.recv().await
    }
}

impl Drop for EventHandler {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}
