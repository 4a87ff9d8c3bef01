use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{self, KeyEvent};
use tokio::sync::mpsc;

use crate::error::{LookupError, NetworkError};
use crate::form::RequestId;
use crate::record::AddressInfoRecord;

/// Events consumed by the form's draw loop.
#[derive(Debug)]
pub enum Event {
    /// A keyboard event from crossterm.
    Key(KeyEvent),
    /// Terminal window was resized to (columns, rows).
    Resize(u16, u16),
    /// Periodic tick, used to expire notifications.
    Tick,
    /// A background network action finished.
    Completed(Completion),
}

#[derive(Debug)]
pub struct Completion {
    pub id: RequestId,
    pub outcome: Outcome,
}

#[derive(Debug)]
pub enum Outcome {
    SelfAddress(Result<String, NetworkError>),
    Lookup(Result<AddressInfoRecord, LookupError>),
}

/// Terminal input plus background completions on a single channel.
///
/// A dedicated thread polls crossterm and emits `Event::Tick` whenever
/// `tick_rate` elapses. Network tasks post through [`EventHandler::sender`].
/// Once the handler is dropped every send fails, so late completions and
/// the input thread both stop quietly.
pub struct EventHandler {
    tx: mpsc::UnboundedSender<Event>,
    rx: mpsc::UnboundedReceiver<Event>,
    _handle: thread::JoinHandle<()>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> anyhow::Result<Self> {
        let (tx, rx) = mpsc::unbounded_channel();
        let input_tx = tx.clone();

        let handle = thread::Builder::new()
            .name("ipform-input".into())
            .spawn(move || {
                let mut last_tick = Instant::now();
                loop {
                    let timeout = tick_rate
                        .checked_sub(last_tick.elapsed())
                        .unwrap_or(Duration::ZERO);

                    if event::poll(timeout).unwrap_or(false) {
                        let sent = match event::read() {
                            Ok(event::Event::Key(key)) => input_tx.send(Event::Key(key)),
                            Ok(event::Event::Resize(w, h)) => input_tx.send(Event::Resize(w, h)),
                            // mouse, focus, paste
                            Ok(_) | Err(_) => Ok(()),
                        };
                        if sent.is_err() {
                            return;
                        }
                    }

                    if last_tick.elapsed() >= tick_rate {
                        if input_tx.send(Event::Tick).is_err() {
                            return;
                        }
                        last_tick = Instant::now();
                    }
                }
            })?;

        Ok(Self {
            tx,
            rx,
            _handle: handle,
        })
    }

    /// Handle for posting completions from spawned tasks.
    pub fn sender(&self) -> mpsc::UnboundedSender<Event> {
        self.tx.clone()
    }

    /// Waits for the next event.
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}
