//! Engine output notifications
//!
//! Hosts subscribe once and drain their receiver whenever convenient. Each
//! subscriber gets its own unbounded channel; a subscriber whose receiver has
//! been dropped is pruned on the next publish.
//!
//! `TickChanged` is published once per advancing frame, so a subscriber that
//! never drains its receiver accumulates one event per frame.

use flume::{Receiver, Sender};

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    SongLoaded { tracks: usize },
    PlayStarted,
    Paused,
    Stopped,
    TickChanged(f64),
}

#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Vec<Sender<EngineEvent>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> Receiver<EngineEvent> {
        let (tx, rx) = flume::unbounded();
        self.subscribers.push(tx);
        rx
    }

    pub fn publish(&mut self, event: EngineEvent) {
        log::trace!("Publishing {:?}", event);
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}
