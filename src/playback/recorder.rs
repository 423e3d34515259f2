//! In-memory audio backend with a manually driven clock
//!
//! Records every voice and trigger instead of producing sound. Clones share
//! the same log, so a caller can keep one handle for inspection while the
//! scheduler owns another.

use std::cell::RefCell;
use std::rc::Rc;

use crate::config::Envelope;

use super::types::{AudioBackend, ScheduledTrigger, Voice};

#[derive(Debug)]
struct Log {
    now: f64,
    transport_running: bool,
    envelopes: Vec<(Envelope, usize)>,
    disposed: Vec<bool>,
    triggers: Vec<ScheduledTrigger>,
}

#[derive(Debug, Clone)]
pub struct RecordingBackend {
    log: Rc<RefCell<Log>>,
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingBackend {
    /// Clock at 0 with the transport running
    pub fn new() -> Self {
        Self {
            log: Rc::new(RefCell::new(Log {
                now: 0.0,
                transport_running: true,
                envelopes: Vec::new(),
                disposed: Vec::new(),
                triggers: Vec::new(),
            })),
        }
    }

    pub fn set_now(&self, seconds: f64) {
        self.log.borrow_mut().now = seconds;
    }

    pub fn advance(&self, seconds: f64) {
        self.log.borrow_mut().now += seconds;
    }

    /// Every trigger ever scheduled, in scheduling order
    pub fn triggers(&self) -> Vec<ScheduledTrigger> {
        self.log.borrow().triggers.clone()
    }

    /// Triggers on live voices that have not fired yet
    pub fn pending_triggers(&self) -> Vec<ScheduledTrigger> {
        let log = self.log.borrow();
        log.triggers
            .iter()
            .filter(|t| !log.disposed[t.voice] && t.when > log.now)
            .cloned()
            .collect()
    }

    pub fn voices_created(&self) -> usize {
        self.log.borrow().disposed.len()
    }

    pub fn live_voices(&self) -> usize {
        self.log.borrow().disposed.iter().filter(|d| !**d).count()
    }

    /// Envelope and polyphony each voice was created with
    pub fn voice_configs(&self) -> Vec<(Envelope, usize)> {
        self.log.borrow().envelopes.clone()
    }

    pub fn transport_running(&self) -> bool {
        self.log.borrow().transport_running
    }
}

impl AudioBackend for RecordingBackend {
    type Voice = RecordingVoice;

    fn now(&self) -> f64 {
        self.log.borrow().now
    }

    fn create_voice(&mut self, envelope: &Envelope, polyphony: usize) -> RecordingVoice {
        let mut log = self.log.borrow_mut();
        log.envelopes.push((*envelope, polyphony));
        log.disposed.push(false);
        RecordingVoice {
            index: log.disposed.len() - 1,
            log: Rc::clone(&self.log),
        }
    }

    fn toggle_transport(&mut self) {
        let mut log = self.log.borrow_mut();
        log.transport_running = !log.transport_running;
    }
}

#[derive(Debug)]
pub struct RecordingVoice {
    index: usize,
    log: Rc<RefCell<Log>>,
}

impl Voice for RecordingVoice {
    fn trigger_attack_release(&mut self, pitch: &str, duration: f64, when: f64, velocity: f64) {
        self.log.borrow_mut().triggers.push(ScheduledTrigger {
            voice: self.index,
            pitch: pitch.to_string(),
            duration,
            when,
            velocity,
        });
    }

    fn dispose(self) {
        self.log.borrow_mut().disposed[self.index] = true;
    }
}
