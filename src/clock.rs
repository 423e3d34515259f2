//! # Tick Clock
//!
//! The logical playback position, measured in song ticks.
//!
//! ## States
//! ```text
//! Stopped --start--> Playing --pause--> Paused
//!    ^                  |                  |
//!    +------stop--------+------stop--------+
//!                       ^                  |
//!                       +------start-------+
//! ```
//!
//! - **Stopped**: tick is 0
//! - **Playing**: every [`TickClock::advance`] adds the elapsed milliseconds times
//!   the tempo-derived ticks per millisecond
//! - **Paused**: tick is frozen
//!
//! The host calls `advance(now)` once per frame regardless of state.

use crate::song::Song;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockState {
    Stopped,
    Playing,
    Paused,
}

#[derive(Debug, Clone)]
pub struct TickClock {
    current_tick: f64,
    ticks_per_ms: f64,
    state: ClockState,
    last_update: f64,
    /// Set by `seek`; the next `advance` only refreshes the timestamp
    suspend_advance: bool,
}

impl Default for TickClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TickClock {
    pub fn new() -> Self {
        Self {
            current_tick: 0.0,
            ticks_per_ms: 0.0,
            state: ClockState::Stopped,
            last_update: 0.0,
            suspend_advance: false,
        }
    }

    pub fn current_tick(&self) -> f64 {
        self.current_tick
    }

    pub fn ticks_per_ms(&self) -> f64 {
        self.ticks_per_ms
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == ClockState::Playing
    }

    /// Recompute ticks per millisecond from the song's tempo map.
    ///
    /// Songs without tempo data leave the rate at 0 so the clock never moves.
    pub fn set_tempo(&mut self, song: &Song) {
        self.ticks_per_ms = match song.time_from_ticks(1.0) {
            Some(ms) if ms > 0.0 => 1.0 / ms,
            _ => {
                log::warn!("Song has no tempo data; clock will not advance");
                0.0
            }
        };
        log::debug!("Tick rate set to {} ticks/ms", self.ticks_per_ms);
    }

    /// Begin or resume playback at `now` (milliseconds).
    pub fn start(&mut self, now: f64) {
        self.state = ClockState::Playing;
        self.last_update = now;
        log::debug!("Clock started at tick {}", self.current_tick);
    }

    pub fn pause(&mut self) {
        if self.state == ClockState::Playing {
            self.state = ClockState::Paused;
            log::debug!("Clock paused at tick {}", self.current_tick);
        }
    }

    pub fn stop(&mut self) {
        self.state = ClockState::Stopped;
        self.current_tick = 0.0;
        self.suspend_advance = false;
        log::debug!("Clock stopped");
    }

    /// Move to `tick` directly.
    ///
    /// The next `advance` applies no delta, so the frame the seek lands in
    /// shows exactly `tick`.
    pub fn seek(&mut self, tick: f64) {
        self.current_tick = tick.max(0.0);
        self.suspend_advance = true;
        log::debug!("Clock seek to tick {}", self.current_tick);
    }

    /// Advance by the time elapsed since the previous update.
    ///
    /// Returns true when the tick changed. No-op unless playing with a
    /// non-zero tick rate.
    pub fn advance(&mut self, now: f64) -> bool {
        if self.state != ClockState::Playing {
            return false;
        }

        if self.suspend_advance {
            self.suspend_advance = false;
            self.last_update = now;
            return false;
        }

        let delta = now - self.last_update;
        self.last_update = now;
        if self.ticks_per_ms == 0.0 || delta <= 0.0 {
            return false;
        }

        self.current_tick += delta * self.ticks_per_ms;
        log::trace!("Clock advanced to tick {}", self.current_tick);
        true
    }
}
