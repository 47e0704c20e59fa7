//! Per-turn countdowns.
//!
//! Each turn owns a `TurnTimers` tagged with the word index it was started for.
//! Polling with any other index yields nothing, so a countdown left over from a
//! superseded turn can never touch the new one.

use crate::config::GameConfig;
use std::cell::Cell;
use std::time::{Duration, Instant};

pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Cell<Instant>,
}

impl ManualClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            now: Cell::new(Instant::now()),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Countdown {
    duration: Duration,
    started_at: Instant,
    fired: bool,
}

impl Countdown {
    #[must_use]
    pub fn start(duration: Duration, now: Instant) -> Self {
        Self {
            duration,
            started_at: now,
            fired: false,
        }
    }

    #[must_use]
    pub fn remaining(&self, now: Instant) -> Duration {
        self.duration
            .saturating_sub(now.saturating_duration_since(self.started_at))
    }

    /// Whole seconds left, rounded up the way a ticking display shows them.
    #[must_use]
    pub fn remaining_secs(&self, now: Instant) -> u64 {
        let millis = u64::try_from(self.remaining(now).as_millis()).unwrap_or(u64::MAX);
        millis.div_ceil(1000)
    }

    #[must_use]
    pub fn is_expired(&self, now: Instant) -> bool {
        self.remaining(now).is_zero()
    }

    /// True exactly once: the first poll at or after expiry.
    pub fn fire(&mut self, now: Instant) -> bool {
        if self.fired || !self.is_expired(now) {
            return false;
        }
        self.fired = true;
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    HintExpired,
    AnswerExpired,
}

#[derive(Debug)]
pub struct TurnTimers {
    turn: usize,
    hint_duration: Duration,
    hint: Option<Countdown>,
    answer: Option<Countdown>,
}

impl TurnTimers {
    /// Start the answer countdown for `turn`.
    #[must_use]
    pub fn start(turn: usize, config: &GameConfig, now: Instant) -> Self {
        Self {
            turn,
            hint_duration: config.hint_duration,
            hint: None,
            answer: Some(Countdown::start(config.answer_duration, now)),
        }
    }

    /// (Re)start the hint countdown from its full duration.
    pub fn start_hint(&mut self, now: Instant) {
        self.hint = Some(Countdown::start(self.hint_duration, now));
    }

    pub fn cancel(&mut self) {
        self.hint = None;
        self.answer = None;
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.hint.is_none() && self.answer.is_none()
    }

    /// Fire expired countdowns belonging to `turn`. Fired countdowns are dropped.
    pub fn poll(&mut self, turn: usize, now: Instant) -> Vec<TimerEvent> {
        let mut events = Vec::new();
        if turn != self.turn {
            return events;
        }
        if let Some(hint) = self.hint.as_mut()
            && hint.fire(now)
        {
            self.hint = None;
            events.push(TimerEvent::HintExpired);
        }
        if let Some(answer) = self.answer.as_mut()
            && answer.fire(now)
        {
            self.answer = None;
            self.hint = None;
            events.push(TimerEvent::AnswerExpired);
        }
        events
    }

    #[must_use]
    pub fn answer_secs_left(&self, now: Instant) -> Option<u64> {
        self.answer.map(|c| c.remaining_secs(now))
    }

    #[must_use]
    pub fn hint_secs_left(&self, now: Instant) -> Option<u64> {
        self.hint.map(|c| c.remaining_secs(now))
    }
}
