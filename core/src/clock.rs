//! Simulation clock. Owns tick state, simulated time, tick rate, and
//! the Idle/Advancing reentrancy gate.
//!
//! Simulated time is never stored: it is derived from `current_tick`
//! under a fixed minutes-per-tick constant, so it can only move forward
//! when the tick counter does.

use crate::types::{RunId, Tick};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub const MINUTES_PER_TICK: u64 = 1;
pub const MINUTES_PER_HOUR: u64 = 60;
pub const HOURS_PER_DAY: u64 = 24;
pub const MINUTES_PER_DAY: u64 = MINUTES_PER_HOUR * HOURS_PER_DAY;

/// A run starts on day 1 at 09:00.
pub const START_DAY: u32 = 1;
pub const START_HOUR: u32 = 9;

/// Ticks in one 30-day month. Revenue and expenses are monthly figures.
pub const TICKS_PER_MONTH: u64 = 30 * MINUTES_PER_DAY / MINUTES_PER_TICK;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct SimTime {
    pub day:    u32,
    pub hour:   u32,
    pub minute: u32,
}

impl SimTime {
    pub fn start() -> Self {
        Self { day: START_DAY, hour: START_HOUR, minute: 0 }
    }

    /// Derive the simulated time at `tick`.
    pub fn at_tick(tick: Tick) -> Self {
        let offset = u64::from(START_HOUR) * MINUTES_PER_HOUR;
        let total = offset.saturating_add(tick.saturating_mul(MINUTES_PER_TICK));
        Self {
            day:    START_DAY + (total / MINUTES_PER_DAY) as u32,
            hour:   ((total % MINUTES_PER_DAY) / MINUTES_PER_HOUR) as u32,
            minute: (total % MINUTES_PER_HOUR) as u32,
        }
    }
}

impl std::fmt::Display for SimTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "day {} {:02}:{:02}", self.day, self.hour, self.minute)
    }
}

/// Which rollovers one advance crossed. A day crossing implies an hour
/// crossing.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Boundaries {
    pub hour: bool,
    pub day:  bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimClock {
    pub run_id:       RunId,
    pub current_tick: Tick,
    /// Ticks per wall-clock second. 0 = paused.
    pub tick_rate_hz: f64,
    /// Rate restored by `resume()`.
    resume_rate_hz:   f64,
    /// Commands applied over the whole run. Salts the command RNG, so it
    /// is saved with the clock and never repeats after a reload.
    #[serde(default)]
    commands_applied: u64,
}

impl SimClock {
    pub fn new(run_id: RunId) -> Self {
        Self {
            run_id,
            current_tick: 0,
            tick_rate_hz: 1.0,
            resume_rate_hz: 1.0,
            commands_applied: 0,
        }
    }

    pub fn time(&self) -> SimTime {
        SimTime::at_tick(self.current_tick)
    }

    /// Advance one tick. Returns the new tick and the boundaries crossed.
    pub fn advance(&mut self) -> (Tick, Boundaries) {
        let before = self.time();
        self.current_tick += 1;
        let after = self.time();
        let day = after.day != before.day;
        let boundaries = Boundaries {
            hour: day || after.hour != before.hour,
            day,
        };
        (self.current_tick, boundaries)
    }

    /// Negative or non-finite rates are treated as 0 (paused).
    pub fn set_tick_rate(&mut self, hz: f64) {
        let hz = if hz.is_finite() { hz.max(0.0) } else { 0.0 };
        self.tick_rate_hz = hz;
        if hz > 0.0 {
            self.resume_rate_hz = hz;
        }
    }

    pub fn pause(&mut self) {
        if self.tick_rate_hz > 0.0 {
            self.resume_rate_hz = self.tick_rate_hz;
        }
        self.tick_rate_hz = 0.0;
    }

    pub fn resume(&mut self) {
        self.tick_rate_hz = self.resume_rate_hz;
    }

    pub fn is_paused(&self) -> bool {
        self.tick_rate_hz <= 0.0
    }

    /// Count one more command and return its salt.
    pub fn next_command_salt(&mut self) -> u64 {
        self.commands_applied += 1;
        self.commands_applied
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockPhase {
    Idle,
    Advancing,
}

/// At-most-one-in-flight guard shared between the engine and whatever
/// schedules ticks. Entering while another holder is inside fails; it
/// never blocks or queues.
#[derive(Debug, Default)]
pub struct TickGate {
    advancing: AtomicBool,
}

impl TickGate {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Move Idle -> Advancing. Returns `None` when already Advancing.
    pub fn try_enter(self: &Arc<Self>) -> Option<TickPermit> {
        self.advancing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| TickPermit { gate: Arc::clone(self) })
    }

    pub fn phase(&self) -> ClockPhase {
        if self.advancing.load(Ordering::Acquire) {
            ClockPhase::Advancing
        } else {
            ClockPhase::Idle
        }
    }
}

/// Held for the whole cascade. Dropping it moves the gate back to Idle,
/// including on early return or unwinding.
#[derive(Debug)]
pub struct TickPermit {
    gate: Arc<TickGate>,
}

impl Drop for TickPermit {
    fn drop(&mut self) {
        self.gate.advancing.store(false, Ordering::Release);
    }
}
