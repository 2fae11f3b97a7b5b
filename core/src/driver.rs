//! Wall-clock tick driver.
//!
//! Calls `request_tick()` at the clock's current rate on a background
//! thread. A request that finds the engine busy is dropped and counted;
//! it is never queued or retried.

use crate::engine::SimEngine;
use std::{
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc, Mutex, TryLockError,
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

/// Poll interval while the clock is paused.
const IDLE_POLL: Duration = Duration::from_millis(50);

pub struct TickDriver {
    stop:    Arc<AtomicBool>,
    dropped: Arc<AtomicU64>,
    handle:  Option<JoinHandle<()>>,
}

impl TickDriver {
    pub fn spawn(engine: Arc<Mutex<SimEngine>>) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let dropped = Arc::new(AtomicU64::new(0));
        let handle = {
            let stop = Arc::clone(&stop);
            let dropped = Arc::clone(&dropped);
            thread::spawn(move || drive(&engine, &stop, &dropped))
        };
        Self { stop, dropped, handle: Some(handle) }
    }

    /// Requests dropped because a cascade or another caller held the engine.
    pub fn dropped_requests(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Signal the thread and wait for it. Any cascade in flight finishes first.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("tick driver thread panicked");
            }
        }
    }
}

impl Drop for TickDriver {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn drive(engine: &Mutex<SimEngine>, stop: &AtomicBool, dropped: &AtomicU64) {
    log::debug!("tick driver started");
    while !stop.load(Ordering::Acquire) {
        let rate = match engine.try_lock() {
            Ok(mut engine) => {
                let rate = engine.clock().tick_rate_hz;
                if rate > 0.0 {
                    match engine.request_tick() {
                        Ok(outcome) if outcome.is_dropped() => {
                            dropped.fetch_add(1, Ordering::Relaxed);
                        }
                        Ok(_) => {}
                        Err(e) => log::error!("tick failed: {e}"),
                    }
                }
                rate
            }
            Err(TryLockError::WouldBlock) => {
                dropped.fetch_add(1, Ordering::Relaxed);
                log::trace!("tick request dropped: engine busy");
                0.0
            }
            Err(TryLockError::Poisoned(_)) => {
                log::error!("engine lock poisoned, tick driver exiting");
                break;
            }
        };
        let interval = if rate > 0.0 {
            Duration::try_from_secs_f64(1.0 / rate).unwrap_or(Duration::MAX)
        } else {
            IDLE_POLL
        };
        sleep_until_due(engine, interval, rate, stop);
    }
    log::debug!("tick driver stopped");
}

/// Sleep in short slices so `stop()` and rate changes are picked up
/// without waiting out an interval computed from the old rate.
fn sleep_until_due(engine: &Mutex<SimEngine>, interval: Duration, rate: f64, stop: &AtomicBool) {
    let deadline = Instant::now().checked_add(interval);
    loop {
        if stop.load(Ordering::Acquire) {
            return;
        }
        let remaining = match deadline {
            Some(d) => d.saturating_duration_since(Instant::now()),
            None => IDLE_POLL,
        };
        if remaining.is_zero() {
            return;
        }
        thread::sleep(remaining.min(IDLE_POLL));
        // A busy engine is left alone; the next slice looks again.
        if let Ok(engine) = engine.try_lock() {
            if engine.clock().tick_rate_hz.to_bits() != rate.to_bits() {
                log::trace!("tick rate changed, rescheduling");
                return;
            }
        }
    }
}
