//! Periodic driver for the producer tick.
//!
//! The timer runs on its own thread and schedules against absolute deadlines, so a
//! slow callback does not push later ticks back. Missed deadlines are skipped rather
//! than replayed in a burst.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::error::PipelineError;

pub struct PeriodicTimer;

impl PeriodicTimer {
    /// Calls `tick` first after `initial_delay`, then once every `period`, until the
    /// returned handle is stopped or dropped.
    pub fn start<F>(
        initial_delay: Duration,
        period: Duration,
        mut tick: F,
    ) -> Result<TimerHandle, PipelineError>
    where
        F: FnMut() + Send + 'static,
    {
        if period.is_zero() {
            return Err(PipelineError::ZeroPeriod);
        }
        let stop = Arc::new(AtomicBool::new(false));
        let fired = Arc::new(AtomicU64::new(0));
        let thread_stop = Arc::clone(&stop);
        let thread_fired = Arc::clone(&fired);

        let join = thread::Builder::new()
            .name("slotpipe-timer".to_string())
            .spawn(move || {
                let mut deadline = Instant::now() + initial_delay;
                loop {
                    let now = Instant::now();
                    if thread_stop.load(Ordering::Acquire) {
                        break;
                    }
                    if now < deadline {
                        thread::park_timeout(deadline - now);
                        continue;
                    }
                    tick();
                    thread_fired.fetch_add(1, Ordering::Relaxed);
                    let (next, skipped) = next_deadline(deadline, Instant::now(), period);
                    if skipped > 0 {
                        trace!(skipped, "timer: deadlines missed");
                    }
                    deadline = next;
                }
                debug!("timer: stopped");
            })?;

        Ok(TimerHandle {
            stop,
            fired,
            join: Some(join),
        })
    }
}

// next_deadline returns the first deadline after `now` on the grid previous + k * period,
// and how many grid points at or before `now` were skipped to get there.
fn next_deadline(previous: Instant, now: Instant, period: Duration) -> (Instant, u64) {
    let deadline = previous + period;
    if deadline > now {
        return (deadline, 0);
    }
    let behind = (now - deadline).as_nanos();
    let period_nanos = period.as_nanos();
    let skipped = u64::try_from(behind / period_nanos)
        .unwrap_or(u64::MAX)
        .saturating_add(1);
    let lag = behind % period_nanos;
    let lag = Duration::new(
        (lag / 1_000_000_000) as u64,
        (lag % 1_000_000_000) as u32,
    );
    (now + (period - lag), skipped)
}

pub struct TimerHandle {
    stop: Arc<AtomicBool>,
    fired: Arc<AtomicU64>,
    join: Option<JoinHandle<()>>,
}

impl TimerHandle {
    /// Number of times the callback has run.
    pub fn fired(&self) -> u64 {
        self.fired.load(Ordering::Relaxed)
    }

    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(join) = self.join.take() {
            join.thread().unpark();
            let _ = join.join();
        }
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}
