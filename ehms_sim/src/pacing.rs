//! Cycle pacing for the simulation's tick loop.
//!
//! The real EHMS core runs inside an external cyclic executive that this
//! crate does not own. `ehms_sim` stands in for that executive so the demo
//! harness can run free-standing. With the `rt` feature this uses
//! `clock_gettime`/`clock_nanosleep(TIMER_ABSTIME)` for drift-free
//! absolute-time wakeups, the same pattern a production cycle loop would
//! use. Without `rt`, an approximate `std::thread::sleep` stand-in is used
//! instead.

/// Paces calls to [`CyclePacer::wait_for_next_cycle`] at a fixed period.
///
/// Construct once before the tick loop starts, then call
/// `wait_for_next_cycle` once per tick, after the tick body has run.
pub struct CyclePacer {
    #[cfg(feature = "rt")]
    inner: rt::RtPacer,
    #[cfg(not(feature = "rt"))]
    inner: sim::SimPacer,
}

impl CyclePacer {
    /// Build a pacer for a fixed cycle period in microseconds.
    pub fn new(period_us: u32) -> Result<Self, PacingError> {
        Ok(Self {
            #[cfg(feature = "rt")]
            inner: rt::RtPacer::new(period_us)?,
            #[cfg(not(feature = "rt"))]
            inner: sim::SimPacer::new(period_us),
        })
    }

    /// Block until the next cycle boundary.
    pub fn wait_for_next_cycle(&mut self) {
        self.inner.wait_for_next_cycle();
    }
}

/// Failure setting up the cycle pacer. Only reachable with the `rt` feature,
/// where pacing depends on a real-time clock syscall succeeding.
#[derive(Debug, thiserror::Error)]
pub enum PacingError {
    #[error("clock_gettime(CLOCK_MONOTONIC) failed: {0}")]
    RtSetup(String),
}

#[cfg(not(feature = "rt"))]
mod sim {
    use std::time::Duration;

    /// `std::thread::sleep`-based pacer used when the `rt` feature is off.
    pub struct SimPacer {
        period: Duration,
    }

    impl SimPacer {
        pub fn new(period_us: u32) -> Self {
            Self {
                period: Duration::from_micros(period_us as u64),
            }
        }

        pub fn wait_for_next_cycle(&mut self) {
            std::thread::sleep(self.period);
        }
    }
}

#[cfg(feature = "rt")]
mod rt {
    use nix::sys::time::TimeSpec;
    use nix::time::{clock_gettime, clock_nanosleep, ClockId, ClockNanosleepFlags};

    use super::PacingError;

    const CLOCK: ClockId = ClockId::CLOCK_MONOTONIC;

    /// `clock_nanosleep(TIMER_ABSTIME)`-based pacer used when the `rt`
    /// feature is enabled, giving drift-free wakeups instead of
    /// `sleep(period)` chains that accumulate jitter.
    pub struct RtPacer {
        period_ns: i64,
        next_wake: TimeSpec,
    }

    impl RtPacer {
        pub fn new(period_us: u32) -> Result<Self, PacingError> {
            let now = clock_gettime(CLOCK)
                .map_err(|e| PacingError::RtSetup(format!("clock_gettime: {e}")))?;
            Ok(Self {
                period_ns: period_us as i64 * 1_000,
                next_wake: now,
            })
        }

        pub fn wait_for_next_cycle(&mut self) {
            self.next_wake = add_ns(self.next_wake, self.period_ns);
            // A spurious early return from clock_nanosleep (EINTR) is safe
            // to ignore: the loop's next call will simply target an
            // already-past next_wake and return immediately, not stack up
            // cumulative drift, since next_wake is always computed from
            // the prior absolute wake time rather than `now`.
            let _ = clock_nanosleep(CLOCK, ClockNanosleepFlags::TIMER_ABSTIME, &self.next_wake);
        }
    }

    fn add_ns(ts: TimeSpec, ns: i64) -> TimeSpec {
        let mut secs = ts.tv_sec();
        let mut nanos = ts.tv_nsec() + ns;
        while nanos >= 1_000_000_000 {
            secs += 1;
            nanos -= 1_000_000_000;
        }
        while nanos < 0 {
            secs -= 1;
            nanos += 1_000_000_000;
        }
        TimeSpec::new(secs, nanos)
    }
}
