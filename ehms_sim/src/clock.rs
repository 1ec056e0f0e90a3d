//! Wall-clock `Clock` implementation for the simulation binary. The core
//! crate itself never touches `std::time`; everything it needs comes
//! through the injected `Clock` trait.

use std::time::Instant;

use ehms_common::time::{Clock, Timestamp};

pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        SystemClock {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u32 {
        self.start.elapsed().as_millis() as u32
    }

    fn now_ts(&self) -> Timestamp {
        let ms = self.now_ms();
        Timestamp {
            year: 26,
            month: 1,
            day: 1,
            hour: ((ms / 3_600_000) % 24) as u8,
            minute: ((ms / 60_000) % 60) as u8,
            second: ((ms / 1000) % 60) as u8,
            millisecond: (ms % 1000) as u16,
        }
    }

    fn timestamp_to_ms(&self, ts: Timestamp) -> u32 {
        ts.hour as u32 * 3_600_000
            + ts.minute as u32 * 60_000
            + ts.second as u32 * 1000
            + ts.millisecond as u32
    }
}
