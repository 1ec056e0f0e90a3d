//! Source Health Tracker (C4): per-bus read counters, consecutive-failure
//! counting, and deactivation.

use ehms_common::consts::{MAX_CONSECUTIVE_FAILURES, SERIAL_BUS_COUNT};
use ehms_common::model::SourceInfo;

/// Identifies which tracked bus a read attempt targeted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusId {
    Serial(u8),
    Multiplex,
}

/// Owns the per-bus [`SourceInfo`] counters for all serial buses and the
/// multiplex bus.
#[derive(Debug, Clone)]
pub struct SourceHealthTracker {
    serial: [SourceInfo; SERIAL_BUS_COUNT],
    multiplex: SourceInfo,
}

impl SourceHealthTracker {
    pub fn new() -> Self {
        let mut serial = [SourceInfo::new(0, true); SERIAL_BUS_COUNT];
        for (i, s) in serial.iter_mut().enumerate() {
            *s = SourceInfo::new(i as u8, i % 2 == 0);
        }
        SourceHealthTracker {
            serial,
            multiplex: SourceInfo::new(ehms_common::consts::MUX_RT_ADDRESS, true),
        }
    }

    pub fn info(&self, bus: BusId) -> &SourceInfo {
        match bus {
            BusId::Serial(id) => &self.serial[id as usize],
            BusId::Multiplex => &self.multiplex,
        }
    }

    /// Record one read attempt against `bus`.
    pub fn record(&mut self, bus: BusId, now_ms: u32, ok: bool) {
        let info = match bus {
            BusId::Serial(id) => &mut self.serial[id as usize],
            BusId::Multiplex => &mut self.multiplex,
        };
        info.total_samples += 1;
        if ok {
            info.last_update_ms = now_ms;
            info.consecutive_failures = 0;
        } else {
            info.error_samples += 1;
            info.consecutive_failures += 1;
            if info.consecutive_failures >= MAX_CONSECUTIVE_FAILURES && info.active {
                info.active = false;
                tracing::warn!(?bus, "source deactivated after consecutive failures");
            }
        }
    }

    pub fn serial_buses(&self) -> &[SourceInfo] {
        &self.serial
    }

    pub fn multiplex_bus(&self) -> &SourceInfo {
        &self.multiplex
    }
}

impl Default for SourceHealthTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deactivates_after_five_consecutive_failures() {
        let mut t = SourceHealthTracker::new();
        for ms in 0..4 {
            t.record(BusId::Serial(0), ms, false);
            assert!(t.info(BusId::Serial(0)).active);
        }
        t.record(BusId::Serial(0), 4, false);
        assert!(!t.info(BusId::Serial(0)).active);
        assert_eq!(t.info(BusId::Serial(0)).consecutive_failures, 5);
    }

    #[test]
    fn success_resets_consecutive_failures_but_not_reactivate() {
        let mut t = SourceHealthTracker::new();
        for ms in 0..5 {
            t.record(BusId::Serial(1), ms, false);
        }
        assert!(!t.info(BusId::Serial(1)).active);
        t.record(BusId::Serial(1), 5, true);
        assert_eq!(t.info(BusId::Serial(1)).consecutive_failures, 0);
        assert!(!t.info(BusId::Serial(1)).active, "no auto-reactivation once deactivated");
    }

    #[test]
    fn total_and_last_update_track_every_call() {
        let mut t = SourceHealthTracker::new();
        t.record(BusId::Serial(2), 10, true);
        t.record(BusId::Serial(2), 20, false);
        let info = t.info(BusId::Serial(2));
        assert_eq!(info.total_samples, 2);
        assert_eq!(info.error_samples, 1);
        assert_eq!(info.last_update_ms, 10);
    }
}
