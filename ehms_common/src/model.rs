//! The shared data model: parameters, snapshots, source health, and
//! alerts, plus the per-engine `HealthStatus` grading and overall
//! `SystemState` lifecycle.

use crate::consts::MAX_PARAMETERS;
use crate::time::Timestamp;
use static_assertions::const_assert_eq;

/// Dense engine identifier in `[0, MAX_ENGINES)`.
pub type EngineId = u8;

/// Dense parameter identifier in `[0, MAX_PARAMETERS)`.
pub type ParamId = u8;

/// Validity classification of one parameter sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum ParamStatus {
    Valid = 0,
    Stale = 1,
    Failed = 2,
    NoComputedData = 3,
    Test = 4,
}

impl ParamStatus {
    pub fn is_valid(self) -> bool {
        matches!(self, ParamStatus::Valid)
    }
}

/// Which serial bus most recently supplied a parameter's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceBus {
    Serial(u8),
    Multiplex,
}

/// Current phase of flight, carried in the snapshot for downstream
/// consumers; the core itself does not branch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum FlightPhase {
    Ground = 0,
    Taxi = 1,
    Takeoff = 2,
    Climb = 3,
    Cruise = 4,
    Descent = 5,
    Approach = 6,
    Landing = 7,
}

/// Per-engine health grading, derived from the highest active alert level
/// for that engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum HealthStatus {
    Normal = 0,
    Monitor = 1,
    Caution = 2,
    ActionRequired = 3,
    Critical = 4,
}

/// Overall core lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemState {
    Off,
    Init,
    Pbit,
    Normal,
    Degraded,
    Maintenance,
    Fault,
}

/// One decoded, scaled parameter sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSample {
    pub param_id: ParamId,
    pub status: ParamStatus,
    pub raw_value: i32,
    pub eng_value: f32,
    pub timestamp: Timestamp,
    pub source_bus: SourceBus,
}

impl ParamSample {
    pub const fn empty(param_id: ParamId) -> Self {
        ParamSample {
            param_id,
            status: ParamStatus::NoComputedData,
            raw_value: 0,
            eng_value: 0.0,
            timestamp: Timestamp::EPOCH,
            source_bus: SourceBus::Serial(0),
        }
    }
}

/// On-the-wire packed representation of one parameter record: `{param_id,
/// status, raw_value, eng_value, timestamp, source_bus}`.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ParamRecord {
    pub param_id: u8,
    pub status: u8,
    _pad0: [u8; 2],
    pub raw_value: i32,
    pub eng_value: f32,
    pub timestamp: Timestamp,
    pub source_bus: u8,
    _pad1: [u8; 3],
}

const_assert_eq!(core::mem::size_of::<ParamRecord>(), 24);

impl From<ParamSample> for ParamRecord {
    fn from(s: ParamSample) -> Self {
        let source_bus = match s.source_bus {
            SourceBus::Serial(id) => id,
            SourceBus::Multiplex => 0xFF,
        };
        ParamRecord {
            param_id: s.param_id,
            status: s.status as u8,
            _pad0: [0; 2],
            raw_value: s.raw_value,
            eng_value: s.eng_value,
            timestamp: s.timestamp,
            source_bus,
            _pad1: [0; 3],
        }
    }
}

/// Packed per-engine snapshot: engine id, flight phase, `P` parameter
/// records, health status, trailing little-endian CRC-32.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct PackedSnapshot {
    pub engine_id: u8,
    _pad0: [u8; 3],
    pub flight_phase: u32,
    pub parameters: [ParamRecord; MAX_PARAMETERS],
    pub health_status: u8,
    _pad1: [u8; 3],
    pub crc32: u32,
}

const_assert_eq!(
    core::mem::size_of::<PackedSnapshot>(),
    4 + 4 + MAX_PARAMETERS * 24 + 4 + 4
);

impl PackedSnapshot {
    /// Byte slice covering the payload up to but not including the
    /// trailing `crc32` field.
    pub fn payload_bytes(&self) -> &[u8] {
        let whole = unsafe {
            core::slice::from_raw_parts(
                self as *const Self as *const u8,
                core::mem::size_of::<Self>(),
            )
        };
        let crc_len = core::mem::size_of::<u32>();
        &whole[..whole.len() - crc_len]
    }
}

/// Full per-engine snapshot. `parameters` is a fixed-size array
/// sized to `MAX_PARAMETERS`; only the first `P` entries used by the
/// configured parameter table are meaningful.
#[derive(Debug, Clone, Copy)]
pub struct EngineSnapshot {
    pub engine_id: EngineId,
    pub sample_time: Timestamp,
    pub flight_phase: FlightPhase,
    pub parameters: [ParamSample; MAX_PARAMETERS],
    pub health_status: HealthStatus,
    pub crc32: u32,
}

impl EngineSnapshot {
    pub fn empty(engine_id: EngineId) -> Self {
        let mut parameters = [ParamSample::empty(0); MAX_PARAMETERS];
        for (i, p) in parameters.iter_mut().enumerate() {
            p.param_id = i as ParamId;
        }
        EngineSnapshot {
            engine_id,
            sample_time: Timestamp::EPOCH,
            flight_phase: FlightPhase::Ground,
            parameters,
            health_status: HealthStatus::Normal,
            crc32: 0,
        }
    }

    fn to_packed(&self) -> PackedSnapshot {
        let mut parameters = [ParamRecord::from(ParamSample::empty(0)); MAX_PARAMETERS];
        for (dst, src) in parameters.iter_mut().zip(self.parameters.iter()) {
            *dst = ParamRecord::from(*src);
        }
        PackedSnapshot {
            engine_id: self.engine_id,
            _pad0: [0; 3],
            flight_phase: self.flight_phase as u32,
            parameters,
            health_status: self.health_status as u8,
            _pad1: [0; 3],
            crc32: 0,
        }
    }

    /// Recompute the CRC-32 over the packed payload.
    pub fn compute_crc32(&self) -> u32 {
        crate::crc::crc32(self.to_packed().payload_bytes())
    }

    /// Stamp `crc32` with the freshly computed value.
    pub fn stamp_crc32(&mut self) {
        self.crc32 = self.compute_crc32();
    }

    /// Reader-side integrity check.
    pub fn verify_crc32(&self) -> bool {
        self.crc32 == self.compute_crc32()
    }
}

/// Per-bus health counters (C4 "Source info").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceInfo {
    pub active: bool,
    pub primary: bool,
    pub bus_id: u8,
    pub last_update_ms: u32,
    pub total_samples: u32,
    pub error_samples: u32,
    pub consecutive_failures: u32,
}

impl SourceInfo {
    pub const fn new(bus_id: u8, primary: bool) -> Self {
        SourceInfo {
            active: true,
            primary,
            bus_id,
            last_update_ms: 0,
            total_samples: 0,
            error_samples: 0,
            consecutive_failures: 0,
        }
    }
}

/// Alert severity. Only `Caution` and `Warning` have defined thresholds;
/// `Warning` is strictly more severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum AlertLevel {
    Caution = 0,
    Warning = 1,
}

impl AlertLevel {
    /// True iff this level's alerts latch once raised.
    pub fn latches(self) -> bool {
        self >= AlertLevel::Warning
    }
}

/// Direction of threshold exceedance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    High,
    Low,
}

/// One row of the static threshold table.
#[derive(Debug, Clone, Copy)]
pub struct ThresholdRow {
    pub param_id: ParamId,
    pub level: AlertLevel,
    pub threshold: f32,
    pub direction: Direction,
    pub display_code: u16,
    /// Message template; `{eng}` is substituted with the 1-based engine
    /// number by `ThresholdRow::format_message`.
    pub message_template: &'static str,
}

impl ThresholdRow {
    /// True iff `eng_value` exceeds this row's threshold in its configured
    /// direction.
    pub fn exceeded(&self, eng_value: f32) -> bool {
        match self.direction {
            Direction::High => eng_value >= self.threshold,
            Direction::Low => eng_value <= self.threshold,
        }
    }

    /// The hysteresis-adjusted recession bound: a non-latched alert clears
    /// once the value has receded beyond the threshold by `hysteresis_pct`.
    pub fn recession_bound(&self, hysteresis_pct: f32) -> f32 {
        match self.direction {
            Direction::High => self.threshold * (1.0 - hysteresis_pct),
            Direction::Low => self.threshold * (1.0 + hysteresis_pct),
        }
    }

    /// True iff `eng_value` has receded past the hysteresis bound.
    pub fn receded(&self, eng_value: f32, hysteresis_pct: f32) -> bool {
        let bound = self.recession_bound(hysteresis_pct);
        match self.direction {
            Direction::High => eng_value < bound,
            Direction::Low => eng_value > bound,
        }
    }

    /// Render the display message, substituting the 1-based engine number
    /// for `{eng}`.
    pub fn format_message(&self, engine_id: EngineId) -> heapless::String<64> {
        let mut out = heapless::String::new();
        let mut rest = self.message_template;
        while let Some(idx) = rest.find("{eng}") {
            let _ = out.push_str(&rest[..idx]);
            let mut num = heapless::String::<4>::new();
            let _ = core::fmt::write(&mut num, format_args!("{}", engine_id + 1));
            let _ = out.push_str(&num);
            rest = &rest[idx + "{eng}".len()..];
        }
        let _ = out.push_str(rest);
        out
    }
}

/// A raised or cleared alert.
#[derive(Debug, Clone, Copy)]
pub struct Alert {
    pub alert_id: u32,
    pub level: AlertLevel,
    pub engine_id: EngineId,
    pub param_id: ParamId,
    pub onset_time: Timestamp,
    pub clear_time: Option<Timestamp>,
    pub active: bool,
    pub latched: bool,
    pub inhibited: bool,
    pub message: heapless::String<64>,
    pub display_code: u16,
}
