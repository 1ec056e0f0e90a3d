//! Static parameter table (C3): one row per monitored parameter, mapping a
//! parameter id to its bus assignment, decode/scale rule, and engineering
//! limits.
//!
//! Rows 0-9 carry the primary named engine parameters (labels, scale,
//! offset) used by the flight-critical thresholds. Rows 10-15 round out
//! the remaining named parameters in the same style. Rows 16-47 fill out
//! the remainder of the parameter id space with generically named,
//! serial-bus sourced rows of no particular engineering significance, so
//! the table spans the full `P ≤ 48` range the data model allows.

use ehms_common::consts::MAX_PARAMETERS;

/// Named indices for the semantically meaningful parameters.
pub mod id {
    pub const N1: u8 = 0;
    pub const N2: u8 = 1;
    pub const EGT: u8 = 2;
    pub const FUEL_FLOW: u8 = 3;
    pub const OIL_TEMP: u8 = 4;
    pub const OIL_PRESS: u8 = 5;
    pub const OIL_QTY: u8 = 6;
    pub const VIB_FAN: u8 = 7;
    pub const VIB_CORE: u8 = 8;
    pub const EPR: u8 = 9;
    pub const ITT: u8 = 10;
    pub const THRUST: u8 = 11;
    pub const BLEED_PRESS: u8 = 12;
    pub const BLEED_TEMP: u8 = 13;
    pub const START_VALVE: u8 = 14;
    pub const FUEL_VALVE: u8 = 15;
}

/// Where a parameter is decoded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// A labelled word on a serial bus, with primary/backup bus ids.
    Serial { primary: u8, backup: u8, label: u16 },
    /// A word at a fixed offset within a multiplex sub-address message.
    Multiplex { subaddr: u8, offset: usize },
}

/// One row of the static parameter table.
#[derive(Debug, Clone, Copy)]
pub struct ParamConfig {
    pub param_id: u8,
    pub name: &'static str,
    pub source: Source,
    pub scale: f32,
    pub offset: f32,
    /// Engineering-unit validity range, populated by the (external)
    /// parameter database; `None` means no range check is performed.
    pub limits: Option<(f32, f32)>,
}

macro_rules! serial {
    ($id:expr, $name:expr, $primary:expr, $backup:expr, $label:expr, $scale:expr, $offset:expr, $limits:expr) => {
        ParamConfig {
            param_id: $id,
            name: $name,
            source: Source::Serial {
                primary: $primary,
                backup: $backup,
                label: $label,
            },
            scale: $scale,
            offset: $offset,
            limits: $limits,
        }
    };
}

macro_rules! mux {
    ($id:expr, $name:expr, $subaddr:expr, $offset_idx:expr, $scale:expr, $offset:expr, $limits:expr) => {
        ParamConfig {
            param_id: $id,
            name: $name,
            source: Source::Multiplex {
                subaddr: $subaddr,
                offset: $offset_idx,
            },
            scale: $scale,
            offset: $offset,
            limits: $limits,
        }
    };
}

/// The static parameter table, indexed by `param_id`.
pub static PARAMS: [ParamConfig; MAX_PARAMETERS] = [
    serial!(id::N1, "N1", 0, 1, 0o310, 0.1, 0.0, Some((0.0, 110.0))),
    serial!(id::N2, "N2", 0, 1, 0o311, 0.1, 0.0, Some((0.0, 110.0))),
    serial!(id::EGT, "EGT", 0, 1, 0o312, 1.0, 0.0, Some((0.0, 1200.0))),
    serial!(
        id::FUEL_FLOW,
        "FUEL_FLOW",
        0,
        1,
        0o313,
        0.1,
        0.0,
        Some((0.0, 20_000.0))
    ),
    serial!(
        id::OIL_TEMP,
        "OIL_TEMP",
        0,
        1,
        0o314,
        0.5,
        -40.0,
        Some((-40.0, 200.0))
    ),
    serial!(
        id::OIL_PRESS,
        "OIL_PRESS",
        0,
        1,
        0o315,
        0.1,
        0.0,
        Some((0.0, 150.0))
    ),
    serial!(
        id::OIL_QTY,
        "OIL_QTY",
        0,
        1,
        0o316,
        0.5,
        0.0,
        Some((0.0, 100.0))
    ),
    mux!(id::VIB_FAN, "VIB_FAN", 5, 0, 0.001, 0.0, Some((0.0, 10.0))),
    mux!(id::VIB_CORE, "VIB_CORE", 5, 1, 0.001, 0.0, Some((0.0, 10.0))),
    serial!(id::EPR, "EPR", 0, 1, 0o321, 0.001, 0.0, Some((0.5, 2.0))),
    serial!(
        id::ITT,
        "ITT",
        2,
        3,
        0o322,
        1.0,
        0.0,
        Some((0.0, 1000.0))
    ),
    serial!(
        id::THRUST,
        "THRUST",
        2,
        3,
        0o323,
        10.0,
        0.0,
        Some((0.0, 100_000.0))
    ),
    serial!(
        id::BLEED_PRESS,
        "BLEED_PRESS",
        2,
        3,
        0o324,
        0.1,
        0.0,
        Some((0.0, 60.0))
    ),
    serial!(
        id::BLEED_TEMP,
        "BLEED_TEMP",
        2,
        3,
        0o325,
        1.0,
        -40.0,
        Some((-40.0, 300.0))
    ),
    serial!(
        id::START_VALVE,
        "START_VALVE",
        2,
        3,
        0o326,
        1.0,
        0.0,
        Some((0.0, 1.0))
    ),
    serial!(
        id::FUEL_VALVE,
        "FUEL_VALVE",
        2,
        3,
        0o327,
        1.0,
        0.0,
        Some((0.0, 1.0))
    ),
    serial!(16, "RESERVED_16", 0, 1, 0o330, 1.0, 0.0, None),
    serial!(17, "RESERVED_17", 0, 1, 0o331, 1.0, 0.0, None),
    serial!(18, "RESERVED_18", 0, 1, 0o332, 1.0, 0.0, None),
    serial!(19, "RESERVED_19", 0, 1, 0o333, 1.0, 0.0, None),
    serial!(20, "RESERVED_20", 2, 3, 0o334, 1.0, 0.0, None),
    serial!(21, "RESERVED_21", 2, 3, 0o335, 1.0, 0.0, None),
    serial!(22, "RESERVED_22", 2, 3, 0o336, 1.0, 0.0, None),
    serial!(23, "RESERVED_23", 2, 3, 0o337, 1.0, 0.0, None),
    serial!(24, "RESERVED_24", 0, 1, 0o340, 1.0, 0.0, None),
    serial!(25, "RESERVED_25", 0, 1, 0o341, 1.0, 0.0, None),
    serial!(26, "RESERVED_26", 0, 1, 0o342, 1.0, 0.0, None),
    serial!(27, "RESERVED_27", 0, 1, 0o343, 1.0, 0.0, None),
    serial!(28, "RESERVED_28", 2, 3, 0o344, 1.0, 0.0, None),
    serial!(29, "RESERVED_29", 2, 3, 0o345, 1.0, 0.0, None),
    serial!(30, "RESERVED_30", 2, 3, 0o346, 1.0, 0.0, None),
    serial!(31, "RESERVED_31", 2, 3, 0o347, 1.0, 0.0, None),
    serial!(32, "RESERVED_32", 0, 1, 0o350, 1.0, 0.0, None),
    serial!(33, "RESERVED_33", 0, 1, 0o351, 1.0, 0.0, None),
    serial!(34, "RESERVED_34", 0, 1, 0o352, 1.0, 0.0, None),
    serial!(35, "RESERVED_35", 0, 1, 0o353, 1.0, 0.0, None),
    serial!(36, "RESERVED_36", 2, 3, 0o354, 1.0, 0.0, None),
    serial!(37, "RESERVED_37", 2, 3, 0o355, 1.0, 0.0, None),
    serial!(38, "RESERVED_38", 2, 3, 0o356, 1.0, 0.0, None),
    serial!(39, "RESERVED_39", 2, 3, 0o357, 1.0, 0.0, None),
    serial!(40, "RESERVED_40", 0, 1, 0o360, 1.0, 0.0, None),
    serial!(41, "RESERVED_41", 0, 1, 0o361, 1.0, 0.0, None),
    serial!(42, "RESERVED_42", 0, 1, 0o362, 1.0, 0.0, None),
    serial!(43, "RESERVED_43", 0, 1, 0o363, 1.0, 0.0, None),
    serial!(44, "RESERVED_44", 2, 3, 0o364, 1.0, 0.0, None),
    serial!(45, "RESERVED_45", 2, 3, 0o365, 1.0, 0.0, None),
    serial!(46, "RESERVED_46", 2, 3, 0o366, 1.0, 0.0, None),
    serial!(47, "RESERVED_47", 2, 3, 0o367, 1.0, 0.0, None),
];

/// Apply a row's scale/offset to a decoded raw value.
pub fn to_engineering(raw: i32, row: &ParamConfig) -> f32 {
    raw as f32 * row.scale + row.offset
}
