//! Demo bus drivers: deterministic, scenario-driven stand-ins for the real
//! ARINC 429 / MIL-STD-1553B hardware, used by the `ehms_sim` binary in
//! place of the actual flight buses.

use ehms_common::bus::{BusError, Message, MultiplexBus, SerialBus, Word};

/// A canned demo scenario, selectable from the CLI (`--scenario`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    /// All parameters nominal.
    Nominal,
    /// EGT on the given engine ramps past the Caution threshold and holds.
    EgtCaution { engine_id: u8 },
    /// Oil pressure on the given engine drops past the Warning threshold.
    OilPressWarning { engine_id: u8 },
    /// The primary bus for the given engine's parameters goes silent
    /// starting at the given tick.
    BusDropout { bus_id: u8, from_tick: u32 },
}

impl std::str::FromStr for Scenario {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "nominal" => Ok(Scenario::Nominal),
            "egt-caution" => Ok(Scenario::EgtCaution { engine_id: 0 }),
            "oil-press-warning" => Ok(Scenario::OilPressWarning { engine_id: 0 }),
            "bus-dropout" => Ok(Scenario::BusDropout {
                bus_id: 0,
                from_tick: 10,
            }),
            other => Err(format!("unknown scenario '{other}'")),
        }
    }
}

/// Nominal raw reading for a serial-bus label, before any scenario
/// override. Chosen so every parameter's engineering value lands mid-range.
fn nominal_raw(label: u16) -> i32 {
    match label {
        0o310 => 850, // N1 -> 85.0 %
        0o311 => 880, // N2 -> 88.0 %
        0o312 => 700, // EGT -> 700.0 C
        0o313 => 25_000, // FUEL_FLOW -> 2500.0 pph
        0o314 => 200, // OIL_TEMP -> 60.0 C
        0o315 => 400, // OIL_PRESS -> 40.0 PSI
        0o316 => 160, // OIL_QTY -> 80.0 qt
        0o321 => 1_200, // EPR -> 1.2
        _ => 0,
    }
}

/// Simulated serial (ARINC 429-style) bus. One instance is shared across
/// all four logical buses; `read()` is told which bus id to answer as.
pub struct SimSerialBus {
    scenario: Scenario,
    tick: u32,
}

impl SimSerialBus {
    pub fn new(scenario: Scenario) -> Self {
        SimSerialBus { scenario, tick: 0 }
    }

    pub fn advance(&mut self) {
        self.tick += 1;
    }
}

impl SerialBus for SimSerialBus {
    fn read(&mut self, bus_id: u8, label: u16) -> Result<Word, BusError> {
        if let Scenario::BusDropout {
            bus_id: dead_bus,
            from_tick,
        } = self.scenario
        {
            if bus_id == dead_bus && self.tick >= from_tick {
                return Err(BusError::Timeout);
            }
        }

        let mut data = nominal_raw(label);
        match self.scenario {
            Scenario::EgtCaution { .. } if label == 0o312 => {
                data = 960; // 960.0 C, above the 950.0 Caution threshold
            }
            Scenario::OilPressWarning { .. } if label == 0o315 => {
                data = 120; // 12.0 PSI, below the 15.0 Warning threshold
            }
            _ => {}
        }

        Ok(Word {
            label,
            data: data as u32,
            status_matrix: 0,
        })
    }
}

/// Simulated multiplex (MIL-STD-1553B-style) bus. Only sub-address 5
/// (vibration) is meaningfully populated; all others answer with zeros.
pub struct SimMultiplexBus {
    scenario: Scenario,
    tick: u32,
}

impl SimMultiplexBus {
    pub fn new(scenario: Scenario) -> Self {
        SimMultiplexBus { scenario, tick: 0 }
    }

    pub fn advance(&mut self) {
        self.tick += 1;
    }
}

impl MultiplexBus for SimMultiplexBus {
    fn read_subaddress(&mut self, sub: u8) -> Result<Message, BusError> {
        if let Scenario::BusDropout {
            bus_id: 0xFF,
            from_tick,
        } = self.scenario
        {
            if self.tick >= from_tick {
                return Err(BusError::Timeout);
            }
        }

        let mut data = [0u16; 32];
        if sub == ehms_common::consts::MUX_VIBRATION_SUBADDR {
            data[0] = 2; // VIB_FAN -> 0.002 in
            data[1] = 3; // VIB_CORE -> 0.003 in
        }
        Ok(Message { data })
    }
}
