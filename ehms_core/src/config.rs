//! Runtime configuration: bus wiring and tunables loaded from TOML, via a
//! `LoadedConfig` / `load_config` pattern.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::alerts::AlertEngineConfig;
use ehms_common::consts::{
    DEBOUNCE_TICKS_DEFAULT, HYSTERESIS_PCT_DEFAULT, HYSTERESIS_TICKS_DEFAULT, MAX_ENGINES,
    SERIAL_BUS_COUNT,
};

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(String),
    #[error("engine_count must be in 1..={max}, got {got}")]
    EngineCount { got: u8, max: u8 },
    #[error("sample_rate_hz must be in 1..=100, got {0}")]
    SampleRate(u32),
    #[error("serial_buses must have exactly {expected} entries, got {got}")]
    SerialBusCount { expected: usize, got: usize },
    #[error("hysteresis_pct must be in (0.0, 1.0), got {0}")]
    HysteresisPct(f32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BusSpeed {
    Low,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parity {
    Odd,
    Even,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SerialBusConfig {
    pub speed: BusSpeed,
    pub parity: Parity,
}

impl Default for SerialBusConfig {
    fn default() -> Self {
        SerialBusConfig {
            speed: BusSpeed::High,
            parity: Parity::Odd,
        }
    }
}

/// Top-level EHMS configuration, loaded from TOML at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EhmsConfig {
    pub engine_count: u8,
    pub sample_rate_hz: u32,
    pub serial_buses: heapless::Vec<SerialBusConfig, SERIAL_BUS_COUNT>,
    pub debounce_ticks: u8,
    pub hysteresis_pct: f32,
    pub hysteresis_ticks: u8,
}

impl Default for EhmsConfig {
    fn default() -> Self {
        let mut serial_buses = heapless::Vec::new();
        for i in 0..SERIAL_BUS_COUNT {
            let _ = serial_buses.push(SerialBusConfig {
                speed: BusSpeed::High,
                parity: if i % 2 == 0 { Parity::Odd } else { Parity::Even },
            });
        }
        EhmsConfig {
            engine_count: MAX_ENGINES as u8,
            sample_rate_hz: 100,
            serial_buses,
            debounce_ticks: DEBOUNCE_TICKS_DEFAULT,
            hysteresis_pct: HYSTERESIS_PCT_DEFAULT,
            hysteresis_ticks: HYSTERESIS_TICKS_DEFAULT,
        }
    }
}

impl EhmsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.engine_count < 1 || self.engine_count as usize > MAX_ENGINES {
            return Err(ConfigError::EngineCount {
                got: self.engine_count,
                max: MAX_ENGINES as u8,
            });
        }
        if self.sample_rate_hz < 1 || self.sample_rate_hz > 100 {
            return Err(ConfigError::SampleRate(self.sample_rate_hz));
        }
        if self.serial_buses.len() != SERIAL_BUS_COUNT {
            return Err(ConfigError::SerialBusCount {
                expected: SERIAL_BUS_COUNT,
                got: self.serial_buses.len(),
            });
        }
        if !(self.hysteresis_pct > 0.0 && self.hysteresis_pct < 1.0) {
            return Err(ConfigError::HysteresisPct(self.hysteresis_pct));
        }
        Ok(())
    }

    pub fn alert_engine_config(&self) -> AlertEngineConfig {
        AlertEngineConfig {
            debounce_ticks: self.debounce_ticks,
            hysteresis_pct: self.hysteresis_pct,
            hysteresis_ticks: self.hysteresis_ticks,
        }
    }
}

/// Parse and validate configuration from a TOML string.
pub fn load_config_from_str(contents: &str) -> Result<EhmsConfig, ConfigError> {
    let config: EhmsConfig =
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
    config.validate()?;
    Ok(config)
}

/// Load and validate configuration from a TOML file on disk.
pub fn load_config(path: &std::path::Path) -> Result<EhmsConfig, ConfigError> {
    let contents =
        std::fs::read_to_string(path).map_err(|e| ConfigError::Parse(e.to_string()))?;
    load_config_from_str(&contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert!(EhmsConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_engine_count_above_max() {
        let mut config = EhmsConfig::default();
        config.engine_count = 5;
        assert_eq!(
            config.validate(),
            Err(ConfigError::EngineCount { got: 5, max: 4 })
        );
    }

    #[test]
    fn rejects_sample_rate_above_100hz() {
        let mut config = EhmsConfig::default();
        config.sample_rate_hz = 200;
        assert_eq!(config.validate(), Err(ConfigError::SampleRate(200)));
    }

    #[test]
    fn rejects_wrong_serial_bus_count() {
        let mut config = EhmsConfig::default();
        config.serial_buses.pop();
        assert_eq!(
            config.validate(),
            Err(ConfigError::SerialBusCount {
                expected: 4,
                got: 3
            })
        );
    }

    #[test]
    fn round_trips_through_toml() {
        let toml_str = r#"
            engine_count = 2
            sample_rate_hz = 100
            debounce_ticks = 3
            hysteresis_pct = 0.02
            hysteresis_ticks = 3

            [[serial_buses]]
            speed = "high"
            parity = "odd"

            [[serial_buses]]
            speed = "high"
            parity = "even"

            [[serial_buses]]
            speed = "low"
            parity = "odd"

            [[serial_buses]]
            speed = "low"
            parity = "even"
        "#;
        let config = load_config_from_str(toml_str).unwrap();
        assert_eq!(config.engine_count, 2);
        assert_eq!(config.serial_buses.len(), 4);
    }
}
