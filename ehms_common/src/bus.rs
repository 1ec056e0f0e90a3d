//! Bus driver capability traits (C2).
//!
//! The core never depends on a concrete bus driver, only on these two
//! capability traits, so drivers remain mockable and the real serial/
//! multiplex implementations stay external collaborators.

use thiserror::Error;

/// Failure reported by a bus driver on a read attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BusError {
    #[error("bus hardware fault")]
    Hardware,
    #[error("bus read timeout")]
    Timeout,
    #[error("bus parity error")]
    Parity,
    #[error("no data available")]
    NoData,
}

/// 2-bit status matrix accompanying a serial bus word.
pub type StatusMatrix = u8;

/// One labelled word read from a serial (ARINC 429-style) bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Word {
    pub label: u16,
    pub data: u32,
    pub status_matrix: StatusMatrix,
}

/// One sub-addressed message read from the multiplex (MIL-STD-1553-style)
/// bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Message {
    pub data: [u16; 32],
}

/// A serial labelled bus: `read(bus_id, label)`.
pub trait SerialBus {
    fn read(&mut self, bus_id: u8, label: u16) -> Result<Word, BusError>;
}

/// A multiplex bus: `read_subaddress(sub)`.
pub trait MultiplexBus {
    fn read_subaddress(&mut self, sub: u8) -> Result<Message, BusError>;
}
