//! EHMS Common Library
//!
//! Shared data model, constants, error taxonomy, and the CRC-32 integrity
//! primitive used by both the acquisition pipeline and the alert engine.
//!
//! # Module Structure
//!
//! - [`consts`] - fixed system limits and timing constants
//! - [`error`] - the `EhmsError` taxonomy
//! - [`time`] - monotonic clock and timestamp types
//! - [`crc`] - CRC-32 snapshot integrity check
//! - [`bus`] - bus driver capability traits
//! - [`model`] - the data model: parameters, snapshots, alerts

pub mod bus;
pub mod consts;
pub mod crc;
pub mod error;
pub mod model;
pub mod time;

pub mod prelude {
    pub use crate::bus::{BusError, Message, MultiplexBus, SerialBus, Word};
    pub use crate::consts::*;
    pub use crate::crc::crc32;
    pub use crate::error::EhmsError;
    pub use crate::model::*;
    pub use crate::time::{Clock, Timestamp};
}
