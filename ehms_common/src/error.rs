use thiserror::Error;

/// The complete error taxonomy surfaced by the acquisition pipeline and
/// alert engine. Every fallible core operation returns `Result<T, EhmsError>`
/// instead of panicking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EhmsError {
    /// Caller passed an invalid handle or identifier.
    #[error("invalid argument")]
    BadArg,

    /// An id or configuration value fell outside its permitted range.
    #[error("value out of range")]
    OutOfRange,

    /// Operation attempted before `init()` completed.
    #[error("core not initialized")]
    NotInitialized,

    /// Bus driver reported a hardware fault.
    #[error("bus hardware fault")]
    BusHardware,

    /// Bus driver timed out waiting for data.
    #[error("bus read timeout")]
    BusTimeout,

    /// Bus driver reported a parity error.
    #[error("bus parity error")]
    BusParity,

    /// A snapshot's stored CRC did not match its recomputed CRC.
    #[error("snapshot CRC mismatch")]
    CrcMismatch,

    /// The active-alert set is at capacity.
    #[error("alert queue full")]
    QueueFull,

    /// Caller re-entered an operation while its single-writer state was
    /// already borrowed this tick.
    #[error("core busy")]
    Busy,

    /// An unrecoverable invariant violation. The core transitions to
    /// `SystemState::Fault` and refuses subsequent `tick()` calls.
    #[error("fatal invariant violation: {0}")]
    Fatal(&'static str),
}

impl EhmsError {
    /// True for bus-level errors that drive primary-to-backup fallback but
    /// are never propagated as a tick failure.
    pub fn is_bus_error(self) -> bool {
        matches!(
            self,
            EhmsError::BusHardware | EhmsError::BusTimeout | EhmsError::BusParity
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bus_errors_are_classified() {
        assert!(EhmsError::BusHardware.is_bus_error());
        assert!(EhmsError::BusTimeout.is_bus_error());
        assert!(EhmsError::BusParity.is_bus_error());
        assert!(!EhmsError::CrcMismatch.is_bus_error());
        assert!(!EhmsError::Fatal("table corrupt").is_bus_error());
    }

    #[test]
    fn display_is_stable() {
        assert_eq!(EhmsError::QueueFull.to_string(), "alert queue full");
    }
}
