//! Publication Ports (C8): outbound, one-way capability traits the Alert
//! Engine publishes through. Both contracts must be non-blocking and
//! failure-tolerant from the core's perspective — a port failure is
//! counted and surfaced as observability, never propagated as a tick
//! failure. The core defines these traits but never provides a production
//! implementation of them; `ehms_sim` supplies `tracing`-backed demo
//! sinks, the crew-display, flight-recorder, and error-reporter hardware
//! remain external collaborators (spec.md §1/§6).

use ehms_common::error::EhmsError;
use ehms_common::model::Alert;

/// A publication attempt failed. Carries no detail beyond "didn't land" —
/// callers count failures rather than branch on why.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortError;

/// Crew-facing alert display: `post(alert) -> Result`.
pub trait DisplaySink {
    fn post(&mut self, alert: &Alert) -> Result<(), PortError>;
}

/// Flight-recorder alert log: `log_alert(alert) -> Result`.
pub trait RecorderSink {
    fn log_alert(&mut self, alert: &Alert) -> Result<(), PortError>;
}

/// Severity accompanying an error-reporter event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportSeverity {
    Info,
    Warning,
    Error,
}

/// External fault/event reporter: `report(module, severity, code, arg)`.
pub trait ErrorReporter {
    fn report(&mut self, module: &'static str, severity: ReportSeverity, code: EhmsError, arg: u32);
}

/// No-op implementations of all three ports, for callers (benches, unit
/// tests exercising the acquisition/alert layers alone) that have no
/// sinks wired and don't want to define their own stand-ins.
pub struct NullPorts;

impl DisplaySink for NullPorts {
    fn post(&mut self, _alert: &Alert) -> Result<(), PortError> {
        Ok(())
    }
}

impl RecorderSink for NullPorts {
    fn log_alert(&mut self, _alert: &Alert) -> Result<(), PortError> {
        Ok(())
    }
}

impl ErrorReporter for NullPorts {
    fn report(&mut self, _module: &'static str, _severity: ReportSeverity, _code: EhmsError, _arg: u32) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use ehms_common::model::AlertLevel;
    use ehms_common::time::Timestamp;

    fn sample_alert() -> Alert {
        Alert {
            alert_id: 1,
            level: AlertLevel::Caution,
            engine_id: 0,
            param_id: 0,
            onset_time: Timestamp::EPOCH,
            clear_time: None,
            active: true,
            latched: false,
            inhibited: false,
            message: heapless::String::new(),
            display_code: 0,
        }
    }

    #[test]
    fn null_ports_never_fail() {
        let mut ports = NullPorts;
        assert!(ports.post(&sample_alert()).is_ok());
        assert!(ports.log_alert(&sample_alert()).is_ok());
        ports.report("test", ReportSeverity::Info, EhmsError::QueueFull, 0);
    }
}
