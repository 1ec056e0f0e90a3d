//! Demo publication sinks standing in for the crew display, maintenance
//! recorder, and external fault reporter. These log through `tracing`
//! rather than talking to any real bus, and satisfy the Publication Port
//! traits `ehms_core` defines but does not implement.

use ehms_common::error::EhmsError;
use ehms_common::model::{Alert, EngineId, HealthStatus};
use ehms_core::acquisition::Statistics;
use ehms_core::ports::{self, PortError, ReportSeverity};

/// Stands in for the crew alerting display.
pub struct DisplaySink;

impl DisplaySink {
    pub fn publish_health(&self, engine_id: EngineId, health: HealthStatus) {
        tracing::info!(engine_id, ?health, "engine health status");
    }
}

impl ports::DisplaySink for DisplaySink {
    fn post(&mut self, alert: &Alert) -> Result<(), PortError> {
        tracing::info!(
            alert_id = alert.alert_id,
            engine_id = alert.engine_id,
            display_code = alert.display_code,
            message = alert.message.as_str(),
            "alert published to crew display"
        );
        Ok(())
    }
}

/// Stands in for the maintenance data recorder.
pub struct RecorderSink;

impl RecorderSink {
    pub fn record_statistics(&self, stats: &Statistics) {
        tracing::debug!(
            cycle_count = stats.cycle_count,
            current_time_ms = stats.current_time_ms,
            bus_count = stats.per_bus.len(),
            "recorded cycle statistics"
        );
    }
}

impl ports::RecorderSink for RecorderSink {
    fn log_alert(&mut self, alert: &Alert) -> Result<(), PortError> {
        tracing::debug!(
            alert_id = alert.alert_id,
            engine_id = alert.engine_id,
            param_id = alert.param_id,
            "alert logged to flight recorder"
        );
        Ok(())
    }
}

/// Stands in for the external fault/event reporter.
pub struct FaultReporterSink;

impl ports::ErrorReporter for FaultReporterSink {
    fn report(&mut self, module: &'static str, severity: ReportSeverity, code: EhmsError, arg: u32) {
        tracing::warn!(module, ?severity, error = ?code, arg, "fault reported");
    }
}
