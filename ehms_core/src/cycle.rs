//! Top-level aggregate wiring the Acquisition Pipeline (C6) and Alert
//! Engine (C7) into one cyclic-executive step, and tracking the overall
//! `SystemState` lifecycle.

use ehms_common::bus::{MultiplexBus, SerialBus};
use ehms_common::error::EhmsError;
use ehms_common::model::{Alert, AlertLevel, EngineId, EngineSnapshot, FlightPhase, HealthStatus, SystemState};
use ehms_common::time::Clock;

use crate::acquisition::{AcquisitionPipeline, Statistics};
use crate::alerts::AlertEngine;
use crate::config::EhmsConfig;
use crate::ports::{DisplaySink, ErrorReporter, RecorderSink, ReportSeverity};

/// Owns the acquisition pipeline, the alert engine, and the system's
/// lifecycle state. One instance per running core.
pub struct EhmsCore {
    state: SystemState,
    acquisition: AcquisitionPipeline,
    alert_engine: AlertEngine,
}

impl EhmsCore {
    /// Build a core from validated configuration.
    pub fn new(config: &EhmsConfig) -> Result<Self, EhmsError> {
        config
            .validate()
            .map_err(|_| EhmsError::BadArg)?;
        let acquisition = AcquisitionPipeline::new(config.engine_count)?;
        let alert_engine = AlertEngine::new(config.alert_engine_config());
        Ok(EhmsCore {
            state: SystemState::Init,
            acquisition,
            alert_engine,
        })
    }

    pub fn state(&self) -> SystemState {
        self.state
    }

    /// Move out of `Init`/`Pbit` into normal cyclic operation. Idempotent.
    pub fn start(&mut self) {
        if matches!(self.state, SystemState::Init | SystemState::Pbit) {
            tracing::info!("EHMS core entering Normal");
            self.state = SystemState::Normal;
        }
    }

    /// Latch the core into `Fault`. Every subsequent `tick()` call
    /// short-circuits with an error until the core is rebuilt.
    pub fn enter_fault(&mut self, reason: &'static str) {
        tracing::error!(reason, "EHMS core entering Fault");
        self.state = SystemState::Fault;
    }

    /// Run one 10ms cyclic-executive step for a single engine: acquire and integrity-check that engine's snapshot, then feed
    /// it to the alert engine, then publish any newly raised alerts to the
    /// crew-display and flight-recorder ports (C8). Each engine has its own
    /// redundant bus pair in the real aircraft wiring, so the caller
    /// supplies a distinct `serial`/`mux` driver per engine and calls this
    /// once per engine per tick. A `CrcMismatch` skips alerting for this
    /// engine only; it does not latch the core into `Fault`. Acquisition and
    /// alert-engine errors are also sent to `reporter`; a rejected
    /// `display`/`recorder` publish is only logged, since a downstream sink
    /// outage is not a core-health event.
    #[allow(clippy::too_many_arguments)]
    pub fn tick_engine(
        &mut self,
        engine_id: EngineId,
        flight_phase: FlightPhase,
        clock: &dyn Clock,
        serial: &mut dyn SerialBus,
        mux: &mut dyn MultiplexBus,
        display: &mut dyn DisplaySink,
        recorder: &mut dyn RecorderSink,
        reporter: &mut dyn ErrorReporter,
    ) -> Result<(), EhmsError> {
        if self.state == SystemState::Fault {
            return Err(EhmsError::Fatal("core is latched in Fault state"));
        }

        let result = match self
            .acquisition
            .tick(engine_id, flight_phase, clock, serial, mux)
        {
            Err(e) => {
                tracing::error!(engine_id, error = ?e, "acquisition tick failed");
                reporter.report("acquisition", ReportSeverity::Error, e, engine_id as u32);
                Err(e)
            }
            Ok(()) => match self.acquisition.get_snapshot(engine_id) {
                Ok(snapshot) => {
                    let outcome = self.alert_engine.process(&snapshot).inspect_err(|e| {
                        tracing::warn!(engine_id, error = ?e, "alert processing degraded");
                        reporter.report("alerts", ReportSeverity::Warning, *e, engine_id as u32);
                    });
                    // health_status is derived from this engine's active
                    // alert levels (SPEC_FULL.md §3), which only the alert
                    // engine knows about; re-stamp it now that process()
                    // has run. engine_id is already known in range since
                    // get_snapshot just succeeded for it.
                    let health =
                        health_status_from_alert_level(self.alert_engine.highest_level_for_engine(engine_id));
                    let _ = self.acquisition.set_health_status(engine_id, health);
                    for alert in self.alert_engine.raised_this_cycle() {
                        if display.post(alert).is_err() {
                            tracing::warn!(alert_id = alert.alert_id, "display sink rejected alert");
                        }
                        if recorder.log_alert(alert).is_err() {
                            tracing::warn!(alert_id = alert.alert_id, "recorder sink rejected alert");
                        }
                    }
                    outcome
                }
                Err(e) => {
                    tracing::error!(
                        engine_id,
                        error = ?e,
                        "snapshot integrity check failed; alerting skipped this tick"
                    );
                    reporter.report("acquisition", ReportSeverity::Error, e, engine_id as u32);
                    Err(e)
                }
            },
        };

        if matches!(self.state, SystemState::Init | SystemState::Pbit) {
            self.state = SystemState::Normal;
        }

        result
    }

    pub fn get_snapshot(&self, engine_id: EngineId) -> Result<EngineSnapshot, EhmsError> {
        self.acquisition.get_snapshot(engine_id)
    }

    /// Test-only passthrough to [`AcquisitionPipeline::corrupt_snapshot_for_test`],
    /// for exercising CRC-mismatch handling end to end.
    #[cfg(any(test, feature = "test-util"))]
    pub fn corrupt_snapshot_for_test(&mut self, engine_id: EngineId) {
        self.acquisition.corrupt_snapshot_for_test(engine_id);
    }

    pub fn get_statistics(&self) -> Statistics {
        self.acquisition.get_statistics()
    }

    pub fn active_alerts(&self) -> &[Alert] {
        self.alert_engine.active_alerts()
    }

    pub fn master_caution(&self) -> bool {
        self.alert_engine.master_caution()
    }

    pub fn master_warning(&self) -> bool {
        self.alert_engine.master_warning()
    }

    pub fn highest_level(&self) -> Option<AlertLevel> {
        self.alert_engine.highest_level()
    }

    /// Clear the master indicator at `level`.
    pub fn acknowledge(&mut self, level: AlertLevel) {
        self.alert_engine.acknowledge(level);
    }
}

/// Map an engine's highest active alert level to its crew-facing health
/// grade, per SPEC_FULL.md §3.
fn health_status_from_alert_level(level: Option<AlertLevel>) -> HealthStatus {
    match level {
        None => HealthStatus::Normal,
        Some(AlertLevel::Caution) => HealthStatus::Caution,
        Some(AlertLevel::Warning) => HealthStatus::Critical,
    }
}
