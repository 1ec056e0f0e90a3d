//! Alert Engine (C7): threshold evaluation, alert identity and
//! de-duplication, severity aggregation, latching, and acknowledgement.
//!
//! Debounce and hysteresis are implemented as required, configuration-
//! injectable behavior rather than left as unused compile-time constants.

use ehms_common::consts::{
    DEBOUNCE_TICKS_DEFAULT, HYSTERESIS_PCT_DEFAULT, HYSTERESIS_TICKS_DEFAULT, MAX_ACTIVE_ALERTS,
    MAX_ENGINES,
};
use ehms_common::error::EhmsError;
use ehms_common::model::{Alert, AlertLevel, EngineSnapshot};

use crate::thresholds::THRESHOLDS;

/// Debounce/hysteresis tuning, injectable so unit tests can collapse the
/// default 3-tick windows down to 1.
#[derive(Debug, Clone, Copy)]
pub struct AlertEngineConfig {
    pub debounce_ticks: u8,
    pub hysteresis_pct: f32,
    pub hysteresis_ticks: u8,
}

impl Default for AlertEngineConfig {
    fn default() -> Self {
        AlertEngineConfig {
            debounce_ticks: DEBOUNCE_TICKS_DEFAULT,
            hysteresis_pct: HYSTERESIS_PCT_DEFAULT,
            hysteresis_ticks: HYSTERESIS_TICKS_DEFAULT,
        }
    }
}

/// Per-`(engine, threshold row)` state machine slot: `None -> Pending(k<3)
/// -> Active -> Cleared -> None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotState {
    Idle,
    Pending { exceed_ticks: u8 },
    Active { index: usize, recede_ticks: u8 },
}

/// Owns the active-alert set and master indicators. A single owning
/// aggregate constructed at init, mirroring the acquisition pipeline.
pub struct AlertEngine {
    config: AlertEngineConfig,
    active: heapless::Vec<Alert, MAX_ACTIVE_ALERTS>,
    slots: heapless::Vec<SlotState, { THRESHOLDS_LEN * MAX_ENGINES }>,
    next_alert_id: u32,
    master_caution: bool,
    master_warning: bool,
    /// Alerts created by the most recent `process()` call, for the
    /// caller to hand to the publication ports (C8). Cleared at the
    /// start of every `process()` call.
    raised_this_cycle: heapless::Vec<Alert, MAX_ACTIVE_ALERTS>,
}

// heapless array lengths must be const-evaluable; THRESHOLDS.len() isn't
// usable directly as a const generic from a `static` slice, so the slot
// count is pinned here and checked against the table at construction.
const THRESHOLDS_LEN: usize = 12;

impl AlertEngine {
    pub fn new(config: AlertEngineConfig) -> Self {
        debug_assert_eq!(THRESHOLDS.len(), THRESHOLDS_LEN);
        let mut slots = heapless::Vec::new();
        for _ in 0..(THRESHOLDS_LEN * MAX_ENGINES) {
            let _ = slots.push(SlotState::Idle);
        }
        AlertEngine {
            config,
            active: heapless::Vec::new(),
            slots,
            next_alert_id: 1,
            master_caution: false,
            master_warning: false,
            raised_this_cycle: heapless::Vec::new(),
        }
    }

    fn slot_index(row_idx: usize, engine_id: u8) -> usize {
        row_idx * MAX_ENGINES + engine_id as usize
    }

    /// Evaluate every threshold row against `snapshot`.
    /// Preconditions: the caller has already validated the snapshot's CRC
    /// — typically via `AcquisitionPipeline::get_snapshot`.
    pub fn process(&mut self, snapshot: &EngineSnapshot) -> Result<(), EhmsError> {
        self.raised_this_cycle.clear();
        let mut dropped = false;

        for (row_idx, row) in THRESHOLDS.iter().enumerate() {
            let param = &snapshot.parameters[row.param_id as usize];
            if !param.status.is_valid() {
                continue;
            }

            let slot_idx = Self::slot_index(row_idx, snapshot.engine_id);
            let exceeded = row.exceeded(param.eng_value);
            let slot = self.slots[slot_idx];

            let next = match slot {
                SlotState::Idle => {
                    if exceeded {
                        self.try_promote(row, snapshot, 1, &mut dropped)
                    } else {
                        SlotState::Idle
                    }
                }
                SlotState::Pending { exceed_ticks } => {
                    if exceeded {
                        self.try_promote(row, snapshot, exceed_ticks + 1, &mut dropped)
                    } else {
                        SlotState::Idle
                    }
                }
                SlotState::Active { index, recede_ticks } => {
                    self.advance_active(row, snapshot, index, recede_ticks, exceeded)
                }
            };

            self.slots[slot_idx] = next;
        }

        if dropped {
            tracing::warn!("alert active-set saturated; new exceedance dropped");
            Err(EhmsError::QueueFull)
        } else {
            Ok(())
        }
    }

    fn try_promote(
        &mut self,
        row: &ehms_common::model::ThresholdRow,
        snapshot: &EngineSnapshot,
        exceed_ticks: u8,
        dropped: &mut bool,
    ) -> SlotState {
        if exceed_ticks < self.config.debounce_ticks {
            return SlotState::Pending { exceed_ticks };
        }
        match self.create_alert(row, snapshot) {
            Ok(index) => SlotState::Active {
                index,
                recede_ticks: 0,
            },
            Err(EhmsError::QueueFull) => {
                *dropped = true;
                // Stay one tick below threshold so creation is retried as
                // soon as a slot frees up.
                SlotState::Pending {
                    exceed_ticks: self.config.debounce_ticks.saturating_sub(1),
                }
            }
            Err(_) => SlotState::Pending { exceed_ticks },
        }
    }

    fn advance_active(
        &mut self,
        row: &ehms_common::model::ThresholdRow,
        snapshot: &EngineSnapshot,
        index: usize,
        recede_ticks: u8,
        exceeded: bool,
    ) -> SlotState {
        let latched = self.active[index].latched;
        if latched {
            return SlotState::Active { index, recede_ticks: 0 };
        }

        let param = &snapshot.parameters[row.param_id as usize];
        let receded = !exceeded || row.receded(param.eng_value, self.config.hysteresis_pct);
        if receded {
            let recede_ticks = recede_ticks + 1;
            if recede_ticks >= self.config.hysteresis_ticks {
                self.clear_alert(index, snapshot);
                SlotState::Idle
            } else {
                SlotState::Active { index, recede_ticks }
            }
        } else {
            SlotState::Active {
                index,
                recede_ticks: 0,
            }
        }
    }

    fn create_alert(
        &mut self,
        row: &ehms_common::model::ThresholdRow,
        snapshot: &EngineSnapshot,
    ) -> Result<usize, EhmsError> {
        if self.active.len() >= MAX_ACTIVE_ALERTS {
            return Err(EhmsError::QueueFull);
        }
        let alert_id = self.next_alert_id;
        self.next_alert_id = self.next_alert_id.wrapping_add(1);

        let alert = Alert {
            alert_id,
            level: row.level,
            engine_id: snapshot.engine_id,
            param_id: row.param_id,
            onset_time: snapshot.sample_time,
            clear_time: None,
            active: true,
            latched: row.level.latches(),
            inhibited: false,
            message: row.format_message(snapshot.engine_id),
            display_code: row.display_code,
        };

        let index = self.active.len();
        self.active
            .push(alert)
            .map_err(|_| EhmsError::QueueFull)?;

        match row.level {
            AlertLevel::Warning => self.master_warning = true,
            AlertLevel::Caution => self.master_caution = true,
        }

        tracing::info!(
            alert_id,
            display_code = row.display_code,
            "alert raised"
        );
        // push() cannot fail: `raised_this_cycle` shares MAX_ACTIVE_ALERTS
        // capacity with `active`, and we only just confirmed room in `active`.
        let _ = self.raised_this_cycle.push(alert);

        Ok(index)
    }

    fn clear_alert(&mut self, index: usize, snapshot: &EngineSnapshot) {
        self.active[index].active = false;
        self.active[index].clear_time = Some(snapshot.sample_time);
        tracing::info!(alert_id = self.active[index].alert_id, "alert cleared");
        self.active.remove(index);
        // Any slot referencing an index after the removed one has shifted
        // down by one; fix up the bookkeeping.
        for slot in self.slots.iter_mut() {
            if let SlotState::Active {
                index: slot_index, ..
            } = slot
            {
                if *slot_index > index {
                    *slot_index -= 1;
                }
            }
        }
    }

    /// Clear the master indicator at `level`. Does
    /// not touch the underlying alert: latched alerts stay in the active
    /// set until an exceedance-driven clear or a maintenance reset.
    pub fn acknowledge(&mut self, level: AlertLevel) {
        match level {
            AlertLevel::Warning => self.master_warning = false,
            AlertLevel::Caution => self.master_caution = false,
        }
    }

    pub fn active_alerts(&self) -> &[Alert] {
        &self.active
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn master_warning(&self) -> bool {
        self.master_warning
    }

    pub fn master_caution(&self) -> bool {
        self.master_caution
    }

    pub fn highest_level(&self) -> Option<AlertLevel> {
        self.active.iter().map(|a| a.level).max()
    }

    /// The highest active alert level for one engine, or `None` if that
    /// engine has no active alerts. Used to derive `EngineSnapshot::health_status`
    /// per SPEC_FULL.md §3.
    pub fn highest_level_for_engine(&self, engine_id: ehms_common::model::EngineId) -> Option<AlertLevel> {
        self.active
            .iter()
            .filter(|a| a.engine_id == engine_id)
            .map(|a| a.level)
            .max()
    }

    /// Alerts created by the most recent `process()` call — the set C7
    /// hands to C8 for publication. Empty if nothing new was raised.
    pub fn raised_this_cycle(&self) -> &[Alert] {
        &self.raised_this_cycle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::id;
    use ehms_common::model::{FlightPhase, HealthStatus, ParamStatus};
    use ehms_common::time::Timestamp;

    fn snapshot_with(engine_id: u8, param_id: u8, eng_value: f32) -> EngineSnapshot {
        let mut snap = EngineSnapshot::empty(engine_id);
        snap.flight_phase = FlightPhase::Cruise;
        snap.health_status = HealthStatus::Normal;
        snap.sample_time = Timestamp::EPOCH;
        snap.parameters[param_id as usize].status = ParamStatus::Valid;
        snap.parameters[param_id as usize].eng_value = eng_value;
        snap
    }

    fn collapsed_config() -> AlertEngineConfig {
        AlertEngineConfig {
            debounce_ticks: 1,
            hysteresis_pct: HYSTERESIS_PCT_DEFAULT,
            hysteresis_ticks: 1,
        }
    }

    #[test]
    fn scenario_s2_egt_caution_raises_and_clears() {
        let mut engine = AlertEngine::new(AlertEngineConfig {
            debounce_ticks: 3,
            hysteresis_pct: 0.02,
            hysteresis_ticks: 3,
        });

        for _ in 0..3 {
            let snap = snapshot_with(1, id::EGT, 950.0);
            engine.process(&snap).unwrap();
        }
        assert_eq!(engine.active_count(), 1);
        let alert = engine.active_alerts()[0];
        assert_eq!(alert.display_code, 0x1001);
        assert_eq!(alert.message.as_str(), "ENG 2 EGT HIGH");
        assert!(engine.master_caution());
        assert!(!alert.latched);

        for _ in 0..3 {
            let snap = snapshot_with(1, id::EGT, 930.0);
            engine.process(&snap).unwrap();
        }
        assert_eq!(engine.active_count(), 0, "non-latched alert clears after hysteresis");
        assert!(
            engine.master_caution(),
            "master indicator persists until explicit acknowledge"
        );
    }

    #[test]
    fn scenario_s3_oil_press_warning_latches() {
        let mut engine = AlertEngine::new(collapsed_config());

        let snap = snapshot_with(0, id::OIL_PRESS, 15.0);
        engine.process(&snap).unwrap();
        assert_eq!(engine.active_count(), 1);
        let alert = engine.active_alerts()[0];
        assert_eq!(alert.display_code, 0x2002);
        assert_eq!(alert.message.as_str(), "ENG 1 OIL PRESS CRIT");
        assert!(alert.latched);
        assert!(engine.master_warning());

        // Recovers to 30 PSI; the latched alert remains active.
        let recovered = snapshot_with(0, id::OIL_PRESS, 30.0);
        engine.process(&recovered).unwrap();
        assert_eq!(engine.active_count(), 1);

        engine.acknowledge(AlertLevel::Warning);
        assert!(!engine.master_warning());
        assert_eq!(engine.active_count(), 1, "acknowledge does not clear the alert");
    }

    #[test]
    fn scenario_s6_active_set_saturation() {
        let mut engine = AlertEngine::new(collapsed_config());
        // Saturate the active set with the first 8 threshold rows across
        // all 4 engines (8 * 4 = 32 distinct (row, engine) triples).
        for row in &THRESHOLDS[0..8] {
            for engine_id in 0..MAX_ENGINES as u8 {
                let value = if row.direction == ehms_common::model::Direction::High {
                    row.threshold + 1.0
                } else {
                    row.threshold - 1.0
                };
                let mut snap = EngineSnapshot::empty(engine_id);
                snap.sample_time = Timestamp::EPOCH;
                snap.parameters[row.param_id as usize].status = ParamStatus::Valid;
                snap.parameters[row.param_id as usize].eng_value = value;
                engine.process(&snap).unwrap();
            }
        }
        assert_eq!(engine.active_count(), MAX_ACTIVE_ALERTS);

        // A 33rd, genuinely novel triple (a row/engine combination not
        // touched above) returns QueueFull and leaves the active set
        // untouched.
        let novel_row = &THRESHOLDS[8];
        let mut snap = EngineSnapshot::empty(0);
        snap.sample_time = Timestamp::EPOCH;
        snap.parameters[novel_row.param_id as usize].status = ParamStatus::Valid;
        snap.parameters[novel_row.param_id as usize].eng_value = if novel_row.direction
            == ehms_common::model::Direction::High
        {
            novel_row.threshold + 1.0
        } else {
            novel_row.threshold - 1.0
        };
        let result = engine.process(&snap);
        assert!(matches!(result, Err(EhmsError::QueueFull)));
        assert_eq!(engine.active_count(), MAX_ACTIVE_ALERTS, "existing alerts unaffected");
    }

    #[test]
    fn alert_uniqueness_i3_reraise_does_not_duplicate() {
        let mut engine = AlertEngine::new(collapsed_config());
        let snap = snapshot_with(2, id::N1, 110.0);
        engine.process(&snap).unwrap();
        let first_id = engine.active_alerts()[0].alert_id;
        engine.process(&snap).unwrap();
        engine.process(&snap).unwrap();
        assert_eq!(engine.active_count(), 1);
        assert_eq!(engine.active_alerts()[0].alert_id, first_id);
    }

    #[test]
    fn invalid_parameter_does_not_raise_alert() {
        let mut engine = AlertEngine::new(collapsed_config());
        let mut snap = EngineSnapshot::empty(0);
        snap.parameters[id::EGT as usize].status = ParamStatus::Stale;
        snap.parameters[id::EGT as usize].eng_value = 2000.0;
        engine.process(&snap).unwrap();
        assert_eq!(engine.active_count(), 0);
    }

    #[test]
    fn debounce_requires_consecutive_exceeding_ticks() {
        let mut engine = AlertEngine::new(AlertEngineConfig {
            debounce_ticks: 3,
            hysteresis_pct: 0.02,
            hysteresis_ticks: 3,
        });
        let exceeding = snapshot_with(0, id::EGT, 950.0);
        let nominal = snapshot_with(0, id::EGT, 800.0);

        engine.process(&exceeding).unwrap();
        engine.process(&exceeding).unwrap();
        assert_eq!(engine.active_count(), 0, "not yet 3 consecutive ticks");
        engine.process(&nominal).unwrap();
        assert_eq!(engine.active_count(), 0, "non-exceeding tick resets debounce");
        engine.process(&exceeding).unwrap();
        engine.process(&exceeding).unwrap();
        engine.process(&exceeding).unwrap();
        assert_eq!(engine.active_count(), 1);
    }

    #[test]
    fn highest_level_for_engine_is_scoped_per_engine() {
        let mut engine = AlertEngine::new(collapsed_config());
        engine.process(&snapshot_with(0, id::EGT, 950.0)).unwrap();
        engine.process(&snapshot_with(1, id::OIL_PRESS, 15.0)).unwrap();

        assert_eq!(
            engine.highest_level_for_engine(0),
            Some(AlertLevel::Caution)
        );
        assert_eq!(
            engine.highest_level_for_engine(1),
            Some(AlertLevel::Warning)
        );
        assert_eq!(engine.highest_level_for_engine(2), None);
    }
}
