//! Static threshold table (part of C7): `(param_id, level, threshold,
//! direction, display_code, message)` rows, ordered severity-descending
//! (all `Warning` rows before any `Caution` row) so that within a single
//! tick a Warning-level exceedance shadows a Caution-level one for the
//! same parameter. See DESIGN.md for the rationale behind this ordering.

use crate::params::id;
use ehms_common::model::{AlertLevel, Direction, ThresholdRow};

pub static THRESHOLDS: &[ThresholdRow] = &[
    // --- Warning rows ---
    ThresholdRow {
        param_id: id::EGT,
        level: AlertLevel::Warning,
        threshold: 1000.0,
        direction: Direction::High,
        display_code: 0x1002,
        message_template: "ENG {eng} EGT OVERLIMIT",
    },
    ThresholdRow {
        param_id: id::OIL_PRESS,
        level: AlertLevel::Warning,
        threshold: 15.0,
        direction: Direction::Low,
        display_code: 0x2002,
        message_template: "ENG {eng} OIL PRESS CRIT",
    },
    ThresholdRow {
        param_id: id::OIL_TEMP,
        level: AlertLevel::Warning,
        threshold: 155.0,
        direction: Direction::High,
        display_code: 0x2004,
        message_template: "ENG {eng} OIL TEMP CRIT",
    },
    ThresholdRow {
        param_id: id::VIB_FAN,
        level: AlertLevel::Warning,
        threshold: 5.0,
        direction: Direction::High,
        display_code: 0x3002,
        message_template: "ENG {eng} FAN VIB CRIT",
    },
    ThresholdRow {
        param_id: id::VIB_CORE,
        level: AlertLevel::Warning,
        threshold: 6.0,
        direction: Direction::High,
        display_code: 0x3004,
        message_template: "ENG {eng} CORE VIB CRIT",
    },
    ThresholdRow {
        param_id: id::N1,
        level: AlertLevel::Warning,
        threshold: 104.0,
        direction: Direction::High,
        display_code: 0x4001,
        message_template: "ENG {eng} N1 OVERLIMIT",
    },
    ThresholdRow {
        param_id: id::N2,
        level: AlertLevel::Warning,
        threshold: 105.0,
        direction: Direction::High,
        display_code: 0x4002,
        message_template: "ENG {eng} N2 OVERLIMIT",
    },
    // --- Caution rows ---
    ThresholdRow {
        param_id: id::EGT,
        level: AlertLevel::Caution,
        threshold: 950.0,
        direction: Direction::High,
        display_code: 0x1001,
        message_template: "ENG {eng} EGT HIGH",
    },
    ThresholdRow {
        param_id: id::OIL_PRESS,
        level: AlertLevel::Caution,
        threshold: 25.0,
        direction: Direction::Low,
        display_code: 0x2001,
        message_template: "ENG {eng} OIL PRESS LO",
    },
    ThresholdRow {
        param_id: id::OIL_TEMP,
        level: AlertLevel::Caution,
        threshold: 140.0,
        direction: Direction::High,
        display_code: 0x2003,
        message_template: "ENG {eng} OIL TEMP HI",
    },
    ThresholdRow {
        param_id: id::VIB_FAN,
        level: AlertLevel::Caution,
        threshold: 3.0,
        direction: Direction::High,
        display_code: 0x3001,
        message_template: "ENG {eng} FAN VIB HI",
    },
    ThresholdRow {
        param_id: id::VIB_CORE,
        level: AlertLevel::Caution,
        threshold: 4.0,
        direction: Direction::High,
        display_code: 0x3003,
        message_template: "ENG {eng} CORE VIB HI",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warning_rows_precede_caution_rows() {
        let first_caution = THRESHOLDS
            .iter()
            .position(|r| r.level == AlertLevel::Caution)
            .unwrap();
        assert!(THRESHOLDS[..first_caution]
            .iter()
            .all(|r| r.level == AlertLevel::Warning));
    }

    #[test]
    fn egt_caution_matches_scenario_s2() {
        let row = THRESHOLDS
            .iter()
            .find(|r| r.param_id == id::EGT && r.level == AlertLevel::Caution)
            .unwrap();
        assert_eq!(row.display_code, 0x1001);
        assert_eq!(row.format_message(1).as_str(), "ENG 2 EGT HIGH");
        assert!(row.exceeded(950.0));
        assert!(row.receded(930.9, 0.02));
    }

    #[test]
    fn oil_press_warning_matches_scenario_s3() {
        let row = THRESHOLDS
            .iter()
            .find(|r| r.param_id == id::OIL_PRESS && r.level == AlertLevel::Warning)
            .unwrap();
        assert_eq!(row.display_code, 0x2002);
        assert_eq!(row.format_message(0).as_str(), "ENG 1 OIL PRESS CRIT");
        assert!(row.exceeded(15.0));
    }
}
