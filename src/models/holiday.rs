//! Public holiday models.
//!
//! This module contains the [`HolidayEntry`] type produced by the holiday
//! calendar. Entries are generated on demand for a requested year and are
//! never persisted by the engine.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Whether a holiday falls on the same date every year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HolidayKind {
    /// Same calendar date every year.
    Fixed,
    /// Derived from the Orthodox Easter date.
    Movable,
}

/// A public holiday on a specific date.
///
/// # Example
///
/// ```
/// use fiscal_engine::models::{HolidayEntry, HolidayKind};
/// use chrono::NaiveDate;
///
/// let holiday = HolidayEntry {
///     date: NaiveDate::from_ymd_opt(2025, 12, 1).unwrap(),
///     name: "Ziua Nationala".to_string(),
///     kind: HolidayKind::Fixed,
/// };
/// assert_eq!(holiday.kind, HolidayKind::Fixed);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayEntry {
    /// The date of the public holiday.
    pub date: NaiveDate,
    /// The name of the public holiday.
    pub name: String,
    /// Fixed or movable.
    pub kind: HolidayKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_holiday_entry_serialization() {
        let holiday = HolidayEntry {
            date: NaiveDate::from_ymd_opt(2025, 4, 21).unwrap(),
            name: "A doua zi de Paste".to_string(),
            kind: HolidayKind::Movable,
        };

        let json = serde_json::to_string(&holiday).unwrap();
        assert!(json.contains("\"date\":\"2025-04-21\""));
        assert!(json.contains("\"kind\":\"movable\""));
    }

    #[test]
    fn test_holiday_entry_deserialization() {
        let json = r#"{"date": "2025-01-24", "name": "Ziua Unirii", "kind": "fixed"}"#;
        let holiday: HolidayEntry = serde_json::from_str(json).unwrap();
        assert_eq!(holiday.date, NaiveDate::from_ymd_opt(2025, 1, 24).unwrap());
        assert_eq!(holiday.kind, HolidayKind::Fixed);
    }
}
