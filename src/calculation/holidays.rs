//! Romanian public holiday calendar.
//!
//! This module provides the [`HolidayCalendar`] used by the e-invoice
//! deadline engine. Fixed-date holidays are combined with movable feasts
//! derived from the Orthodox Easter date; the calendar also accepts
//! additional holidays declared for a specific date.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::error::{EngineError, EngineResult};
use crate::models::{HolidayEntry, HolidayKind};

/// Fixed-date holidays as (month, day, name, first year observed).
const FIXED_HOLIDAYS: [(u32, u32, &str, i32); 12] = [
    (1, 1, "Anul Nou", i32::MIN),
    (1, 2, "Anul Nou (a doua zi)", i32::MIN),
    (1, 6, "Boboteaza", 2024),
    (1, 7, "Sfantul Ioan Botezatorul", 2024),
    (1, 24, "Ziua Unirii Principatelor Romane", 2017),
    (5, 1, "Ziua Muncii", i32::MIN),
    (6, 1, "Ziua Copilului", 2017),
    (8, 15, "Adormirea Maicii Domnului", i32::MIN),
    (11, 30, "Sfantul Andrei", i32::MIN),
    (12, 1, "Ziua Nationala a Romaniei", i32::MIN),
    (12, 25, "Craciunul", i32::MIN),
    (12, 26, "Craciunul (a doua zi)", i32::MIN),
];

/// Movable feasts as (offset from Orthodox Easter in days, name, first year observed).
const MOVABLE_HOLIDAYS: [(i64, &str, i32); 5] = [
    (-2, "Vinerea Mare", 2018),
    (0, "Pastele", i32::MIN),
    (1, "A doua zi de Paste", i32::MIN),
    (49, "Rusaliile", i32::MIN),
    (50, "A doua zi de Rusalii", i32::MIN),
];

/// Computes the Gregorian date of Orthodox Easter for a year.
///
/// Uses the Meeus Julian algorithm and shifts the Julian result by the
/// century offset `y/100 - y/400 - 2` days. Returns `None` only for years
/// outside the range chrono can represent.
///
/// # Examples
///
/// ```
/// use fiscal_engine::calculation::orthodox_easter;
/// use chrono::NaiveDate;
///
/// assert_eq!(orthodox_easter(2025), NaiveDate::from_ymd_opt(2025, 4, 20));
/// assert_eq!(orthodox_easter(2024), NaiveDate::from_ymd_opt(2024, 5, 5));
/// ```
pub fn orthodox_easter(year: i32) -> Option<NaiveDate> {
    let a = year.rem_euclid(4);
    let b = year.rem_euclid(7);
    let c = year.rem_euclid(19);
    let d = (19 * c + 15) % 30;
    let e = (2 * a + 4 * b - d + 34).rem_euclid(7);
    let gregorian_offset = year.div_euclid(100) - year.div_euclid(400) - 2;

    let march_22 = NaiveDate::from_ymd_opt(year, 3, 22)?;
    march_22.checked_add_signed(Duration::days(i64::from(d + e + gregorian_offset)))
}

/// The Romanian public holiday calendar.
///
/// The calendar is a value: registering an additional holiday returns a
/// new calendar and nothing is cached between calls.
///
/// # Example
///
/// ```
/// use fiscal_engine::calculation::HolidayCalendar;
/// use chrono::NaiveDate;
///
/// let calendar = HolidayCalendar::new();
/// let national_day = NaiveDate::from_ymd_opt(2025, 12, 1).unwrap();
/// assert!(calendar.is_holiday(national_day));
/// assert!(!calendar.is_business_day(national_day));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HolidayCalendar {
    declared: BTreeMap<NaiveDate, String>,
}

impl HolidayCalendar {
    /// Creates a calendar with the legal holidays only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the calendar with an additional declared holiday.
    pub fn with_holiday(mut self, date: NaiveDate, name: impl Into<String>) -> Self {
        self.declared.insert(date, name.into());
        self
    }

    /// Returns every holiday of `year` sorted by date.
    ///
    /// When two holidays fall on the same date the legal one is kept.
    pub fn holidays(&self, year: i32) -> Vec<HolidayEntry> {
        let mut by_date: BTreeMap<NaiveDate, HolidayEntry> = BTreeMap::new();

        for (month, day, name, since) in FIXED_HOLIDAYS {
            if year < since {
                continue;
            }
            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                by_date.entry(date).or_insert_with(|| HolidayEntry {
                    date,
                    name: name.to_string(),
                    kind: HolidayKind::Fixed,
                });
            }
        }

        if let Some(easter) = orthodox_easter(year) {
            for (offset, name, since) in MOVABLE_HOLIDAYS {
                if year < since {
                    continue;
                }
                if let Some(date) = easter.checked_add_signed(Duration::days(offset)) {
                    by_date.entry(date).or_insert_with(|| HolidayEntry {
                        date,
                        name: name.to_string(),
                        kind: HolidayKind::Movable,
                    });
                }
            }
        }

        for (date, name) in self.declared.range(year_bounds(year)) {
            by_date.entry(*date).or_insert_with(|| HolidayEntry {
                date: *date,
                name: name.clone(),
                kind: HolidayKind::Fixed,
            });
        }

        by_date.into_values().collect()
    }

    /// Returns true if `date` is a public holiday.
    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        if self.declared.contains_key(&date) {
            return true;
        }

        let year = date.year();
        let fixed = FIXED_HOLIDAYS.iter().any(|(month, day, _, since)| {
            year >= *since && date.month() == *month && date.day() == *day
        });
        if fixed {
            return true;
        }

        orthodox_easter(year).is_some_and(|easter| {
            let offset = (date - easter).num_days();
            MOVABLE_HOLIDAYS
                .iter()
                .any(|(movable, _, since)| year >= *since && offset == *movable)
        })
    }

    /// Returns true if `date` is neither a weekend day nor a holiday.
    pub fn is_business_day(&self, date: NaiveDate) -> bool {
        !is_weekend(date) && !self.is_holiday(date)
    }

    /// Returns the date `n` business days after `date`.
    ///
    /// Counting starts the day after `date`; `n == 0` returns `date` itself.
    ///
    /// # Examples
    ///
    /// ```
    /// use fiscal_engine::calculation::HolidayCalendar;
    /// use chrono::NaiveDate;
    ///
    /// let calendar = HolidayCalendar::new();
    /// // Friday 2025-03-07 plus one business day is Monday 2025-03-10.
    /// let friday = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
    /// let next = calendar.add_business_days(friday, 1).unwrap();
    /// assert_eq!(next, NaiveDate::from_ymd_opt(2025, 3, 10).unwrap());
    /// ```
    pub fn add_business_days(&self, date: NaiveDate, n: u32) -> EngineResult<NaiveDate> {
        self.walk_business_days(date, n).map(|(end, _)| end)
    }

    /// Walks `n` business days forward from `date`, collecting the
    /// non-business days stepped over.
    pub(crate) fn walk_business_days(
        &self,
        date: NaiveDate,
        n: u32,
    ) -> EngineResult<(NaiveDate, Vec<NaiveDate>)> {
        let mut current = date;
        let mut counted = 0;
        let mut skipped = Vec::new();

        while counted < n {
            current = next_day(current)?;
            if self.is_business_day(current) {
                counted += 1;
            } else {
                skipped.push(current);
            }
        }

        Ok((current, skipped))
    }

    /// Counts business days in the half-open interval `(from, to]`.
    ///
    /// Returns zero when `to` is on or before `from`.
    pub fn business_days_between(&self, from: NaiveDate, to: NaiveDate) -> u32 {
        from.iter_days()
            .skip(1)
            .take_while(|day| *day <= to)
            .filter(|day| self.is_business_day(*day))
            .count() as u32
    }
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

fn next_day(date: NaiveDate) -> EngineResult<NaiveDate> {
    date.succ_opt()
        .ok_or_else(|| EngineError::invalid_input("date", format!("{} has no successor", date)))
}

fn year_bounds(year: i32) -> std::ops::RangeInclusive<NaiveDate> {
    let start = NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(NaiveDate::MIN);
    let end = NaiveDate::from_ymd_opt(year, 12, 31).unwrap_or(NaiveDate::MAX);
    start..=end
}
