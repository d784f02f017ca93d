//! E-invoice (e-Factura) reporting deadlines and late-reporting penalties.
//!
//! An invoice must be transmitted within a number of business days after
//! its issue date. Late transmission is bucketed by delay (light, moderate,
//! severe) and penalized within a fixed range per contributor size; B2B
//! invoices add a penalty proportional to the invoice value.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::config::{PenaltyRange, RuleSet};
use crate::error::{EngineError, EngineResult};
use crate::models::{AuditTrace, AuditWarning, ContributorSize};

use super::holidays::HolidayCalendar;
use super::rounding::round_money;
use super::validation::ensure_non_negative;

/// Warning code raised when a first light offense is reduced to a warning.
pub const FIRST_OFFENSE_WARNING: &str = "FIRST_OFFENSE_WARNING";

const TWO: Decimal = Decimal::from_parts(2, 0, 0, false, 0);

/// The reporting deadline of an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadlineResult {
    /// Invoice issue date.
    pub invoice_date: NaiveDate,
    /// Business days allowed.
    pub working_days: u32,
    /// Last business day for transmission.
    pub deadline: NaiveDate,
    /// Calendar days between the invoice date and the deadline.
    pub calendar_days: i64,
    /// Weekend days and holidays stepped over.
    pub skipped_dates: Vec<NaiveDate>,
}

/// Business-day delay of an actual transmission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayResult {
    /// Invoice issue date.
    pub invoice_date: NaiveDate,
    /// Actual transmission date.
    pub transmission_date: NaiveDate,
    /// Reporting deadline.
    pub deadline: NaiveDate,
    /// Whether the invoice was transmitted on or before the deadline.
    pub on_time: bool,
    /// Business days after the deadline, zero when on time.
    pub delay_business_days: u32,
}

/// Delay severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DelayBucket {
    /// No delay.
    OnTime,
    /// Up to `light_max_days`.
    Light,
    /// Up to `moderate_max_days`.
    Moderate,
    /// Beyond `moderate_max_days`.
    Severe,
}

/// Facts about the invoice and its issuer that drive the penalty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceProfile {
    /// Size class of the issuer.
    pub contributor_size: ContributorSize,
    /// Whether this is the issuer's first offense.
    pub first_offense: bool,
    /// Whether the invoice is business to business.
    pub b2b: bool,
    /// Invoice value in RON.
    pub invoice_value: Decimal,
}

impl InvoiceProfile {
    /// Builds the penalty scenario for a given delay.
    pub fn with_delay(&self, delay_business_days: u32) -> PenaltyScenario {
        PenaltyScenario {
            contributor_size: self.contributor_size,
            delay_business_days,
            first_offense: self.first_offense,
            b2b: self.b2b,
            invoice_value: self.invoice_value,
        }
    }
}

/// Inputs to the penalty calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PenaltyScenario {
    /// Size class of the issuer.
    pub contributor_size: ContributorSize,
    /// Business days after the deadline.
    pub delay_business_days: u32,
    /// Whether this is the issuer's first offense.
    pub first_offense: bool,
    /// Whether the invoice is business to business.
    pub b2b: bool,
    /// Invoice value in RON.
    pub invoice_value: Decimal,
}

/// Penalty for a late transmission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PenaltyResult {
    /// Delay severity.
    pub bucket: DelayBucket,
    /// Penalty range of the contributor size.
    pub range: PenaltyRange,
    /// Whether the offense was reduced to a warning.
    pub warning_only: bool,
    /// Fixed penalty from the range.
    pub fixed_penalty: Decimal,
    /// B2B penalty proportional to the invoice value.
    pub proportional_penalty: Decimal,
    /// Fixed plus proportional penalty.
    pub total_penalty: Decimal,
    /// Audit trace of the calculation.
    pub audit_trace: AuditTrace,
}

/// Deadline, delay and penalty of one transmission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransmissionAssessment {
    /// Reporting deadline.
    pub deadline: DeadlineResult,
    /// Business-day delay.
    pub delay: DelayResult,
    /// Resulting penalty.
    pub penalty: PenaltyResult,
}

/// Computes the reporting deadline of an invoice.
///
/// Counting starts the day after the invoice date and skips weekends and
/// holidays.
///
/// # Examples
///
/// ```no_run
/// use fiscal_engine::calculation::{HolidayCalendar, compute_deadline};
/// use fiscal_engine::config::ConfigLoader;
/// use chrono::NaiveDate;
///
/// let loader = ConfigLoader::load("config").unwrap();
/// let rules = loader.rule_set(2025).unwrap();
/// let calendar = HolidayCalendar::new();
///
/// // Friday before the Christmas weekend.
/// let invoice = NaiveDate::from_ymd_opt(2027, 12, 24).unwrap();
/// let result = compute_deadline(invoice, &calendar, rules).unwrap();
/// assert_eq!(result.deadline, NaiveDate::from_ymd_opt(2027, 12, 31).unwrap());
/// assert_eq!(result.calendar_days, 7);
/// ```
pub fn compute_deadline(
    invoice_date: NaiveDate,
    calendar: &HolidayCalendar,
    rules: &RuleSet,
) -> EngineResult<DeadlineResult> {
    let working_days = rules.e_invoice().working_days_deadline;
    let (deadline, skipped_dates) = calendar.walk_business_days(invoice_date, working_days)?;

    debug!(
        invoice_date = %invoice_date,
        deadline = %deadline,
        skipped = skipped_dates.len(),
        "Computed e-invoice deadline"
    );

    Ok(DeadlineResult {
        invoice_date,
        working_days,
        deadline,
        calendar_days: (deadline - invoice_date).num_days(),
        skipped_dates,
    })
}

/// Computes the business-day delay of a transmission.
///
/// # Errors
///
/// Returns `InvalidInput` when the transmission precedes the invoice date.
pub fn compute_delay(
    invoice_date: NaiveDate,
    transmission_date: NaiveDate,
    calendar: &HolidayCalendar,
    rules: &RuleSet,
) -> EngineResult<DelayResult> {
    if transmission_date < invoice_date {
        return Err(EngineError::invalid_input(
            "transmission_date",
            format!(
                "{} is before the invoice date {}",
                transmission_date, invoice_date
            ),
        ));
    }

    let deadline = compute_deadline(invoice_date, calendar, rules)?.deadline;
    let delay_business_days = calendar.business_days_between(deadline, transmission_date);

    debug!(
        invoice_date = %invoice_date,
        transmission_date = %transmission_date,
        delay_business_days,
        "Computed e-invoice delay"
    );

    Ok(DelayResult {
        invoice_date,
        transmission_date,
        deadline,
        on_time: transmission_date <= deadline,
        delay_business_days,
    })
}

/// Classifies a delay into its severity bucket.
pub fn delay_bucket(delay_business_days: u32, rules: &RuleSet) -> DelayBucket {
    let grid = &rules.e_invoice().penalty_grid;
    match delay_business_days {
        0 => DelayBucket::OnTime,
        d if d <= grid.light_max_days => DelayBucket::Light,
        d if d <= grid.moderate_max_days => DelayBucket::Moderate,
        _ => DelayBucket::Severe,
    }
}

/// Computes the penalty for a late transmission.
///
/// # Examples
///
/// ```no_run
/// use fiscal_engine::calculation::{DelayBucket, PenaltyScenario, compute_penalty};
/// use fiscal_engine::config::ConfigLoader;
/// use fiscal_engine::models::ContributorSize;
/// use rust_decimal_macros::dec;
///
/// let loader = ConfigLoader::load("config").unwrap();
/// let rules = loader.rule_set(2025).unwrap();
///
/// let scenario = PenaltyScenario {
///     contributor_size: ContributorSize::Medium,
///     delay_business_days: 10,
///     first_offense: false,
///     b2b: false,
///     invoice_value: dec!(10000),
/// };
/// let result = compute_penalty(&scenario, rules).unwrap();
/// assert_eq!(result.bucket, DelayBucket::Moderate);
/// assert_eq!(result.total_penalty, dec!(3750));
/// ```
pub fn compute_penalty(scenario: &PenaltyScenario, rules: &RuleSet) -> EngineResult<PenaltyResult> {
    ensure_non_negative("invoice_value", scenario.invoice_value)?;
    let grid = &rules.e_invoice().penalty_grid;
    let range = grid
        .ranges
        .get(&scenario.contributor_size)
        .copied()
        .ok_or_else(|| {
            EngineError::invalid_rules(format!(
                "no penalty range for {:?}",
                scenario.contributor_size
            ))
        })?;

    let bucket = delay_bucket(scenario.delay_business_days, rules);
    let mut trace = AuditTrace::default();

    let warning_only =
        bucket == DelayBucket::Light && scenario.first_offense && grid.first_offense_warning;

    let fixed_penalty = match bucket {
        _ if warning_only => Decimal::ZERO,
        DelayBucket::OnTime => Decimal::ZERO,
        DelayBucket::Light => range.min,
        DelayBucket::Moderate => round_money((range.min + range.max) / TWO),
        DelayBucket::Severe => range.max,
    };
    trace.record(
        "e_invoice_fixed_penalty",
        "Fixed Penalty",
        "OUG 120/2021 art. 13^2",
        json!({
            "contributor_size": format!("{:?}", scenario.contributor_size),
            "delay_business_days": scenario.delay_business_days,
            "first_offense": scenario.first_offense,
        }),
        json!({
            "bucket": format!("{:?}", bucket),
            "fixed_penalty": fixed_penalty.normalize().to_string(),
        }),
        if warning_only {
            "First offense with a light delay: warning only".to_string()
        } else {
            format!(
                "{:?} delay of {} business days in range {}-{}: {}",
                bucket,
                scenario.delay_business_days,
                range.min.normalize(),
                range.max.normalize(),
                fixed_penalty.normalize()
            )
        },
    );

    if warning_only {
        trace.warnings.push(AuditWarning::new(
            FIRST_OFFENSE_WARNING,
            "First offense with a light delay is sanctioned with a warning",
            "low",
        ));
    }

    let proportional_penalty =
        if scenario.b2b && bucket != DelayBucket::OnTime && !warning_only {
            round_money(scenario.invoice_value * grid.b2b_proportional_rate)
        } else {
            Decimal::ZERO
        };
    trace.record(
        "e_invoice_proportional_penalty",
        "B2B Proportional Penalty",
        "OUG 120/2021 art. 13^2 alin. (7)",
        json!({
            "b2b": scenario.b2b,
            "invoice_value": scenario.invoice_value.normalize().to_string(),
            "rate": grid.b2b_proportional_rate.normalize().to_string(),
        }),
        json!({ "proportional_penalty": proportional_penalty.normalize().to_string() }),
        format!(
            "Proportional penalty: {}",
            proportional_penalty.normalize()
        ),
    );

    let total_penalty = fixed_penalty + proportional_penalty;

    debug!(
        bucket = ?bucket,
        warning_only,
        total_penalty = %total_penalty,
        "Computed e-invoice penalty"
    );

    Ok(PenaltyResult {
        bucket,
        range,
        warning_only,
        fixed_penalty,
        proportional_penalty,
        total_penalty,
        audit_trace: trace,
    })
}

/// Computes deadline, delay and penalty of a transmission in one call.
pub fn assess_transmission(
    invoice_date: NaiveDate,
    transmission_date: NaiveDate,
    profile: &InvoiceProfile,
    calendar: &HolidayCalendar,
    rules: &RuleSet,
) -> EngineResult<TransmissionAssessment> {
    let deadline = compute_deadline(invoice_date, calendar, rules)?;
    let delay = compute_delay(invoice_date, transmission_date, calendar, rules)?;
    let penalty = compute_penalty(&profile.with_delay(delay.delay_business_days), rules)?;

    Ok(TransmissionAssessment {
        deadline,
        delay,
        penalty,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigLoader;
    use chrono::{Datelike, Weekday};
    use rust_decimal_macros::dec;

    fn rules_2025() -> RuleSet {
        ConfigLoader::load("./config")
            .unwrap()
            .rule_set(2025)
            .unwrap()
            .clone()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn scenario(size: ContributorSize, delay: u32) -> PenaltyScenario {
        PenaltyScenario {
            contributor_size: size,
            delay_business_days: delay,
            first_offense: false,
            b2b: false,
            invoice_value: dec!(10000),
        }
    }

    #[test]
    fn test_deadline_over_christmas_weekend() {
        let rules = rules_2025();
        let invoice = date(2027, 12, 24);
        assert_eq!(invoice.weekday(), Weekday::Fri);

        let result = compute_deadline(invoice, &HolidayCalendar::new(), &rules).unwrap();
        assert_eq!(result.deadline, date(2027, 12, 31));
        assert_eq!(result.calendar_days, 7);
        assert_eq!(result.skipped_dates, vec![date(2027, 12, 25), date(2027, 12, 26)]);
    }

    #[test]
    fn test_deadline_over_easter() {
        let rules = rules_2025();
        let result =
            compute_deadline(date(2025, 4, 17), &HolidayCalendar::new(), &rules).unwrap();
        assert_eq!(result.deadline, date(2025, 4, 28));
        assert_eq!(result.skipped_dates.len(), 6);
    }

    #[test]
    fn test_deadline_plain_week() {
        let rules = rules_2025();
        let result = compute_deadline(date(2025, 3, 3), &HolidayCalendar::new(), &rules).unwrap();
        assert_eq!(result.deadline, date(2025, 3, 10));
        assert_eq!(result.skipped_dates, vec![date(2025, 3, 8), date(2025, 3, 9)]);
    }

    #[test]
    fn test_delay_counts_business_days_after_deadline() {
        let rules = rules_2025();
        let calendar = HolidayCalendar::new();

        let late = compute_delay(date(2025, 3, 3), date(2025, 3, 17), &calendar, &rules).unwrap();
        assert!(!late.on_time);
        assert_eq!(late.delay_business_days, 5);

        let on_time =
            compute_delay(date(2025, 3, 3), date(2025, 3, 10), &calendar, &rules).unwrap();
        assert!(on_time.on_time);
        assert_eq!(on_time.delay_business_days, 0);
    }

    #[test]
    fn test_transmission_before_invoice_rejected() {
        let rules = rules_2025();
        let result = compute_delay(
            date(2025, 3, 3),
            date(2025, 3, 1),
            &HolidayCalendar::new(),
            &rules,
        );
        assert!(matches!(result, Err(EngineError::InvalidInput { .. })));
    }

    #[test]
    fn test_delay_buckets() {
        let rules = rules_2025();
        assert_eq!(delay_bucket(0, &rules), DelayBucket::OnTime);
        assert_eq!(delay_bucket(1, &rules), DelayBucket::Light);
        assert_eq!(delay_bucket(5, &rules), DelayBucket::Light);
        assert_eq!(delay_bucket(6, &rules), DelayBucket::Moderate);
        assert_eq!(delay_bucket(15, &rules), DelayBucket::Moderate);
        assert_eq!(delay_bucket(16, &rules), DelayBucket::Severe);
    }

    #[test]
    fn test_fixed_penalty_per_bucket() {
        let rules = rules_2025();
        let light = compute_penalty(&scenario(ContributorSize::Large, 3), &rules).unwrap();
        assert_eq!(light.total_penalty, dec!(5000));

        let moderate = compute_penalty(&scenario(ContributorSize::Medium, 10), &rules).unwrap();
        assert_eq!(moderate.total_penalty, dec!(3750));

        let severe = compute_penalty(&scenario(ContributorSize::Small, 20), &rules).unwrap();
        assert_eq!(severe.total_penalty, dec!(2500));

        let on_time = compute_penalty(&scenario(ContributorSize::Micro, 0), &rules).unwrap();
        assert_eq!(on_time.total_penalty, Decimal::ZERO);
    }

    #[test]
    fn test_b2b_adds_proportional_penalty() {
        let rules = rules_2025();
        let mut s = scenario(ContributorSize::Micro, 2);
        s.b2b = true;
        let result = compute_penalty(&s, &rules).unwrap();

        assert_eq!(result.fixed_penalty, dec!(500));
        assert_eq!(result.proportional_penalty, dec!(1500));
        assert_eq!(result.total_penalty, dec!(2000));
    }

    #[test]
    fn test_first_light_offense_is_warning_only() {
        let rules = rules_2025();
        let mut s = scenario(ContributorSize::Large, 4);
        s.first_offense = true;
        s.b2b = true;
        let result = compute_penalty(&s, &rules).unwrap();

        assert!(result.warning_only);
        assert_eq!(result.total_penalty, Decimal::ZERO);
        assert!(result.audit_trace.has_warning(FIRST_OFFENSE_WARNING));
    }

    #[test]
    fn test_first_moderate_offense_is_penalized() {
        let rules = rules_2025();
        let mut s = scenario(ContributorSize::Medium, 8);
        s.first_offense = true;
        let result = compute_penalty(&s, &rules).unwrap();

        assert!(!result.warning_only);
        assert_eq!(result.total_penalty, dec!(3750));
    }

    #[test]
    fn test_assess_transmission_chains_steps() {
        let rules = rules_2025();
        let profile = InvoiceProfile {
            contributor_size: ContributorSize::Small,
            first_offense: false,
            b2b: true,
            invoice_value: dec!(2000),
        };
        let result = assess_transmission(
            date(2025, 3, 3),
            date(2025, 3, 17),
            &profile,
            &HolidayCalendar::new(),
            &rules,
        )
        .unwrap();

        assert_eq!(result.deadline.deadline, date(2025, 3, 10));
        assert_eq!(result.delay.delay_business_days, 5);
        assert_eq!(result.penalty.bucket, DelayBucket::Light);
        assert_eq!(result.penalty.total_penalty, dec!(1300));
    }

    #[test]
    fn test_oversized_invoice_value_rejected() {
        let rules = rules_2025();
        let mut s = scenario(ContributorSize::Micro, 2);
        s.b2b = true;
        s.invoice_value = Decimal::MAX;
        assert!(matches!(
            compute_penalty(&s, &rules),
            Err(EngineError::InvalidInput { .. })
        ));
    }
}
