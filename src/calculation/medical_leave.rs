//! Sick-leave and maternity indemnity calculation.
//!
//! The indemnity for a diagnosis code is a share of the daily base salary,
//! paid for a capped number of days per year. The first days are paid by
//! the employer and the remainder by the national health-insurance fund
//! (FNUASS); both parts are reported separately because they are invoiced
//! to different payers.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use crate::config::{MedicalLeaveRules, RuleSet, SickCodeRule};
use crate::error::{EngineError, EngineResult};
use crate::models::{AuditTrace, AuditWarning};

use super::rounding::round_money;
use super::validation::ensure_non_negative;

/// Warning code raised when postnatal leave is shorter than the legal minimum.
pub const POSTNATAL_MINIMUM: &str = "POSTNATAL_MINIMUM";

/// Warning code raised when requested days exceed the yearly maximum.
pub const DAYS_CAPPED: &str = "DAYS_CAPPED";

/// Contribution-tenure check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityResult {
    /// Whether the tenure requirement is met.
    pub eligible: bool,
    /// Months of contributions supplied.
    pub months_contributed: u32,
    /// Months required.
    pub minimum_months: u32,
    /// Months still missing; zero when eligible.
    pub shortfall_months: u32,
}

/// Sick-leave indemnity with the employer and FNUASS shares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicalLeaveResult {
    /// Diagnosis code.
    pub sick_code: String,
    /// Diagnosis description.
    pub description: String,
    /// Tenure check; always eligible for codes without a tenure requirement.
    pub eligibility: EligibilityResult,
    /// Days on the medical certificate.
    pub requested_days: u32,
    /// Days that carry an indemnity.
    pub payable_days: u32,
    /// Requested days beyond the yearly maximum.
    pub unpaid_days: u32,
    /// Monthly base after the cap.
    pub monthly_base: Decimal,
    /// Whether the base salary was capped.
    pub base_capped: bool,
    /// Monthly base divided by the working-day divisor.
    pub daily_base: Decimal,
    /// Indemnity rate for the code.
    pub rate: Decimal,
    /// Indemnity per payable day.
    pub daily_indemnity: Decimal,
    /// Days paid by the employer.
    pub employer_days: u32,
    /// Amount paid by the employer.
    pub employer_amount: Decimal,
    /// Days paid by FNUASS.
    pub fnuass_days: u32,
    /// Amount paid by FNUASS.
    pub fnuass_amount: Decimal,
    /// Employer plus FNUASS amounts.
    pub total_amount: Decimal,
    /// Audit trace of the calculation.
    pub audit_trace: AuditTrace,
}

/// Prenatal and postnatal leave computed with the maternity code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaternityResult {
    /// Prenatal leave.
    pub prenatal: MedicalLeaveResult,
    /// Postnatal leave.
    pub postnatal: MedicalLeaveResult,
    /// Payable days across both periods.
    pub total_days: u32,
    /// Indemnity across both periods.
    pub total_amount: Decimal,
    /// Warnings raised for the combined leave.
    pub warnings: Vec<AuditWarning>,
}

/// Checks the minimum contribution tenure.
///
/// # Examples
///
/// ```no_run
/// use fiscal_engine::calculation::check_eligibility;
/// use fiscal_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("config").unwrap();
/// let rules = loader.rule_set(2025).unwrap();
///
/// let result = check_eligibility(4, rules);
/// assert!(!result.eligible);
/// assert_eq!(result.shortfall_months, 2);
/// ```
pub fn check_eligibility(months_contributed: u32, rules: &RuleSet) -> EligibilityResult {
    let minimum_months = rules.medical_leave().minimum_months;
    EligibilityResult {
        eligible: months_contributed >= minimum_months,
        months_contributed,
        minimum_months,
        shortfall_months: minimum_months.saturating_sub(months_contributed),
    }
}

/// Averages the most recent monthly gross salaries into a monthly base.
///
/// `monthly_gross` is in chronological order; only the last
/// `averaging_months` entries are used. Fewer entries are averaged as given.
pub fn average_base_salary(monthly_gross: &[Decimal], rules: &RuleSet) -> EngineResult<Decimal> {
    if monthly_gross.is_empty() {
        return Err(EngineError::invalid_input(
            "monthly_gross",
            "at least one month is required",
        ));
    }
    for amount in monthly_gross {
        ensure_non_negative("monthly_gross", *amount)?;
    }

    let months = rules.medical_leave().averaging_months as usize;
    let recent = &monthly_gross[monthly_gross.len().saturating_sub(months)..];
    let total: Decimal = recent.iter().copied().sum();
    Ok(round_money(total / Decimal::from(recent.len())))
}

fn lookup_code<'a>(code: &str, rules: &'a MedicalLeaveRules) -> EngineResult<&'a SickCodeRule> {
    rules.sick_codes.get(code).ok_or_else(|| {
        EngineError::invalid_input("sick_code", format!("unknown diagnosis code '{}'", code))
    })
}

fn indemnity(
    code: &str,
    code_rule: &SickCodeRule,
    days: u32,
    eligibility: EligibilityResult,
    base_salary: Decimal,
    rules: &MedicalLeaveRules,
) -> MedicalLeaveResult {
    let mut trace = AuditTrace::default();

    trace.record(
        "medical_leave_eligibility",
        "Contribution Tenure",
        "OUG 158/2005 art. 7",
        json!({
            "sick_code": code,
            "months_contributed": eligibility.months_contributed,
            "requires_tenure": code_rule.requires_tenure,
        }),
        json!({
            "eligible": eligibility.eligible,
            "shortfall_months": eligibility.shortfall_months,
        }),
        if !code_rule.requires_tenure {
            format!("Code {} does not require a contribution tenure", code)
        } else if eligibility.eligible {
            format!(
                "{} months contributed meets the minimum of {}",
                eligibility.months_contributed, eligibility.minimum_months
            )
        } else {
            format!(
                "{} months contributed, {} short of the minimum",
                eligibility.months_contributed, eligibility.shortfall_months
            )
        },
    );

    let cap = rules.max_base_salaries * rules.minimum_wage;
    let monthly_base = base_salary.min(cap);
    let base_capped = base_salary > cap;
    let daily_base_exact = monthly_base / rules.working_days_divisor;
    let daily_base = round_money(daily_base_exact);
    let daily_indemnity = round_money(daily_base_exact * code_rule.rate);

    trace.record(
        "medical_leave_daily_base",
        "Daily Indemnity",
        "OUG 158/2005 art. 10",
        json!({
            "base_salary": base_salary.normalize().to_string(),
            "cap": cap.normalize().to_string(),
            "working_days_divisor": rules.working_days_divisor.normalize().to_string(),
            "rate": code_rule.rate.normalize().to_string(),
        }),
        json!({
            "monthly_base": monthly_base.normalize().to_string(),
            "daily_base": daily_base.normalize().to_string(),
            "daily_indemnity": daily_indemnity.normalize().to_string(),
        }),
        format!(
            "min({}, {}) / {} × {} = {} per day",
            base_salary.normalize(),
            cap.normalize(),
            rules.working_days_divisor.normalize(),
            code_rule.rate.normalize(),
            daily_indemnity.normalize()
        ),
    );

    let (payable_days, unpaid_days) = if eligibility.eligible {
        let payable = days.min(code_rule.max_days_per_year);
        (payable, days - payable)
    } else {
        (0, days)
    };
    if eligibility.eligible && unpaid_days > 0 {
        trace.warnings.push(AuditWarning::new(
            DAYS_CAPPED,
            format!(
                "{} days exceed the yearly maximum of {} for code {}",
                unpaid_days, code_rule.max_days_per_year, code
            ),
            "medium",
        ));
    }

    let employer_days = payable_days.min(code_rule.employer_days);
    let fnuass_days = payable_days - employer_days;
    let employer_amount = daily_indemnity * Decimal::from(employer_days);
    let fnuass_amount = daily_indemnity * Decimal::from(fnuass_days);
    let total_amount = employer_amount + fnuass_amount;

    trace.record(
        "medical_leave_split",
        "Employer and FNUASS Split",
        "OUG 158/2005 art. 12",
        json!({
            "requested_days": days,
            "max_days_per_year": code_rule.max_days_per_year,
            "employer_days_rule": code_rule.employer_days,
        }),
        json!({
            "payable_days": payable_days,
            "employer_days": employer_days,
            "employer_amount": employer_amount.normalize().to_string(),
            "fnuass_days": fnuass_days,
            "fnuass_amount": fnuass_amount.normalize().to_string(),
        }),
        format!(
            "Employer pays {} days ({}), FNUASS pays {} days ({})",
            employer_days,
            employer_amount.normalize(),
            fnuass_days,
            fnuass_amount.normalize()
        ),
    );

    MedicalLeaveResult {
        sick_code: code.to_string(),
        description: code_rule.description.clone(),
        eligibility,
        requested_days: days,
        payable_days,
        unpaid_days,
        monthly_base,
        base_capped,
        daily_base,
        rate: code_rule.rate,
        daily_indemnity,
        employer_days,
        employer_amount,
        fnuass_days,
        fnuass_amount,
        total_amount,
        audit_trace: trace,
    }
}

/// Computes the sick-leave indemnity for one medical certificate.
///
/// A contributor below the tenure minimum gets a result with zero payable
/// days and the shortfall, not an error.
///
/// # Errors
///
/// Returns `InvalidInput` for an unknown diagnosis code or a negative base.
///
/// # Examples
///
/// ```no_run
/// use fiscal_engine::calculation::compute_medical_leave;
/// use fiscal_engine::config::ConfigLoader;
/// use rust_decimal_macros::dec;
///
/// let loader = ConfigLoader::load("config").unwrap();
/// let rules = loader.rule_set(2025).unwrap();
///
/// let result = compute_medical_leave("01", 10, 12, dec!(5000), rules).unwrap();
/// assert_eq!(result.employer_days, 5);
/// assert_eq!(result.fnuass_days, 5);
/// assert_eq!(result.total_amount, dec!(1771.40));
/// ```
pub fn compute(
    sick_code: &str,
    days: u32,
    months_contributed: u32,
    base_salary: Decimal,
    rules: &RuleSet,
) -> EngineResult<MedicalLeaveResult> {
    ensure_non_negative("base_salary", base_salary)?;
    let leave = rules.medical_leave();
    let code = sick_code.trim();
    let code_rule = lookup_code(code, leave)?;

    let mut eligibility = check_eligibility(months_contributed, rules);
    if !code_rule.requires_tenure {
        eligibility.eligible = true;
        eligibility.shortfall_months = 0;
    }

    let result = indemnity(code, code_rule, days, eligibility, base_salary, leave);

    debug!(
        sick_code = code,
        days,
        payable_days = result.payable_days,
        employer_amount = %result.employer_amount,
        fnuass_amount = %result.fnuass_amount,
        "Computed medical leave"
    );

    Ok(result)
}

/// Computes maternity leave as two applications of the maternity code.
///
/// The tenure check is not applied.
pub fn compute_maternity(
    base_salary: Decimal,
    prenatal_days: u32,
    postnatal_days: u32,
    rules: &RuleSet,
) -> EngineResult<MaternityResult> {
    ensure_non_negative("base_salary", base_salary)?;
    let leave = rules.medical_leave();
    let code = leave.maternity_code.as_str();
    let code_rule = lookup_code(code, leave)?;

    let eligibility = EligibilityResult {
        eligible: true,
        months_contributed: 0,
        minimum_months: 0,
        shortfall_months: 0,
    };
    let prenatal = indemnity(code, code_rule, prenatal_days, eligibility, base_salary, leave);
    let postnatal = indemnity(code, code_rule, postnatal_days, eligibility, base_salary, leave);

    let mut warnings = Vec::new();
    if postnatal_days < leave.minimum_postnatal_days {
        warn!(
            postnatal_days,
            minimum = leave.minimum_postnatal_days,
            "Postnatal leave below the legal minimum"
        );
        warnings.push(AuditWarning::new(
            POSTNATAL_MINIMUM,
            format!(
                "Postnatal leave of {} days is below the mandatory {} days",
                postnatal_days, leave.minimum_postnatal_days
            ),
            "high",
        ));
    }

    let total_days = prenatal.payable_days + postnatal.payable_days;
    let total_amount = prenatal.total_amount + postnatal.total_amount;

    debug!(total_days, total_amount = %total_amount, "Computed maternity leave");

    Ok(MaternityResult {
        prenatal,
        postnatal,
        total_days,
        total_amount,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigLoader;
    use rust_decimal_macros::dec;

    fn rules_2025() -> RuleSet {
        ConfigLoader::load("./config")
            .unwrap()
            .rule_set(2025)
            .unwrap()
            .clone()
    }

    #[test]
    fn test_eligibility_shortfall() {
        let rules = rules_2025();
        let result = check_eligibility(4, &rules);
        assert!(!result.eligible);
        assert_eq!(result.shortfall_months, 2);

        let result = check_eligibility(6, &rules);
        assert!(result.eligible);
        assert_eq!(result.shortfall_months, 0);
    }

    #[test]
    fn test_common_illness_split() {
        let rules = rules_2025();
        let result = compute("01", 10, 12, dec!(5000), &rules).unwrap();

        assert_eq!(result.daily_base, dec!(236.18));
        assert_eq!(result.daily_indemnity, dec!(177.14));
        assert_eq!(result.employer_days, 5);
        assert_eq!(result.employer_amount, dec!(885.70));
        assert_eq!(result.fnuass_days, 5);
        assert_eq!(result.fnuass_amount, dec!(885.70));
        assert_eq!(result.total_amount, dec!(1771.40));
        assert_eq!(result.audit_trace.steps.len(), 3);
    }

    #[test]
    fn test_short_leave_is_employer_only() {
        let rules = rules_2025();
        let result = compute("01", 3, 12, dec!(5000), &rules).unwrap();

        assert_eq!(result.employer_days, 3);
        assert_eq!(result.fnuass_days, 0);
        assert_eq!(result.fnuass_amount, Decimal::ZERO);
    }

    #[test]
    fn test_base_salary_is_capped() {
        let rules = rules_2025();
        let result = compute("01", 1, 12, dec!(60000), &rules).unwrap();

        assert!(result.base_capped);
        assert_eq!(result.monthly_base, dec!(48600));
        assert_eq!(result.daily_indemnity, dec!(1721.78));
    }

    #[test]
    fn test_days_capped_at_yearly_maximum() {
        let rules = rules_2025();
        let result = compute("09", 50, 12, dec!(5000), &rules).unwrap();

        assert_eq!(result.payable_days, 45);
        assert_eq!(result.unpaid_days, 5);
        assert!(result.audit_trace.has_warning(DAYS_CAPPED));
    }

    #[test]
    fn test_not_eligible_pays_nothing() {
        let rules = rules_2025();
        let result = compute("01", 10, 3, dec!(5000), &rules).unwrap();

        assert!(!result.eligibility.eligible);
        assert_eq!(result.eligibility.shortfall_months, 3);
        assert_eq!(result.payable_days, 0);
        assert_eq!(result.total_amount, Decimal::ZERO);
    }

    #[test]
    fn test_emergency_code_skips_tenure() {
        let rules = rules_2025();
        let result = compute("06", 4, 0, dec!(5000), &rules).unwrap();

        assert!(result.eligibility.eligible);
        assert_eq!(result.rate, dec!(1));
        assert_eq!(result.employer_days, 0);
        assert_eq!(result.fnuass_days, 4);
    }

    #[test]
    fn test_unknown_code_is_invalid_input() {
        let rules = rules_2025();
        match compute("99", 5, 12, dec!(5000), &rules) {
            Err(EngineError::InvalidInput { field, .. }) => assert_eq!(field, "sick_code"),
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_maternity_sums_both_periods() {
        let rules = rules_2025();
        let result = compute_maternity(dec!(5000), 63, 63, &rules).unwrap();

        assert_eq!(result.prenatal.daily_indemnity, dec!(200.76));
        assert_eq!(result.prenatal.total_amount, dec!(12647.88));
        assert_eq!(result.total_days, 126);
        assert_eq!(result.total_amount, dec!(25295.76));
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_maternity_short_postnatal_warns() {
        let rules = rules_2025();
        let result = compute_maternity(dec!(5000), 96, 30, &rules).unwrap();

        assert!(result.warnings.iter().any(|w| w.code == POSTNATAL_MINIMUM));
    }

    #[test]
    fn test_average_base_uses_last_months() {
        let rules = rules_2025();
        let history = [
            dec!(1000),
            dec!(1000),
            dec!(4000),
            dec!(5000),
            dec!(5000),
            dec!(5000),
            dec!(6000),
            dec!(6000),
        ];
        // Last six: 4000 + 3 × 5000 + 2 × 6000 = 31000
        assert_eq!(average_base_salary(&history, &rules).unwrap(), dec!(5166.67));
        assert_eq!(
            average_base_salary(&[dec!(3000), dec!(4000)], &rules).unwrap(),
            dec!(3500)
        );
        assert!(average_base_salary(&[], &rules).is_err());
    }

    #[test]
    fn test_oversized_base_rejected() {
        let rules = rules_2025();
        assert!(matches!(
            compute("01", 10, 12, Decimal::MAX, &rules),
            Err(EngineError::InvalidInput { .. })
        ));
        assert!(compute_maternity(Decimal::MAX, 63, 63, &rules).is_err());
        assert!(average_base_salary(&[Decimal::MAX], &rules).is_err());
    }
}
