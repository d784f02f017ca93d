//! Rule-set types for fiscal calculations.
//!
//! This module contains the strongly-typed structures deserialized from the
//! yearly YAML rule files, and the validated [`RuleSet`] every engine reads.
//! A [`RuleSetDocument`] is raw parsed data; a [`RuleSet`] is only obtained
//! through [`RuleSet::from_document`], which checks every table once so the
//! engines can rely on exhaustive lookups.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::{
    ContributorSize, DisplacementBracket, DistanceBracket, EmissionClass, MotorcycleBracket,
};

/// Number of dependents columns in a personal-deduction bracket (0..=4+).
pub const DEDUCTION_COLUMNS: usize = 5;

/// One row of the personal-deduction table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeductionBracket {
    /// Highest gross salary (inclusive) this row applies to.
    pub up_to: Decimal,
    /// Deduction for 0, 1, 2, 3 and 4 or more dependents.
    pub amounts: Vec<Decimal>,
}

/// The personal-deduction step function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalDeductionRules {
    /// Brackets in ascending `up_to` order.
    pub brackets: Vec<DeductionBracket>,
}

/// Payroll parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryRules {
    /// Gross monthly minimum wage.
    pub minimum_wage: Decimal,
    /// Employee pension contribution rate.
    pub cas_rate: Decimal,
    /// Employee health contribution rate.
    pub cass_rate: Decimal,
    /// Income tax rate.
    pub income_tax_rate: Decimal,
    /// Employer work-insurance contribution rate.
    pub cam_rate: Decimal,
    /// Additional deduction per enrolled child.
    pub child_deduction: Decimal,
    /// Monthly gross up to which IT salaries are income-tax exempt.
    pub it_threshold: Decimal,
    /// Reduced pension contribution rate for construction and agriculture.
    pub construction_cas_rate: Decimal,
    /// Monthly gross up to which construction salaries are income-tax exempt.
    pub construction_threshold: Decimal,
    /// Personal-deduction table.
    pub personal_deduction: PersonalDeductionRules,
}

/// Self-employment (PFA) parameters. Thresholds are multiples of `minimum_wage`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PfaRules {
    /// Minimum wage used as the threshold base.
    pub minimum_wage: Decimal,
    /// Pension contribution rate.
    pub cas_rate: Decimal,
    /// Health contribution rate.
    pub cass_rate: Decimal,
    /// Income tax rate.
    pub income_tax_rate: Decimal,
    /// Lower CASS base, in minimum wages.
    pub cass_min_threshold_multiplier: Decimal,
    /// Upper CASS base cap, in minimum wages.
    pub cass_max_threshold_multiplier: Decimal,
    /// First mandatory CAS tier, in minimum wages.
    pub cas_obligatory_12_multiplier: Decimal,
    /// Second mandatory CAS tier, in minimum wages.
    pub cas_obligatory_24_multiplier: Decimal,
    /// Annual revenue above which the income norm is no longer available.
    pub income_norm_revenue_ceiling: Decimal,
}

impl PfaRules {
    /// Lower CASS threshold in RON.
    pub fn cass_min_threshold(&self) -> Decimal {
        self.minimum_wage * self.cass_min_threshold_multiplier
    }

    /// Upper CASS threshold in RON.
    pub fn cass_max_threshold(&self) -> Decimal {
        self.minimum_wage * self.cass_max_threshold_multiplier
    }

    /// First mandatory CAS threshold in RON.
    pub fn cas_threshold_12(&self) -> Decimal {
        self.minimum_wage * self.cas_obligatory_12_multiplier
    }

    /// Second mandatory CAS threshold in RON.
    pub fn cas_threshold_24(&self) -> Decimal {
        self.minimum_wage * self.cas_obligatory_24_multiplier
    }
}

/// Micro-company (SRL) parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SrlRules {
    /// Revenue tax rate with at least one employee.
    pub micro_rate_with_employees: Decimal,
    /// Revenue tax rate without employees.
    pub micro_rate_without_employees: Decimal,
    /// Dividend tax rate.
    pub dividend_tax_rate: Decimal,
    /// Health contribution rate on dividends.
    pub dividend_cass_rate: Decimal,
    /// Annual revenue above which the micro regime no longer applies.
    pub micro_revenue_ceiling: Decimal,
}

/// Indemnity parameters for one diagnosis code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SickCodeRule {
    /// Display description.
    pub description: String,
    /// Share of the daily base paid as indemnity.
    pub rate: Decimal,
    /// Maximum payable days per year.
    pub max_days_per_year: u32,
    /// Initial days paid by the employer; the rest is paid by FNUASS.
    pub employer_days: u32,
    /// Whether the minimum contribution tenure applies.
    #[serde(default = "default_requires_tenure")]
    pub requires_tenure: bool,
}

fn default_requires_tenure() -> bool {
    true
}

/// Sick-leave and maternity parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicalLeaveRules {
    /// Minimum months of contributions for eligibility.
    pub minimum_months: u32,
    /// Cap of the monthly base, in minimum wages.
    pub max_base_salaries: Decimal,
    /// Minimum wage used for the base cap.
    pub minimum_wage: Decimal,
    /// Working days per month used to derive the daily base.
    pub working_days_divisor: Decimal,
    /// Months averaged to obtain the monthly base.
    pub averaging_months: u32,
    /// Diagnosis code used for maternity leave.
    pub maternity_code: String,
    /// Mandatory postnatal leave in days.
    pub minimum_postnatal_days: u32,
    /// Diagnosis code table.
    pub sick_codes: HashMap<String, SickCodeRule>,
}

/// Vehicle tax parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarTaxRules {
    /// RON per 200 cm3 fraction by displacement bracket and emission class.
    pub rates: HashMap<DisplacementBracket, HashMap<EmissionClass, Decimal>>,
    /// RON per 200 cm3 fraction for motorcycles and mopeds.
    pub motorcycle_rates: HashMap<MotorcycleBracket, Decimal>,
    /// Fixed annual fee for electric vehicles.
    pub electric_fee: Decimal,
    /// Share of the base tax waived for hybrids.
    pub hybrid_reduction: Decimal,
    /// Per-municipality markup, keyed by lowercase locality name.
    pub locality_coefficients: HashMap<String, Decimal>,
    /// Purchase price above which the luxury surtax applies.
    pub luxury_threshold: Decimal,
    /// Surtax rate on the excess over the luxury threshold.
    pub luxury_rate: Decimal,
}

/// Fixed penalty range for one contributor size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PenaltyRange {
    /// Minimum penalty in RON.
    pub min: Decimal,
    /// Maximum penalty in RON.
    pub max: Decimal,
}

/// The e-invoice penalty grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PenaltyGrid {
    /// Penalty range per contributor size.
    pub ranges: HashMap<ContributorSize, PenaltyRange>,
    /// Largest delay (business days) in the light bucket.
    pub light_max_days: u32,
    /// Largest delay (business days) in the moderate bucket.
    pub moderate_max_days: u32,
    /// Proportional penalty on the invoice value for B2B invoices.
    pub b2b_proportional_rate: Decimal,
    /// Whether a first offense with a light delay gets a warning only.
    pub first_offense_warning: bool,
}

/// E-invoice reporting parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EInvoiceRules {
    /// Business days allowed after the invoice date.
    #[serde(default = "default_working_days_deadline")]
    pub working_days_deadline: u32,
    /// Penalty grid.
    pub penalty_grid: PenaltyGrid,
}

fn default_working_days_deadline() -> u32 {
    5
}

/// EU261 compensation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightRules {
    /// Distances below this are short haul.
    pub short_haul_max_km: f64,
    /// Distances up to this are medium haul.
    pub medium_haul_max_km: f64,
    /// Minimum arrival delay for compensation, in hours.
    pub eligibility_delay_hours: f64,
    /// Compensation in EUR per bracket.
    pub compensation_by_bracket: HashMap<DistanceBracket, Decimal>,
    /// Delay (hours) below which the amount is halved, per bracket.
    pub reduction_thresholds: HashMap<DistanceBracket, f64>,
}

/// A yearly rule file as parsed, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSetDocument {
    /// Fiscal year the parameters apply to.
    pub year: i32,
    /// Payroll parameters.
    pub salary: SalaryRules,
    /// Self-employment parameters.
    pub pfa: PfaRules,
    /// Micro-company parameters.
    pub srl: SrlRules,
    /// Sick-leave parameters.
    pub medical_leave: MedicalLeaveRules,
    /// Vehicle tax parameters.
    pub car_tax: CarTaxRules,
    /// E-invoice parameters.
    pub e_invoice: EInvoiceRules,
    /// Flight compensation parameters.
    pub flight: FlightRules,
}

/// A validated, immutable set of fiscal parameters for one year.
///
/// # Example
///
/// ```no_run
/// use fiscal_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config").unwrap();
/// let rules = loader.rule_set(2025).unwrap();
/// assert_eq!(rules.year(), 2025);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSet {
    document: RuleSetDocument,
}

impl RuleSet {
    /// Validates a parsed document and wraps it.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidRuleSet`] naming the first failed check.
    pub fn from_document(document: RuleSetDocument) -> EngineResult<Self> {
        document.salary.validate()?;
        document.pfa.validate()?;
        document.srl.validate()?;
        document.medical_leave.validate()?;
        document.car_tax.validate()?;
        document.e_invoice.validate()?;
        document.flight.validate()?;
        Ok(Self { document })
    }

    /// Returns the underlying document, e.g. to derive a variant.
    pub fn into_document(self) -> RuleSetDocument {
        self.document
    }

    /// Returns the fiscal year.
    pub fn year(&self) -> i32 {
        self.document.year
    }

    /// Returns the payroll parameters.
    pub fn salary(&self) -> &SalaryRules {
        &self.document.salary
    }

    /// Returns the self-employment parameters.
    pub fn pfa(&self) -> &PfaRules {
        &self.document.pfa
    }

    /// Returns the micro-company parameters.
    pub fn srl(&self) -> &SrlRules {
        &self.document.srl
    }

    /// Returns the sick-leave parameters.
    pub fn medical_leave(&self) -> &MedicalLeaveRules {
        &self.document.medical_leave
    }

    /// Returns the vehicle tax parameters.
    pub fn car_tax(&self) -> &CarTaxRules {
        &self.document.car_tax
    }

    /// Returns the e-invoice parameters.
    pub fn e_invoice(&self) -> &EInvoiceRules {
        &self.document.e_invoice
    }

    /// Returns the flight compensation parameters.
    pub fn flight(&self) -> &FlightRules {
        &self.document.flight
    }
}

fn check_non_negative(name: &str, value: Decimal) -> EngineResult<()> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(EngineError::invalid_rules(format!(
            "{} must not be negative, got {}",
            name, value
        )));
    }
    Ok(())
}

fn check_rate(name: &str, value: Decimal) -> EngineResult<()> {
    check_non_negative(name, value)?;
    if value > Decimal::ONE {
        return Err(EngineError::invalid_rules(format!(
            "{} must be between 0 and 1, got {}",
            name, value
        )));
    }
    Ok(())
}

fn check_positive(name: &str, value: Decimal) -> EngineResult<()> {
    if value <= Decimal::ZERO {
        return Err(EngineError::invalid_rules(format!(
            "{} must be positive, got {}",
            name, value
        )));
    }
    Ok(())
}

impl SalaryRules {
    fn validate(&self) -> EngineResult<()> {
        check_positive("salary.minimum_wage", self.minimum_wage)?;
        check_rate("salary.cas_rate", self.cas_rate)?;
        check_rate("salary.cass_rate", self.cass_rate)?;
        check_rate("salary.income_tax_rate", self.income_tax_rate)?;
        check_rate("salary.cam_rate", self.cam_rate)?;
        check_rate("salary.construction_cas_rate", self.construction_cas_rate)?;
        check_non_negative("salary.child_deduction", self.child_deduction)?;
        check_non_negative("salary.it_threshold", self.it_threshold)?;
        check_non_negative("salary.construction_threshold", self.construction_threshold)?;
        if self.cas_rate + self.cass_rate > Decimal::ONE {
            return Err(EngineError::invalid_rules(
                "salary.cas_rate + salary.cass_rate must not exceed 1",
            ));
        }

        let mut previous: Option<Decimal> = None;
        for (index, bracket) in self.personal_deduction.brackets.iter().enumerate() {
            if bracket.amounts.len() != DEDUCTION_COLUMNS {
                return Err(EngineError::invalid_rules(format!(
                    "personal_deduction bracket {} must have {} amounts, got {}",
                    index,
                    DEDUCTION_COLUMNS,
                    bracket.amounts.len()
                )));
            }
            for amount in &bracket.amounts {
                check_non_negative("personal_deduction amount", *amount)?;
            }
            if previous.is_some_and(|p| bracket.up_to <= p) {
                return Err(EngineError::invalid_rules(format!(
                    "personal_deduction brackets must be strictly ascending (bracket {} up_to {})",
                    index, bracket.up_to
                )));
            }
            previous = Some(bracket.up_to);
        }
        Ok(())
    }
}

impl PfaRules {
    fn validate(&self) -> EngineResult<()> {
        check_positive("pfa.minimum_wage", self.minimum_wage)?;
        check_rate("pfa.cas_rate", self.cas_rate)?;
        check_rate("pfa.cass_rate", self.cass_rate)?;
        check_rate("pfa.income_tax_rate", self.income_tax_rate)?;
        check_non_negative("pfa.income_norm_revenue_ceiling", self.income_norm_revenue_ceiling)?;
        if self.cass_min_threshold_multiplier >= self.cass_max_threshold_multiplier {
            return Err(EngineError::invalid_rules(
                "pfa.cass_min_threshold_multiplier must be below cass_max_threshold_multiplier",
            ));
        }
        if self.cas_obligatory_12_multiplier >= self.cas_obligatory_24_multiplier {
            return Err(EngineError::invalid_rules(
                "pfa.cas_obligatory_12_multiplier must be below cas_obligatory_24_multiplier",
            ));
        }
        check_non_negative(
            "pfa.cass_min_threshold_multiplier",
            self.cass_min_threshold_multiplier,
        )?;
        check_non_negative(
            "pfa.cas_obligatory_12_multiplier",
            self.cas_obligatory_12_multiplier,
        )
    }
}

impl SrlRules {
    fn validate(&self) -> EngineResult<()> {
        check_rate("srl.micro_rate_with_employees", self.micro_rate_with_employees)?;
        check_rate(
            "srl.micro_rate_without_employees",
            self.micro_rate_without_employees,
        )?;
        check_rate("srl.dividend_tax_rate", self.dividend_tax_rate)?;
        check_rate("srl.dividend_cass_rate", self.dividend_cass_rate)?;
        check_non_negative("srl.micro_revenue_ceiling", self.micro_revenue_ceiling)
    }
}

impl MedicalLeaveRules {
    fn validate(&self) -> EngineResult<()> {
        check_positive("medical_leave.minimum_wage", self.minimum_wage)?;
        check_positive("medical_leave.working_days_divisor", self.working_days_divisor)?;
        check_positive("medical_leave.max_base_salaries", self.max_base_salaries)?;
        if self.averaging_months == 0 {
            return Err(EngineError::invalid_rules(
                "medical_leave.averaging_months must be at least 1",
            ));
        }
        for (code, rule) in &self.sick_codes {
            check_rate(&format!("medical_leave.sick_codes.{}.rate", code), rule.rate)?;
        }
        if !self.sick_codes.contains_key(&self.maternity_code) {
            return Err(EngineError::invalid_rules(format!(
                "medical_leave.maternity_code '{}' is missing from sick_codes",
                self.maternity_code
            )));
        }
        Ok(())
    }
}

impl CarTaxRules {
    fn validate(&self) -> EngineResult<()> {
        for bracket in DisplacementBracket::ALL {
            let row = self.rates.get(&bracket).ok_or_else(|| {
                EngineError::invalid_rules(format!("car_tax.rates is missing {:?}", bracket))
            })?;
            for class in EmissionClass::ALL {
                let rate = row.get(&class).ok_or_else(|| {
                    EngineError::invalid_rules(format!(
                        "car_tax.rates.{:?} is missing {:?}",
                        bracket, class
                    ))
                })?;
                check_non_negative("car_tax rate", *rate)?;
            }
        }
        for bracket in MotorcycleBracket::ALL {
            let rate = self.motorcycle_rates.get(&bracket).ok_or_else(|| {
                EngineError::invalid_rules(format!(
                    "car_tax.motorcycle_rates is missing {:?}",
                    bracket
                ))
            })?;
            check_non_negative("car_tax motorcycle rate", *rate)?;
        }
        for (locality, coefficient) in &self.locality_coefficients {
            check_positive(
                &format!("car_tax.locality_coefficients.{}", locality),
                *coefficient,
            )?;
        }
        check_non_negative("car_tax.electric_fee", self.electric_fee)?;
        check_rate("car_tax.hybrid_reduction", self.hybrid_reduction)?;
        check_non_negative("car_tax.luxury_threshold", self.luxury_threshold)?;
        check_rate("car_tax.luxury_rate", self.luxury_rate)
    }
}

impl EInvoiceRules {
    fn validate(&self) -> EngineResult<()> {
        if self.working_days_deadline == 0 {
            return Err(EngineError::invalid_rules(
                "e_invoice.working_days_deadline must be at least 1",
            ));
        }
        let grid = &self.penalty_grid;
        for size in ContributorSize::ALL {
            let range = grid.ranges.get(&size).ok_or_else(|| {
                EngineError::invalid_rules(format!(
                    "e_invoice.penalty_grid.ranges is missing {:?}",
                    size
                ))
            })?;
            check_non_negative("e_invoice penalty min", range.min)?;
            if range.min > range.max {
                return Err(EngineError::invalid_rules(format!(
                    "e_invoice penalty range for {:?} has min {} above max {}",
                    size, range.min, range.max
                )));
            }
        }
        if grid.light_max_days >= grid.moderate_max_days {
            return Err(EngineError::invalid_rules(
                "e_invoice.penalty_grid.light_max_days must be below moderate_max_days",
            ));
        }
        check_rate(
            "e_invoice.penalty_grid.b2b_proportional_rate",
            grid.b2b_proportional_rate,
        )
    }
}

impl FlightRules {
    fn validate(&self) -> EngineResult<()> {
        let limits_valid = self.short_haul_max_km.is_finite()
            && self.medium_haul_max_km.is_finite()
            && self.short_haul_max_km > 0.0
            && self.short_haul_max_km < self.medium_haul_max_km;
        if !limits_valid {
            return Err(EngineError::invalid_rules(
                "flight haul limits must be finite, positive and ascending",
            ));
        }
        if !(self.eligibility_delay_hours.is_finite() && self.eligibility_delay_hours >= 0.0) {
            return Err(EngineError::invalid_rules(
                "flight.eligibility_delay_hours must be finite and non-negative",
            ));
        }
        for bracket in DistanceBracket::ALL {
            let amount = self.compensation_by_bracket.get(&bracket).ok_or_else(|| {
                EngineError::invalid_rules(format!(
                    "flight.compensation_by_bracket is missing {:?}",
                    bracket
                ))
            })?;
            check_non_negative("flight compensation", *amount)?;
            let threshold = self.reduction_thresholds.get(&bracket).ok_or_else(|| {
                EngineError::invalid_rules(format!(
                    "flight.reduction_thresholds is missing {:?}",
                    bracket
                ))
            })?;
            if !(threshold.is_finite() && *threshold >= 0.0) {
                return Err(EngineError::invalid_rules(format!(
                    "flight.reduction_thresholds.{:?} must be finite and non-negative",
                    bracket
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigLoader;
    use rust_decimal_macros::dec;

    fn document() -> RuleSetDocument {
        ConfigLoader::load("./config")
            .unwrap()
            .rule_set(2025)
            .unwrap()
            .clone()
            .into_document()
    }

    #[test]
    fn test_shipped_document_validates() {
        assert!(RuleSet::from_document(document()).is_ok());
    }

    #[test]
    fn test_rate_above_one_is_rejected() {
        let mut doc = document();
        doc.salary.cas_rate = dec!(1.5);
        let err = RuleSet::from_document(doc).unwrap_err();
        assert!(err.to_string().contains("salary.cas_rate"));
    }

    #[test]
    fn test_negative_rate_is_rejected() {
        let mut doc = document();
        doc.srl.dividend_tax_rate = dec!(-0.1);
        assert!(matches!(
            RuleSet::from_document(doc),
            Err(EngineError::InvalidRuleSet { .. })
        ));
    }

    #[test]
    fn test_unordered_deduction_brackets_are_rejected() {
        let mut doc = document();
        doc.salary.personal_deduction.brackets.swap(0, 1);
        let err = RuleSet::from_document(doc).unwrap_err();
        assert!(err.to_string().contains("strictly ascending"));
    }

    #[test]
    fn test_short_deduction_row_is_rejected() {
        let mut doc = document();
        doc.salary.personal_deduction.brackets[0].amounts.pop();
        assert!(RuleSet::from_document(doc).is_err());
    }

    #[test]
    fn test_missing_car_tax_cell_is_rejected() {
        let mut doc = document();
        doc.car_tax
            .rates
            .get_mut(&DisplacementBracket::Over3000)
            .unwrap()
            .remove(&EmissionClass::Euro6);
        let err = RuleSet::from_document(doc).unwrap_err();
        assert!(err.to_string().contains("Over3000"));
    }

    #[test]
    fn test_missing_penalty_range_is_rejected() {
        let mut doc = document();
        doc.e_invoice
            .penalty_grid
            .ranges
            .remove(&ContributorSize::Micro);
        assert!(RuleSet::from_document(doc).is_err());
    }

    #[test]
    fn test_inverted_penalty_range_is_rejected() {
        let mut doc = document();
        doc.e_invoice.penalty_grid.ranges.insert(
            ContributorSize::Large,
            PenaltyRange {
                min: dec!(10000),
                max: dec!(5000),
            },
        );
        assert!(RuleSet::from_document(doc).is_err());
    }

    #[test]
    fn test_zero_deadline_days_is_rejected() {
        let mut doc = document();
        doc.e_invoice.working_days_deadline = 0;
        let err = RuleSet::from_document(doc).unwrap_err();
        assert!(matches!(err, EngineError::InvalidRuleSet { .. }));
        assert!(err.to_string().contains("working_days_deadline"));
    }

    #[test]
    fn test_missing_maternity_code_is_rejected() {
        let mut doc = document();
        doc.medical_leave.maternity_code = "99".to_string();
        let err = RuleSet::from_document(doc).unwrap_err();
        assert!(err.to_string().contains("maternity_code"));
    }

    #[test]
    fn test_unordered_cass_thresholds_are_rejected() {
        let mut doc = document();
        doc.pfa.cass_min_threshold_multiplier = dec!(60);
        assert!(RuleSet::from_document(doc).is_err());
    }

    #[test]
    fn test_missing_flight_bracket_is_rejected() {
        let mut doc = document();
        doc.flight
            .reduction_thresholds
            .remove(&DistanceBracket::LongHaul);
        assert!(RuleSet::from_document(doc).is_err());
    }

    #[test]
    fn test_pfa_thresholds_scale_with_minimum_wage() {
        let doc = document();
        assert_eq!(doc.pfa.cass_min_threshold(), dec!(24300));
        assert_eq!(doc.pfa.cass_max_threshold(), dec!(243000));
        assert_eq!(doc.pfa.cas_threshold_12(), dec!(48600));
        assert_eq!(doc.pfa.cas_threshold_24(), dec!(97200));
    }
}
