//! Self-employment (PFA) tax calculation.
//!
//! This module computes annual contributions and income tax for an
//! authorized self-employed person under the real system (actual income
//! minus expenses) and under the income norm (a fixed presumed income),
//! and ranks the two.
//!
//! Contribution bases are tiered in multiples of the minimum wage:
//! - CASS: the net income, floored at 6 and capped at 60 minimum wages
//!   (below the floor the contribution can be waived)
//! - CAS: 12 minimum wages once net income reaches that level, 24 minimum
//!   wages from the second tier (optional below 12)

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use crate::ENGINE_VERSION;
use crate::config::{PfaRules, RuleSet};
use crate::error::EngineResult;
use crate::models::{AuditTrace, AuditWarning, CalculationResult, Component, Regime};

use super::rounding::{percent_of, round_money};
use super::validation::ensure_non_negative;

/// Warning code raised when revenue exceeds the income-norm ceiling.
pub const NORM_CEILING_EXCEEDED: &str = "NORM_CEILING_EXCEEDED";

/// Optional contribution elections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PfaOptions {
    /// Waive CASS when the base is below the lower threshold.
    pub opt_out_cass: bool,
    /// Pay CAS at the first tier even below the threshold.
    pub opt_in_cas: bool,
}

/// The two PFA taxation variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PfaVariant {
    /// Actual income minus deductible expenses.
    RealSystem,
    /// Fixed presumed income.
    IncomeNorm,
}

/// Both PFA variants side by side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PfaComparison {
    /// Real-system result.
    pub real_system: CalculationResult,
    /// Income-norm result.
    pub income_norm: CalculationResult,
    /// The variant with the higher net (real system on ties).
    pub better: PfaVariant,
    /// Difference between the two nets.
    pub absolute_savings: Decimal,
    /// Savings as a percentage of the worse net; `None` when that net is zero.
    pub relative_savings: Option<Decimal>,
}

impl PfaComparison {
    /// Returns the result of the better variant.
    pub fn best(&self) -> &CalculationResult {
        match self.better {
            PfaVariant::RealSystem => &self.real_system,
            PfaVariant::IncomeNorm => &self.income_norm,
        }
    }
}

/// Returns the CASS base for an annual contribution base.
pub fn cass_base(base: Decimal, options: &PfaOptions, rules: &PfaRules) -> Decimal {
    let lower = rules.cass_min_threshold();
    let upper = rules.cass_max_threshold();
    if base < lower {
        if options.opt_out_cass {
            Decimal::ZERO
        } else {
            lower
        }
    } else if base > upper {
        upper
    } else {
        base
    }
}

/// Returns the CAS base for an annual contribution base.
pub fn cas_base(base: Decimal, options: &PfaOptions, rules: &PfaRules) -> Decimal {
    let tier_12 = rules.cas_threshold_12();
    let tier_24 = rules.cas_threshold_24();
    if base >= tier_24 {
        tier_24
    } else if base >= tier_12 || options.opt_in_cas {
        tier_12
    } else {
        Decimal::ZERO
    }
}

struct Contributions {
    cas_base: Decimal,
    cas: Decimal,
    cass_base: Decimal,
    cass: Decimal,
    taxable: Decimal,
    income_tax: Decimal,
}

fn contributions(base: Decimal, options: &PfaOptions, rules: &PfaRules) -> Contributions {
    let cas_base = cas_base(base, options, rules);
    let cass_base = cass_base(base, options, rules);
    let cas = round_money(cas_base * rules.cas_rate);
    let cass = round_money(cass_base * rules.cass_rate);
    let taxable = (base - cas - cass).max(Decimal::ZERO);
    let income_tax = round_money(taxable * rules.income_tax_rate);

    Contributions {
        cas_base,
        cas,
        cass_base,
        cass,
        taxable,
        income_tax,
    }
}

fn build_result(
    regime: Regime,
    income: Decimal,
    expenses: Decimal,
    base: Decimal,
    c: &Contributions,
    mut trace: AuditTrace,
    rules: &RuleSet,
) -> CalculationResult {
    let pfa = rules.pfa();

    trace.record(
        "pfa_cass",
        "Health Contribution (CASS)",
        "Codul fiscal art. 170",
        json!({
            "base": base.normalize().to_string(),
            "lower_threshold": pfa.cass_min_threshold().normalize().to_string(),
            "upper_threshold": pfa.cass_max_threshold().normalize().to_string(),
        }),
        json!({
            "cass_base": c.cass_base.normalize().to_string(),
            "cass": c.cass.normalize().to_string(),
        }),
        format!(
            "CASS base {} × {} = {}",
            c.cass_base.normalize(),
            pfa.cass_rate.normalize(),
            c.cass.normalize()
        ),
    );

    trace.record(
        "pfa_cas",
        "Pension Contribution (CAS)",
        "Codul fiscal art. 148",
        json!({
            "base": base.normalize().to_string(),
            "tier_12": pfa.cas_threshold_12().normalize().to_string(),
            "tier_24": pfa.cas_threshold_24().normalize().to_string(),
        }),
        json!({
            "cas_base": c.cas_base.normalize().to_string(),
            "cas": c.cas.normalize().to_string(),
        }),
        format!(
            "CAS base {} × {} = {}",
            c.cas_base.normalize(),
            pfa.cas_rate.normalize(),
            c.cas.normalize()
        ),
    );

    trace.record(
        "pfa_income_tax",
        "Income Tax",
        "Codul fiscal art. 68",
        json!({
            "base": base.normalize().to_string(),
            "cas": c.cas.normalize().to_string(),
            "cass": c.cass.normalize().to_string(),
        }),
        json!({
            "taxable": c.taxable.normalize().to_string(),
            "income_tax": c.income_tax.normalize().to_string(),
        }),
        format!(
            "Income tax: ({} - {} - {}) × {} = {}",
            base.normalize(),
            c.cas.normalize(),
            c.cass.normalize(),
            pfa.income_tax_rate.normalize(),
            c.income_tax.normalize()
        ),
    );

    let net = income - expenses - c.cas - c.cass - c.income_tax;

    let mut withholdings = BTreeMap::new();
    withholdings.insert(Component::Expenses, expenses);
    withholdings.insert(Component::Cas, c.cas);
    withholdings.insert(Component::Cass, c.cass);
    withholdings.insert(Component::IncomeTax, c.income_tax);

    CalculationResult {
        engine_version: ENGINE_VERSION.to_string(),
        fiscal_year: rules.year(),
        regime,
        gross: income,
        net,
        withholdings,
        employer_charges: BTreeMap::new(),
        employer_cost: None,
        effective_tax_rate: percent_of(c.cas + c.cass + c.income_tax, income),
        solver: None,
        audit_trace: trace,
    }
}

/// Computes annual PFA taxes under the real system.
///
/// # Arguments
///
/// * `income` - Annual gross income
/// * `expenses` - Annual deductible expenses
/// * `options` - Optional contribution elections
/// * `rules` - Rule set for the fiscal year
///
/// # Examples
///
/// ```no_run
/// use fiscal_engine::calculation::{PfaOptions, compute_real_system};
/// use fiscal_engine::config::ConfigLoader;
/// use fiscal_engine::models::Component;
/// use rust_decimal_macros::dec;
///
/// let loader = ConfigLoader::load("config").unwrap();
/// let rules = loader.rule_set(2025).unwrap();
///
/// let result = compute_real_system(dec!(100000), dec!(20000), &PfaOptions::default(), rules).unwrap();
/// assert_eq!(result.withheld(Component::Cass), dec!(8000));
/// assert_eq!(result.net, dec!(53865));
/// ```
pub fn compute_real_system(
    income: Decimal,
    expenses: Decimal,
    options: &PfaOptions,
    rules: &RuleSet,
) -> EngineResult<CalculationResult> {
    ensure_non_negative("income", income)?;
    ensure_non_negative("expenses", expenses)?;

    let net_income = (income - expenses).max(Decimal::ZERO);
    let c = contributions(net_income, options, rules.pfa());

    let mut trace = AuditTrace::default();
    trace.record(
        "pfa_net_income",
        "Net Income (Real System)",
        "Codul fiscal art. 68",
        json!({
            "income": income.normalize().to_string(),
            "expenses": expenses.normalize().to_string(),
        }),
        json!({ "net_income": net_income.normalize().to_string() }),
        format!(
            "Net income: max(0, {} - {}) = {}",
            income.normalize(),
            expenses.normalize(),
            net_income.normalize()
        ),
    );

    let result = build_result(
        Regime::PfaRealSystem,
        income,
        expenses,
        net_income,
        &c,
        trace,
        rules,
    );

    debug!(
        income = %income,
        expenses = %expenses,
        net = %result.net,
        "Computed PFA real system"
    );

    Ok(result)
}

/// Computes annual PFA taxes under the income norm.
///
/// Contributions and income tax are computed on `norm_value`; the net is
/// what remains of the actual income after expenses and those taxes.
pub fn compute_income_norm(
    norm_value: Decimal,
    actual_income: Decimal,
    expenses: Decimal,
    options: &PfaOptions,
    rules: &RuleSet,
) -> EngineResult<CalculationResult> {
    ensure_non_negative("norm_value", norm_value)?;
    ensure_non_negative("actual_income", actual_income)?;
    ensure_non_negative("expenses", expenses)?;

    let pfa = rules.pfa();
    let c = contributions(norm_value, options, pfa);

    let mut trace = AuditTrace::default();
    trace.record(
        "pfa_income_norm",
        "Income Norm Base",
        "Codul fiscal art. 69",
        json!({
            "norm_value": norm_value.normalize().to_string(),
            "actual_income": actual_income.normalize().to_string(),
        }),
        json!({ "base": norm_value.normalize().to_string() }),
        format!(
            "Contributions and tax use the norm {} instead of actual income",
            norm_value.normalize()
        ),
    );

    if actual_income > pfa.income_norm_revenue_ceiling {
        warn!(
            actual_income = %actual_income,
            ceiling = %pfa.income_norm_revenue_ceiling,
            "Revenue exceeds the income norm ceiling"
        );
        trace.warnings.push(AuditWarning::new(
            NORM_CEILING_EXCEEDED,
            format!(
                "Revenue {} exceeds the income norm ceiling {}; the real system applies from next year",
                actual_income.normalize(),
                pfa.income_norm_revenue_ceiling.normalize()
            ),
            "high",
        ));
    }

    let result = build_result(
        Regime::PfaIncomeNorm,
        actual_income,
        expenses,
        norm_value,
        &c,
        trace,
        rules,
    );

    debug!(
        norm_value = %norm_value,
        actual_income = %actual_income,
        net = %result.net,
        "Computed PFA income norm"
    );

    Ok(result)
}

/// Computes both variants and ranks them by net.
pub fn compare(
    income: Decimal,
    expenses: Decimal,
    norm_value: Decimal,
    options: &PfaOptions,
    rules: &RuleSet,
) -> EngineResult<PfaComparison> {
    let real_system = compute_real_system(income, expenses, options, rules)?;
    let income_norm = compute_income_norm(norm_value, income, expenses, options, rules)?;

    let (better, worse_net) = if income_norm.net > real_system.net {
        (PfaVariant::IncomeNorm, real_system.net)
    } else {
        (PfaVariant::RealSystem, income_norm.net)
    };
    let absolute_savings = (real_system.net - income_norm.net).abs();
    let relative_savings = if worse_net.is_zero() {
        None
    } else {
        Some(percent_of(absolute_savings, worse_net.abs()))
    };

    debug!(
        better = ?better,
        absolute_savings = %absolute_savings,
        "Compared PFA variants"
    );

    Ok(PfaComparison {
        real_system,
        income_norm,
        better,
        absolute_savings,
        relative_savings,
    })
}
