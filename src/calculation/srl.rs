//! Micro-company (SRL) tax calculation.
//!
//! A micro-company pays a tax on revenue, not profit: the lower rate with at
//! least one employee, the higher rate without. Profit after the micro tax
//! is distributed as dividends, which carry dividend tax and, above the PFA
//! lower CASS threshold, a health contribution capped at the upper one.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use crate::ENGINE_VERSION;
use crate::config::RuleSet;
use crate::error::EngineResult;
use crate::models::{AuditTrace, AuditWarning, CalculationResult, Component, Regime};

use super::rounding::{percent_of, round_money};
use super::validation::{ensure_fraction, ensure_non_negative};

/// Warning code raised when revenue exceeds the micro-company ceiling.
pub const MICRO_CEILING_EXCEEDED: &str = "MICRO_CEILING_EXCEEDED";

/// Distribution choices for a micro-company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SrlOptions {
    /// Share of positive profit paid out as dividends (0 to 1).
    pub dividend_share: Decimal,
}

impl Default for SrlOptions {
    fn default() -> Self {
        Self {
            dividend_share: Decimal::ONE,
        }
    }
}

/// Computes annual micro-company tax and the owner's net dividends.
///
/// `gross` in the result is the revenue and `net` is the dividend cash
/// reaching the owner. Retained profit (negative for a loss) closes the
/// identity between the two.
///
/// # Examples
///
/// ```no_run
/// use fiscal_engine::calculation::{SrlOptions, compute_micro_company};
/// use fiscal_engine::config::ConfigLoader;
/// use fiscal_engine::models::Component;
/// use rust_decimal_macros::dec;
///
/// let loader = ConfigLoader::load("config").unwrap();
/// let rules = loader.rule_set(2025).unwrap();
///
/// let result = compute_micro_company(dec!(200000), dec!(50000), 1, &SrlOptions::default(), rules).unwrap();
/// assert_eq!(result.withheld(Component::MicroTax), dec!(2000));
/// assert_eq!(result.net, dec!(118400));
/// ```
pub fn compute_micro_company(
    revenue: Decimal,
    expenses: Decimal,
    employee_count: u32,
    options: &SrlOptions,
    rules: &RuleSet,
) -> EngineResult<CalculationResult> {
    ensure_non_negative("revenue", revenue)?;
    ensure_non_negative("expenses", expenses)?;
    ensure_fraction("dividend_share", options.dividend_share)?;

    let srl = rules.srl();
    let pfa = rules.pfa();
    let mut trace = AuditTrace::default();

    let micro_rate = if employee_count >= 1 {
        srl.micro_rate_with_employees
    } else {
        srl.micro_rate_without_employees
    };
    let micro_tax = round_money(revenue * micro_rate);
    trace.record(
        "srl_micro_tax",
        "Micro-Company Revenue Tax",
        "Codul fiscal art. 51",
        json!({
            "revenue": revenue.normalize().to_string(),
            "employee_count": employee_count,
        }),
        json!({
            "rate": micro_rate.normalize().to_string(),
            "micro_tax": micro_tax.normalize().to_string(),
        }),
        format!(
            "Micro tax: {} × {} = {}",
            revenue.normalize(),
            micro_rate.normalize(),
            micro_tax.normalize()
        ),
    );

    if revenue > srl.micro_revenue_ceiling {
        warn!(
            revenue = %revenue,
            ceiling = %srl.micro_revenue_ceiling,
            "Revenue exceeds the micro-company ceiling"
        );
        trace.warnings.push(AuditWarning::new(
            MICRO_CEILING_EXCEEDED,
            format!(
                "Revenue {} exceeds the micro-company ceiling {}; profit tax applies instead",
                revenue.normalize(),
                srl.micro_revenue_ceiling.normalize()
            ),
            "high",
        ));
    }

    let profit = revenue - expenses - micro_tax;
    let dividends = round_money(profit.max(Decimal::ZERO) * options.dividend_share);
    let dividend_tax = round_money(dividends * srl.dividend_tax_rate);
    trace.record(
        "srl_dividend_tax",
        "Dividend Tax",
        "Codul fiscal art. 97",
        json!({
            "profit": profit.normalize().to_string(),
            "dividend_share": options.dividend_share.normalize().to_string(),
        }),
        json!({
            "dividends": dividends.normalize().to_string(),
            "dividend_tax": dividend_tax.normalize().to_string(),
        }),
        format!(
            "Dividends {} × {} = {}",
            dividends.normalize(),
            srl.dividend_tax_rate.normalize(),
            dividend_tax.normalize()
        ),
    );

    let lower = pfa.cass_min_threshold();
    let upper = pfa.cass_max_threshold();
    let cass = if dividends < lower {
        Decimal::ZERO
    } else {
        round_money(srl.dividend_cass_rate * dividends.min(upper))
    };
    trace.record(
        "srl_dividend_cass",
        "Health Contribution on Dividends",
        "Codul fiscal art. 170",
        json!({
            "dividends": dividends.normalize().to_string(),
            "lower_threshold": lower.normalize().to_string(),
            "upper_threshold": upper.normalize().to_string(),
        }),
        json!({ "cass": cass.normalize().to_string() }),
        if cass.is_zero() {
            format!(
                "Dividends {} below the threshold {}: no CASS",
                dividends.normalize(),
                lower.normalize()
            )
        } else {
            format!(
                "CASS: {} × min({}, {}) = {}",
                srl.dividend_cass_rate.normalize(),
                dividends.normalize(),
                upper.normalize(),
                cass.normalize()
            )
        },
    );

    let net = dividends - dividend_tax - cass;
    let retained = profit - dividends;

    let mut withholdings = BTreeMap::new();
    withholdings.insert(Component::Expenses, expenses);
    withholdings.insert(Component::MicroTax, micro_tax);
    withholdings.insert(Component::DividendTax, dividend_tax);
    withholdings.insert(Component::Cass, cass);
    withholdings.insert(Component::RetainedProfit, retained);

    let result = CalculationResult {
        engine_version: ENGINE_VERSION.to_string(),
        fiscal_year: rules.year(),
        regime: Regime::SrlMicro,
        gross: revenue,
        net,
        withholdings,
        employer_charges: BTreeMap::new(),
        employer_cost: None,
        effective_tax_rate: percent_of(micro_tax + dividend_tax + cass, revenue),
        solver: None,
        audit_trace: trace,
    };

    debug!(
        revenue = %revenue,
        expenses = %expenses,
        employee_count,
        net = %result.net,
        "Computed micro-company"
    );

    Ok(result)
}
