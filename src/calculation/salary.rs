//! Payroll calculation: gross to net, net to gross and employer cost to net.
//!
//! This module implements monthly employment-income taxation for the
//! standard, IT, construction/agriculture and part-time regimes. The forward
//! direction is closed-form; the two inverse directions are solved by a
//! damped fixed-point iteration because the personal-deduction steps and the
//! exemption thresholds make the forward function discontinuous.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use crate::ENGINE_VERSION;
use crate::config::{RuleSet, SalaryRules};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AuditTrace, AuditWarning, CalculationResult, Component, Regime, SolverStatus,
};

use super::rounding::{percent_of, round_money};
use super::validation::{ensure_fraction, ensure_non_negative};

/// Default multiplier applied to the target net for the first gross estimate.
pub const DEFAULT_INITIAL_FACTOR: Decimal = Decimal::from_parts(15, 0, 0, false, 1);

/// Default share of the residual corrected on each iteration.
pub const DEFAULT_DAMPING: Decimal = Decimal::from_parts(5, 0, 0, false, 1);

/// Default convergence tolerance in RON.
pub const DEFAULT_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Default iteration cap.
pub const DEFAULT_MAX_ITERATIONS: u32 = 50;

/// Largest accepted solver start multiplier.
pub const MAX_INITIAL_FACTOR: Decimal = Decimal::from_parts(10, 0, 0, false, 0);

/// Warning code raised when the inversion solver misses its tolerance.
pub const NON_CONVERGENCE: &str = "NON_CONVERGENCE";

/// Warning code raised when the employer tops up part-time contributions.
pub const EMPLOYER_TOP_UP: &str = "EMPLOYER_TOP_UP";

/// Warning code raised when gross exceeds an exemption threshold.
pub const EXEMPTION_THRESHOLD_EXCEEDED: &str = "EXEMPTION_THRESHOLD_EXCEEDED";

/// Scale kept on intermediate solver estimates.
const SOLVER_SCALE: u32 = 6;

/// Employment regime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SalaryRegime {
    /// Standard rules.
    Standard,
    /// Income-tax exemption up to the IT threshold.
    It,
    /// Reduced pension rate and income-tax exemption up to a threshold.
    ConstructionAgriculture,
    /// Employer tops up contributions to the minimum-wage level.
    PartTime,
}

impl SalaryRegime {
    /// The result regime tag for this employment regime.
    pub fn regime(self) -> Regime {
        match self {
            SalaryRegime::Standard => Regime::SalaryStandard,
            SalaryRegime::It => Regime::SalaryIt,
            SalaryRegime::ConstructionAgriculture => Regime::SalaryConstructionAgriculture,
            SalaryRegime::PartTime => Regime::SalaryPartTime,
        }
    }
}

/// Tuning of the net-to-gross and cost-to-net solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverSettings {
    /// Multiplier applied to the target net for the first estimate.
    pub initial_factor: Decimal,
    /// Share of the residual corrected on each step.
    pub damping: Decimal,
    /// Absolute tolerance in RON.
    pub tolerance: Decimal,
    /// Iteration cap.
    pub max_iterations: u32,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            initial_factor: DEFAULT_INITIAL_FACTOR,
            damping: DEFAULT_DAMPING,
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

/// Per-employee inputs to the payroll calculation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SalaryOptions {
    /// Dependents for the personal deduction (4 or more use the last column).
    pub dependents: u32,
    /// Enrolled children, each adding the child deduction.
    pub children: u32,
    /// Value of one meal voucher.
    pub meal_voucher_value: Decimal,
    /// Number of meal vouchers in the month.
    pub meal_voucher_days: u32,
    /// Students and pensioners are exempt from the part-time top-up.
    pub student_or_pensioner: bool,
    /// Excludes gross up to the construction threshold from the CASS base.
    pub construction_cass_exempt: bool,
    /// Solver tuning for the inverse calculations.
    pub solver: SolverSettings,
}

impl SalaryOptions {
    /// Total meal-voucher value for the month.
    pub fn vouchers(&self) -> Decimal {
        self.meal_voucher_value * Decimal::from(self.meal_voucher_days)
    }
}

/// Every intermediate figure of the forward computation.
#[derive(Debug, Clone, Copy)]
struct Breakdown {
    gross: Decimal,
    vouchers: Decimal,
    cas_rate: Decimal,
    cas: Decimal,
    cass_base: Decimal,
    cass: Decimal,
    personal_deduction: Decimal,
    child_deduction: Decimal,
    exempt: Decimal,
    taxable: Decimal,
    income_tax: Decimal,
    net: Decimal,
    cam: Decimal,
    top_up: Decimal,
    employer_cost: Decimal,
}

/// Looks up the personal deduction for a gross salary.
///
/// The first bracket whose `up_to` is at least `gross` applies; above the
/// last bracket the deduction is zero.
pub fn personal_deduction(gross: Decimal, dependents: u32, rules: &SalaryRules) -> Decimal {
    rules
        .personal_deduction
        .brackets
        .iter()
        .find(|bracket| gross <= bracket.up_to)
        .and_then(|bracket| {
            let column = (dependents as usize).min(bracket.amounts.len().saturating_sub(1));
            bracket.amounts.get(column).copied()
        })
        .unwrap_or(Decimal::ZERO)
}

fn check_options(options: &SalaryOptions) -> EngineResult<()> {
    ensure_non_negative("meal_voucher_value", options.meal_voucher_value)?;
    let solver = &options.solver;
    ensure_non_negative("solver.initial_factor", solver.initial_factor)?;
    if solver.initial_factor > MAX_INITIAL_FACTOR {
        return Err(EngineError::invalid_input(
            "solver.initial_factor",
            format!("must not exceed {}, got {}", MAX_INITIAL_FACTOR, solver.initial_factor),
        ));
    }
    ensure_fraction("solver.damping", solver.damping)?;
    ensure_non_negative("solver.tolerance", solver.tolerance)?;
    Ok(())
}

fn evaluate(
    gross: Decimal,
    regime: SalaryRegime,
    options: &SalaryOptions,
    rules: &SalaryRules,
    round: fn(Decimal) -> Decimal,
) -> Breakdown {
    let vouchers = options.vouchers();
    let construction = regime == SalaryRegime::ConstructionAgriculture;

    let cas_rate = if construction {
        rules.construction_cas_rate
    } else {
        rules.cas_rate
    };
    let cas = round(gross * cas_rate);

    let cass_exempt = construction && options.construction_cass_exempt;
    let cass_base = if cass_exempt {
        (gross - rules.construction_threshold).max(Decimal::ZERO) + vouchers
    } else {
        gross + vouchers
    };
    let cass = round(cass_base * rules.cass_rate);

    let personal = personal_deduction(gross, options.dependents, rules);
    let children = rules.child_deduction * Decimal::from(options.children);

    let exempt = match regime {
        SalaryRegime::It => round(gross.min(rules.it_threshold) * (Decimal::ONE - cas_rate - rules.cass_rate)),
        SalaryRegime::ConstructionAgriculture => {
            let cass_rate_on_exempt = if cass_exempt {
                Decimal::ZERO
            } else {
                rules.cass_rate
            };
            round(
                gross.min(rules.construction_threshold)
                    * (Decimal::ONE - cas_rate - cass_rate_on_exempt),
            )
        }
        SalaryRegime::Standard | SalaryRegime::PartTime => Decimal::ZERO,
    };

    let taxable = (gross + vouchers - cas - cass - personal - children - exempt).max(Decimal::ZERO);
    let income_tax = round(taxable * rules.income_tax_rate);
    let net = gross - cas - cass - income_tax;

    let cam = round(gross * rules.cam_rate);
    let top_up = if regime == SalaryRegime::PartTime
        && gross < rules.minimum_wage
        && !options.student_or_pensioner
    {
        round((rules.minimum_wage - gross) * (rules.cas_rate + rules.cass_rate))
    } else {
        Decimal::ZERO
    };
    let employer_cost = gross + cam + top_up + vouchers;

    Breakdown {
        gross,
        vouchers,
        cas_rate,
        cas,
        cass_base,
        cass,
        personal_deduction: personal,
        child_deduction: children,
        exempt,
        taxable,
        income_tax,
        net,
        cam,
        top_up,
        employer_cost,
    }
}

fn unrounded(value: Decimal) -> Decimal {
    value
}

fn build_result(
    b: &Breakdown,
    regime: SalaryRegime,
    rules: &RuleSet,
    solver: Option<SolverStatus>,
) -> CalculationResult {
    let salary = rules.salary();
    let mut trace = AuditTrace::default();

    trace.record(
        "salary_cas",
        "Pension Contribution (CAS)",
        "Codul fiscal art. 138",
        json!({
            "gross": b.gross.normalize().to_string(),
            "rate": b.cas_rate.normalize().to_string(),
        }),
        json!({ "cas": b.cas.normalize().to_string() }),
        format!(
            "CAS: {} × {} = {}",
            b.gross.normalize(),
            b.cas_rate.normalize(),
            b.cas.normalize()
        ),
    );

    trace.record(
        "salary_cass",
        "Health Contribution (CASS)",
        "Codul fiscal art. 156",
        json!({
            "cass_base": b.cass_base.normalize().to_string(),
            "meal_vouchers": b.vouchers.normalize().to_string(),
            "rate": salary.cass_rate.normalize().to_string(),
        }),
        json!({ "cass": b.cass.normalize().to_string() }),
        format!(
            "CASS: {} × {} = {}",
            b.cass_base.normalize(),
            salary.cass_rate.normalize(),
            b.cass.normalize()
        ),
    );

    trace.record(
        "salary_personal_deduction",
        "Personal Deduction",
        "Codul fiscal art. 77",
        json!({
            "gross": b.gross.normalize().to_string(),
            "child_deduction": b.child_deduction.normalize().to_string(),
        }),
        json!({
            "personal_deduction": b.personal_deduction.normalize().to_string(),
            "total_deduction": (b.personal_deduction + b.child_deduction).normalize().to_string(),
        }),
        format!(
            "Deduction from table for gross {}: {} plus {} for children",
            b.gross.normalize(),
            b.personal_deduction.normalize(),
            b.child_deduction.normalize()
        ),
    );

    if matches!(
        regime,
        SalaryRegime::It | SalaryRegime::ConstructionAgriculture
    ) {
        let threshold = if regime == SalaryRegime::It {
            salary.it_threshold
        } else {
            salary.construction_threshold
        };
        trace.record(
            "salary_exempt_income",
            "Income Tax Exemption",
            "Codul fiscal art. 60",
            json!({
                "gross": b.gross.normalize().to_string(),
                "threshold": threshold.normalize().to_string(),
            }),
            json!({ "exempt": b.exempt.normalize().to_string() }),
            format!(
                "Net of contributions on the first {} of gross is exempt: {}",
                threshold.normalize(),
                b.exempt.normalize()
            ),
        );
        if b.gross > threshold {
            trace.warnings.push(AuditWarning::new(
                EXEMPTION_THRESHOLD_EXCEEDED,
                format!(
                    "Gross {} exceeds the exemption threshold {}; the excess is taxed",
                    b.gross.normalize(),
                    threshold.normalize()
                ),
                "low",
            ));
        }
    }

    trace.record(
        "salary_income_tax",
        "Income Tax",
        "Codul fiscal art. 78",
        json!({
            "taxable": b.taxable.normalize().to_string(),
            "rate": salary.income_tax_rate.normalize().to_string(),
        }),
        json!({ "income_tax": b.income_tax.normalize().to_string() }),
        format!(
            "Income tax: {} × {} = {}",
            b.taxable.normalize(),
            salary.income_tax_rate.normalize(),
            b.income_tax.normalize()
        ),
    );

    trace.record(
        "salary_employer_cost",
        "Employer Cost",
        "Codul fiscal art. 220^4",
        json!({
            "gross": b.gross.normalize().to_string(),
            "cam_rate": salary.cam_rate.normalize().to_string(),
            "meal_vouchers": b.vouchers.normalize().to_string(),
        }),
        json!({
            "cam": b.cam.normalize().to_string(),
            "part_time_top_up": b.top_up.normalize().to_string(),
            "employer_cost": b.employer_cost.normalize().to_string(),
        }),
        format!(
            "Employer cost: {} + CAM {} + top-up {} + vouchers {} = {}",
            b.gross.normalize(),
            b.cam.normalize(),
            b.top_up.normalize(),
            b.vouchers.normalize(),
            b.employer_cost.normalize()
        ),
    );

    if b.top_up > Decimal::ZERO {
        trace.warnings.push(AuditWarning::new(
            EMPLOYER_TOP_UP,
            format!(
                "Employer pays {} to bring contributions to the minimum-wage level; net pay is unaffected",
                b.top_up.normalize()
            ),
            "medium",
        ));
    }

    let mut withholdings = BTreeMap::new();
    withholdings.insert(Component::Cas, b.cas);
    withholdings.insert(Component::Cass, b.cass);
    withholdings.insert(Component::IncomeTax, b.income_tax);

    let mut employer_charges = BTreeMap::new();
    employer_charges.insert(Component::Cam, b.cam);
    if b.top_up > Decimal::ZERO {
        employer_charges.insert(Component::PartTimeTopUp, b.top_up);
    }
    if b.vouchers > Decimal::ZERO {
        employer_charges.insert(Component::MealVouchers, b.vouchers);
    }

    if let Some(status) = solver.as_ref().filter(|s| !s.converged) {
        trace.warnings.push(AuditWarning::new(
            NON_CONVERGENCE,
            format!(
                "Solver stopped after {} iterations with residual {}; the best estimate is returned",
                status.iterations,
                status.residual.normalize()
            ),
            "high",
        ));
    }

    CalculationResult {
        engine_version: ENGINE_VERSION.to_string(),
        fiscal_year: rules.year(),
        regime: regime.regime(),
        gross: b.gross,
        net: b.net,
        withholdings,
        employer_charges,
        employer_cost: Some(b.employer_cost),
        effective_tax_rate: percent_of(b.cas + b.cass + b.income_tax, b.gross),
        solver,
        audit_trace: trace,
    }
}

/// Computes net pay from a monthly gross salary.
///
/// # Arguments
///
/// * `gross` - Monthly gross salary in RON
/// * `regime` - Employment regime
/// * `options` - Dependents, meal vouchers and regime flags
/// * `rules` - Rule set for the fiscal year
///
/// # Errors
///
/// Returns `InvalidInput` for a negative gross or voucher value.
///
/// # Examples
///
/// ```no_run
/// use fiscal_engine::calculation::{SalaryOptions, SalaryRegime, compute_gross_to_net};
/// use fiscal_engine::config::ConfigLoader;
/// use fiscal_engine::models::Component;
/// use rust_decimal_macros::dec;
///
/// let loader = ConfigLoader::load("config").unwrap();
/// let rules = loader.rule_set(2025).unwrap();
///
/// let result = compute_gross_to_net(
///     dec!(8000),
///     SalaryRegime::Standard,
///     &SalaryOptions::default(),
///     rules,
/// )
/// .unwrap();
/// assert_eq!(result.withheld(Component::Cas), dec!(2000));
/// assert_eq!(result.net, dec!(4680));
/// ```
pub fn compute_gross_to_net(
    gross: Decimal,
    regime: SalaryRegime,
    options: &SalaryOptions,
    rules: &RuleSet,
) -> EngineResult<CalculationResult> {
    ensure_non_negative("gross", gross)?;
    check_options(options)?;

    let breakdown = evaluate(gross, regime, options, rules.salary(), round_money);
    let result = build_result(&breakdown, regime, rules, None);

    debug!(
        gross = %result.gross,
        net = %result.net,
        regime = ?regime,
        employer_cost = %breakdown.employer_cost,
        "Computed salary gross to net"
    );

    Ok(result)
}

/// Computes the gross salary that yields a target net pay.
///
/// The result carries a [`SolverStatus`]; when the tolerance is not met
/// within the iteration cap, the best estimate is returned with a
/// `NON_CONVERGENCE` warning.
///
/// # Errors
///
/// Returns `InvalidInput` for a negative target.
pub fn compute_net_to_gross(
    net: Decimal,
    regime: SalaryRegime,
    options: &SalaryOptions,
    rules: &RuleSet,
) -> EngineResult<CalculationResult> {
    ensure_non_negative("net", net)?;
    check_options(options)?;

    let start = net * options.solver.initial_factor;
    invert(net, start, regime, options, rules, |b| b.net)
}

/// Computes net pay from a total monthly employer budget.
///
/// # Errors
///
/// Returns `InvalidInput` for a negative employer cost.
pub fn compute_cost_to_net(
    total_employer_cost: Decimal,
    regime: SalaryRegime,
    options: &SalaryOptions,
    rules: &RuleSet,
) -> EngineResult<CalculationResult> {
    ensure_non_negative("total_employer_cost", total_employer_cost)?;
    check_options(options)?;

    invert(
        total_employer_cost,
        total_employer_cost,
        regime,
        options,
        rules,
        |b| b.employer_cost,
    )
}

fn invert(
    target: Decimal,
    start: Decimal,
    regime: SalaryRegime,
    options: &SalaryOptions,
    rules: &RuleSet,
    measure: fn(&Breakdown) -> Decimal,
) -> EngineResult<CalculationResult> {
    let settings = options.solver;
    let mut gross = start.max(Decimal::ZERO);
    let mut best = (gross, Decimal::MAX);
    let mut iterations = 0;
    let mut converged = false;

    while iterations < settings.max_iterations {
        iterations += 1;
        let diff = measure(&evaluate(gross, regime, options, rules.salary(), unrounded)) - target;

        if diff.abs() < best.1 {
            best = (gross, diff.abs());
        }
        if diff.abs() < settings.tolerance {
            converged = true;
            break;
        }

        gross = (gross - settings.damping * diff)
            .max(Decimal::ZERO)
            .round_dp(SOLVER_SCALE);
    }

    let status = SolverStatus {
        target,
        iterations,
        converged,
        residual: best.1.round_dp(4),
    };

    if !converged {
        warn!(
            target = %target,
            iterations,
            residual = %status.residual,
            regime = ?regime,
            "Salary solver did not converge"
        );
    }

    let breakdown = evaluate(round_money(best.0), regime, options, rules.salary(), round_money);
    let mut result = build_result(&breakdown, regime, rules, Some(status));

    result.audit_trace.prepend(
        "salary_solver",
        "Gross Salary Solver",
        "n/a",
        json!({
            "target": target.normalize().to_string(),
            "start": start.normalize().to_string(),
            "damping": settings.damping.normalize().to_string(),
            "tolerance": settings.tolerance.normalize().to_string(),
        }),
        json!({
            "gross": breakdown.gross.normalize().to_string(),
            "iterations": iterations,
            "converged": converged,
        }),
        format!(
            "Damped iteration reached gross {} in {} iterations (converged: {})",
            breakdown.gross.normalize(),
            iterations,
            converged
        ),
    );

    debug!(
        target = %target,
        gross = %result.gross,
        net = %result.net,
        iterations,
        converged,
        "Computed salary by inversion"
    );

    Ok(result)
}
