//! Calculation result models for the fiscal computation engine.
//!
//! This module contains the [`CalculationResult`] type shared by the
//! payroll, self-employment and micro-company engines, together with the
//! audit structures every engine uses to record its decisions.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The tax regime a [`CalculationResult`] was produced under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Regime {
    /// Employment income, standard rules.
    SalaryStandard,
    /// Employment income with the IT income-tax exemption.
    SalaryIt,
    /// Employment income in construction or agriculture.
    SalaryConstructionAgriculture,
    /// Part-time employment income.
    SalaryPartTime,
    /// Self-employed (PFA), real system.
    PfaRealSystem,
    /// Self-employed (PFA), income norm.
    PfaIncomeNorm,
    /// Micro-company (SRL) with dividend distribution.
    SrlMicro,
}

/// A named tax or cost component of a calculation.
///
/// Serialized as snake_case strings so the component maps render as plain
/// JSON objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Component {
    /// Pension contribution.
    Cas,
    /// Health contribution.
    Cass,
    /// Income tax.
    IncomeTax,
    /// Employer work-insurance contribution.
    Cam,
    /// Employer top-up of contributions to the minimum-wage level.
    PartTimeTopUp,
    /// Meal vouchers paid by the employer.
    MealVouchers,
    /// Deductible business expenses.
    Expenses,
    /// Micro-company revenue tax.
    MicroTax,
    /// Tax withheld on dividends.
    DividendTax,
    /// Profit kept in the company.
    RetainedProfit,
}

/// Outcome of the iterative inversion used for net-to-gross and
/// cost-to-net calculations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverStatus {
    /// The figure the solver tried to reach (net pay or employer cost).
    pub target: Decimal,
    /// Iterations performed.
    pub iterations: u32,
    /// Whether the residual dropped below the tolerance.
    pub converged: bool,
    /// The best absolute difference reached.
    pub residual: Decimal,
}

/// A single step in the audit trace recording a calculation decision.
///
/// Each step captures the input, output, and reasoning for a rule application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// Reference to the legal provision for this rule.
    pub clause_ref: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during calculation.
///
/// Warnings indicate conditions that don't prevent calculation
/// but may require attention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level (e.g., "low", "medium", "high").
    pub severity: String,
}

impl AuditWarning {
    /// Creates a new warning.
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        severity: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            severity: severity.into(),
        }
    }
}

/// The complete audit trace for a calculation.
///
/// # Example
///
/// ```
/// use fiscal_engine::models::AuditTrace;
///
/// let mut trace = AuditTrace::default();
/// let step = trace.next_step_number();
/// assert_eq!(step, 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during calculation.
    pub warnings: Vec<AuditWarning>,
}

impl AuditTrace {
    /// Returns the step number the next recorded step should carry.
    pub fn next_step_number(&self) -> u32 {
        self.steps.len() as u32 + 1
    }

    /// Appends a step numbered after the existing ones.
    pub(crate) fn record(
        &mut self,
        rule_id: &str,
        rule_name: &str,
        clause_ref: &str,
        input: serde_json::Value,
        output: serde_json::Value,
        reasoning: String,
    ) {
        let step_number = self.next_step_number();
        self.steps.push(AuditStep {
            step_number,
            rule_id: rule_id.to_string(),
            rule_name: rule_name.to_string(),
            clause_ref: clause_ref.to_string(),
            input,
            output,
            reasoning,
        });
    }

    /// Inserts a step before the existing ones and renumbers the trace.
    pub(crate) fn prepend(
        &mut self,
        rule_id: &str,
        rule_name: &str,
        clause_ref: &str,
        input: serde_json::Value,
        output: serde_json::Value,
        reasoning: String,
    ) {
        self.steps.insert(
            0,
            AuditStep {
                step_number: 1,
                rule_id: rule_id.to_string(),
                rule_name: rule_name.to_string(),
                clause_ref: clause_ref.to_string(),
                input,
                output,
                reasoning,
            },
        );
        for (index, step) in self.steps.iter_mut().enumerate().skip(1) {
            step.step_number = index as u32 + 1;
        }
    }

    /// Returns true if a warning with the given code was raised.
    pub fn has_warning(&self, code: &str) -> bool {
        self.warnings.iter().any(|w| w.code == code)
    }
}

/// The complete result of a payroll, PFA or SRL calculation.
///
/// `withholdings` holds every amount subtracted from `gross` to reach
/// `net`, so `gross == sum(withholdings) + net` always holds exactly.
/// Amounts the employer pays on top of gross (CAM, the part-time top-up,
/// meal vouchers) are kept apart in `employer_charges` and never touch
/// `net`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationResult {
    /// The version of the engine that performed the calculation.
    pub engine_version: String,
    /// The fiscal year of the rule set used.
    pub fiscal_year: i32,
    /// The regime the calculation was made under.
    pub regime: Regime,
    /// Gross salary, gross income or revenue.
    pub gross: Decimal,
    /// Net amount left to the person.
    pub net: Decimal,
    /// Components subtracted from gross to reach net.
    pub withholdings: BTreeMap<Component, Decimal>,
    /// Components paid by the employer on top of gross.
    pub employer_charges: BTreeMap<Component, Decimal>,
    /// Total employer cost, for salary regimes.
    pub employer_cost: Option<Decimal>,
    /// Taxes and contributions as a percentage of gross.
    pub effective_tax_rate: Decimal,
    /// Solver outcome, for inverted calculations.
    pub solver: Option<SolverStatus>,
    /// Complete audit trace of calculation decisions.
    pub audit_trace: AuditTrace,
}

impl CalculationResult {
    /// Returns the amount of a withheld component, zero when absent.
    pub fn withheld(&self, component: Component) -> Decimal {
        self.withholdings
            .get(&component)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Returns the amount of an employer charge, zero when absent.
    pub fn employer_charge(&self, component: Component) -> Decimal {
        self.employer_charges
            .get(&component)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Sum of all withheld components.
    pub fn withheld_total(&self) -> Decimal {
        self.withholdings.values().copied().sum()
    }

    /// Returns true when `gross == sum(withholdings) + net` within `tolerance`.
    pub fn is_balanced(&self, tolerance: Decimal) -> bool {
        (self.gross - self.withheld_total() - self.net).abs() <= tolerance
    }

    /// Returns true when the inversion solver ran and missed its tolerance.
    pub fn is_unconverged(&self) -> bool {
        self.solver.as_ref().is_some_and(|s| !s.converged)
    }
}
