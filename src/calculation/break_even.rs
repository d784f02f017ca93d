//! Break-even search between two competing tax regimes.
//!
//! The solver scans annual income in fixed steps and reports the first
//! income at which arm B's net overtakes arm A's. The wrapped engines have
//! threshold discontinuities, so the difference between two arms can change
//! sign several times; only the first negative-to-positive crossing is
//! reported and later crossings are ignored.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::RuleSet;
use crate::error::{EngineError, EngineResult};

use super::pfa::{PfaOptions, compute_income_norm, compute_real_system};
use super::rounding::round_money;
use super::salary::{SalaryOptions, SalaryRegime, compute_cost_to_net, compute_gross_to_net};
use super::srl::{SrlOptions, compute_micro_company};
use super::validation::{ensure_fraction, ensure_non_negative};

/// Default lower bound of the scan in RON.
pub const DEFAULT_FLOOR: Decimal = Decimal::from_parts(10_000, 0, 0, false, 0);

/// Default upper bound of the scan in RON.
pub const DEFAULT_CEILING: Decimal = Decimal::from_parts(500_000, 0, 0, false, 0);

/// Default scan step in RON.
pub const DEFAULT_STEP: Decimal = Decimal::from_parts(1_000, 0, 0, false, 0);

/// Largest number of points a single scan may evaluate.
pub const MAX_SCAN_POINTS: u64 = 1_000_000;

const MONTHS_PER_YEAR: Decimal = Decimal::from_parts(12, 0, 0, false, 0);

/// Annual net income of a regime as a function of income and expenses.
///
/// Any closure `Fn(Decimal, Decimal) -> EngineResult<Decimal>` is an arm.
pub trait NetIncomeFn {
    /// Returns the annual net income for `income` with `expenses`.
    fn net_income(&self, income: Decimal, expenses: Decimal) -> EngineResult<Decimal>;
}

impl<F> NetIncomeFn for F
where
    F: Fn(Decimal, Decimal) -> EngineResult<Decimal>,
{
    fn net_income(&self, income: Decimal, expenses: Decimal) -> EngineResult<Decimal> {
        self(income, expenses)
    }
}

/// What the annual income of a salary arm stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SalaryBasis {
    /// Annual gross salary.
    AnnualGross,
    /// Annual budget the employer spends, including employer charges.
    AnnualEmployerBudget,
}

/// Employment income as a break-even arm. Expenses are ignored.
#[derive(Debug, Clone)]
pub struct SalaryArm<'a> {
    /// Rule set used for every evaluation.
    pub rules: &'a RuleSet,
    /// Employment regime.
    pub regime: SalaryRegime,
    /// Payroll options.
    pub options: SalaryOptions,
    /// Meaning of the scanned income.
    pub basis: SalaryBasis,
}

impl NetIncomeFn for SalaryArm<'_> {
    fn net_income(&self, income: Decimal, _expenses: Decimal) -> EngineResult<Decimal> {
        let monthly = round_money(income / MONTHS_PER_YEAR);
        let result = match self.basis {
            SalaryBasis::AnnualGross => {
                compute_gross_to_net(monthly, self.regime, &self.options, self.rules)?
            }
            SalaryBasis::AnnualEmployerBudget => {
                compute_cost_to_net(monthly, self.regime, &self.options, self.rules)?
            }
        };
        Ok(result.net * MONTHS_PER_YEAR)
    }
}

/// PFA under the real system as a break-even arm.
#[derive(Debug, Clone)]
pub struct PfaRealArm<'a> {
    /// Rule set used for every evaluation.
    pub rules: &'a RuleSet,
    /// Contribution elections.
    pub options: PfaOptions,
}

impl NetIncomeFn for PfaRealArm<'_> {
    fn net_income(&self, income: Decimal, expenses: Decimal) -> EngineResult<Decimal> {
        Ok(compute_real_system(income, expenses, &self.options, self.rules)?.net)
    }
}

/// PFA under the income norm as a break-even arm.
#[derive(Debug, Clone)]
pub struct PfaNormArm<'a> {
    /// Rule set used for every evaluation.
    pub rules: &'a RuleSet,
    /// Contribution elections.
    pub options: PfaOptions,
    /// Presumed annual income for the activity.
    pub norm_value: Decimal,
}

impl NetIncomeFn for PfaNormArm<'_> {
    fn net_income(&self, income: Decimal, expenses: Decimal) -> EngineResult<Decimal> {
        Ok(compute_income_norm(self.norm_value, income, expenses, &self.options, self.rules)?.net)
    }
}

/// Micro-company as a break-even arm.
#[derive(Debug, Clone)]
pub struct SrlArm<'a> {
    /// Rule set used for every evaluation.
    pub rules: &'a RuleSet,
    /// Distribution choices.
    pub options: SrlOptions,
    /// Number of employees, which selects the micro tax rate.
    pub employee_count: u32,
}

impl NetIncomeFn for SrlArm<'_> {
    fn net_income(&self, income: Decimal, expenses: Decimal) -> EngineResult<Decimal> {
        Ok(
            compute_micro_company(income, expenses, self.employee_count, &self.options, self.rules)?
                .net,
        )
    }
}

/// Scan parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakEvenQuery {
    /// First income evaluated.
    pub floor: Decimal,
    /// Last income evaluated (inclusive).
    pub ceiling: Decimal,
    /// Increment between evaluations.
    pub step: Decimal,
    /// Expenses as a fraction of income, passed to both arms.
    pub expense_rate: Decimal,
}

impl Default for BreakEvenQuery {
    fn default() -> Self {
        Self {
            floor: DEFAULT_FLOOR,
            ceiling: DEFAULT_CEILING,
            step: DEFAULT_STEP,
            expense_rate: Decimal::ZERO,
        }
    }
}

impl BreakEvenQuery {
    fn validate(&self) -> EngineResult<()> {
        ensure_non_negative("floor", self.floor)?;
        ensure_non_negative("ceiling", self.ceiling)?;
        ensure_non_negative("step", self.step)?;
        ensure_fraction("expense_rate", self.expense_rate)?;
        if self.step <= Decimal::ZERO {
            return Err(EngineError::invalid_input("step", "must be positive"));
        }
        if self.floor > self.ceiling {
            return Err(EngineError::invalid_input(
                "ceiling",
                format!("must not be below floor {}", self.floor),
            ));
        }
        let points = (self.ceiling - self.floor)
            .checked_div(self.step)
            .map(|p| p.floor());
        if points.is_none_or(|p| p >= Decimal::from(MAX_SCAN_POINTS)) {
            return Err(EngineError::invalid_input(
                "step",
                format!("scan would exceed {} points", MAX_SCAN_POINTS),
            ));
        }
        Ok(())
    }
}

/// Outcome of a break-even scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakEvenResult {
    /// First scanned income at which arm B's net exceeds arm A's after
    /// having been below it; `None` when no such crossing occurs.
    pub break_even_income: Option<Decimal>,
    /// Arm A's net at the crossing.
    pub net_a: Option<Decimal>,
    /// Arm B's net at the crossing.
    pub net_b: Option<Decimal>,
    /// Incomes evaluated.
    pub points_scanned: u32,
    /// Whether arm B already had the higher net at the floor.
    pub b_leads_at_floor: bool,
}

/// Finds the first income at which `arm_b` overtakes `arm_a`.
///
/// Points where both nets are equal do not reset the search: a crossing
/// is reported at the first strictly positive difference that follows a
/// strictly negative one.
///
/// # Errors
///
/// Returns `InvalidInput` for a non-positive step, a floor above the
/// ceiling, an expense rate outside `[0, 1]` or an oversized scan, and
/// propagates any error raised by an arm.
///
/// # Examples
///
/// ```
/// use fiscal_engine::calculation::{BreakEvenQuery, find_break_even};
/// use fiscal_engine::error::EngineResult;
/// use rust_decimal::Decimal;
/// use rust_decimal_macros::dec;
///
/// let flat = |income: Decimal, _: Decimal| -> EngineResult<Decimal> { Ok(income * dec!(0.6)) };
/// let steep = |income: Decimal, _: Decimal| -> EngineResult<Decimal> {
///     Ok(income * dec!(0.7) - dec!(20000))
/// };
///
/// let result = find_break_even(&flat, &steep, &BreakEvenQuery::default()).unwrap();
/// assert_eq!(result.break_even_income, Some(dec!(201000)));
/// ```
pub fn find_break_even<A, B>(
    arm_a: &A,
    arm_b: &B,
    query: &BreakEvenQuery,
) -> EngineResult<BreakEvenResult>
where
    A: NetIncomeFn + ?Sized,
    B: NetIncomeFn + ?Sized,
{
    query.validate()?;

    let mut income = query.floor;
    let mut previous_sign: Option<bool> = None;
    let mut points_scanned = 0u32;
    let mut b_leads_at_floor = false;

    while income <= query.ceiling {
        let expenses = round_money(income * query.expense_rate);
        let net_a = arm_a.net_income(income, expenses)?;
        let net_b = arm_b.net_income(income, expenses)?;
        let diff = net_b - net_a;

        if points_scanned == 0 {
            b_leads_at_floor = diff > Decimal::ZERO;
        }
        points_scanned += 1;

        if diff > Decimal::ZERO && previous_sign == Some(false) {
            debug!(
                break_even_income = %income,
                net_a = %net_a,
                net_b = %net_b,
                points_scanned,
                "Found break-even income"
            );
            return Ok(BreakEvenResult {
                break_even_income: Some(income),
                net_a: Some(net_a),
                net_b: Some(net_b),
                points_scanned,
                b_leads_at_floor,
            });
        }

        if !diff.is_zero() {
            previous_sign = Some(diff > Decimal::ZERO);
        }
        income += query.step;
    }

    debug!(points_scanned, b_leads_at_floor, "No break-even income in range");

    Ok(BreakEvenResult {
        break_even_income: None,
        net_a: None,
        net_b: None,
        points_scanned,
        b_leads_at_floor,
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

    fn flat(income: Decimal, _expenses: Decimal) -> EngineResult<Decimal> {
        Ok(income * dec!(0.6))
    }

    fn steep(income: Decimal, _expenses: Decimal) -> EngineResult<Decimal> {
        Ok(income * dec!(0.7) - dec!(20000))
    }

    #[test]
    fn test_crossing_skips_exact_tie() {
        // diff is -1000 at 190000, 0 at 200000 and +100 at 201000
        let result = find_break_even(&flat, &steep, &BreakEvenQuery::default()).unwrap();

        assert_eq!(result.break_even_income, Some(dec!(201000)));
        assert_eq!(result.net_a, Some(dec!(120600)));
        assert_eq!(result.net_b, Some(dec!(120700)));
        assert_eq!(result.points_scanned, 192);
        assert!(!result.b_leads_at_floor);
    }

    #[test]
    fn test_no_crossing_when_b_never_leads() {
        let result = find_break_even(&steep, &flat, &BreakEvenQuery::default()).unwrap();

        assert_eq!(result.break_even_income, None);
        assert!(result.b_leads_at_floor);
        assert_eq!(result.points_scanned, 491);
    }

    #[test]
    fn test_only_first_crossing_is_reported() {
        let a = |_: Decimal, _: Decimal| -> EngineResult<Decimal> { Ok(Decimal::ZERO) };
        // Negative, positive from 20000, negative from 30000, positive from 40000.
        let b = |income: Decimal, _: Decimal| -> EngineResult<Decimal> {
            Ok(if income < dec!(20000) || (income >= dec!(30000) && income < dec!(40000)) {
                dec!(-1)
            } else {
                dec!(1)
            })
        };

        let result = find_break_even(&a, &b, &BreakEvenQuery::default()).unwrap();
        assert_eq!(result.break_even_income, Some(dec!(20000)));
    }

    #[test]
    fn test_expense_rate_is_passed_to_arms() {
        let a = |_: Decimal, _: Decimal| -> EngineResult<Decimal> { Ok(dec!(1000)) };
        let b = |_: Decimal, expenses: Decimal| -> EngineResult<Decimal> { Ok(expenses) };
        let query = BreakEvenQuery {
            expense_rate: dec!(0.05),
            ..BreakEvenQuery::default()
        };

        let result = find_break_even(&a, &b, &query).unwrap();
        assert_eq!(result.break_even_income, Some(dec!(21000)));
    }

    #[test]
    fn test_invalid_queries_are_rejected() {
        let zero_step = BreakEvenQuery {
            step: Decimal::ZERO,
            ..BreakEvenQuery::default()
        };
        assert!(find_break_even(&flat, &steep, &zero_step).is_err());

        let inverted = BreakEvenQuery {
            floor: dec!(600000),
            ..BreakEvenQuery::default()
        };
        assert!(find_break_even(&flat, &steep, &inverted).is_err());

        let bad_rate = BreakEvenQuery {
            expense_rate: dec!(1.2),
            ..BreakEvenQuery::default()
        };
        assert!(find_break_even(&flat, &steep, &bad_rate).is_err());

        let oversized = BreakEvenQuery {
            step: dec!(0.0001),
            ..BreakEvenQuery::default()
        };
        assert!(find_break_even(&flat, &steep, &oversized).is_err());
    }

    #[test]
    fn test_extreme_bounds_are_rejected() {
        let huge_ceiling = BreakEvenQuery {
            ceiling: Decimal::MAX,
            ..BreakEvenQuery::default()
        };
        assert!(matches!(
            find_break_even(&flat, &steep, &huge_ceiling),
            Err(EngineError::InvalidInput { .. })
        ));

        let tiny_step = BreakEvenQuery {
            step: Decimal::new(1, 28),
            ..BreakEvenQuery::default()
        };
        assert!(matches!(
            find_break_even(&flat, &steep, &tiny_step),
            Err(EngineError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_arm_errors_propagate() {
        let failing = |_: Decimal, _: Decimal| -> EngineResult<Decimal> {
            Err(EngineError::invalid_input("income", "rejected"))
        };
        assert!(find_break_even(&flat, &failing, &BreakEvenQuery::default()).is_err());
    }

    #[test]
    fn test_single_point_scan() {
        let query = BreakEvenQuery {
            floor: dec!(50000),
            ceiling: dec!(50000),
            ..BreakEvenQuery::default()
        };
        let result = find_break_even(&flat, &steep, &query).unwrap();
        assert_eq!(result.points_scanned, 1);
        assert_eq!(result.break_even_income, None);
    }

    #[test]
    fn test_engine_arms_match_direct_calls() {
        let rules = rules_2025();

        let pfa = PfaRealArm {
            rules: &rules,
            options: PfaOptions::default(),
        };
        let direct = compute_real_system(dec!(100000), dec!(20000), &PfaOptions::default(), &rules)
            .unwrap();
        assert_eq!(pfa.net_income(dec!(100000), dec!(20000)).unwrap(), direct.net);

        let salary = SalaryArm {
            rules: &rules,
            regime: SalaryRegime::Standard,
            options: SalaryOptions::default(),
            basis: SalaryBasis::AnnualGross,
        };
        // 8000 per month: net 4680
        assert_eq!(
            salary.net_income(dec!(96000), Decimal::ZERO).unwrap(),
            dec!(56160)
        );

        let srl = SrlArm {
            rules: &rules,
            options: SrlOptions::default(),
            employee_count: 1,
        };
        assert_eq!(
            srl.net_income(dec!(200000), dec!(50000)).unwrap(),
            dec!(118400)
        );

        let norm = PfaNormArm {
            rules: &rules,
            options: PfaOptions::default(),
            norm_value: dec!(30000),
        };
        assert_eq!(
            norm.net_income(dec!(100000), dec!(20000)).unwrap(),
            dec!(74300)
        );
    }

    #[test]
    fn test_pfa_norm_overtakes_real_system() {
        let rules = rules_2025();
        let real = PfaRealArm {
            rules: &rules,
            options: PfaOptions::default(),
        };
        let norm = PfaNormArm {
            rules: &rules,
            options: PfaOptions::default(),
            norm_value: dec!(30000),
        };

        let result = find_break_even(&real, &norm, &BreakEvenQuery::default()).unwrap();
        let income = result.break_even_income.unwrap();
        assert!(result.net_b.unwrap() > result.net_a.unwrap());
        assert!(income > dec!(10000) && income <= dec!(500000));
    }
}
