//! Calculation logic for the fiscal computation engine.
//!
//! This module contains the regime calculators (salary in its four regimes,
//! PFA real system and income norm, SRL micro-company), the break-even search
//! across regimes, medical leave indemnity, local vehicle tax, the e-invoice
//! deadline and penalty engine over the Romanian holiday calendar, and EU261
//! flight compensation.
//!
//! Every calculator is a pure function of its inputs and a read-only
//! [`RuleSet`](crate::config::RuleSet).

mod break_even;
mod car_tax;
mod e_invoice;
mod flight;
mod holidays;
mod medical_leave;
mod pfa;
mod rounding;
mod salary;
mod srl;
mod validation;

pub use break_even::{
    BreakEvenQuery, BreakEvenResult, DEFAULT_CEILING, DEFAULT_FLOOR, DEFAULT_STEP,
    MAX_SCAN_POINTS, NetIncomeFn, PfaNormArm, PfaRealArm, SalaryArm, SalaryBasis, SrlArm,
    find_break_even,
};
pub use car_tax::{
    CarTaxResult, FRACTION_CC, UNKNOWN_LOCALITY, compute as compute_car_tax, fractions,
    locality_coefficient,
};
pub use e_invoice::{
    DeadlineResult, DelayBucket, DelayResult, FIRST_OFFENSE_WARNING, InvoiceProfile,
    PenaltyResult, PenaltyScenario, TransmissionAssessment, assess_transmission, compute_deadline,
    compute_delay, compute_penalty, delay_bucket,
};
pub use flight::{
    ClaimAssessment, CompensationResult, Disruption, DisruptionCause, EARTH_RADIUS_KM,
    ExceptionResult, FlightClaim, assess_claim, classify_exception, compute_compensation,
    distance_bracket, distance_km,
};
pub use holidays::{HolidayCalendar, orthodox_easter};
pub use medical_leave::{
    DAYS_CAPPED, EligibilityResult, MaternityResult, MedicalLeaveResult, POSTNATAL_MINIMUM,
    average_base_salary, check_eligibility, compute as compute_medical_leave, compute_maternity,
};
pub use pfa::{
    NORM_CEILING_EXCEEDED, PfaComparison, PfaOptions, PfaVariant, cas_base, cass_base,
    compare as compare_pfa, compute_income_norm, compute_real_system,
};
pub use rounding::{HUNDRED, percent_of, round_lei, round_money};
pub use salary::{
    DEFAULT_DAMPING, DEFAULT_INITIAL_FACTOR, DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE,
    EMPLOYER_TOP_UP, EXEMPTION_THRESHOLD_EXCEEDED, MAX_INITIAL_FACTOR, NON_CONVERGENCE,
    SalaryOptions, SalaryRegime, SolverSettings, compute_cost_to_net, compute_gross_to_net,
    compute_net_to_gross, personal_deduction,
};
pub use srl::{MICRO_CEILING_EXCEEDED, SrlOptions, compute_micro_company};
pub use validation::MAX_AMOUNT;
