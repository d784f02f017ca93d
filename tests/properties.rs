//! Property tests for the fiscal computation engine.
//!
//! Uses proptest to check invariants that must hold for every input, not
//! just the reference scenarios.

use std::sync::OnceLock;

use chrono::{Days, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;

use fiscal_engine::calculation::{
    Disruption, HolidayCalendar, PfaOptions, SalaryOptions, SalaryRegime, cas_base, cass_base,
    compute_compensation, compute_deadline, compute_gross_to_net, compute_net_to_gross,
    compute_real_system, distance_km, fractions,
};
use fiscal_engine::config::{ConfigLoader, RuleSet};
use fiscal_engine::models::{Component, GeoPoint};

fn rules() -> &'static RuleSet {
    static RULES: OnceLock<RuleSet> = OnceLock::new();
    RULES.get_or_init(|| {
        ConfigLoader::load("./config")
            .expect("Failed to load config")
            .rule_set(2025)
            .expect("2025 rule set")
            .clone()
    })
}

fn cents(value: u64) -> Decimal {
    Decimal::new(value as i64, 2)
}

/// Whether `gross` lies within one bracket width of a personal deduction step.
///
/// The deduction changes in steps there, so a net can map to two grosses.
fn near_deduction_step(gross: Decimal) -> bool {
    let brackets = &rules().salary().personal_deduction.brackets;
    let width = brackets
        .windows(2)
        .map(|pair| pair[1].up_to - pair[0].up_to)
        .max()
        .unwrap_or(Decimal::ZERO);
    brackets
        .iter()
        .any(|bracket| (gross - bracket.up_to).abs() <= width)
}

proptest! {
    #[test]
    fn test_standard_salary_identity(gross_cents in 0u64..5_000_000u64) {
        let gross = cents(gross_cents);
        let result = compute_gross_to_net(
            gross,
            SalaryRegime::Standard,
            &SalaryOptions::default(),
            rules(),
        )
        .unwrap();

        let withheld = result.withheld(Component::Cas)
            + result.withheld(Component::Cass)
            + result.withheld(Component::IncomeTax);

        prop_assert!(result.net <= gross, "net {} above gross {}", result.net, gross);
        prop_assert!(result.net >= Decimal::ZERO);
        prop_assert_eq!(withheld + result.net, gross);
    }

    #[test]
    fn test_net_to_gross_round_trip(gross_cents in 0u64..6_000_000u64) {
        let gross = cents(gross_cents);
        prop_assume!(!near_deduction_step(gross));

        let options = SalaryOptions::default();
        let forward = compute_gross_to_net(gross, SalaryRegime::Standard, &options, rules())
            .unwrap();
        let back = compute_net_to_gross(forward.net, SalaryRegime::Standard, &options, rules())
            .unwrap();

        prop_assert!(!back.is_unconverged(), "solver missed net {}", forward.net);
        prop_assert!(
            (back.gross - gross).abs() <= Decimal::ONE,
            "gross {} came back as {}",
            gross,
            back.gross
        );
    }

    #[test]
    fn test_pfa_no_cass_below_lower_threshold_with_opt_out(income in 0u64..24_300u64) {
        let options = PfaOptions {
            opt_out_cass: true,
            opt_in_cas: false,
        };
        let result = compute_real_system(
            Decimal::from(income),
            Decimal::ZERO,
            &options,
            rules(),
        )
        .unwrap();

        prop_assert_eq!(result.withheld(Component::Cass), Decimal::ZERO);
        prop_assert_eq!(result.withheld(Component::Cas), Decimal::ZERO);
    }

    #[test]
    fn test_pfa_bases_are_bounded(base in 0u64..1_000_000u64) {
        let pfa = rules().pfa();
        let options = PfaOptions::default();
        let base = Decimal::from(base);

        let cass = cass_base(base, &options, pfa);
        let cas = cas_base(base, &options, pfa);

        prop_assert!(cass >= pfa.cass_min_threshold());
        prop_assert!(cass <= pfa.cass_max_threshold());
        prop_assert!(cas <= pfa.cas_threshold_24());
        prop_assert!(cas <= base);
    }

    #[test]
    fn test_car_tax_fractions_cover_displacement(engine_cc in 1u32..10_000u32) {
        let n = fractions(engine_cc);
        prop_assert!(n * 200 >= engine_cc);
        prop_assert!((n - 1) * 200 < engine_cc);
    }

    #[test]
    fn test_deadline_lands_on_business_day(offset in 0u64..2_000u64) {
        let calendar = HolidayCalendar::new();
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let invoice = start.checked_add_days(Days::new(offset)).unwrap();

        let result = compute_deadline(invoice, &calendar, rules()).unwrap();

        prop_assert!(calendar.is_business_day(result.deadline));
        prop_assert!(result.deadline > invoice);
        prop_assert_eq!(calendar.business_days_between(invoice, result.deadline), 5);
        for skipped in &result.skipped_dates {
            prop_assert!(!calendar.is_business_day(*skipped));
        }
    }

    #[test]
    fn test_distance_is_symmetric(
        lat_a in -90.0f64..=90.0,
        lon_a in -180.0f64..=180.0,
        lat_b in -90.0f64..=90.0,
        lon_b in -180.0f64..=180.0,
    ) {
        let a = GeoPoint { latitude: lat_a, longitude: lon_a };
        let b = GeoPoint { latitude: lat_b, longitude: lon_b };

        let ab = distance_km(a, b).unwrap();
        let ba = distance_km(b, a).unwrap();

        prop_assert!((ab - ba).abs() < 1e-6);
        prop_assert!(ab >= 0.0);
        prop_assert!(ab <= std::f64::consts::PI * 6371.0 + 1e-6);
    }

    #[test]
    fn test_short_delay_never_compensated(
        distance in 0.0f64..20_000.0,
        delay in 0.0f64..2.99,
    ) {
        let result = compute_compensation(distance, delay, true, Disruption::Delay, rules())
            .unwrap();
        prop_assert!(!result.eligible);
        prop_assert_eq!(result.amount, Decimal::ZERO);
    }
}

#[test]
fn test_cas_base_at_twelve_minimum_wages() {
    let pfa = rules().pfa();
    let base = pfa.cas_threshold_12();
    assert_eq!(cas_base(base, &PfaOptions::default(), pfa), base);
}
