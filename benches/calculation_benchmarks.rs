//! Performance benchmarks for the fiscal computation engine.
//!
//! This benchmark suite covers the calculators with non-trivial loops:
//! - Gross to net (single pass)
//! - Net to gross (iterative inversion)
//! - Break-even scan between PFA and micro-company
//! - E-invoice deadlines across a year of invoice dates
//!
//! Run with: `cargo bench`
//! HTML reports are generated in `target/criterion/`

use chrono::{Days, NaiveDate};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rust_decimal_macros::dec;

use fiscal_engine::calculation::{
    BreakEvenQuery, HolidayCalendar, PfaOptions, PfaRealArm, SalaryOptions, SalaryRegime, SrlArm,
    SrlOptions, compute_deadline, compute_gross_to_net, compute_net_to_gross, find_break_even,
};
use fiscal_engine::config::{ConfigLoader, RuleSet};

/// Loads the 2025 rule set.
fn load_rules() -> RuleSet {
    ConfigLoader::load("./config")
        .expect("Failed to load config")
        .rule_set(2025)
        .expect("2025 rule set")
        .clone()
}

/// Benchmark: Gross to net for one monthly salary.
fn bench_gross_to_net(c: &mut Criterion) {
    let rules = load_rules();
    let options = SalaryOptions::default();

    c.bench_function("gross_to_net", |b| {
        b.iter(|| {
            compute_gross_to_net(
                black_box(dec!(7500)),
                SalaryRegime::Standard,
                &options,
                &rules,
            )
        })
    });
}

/// Benchmark: Net to gross inversion at several targets.
fn bench_net_to_gross(c: &mut Criterion) {
    let rules = load_rules();
    let options = SalaryOptions::default();

    let mut group = c.benchmark_group("net_to_gross");

    for target in [dec!(2500), dec!(4680), dec!(10000), dec!(30000)] {
        group.bench_with_input(BenchmarkId::new("target", target), &target, |b, target| {
            b.iter(|| {
                compute_net_to_gross(black_box(*target), SalaryRegime::Standard, &options, &rules)
            })
        });
    }

    group.finish();
}

/// Benchmark: Break-even scan over the default income range.
fn bench_break_even(c: &mut Criterion) {
    let rules = load_rules();
    let pfa = PfaRealArm {
        rules: &rules,
        options: PfaOptions::default(),
    };
    let srl = SrlArm {
        rules: &rules,
        options: SrlOptions::default(),
        employee_count: 1,
    };
    let query = BreakEvenQuery {
        expense_rate: dec!(0.2),
        ..BreakEvenQuery::default()
    };

    let mut group = c.benchmark_group("break_even");
    // Each iteration runs a full scan
    group.sample_size(20);

    group.bench_function("pfa_vs_micro", |b| {
        b.iter(|| find_break_even(&pfa, &srl, black_box(&query)))
    });

    group.finish();
}

/// Benchmark: Deadlines for every invoice date of a year.
fn bench_deadlines(c: &mut Criterion) {
    let rules = load_rules();
    let calendar = HolidayCalendar::new();
    let start = NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid date");
    let dates: Vec<NaiveDate> = (0..365)
        .filter_map(|offset| start.checked_add_days(Days::new(offset)))
        .collect();

    let mut group = c.benchmark_group("e_invoice");
    group.throughput(Throughput::Elements(dates.len() as u64));

    group.bench_function("deadlines_2025", |b| {
        b.iter(|| {
            let results: Vec<_> = dates
                .iter()
                .map(|date| compute_deadline(*date, &calendar, &rules))
                .collect();
            black_box(results)
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_gross_to_net,
    bench_net_to_gross,
    bench_break_even,
    bench_deadlines,
);
criterion_main!(benches);
