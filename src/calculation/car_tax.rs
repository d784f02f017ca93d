//! Annual vehicle tax calculation.
//!
//! The tax is computed in five inspectable steps:
//! 1. Count 200 cm3 fractions of the engine displacement (rounded up)
//! 2. Look up the rate per fraction for the vehicle type, displacement
//!    bracket and emission class
//! 3. Multiply into the base tax (hybrids get a reduction, electric vehicles
//!    pay a fixed fee instead)
//! 4. Apply the locality coefficient and round to whole lei
//! 5. Add the luxury surtax on the purchase price above the threshold

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use crate::config::{CarTaxRules, RuleSet};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AuditTrace, AuditWarning, DisplacementBracket, EmissionClass, MotorcycleBracket, VehicleType,
};

use super::rounding::round_lei;
use super::validation::ensure_non_negative;

/// Displacement covered by one tax fraction, in cm3.
pub const FRACTION_CC: u32 = 200;

/// Warning code raised when the locality has no coefficient.
pub const UNKNOWN_LOCALITY: &str = "UNKNOWN_LOCALITY";

/// Vehicle tax with every intermediate step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarTaxResult {
    /// Engine displacement in cm3.
    pub engine_cc: u32,
    /// Vehicle type.
    pub vehicle_type: VehicleType,
    /// Emission class.
    pub emission_class: EmissionClass,
    /// Step 1: number of 200 cm3 fractions.
    pub fractions: u32,
    /// Step 2: rate per fraction (zero for electric vehicles).
    pub rate_per_fraction: Decimal,
    /// Step 3: base tax before the locality coefficient.
    pub base_tax: Decimal,
    /// Amount waived from the base tax for hybrids.
    pub hybrid_reduction: Decimal,
    /// Locality as supplied.
    pub locality: String,
    /// Step 4: locality coefficient applied.
    pub locality_coefficient: Decimal,
    /// Whether the locality was found in the coefficient table.
    pub locality_known: bool,
    /// Base tax times the coefficient, rounded to whole lei.
    pub local_tax: Decimal,
    /// Step 5: luxury surtax, rounded to whole lei.
    pub luxury_surtax: Decimal,
    /// Local tax plus luxury surtax.
    pub total_tax: Decimal,
    /// Audit trace of the calculation.
    pub audit_trace: AuditTrace,
}

/// Counts 200 cm3 fractions, rounding up.
///
/// # Examples
///
/// ```
/// use fiscal_engine::calculation::fractions;
///
/// assert_eq!(fractions(1598), 8);
/// assert_eq!(fractions(1600), 8);
/// assert_eq!(fractions(1601), 9);
/// ```
pub fn fractions(engine_cc: u32) -> u32 {
    engine_cc.div_ceil(FRACTION_CC)
}

/// Looks up the rate per fraction; `None` for electric vehicles.
fn rate_per_fraction(
    engine_cc: u32,
    vehicle_type: VehicleType,
    emission_class: EmissionClass,
    rules: &CarTaxRules,
) -> EngineResult<Option<Decimal>> {
    let rate = match vehicle_type {
        VehicleType::Electric => return Ok(None),
        VehicleType::Motorcycle | VehicleType::Moped => {
            let bracket = MotorcycleBracket::for_displacement(engine_cc);
            rules.motorcycle_rates.get(&bracket).copied()
        }
        VehicleType::Car | VehicleType::Hybrid => {
            let bracket = DisplacementBracket::for_displacement(engine_cc);
            rules
                .rates
                .get(&bracket)
                .and_then(|row| row.get(&emission_class))
                .copied()
        }
    };

    rate.map(Some).ok_or_else(|| {
        EngineError::invalid_rules(format!(
            "no car tax rate for {:?} {} cm3 {:?}",
            vehicle_type, engine_cc, emission_class
        ))
    })
}

/// Looks up a locality coefficient, trimmed and case-insensitive.
pub fn locality_coefficient(locality: &str, rules: &CarTaxRules) -> Option<Decimal> {
    let key = locality.trim().to_lowercase();
    rules.locality_coefficients.get(&key).copied().or_else(|| {
        rules
            .locality_coefficients
            .iter()
            .find(|(name, _)| name.trim().to_lowercase() == key)
            .map(|(_, coefficient)| *coefficient)
    })
}

/// Computes the annual vehicle tax.
///
/// # Arguments
///
/// * `engine_cc` - Engine displacement in cm3
/// * `vehicle_type` - Car, hybrid, motorcycle, moped or electric
/// * `emission_class` - Euro norm (ignored for two-wheelers and electric vehicles)
/// * `locality` - Municipality name
/// * `purchase_price` - Purchase price in RON, for the luxury surtax
/// * `rules` - Rule set for the fiscal year
///
/// # Examples
///
/// ```no_run
/// use fiscal_engine::calculation::compute_car_tax;
/// use fiscal_engine::config::ConfigLoader;
/// use fiscal_engine::models::{EmissionClass, VehicleType};
/// use rust_decimal_macros::dec;
///
/// let loader = ConfigLoader::load("config").unwrap();
/// let rules = loader.rule_set(2025).unwrap();
///
/// let result = compute_car_tax(1600, VehicleType::Car, EmissionClass::Euro4, "Bucuresti", dec!(80000), rules).unwrap();
/// assert_eq!(result.fractions, 8);
/// assert_eq!(result.base_tax, dec!(156));
/// assert_eq!(result.local_tax, dec!(181));
/// ```
pub fn compute(
    engine_cc: u32,
    vehicle_type: VehicleType,
    emission_class: EmissionClass,
    locality: &str,
    purchase_price: Decimal,
    rules: &RuleSet,
) -> EngineResult<CarTaxResult> {
    ensure_non_negative("purchase_price", purchase_price)?;
    let car_tax = rules.car_tax();
    let mut trace = AuditTrace::default();

    let fraction_count = fractions(engine_cc);
    trace.record(
        "car_tax_fractions",
        "Displacement Fractions",
        "Codul fiscal art. 470",
        json!({ "engine_cc": engine_cc }),
        json!({ "fractions": fraction_count }),
        format!(
            "ceil({} / {}) = {} fractions",
            engine_cc, FRACTION_CC, fraction_count
        ),
    );

    let rate = rate_per_fraction(engine_cc, vehicle_type, emission_class, car_tax)?;
    trace.record(
        "car_tax_rate",
        "Rate per Fraction",
        "Codul fiscal art. 470 alin. (2)",
        json!({
            "vehicle_type": format!("{:?}", vehicle_type),
            "emission_class": format!("{:?}", emission_class),
        }),
        json!({
            "rate_per_fraction": rate.map(|r| r.normalize().to_string()),
        }),
        match rate {
            Some(r) => format!("Rate {} per fraction", r.normalize()),
            None => "Electric vehicles pay a fixed fee".to_string(),
        },
    );

    let (base_tax, hybrid_reduction) = match rate {
        None => (car_tax.electric_fee, Decimal::ZERO),
        Some(r) => {
            let gross_base = Decimal::from(fraction_count) * r;
            let reduction = if vehicle_type == VehicleType::Hybrid {
                gross_base * car_tax.hybrid_reduction
            } else {
                Decimal::ZERO
            };
            (gross_base - reduction, reduction)
        }
    };
    trace.record(
        "car_tax_base",
        "Base Tax",
        "Codul fiscal art. 470",
        json!({
            "fractions": fraction_count,
            "rate_per_fraction": rate.map(|r| r.normalize().to_string()),
            "hybrid_reduction": hybrid_reduction.normalize().to_string(),
        }),
        json!({ "base_tax": base_tax.normalize().to_string() }),
        match rate {
            Some(r) => format!(
                "{} × {} - {} = {}",
                fraction_count,
                r.normalize(),
                hybrid_reduction.normalize(),
                base_tax.normalize()
            ),
            None => format!("Electric fee {}", base_tax.normalize()),
        },
    );

    let known = locality_coefficient(locality, car_tax);
    let coefficient = known.unwrap_or(Decimal::ONE);
    if known.is_none() {
        warn!(locality, "Unknown locality, using coefficient 1.0");
        trace.warnings.push(AuditWarning::new(
            UNKNOWN_LOCALITY,
            format!("No coefficient for locality '{}'; 1.0 applied", locality.trim()),
            "low",
        ));
    }
    let local_tax = round_lei(base_tax * coefficient);
    trace.record(
        "car_tax_locality",
        "Locality Coefficient",
        "Codul fiscal art. 489",
        json!({
            "locality": locality.trim(),
            "base_tax": base_tax.normalize().to_string(),
        }),
        json!({
            "coefficient": coefficient.normalize().to_string(),
            "local_tax": local_tax.normalize().to_string(),
        }),
        format!(
            "round({} × {}) = {}",
            base_tax.normalize(),
            coefficient.normalize(),
            local_tax.normalize()
        ),
    );

    let excess = (purchase_price - car_tax.luxury_threshold).max(Decimal::ZERO);
    let luxury_surtax = round_lei(excess * car_tax.luxury_rate);
    trace.record(
        "car_tax_luxury",
        "Luxury Surtax",
        "Codul fiscal art. 470 alin. (5^1)",
        json!({
            "purchase_price": purchase_price.normalize().to_string(),
            "threshold": car_tax.luxury_threshold.normalize().to_string(),
        }),
        json!({ "luxury_surtax": luxury_surtax.normalize().to_string() }),
        format!(
            "{} × {} = {}",
            excess.normalize(),
            car_tax.luxury_rate.normalize(),
            luxury_surtax.normalize()
        ),
    );

    let total_tax = local_tax + luxury_surtax;

    debug!(
        engine_cc,
        vehicle_type = ?vehicle_type,
        local_tax = %local_tax,
        luxury_surtax = %luxury_surtax,
        "Computed car tax"
    );

    Ok(CarTaxResult {
        engine_cc,
        vehicle_type,
        emission_class,
        fractions: fraction_count,
        rate_per_fraction: rate.unwrap_or(Decimal::ZERO),
        base_tax,
        hybrid_reduction,
        locality: locality.to_string(),
        locality_coefficient: coefficient,
        locality_known: known.is_some(),
        local_tax,
        luxury_surtax,
        total_tax,
        audit_trace: trace,
    })
}
