//! EU261 flight compensation.
//!
//! Compensation depends on the great-circle distance of the flight, the
//! arrival delay and the kind of disruption. Extraordinary circumstances
//! waive the monetary compensation but never the duty of assistance.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{FlightRules, RuleSet};
use crate::error::{EngineError, EngineResult};
use crate::models::{Airport, DistanceBracket, GeoPoint};

use super::validation::ensure_finite_non_negative;

/// Mean Earth radius used for great-circle distances, in km.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

const TWO: Decimal = Decimal::from_parts(2, 0, 0, false, 0);

/// Kind of flight disruption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disruption {
    /// Late arrival at the final destination.
    Delay,
    /// Flight cancelled.
    Cancellation,
    /// Passenger denied boarding against their will.
    DeniedBoarding,
}

/// Cause of a disruption, as categorized by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisruptionCause {
    /// Weather incompatible with safe operation.
    Weather,
    /// Air traffic management decision.
    AirTrafficControl,
    /// Security risk at the airport or on board.
    SecurityRisk,
    /// Political instability or war.
    PoliticalInstability,
    /// Strike by staff outside the carrier (airport, air traffic control).
    ExternalStrike,
    /// Collision with a bird.
    BirdStrike,
    /// Hidden manufacturing defect disclosed by the manufacturer.
    HiddenManufacturingDefect,
    /// Technical fault of the aircraft.
    TechnicalFault,
    /// Strike by the carrier's own staff.
    AirlineStaffStrike,
    /// Overbooking.
    Overbooking,
    /// Crew scheduling or other operational reasons.
    Operational,
}

impl DisruptionCause {
    /// Whether the cause counts as an extraordinary circumstance.
    pub fn is_extraordinary(self) -> bool {
        matches!(
            self,
            DisruptionCause::Weather
                | DisruptionCause::AirTrafficControl
                | DisruptionCause::SecurityRisk
                | DisruptionCause::PoliticalInstability
                | DisruptionCause::ExternalStrike
                | DisruptionCause::BirdStrike
                | DisruptionCause::HiddenManufacturingDefect
        )
    }

    /// Suggests a cause from a free-text reason given by the carrier.
    ///
    /// This is a keyword match meant to pre-fill a form; it is never used
    /// to decide a claim. Keywords match whole words, or the start of a
    /// word for stems. Returns `None` when nothing matches.
    pub fn suggest_from_text(text: &str) -> Option<DisruptionCause> {
        use Keyword::{Stem, Words};

        const KEYWORDS: &[(Keyword, DisruptionCause)] = &[
            (Stem("meteo"), DisruptionCause::Weather),
            (Words("weather"), DisruptionCause::Weather),
            (Stem("furtun"), DisruptionCause::Weather),
            (Stem("storm"), DisruptionCause::Weather),
            (Words("ceata"), DisruptionCause::Weather),
            (Words("fog"), DisruptionCause::Weather),
            (Stem("zapad"), DisruptionCause::Weather),
            (Stem("snow"), DisruptionCause::Weather),
            (Words("air traffic"), DisruptionCause::AirTrafficControl),
            (Words("trafic aerian"), DisruptionCause::AirTrafficControl),
            (Words("atc"), DisruptionCause::AirTrafficControl),
            (Stem("secur"), DisruptionCause::SecurityRisk),
            (Stem("politic"), DisruptionCause::PoliticalInstability),
            (Stem("razboi"), DisruptionCause::PoliticalInstability),
            (Words("war"), DisruptionCause::PoliticalInstability),
            (Stem("pasar"), DisruptionCause::BirdStrike),
            (Stem("bird"), DisruptionCause::BirdStrike),
            (Words("defect de fabricatie"), DisruptionCause::HiddenManufacturingDefect),
            (Words("manufacturing"), DisruptionCause::HiddenManufacturingDefect),
            (Stem("grev"), DisruptionCause::ExternalStrike),
            (Stem("strike"), DisruptionCause::ExternalStrike),
            (Stem("tehnic"), DisruptionCause::TechnicalFault),
            (Words("technical"), DisruptionCause::TechnicalFault),
            (Stem("overbook"), DisruptionCause::Overbooking),
            (Stem("suprarezerv"), DisruptionCause::Overbooking),
            (Words("crew"), DisruptionCause::Operational),
            (Stem("echipaj"), DisruptionCause::Operational),
            (Stem("operational"), DisruptionCause::Operational),
        ];

        let lowered = text.to_lowercase();
        let words: Vec<&str> = lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|word| !word.is_empty())
            .collect();

        KEYWORDS
            .iter()
            .find(|(keyword, _)| keyword.matches(&words))
            .map(|(_, cause)| *cause)
    }
}

/// A keyword of [`DisruptionCause::suggest_from_text`].
#[derive(Debug, Clone, Copy)]
enum Keyword {
    /// One or more whole words, in order.
    Words(&'static str),
    /// The start of a single word.
    Stem(&'static str),
}

impl Keyword {
    fn matches(self, words: &[&str]) -> bool {
        match self {
            Keyword::Stem(stem) => words.iter().any(|word| word.starts_with(stem)),
            Keyword::Words(phrase) => {
                let wanted: Vec<&str> = phrase.split(' ').collect();
                words.windows(wanted.len()).any(|window| window == wanted.as_slice())
            }
        }
    }
}

/// Monetary compensation owed for a disruption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompensationResult {
    /// Whether compensation is owed.
    pub eligible: bool,
    /// Whether the flight falls under EU261.
    pub eu_jurisdiction: bool,
    /// Kind of disruption.
    pub disruption: Disruption,
    /// Distance bracket.
    pub bracket: DistanceBracket,
    /// Great-circle distance in km.
    pub distance_km: f64,
    /// Arrival delay in hours.
    pub delay_hours: f64,
    /// Bracket amount before any reduction, in EUR.
    pub full_amount: Decimal,
    /// Whether the amount was halved for a short delay.
    pub reduced: bool,
    /// Compensation owed, in EUR.
    pub amount: Decimal,
}

/// Outcome of classifying a disruption cause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceptionResult {
    /// The cause supplied by the caller.
    pub cause: DisruptionCause,
    /// Whether the cause is an extraordinary circumstance.
    pub extraordinary: bool,
    /// Whether monetary compensation is waived.
    pub compensation_waived: bool,
    /// Whether the carrier still owes care and assistance.
    pub assistance_owed: bool,
    /// Free-text reason, kept for display only.
    pub annotation: Option<String>,
}

/// A passenger claim on one flight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightClaim {
    /// Departure airport.
    pub origin: Airport,
    /// Arrival airport.
    pub destination: Airport,
    /// Whether the operating carrier is licensed in the EU.
    pub eu_carrier: bool,
    /// Arrival delay in hours.
    pub delay_hours: f64,
    /// Kind of disruption.
    pub disruption: Disruption,
    /// Cause, when known.
    pub cause: Option<DisruptionCause>,
    /// Free-text reason given by the carrier.
    pub annotation: Option<String>,
}

impl FlightClaim {
    /// EU261 covers departures from the EU, and arrivals in the EU on an
    /// EU carrier.
    pub fn is_eu_jurisdiction(&self) -> bool {
        self.origin.eu_member || (self.destination.eu_member && self.eu_carrier)
    }
}

/// Full assessment of a claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimAssessment {
    /// Departure airport code.
    pub origin: String,
    /// Arrival airport code.
    pub destination: String,
    /// Compensation before any exception.
    pub compensation: CompensationResult,
    /// Exception classification, when a cause was given.
    pub exception: Option<ExceptionResult>,
    /// Amount payable after exceptions, in EUR.
    pub payable_amount: Decimal,
}

fn check_point(field: &str, point: GeoPoint) -> EngineResult<()> {
    if !point.latitude.is_finite() || !(-90.0..=90.0).contains(&point.latitude) {
        return Err(EngineError::invalid_input(
            field,
            format!("latitude {} out of range", point.latitude),
        ));
    }
    if !point.longitude.is_finite() || !(-180.0..=180.0).contains(&point.longitude) {
        return Err(EngineError::invalid_input(
            field,
            format!("longitude {} out of range", point.longitude),
        ));
    }
    Ok(())
}

/// Great-circle distance between two points in km (Haversine).
///
/// # Examples
///
/// ```
/// use fiscal_engine::calculation::distance_km;
/// use fiscal_engine::models::GeoPoint;
///
/// let otp = GeoPoint { latitude: 44.5711, longitude: 26.0850 };
/// let lhr = GeoPoint { latitude: 51.4700, longitude: -0.4543 };
/// let d = distance_km(otp, lhr).unwrap();
/// assert!((d - 2103.0).abs() < 5.0);
/// assert_eq!(d, distance_km(lhr, otp).unwrap());
/// ```
pub fn distance_km(a: GeoPoint, b: GeoPoint) -> EngineResult<f64> {
    check_point("origin", a)?;
    check_point("destination", b)?;

    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().min(1.0).asin();

    Ok(EARTH_RADIUS_KM * c)
}

/// Distance bracket of a flight.
pub fn distance_bracket(distance_km: f64, rules: &FlightRules) -> DistanceBracket {
    if distance_km < rules.short_haul_max_km {
        DistanceBracket::ShortHaul
    } else if distance_km <= rules.medium_haul_max_km {
        DistanceBracket::MediumHaul
    } else {
        DistanceBracket::LongHaul
    }
}

/// Computes the compensation owed for a disruption.
///
/// Delays qualify from `eligibility_delay_hours`; cancellations and denied
/// boarding qualify regardless of delay. A delay below the bracket's
/// reduction threshold halves the amount.
pub fn compute_compensation(
    distance_km: f64,
    delay_hours: f64,
    eu_jurisdiction: bool,
    disruption: Disruption,
    rules: &RuleSet,
) -> EngineResult<CompensationResult> {
    let distance_km = ensure_finite_non_negative("distance_km", distance_km)?;
    let delay_hours = ensure_finite_non_negative("delay_hours", delay_hours)?;
    let flight = rules.flight();

    let bracket = distance_bracket(distance_km, flight);
    let full_amount = flight
        .compensation_by_bracket
        .get(&bracket)
        .copied()
        .ok_or_else(|| EngineError::invalid_rules(format!("no compensation for {:?}", bracket)))?;
    let threshold = flight
        .reduction_thresholds
        .get(&bracket)
        .copied()
        .ok_or_else(|| {
            EngineError::invalid_rules(format!("no reduction threshold for {:?}", bracket))
        })?;

    let qualifies = match disruption {
        Disruption::Delay => delay_hours >= flight.eligibility_delay_hours,
        Disruption::Cancellation | Disruption::DeniedBoarding => true,
    };
    let eligible = eu_jurisdiction && qualifies;
    let reduced = eligible && disruption == Disruption::Delay && delay_hours < threshold;

    let amount = match (eligible, reduced) {
        (false, _) => Decimal::ZERO,
        (true, true) => full_amount / TWO,
        (true, false) => full_amount,
    };

    debug!(
        distance_km,
        delay_hours,
        bracket = ?bracket,
        eligible,
        amount = %amount,
        "Computed flight compensation"
    );

    Ok(CompensationResult {
        eligible,
        eu_jurisdiction,
        disruption,
        bracket,
        distance_km,
        delay_hours,
        full_amount,
        reduced,
        amount,
    })
}

/// Classifies a disruption cause supplied by the caller.
pub fn classify_exception(cause: DisruptionCause, annotation: Option<String>) -> ExceptionResult {
    let extraordinary = cause.is_extraordinary();
    ExceptionResult {
        cause,
        extraordinary,
        compensation_waived: extraordinary,
        assistance_owed: true,
        annotation,
    }
}

/// Assesses a claim: distance, compensation and exception in one record.
///
/// # Examples
///
/// ```no_run
/// use fiscal_engine::calculation::{Disruption, DisruptionCause, FlightClaim, assess_claim};
/// use fiscal_engine::config::ConfigLoader;
/// use rust_decimal_macros::dec;
///
/// let loader = ConfigLoader::load("config").unwrap();
/// let rules = loader.rule_set(2025).unwrap();
///
/// let claim = FlightClaim {
///     origin: loader.airport("OTP").unwrap().clone(),
///     destination: loader.airport("JFK").unwrap().clone(),
///     eu_carrier: true,
///     delay_hours: 5.0,
///     disruption: Disruption::Delay,
///     cause: Some(DisruptionCause::TechnicalFault),
///     annotation: None,
/// };
/// let result = assess_claim(&claim, rules).unwrap();
/// assert_eq!(result.payable_amount, dec!(600));
/// ```
pub fn assess_claim(claim: &FlightClaim, rules: &RuleSet) -> EngineResult<ClaimAssessment> {
    let distance = distance_km(claim.origin.point(), claim.destination.point())?;
    let compensation = compute_compensation(
        distance,
        claim.delay_hours,
        claim.is_eu_jurisdiction(),
        claim.disruption,
        rules,
    )?;
    let exception = claim
        .cause
        .map(|cause| classify_exception(cause, claim.annotation.clone()));

    let waived = exception.as_ref().is_some_and(|e| e.compensation_waived);
    let payable_amount = if waived {
        Decimal::ZERO
    } else {
        compensation.amount
    };

    Ok(ClaimAssessment {
        origin: claim.origin.iata.clone(),
        destination: claim.destination.iata.clone(),
        compensation,
        exception,
        payable_amount,
    })
}
