//! Vehicle classification models used by the car tax engine and its rule tables.

use serde::{Deserialize, Serialize};

/// The kind of vehicle being taxed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleType {
    /// Passenger car with a combustion engine.
    Car,
    /// Hybrid passenger car (taxed on the car table with a reduction).
    Hybrid,
    /// Motorcycle, taxed on the motorcycle table.
    Motorcycle,
    /// Moped, taxed on the motorcycle table.
    Moped,
    /// Fully electric vehicle, fixed fee.
    Electric,
}

impl VehicleType {
    /// Returns true for vehicles taxed on the motorcycle table.
    pub fn is_two_wheeler(self) -> bool {
        matches!(self, VehicleType::Motorcycle | VehicleType::Moped)
    }
}

/// Pollution norm of a vehicle. `Euro3` covers Euro 1 to Euro 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmissionClass {
    /// No Euro norm.
    NonEuro,
    /// Euro 1 to Euro 3.
    Euro3,
    /// Euro 4.
    Euro4,
    /// Euro 5.
    Euro5,
    /// Euro 6 and later.
    Euro6,
}

impl EmissionClass {
    /// Every emission class, in table order.
    pub const ALL: [EmissionClass; 5] = [
        EmissionClass::NonEuro,
        EmissionClass::Euro3,
        EmissionClass::Euro4,
        EmissionClass::Euro5,
        EmissionClass::Euro6,
    ];
}

/// Engine displacement bracket for the car rate table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DisplacementBracket {
    /// Up to 1600 cm3 inclusive.
    #[serde(rename = "up_to_1600")]
    UpTo1600,
    /// 1601 to 2000 cm3.
    #[serde(rename = "from_1601_to_2000")]
    From1601To2000,
    /// 2001 to 2600 cm3.
    #[serde(rename = "from_2001_to_2600")]
    From2001To2600,
    /// 2601 to 3000 cm3.
    #[serde(rename = "from_2601_to_3000")]
    From2601To3000,
    /// Over 3000 cm3.
    #[serde(rename = "over_3000")]
    Over3000,
}

impl DisplacementBracket {
    /// Every displacement bracket, in ascending order.
    pub const ALL: [DisplacementBracket; 5] = [
        DisplacementBracket::UpTo1600,
        DisplacementBracket::From1601To2000,
        DisplacementBracket::From2001To2600,
        DisplacementBracket::From2601To3000,
        DisplacementBracket::Over3000,
    ];

    /// Returns the bracket an engine displacement falls into.
    ///
    /// # Example
    ///
    /// ```
    /// use fiscal_engine::models::DisplacementBracket;
    ///
    /// assert_eq!(DisplacementBracket::for_displacement(1600), DisplacementBracket::UpTo1600);
    /// assert_eq!(DisplacementBracket::for_displacement(1601), DisplacementBracket::From1601To2000);
    /// ```
    pub fn for_displacement(engine_cc: u32) -> Self {
        match engine_cc {
            0..=1600 => DisplacementBracket::UpTo1600,
            1601..=2000 => DisplacementBracket::From1601To2000,
            2001..=2600 => DisplacementBracket::From2001To2600,
            2601..=3000 => DisplacementBracket::From2601To3000,
            _ => DisplacementBracket::Over3000,
        }
    }
}

/// Engine displacement bracket for the narrower motorcycle and moped table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MotorcycleBracket {
    /// Up to 1600 cm3 inclusive.
    #[serde(rename = "up_to_1600")]
    UpTo1600,
    /// Over 1600 cm3.
    #[serde(rename = "over_1600")]
    Over1600,
}

impl MotorcycleBracket {
    /// Every motorcycle bracket, in ascending order.
    pub const ALL: [MotorcycleBracket; 2] = [MotorcycleBracket::UpTo1600, MotorcycleBracket::Over1600];

    /// Returns the bracket an engine displacement falls into.
    pub fn for_displacement(engine_cc: u32) -> Self {
        if engine_cc <= 1600 {
            MotorcycleBracket::UpTo1600
        } else {
            MotorcycleBracket::Over1600
        }
    }
}
