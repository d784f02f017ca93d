//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading yearly fiscal
//! rule sets and airport reference data from YAML files.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::error::{EngineError, EngineResult};
use crate::models::Airport;

use super::types::{RuleSet, RuleSetDocument};

#[derive(Debug, Deserialize)]
struct AirportsFile {
    airports: Vec<Airport>,
}

/// Loads and provides access to fiscal rule sets.
///
/// The `ConfigLoader` reads one YAML file per fiscal year and validates each
/// into a [`RuleSet`]. A loaded rule set is immutable and can be shared by
/// any number of concurrent calculations.
///
/// # Directory Structure
///
/// ```text
/// config/
/// ├── airports.yaml       # Airport coordinates for flight compensation
/// └── rules/
///     ├── 2024.yaml       # Parameters for fiscal year 2024
///     └── 2025.yaml       # Parameters for fiscal year 2025
/// ```
///
/// # Example
///
/// ```no_run
/// use fiscal_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config").unwrap();
/// let rules = loader.rule_set(2025).unwrap();
/// println!("Minimum wage: {}", rules.salary().minimum_wage);
///
/// let otp = loader.airport("OTP").unwrap();
/// println!("Airport: {}", otp.name);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    rule_sets: BTreeMap<i32, RuleSet>,
    airports: BTreeMap<String, Airport>,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration directory (e.g., "./config")
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - The rules directory or `airports.yaml` is missing
    /// - Any file contains invalid YAML
    /// - Any rule set fails validation
    /// - Two rule files declare the same year
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let rule_sets = Self::load_rule_sets(&path.join("rules"))?;

        let airports_file = Self::load_yaml::<AirportsFile>(&path.join("airports.yaml"))?;
        let airports: BTreeMap<String, Airport> = airports_file
            .airports
            .into_iter()
            .map(|airport| (airport.iata.to_uppercase(), airport))
            .collect();

        info!(
            years = ?rule_sets.keys().collect::<Vec<_>>(),
            airports = airports.len(),
            "Loaded fiscal configuration"
        );

        Ok(Self {
            rule_sets,
            airports,
        })
    }

    /// Loads a single rule file and validates it.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use fiscal_engine::config::ConfigLoader;
    ///
    /// let rules = ConfigLoader::load_rule_file("./config/rules/2025.yaml")?;
    /// assert_eq!(rules.year(), 2025);
    /// # Ok::<(), fiscal_engine::error::EngineError>(())
    /// ```
    pub fn load_rule_file<P: AsRef<Path>>(path: P) -> EngineResult<RuleSet> {
        let document = Self::load_yaml::<RuleSetDocument>(path.as_ref())?;
        RuleSet::from_document(document)
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Loads all rule files from the rules directory.
    fn load_rule_sets(rules_dir: &Path) -> EngineResult<BTreeMap<i32, RuleSet>> {
        let rules_dir_str = rules_dir.display().to_string();

        let entries = fs::read_dir(rules_dir).map_err(|_| EngineError::ConfigNotFound {
            path: rules_dir_str.clone(),
        })?;

        let mut rule_sets = BTreeMap::new();

        for entry in entries {
            let entry = entry.map_err(|_| EngineError::ConfigNotFound {
                path: rules_dir_str.clone(),
            })?;

            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "yaml") {
                let rule_set = Self::load_rule_file(&path)?;
                let year = rule_set.year();
                if rule_sets.insert(year, rule_set).is_some() {
                    return Err(EngineError::invalid_rules(format!(
                        "fiscal year {} is defined more than once ({})",
                        year,
                        path.display()
                    )));
                }
            }
        }

        if rule_sets.is_empty() {
            return Err(EngineError::ConfigNotFound {
                path: format!("{} (no rule files found)", rules_dir_str),
            });
        }

        Ok(rule_sets)
    }

    /// Gets the rule set for a fiscal year.
    ///
    /// # Returns
    ///
    /// Returns the rule set if loaded, or `RuleNotFound` otherwise. There is
    /// no fallback to a neighbouring year.
    pub fn rule_set(&self, year: i32) -> EngineResult<&RuleSet> {
        self.rule_sets
            .get(&year)
            .ok_or(EngineError::RuleNotFound { year })
    }

    /// Returns the loaded fiscal years in ascending order.
    pub fn years(&self) -> Vec<i32> {
        self.rule_sets.keys().copied().collect()
    }

    /// Gets an airport by IATA code, case-insensitively.
    pub fn airport(&self, code: &str) -> EngineResult<&Airport> {
        self.airports
            .get(&code.trim().to_uppercase())
            .ok_or_else(|| EngineError::AirportNotFound {
                code: code.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn config_path() -> &'static str {
        "./config"
    }

    #[test]
    fn test_load_valid_configuration() {
        let result = ConfigLoader::load(config_path());
        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());

        let loader = result.unwrap();
        assert_eq!(loader.years(), vec![2024, 2025]);
    }

    #[test]
    fn test_rule_set_for_known_year() {
        let loader = ConfigLoader::load(config_path()).unwrap();

        let rules = loader.rule_set(2025).unwrap();
        assert_eq!(rules.year(), 2025);
        assert_eq!(rules.salary().minimum_wage, dec!(4050));
        assert_eq!(rules.srl().dividend_tax_rate, dec!(0.10));
    }

    #[test]
    fn test_years_differ_in_parameters() {
        let loader = ConfigLoader::load(config_path()).unwrap();

        let rules_2024 = loader.rule_set(2024).unwrap();
        let rules_2025 = loader.rule_set(2025).unwrap();
        assert_eq!(rules_2024.salary().minimum_wage, dec!(3700));
        assert_eq!(rules_2024.srl().dividend_tax_rate, dec!(0.08));
        assert_ne!(
            rules_2024.srl().micro_revenue_ceiling,
            rules_2025.srl().micro_revenue_ceiling
        );
    }

    #[test]
    fn test_rule_set_unknown_year_returns_error() {
        let loader = ConfigLoader::load(config_path()).unwrap();

        match loader.rule_set(2019) {
            Err(EngineError::RuleNotFound { year }) => assert_eq!(year, 2019),
            other => panic!("Expected RuleNotFound error, got {:?}", other),
        }
    }

    #[test]
    fn test_airport_lookup_is_case_insensitive() {
        let loader = ConfigLoader::load(config_path()).unwrap();

        let airport = loader.airport("otp").unwrap();
        assert_eq!(airport.iata, "OTP");
        assert!(airport.eu_member);
    }

    #[test]
    fn test_airport_unknown_returns_error() {
        let loader = ConfigLoader::load(config_path()).unwrap();

        match loader.airport("ZZZ") {
            Err(EngineError::AirportNotFound { code }) => assert_eq!(code, "ZZZ"),
            other => panic!("Expected AirportNotFound error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_missing_directory_returns_error() {
        let result = ConfigLoader::load("/nonexistent/path");

        match result {
            Err(EngineError::ConfigNotFound { path }) => {
                assert!(path.contains("rules"));
            }
            other => panic!("Expected ConfigNotFound error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_single_rule_file() {
        let rules = ConfigLoader::load_rule_file("./config/rules/2024.yaml").unwrap();
        assert_eq!(rules.year(), 2024);
    }

    #[test]
    fn test_load_rule_file_missing_returns_error() {
        let result = ConfigLoader::load_rule_file("./config/rules/1999.yaml");
        assert!(matches!(result, Err(EngineError::ConfigNotFound { .. })));
    }
}
