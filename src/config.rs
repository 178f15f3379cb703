//! Demo data, with built-in defaults and an optional TOML override.
//!
//! `config/demos.toml` holds the same data as [`DemoConfig::default`] and
//! documents the file layout. Sections missing from an override file keep
//! their defaults.

use crate::error::{PatternError, Result};
use crate::structural::flyweight::{Car, CarModel};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub chain: ChainConfig,
    pub singleton: SingletonConfig,
    pub flyweight: FlyweightConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChainConfig {
    pub requests: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SingletonConfig {
    /// One demo thread is spawned per value.
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FlyweightConfig {
    /// Models the factory is pre-seeded with.
    pub seed: Vec<CarModel>,
    /// Cars registered after seeding.
    pub cars: Vec<Car>,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            requests: ["Nut", "Banana", "Cup of coffee"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl Default for SingletonConfig {
    fn default() -> Self {
        Self {
            values: vec!["FOO".to_string(), "BAR".to_string()],
        }
    }
}

impl Default for FlyweightConfig {
    fn default() -> Self {
        Self {
            seed: vec![
                CarModel::new("Chevrolet", "Camaro2018", "pink"),
                CarModel::new("Mercedes Benz", "C300", "black"),
                CarModel::new("Mercedes Benz", "C500", "red"),
                CarModel::new("BMW", "M5", "red"),
                CarModel::new("BMW", "X6", "white"),
            ],
            cars: vec![
                Car::new("CL234IR", "James Doe", CarModel::new("BMW", "M5", "red")),
                Car::new("CL234IR", "James Doe", CarModel::new("BMW", "X1", "red")),
            ],
        }
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            chain: ChainConfig::default(),
            singleton: SingletonConfig::default(),
            flyweight: FlyweightConfig::default(),
        }
    }
}

impl DemoConfig {
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| PatternError::config_read(path, err))?;
        let config = Self::from_toml(&content)?;
        tracing::info!(path = %path.display(), "Loaded demo config");
        Ok(config)
    }

    /// Built-in data unless an override path is supplied.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Reads the override path from the first command-line argument.
    pub fn from_args() -> Result<Self> {
        let path = std::env::args().nth(1);
        Self::load(path.as_deref().map(Path::new))
    }
}
