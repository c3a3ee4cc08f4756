//! Deployment settings: where the server listens and how queries are compiled.
//!
//! Settings come from an optional JSON file and are then overridden by environment variables.
use crate::engine::compiler::Strategy;
use crate::engine::formatting::LiteralStyle;
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

pub const APP_ENV: &str = "APP_ENV";
pub const HOST: &str = "HOST";
pub const PORT: &str = "PORT";
pub const SQL_STRATEGY: &str = "SQL_STRATEGY";
pub const SQL_LITERALS: &str = "SQL_LITERALS";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub environment: Environment,
    pub host: String,
    pub port: u16,
    pub strategy: Strategy,
    pub literals: LiteralStyle,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{variable}={value:?} is not valid, expected {expected}")]
    InvalidValue {
        variable: &'static str,
        value: String,
        expected: &'static str,
    },
}

impl Default for Config {
    fn default() -> Config {
        Config {
            environment: Environment::Development,
            host: "0.0.0.0".to_owned(),
            port: 8080,
            strategy: Strategy::PerRelation,
            literals: LiteralStyle::Inline,
        }
    }
}

/// Reads the config file, if there is one, and applies the process environment on top of it.
pub fn read(path: Option<&Path>) -> Result<Config, crate::Error> {
    let config = match path {
        Some(path) => {
            info!("Reading config from {}", path.display());

            Config::from_file(path)?
        }
        None => Config::default(),
    };

    Ok(config.with_overrides(|variable| std::env::var(variable).ok())?)
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Config, crate::Error> {
        let contents = fs::read_to_string(path)?;

        Ok(serde_json::from_str(&contents)?)
    }

    /// `lookup` returns the value of an environment variable, if it is set.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(environment) = lookup(APP_ENV) {
            self.environment = Environment::from_variable(&environment);
        }

        if let Some(host) = lookup(HOST) {
            self.host = host;
        }

        if let Some(port) = lookup(PORT) {
            self.port = parse_variable(PORT, port, "a port number")?;
        }

        if let Some(strategy) = lookup(SQL_STRATEGY) {
            self.strategy = parse_variable(SQL_STRATEGY, strategy, "per-relation or combined")?;
        }

        if let Some(literals) = lookup(SQL_LITERALS) {
            self.literals = parse_variable(SQL_LITERALS, literals, "inline or escaped")?;
        }

        Ok(self)
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}

impl Environment {
    /// Anything but `production` is treated as development.
    fn from_variable(value: &str) -> Self {
        match value {
            "production" => Environment::Production,
            _ => Environment::Development,
        }
    }
}

fn parse_variable<T: FromStr>(
    variable: &'static str,
    value: String,
    expected: &'static str,
) -> Result<T, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::InvalidValue {
            variable,
            value,
            expected,
        })
}
