//! Runtime configuration.
//!
//! The contract address is the one required value. Everything else has a
//! default matching the deployed contract.

use alloy_primitives::Address;
use std::time::Duration;

use crate::WAVE_GAS_LIMIT;

pub const CONTRACT_ADDRESS_VAR: &str = "WAVE_PORTAL_CONTRACT_ADDRESS";
pub const GAS_LIMIT_VAR: &str = "WAVE_PORTAL_GAS_LIMIT";
pub const POLL_INTERVAL_VAR: &str = "WAVE_PORTAL_POLL_INTERVAL_MS";
pub const CONFIRMATION_POLLS_VAR: &str = "WAVE_PORTAL_CONFIRMATION_POLLS";
pub const DEDUPE_EVENTS_VAR: &str = "WAVE_PORTAL_DEDUPE_EVENTS";

const DEFAULT_POLL_INTERVAL_MS: u64 = 4_000;
const DEFAULT_CONFIRMATION_POLLS: u32 = 150;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("invalid {key}='{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalConfig {
    pub contract_address: Address,
    pub gas_limit: u64,
    /// Pause between receipt polls and between event polls.
    pub poll_interval: Duration,
    pub confirmation_polls: u32,
    /// Skip live events whose wave is already listed.
    pub dedupe_live_events: bool,
}

impl PortalConfig {
    pub fn new(contract_address: Address) -> Self {
        Self {
            contract_address,
            gas_limit: WAVE_GAS_LIMIT,
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            confirmation_polls: DEFAULT_CONFIRMATION_POLLS,
            dedupe_live_events: true,
        }
    }

    /// Build from any key/value source (process env, build-time constants,
    /// test maps). Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let raw_address = get(CONTRACT_ADDRESS_VAR).ok_or(ConfigError::Missing(CONTRACT_ADDRESS_VAR))?;
        let contract_address = parse_address(&raw_address)?;
        let mut config = Self::new(contract_address);

        if let Some(value) = get(GAS_LIMIT_VAR) {
            config.gas_limit = parse_number(GAS_LIMIT_VAR, &value)?;
            if config.gas_limit == 0 {
                return Err(invalid(GAS_LIMIT_VAR, &value, "must be greater than 0"));
            }
        }
        if let Some(value) = get(POLL_INTERVAL_VAR) {
            config.poll_interval = Duration::from_millis(parse_number(POLL_INTERVAL_VAR, &value)?);
        }
        if let Some(value) = get(CONFIRMATION_POLLS_VAR) {
            config.confirmation_polls = parse_number(CONFIRMATION_POLLS_VAR, &value)?;
            if config.confirmation_polls == 0 {
                return Err(invalid(CONFIRMATION_POLLS_VAR, &value, "must be greater than 0"));
            }
        }
        if let Some(value) = get(DEDUPE_EVENTS_VAR) {
            config.dedupe_live_events = parse_flag(DEDUPE_EVENTS_VAR, &value)?;
        }

        Ok(config)
    }
}

pub fn parse_address(value: &str) -> Result<Address, ConfigError> {
    value
        .parse::<Address>()
        .map_err(|err| invalid(CONTRACT_ADDRESS_VAR, value, &err.to_string()))
}

fn parse_number<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value
        .replace('_', "")
        .parse::<T>()
        .map_err(|err| invalid(key, value, &err.to_string()))
}

fn parse_flag(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(key, value, "expected a boolean")),
    }
}

fn invalid(key: &'static str, value: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_owned(),
        reason: reason.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const ADDRESS: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_address_is_set() -> Result<(), ConfigError> {
        let config = PortalConfig::from_lookup(lookup(&[(CONTRACT_ADDRESS_VAR, ADDRESS)]))?;

        assert_eq!(config.contract_address, parse_address(ADDRESS)?);
        assert_eq!(config.gas_limit, 300_000);
        assert_eq!(config.poll_interval, Duration::from_millis(4_000));
        assert_eq!(config.confirmation_polls, 150);
        assert!(config.dedupe_live_events);
        Ok(())
    }

    #[test]
    fn missing_address_is_reported() {
        assert_eq!(
            PortalConfig::from_lookup(lookup(&[(CONTRACT_ADDRESS_VAR, "  ")])),
            Err(ConfigError::Missing(CONTRACT_ADDRESS_VAR))
        );
    }

    #[test]
    fn overrides_are_parsed() -> Result<(), ConfigError> {
        let config = PortalConfig::from_lookup(lookup(&[
            (CONTRACT_ADDRESS_VAR, ADDRESS),
            (GAS_LIMIT_VAR, "500_000"),
            (POLL_INTERVAL_VAR, "250"),
            (CONFIRMATION_POLLS_VAR, "3"),
            (DEDUPE_EVENTS_VAR, "off"),
        ]))?;

        assert_eq!(config.gas_limit, 500_000);
        assert_eq!(config.poll_interval, Duration::from_millis(250));
        assert_eq!(config.confirmation_polls, 3);
        assert!(!config.dedupe_live_events);
        Ok(())
    }

    #[test]
    fn bad_values_name_the_variable() {
        let err = PortalConfig::from_lookup(lookup(&[(CONTRACT_ADDRESS_VAR, "0x1234")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: CONTRACT_ADDRESS_VAR, .. }));

        let err = PortalConfig::from_lookup(lookup(&[
            (CONTRACT_ADDRESS_VAR, ADDRESS),
            (GAS_LIMIT_VAR, "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: GAS_LIMIT_VAR, .. }));
    }
}
