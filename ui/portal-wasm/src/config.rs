//! Build-time configuration.
//!
//! The browser has no process environment, so values are baked in when the
//! bundle is compiled, e.g.
//! `WAVE_PORTAL_CONTRACT_ADDRESS=0x... wasm-pack build ui/portal-wasm`.

use wp_contract_client::config::{
    CONFIRMATION_POLLS_VAR, CONTRACT_ADDRESS_VAR, DEDUPE_EVENTS_VAR, GAS_LIMIT_VAR, POLL_INTERVAL_VAR,
};
use wp_contract_client::{ConfigError, PortalConfig};

pub fn load() -> Result<PortalConfig, ConfigError> {
    PortalConfig::from_lookup(|key| build_value(key).map(str::to_owned))
}

fn build_value(key: &str) -> Option<&'static str> {
    match key {
        CONTRACT_ADDRESS_VAR => option_env!("WAVE_PORTAL_CONTRACT_ADDRESS"),
        GAS_LIMIT_VAR => option_env!("WAVE_PORTAL_GAS_LIMIT"),
        POLL_INTERVAL_VAR => option_env!("WAVE_PORTAL_POLL_INTERVAL_MS"),
        CONFIRMATION_POLLS_VAR => option_env!("WAVE_PORTAL_CONFIRMATION_POLLS"),
        DEDUPE_EVENTS_VAR => option_env!("WAVE_PORTAL_DEDUPE_EVENTS"),
        _ => None,
    }
}
