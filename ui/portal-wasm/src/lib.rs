//! Wave Portal WASM Frontend
//!
//! Browser view over the portal controller. The wallet is the page's injected
//! `window.ethereum`; each concern lives in its own module.

pub mod config;
pub mod dom;
pub mod ethereum;
pub mod events;
pub mod poll;
pub mod render;
pub mod state;

use std::rc::Rc;
use tracing::{error, info};
use wasm_bindgen::prelude::*;
use wp_contract_client::WavePortalContract;
use wp_portal_core::PortalController;
use wp_wallet_bridge::WalletBridge;

use crate::ethereum::InjectedProvider;
use crate::poll::GlooDelay;

/// WASM entry point – called automatically when the module is instantiated.
#[wasm_bindgen(start)]
pub async fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();

    init().await
}

async fn init() -> Result<(), JsValue> {
    let els = dom::Elements::bind()?;

    let config = match config::load() {
        Ok(config) => config,
        Err(err) => {
            error!("wave portal is not configured: {}", err);
            render::show_status(&els, &err.to_string());
            return Ok(());
        }
    };
    info!("wave portal contract {}", config.contract_address);

    let provider = Rc::new(InjectedProvider);
    let contract = WavePortalContract::connect(provider.clone(), &config, GlooDelay)
        .map_err(|err| JsValue::from_str(&err.to_string()))?;
    let controller = Rc::new(
        PortalController::new(WalletBridge::new(provider), contract)
            .with_event_dedupe(config.dedupe_live_events),
    );
    state::install(controller.clone(), config.poll_interval);

    events::bind_events(&els);
    render::render(&els, &controller);

    controller.mount().await;
    render::render(&els, &controller);
    poll::start_event_loop(&els);

    Ok(())
}
