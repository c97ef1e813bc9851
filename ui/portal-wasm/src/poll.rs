//! Timer-driven work: the contract client's poll delay and the `NewWave`
//! polling loop.

use async_trait::async_trait;
use gloo_timers::future::sleep;
use std::cell::Cell;
use std::time::Duration;
use tracing::{debug, warn};
use wp_contract_client::Delay;

use crate::dom::Elements;
use crate::{render, state};

#[derive(Debug, Default, Clone, Copy)]
pub struct GlooDelay;

#[async_trait(?Send)]
impl Delay for GlooDelay {
    async fn delay(&self, duration: Duration) {
        sleep(duration).await;
    }
}

thread_local! {
    static LOOP_EPOCH: Cell<u64> = const { Cell::new(0) };
}

/// Poll for `NewWave` every configured interval until the controller stops
/// listening. Starting a new loop retires the previous one.
pub fn start_event_loop(els: &Elements) {
    let Some(interval) = state::poll_interval() else {
        return;
    };
    let epoch = LOOP_EPOCH.with(|e| {
        e.set(e.get() + 1);
        e.get()
    });
    let els = els.clone();

    wasm_bindgen_futures::spawn_local(async move {
        loop {
            sleep(interval).await;
            if LOOP_EPOCH.with(Cell::get) != epoch {
                break;
            }
            let Some(controller) = state::controller() else {
                break;
            };
            if !controller.is_listening() {
                break;
            }
            match controller.poll_events().await {
                Ok(0) => {}
                Ok(count) => {
                    debug!("{} new wave(s)", count);
                    render::render(&els, &controller);
                }
                Err(err) => warn!("NewWave poll failed: {}", err),
            }
        }
        debug!("event loop {} stopped", epoch);
    });
}
