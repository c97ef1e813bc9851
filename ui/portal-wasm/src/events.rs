//! Event binding.
//!
//! Click handlers spawn controller operations via
//! `wasm_bindgen_futures::spawn_local` and re-render when they finish.
//! Page lifecycle events mount and unmount the controller.

use gloo_timers::future::sleep;
use std::time::Duration;
use tracing::{info, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wp_portal_core::ConnectionState;

use crate::dom::{self, Elements};
use crate::{poll, render, state};

/// How often the view refreshes while a wave is in flight.
const SUBMIT_REFRESH: Duration = Duration::from_millis(250);

/// Helper: attach async click handler to an element.
macro_rules! on_click_async {
    ($el:expr, $els:expr, $handler:expr) => {{
        let els = $els.clone();
        let cb = Closure::wrap(Box::new(move |_: web_sys::MouseEvent| {
            let els2 = els.clone();
            wasm_bindgen_futures::spawn_local(async move {
                $handler(&els2).await;
            });
        }) as Box<dyn FnMut(_)>);
        let _ = $el.add_event_listener_with_callback("click", cb.as_ref().unchecked_ref());
        cb.forget();
    }};
}

/// Bind all UI event listeners. Call once after init.
pub fn bind_events(els: &Elements) {
    on_click_async!(els.connect_button, els, on_connect);
    on_click_async!(els.wave_button, els, on_wave);

    let Some(window) = web_sys::window() else {
        return;
    };

    // ── Page lifecycle ──
    {
        let cb = Closure::wrap(Box::new(move |_: web_sys::Event| {
            if let Some(controller) = state::controller() {
                controller.unmount();
            }
        }) as Box<dyn FnMut(_)>);
        let _ = window.add_event_listener_with_callback("pagehide", cb.as_ref().unchecked_ref());
        cb.forget();
    }
    {
        let els2 = els.clone();
        let cb = Closure::wrap(Box::new(move |event: web_sys::PageTransitionEvent| {
            if !event.persisted() {
                return;
            }
            let els3 = els2.clone();
            wasm_bindgen_futures::spawn_local(async move {
                on_restored(&els3).await;
            });
        }) as Box<dyn FnMut(_)>);
        let _ = window.add_event_listener_with_callback("pageshow", cb.as_ref().unchecked_ref());
        cb.forget();
    }
}

async fn on_connect(els: &Elements) {
    let Some(controller) = state::controller() else {
        return;
    };
    if let Err(err) = controller.connect_wallet().await {
        warn!("connect failed: {}", err);
    }
    render::render(els, &controller);
}

async fn on_wave(els: &Elements) {
    let Some(controller) = state::controller() else {
        return;
    };
    let message = dom::get_input_value(&els.wave_input);

    // Keep the mining indicator current while the submission is pending.
    {
        let els2 = els.clone();
        let watched = controller.clone();
        wasm_bindgen_futures::spawn_local(async move {
            loop {
                sleep(SUBMIT_REFRESH).await;
                render::render(&els2, &watched);
                if !matches!(
                    watched.state(),
                    ConnectionState::Submitting | ConnectionState::Confirming
                ) {
                    break;
                }
            }
        });
    }

    match controller.submit_wave(&message).await {
        Ok(receipt) => {
            info!("wave mined in {}", receipt.tx_hash);
            dom::set_input_value(&els.wave_input, "");
        }
        Err(err) => warn!("wave failed: {}", err),
    }
    render::render(els, &controller);
}

/// Back from the back/forward cache: the controller was unmounted on
/// `pagehide`, so subscribe again.
async fn on_restored(els: &Elements) {
    let Some(controller) = state::controller() else {
        return;
    };
    controller.mount().await;
    render::render(els, &controller);
    poll::start_event_loop(els);
}
