//! Global application state.
//!
//! `thread_local!` storage for the controller (WASM is single-threaded).
//! Handlers fetch it here instead of capturing it.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use wp_contract_client::WavePortalContract;
use wp_portal_core::PortalController;

use crate::ethereum::InjectedProvider;
use crate::poll::GlooDelay;

pub type Controller =
    PortalController<Rc<InjectedProvider>, WavePortalContract<Rc<InjectedProvider>, GlooDelay>>;

struct AppState {
    controller: Rc<Controller>,
    poll_interval: Duration,
}

thread_local! {
    static STATE: RefCell<Option<AppState>> = const { RefCell::new(None) };
}

pub fn install(controller: Rc<Controller>, poll_interval: Duration) {
    STATE.with(|s| {
        *s.borrow_mut() = Some(AppState {
            controller,
            poll_interval,
        })
    });
}

pub fn controller() -> Option<Rc<Controller>> {
    STATE.with(|s| s.borrow().as_ref().map(|state| state.controller.clone()))
}

pub fn poll_interval() -> Option<Duration> {
    STATE.with(|s| s.borrow().as_ref().map(|state| state.poll_interval))
}
