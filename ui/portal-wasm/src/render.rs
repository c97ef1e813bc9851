//! Snapshot to DOM.

use wp_api_types::WaveRecord;
use wp_portal_core::ConnectionState;

use crate::dom::{self, Elements};
use crate::state::Controller;

/// Re-render everything from the controller's current snapshot, then show a
/// pending alert if there is one.
pub fn render(els: &Elements, controller: &Controller) {
    let snapshot = controller.snapshot();

    dom::set_visible(&els.mining_indicator, snapshot.mining);
    dom::set_visible(&els.connect_button, snapshot.account.is_none());
    els.wave_button.set_disabled(matches!(
        snapshot.state,
        ConnectionState::Submitting | ConnectionState::Confirming
    ));

    let status = snapshot.last_error.map(|err| err.to_string()).unwrap_or_default();
    show_status(els, &status);
    render_waves(els, &snapshot.waves);

    if let Some(alert) = controller.take_alert() {
        dom::alert(&alert);
    }
}

pub fn show_status(els: &Elements, text: &str) {
    dom::set_text(&els.status, text);
    dom::set_visible(&els.status, !text.is_empty());
}

fn render_waves(els: &Elements, waves: &[WaveRecord]) {
    els.wave_list.set_inner_html("");
    for record in waves {
        let Some(block) = dom::create_element("div") else {
            return;
        };
        let _ = block.class_list().add_1("wave");

        let time = record.display_time();
        for (label, value) in [
            ("Address", record.address.as_str()),
            ("Time", time.as_str()),
            ("Message", record.message.as_str()),
        ] {
            if let Some(row) = dom::create_element("div") {
                dom::set_text(&row, &format!("{label}: {value}"));
                let _ = block.append_child(&row);
            }
        }
        let _ = els.wave_list.append_child(&block);
    }
}
