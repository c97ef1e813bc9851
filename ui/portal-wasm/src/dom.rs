//! DOM element bindings.
//!
//! All fields are resolved once at startup. The page must provide every id
//! bound in `Elements::bind()`.

use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlButtonElement, HtmlElement, HtmlInputElement};

// ── Helpers ──

fn doc() -> Option<Document> {
    web_sys::window()?.document()
}

pub fn by_id(id: &str) -> Option<Element> {
    doc()?.get_element_by_id(id)
}

pub fn by_id_typed<T: JsCast>(id: &str) -> Option<T> {
    by_id(id).and_then(|e| e.dyn_into::<T>().ok())
}

fn require<T: JsCast>(id: &str) -> Result<T, JsValue> {
    by_id_typed(id).ok_or_else(|| JsValue::from_str(&format!("missing element #{id}")))
}

pub fn create_element(tag: &str) -> Option<Element> {
    doc()?.create_element(tag).ok()
}

pub fn set_text(el: &Element, text: &str) {
    el.set_text_content(Some(text));
}

pub fn get_input_value(el: &HtmlInputElement) -> String {
    el.value().trim().to_string()
}

pub fn set_input_value(el: &HtmlInputElement, val: &str) {
    el.set_value(val);
}

/// Shows or hides `el` through the `hidden` class.
pub fn set_visible(el: &Element, visible: bool) {
    let _ = el.class_list().toggle_with_force("hidden", !visible);
}

pub fn alert(message: &str) {
    if let Some(window) = web_sys::window() {
        let _ = window.alert_with_message(message);
    }
}

// ── Elements ──

#[derive(Clone)]
pub struct Elements {
    pub wave_input: HtmlInputElement,
    pub wave_button: HtmlButtonElement,
    pub connect_button: HtmlElement,
    pub mining_indicator: Element,
    pub wave_list: Element,
    pub status: Element,
}

impl Elements {
    pub fn bind() -> Result<Self, JsValue> {
        Ok(Self {
            wave_input: require("waveInput")?,
            wave_button: require("waveButton")?,
            connect_button: require("connectButton")?,
            mining_indicator: require("miningIndicator")?,
            wave_list: require("waveList")?,
            status: require("status")?,
        })
    }
}
