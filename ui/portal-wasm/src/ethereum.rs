//! `window.ethereum` as an [`Eip1193Provider`].
//!
//! The injected object is looked up on every call: wallets may inject after
//! the module starts.

use async_trait::async_trait;
use js_sys::{Function, Object, Promise, Reflect};
use serde::Serialize;
use serde_json::Value;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use wp_wallet_bridge::{BridgeError, Eip1193Provider};

#[derive(Debug, Default, Clone, Copy)]
pub struct InjectedProvider;

fn injected() -> Option<JsValue> {
    let window = web_sys::window()?;
    let ethereum = Reflect::get(&window, &JsValue::from_str("ethereum")).ok()?;
    if ethereum.is_undefined() || ethereum.is_null() {
        return None;
    }
    Some(ethereum)
}

#[async_trait(?Send)]
impl Eip1193Provider for InjectedProvider {
    fn is_available(&self) -> bool {
        injected().is_some()
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value, BridgeError> {
        let ethereum = injected().ok_or(BridgeError::WalletAbsent)?;

        let args = Object::new();
        let params = params
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(|err| BridgeError::InvalidResponse(format!("params: {err}")))?;
        Reflect::set(&args, &JsValue::from_str("method"), &JsValue::from_str(method)).map_err(to_bridge_error)?;
        Reflect::set(&args, &JsValue::from_str("params"), &params).map_err(to_bridge_error)?;

        let request: Function = Reflect::get(&ethereum, &JsValue::from_str("request"))
            .and_then(|value| value.dyn_into())
            .map_err(|_| BridgeError::Transport("ethereum.request is not a function".to_owned()))?;
        let promise: Promise = request
            .call1(&ethereum, &args)
            .map_err(to_bridge_error)?
            .dyn_into()
            .map_err(|_| BridgeError::Transport("ethereum.request did not return a promise".to_owned()))?;

        let result = JsFuture::from(promise).await.map_err(to_bridge_error)?;
        if result.is_undefined() || result.is_null() {
            return Ok(Value::Null);
        }
        serde_wasm_bindgen::from_value(result).map_err(|err| BridgeError::InvalidResponse(format!("{method}: {err}")))
    }
}

/// EIP-1193 errors carry a numeric `code` and a `message`.
fn to_bridge_error(err: JsValue) -> BridgeError {
    let field = |name: &str| Reflect::get(&err, &JsValue::from_str(name)).ok();
    let message = field("message")
        .and_then(|value| value.as_string())
        .unwrap_or_else(|| format!("{err:?}"));

    match field("code").and_then(|value| value.as_f64()) {
        Some(code) => BridgeError::from_rpc(code as i64, message),
        None => BridgeError::Transport(message),
    }
}
