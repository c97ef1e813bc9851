use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

use crate::{BridgeError, Eip1193Provider};

pub const DEFAULT_RPC_URL: &str = "http://localhost:8545";

/// JSON-RPC 2.0 provider over HTTP.
///
/// Reads `WAVE_PORTAL_RPC_URL` from environment at construction time
/// (default: `http://localhost:8545`). A node has no interactive
/// authorization step, so `eth_requestAccounts` is answered with the node's
/// unlocked accounts (`eth_accounts`).
pub struct HttpProvider {
    endpoint: String,
    http: reqwest::Client,
    next_id: AtomicU64,
}

impl HttpProvider {
    pub fn new(endpoint: Option<String>) -> Self {
        let endpoint = endpoint
            .or_else(|| std::env::var("WAVE_PORTAL_RPC_URL").ok())
            .unwrap_or_else(|| DEFAULT_RPC_URL.to_string());
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

// ── JSON-RPC 2.0 envelope ─────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

fn node_method(method: &str) -> &str {
    match method {
        "eth_requestAccounts" => "eth_accounts",
        other => other,
    }
}

fn into_result(response: RpcResponse) -> Result<Value, BridgeError> {
    if let Some(err) = response.error {
        return Err(BridgeError::from_rpc(err.code, err.message));
    }
    // `null` is a legitimate result (e.g. a receipt that is not mined yet).
    Ok(response.result.unwrap_or(Value::Null))
}

#[async_trait(?Send)]
impl Eip1193Provider for HttpProvider {
    fn is_available(&self) -> bool {
        !self.endpoint.is_empty()
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value, BridgeError> {
        let body = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method: node_method(method),
            params,
        };
        debug!("rpc {} -> {}", body.method, self.endpoint);

        let response = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|err| BridgeError::Transport(format!("{method}: {err}")))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| BridgeError::Transport(format!("{method}: reading body: {err}")))?;

        // Nodes answer JSON-RPC errors with 200 or 4xx/5xx depending on the
        // implementation; try the envelope first.
        match serde_json::from_str::<RpcResponse>(&text) {
            Ok(envelope) => into_result(envelope),
            Err(_) if !status.is_success() => {
                Err(BridgeError::Transport(format!("{method}: HTTP {status}: {text}")))
            }
            Err(err) => Err(BridgeError::InvalidResponse(format!("{method}: {err}"))),
        }
    }
}
