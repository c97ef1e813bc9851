//! Wallet bridge.
//!
//! Thin call-through to an EIP-1193 provider: the browser-injected
//! `window.ethereum` object, or a JSON-RPC node on native hosts. The provider
//! is passed in explicitly so tests can substitute a scripted one.

#[cfg(feature = "http")]
mod http;

#[cfg(feature = "http")]
pub use http::{DEFAULT_RPC_URL, HttpProvider};

use async_trait::async_trait;
use serde_json::{Value, json};
use std::rc::Rc;
use std::sync::Arc;
use tracing::{debug, warn};
use wp_api_types::WalletAddress;

/// EIP-1193 "user rejected request".
pub const USER_REJECTED_CODE: i64 = 4001;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BridgeError {
    #[error("no Ethereum wallet detected")]
    WalletAbsent,
    #[error("user rejected the wallet request")]
    UserRejected,
    #[error("wallet rpc error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("wallet transport error: {0}")]
    Transport(String),
    #[error("invalid wallet response: {0}")]
    InvalidResponse(String),
}

impl BridgeError {
    /// Map an EIP-1193 / JSON-RPC error object onto the bridge taxonomy.
    pub fn from_rpc(code: i64, message: impl Into<String>) -> Self {
        if code == USER_REJECTED_CODE {
            Self::UserRejected
        } else {
            Self::Rpc {
                code,
                message: message.into(),
            }
        }
    }
}

/// An EIP-1193 style provider: `request({ method, params })`.
#[async_trait(?Send)]
pub trait Eip1193Provider {
    /// Whether a wallet is reachable at all.
    fn is_available(&self) -> bool;

    async fn request(&self, method: &str, params: Value) -> Result<Value, BridgeError>;
}

#[async_trait(?Send)]
impl<P: Eip1193Provider + ?Sized> Eip1193Provider for &P {
    fn is_available(&self) -> bool {
        (**self).is_available()
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value, BridgeError> {
        (**self).request(method, params).await
    }
}

#[async_trait(?Send)]
impl<P: Eip1193Provider + ?Sized> Eip1193Provider for Rc<P> {
    fn is_available(&self) -> bool {
        (**self).is_available()
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value, BridgeError> {
        (**self).request(method, params).await
    }
}

#[async_trait(?Send)]
impl<P: Eip1193Provider + ?Sized> Eip1193Provider for Arc<P> {
    fn is_available(&self) -> bool {
        (**self).is_available()
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value, BridgeError> {
        (**self).request(method, params).await
    }
}

/// Account access on top of a provider. One request per call, no retry.
pub struct WalletBridge<P> {
    provider: P,
}

impl<P> WalletBridge<P>
where
    P: Eip1193Provider,
{
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn has_wallet(&self) -> bool {
        self.provider.is_available()
    }

    /// `eth_accounts`: accounts the user already authorized. Never prompts.
    pub async fn authorized_accounts(&self) -> Result<Vec<WalletAddress>, BridgeError> {
        self.accounts("eth_accounts").await
    }

    /// `eth_requestAccounts`: may prompt the user.
    pub async fn request_accounts(&self) -> Result<Vec<WalletAddress>, BridgeError> {
        self.accounts("eth_requestAccounts").await
    }

    async fn accounts(&self, method: &str) -> Result<Vec<WalletAddress>, BridgeError> {
        if !self.has_wallet() {
            warn!("{method}: no wallet provider available");
            return Err(BridgeError::WalletAbsent);
        }

        let value = self.provider.request(method, json!([])).await?;
        let accounts = parse_accounts(value)?;
        debug!("{method} returned {} account(s)", accounts.len());
        Ok(accounts)
    }
}

fn parse_accounts(value: Value) -> Result<Vec<WalletAddress>, BridgeError> {
    let entries: Vec<String> = serde_json::from_value(value)
        .map_err(|err| BridgeError::InvalidResponse(format!("accounts: {err}")))?;

    Ok(entries
        .into_iter()
        .filter(|entry| !entry.trim().is_empty())
        .map(WalletAddress)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    #[derive(Default)]
    struct ScriptedProvider {
        available: bool,
        responses: HashMap<&'static str, Result<Value, BridgeError>>,
        calls: RefCell<Vec<String>>,
    }

    impl ScriptedProvider {
        fn with(mut self, method: &'static str, response: Result<Value, BridgeError>) -> Self {
            self.available = true;
            self.responses.insert(method, response);
            self
        }
    }

    #[async_trait(?Send)]
    impl Eip1193Provider for ScriptedProvider {
        fn is_available(&self) -> bool {
            self.available
        }

        async fn request(&self, method: &str, _params: Value) -> Result<Value, BridgeError> {
            self.calls.borrow_mut().push(method.to_owned());
            self.responses
                .get(method)
                .cloned()
                .unwrap_or_else(|| Err(BridgeError::from_rpc(-32601, "method not found")))
        }
    }

    #[tokio::test]
    async fn authorized_accounts_uses_eth_accounts() -> Result<(), BridgeError> {
        let provider = ScriptedProvider::default().with("eth_accounts", Ok(json!(["0xABC"])));
        let bridge = WalletBridge::new(&provider);

        let accounts = bridge.authorized_accounts().await?;

        assert_eq!(accounts, vec![WalletAddress("0xABC".to_owned())]);
        assert_eq!(*provider.calls.borrow(), vec!["eth_accounts".to_owned()]);
        Ok(())
    }

    #[tokio::test]
    async fn missing_wallet_is_reported_without_a_request() {
        let provider = ScriptedProvider::default();
        let bridge = WalletBridge::new(&provider);

        assert!(!bridge.has_wallet());
        assert_eq!(bridge.request_accounts().await, Err(BridgeError::WalletAbsent));
        assert!(provider.calls.borrow().is_empty());
    }

    #[tokio::test]
    async fn user_rejection_maps_from_code_4001() {
        let provider = ScriptedProvider::default().with(
            "eth_requestAccounts",
            Err(BridgeError::from_rpc(4001, "User rejected the request.")),
        );
        let bridge = WalletBridge::new(Rc::new(provider));

        assert_eq!(bridge.request_accounts().await, Err(BridgeError::UserRejected));
        assert_eq!(bridge.provider().calls.borrow().len(), 1);
    }

    #[tokio::test]
    async fn malformed_accounts_payload_is_invalid_response() {
        let provider = ScriptedProvider::default().with("eth_accounts", Ok(json!({"accounts": []})));
        let bridge = WalletBridge::new(&provider);

        let err = bridge.authorized_accounts().await.unwrap_err();
        assert!(matches!(err, BridgeError::InvalidResponse(_)));
    }

    #[test]
    fn empty_entries_are_dropped() -> Result<(), BridgeError> {
        let accounts = parse_accounts(json!(["", "0x1"]))?;
        assert_eq!(accounts, vec![WalletAddress("0x1".to_owned())]);
        Ok(())
    }
}
