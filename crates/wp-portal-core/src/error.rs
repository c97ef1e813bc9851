use serde::Serialize;
use wp_contract_client::ContractError;
use wp_wallet_bridge::BridgeError;

/// What went wrong, as the user-facing layer distinguishes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum PortalError {
    #[error("no Ethereum wallet detected")]
    WalletAbsent,
    #[error("wallet authorization failed: {0}")]
    AuthorizationRejected(String),
    #[error("network call failed: {0}")]
    Network(String),
    #[error("wave transaction rejected in the wallet: {0}")]
    TransactionRejected(String),
    #[error("wave transaction failed: {0}")]
    Reverted(String),
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error("connect a wallet first")]
    NotConnected,
    #[error("a wave is already being submitted")]
    Busy,
}

impl From<BridgeError> for PortalError {
    fn from(err: BridgeError) -> Self {
        match err {
            BridgeError::WalletAbsent => Self::WalletAbsent,
            BridgeError::UserRejected => Self::AuthorizationRejected(err.to_string()),
            other => Self::Network(other.to_string()),
        }
    }
}

impl From<ContractError> for PortalError {
    fn from(err: ContractError) -> Self {
        match err {
            // Contract calls only reach the wallet to sign; a rejection
            // there declines the transaction, not account access.
            ContractError::Bridge(BridgeError::UserRejected) => {
                Self::TransactionRejected(BridgeError::UserRejected.to_string())
            }
            ContractError::Bridge(inner) => inner.into(),
            ContractError::NoSigner => Self::AuthorizationRejected(err.to_string()),
            ContractError::Reverted(_) | ContractError::ConfirmationTimeout { .. } => {
                Self::Reverted(err.to_string())
            }
            other => Self::Network(other.to_string()),
        }
    }
}
