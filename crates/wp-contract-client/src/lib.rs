//! Contract client for the wave portal contract.
//!
//! `WavePortal` is the seam the application controller talks to;
//! `WavePortalContract` implements it over any EIP-1193 provider using
//! `eth_call`, `eth_sendTransaction`, receipt polling and log polling.

pub mod abi;
pub mod config;
mod contract;
mod delay;

pub use abi::{ContractAbi, IWavePortal, WAVE_PORTAL_ARTIFACT};
pub use config::{ConfigError, PortalConfig};
pub use contract::WavePortalContract;
pub use delay::{Delay, NoDelay};
#[cfg(feature = "tokio")]
pub use delay::TokioDelay;

use async_trait::async_trait;
use wp_api_types::{ChainWave, NewWaveEvent, TxHash};
use wp_wallet_bridge::BridgeError;

/// Gas ceiling passed with every `wave` transaction.
pub const WAVE_GAS_LIMIT: u64 = 300_000;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ContractError {
    #[error(transparent)]
    Bridge(#[from] BridgeError),
    #[error("no signer account available")]
    NoSigner,
    #[error("failed to decode {call}: {reason}")]
    Decode { call: &'static str, reason: String },
    #[error("invalid rpc response for {method}: {reason}")]
    InvalidResponse { method: &'static str, reason: String },
    #[error("transaction {0} reverted")]
    Reverted(TxHash),
    #[error("transaction {tx_hash} not confirmed after {polls} polls")]
    ConfirmationTimeout { tx_hash: TxHash, polls: u32 },
    #[error("contract interface mismatch: {0}")]
    AbiMismatch(String),
}

/// A wave transaction accepted by the network but not yet mined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingWave {
    pub tx_hash: TxHash,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaveReceipt {
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
}

/// Position of a `NewWave` subscription: the first block not yet scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventCursor {
    pub next_block: u64,
}

impl EventCursor {
    pub fn starting_at(next_block: u64) -> Self {
        Self { next_block }
    }
}

#[async_trait(?Send)]
pub trait WavePortal {
    /// `getTotalWaves()`: read-only.
    async fn total_waves(&self) -> Result<u64, ContractError>;

    /// `wave(message)`: returns once the network accepted the transaction.
    async fn submit_wave(&self, message: &str) -> Result<PendingWave, ContractError>;

    /// Resolves once the transaction is mined; a revert is an error.
    async fn wait_for_confirmation(&self, pending: &PendingWave) -> Result<WaveReceipt, ContractError>;

    /// `getAllWaves()`: in contract order.
    async fn all_waves(&self) -> Result<Vec<ChainWave>, ContractError>;

    /// Start observing `NewWave` from the next block on.
    async fn subscribe_new_waves(&self) -> Result<EventCursor, ContractError>;

    /// Events emitted since `cursor`; advances `cursor` past what was read.
    async fn poll_new_waves(&self, cursor: &mut EventCursor) -> Result<Vec<NewWaveEvent>, ContractError>;
}
