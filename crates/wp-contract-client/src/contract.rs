use alloy_primitives::{Address, B256, Bytes, U256};
use alloy_sol_types::{SolCall, SolEvent};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, info, warn};
use wp_api_types::{ChainWave, NewWaveEvent, TxHash};
use wp_wallet_bridge::Eip1193Provider;

use crate::abi::{ContractAbi, IWavePortal};
use crate::config::PortalConfig;
use crate::delay::Delay;
use crate::{ContractError, EventCursor, PendingWave, WavePortal, WaveReceipt};

/// Signed handle to the deployed wave portal contract.
pub struct WavePortalContract<P, D> {
    provider: P,
    address: Address,
    gas_limit: u64,
    poll_interval: Duration,
    confirmation_polls: u32,
    delay: D,
}

impl<P, D> WavePortalContract<P, D>
where
    P: Eip1193Provider,
    D: Delay,
{
    /// Bind to `config.contract_address`. The bundled artifact is checked
    /// against the bindings before any call is made.
    pub fn connect(provider: P, config: &PortalConfig, delay: D) -> Result<Self, ContractError> {
        ContractAbi::bundled()?.verify()?;
        Ok(Self {
            provider,
            address: config.contract_address,
            gas_limit: config.gas_limit,
            poll_interval: config.poll_interval,
            confirmation_polls: config.confirmation_polls,
            delay,
        })
    }

    /// The wallet's first account signs.
    async fn signer_address(&self) -> Result<Address, ContractError> {
        let accounts = self.provider.request("eth_accounts", json!([])).await?;
        let accounts: Vec<Address> = decode_value("eth_accounts", accounts)?;
        accounts.first().copied().ok_or(ContractError::NoSigner)
    }

    async fn call<C: SolCall>(&self, call: &C) -> Result<C::Return, ContractError> {
        let tx = json!({
            "to": self.address,
            "data": Bytes::from(call.abi_encode()),
        });

        let raw = self.provider.request("eth_call", json!([tx, "latest"])).await?;
        let output: Bytes = decode_value("eth_call", raw)?;
        C::abi_decode_returns(&output).map_err(|err| ContractError::Decode {
            call: C::SIGNATURE,
            reason: err.to_string(),
        })
    }

    async fn block_number(&self) -> Result<u64, ContractError> {
        let raw = self.provider.request("eth_blockNumber", json!([])).await?;
        let quantity: String = decode_value("eth_blockNumber", raw)?;
        parse_quantity("eth_blockNumber", &quantity)
    }
}

#[async_trait(?Send)]
impl<P, D> WavePortal for WavePortalContract<P, D>
where
    P: Eip1193Provider,
    D: Delay,
{
    async fn total_waves(&self) -> Result<u64, ContractError> {
        let total = self.call(&IWavePortal::getTotalWavesCall {}).await?;
        Ok(saturating_u64(total))
    }

    async fn submit_wave(&self, message: &str) -> Result<PendingWave, ContractError> {
        let from = self.signer_address().await?;
        let data = IWavePortal::waveCall {
            message: message.to_owned(),
        }
        .abi_encode();

        let tx = json!({
            "from": from,
            "to": self.address,
            "data": Bytes::from(data),
            "gas": format!("{:#x}", self.gas_limit),
        });
        let raw = self.provider.request("eth_sendTransaction", json!([tx])).await?;
        let hash: B256 = decode_value("eth_sendTransaction", raw)?;

        let tx_hash = TxHash(hash.to_string());
        info!("wave transaction {} submitted from {}", tx_hash, from);
        Ok(PendingWave {
            tx_hash,
            message: message.to_owned(),
        })
    }

    async fn wait_for_confirmation(&self, pending: &PendingWave) -> Result<WaveReceipt, ContractError> {
        for attempt in 1..=self.confirmation_polls {
            let raw = self
                .provider
                .request("eth_getTransactionReceipt", json!([pending.tx_hash.0]))
                .await?;

            if !raw.is_null() {
                let receipt: RpcReceipt = decode_value("eth_getTransactionReceipt", raw)?;
                let block_number = receipt
                    .block_number
                    .as_deref()
                    .map(|value| parse_quantity("eth_getTransactionReceipt", value))
                    .transpose()?;

                // Pre-Byzantium receipts carry no status; treat them as success.
                if let Some(status) = receipt.status.as_deref() {
                    if parse_quantity("eth_getTransactionReceipt", status)? == 0 {
                        warn!("wave transaction {} reverted", pending.tx_hash);
                        return Err(ContractError::Reverted(pending.tx_hash.clone()));
                    }
                }

                debug!(
                    "wave transaction {} mined after {} poll(s)",
                    pending.tx_hash, attempt
                );
                return Ok(WaveReceipt {
                    tx_hash: pending.tx_hash.clone(),
                    block_number,
                });
            }

            if attempt < self.confirmation_polls {
                self.delay.delay(self.poll_interval).await;
            }
        }

        Err(ContractError::ConfirmationTimeout {
            tx_hash: pending.tx_hash.clone(),
            polls: self.confirmation_polls,
        })
    }

    async fn all_waves(&self) -> Result<Vec<ChainWave>, ContractError> {
        let waves = self.call(&IWavePortal::getAllWavesCall {}).await?;
        Ok(waves
            .into_iter()
            .map(|wave| ChainWave {
                waver: wave.waver.to_checksum(None),
                timestamp: saturating_u64(wave.timestamp),
                message: wave.message,
            })
            .collect())
    }

    async fn subscribe_new_waves(&self) -> Result<EventCursor, ContractError> {
        let head = self.block_number().await?;
        debug!("NewWave subscription anchored after block {}", head);
        Ok(EventCursor::starting_at(head.saturating_add(1)))
    }

    async fn poll_new_waves(&self, cursor: &mut EventCursor) -> Result<Vec<NewWaveEvent>, ContractError> {
        let head = self.block_number().await?;
        if head < cursor.next_block {
            return Ok(Vec::new());
        }

        let filter = json!({
            "address": self.address,
            "topics": [IWavePortal::NewWave::SIGNATURE_HASH],
            "fromBlock": format!("{:#x}", cursor.next_block),
            "toBlock": format!("{:#x}", head),
        });
        let raw = self.provider.request("eth_getLogs", json!([filter])).await?;
        let logs: Vec<RpcLog> = decode_value("eth_getLogs", raw)?;

        let mut events = Vec::with_capacity(logs.len());
        for log in logs.into_iter().filter(|log| !log.removed) {
            events.push(decode_new_wave(log)?);
        }

        cursor.next_block = head + 1;
        Ok(events)
    }
}

// ── JSON-RPC payload types ───────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcReceipt {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    block_number: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcLog {
    topics: Vec<B256>,
    data: Bytes,
    #[serde(default)]
    block_number: Option<String>,
    #[serde(default)]
    transaction_hash: Option<String>,
    #[serde(default)]
    log_index: Option<String>,
    #[serde(default)]
    removed: bool,
}

fn decode_new_wave(log: RpcLog) -> Result<NewWaveEvent, ContractError> {
    let decoded = IWavePortal::NewWave::decode_raw_log(log.topics.iter().copied(), &log.data)
        .map_err(|err| ContractError::Decode {
            call: IWavePortal::NewWave::SIGNATURE,
            reason: err.to_string(),
        })?;

    Ok(NewWaveEvent {
        from: decoded.from.to_checksum(None),
        timestamp: saturating_u64(decoded.timestamp),
        message: decoded.message,
        block_number: optional_quantity(log.block_number.as_deref()),
        tx_hash: log.transaction_hash.map(TxHash),
        log_index: optional_quantity(log.log_index.as_deref()),
    })
}

fn decode_value<T: for<'de> Deserialize<'de>>(method: &'static str, value: Value) -> Result<T, ContractError> {
    serde_json::from_value(value).map_err(|err| ContractError::InvalidResponse {
        method,
        reason: err.to_string(),
    })
}

/// Hex quantity (`0x1a`) to u64.
fn parse_quantity(method: &'static str, value: &str) -> Result<u64, ContractError> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .ok_or_else(|| ContractError::InvalidResponse {
            method,
            reason: format!("quantity '{value}' is not 0x-prefixed"),
        })?;

    u64::from_str_radix(digits, 16).map_err(|err| ContractError::InvalidResponse {
        method,
        reason: format!("quantity '{value}': {err}"),
    })
}

fn optional_quantity(value: Option<&str>) -> Option<u64> {
    value.and_then(|value| parse_quantity("eth_getLogs", value).ok())
}

fn saturating_u64(value: U256) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}
