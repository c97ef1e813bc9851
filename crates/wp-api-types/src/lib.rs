use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Wallet account as reported by the wallet (`eth_accounts`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct WalletAddress(pub String);

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TxHash(pub String);

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A wave exactly as `getAllWaves()` returns it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChainWave {
    pub waver: String,
    pub timestamp: u64,
    pub message: String,
}

/// A decoded `NewWave(from, timestamp, message)` log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewWaveEvent {
    pub from: String,
    pub timestamp: u64,
    pub message: String,
    #[serde(default)]
    pub block_number: Option<u64>,
    #[serde(default)]
    pub tx_hash: Option<TxHash>,
    #[serde(default)]
    pub log_index: Option<u64>,
}

impl NewWaveEvent {
    pub fn new(from: impl Into<String>, timestamp: u64, message: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            timestamp,
            message: message.into(),
            block_number: None,
            tx_hash: None,
            log_index: None,
        }
    }
}

/// Display-ready wave. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WaveRecord {
    pub address: String,
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

impl WaveRecord {
    pub fn new(address: impl Into<String>, timestamp_secs: u64, message: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            timestamp: timestamp_from_secs(timestamp_secs),
            message: message.into(),
        }
    }

    pub fn key(&self) -> WaveKey {
        WaveKey {
            address: self.address.to_ascii_lowercase(),
            timestamp_secs: self.timestamp.timestamp(),
            message: self.message.clone(),
        }
    }

    pub fn display_time(&self) -> String {
        self.timestamp.format("%a %b %d %Y %H:%M:%S UTC").to_string()
    }
}

impl From<ChainWave> for WaveRecord {
    fn from(wave: ChainWave) -> Self {
        Self::new(wave.waver, wave.timestamp, wave.message)
    }
}

impl From<NewWaveEvent> for WaveRecord {
    fn from(event: NewWaveEvent) -> Self {
        Self::new(event.from, event.timestamp, event.message)
    }
}

/// Composite identity of a wave: the same waver, second and message are
/// treated as one on-chain wave.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WaveKey {
    pub address: String,
    pub timestamp_secs: i64,
    pub message: String,
}

/// Contract seconds to a point in time. Seconds past `i64::MAX` or outside
/// chrono's range saturate to the epoch.
pub fn timestamp_from_secs(secs: u64) -> DateTime<Utc> {
    i64::try_from(secs)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_from_event_converts_seconds() {
        let record = WaveRecord::from(NewWaveEvent::new("0xDEF", 1_700_000_000, "hi"));

        assert_eq!(record.address, "0xDEF");
        assert_eq!(record.timestamp.timestamp(), 1_700_000_000);
        assert_eq!(record.message, "hi");
        assert_eq!(record.display_time(), "Tue Nov 14 2023 22:13:20 UTC");
    }

    #[test]
    fn key_ignores_address_case() {
        let lower = WaveRecord::new("0xabc", 10, "gm");
        let upper = WaveRecord::new("0xABC", 10, "gm");
        let other = WaveRecord::new("0xABC", 11, "gm");

        assert_eq!(lower.key(), upper.key());
        assert_ne!(lower.key(), other.key());
    }

    #[test]
    fn out_of_range_seconds_saturate_to_epoch() {
        assert_eq!(timestamp_from_secs(u64::MAX), DateTime::<Utc>::UNIX_EPOCH);
    }

    #[test]
    fn event_deserializes_without_log_coordinates() -> Result<(), serde_json::Error> {
        let event: NewWaveEvent =
            serde_json::from_str(r#"{"from":"0xDEF","timestamp":5,"message":"hi"}"#)?;
        assert_eq!(event, NewWaveEvent::new("0xDEF", 5, "hi"));
        Ok(())
    }
}
