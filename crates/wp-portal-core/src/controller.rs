//! Application controller.
//!
//! Orchestrates the wallet bridge and the contract client and owns the only
//! mutable UI state: the account, the wave list and the mining flag. All
//! operations run on one thread; state sits in a `RefCell` that is never
//! borrowed across an await, so event callbacks may interleave with a
//! pending submission.

use serde::Serialize;
use std::cell::RefCell;
use tracing::{debug, error, info, warn};
use wp_api_types::{NewWaveEvent, WalletAddress, WaveRecord};
use wp_contract_client::{EventCursor, WavePortal, WaveReceipt};
use wp_wallet_bridge::{BridgeError, Eip1193Provider, WalletBridge};

use crate::error::PortalError;
use crate::wave_list::WaveList;

pub const NO_WALLET_ALERT: &str = "No Ethereum wallet detected. Install a browser wallet such as MetaMask to wave.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    ConnectedIdle,
    Submitting,
    Confirming,
}

/// Everything a view needs to render one frame.
#[derive(Debug, Clone, Serialize)]
pub struct PortalSnapshot {
    pub state: ConnectionState,
    pub account: Option<WalletAddress>,
    pub mining: bool,
    pub listening: bool,
    pub waves: Vec<WaveRecord>,
    pub last_error: Option<PortalError>,
    pub alert: Option<String>,
}

#[derive(Debug)]
struct Inner {
    state: ConnectionState,
    account: Option<WalletAddress>,
    mining: bool,
    waves: WaveList,
    last_error: Option<PortalError>,
    alert: Option<String>,
    listening: bool,
    cursor: Option<EventCursor>,
    /// Bumped on every mount so a poll started before an unmount cannot
    /// deliver into a later mount.
    generation: u64,
}

impl Default for Inner {
    fn default() -> Self {
        Self {
            state: ConnectionState::Disconnected,
            account: None,
            mining: false,
            waves: WaveList::new(),
            last_error: None,
            alert: None,
            listening: false,
            cursor: None,
            generation: 0,
        }
    }
}

pub struct PortalController<P, C> {
    bridge: WalletBridge<P>,
    contract: C,
    dedupe_live_events: bool,
    inner: RefCell<Inner>,
}

impl<P, C> PortalController<P, C>
where
    P: Eip1193Provider,
    C: WavePortal,
{
    pub fn new(bridge: WalletBridge<P>, contract: C) -> Self {
        Self {
            bridge,
            contract,
            dedupe_live_events: true,
            inner: RefCell::new(Inner::default()),
        }
    }

    /// With `false`, every live event is appended even when the same wave is
    /// already listed (e.g. right after the post-confirmation reload).
    pub fn with_event_dedupe(mut self, enabled: bool) -> Self {
        self.dedupe_live_events = enabled;
        self
    }

    pub fn contract(&self) -> &C {
        &self.contract
    }

    // ── Lifecycle ──

    /// Start listening for `NewWave` (when a wallet is present), silently
    /// pick up an already-authorized account and load the list for it.
    pub async fn mount(&self) {
        {
            let mut inner = self.inner.borrow_mut();
            inner.generation += 1;
            inner.listening = self.bridge.has_wallet();
        }

        if self.bridge.has_wallet() {
            info!("Ethereum provider detected");
            self.open_subscription().await;
        } else {
            warn!("no Ethereum wallet detected; waves cannot be sent or listed");
        }

        self.check_authorized_account().await;
    }

    /// Tear down the event subscription. Events observed afterwards are
    /// dropped.
    pub fn unmount(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.listening = false;
        inner.cursor = None;
        info!("NewWave subscription closed");
    }

    async fn open_subscription(&self) {
        let generation = self.inner.borrow().generation;
        match self.contract.subscribe_new_waves().await {
            Ok(cursor) => {
                let mut inner = self.inner.borrow_mut();
                if inner.listening && inner.generation == generation {
                    inner.cursor = Some(cursor);
                    debug!("NewWave subscription opened at block {}", cursor.next_block);
                }
            }
            Err(err) => warn!("failed to subscribe to NewWave: {}", err),
        }
    }

    async fn check_authorized_account(&self) {
        match self.bridge.authorized_accounts().await {
            Ok(accounts) => {
                let Some(account) = accounts.into_iter().next() else {
                    info!("no authorized account found");
                    return;
                };
                self.adopt_account(account);
                // Also on a remount: waves mined while unmounted are only
                // picked up by a full reload.
                let _ = self.load_waves().await;
            }
            // Already logged when mounting.
            Err(BridgeError::WalletAbsent) => {}
            Err(err) => {
                error!("failed to read authorized accounts: {}", err);
                self.record_error(err.into());
            }
        }
    }

    /// Keeps an account already set for this session.
    fn adopt_account(&self, account: WalletAddress) {
        let mut inner = self.inner.borrow_mut();
        if inner.account.is_some() {
            return;
        }
        info!("found an authorized account: {}", account);
        inner.account = Some(account);
        inner.state = ConnectionState::ConnectedIdle;
    }

    // ── User actions ──

    /// Ask the wallet for account access. Failures raise an alert and leave
    /// the session disconnected.
    pub async fn connect_wallet(&self) -> Result<WalletAddress, PortalError> {
        if !self.bridge.has_wallet() {
            warn!("connect requested without a wallet");
            let mut inner = self.inner.borrow_mut();
            inner.alert = Some(NO_WALLET_ALERT.to_owned());
            inner.last_error = Some(PortalError::WalletAbsent);
            return Err(PortalError::WalletAbsent);
        }

        {
            let mut inner = self.inner.borrow_mut();
            if let Some(account) = inner.account.clone() {
                return Ok(account);
            }
            if inner.state == ConnectionState::Connecting {
                return Err(PortalError::Busy);
            }
            inner.state = ConnectionState::Connecting;
            inner.last_error = None;
        }

        let result = match self.bridge.request_accounts().await {
            Ok(accounts) => accounts.into_iter().next().ok_or_else(|| {
                PortalError::AuthorizationRejected("wallet returned no accounts".to_owned())
            }),
            Err(err) => Err(PortalError::from(err)),
        };

        match result {
            Ok(account) => {
                info!("connected {}", account);
                {
                    let mut inner = self.inner.borrow_mut();
                    inner.account = Some(account.clone());
                    inner.state = ConnectionState::ConnectedIdle;
                }
                let _ = self.load_waves().await;
                Ok(account)
            }
            Err(err) => {
                error!("wallet connection failed: {}", err);
                let mut inner = self.inner.borrow_mut();
                inner.state = ConnectionState::Disconnected;
                inner.alert = Some(err.to_string());
                inner.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Submit a wave and follow it until it is mined, then reload the list.
    pub async fn submit_wave(&self, message: &str) -> Result<WaveReceipt, PortalError> {
        {
            let mut inner = self.inner.borrow_mut();
            match inner.state {
                ConnectionState::ConnectedIdle => {}
                ConnectionState::Submitting | ConnectionState::Confirming => {
                    return Err(PortalError::Busy);
                }
                ConnectionState::Disconnected | ConnectionState::Connecting => {
                    inner.last_error = Some(PortalError::NotConnected);
                    return Err(PortalError::NotConnected);
                }
            }
            if message.trim().is_empty() {
                inner.last_error = Some(PortalError::EmptyMessage);
                return Err(PortalError::EmptyMessage);
            }
            inner.state = ConnectionState::Submitting;
            inner.last_error = None;
        }

        self.log_total_waves().await;

        let pending = match self.contract.submit_wave(message).await {
            Ok(pending) => pending,
            Err(err) => return Err(self.fail_submission(err.into())),
        };

        {
            let mut inner = self.inner.borrow_mut();
            inner.mining = true;
            inner.state = ConnectionState::Confirming;
        }
        info!("mining {}", pending.tx_hash);

        let confirmed = self.contract.wait_for_confirmation(&pending).await;
        self.inner.borrow_mut().mining = false;
        let receipt = match confirmed {
            Ok(receipt) => receipt,
            Err(err) => return Err(self.fail_submission(err.into())),
        };
        info!("mined {}", receipt.tx_hash);

        self.log_total_waves().await;
        let _ = self.load_waves().await;
        self.inner.borrow_mut().state = ConnectionState::ConnectedIdle;

        Ok(receipt)
    }

    fn fail_submission(&self, err: PortalError) -> PortalError {
        error!("wave failed: {}", err);
        let mut inner = self.inner.borrow_mut();
        inner.mining = false;
        inner.state = ConnectionState::ConnectedIdle;
        inner.last_error = Some(err.clone());
        err
    }

    async fn log_total_waves(&self) {
        match self.contract.total_waves().await {
            Ok(count) => debug!("retrieved total wave count: {}", count),
            Err(err) => warn!("failed to read total wave count: {}", err),
        }
    }

    // ── Wave list ──

    /// Replace the list with a fresh `getAllWaves()`.
    pub async fn load_waves(&self) -> Result<usize, PortalError> {
        match self.contract.all_waves().await {
            Ok(waves) => {
                let records: Vec<WaveRecord> = waves.into_iter().map(WaveRecord::from).collect();
                let count = records.len();
                self.inner.borrow_mut().waves.replace_all(records);
                debug!("loaded {} wave(s)", count);
                Ok(count)
            }
            Err(err) => {
                let err = PortalError::from(err);
                error!("failed to load waves: {}", err);
                self.record_error(err.clone());
                Err(err)
            }
        }
    }

    /// Deliver one observed `NewWave`. Appends in any connection state while
    /// mounted; returns whether the list changed.
    pub fn handle_new_wave(&self, event: NewWaveEvent) -> bool {
        let mut inner = self.inner.borrow_mut();
        if !inner.listening {
            debug!("dropping NewWave from {} after unmount", event.from);
            return false;
        }

        info!("NewWave from {} at {}: {}", event.from, event.timestamp, event.message);
        let record = WaveRecord::from(event);
        if self.dedupe_live_events {
            let appended = inner.waves.append_unique(record);
            if !appended {
                debug!("NewWave already listed");
            }
            appended
        } else {
            inner.waves.append(record);
            true
        }
    }

    /// Poll the subscription once and deliver what it returns. Re-subscribes
    /// when the subscription could not be opened at mount.
    pub async fn poll_events(&self) -> Result<usize, PortalError> {
        let (cursor, generation) = {
            let inner = self.inner.borrow();
            if !inner.listening {
                return Ok(0);
            }
            (inner.cursor, inner.generation)
        };

        let Some(mut cursor) = cursor else {
            self.open_subscription().await;
            return Ok(0);
        };

        let events = match self.contract.poll_new_waves(&mut cursor).await {
            Ok(events) => events,
            Err(err) => {
                warn!("NewWave poll failed: {}", err);
                return Err(err.into());
            }
        };

        {
            let mut inner = self.inner.borrow_mut();
            if !inner.listening || inner.generation != generation {
                return Ok(0);
            }
            inner.cursor = Some(cursor);
        }

        Ok(events
            .into_iter()
            .map(|event| self.handle_new_wave(event))
            .filter(|appended| *appended)
            .count())
    }

    // ── Read access ──

    fn record_error(&self, err: PortalError) {
        self.inner.borrow_mut().last_error = Some(err);
    }

    pub fn state(&self) -> ConnectionState {
        self.inner.borrow().state
    }

    pub fn current_account(&self) -> Option<WalletAddress> {
        self.inner.borrow().account.clone()
    }

    pub fn is_mining(&self) -> bool {
        self.inner.borrow().mining
    }

    pub fn is_listening(&self) -> bool {
        self.inner.borrow().listening
    }

    pub fn waves(&self) -> Vec<WaveRecord> {
        self.inner.borrow().waves.records().to_vec()
    }

    pub fn last_error(&self) -> Option<PortalError> {
        self.inner.borrow().last_error.clone()
    }

    /// The pending alert, if any. Each alert is handed out once.
    pub fn take_alert(&self) -> Option<String> {
        self.inner.borrow_mut().alert.take()
    }

    pub fn snapshot(&self) -> PortalSnapshot {
        let inner = self.inner.borrow();
        PortalSnapshot {
            state: inner.state,
            account: inner.account.clone(),
            mining: inner.mining,
            listening: inner.listening,
            waves: inner.waves.records().to_vec(),
            last_error: inner.last_error.clone(),
            alert: inner.alert.clone(),
        }
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
