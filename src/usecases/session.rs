//! Session Manager - Connection State Machine
//!
//! Tracks the wallet connection session:
//! `Disconnected -> Connecting -> Connected(correct|wrong chain) -> Disconnected`.
//! Network-change events re-evaluate chain correctness in place; an
//! explicit disconnect (or a failed connection attempt) returns to
//! `Disconnected` and resets the account sub-document.
//!
//! While the session sits on the wrong chain, balance and asset sync
//! are suppressed via `sync_allowed` and resume automatically once the
//! chain id matches again.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::domain::patch::{AccountPatch, FieldPatch, StorePatch, SubDoc};
use crate::ports::wallet_provider::WalletProvider;
use crate::store::StoreHandle;

/// Connection session phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
  /// No wallet connected.
  Disconnected,
  /// Connection request in flight.
  Connecting,
  /// Wallet connected; `wrong_chain` marks a network mismatch that
  /// suppresses sync effects until the user switches back.
  Connected { wrong_chain: bool },
}

/// Drives connection state and network identity sync.
pub struct SessionManager<W: WalletProvider> {
  wallet: Arc<W>,
  store: StoreHandle,
  required_chain_id: u64,
  phase: RwLock<SessionPhase>,
}

impl<W: WalletProvider> SessionManager<W> {
  pub fn new(wallet: Arc<W>, store: StoreHandle, required_chain_id: u64) -> Self {
    Self {
      wallet,
      store,
      required_chain_id,
      phase: RwLock::new(SessionPhase::Disconnected),
    }
  }

  /// Current session phase.
  pub async fn phase(&self) -> SessionPhase {
    *self.phase.read().await
  }

  /// Whether balance/asset sync effects may run right now.
  pub async fn sync_allowed(&self) -> bool {
    matches!(
      *self.phase.read().await,
      SessionPhase::Connected { wrong_chain: false }
    )
  }

  /// Request a wallet connection (user action).
  ///
  /// On approval, records the address and the active chain into the
  /// account sub-document. A rejection surfaces the provider error
  /// and returns the session to `Disconnected`; retry happens on the
  /// next user action.
  pub async fn connect(&self) -> SessionPhase {
    *self.phase.write().await = SessionPhase::Connecting;

    let address = match self.wallet.request_connection().await {
      Ok(address) => address,
      Err(e) => {
        warn!(error = %e, "wallet connection rejected");
        *self.phase.write().await = SessionPhase::Disconnected;
        self
          .store
          .apply(StorePatch::Account(AccountPatch::with_error(e.to_string())))
          .await;
        return SessionPhase::Disconnected;
      }
    };

    // A chain-id read failure right after approval is treated as an
    // unrecoverable provider error for this attempt.
    let chain_id = match self.wallet.active_chain_id().await {
      Ok(id) => id,
      Err(e) => {
        warn!(error = %e, "chain id read failed after connection");
        *self.phase.write().await = SessionPhase::Disconnected;
        self
          .store
          .apply(StorePatch::Account(AccountPatch::with_error(e.to_string())))
          .await;
        return SessionPhase::Disconnected;
      }
    };

    let wrong_chain = chain_id != self.required_chain_id;
    let phase = SessionPhase::Connected { wrong_chain };
    *self.phase.write().await = phase;

    info!(address = %address, chain_id, wrong_chain, "wallet connected");
    self
      .store
      .apply(StorePatch::Account(AccountPatch {
        address: FieldPatch::Set(address),
        is_connected: Some(true),
        chain_id: Some(chain_id),
        is_bs_chain: Some(!wrong_chain),
        error: FieldPatch::Clear,
        ..AccountPatch::default()
      }))
      .await;

    phase
  }

  /// Explicit disconnect: back to `Disconnected`, account reset to its
  /// initial defaults.
  pub async fn disconnect(&self) {
    *self.phase.write().await = SessionPhase::Disconnected;
    self.store.reset(SubDoc::Account).await;
    info!("wallet disconnected");
  }

  /// Handle a chain-changed notification from the wallet.
  ///
  /// Re-evaluates chain correctness and merges the new network
  /// identity. The connection itself survives network switches.
  pub async fn on_chain_changed(&self, chain_id: u64) {
    let wrong_chain = chain_id != self.required_chain_id;

    {
      let mut phase = self.phase.write().await;
      if matches!(*phase, SessionPhase::Connected { .. }) {
        *phase = SessionPhase::Connected { wrong_chain };
      }
    }

    info!(chain_id, wrong_chain, "chain changed");
    self
      .store
      .apply(StorePatch::Account(AccountPatch {
        chain_id: Some(chain_id),
        is_bs_chain: Some(!wrong_chain),
        ..AccountPatch::default()
      }))
      .await;
  }

  /// Network identity sync on mount or on a polling tick: re-read the
  /// active chain id and merge it if it differs from the last known
  /// value.
  pub async fn refresh_chain_identity(&self) {
    let chain_id = match self.wallet.active_chain_id().await {
      Ok(id) => id,
      Err(e) => {
        warn!(error = %e, "chain id poll failed");
        self
          .store
          .apply(StorePatch::Account(AccountPatch::with_error(e.to_string())))
          .await;
        return;
      }
    };

    if self.store.snapshot().account.chain_id != chain_id {
      self.on_chain_changed(chain_id).await;
    }
  }

  /// Follow wallet chain-changed events until the event source closes.
  ///
  /// Intended to be spawned; each event flows through
  /// `on_chain_changed`.
  pub async fn watch_chain_events(&self) {
    let mut events = self.wallet.chain_events();
    while events.changed().await.is_ok() {
      let chain_id = *events.borrow_and_update();
      self.on_chain_changed(chain_id).await;
    }
  }
}
