//! RPC Wallet Provider - Connection and Chain Watching
//!
//! Headless stand-in for a browser wallet: the account address comes
//! from the environment, the active chain from the RPC node. A polling
//! task publishes chain switches on a watch channel so session logic
//! reacts without touching the transport.

use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::Address;
use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, instrument, warn};

use crate::ports::SyncError;
use crate::ports::wallet_provider::WalletProvider;

use super::chain::BscProvider;

/// Wallet provider backed by the shared RPC connection.
pub struct RpcWalletProvider {
  provider: Arc<BscProvider>,
  wallet: Address,
  chain_tx: watch::Sender<u64>,
  poll_interval: Duration,
}

impl RpcWalletProvider {
  /// Create a provider with the wallet address from `WALLET_ADDRESS`.
  ///
  /// `initial_chain_id` seeds the watch channel so subscribers see a
  /// value before the first poll completes.
  pub fn new(
    provider: Arc<BscProvider>,
    initial_chain_id: u64,
    poll_interval: Duration,
  ) -> Result<Self> {
    let wallet_str = std::env::var("WALLET_ADDRESS").context("WALLET_ADDRESS not set")?;
    let wallet: Address = wallet_str.parse().context("Invalid WALLET_ADDRESS")?;

    let (chain_tx, _) = watch::channel(initial_chain_id);

    Ok(Self {
      provider,
      wallet,
      chain_tx,
      poll_interval,
    })
  }

  /// Poll the node for chain switches until shutdown.
  ///
  /// Publishes on the watch channel only when the id actually
  /// changes, so subscribers wake once per switch.
  #[instrument(skip(self, shutdown_rx))]
  pub async fn run(&self, mut shutdown_rx: broadcast::Receiver<()>) {
    let mut ticker = tokio::time::interval(self.poll_interval);

    loop {
      tokio::select! {
        _ = shutdown_rx.recv() => {
          info!("Shutdown signal received in wallet chain watcher");
          return;
        }
        _ = ticker.tick() => {
          match self.provider.inner().get_chain_id().await {
            Ok(chain_id) => {
              self.chain_tx.send_if_modified(|current| {
                if *current == chain_id {
                  return false;
                }
                debug!(from = *current, to = chain_id, "Chain switch observed");
                *current = chain_id;
                true
              });
            }
            Err(e) => {
              warn!(error = %e, "Chain id poll failed");
            }
          }
        }
      }
    }
  }
}

#[async_trait]
impl WalletProvider for RpcWalletProvider {
  async fn active_chain_id(&self) -> Result<u64, SyncError> {
    self.provider
      .inner()
      .get_chain_id()
      .await
      .map_err(|e| SyncError::provider(e.to_string()))
  }

  async fn request_connection(&self) -> Result<String, SyncError> {
    // The RPC node is the connectivity check; the address itself is
    // fixed at construction.
    if !self.provider.is_healthy().await {
      return Err(SyncError::provider("RPC node unreachable"));
    }
    Ok(format!("{:#x}", self.wallet))
  }

  fn chain_events(&self) -> watch::Receiver<u64> {
    self.chain_tx.subscribe()
  }
}
