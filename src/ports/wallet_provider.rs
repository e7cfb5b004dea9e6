//! Wallet Provider Port - Connection and Chain Identity
//!
//! Abstraction over the user's wallet: the active chain, connection
//! requests, and chain-changed notifications. Events are delivered on
//! a watch channel handed out by the port, keeping the effects layer
//! free of transport details.

use async_trait::async_trait;
use tokio::sync::watch;

use super::SyncError;

/// Trait for wallet/provider interaction.
#[async_trait]
pub trait WalletProvider: Send + Sync + 'static {
  /// Read the currently active chain id.
  async fn active_chain_id(&self) -> Result<u64, SyncError>;

  /// Request a wallet connection; resolves with the connected address.
  async fn request_connection(&self) -> Result<String, SyncError>;

  /// Subscribe to chain-changed notifications.
  ///
  /// The receiver yields the new chain id whenever the wallet switches
  /// networks. The initial value is the chain id at subscription time.
  fn chain_events(&self) -> watch::Receiver<u64>;
}
