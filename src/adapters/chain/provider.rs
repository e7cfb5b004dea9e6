//! BSC RPC Provider - alloy-rs 0.9 Connection Management
//!
//! Manages the connection to Binance Smart Chain via alloy-rs and
//! exposes a shared provider instance for all on-chain operations.
//!
//! In alloy 0.9, `ProviderBuilder::new().on_builtin()` boxes the
//! transport, so the provider can be stored as a type-erased
//! `dyn Provider` to keep the API clean across the adapter layer.

use std::sync::Arc;

use alloy::providers::{Provider, ProviderBuilder};
use anyhow::{Context, Result};
use tracing::{info, instrument, warn};

use crate::config::ChainConfig;

/// Shared BSC RPC provider backed by alloy-rs 0.9.
///
/// All chain adapters share a single provider instance to avoid
/// redundant connections. The node's chain id is read at startup for
/// diagnostics but a mismatch is not fatal here - network correctness
/// is the session state machine's concern, and the wrong-chain state
/// must stay reachable.
pub struct BscProvider {
  /// The alloy HTTP provider (type-erased).
  provider: Arc<dyn Provider + Send + Sync>,
  /// Chain id the node reported at connect time.
  chain_id: u64,
}

impl BscProvider {
  /// Connect to the configured RPC endpoint.
  #[instrument(skip_all)]
  pub async fn connect(config: &ChainConfig) -> Result<Self> {
    // alloy 0.9: on_builtin boxes the transport, which the trait
    // object below requires.
    let provider = ProviderBuilder::new()
      .on_builtin(&config.rpc_url)
      .await
      .context("Failed to connect RPC provider")?;

    let provider: Arc<dyn Provider + Send + Sync> = Arc::new(provider);

    let chain_id = provider
      .get_chain_id()
      .await
      .context("Failed to query chain ID")?;

    if chain_id != config.required_chain_id {
      warn!(
        chain_id,
        required = config.required_chain_id,
        "RPC node is not on the required chain"
      );
    } else {
      info!(chain_id, "Connected to BSC RPC");
    }

    Ok(Self { provider, chain_id })
  }

  /// Get a shared reference to the alloy provider (type-erased).
  pub fn inner(&self) -> Arc<dyn Provider + Send + Sync> {
    Arc::clone(&self.provider)
  }

  /// Chain id the node reported at connect time.
  pub fn chain_id(&self) -> u64 {
    self.chain_id
  }

  /// Check if the RPC connection is healthy via a lightweight call.
  pub async fn is_healthy(&self) -> bool {
    self.provider.get_block_number().await.is_ok()
  }
}
