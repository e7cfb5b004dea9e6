//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) the synchronization effects require
//! from the outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `ContractGateway`: read/estimate/send against deployed contracts
//! - `DnaDecoder`: DNA byte-string to trait-record interpretation
//! - `WalletProvider`: chain identity and connection requests
//! - `ImageCache`: resolved display images keyed by DNA

pub mod contract_gateway;
pub mod dna_decoder;
pub mod image_cache;
pub mod wallet_provider;

use thiserror::Error;

/// Failure taxonomy shared by all ports.
///
/// Every effect catches these at its own boundary and converts them
/// into an `account.error` merge; nothing propagates to subscribers
/// uncaught and nothing is fatal to the process.
#[derive(Debug, Clone, Error)]
pub enum SyncError {
  /// Wallet/network-layer failure. Surfaced verbatim.
  #[error("{0}")]
  Provider(String),
  /// A contract read/estimate/send rejection. The reason often embeds
  /// a `"message": "<text>"` fragment the store extracts for display.
  #[error("{method} failed: {reason}")]
  ContractCall { method: String, reason: String },
  /// Malformed DNA payload. Enumerations filter the owning asset out
  /// rather than failing the whole batch.
  #[error("malformed DNA payload: {0}")]
  Decode(String),
}

impl SyncError {
  pub fn provider(reason: impl Into<String>) -> Self {
    Self::Provider(reason.into())
  }

  pub fn contract(method: impl Into<String>, reason: impl Into<String>) -> Self {
    Self::ContractCall {
      method: method.into(),
      reason: reason.into(),
    }
  }

  pub fn decode(reason: impl Into<String>) -> Self {
    Self::Decode(reason.into())
  }
}
