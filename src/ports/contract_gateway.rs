//! Contract Gateway Port - On-chain Call Interface
//!
//! Abstraction over the fixed set of deployed game contracts. Exposes
//! read-only `read` calls plus the estimate/send pair used by the
//! transaction pipeline. Implemented over BSC via alloy-rs.

use alloy::primitives::U256;
use async_trait::async_trait;

use super::SyncError;

/// The deployed contracts this engine talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContractId {
  /// Clam NFT (ERC-721 enumerable + game data).
  ClamNft,
  /// Pearl NFT (ERC-721 enumerable + game data).
  PearlNft,
  /// Bonus reward calculator.
  ClamBonus,
  /// Pearl farm (staking).
  PearlFarm,
  /// $GEM BEP-20 token.
  GemToken,
  /// $SHELL BEP-20 token.
  ShellToken,
  /// DNA decoder contract.
  DnaDecoder,
}

impl std::fmt::Display for ContractId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let s = match self {
      Self::ClamNft => "ClamNft",
      Self::PearlNft => "PearlNft",
      Self::ClamBonus => "ClamBonus",
      Self::PearlFarm => "PearlFarm",
      Self::GemToken => "GemToken",
      Self::ShellToken => "ShellToken",
      Self::DnaDecoder => "DnaDecoder",
    };
    f.write_str(s)
  }
}

/// Argument for a contract call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallArg {
  /// A 20-byte address, hex-encoded.
  Address(String),
  /// An unsigned 256-bit word.
  Uint(U256),
  /// A boolean word.
  Bool(bool),
  /// Raw bytes (DNA payloads).
  Bytes(Vec<u8>),
}

/// Decoded return value of a contract read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallValue {
  /// A single unsigned word.
  Uint(U256),
  /// A single boolean word.
  Bool(bool),
  /// A decoded string.
  Text(String),
  /// An ordered tuple of values (struct returns).
  Tuple(Vec<CallValue>),
}

impl CallValue {
  pub fn as_uint(&self) -> Option<U256> {
    match self {
      Self::Uint(v) => Some(*v),
      _ => None,
    }
  }

  pub fn as_bool(&self) -> Option<bool> {
    match self {
      Self::Bool(v) => Some(*v),
      _ => None,
    }
  }

  pub fn as_text(&self) -> Option<&str> {
    match self {
      Self::Text(v) => Some(v),
      _ => None,
    }
  }

  pub fn as_tuple(&self) -> Option<&[CallValue]> {
    match self {
      Self::Tuple(v) => Some(v),
      _ => None,
    }
  }
}

/// Receipt of a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
  /// Transaction hash.
  pub tx_hash: String,
  /// Block the transaction landed in, when known.
  pub block_number: Option<u64>,
  /// Gas actually consumed.
  pub gas_used: u64,
}

/// Trait for on-chain interactions with the game contracts.
///
/// All methods may reject with an opaque provider error string; the
/// effects layer converts rejections into `account.error` merges
/// rather than letting them propagate.
#[async_trait]
pub trait ContractGateway: Send + Sync + 'static {
  /// Execute a read-only contract call.
  async fn read(
    &self,
    contract: ContractId,
    method: &str,
    args: &[CallArg],
  ) -> Result<CallValue, SyncError>;

  /// Estimate gas for a state-mutating call from `sender`.
  async fn estimate_gas(
    &self,
    contract: ContractId,
    method: &str,
    args: &[CallArg],
    sender: &str,
  ) -> Result<u64, SyncError>;

  /// Submit a state-mutating call with an explicit gas limit.
  async fn send(
    &self,
    contract: ContractId,
    method: &str,
    args: &[CallArg],
    sender: &str,
    gas: u64,
  ) -> Result<TxReceipt, SyncError>;

  /// Native BNB balance of an address in wei.
  async fn native_balance(&self, address: &str) -> Result<U256, SyncError>;

  /// Timestamp of the latest block (unix seconds).
  async fn block_timestamp(&self) -> Result<u64, SyncError>;

  /// Deployed address of one of the game contracts, hex-encoded.
  ///
  /// Needed when a contract address is itself a call argument
  /// (allowance/approval targets).
  fn contract_address(&self, contract: ContractId) -> String;

  /// Check if the RPC connection is healthy.
  async fn is_healthy(&self) -> bool;
}
