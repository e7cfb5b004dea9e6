//! EVM Gateway - Generic Contract Call Adapter
//!
//! Implements the `ContractGateway` port over alloy-rs 0.9 with
//! hand-rolled ABI encoding for the fixed method set the game
//! contracts expose: keccak selector plus 32-byte words, dynamic
//! strings via offset/length. Return shapes are keyed by method name
//! since the contract set is closed.

use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{Address, Bytes, U256, keccak256};
use alloy::rpc::types::TransactionRequest;
use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::ports::SyncError;
use crate::ports::contract_gateway::{
  CallArg, CallValue, ContractGateway, ContractId, TxReceipt,
};

use super::contracts::ContractAddresses;
use super::provider::BscProvider;

/// Return layout for a known contract method.
#[derive(Debug, Clone, Copy)]
enum ReturnShape {
  /// Single unsigned word.
  Uint,
  /// Single boolean word.
  Bool,
  /// `(string dna, uint256 birthTime)` token data structs.
  TokenData,
  /// `(string, string, string, uint256, uint256, uint256)` decoded
  /// trait tuple: shape, color, rarity, rarityValue, lifespan, size.
  DnaTraits,
}

/// `ContractGateway` implementation over a shared BSC provider.
pub struct EvmGateway {
  provider: Arc<BscProvider>,
  addresses: ContractAddresses,
  /// Per-request deadline; receipt confirmation is exempt since
  /// mining time is unbounded.
  request_timeout: Duration,
}

impl EvmGateway {
  pub fn new(
    provider: Arc<BscProvider>,
    addresses: ContractAddresses,
    request_timeout: Duration,
  ) -> Self {
    Self {
      provider,
      addresses,
      request_timeout,
    }
  }

  fn build_request(
    &self,
    contract: ContractId,
    method: &str,
    args: &[CallArg],
  ) -> Result<TransactionRequest, SyncError> {
    let calldata = encode_call(method, args);
    Ok(TransactionRequest::default()
      .to(self.addresses.resolve(contract))
      .input(Bytes::from(calldata).into()))
  }

  fn parse_sender(sender: &str) -> Result<Address, SyncError> {
    sender
      .parse()
      .map_err(|_| SyncError::provider(format!("invalid sender address: {sender}")))
  }
}

#[async_trait]
impl ContractGateway for EvmGateway {
  #[instrument(skip(self, args), fields(contract = %contract))]
  async fn read(
    &self,
    contract: ContractId,
    method: &str,
    args: &[CallArg],
  ) -> Result<CallValue, SyncError> {
    let tx = self.build_request(contract, method, args)?;
    let shape = return_shape(method)?;

    let raw = tokio::time::timeout(self.request_timeout, self.provider.inner().call(&tx))
      .await
      .map_err(|_| SyncError::contract(method, "RPC request timed out"))?
      .map_err(|e| SyncError::contract(method, e.to_string()))?;

    debug!(method, bytes = raw.len(), "contract read");
    decode_return(shape, &raw)
      .ok_or_else(|| SyncError::contract(method, "unexpected return shape"))
  }

  #[instrument(skip(self, args), fields(contract = %contract))]
  async fn estimate_gas(
    &self,
    contract: ContractId,
    method: &str,
    args: &[CallArg],
    sender: &str,
  ) -> Result<u64, SyncError> {
    let mut tx = self.build_request(contract, method, args)?;
    tx.from = Some(Self::parse_sender(sender)?);

    tokio::time::timeout(self.request_timeout, self.provider.inner().estimate_gas(&tx))
      .await
      .map_err(|_| SyncError::contract(method, "RPC request timed out"))?
      .map_err(|e| SyncError::contract(method, e.to_string()))
  }

  #[instrument(skip(self, args), fields(contract = %contract))]
  async fn send(
    &self,
    contract: ContractId,
    method: &str,
    args: &[CallArg],
    sender: &str,
    gas: u64,
  ) -> Result<TxReceipt, SyncError> {
    let mut tx = self.build_request(contract, method, args)?;
    tx.from = Some(Self::parse_sender(sender)?);
    tx.gas = Some(gas);

    let pending = tokio::time::timeout(
      self.request_timeout,
      self.provider.inner().send_transaction(tx),
    )
    .await
    .map_err(|_| SyncError::contract(method, "RPC request timed out"))?
    .map_err(|e| SyncError::contract(method, e.to_string()))?;

    let receipt = pending
      .get_receipt()
      .await
      .map_err(|e| SyncError::contract(method, e.to_string()))?;

    Ok(TxReceipt {
      tx_hash: format!("{:#x}", receipt.transaction_hash),
      block_number: receipt.block_number,
      gas_used: receipt.gas_used,
    })
  }

  async fn native_balance(&self, address: &str) -> Result<U256, SyncError> {
    let address: Address = address
      .parse()
      .map_err(|_| SyncError::provider(format!("invalid address: {address}")))?;

    tokio::time::timeout(self.request_timeout, self.provider.inner().get_balance(address))
      .await
      .map_err(|_| SyncError::provider("RPC request timed out"))?
      .map_err(|e| SyncError::provider(e.to_string()))
  }

  async fn block_timestamp(&self) -> Result<u64, SyncError> {
    use alloy::eips::BlockNumberOrTag;
    use alloy::rpc::types::BlockTransactionsKind;

    let block = tokio::time::timeout(
      self.request_timeout,
      self
        .provider
        .inner()
        .get_block_by_number(BlockNumberOrTag::Latest, BlockTransactionsKind::Hashes),
    )
    .await
    .map_err(|_| SyncError::provider("RPC request timed out"))?
    .map_err(|e| SyncError::provider(e.to_string()))?
    .ok_or_else(|| SyncError::provider("latest block unavailable"))?;

    Ok(block.header.timestamp)
  }

  fn contract_address(&self, contract: ContractId) -> String {
    format!("{:#x}", self.addresses.resolve(contract))
  }

  async fn is_healthy(&self) -> bool {
    self.provider.is_healthy().await
  }
}

/// Canonical signature derived from the argument types, then keccak
/// selector + encoded words.
fn encode_call(method: &str, args: &[CallArg]) -> Vec<u8> {
  let types: Vec<&str> = args
    .iter()
    .map(|arg| match arg {
      CallArg::Address(_) => "address",
      CallArg::Uint(_) => "uint256",
      CallArg::Bool(_) => "bool",
      CallArg::Bytes(_) => "bytes",
    })
    .collect();
  let signature = format!("{method}({})", types.join(","));
  let selector = &keccak256(signature.as_bytes())[..4];

  // Head words, then dynamic tails (bytes args only).
  let head_len = args.len() * 32;
  let mut head: Vec<u8> = Vec::with_capacity(4 + head_len);
  let mut tail: Vec<u8> = Vec::new();
  head.extend_from_slice(selector);

  for arg in args {
    match arg {
      CallArg::Address(addr) => {
        let mut word = [0u8; 32];
        if let Ok(parsed) = addr.parse::<Address>() {
          word[12..].copy_from_slice(parsed.as_slice());
        }
        head.extend_from_slice(&word);
      }
      CallArg::Uint(value) => {
        head.extend_from_slice(&value.to_be_bytes::<32>());
      }
      CallArg::Bool(value) => {
        let mut word = [0u8; 32];
        word[31] = u8::from(*value);
        head.extend_from_slice(&word);
      }
      CallArg::Bytes(data) => {
        // Offset from the start of the head to this tail entry.
        let offset = U256::from(head_len + tail.len());
        head.extend_from_slice(&offset.to_be_bytes::<32>());

        tail.extend_from_slice(&U256::from(data.len()).to_be_bytes::<32>());
        tail.extend_from_slice(data);
        let padding = (32 - data.len() % 32) % 32;
        tail.extend_from_slice(&vec![0u8; padding]);
      }
    }
  }

  head.extend_from_slice(&tail);
  head
}

/// Return layout per method of the closed contract set.
fn return_shape(method: &str) -> Result<ReturnShape, SyncError> {
  let shape = match method {
    "balanceOf" | "allowance" | "tokenOfOwnerByIndex" | "pearlPrice"
    | "getRemainingPearlProductionTime" | "getClamIncubationTime"
    | "getClamValueInShellToken" | "baseGemRewards"
    | "calculateBonusRewards" => ReturnShape::Uint,
    "isApprovedForAll" | "isPearlProductionTimeYet" => ReturnShape::Bool,
    "getClamData" | "getPearlData" => ReturnShape::TokenData,
    "getDNADecoded" => ReturnShape::DnaTraits,
    other => {
      return Err(SyncError::contract(
        other,
        "no return shape registered for method",
      ));
    }
  };
  Ok(shape)
}

fn decode_return(shape: ReturnShape, data: &[u8]) -> Option<CallValue> {
  match shape {
    ReturnShape::Uint => Some(CallValue::Uint(word(data, 0)?)),
    ReturnShape::Bool => Some(CallValue::Bool(!word(data, 0)?.is_zero())),
    ReturnShape::TokenData => {
      let dna = string_at(data, word(data, 0)?)?;
      let birth_time = word(data, 1)?;
      Some(CallValue::Tuple(vec![
        CallValue::Text(dna),
        CallValue::Uint(birth_time),
      ]))
    }
    ReturnShape::DnaTraits => {
      let shape_trait = string_at(data, word(data, 0)?)?;
      let color = string_at(data, word(data, 1)?)?;
      let rarity = string_at(data, word(data, 2)?)?;
      Some(CallValue::Tuple(vec![
        CallValue::Text(shape_trait),
        CallValue::Text(color),
        CallValue::Text(rarity),
        CallValue::Uint(word(data, 3)?),
        CallValue::Uint(word(data, 4)?),
        CallValue::Uint(word(data, 5)?),
      ]))
    }
  }
}

/// Read the `index`-th 32-byte word as a U256.
fn word(data: &[u8], index: usize) -> Option<U256> {
  let start = index * 32;
  let end = start + 32;
  if data.len() < end {
    return None;
  }
  Some(U256::from_be_slice(&data[start..end]))
}

/// Read an ABI-encoded string at a byte offset into the return data.
fn string_at(data: &[u8], offset: U256) -> Option<String> {
  let offset = usize::try_from(offset).ok()?;
  if data.len() < offset + 32 {
    return None;
  }
  let len = usize::try_from(U256::from_be_slice(&data[offset..offset + 32])).ok()?;
  let start = offset + 32;
  let bytes = data.get(start..start + len)?;
  Some(String::from_utf8_lossy(bytes).into_owned())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn encodes_selector_and_padded_address() {
    let calldata = encode_call(
      "balanceOf",
      &[CallArg::Address(
        "0x1111111111111111111111111111111111111111".into(),
      )],
    );

    let expected_selector = &keccak256(b"balanceOf(address)")[..4];
    assert_eq!(&calldata[..4], expected_selector);
    assert_eq!(calldata.len(), 4 + 32);
    // 12 zero bytes, then the address.
    assert!(calldata[4..16].iter().all(|b| *b == 0));
    assert!(calldata[16..36].iter().all(|b| *b == 0x11));
  }

  #[test]
  fn encodes_dynamic_bytes_with_offset() {
    let calldata = encode_call("getDNADecoded", &[CallArg::Bytes(vec![0xAB; 5])]);

    // selector + offset word + length word + one padded data word
    assert_eq!(calldata.len(), 4 + 32 + 32 + 32);
    // Offset points just past the single head word.
    assert_eq!(U256::from_be_slice(&calldata[4..36]), U256::from(32u64));
    assert_eq!(U256::from_be_slice(&calldata[36..68]), U256::from(5u64));
    assert_eq!(&calldata[68..73], &[0xAB; 5]);
    assert!(calldata[73..].iter().all(|b| *b == 0));
  }

  #[test]
  fn decodes_token_data_tuple() {
    // (string "42", uint 1700000000)
    let mut data = Vec::new();
    data.extend_from_slice(&U256::from(64u64).to_be_bytes::<32>()); // string offset
    data.extend_from_slice(&U256::from(1_700_000_000u64).to_be_bytes::<32>());
    data.extend_from_slice(&U256::from(2u64).to_be_bytes::<32>()); // len
    let mut text = [0u8; 32];
    text[..2].copy_from_slice(b"42");
    data.extend_from_slice(&text);

    let value = decode_return(ReturnShape::TokenData, &data).expect("decodes");
    let fields = value.as_tuple().expect("tuple");
    assert_eq!(fields[0].as_text(), Some("42"));
    assert_eq!(fields[1].as_uint(), Some(U256::from(1_700_000_000u64)));
  }

  #[test]
  fn truncated_return_data_is_rejected() {
    assert!(decode_return(ReturnShape::Uint, &[0u8; 16]).is_none());
    assert!(decode_return(ReturnShape::TokenData, &[0u8; 32]).is_none());
  }
}
