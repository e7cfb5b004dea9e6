//! On-Chain DNA Decoder
//!
//! Resolves a clam's DNA sequence into its trait record through the
//! decoder contract. Decoded records are immutable per sequence, so
//! results are memoized for the lifetime of the process.

use std::collections::HashMap;
use std::sync::Arc;

use alloy::primitives::U256;
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use crate::domain::{Dna, TraitRecord};
use crate::ports::SyncError;
use crate::ports::contract_gateway::{CallArg, CallValue, ContractGateway, ContractId};
use crate::ports::dna_decoder::DnaDecoder;

pub struct OnChainDnaDecoder<G: ContractGateway> {
  gateway: Arc<G>,
  cache: RwLock<HashMap<Dna, TraitRecord>>,
}

impl<G: ContractGateway> OnChainDnaDecoder<G> {
  pub fn new(gateway: Arc<G>) -> Self {
    Self {
      gateway,
      cache: RwLock::new(HashMap::new()),
    }
  }

}

fn shape_record(value: &CallValue) -> Option<TraitRecord> {
  let fields = value.as_tuple()?;
  if fields.len() != 6 {
    return None;
  }
  Some(TraitRecord {
    shape: fields[0].as_text()?.to_owned(),
    color: fields[1].as_text()?.to_owned(),
    rarity: fields[2].as_text()?.to_owned(),
    rarity_value: u64::try_from(fields[3].as_uint()?).ok()?,
    lifespan: u64::try_from(fields[4].as_uint()?).ok()?,
    size: u64::try_from(fields[5].as_uint()?).ok()?,
  })
}

#[async_trait]
impl<G: ContractGateway> DnaDecoder for OnChainDnaDecoder<G> {
  #[instrument(skip(self), fields(dna = %dna))]
  async fn decode(&self, dna: &Dna) -> Result<TraitRecord, SyncError> {
    if let Some(record) = self.cache.read().await.get(dna) {
      debug!("dna cache hit");
      return Ok(record.clone());
    }

    let sequence: U256 = dna
      .0
      .parse()
      .map_err(|_| SyncError::decode(format!("non-numeric DNA sequence: {dna}")))?;

    let value = self
      .gateway
      .read(
        ContractId::DnaDecoder,
        "getDNADecoded",
        &[CallArg::Uint(sequence)],
      )
      .await?;

    let record = shape_record(&value)
      .ok_or_else(|| SyncError::decode(format!("malformed trait tuple for DNA {dna}")))?;

    self.cache
      .write()
      .await
      .insert(dna.clone(), record.clone());
    Ok(record)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn shapes_a_six_field_tuple() {
    let value = CallValue::Tuple(vec![
      CallValue::Text("golden".into()),
      CallValue::Text("pearl white".into()),
      CallValue::Text("Legendary".into()),
      CallValue::Uint(U256::from(125_000_000u64)),
      CallValue::Uint(U256::from(30u64)),
      CallValue::Uint(U256::from(4u64)),
    ]);

    let record = shape_record(&value).expect("shapes");
    assert_eq!(record.shape, "golden");
    assert_eq!(record.rarity, "Legendary");
    assert_eq!(record.lifespan, 30);
  }

  #[test]
  fn wrong_arity_is_rejected() {
    let value = CallValue::Tuple(vec![CallValue::Text("golden".into())]);
    assert!(shape_record(&value).is_none());
  }
}
