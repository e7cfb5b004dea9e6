//! Contract Address Resolution and Startup Validation
//!
//! Maps `ContractId` port identifiers to deployed addresses loaded
//! from `config.toml`, and verifies at startup that each address has
//! code on-chain. This prevents misconfiguration from silently
//! failing at runtime.

use std::sync::Arc;

use alloy::primitives::Address;
use anyhow::{Context, Result, bail};
use tracing::{info, instrument};

use crate::config::ContractsConfig;
use crate::ports::contract_gateway::ContractId;

use super::provider::BscProvider;

/// Deployed game contract addresses loaded from config.
#[derive(Debug, Clone, Copy)]
pub struct ContractAddresses {
  pub clam_nft: Address,
  pub pearl_nft: Address,
  pub clam_bonus: Address,
  pub pearl_farm: Address,
  pub gem_token: Address,
  pub shell_token: Address,
  pub dna_decoder: Address,
}

impl ContractAddresses {
  /// Parse addresses out of the validated config section.
  pub fn from_config(config: &ContractsConfig) -> Result<Self> {
    Ok(Self {
      clam_nft: parse(&config.clam_nft, "clam_nft")?,
      pearl_nft: parse(&config.pearl_nft, "pearl_nft")?,
      clam_bonus: parse(&config.clam_bonus, "clam_bonus")?,
      pearl_farm: parse(&config.pearl_farm, "pearl_farm")?,
      gem_token: parse(&config.gem_token, "gem_token")?,
      shell_token: parse(&config.shell_token, "shell_token")?,
      dna_decoder: parse(&config.dna_decoder, "dna_decoder")?,
    })
  }

  /// Resolve a port-level contract identifier to its address.
  pub fn resolve(&self, contract: ContractId) -> Address {
    match contract {
      ContractId::ClamNft => self.clam_nft,
      ContractId::PearlNft => self.pearl_nft,
      ContractId::ClamBonus => self.clam_bonus,
      ContractId::PearlFarm => self.pearl_farm,
      ContractId::GemToken => self.gem_token,
      ContractId::ShellToken => self.shell_token,
      ContractId::DnaDecoder => self.dna_decoder,
    }
  }

  /// Verify each configured address has deployed code.
  #[instrument(skip_all)]
  pub async fn validate_on_chain(&self, provider: &Arc<BscProvider>) -> Result<()> {
    let inner = provider.inner();

    for (name, addr) in [
      ("ClamNft", self.clam_nft),
      ("PearlNft", self.pearl_nft),
      ("ClamBonus", self.clam_bonus),
      ("PearlFarm", self.pearl_farm),
      ("GemToken", self.gem_token),
      ("ShellToken", self.shell_token),
      ("DnaDecoder", self.dna_decoder),
    ] {
      let code = inner
        .get_code_at(addr)
        .await
        .context(format!("Failed to query code for {name}"))?;

      if code.is_empty() {
        bail!(
          "Contract {name} at {addr} has no deployed code — check config.toml"
        );
      }

      info!(contract = name, address = %addr, "Validated on-chain");
    }

    Ok(())
  }
}

fn parse(raw: &str, name: &str) -> Result<Address> {
  raw.parse()
    .with_context(|| format!("Invalid {name} address: {raw}"))
}
