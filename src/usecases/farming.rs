//! Farming Use Case - Pearl Farm Staking and Clam Harvesting
//!
//! User-action effects against the pearl farm and clam contracts, all
//! routed through the transaction pipeline so approvals, estimation,
//! abort-on-rejection and error surfacing behave identically across
//! operations. Read-only helpers cover the production timers, the
//! incubation rule, and the bonus-reward calculator.

use std::sync::Arc;

use alloy::primitives::U256;
use tracing::info;

use crate::domain::assets::{ClamBonus, ClamDescriptor};
use crate::domain::balance::{TokenSymbol, format_units};
use crate::domain::dna::TraitRecord;
use crate::domain::patch::{AccountPatch, StorePatch};
use crate::ports::SyncError;
use crate::ports::contract_gateway::{CallArg, ContractGateway, ContractId, TxReceipt};
use crate::store::StoreHandle;

use super::tx_flow::{Approval, TxPipeline};

/// Pearl-farm and harvest operations for the connected account.
pub struct Farming<G: ContractGateway> {
  gateway: Arc<G>,
  pipeline: TxPipeline<G>,
  store: StoreHandle,
}

impl<G: ContractGateway> Farming<G> {
  pub fn new(gateway: Arc<G>, store: StoreHandle) -> Self {
    let pipeline = TxPipeline::new(Arc::clone(&gateway), store.clone());
    Self {
      gateway,
      pipeline,
      store,
    }
  }

  /// GEM price of staking a clam into the farm.
  pub async fn pearl_price(&self) -> Result<U256, SyncError> {
    self.read_uint(ContractId::PearlFarm, "pearlPrice", &[]).await
  }

  /// Stake a clam into the pearl farm.
  ///
  /// Pre-checks that the sender holds enough GEM to cover the pearl
  /// price, surfacing a human-readable shortfall message; then grants
  /// the clam operator approval and the GEM allowance before the
  /// stake itself.
  pub async fn stake_clam(
    &self,
    sender: &str,
    clam_id: U256,
  ) -> Result<TxReceipt, SyncError> {
    let price = self.pearl_price().await?;
    let gem_balance = self
      .read_uint(
        ContractId::GemToken,
        "balanceOf",
        &[CallArg::Address(sender.to_string())],
      )
      .await?;

    if gem_balance < price {
      let needed = format_units(price, TokenSymbol::Gem.decimals());
      let message = format!("You need at least {needed} GEM to stake Clam");
      self
        .store
        .apply(StorePatch::Account(AccountPatch::with_error(message.clone())))
        .await;
      return Err(SyncError::provider(message));
    }

    info!(clam = %clam_id, "staking clam");
    self
      .pipeline
      .execute(
        sender,
        ContractId::PearlFarm,
        "stakeClam",
        &[CallArg::Uint(clam_id)],
        &[
          Approval::Erc721 {
            token: ContractId::ClamNft,
            operator: ContractId::PearlFarm,
          },
          Approval::Erc20 {
            token: ContractId::GemToken,
            spender: ContractId::PearlFarm,
            amount: price,
          },
        ],
      )
      .await
  }

  /// Re-stake a clam that already produced a pearl. Only the operator
  /// approval is required; the GEM fee was paid on the first stake.
  pub async fn stake_clam_again(
    &self,
    sender: &str,
    clam_id: U256,
  ) -> Result<TxReceipt, SyncError> {
    self
      .pipeline
      .execute(
        sender,
        ContractId::PearlFarm,
        "stakeClamAgain",
        &[CallArg::Uint(clam_id)],
        &[Approval::Erc721 {
          token: ContractId::ClamNft,
          operator: ContractId::PearlFarm,
        }],
      )
      .await
  }

  /// Withdraw a clam from the farm.
  pub async fn unstake_clam(
    &self,
    sender: &str,
    clam_id: U256,
  ) -> Result<TxReceipt, SyncError> {
    self
      .pipeline
      .execute(
        sender,
        ContractId::PearlFarm,
        "unstakeClam",
        &[CallArg::Uint(clam_id)],
        &[],
      )
      .await
  }

  /// Announce a GEM reclaim for a staked clam.
  pub async fn prepare_reclaiming(
    &self,
    sender: &str,
    clam_id: U256,
  ) -> Result<TxReceipt, SyncError> {
    self
      .pipeline
      .execute(
        sender,
        ContractId::PearlFarm,
        "prepareReclaiming",
        &[CallArg::Uint(clam_id)],
        &[],
      )
      .await
  }

  /// Reclaim the GEM fee from a staked clam.
  pub async fn reclaim_gems(
    &self,
    sender: &str,
    clam_id: U256,
  ) -> Result<TxReceipt, SyncError> {
    self
      .pipeline
      .execute(
        sender,
        ContractId::PearlFarm,
        "reclaimGems",
        &[CallArg::Uint(clam_id)],
        &[],
      )
      .await
  }

  /// Collect a produced pearl from a staked clam.
  pub async fn collect_pearl(
    &self,
    sender: &str,
    clam_id: U256,
  ) -> Result<TxReceipt, SyncError> {
    self
      .pipeline
      .execute(
        sender,
        ContractId::PearlFarm,
        "collectPearl",
        &[CallArg::Uint(clam_id)],
        &[],
      )
      .await
  }

  /// Open a staked clam for pearl production.
  pub async fn prop_clam_open_for_pearl(
    &self,
    sender: &str,
    clam_id: U256,
  ) -> Result<TxReceipt, SyncError> {
    self
      .pipeline
      .execute(
        sender,
        ContractId::PearlFarm,
        "propClamOpenForPearl",
        &[CallArg::Uint(clam_id)],
        &[],
      )
      .await
  }

  /// Trade a clam in for SHELL.
  pub async fn harvest_clam_for_shell(
    &self,
    sender: &str,
    clam_id: U256,
  ) -> Result<TxReceipt, SyncError> {
    info!(clam = %clam_id, "harvesting clam for SHELL");
    self
      .pipeline
      .execute(
        sender,
        ContractId::ClamNft,
        "harvestClamForShell",
        &[CallArg::Uint(clam_id)],
        &[],
      )
      .await
  }

  /// Seconds left before a staked clam produces its pearl.
  pub async fn remaining_pearl_production_time(
    &self,
    clam_id: U256,
  ) -> Result<U256, SyncError> {
    self
      .read_uint(
        ContractId::PearlFarm,
        "getRemainingPearlProductionTime",
        &[CallArg::Uint(clam_id)],
      )
      .await
  }

  /// Whether a staked clam's pearl is ready to collect.
  pub async fn is_pearl_production_time_yet(
    &self,
    clam_id: U256,
  ) -> Result<bool, SyncError> {
    self
      .gateway
      .read(
        ContractId::PearlFarm,
        "isPearlProductionTimeYet",
        &[CallArg::Uint(clam_id)],
      )
      .await?
      .as_bool()
      .ok_or_else(|| {
        SyncError::contract("isPearlProductionTimeYet", "unexpected return shape")
      })
  }

  /// Incubation period newly-farmed clams must sit out before harvest.
  pub async fn incubation_time(&self) -> Result<u64, SyncError> {
    let raw = self
      .read_uint(ContractId::ClamNft, "getClamIncubationTime", &[])
      .await?;
    u64::try_from(raw)
      .map_err(|_| SyncError::contract("getClamIncubationTime", "value out of range"))
  }

  /// SHELL value paid out per harvested clam.
  pub async fn clam_value_in_shell(&self) -> Result<U256, SyncError> {
    self
      .read_uint(ContractId::ClamNft, "getClamValueInShellToken", &[])
      .await
  }

  /// Filter the currently-owned clams down to the harvestable ones:
  /// alive, and past the incubation period.
  pub async fn harvestable_clams(&self) -> Result<Vec<ClamDescriptor>, SyncError> {
    let incubation = self.incubation_time().await?;
    let now = self.gateway.block_timestamp().await?;

    let clams = self.store.snapshot().account.clams;
    Ok(
      clams
        .into_iter()
        .filter(|clam| clam.is_harvestable(now, incubation))
        .collect(),
    )
  }

  /// Base GEM reward rate from the bonus calculator.
  pub async fn base_gem_rewards(&self) -> Result<U256, SyncError> {
    self
      .read_uint(ContractId::ClamBonus, "baseGemRewards", &[])
      .await
  }

  /// Bonus GEM rewards for one clam's decoded traits. The grading
  /// formula lives on the clam contract; only the legacy base rate
  /// stayed on the bonus contract.
  pub async fn calculate_bonus_rewards(
    &self,
    base_rewards: U256,
    traits: &TraitRecord,
  ) -> Result<U256, SyncError> {
    self
      .read_uint(
        ContractId::ClamNft,
        "calculateBonusRewards",
        &[
          CallArg::Uint(base_rewards),
          CallArg::Uint(U256::from(traits.size)),
          CallArg::Uint(U256::from(traits.lifespan)),
          CallArg::Uint(U256::from(traits.rarity_value)),
        ],
      )
      .await
  }

  /// Full bonus line item for one owned clam: the base rate plus the
  /// trait-graded bonus, formatted for display.
  pub async fn clam_bonus(&self, clam: &ClamDescriptor) -> Result<ClamBonus, SyncError> {
    let base = self.base_gem_rewards().await?;
    let bonus = self
      .calculate_bonus_rewards(base, &clam.dna_decoded)
      .await?;

    Ok(ClamBonus {
      clam_id: clam.token_id.clone(),
      clam_bonus: format_units(bonus, TokenSymbol::Gem.decimals()),
    })
  }

  async fn read_uint(
    &self,
    contract: ContractId,
    method: &str,
    args: &[CallArg],
  ) -> Result<U256, SyncError> {
    self
      .gateway
      .read(contract, method, args)
      .await?
      .as_uint()
      .ok_or_else(|| SyncError::contract(method, "unexpected return shape"))
  }
}
