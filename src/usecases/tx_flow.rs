//! Transaction Pipeline - Approve, Estimate, Send
//!
//! Three-stage flow for every state-mutating contract interaction:
//! (a) ensure spending approvals are in place, skipping ones already
//! granted, (b) estimate gas for the target method, (c) submit with
//! the estimated gas. The first rejection aborts the remaining stages
//! and surfaces its message into `account.error`. Already-confirmed
//! stages (granted allowances) stay as they are - chain state is not
//! revocable from this layer, so no compensating rollback exists.

use std::sync::Arc;

use alloy::primitives::U256;
use tracing::{debug, info, warn};

use crate::domain::patch::{AccountPatch, FieldPatch, StorePatch};
use crate::ports::SyncError;
use crate::ports::contract_gateway::{CallArg, ContractGateway, ContractId, TxReceipt};
use crate::store::StoreHandle;

/// A spending approval the target method requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Approval {
  /// ERC-20 allowance of at least `amount` for `spender`.
  ///
  /// Granted approvals use max uint256 so the check only trips once
  /// per token/spender pair.
  Erc20 {
    token: ContractId,
    spender: ContractId,
    amount: U256,
  },
  /// ERC-721 operator approval for `operator` over the sender's
  /// tokens.
  Erc721 {
    token: ContractId,
    operator: ContractId,
  },
}

/// Runs the approve -> estimate -> send sequence against the gateway.
pub struct TxPipeline<G: ContractGateway> {
  gateway: Arc<G>,
  store: StoreHandle,
}

impl<G: ContractGateway> TxPipeline<G> {
  pub fn new(gateway: Arc<G>, store: StoreHandle) -> Self {
    Self { gateway, store }
  }

  /// Execute a state-mutating call with its approval prerequisites.
  ///
  /// On success the stale `account.error` (if any) is cleared; on any
  /// stage failure the extracted message lands in `account.error` and
  /// the error is returned to the caller for flow control.
  pub async fn execute(
    &self,
    sender: &str,
    contract: ContractId,
    method: &str,
    args: &[CallArg],
    approvals: &[Approval],
  ) -> Result<TxReceipt, SyncError> {
    match self.run_stages(sender, contract, method, args, approvals).await {
      Ok(receipt) => {
        info!(%contract, method, tx = %receipt.tx_hash, "transaction confirmed");
        self
          .store
          .apply(StorePatch::Account(AccountPatch {
            error: FieldPatch::Clear,
            ..AccountPatch::default()
          }))
          .await;
        Ok(receipt)
      }
      Err(e) => {
        warn!(%contract, method, error = %e, "transaction flow aborted");
        self
          .store
          .apply(StorePatch::Account(AccountPatch::with_error(e.to_string())))
          .await;
        Err(e)
      }
    }
  }

  async fn run_stages(
    &self,
    sender: &str,
    contract: ContractId,
    method: &str,
    args: &[CallArg],
    approvals: &[Approval],
  ) -> Result<TxReceipt, SyncError> {
    for approval in approvals {
      self.ensure_approval(sender, approval).await?;
    }

    let gas = self
      .gateway
      .estimate_gas(contract, method, args, sender)
      .await?;
    debug!(%contract, method, gas, "gas estimated");

    self.gateway.send(contract, method, args, sender, gas).await
  }

  /// Grant one approval unless it is already in place (idempotent).
  async fn ensure_approval(
    &self,
    sender: &str,
    approval: &Approval,
  ) -> Result<(), SyncError> {
    match approval {
      Approval::Erc20 {
        token,
        spender,
        amount,
      } => {
        let spender_addr = self.gateway.contract_address(*spender);
        let current = self
          .gateway
          .read(
            *token,
            "allowance",
            &[
              CallArg::Address(sender.to_string()),
              CallArg::Address(spender_addr.clone()),
            ],
          )
          .await?
          .as_uint()
          .ok_or_else(|| SyncError::contract("allowance", "unexpected return shape"))?;

        if current >= *amount {
          debug!(token = %token, spender = %spender, "allowance sufficient");
          return Ok(());
        }

        info!(token = %token, spender = %spender, "submitting max approval");
        let approve_args = [
          CallArg::Address(spender_addr),
          CallArg::Uint(U256::MAX),
        ];
        let gas = self
          .gateway
          .estimate_gas(*token, "approve", &approve_args, sender)
          .await?;
        self
          .gateway
          .send(*token, "approve", &approve_args, sender, gas)
          .await?;
        Ok(())
      }
      Approval::Erc721 { token, operator } => {
        let operator_addr = self.gateway.contract_address(*operator);
        let approved = self
          .gateway
          .read(
            *token,
            "isApprovedForAll",
            &[
              CallArg::Address(sender.to_string()),
              CallArg::Address(operator_addr.clone()),
            ],
          )
          .await?
          .as_bool()
          .ok_or_else(|| {
            SyncError::contract("isApprovedForAll", "unexpected return shape")
          })?;

        if approved {
          debug!(token = %token, operator = %operator, "operator already approved");
          return Ok(());
        }

        info!(token = %token, operator = %operator, "submitting operator approval");
        let approve_args = [CallArg::Address(operator_addr), CallArg::Bool(true)];
        let gas = self
          .gateway
          .estimate_gas(*token, "setApprovalForAll", &approve_args, sender)
          .await?;
        self
          .gateway
          .send(*token, "setApprovalForAll", &approve_args, sender, gas)
          .await?;
        Ok(())
      }
    }
  }
}
