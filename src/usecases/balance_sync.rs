//! Balance Sync - Token Balances to Decimal Strings
//!
//! Fetches the connected account's BNB, CLAM, PEARL, GEM and SHELL
//! balances and merges them into `account` as decimal strings. A
//! balance the gateway failed to return is simply absent from the
//! patch, so the previous good value stays in place - an "unknown"
//! placeholder is never merged over known state.

use std::sync::Arc;

use alloy::primitives::U256;
use tracing::warn;

use crate::domain::balance::TokenSymbol;
use crate::domain::patch::{AccountPatch, FieldPatch, StorePatch};
use crate::ports::SyncError;
use crate::ports::contract_gateway::{CallArg, ContractGateway, ContractId};
use crate::store::StoreHandle;

/// Fetches balances through the gateway and merges decimal strings.
pub struct BalanceSync<G: ContractGateway> {
  gateway: Arc<G>,
  store: StoreHandle,
}

impl<G: ContractGateway> BalanceSync<G> {
  pub fn new(gateway: Arc<G>, store: StoreHandle) -> Self {
    Self { gateway, store }
  }

  /// Sync all tracked balances for `address`.
  ///
  /// Merges whatever subset of balances resolved; the first failure
  /// (if any) is surfaced into `account.error`. A fully successful
  /// sync clears any stale error. Conversion is pure integer
  /// formatting, so an unchanged on-chain balance always produces a
  /// byte-identical string.
  pub async fn sync(&self, address: &str) {
    let mut patch = AccountPatch::default();
    let mut first_error: Option<SyncError> = None;

    match self.gateway.native_balance(address).await {
      Ok(raw) => patch.bnb_balance = Some(TokenSymbol::Bnb.format(raw)),
      Err(e) => {
        warn!(error = %e, "BNB balance fetch failed");
        first_error.get_or_insert(e);
      }
    }

    let lookups = [
      (ContractId::ClamNft, TokenSymbol::Clam),
      (ContractId::PearlNft, TokenSymbol::Pearl),
      (ContractId::GemToken, TokenSymbol::Gem),
      (ContractId::ShellToken, TokenSymbol::Shell),
    ];

    for (contract, symbol) in lookups {
      match self.token_balance(contract, address).await {
        Ok(raw) => {
          let formatted = Some(symbol.format(raw));
          match symbol {
            TokenSymbol::Clam => patch.clam_balance = formatted,
            TokenSymbol::Pearl => patch.pearl_balance = formatted,
            TokenSymbol::Gem => patch.gem_balance = formatted,
            TokenSymbol::Shell => patch.shell_balance = formatted,
            // BNB is native and handled above.
            TokenSymbol::Bnb => {}
          }
        }
        Err(e) => {
          warn!(token = %symbol, error = %e, "token balance fetch failed");
          first_error.get_or_insert(e);
        }
      }
    }

    patch.error = match first_error {
      Some(e) => FieldPatch::Set(e.to_string()),
      None => FieldPatch::Clear,
    };

    self.store.apply(StorePatch::Account(patch)).await;
  }

  async fn token_balance(
    &self,
    contract: ContractId,
    address: &str,
  ) -> Result<U256, SyncError> {
    self
      .gateway
      .read(
        contract,
        "balanceOf",
        &[CallArg::Address(address.to_string())],
      )
      .await?
      .as_uint()
      .ok_or_else(|| SyncError::contract("balanceOf", "unexpected return shape"))
  }
}
