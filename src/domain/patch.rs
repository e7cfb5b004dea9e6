//! Typed patches and the shallow-union merge laws.
//!
//! Each sub-document has a partial struct enumerating its legal
//! patchable fields; `StorePatch` is the tagged sum the store actor
//! accepts. Merging is shallow union only: fields absent from a patch
//! are preserved, fields present replace the stored value wholesale
//! (collections and nested structs included — no deep merge).

use serde::{Deserialize, Serialize};

use super::assets::{ClamDescriptor, PearlDescriptor};
use super::errtext;
use super::state::{
  AccountState, AppState, BankState, CharacterState, ClamClaimersState,
  CommunityRewardsState, DialogButton, PearlHuntState, PresaleState, PriceState, UiState,
};

/// Patch operation for a nullable field.
///
/// `Keep` leaves the stored value untouched, `Clear` nulls it, `Set`
/// replaces it. Plain non-nullable fields use `Option<T>` with `None`
/// meaning keep.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum FieldPatch<T> {
  /// Leave the stored value as-is.
  #[default]
  Keep,
  /// Null the stored value.
  Clear,
  /// Replace the stored value.
  Set(T),
}

impl<T> FieldPatch<T> {
  /// Apply this operation to a nullable slot.
  pub fn apply(self, slot: &mut Option<T>) {
    match self {
      Self::Keep => {}
      Self::Clear => *slot = None,
      Self::Set(v) => *slot = Some(v),
    }
  }
}

impl<T> From<T> for FieldPatch<T> {
  fn from(v: T) -> Self {
    Self::Set(v)
  }
}

/// Named sub-documents, used by reset operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubDoc {
  Account,
  Price,
  Ui,
  Presale,
  ClamClaimers,
  CommunityRewards,
  PearlHunt,
  Character,
  Bank,
}

/// Partial update for the `account` sub-document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountPatch {
  pub address: FieldPatch<String>,
  pub is_connected: Option<bool>,
  pub chain_id: Option<u64>,
  pub is_bs_chain: Option<bool>,
  pub bnb_balance: Option<String>,
  pub clam_balance: Option<String>,
  pub pearl_balance: Option<String>,
  pub gem_balance: Option<String>,
  pub shell_balance: Option<String>,
  pub clam_to_collect: FieldPatch<String>,
  /// Raw provider error string; the merge runs it through the
  /// best-effort message extractor before storing.
  pub error: FieldPatch<String>,
  pub clams: Option<Vec<ClamDescriptor>>,
  pub pearls: Option<Vec<PearlDescriptor>>,
}

impl AccountPatch {
  /// Patch surfacing a raw provider/contract error.
  pub fn with_error(raw: impl Into<String>) -> Self {
    Self {
      error: FieldPatch::Set(raw.into()),
      ..Self::default()
    }
  }
}

/// Partial update for the `price` sub-document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PricePatch {
  pub gem: Option<String>,
  pub shell: Option<String>,
}

/// Partial update for the `ui` sub-document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UiPatch {
  pub is_fetching: Option<bool>,
}

/// Partial update for the `presale` sub-document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PresalePatch {
  pub cap: Option<String>,
  pub clams_purchased: Option<String>,
  pub progress: FieldPatch<f64>,
  pub sale_price: Option<String>,
  pub is_started: FieldPatch<bool>,
  pub is_ended: Option<bool>,
  pub users_purchased_clam: Option<String>,
  pub rng: FieldPatch<String>,
  pub hash_request: FieldPatch<String>,
}

/// Partial update for the `clam_claimers` sub-document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClamClaimersPatch {
  pub individual_cap: Option<String>,
  pub is_clam_claimer: FieldPatch<bool>,
  pub users_claimed_clam: Option<String>,
  pub progress: FieldPatch<f64>,
  pub clams_claimed: Option<String>,
  pub rng: FieldPatch<String>,
  pub hash_request: FieldPatch<String>,
}

/// Partial update for the `community_rewards` sub-document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommunityRewardsPatch {
  pub is_awardee: FieldPatch<bool>,
  pub user_rewards: Option<String>,
  pub rng: FieldPatch<String>,
  pub hash_request: FieldPatch<String>,
}

/// Partial update for the `pearl_hunt` sub-document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PearlHuntPatch {
  pub account_pearl_count: Option<String>,
  pub last_winner: FieldPatch<String>,
}

/// Partial update for the `character` sub-document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CharacterPatch {
  pub name: Option<String>,
  pub action: Option<String>,
  pub show: Option<bool>,
  pub button: Option<DialogButton>,
  pub button_alt: Option<DialogButton>,
  pub suppress_bubble: Option<bool>,
  pub skip_dialogs: Option<bool>,
  pub force_top: Option<bool>,
}

/// Partial update for the `bank` sub-document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BankPatch {
  pub pools: Option<Vec<String>>,
  pub selected_pool: FieldPatch<String>,
}

/// Tagged union of every legal store mutation over plain data.
///
/// Scene-handle operations are store commands, not patches: the
/// handles carry destroy capabilities and never enter this type.
#[derive(Debug, Clone, PartialEq)]
pub enum StorePatch {
  Account(AccountPatch),
  Price(PricePatch),
  Ui(UiPatch),
  Presale(PresalePatch),
  ClamClaimers(ClamClaimersPatch),
  CommunityRewards(CommunityRewardsPatch),
  PearlHunt(PearlHuntPatch),
  Character(CharacterPatch),
  Bank(BankPatch),
  /// Verbatim write of `character.suppress_bubble`, bypassing the
  /// recompute rule. Mirrors the dedicated suppress action the
  /// dialogue layer uses to hide a bubble without touching buttons.
  SuppressBubble(bool),
  /// Restore a sub-document to its initial default.
  Reset(SubDoc),
}

/// Apply a patch to the document in place.
///
/// Total over well-typed input; performs no I/O.
pub fn apply(state: &mut AppState, patch: StorePatch) {
  match patch {
    StorePatch::Account(p) => apply_account(&mut state.account, p),
    StorePatch::Price(p) => apply_price(&mut state.price, p),
    StorePatch::Ui(p) => apply_ui(&mut state.ui, p),
    StorePatch::Presale(p) => apply_presale(&mut state.presale, p),
    StorePatch::ClamClaimers(p) => apply_clam_claimers(&mut state.clam_claimers, p),
    StorePatch::CommunityRewards(p) => {
      apply_community_rewards(&mut state.community_rewards, p);
    }
    StorePatch::PearlHunt(p) => apply_pearl_hunt(&mut state.pearl_hunt, p),
    StorePatch::Character(p) => apply_character(&mut state.character, p),
    StorePatch::Bank(p) => apply_bank(&mut state.bank, p),
    StorePatch::SuppressBubble(v) => state.character.suppress_bubble = v,
    StorePatch::Reset(doc) => reset(state, doc),
  }
}

/// Restore one sub-document to its default. The bank reset keeps the
/// live scene-handle count; destroying handles is a separate command.
pub fn reset(state: &mut AppState, doc: SubDoc) {
  match doc {
    SubDoc::Account => state.account = AccountState::default(),
    SubDoc::Price => state.price = PriceState::default(),
    SubDoc::Ui => state.ui = UiState::default(),
    SubDoc::Presale => state.presale = PresaleState::default(),
    SubDoc::ClamClaimers => state.clam_claimers = ClamClaimersState::default(),
    SubDoc::CommunityRewards => {
      state.community_rewards = CommunityRewardsState::default();
    }
    SubDoc::PearlHunt => state.pearl_hunt = PearlHuntState::default(),
    SubDoc::Character => state.character = CharacterState::default(),
    SubDoc::Bank => {
      let live = state.bank.scene_object_count;
      state.bank = BankState {
        scene_object_count: live,
        ..BankState::default()
      };
    }
  }
}

fn apply_account(state: &mut AccountState, patch: AccountPatch) {
  patch.address.apply(&mut state.address);
  if let Some(v) = patch.is_connected {
    state.is_connected = v;
  }
  if let Some(v) = patch.chain_id {
    state.chain_id = v;
  }
  if let Some(v) = patch.is_bs_chain {
    state.is_bs_chain = v;
  }
  if let Some(v) = patch.bnb_balance {
    state.bnb_balance = v;
  }
  if let Some(v) = patch.clam_balance {
    state.clam_balance = v;
  }
  if let Some(v) = patch.pearl_balance {
    state.pearl_balance = v;
  }
  if let Some(v) = patch.gem_balance {
    state.gem_balance = v;
  }
  if let Some(v) = patch.shell_balance {
    state.shell_balance = v;
  }
  patch.clam_to_collect.apply(&mut state.clam_to_collect);

  // Provider errors arrive as raw JSON-ish strings; store the
  // embedded message when one can be extracted, the raw string
  // otherwise.
  match patch.error {
    FieldPatch::Keep => {}
    FieldPatch::Clear => state.error = None,
    FieldPatch::Set(raw) => state.error = Some(errtext::humanize(&raw)),
  }

  if let Some(v) = patch.clams {
    state.clams = v;
  }
  if let Some(v) = patch.pearls {
    state.pearls = v;
  }
}

fn apply_price(state: &mut PriceState, patch: PricePatch) {
  if let Some(v) = patch.gem {
    state.gem = v;
  }
  if let Some(v) = patch.shell {
    state.shell = v;
  }
}

fn apply_ui(state: &mut UiState, patch: UiPatch) {
  if let Some(v) = patch.is_fetching {
    state.is_fetching = v;
  }
}

fn apply_presale(state: &mut PresaleState, patch: PresalePatch) {
  if let Some(v) = patch.cap {
    state.cap = v;
  }
  if let Some(v) = patch.clams_purchased {
    state.clams_purchased = v;
  }
  patch.progress.apply(&mut state.progress);
  if let Some(v) = patch.sale_price {
    state.sale_price = v;
  }
  patch.is_started.apply(&mut state.is_started);
  if let Some(v) = patch.is_ended {
    state.is_ended = v;
  }
  if let Some(v) = patch.users_purchased_clam {
    state.users_purchased_clam = v;
  }
  patch.rng.apply(&mut state.rng);
  patch.hash_request.apply(&mut state.hash_request);
}

fn apply_clam_claimers(state: &mut ClamClaimersState, patch: ClamClaimersPatch) {
  if let Some(v) = patch.individual_cap {
    state.individual_cap = v;
  }
  patch.is_clam_claimer.apply(&mut state.is_clam_claimer);
  if let Some(v) = patch.users_claimed_clam {
    state.users_claimed_clam = v;
  }
  patch.progress.apply(&mut state.progress);
  if let Some(v) = patch.clams_claimed {
    state.clams_claimed = v;
  }
  patch.rng.apply(&mut state.rng);
  patch.hash_request.apply(&mut state.hash_request);
}

fn apply_community_rewards(state: &mut CommunityRewardsState, patch: CommunityRewardsPatch) {
  patch.is_awardee.apply(&mut state.is_awardee);
  if let Some(v) = patch.user_rewards {
    state.user_rewards = v;
  }
  patch.rng.apply(&mut state.rng);
  patch.hash_request.apply(&mut state.hash_request);
}

fn apply_pearl_hunt(state: &mut PearlHuntState, patch: PearlHuntPatch) {
  if let Some(v) = patch.account_pearl_count {
    state.account_pearl_count = v;
  }
  patch.last_winner.apply(&mut state.last_winner);
}

fn apply_character(state: &mut CharacterState, patch: CharacterPatch) {
  if let Some(v) = patch.name {
    state.name = Some(v);
  }
  if let Some(v) = patch.action {
    state.action = Some(v);
  }
  if let Some(v) = patch.show {
    state.show = Some(v);
  }
  if let Some(v) = patch.button {
    state.button = v;
  }

  // Unless the patch is an explicit skip-dialogs toggle, the
  // secondary button is force-replaced (supplied value or empty) so
  // stale button state from a previous screen never leaks forward.
  if patch.skip_dialogs.is_some() {
    if let Some(v) = patch.button_alt {
      state.button_alt = v;
    }
  } else {
    state.button_alt = patch.button_alt.unwrap_or_default();
  }

  if let Some(v) = patch.skip_dialogs {
    state.skip_dialogs = v;
  }
  if let Some(v) = patch.force_top {
    state.force_top = v;
  }

  // Recomputed from the incoming patch alone, never carried over.
  state.suppress_bubble =
    patch.suppress_bubble.unwrap_or(false) || patch.skip_dialogs.unwrap_or(false);
}

fn apply_bank(state: &mut BankState, patch: BankPatch) {
  if let Some(v) = patch.pools {
    state.pools = v;
  }
  patch.selected_pool.apply(&mut state.selected_pool);
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn shallow_union_preserves_absent_keys() {
    let mut state = AppState::default();
    state.account.gem_balance = "1".into();
    state.account.shell_balance = "2".into();

    apply(
      &mut state,
      StorePatch::Account(AccountPatch {
        shell_balance: Some("3".into()),
        ..AccountPatch::default()
      }),
    );

    assert_eq!(state.account.gem_balance, "1");
    assert_eq!(state.account.shell_balance, "3");
  }

  #[test]
  fn collections_replace_wholesale() {
    let mut state = AppState::default();
    state.bank.pools = vec!["gem-bnb".into(), "shell-gem".into()];

    apply(
      &mut state,
      StorePatch::Bank(BankPatch {
        pools: Some(vec!["gem-bnb".into()]),
        ..BankPatch::default()
      }),
    );

    assert_eq!(state.bank.pools, vec!["gem-bnb".to_string()]);
  }

  #[test]
  fn account_error_is_humanized() {
    let mut state = AppState::default();
    apply(
      &mut state,
      StorePatch::Account(AccountPatch::with_error(
        r#"execution reverted: {"message": "insufficient funds"}"#,
      )),
    );
    assert_eq!(state.account.error.as_deref(), Some("insufficient funds"));

    apply(
      &mut state,
      StorePatch::Account(AccountPatch::with_error("connection timed out")),
    );
    assert_eq!(state.account.error.as_deref(), Some("connection timed out"));
  }

  #[test]
  fn account_error_clears() {
    let mut state = AppState::default();
    state.account.error = Some("boom".into());
    apply(
      &mut state,
      StorePatch::Account(AccountPatch {
        error: FieldPatch::Clear,
        ..AccountPatch::default()
      }),
    );
    assert_eq!(state.account.error, None);
  }

  #[test]
  fn character_patch_without_skip_forces_empty_button_alt() {
    let mut state = AppState::default();
    state.character.button_alt = DialogButton {
      text: Some("Back".into()),
      alt: None,
      dismiss: Some(true),
    };

    apply(
      &mut state,
      StorePatch::Character(CharacterPatch {
        action: Some("saferoom.connect.text".into()),
        ..CharacterPatch::default()
      }),
    );

    assert_eq!(state.character.button_alt, DialogButton::default());
    assert_eq!(
      state.character.action.as_deref(),
      Some("saferoom.connect.text")
    );
  }

  #[test]
  fn skip_dialogs_forces_suppression() {
    let mut state = AppState::default();
    state.character.suppress_bubble = false;

    apply(
      &mut state,
      StorePatch::Character(CharacterPatch {
        skip_dialogs: Some(true),
        ..CharacterPatch::default()
      }),
    );

    assert!(state.character.suppress_bubble);
    assert!(state.character.skip_dialogs);
  }

  #[test]
  fn suppress_bubble_is_never_carried_forward() {
    let mut state = AppState::default();
    state.character.suppress_bubble = true;

    apply(
      &mut state,
      StorePatch::Character(CharacterPatch {
        action: Some("bank.connect".into()),
        ..CharacterPatch::default()
      }),
    );

    assert!(!state.character.suppress_bubble);
  }

  #[test]
  fn verbatim_suppress_bypasses_recompute() {
    let mut state = AppState::default();
    apply(&mut state, StorePatch::SuppressBubble(true));
    assert!(state.character.suppress_bubble);
  }

  #[test]
  fn reset_restores_defaults() {
    let mut state = AppState::default();
    state.account.address = Some("0xdead".into());
    state.account.gem_balance = "7.5".into();

    apply(&mut state, StorePatch::Reset(SubDoc::Account));

    assert_eq!(state.account, AccountState::default());
  }
}
