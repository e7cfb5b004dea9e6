//! Property-Based Tests — Domain Layer Invariants
//!
//! Uses `proptest` to verify the merge laws, balance formatting, and
//! the error-message extractor across random inputs.

use alloy::primitives::U256;
use proptest::prelude::*;

use clam_island_sync::domain::balance::format_units;
use clam_island_sync::domain::errtext::{extract_message, humanize};
use clam_island_sync::domain::patch::{self, AccountPatch, StorePatch};
use clam_island_sync::domain::state::AppState;

// ── Merge Laws ──────────────────────────────────────────────

proptest! {
  /// An empty patch is an identity: the document is untouched.
  #[test]
  fn empty_account_patch_is_identity(
    gem in "[0-9]{1,12}",
    shell in "[0-9]{1,12}",
    chain_id in 1u64..100_000,
  ) {
    let mut state = AppState::default();
    state.account.gem_balance = gem;
    state.account.shell_balance = shell;
    state.account.chain_id = chain_id;

    let before = state.clone();
    patch::apply(&mut state, StorePatch::Account(AccountPatch::default()));

    prop_assert_eq!(state, before);
  }

  /// A field present in the patch lands verbatim, every absent field
  /// is preserved.
  #[test]
  fn present_field_replaces_absent_preserved(
    old_gem in "[0-9]{1,12}",
    old_shell in "[0-9]{1,12}",
    new_shell in "[0-9]{1,12}",
  ) {
    let mut state = AppState::default();
    state.account.gem_balance = old_gem.clone();
    state.account.shell_balance = old_shell;

    patch::apply(
      &mut state,
      StorePatch::Account(AccountPatch {
        shell_balance: Some(new_shell.clone()),
        ..AccountPatch::default()
      }),
    );

    prop_assert_eq!(state.account.shell_balance, new_shell);
    prop_assert_eq!(state.account.gem_balance, old_gem);
  }

  /// Applying the same patch twice leaves the same document as
  /// applying it once.
  #[test]
  fn account_patch_is_idempotent(
    balance in "[0-9]{1,12}",
    connected in any::<bool>(),
  ) {
    let patch_value = AccountPatch {
      gem_balance: Some(balance),
      is_connected: Some(connected),
      ..AccountPatch::default()
    };

    let mut once = AppState::default();
    patch::apply(&mut once, StorePatch::Account(patch_value.clone()));

    let mut twice = once.clone();
    patch::apply(&mut twice, StorePatch::Account(patch_value));

    prop_assert_eq!(once, twice);
  }
}

// ── Balance Formatting ──────────────────────────────────────

proptest! {
  /// Zero-decimal tokens format as the plain integer.
  #[test]
  fn zero_decimals_is_plain_integer(raw in any::<u64>()) {
    let formatted = format_units(U256::from(raw), 0);
    prop_assert_eq!(formatted, raw.to_string());
  }

  /// Formatting is a pure function: the same raw value always yields
  /// a byte-identical string.
  #[test]
  fn formatting_is_deterministic(raw in any::<u128>(), decimals in 0u32..30) {
    let a = format_units(U256::from(raw), decimals);
    let b = format_units(U256::from(raw), decimals);
    prop_assert_eq!(a, b);
  }

  /// 18-decimal output always carries exactly one dot and a
  /// non-empty fractional part with no trailing zeros (except the
  /// canonical "x.0").
  #[test]
  fn formatted_fraction_is_canonical(raw in any::<u128>()) {
    let formatted = format_units(U256::from(raw), 18);
    let (whole, frac) = formatted
      .split_once('.')
      .expect("18-decimal output always has a fraction");

    prop_assert!(!whole.is_empty());
    prop_assert!(!frac.is_empty());
    prop_assert!(frac == "0" || !frac.ends_with('0'), "non-canonical: {formatted}");
  }

  /// Whole-token multiples format as "<n>.0".
  #[test]
  fn whole_tokens_format_with_point_zero(tokens in 0u64..1_000_000) {
    let raw = U256::from(tokens) * U256::from(10u64).pow(U256::from(18u64));
    prop_assert_eq!(format_units(raw, 18), format!("{tokens}.0"));
  }
}

// ── Error Message Extraction ────────────────────────────────

proptest! {
  /// The extractor is total: any input yields either a message or
  /// nothing, never a panic.
  #[test]
  fn extractor_never_panics(raw in ".*") {
    let _ = extract_message(&raw);
  }

  /// `humanize` always produces non-empty output for non-empty
  /// input: the extracted message or the raw string itself.
  #[test]
  fn humanize_falls_back_to_raw(raw in ".+") {
    let out = humanize(&raw);
    prop_assert!(!out.is_empty());
  }

  /// A well-formed message key is always recovered.
  #[test]
  fn well_formed_message_is_extracted(msg in "[a-zA-Z ]{1,40}") {
    let raw = format!(r#"{{"code": -32000, "message": "{msg}"}}"#);
    let extracted = extract_message(&raw);
    prop_assert_eq!(extracted.as_deref(), Some(msg.as_str()));
  }
}
