//! Merge and Formatting Benchmarks — Hot-Path Performance Validation
//!
//! Benchmarks the pure functions that run on every store mutation and
//! balance refresh.
//!
//! Run with: cargo bench --bench merge_bench

use alloy::primitives::U256;
use criterion::{Criterion, black_box, criterion_group, criterion_main};

use clam_island_sync::domain::balance::format_units;
use clam_island_sync::domain::errtext::extract_message;
use clam_island_sync::domain::patch::{self, AccountPatch, CharacterPatch, StorePatch};
use clam_island_sync::domain::state::AppState;

/// Benchmark a typical balance-refresh merge into the account.
fn bench_account_merge(c: &mut Criterion) {
  let patch_value = AccountPatch {
    bnb_balance: Some("1.0".to_string()),
    gem_balance: Some("12.5".to_string()),
    shell_balance: Some("0.25".to_string()),
    clam_balance: Some("3".to_string()),
    ..AccountPatch::default()
  };

  c.bench_function("account_balance_merge", |b| {
    let mut state = AppState::default();
    b.iter(|| {
      patch::apply(
        &mut state,
        StorePatch::Account(black_box(patch_value.clone())),
      );
    });
  });
}

/// Benchmark the character merge with its button/suppression rules.
fn bench_character_merge(c: &mut Criterion) {
  let patch_value = CharacterPatch {
    name: Some("tanja".to_string()),
    action: Some("bank.connect.text".to_string()),
    show: Some(true),
    ..CharacterPatch::default()
  };

  c.bench_function("character_merge", |b| {
    let mut state = AppState::default();
    b.iter(|| {
      patch::apply(
        &mut state,
        StorePatch::Character(black_box(patch_value.clone())),
      );
    });
  });
}

/// Benchmark wei-to-decimal-string formatting for an 18-decimal token.
fn bench_format_units(c: &mut Criterion) {
  let raw = U256::from(1_234_567_890_123_456_789u128);

  c.bench_function("format_units_18", |b| {
    b.iter(|| {
      let _s = format_units(black_box(raw), black_box(18));
    });
  });
}

/// Benchmark the provider error message extractor.
fn bench_extract_message(c: &mut Criterion) {
  let raw = r#"Internal JSON-RPC error. {"code": -32603, "message": "execution reverted: Clam is not harvestable", "data": "0x"}"#;

  c.bench_function("extract_message", |b| {
    b.iter(|| {
      let _m = extract_message(black_box(raw));
    });
  });
}

criterion_group!(
  benches,
  bench_account_merge,
  bench_character_merge,
  bench_format_units,
  bench_extract_message,
);
criterion_main!(benches);
