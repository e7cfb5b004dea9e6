//! Store Flow Scenarios - Simulated Game Sessions
//!
//! Drives the store actor through the merge sequences a real play
//! session produces: connect, dialogue screens, bank scene lifecycle,
//! a wrong-chain interlude, and disconnect. Validates the document
//! invariants hold across the whole sequence, not just per patch.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use clam_island_sync::domain::patch::{
  AccountPatch, BankPatch, CharacterPatch, FieldPatch, StorePatch, SubDoc,
};
use clam_island_sync::domain::state::{AccountState, DialogButton};
use clam_island_sync::store::{self, SceneObject};

struct TrackedHandle(Arc<AtomicUsize>);

impl SceneObject for TrackedHandle {
  fn destroy(&mut self) {
    self.0.fetch_add(1, Ordering::SeqCst);
  }
}

fn connect_patch(address: &str, chain_id: u64) -> StorePatch {
  StorePatch::Account(AccountPatch {
    address: FieldPatch::Set(address.to_string()),
    is_connected: Some(true),
    chain_id: Some(chain_id),
    is_bs_chain: Some(chain_id == 56),
    error: FieldPatch::Clear,
    ..AccountPatch::default()
  })
}

#[tokio::test]
async fn full_session_sequence_holds_invariants() {
  let store = store::spawn();
  let destroyed = Arc::new(AtomicUsize::new(0));

  // Player connects on BSC.
  let doc = store
    .apply(connect_patch("0xabcdef0123456789", 56))
    .await;
  assert!(doc.account.is_connected);
  assert!(doc.account.is_bs_chain);

  // A balance refresh lands; connection fields are untouched.
  let doc = store
    .apply(StorePatch::Account(AccountPatch {
      bnb_balance: Some("2.5".to_string()),
      gem_balance: Some("150.0".to_string()),
      error: FieldPatch::Clear,
      ..AccountPatch::default()
    }))
    .await;
  assert!(doc.account.is_connected);
  assert_eq!(doc.account.bnb_balance, "2.5");
  assert_eq!(doc.account.address.as_deref(), Some("0xabcdef0123456789"));

  // Bank screen mounts: dialogue + three scene objects.
  store
    .apply(StorePatch::Character(CharacterPatch {
      name: Some("tanja".to_string()),
      action: Some("bank.welcome".to_string()),
      show: Some(true),
      button: Some(DialogButton {
        text: Some("Let's go".to_string()),
        alt: None,
        dismiss: Some(true),
      }),
      ..CharacterPatch::default()
    }))
    .await;
  for _ in 0..3 {
    store
      .add_scene_object(Box::new(TrackedHandle(Arc::clone(&destroyed))))
      .await;
  }
  store
    .apply(StorePatch::Bank(BankPatch {
      pools: Some(vec!["gem-bnb".to_string(), "shell-gem".to_string()]),
      selected_pool: FieldPatch::Set("gem-bnb".to_string()),
    }))
    .await;
  assert_eq!(store.snapshot().bank.scene_object_count, 3);

  // A later dialogue without button_alt clears the stale secondary
  // button and recomputes suppression from scratch.
  let doc = store
    .apply(StorePatch::Character(CharacterPatch {
      action: Some("bank.deposit.confirm".to_string()),
      ..CharacterPatch::default()
    }))
    .await;
  assert_eq!(doc.character.button_alt, DialogButton::default());
  assert!(!doc.character.suppress_bubble);

  // Wrong-chain interlude: identity updates, balances survive.
  let doc = store
    .apply(StorePatch::Account(AccountPatch {
      chain_id: Some(1),
      is_bs_chain: Some(false),
      ..AccountPatch::default()
    }))
    .await;
  assert!(!doc.account.is_bs_chain);
  assert_eq!(doc.account.gem_balance, "150.0");

  // Screen unmounts: every handle destroyed exactly once, bank
  // document back to defaults.
  store.destroy_scene_objects().await;
  let doc = store.reset(SubDoc::Bank).await;
  assert_eq!(destroyed.load(Ordering::SeqCst), 3);
  assert_eq!(doc.bank.scene_object_count, 0);
  assert!(doc.bank.pools.is_empty());

  // Disconnect resets the whole account sub-document.
  let doc = store.reset(SubDoc::Account).await;
  assert_eq!(doc.account, AccountState::default());
  // Character state is a separate sub-document and survives.
  assert_eq!(doc.character.name.as_deref(), Some("tanja"));
}

#[tokio::test]
async fn racing_writers_never_expose_partial_documents() {
  let store = store::spawn();
  store.apply(connect_patch("0xabc", 56)).await;

  let mut rx = store.subscribe();

  // Two effects race on the account sub-document with disjoint
  // fields; a third hammers the character document.
  let balance_store = store.clone();
  let balance_task = tokio::spawn(async move {
    for i in 0..50u64 {
      balance_store
        .apply(StorePatch::Account(AccountPatch {
          gem_balance: Some(format!("{i}.0")),
          ..AccountPatch::default()
        }))
        .await;
    }
  });

  let asset_store = store.clone();
  let asset_task = tokio::spawn(async move {
    for _ in 0..50 {
      asset_store
        .apply(StorePatch::Account(AccountPatch {
          clams: Some(Vec::new()),
          error: FieldPatch::Clear,
          ..AccountPatch::default()
        }))
        .await;
    }
  });

  let dialogue_store = store.clone();
  let dialogue_task = tokio::spawn(async move {
    for i in 0..50 {
      dialogue_store
        .apply(StorePatch::Character(CharacterPatch {
          action: Some(format!("scene.{i}")),
          ..CharacterPatch::default()
        }))
        .await;
    }
  });

  balance_task.await.expect("balance task");
  asset_task.await.expect("asset task");
  dialogue_task.await.expect("dialogue task");

  // However the writes interleaved, no observed document ever lost
  // the connection identity written before the race started.
  while rx.has_changed().unwrap_or(false) {
    let doc = rx.borrow_and_update().clone();
    assert_eq!(doc.account.address.as_deref(), Some("0xabc"));
    assert!(doc.account.is_connected);
  }

  let doc = store.snapshot();
  assert_eq!(doc.account.gem_balance, "49.0");
  assert_eq!(doc.character.action.as_deref(), Some("scene.49"));
}
