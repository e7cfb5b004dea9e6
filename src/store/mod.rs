//! Account State Store - Single-Writer Actor
//!
//! The global document has exactly one writer: a spawned task that
//! owns the `AppState` and the scene-handle registry, applies patches
//! in arrival order, and publishes a whole-document snapshot after
//! every mutation. Readers only ever observe complete documents, which
//! preserves the no-partial-merge guarantee the single-threaded web
//! front end got for free from its event loop.
//!
//! Two effects racing on one sub-document land in resolution order:
//! last-resolved wins per overlapping key. That is deliberate and
//! relied upon - convergence comes from periodic polling, not from
//! ordering guarantees.

use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, warn};

use crate::domain::patch::{self, StorePatch, SubDoc};
use crate::domain::state::AppState;

/// Capability handle for a transient visual-scene object.
///
/// Handles are appended while a screen is live and bulk-destroyed when
/// it unmounts; `destroy` is invoked exactly once per handle.
pub trait SceneObject: Send + 'static {
  fn destroy(&mut self);
}

enum Command {
  Apply(StorePatch, oneshot::Sender<AppState>),
  AddSceneObject(Box<dyn SceneObject>, oneshot::Sender<AppState>),
  DestroySceneObjects(oneshot::Sender<AppState>),
}

/// Cloneable handle to the store actor.
///
/// The named operations here are the only mutation entry points in the
/// whole system; everything else reads snapshots.
#[derive(Clone)]
pub struct StoreHandle {
  commands: mpsc::Sender<Command>,
  snapshots: watch::Receiver<AppState>,
}

impl StoreHandle {
  /// Apply a patch and return the resulting whole document.
  pub async fn apply(&self, patch: StorePatch) -> AppState {
    let (reply_tx, reply_rx) = oneshot::channel();
    if self
      .commands
      .send(Command::Apply(patch, reply_tx))
      .await
      .is_err()
    {
      warn!("store actor gone, returning last snapshot");
      return self.snapshot();
    }
    reply_rx.await.unwrap_or_else(|_| self.snapshot())
  }

  /// Restore a sub-document to its initial default.
  pub async fn reset(&self, doc: SubDoc) -> AppState {
    self.apply(StorePatch::Reset(doc)).await
  }

  /// Append a scene handle to the bank screen's registry.
  pub async fn add_scene_object(&self, handle: Box<dyn SceneObject>) -> AppState {
    let (reply_tx, reply_rx) = oneshot::channel();
    if self
      .commands
      .send(Command::AddSceneObject(handle, reply_tx))
      .await
      .is_err()
    {
      warn!("store actor gone, scene handle dropped undestroyed");
      return self.snapshot();
    }
    reply_rx.await.unwrap_or_else(|_| self.snapshot())
  }

  /// Destroy every registered scene handle (exactly once each) and
  /// clear the registry.
  pub async fn destroy_scene_objects(&self) -> AppState {
    let (reply_tx, reply_rx) = oneshot::channel();
    if self
      .commands
      .send(Command::DestroySceneObjects(reply_tx))
      .await
      .is_err()
    {
      return self.snapshot();
    }
    reply_rx.await.unwrap_or_else(|_| self.snapshot())
  }

  /// Current whole-document snapshot.
  pub fn snapshot(&self) -> AppState {
    self.snapshots.borrow().clone()
  }

  /// Subscribe to snapshot updates (presentation layer re-renders).
  pub fn subscribe(&self) -> watch::Receiver<AppState> {
    self.snapshots.clone()
  }
}

/// Spawn the store actor with the default initial document.
pub fn spawn() -> StoreHandle {
  spawn_with(AppState::default())
}

/// Spawn the store actor with an explicit initial document.
pub fn spawn_with(initial: AppState) -> StoreHandle {
  let (command_tx, command_rx) = mpsc::channel(64);
  let (snapshot_tx, snapshot_rx) = watch::channel(initial.clone());

  tokio::spawn(run(initial, command_rx, snapshot_tx));

  StoreHandle {
    commands: command_tx,
    snapshots: snapshot_rx,
  }
}

async fn run(
  mut state: AppState,
  mut commands: mpsc::Receiver<Command>,
  snapshots: watch::Sender<AppState>,
) {
  let mut scene_objects: Vec<Box<dyn SceneObject>> = Vec::new();

  while let Some(command) = commands.recv().await {
    match command {
      Command::Apply(p, reply) => {
        patch::apply(&mut state, p);
        snapshots.send_replace(state.clone());
        let _ = reply.send(state.clone());
      }
      Command::AddSceneObject(handle, reply) => {
        scene_objects.push(handle);
        state.bank.scene_object_count = scene_objects.len();
        snapshots.send_replace(state.clone());
        let _ = reply.send(state.clone());
      }
      Command::DestroySceneObjects(reply) => {
        debug!(count = scene_objects.len(), "destroying scene handles");
        for handle in &mut scene_objects {
          handle.destroy();
        }
        scene_objects.clear();
        state.bank.scene_object_count = 0;
        snapshots.send_replace(state.clone());
        let _ = reply.send(state.clone());
      }
    }
  }

  // All handles dropped; release any still-live scene capabilities.
  for handle in &mut scene_objects {
    handle.destroy();
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;
  use std::sync::atomic::{AtomicUsize, Ordering};

  use super::*;
  use crate::domain::patch::{AccountPatch, StorePatch};

  struct CountingHandle(Arc<AtomicUsize>);

  impl SceneObject for CountingHandle {
    fn destroy(&mut self) {
      self.0.fetch_add(1, Ordering::SeqCst);
    }
  }

  #[tokio::test]
  async fn apply_returns_the_new_whole_document() {
    let store = spawn();
    let doc = store
      .apply(StorePatch::Account(AccountPatch {
        gem_balance: Some("1.5".into()),
        ..AccountPatch::default()
      }))
      .await;
    assert_eq!(doc.account.gem_balance, "1.5");
    assert_eq!(store.snapshot().account.gem_balance, "1.5");
  }

  #[tokio::test]
  async fn merges_are_serialized_in_arrival_order() {
    let store = spawn();
    for i in 0..100u64 {
      store
        .apply(StorePatch::Account(AccountPatch {
          chain_id: Some(i),
          ..AccountPatch::default()
        }))
        .await;
    }
    assert_eq!(store.snapshot().account.chain_id, 99);
  }

  #[tokio::test]
  async fn destroy_all_invokes_each_handle_once() {
    let store = spawn();
    let calls = Arc::new(AtomicUsize::new(0));

    for _ in 0..3 {
      store
        .add_scene_object(Box::new(CountingHandle(Arc::clone(&calls))))
        .await;
    }
    assert_eq!(store.snapshot().bank.scene_object_count, 3);

    let doc = store.destroy_scene_objects().await;
    assert_eq!(doc.bank.scene_object_count, 0);
    assert_eq!(calls.load(Ordering::SeqCst), 3);

    // Idempotent on an empty registry.
    store.destroy_scene_objects().await;
    assert_eq!(calls.load(Ordering::SeqCst), 3);
  }

  #[tokio::test]
  async fn subscribers_see_whole_documents() {
    let store = spawn();
    let mut rx = store.subscribe();

    store
      .apply(StorePatch::Account(AccountPatch {
        shell_balance: Some("2.0".into()),
        ..AccountPatch::default()
      }))
      .await;

    rx.changed().await.expect("snapshot channel open");
    let doc = rx.borrow().clone();
    assert_eq!(doc.account.shell_balance, "2.0");
    // Untouched siblings are still present and defaulted.
    assert_eq!(doc.account.gem_balance, "0");
  }
}
