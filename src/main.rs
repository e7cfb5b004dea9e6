//! Clam Island Sync — Entry Point
//!
//! Initializes configuration, logging, the BSC connection, and the
//! state store actor. Runs until SIGINT.
//!
//! Wiring sequence:
//! 1. Load config.toml + validate
//! 2. Init tracing (JSON structured logging)
//! 3. Connect BSC provider + validate contract deployments
//! 4. Create EvmGateway (ContractGateway port)
//! 5. Create DNA decoder, image cache, wallet provider
//! 6. Spawn the state store actor
//! 7. Create session/balance/asset/farming use-cases
//! 8. Spawn wallet chain watcher + chain event follower
//! 9. Connect the session and run the sync loop
//! 10. Wait for SIGINT → graceful shutdown (destroy scene handles → exit)

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

mod adapters;
mod config;
mod domain;
mod ports;
mod store;
mod usecases;

use adapters::cache::MemoryImageCache;
use adapters::chain::{BscProvider, ContractAddresses, EvmGateway};
use adapters::dna::OnChainDnaDecoder;
use adapters::wallet::RpcWalletProvider;
use usecases::{AssetSync, BalanceSync, Farming, SessionManager, SessionPhase};

#[tokio::main]
async fn main() -> Result<()> {
  // ── 1. Load configuration from config.toml ──────────────
  let config = config::loader::load_config("config.toml")
    .context("Failed to load configuration")?;

  // ── 2. Initialize structured JSON logging ───────────────
  tracing_subscriber::fmt()
    .with_env_filter(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| {
          tracing_subscriber::EnvFilter::new(&config.app.log_level)
        }),
    )
    .json()
    .init();

  info!(
    name = %config.app.name,
    version = env!("CARGO_PKG_VERSION"),
    chain_id = config.chain.required_chain_id,
    "Starting Clam Island sync"
  );

  // ── 3. Shutdown signal channel ──────────────────────────
  let (shutdown_tx, _shutdown_rx) = broadcast::channel::<()>(1);

  // ── 4. Connect BSC provider + validate deployments ──────
  let provider = Arc::new(
    BscProvider::connect(&config.chain)
      .await
      .context("Failed to connect BSC provider")?,
  );

  let addresses = ContractAddresses::from_config(&config.contracts)
    .context("Invalid contract addresses in config")?;
  addresses
    .validate_on_chain(&provider)
    .await
    .context("Contract deployment validation failed")?;

  // ── 5. Gateway, decoder, image cache, wallet ────────────
  let gateway = Arc::new(EvmGateway::new(
    Arc::clone(&provider),
    addresses,
    Duration::from_secs(config.chain.timeout_seconds),
  ));
  let decoder = Arc::new(OnChainDnaDecoder::new(Arc::clone(&gateway)));
  let images = Arc::new(MemoryImageCache::new());

  let wallet = Arc::new(
    RpcWalletProvider::new(
      Arc::clone(&provider),
      provider.chain_id(),
      Duration::from_secs(config.sync.chain_poll_interval_secs),
    )
    .context("Failed to create wallet provider")?,
  );

  // ── 6. Spawn the state store actor ──────────────────────
  let store = store::spawn();
  if config.ui.skip_dialogs {
    store
      .apply(domain::patch::StorePatch::Character(
        domain::patch::CharacterPatch {
          skip_dialogs: Some(true),
          ..Default::default()
        },
      ))
      .await;
  }

  // ── 7. Wire the use-cases ───────────────────────────────
  let session = Arc::new(SessionManager::new(
    Arc::clone(&wallet),
    store.clone(),
    config.chain.required_chain_id,
  ));
  let balances = Arc::new(BalanceSync::new(Arc::clone(&gateway), store.clone()));
  let assets = Arc::new(AssetSync::new(
    Arc::clone(&gateway),
    Arc::clone(&decoder),
    Arc::clone(&images),
    store.clone(),
    config.ui.placeholder_image.as_str().into(),
  ));
  let farming = Arc::new(Farming::new(Arc::clone(&gateway), store.clone()));

  // ── 8. Spawn wallet chain watcher + event follower ──────
  let watcher_shutdown = shutdown_tx.subscribe();
  let watcher_wallet = Arc::clone(&wallet);
  let watcher_handle = tokio::spawn(async move {
    watcher_wallet.run(watcher_shutdown).await;
  });

  let events_session = Arc::clone(&session);
  let events_handle = tokio::spawn(async move {
    events_session.watch_chain_events().await;
  });

  // ── 9. Connect the session and run the sync loop ────────
  let loop_shutdown = shutdown_tx.subscribe();
  let loop_session = Arc::clone(&session);
  let loop_store = store.clone();
  let sync_handle = tokio::spawn(async move {
    if let Err(e) = run_sync(
      config,
      loop_store,
      loop_session,
      balances,
      assets,
      farming,
      loop_shutdown,
    )
    .await
    {
      error!(error = %e, "Sync loop failed");
    }
  });

  info!("All tasks spawned — sync is running");

  // ── 10. Wait for SIGINT ─────────────────────────────────
  tokio::select! {
    _ = signal::ctrl_c() => {
      info!("SIGINT received, initiating graceful shutdown");
    }
  }

  // Graceful shutdown: stop tasks, tear down scene handles, exit.
  let _ = shutdown_tx.send(());
  info!("Shutdown signal broadcast to all tasks");

  let state = store.destroy_scene_objects().await;
  info!(
    remaining = state.bank.scene_object_count,
    "Scene handles destroyed"
  );
  if let Ok(doc) = serde_json::to_string(&state) {
    tracing::debug!(%doc, "Final document at shutdown");
  }

  let _ = tokio::time::timeout(Duration::from_secs(10), sync_handle).await;
  let _ = tokio::time::timeout(Duration::from_secs(5), watcher_handle).await;
  events_handle.abort();

  info!("Shutdown complete");
  Ok(())
}

/// Run the periodic sync loop until shutdown.
///
/// Connects the session first, then alternates balance and asset
/// refreshes on their configured intervals. Both are suppressed while
/// the session is disconnected or on the wrong chain; the chain
/// identity itself keeps refreshing so recovery is automatic.
async fn run_sync(
  config: config::AppConfig,
  store: store::StoreHandle,
  session: Arc<SessionManager<RpcWalletProvider>>,
  balances: Arc<BalanceSync<EvmGateway>>,
  assets: Arc<AssetSync<EvmGateway, OnChainDnaDecoder<EvmGateway>, MemoryImageCache>>,
  farming: Arc<Farming<EvmGateway>>,
  mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<()> {
  match session.connect().await {
    SessionPhase::Connected { wrong_chain: false } => {
      info!("Session connected on the required chain");
    }
    SessionPhase::Connected { wrong_chain: true } => {
      warn!(
        required = config.chain.required_chain_id,
        "Connected on the wrong chain — sync suppressed until switch"
      );
    }
    _ => {
      warn!("Wallet connection failed — idle until shutdown");
      let _ = shutdown_rx.recv().await;
      return Ok(());
    }
  }

  let mut balance_tick =
    tokio::time::interval(Duration::from_secs(config.sync.balance_interval_secs));
  let mut asset_tick =
    tokio::time::interval(Duration::from_secs(config.sync.asset_interval_secs));
  let mut chain_tick =
    tokio::time::interval(Duration::from_secs(config.sync.chain_poll_interval_secs));

  loop {
    tokio::select! {
      biased;
      _ = shutdown_rx.recv() => {
        info!("Sync loop received shutdown signal");
        break;
      }
      _ = chain_tick.tick() => {
        session.refresh_chain_identity().await;
      }
      _ = balance_tick.tick() => {
        if !session.sync_allowed().await {
          continue;
        }
        if let Some(address) = store.snapshot().account.address {
          balances.sync(&address).await;
        }
      }
      _ = asset_tick.tick() => {
        if !session.sync_allowed().await {
          continue;
        }
        let account = store.snapshot().account;
        let Some(address) = account.address else {
          continue;
        };

        // NFT balances carry zero decimals so the formatted
        // strings are plain counts.
        let clam_count = account.clam_balance.parse::<u64>().unwrap_or(0);
        let pearl_count = account.pearl_balance.parse::<u64>().unwrap_or(0);

        assets.sync_clams(&address, clam_count).await;
        assets.sync_pearls(&address, pearl_count).await;

        match farming.harvestable_clams().await {
          Ok(ready) => {
            let collectable = match ready.first() {
              Some(clam) => domain::patch::FieldPatch::Set(clam.token_id.clone()),
              None => domain::patch::FieldPatch::Clear,
            };
            store
              .apply(domain::patch::StorePatch::Account(
                domain::patch::AccountPatch {
                  clam_to_collect: collectable,
                  ..Default::default()
                },
              ))
              .await;
          }
          Err(e) => warn!(error = %e, "Harvestable clam check failed"),
        }
      }
    }
  }

  info!("Sync loop stopped cleanly");
  Ok(())
}
