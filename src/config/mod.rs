//! Configuration Module - TOML-based Engine Configuration
//!
//! Loads and validates configuration from `config.toml`. All contract
//! addresses and chain parameters are externalized here - nothing is
//! hardcoded in the domain layer. The wallet address comes from the
//! `WALLET_ADDRESS` environment variable, never from the file.

pub mod loader;

use serde::Deserialize;

/// Top-level engine configuration, loaded from `config.toml` at
/// startup and validated before any sync effect runs.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
  /// Engine identity and logging.
  pub app: AppSettings,
  /// Chain connectivity parameters.
  pub chain: ChainConfig,
  /// Deployed game contract addresses.
  pub contracts: ContractsConfig,
  /// Polling cadence for the sync effects.
  pub sync: SyncConfig,
  /// Presentation-adjacent knobs the store needs to know about.
  pub ui: UiConfig,
}

/// Engine identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
  /// Human-readable instance name.
  pub name: String,
  /// Log level (trace, debug, info, warn, error).
  #[serde(default = "default_log_level")]
  pub log_level: String,
}

/// Chain connectivity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
  /// BSC RPC endpoint.
  pub rpc_url: String,
  /// Chain id the game contracts live on (BSC mainnet).
  #[serde(default = "default_chain_id")]
  pub required_chain_id: u64,
  /// RPC request timeout in seconds.
  #[serde(default = "default_timeout")]
  pub timeout_seconds: u64,
}

/// Deployed contract addresses. ALWAYS in config - never hardcoded.
#[derive(Debug, Clone, Deserialize)]
pub struct ContractsConfig {
  pub clam_nft: String,
  pub pearl_nft: String,
  pub clam_bonus: String,
  pub pearl_farm: String,
  pub gem_token: String,
  pub shell_token: String,
  pub dna_decoder: String,
}

/// Polling cadence configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
  /// Seconds between balance sync ticks.
  #[serde(default = "default_balance_interval")]
  pub balance_interval_secs: u64,
  /// Seconds between owned-asset enumeration ticks.
  #[serde(default = "default_asset_interval")]
  pub asset_interval_secs: u64,
  /// Seconds between chain-id polls of the wallet provider.
  #[serde(default = "default_chain_poll_interval")]
  pub chain_poll_interval_secs: u64,
}

/// Store-visible presentation knobs.
#[derive(Debug, Clone, Deserialize)]
pub struct UiConfig {
  /// Start sessions with dialogue suppressed.
  #[serde(default)]
  pub skip_dialogs: bool,
  /// Image shown for assets with no cached render yet.
  #[serde(default = "default_placeholder_image")]
  pub placeholder_image: String,
}

// Default value functions for serde

fn default_log_level() -> String {
  "info".to_string()
}

fn default_chain_id() -> u64 {
  56
}

fn default_timeout() -> u64 {
  30
}

fn default_balance_interval() -> u64 {
  15
}

fn default_asset_interval() -> u64 {
  60
}

fn default_chain_poll_interval() -> u64 {
  5
}

fn default_placeholder_image() -> String {
  "img/clam_unknown.png".to_string()
}
