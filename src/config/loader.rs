//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `config.toml`, validating all parameters, and
//! providing clear error messages for misconfiguration.

use std::path::Path;

use alloy::primitives::Address;
use anyhow::{Context, Result};
use tracing::info;

use super::AppConfig;

/// Load and validate configuration from a TOML file.
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<AppConfig> {
  let path = Path::new(path);

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  let config: AppConfig =
    toml::from_str(&content).with_context(|| "Failed to parse config.toml")?;

  validate_config(&config)?;

  info!(
    name = %config.app.name,
    chain_id = config.chain.required_chain_id,
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Validate all configuration parameters.
fn validate_config(config: &AppConfig) -> Result<()> {
  anyhow::ensure!(
    !config.chain.rpc_url.is_empty(),
    "Chain RPC URL must not be empty"
  );
  anyhow::ensure!(
    config.chain.required_chain_id > 0,
    "required_chain_id must be positive"
  );
  anyhow::ensure!(
    config.chain.timeout_seconds > 0,
    "timeout_seconds must be positive"
  );

  let addresses = [
    ("clam_nft", &config.contracts.clam_nft),
    ("pearl_nft", &config.contracts.pearl_nft),
    ("clam_bonus", &config.contracts.clam_bonus),
    ("pearl_farm", &config.contracts.pearl_farm),
    ("gem_token", &config.contracts.gem_token),
    ("shell_token", &config.contracts.shell_token),
    ("dna_decoder", &config.contracts.dna_decoder),
  ];
  for (name, address) in addresses {
    address
      .parse::<Address>()
      .with_context(|| format!("Contract address {name} is not a valid address: {address}"))?;
  }

  anyhow::ensure!(
    config.sync.balance_interval_secs > 0,
    "balance_interval_secs must be positive"
  );
  anyhow::ensure!(
    config.sync.asset_interval_secs > 0,
    "asset_interval_secs must be positive"
  );
  anyhow::ensure!(
    config.sync.chain_poll_interval_secs > 0,
    "chain_poll_interval_secs must be positive"
  );
  anyhow::ensure!(
    !config.ui.placeholder_image.is_empty(),
    "placeholder_image must not be empty"
  );

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_load_nonexistent_file() {
    let result = load_config("nonexistent.toml");
    assert!(result.is_err());
  }

  #[test]
  fn test_validate_rejects_bad_address() {
    let toml = r#"
      [app]
      name = "test"

      [chain]
      rpc_url = "https://bsc-dataseed.binance.org"

      [contracts]
      clam_nft = "not-an-address"
      pearl_nft = "0x0000000000000000000000000000000000000002"
      clam_bonus = "0x0000000000000000000000000000000000000003"
      pearl_farm = "0x0000000000000000000000000000000000000004"
      gem_token = "0x0000000000000000000000000000000000000005"
      shell_token = "0x0000000000000000000000000000000000000006"
      dna_decoder = "0x0000000000000000000000000000000000000007"

      [sync]
      [ui]
    "#;
    let config: AppConfig = toml::from_str(toml).expect("parses");
    assert!(validate_config(&config).is_err());
  }

  #[test]
  fn test_defaults_apply() {
    let toml = r#"
      [app]
      name = "test"

      [chain]
      rpc_url = "https://bsc-dataseed.binance.org"

      [contracts]
      clam_nft = "0x0000000000000000000000000000000000000001"
      pearl_nft = "0x0000000000000000000000000000000000000002"
      clam_bonus = "0x0000000000000000000000000000000000000003"
      pearl_farm = "0x0000000000000000000000000000000000000004"
      gem_token = "0x0000000000000000000000000000000000000005"
      shell_token = "0x0000000000000000000000000000000000000006"
      dna_decoder = "0x0000000000000000000000000000000000000007"

      [sync]
      [ui]
    "#;
    let config: AppConfig = toml::from_str(toml).expect("parses");
    assert!(validate_config(&config).is_ok());
    assert_eq!(config.chain.required_chain_id, 56);
    assert_eq!(config.app.log_level, "info");
    assert!(!config.ui.skip_dialogs);
  }
}
