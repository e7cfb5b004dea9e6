//! Clam DNA and decoded trait records.
//!
//! DNA is an opaque hex string minted on-chain; the decoder contract
//! interprets it into named traits. Decoding is deterministic, so the
//! decoder adapter memoizes results per distinct DNA value.

use serde::{Deserialize, Serialize};

/// Opaque on-chain DNA string for a clam or pearl.
///
/// Kept as the raw hex string the NFT contract returns. A DNA shorter
/// than two characters marks an asset that has not finished minting;
/// such assets are filtered out of enumerations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dna(pub String);

impl Dna {
  /// Whether this DNA carries decodable trait data.
  ///
  /// Freshly-minted tokens report a placeholder DNA of zero or one
  /// characters until the RNG callback lands.
  pub fn is_decodable(&self) -> bool {
    self.0.len() > 1
  }
}

impl std::fmt::Display for Dna {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&str> for Dna {
  fn from(s: &str) -> Self {
    Self(s.to_string())
  }
}

/// Scale divisor for `rarity_value` (the contract stores it ×1e10).
pub const RARITY_VALUE_SCALE: u64 = 10_000_000_000;

/// Structured result of decoding a DNA string.
///
/// `size`, `lifespan` and `rarity_value` are the grade inputs the bonus
/// calculator contract consumes
/// (`calculateBonusRewards(base, size, lifespan, rarityValue)`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitRecord {
  /// Shell shape trait.
  pub shape: String,
  /// Shell color trait.
  pub color: String,
  /// Rarity tier label (e.g. "Common", "Legendary").
  pub rarity: String,
  /// Rarity score scaled by 1e10.
  pub rarity_value: u64,
  /// Number of pearls this clam can produce before dying.
  pub lifespan: u64,
  /// Clam size grade input.
  pub size: u64,
}

impl TraitRecord {
  /// Rarity score as a percentage (descaled from the 1e10 fixed point).
  pub fn rarity_percent(&self) -> f64 {
    self.rarity_value as f64 / RARITY_VALUE_SCALE as f64
  }

  /// A dead clam produces no more pearls and cannot be harvested.
  pub fn is_dead(&self) -> bool {
    self.lifespan == 0
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn placeholder_dna_is_not_decodable() {
    assert!(!Dna::from("").is_decodable());
    assert!(!Dna::from("0").is_decodable());
    assert!(Dna::from("0x1f3a9c").is_decodable());
  }

  #[test]
  fn rarity_percent_descales() {
    let traits = TraitRecord {
      shape: "round".into(),
      color: "blue".into(),
      rarity: "Rare".into(),
      rarity_value: 50_030_000_000,
      lifespan: 12,
      size: 70,
    };
    assert!((traits.rarity_percent() - 5.003).abs() < 1e-9);
  }
}
