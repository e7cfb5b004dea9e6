//! Owned asset descriptors (clams and pearls).
//!
//! Descriptors are built wholesale by the enumeration effect and
//! replace the previous collection on every successful fetch. The only
//! in-place mutation after creation is attaching an image annotation.

use serde::{Deserialize, Serialize};

use super::dna::{Dna, TraitRecord};

/// Reference to a resolved display image for an asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(pub String);

impl From<&str> for ImageRef {
  fn from(s: &str) -> Self {
    Self(s.to_string())
  }
}

/// A clam NFT owned by the connected account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClamDescriptor {
  /// On-chain token id.
  pub token_id: String,
  /// Opaque trait seed.
  pub dna: Dna,
  /// Decoded traits (memoized per DNA value by the decoder).
  pub dna_decoded: TraitRecord,
  /// On-chain mint timestamp (unix seconds).
  pub birth_time: u64,
  /// Display image attached after creation; placeholder when the
  /// render cache has no entry for this DNA yet.
  pub image: Option<ImageRef>,
}

impl ClamDescriptor {
  /// Whether this clam can be harvested right now.
  ///
  /// A clam is harvestable once it is past its incubation period and
  /// still has lifespan left.
  pub fn is_harvestable(&self, block_timestamp: u64, incubation_secs: u64) -> bool {
    !self.dna_decoded.is_dead()
      && block_timestamp > self.birth_time.saturating_add(incubation_secs)
  }
}

/// A pearl NFT owned by the connected account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PearlDescriptor {
  /// On-chain token id.
  pub token_id: String,
  /// Opaque trait seed.
  pub dna: Dna,
  /// Decoded traits.
  pub dna_decoded: TraitRecord,
  /// On-chain mint timestamp (unix seconds).
  pub birth_time: u64,
  /// Display image annotation.
  pub image: Option<ImageRef>,
}

/// Per-clam bonus reward computed by the bonus calculator contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClamBonus {
  /// Token id of the clam the bonus applies to.
  pub clam_id: String,
  /// Bonus GEM rewards in smallest units, as a decimal string.
  pub clam_bonus: String,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn clam(lifespan: u64, birth_time: u64) -> ClamDescriptor {
    ClamDescriptor {
      token_id: "11".into(),
      dna: Dna::from("0xabcdef"),
      dna_decoded: TraitRecord {
        shape: "round".into(),
        color: "white".into(),
        rarity: "Common".into(),
        rarity_value: 1,
        lifespan,
        size: 40,
      },
      birth_time,
      image: None,
    }
  }

  #[test]
  fn incubating_clam_is_not_harvestable() {
    let c = clam(5, 1_000);
    assert!(!c.is_harvestable(1_100, 3_600));
    assert!(c.is_harvestable(5_000, 3_600));
  }

  #[test]
  fn dead_clam_is_never_harvestable() {
    let c = clam(0, 0);
    assert!(!c.is_harvestable(u64::MAX, 0));
  }
}
