//! Image Cache Port
//!
//! Local cache of resolved display images keyed by DNA value. The
//! renderer populates it opportunistically; lookups that miss fall
//! back to a placeholder. No eviction at this layer.

use async_trait::async_trait;

use crate::domain::assets::ImageRef;
use crate::domain::dna::Dna;

/// Trait for the DNA-keyed image cache.
#[async_trait]
pub trait ImageCache: Send + Sync + 'static {
  /// Look up a previously-resolved image for a DNA value.
  async fn lookup(&self, dna: &Dna) -> Option<ImageRef>;

  /// Store a resolved image. Entries are never evicted here.
  async fn store(&self, dna: Dna, image: ImageRef);
}
