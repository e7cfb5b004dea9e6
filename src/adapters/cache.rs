//! In-Memory Image Cache
//!
//! DNA-keyed map of resolved display images behind an async RwLock.
//! Unbounded: the game's asset population is small and entries are a
//! short path string each.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::assets::ImageRef;
use crate::domain::dna::Dna;
use crate::ports::image_cache::ImageCache;

#[derive(Default)]
pub struct MemoryImageCache {
  entries: RwLock<HashMap<Dna, ImageRef>>,
}

impl MemoryImageCache {
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl ImageCache for MemoryImageCache {
  async fn lookup(&self, dna: &Dna) -> Option<ImageRef> {
    self.entries.read().await.get(dna).cloned()
  }

  async fn store(&self, dna: Dna, image: ImageRef) {
    self.entries.write().await.insert(dna, image);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn stores_and_returns_entries() {
    let cache = MemoryImageCache::new();
    let dna = Dna::from("9127344382950149");

    assert!(cache.lookup(&dna).await.is_none());

    cache
      .store(dna.clone(), ImageRef::from("img/clam_9127.png"))
      .await;
    assert_eq!(
      cache.lookup(&dna).await,
      Some(ImageRef::from("img/clam_9127.png"))
    );
  }

  #[tokio::test]
  async fn later_store_replaces_earlier() {
    let cache = MemoryImageCache::new();
    let dna = Dna::from("42");

    cache.store(dna.clone(), ImageRef::from("img/a.png")).await;
    cache.store(dna.clone(), ImageRef::from("img/b.png")).await;

    assert_eq!(cache.lookup(&dna).await, Some(ImageRef::from("img/b.png")));
  }
}
