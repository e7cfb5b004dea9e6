//! Asset Sync - Owned-Asset Enumeration and Image Annotation
//!
//! Enumerates the connected account's clams and pearls: one
//! lookup-by-index call per owned token, all fired concurrently, then
//! awaited together. The merge is all-or-nothing - if any lookup
//! rejects, the previous collection stays untouched and only
//! `account.error` is set. An inconsistent partial list is never
//! visible to subscribers.
//!
//! Assets whose DNA is still a placeholder, or whose DNA fails to
//! decode, are filtered out of the batch rather than failing it.
//!
//! Each enumeration carries a per-collection generation stamp; a
//! result arriving after a newer enumeration of the same collection
//! started is discarded, so a stale fetch for a previous address can
//! never overwrite fresher state.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use alloy::primitives::U256;
use futures_util::future::try_join_all;
use tracing::{debug, warn};

use crate::domain::assets::{ClamDescriptor, ImageRef, PearlDescriptor};
use crate::domain::dna::Dna;
use crate::domain::patch::{AccountPatch, FieldPatch, StorePatch};
use crate::ports::SyncError;
use crate::ports::contract_gateway::{CallArg, CallValue, ContractGateway, ContractId};
use crate::ports::dna_decoder::DnaDecoder;
use crate::ports::image_cache::ImageCache;
use crate::store::StoreHandle;

/// Enumerates owned assets and annotates display images.
pub struct AssetSync<G: ContractGateway, D: DnaDecoder, C: ImageCache> {
  gateway: Arc<G>,
  decoder: Arc<D>,
  images: Arc<C>,
  store: StoreHandle,
  /// Shown for assets the render cache has no image for yet.
  placeholder: ImageRef,
  /// Monotonic stamps, one per collection; only the newest
  /// enumeration of a collection may merge. Clam and pearl batches
  /// run independently and must not supersede each other.
  clam_generation: AtomicU64,
  pearl_generation: AtomicU64,
}

impl<G: ContractGateway, D: DnaDecoder, C: ImageCache> AssetSync<G, D, C> {
  pub fn new(
    gateway: Arc<G>,
    decoder: Arc<D>,
    images: Arc<C>,
    store: StoreHandle,
    placeholder: ImageRef,
  ) -> Self {
    Self {
      gateway,
      decoder,
      images,
      store,
      placeholder,
      clam_generation: AtomicU64::new(0),
      pearl_generation: AtomicU64::new(0),
    }
  }

  /// Enumerate `count` owned clams for `address` and merge the full
  /// replacement set.
  pub async fn sync_clams(&self, address: &str, count: u64) {
    let stamp = self.clam_generation.fetch_add(1, Ordering::SeqCst) + 1;

    let lookups = (0..count).map(|index| self.fetch_clam(address, index));
    let outcome = try_join_all(lookups).await;

    if self.clam_generation.load(Ordering::SeqCst) != stamp {
      debug!(stamp, "clam enumeration superseded, discarding result");
      return;
    }

    match outcome {
      Ok(found) => {
        let mut clams: Vec<ClamDescriptor> =
          found.into_iter().flatten().collect();
        for clam in &mut clams {
          clam.image = Some(self.image_for(&clam.dna).await);
        }
        debug!(count = clams.len(), "clam enumeration merged");
        self
          .store
          .apply(StorePatch::Account(AccountPatch {
            clams: Some(clams),
            error: FieldPatch::Clear,
            ..AccountPatch::default()
          }))
          .await;
      }
      Err(e) => {
        warn!(error = %e, "clam enumeration failed, keeping previous set");
        self
          .store
          .apply(StorePatch::Account(AccountPatch::with_error(e.to_string())))
          .await;
      }
    }
  }

  /// Enumerate `count` owned pearls for `address`.
  ///
  /// Same contract as `sync_clams`: concurrent lookups, filtered
  /// placeholders, all-or-nothing merge under the generation stamp.
  pub async fn sync_pearls(&self, address: &str, count: u64) {
    let stamp = self.pearl_generation.fetch_add(1, Ordering::SeqCst) + 1;

    let lookups = (0..count).map(|index| self.fetch_pearl(address, index));
    let outcome = try_join_all(lookups).await;

    if self.pearl_generation.load(Ordering::SeqCst) != stamp {
      debug!(stamp, "pearl enumeration superseded, discarding result");
      return;
    }

    match outcome {
      Ok(found) => {
        let mut pearls: Vec<PearlDescriptor> =
          found.into_iter().flatten().collect();
        for pearl in &mut pearls {
          pearl.image = Some(self.image_for(&pearl.dna).await);
        }
        self
          .store
          .apply(StorePatch::Account(AccountPatch {
            pearls: Some(pearls),
            error: FieldPatch::Clear,
            ..AccountPatch::default()
          }))
          .await;
      }
      Err(e) => {
        warn!(error = %e, "pearl enumeration failed, keeping previous set");
        self
          .store
          .apply(StorePatch::Account(AccountPatch::with_error(e.to_string())))
          .await;
      }
    }
  }

  /// Record a freshly-resolved display image for a DNA value.
  ///
  /// Called from the presentation boundary once a renderer has
  /// produced an image; entries accumulate without eviction.
  pub async fn record_image(&self, dna: Dna, image: ImageRef) {
    self.images.store(dna, image).await;
  }

  async fn image_for(&self, dna: &Dna) -> ImageRef {
    match self.images.lookup(dna).await {
      Some(image) => image,
      None => self.placeholder.clone(),
    }
  }

  /// Resolve one owned clam by enumeration index.
  ///
  /// `Ok(None)` marks an asset filtered out (placeholder DNA or a
  /// decode failure); `Err` aborts the whole batch.
  async fn fetch_clam(
    &self,
    address: &str,
    index: u64,
  ) -> Result<Option<ClamDescriptor>, SyncError> {
    let (token_id, dna, birth_time) = self
      .fetch_token(ContractId::ClamNft, "getClamData", address, index)
      .await?;

    if !dna.is_decodable() {
      return Ok(None);
    }

    match self.decoder.decode(&dna).await {
      Ok(dna_decoded) => Ok(Some(ClamDescriptor {
        token_id,
        dna,
        dna_decoded,
        birth_time,
        image: None,
      })),
      Err(SyncError::Decode(reason)) => {
        warn!(%dna, %reason, "undecodable clam DNA filtered out");
        Ok(None)
      }
      Err(e) => Err(e),
    }
  }

  async fn fetch_pearl(
    &self,
    address: &str,
    index: u64,
  ) -> Result<Option<PearlDescriptor>, SyncError> {
    let (token_id, dna, birth_time) = self
      .fetch_token(ContractId::PearlNft, "getPearlData", address, index)
      .await?;

    if !dna.is_decodable() {
      return Ok(None);
    }

    match self.decoder.decode(&dna).await {
      Ok(dna_decoded) => Ok(Some(PearlDescriptor {
        token_id,
        dna,
        dna_decoded,
        birth_time,
        image: None,
      })),
      Err(SyncError::Decode(reason)) => {
        warn!(%dna, %reason, "undecodable pearl DNA filtered out");
        Ok(None)
      }
      Err(e) => Err(e),
    }
  }

  /// Shared index -> (token id, DNA, birth time) lookup pair.
  async fn fetch_token(
    &self,
    contract: ContractId,
    data_method: &str,
    address: &str,
    index: u64,
  ) -> Result<(String, Dna, u64), SyncError> {
    let token_id = self
      .gateway
      .read(
        contract,
        "tokenOfOwnerByIndex",
        &[
          CallArg::Address(address.to_string()),
          CallArg::Uint(U256::from(index)),
        ],
      )
      .await?
      .as_uint()
      .ok_or_else(|| {
        SyncError::contract("tokenOfOwnerByIndex", "unexpected return shape")
      })?;

    let data = self
      .gateway
      .read(contract, data_method, &[CallArg::Uint(token_id)])
      .await?;

    let (dna, birth_time) = decode_token_data(&data)
      .ok_or_else(|| SyncError::contract(data_method, "unexpected return shape"))?;

    Ok((token_id.to_string(), dna, birth_time))
  }
}

/// Pull `(dna, birth_time)` out of a token-data tuple return.
fn decode_token_data(value: &CallValue) -> Option<(Dna, u64)> {
  let fields = value.as_tuple()?;
  let dna = Dna(fields.first()?.as_text()?.to_string());
  let birth_time = u64::try_from(fields.get(1)?.as_uint()?).ok()?;
  Some((dna, birth_time))
}
