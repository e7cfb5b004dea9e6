//! DNA Decoder Port
//!
//! Pure interpretation of an on-chain DNA string into a structured
//! trait record. Deterministic per DNA value, so implementations are
//! free to memoize.

use async_trait::async_trait;

use super::SyncError;
use crate::domain::dna::{Dna, TraitRecord};

/// Trait for DNA interpretation providers.
#[async_trait]
pub trait DnaDecoder: Send + Sync + 'static {
  /// Decode a DNA string into its trait record.
  ///
  /// Rejects with `SyncError::Decode` on malformed payloads; callers
  /// treat the owning asset as absent rather than failing a batch.
  async fn decode(&self, dna: &Dna) -> Result<TraitRecord, SyncError>;
}
