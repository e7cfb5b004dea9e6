//! Domain layer - State document, patches, and pure helpers.
//!
//! This module contains the pure core of the synchronization engine.
//! No I/O happens here (hexagonal architecture inner ring); everything
//! is testable in isolation and total over well-typed input.

pub mod assets;
pub mod balance;
pub mod dna;
pub mod errtext;
pub mod patch;
pub mod state;

// Re-export core types for convenience
pub use assets::{ClamDescriptor, PearlDescriptor};
pub use balance::TokenSymbol;
pub use dna::{Dna, TraitRecord};
pub use patch::{AccountPatch, CharacterPatch, FieldPatch, StorePatch, SubDoc};
pub use state::AppState;
