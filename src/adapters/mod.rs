//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! external dependencies (blockchain RPC, in-process caches).
//!
//! Adapter categories:
//! - `chain`: BSC interaction via alloy-rs (provider, gateway, addresses)
//! - `dna`: on-chain DNA decoder with per-DNA memoization
//! - `wallet`: RPC-backed wallet provider with chain-changed polling
//! - `cache`: in-memory DNA-keyed image cache

pub mod cache;
pub mod chain;
pub mod dna;
pub mod wallet;
