//! Chain Adapters - BSC Blockchain Interaction Layer
//!
//! Provides on-chain access via alloy-rs 0.9 for:
//! - RPC provider management
//! - The generic contract gateway (read / estimate / send)
//! - Contract address resolution and startup validation

pub mod contracts;
pub mod gateway;
pub mod provider;

pub use contracts::ContractAddresses;
pub use gateway::EvmGateway;
pub use provider::BscProvider;
