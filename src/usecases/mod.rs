//! Use Cases Layer - Synchronization Effects
//!
//! Asynchronous update routines triggered by wallet events, polling
//! ticks, or user actions. Each effect fetches through the ports,
//! converts failures into `account.error` merges at its own boundary,
//! and hands whole-field-group patches to the store actor.
//!
//! Effects:
//! - `SessionManager`: connection state machine + network identity sync
//! - `BalanceSync`: token balance fetch and decimal-string conversion
//! - `AssetSync`: owned-asset enumeration with all-or-nothing merges
//! - `TxPipeline`: approve -> estimate -> send transaction flow
//! - `Farming`: pearl-farm staking, harvesting, and bonus reads

pub mod asset_sync;
pub mod balance_sync;
pub mod farming;
pub mod session;
pub mod tx_flow;

pub use asset_sync::AssetSync;
pub use balance_sync::BalanceSync;
pub use farming::Farming;
pub use session::{SessionManager, SessionPhase};
pub use tx_flow::{Approval, TxPipeline};
