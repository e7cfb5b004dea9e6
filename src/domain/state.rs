//! The global state document and its sub-documents.
//!
//! One logical document per session. Sub-documents are independently
//! patchable; defaults mirror the initial screen state of the game
//! (zero balances, no wallet, Binance Smart Chain assumed until the
//! wallet reports otherwise).

use serde::{Deserialize, Serialize};

use super::assets::{ClamDescriptor, PearlDescriptor};

/// Chain id of the Binance Smart Chain mainnet.
pub const BSC_CHAIN_ID: u64 = 56;

/// Wallet connection and on-chain holdings for the active session.
///
/// Balances and owned collections are derived state: they are fully
/// replaceable by re-fetching from the chain and the store never
/// applies local deltas to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountState {
  /// Connected wallet address; `None` while disconnected.
  pub address: Option<String>,
  /// Whether a wallet connection is established.
  pub is_connected: bool,
  /// Last known chain id from the wallet provider.
  pub chain_id: u64,
  /// Whether `chain_id` matches the required chain.
  pub is_bs_chain: bool,
  /// Native BNB balance as a decimal string.
  pub bnb_balance: String,
  /// Owned clam NFT count as a decimal string.
  pub clam_balance: String,
  /// Owned pearl NFT count as a decimal string.
  pub pearl_balance: String,
  /// $GEM balance as a decimal string.
  pub gem_balance: String,
  /// $SHELL balance as a decimal string.
  pub shell_balance: String,
  /// Token id of a clam awaiting collection, if any.
  pub clam_to_collect: Option<String>,
  /// Last surfaced failure message; cleared on successful operations.
  pub error: Option<String>,
  /// Owned clams, replaced wholesale per enumeration.
  pub clams: Vec<ClamDescriptor>,
  /// Owned pearls, replaced wholesale per enumeration.
  pub pearls: Vec<PearlDescriptor>,
}

impl Default for AccountState {
  fn default() -> Self {
    Self {
      address: None,
      is_connected: false,
      chain_id: BSC_CHAIN_ID,
      is_bs_chain: true,
      bnb_balance: "0".into(),
      clam_balance: "0".into(),
      pearl_balance: "0".into(),
      gem_balance: "0".into(),
      shell_balance: "0".into(),
      clam_to_collect: None,
      error: None,
      clams: Vec::new(),
      pearls: Vec::new(),
    }
  }
}

/// Spot prices for the game tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceState {
  /// $GEM price as a decimal string.
  pub gem: String,
  /// $SHELL price as a decimal string.
  pub shell: String,
}

impl Default for PriceState {
  fn default() -> Self {
    Self {
      gem: "0".into(),
      shell: "0".into(),
    }
  }
}

/// Transient UI flags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UiState {
  /// Whether a fetch is in flight (drives spinners).
  pub is_fetching: bool,
}

/// Presale progress and the caller's participation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresaleState {
  /// Total clams available in the presale.
  pub cap: String,
  /// Clams sold so far.
  pub clams_purchased: String,
  /// Sale progress in percent, once computed.
  pub progress: Option<f64>,
  /// Unit price in BNB.
  pub sale_price: String,
  /// Whether the sale has started.
  pub is_started: Option<bool>,
  /// Whether the sale has ended.
  pub is_ended: bool,
  /// Clams purchased by the connected account.
  pub users_purchased_clam: String,
  /// RNG value from the buyer's clam request, if resolved.
  pub rng: Option<String>,
  /// Pending RNG request hash, if any.
  pub hash_request: Option<String>,
}

impl Default for PresaleState {
  fn default() -> Self {
    Self {
      cap: "0".into(),
      clams_purchased: "0".into(),
      progress: None,
      sale_price: "0".into(),
      is_started: None,
      is_ended: false,
      users_purchased_clam: "0".into(),
      rng: None,
      hash_request: None,
    }
  }
}

/// Free-claim allocation state for whitelisted accounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClamClaimersState {
  /// Per-account claim cap.
  pub individual_cap: String,
  /// Whether the connected account is on the claimer list.
  pub is_clam_claimer: Option<bool>,
  /// Clams claimed by the connected account.
  pub users_claimed_clam: String,
  /// Claim progress in percent, once computed.
  pub progress: Option<f64>,
  /// Total clams claimed across all accounts.
  pub clams_claimed: String,
  /// RNG value from the claim request, if resolved.
  pub rng: Option<String>,
  /// Pending RNG request hash, if any.
  pub hash_request: Option<String>,
}

impl Default for ClamClaimersState {
  fn default() -> Self {
    Self {
      individual_cap: "0".into(),
      is_clam_claimer: None,
      users_claimed_clam: "0".into(),
      progress: None,
      clams_claimed: "0".into(),
      rng: None,
      hash_request: None,
    }
  }
}

/// Community reward eligibility for the connected account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunityRewardsState {
  /// Whether the connected account is an awardee.
  pub is_awardee: Option<bool>,
  /// Pending reward amount as a decimal string.
  pub user_rewards: String,
  /// RNG value from the reward request, if resolved.
  pub rng: Option<String>,
  /// Pending RNG request hash, if any.
  pub hash_request: Option<String>,
}

impl Default for CommunityRewardsState {
  fn default() -> Self {
    Self {
      is_awardee: None,
      user_rewards: "0".into(),
      rng: None,
      hash_request: None,
    }
  }
}

/// Pearl hunt event state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PearlHuntState {
  /// Pearl count held by the connected account.
  pub account_pearl_count: String,
  /// Address of the last hunt winner.
  pub last_winner: Option<String>,
}

impl Default for PearlHuntState {
  fn default() -> Self {
    Self {
      account_pearl_count: "0".into(),
      last_winner: None,
    }
  }
}

/// Directive attached to a dialogue button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ButtonDirective {
  /// Open an external URL in a new tab.
  OpenUrl { url: String },
  /// Navigate to an internal route.
  Navigate { route: String },
  /// Switch the speaking character to another script entry.
  SwitchSpeech { action: String },
  /// Invoke a presentation-layer callback by registered id.
  Callback { id: String },
}

/// A dialogue button shown in a character speech bubble.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogButton {
  /// Button label; `None` hides the button.
  pub text: Option<String>,
  /// Optional directive executed on press.
  pub alt: Option<ButtonDirective>,
  /// Whether pressing the button dismisses the bubble.
  pub dismiss: Option<bool>,
}

/// Speaking-character dialogue state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterState {
  /// Active character name.
  pub name: Option<String>,
  /// Key into the static dialogue script table.
  pub action: Option<String>,
  /// Whether the character is shown.
  pub show: Option<bool>,
  /// Primary button.
  pub button: DialogButton,
  /// Secondary button; force-replaced on every patch that does not
  /// set `skip_dialogs`, so stale button state never leaks forward.
  pub button_alt: DialogButton,
  /// Computed: `suppress_bubble || skip_dialogs` of the incoming
  /// patch, never carried from a stored previous value.
  pub suppress_bubble: bool,
  /// Whether the user opted out of dialogue entirely.
  pub skip_dialogs: bool,
  /// Render the character above modal content.
  pub force_top: bool,
}

impl Default for CharacterState {
  fn default() -> Self {
    Self {
      name: None,
      action: None,
      show: None,
      button: DialogButton::default(),
      button_alt: DialogButton::default(),
      suppress_bubble: false,
      skip_dialogs: false,
      force_top: false,
    }
  }
}

/// Bank screen state. The scene-handle registry associated with this
/// screen is owned by the store actor (handles carry destroy
/// capabilities and are not cloneable); the snapshot carries only the
/// live handle count.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BankState {
  /// Farming pool identifiers.
  pub pools: Vec<String>,
  /// Currently selected pool, if any.
  pub selected_pool: Option<String>,
  /// Number of live scene handles registered for this screen.
  pub scene_object_count: usize,
}

/// The whole session document published to subscribers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppState {
  pub account: AccountState,
  pub price: PriceState,
  pub ui: UiState,
  pub presale: PresaleState,
  pub clam_claimers: ClamClaimersState,
  pub community_rewards: CommunityRewardsState,
  pub pearl_hunt: PearlHuntState,
  pub character: CharacterState,
  pub bank: BankState,
}
