//! Token balance formatting.
//!
//! Balances arrive from the chain as integers in each token's smallest
//! unit and are carried in the state document as decimal strings. The
//! conversion is pure integer arithmetic over `U256` so that repeated
//! syncs of an unchanged balance produce byte-identical strings.

use alloy::primitives::U256;
use serde::{Deserialize, Serialize};

/// Tokens tracked by the account sub-document.
///
/// CLAM and PEARL are NFT counts (0 decimals); the rest are standard
/// 18-decimal BEP-20 amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenSymbol {
  /// Native BNB balance.
  Bnb,
  /// Clam NFT count.
  Clam,
  /// Pearl NFT count.
  Pearl,
  /// $GEM utility token.
  Gem,
  /// $SHELL reward token.
  Shell,
}

impl TokenSymbol {
  /// Declared decimal count used when formatting to decimal strings.
  pub fn decimals(self) -> u32 {
    match self {
      Self::Clam | Self::Pearl => 0,
      Self::Bnb | Self::Gem | Self::Shell => 18,
    }
  }

  /// Format a smallest-unit amount for this token.
  pub fn format(self, raw: U256) -> String {
    format_units(raw, self.decimals())
  }
}

impl std::fmt::Display for TokenSymbol {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let s = match self {
      Self::Bnb => "BNB",
      Self::Clam => "CLAM",
      Self::Pearl => "PEARL",
      Self::Gem => "GEM",
      Self::Shell => "SHELL",
    };
    f.write_str(s)
  }
}

/// Convert a smallest-unit integer into a canonical decimal string.
///
/// With `decimals == 0` the output is a plain integer ("5"). Otherwise
/// the output always carries a decimal point with at least one
/// fractional digit and no trailing zeros ("1.0", "0.25"), matching the
/// formatting the web front end applied before handing strings to the
/// store. Canonical output keeps the idempotence guarantee: formatting
/// the same raw amount twice yields identical bytes.
pub fn format_units(raw: U256, decimals: u32) -> String {
  if decimals == 0 {
    return raw.to_string();
  }

  let divisor = U256::from(10u64).pow(U256::from(decimals));
  let whole = raw / divisor;
  let frac = raw % divisor;

  if frac.is_zero() {
    return format!("{whole}.0");
  }

  let mut frac_str = format!("{frac:0>width$}", width = decimals as usize);
  while frac_str.ends_with('0') {
    frac_str.pop();
  }
  format!("{whole}.{frac_str}")
}

#[cfg(test)]
mod tests {
  use super::*;

  fn wei(n: u64, exp: u32) -> U256 {
    U256::from(n) * U256::from(10u64).pow(U256::from(exp))
  }

  #[test]
  fn zero_decimal_tokens_format_as_integers() {
    assert_eq!(TokenSymbol::Clam.format(U256::from(7u64)), "7");
    assert_eq!(TokenSymbol::Pearl.format(U256::ZERO), "0");
  }

  #[test]
  fn whole_amounts_keep_a_fractional_digit() {
    assert_eq!(TokenSymbol::Bnb.format(wei(1, 18)), "1.0");
    assert_eq!(format_units(U256::ZERO, 18), "0.0");
  }

  #[test]
  fn fractional_amounts_trim_trailing_zeros() {
    // 0.25 BNB = 25 * 10^16 wei
    assert_eq!(TokenSymbol::Bnb.format(wei(25, 16)), "0.25");
    // 1.000000000000000001
    let raw = wei(1, 18) + U256::from(1u64);
    assert_eq!(format_units(raw, 18), "1.000000000000000001");
  }

  #[test]
  fn formatting_is_deterministic() {
    let raw = wei(42, 17) + U256::from(999u64);
    assert_eq!(format_units(raw, 18), format_units(raw, 18));
  }
}
