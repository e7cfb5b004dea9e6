//! Best-effort extraction of human-readable provider error messages.
//!
//! Wallet providers surface contract rejections as JSON-ish strings,
//! e.g. `execution reverted: {"message": "insufficient funds", ...}`.
//! The store shows users the embedded message when one can be found and
//! falls back to the raw string otherwise. Parse failure is expected,
//! never exceptional.

/// Try to extract the `"message": "<text>"` fragment from a raw
/// provider error string.
///
/// Matches greedily to the last closing quote (the payload text may
/// itself contain quotes) and renders embedded escaped newlines as
/// spaces. Returns `None` when no fragment is present.
pub fn extract_message(raw: &str) -> Option<String> {
  let key_at = raw.find("\"message\":")?;
  let after_key = &raw[key_at + "\"message\":".len()..];

  // Tolerate a single optional space between the colon and the quote.
  let after_key = after_key.strip_prefix(' ').unwrap_or(after_key);
  let body = after_key.strip_prefix('"')?;

  // Greedy: the message runs to the last quote in the remainder.
  let end = body.rfind('"')?;
  if end == 0 {
    return None;
  }

  Some(body[..end].replace("\\n", " "))
}

/// Extraction with the raw-string fallback applied.
///
/// This is the exact transformation the account merge performs on an
/// incoming error field.
pub fn humanize(raw: &str) -> String {
  extract_message(raw).unwrap_or_else(|| raw.to_string())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn extracts_embedded_message() {
    let raw = r#"execution reverted: {"message": "insufficient funds"}"#;
    assert_eq!(humanize(raw), "insufficient funds");
  }

  #[test]
  fn tolerates_missing_space_after_colon() {
    let raw = r#"{"code":-32000,"message":"gas required exceeds allowance"}"#;
    assert_eq!(
      extract_message(raw).as_deref(),
      Some("gas required exceeds allowance")
    );
  }

  #[test]
  fn renders_escaped_newlines_as_spaces() {
    let raw = r#"err: {"message": "first line\nsecond line"}"#;
    assert_eq!(humanize(raw), "first line second line");
  }

  #[test]
  fn passes_through_unmatched_strings() {
    assert_eq!(humanize("connection timed out"), "connection timed out");
    assert_eq!(extract_message("connection timed out"), None);
  }

  #[test]
  fn empty_message_falls_back() {
    let raw = r#"{"message": ""}"#;
    assert_eq!(humanize(raw), raw);
  }
}
