use mnemosyne_shared::APP_CONFIG;
use regex::Regex;
use std::sync::LazyLock;

struct PiiPattern {
  name: &'static str,
  token: &'static str,
  regex: LazyLock<Regex>,
}

macro_rules! pii_pattern {
  ($name:expr, $token:expr, $re:expr) => {
    PiiPattern {
      name: $name,
      token: $token,
      regex: LazyLock::new(|| Regex::new($re).expect("static PII regex must compile")),
    }
  };
}

static EMAIL: PiiPattern = pii_pattern!(
  "email",
  "[EMAIL-REDACTED]",
  r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}"
);
static PHONE: PiiPattern = pii_pattern!(
  "phone",
  "[PHONE-REDACTED]",
  r"(\+?\d{1,3}[-.\s]?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}\b"
);
static SSN: PiiPattern = pii_pattern!("ssn", "[SSN-REDACTED]", r"\b\d{3}-\d{2}-\d{4}\b");
static CREDIT_CARD: PiiPattern = pii_pattern!(
  "credit_card",
  "[CARD-REDACTED]",
  r"\b(?:\d[ -]*?){13,19}\b"
);

fn patterns() -> [&'static PiiPattern; 4] {
  // Order matters: SSN and card patterns are narrower than phone and must run
  // first, or a 9-digit SSN-shaped number could be swallowed by the looser
  // phone pattern first.
  [&SSN, &CREDIT_CARD, &EMAIL, &PHONE]
}

fn pattern_enabled(pattern: &PiiPattern) -> bool {
  APP_CONFIG.pii_pattern_set.enabled.get(pattern.name).copied().unwrap_or(true)
}

/// One redaction performed on a piece of text, kept for audit/debugging; the
/// redacted text itself never round-trips the original value.
#[derive(Debug, Clone)]
pub struct Redaction {
  pub pattern: &'static str,
  pub original_len: usize,
}

#[derive(Debug, Clone, Default)]
pub struct RedactionResult {
  pub text: String,
  pub redactions: Vec<Redaction>,
}

/// Replace phone/email/SSN/credit-card substrings with opaque tokens. Pure,
/// stateless, and safe to call repeatedly — redacting already-redacted text is
/// a no-op since the output tokens don't match any pattern.
#[must_use]
pub fn redact(text: &str) -> RedactionResult {
  let mut out = text.to_owned();
  let mut redactions = Vec::new();

  for pattern in patterns() {
    if !pattern_enabled(pattern) {
      continue;
    }
    let mut replaced = String::with_capacity(out.len());
    let mut last_end = 0;
    for m in pattern.regex.find_iter(&out) {
      replaced.push_str(&out[last_end..m.start()]);
      replaced.push_str(pattern.token);
      redactions.push(Redaction {
        pattern: pattern.name,
        original_len: m.len(),
      });
      last_end = m.end();
    }
    replaced.push_str(&out[last_end..]);
    out = replaced;
  }

  RedactionResult { text: out, redactions }
}

/// Predicate used in tests and as a final belt-and-braces check on LLM
/// output: true when no PII pattern matches `text`.
#[must_use]
pub fn validate_no_pii(text: &str) -> bool {
  patterns().iter().filter(|p| pattern_enabled(p)).all(|p| !p.regex.is_match(text))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn redacts_email() {
    let result = redact("contact me at kai@example.com please");
    assert!(validate_no_pii(&result.text));
    assert!(result.text.contains("[EMAIL-REDACTED]"));
  }

  #[test]
  fn redacts_phone_and_ssn_together() {
    let result = redact("call 415-555-0199 or check ssn 123-45-6789");
    assert!(validate_no_pii(&result.text));
    assert_eq!(result.redactions.len(), 2);
  }

  #[test]
  fn leaves_clean_text_untouched() {
    let result = redact("their preferred delivery day is Friday");
    assert_eq!(result.text, "their preferred delivery day is Friday");
    assert!(result.redactions.is_empty());
  }

  #[test]
  fn redacting_twice_is_idempotent() {
    let once = redact("email kai@example.com").text;
    let twice = redact(&once).text;
    assert_eq!(once, twice);
  }
}
