use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

const COREFERENCE_TOKENS: &[&str] = &["he", "she", "they", "it", "him", "her", "them"];
const STOPWORDS: &[&str] = &[
  "the", "a", "an", "this", "that", "these", "those", "draft", "please", "hi", "hello",
];

#[derive(Debug, Clone)]
pub struct EntityMention {
  pub text: String,
  pub span: (usize, usize),
  pub requires_coreference: bool,
}

fn is_capitalized(word: &str) -> bool {
  word.chars().next().is_some_and(char::is_uppercase)
}

fn is_stopword(word: &str) -> bool {
  STOPWORDS.contains(&word.to_lowercase().as_str())
}

/// Split `text` into (word, byte_span) tokens on whitespace, trimming
/// trailing punctuation from each token but keeping the span over the
/// original untrimmed slice's word boundaries.
fn tokenize(text: &str) -> Vec<(&str, usize, usize)> {
  let mut tokens = Vec::new();
  let mut idx = 0;
  for raw in text.split_whitespace() {
    let start = text[idx..].find(raw).map_or(idx, |p| idx + p);
    let end = start + raw.len();
    idx = end;
    let trimmed = raw.trim_matches(|c: char| c.is_ascii_punctuation());
    if !trimmed.is_empty() {
      let offset = raw.find(trimmed).unwrap_or(0);
      tokens.push((trimmed, start + offset, start + offset + trimmed.len()));
    }
  }
  tokens
}

/// Extract candidate entity mentions and coreference pronouns from a turn's
/// text. Multi-token capitalized phrases are merged; a lone capitalized word
/// at the very start of a sentence is dropped (too many false positives from
/// ordinary sentence-initial capitalization), but a multi-token phrase
/// starting a sentence is kept.
#[must_use]
pub fn extract_mentions(text: &str) -> Vec<EntityMention> {
  let tokens = tokenize(text);
  let mut mentions = Vec::new();
  let mut seen = HashSet::new();

  let mut i = 0;
  while i < tokens.len() {
    let (word, start, _) = tokens[i];
    let sentence_initial = i == 0 || ends_sentence(tokens[i - 1].0);

    if COREFERENCE_TOKENS.contains(&word.to_lowercase().as_str()) {
      push_unique(&mut mentions, &mut seen, word, start, start + word.len(), true);
      i += 1;
      continue;
    }

    if is_capitalized(word) && !is_stopword(word) {
      let mut j = i + 1;
      while j < tokens.len() && is_capitalized(tokens[j].0) && !is_stopword(tokens[j].0) {
        j += 1;
      }
      let phrase_len = j - i;
      let (_, _, last_end) = tokens[j - 1];

      if phrase_len > 1 || !sentence_initial {
        let phrase = tokens[i..j].iter().map(|t| t.0).collect::<Vec<_>>().join(" ");
        push_unique(&mut mentions, &mut seen, &phrase, start, last_end, false);
      }
      i = j;
      continue;
    }

    i += 1;
  }

  mentions
}

static ORDER_CODE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"\b[A-Za-z]{2,5}-\d{3,}\b").expect("static order-code regex must compile"));
static ORDER_REFERENCE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?i)\border\s*(?:number)?\s*#?\s*(\d{3,})\b").expect("static order-reference regex must compile"));

/// Pull a sales-order number out of free text: either a standalone code like
/// "SO-1024" or a bare number following "order"/"order number"/"order #".
#[must_use]
pub fn extract_order_number(text: &str) -> Option<String> {
  if let Some(m) = ORDER_CODE.find(text) {
    return Some(m.as_str().to_owned());
  }
  ORDER_REFERENCE.captures(text).map(|c| c[1].to_owned())
}

fn ends_sentence(word: &str) -> bool {
  word.ends_with(['.', '?', '!'])
}

fn push_unique(
  mentions: &mut Vec<EntityMention>,
  seen: &mut HashSet<String>,
  text: &str,
  start: usize,
  end: usize,
  requires_coreference: bool,
) {
  let key = text.to_lowercase();
  if seen.insert(key) {
    mentions.push(EntityMention {
      text: text.to_owned(),
      span: (start, end),
      requires_coreference,
    });
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn extracts_multi_token_name() {
    let mentions = extract_mentions("Draft an email for Kai Media about their invoice.");
    assert!(mentions.iter().any(|m| m.text == "Kai Media"));
  }

  #[test]
  fn drops_sentence_initial_single_token() {
    let mentions = extract_mentions("Draft something nice.");
    assert!(mentions.iter().all(|m| m.text != "Draft"));
  }

  #[test]
  fn keeps_multi_token_phrase_at_sentence_start() {
    let mentions = extract_mentions("Kai Media called about their order.");
    assert!(mentions.iter().any(|m| m.text == "Kai Media"));
  }

  #[test]
  fn marks_coreference_pronouns() {
    let mentions = extract_mentions("Remind them about the order.");
    assert!(mentions
      .iter()
      .any(|m| m.requires_coreference && m.text.to_lowercase() == "them"));
  }

  #[test]
  fn deduplicates_case_insensitively() {
    let mentions = extract_mentions("Kai Media emailed. Kai Media called again.");
    assert_eq!(mentions.iter().filter(|m| m.text == "Kai Media").count(), 1);
  }

  #[test]
  fn extracts_dashed_order_code() {
    assert_eq!(extract_order_number("where is SO-1024 in the chain?").as_deref(), Some("SO-1024"));
  }

  #[test]
  fn extracts_bare_order_number_reference() {
    assert_eq!(extract_order_number("can you check order number 4821 for me").as_deref(), Some("4821"));
  }

  #[test]
  fn no_order_number_present() {
    assert_eq!(extract_order_number("their preferred delivery day is Friday"), None);
  }
}
