//! Lexical analysis: turns the raw input string into a vector of tokens.
//!
//! The tokenizer engine carries no grammar of its own. Callers register
//! named token rules and `run` trials them, in registration order, against
//! the character at the cursor until one claims it. A rule that matches
//! nothing it wants simply declines and the next rule is tried, so
//! multi-character classes are matched before single-character ones purely
//! by registering them earlier.

use tracing::debug;

use crate::dispatch::RuleTable;
use crate::error::{CompileError, CompileResult};

/// A classified slice of the source, as produced by a token rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<K> {
  pub kind: K,
  pub text: String,
}

impl<K> Token<K> {
  pub fn new(kind: K, text: impl Into<String>) -> Self {
    Self {
      kind,
      text: text.into(),
    }
  }
}

/// Cursor state handed to token rules during a run.
///
/// A rule inspects the character at the cursor with [`peek`](Scan::peek),
/// consumes input with [`advance`](Scan::advance) or
/// [`take_while`](Scan::take_while), and records output with
/// [`push`](Scan::push). Returning `true` from the rule claims whatever was
/// consumed; returning `false` declines the character (a declining rule must
/// not move the cursor).
pub struct Scan<'s, K> {
  source: &'s str,
  cursor: usize,
  tokens: Vec<Token<K>>,
}

impl<'s, K> Scan<'s, K> {
  fn new(source: &'s str) -> Self {
    Self {
      source,
      cursor: 0,
      tokens: Vec::new(),
    }
  }

  /// The character at the cursor, without consuming it.
  pub fn peek(&self) -> Option<char> {
    self.source[self.cursor..].chars().next()
  }

  /// Consume and return the character at the cursor.
  pub fn advance(&mut self) -> Option<char> {
    let ch = self.peek()?;
    self.cursor += ch.len_utf8();
    Some(ch)
  }

  /// Consume the longest run of characters satisfying `pred` and return it
  /// as a slice of the source. The run may be empty.
  pub fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'s str {
    let start = self.cursor;
    while let Some(ch) = self.peek()
      && pred(ch)
    {
      self.cursor += ch.len_utf8();
    }
    &self.source[start..self.cursor]
  }

  /// Append a token to the output stream.
  pub fn push(&mut self, token: Token<K>) {
    self.tokens.push(token);
  }

  /// Byte offset of the cursor into the source.
  pub fn cursor(&self) -> usize {
    self.cursor
  }

  pub fn source(&self) -> &'s str {
    self.source
  }

  /// The unconsumed tail of the source.
  pub fn rest(&self) -> &'s str {
    &self.source[self.cursor..]
  }

  pub fn tokens(&self) -> &[Token<K>] {
    &self.tokens
  }

  pub fn is_done(&self) -> bool {
    self.cursor >= self.source.len()
  }

  fn into_tokens(self) -> Vec<Token<K>> {
    self.tokens
  }
}

/// A registered token rule. Claims the character at the cursor by consuming
/// input and returning `true`, or declines by returning `false`.
pub type TokenRule<K> = Box<dyn Fn(&mut Scan<'_, K>) -> bool>;

/// The tokenizer engine: a source string plus an ordered table of rules.
///
/// Registration mutates the table; `run` borrows the engine immutably, so
/// the rule set is fixed for the duration of a run and the same engine can
/// tokenize repeatedly with identical results.
pub struct Tokenizer<K> {
  source: String,
  rules: RuleTable<String, TokenRule<K>>,
}

impl<K> Tokenizer<K> {
  pub fn new(source: impl Into<String>) -> Self {
    Self {
      source: source.into(),
      rules: RuleTable::new(),
    }
  }

  /// Register `rule` under `name`. Re-registering a name replaces the rule
  /// but keeps its position in the trial order.
  pub fn register(
    &mut self,
    name: impl Into<String>,
    rule: impl Fn(&mut Scan<'_, K>) -> bool + 'static,
  ) {
    self.rules.register(name.into(), Box::new(rule));
  }

  pub fn source(&self) -> &str {
    &self.source
  }

  /// Tokenize the whole source.
  ///
  /// Each round offers the character at the cursor to every rule in
  /// registration order; the first rule to return `true` ends the round.
  /// If no rule claims the character (in particular, if no rules are
  /// registered at all) tokenization fails with an unknown-character error
  /// pointing at it.
  pub fn run(&self) -> CompileResult<Vec<Token<K>>> {
    let mut scan = Scan::new(&self.source);

    while let Some(ch) = scan.peek() {
      let start = scan.cursor();
      let claimed = self.rules.iter().any(|(_, rule)| rule(&mut scan));
      if !claimed {
        return Err(CompileError::unknown_character(&self.source, start, ch));
      }
    }

    debug!(
      tokens = scan.tokens().len(),
      bytes = self.source.len(),
      "tokenized source"
    );
    Ok(scan.into_tokens())
  }
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::*;

  #[derive(Debug, Clone, Copy, PartialEq, Eq)]
  enum Kind {
    Number,
    Operator,
  }

  fn demo_tokenizer(source: &str) -> Tokenizer<Kind> {
    let mut tokenizer = Tokenizer::new(source);
    tokenizer.register("whitespace", |scan: &mut Scan<'_, Kind>| {
      if scan.peek().is_some_and(char::is_whitespace) {
        scan.advance();
        true
      } else {
        false
      }
    });
    tokenizer.register("number", |scan: &mut Scan<'_, Kind>| {
      if scan.peek().is_some_and(|c| c.is_ascii_digit()) {
        let text = scan.take_while(|c| c.is_ascii_digit());
        scan.push(Token::new(Kind::Number, text));
        true
      } else {
        false
      }
    });
    tokenizer.register("operator", |scan: &mut Scan<'_, Kind>| {
      if let Some(c @ ('+' | '-')) = scan.peek() {
        scan.advance();
        scan.push(Token::new(Kind::Operator, c));
        true
      } else {
        false
      }
    });
    tokenizer
  }

  #[test]
  fn rules_claim_characters_in_registration_order() {
    let tokens = demo_tokenizer("12 + 3").run().unwrap();
    assert_eq!(
      tokens,
      vec![
        Token::new(Kind::Number, "12"),
        Token::new(Kind::Operator, "+"),
        Token::new(Kind::Number, "3"),
      ]
    );
  }

  #[test]
  fn unclaimed_character_is_reported_with_a_caret() {
    let err = demo_tokenizer("1 # 2").run().unwrap_err();
    assert_eq!(
      err.to_string(),
      "'1 # 2'\n   ^ unknown character '#'"
    );
  }

  #[test]
  fn whitespace_only_table_cannot_claim_other_characters() {
    let mut tokenizer: Tokenizer<Kind> = Tokenizer::new("#");
    tokenizer.register("whitespace", |scan: &mut Scan<'_, Kind>| {
      if scan.peek().is_some_and(char::is_whitespace) {
        scan.advance();
        true
      } else {
        false
      }
    });

    let err = tokenizer.run().unwrap_err();
    assert!(err.to_string().contains("unknown character '#'"));
  }

  #[test]
  fn empty_rule_table_rejects_the_first_character() {
    let tokenizer: Tokenizer<Kind> = Tokenizer::new("42");
    let err = tokenizer.run().unwrap_err();
    assert!(err.to_string().contains("unknown character '4'"));
  }

  #[test]
  fn empty_source_yields_no_tokens() {
    let tokens = demo_tokenizer("").run().unwrap();
    assert_eq!(tokens, vec![]);
  }

  #[test]
  fn registration_order_decides_between_overlapping_rules() {
    // Both rules want '7'; the one registered first wins every round.
    let mut tokenizer: Tokenizer<Kind> = Tokenizer::new("77");
    tokenizer.register("first", |scan: &mut Scan<'_, Kind>| {
      if scan.peek().is_some_and(|c| c.is_ascii_digit()) {
        scan.advance();
        scan.push(Token::new(Kind::Number, "first"));
        true
      } else {
        false
      }
    });
    tokenizer.register("second", |scan: &mut Scan<'_, Kind>| {
      if scan.peek().is_some_and(|c| c.is_ascii_digit()) {
        scan.advance();
        scan.push(Token::new(Kind::Number, "second"));
        true
      } else {
        false
      }
    });

    let tokens = tokenizer.run().unwrap();
    assert!(tokens.iter().all(|t| t.text == "first"));
  }

  #[test]
  fn rerunning_the_same_engine_is_deterministic() {
    let tokenizer = demo_tokenizer("1 + 2");
    let first = tokenizer.run().unwrap();
    let second = tokenizer.run().unwrap();
    assert_eq!(first, second);
  }
}
