//! Syntactic analysis: turns the token stream into a flat list of AST nodes.
//!
//! Like the tokenizer, the parser engine owns no grammar. Callers register
//! named parse rules and `run` offers the cursor to each rule in
//! registration order; a rule either consumes tokens and returns a node, or
//! declines with `None`. The engine rewinds the cursor after every decline,
//! so rules are free to look arbitrarily far ahead before giving up.

use std::fmt;

use tracing::debug;

use crate::dispatch::RuleTable;
use crate::error::{CompileError, CompileResult};
use crate::tokenizer::Token;

/// Cursor state handed to parse rules during a run.
pub struct TokenCursor<'t, K> {
  tokens: &'t [Token<K>],
  pos: usize,
}

impl<'t, K> TokenCursor<'t, K> {
  fn new(tokens: &'t [Token<K>]) -> Self {
    Self {
      tokens,
      pos: 0,
    }
  }

  /// The token at the cursor, without consuming it.
  pub fn peek(&self) -> Option<&'t Token<K>> {
    self.tokens.get(self.pos)
  }

  /// Consume and return the token at the cursor.
  pub fn advance(&mut self) -> Option<&'t Token<K>> {
    let token = self.tokens.get(self.pos)?;
    self.pos += 1;
    Some(token)
  }

  /// Index of the cursor into the token stream.
  pub fn pos(&self) -> usize {
    self.pos
  }

  pub fn tokens(&self) -> &'t [Token<K>] {
    self.tokens
  }

  pub fn is_done(&self) -> bool {
    self.pos >= self.tokens.len()
  }

  fn rewind(&mut self, pos: usize) {
    self.pos = pos;
  }
}

/// A registered parse rule. Consumes tokens and returns a node, or declines
/// with `None`. A declining rule may leave the cursor wherever it likes;
/// the engine rewinds before trying the next rule.
pub type ParseRule<K, N> = Box<dyn Fn(&mut TokenCursor<'_, K>) -> Option<N>>;

/// The parser engine: a token stream plus an ordered table of rules.
///
/// `run` repeatedly dispatches on the token at the cursor until the stream
/// is exhausted. The grammar must account for every token kind it will be
/// fed; a token no rule accepts is a hard error rather than a silent skip.
pub struct Parser<K, N> {
  tokens: Vec<Token<K>>,
  rules: RuleTable<String, ParseRule<K, N>>,
}

impl<K: fmt::Display, N> Parser<K, N> {
  pub fn new(tokens: Vec<Token<K>>) -> Self {
    Self {
      tokens,
      rules: RuleTable::new(),
    }
  }

  /// Register `rule` under `name`. Re-registering a name replaces the rule
  /// but keeps its position in the trial order.
  pub fn register(
    &mut self,
    name: impl Into<String>,
    rule: impl Fn(&mut TokenCursor<'_, K>) -> Option<N> + 'static,
  ) {
    self.rules.register(name.into(), Box::new(rule));
  }

  pub fn tokens(&self) -> &[Token<K>] {
    &self.tokens
  }

  /// A fresh cursor over the engine's token stream, for step-wise parsing.
  pub fn cursor(&self) -> TokenCursor<'_, K> {
    TokenCursor::new(&self.tokens)
  }

  /// Parse the whole token stream into a node list.
  pub fn run(&self) -> CompileResult<Vec<N>> {
    let mut cursor = self.cursor();
    let mut nodes = Vec::new();

    while !cursor.is_done() {
      nodes.push(self.step(&mut cursor)?);
    }

    debug!(
      nodes = nodes.len(),
      tokens = self.tokens.len(),
      "parsed token stream"
    );
    Ok(nodes)
  }

  /// Produce the next node by trialling every rule at the current position.
  pub fn step(&self, cursor: &mut TokenCursor<'_, K>) -> CompileResult<N> {
    let checkpoint = cursor.pos();

    for (_, rule) in self.rules.iter() {
      if let Some(node) = rule(cursor) {
        return Ok(node);
      }
      cursor.rewind(checkpoint);
    }

    let kind = match cursor.peek() {
      Some(token) => token.kind.to_string(),
      None => "EOF".to_string(),
    };
    Err(CompileError::unrecognized_token(kind, checkpoint))
  }
}
