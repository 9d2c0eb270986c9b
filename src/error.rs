//! Shared error utilities used across the compilation pipeline.
//!
//! Diagnostics are kept lightweight on purpose. The tokenizer is the only
//! stage that still owns the raw source string, so its error points at the
//! offending byte with a caret; the later stages report the discriminator
//! they failed to dispatch on, verbatim, so a misconfigured rule table is
//! easy to spot.

use std::fmt;

use snafu::Snafu;

pub type CompileResult<T> = Result<T, CompileError>;

/// Every way a pipeline stage can fail. All variants are fatal: a failed
/// stage aborts the whole pipeline, there is no partial-result recovery.
#[derive(Debug, Snafu)]
pub enum CompileError {
  /// No tokenizer rule claimed the character at `loc`. An empty rule table
  /// trivially claims nothing, so it surfaces here as well.
  #[snafu(display("{expr_line}\n{marker} unknown character '{ch}'"))]
  UnknownCharacter {
    ch: char,
    loc: usize,
    expr_line: String,
    marker: String,
  },

  /// Every parser rule declined the token at stream index `at`.
  #[snafu(display("no parser rule recognised token '{kind}' (token {at})"))]
  UnrecognizedToken { kind: String, at: usize },

  /// A traversal or emission table had no entry for a node's type once
  /// every registered entry had been tried.
  #[snafu(display("no rule registered for node type '{node_type}'"))]
  UnmatchedNodeType { node_type: String },
}

impl CompileError {
  /// Construct an unknown-character error anchored at a byte offset in the
  /// source, with a caret marker under the offending character.
  pub fn unknown_character(source: &str, loc: usize, ch: char) -> Self {
    let expr_line = format!("'{source}'");
    let safe_loc = loc.min(source.len());
    let char_offset = source[..safe_loc].chars().count() + 1; // account for opening quote
    let marker = format!("{}^", " ".repeat(char_offset));
    Self::UnknownCharacter {
      ch,
      loc,
      expr_line,
      marker,
    }
  }

  pub fn unrecognized_token(kind: impl Into<String>, at: usize) -> Self {
    Self::UnrecognizedToken {
      kind: kind.into(),
      at,
    }
  }

  pub fn unmatched_node_type(node_type: impl fmt::Display) -> Self {
    Self::UnmatchedNodeType {
      node_type: node_type.to_string(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn caret_points_at_offending_character() {
    let err = CompileError::unknown_character("1 # 2", 2, '#');
    let rendered = err.to_string();
    assert_eq!(rendered, "'1 # 2'\n   ^ unknown character '#'");
  }

  #[test]
  fn caret_offset_is_clamped_to_source_length() {
    let err = CompileError::unknown_character("ab", 99, '?');
    let rendered = err.to_string();
    assert!(rendered.contains("unknown character '?'"));
  }

  #[test]
  fn dispatch_errors_name_the_discriminator() {
    let err = CompileError::unrecognized_token("number", 3);
    assert_eq!(err.to_string(), "no parser rule recognised token 'number' (token 3)");

    let err = CompileError::unmatched_node_type("Assignment");
    assert_eq!(err.to_string(), "no rule registered for node type 'Assignment'");
  }
}
