//! The handler-table core shared by every pipeline stage.
//!
//! Each engine owns one or two [`RuleTable`]s and nothing else decides what
//! the engine does: grammar rules, token classes and emission rules are all
//! registered at runtime by the orchestrator. Insertion order is part of the
//! contract (the tokenizer and parser trial their rules in order), so the
//! table is a plain vector of pairs rather than a hash map.

use std::fmt;
use std::slice;

/// Types that expose a dispatch discriminator.
///
/// AST vocabularies implement this so the traverser and code generator can
/// select a handler without knowing the node shape. The tag is expected to
/// be a small fieldless enum; `Display` supplies the name surfaced by
/// dispatch errors.
pub trait Tagged {
  type Tag: Copy + PartialEq + fmt::Display;

  fn tag(&self) -> Self::Tag;
}

/// An insertion-ordered mapping from a discriminator key to a handler.
///
/// Registering a key that is already present replaces the handler in place
/// and keeps its original position, so re-registration cannot reorder a
/// trial sequence.
pub struct RuleTable<K, H> {
  entries: Vec<(K, H)>,
}

impl<K: PartialEq, H> RuleTable<K, H> {
  pub fn new() -> Self {
    Self {
      entries: Vec::new(),
    }
  }

  /// Add a handler under `key`, or replace the existing one in place.
  pub fn register(&mut self, key: K, handler: H) {
    if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
      entry.1 = handler;
    } else {
      self.entries.push((key, handler));
    }
  }

  /// Look up the handler for `key` by scanning every entry in order.
  /// Returns `None` only after all entries have been tried.
  pub fn find(&self, key: &K) -> Option<&H> {
    self.entries.iter().find(|(k, _)| k == key).map(|(_, h)| h)
  }

  /// Entries in insertion order.
  pub fn iter(&self) -> slice::Iter<'_, (K, H)> {
    self.entries.iter()
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

impl<K: PartialEq, H> Default for RuleTable<K, H> {
  fn default() -> Self {
    Self::new()
  }
}

impl<K: fmt::Debug, H> fmt::Debug for RuleTable<K, H> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_list()
      .entries(self.entries.iter().map(|(k, _)| k))
      .finish()
  }
}
