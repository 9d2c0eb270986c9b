//! Code generation: lower the transformed AST back into a string.
//!
//! The generator engine dispatches on node tags, like the traverser, but its
//! rules return strings instead of appending nodes: a rule renders its node,
//! recursing through the [`Emitter`] handle for children, and the engine
//! concatenates nothing itself. An optional post-processing hook runs once
//! over the output of the entry node, so rules can emit with uniform
//! separators and leave the final tidy-up in one place.

use tracing::{debug, trace};

use crate::dispatch::{RuleTable, Tagged};
use crate::error::{CompileError, CompileResult};

/// A registered emission rule: render one node to a string, recursing into
/// children through the [`Emitter`] handle.
pub type EmitRule<N> = Box<dyn Fn(&N, Emitter<'_, N>) -> CompileResult<String>>;

/// Post-processing hook applied to the entry node's output.
pub type PostprocessFn = Box<dyn Fn(&str) -> String>;

/// Recursion handle passed to emission rules.
pub struct Emitter<'a, N: Tagged> {
  engine: &'a CodeGenerator<N>,
}

impl<N: Tagged> Emitter<'_, N> {
  /// Render `node` with whichever rule its tag selects.
  pub fn emit(&self, node: &N) -> CompileResult<String> {
    self.engine.emit_node(node)
  }
}

/// The generation engine: a root node, the entry tag and a tag-indexed rule
/// table.
///
/// `run` borrows the engine immutably and builds a fresh string each time,
/// so generating twice from the same engine yields identical output.
pub struct CodeGenerator<N: Tagged> {
  root: N,
  entry: N::Tag,
  rules: RuleTable<N::Tag, EmitRule<N>>,
  post: Option<PostprocessFn>,
}

impl<N: Tagged> CodeGenerator<N> {
  /// Create a generator for `root`. `entry` names the tag whose output the
  /// post-processing hook applies to, normally the tag of the root itself.
  pub fn new(root: N, entry: N::Tag) -> Self {
    Self {
      root,
      entry,
      rules: RuleTable::new(),
      post: None,
    }
  }

  /// Register the emission rule for `tag`.
  pub fn register(
    &mut self,
    tag: N::Tag,
    rule: impl Fn(&N, Emitter<'_, N>) -> CompileResult<String> + 'static,
  ) {
    self.rules.register(tag, Box::new(rule));
  }

  /// Install the hook applied to the entry node's rendered output.
  pub fn postprocess(&mut self, hook: impl Fn(&str) -> String + 'static) {
    self.post = Some(Box::new(hook));
  }

  pub fn root(&self) -> &N {
    &self.root
  }

  /// Render the tree from the root.
  pub fn run(&self) -> CompileResult<String> {
    let raw = self.emit_node(&self.root)?;
    let output = if self.root.tag() == self.entry
      && let Some(hook) = self.post.as_ref()
    {
      hook(&raw)
    } else {
      raw
    };

    debug!(bytes = output.len(), "generated output");
    Ok(output)
  }

  fn emit_node(&self, node: &N) -> CompileResult<String> {
    let tag = node.tag();
    let Some(rule) = self.rules.find(&tag) else {
      return Err(CompileError::unmatched_node_type(tag));
    };
    trace!(%tag, "emitting node");
    rule(node, Emitter { engine: self })
  }
}
