//! Tree traversal: walks the AST and accumulates a transformed node list.
//!
//! The traverser engine dispatches on node tags rather than trialling rules:
//! every node must have a registered mechanism describing how to walk it,
//! while visitors (enter/exit hooks on a tag) are optional and carry the
//! actual transformation. Handlers never share hidden state; each one
//! receives the node, the output accumulator for the current level and a
//! [`Walk`] handle for recursing into children.

use tracing::{debug, trace};

use crate::dispatch::{RuleTable, Tagged};
use crate::error::{CompileError, CompileResult};

/// An enter or exit hook. Hooks observe the node and may append to the
/// accumulator of the level the node is being written into.
pub type VisitFn<N, M> = Box<dyn Fn(&N, &mut Vec<M>)>;

/// Optional enter/exit hooks for one node tag.
pub struct Visitor<N, M> {
  pub enter: Option<VisitFn<N, M>>,
  pub exit: Option<VisitFn<N, M>>,
}

impl<N, M> Visitor<N, M> {
  pub fn new() -> Self {
    Self {
      enter: None,
      exit: None,
    }
  }

  pub fn on_enter(mut self, hook: impl Fn(&N, &mut Vec<M>) + 'static) -> Self {
    self.enter = Some(Box::new(hook));
    self
  }

  pub fn on_exit(mut self, hook: impl Fn(&N, &mut Vec<M>) + 'static) -> Self {
    self.exit = Some(Box::new(hook));
    self
  }
}

impl<N, M> Default for Visitor<N, M> {
  fn default() -> Self {
    Self::new()
  }
}

/// How to walk one node tag: typically a loop over the node's children,
/// recursing through the [`Walk`] handle into whichever accumulator the
/// children should land in.
pub type Mechanism<N, M> = Box<dyn Fn(&N, &mut Vec<M>, Walk<'_, N, M>) -> CompileResult<()>>;

/// Recursion handle passed to mechanisms.
pub struct Walk<'a, N: Tagged, M> {
  engine: &'a Traverser<N, M>,
}

impl<N: Tagged, M> Walk<'_, N, M> {
  /// Visit `node` as a child, appending its output to `out`.
  pub fn child(&self, node: &N, out: &mut Vec<M>) -> CompileResult<()> {
    self.engine.visit_node(node, out)
  }
}

/// The traversal engine: a root node plus tag-indexed visitor and mechanism
/// tables.
pub struct Traverser<N: Tagged, M> {
  root: N,
  visitors: RuleTable<N::Tag, Visitor<N, M>>,
  mechanisms: RuleTable<N::Tag, Mechanism<N, M>>,
}

impl<N: Tagged, M> Traverser<N, M> {
  pub fn new(root: N) -> Self {
    Self {
      root,
      visitors: RuleTable::new(),
      mechanisms: RuleTable::new(),
    }
  }

  /// Attach enter/exit hooks to `tag`, replacing any previous visitor.
  pub fn visitor(&mut self, tag: N::Tag, visitor: Visitor<N, M>) {
    self.visitors.register(tag, visitor);
  }

  /// Register the walking mechanism for `tag`.
  pub fn mechanism(
    &mut self,
    tag: N::Tag,
    mechanism: impl Fn(&N, &mut Vec<M>, Walk<'_, N, M>) -> CompileResult<()> + 'static,
  ) {
    self.mechanisms.register(tag, Box::new(mechanism));
  }

  pub fn root(&self) -> &N {
    &self.root
  }

  /// Walk the tree from the root and return the top-level accumulator.
  pub fn run(&self) -> CompileResult<Vec<M>> {
    let mut body = Vec::new();
    self.visit_node(&self.root, &mut body)?;
    debug!(produced = body.len(), "traversed tree");
    Ok(body)
  }

  /// Enter hook, mechanism, exit hook. A node whose tag has no mechanism
  /// stops the traversal; visitors alone cannot walk a node.
  fn visit_node(&self, node: &N, out: &mut Vec<M>) -> CompileResult<()> {
    let tag = node.tag();
    let visitor = self.visitors.find(&tag);

    if let Some(enter) = visitor.and_then(|v| v.enter.as_ref()) {
      enter(node, out);
    }

    let Some(mechanism) = self.mechanisms.find(&tag) else {
      return Err(CompileError::unmatched_node_type(tag));
    };
    mechanism(node, out, Walk { engine: self })?;

    if let Some(exit) = visitor.and_then(|v| v.exit.as_ref()) {
      exit(node, out);
    }

    trace!(%tag, "visited node");
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use std::cell::RefCell;
  use std::fmt;
  use std::rc::Rc;

  use pretty_assertions::assert_eq;

  use super::*;

  #[derive(Debug, Clone, PartialEq, Eq)]
  enum Tree {
    Branch(Vec<Tree>),
    Leaf(String),
  }

  #[derive(Debug, Clone, Copy, PartialEq, Eq)]
  enum TreeKind {
    Branch,
    Leaf,
  }

  impl fmt::Display for TreeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      match self {
        TreeKind::Branch => write!(f, "branch"),
        TreeKind::Leaf => write!(f, "leaf"),
      }
    }
  }

  impl Tagged for Tree {
    type Tag = TreeKind;

    fn tag(&self) -> TreeKind {
      match self {
        Tree::Branch(_) => TreeKind::Branch,
        Tree::Leaf(_) => TreeKind::Leaf,
      }
    }
  }

  fn sample_tree() -> Tree {
    Tree::Branch(vec![
      Tree::Leaf("a".to_string()),
      Tree::Leaf("b".to_string()),
    ])
  }

  #[test]
  fn mechanisms_rebuild_a_nested_tree() {
    let mut traverser: Traverser<Tree, Tree> = Traverser::new(sample_tree());
    traverser.mechanism(TreeKind::Branch, |node, out, walk| {
      let Tree::Branch(children) = node else {
        unreachable!()
      };
      let mut inner = Vec::new();
      for child in children {
        walk.child(child, &mut inner)?;
      }
      out.push(Tree::Branch(inner));
      Ok(())
    });
    traverser.mechanism(TreeKind::Leaf, |node, out, _walk| {
      out.push(node.clone());
      Ok(())
    });

    let body = traverser.run().unwrap();
    assert_eq!(body, vec![sample_tree()]);
  }

  #[test]
  fn enter_and_exit_hooks_wrap_the_mechanism() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut traverser: Traverser<Tree, Tree> =
      Traverser::new(Tree::Branch(vec![Tree::Leaf("a".to_string())]));

    for (tag, name) in [(TreeKind::Branch, "branch"), (TreeKind::Leaf, "leaf")] {
      let enter_log = Rc::clone(&log);
      let exit_log = Rc::clone(&log);
      traverser.visitor(
        tag,
        Visitor::new()
          .on_enter(move |_, _| enter_log.borrow_mut().push(format!("enter {name}")))
          .on_exit(move |_, _| exit_log.borrow_mut().push(format!("exit {name}"))),
      );
    }
    traverser.mechanism(TreeKind::Branch, |node, out, walk| {
      let Tree::Branch(children) = node else {
        unreachable!()
      };
      for child in children {
        walk.child(child, out)?;
      }
      Ok(())
    });
    traverser.mechanism(TreeKind::Leaf, |_, _, _| Ok(()));

    traverser.run().unwrap();
    assert_eq!(
      *log.borrow(),
      vec!["enter branch", "enter leaf", "exit leaf", "exit branch"]
    );
  }

  #[test]
  fn node_without_a_mechanism_stops_the_walk() {
    let mut traverser: Traverser<Tree, Tree> = Traverser::new(sample_tree());
    traverser.mechanism(TreeKind::Branch, |node, out, walk| {
      let Tree::Branch(children) = node else {
        unreachable!()
      };
      for child in children {
        walk.child(child, out)?;
      }
      Ok(())
    });

    let err = traverser.run().unwrap_err();
    assert_eq!(err.to_string(), "no rule registered for node type 'leaf'");
  }

  #[test]
  fn visitors_are_optional() {
    let mut traverser: Traverser<Tree, Tree> = Traverser::new(Tree::Leaf("x".to_string()));
    traverser.mechanism(TreeKind::Leaf, |node, out, _walk| {
      out.push(node.clone());
      Ok(())
    });

    assert_eq!(traverser.run().unwrap(), vec![Tree::Leaf("x".to_string())]);
  }

  #[test]
  fn output_vocabulary_may_differ_from_the_input() {
    let mut traverser: Traverser<Tree, String> = Traverser::new(sample_tree());
    traverser.mechanism(TreeKind::Branch, |node, out, walk| {
      let Tree::Branch(children) = node else {
        unreachable!()
      };
      for child in children {
        walk.child(child, out)?;
      }
      Ok(())
    });
    traverser.mechanism(TreeKind::Leaf, |node, out, _walk| {
      let Tree::Leaf(text) = node else {
        unreachable!()
      };
      out.push(text.clone());
      Ok(())
    });

    let body = traverser.run().unwrap();
    assert_eq!(body, vec!["a".to_string(), "b".to_string()]);
  }
}
