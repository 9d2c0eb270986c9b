//! Crate root: wires together the compilation pipeline.
//!
//! The stages are intentionally small and composable so they can be evolved
//! independently:
//! - `tokenizer` trials registered token rules and produces a flat token stream.
//! - `parser` trials registered parse rules and returns a flat node list.
//! - `traverser` walks the AST by tag and accumulates a transformed copy.
//! - `codegen` renders the transformed AST back into a string.
//! - `dispatch` holds the ordered rule table and tag trait the engines share.
//! - `error` centralises reporting utilities shared by the other modules.
//!
//! None of the engines knows a grammar; `arith` registers the demonstration
//! language and chains the four stages.

pub mod arith;
pub mod codegen;
pub mod dispatch;
pub mod error;
pub mod parser;
pub mod tokenizer;
pub mod traverser;

pub use error::{CompileError, CompileResult};

/// Compile an arithmetic source string through the full pipeline.
pub fn compile(source: &str) -> CompileResult<String> {
  arith::Compiler::new().compile(source)
}
