//! The demonstration grammar: additive arithmetic statements.
//!
//! This module is the one place that knows both vocabularies and every rule.
//! It wires the four engines together for a language of statements like
//! `1 + 2; 3 + 4;`: numbers and the four infix operators, each statement
//! closed by a semicolon. The pipeline round-trips canonically spaced input
//! and normalises everything else to one space between tokens.

use std::fmt;

use crate::codegen::CodeGenerator;
use crate::dispatch::Tagged;
use crate::error::CompileResult;
use crate::parser::Parser;
use crate::tokenizer::{Token, Tokenizer};
use crate::traverser::{Traverser, Visitor};

/// Token vocabulary of the arithmetic language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenClass {
  Number,
  Operator,
  Termination,
}

impl fmt::Display for TokenClass {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      TokenClass::Number => write!(f, "number"),
      TokenClass::Operator => write!(f, "operator"),
      TokenClass::Termination => write!(f, "termination"),
    }
  }
}

/// AST vocabulary of the arithmetic language. The same vocabulary serves as
/// parser output, traverser input and output, and generator input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ast {
  Program(Vec<Ast>),
  NumberLiteral(String),
  Operator(String),
  Terminator,
}

/// Dispatch tags for [`Ast`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AstKind {
  Program,
  NumberLiteral,
  Operator,
  Terminator,
}

impl fmt::Display for AstKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      AstKind::Program => write!(f, "Program"),
      AstKind::NumberLiteral => write!(f, "NumberLiteral"),
      AstKind::Operator => write!(f, "Operator"),
      AstKind::Terminator => write!(f, "Terminator"),
    }
  }
}

impl Tagged for Ast {
  type Tag = AstKind;

  fn tag(&self) -> AstKind {
    match self {
      Ast::Program(_) => AstKind::Program,
      Ast::NumberLiteral(_) => AstKind::NumberLiteral,
      Ast::Operator(_) => AstKind::Operator,
      Ast::Terminator => AstKind::Terminator,
    }
  }
}

/// A tokenizer loaded with the arithmetic token rules.
///
/// Whitespace is registered first so it soaks up separators before the
/// other rules see them; it consumes without pushing a token.
pub fn tokenizer(source: &str) -> Tokenizer<TokenClass> {
  let mut tokenizer = Tokenizer::new(source);

  tokenizer.register("whitespace", |scan| {
    if scan.peek().is_some_and(char::is_whitespace) {
      scan.advance();
      true
    } else {
      false
    }
  });
  tokenizer.register("number", |scan| {
    if scan.peek().is_some_and(|c| c.is_ascii_digit()) {
      let text = scan.take_while(|c| c.is_ascii_digit());
      scan.push(Token::new(TokenClass::Number, text));
      true
    } else {
      false
    }
  });
  tokenizer.register("operator", |scan| {
    if let Some(c @ ('+' | '-' | '*' | '/')) = scan.peek() {
      scan.advance();
      scan.push(Token::new(TokenClass::Operator, c));
      true
    } else {
      false
    }
  });
  tokenizer.register("termination", |scan| {
    if scan.peek() == Some(';') {
      scan.advance();
      scan.push(Token::new(TokenClass::Termination, ";"));
      true
    } else {
      false
    }
  });

  tokenizer
}

/// A parser loaded with the arithmetic parse rules. Statements stay flat:
/// each token becomes one node and sequencing lives in the program body.
pub fn parser(tokens: Vec<Token<TokenClass>>) -> Parser<TokenClass, Ast> {
  let mut parser = Parser::new(tokens);

  parser.register("number", |cursor| {
    if let Some(token) = cursor.peek()
      && token.kind == TokenClass::Number
    {
      let node = Ast::NumberLiteral(token.text.clone());
      cursor.advance();
      Some(node)
    } else {
      None
    }
  });
  parser.register("operator", |cursor| {
    if let Some(token) = cursor.peek()
      && token.kind == TokenClass::Operator
    {
      let node = Ast::Operator(token.text.clone());
      cursor.advance();
      Some(node)
    } else {
      None
    }
  });
  parser.register("termination", |cursor| {
    if let Some(token) = cursor.peek()
      && token.kind == TokenClass::Termination
    {
      cursor.advance();
      Some(Ast::Terminator)
    } else {
      None
    }
  });

  parser
}

/// A traverser loaded with the arithmetic walk. The transformation is an
/// identity copy: enter hooks clone each leaf into the accumulator, the
/// program mechanism recurses into its body and the leaf mechanisms have
/// nothing left to walk.
pub fn traverser(root: Ast) -> Traverser<Ast, Ast> {
  let mut traverser = Traverser::new(root);

  for tag in [AstKind::NumberLiteral, AstKind::Operator, AstKind::Terminator] {
    let copy_leaf =
      Visitor::new().on_enter(|node: &Ast, out: &mut Vec<Ast>| out.push(node.clone()));
    traverser.visitor(tag, copy_leaf);
    traverser.mechanism(tag, |_, _, _| Ok(()));
  }
  traverser.mechanism(AstKind::Program, |node, out, walk| {
    let Ast::Program(body) = node else {
      unreachable!()
    };
    for child in body {
      walk.child(child, out)?;
    }
    Ok(())
  });

  traverser
}

/// A generator loaded with the arithmetic emission rules. Every child of
/// the program is emitted with a trailing space; the tidy hook then pulls
/// separators back off the semicolons and the end of the output.
pub fn generator(root: Ast) -> CodeGenerator<Ast> {
  let mut generator = CodeGenerator::new(root, AstKind::Program);

  generator.register(AstKind::Program, |node, emitter| {
    let Ast::Program(body) = node else {
      unreachable!()
    };
    let mut out = String::new();
    for child in body {
      out.push_str(&emitter.emit(child)?);
      out.push(' ');
    }
    Ok(out)
  });
  generator.register(AstKind::NumberLiteral, |node, _emitter| {
    let Ast::NumberLiteral(text) = node else {
      unreachable!()
    };
    Ok(text.clone())
  });
  generator.register(AstKind::Operator, |node, _emitter| {
    let Ast::Operator(symbol) = node else {
      unreachable!()
    };
    Ok(symbol.clone())
  });
  generator.register(AstKind::Terminator, |_, _emitter| Ok(";".to_string()));
  generator.postprocess(tidy);

  generator
}

/// Collapse the separator before each semicolon and drop the trailing one.
fn tidy(out: &str) -> String {
  let mut cleaned = String::with_capacity(out.len());
  for c in out.chars() {
    if c == ';' && cleaned.ends_with(char::is_whitespace) {
      cleaned.pop();
    }
    cleaned.push(c);
  }
  if cleaned.ends_with(char::is_whitespace) {
    cleaned.pop();
  }
  cleaned
}

/// The arithmetic pipeline, end to end.
#[derive(Debug, Default, Clone, Copy)]
pub struct Compiler;

impl Compiler {
  pub fn new() -> Self {
    Self
  }

  /// Tokenize, parse, traverse and generate in sequence. Each stage gets a
  /// freshly configured engine, so compiling is free of cross-run state.
  pub fn compile(&self, source: &str) -> CompileResult<String> {
    let tokens = tokenizer(source).run()?;
    let nodes = parser(tokens).run()?;
    let transformed = traverser(Ast::Program(nodes)).run()?;
    generator(Ast::Program(transformed)).run()
  }
}
