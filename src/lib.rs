//! An interpreter for the Zephyr teaching language, split into a reusable
//! grammar driven front end and a tree-walking back end.
//!
//! # Overview
//! Interpreters for small languages are often written as a fixed, hand coded
//! pipeline where the grammar is buried inside the parser code. This library
//! instead keeps the language definition declarative: the tokenizer is
//! configured from a table of regular expressions ([RegexTable]) and the
//! parser is generated from a BNF grammar ([Grammar]) which is compiled into
//! FIRST / FOLLOW / SELECT sets and an LL(1) parse table. A grammar which is
//! not LL(1) is rejected while building the table, not discovered during a
//! parse.
//!
//! # Design
//! The pipeline has three stages.
//!
//! - [tokenize] streams the source text into [Token]s by attempting every
//!   configured regular expression at the current position and selecting the
//!   longest match, breaking ties by token priority. A [Scanner] collects the
//!   stream and skips whitespace and comments while feeding the parser.
//! - [parse] runs a recursive descent over the token stream, selecting
//!   productions through the parse table, and produces a [TreeNode] syntax
//!   tree. Grammar symbols not marked permanent are pruned from the tree, so
//!   a verbose LL(1) grammar with many helper productions still collapses
//!   into a compact tree the evaluator can pattern match on.
//! - [Interpreter] walks the tree against a [ProgramState]: a symbol table
//!   mapping names to variable cells, which in turn address an append only
//!   value memory with an interned reserved region for small integers and
//!   the booleans. Values dispatch their operators through named hooks with
//!   a reverse operator fallback, so `1 + 1/2` works through the fraction's
//!   reversed addition hook.
//!
//! The built-in Zephyr language definition (grammar and regex table) is
//! embedded in the [lang] module; any other LL(1) grammar can be supplied
//! instead.
//!
//! # Example
//! ```
//! use zephyr::{lang, parse, BufferIo, Interpreter, Scanner};
//!
//! let source = r#"
//! set total to 0
//! for i from 1 to 4 do
//!     set total to total + i
//! end
//! print total
//! "#;
//!
//! let mut scanner = Scanner::new(source, lang::regex_table()).unwrap();
//! let tree = parse(&mut scanner, lang::grammar()).unwrap();
//!
//! let mut io = BufferIo::new();
//! Interpreter::new(&mut io).run(&tree).unwrap();
//! assert_eq!(io.output_string(), "10 \n");
//! ```
//!
//! The same run in one call:
//! ```
//! use zephyr::{lang, BufferIo};
//!
//! let mut io = BufferIo::new();
//! lang::run_source("print 6 * 7", &mut io).unwrap();
//! assert_eq!(io.output_string(), "42 \n");
//! ```

mod ast;
mod error;
mod grammar;
mod interpreter;
pub mod lang;
mod parser;
mod scanner;
mod state;
mod token;
pub mod util;
mod value;

#[cfg(test)]
mod __tests__;

pub use grammar::{FirstSet, Grammar, Production, Symbol, SymbolKind};
pub use interpreter::{BufferIo, Interpreter, StdIo};
pub use parser::parse;
pub use scanner::Scanner;
pub use state::{DeclaredType, ProgramState};
pub use token::{tokenize, RegexTable, Tokens};
pub use util::{Code, Log, Position};
pub use value::{apply_binary, apply_unary, construct, Constructed, TypeName, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// The closed set of token kinds produced by the tokenizer.
///
/// [Space](TokenKind::Space), [SingleComment](TokenKind::SingleComment) and
/// [MultiComment](TokenKind::MultiComment) tokens are emitted but skipped by
/// the [Scanner]; [EOF](TokenKind::EOF) is appended exactly once at end of
/// input.
pub enum TokenKind {
    Symbol,
    Operator,
    EOL,
    Keyword,
    Name,
    Integer,
    Boolean,
    Character,
    String,
    Space,
    SingleComment,
    MultiComment,
    EOF,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Element of the tokenized data: a kind and the matched text.
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub start: usize,
}

#[derive(Debug, Clone)]
/// Syntax tree node produced by the [parse] function.
///
/// A [Transparent](TreeNode::Transparent) node exists only while the tree is
/// being built: adding it to a parent splices its children into the parent
/// instead. Finalized trees consist of [Internal](TreeNode::Internal) and
/// [Leaf](TreeNode::Leaf) nodes only.
pub enum TreeNode {
    Internal { name: String, children: Vec<TreeNode> },
    Leaf { kind: TokenKind, value: String },
    Transparent { children: Vec<TreeNode> },
}

#[derive(Debug, Clone)]
/// The result of evaluating an expression node: either a reference to a
/// variable cell (assignable) or a plain value.
pub enum Entity {
    LValue(usize),
    Value(Value),
}

/// Host input and output used by the [Interpreter].
///
/// `read_line` blocks until a full line is available and returns [None] once
/// the input is exhausted. `write` appends raw bytes to the program output.
pub trait HostIo {
    fn read_line(&mut self) -> Option<String>;
    fn write(&mut self, bytes: &[u8]);
}

#[derive(Debug)]
/// An error returned when no configured regular expression matches the
/// source text at some position.
pub struct TokenizeError {
    pub pointer: usize,
    pub message: String,
}

#[derive(Debug)]
/// An error returned for a defective grammar or regex table: malformed BNF,
/// an undefined symbol, or an LL(1) ambiguity (duplicate parse table entry).
pub struct GrammarError {
    pub message: String,
}

#[derive(Debug)]
/// An error returned when the token stream does not match the grammar.
pub struct ParseError {
    pub message: String,
    pub token: Option<Token>,
}

#[derive(Debug)]
/// An error raised while constructing a built-in value with the wrong number
/// or variant of arguments.
pub struct ConstructorError {
    pub message: String,
}

#[derive(Debug)]
/// An error which terminates the evaluation of a program.
pub struct RuntimeError {
    pub message: String,
}

#[derive(Debug)]
/// An internal invariant failure: a value was expected to implement an
/// abstract operator hook that it did not. Never reaches the user.
pub struct OverrideError {
    pub message: String,
}

#[derive(Debug)]
/// Any of the error kinds a complete source-to-output run can surface.
pub enum InterpretError {
    Tokenize(TokenizeError),
    Parse(ParseError),
    Runtime(RuntimeError),
}
