//! The built-in Zephyr language definition.
//!
//! The language is defined by two embedded artifacts: a BNF grammar
//! ([GRAMMAR_BNF], see `grammar.bnf`) and a token regex table
//! ([TOKEN_REGEXES], see `regexes.txt`). Both are compiled once on first
//! use and are immutable afterwards.
//!
//! Zephyr is a small imperative language: `set x to 5`, `print x`,
//! `inc x`, `input x as Integer`, `while .. do .. end`,
//! `for i from 1 to 10 do .. end` and
//! `if .. then .. elseif .. then .. else .. end`. Expressions nest to the
//! right, one operator per node; `(..)` groups, `name(..)` constructs a
//! built-in type and `name[..]` subscripts or slices.

use crate::{parse, Grammar, HostIo, InterpretError, Interpreter, RegexTable, Scanner};
use once_cell::sync::Lazy;

#[cfg(test)]
mod __tests__;

/// The BNF grammar of the language.
pub const GRAMMAR_BNF: &str = include_str!("grammar.bnf");

/// The token regex table of the language.
pub const TOKEN_REGEXES: &str = include_str!("regexes.txt");

static GRAMMAR: Lazy<Grammar> =
    Lazy::new(|| Grammar::build(GRAMMAR_BNF).expect("the built-in grammar must be LL(1)"));

static REGEX_TABLE: Lazy<RegexTable> =
    Lazy::new(|| RegexTable::parse(TOKEN_REGEXES).expect("the built-in regex table must compile"));

pub fn grammar() -> &'static Grammar {
    &GRAMMAR
}

pub fn regex_table() -> &'static RegexTable {
    &REGEX_TABLE
}

/// Tokenize, parse and run a Zephyr source text against the given host.
pub fn run_source(source: &str, io: &mut dyn HostIo) -> Result<(), InterpretError> {
    let mut scanner = Scanner::new(source, regex_table())?;
    let tree = parse(&mut scanner, grammar())?;
    Interpreter::new(io).run(&tree)?;
    Ok(())
}

/// Like [run_source], but with a reproducible `random` stream.
pub fn run_source_with_seed(
    source: &str,
    io: &mut dyn HostIo,
    seed: u64,
) -> Result<(), InterpretError> {
    let mut scanner = Scanner::new(source, regex_table())?;
    let tree = parse(&mut scanner, grammar())?;
    Interpreter::with_seed(io, seed).run(&tree)?;
    Ok(())
}
