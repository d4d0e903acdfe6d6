use crate::util::Code;
use crate::{GrammarError, Token, TokenKind, TokenizeError};
use regex::Regex;
use std::fmt::{Display, Formatter};

impl TokenKind {
    /// The display name of the kind, as it appears in regex table files and
    /// in leaf nodes of the syntax tree.
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::Symbol => "Symbol",
            TokenKind::Operator => "Operator",
            TokenKind::EOL => "EOL",
            TokenKind::Keyword => "Keyword",
            TokenKind::Name => "Name",
            TokenKind::Integer => "Integer",
            TokenKind::Boolean => "Boolean",
            TokenKind::Character => "Character",
            TokenKind::String => "String",
            TokenKind::Space => "Space",
            TokenKind::SingleComment => "SingleComment",
            TokenKind::MultiComment => "MultiComment",
            TokenKind::EOF => "EOF",
            TokenKind::Unknown => "Unknown",
        }
    }

    /// The lowercase name used by terminal symbols in BNF grammars.
    pub fn bnf_name(&self) -> &'static str {
        match self {
            TokenKind::Symbol => "symbol",
            TokenKind::Operator => "operator",
            TokenKind::EOL => "eol",
            TokenKind::Keyword => "keyword",
            TokenKind::Name => "name",
            TokenKind::Integer => "integer",
            TokenKind::Boolean => "boolean",
            TokenKind::Character => "character",
            TokenKind::String => "string",
            TokenKind::Space => "space",
            TokenKind::SingleComment => "singlecomment",
            TokenKind::MultiComment => "multicomment",
            TokenKind::EOF => "eof",
            TokenKind::Unknown => "unknown",
        }
    }

    pub fn from_bnf_name(name: &str) -> Option<TokenKind> {
        let kind = match name {
            "symbol" => TokenKind::Symbol,
            "operator" => TokenKind::Operator,
            "eol" => TokenKind::EOL,
            "keyword" => TokenKind::Keyword,
            "name" => TokenKind::Name,
            "integer" => TokenKind::Integer,
            "boolean" => TokenKind::Boolean,
            "character" => TokenKind::Character,
            "string" => TokenKind::String,
            "space" => TokenKind::Space,
            "singlecomment" => TokenKind::SingleComment,
            "multicomment" => TokenKind::MultiComment,
            "eof" => TokenKind::EOF,
            "unknown" => TokenKind::Unknown,
            _ => return None,
        };
        Some(kind)
    }

    pub fn from_table_name(name: &str) -> Option<TokenKind> {
        let kind = match name {
            "Symbol" => TokenKind::Symbol,
            "Operator" => TokenKind::Operator,
            "EOL" => TokenKind::EOL,
            "Keyword" => TokenKind::Keyword,
            "Name" => TokenKind::Name,
            "Integer" => TokenKind::Integer,
            "Boolean" => TokenKind::Boolean,
            "Character" => TokenKind::Character,
            "String" => TokenKind::String,
            "Space" => TokenKind::Space,
            "SingleComment" => TokenKind::SingleComment,
            "MultiComment" => TokenKind::MultiComment,
            "EOF" => TokenKind::EOF,
            "Unknown" => TokenKind::Unknown,
            _ => return None,
        };
        Some(kind)
    }

    /// Tiebreak weight when two kinds match the same span. Name must lose
    /// against keywords, operators and booleans of the same length; Unknown
    /// is a catch-all and must lose against everything.
    pub fn priority(&self) -> i8 {
        match self {
            TokenKind::Name => 0,
            TokenKind::Unknown => -1,
            _ => 1,
        }
    }

    /// Whether the scanner should skip tokens of this kind.
    pub fn is_structural(&self) -> bool {
        !matches!(
            self,
            TokenKind::Space | TokenKind::SingleComment | TokenKind::MultiComment
        )
    }
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, start: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            start,
        }
    }

    /// Whether the token kind matches the given BNF terminal name.
    pub fn has_kind(&self, bnf_name: &str) -> bool {
        self.kind.bnf_name() == bnf_name
    }

    pub fn has_value(&self, value: &str) -> bool {
        self.text == value
    }

    /// Check the token against an optional kind and an optional value; both
    /// predicates must agree when both are given.
    pub fn compatible(&self, kind: Option<&str>, value: Option<&str>) -> bool {
        if let Some(k) = kind {
            if !self.has_kind(k) {
                return false;
            }
        }
        if let Some(v) = value {
            if !self.has_value(v) {
                return false;
            }
        }
        true
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "<{}:'{}'>", self.kind.name(), self.text)
    }
}

/// A table mapping token kinds to compiled regular expressions, loaded from
/// a line oriented definition file.
///
/// Lines beginning with `#` are comments; other nonempty lines have the form
/// `Name ::= regex`. Each regex is compiled in multiline mode and anchored,
/// so it only ever matches at the position the tokenizer is currently
/// looking at.
pub struct RegexTable {
    entries: Vec<(TokenKind, String, Regex)>,
}

impl RegexTable {
    pub fn parse(definition: &str) -> Result<RegexTable, GrammarError> {
        let mut entries: Vec<(TokenKind, String, Regex)> = Vec::new();
        for line in definition.lines() {
            if line.starts_with('#') || line.trim().is_empty() {
                continue;
            }
            let (name, pattern) = match line.split_once("::=") {
                Some((name, pattern)) => (name.trim(), pattern.trim()),
                None => {
                    return Err(GrammarError::new(format!(
                        "malformed regex table line: {}",
                        line
                    )))
                }
            };
            let kind = match TokenKind::from_table_name(name) {
                Some(kind) => kind,
                None => {
                    return Err(GrammarError::new(format!(
                        "no token kind named {}",
                        name
                    )))
                }
            };
            let regex = Regex::new(&format!(r"(?m)\A(?:{})", pattern)).map_err(|err| {
                GrammarError::new(format!("invalid regex for {}: {}", name, err))
            })?;
            if regex.is_match("") {
                return Err(GrammarError::new(format!(
                    "regex for {} must not match the empty string",
                    name
                )));
            }
            entries.push((kind, pattern.to_string(), regex));
        }
        Ok(RegexTable { entries })
    }

    pub(crate) fn entries(&self) -> impl Iterator<Item = (TokenKind, &Regex)> {
        self.entries.iter().map(|(kind, _, regex)| (*kind, regex))
    }
}

impl Display for RegexTable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (kind, pattern, _) in &self.entries {
            writeln!(f, "{} ::= {}", kind.name(), pattern)?;
        }
        Ok(())
    }
}

/// A lazy token stream over the source text.
///
/// At every position each configured regex is attempted; the match with the
/// greatest end position wins, ties are broken by the higher kind priority.
/// A sentinel [EOF](TokenKind::EOF) token is produced exactly once at end of
/// input. If nothing matches, the iterator yields a [TokenizeError] carrying
/// the unmatched rest of the line and fuses.
pub struct Tokens<'c> {
    code: &'c Code<'c>,
    table: &'c RegexTable,
    pointer: usize,
    done: bool,
}

/// Stream the source text into a sequence of tokens.
pub fn tokenize<'c>(code: &'c Code<'c>, table: &'c RegexTable) -> Tokens<'c> {
    Tokens {
        code,
        table,
        pointer: 0,
        done: false,
    }
}

impl<'c> Iterator for Tokens<'c> {
    type Item = Result<Token, TokenizeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if self.pointer >= self.code.value.len() {
            self.done = true;
            return Some(Ok(Token::new(TokenKind::EOF, "", self.pointer)));
        }
        let tail = &self.code.value[self.pointer..];
        let mut longest: Option<(TokenKind, usize)> = None;
        for (kind, regex) in self.table.entries() {
            if let Some(m) = regex.find(tail) {
                debug_assert_eq!(m.start(), 0);
                if m.end() == 0 {
                    continue;
                }
                let better = match longest {
                    None => true,
                    Some((best_kind, best_end)) => {
                        m.end() > best_end
                            || (m.end() == best_end && kind.priority() > best_kind.priority())
                    }
                };
                if better {
                    longest = Some((kind, m.end()));
                }
            }
        }
        match longest {
            Some((kind, end)) => {
                let token = Token::new(kind, &tail[..end], self.pointer);
                self.pointer += end;
                Some(Ok(token))
            }
            None => {
                self.done = true;
                let rest_of_line = tail.split('\n').next().unwrap_or(tail);
                let position = self.code.obtain_position(self.pointer);
                Some(Err(TokenizeError::new(
                    self.pointer,
                    format!("could not match '{}' at {}", rest_of_line, position),
                )))
            }
        }
    }
}
