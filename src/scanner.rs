use crate::util::{Code, Log};
use crate::{tokenize, ParseError, RegexTable, Token, TokenizeError};
use once_cell::unsync::OnceCell;

/// A cursor over the token stream which feeds the parser.
///
/// The scanner collects the whole stream up front (including the sentinel
/// EOF token) and skips Space and comment tokens whenever it advances.
#[derive(Debug)]
pub struct Scanner {
    tokens: Vec<Token>,
    index: usize,
    debugger: OnceCell<Log<&'static str>>,
}

impl Scanner {
    pub fn new(source: &str, table: &RegexTable) -> Result<Self, TokenizeError> {
        let code = Code::from(source);
        let mut tokens = Vec::new();
        for result in tokenize(&code, table) {
            tokens.push(result?);
        }
        let mut scanner = Self {
            tokens,
            index: 0,
            debugger: OnceCell::new(),
        };
        scanner.fast_forward();
        Ok(scanner)
    }

    /// Set a log label to debug the token feed.
    pub fn set_log(&self, log: Log<&'static str>) -> Result<(), String> {
        self.debugger
            .set(log)
            .map_err(|err| format!("Log label {} is already assigned.", err))
    }

    /// Skips past whitespace and comments.
    fn fast_forward(&mut self) {
        while self.index < self.tokens.len() && !self.tokens[self.index].kind.is_structural() {
            self.index += 1;
        }
    }

    /// The token the parser is currently looking at. Once the stream is
    /// consumed this keeps returning the EOF token.
    pub fn look_ahead(&self) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[self.index.min(last)]
    }

    /// Match the current token against an optional kind and an optional
    /// value, advancing past it on success.
    pub fn match_token(
        &mut self,
        kind: Option<&str>,
        value: Option<&str>,
    ) -> Result<Token, ParseError> {
        let token = self.look_ahead().clone();
        if token.compatible(kind, value) {
            self.index += 1;
            self.fast_forward();

            #[cfg(debug_assertions)]
            if let Some(log) = self.debugger.get() {
                if log.order() >= Log::Success(()).order() {
                    println!("[{}; TokenMatch]: {}", log, token);
                }
            }

            Ok(token)
        } else {
            let mut message = format!("Token {} did not match against", token);
            if let Some(k) = kind {
                message.push_str(&format!(" type {}", k));
            }
            if let Some(v) = value {
                message.push_str(&format!(" value {}", v));
            }

            #[cfg(debug_assertions)]
            if let Some(log) = self.debugger.get() {
                if log.order() >= Log::Result(()).order() {
                    println!("[{}; TokenMismatch]: {}", log, message);
                }
            }

            Err(ParseError::new(message, Some(token)))
        }
    }

    /// The collected token list, for debugging the lexical phase.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }
}
