use crate::{
    ConstructorError, GrammarError, InterpretError, OverrideError, ParseError, RuntimeError,
    Token, TokenizeError,
};
use std::fmt::{Display, Formatter};

impl TokenizeError {
    pub fn new(pointer: usize, message: String) -> Self {
        Self { pointer, message }
    }
}

impl Display for TokenizeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "TokenizeError: {}", self.message)
    }
}

impl GrammarError {
    pub fn new(message: String) -> Self {
        Self { message }
    }
}

impl Display for GrammarError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "GrammarError: {}", self.message)
    }
}

impl ParseError {
    pub fn new(message: String, token: Option<Token>) -> Self {
        Self { message, token }
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "SyntaxError: {}", self.message)
    }
}

impl ConstructorError {
    /// Build the standard "constructor expected X; given Y" report.
    pub fn new(class_name: &str, expected: &str, given: &str) -> Self {
        Self {
            message: format!(
                "{} constructor expected {}; given {}",
                class_name, expected, given
            ),
        }
    }
}

impl Display for ConstructorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl RuntimeError {
    pub fn new(message: String) -> Self {
        Self { message }
    }
}

impl Display for RuntimeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "RuntimeError: {}", self.message)
    }
}

impl OverrideError {
    pub fn new(class_name: &str, hook_name: &str) -> Self {
        Self {
            message: format!(
                "Failed to override abstract operator hook {} of {}",
                hook_name, class_name
            ),
        }
    }
}

impl Display for OverrideError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl From<OverrideError> for RuntimeError {
    fn from(err: OverrideError) -> Self {
        RuntimeError::new(err.message)
    }
}

impl From<TokenizeError> for InterpretError {
    fn from(err: TokenizeError) -> Self {
        InterpretError::Tokenize(err)
    }
}

impl From<ParseError> for InterpretError {
    fn from(err: ParseError) -> Self {
        InterpretError::Parse(err)
    }
}

impl From<RuntimeError> for InterpretError {
    fn from(err: RuntimeError) -> Self {
        InterpretError::Runtime(err)
    }
}

impl Display for InterpretError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            InterpretError::Tokenize(err) => write!(f, "{}", err),
            InterpretError::Parse(err) => write!(f, "{}", err),
            InterpretError::Runtime(err) => write!(f, "{}", err),
        }
    }
}
