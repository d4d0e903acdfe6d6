use crate::{GrammarError, ParseError, Token, TokenKind};
use std::collections::{HashMap, HashSet};
use std::fmt::{Display, Formatter, Write};
use std::hash::{Hash, Hasher};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// The three kinds of grammar symbol.
pub enum SymbolKind {
    /// Identified by name; must have at least one production.
    Nonterminal,
    /// Matches a token by its kind.
    Terminal,
    /// Matches a token by its text.
    Literal,
}

#[derive(Debug, Clone)]
/// A grammar symbol. The `permanent` flag controls whether the symbol is
/// retained in the syntax tree; it takes no part in symbol equality.
pub struct Symbol {
    pub kind: SymbolKind,
    pub value: String,
    pub permanent: bool,
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.value == other.value
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        self.value.hash(state);
    }
}

impl Symbol {
    pub fn nonterminal(value: impl Into<String>) -> Self {
        Self {
            kind: SymbolKind::Nonterminal,
            value: value.into(),
            permanent: false,
        }
    }

    pub fn terminal(value: impl Into<String>) -> Self {
        Self {
            kind: SymbolKind::Terminal,
            value: value.into(),
            permanent: false,
        }
    }

    pub fn literal(value: impl Into<String>) -> Self {
        Self {
            kind: SymbolKind::Literal,
            value: value.into(),
            permanent: false,
        }
    }

    pub fn permanent(mut self) -> Self {
        self.permanent = true;
        self
    }

    /// Whether a token satisfies this symbol: terminals match the token
    /// kind, literals match the token text.
    pub fn matches(&self, token: &Token) -> bool {
        match self.kind {
            SymbolKind::Terminal => token.has_kind(&self.value),
            SymbolKind::Literal => token.has_value(&self.value),
            SymbolKind::Nonterminal => false,
        }
    }

    /// Parse one whitespace delimited symbol spec from a BNF file: `name`
    /// for a nonterminal, `<name>` for a terminal, `"text"` for a literal,
    /// `""` for epsilon (returned as [None]), with an optional leading `@`
    /// marking the symbol permanent.
    fn parse_spec(spec: &str) -> Result<Option<Symbol>, GrammarError> {
        let (body, permanent) = match spec.strip_prefix('@') {
            Some(rest) => (rest, true),
            None => (spec, false),
        };
        if body == "\"\"" {
            return Ok(None);
        }
        let symbol = if let Some(inner) = body.strip_prefix('"') {
            match inner.strip_suffix('"') {
                Some(text) if !text.is_empty() => Symbol {
                    kind: SymbolKind::Literal,
                    value: text.to_string(),
                    permanent,
                },
                _ => {
                    return Err(GrammarError::new(format!(
                        "malformed literal symbol spec: {}",
                        spec
                    )))
                }
            }
        } else if let Some(inner) = body.strip_prefix('<') {
            match inner.strip_suffix('>') {
                Some(name) if !name.is_empty() => Symbol {
                    kind: SymbolKind::Terminal,
                    value: name.to_string(),
                    permanent,
                },
                _ => {
                    return Err(GrammarError::new(format!(
                        "malformed terminal symbol spec: {}",
                        spec
                    )))
                }
            }
        } else if body.is_empty() {
            return Err(GrammarError::new(format!(
                "malformed symbol spec: {}",
                spec
            )));
        } else {
            Symbol {
                kind: SymbolKind::Nonterminal,
                value: body.to_string(),
                permanent,
            }
        };
        Ok(Some(symbol))
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            SymbolKind::Nonterminal => write!(f, "{}", self.value),
            SymbolKind::Terminal => write!(f, "<{}>", self.value),
            SymbolKind::Literal => write!(f, "\"{}\"", self.value),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
/// The set of terminals and literals which can begin a derivation, plus a
/// marker for the empty derivation.
pub struct FirstSet {
    symbols: HashSet<Symbol>,
    epsilon: bool,
}

impl FirstSet {
    fn singleton(symbol: Symbol) -> Self {
        let mut symbols = HashSet::new();
        symbols.insert(symbol);
        Self {
            symbols,
            epsilon: false,
        }
    }

    pub fn symbols(&self) -> &HashSet<Symbol> {
        &self.symbols
    }

    pub fn contains_epsilon(&self) -> bool {
        self.epsilon
    }
}

#[derive(Debug, Clone)]
/// One production: a left-hand nonterminal and a right-hand sequence of
/// symbols. An empty right-hand side is the epsilon production.
pub struct Production {
    nonterm: Symbol,
    rhs: Vec<Symbol>,
}

impl Production {
    pub fn nonterm(&self) -> &Symbol {
        &self.nonterm
    }

    pub fn rhs(&self) -> &[Symbol] {
        &self.rhs
    }
}

impl Display for Production {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ::=", self.nonterm)?;
        if self.rhs.is_empty() {
            write!(f, " \"\"")?;
        }
        for item in &self.rhs {
            write!(f, " {}", item)?;
        }
        Ok(())
    }
}

/// A validated grammar: an ordered list of productions, the FIRST / FOLLOW
/// / SELECT sets computed over them and the LL(1) parse table.
///
/// Building a grammar fails with a [GrammarError] when the BNF source is
/// malformed, a referenced nonterminal or token kind does not exist, or two
/// productions of the same nonterminal claim the same lookahead (the
/// grammar is not LL(1)).
#[derive(Debug)]
pub struct Grammar {
    productions: Vec<Production>,
    nonterms: Vec<Symbol>,
    prod_spans: HashMap<String, (usize, usize)>,
    start_symbol: String,
    first_sets: HashMap<String, FirstSet>,
    follow_sets: HashMap<String, HashSet<Symbol>>,
    select_sets: Vec<HashSet<Symbol>>,
    parse_table: HashMap<(String, Symbol), usize>,
}

impl Grammar {
    /// Build a grammar from BNF source. The first left-hand side in the
    /// source is the start nonterminal.
    pub fn build(bnf: &str) -> Result<Grammar, GrammarError> {
        Grammar::build_with_start(bnf, None)
    }

    /// Build a grammar with an explicitly designated start nonterminal.
    pub fn build_with_start(bnf: &str, start: Option<&str>) -> Result<Grammar, GrammarError> {
        let mut productions: Vec<Production> = Vec::new();
        let mut nonterms: Vec<Symbol> = Vec::new();
        let mut prod_spans: HashMap<String, (usize, usize)> = HashMap::new();
        let mut current: Option<Symbol> = None;
        let mut span_start = 0;

        for line in bnf.lines() {
            // lines without a definition marker are comments
            let (lhs, rhs) = match line.split_once("::=") {
                Some((lhs, rhs)) => (lhs.trim(), rhs.trim()),
                None => continue,
            };
            if lhs.is_empty() {
                if current.is_none() {
                    return Err(GrammarError::new("Start symbol not specified".to_string()));
                }
            } else {
                let symbol = match Symbol::parse_spec(lhs)? {
                    Some(symbol) if symbol.kind == SymbolKind::Nonterminal => symbol,
                    _ => {
                        return Err(GrammarError::new(format!(
                            "left side of a production must be a nonterminal: {}",
                            lhs
                        )))
                    }
                };
                let same_nonterm = current
                    .as_ref()
                    .map_or(false, |cur| cur.value == symbol.value);
                if !same_nonterm {
                    if prod_spans.contains_key(&symbol.value) {
                        return Err(GrammarError::new(format!(
                            "productions for {} must be contiguous",
                            symbol.value
                        )));
                    }
                    if let Some(previous) = current.take() {
                        prod_spans.insert(previous.value, (span_start, productions.len()));
                    }
                    span_start = productions.len();
                    nonterms.push(symbol.clone());
                    current = Some(symbol);
                }
            }
            let nonterm = match &current {
                Some(symbol) => symbol.clone(),
                None => return Err(GrammarError::new("Start symbol not specified".to_string())),
            };
            let mut rhs_list = Vec::new();
            for spec in rhs.split_whitespace() {
                if let Some(symbol) = Symbol::parse_spec(spec)? {
                    rhs_list.push(symbol);
                }
            }
            productions.push(Production {
                nonterm,
                rhs: rhs_list,
            });
        }

        match current {
            Some(last) => {
                prod_spans.insert(last.value, (span_start, productions.len()));
            }
            None => return Err(GrammarError::new("Start symbol not specified".to_string())),
        }

        let start_symbol = match start {
            Some(name) => {
                if !prod_spans.contains_key(name) {
                    return Err(GrammarError::new(format!(
                        "undefined start symbol: {}",
                        name
                    )));
                }
                name.to_string()
            }
            None => nonterms[0].value.clone(),
        };

        for production in &productions {
            for symbol in &production.rhs {
                match symbol.kind {
                    SymbolKind::Nonterminal => {
                        if !prod_spans.contains_key(&symbol.value) {
                            return Err(GrammarError::new(format!(
                                "nonterminal {} has no productions",
                                symbol.value
                            )));
                        }
                    }
                    SymbolKind::Terminal => {
                        if TokenKind::from_bnf_name(&symbol.value).is_none() {
                            return Err(GrammarError::new(format!(
                                "unknown terminal <{}>: no such token kind",
                                symbol.value
                            )));
                        }
                    }
                    SymbolKind::Literal => {}
                }
            }
        }

        let mut grammar = Grammar {
            productions,
            nonterms,
            prod_spans,
            start_symbol,
            first_sets: HashMap::new(),
            follow_sets: HashMap::new(),
            select_sets: Vec::new(),
            parse_table: HashMap::new(),
        };
        grammar.make_parse_table()?;
        Ok(grammar)
    }

    pub fn start_symbol(&self) -> &str {
        &self.start_symbol
    }

    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    pub fn first_set(&self, nonterm: &str) -> Option<&FirstSet> {
        self.first_sets.get(nonterm)
    }

    pub fn follow_set(&self, nonterm: &str) -> Option<&HashSet<Symbol>> {
        self.follow_sets.get(nonterm)
    }

    pub fn select_set(&self, production_index: usize) -> Option<&HashSet<Symbol>> {
        self.select_sets.get(production_index)
    }

    /// Whether the declared nonterminal is marked permanent, which makes
    /// the parser emit a named node for it instead of a transparent one.
    pub fn nonterm_permanent(&self, name: &str) -> bool {
        self.nonterms
            .iter()
            .find(|nonterm| nonterm.value == name)
            .map_or(false, |nonterm| nonterm.permanent)
    }

    /// Find the production to apply for the given nonterminal and lookahead
    /// token. The table is consulted under both candidate keys (by token
    /// text and by token kind); when both predicates are satisfied the
    /// production appearing first in the source wins.
    pub fn find_production(&self, nonterm: &str, token: &Token) -> Result<usize, ParseError> {
        let by_literal = self
            .parse_table
            .get(&(nonterm.to_string(), Symbol::literal(token.text.clone())))
            .copied();
        let by_terminal = self
            .parse_table
            .get(&(nonterm.to_string(), Symbol::terminal(token.kind.bnf_name())))
            .copied();
        let selected = match (by_literal, by_terminal) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (Some(a), None) => Some(a),
            (None, found) => found,
        };
        selected.ok_or_else(|| {
            ParseError::new(
                format!("failed while parsing {} at {}", nonterm, token),
                Some(token.clone()),
            )
        })
    }

    fn make_parse_table(&mut self) -> Result<(), GrammarError> {
        self.generate_select_sets();
        for index in 0..self.productions.len() {
            for symbol in self.select_sets[index].clone() {
                let key = (self.productions[index].nonterm.value.clone(), symbol);
                if let Some(existing) = self.parse_table.get(&key) {
                    return Err(GrammarError::new(format!(
                        "ambiguous non-LL(1) grammar at ({}, {}): productions {} and {} collide",
                        key.0, key.1, existing, index
                    )));
                }
                self.parse_table.insert(key, index);
            }
        }
        Ok(())
    }

    fn generate_select_sets(&mut self) {
        self.generate_first_sets();
        self.generate_follow_sets();
        let mut select_sets = Vec::with_capacity(self.productions.len());
        for index in 0..self.productions.len() {
            let rhs = self.productions[index].rhs.clone();
            let lhs = self.productions[index].nonterm.value.clone();
            let first = self.first_of_sequence(&rhs);
            let mut select = first.symbols;
            if first.epsilon {
                select.extend(self.follow(&lhs));
            }
            select_sets.push(select);
        }
        self.select_sets = select_sets;
    }

    fn generate_first_sets(&mut self) {
        let nonterms: Vec<String> = self.nonterms.iter().map(|n| n.value.clone()).collect();
        for name in nonterms {
            if !self.first_sets.contains_key(&name) {
                self.make_first_set(&name);
            }
        }
    }

    /// The FIRST set of a single symbol. For a terminal or literal that is
    /// the symbol itself; for a nonterminal the stored set, computing it on
    /// demand.
    fn first_of_symbol(&mut self, symbol: &Symbol) -> FirstSet {
        match symbol.kind {
            SymbolKind::Terminal | SymbolKind::Literal => FirstSet::singleton(symbol.clone()),
            SymbolKind::Nonterminal => {
                if !self.first_sets.contains_key(&symbol.value) {
                    self.make_first_set(&symbol.value);
                }
                self.first_sets
                    .get(&symbol.value)
                    .cloned()
                    .unwrap_or_default()
            }
        }
    }

    fn make_first_set(&mut self, name: &str) {
        // The current-best set is visible to recursive calls, which
        // terminates computation on left recursion through epsilon.
        self.first_sets.insert(name.to_string(), FirstSet::default());
        let (start, end) = match self.prod_spans.get(name) {
            Some(span) => *span,
            None => return,
        };
        let mut result = FirstSet::default();
        for index in start..end {
            let rhs = self.productions[index].rhs.clone();
            let first = self.first_of_sequence(&rhs);
            result.symbols.extend(first.symbols);
            result.epsilon |= first.epsilon;
        }
        self.first_sets.insert(name.to_string(), result);
    }

    /// FIRST over a right-hand side: accumulate the FIRST of each symbol
    /// while they stay nullable; the sequence is nullable only if every
    /// symbol is.
    fn first_of_sequence(&mut self, rhs: &[Symbol]) -> FirstSet {
        let mut result = FirstSet::default();
        if rhs.is_empty() {
            result.epsilon = true;
            return result;
        }
        for item in rhs {
            let first = self.first_of_symbol(item);
            result.symbols.extend(first.symbols);
            if !first.epsilon {
                return result;
            }
        }
        result.epsilon = true;
        result
    }

    fn generate_follow_sets(&mut self) {
        let nonterms: Vec<String> = self.nonterms.iter().map(|n| n.value.clone()).collect();
        for name in nonterms {
            self.follow(&name);
        }
    }

    fn follow(&mut self, name: &str) -> HashSet<Symbol> {
        if let Some(cached) = self.follow_sets.get(name) {
            return cached.clone();
        }
        let set = self.preliminary_follow(name, &mut vec![name.to_string()]);
        self.follow_sets.insert(name.to_string(), set.clone());
        set
    }

    /// FOLLOW of a nonterminal. `previous` is the stack of nonterminals
    /// whose follow sets are under computation higher up the call chain;
    /// recursing into one of those contributes nothing, which terminates
    /// the mutual recursion between nonterminals that end each other's
    /// productions.
    fn preliminary_follow(&mut self, name: &str, previous: &mut Vec<String>) -> HashSet<Symbol> {
        let mut result = HashSet::new();
        if name == self.start_symbol {
            result.insert(Symbol::terminal(TokenKind::EOF.bnf_name()));
        }
        for index in 0..self.productions.len() {
            let lhs = self.productions[index].nonterm.value.clone();
            let rhs = self.productions[index].rhs.clone();
            for occurrence in 0..rhs.len() {
                let symbol = &rhs[occurrence];
                if symbol.kind != SymbolKind::Nonterminal || symbol.value != name {
                    continue;
                }
                let mut tail_nullable = true;
                for following in &rhs[occurrence + 1..] {
                    let first = self.first_of_symbol(following);
                    result.extend(first.symbols);
                    if !first.epsilon {
                        tail_nullable = false;
                        break;
                    }
                }
                if tail_nullable && !previous.contains(&lhs) {
                    previous.push(lhs.clone());
                    let parent = self.preliminary_follow(&lhs, previous);
                    previous.pop();
                    result.extend(parent);
                }
            }
        }
        result
    }

    pub fn dump_first_sets(&self) -> String {
        let mut writer = String::new();
        for nonterm in &self.nonterms {
            let mut items: Vec<String> = match self.first_sets.get(&nonterm.value) {
                Some(first) => first.symbols.iter().map(|s| s.to_string()).collect(),
                None => Vec::new(),
            };
            items.sort();
            if self
                .first_sets
                .get(&nonterm.value)
                .map_or(false, |first| first.epsilon)
            {
                items.push("\"\"".to_string());
            }
            let _ = writeln!(writer, "{}: {{ {} }}", nonterm.value, items.join(", "));
        }
        writer
    }

    pub fn dump_follow_sets(&self) -> String {
        let mut writer = String::new();
        for nonterm in &self.nonterms {
            let mut items: Vec<String> = match self.follow_sets.get(&nonterm.value) {
                Some(follow) => follow.iter().map(|s| s.to_string()).collect(),
                None => Vec::new(),
            };
            items.sort();
            let _ = writeln!(writer, "{}: {{ {} }}", nonterm.value, items.join(", "));
        }
        writer
    }

    pub fn dump_select_sets(&self) -> String {
        let mut writer = String::new();
        for (index, production) in self.productions.iter().enumerate() {
            let mut items: Vec<String> = match self.select_sets.get(index) {
                Some(select) => select.iter().map(|s| s.to_string()).collect(),
                None => Vec::new(),
            };
            items.sort();
            let _ = writeln!(writer, "{} {} {{ {} }}", index + 1, production, items.join(", "));
        }
        writer
    }
}

impl Display for Grammar {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Start symbol is {}", self.start_symbol)?;
        for production in &self.productions {
            writeln!(f, "{}", production)?;
        }
        Ok(())
    }
}
