use crate::{Grammar, ParseError, Scanner, SymbolKind, TokenKind, TreeNode};

/// Parse the scanned token stream against the grammar, producing a pruned
/// syntax tree rooted at the start nonterminal.
///
/// The whole input must be consumed: a structural token left over after the
/// start nonterminal completes is a [ParseError].
pub fn parse(scanner: &mut Scanner, grammar: &Grammar) -> Result<TreeNode, ParseError> {
    let start = grammar.start_symbol().to_string();
    let root = parse_nonterm(&start, scanner, grammar)?;
    let remaining = scanner.look_ahead();
    if remaining.kind != TokenKind::EOF {
        return Err(ParseError::new(
            format!("was not expecting {}", remaining),
            Some(remaining.clone()),
        ));
    }
    // A non-permanent start nonterminal still needs a named root.
    let finalized = match root {
        TreeNode::Transparent { children } => TreeNode::internal_with(start, children),
        finished => finished,
    };
    Ok(finalized)
}

/// Predictive descent for one nonterminal: select a production through the
/// parse table, then match the right-hand side symbol by symbol. Matched
/// tokens and finished subtrees become children only when the grammar
/// symbol is marked permanent.
fn parse_nonterm(
    nonterm: &str,
    scanner: &mut Scanner,
    grammar: &Grammar,
) -> Result<TreeNode, ParseError> {
    let mut node = if grammar.nonterm_permanent(nonterm) {
        TreeNode::internal(nonterm)
    } else {
        TreeNode::transparent()
    };
    let production_index = grammar.find_production(nonterm, scanner.look_ahead())?;
    let production = &grammar.productions()[production_index];
    for symbol in production.rhs() {
        match symbol.kind {
            SymbolKind::Nonterminal => {
                let child = parse_nonterm(&symbol.value, scanner, grammar)?;
                node.add_child(child);
            }
            SymbolKind::Terminal => {
                let token = scanner.match_token(Some(&symbol.value), None)?;
                if symbol.permanent {
                    node.add_child(TreeNode::from_token(&token));
                }
            }
            SymbolKind::Literal => {
                let token = scanner.match_token(None, Some(&symbol.value))?;
                if symbol.permanent {
                    node.add_child(TreeNode::from_token(&token));
                }
            }
        }
    }
    Ok(node)
}
