use crate::{Grammar, Symbol, SymbolKind};
use std::collections::HashSet;

const LIST_GRAMMAR: &str = r#"
@List ::= "(" Items ")"
Items ::= Item MoreItems
      ::= ""
MoreItems ::= "," Item MoreItems
          ::= ""
Item ::= @<integer>
     ::= List
"#;

fn first_of_sequence(grammar: &Grammar, rhs: &[Symbol]) -> (HashSet<Symbol>, bool) {
    let mut symbols = HashSet::new();
    for symbol in rhs {
        match symbol.kind {
            SymbolKind::Nonterminal => {
                let first = grammar
                    .first_set(&symbol.value)
                    .expect("every nonterminal has a first set");
                symbols.extend(first.symbols().iter().cloned());
                if !first.contains_epsilon() {
                    return (symbols, false);
                }
            }
            _ => {
                symbols.insert(symbol.clone());
                return (symbols, false);
            }
        }
    }
    (symbols, true)
}

#[test]
fn select_sets_cover_first_and_follow() {
    let grammar = Grammar::build(LIST_GRAMMAR).unwrap();
    for (index, production) in grammar.productions().iter().enumerate() {
        let select = grammar.select_set(index).unwrap();
        let (first, nullable) = first_of_sequence(&grammar, production.rhs());
        for symbol in &first {
            assert!(
                select.contains(symbol),
                "SELECT of {} must cover FIRST symbol {}",
                production,
                symbol
            );
        }
        if nullable {
            let follow = grammar.follow_set(&production.nonterm().value).unwrap();
            for symbol in follow {
                assert!(
                    select.contains(symbol),
                    "SELECT of nullable {} must cover FOLLOW symbol {}",
                    production,
                    symbol
                );
            }
        }
    }
}

#[test]
fn select_sets_of_one_nonterminal_are_disjoint() {
    let grammar = Grammar::build(LIST_GRAMMAR).unwrap();
    let productions = grammar.productions();
    for left in 0..productions.len() {
        for right in left + 1..productions.len() {
            if productions[left].nonterm() != productions[right].nonterm() {
                continue;
            }
            let a = grammar.select_set(left).unwrap();
            let b = grammar.select_set(right).unwrap();
            assert!(
                a.is_disjoint(b),
                "productions {} and {} overlap",
                productions[left],
                productions[right]
            );
        }
    }
}

#[test]
fn follow_of_start_contains_end_of_input() {
    let grammar = Grammar::build(LIST_GRAMMAR).unwrap();
    let follow = grammar.follow_set("List").unwrap();
    assert!(follow.contains(&Symbol::terminal("eof")));
}

#[test]
fn ambiguous_grammar_is_rejected() {
    let source = r#"
@S ::= "a"
   ::= "a" "b"
"#;
    let err = Grammar::build(source).unwrap_err();
    assert!(
        err.message.contains("ambiguous"),
        "unexpected message: {}",
        err.message
    );
}

#[test]
fn left_recursion_is_rejected_not_looped() {
    let source = r#"
@A ::= B "x"
B ::= A
  ::= ""
"#;
    assert!(Grammar::build(source).is_err());
}

#[test]
fn undefined_nonterminal_is_rejected() {
    let err = Grammar::build("@S ::= Missing\n").unwrap_err();
    assert!(err.message.contains("Missing"));
}

#[test]
fn unknown_terminal_is_rejected() {
    let err = Grammar::build("@S ::= <bogus>\n").unwrap_err();
    assert!(err.message.contains("bogus"));
}

#[test]
fn continuation_without_a_nonterminal_is_rejected() {
    let err = Grammar::build("::= \"a\"\n").unwrap_err();
    assert!(err.message.contains("Start symbol"));
}

#[test]
fn empty_grammar_is_rejected() {
    let err = Grammar::build("just a comment line\n").unwrap_err();
    assert!(err.message.contains("Start symbol"));
}

#[test]
fn start_symbol_defaults_to_the_first_left_hand_side() {
    let grammar = Grammar::build(LIST_GRAMMAR).unwrap();
    assert_eq!(grammar.start_symbol(), "List");
}

#[test]
fn start_symbol_can_be_designated() {
    let grammar = Grammar::build_with_start(LIST_GRAMMAR, Some("Item")).unwrap();
    assert_eq!(grammar.start_symbol(), "Item");
    let follow = grammar.follow_set("Item").unwrap();
    assert!(follow.contains(&Symbol::terminal("eof")));
}

#[test]
fn designated_start_symbol_must_exist() {
    let err = Grammar::build_with_start(LIST_GRAMMAR, Some("Nope")).unwrap_err();
    assert!(err.message.contains("start symbol"));
}

#[test]
fn permanence_is_read_from_the_declaration() {
    let grammar = Grammar::build(LIST_GRAMMAR).unwrap();
    assert!(grammar.nonterm_permanent("List"));
    assert!(!grammar.nonterm_permanent("Items"));
}

#[test]
fn symbols_match_tokens_by_kind_or_text() {
    use crate::Token;
    let token = Token::new(crate::TokenKind::Integer, "14", 0);
    assert!(Symbol::terminal("integer").matches(&token));
    assert!(!Symbol::terminal("name").matches(&token));
    assert!(Symbol::literal("14").matches(&token));
    assert!(!Symbol::literal("15").matches(&token));
    assert!(!Symbol::nonterminal("Number").matches(&token));
}

#[test]
fn symbol_equality_ignores_the_permanent_flag() {
    let plain = Symbol::terminal("integer");
    let kept = Symbol::terminal("integer").permanent();
    assert_eq!(plain, kept);
    let mut set = HashSet::new();
    set.insert(kept);
    assert!(set.contains(&plain));
}

#[test]
fn dumps_cover_every_production_and_nonterminal() {
    let grammar = Grammar::build(LIST_GRAMMAR).unwrap();
    assert_eq!(
        grammar.dump_select_sets().lines().count(),
        grammar.productions().len()
    );
    assert!(grammar.dump_first_sets().contains("Items"));
    assert!(grammar.dump_follow_sets().contains("MoreItems"));
    assert!(grammar.to_string().contains("Start symbol is List"));
}
