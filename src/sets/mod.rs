/*
    This module computes nullability, FIRST and FOLLOW sets
*/

use std::collections::HashMap;

use indexmap::IndexSet;
use log::debug;

use crate::grammar::*;

type SymbolSets = HashMap<Symbol, IndexSet<Symbol>>;

// `cut` is set when a production under evaluation was met again, so a
// negative answer is only valid for this call stack
struct Evaluation {
    nullable: bool,
    cut: bool,
}

fn evaluate_head(grammar: &Grammar, head: &Head) -> Evaluation {
    let mut cut = false;

    for production in head.productions() {
        match production.status() {
            NullableStatus::Nullable => return Evaluation { nullable: true, cut: false },
            NullableStatus::NotNullable => {}
            NullableStatus::InProgress => cut = true,
            NullableStatus::Unknown => {
                let evaluation = evaluate_production(grammar, production);
                if evaluation.nullable {
                    return evaluation;
                }
                cut |= evaluation.cut;
            }
        }
    }

    Evaluation { nullable: false, cut }
}

fn evaluate_production(grammar: &Grammar, production: &Production) -> Evaluation {
    let has_terminal = production.symbols()
        .iter()
        .any(|&s| s != EPSILON && !grammar.is_non_terminal(s));
    if has_terminal {
        production.set_status(NullableStatus::NotNullable);
        return Evaluation { nullable: false, cut: false };
    }

    production.set_status(NullableStatus::InProgress);
    let mut cut = false;
    let mut nullable = true;

    for head in production.symbols().iter().filter_map(|&s| grammar.head(s)) {
        let evaluation = evaluate_head(grammar, head);
        cut |= evaluation.cut;
        if !evaluation.nullable {
            nullable = false;
            break;
        }
    }

    let status = match (nullable, cut) {
        (true, _) => NullableStatus::Nullable,
        (false, false) => NullableStatus::NotNullable,
        // Retried on the next query, from outside the cycle
        (false, true) => NullableStatus::Unknown,
    };
    production.set_status(status);

    Evaluation { nullable, cut }
}

pub fn nullable_head(grammar: &Grammar, head: &Head) -> bool {
    evaluate_head(grammar, head).nullable
}

pub fn nullable_production(grammar: &Grammar, production: &Production) -> bool {
    match production.status() {
        NullableStatus::Nullable => true,
        NullableStatus::NotNullable => false,
        _ => evaluate_production(grammar, production).nullable,
    }
}

// True for the empty word
pub fn nullable_word(grammar: &Grammar, word: &[Symbol]) -> bool {
    word.iter().all(|&symbol| match grammar.head(symbol) {
        Some(head) => nullable_head(grammar, head),
        None => symbol == EPSILON,
    })
}

// FIRST of a word given the FIRST sets known so far
fn first_of_symbols<'a>(
    grammar: &Grammar,
    word: &[Symbol],
    first_of: impl Fn(Symbol) -> Option<&'a IndexSet<Symbol>>,
) -> IndexSet<Symbol> {
    let mut result = IndexSet::new();

    for &symbol in word.iter().filter(|&&s| s != EPSILON) {
        match (grammar.head(symbol), first_of(symbol)) {
            (Some(head), Some(first)) => {
                result.extend(first.iter().copied().filter(|&s| s != EPSILON));
                if !nullable_head(grammar, head) {
                    return result;
                }
            }
            _ => {
                result.insert(symbol);
                return result;
            }
        }
    }

    result.insert(EPSILON);
    result
}

/// FIRST of a word: the terminals that can begin it, plus epsilon if the
/// whole word can vanish. Leading epsilons are skipped and the empty word
/// yields `{&}`. Uses the FIRST sets stored by [`solve`].
pub fn first_of_word(grammar: &Grammar, word: &[Symbol]) -> IndexSet<Symbol> {
    first_of_symbols(grammar, word, |symbol| grammar.head(symbol).map(Head::first))
}

fn compute_first(grammar: &Grammar) -> SymbolSets {
    let mut first: SymbolSets = grammar.non_terminals()
        .iter()
        .map(|&symbol| (symbol, IndexSet::new()))
        .collect();

    for pass in 1.. {
        let mut changed = false;

        for head in grammar.heads() {
            for production in head.productions() {
                let additions = first_of_symbols(grammar, production.symbols(), |symbol| first.get(&symbol));
                if let Some(set) = first.get_mut(&head.symbol()) {
                    for symbol in additions {
                        changed |= set.insert(symbol);
                    }
                }
            }
        }

        if !changed {
            debug!("FIRST sets settled after {} passes", pass);
            break;
        }
    }

    first
}

fn compute_follow(grammar: &Grammar) -> SymbolSets {
    let mut follow: SymbolSets = grammar.non_terminals()
        .iter()
        .map(|&symbol| (symbol, IndexSet::new()))
        .collect();
    if let Some(set) = follow.get_mut(&grammar.start_symbol()) {
        set.insert(END_MARKER);
    }

    for pass in 1.. {
        let mut changed = false;

        for head in grammar.heads() {
            for production in head.productions() {
                let symbols = production.symbols();

                for (index, &symbol) in symbols.iter().enumerate() {
                    if !grammar.is_non_terminal(symbol) {
                        continue;
                    }

                    let first_of_beta = first_of_word(grammar, &symbols[index + 1..]);
                    let mut additions: Vec<Symbol> = first_of_beta.iter()
                        .copied()
                        .filter(|&s| s != EPSILON)
                        .collect();

                    // Self edges add nothing new
                    if first_of_beta.contains(&EPSILON) && symbol != head.symbol() {
                        if let Some(follow_of_head) = follow.get(&head.symbol()) {
                            additions.extend(follow_of_head.iter().copied());
                        }
                    }

                    if let Some(set) = follow.get_mut(&symbol) {
                        for addition in additions {
                            changed |= set.insert(addition);
                        }
                    }
                }
            }
        }

        if !changed {
            debug!("FOLLOW sets settled after {} passes", pass);
            break;
        }
    }

    follow
}

/// Annotates every head with its FIRST and FOLLOW sets. Nullability memos
/// are cleared first, so this must run on the final (vice-free) grammar.
pub fn solve(grammar: &mut Grammar) {
    grammar.reset_nullability();

    for head in grammar.heads() {
        nullable_head(grammar, head);
    }

    for (symbol, first) in compute_first(grammar) {
        if let Some(head) = grammar.heads.get_mut(&symbol) {
            head.set_first(first);
        }
    }

    for (symbol, follow) in compute_follow(grammar) {
        if let Some(head) = grammar.heads.get_mut(&symbol) {
            head.set_follow(follow);
        }
    }
}
