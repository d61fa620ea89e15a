/*
    This module removes the vices that keep a grammar from being LL(1):
    immediate left recursion and left factoring
*/

pub mod factoring;
pub mod recursion;

use std::collections::{HashMap, VecDeque};

use log::debug;

use crate::grammar::symbol::SymbolPool;
use crate::grammar::*;

/// The outcome of rewriting a single head.
#[derive(Debug, PartialEq)]
pub enum Rewrite {
    // The head needs no new non-terminal (its alternatives may still have been pruned)
    Single(Head),
    // `head` now refers to `fresh`, which follows it in declaration order
    Split { head: Head, fresh: Head },
}

pub fn remove_vices(head: Head, pool: &mut SymbolPool) -> Result<Rewrite, ProcessingError> {
    if factoring::has_left_factoring(&head) {
        factoring::remove_left_factoring(head, pool)
    } else if recursion::has_left_recursion(&head) {
        recursion::remove_left_recursion(head, pool)
    } else {
        Ok(Rewrite::Single(head))
    }
}

/// Rewrites every head of the grammar until none has left recursion or left
/// factoring. Heads are visited in declaration order and every head produced
/// by a rewrite is examined again before moving on. The grammar is only
/// modified if every head could be rewritten.
pub fn eliminate(grammar: &mut Grammar) -> Result<(), ProcessingError> {
    let mut pool = SymbolPool::new(grammar.non_terminals.iter().copied());
    let mut heads: HashMap<Symbol, Head> = grammar.heads.clone();
    let mut order = grammar.non_terminals.clone();
    let mut queue: VecDeque<Symbol> = order.iter().copied().collect();

    while let Some(symbol) = queue.pop_front() {
        let Some(head) = heads.remove(&symbol) else {
            continue;
        };

        match remove_vices(head, &mut pool)? {
            Rewrite::Single(head) => {
                heads.insert(symbol, head);
            }
            Rewrite::Split { head, fresh } => {
                let fresh_symbol = fresh.symbol();
                debug!("Rewrote `{}` into:\n{}{}", symbol, head, fresh);

                let position = order.iter().position(|&s| s == symbol).map_or(order.len(), |p| p + 1);
                order.insert(position, fresh_symbol);
                heads.insert(symbol, head);
                heads.insert(fresh_symbol, fresh);

                queue.push_front(fresh_symbol);
                queue.push_front(symbol);
            }
        }
    }

    grammar.heads = heads;
    grammar.non_terminals = order;
    grammar.refresh_terminals();
    Ok(())
}
