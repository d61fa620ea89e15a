use std::iter::once;
use std::ops::Range;

use itertools::Itertools;
use log::debug;

use super::Rewrite;
use crate::grammar::symbol::SymbolPool;
use crate::grammar::*;

// Alternatives that start with the head itself are left recursion, not
// factoring
fn share_first_symbol(a: &Production, b: &Production, head: Symbol) -> bool {
    a.first_symbol() == b.first_symbol() && !a.starts_with(head)
}

pub fn has_left_factoring(head: &Head) -> bool {
    head.productions()
        .iter()
        .sorted()
        .tuple_windows()
        .any(|(a, b)| share_first_symbol(a, b, head.symbol()))
}

// First run of two or more sorted alternatives with the same first symbol
fn find_group(productions: &[Production], head: Symbol) -> Option<Range<usize>> {
    let start = productions
        .iter()
        .tuple_windows()
        .position(|(a, b)| share_first_symbol(a, b, head))?;

    let first = productions[start].first_symbol();
    let len = productions[start..]
        .iter()
        .take_while(|p| p.first_symbol() == first)
        .count();

    Some(start..start + len)
}

fn common_prefix_len(group: &[Production]) -> usize {
    let Some((first, rest)) = group.split_first() else {
        return 0;
    };

    rest.iter()
        .map(|p| first.symbols().iter().zip(p.symbols()).take_while(|(a, b)| a == b).count())
        .min()
        .unwrap_or(first.len())
}

/// Pulls the longest prefix shared by the first group of alternatives into
/// the head, moving what follows the prefix into a fresh non-terminal:
/// `A -> ab | ac | d` becomes `A -> aA' | d` and `A' -> b | c`.
pub fn remove_left_factoring(mut head: Head, pool: &mut SymbolPool) -> Result<Rewrite, ProcessingError> {
    head.sort_productions();

    let symbol = head.symbol();
    let Some(group) = find_group(head.productions(), symbol) else {
        return Ok(Rewrite::Single(head));
    };

    let productions = head.take_productions();
    let prefix_len = common_prefix_len(&productions[group.clone()]);
    let prefix = productions[group.start].symbols()[..prefix_len].to_vec();
    let fresh_symbol = pool.next()?;

    debug!(
        "Factoring `{}` out of {} alternatives of `{}`",
        prefix.iter().collect::<String>(),
        group.len(),
        symbol
    );

    let mut rewritten = Head::new(symbol);
    let mut fresh = Head::new(fresh_symbol);
    for (index, production) in productions.into_iter().enumerate() {
        if index == group.start {
            rewritten.add_production(Production::new(prefix.iter().copied().chain(once(fresh_symbol))));
        }

        if group.contains(&index) {
            let suffix = &production.symbols()[prefix_len..];
            if suffix.is_empty() {
                fresh.add_production(Production::new(once(EPSILON)));
            } else {
                fresh.add_production(Production::new(suffix.iter().copied()));
            }
        } else {
            rewritten.add_production(production);
        }
    }

    Ok(Rewrite::Split { head: rewritten, fresh })
}
