use std::iter::once;

use log::{debug, warn};

use super::Rewrite;
use crate::grammar::symbol::SymbolPool;
use crate::grammar::*;

pub fn has_left_recursion(head: &Head) -> bool {
    head.productions().iter().any(|p| p.starts_with(head.symbol()))
}

fn without_epsilon(symbols: &[Symbol]) -> Vec<Symbol> {
    symbols.iter().copied().filter(|&s| s != EPSILON).collect()
}

/// Standard removal of immediate left recursion:
/// `A -> Aβ | γ` becomes `A -> γA'` and `A' -> βA' | &`.
pub fn remove_left_recursion(head: Head, pool: &mut SymbolPool) -> Result<Rewrite, ProcessingError> {
    if !has_left_recursion(&head) {
        return Ok(Rewrite::Single(head));
    }

    let symbol = head.symbol();
    let (recursive, base): (Vec<&Production>, Vec<&Production>) = head.productions()
        .iter()
        .partition(|p| p.starts_with(symbol));

    if base.is_empty() {
        return Err(ProcessingError::UnresolvableBaseCase(symbol));
    }

    let betas: Vec<Vec<Symbol>> = recursive.iter()
        .map(|p| without_epsilon(&p.symbols()[1..]))
        .filter(|beta| {
            if beta.is_empty() {
                warn!("Dropping `{}->{}`, it derives nothing new", symbol, symbol);
            }
            !beta.is_empty()
        })
        .collect();

    // Only `A->A` alternatives were recursive
    if betas.is_empty() {
        let mut pruned = Head::new(symbol);
        for production in base {
            pruned.add_production(production.clone());
        }
        return Ok(Rewrite::Single(pruned));
    }

    let fresh_symbol = pool.next()?;
    debug!("Removing left recursion of `{}` through `{}`", symbol, fresh_symbol);

    let mut rewritten = Head::new(symbol);
    for gamma in base {
        let gamma = without_epsilon(gamma.symbols());
        rewritten.add_production(Production::new(gamma.into_iter().chain(once(fresh_symbol))));
    }

    let mut fresh = Head::new(fresh_symbol);
    for beta in betas {
        fresh.add_production(Production::new(beta.into_iter().chain(once(fresh_symbol))));
    }
    fresh.add_production(Production::new(once(EPSILON)));

    Ok(Rewrite::Split { head: rewritten, fresh })
}

#[cfg(test)]
mod tests {
    use std::iter::zip;

    use super::*;

    fn alphas(head: &Head) -> Vec<String> {
        head.productions().iter().map(Production::alpha).collect()
    }

    #[test]
    fn detect_left_recursion() {
        let heads = vec![
            Head::with_productions('E', ["E+T", "T"]),
            Head::with_productions('E', ["T+E", "T"]),
            Head::with_productions('E', ["&E", "a"]),
        ];
        let answers = vec![true, false, false];

        for (head, answer) in zip(heads, answers) {
            assert_eq!(has_left_recursion(&head), answer, "{}", head);
        }
    }

    #[test]
    fn remove_expression_recursion() {
        let mut pool = SymbolPool::new(['E', 'T']);
        let head = Head::with_productions('E', ["E+T", "E-T", "T"]);

        let Rewrite::Split { head, fresh } = remove_left_recursion(head, &mut pool).unwrap() else {
            panic!("`E` was not split");
        };
        assert_eq!(alphas(&head), vec!["TA"]);
        assert_eq!(fresh.symbol(), 'A');
        assert_eq!(alphas(&fresh), vec!["+TA", "-TA", "&"]);
    }

    #[test]
    fn epsilon_base_case() {
        let mut pool = SymbolPool::new(['S']);
        let head = Head::with_productions('S', ["Sa", "&"]);

        let Rewrite::Split { head, fresh } = remove_left_recursion(head, &mut pool).unwrap() else {
            panic!("`S` was not split");
        };
        assert_eq!(alphas(&head), vec!["A"]);
        assert_eq!(alphas(&fresh), vec!["aA", "&"]);
    }

    #[test]
    fn self_loops_are_dropped() {
        let mut pool = SymbolPool::new(['S']);
        let head = Head::with_productions('S', ["S", "a"]);

        assert_eq!(
            remove_left_recursion(head, &mut pool),
            Ok(Rewrite::Single(Head::with_productions('S', ["a"])))
        );
    }

    #[test]
    fn missing_base_case() {
        let mut pool = SymbolPool::new(['S']);
        let head = Head::with_productions('S', ["Sa", "Sb"]);

        assert_eq!(
            remove_left_recursion(head, &mut pool),
            Err(ProcessingError::UnresolvableBaseCase('S'))
        );
    }
}
