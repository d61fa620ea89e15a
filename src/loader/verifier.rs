use indexmap::IndexMap;

use crate::grammar::symbol::is_non_terminal;
use crate::grammar::{Production, Symbol};
use super::MalformedGrammar::UndefinedNonterminal;
use super::{CompileError, CompileErrors, FileResult, Location};

pub type IntermediateRuleset = IndexMap<Symbol, Vec<(Production, Location)>>;

fn get_production_undefined_symbols(head: Symbol, production: &Production, location: &Location, rules: &IntermediateRuleset) -> CompileErrors {
    // Keep the upper-case symbols that never appear as a head
    production.symbols().iter()
        .copied()
        .filter(|&symbol| is_non_terminal(symbol))
        .filter(|symbol| !rules.contains_key(symbol))
        .map(|symbol| CompileError {
            location: location.clone().with_head(head),
            error: UndefinedNonterminal(symbol)
        })
        .collect()
}

fn get_undefined_symbols(rules: &IntermediateRuleset) -> CompileErrors {
    rules.iter()
        .flat_map(|(&head, productions)| productions.iter().map(move |entry| (head, entry)))
        .flat_map(|(head, (production, location))| get_production_undefined_symbols(head, production, location, rules))
        .collect()
}

pub fn verify_rules(rules: &IntermediateRuleset) -> FileResult<()> {
    let mut errors = Vec::new();

    errors.extend(get_undefined_symbols(&rules).into_iter());

    if errors.len() > 0 {
        Err(errors)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn at(line: usize) -> Location {
        Location::new(PathBuf::new(), line)
    }

    #[test]
    fn defined_symbols_pass() {
        let mut rules = IntermediateRuleset::new();
        rules.insert('S', vec![(Production::from("aSb"), at(1)), (Production::from("&"), at(2))]);
        assert_eq!(verify_rules(&rules), Ok(()));
    }

    #[test]
    fn undefined_symbols_are_reported_per_use() {
        let mut rules = IntermediateRuleset::new();
        rules.insert('S', vec![(Production::from("AbA"), at(1))]);
        rules.insert('T', vec![(Production::from("B"), at(2))]);

        assert_eq!(verify_rules(&rules), Err(vec![
            CompileError { location: at(1).with_head('S'), error: UndefinedNonterminal('A') },
            CompileError { location: at(1).with_head('S'), error: UndefinedNonterminal('A') },
            CompileError { location: at(2).with_head('T'), error: UndefinedNonterminal('B') },
        ]));
    }
}
