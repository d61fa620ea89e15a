/*
    This module generates sentences
*/

use rand::prelude::*;
use std::{collections::HashMap, fmt::Display};

use crate::grammar::*;
use crate::grammar::symbol::is_non_terminal;
use crate::error_handling::*;

#[derive(Debug, PartialEq)]
pub enum GenerateErrorType {
    // An undefined nonterminal was used
    UndefinedNonterminal(Symbol),
    // Every alternative of the nonterminal recurses forever
    NoTerminatingAlternative(Symbol),
}

impl ErrorType for GenerateErrorType {}

impl Display for GenerateErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerateErrorType::UndefinedNonterminal(nonterminal) => write!(f, "No definition for nonterminal `{}`", nonterminal),
            GenerateErrorType::NoTerminatingAlternative(nonterminal) => write!(f, "`{}` never derives a terminal string", nonterminal),
        }
    }
}

pub type GenerateError = Error<GenerateErrorType>;
pub type GenResult = Result<String, GenerateError>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneratorConfig {
    // Past this depth only the shortest derivations are taken
    pub max_depth: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig { max_depth: 16 }
    }
}

type Heights = HashMap<Symbol, usize>;

// Height of the shortest derivation tree from the production, if any
fn production_height(production: &Production, heights: &Heights, grammar: &Grammar) -> Option<usize> {
    production.symbols()
        .iter()
        .filter(|&&symbol| grammar.is_non_terminal(symbol))
        .map(|symbol| heights.get(symbol).copied())
        .try_fold(0, |height, child| Some(height.max(child?)))
        .map(|height| height + 1)
}

fn derivation_heights(grammar: &Grammar) -> Heights {
    let mut heights = Heights::new();

    let mut changed = true;
    while changed {
        changed = false;
        for head in grammar.heads() {
            let best = head.productions()
                .iter()
                .filter_map(|p| production_height(p, &heights, grammar))
                .min();

            if let Some(best) = best {
                if heights.get(&head.symbol()).map_or(true, |&known| best < known) {
                    heights.insert(head.symbol(), best);
                    changed = true;
                }
            }
        }
    }

    heights
}

struct Generator<'g, R: Rng + ?Sized> {
    grammar: &'g Grammar,
    heights: Heights,
    config: GeneratorConfig,
    rng: &'g mut R,
}

impl<'g, R: Rng + ?Sized> Generator<'g, R> {
    fn error(&self, nonterminal: Symbol, error: GenerateErrorType) -> GenerateError {
        GenerateError { location: Location::in_head(nonterminal), error }
    }

    fn generate_nonterminal(&mut self, nonterminal: Symbol, depth: usize) -> GenResult {
        let grammar = self.grammar;
        let head = grammar
            .head(nonterminal)
            .ok_or_else(|| self.error(nonterminal, GenerateErrorType::UndefinedNonterminal(nonterminal)))?;

        let candidates: Vec<(&Production, usize)> = head.productions()
            .iter()
            .filter_map(|p| production_height(p, &self.heights, grammar).map(|h| (p, h)))
            .collect();

        let shortest = candidates.iter().map(|&(_, h)| h).min();
        let candidates: Vec<&Production> = candidates.iter()
            .filter(|&&(_, h)| depth < self.config.max_depth || Some(h) == shortest)
            .map(|&(p, _)| p)
            .collect();

        let production = *candidates
            .choose(&mut *self.rng)
            .ok_or_else(|| self.error(nonterminal, GenerateErrorType::NoTerminatingAlternative(nonterminal)))?;

        return self.generate_production(production, depth);
    }

    fn generate_production(&mut self, production: &Production, depth: usize) -> GenResult {
        let mut result = String::new();
        for &symbol in production.symbols() {
            result.push_str(&self.generate_symbol(symbol, depth)?);
        }

        return Ok(result);
    }

    fn generate_symbol(&mut self, symbol: Symbol, depth: usize) -> GenResult {
        if symbol == EPSILON {
            Ok(String::new())
        } else if is_non_terminal(symbol) {
            self.generate_nonterminal(symbol, depth + 1)
        } else {
            Ok(symbol.to_string())
        }
    }
}

pub fn generate<R: Rng + ?Sized>(grammar: &Grammar, config: GeneratorConfig, rng: &mut R) -> GenResult {
    generate_with_override(grammar, grammar.start_symbol(), config, rng)
}

// Generates a sentence in the given grammar starting with the given symbol
pub fn generate_with_override<R: Rng + ?Sized>(grammar: &Grammar, start: Symbol, config: GeneratorConfig, rng: &mut R) -> GenResult {
    let mut generator = Generator {
        grammar,
        heights: derivation_heights(grammar),
        config,
        rng,
    };
    generator.generate_nonterminal(start, 0)
}
