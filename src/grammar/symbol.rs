/*
    Classification of single-character grammar symbols
*/

use std::collections::BTreeSet;

use super::ProcessingError;

pub type Symbol = char;

// Marks a right-hand side (or part of one) that produces nothing
pub const EPSILON: Symbol = '&';

// Bottom of the stack and end of the input
pub const END_MARKER: Symbol = '$';

// Case is the only discriminator: anything that is not an upper-case letter is
// a terminal, epsilon and the end marker included
pub fn is_terminal(symbol: Symbol) -> bool {
    !symbol.is_uppercase()
}

pub fn is_non_terminal(symbol: Symbol) -> bool {
    !is_terminal(symbol)
}

// Lowest upper-case code point that is not in `existing`
pub fn fresh_non_terminal(existing: &BTreeSet<Symbol>) -> Result<Symbol, ProcessingError> {
    ('\0'..=char::MAX)
        .find(|c| c.is_uppercase() && !existing.contains(c))
        .ok_or(ProcessingError::ExhaustedSymbolSpace)
}

/// Hands out unused non-terminal symbols, remembering everything it has
/// given away so two rewrites never receive the same symbol.
#[derive(Debug, Clone, Default)]
pub struct SymbolPool {
    used: BTreeSet<Symbol>,
}

impl SymbolPool {
    pub fn new(used: impl IntoIterator<Item = Symbol>) -> Self {
        SymbolPool { used: used.into_iter().collect() }
    }

    pub fn next(&mut self) -> Result<Symbol, ProcessingError> {
        let symbol = fresh_non_terminal(&self.used)?;
        self.used.insert(symbol);
        Ok(symbol)
    }
}
