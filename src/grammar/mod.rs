/*
    This module is for storing and manipulating grammars
*/

pub mod symbol;

use std::cell::Cell;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt::Display;

use indexmap::IndexSet;

use crate::error_handling::ErrorType;
use crate::table::{Conflict, Table};
pub use symbol::{Symbol, EPSILON, END_MARKER};

// Memo for the nullability of a single production
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullableStatus {
    Unknown,
    // Guards against cycles while the production is being evaluated
    InProgress,
    Nullable,
    NotNullable,
}

/// The right-hand side of one alternative of a non-terminal.
///
/// Equality and ordering only look at the symbols; the nullability memo is
/// ignored.
#[derive(Debug, Clone)]
pub struct Production {
    symbols: Vec<Symbol>,
    status: Cell<NullableStatus>,
}

impl Production {
    pub fn new(symbols: impl IntoIterator<Item = Symbol>) -> Self {
        Production {
            symbols: symbols.into_iter().collect(),
            status: Cell::new(NullableStatus::Unknown),
        }
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn first_symbol(&self) -> Option<Symbol> {
        self.symbols.first().copied()
    }

    pub fn starts_with(&self, symbol: Symbol) -> bool {
        self.first_symbol() == Some(symbol)
    }

    pub fn status(&self) -> NullableStatus {
        self.status.get()
    }

    pub(crate) fn set_status(&self, status: NullableStatus) {
        self.status.set(status);
    }

    pub fn alpha(&self) -> String {
        self.symbols.iter().collect()
    }
}

impl From<&str> for Production {
    fn from(alpha: &str) -> Self {
        Production::new(alpha.chars())
    }
}

impl PartialEq for Production {
    fn eq(&self, other: &Self) -> bool {
        self.symbols == other.symbols
    }
}

impl Eq for Production {}

impl PartialOrd for Production {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Production {
    fn cmp(&self, other: &Self) -> Ordering {
        self.symbols.cmp(&other.symbols)
    }
}

impl Display for Production {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.alpha())
    }
}

/// A non-terminal together with its alternatives and derived sets.
#[derive(Debug, Clone, PartialEq)]
pub struct Head {
    symbol: Symbol,
    productions: Vec<Production>,
    first: IndexSet<Symbol>,
    follow: IndexSet<Symbol>,
}

impl Head {
    pub fn new(symbol: Symbol) -> Self {
        Head {
            symbol,
            productions: Vec::new(),
            first: IndexSet::new(),
            follow: IndexSet::new(),
        }
    }

    pub fn with_productions<'a>(symbol: Symbol, alphas: impl IntoIterator<Item = &'a str>) -> Self {
        let mut head = Head::new(symbol);
        for alpha in alphas {
            head.add_production(Production::from(alpha));
        }
        head
    }

    pub fn symbol(&self) -> Symbol {
        self.symbol
    }

    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    pub fn first(&self) -> &IndexSet<Symbol> {
        &self.first
    }

    pub fn follow(&self) -> &IndexSet<Symbol> {
        &self.follow
    }

    // Appends the production unless an identical one is already present
    pub fn add_production(&mut self, production: Production) -> bool {
        if self.productions.contains(&production) {
            return false;
        }
        self.productions.push(production);
        true
    }

    pub(crate) fn sort_productions(&mut self) {
        self.productions.sort();
    }

    pub(crate) fn take_productions(&mut self) -> Vec<Production> {
        std::mem::take(&mut self.productions)
    }

    pub(crate) fn set_first(&mut self, first: IndexSet<Symbol>) {
        self.first = first;
    }

    pub(crate) fn set_follow(&mut self, follow: IndexSet<Symbol>) {
        self.follow = follow;
    }
}

impl Display for Head {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for production in &self.productions {
            writeln!(f, "{}->{}", self.symbol, production)?;
        }
        Ok(())
    }
}

// Points at a production owned by the grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProductionId {
    pub head: Symbol,
    pub index: usize,
}

#[derive(Debug, PartialEq)]
pub enum ProcessingError {
    // No upper-case symbol is left for a rewritten non-terminal
    ExhaustedSymbolSpace,
    // Every alternative of the head is left recursive
    UnresolvableBaseCase(Symbol),
}

impl ErrorType for ProcessingError {}

impl Display for ProcessingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingError::ExhaustedSymbolSpace => write!(f, "No unused non-terminal symbol is left"),
            ProcessingError::UnresolvableBaseCase(symbol) => write!(f, "Every alternative of `{}` is left recursive, it can never derive a terminal string", symbol),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Grammar {
    pub(crate) heads: HashMap<Symbol, Head>,
    // Declaration order, the first entry is the start symbol
    pub(crate) non_terminals: Vec<Symbol>,
    pub(crate) terminals: IndexSet<Symbol>,
    pub(crate) table: Table,
    pub(crate) conflicts: Vec<Conflict>,
}

impl Grammar {
    // The heads must be non-empty and in declaration order
    pub(crate) fn from_heads(heads: Vec<Head>) -> Self {
        let non_terminals = heads.iter().map(Head::symbol).collect();
        let mut grammar = Grammar {
            heads: heads.into_iter().map(|head| (head.symbol(), head)).collect(),
            non_terminals,
            terminals: IndexSet::new(),
            table: Table::default(),
            conflicts: Vec::new(),
        };
        grammar.refresh_terminals();
        grammar
    }

    // Rescans every right-hand side for the terminal alphabet
    pub(crate) fn refresh_terminals(&mut self) {
        let terminals = self.heads()
            .flat_map(|head| head.productions())
            .flat_map(|production| production.symbols().iter().copied())
            .filter(|&symbol| symbol::is_terminal(symbol) && symbol != EPSILON)
            .chain(Some(END_MARKER));
        self.terminals = terminals.collect();
    }

    pub fn start_symbol(&self) -> Symbol {
        self.non_terminals[0]
    }

    pub fn non_terminals(&self) -> &[Symbol] {
        &self.non_terminals
    }

    pub fn terminals(&self) -> &IndexSet<Symbol> {
        &self.terminals
    }

    pub fn head(&self, symbol: Symbol) -> Option<&Head> {
        self.heads.get(&symbol)
    }

    // Upper-case symbols without a head are not non-terminals of this grammar
    pub fn is_non_terminal(&self, symbol: Symbol) -> bool {
        symbol::is_non_terminal(symbol) && self.heads.contains_key(&symbol)
    }

    // Heads in declaration order
    pub fn heads(&self) -> impl Iterator<Item = &Head> + '_ {
        self.non_terminals.iter().filter_map(|symbol| self.heads.get(symbol))
    }

    pub fn production(&self, id: ProductionId) -> Option<&Production> {
        self.heads.get(&id.head)?.productions().get(id.index)
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }

    pub(crate) fn reset_nullability(&self) {
        for production in self.heads.values().flat_map(|head| head.productions()) {
            production.set_status(NullableStatus::Unknown);
        }
    }
}

impl Display for Grammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for head in self.heads() {
            write!(f, "{}", head)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_productions_are_skipped() {
        let mut head = Head::new('S');
        assert!(head.add_production(Production::from("aS")));
        assert!(head.add_production(Production::from("b")));
        assert!(!head.add_production(Production::from("aS")));
        assert_eq!(head.productions(), &[Production::from("aS"), Production::from("b")]);
    }

    #[test]
    fn production_equality_ignores_memo() {
        let nullable = Production::from("&");
        nullable.set_status(NullableStatus::Nullable);
        assert_eq!(nullable, Production::from("&"));
        assert!(Production::from("ab") < Production::from("b"));
        assert!(Production::from("a") < Production::from("ab"));
    }

    #[test]
    fn terminal_alphabet_in_first_seen_order() {
        let grammar = Grammar::from_heads(vec![
            Head::with_productions('E', ["TX"]),
            Head::with_productions('X', ["+TX", "&"]),
            Head::with_productions('T', ["(E)", "i"]),
        ]);

        assert_eq!(grammar.start_symbol(), 'E');
        assert_eq!(grammar.terminals().iter().copied().collect::<String>(), "+()i$");
        assert_eq!(grammar.heads().map(Head::symbol).collect::<String>(), "EXT");
    }

    #[test]
    fn non_terminals_need_a_head() {
        let grammar = Grammar::from_heads(vec![Head::with_productions('S', ["aB"])]);
        let symbols = vec!['S', 'B', 'a', EPSILON, END_MARKER];
        let answers = vec![true, false, false, false, false];

        for (symbol, answer) in std::iter::zip(symbols, answers) {
            assert_eq!(grammar.is_non_terminal(symbol), answer, "symbol `{}`", symbol);
        }
    }

    #[test]
    fn display_lists_every_alternative() {
        let grammar = Grammar::from_heads(vec![
            Head::with_productions('S', ["a", "bS"]),
        ]);
        assert_eq!(grammar.to_string(), "S->a\nS->bS\n");
        assert_eq!(
            grammar.production(ProductionId { head: 'S', index: 1 }),
            Some(&Production::from("bS"))
        );
        assert_eq!(grammar.production(ProductionId { head: 'S', index: 2 }), None);
    }
}
