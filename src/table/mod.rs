/*
    This module builds the LL(1) predictive parsing table
*/

use std::collections::BTreeMap;
use std::fmt::Display;

use itertools::Itertools;
use log::warn;

use crate::grammar::*;
use crate::sets::first_of_word;

/// Maps (non-terminal, lookahead terminal) to the production to expand.
/// Cells point at productions owned by the grammar.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    cells: BTreeMap<(Symbol, Symbol), ProductionId>,
}

impl Table {
    pub fn get(&self, non_terminal: Symbol, terminal: Symbol) -> Option<ProductionId> {
        self.cells.get(&(non_terminal, terminal)).copied()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> impl Iterator<Item = (Symbol, Symbol, ProductionId)> + '_ {
        self.cells.iter().map(|(&(non_terminal, terminal), &id)| (non_terminal, terminal, id))
    }

    // `A->alpha` for a filled cell
    pub fn entry_text(&self, grammar: &Grammar, non_terminal: Symbol, terminal: Symbol) -> Option<String> {
        let production = grammar.production(self.get(non_terminal, terminal)?)?;
        Some(format!("{}->{}", non_terminal, production))
    }

    /// The table as rows of text: a header row of terminals, then one row per
    /// non-terminal in declaration order. Empty cells are empty strings.
    pub fn grid(&self, grammar: &Grammar) -> Vec<Vec<String>> {
        let header = Some(String::new()).into_iter()
            .chain(grammar.terminals().iter().map(|t| t.to_string()))
            .collect_vec();

        let rows = grammar.non_terminals().iter().map(|&non_terminal| {
            Some(non_terminal.to_string()).into_iter()
                .chain(grammar.terminals().iter().map(|&terminal| {
                    self.entry_text(grammar, non_terminal, terminal).unwrap_or_default()
                }))
                .collect_vec()
        });

        Some(header).into_iter().chain(rows).collect()
    }

    pub fn render(&self, grammar: &Grammar) -> String {
        render_rows(&self.grid(grammar))
    }
}

// Pads every column to its widest cell
pub fn render_rows(rows: &[Vec<String>]) -> String {
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let widths = (0..columns)
        .map(|column| {
            rows.iter()
                .filter_map(|row| row.get(column))
                .map(|cell| cell.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect_vec();

    rows.iter()
        .map(|row| {
            row.iter()
                .zip(&widths)
                .map(|(cell, &width)| format!("{:<width$}", cell, width = width))
                .join(" | ")
                .trim_end()
                .to_string()
        })
        .join("\n")
}

/// A second production competing for an occupied cell. The first one
/// written stays in the table.
#[derive(Debug, Clone, PartialEq)]
pub struct Conflict {
    pub non_terminal: Symbol,
    pub terminal: Symbol,
    pub kept: String,
    pub rejected: String,
}

impl Display for Conflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Ambiguous grammar at M[{}, {}]: keeping `{}->{}` over `{}->{}`",
            self.non_terminal, self.terminal,
            self.non_terminal, self.kept,
            self.non_terminal, self.rejected
        )
    }
}

struct TableBuilder<'g> {
    grammar: &'g Grammar,
    table: Table,
    conflicts: Vec<Conflict>,
}

impl<'g> TableBuilder<'g> {
    fn describe(&self, id: ProductionId) -> String {
        self.grammar.production(id).map(Production::alpha).unwrap_or_default()
    }

    fn insert(&mut self, non_terminal: Symbol, terminal: Symbol, id: ProductionId) {
        let Some(&kept) = self.table.cells.get(&(non_terminal, terminal)) else {
            self.table.cells.insert((non_terminal, terminal), id);
            return;
        };

        if kept != id {
            let conflict = Conflict {
                non_terminal,
                terminal,
                kept: self.describe(kept),
                rejected: self.describe(id),
            };
            warn!("{}", conflict);
            self.conflicts.push(conflict);
        }
    }

    // Entries from FIRST are written before entries from FOLLOW, so a
    // conflicting cell keeps the alternative that consumes the lookahead
    fn add_head(&mut self, head: &Head) {
        let non_terminal = head.symbol();
        let firsts = head.productions()
            .iter()
            .enumerate()
            .map(|(index, production)| {
                (ProductionId { head: non_terminal, index }, first_of_word(self.grammar, production.symbols()))
            })
            .collect_vec();

        for (id, first) in &firsts {
            for &terminal in first.iter().filter(|&&t| t != EPSILON) {
                self.insert(non_terminal, terminal, *id);
            }
        }

        for (id, _) in firsts.iter().filter(|(_, first)| first.contains(&EPSILON)) {
            for &terminal in head.follow() {
                self.insert(non_terminal, terminal, *id);
            }
        }
    }
}

/// Fills the table from the FIRST and FOLLOW sets of a solved grammar.
/// Conflicting cells are reported, not fatal.
pub fn build_table(grammar: &Grammar) -> (Table, Vec<Conflict>) {
    let mut builder = TableBuilder {
        grammar,
        table: Table::default(),
        conflicts: Vec::new(),
    };

    for head in grammar.heads() {
        builder.add_head(head);
    }

    (builder.table, builder.conflicts)
}
