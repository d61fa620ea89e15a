/*
    This module recognizes strings with the LL(1) table, simulating a
    deterministic pushdown automaton
*/

use std::fmt::Display;

use log::trace;

use crate::grammar::*;
use crate::table::render_rows;

// Why a string is not in the language
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    // No production for the symbol on top of the stack and the lookahead
    NoTableEntry(Symbol, Symbol),
    // The stack was emptied before the input
    UnexpectedTrailingInput,
    // A non-terminal reappeared on top without consuming input, which only
    // happens with indirect left recursion
    NonTerminating(Symbol, Symbol),
}

impl Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rejection::NoTableEntry(symbol, terminal) => write!(f, "No table entry for M[{}, {}]", symbol, terminal),
            Rejection::UnexpectedTrailingInput => write!(f, "Input continues after the derivation ended"),
            Rejection::NonTerminating(symbol, terminal) => write!(f, "`{}` derives itself on `{}` without consuming input", symbol, terminal),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseState {
    Running,
    Accepted,
    Rejected(Rejection),
}

/// One step of the automaton: the stack (bottom first) and the unread input
/// before the step, and the production expanded by it. The production is
/// empty for terminal matches and for the final step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceRow {
    pub stack: String,
    pub input: String,
    pub production: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParseResult {
    pub accepted: bool,
    pub outcome: ParseState,
    pub trace: Vec<TraceRow>,
}

pub struct Automaton<'g> {
    grammar: &'g Grammar,
    stack: Vec<Symbol>,
    // Ends with the end marker
    input: Vec<Symbol>,
    cursor: usize,
    // Expansions since the last match, with the stack height they started at
    expansions: Vec<(Symbol, usize)>,
    state: ParseState,
    trace: Vec<TraceRow>,
}

impl<'g> Automaton<'g> {
    pub fn new(grammar: &'g Grammar, input: &str) -> Self {
        Automaton {
            grammar,
            stack: vec![END_MARKER, grammar.start_symbol()],
            input: input.chars().chain(Some(END_MARKER)).collect(),
            cursor: 0,
            expansions: Vec::new(),
            state: ParseState::Running,
            trace: Vec::new(),
        }
    }

    pub fn state(&self) -> &ParseState {
        &self.state
    }

    pub fn trace(&self) -> &[TraceRow] {
        &self.trace
    }

    fn lookahead(&self) -> Symbol {
        self.input.get(self.cursor).copied().unwrap_or(END_MARKER)
    }

    fn remaining_input(&self) -> String {
        let end = self.input.len().saturating_sub(1);
        self.input.get(self.cursor..end).unwrap_or_default().iter().collect()
    }

    fn forget_finished_expansions(&mut self) {
        let height = self.stack.len();
        self.expansions.retain(|&(_, start)| start <= height);
    }

    fn pop_epsilons(&mut self) {
        while self.stack.last() == Some(&EPSILON) {
            self.stack.pop();
            self.forget_finished_expansions();
        }
    }

    /// Runs a single step. Epsilons on top of the stack are popped silently
    /// first. Does nothing once the automaton has stopped.
    pub fn step(&mut self) -> &ParseState {
        if self.state != ParseState::Running {
            return &self.state;
        }

        self.pop_epsilons();

        let mut row = TraceRow {
            stack: self.stack.iter().collect(),
            input: self.remaining_input(),
            production: String::new(),
        };

        let height = self.stack.len();
        // An empty stack behaves like its bottom marker
        let top = self.stack.pop().unwrap_or(END_MARKER);
        let lookahead = self.lookahead();

        if top == END_MARKER {
            self.state = if self.cursor + 1 >= self.input.len() {
                ParseState::Accepted
            } else {
                ParseState::Rejected(Rejection::UnexpectedTrailingInput)
            };
        } else if top == lookahead {
            self.cursor += 1;
            self.expansions.clear();
        } else if self.expansions.iter().any(|&(symbol, _)| symbol == top) {
            self.state = ParseState::Rejected(Rejection::NonTerminating(top, lookahead));
        } else {
            let grammar = self.grammar;
            let production = grammar.table()
                .get(top, lookahead)
                .and_then(|id| grammar.production(id));

            match production {
                Some(production) => {
                    row.production = format!("{}->{}", top, production);
                    self.stack.extend(production.symbols().iter().rev());
                    self.expansions.push((top, height));
                }
                None => {
                    self.state = ParseState::Rejected(Rejection::NoTableEntry(top, lookahead));
                }
            }
        }

        trace!("{} | {} | {}", row.stack, row.input, row.production);
        self.trace.push(row);
        &self.state
    }

    pub fn run(mut self) -> ParseResult {
        while self.step() == &ParseState::Running {}

        ParseResult {
            accepted: self.state == ParseState::Accepted,
            outcome: self.state,
            trace: self.trace,
        }
    }
}

/// Recognizes `input` with the table of a processed grammar.
pub fn parse(grammar: &Grammar, input: &str) -> ParseResult {
    Automaton::new(grammar, input).run()
}

// Stack, input (with the end marker) and production columns
pub fn render_trace(trace: &[TraceRow]) -> String {
    let header = vec!["Stack".to_string(), "Input".to_string(), "Production".to_string()];
    let rows = trace.iter().map(|row| {
        vec![row.stack.clone(), format!("{}{}", row.input, END_MARKER), row.production.clone()]
    });

    render_rows(&Some(header).into_iter().chain(rows).collect::<Vec<_>>())
}
