/*
    LL(1) grammar analysis: vice removal, FIRST and FOLLOW sets, the
    predictive table and a table driven recognizer
*/

pub mod error_handling;
pub mod generator;
pub mod grammar;
pub mod loader;
pub mod predictive;
pub mod sets;
pub mod table;
pub mod vices;

use log::info;

pub use grammar::{Grammar, Head, ProcessingError, Production, Symbol, END_MARKER, EPSILON};
pub use loader::{build_grammar, parse_file, MalformedGrammar};
pub use predictive::{parse, ParseResult, ParseState, Rejection, TraceRow};
pub use table::{Conflict, Table};

/// Removes left recursion and left factoring, solves the FIRST and FOLLOW
/// sets and builds the table. Conflicts end up in `grammar.conflicts()`.
/// On error the grammar is left as it was.
pub fn process(grammar: &mut Grammar) -> Result<(), ProcessingError> {
    vices::eliminate(grammar)?;
    sets::solve(grammar);

    let (table, conflicts) = table::build_table(grammar);
    info!(
        "{} non-terminals, {} table entries, {} conflicts",
        grammar.non_terminals().len(),
        table.len(),
        conflicts.len()
    );
    grammar.table = table;
    grammar.conflicts = conflicts;

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use indexmap::IndexSet;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::generator::{generate, generate_with_override, GeneratorConfig};

    fn processed(lines: &[&str]) -> Grammar {
        let mut grammar = build_grammar(lines).unwrap();
        process(&mut grammar).unwrap();
        grammar
    }

    #[test]
    fn accept_identifier_sum() {
        let grammar = processed(&["E->TX", "X->+TX", "X->&", "T->F", "F->id"]);
        let result = parse(&grammar, "id+id");

        assert!(result.accepted);
        assert!(grammar.conflicts().is_empty());
        assert_eq!(result.trace.last().map(|row| row.input.as_str()), Some(""));
    }

    #[test]
    fn accept_after_removing_left_recursion() {
        let grammar = processed(&["E->E+T", "E->T", "T->id"]);

        assert!(parse(&grammar, "id+id+id").accepted);
        assert!(!parse(&grammar, "id+").accepted);
        assert!(grammar.head('E').unwrap().productions().iter().all(|p| !p.starts_with('E')));
    }

    #[test]
    fn reject_unknown_terminal() {
        let grammar = processed(&["S->a", "S->b"]);
        let result = parse(&grammar, "c");

        assert!(!result.accepted);
        assert_eq!(result.outcome, ParseState::Rejected(Rejection::NoTableEntry('S', 'c')));
    }

    #[test]
    fn dangling_else() {
        let grammar = processed(&["S->iEtS", "S->iEtSeS", "S->a", "E->b"]);

        assert_eq!(grammar.non_terminals().len(), 3);
        assert!(parse(&grammar, "ibta").accepted);
        assert!(parse(&grammar, "ibtaea").accepted);
        assert!(parse(&grammar, "ibtibtaea").accepted);
        assert_eq!(grammar.conflicts().len(), 1);
    }

    #[test]
    fn factoring_resolves_shared_prefix() {
        let grammar = processed(&["S->a", "S->aS"]);

        assert!(grammar.conflicts().is_empty());
        assert_eq!(grammar.to_string(), "S->aA\nA->&\nA->S\n");
        assert!(parse(&grammar, "aaa").accepted);
        assert!(!parse(&grammar, "").accepted);
    }

    #[test]
    fn failure_leaves_grammar_unprocessed() {
        let mut grammar = build_grammar(["S->Sa"]).unwrap();
        let original = grammar.clone();

        assert_eq!(process(&mut grammar), Err(ProcessingError::UnresolvableBaseCase('S')));
        assert_eq!(grammar, original);
    }

    #[test]
    fn process_fixture_files() {
        let mut grammar = parse_file(&PathBuf::from("example_data/ll1_expression.txt")).unwrap();
        let before = grammar.to_string();
        process(&mut grammar).unwrap();

        assert_eq!(grammar.to_string(), before);
        assert!(grammar.conflicts().is_empty());
        assert!(parse(&grammar, "(i+i)*i").accepted);

        let mut grammar = parse_file(&PathBuf::from("example_data/dangling_else.txt")).unwrap();
        process(&mut grammar).unwrap();

        assert_eq!(grammar.table().grid(&grammar)[0], vec!["", "a", "i", "t", "e", "b", "$"]);
        assert!(parse(&grammar, "ibtibtaea").accepted);
    }

    #[test]
    fn processing_preserves_language() {
        let grammars: [&[&str]; 3] = [
            &["E->E+T", "E->T", "T->T*F", "T->F", "F->(E)", "F->i"],
            &["S->ab", "S->ac", "S->Sd"],
            &["S->iEtS", "S->iEtSeS", "S->a", "E->b"],
        ];
        let mut rng = StdRng::seed_from_u64(42);

        for lines in grammars {
            let original = build_grammar(lines).unwrap();
            let mut grammar = original.clone();
            process(&mut grammar).unwrap();

            for _ in 0..100 {
                let sentence = generate(&original, GeneratorConfig { max_depth: 8 }, &mut rng).unwrap();
                let result = parse(&grammar, &sentence);
                assert!(result.accepted, "`{}` rejected: {:?}", sentence, result.outcome);
            }
        }
    }

    #[test]
    fn sentences_start_in_first() {
        let grammar = processed(&["E->E+T", "E->T", "T->T*F", "T->F", "F->(E)", "F->i", "F->&"]);
        let mut rng = StdRng::seed_from_u64(3);

        for head in grammar.heads() {
            let mut starts = IndexSet::new();
            for _ in 0..300 {
                let sentence = generate_with_override(&grammar, head.symbol(), GeneratorConfig { max_depth: 6 }, &mut rng).unwrap();
                starts.insert(sentence.chars().next().unwrap_or(EPSILON));
            }

            // Every start is predicted and every prediction is reachable
            assert_eq!(&starts, head.first(), "FIRST({})", head.symbol());
        }
    }
}
