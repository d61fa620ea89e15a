/*
    This module builds grammars from production lines like `E->TX`
*/

mod lexer;
mod verifier;

use std::fmt::Display;
use std::fs::File;
use std::io::BufRead;
use std::path::PathBuf;

use crate::grammar::symbol::{is_non_terminal, END_MARKER};
use crate::grammar::*;
use crate::error_handling::*;
use itertools::Itertools;
use lexer::*;
use log::debug;
use verifier::verify_rules;
use verifier::IntermediateRuleset;

#[derive(Debug)]
pub enum MalformedGrammar {
    // A production line has no `->`
    MissingArrow,
    // Nothing before the `->`
    MissingHead,
    // The head is not a single upper-case symbol
    InvalidHead(String),
    // Nothing after the `->`
    EmptyRightHandSide,
    // `$` is kept for the end of the input
    ReservedEndMarker,
    // An upper-case symbol is used but never defined
    UndefinedNonterminal(Symbol),
    // The source has no productions at all
    EmptyGrammar,
    // There was an issue with reading a file
    FileError(std::io::Error),
}

impl ErrorType for MalformedGrammar {}

impl PartialEq for MalformedGrammar {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (MalformedGrammar::FileError(a), MalformedGrammar::FileError(b)) => a.kind() == b.kind(),
            (MalformedGrammar::InvalidHead(a), MalformedGrammar::InvalidHead(b)) => a == b,
            (MalformedGrammar::UndefinedNonterminal(a), MalformedGrammar::UndefinedNonterminal(b)) => a == b,
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }
}

impl Display for MalformedGrammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MalformedGrammar::MissingArrow => write!(f, "Expected `->` after the head symbol"),
            MalformedGrammar::MissingHead => write!(f, "Production has no head symbol"),
            MalformedGrammar::InvalidHead(head) => write!(f, "`{}` is not a single upper-case non-terminal", head),
            MalformedGrammar::EmptyRightHandSide => write!(f, "Production has an empty right-hand side (use `{}` for epsilon)", EPSILON),
            MalformedGrammar::ReservedEndMarker => write!(f, "`{}` is reserved for the end of the input", END_MARKER),
            MalformedGrammar::UndefinedNonterminal(symbol) => write!(f, "Could not find definition for `{}`", symbol),
            MalformedGrammar::EmptyGrammar => write!(f, "No productions found"),
            MalformedGrammar::FileError(e) => write!(f, "File error: {}", e),
        }
    }
}

pub type CompileError = Error<MalformedGrammar>;
pub type CompileErrors = Errors<MalformedGrammar>;

fn io_error(error: std::io::Error, file: PathBuf) -> CompileError {
    CompileError {
        location: Location::new(file, 0),
        error: MalformedGrammar::FileError(error)
    }
}

pub type Result<T> = std::result::Result<T, MalformedGrammar>;
pub type LineResult<T> = std::result::Result<T, CompileError>;
pub type FileResult<T> = std::result::Result<T, CompileErrors>;

#[derive(PartialEq, Debug)]
struct Rule {
    symbol: Symbol,
    production: Production,
    location: Location
}

fn parse_head(tokens: &[Token]) -> Result<Symbol> {
    let head: String = tokens.iter().map(|t| match t {
        Token::Symbol(c) => *c,
        Token::Arrow => '-',
    }).collect();

    match tokens {
        [] => Err(MalformedGrammar::MissingHead),
        [Token::Symbol(symbol)] if is_non_terminal(*symbol) => Ok(*symbol),
        _ => Err(MalformedGrammar::InvalidHead(head)),
    }
}

fn parse_production(tokens: &[Token]) -> Result<Production> {
    if tokens.is_empty() {
        return Err(MalformedGrammar::EmptyRightHandSide);
    }

    tokens.iter().map(|t| match t {
        Token::Symbol(c) if *c == END_MARKER => Err(MalformedGrammar::ReservedEndMarker),
        Token::Symbol(c) => Ok(*c),
        // The lexer emits a single arrow per line
        Token::Arrow => Err(MalformedGrammar::MissingArrow),
    }).collect::<Result<Vec<_>>>().map(Production::new)
}

fn parse_line(tokens: &[Token], location: Location) -> Result<Rule> {
    let arrow = tokens.iter()
        .position(|t| *t == Token::Arrow)
        .ok_or(MalformedGrammar::MissingArrow)?;

    let symbol = parse_head(&tokens[..arrow])?;
    let production = parse_production(&tokens[arrow + 1..])?;

    return Ok(Rule {
        symbol,
        production,
        location
    });
}

fn parse_lex_line(line: &str, location: Location) -> LineResult<Rule> {
    parse_line(&lexer::lex_line(line), location.clone())
        .map_err(|error| CompileError { location: location, error })
}

fn is_rule_line(line: &String) -> bool {
    !line.trim().is_empty()
}

// Groups the rules by head, keeping the order in which heads first appear
fn ruleset_from_rules(rules: Vec<Rule>) -> FileResult<Vec<Head>> {
    let mut test_ruleset = IntermediateRuleset::new();
    for rule in rules {
        test_ruleset
            .entry(rule.symbol)
            .or_default()
            .push((rule.production, rule.location));
    }

    verify_rules(&test_ruleset)?;

    let heads = test_ruleset.into_iter().map(|(symbol, productions)| {
        let mut head = Head::new(symbol);
        for (production, _) in productions {
            head.add_production(production);
        }
        head
    });

    return Ok(heads.collect());
}

fn grammar_from_rules(rule_list: Vec<Rule>, file: PathBuf) -> FileResult<Grammar> {
    if rule_list.is_empty() {
        return Err(vec![CompileError {
            location: Location::new(file, 0),
            error: MalformedGrammar::EmptyGrammar
        }]);
    }

    let heads = ruleset_from_rules(rule_list)?;
    let grammar = Grammar::from_heads(heads);
    debug!(
        "Built grammar with {} non-terminals and {} terminals",
        grammar.non_terminals().len(),
        grammar.terminals().len()
    );

    return Ok(grammar);
}

// Parses numbered lines, either every rule or every error
fn grammar_from_lines(lines: impl Iterator<Item = (usize, LineResult<String>)>, file: PathBuf) -> FileResult<Grammar> {
    let parsed_lines = lines.map(|(num, line_res)| {
        line_res.and_then(|line| parse_lex_line(line.trim_end_matches('\r'), Location::new(file.clone(), num)))
    });

    let (rules, errors): (Vec<_>, Vec<_>) = parsed_lines.partition_result();
    if errors.len() > 0 {
        return Err(errors);
    }

    return grammar_from_rules(rules, file);
}

/// Builds a grammar from production lines of the form `A->alpha`, one
/// alternative per line. Blank lines are skipped. Any malformed line fails
/// the whole construction and every error found is returned.
pub fn build_grammar<I, S>(lines: I) -> FileResult<Grammar>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let numbered = lines.into_iter()
        .map(|line| line.as_ref().to_string())
        .enumerate()
        .filter(|(_, line)| is_rule_line(line))
        .map(|(num, line)| (num + 1, Ok(line)));

    grammar_from_lines(numbered, PathBuf::new())
}

// Returns an iterator over the lines of a file, with the io errors wrapped
// in CompileError and enumerated
fn file_line_nums<'a>(file: File, path: &'a PathBuf) -> impl Iterator<Item = (usize, LineResult<String>)> + 'a {
    std::io::BufReader::new(file)
        .lines()
        .map(move |line| line.map_err(|e| io_error(e, path.clone())))
        .enumerate()
        .filter(|(_, line)| line.as_ref().is_ok_and(is_rule_line) || line.is_err())
        .map(|(num, line)| (num + 1, line))
}

pub fn parse_file(path: &PathBuf) -> FileResult<Grammar> {
    let file = File::open(path).map_err(|e| vec![io_error(e, path.clone())])?;
    let lines = file_line_nums(file, path);

    grammar_from_lines(lines, path.clone())
}

#[cfg(test)]
mod tests {
    use std::iter::zip;

    use super::*;

    fn at(line: usize) -> Location {
        Location::new(PathBuf::new(), line)
    }

    fn alphas(head: &Head) -> Vec<String> {
        head.productions().iter().map(Production::alpha).collect()
    }

    #[test]
    fn parse_normal_line() {
        let lines = vec!["E->TX", "X->&", "T->(E)"];
        let answers = vec![('E', "TX"), ('X', "&"), ('T', "(E)")];

        for (line, (symbol, alpha)) in zip(lines, answers) {
            assert_eq!(parse_line(&lex_line(line), at(1)), Ok(Rule {
                symbol,
                production: Production::from(alpha),
                location: at(1)
            }));
        }
    }

    #[test]
    fn parse_malformed_line() {
        let lines = vec!["Sa", "->a", "s->a", "SA->a", "S->", "S->a$"];
        let answers = vec![
            MalformedGrammar::MissingArrow,
            MalformedGrammar::MissingHead,
            MalformedGrammar::InvalidHead("s".to_string()),
            MalformedGrammar::InvalidHead("SA".to_string()),
            MalformedGrammar::EmptyRightHandSide,
            MalformedGrammar::ReservedEndMarker,
        ];

        for (line, answer) in zip(lines, answers) {
            assert_eq!(parse_line(&lex_line(line), at(1)), Err(answer), "line `{}`", line);
        }
    }

    #[test]
    fn build_groups_alternatives_by_head() {
        let grammar = build_grammar(["E->TX", "X->+TX", "", "X->&", "T->i", "X->+TX"]).unwrap();

        assert_eq!(grammar.non_terminals(), &['E', 'X', 'T']);
        assert_eq!(grammar.start_symbol(), 'E');
        assert_eq!(alphas(grammar.head('X').unwrap()), vec!["+TX", "&"]);
        assert_eq!(grammar.terminals().iter().copied().collect::<String>(), "+i$");
    }

    #[test]
    fn build_reports_every_bad_line() {
        let errors = build_grammar(["S->a", "s->b", "S->", "", "S->c"]).unwrap_err();

        assert_eq!(errors, vec![
            CompileError { location: at(2), error: MalformedGrammar::InvalidHead("s".to_string()) },
            CompileError { location: at(3), error: MalformedGrammar::EmptyRightHandSide },
        ]);
    }

    #[test]
    fn build_rejects_undefined_and_empty() {
        assert_eq!(build_grammar(["S->aB"]).unwrap_err(), vec![
            CompileError { location: at(1).with_head('S'), error: MalformedGrammar::UndefinedNonterminal('B') }
        ]);
        assert_eq!(build_grammar(Vec::<String>::new()).unwrap_err(), vec![
            CompileError { location: at(0), error: MalformedGrammar::EmptyGrammar }
        ]);
    }

    #[test]
    fn parse_normal_file() {
        let example_path = PathBuf::from("example_data/expression.txt");
        let grammar = parse_file(&example_path).unwrap();

        assert_eq!(grammar.non_terminals(), &['E', 'T', 'F']);
        assert_eq!(alphas(grammar.head('E').unwrap()), vec!["E+T", "T"]);
        assert_eq!(alphas(grammar.head('T').unwrap()), vec!["T*F", "F"]);
        assert_eq!(alphas(grammar.head('F').unwrap()), vec!["(E)", "i"]);
    }

    #[test]
    fn parse_malformed_file() {
        let example_path = PathBuf::from("example_data/malformed.txt");
        let errors = parse_file(&example_path).unwrap_err();

        assert_eq!(errors, vec![
            CompileError {
                location: Location::new(example_path.clone(), 3),
                error: MalformedGrammar::InvalidHead("a".to_string())
            },
            CompileError {
                location: Location::new(example_path, 5),
                error: MalformedGrammar::MissingArrow
            }
        ]);
    }

    #[test]
    fn parse_missing_file() {
        let example_path = PathBuf::from("example_data/does_not_exist.txt");
        let errors = parse_file(&example_path).unwrap_err();
        assert_eq!(errors, vec![io_error(
            std::io::Error::from(std::io::ErrorKind::NotFound),
            example_path
        )]);
    }
}
