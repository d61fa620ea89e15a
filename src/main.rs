mod cli;

use std::process::ExitCode;

use clap::Parser;
use descent::generator::{self, GeneratorConfig};
use descent::grammar::Grammar;
use descent::predictive::{self, render_trace, ParseState};
use descent::table::render_rows;
use itertools::Itertools;
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn print_sets(grammar: &Grammar) {
    let header = vec!["".to_string(), "FIRST".to_string(), "FOLLOW".to_string()];
    let rows = grammar.heads().map(|head| vec![
        head.symbol().to_string(),
        head.first().iter().join(", "),
        head.follow().iter().join(", "),
    ]);
    println!("{}", render_rows(&Some(header).into_iter().chain(rows).collect_vec()));
}

fn print_sentences(grammar: &Grammar, cli: &cli::Cli, amount: u32) -> bool {
    let config = GeneratorConfig { max_depth: cli.max_depth };
    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    for _ in 0..amount {
        match generator::generate(grammar, config, &mut rng) {
            Ok(sentence) => println!("{}", sentence),
            Err(error) => {
                eprintln!("{}", error);
                return false;
            }
        }
    }
    true
}

fn main() -> ExitCode {
    env_logger::Builder::from_default_env()
        .format_timestamp(None)
        .init();

    let cli = cli::Cli::parse();

    let mut grammar = match descent::parse_file(&cli.file) {
        Ok(grammar) => grammar,
        Err(errors) => {
            for error in errors {
                eprintln!("{}", error);
            }
            return ExitCode::FAILURE;
        }
    };
    let original = grammar.clone();

    if let Err(error) = descent::process(&mut grammar) {
        eprintln!("{}", error);
        return ExitCode::FAILURE;
    }
    info!("Processed {}", cli.file.display());

    if !cli.quiet {
        println!("{}", grammar);
        print_sets(&grammar);
        println!();
        println!("{}", grammar.table().render(&grammar));
        for conflict in grammar.conflicts() {
            println!("{}", conflict);
        }
    }

    let mut success = true;
    if let Some(amount) = cli.amount {
        success &= print_sentences(&original, &cli, amount);
    }

    for input in &cli.inputs {
        let result = predictive::parse(&grammar, input);
        if !cli.quiet {
            println!();
            println!("{}", render_trace(&result.trace));
        }
        match &result.outcome {
            ParseState::Rejected(rejection) => println!("`{}` rejected: {}", input, rejection),
            _ => println!("`{}` accepted", input),
        }
        success &= result.accepted;
    }

    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
