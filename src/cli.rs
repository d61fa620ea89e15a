use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    /// File containing the productions, one `A->alpha` per line
    pub file: PathBuf,

    /// Strings to recognize with the predictive parser
    pub inputs: Vec<String>,

    /// Amount of random sentences of the original grammar to print
    #[arg(short = 'n', long = "generate", value_name = "AMOUNT")]
    pub amount: Option<u32>,

    /// Seed for the sentence generator
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Derivation depth after which generated sentences take the shortest way out
    #[arg(long, value_name = "DEPTH", default_value_t = 16)]
    pub max_depth: usize,

    /// Only print the verdict for each input
    #[arg(short, long)]
    pub quiet: bool
}
