use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Target {
    Go,
    Ts,
    Java,
}

#[derive(Parser)]
#[clap(version, about)]
pub struct Cli {
    /// The `.tm` source file to compile
    #[clap(value_parser)]
    pub input: PathBuf,

    /// The target language to emit
    #[clap(long, value_enum)]
    pub target: Target,

    /// The directory the generated source is written to
    #[clap(long)]
    pub out: PathBuf,
}
