use clap::Parser;
use std::path::PathBuf;

/// Files rewritten when no inputs are given on the command line
pub const DEFAULT_INPUTS: [&str; 3] = [
    "kidney_content.json",
    "parkinson_content.json",
    "thyroid_content.json",
];

/// Convert HTML "content" fields in JSON documents into heading sections
#[derive(Parser, Debug)]
#[command(name = "sectionize", version, about)]
pub struct Cli {
    /// JSON files to transform. Each file is rewritten in place unless --output is given.
    #[arg(default_values = DEFAULT_INPUTS)]
    pub inputs: Vec<PathBuf>,

    /// Write the transformed JSON to this path instead of overwriting the input.
    /// Only valid with a single input file.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Parse and report what would change without writing any files
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}
