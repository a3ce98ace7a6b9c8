use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "modlicense",
    about = "Attribute licenses across a Go module dependency graph and resolve verifiable license URLs",
    version
)]
pub struct Cli {
    /// Root import path patterns to start the walk from
    #[arg(default_value = "./...")]
    pub patterns: Vec<String>,

    /// Workspace directory containing the main module
    #[arg(long, default_value = ".")]
    pub dir: PathBuf,

    /// Report format
    #[arg(long, default_value = "terminal", value_name = "FORMAT")]
    pub format: ReportFormat,

    /// Write the report to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Config file [default: ./.modlicense/config.toml, fallback ~/.config/modlicense/config.toml]
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Path to the go binary (overrides config)
    #[arg(long, value_name = "PATH")]
    pub go_bin: Option<String>,

    /// Skip remote content validation and report unverified URLs
    #[arg(long)]
    pub no_validate: bool,

    /// Show all libraries (not just failures)
    #[arg(short, long)]
    pub verbose: bool,

    /// Only print the summary line
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum ReportFormat {
    Terminal,
    Csv,
}
