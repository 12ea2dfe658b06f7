//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueHint};

/// Copy hand-drawn annotation overlays from an edited SVG into a freshly generated one
#[derive(Parser, Debug)]
#[command(name = "annotransfer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Either one expression ('source.svg>target.svg' or 'target.svg<source.svg') or SOURCE TARGET
    #[arg(value_name = "PATHS", value_hint = ValueHint::FilePath)]
    pub paths: Vec<PathBuf>,

    /// Direction expression: 'source.svg>target.svg' or 'target.svg<source.svg'
    #[arg(short, long)]
    pub expr: Option<String>,

    /// SVG containing manually added annotations
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub source: Option<PathBuf>,

    /// SVG to receive the annotations
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub target: Option<PathBuf>,

    /// Only copy these group ids
    #[arg(long, num_args = 1.., value_name = "ID")]
    pub include: Vec<String>,

    /// Skip these group ids
    #[arg(long, num_args = 1.., value_name = "ID")]
    pub exclude: Vec<String>,

    /// Report what would change without writing the target
    #[arg(long)]
    pub dry_run: bool,

    /// List candidate annotation group ids of an SVG and exit
    #[arg(long, value_name = "SVG", value_hint = ValueHint::FilePath)]
    pub list_groups: Option<PathBuf>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    pub show_config: bool,

    /// Print a shell completion script and exit
    #[arg(long, value_enum, value_name = "SHELL")]
    pub completion: Option<clap_complete::Shell>,

    /// Debug output: -d info, -dd debug, -ddd trace
    #[arg(short, long, action = ArgAction::Count)]
    pub debug: u8,
}
