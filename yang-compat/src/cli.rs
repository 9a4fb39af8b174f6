use std::path::PathBuf;

use clap::Parser;
use yang_compat::report::ReportFormat;
use yang_compat_core::RfcVersion;

#[derive(Parser, Debug)]
#[command(name = "yang-compat")]
#[command(about = "Check YANG module revisions for backward compatibility")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Compare a new module revision against an old one.
    Check(CheckArgs),
}

#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// New module file (YIN). Exactly one is accepted.
    #[arg(required = true)]
    pub new: Vec<PathBuf>,
    /// Old module file (YIN).
    #[arg(long)]
    pub from: PathBuf,
    /// Search directory for the old module's imports. Repeatable.
    #[arg(long)]
    pub from_path: Vec<PathBuf>,
    /// Search directory for the new module's imports. Repeatable.
    #[arg(long)]
    pub path: Vec<PathBuf>,
    /// YANG language rules to apply: 6020 or 7950.
    #[arg(long)]
    pub rfc_version: Option<RfcVersion>,
    #[arg(long, value_enum)]
    pub format: Option<ReportFormat>,
    /// Optional TOML settings file. Defaults to ./yang-compat.toml if present.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Exit non-zero when any error-severity finding is reported.
    #[arg(long)]
    pub strict: bool,
}
