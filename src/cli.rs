use clap::{Parser, ValueEnum};
use std::path::PathBuf;

fn get_version() -> &'static str {
    const BASE_VERSION: &str = env!("CARGO_PKG_VERSION");

    // A tagged HEAD is a release build; report the tag alone
    if let Some(tag) = option_env!("TERRATAR_GIT_TAG") {
        return tag;
    }

    let commit = option_env!("TERRATAR_GIT_COMMIT").unwrap_or("unknown");
    let branch = option_env!("TERRATAR_GIT_BRANCH").unwrap_or("unknown");

    // Leaked once at startup so clap can hold a 'static str
    let version = format!("v{}-{} ({})", BASE_VERSION, commit, branch);
    Box::leak(version.into_boxed_str())
}

#[derive(Parser, Debug)]
#[command(name = "terratar")]
#[command(about = "Vendor remote tar.gz modules declared in a Terratar manifest")]
#[command(version = get_version())]
pub struct Cli {
    /// Filepath of the Terratar manifest [default: ./Terratar.yml]
    #[arg(short = 'f', long = "terratar-file", value_name = "PATH")]
    pub terratar_file: Option<PathBuf>,

    /// Modules install directory [default: .vendor/modules next to the manifest]
    #[arg(short = 'p', long = "module-path", value_name = "PATH")]
    pub module_path: Option<PathBuf>,

    /// Overwrite if module directory already exists, otherwise skip it
    #[arg(long)]
    pub overwrite: bool,

    /// Record invalid manifest entries as failures instead of aborting the run
    #[arg(long)]
    pub lenient: bool,

    /// Total timeout in seconds for each archive download (no timeout by default)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Format of the summary printed after the run
    #[arg(long, value_enum, default_value_t = SummaryFormat::Plain)]
    pub format: SummaryFormat,

    /// Increase verbosity (use multiple times for more detail)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Reduce output to errors only
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SummaryFormat {
    Plain,
    Json,
}
