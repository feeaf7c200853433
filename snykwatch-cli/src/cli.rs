use std::path::PathBuf;

use clap::Parser;
use clap_verbosity_flag::{Verbosity, WarnLevel};

/// Report which Snyk targets have open high or critical issues
#[derive(Parser)]
#[command(name = "snykwatch", version)]
pub struct Cli {
    /// Path to a JSON or YAML config file
    #[arg(short, long, default_value = "config.json")]
    pub config: PathBuf,

    /// Organization id (overrides org_id from the config file)
    #[arg(long)]
    pub org: Option<String>,

    /// Snyk API token (overrides api_token from the config file)
    #[arg(long, env = "SNYK_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Target display name to check; repeat to check several (replaces targets_list)
    #[arg(short = 't', long = "target")]
    pub targets: Vec<String>,

    /// Print the result as JSON and log as JSON on stderr
    #[arg(long)]
    pub json: bool,

    /// List issue titles under each target that has issues
    #[arg(long)]
    pub show_issues: bool,

    /// Maximum concurrent project lookups
    #[arg(long)]
    pub max_concurrency: Option<usize>,

    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,
}
