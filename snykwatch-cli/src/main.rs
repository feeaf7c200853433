mod cli;

use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use cli::Cli;
use snykwatch::report::formatter;
use snykwatch::{CheckOptions, Checker, Config, SnykClient};

fn init_tracing(args: &Cli) {
    let filter = EnvFilter::builder()
        .with_default_directive(args.verbosity.tracing_level_filter().into())
        .from_env_lossy();
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if args.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(args: &Cli) -> Result<Config> {
    let mut config = Config::load(&args.config)?;

    if let Some(org) = &args.org {
        config.org_id = org.clone();
    }
    if let Some(token) = &args.token {
        config.api_token = Some(token.clone());
    }
    if !args.targets.is_empty() {
        config.targets_list = args.targets.clone();
    }
    if let Some(n) = args.max_concurrency {
        config.max_concurrency = n;
    }

    config.validate()?;
    Ok(config)
}

async fn run(args: &Cli) -> Result<()> {
    let config = load_config(args)?;
    debug!(?config, "configuration loaded");

    let client = SnykClient::with_timeout(config.token()?, config.timeout())
        .with_auth_scheme(config.auth_scheme);
    let checker = Checker::new(
        Arc::new(client),
        CheckOptions {
            max_concurrency: config.max_concurrency,
        },
    );

    let outcome = checker
        .check(&config.org_id, &config.targets_list)
        .await
        .context("high/critical issue check failed")?;
    info!(has_issues = outcome.has_issues(), "{}", outcome.message());

    let mut stdout = std::io::stdout().lock();
    formatter(args.json, args.show_issues).write_outcome(&outcome, &mut stdout)?;
    stdout.flush()?;
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Cli::parse();
    init_tracing(&args);

    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
