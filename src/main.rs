use clap::Parser;
use log::*;
use secrecy::SecretString;

mod cli;
mod config;
mod exec;
mod forge;
mod orchestrator;
mod result;
mod strategy;
mod version;
mod workspace;

use crate::{
    config::UpgradeTarget,
    orchestrator::{Orchestrator, RunSettings},
    result::Result,
};

fn initialize_logger(debug: bool) -> Result<()> {
    let filter = if debug {
        simplelog::LevelFilter::Debug
    } else {
        simplelog::LevelFilter::Info
    };

    let config = simplelog::ConfigBuilder::new()
        .add_filter_allow_str("wrapperbot")
        .build();

    simplelog::TermLogger::init(
        filter,
        config,
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    Ok(())
}

async fn process_target(
    target: &UpgradeTarget,
    token: Option<SecretString>,
    settings: &RunSettings,
) -> Result<()> {
    let remote = forge::config::RemoteConfig::from_repo(&target.repo, token)?;
    let github = forge::github::Github::new(remote)?;
    let workspace = workspace::GitWorkspace::new(
        settings.dry_run,
        settings.unsigned_commits,
    );
    let strategy = strategy::for_build_tool(&target.build_tool);

    let orchestrator = Orchestrator::new(
        target.clone(),
        strategy,
        Box::new(workspace),
        Box::new(github),
        settings.clone(),
    );

    orchestrator.run().await?;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = cli::Args::parse();

    initialize_logger(args.debug)?;

    let config = config::Config::load(&args.config)?;
    let settings = args.run_settings();
    let token = args.github_token();

    if token.is_none() {
        warn!("no access token configured: running unauthenticated");
    }

    if config.upgrades.is_empty() {
        warn!("no upgrade targets configured: nothing to do");
        return Ok(());
    }

    // Targets are independent units of work. Host calls are serialized
    // across targets so a single run stays within API rate limits.
    let mut failed = 0usize;
    for target in config.upgrades.iter() {
        info!("processing upgrade target '{}'", target.name);
        if let Err(err) =
            process_target(target, token.clone(), &settings).await
        {
            error!("upgrade of '{}' failed: {err:#}", target.name);
            failed += 1;
        }
    }

    if failed > 0 {
        return Err(color_eyre::eyre::eyre!(
            "{failed} upgrade target(s) failed"
        ));
    }

    Ok(())
}
