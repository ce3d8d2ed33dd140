use anyhow::{Context, Result};
use clap::Parser;
use debtcloset::{cli, config, logging, reconcile, reporter};
use tracing::debug;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    match cli.command {
        cli::Commands::Exclude(args) => exclude_command(args)?,
        cli::Commands::Clear(args) => clear_command(args)?,
        cli::Commands::Show(args) => show_command(args)?,
    }

    Ok(())
}

fn exclude_command(args: cli::ExcludeArgs) -> Result<()> {
    let target = &args.target;
    logging::init(target.verbose);

    let config =
        config::load_config(target.config.as_deref()).context("Failed to load configuration")?;
    debug!(?config, "configuration loaded");

    let report = reconcile::reconcile(&target.path, target.tool, &args.require, &config)
        .with_context(|| format!("Failed to exclude {} debt", target.tool))?;

    reporter::generate_report(&report, args.format, args.output.as_deref())
        .context("Failed to generate report")?;

    Ok(())
}

fn clear_command(args: cli::TargetArgs) -> Result<()> {
    logging::init(args.verbose);

    let config =
        config::load_config(args.config.as_deref()).context("Failed to load configuration")?;
    let profile = config.profile(args.tool);

    let config_path = args.path.join(&config.config_file);
    if !config_path.is_file() {
        return Err(debtcloset::DebtError::ConfigNotFound(config_path).into());
    }

    let removed = reconcile::remove_exclusions(&args.path, &profile, &config.config_file)
        .context("Failed to clear exclusions")?;

    println!(
        "Removed {} exclusion(s) from {} in {}",
        removed.len(),
        profile.header,
        config_path.display()
    );

    Ok(())
}

fn show_command(args: cli::TargetArgs) -> Result<()> {
    logging::init(args.verbose);

    let config =
        config::load_config(args.config.as_deref()).context("Failed to load configuration")?;
    let profile = config.profile(args.tool);

    let current = reconcile::current_exclusions(&args.path, &profile, &config.config_file)
        .context("Failed to read exclusions")?;

    for entry in current {
        println!("{}", entry);
    }

    Ok(())
}
