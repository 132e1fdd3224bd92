mod cli;
mod config;
mod download;
mod extract;
mod install;
mod manifest;
mod types;


use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, SummaryFormat};
use config::resolve_config;
use download::HttpSource;
use install::Installer;
use manifest::load_manifest;
use types::{ModuleReport, Outcome};

fn main() {
    let cli = Cli::parse();

    setup_logging(&cli);

    // Error level keeps the tool-name prefix under `-q` and RUST_LOG=error
    let span = tracing::error_span!("terratar");
    let _guard = span.enter();

    if let Err(e) = run(&cli) {
        tracing::error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = resolve_config(cli)?;

    let modules = load_manifest(&config.manifest_path)
        .with_context(|| format!("error processing {}", config.manifest_path.display()))?;
    if modules.is_empty() {
        tracing::warn!("No modules declared in {}", config.manifest_path.display());
    }

    let source = HttpSource::new(config.timeout, !cli.quiet)
        .context("Could not initialize HTTP client")?;
    let installer = Installer::new(source, config.install);
    tracing::debug!("Install settings: {:?}", installer.settings());

    let reports = installer.install_all(&modules)?;
    print_summary(&reports, cli.format)?;

    Ok(())
}

fn setup_logging(cli: &Cli) {
    use tracing_subscriber::{fmt, EnvFilter};

    let level = if cli.quiet {
        "error"
    } else if cli.verbose == 0 {
        "warn,terratar=info"
    } else if cli.verbose == 1 {
        "warn,terratar=debug"
    } else {
        "debug"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .init();
}

fn print_summary(reports: &[ModuleReport], format: SummaryFormat) -> Result<()> {
    match format {
        SummaryFormat::Json => {
            println!("{}", serde_json::to_string_pretty(reports)?);
        }
        SummaryFormat::Plain => {
            println!("--- Terratar Modules ---");
            if reports.is_empty() {
                println!("  No modules processed.");
            }
            for report in reports {
                println!("  - {}: {}", report.name, report.outcome);
            }

            let failed = reports.iter().filter(|r| r.outcome.is_failed()).count();
            let installed = reports
                .iter()
                .filter(|r| r.outcome == Outcome::Installed)
                .count();
            println!(
                "------------------------\n  {} installed, {} skipped, {} failed",
                installed,
                reports.len() - installed - failed,
                failed
            );
        }
    }
    Ok(())
}
