use std::{
    path::{Path, PathBuf},
    process::ExitCode,
    time::Duration,
};

use anyhow::{Context, Result};
use batchpit::batch::read_request_file;
use batchpit::config::{load_config, RunSettings, SettingsBuilder};
use batchpit::executor::{
    print_result_line, print_saved, print_summary, write_results, BatchRunner, BatchSummary,
    ConsoleProgress, RunnerOptions,
};
use batchpit::lifecycle::KeepAlive;
use clap::Parser;
use colored::Colorize;

#[derive(Parser, Debug)]
#[command(
    name = "batchpit",
    version,
    about = "Concurrent batch HTTP runner",
    disable_help_subcommand = true
)]
struct Cli {
    /// JSON file with the array of requests to send
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// File the JSON array of responses is written to
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Directory or file containing batchpit.json
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Select a profile from batchpit.json
    #[arg(short = 'P', long)]
    profile: Option<String>,

    /// Override base directory used for resolving paths
    #[arg(long)]
    cwd: Option<PathBuf>,

    /// Give up on a request after this many seconds
    #[arg(long, value_name = "SECS", value_parser = parse_timeout)]
    timeout: Option<Duration>,

    /// Hold a local listener open while the batch runs
    #[arg(long)]
    keep_alive: bool,

    /// Print one line per request after the batch completes
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only report fatal errors
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {:#}", "Error executing requests:".red(), err);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let base_dir = cli
        .cwd
        .as_ref()
        .map(|p| resolve_path(Path::new(p)))
        .transpose()?
        .unwrap_or(std::env::current_dir()?);

    let config_target = cli
        .config
        .as_ref()
        .map(|p| resolve_relative(&base_dir, p))
        .unwrap_or_else(|| base_dir.clone());

    let cfg = load_config(&config_target).context("loading configuration")?;

    let settings = SettingsBuilder::new(base_dir, cfg)
        .profile(cli.profile.clone())
        .input(cli.input.clone())
        .output(cli.output.clone())
        .timeout(cli.timeout)
        .keep_alive(cli.keep_alive)
        .build()?;

    let keep_alive = if settings.keep_alive {
        let keep_alive = KeepAlive::bind().await?;
        if !cli.quiet {
            println!(
                "{}",
                format!("Listener running on port {}", keep_alive.port()?).blue()
            );
        }
        Some(keep_alive)
    } else {
        None
    };

    let outcome = execute_batch(&settings, &cli).await;

    if let Some(keep_alive) = keep_alive {
        keep_alive.release();
        if !cli.quiet {
            let message = if outcome.is_ok() {
                "Listener stopped"
            } else {
                "Listener stopped with errors"
            };
            println!("{}", message.yellow());
        }
    }

    outcome
}

async fn execute_batch(settings: &RunSettings, cli: &Cli) -> Result<()> {
    let descriptors = read_request_file(&settings.input).await?;
    let total = descriptors.len();

    if !cli.quiet {
        let profile = settings
            .profile_name
            .as_deref()
            .map(|name| format!(" (profile {name})"))
            .unwrap_or_default();
        println!(
            "{}",
            format!(
                "Loaded {} requests from {}{}",
                total,
                settings.input.display(),
                profile
            )
            .dimmed()
        );
    }

    let progress = ConsoleProgress::start(total, !cli.quiet);
    let runner = BatchRunner::new(RunnerOptions {
        timeout: settings.timeout,
    });
    let results = runner
        .run(descriptors, |completed, total| {
            progress.update(completed, total)
        })
        .await;
    progress.finish();

    if cli.verbose {
        for result in &results {
            print_result_line(result);
        }
    }
    if !cli.quiet {
        print_summary(&BatchSummary::from_results(&results));
    }

    write_results(&settings.output, &results)?;

    if !cli.quiet {
        print_saved(&settings.output);
    }
    Ok(())
}

fn parse_timeout(value: &str) -> std::result::Result<Duration, String> {
    let secs: f64 = value
        .parse()
        .map_err(|_| format!("'{value}' is not a number of seconds"))?;
    if !secs.is_finite() || secs <= 0.0 {
        return Err("timeout must be greater than zero".to_string());
    }
    Ok(Duration::from_secs_f64(secs))
}

fn resolve_path(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

fn resolve_relative(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
