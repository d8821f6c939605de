//! Abacus CLI
//!
//! Serves the tutor API, or renders a single long-division board to the
//! terminal.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use abacus_report::{
    json::JsonGenerator, DivisionInput, MarkdownGenerator, ProgressReport, TopicInput,
};
use abacus_tutor::division::MAX_DIVISOR;
use abacus_tutor::{
    create_router, project, AppState, Config, DivisionSettings, Mode, ProgressSnapshot,
};
use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

/// Default port for the HTTP API server.
const DEFAULT_PORT: u16 = 3000;

/// Abacus - primary school maths tutor
///
/// Serves curriculum lessons, practice quizzes and a step-by-step long
/// division tutor over HTTP and WebSocket.
#[derive(Parser, Debug)]
#[command(name = "abacus")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file (default: abacus.json in current directory)
    #[arg(short, long, value_name = "FILE")]
    config: Option<String>,

    /// Output directory for progress reports
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long)]
    verbose: bool,

    /// Port for the HTTP API server
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Seed for the problem generator
    #[arg(long, value_name = "N")]
    seed: Option<u64>,

    /// Print the worked board for DIVIDEND/DIVISOR and exit
    #[arg(long, value_name = "DIVIDEND/DIVISOR")]
    divide: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if args.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::debug!(config = ?args.config, "Config file");
    tracing::debug!(output_dir = ?args.output_dir, "Output directory");

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let mut config = load_config(args.config.as_deref())?;

    if let Some(ref output_dir) = args.output_dir {
        config.output_dir.clone_from(output_dir);
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    // Re-validate after overrides
    config.validate()?;

    if let Some(ref input) = args.divide {
        return print_division(input);
    }

    serve(config, args.port).await
}

/// Runs the HTTP server until Ctrl+C, then writes the progress report.
async fn serve(config: Config, port: u16) -> anyhow::Result<()> {
    print_config(&config);

    let addr: SocketAddr = ([127, 0, 0, 1], port).into();
    let state = AppState::new(config.clone());
    let store = Arc::clone(&state.store);
    let router = create_router(state);

    let listener = TcpListener::bind(addr).await.map_err(|e| {
        anyhow::anyhow!(
            "Failed to bind to {addr}: {e}\n\nSuggestion: Try a different port with --port"
        )
    })?;

    println!();
    println!("Abacus running on http://{addr}");
    println!("Press Ctrl+C to stop");
    tracing::info!(%addr, "Abacus starting");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    println!();
    println!("Shutting down...");

    let progress = store.lock().await.progress();
    print_summary(&progress);
    write_reports(&progress, &config)?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        return;
    }
    tracing::info!("Received Ctrl+C, shutting down");
}

/// Loads configuration from the specified path or default location.
fn load_config(config_path: Option<&str>) -> anyhow::Result<Config> {
    match config_path {
        Some(path_str) => {
            let path = Path::new(path_str);
            if !path.exists() {
                anyhow::bail!(
                    "Config file not found: '{}'\n\nSuggestion: Check the path or remove the --config flag to use defaults",
                    path.display()
                );
            }
            Config::load_from_file(path).map_err(|e| anyhow::anyhow!("{e}"))
        }
        None => Config::load().map_err(|e| anyhow::anyhow!("{e}")),
    }
}

/// Parses `DIVIDEND/DIVISOR`.
fn parse_division(input: &str) -> anyhow::Result<DivisionSettings> {
    let Some((dividend, divisor)) = input.split_once('/') else {
        anyhow::bail!(
            "Invalid division '{input}'\n\nSuggestion: Write it as DIVIDEND/DIVISOR, e.g. --divide 532/4"
        );
    };
    let parse = |text: &str, what: &str| {
        text.trim().parse::<u64>().map_err(|e| {
            anyhow::anyhow!("Invalid {what} '{}': {e}", text.trim())
        })
    };
    Ok(DivisionSettings {
        dividend: parse(dividend, "dividend")?,
        divisor: parse(divisor, "divisor")?,
    })
}

/// Renders the fully worked board for `input`.
///
/// Any divisor the tutor supports is accepted; `division.maxDivisor` only
/// bounds random problems.
fn render_division(input: &str) -> anyhow::Result<String> {
    let problem = parse_division(input)?.validate(MAX_DIVISOR)?;
    let steps = problem.steps();
    let board = project(&steps, steps.len().saturating_sub(1), Mode::Learn);
    Ok(format!(
        "{problem} = {} r {}\n\n{}",
        problem.quotient(),
        problem.remainder(),
        board.to_text()
    ))
}

fn print_division(input: &str) -> anyhow::Result<()> {
    println!("{}", render_division(input)?);
    Ok(())
}

/// Prints the loaded configuration.
fn print_config(config: &Config) {
    println!("Configuration loaded:");
    println!("  Autoplay interval: {}ms", config.autoplay_interval_ms);
    println!(
        "  Random dividends: {} digits, divisors {}..={}",
        config.division.dividend_digits, config.division.min_divisor, config.division.max_divisor
    );
    println!("  Max sessions: {}", config.max_sessions);
    if let Some(seed) = config.seed {
        println!("  Seed: {seed}");
    }
    println!("  Output directory: {}", config.output_dir);
}

/// Prints a summary of the session's progress.
fn print_summary(progress: &ProgressSnapshot) {
    println!("=== Abacus Summary ===");
    for topic in &progress.topics {
        println!(
            "{}: {} of {} correct (best streak {})",
            topic.topic, topic.stats.correct, topic.stats.attempts, topic.stats.best_streak
        );
    }
    println!(
        "Long division: {} problems completed, {} mistakes",
        progress.division.problems_completed, progress.division.mistakes
    );
}

/// Converts tutor progress into a report.
fn build_report(progress: &ProgressSnapshot) -> anyhow::Result<ProgressReport> {
    let topics = progress
        .topics
        .iter()
        .map(|t| {
            TopicInput::new(
                t.topic.as_str(),
                t.stats.attempts,
                t.stats.correct,
                t.stats.best_streak,
            )
        })
        .collect();

    let report = ProgressReport::builder()
        .topics(topics)
        .division(DivisionInput {
            problems_completed: progress.division.problems_completed,
            steps_answered: progress.division.steps_answered,
            mistakes: progress.division.mistakes,
        })
        .build()?;
    Ok(report)
}

/// Writes the reports selected by `config.report_format`.
fn write_reports(progress: &ProgressSnapshot, config: &Config) -> anyhow::Result<()> {
    println!();
    println!("Generating reports...");

    let report = build_report(progress)?;
    let output_dir = PathBuf::from(&config.output_dir);
    std::fs::create_dir_all(&output_dir)?;

    if config.report_format.wants_markdown() {
        let md_path = output_dir.join("abacus-report.md");
        std::fs::write(&md_path, MarkdownGenerator::new(&report).generate())?;
        println!("  Markdown report: {}", md_path.display());
    }

    if config.report_format.wants_json() {
        let json_path = output_dir.join("abacus-report.json");
        JsonGenerator::new(&report).write_to_file(&json_path, true)?;
        println!("  JSON report: {}", json_path.display());
    }

    Ok(())
}
