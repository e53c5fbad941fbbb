//! ContestRank - contest leaderboards from a roster and a scoring service
//!
//! A CLI tool that fetches scores for every handle on a roster,
//! ranks the participants, and writes a leaderboard report with
//! summary statistics and a score distribution.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (invalid roster, config, unreachable service, etc.)
//!   2 - Some scoring batches failed or were cancelled and --strict was set
//!   130 - Interrupted twice

mod analysis;
mod cli;
mod config;
mod error;
mod fetch;
mod models;
mod pipeline;
mod report;
mod roster;

use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::Config;
use fetch::{HttpScoreService, ScoreService};
use models::{Report, ReportMetadata};
use pipeline::{Pipeline, RunContext};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args);

    info!("ContestRank v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run_app(args).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Run failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .contestrank.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(config::CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            config::CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", config::CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", config::CONFIG_FILE_NAME);
    println!("   Edit it to customize the scoring service, batch size, and report.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Dispatch to the requested mode. Returns the process exit code.
async fn run_app(args: Args) -> Result<i32> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    config.validate()?;

    if let Some(ref handle) = args.user {
        return handle_user_lookup(&config, handle).await;
    }

    let roster_path = args
        .roster
        .clone()
        .context("A roster file is required (use --roster)")?;

    run_leaderboard(&args, &config, &roster_path).await
}

/// Build the leaderboard for a roster file and write the report.
async fn run_leaderboard(args: &Args, config: &Config, roster_path: &Path) -> Result<i32> {
    let start_time = Instant::now();

    // Step 1: Load and validate the roster before touching the network
    println!("📋 Loading roster: {}", roster_path.display());
    let members = roster::load_roster(roster_path)
        .with_context(|| format!("Failed to load roster from {}", roster_path.display()))?;
    info!("Roster has {} participants", members.len());

    if args.dry_run {
        return handle_dry_run(members.len(), config.service.batch_size);
    }

    // Step 2: Fetch, rank and summarize
    println!("🌐 Fetching scores from {}", config.service.base_url);
    println!(
        "   {} participants, batches of {}",
        members.len(),
        config.service.batch_size
    );

    let service = HttpScoreService::new(&config.service.base_url, config.service.timeout_seconds)
        .context("Failed to create HTTP client")?;
    let pipeline = Pipeline::new(Arc::new(service))
        .with_batch_size(config.service.batch_size)
        .with_progress(!args.quiet);

    let ctx = Arc::new(RunContext::new());
    let signal_ctx = Arc::clone(&ctx);
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        warn!("Interrupt received; finishing current batch and stopping (Ctrl-C again to abort)");
        signal_ctx.cancel();

        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\n❌ Aborted.");
            std::process::exit(130);
        }
    });

    let result = pipeline.run(&members, &ctx).await;
    watcher.abort();
    let leaderboard = result?;

    for warning in &leaderboard.warnings {
        eprintln!("⚠️  {}", warning);
    }
    if leaderboard.batches_skipped > 0 {
        eprintln!(
            "⚠️  Run cancelled: {} of {} batches not requested ({} handles skipped)",
            leaderboard.batches_skipped, leaderboard.batches_total, leaderboard.handles_skipped
        );
    }

    // Step 3: Build the report
    println!("\n📝 Generating report...");

    let duration = start_time.elapsed().as_secs_f64();
    let curve = if config.report.include_curve {
        leaderboard.distribution.curve()
    } else {
        Vec::new()
    };

    let metadata = ReportMetadata {
        roster_path: roster_path.display().to_string(),
        service_url: config.service.base_url.clone(),
        generated_at: Utc::now(),
        roster_size: members.len(),
        batches_total: leaderboard.batches_total,
        batches_failed: leaderboard.warnings.len(),
        batches_skipped: leaderboard.batches_skipped,
        duration_seconds: duration,
    };

    let report = Report {
        metadata,
        leaderboard,
        curve,
    };

    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&report, &config.report),
    };

    let output_path = output_path(args, config);
    std::fs::write(&output_path, &output)
        .with_context(|| format!("Failed to write report to {}", output_path.display()))?;

    // Print summary
    let board = &report.leaderboard;
    println!("\n📊 Leaderboard Summary:");
    println!(
        "   Ranked: {} | Not found: {} | Failed batches: {} | Cancelled batches: {}",
        board.ranked_count(),
        board.entries.len() - board.ranked_count(),
        board.warnings.len(),
        board.batches_skipped
    );
    if board.ranked_count() > 0 {
        println!(
            "   Average: {:.2} | Median: {:.2} | Top: {}",
            board.summary.mean, board.summary.median, board.summary.top
        );
        println!(
            "   Active in last 7 days: {} / {}",
            board.activity.active, board.activity.total
        );
        if let Some(bin) = board.distribution.mean_marker() {
            println!("   Mean falls in range {}", bin.label());
        }
    } else {
        println!("   No score data returned.");
    }
    println!("   Duration: {:.1}s", duration);
    println!(
        "\n✅ Leaderboard complete! Report saved to: {}",
        output_path.display()
    );

    if args.strict && board.is_partial() {
        eprintln!(
            "\n⛔ {} scoring batch(es) failed and {} were skipped. Failing (exit code 2).",
            board.warnings.len(),
            board.batches_skipped
        );
        return Ok(2);
    }

    Ok(0)
}

/// Handle --dry-run: print the batch plan, exit.
fn handle_dry_run(participants: usize, batch_size: usize) -> Result<i32> {
    let batch_size = batch_size.max(1);
    let batches = participants.div_ceil(batch_size);

    println!("\n🔍 Dry run: roster is valid (no scoring requests made)\n");
    println!("   Participants: {}", participants);
    println!("   Batches: {} (up to {} handles each)", batches, batch_size);
    if batches > 0 {
        let last = participants - (batches - 1) * batch_size;
        println!("   Last batch: {} handles", last);
    }

    println!("\n✅ Dry run complete.");
    Ok(0)
}

/// Handle --user: look up and print a single handle.
async fn handle_user_lookup(config: &Config, handle: &str) -> Result<i32> {
    let service = HttpScoreService::new(&config.service.base_url, config.service.timeout_seconds)
        .context("Failed to create HTTP client")?;

    println!("🔎 Looking up {}", handle);
    let user = service
        .fetch_user(handle)
        .await
        .with_context(|| format!("Failed to fetch scores for {}", handle))?;

    match user.score {
        Some(score) => {
            println!("\n📊 {}", user.handle);
            println!("   Custom Score: {}", score);
            println!(
                "   Recent Active Date: {}",
                user.recent_active_date.as_deref().unwrap_or("NA")
            );
        }
        None => println!("\nℹ️  User not found: {}", user.handle),
    }

    Ok(0)
}

/// Resolve the report path, switching the default extension for JSON output.
fn output_path(args: &Args, config: &Config) -> PathBuf {
    let path = PathBuf::from(&config.general.output);
    if args.output.is_none() && args.format == OutputFormat::Json {
        return path.with_extension("json");
    }
    path
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", config::CONFIG_FILE_NAME);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
