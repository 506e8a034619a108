use clap::{Parser, Subcommand};
use podium::adapters::{Notify, Scoreboard, ScoreboardClient, TelegramNotifier};
use podium::config::AppConfig;
use podium::cycle::PollCycle;
use podium::error::Result;
use podium::ranking;
use podium::store::EventStore;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "podium", about = "Contest scoreboard watcher for Telegram")]
struct Cli {
    /// Configuration directory
    #[arg(long, default_value = "config")]
    config_dir: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the poll loop (default)
    Run,
    /// Seed announce state from the most recent feed events so the first
    /// real run does not replay the whole contest
    Bootstrap,
    /// Post one ranking summary and exit
    Summary,
    /// Fetch both endpoints and report what they return, without sending
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_from(&cli.config_dir)?;
    if let Err(errors) = config.validate() {
        for e in &errors {
            eprintln!("config error: {e}");
        }
        std::process::exit(1);
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            init_logging(&config);
            run_loop(config).await
        }
        Commands::Bootstrap => {
            init_logging(&config);
            run_bootstrap(config).await
        }
        Commands::Summary => {
            init_logging(&config);
            run_summary(config).await
        }
        Commands::Check => {
            init_logging_simple();
            run_check(config).await
        }
    }
}

async fn run_loop(config: AppConfig) -> Result<()> {
    let store = EventStore::load(&config.state.path)?;
    let feed = scoreboard_client(&config)?;
    let notifier = TelegramNotifier::new(
        &config.telegram.api_url,
        &config.telegram.bot_token,
        &config.telegram.chat_id,
    );

    info!(
        roster = config.roster.len(),
        prefix = %config.roster.prefix,
        "tracking teams"
    );

    let poll_interval = Duration::from_secs(config.poll.interval_secs);
    let mut cycle = PollCycle::new(&config, store, feed, notifier);

    tokio::select! {
        res = cycle.run(poll_interval) => res,
        _ = shutdown_signal() => {
            info!("shutdown requested, stopping between ticks");
            Ok(())
        }
    }
}

async fn run_bootstrap(config: AppConfig) -> Result<()> {
    let mut store = EventStore::load(&config.state.path)?;
    let feed = scoreboard_client(&config)?;

    let events = feed.history().await?;
    if store.bootstrap(&events, config.poll.batch_cap)? {
        println!(
            "seeded {} events, watermark {} -> {}",
            store.announced_len(),
            store.watermark(),
            config.state.path.display()
        );
    } else {
        println!("state already exists at {}, nothing to do", config.state.path.display());
    }
    Ok(())
}

async fn run_summary(config: AppConfig) -> Result<()> {
    let feed = scoreboard_client(&config)?;
    let notifier = TelegramNotifier::new(
        &config.telegram.api_url,
        &config.telegram.bot_token,
        &config.telegram.chat_id,
    );

    let table = feed.scores().await?;
    let ranked = ranking::rank(&table);
    let msg = ranking::render_summary(
        &ranked,
        &config.roster,
        chrono::Utc::now() - config.contest.start,
    );
    notifier.send(&msg).await?;
    println!("summary posted ({} entities ranked)", ranked.len());
    Ok(())
}

async fn run_check(config: AppConfig) -> Result<()> {
    let feed = scoreboard_client(&config)?;

    let events = feed.history().await?;
    let tracked = events
        .iter()
        .filter(|e| config.roster.contains(&e.team))
        .count();
    println!(
        "history: {} events ({} from tracked teams), max timestamp {}",
        events.len(),
        tracked,
        events.iter().map(|e| e.timestamp).max().unwrap_or(0)
    );

    let table = feed.scores().await?;
    println!("scores: {} entities on the board", table.len());
    Ok(())
}

fn scoreboard_client(config: &AppConfig) -> Result<ScoreboardClient> {
    ScoreboardClient::new(
        &config.scoreboard.history_url,
        &config.scoreboard.scores_url,
        config.scoreboard.request_timeout_secs,
    )
}

fn init_logging(config: &AppConfig) {
    let default = format!("{},podium=debug", config.logging.level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

fn init_logging_simple() {
    // Minimal logging for CLI commands
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .try_init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => error!("Failed to install SIGTERM handler: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
