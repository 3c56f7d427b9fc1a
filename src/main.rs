use {
    anyhow::{Context, Result},
    clap::{Args, Parser, Subcommand},
    dotenv::dotenv,
    log::{error, info},
    sol_token_detector::{
        config::{MonitorConfig, DEFAULT_CONFIG_FILE},
        managers::store_manager::DEFAULT_STORE_FILE,
        utils::{
            report::format_history_entry,
            risk_classifier::HIGH_RISK_CEILING,
            rug_check::DEFAULT_BASE_URL,
        },
        JsonFileStore, MonitorManager, MonitorStats, RecordStore, RugCheckClient, TokenReport,
    },
    std::{
        path::{Path, PathBuf},
        sync::Arc,
    },
    tokio::sync::mpsc,
    tokio_util::sync::CancellationToken,
};

#[derive(Parser)]
#[command(name = "sol_token_detector", about = "Real-time Solana token detection with rug-pull risk analysis")]
struct Cli {
    /// Path of the JSON config file.
    #[arg(long, env = "DETECTOR_CONFIG", default_value = DEFAULT_CONFIG_FILE, global = true)]
    config: PathBuf,

    /// Path of the file LOW risk tokens are saved to.
    #[arg(long, env = "DETECTOR_STORE", default_value = DEFAULT_STORE_FILE, global = true)]
    store: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Poll for new tokens until Ctrl+C.
    Monitor {
        #[arg(long, env = "RUGCHECK_API_URL", default_value = DEFAULT_BASE_URL)]
        api_url: String,
    },
    /// List saved tokens.
    History,
    /// Show or edit the configuration.
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand)]
enum ConfigCommand {
    Show,
    Set(SetArgs),
}

#[derive(Args)]
struct SetArgs {
    /// Score tokens must exceed to be saved (1-100).
    #[arg(long, allow_negative_numbers = true)]
    threshold: Option<i64>,
    /// Seconds between polls (5-300).
    #[arg(long, allow_negative_numbers = true)]
    interval: Option<i64>,
    /// HTTP timeout in seconds (10-120).
    #[arg(long, allow_negative_numbers = true)]
    timeout: Option<i64>,
}

#[tokio::main(flavor = "multi_thread", worker_threads = 4)]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Command::Monitor { api_url } => run_monitor(&cli.config, &cli.store, &api_url).await,
        Command::History => {
            show_history(&JsonFileStore::new(&cli.store));
            Ok(())
        }
        Command::Config(ConfigCommand::Show) => {
            show_config(&MonitorConfig::load_or_init(&cli.config));
            Ok(())
        }
        Command::Config(ConfigCommand::Set(args)) => edit_config(&cli.config, args),
    }
}

async fn run_monitor(config_path: &Path, store_path: &Path, api_url: &str) -> Result<()> {
    let config = MonitorConfig::load_or_init(config_path);
    let source = RugCheckClient::new(api_url, config.api_timeout()).context("Failed to build HTTP client")?;
    let store = JsonFileStore::new(store_path);

    println!("\n🔍 Starting monitoring with threshold: {}+", config.score_threshold);
    println!("⏱️  Polling interval: {} seconds", config.polling_interval);
    println!("Press Ctrl+C to stop monitoring\n");

    let shutdown = CancellationToken::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupt received, stopping after the current token");
                shutdown.cancel();
            }
        });
    }

    let (tx, mut rx) = mpsc::channel::<TokenReport>(100);
    let printer = tokio::spawn(async move {
        while let Some(report) = rx.recv().await {
            println!("{}\n\n", report);
        }
    });

    let mut manager = MonitorManager::new(&config, Arc::new(source), Arc::new(store), tx);
    let result = manager.run(&shutdown).await;
    let stats = manager.stats();
    drop(manager);
    printer.await.context("Report printer panicked")?;

    println!("\n🛑 Monitoring stopped.");
    print_stats(&stats);
    if let Err(e) = &result {
        error!("{:?}", e);
    }
    result.context("Monitoring ended with an unrecoverable store error")
}

fn print_stats(stats: &MonitorStats) {
    println!("\n📊 Session Statistics:");
    println!("   Poll cycles:   {}", stats.cycles);
    println!("   Discovered:    {}", stats.discovered);
    println!("   Analysed:      {}", stats.processed);
    println!("   Unavailable:   {}", stats.unavailable);
    println!("   Saved:         {}", stats.stored);
}

fn show_history(store: &JsonFileStore) {
    let entries = store.load_entries();
    if entries.is_empty() {
        println!("\n📭 No tokens found in {}", store.path().display());
        return;
    }

    println!("\n📊 Historical Data - {} tokens found", entries.len());
    println!("{}", "=".repeat(80));
    for (i, entry) in entries.iter().enumerate() {
        println!("\n{}", format_history_entry(i + 1, entry));
    }
    println!("\n📈 Total tokens stored: {}", entries.len());
}

fn show_config(config: &MonitorConfig) {
    println!("\n⚙️  Current Configuration");
    println!("{}", "=".repeat(40));
    println!("Score Threshold: {}+ (tokens must score above this)", config.score_threshold);
    println!("Polling Interval: {} seconds", config.polling_interval);
    println!("API Timeout: {} seconds", config.api_timeout);

    println!("\n📋 Risk Classification:");
    println!("• LOW (Safe): Score > {}", config.score_threshold);
    if config.score_threshold >= HIGH_RISK_CEILING {
        println!("• MEDIUM (Warning): {} ≤ Score ≤ {}", HIGH_RISK_CEILING, config.score_threshold);
    } else {
        println!("• MEDIUM (Warning): none, threshold is below {}", HIGH_RISK_CEILING);
    }
    println!("• HIGH (Danger): Score < {} and not LOW", HIGH_RISK_CEILING);
}

fn edit_config(path: &Path, args: SetArgs) -> Result<()> {
    let mut config = MonitorConfig::load_or_init(path);
    let mut changed = false;

    if let Some(value) = args.threshold {
        match config.set_score_threshold(value) {
            Ok(()) => {
                println!("✅ Threshold updated to {}+", value);
                changed = true;
            }
            Err(e) => println!("❌ {}", e),
        }
    }
    if let Some(value) = args.interval {
        match config.set_polling_interval(value) {
            Ok(()) => {
                println!("✅ Polling interval updated to {} seconds", value);
                changed = true;
            }
            Err(e) => println!("❌ {}", e),
        }
    }
    if let Some(value) = args.timeout {
        match config.set_api_timeout(value) {
            Ok(()) => {
                println!("✅ API timeout updated to {} seconds", value);
                changed = true;
            }
            Err(e) => println!("❌ {}", e),
        }
    }

    if changed {
        config.save(path).with_context(|| format!("Failed to save {}", path.display()))?;
    }
    show_config(&config);
    Ok(())
}
