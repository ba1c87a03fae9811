//! reclink - UTEC recording link extractor
//!
//! Main entry point for the reclink CLI.

mod app;
mod cli;
mod install;
mod interactive;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use reclink_config::{reclink_home, Config, ConfigLoader, ConfigValidator, LoggingConfig};
use reclink_host_chrome::DesktopNotifier;
use reclink_protocols::Notifier;

use app::{close_all_provider_tabs, App};
use cli::{Cli, Commands};
use interactive::describe_outcome;

/// Initialize tracing with console and file output.
///
/// Log files rotate daily under the configured log directory.
fn init_tracing(logging: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let log_dir = logging.log_dir();
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("reclink")
        .filename_suffix("log")
        .max_log_files(14)
        .build(&log_dir)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // The guard flushes the file writer; it has to outlive main.
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_ansi(true))
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(())
}

fn load_config(cli: &Cli) -> Result<Config, Box<dyn std::error::Error>> {
    let path = cli.config_path();
    let config = ConfigLoader::load_or_default(&path)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_tracing(&config.logging)?;

    let warnings = ConfigValidator::validate(&config).into_result()?;
    for warning in warnings {
        warn!("Config {}: {}", warning.path, warning.message);
    }

    welcome_on_first_run().await;

    let result = match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_interactive(config).await,
        Commands::Extract { no_export } => run_extract(config, no_export).await,
        Commands::Status => show_status(config).await,
        Commands::CloseTabs => close_tabs(config).await,
    };

    if let Err(e) = &result {
        error!("{}", e);
    }
    result
}

async fn welcome_on_first_run() {
    match install::mark_first_run(&reclink_home()) {
        Ok(true) => {
            info!("reclink installed");
            let notifier = DesktopNotifier::new();
            if let Err(e) = notifier
                .notify(install::WELCOME_TITLE, install::WELCOME_MESSAGE)
                .await
            {
                warn!("Welcome notification failed: {}", e);
            }
        }
        Ok(false) => {}
        Err(e) => warn!("Could not record first run: {}", e),
    }
}

async fn run_interactive(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting reclink v{}", env!("CARGO_PKG_VERSION"));
    let mut app = App::start(config).await?;
    let result = interactive::run(&mut app).await;
    app.shutdown().await;
    Ok(result?)
}

async fn run_extract(config: Config, no_export: bool) -> Result<(), Box<dyn std::error::Error>> {
    let domain = config.site.domain.clone();
    let mut app = App::start(config).await?;

    let result = async {
        match app.extract_once().await? {
            Ok(summary) => {
                println!(
                    "Week {}: {} session(s), {} with recordings, {} resolved, {} pending",
                    summary.week.map(|w| w.to_string()).unwrap_or_else(|| "?".to_string()),
                    summary.sessions,
                    summary.available,
                    summary.resolved,
                    summary.unresolved
                );
                if !no_export {
                    println!("Report saved to {}", app.export()?);
                }
            }
            Err(refused) => println!("{}", describe_outcome(&refused, &domain)),
        }
        Ok::<_, app::AppError>(())
    }
    .await;

    app.shutdown().await;
    Ok(result?)
}

async fn show_status(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let app = App::start(config).await?;
    let readiness = app.readiness().await;
    app.shutdown().await;
    println!("{}", readiness?);
    Ok(())
}

async fn close_tabs(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let report = close_all_provider_tabs(&config).await?;
    println!("Closed {} Zoom tab(s)", report.closed);
    for (tab, e) in &report.failures {
        println!("  {}: {}", tab, e);
    }
    Ok(())
}
