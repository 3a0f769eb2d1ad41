use clap::Parser;
use pocket_signals::cli::{Cli, Commands};
use pocket_signals::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
        eprintln!("Using default configuration");
        Config::default()
    });

    // Initialize telemetry
    let _telemetry = pocket_signals::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Run(args) => {
            tracing::info!(url = %config.connection.url, "Starting live session");
            args.execute(&config).await?;
        }
        Commands::Replay(args) => {
            tracing::info!(file = %args.file.display(), "Starting replay");
            args.execute(&config).await?;
        }
        Commands::Config => {
            println!("Current configuration:");
            println!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
