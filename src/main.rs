use clap::Parser;
use poly_updown::cli::{Cli, Commands};
use poly_updown::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
        eprintln!("Using default configuration");
        toml::from_str(include_str!("../config.toml.example")).expect("Invalid default config")
    });

    // A malformed configuration is the only fatal startup error
    config.validate()?;

    // Initialize telemetry
    let _guard = poly_updown::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Backtest(args) => {
            tracing::info!("Starting backtest");
            args.execute(&config).await?;
        }
        Commands::Run(args) => {
            tracing::info!("Starting signal scanner");
            args.execute(&config).await?;
        }
        Commands::Config => {
            println!("Current configuration:");
            println!("  Family: {}", config.market.family_phrase);
            println!(
                "  Entry band: [{}, {}]",
                config.scanner.min_prob, config.scanner.max_prob
            );
            println!(
                "  Cadence: refresh {}s / poll {}s",
                config.market.refresh_interval_secs, config.scanner.poll_interval_secs
            );
            println!("  Execution: {:?} @ {} USDC", config.execution.mode, config.execution.amount);
            println!(
                "  Backtest: {} markets, {} thresholds",
                config.backtest.limit,
                config.backtest.thresholds.len()
            );
        }
    }

    Ok(())
}
