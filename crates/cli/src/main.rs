use clap::{Parser, Subcommand};

mod commands;

use commands::{ScoreArgs, SimulateArgs};

#[derive(Parser)]
#[command(name = "news-trade")]
#[command(about = "News headline sentiment scoring and paper trading", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score headlines with the offline sentiment pipeline
    Score(ScoreArgs),
    /// Run daily trading iterations against a paper broker
    Simulate(SimulateArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so scored output stays pipeable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Score(args) => commands::run_score(args).await?,
        Commands::Simulate(args) => commands::run_simulate(args).await?,
    }

    Ok(())
}
