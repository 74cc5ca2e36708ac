use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod terminal;

#[derive(Parser)]
#[command(name = "rateprompt", version, about = "Rateprompt CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a generic use of the app, then maybe prompt
    Use(commands::prompt::HostArgs),
    /// Record a positive interaction, then maybe prompt
    Event(commands::prompt::HostArgs),
    /// Prompt if the stored state calls for it
    Check(commands::prompt::HostArgs),
    /// Prompt now, ignoring the eligibility rules
    Show(commands::prompt::HostArgs),
    /// Show stored counters, timestamps and the eligibility verdict
    Status(commands::prompt::HostArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Use(args) => commands::prompt::run(commands::prompt::Entry::Use, args).await,
        Commands::Event(args) => commands::prompt::run(commands::prompt::Entry::Event, args).await,
        Commands::Check(args) => commands::prompt::run(commands::prompt::Entry::Check, args).await,
        Commands::Show(args) => commands::prompt::run(commands::prompt::Entry::Show, args).await,
        Commands::Status(args) => commands::prompt::status(args).await,
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
