use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "coinrate", version, about = "Coins-per-minute calculator and ranking tracker")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate coins per minute for a run
    Calc(commands::calc::CalcArgs),
    /// Saved entries
    Entry {
        #[command(subcommand)]
        action: commands::entry::EntryAction,
    },
    /// Average rate per character and skill, best first
    Ranking,
    /// Count-up stopwatch for timing a run
    Stopwatch {
        #[command(subcommand)]
        action: commands::stopwatch::StopwatchAction,
    },
    /// Export and import entries as JSON
    Data {
        #[command(subcommand)]
        action: commands::data::DataAction,
    },
    /// Remote account and sync
    Remote {
        #[command(subcommand)]
        action: commands::remote::RemoteAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Print a shell completion script
    Completions {
        shell: Shell,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Calc(args) => commands::calc::run(args),
        Commands::Entry { action } => commands::entry::run(action).await,
        Commands::Ranking => commands::ranking::run(),
        Commands::Stopwatch { action } => commands::stopwatch::run(action).await,
        Commands::Data { action } => commands::data::run(action),
        Commands::Remote { action } => commands::remote::run(action).await,
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "coinrate", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
