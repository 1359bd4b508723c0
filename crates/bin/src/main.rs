mod cli;
mod commands;
mod output;
mod session;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, ProfileCommands};
use output::OutputFormat;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("tessera=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let global = &cli.global;
    let format = OutputFormat::from_flag(global.json);

    match &cli.command {
        Commands::Phrase => commands::phrase::run(format),
        Commands::Init => commands::account::init(global, format).await,
        Commands::Recover(args) => commands::account::recover(global, args, format).await,
        Commands::Whoami => commands::account::whoami(global, format).await,
        Commands::Profile(ProfileCommands::Set(args)) => {
            commands::profile::set(global, args, format).await
        }
        Commands::Rename(args) => commands::profile::rename(global, args, format).await,
        Commands::Theme(args) => commands::theme::run(global, args, format).await,
        Commands::Logout => commands::account::logout(global, format).await,
    }
}
