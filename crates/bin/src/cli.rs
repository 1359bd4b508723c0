//! CLI argument definitions for the Tessera binary.

use std::{path::PathBuf, time::Duration};

use clap::{Parser, Subcommand};
use url::Url;

/// Tessera identity and session client
#[derive(Parser, Debug)]
#[command(name = "tessera")]
#[command(about = "Tessera: mnemonic identities and durable sessions against a remote authority")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command
#[derive(clap::Args, Debug)]
pub struct GlobalArgs {
    /// Base URL of the remote authority
    #[arg(
        long,
        global = true,
        default_value = "http://127.0.0.1:4943",
        env = "TESSERA_AUTHORITY_URL"
    )]
    pub authority: Url,

    /// Directory holding the persisted session
    #[arg(short = 'D', long, global = true, env = "TESSERA_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Remote call timeout in seconds (0 disables it)
    #[arg(short, long, global = true, default_value_t = 10, env = "TESSERA_TIMEOUT")]
    pub timeout: u64,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    pub json: bool,
}

impl GlobalArgs {
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(".tessera"))
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout > 0).then(|| Duration::from_secs(self.timeout))
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a fresh secret phrase without touching the session
    Phrase,
    /// Restore the stored session, or create and register a guest account
    Init,
    /// Replace the session with the account behind a secret phrase
    Recover(RecoverArgs),
    /// Show the current session
    Whoami,
    /// Manage the registered profile
    #[command(subcommand)]
    Profile(ProfileCommands),
    /// Change the username
    Rename(RenameArgs),
    /// Push theme preferences to the authority
    Theme(ThemeArgs),
    /// Forget the identity and wipe the stored session
    Logout,
}

#[derive(clap::Args, Debug)]
pub struct RecoverArgs {
    /// The secret phrase, words separated by spaces
    #[arg(num_args = 1.., required = true)]
    pub phrase: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    /// Update profile fields; omitted fields are left unchanged
    Set(ProfileSetArgs),
}

#[derive(clap::Args, Debug)]
pub struct ProfileSetArgs {
    /// Display name
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long, conflicts_with = "clear_email")]
    pub email: Option<String>,

    #[arg(long)]
    pub clear_email: bool,

    #[arg(long, conflicts_with = "clear_bio")]
    pub bio: Option<String>,

    #[arg(long)]
    pub clear_bio: bool,

    #[arg(long, conflicts_with = "clear_avatar_url")]
    pub avatar_url: Option<String>,

    #[arg(long)]
    pub clear_avatar_url: bool,
}

#[derive(clap::Args, Debug)]
pub struct RenameArgs {
    pub username: String,
}

#[derive(clap::Args, Debug)]
pub struct ThemeArgs {
    /// Color scheme name
    pub color: String,

    /// Use the dark variant
    #[arg(long)]
    pub dark: bool,
}
