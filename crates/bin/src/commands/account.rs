//! Account lifecycle commands: init, recover, whoami and logout.

use tessera::session::StartupPolicy;
use tracing::warn;

use crate::{
    cli::{GlobalArgs, RecoverArgs},
    output::{OutputFormat, print_session},
    session,
};

/// Run the init command
///
/// Restores the stored session when there is one, otherwise provisions a
/// registered guest account.
pub async fn init(args: &GlobalArgs, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = session::open(args, StartupPolicy::ProvisionGuest, None);
    session.initialize().await?;

    if format == OutputFormat::Human && !session.is_registered() {
        eprintln!("warning: the account is not registered yet; run `tessera init` again to retry");
    }
    print_session(&session, format)
}

/// Run the recover command
pub async fn recover(
    global: &GlobalArgs,
    args: &RecoverArgs,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = session::open(global, StartupPolicy::StayUnauthenticated, None);
    session.recover_account(&args.phrase.join(" ")).await?;
    print_session(&session, format)
}

/// Run the whoami command
pub async fn whoami(args: &GlobalArgs, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let session = session::restore(args, None).await?;
    print_session(&session, format)
}

/// Run the logout command
pub async fn logout(args: &GlobalArgs, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = session::open(args, StartupPolicy::StayUnauthenticated, None);
    // An unverifiable session is wiped by the restore itself
    if let Err(e) = session.initialize().await {
        warn!(error = %e, "stored session could not be restored");
    }
    session.logout().await?;
    print_session(&session, format)
}
