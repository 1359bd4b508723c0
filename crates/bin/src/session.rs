//! Wiring of the library session for one CLI invocation.
//!
//! The session lives in a file slot under the data directory and talks to
//! the authority over HTTP. Every command builds a fresh one.

use std::sync::Arc;

use tessera::{
    Session, SessionConfig,
    gateway::HttpAuthority,
    preferences::PreferenceBuffer,
    session::StartupPolicy,
    storage::FileStore,
};
use tracing::debug;

use crate::cli::GlobalArgs;

pub fn config(args: &GlobalArgs, policy: StartupPolicy) -> SessionConfig {
    let config = SessionConfig::default().with_startup_policy(policy);
    match args.timeout() {
        Some(timeout) => config.with_gateway_timeout(timeout),
        None => config,
    }
}

/// Build a session without restoring it.
pub fn open(
    args: &GlobalArgs,
    policy: StartupPolicy,
    preferences: Option<Arc<dyn PreferenceBuffer>>,
) -> Session {
    let data_dir = args.data_dir();
    debug!(data_dir = %data_dir.display(), authority = %args.authority, "opening session");

    let gateway = Arc::new(HttpAuthority::new(args.authority.clone()));
    let store = Arc::new(FileStore::new(data_dir));
    let session = Session::new(gateway, store, config(args, policy));
    match preferences {
        Some(buffer) => session.with_preferences(buffer),
        None => session,
    }
}

/// Build a session and restore whatever is stored, without provisioning.
pub async fn restore(
    args: &GlobalArgs,
    preferences: Option<Arc<dyn PreferenceBuffer>>,
) -> Result<Session, Box<dyn std::error::Error>> {
    let mut session = open(args, StartupPolicy::StayUnauthenticated, preferences);
    session.initialize().await?;
    Ok(session)
}

/// Like [`restore`], but fails when no identity was stored.
pub async fn require(
    args: &GlobalArgs,
    preferences: Option<Arc<dyn PreferenceBuffer>>,
) -> Result<Session, Box<dyn std::error::Error>> {
    let session = restore(args, preferences).await?;
    if !session.is_authenticated() {
        return Err("no stored session; run `tessera init` or `tessera recover` first".into());
    }
    Ok(session)
}
