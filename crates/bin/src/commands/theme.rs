//! Theme command - pushes preferences through the preference sync.

use std::sync::Arc;

use tessera::{
    PreferenceSync,
    preferences::{DEFAULT_DEBOUNCE, PreferenceBuffer, SharedPreferences},
};

use crate::{
    cli::{GlobalArgs, ThemeArgs},
    output::{OutputFormat, print_session},
    session,
};

/// Run the theme command
///
/// Preference pushes are best effort, so a failed push only shows up in the
/// logs and the session reported afterwards still carries the old theme.
pub async fn run(
    global: &GlobalArgs,
    args: &ThemeArgs,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let buffer = Arc::new(SharedPreferences::default());
    let mut session = session::require(global, Some(buffer.clone())).await?;

    buffer.update(|prefs| {
        prefs.color = args.color.clone();
        prefs.dark_mode = args.dark;
    });
    let sync = PreferenceSync::new(
        session.gateway(),
        buffer.clone(),
        session.subscribe(),
        DEFAULT_DEBOUNCE,
    );
    sync.force_sync().await;

    // Re-read so the output reflects what the authority now holds
    session.verify().await?;
    if format == OutputFormat::Human {
        let theme = buffer.snapshot();
        if theme.color != args.color || theme.dark_mode != args.dark {
            eprintln!("warning: the authority did not accept the new theme");
        }
    }
    print_session(&session, format)
}
