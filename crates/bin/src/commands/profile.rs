//! Profile commands: `profile set` and `rename`.

use tessera::gateway::ProfileUpdate;

use crate::{
    cli::{GlobalArgs, ProfileSetArgs, RenameArgs},
    output::{OutputFormat, print_session},
    session,
};

/// Resolve a `--field` / `--clear-field` pair into a nullable update.
fn nullable(value: &Option<String>, clear: bool) -> Option<Option<String>> {
    if clear {
        Some(None)
    } else {
        value.clone().map(Some)
    }
}

fn build_update(args: &ProfileSetArgs) -> ProfileUpdate {
    let mut update = ProfileUpdate::default();
    if let Some(name) = &args.name {
        update = update.with_name(name.clone());
    }
    if let Some(email) = nullable(&args.email, args.clear_email) {
        update = update.with_email(email);
    }
    if let Some(bio) = nullable(&args.bio, args.clear_bio) {
        update = update.with_bio(bio);
    }
    if let Some(avatar_url) = nullable(&args.avatar_url, args.clear_avatar_url) {
        update = update.with_avatar_url(avatar_url);
    }
    update
}

/// Run the `profile set` command
pub async fn set(
    global: &GlobalArgs,
    args: &ProfileSetArgs,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let update = build_update(args);
    if update.is_empty() {
        return Err("nothing to update; pass at least one field".into());
    }

    let mut session = session::require(global, None).await?;
    session.update_profile(update).await?;
    print_session(&session, format)
}

/// Run the rename command
pub async fn rename(
    global: &GlobalArgs,
    args: &RenameArgs,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = session::require(global, None).await?;
    session.update_username(&args.username).await?;
    print_session(&session, format)
}
