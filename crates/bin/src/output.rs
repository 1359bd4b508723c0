//! Output formatting helpers for human-readable and JSON output.

use tessera::Session;

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

impl OutputFormat {
    pub fn from_flag(json: bool) -> Self {
        if json { Self::Json } else { Self::Human }
    }
}

/// Print `(label, value)` pairs with the values aligned.
pub fn print_fields(fields: &[(&str, String)]) {
    let width = fields.iter().map(|(label, _)| label.len()).max().unwrap_or(0) + 1;
    for (label, value) in fields {
        println!("{:<width$} {value}", format!("{label}:"), width = width);
    }
}

/// Print the session the way `whoami` and the mutating commands report it.
pub fn print_session(
    session: &Session,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let principal = session.identity().map(|identity| identity.principal_text());

    match format {
        OutputFormat::Human => {
            let mut fields = vec![("State", session.state().to_string())];
            if let Some(principal) = principal {
                fields.push(("Principal", principal));
            }
            if let Some(user) = session.current_user() {
                fields.push(("Username", user.username.clone()));
                fields.push(("Name", user.name.clone()));
                if let Some(email) = &user.email {
                    fields.push(("Email", email.clone()));
                }
                if let Some(bio) = &user.bio {
                    fields.push(("Bio", bio.clone()));
                }
                if let Some(theme) = &user.theme_preferences {
                    let mode = if theme.dark_mode { "dark" } else { "light" };
                    fields.push(("Theme", format!("{} ({mode})", theme.color)));
                }
            }
            print_fields(&fields);
        }
        OutputFormat::Json => {
            let value = serde_json::json!({
                "state": session.state().to_string(),
                "registered": session.is_registered(),
                "principal": principal,
                "user": session.current_user(),
            });
            println!("{}", serde_json::to_string(&value)?);
        }
    }

    Ok(())
}
