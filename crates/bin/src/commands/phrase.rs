//! Phrase command - prints a freshly generated secret phrase.

use tessera::identity;

use crate::output::{OutputFormat, print_fields};

/// Run the phrase command
pub fn run(format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let phrase = identity::generate()?;
    let principal = identity::derive(&phrase).principal_text();
    let words = phrase.expose();

    match format {
        OutputFormat::Human => print_fields(&[
            ("Phrase", words.to_string()),
            ("Principal", principal),
        ]),
        OutputFormat::Json => {
            let value = serde_json::json!({
                "phrase": words.as_str(),
                "principal": principal,
            });
            println!("{}", serde_json::to_string(&value)?);
        }
    }

    Ok(())
}
