//! One module per subcommand.

pub mod account;
pub mod phrase;
pub mod profile;
pub mod theme;
