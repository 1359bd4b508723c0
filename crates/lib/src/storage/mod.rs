//! Durable session persistence
//!
//! The session keeps exactly one record on disk: a [`SessionSnapshot`] in a
//! named slot of a [`SessionStore`]. [`SessionCodec`] owns the encoding,
//! including the one detail that matters for correctness: 64-bit integers
//! coming from the remote authority are written as strings, because a plain
//! JSON number above 2^53 silently loses precision in many readers.

pub mod codec;
pub mod errors;
pub mod file;
pub mod int_text;
pub mod memory;
pub mod snapshot;
pub mod store;

pub use codec::{DEFAULT_SESSION_KEY, SessionCodec};
pub use errors::StorageError;
pub use file::FileStore;
pub use memory::InMemoryStore;
pub use snapshot::SessionSnapshot;
pub use store::SessionStore;
