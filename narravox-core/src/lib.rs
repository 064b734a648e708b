//! narravox-core: shared data model for profile narration
//!
//! Holds the profile record types consumed by the narration subsystem and
//! the core error type shared across crates. The profile record is an
//! immutable input owned by the caller; nothing in this crate mutates it.

pub mod error;
pub mod profile;

pub use error::{Error, Result};
pub use profile::{Education, Experience, ProfileRecord};
