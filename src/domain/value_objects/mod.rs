//! Domain Value Objects
//!
//! Immutable value types that represent domain concepts.

mod execution_mode;
mod keep_releases;
mod release_id;

pub use execution_mode::ExecutionMode;
pub use keep_releases::KeepReleases;
pub use release_id::{ReleaseId, ReleaseIdError};
