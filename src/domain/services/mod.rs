//! Domain Services
//!
//! Pure business logic services that operate on domain values.
//! These services have no I/O dependencies and are easily testable.

mod release_planner;

pub use release_planner::{ReleaseDecision, ReleasePlanner};
