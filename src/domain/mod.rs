//! Domain Layer
//!
//! Release bookkeeping and the interfaces the pipeline needs from the
//! outside world, without any I/O of its own.
//!
//! ## Structure
//!
//! - `value_objects/` - Immutable value types (ReleaseId, KeepReleases, ExecutionMode)
//! - `services/` - Domain services (ReleasePlanner)
//! - `ports/` - Interface definitions for infrastructure (RemoteExecutor, Clock, events)
//!
//! ## Design Principles
//!
//! 1. **No I/O** - This layer never touches the file system or network directly
//! 2. **Pure Functions** - Services are stateless and testable
//! 3. **Ports & Adapters** - All I/O goes through trait-defined ports

pub mod ports;
pub mod services;
pub mod value_objects;
