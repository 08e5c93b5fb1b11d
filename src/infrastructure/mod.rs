//! Infrastructure Layer
//!
//! Concrete implementations of domain ports.
//! This layer handles all I/O operations.
//!
//! ## Structure
//!
//! - `ssh` - OpenSSH ControlMaster sessions (`ssh` + `scp` subprocesses)
//! - `dry_run` - Executor wrapper that suppresses mutations
//! - `clock` - System clock

pub mod clock;
pub mod dry_run;
pub mod ssh;

pub use clock::SystemClock;
pub use dry_run::{DryRunExecutor, DryRunSession};
pub use ssh::{SshExecutor, SshSession, SCP_PROGRAM_ENV, SSH_PROGRAM_ENV};
