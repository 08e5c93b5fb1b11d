//! Presentation Layer
//!
//! This layer handles:
//! - CLI argument parsing (via clap)
//! - Creating the orchestrator with infrastructure dependencies
//! - Progress logging and summary output (text/JSON)
//!
//! ## Structure
//!
//! - `cli` - Argument definitions
//! - `factory` - Dependency injection
//! - `output` - Event sink and summary rendering
//!
//! ## Usage
//!
//! ```ignore
//! use pystrano::presentation::{factory, Cli, LogEventSink};
//!
//! let cli = Cli::parse();
//! let orchestrator = factory::create_orchestrator(cli.dry_run, Arc::new(LogEventSink), cancel);
//! let summary = orchestrator.run(&cli.run_options())?;
//! ```

pub mod cli;
pub mod factory;
pub mod output;

pub use cli::{Cli, ColorWhen};
pub use factory::create_orchestrator;
pub use output::{describe_server, render_json, LogEventSink};
