//! Application Layer
//!
//! Use cases that orchestrate the business flow.
//! This layer:
//! - Depends on Domain layer (services, ports, value objects)
//! - Does NOT contain business rules (those are in Domain)
//! - Coordinates between Infrastructure and Domain
//!
//! ## Use Cases
//!
//! - `Orchestrator` - Resolves the manifest and fans a pipeline out over servers
//! - `run_setup` / `run_deploy` - Step lists for one server, driven by `StepRunner`

pub mod orchestrator;
pub mod pipeline;

pub use orchestrator::{
    ExitStatus, Orchestrator, Outcome, RunOptions, RunSummary, ServerOutcome, CONNECT_LABEL,
    DEFAULT_CONFIG_FILE_NAME, DEFAULT_DEPLOY_CONFIG_DIR,
};
pub use pipeline::{
    deploy_steps, run_deploy, run_setup, setup_steps, PipelineRun, PipelineStep, RemoteAction,
    StepRunner,
};
