//! Domain Ports (Interfaces)
//!
//! These traits define the boundaries of the domain layer.
//! Infrastructure layer provides concrete implementations.

pub mod clock;
pub mod pipeline_events;
pub mod remote_executor;

pub use clock::{Clock, FixedClock};
pub use pipeline_events::{NoopEventSink, PipelineEvent, PipelineEventSink, PipelineKind};
pub use remote_executor::{CommandOutput, RemoteExecutor, RemoteSession, SessionTarget};
