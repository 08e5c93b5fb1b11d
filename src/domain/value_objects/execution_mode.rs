//! Execution mode threaded through the orchestrator and pipelines

/// How remote actions are carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecutionMode {
    /// Log mutating actions instead of issuing them
    pub dry_run: bool,
    /// Stream raw remote output for every action
    pub verbose: bool,
}

impl ExecutionMode {
    pub fn new(dry_run: bool, verbose: bool) -> Self {
        Self { dry_run, verbose }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}
