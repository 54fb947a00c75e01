pub mod api {
    /// Collection endpoint for runs; instances are created beneath a run.
    pub const RUNS: &str = "runs";
    pub const INSTANCES: &str = "instances";

    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
}

pub mod record {
    /// Upper bound on createInstance calls in one `record` invocation.
    pub const MAX_CLAIMS: usize = 10_000;
}
