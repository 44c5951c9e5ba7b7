/// Worker thread count used when the platform cannot report its parallelism
pub const DEFAULT_WORKER_THREADS: usize = 4;
/// Name given to executor worker threads unless configured otherwise
pub const DEFAULT_THREAD_NAME: &str = "build-step";
