/// Validated options for loading a model.
///
/// Raw boundary integers are clamped here so every layer above works with
/// sane values: a non-positive context size falls back to 2048, a thread
/// hint of -1 auto-detects hardware concurrency, and any other
/// non-positive hint falls back to 4 threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    /// Context window size in tokens.
    pub context_size: usize,
    /// Number of engine worker threads for the decode step.
    pub threads: usize,
    /// Decode batch capacity, `min(512, context_size / 4)`.
    pub batch_size: usize,
    /// Seed for the session's private RNG; entropy-seeded when `None`.
    pub seed: Option<u64>,
}

pub const DEFAULT_CONTEXT_SIZE: usize = 2048;
pub const DEFAULT_THREADS: usize = 4;

impl LoadOptions {
    /// Clamp raw boundary values into a valid option set.
    pub fn new(context_size: i32, threads: i32) -> Self {
        let context_size = if context_size <= 0 {
            DEFAULT_CONTEXT_SIZE
        } else {
            context_size as usize
        };

        let threads = match threads {
            t if t > 0 => t as usize,
            -1 => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(DEFAULT_THREADS),
            _ => DEFAULT_THREADS,
        };

        LoadOptions {
            context_size,
            threads,
            batch_size: 512.min(context_size / 4),
            seed: None,
        }
    }

    /// Fix the session RNG seed, for reproducible stochastic sampling.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

impl Default for LoadOptions {
    fn default() -> Self {
        LoadOptions::new(DEFAULT_CONTEXT_SIZE as i32, -1)
    }
}
