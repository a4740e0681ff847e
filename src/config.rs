/// Configuration for the same-size k-means algorithm
#[derive(Debug, Clone)]
pub struct SameSizeConfig {
    /// Number of clusters
    pub k: usize,

    /// Maximum number of local search passes
    pub max_iters: usize,

    /// Random seed for seed-center selection
    pub seed: u64,

    /// Log the fit summary at info level instead of debug
    pub verbose: bool,
}

impl Default for SameSizeConfig {
    fn default() -> Self {
        Self {
            k: 8,
            max_iters: 1000,
            seed: 42,
            verbose: false,
        }
    }
}

impl SameSizeConfig {
    /// Create a new configuration with the specified number of clusters
    pub fn new(k: usize) -> Self {
        Self {
            k,
            ..Default::default()
        }
    }

    /// Set the maximum number of local search passes
    pub fn with_max_iters(mut self, max_iters: usize) -> Self {
        self.max_iters = max_iters;
        self
    }

    /// Set the random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set verbose mode
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// Configuration for the fuzzy c-means algorithm
#[derive(Debug, Clone)]
pub struct FuzzyConfig {
    /// Number of clusters
    pub k: usize,

    /// Maximum number of iterations
    pub max_iters: usize,

    /// Membership exponent, must be greater than 1. Larger values give softer partitions.
    pub fuzziness: f64,

    /// Convergence tolerance on the Frobenius norm of the membership change
    pub epsilon: f64,

    /// Random seed for the initial membership matrix
    pub seed: u64,

    /// Log the fit summary at info level instead of debug
    pub verbose: bool,
}

impl Default for FuzzyConfig {
    fn default() -> Self {
        Self {
            k: 8,
            max_iters: 1000,
            fuzziness: 2.0,
            epsilon: 1e-5,
            seed: 42,
            verbose: false,
        }
    }
}

impl FuzzyConfig {
    /// Create a new configuration with the specified number of clusters
    pub fn new(k: usize) -> Self {
        Self {
            k,
            ..Default::default()
        }
    }

    /// Set the maximum number of membership updates
    pub fn with_max_iters(mut self, max_iters: usize) -> Self {
        self.max_iters = max_iters;
        self
    }

    /// Set the fuzziness exponent `m` (must be greater than 1)
    pub fn with_fuzziness(mut self, fuzziness: f64) -> Self {
        self.fuzziness = fuzziness;
        self
    }

    /// Set the convergence threshold on the membership change
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Set the random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set verbose mode
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}
