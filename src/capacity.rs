/// Per-cluster occupancy with the size bounds derived from `n` and `k`.
///
/// Once a labeling is complete every cluster holds between `minsize = floor(n/k)`
/// and `maxsize = ceil(n/k)` members, so sizes differ by at most one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapacityTracker {
    counts: Vec<usize>,
    minsize: usize,
    maxsize: usize,
}

impl CapacityTracker {
    /// Empty tracker for `n_samples` points spread over `k` clusters.
    pub fn new(n_samples: usize, k: usize) -> Self {
        assert!(k > 0, "k must be greater than 0");

        Self {
            counts: vec![0; k],
            minsize: n_samples / k,
            maxsize: n_samples.div_ceil(k),
        }
    }

    /// Tracker populated from an existing labeling.
    ///
    /// # Panics
    ///
    /// Panics if `k` is 0 or any label is `k` or larger.
    pub fn from_labels(labels: &[usize], k: usize) -> Self {
        let mut tracker = Self::new(labels.len(), k);
        for &label in labels {
            assert!(label < k, "label {} out of range for k = {}", label, k);
            tracker.counts[label] += 1;
        }
        tracker
    }

    pub fn minsize(&self) -> usize {
        self.minsize
    }

    pub fn maxsize(&self) -> usize {
        self.maxsize
    }

    pub fn k(&self) -> usize {
        self.counts.len()
    }

    pub fn count(&self, cluster: usize) -> usize {
        self.counts[cluster]
    }

    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// Total number of assigned points.
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Whether `cluster` may take one more member without exceeding `maxsize`.
    #[inline]
    pub fn can_accept(&self, cluster: usize) -> bool {
        self.counts[cluster] < self.maxsize
    }

    /// Whether `cluster` may give up one member without dropping below `minsize`.
    #[inline]
    pub fn can_release(&self, cluster: usize) -> bool {
        self.counts[cluster] > self.minsize
    }

    /// Record a new member during initial assignment.
    pub fn admit(&mut self, cluster: usize) {
        assert!(
            self.can_accept(cluster),
            "cluster {} is already at maxsize {}",
            cluster,
            self.maxsize
        );
        self.counts[cluster] += 1;
    }

    /// Commit a single-point move from `source` to `dest`.
    pub fn transfer(&mut self, source: usize, dest: usize) {
        assert!(
            self.can_release(source) && self.can_accept(dest),
            "moving a point from cluster {} ({}) to cluster {} ({}) violates bounds [{}, {}]",
            source,
            self.counts[source],
            dest,
            self.counts[dest],
            self.minsize,
            self.maxsize
        );
        self.counts[source] -= 1;
        self.counts[dest] += 1;
    }

    /// Whether every cluster lies within `[minsize, maxsize]`.
    pub fn is_balanced(&self) -> bool {
        self.counts
            .iter()
            .all(|&c| c >= self.minsize && c <= self.maxsize)
    }
}
