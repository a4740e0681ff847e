use crate::config::SameSizeConfig;
use crate::distance::{argmin, checked_pairwise, Distance};
use crate::error::ClusterError;
use crate::init::initialize;
use crate::refine::{refine, total_cost};
use ndarray::{Array1, Array2, ArrayView2, Zip};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::Instant;

/// Result of the same-size k-means algorithm
#[derive(Debug, Clone)]
pub struct SameSizeResult {
    pub centers: Array2<f64>,
    pub labels: Array1<usize>,
    /// Size of each cluster, indexed by label
    pub cluster_sizes: Vec<usize>,
    pub n_iterations: usize,
    /// Points that still wanted to leave their cluster when the search stopped
    pub pending_transfers: usize,
    /// Whether the search stopped because a pass changed nothing
    pub converged: bool,
    /// Sum of distances from each point to its own center
    pub total_distance: f64,
}

/// Check a point set against the number of clusters before any computation.
pub fn validate_points(data: &ArrayView2<f64>, k: usize) -> Result<(), ClusterError> {
    if k == 0 {
        return Err(ClusterError::InvalidK(
            "k must be greater than 0".to_string(),
        ));
    }

    if data.nrows() == 0 || data.ncols() == 0 {
        return Err(ClusterError::EmptyInput(format!(
            "Expected a non-empty point set, got shape {}x{}",
            data.nrows(),
            data.ncols()
        )));
    }

    if data.nrows() < k {
        return Err(ClusterError::InsufficientData(format!(
            "Number of samples ({}) is less than k ({})",
            data.nrows(),
            k
        )));
    }

    Ok(())
}

/// Stack row vectors into a point matrix, rejecting empty or ragged input.
pub fn points_from_rows(rows: &[Vec<f64>]) -> Result<Array2<f64>, ClusterError> {
    let n_features = match rows.first() {
        Some(first) if !first.is_empty() => first.len(),
        _ => {
            return Err(ClusterError::EmptyInput(
                "Expected at least one point with at least one feature".to_string(),
            ))
        }
    };

    if let Some((i, row)) = rows
        .iter()
        .enumerate()
        .find(|(_, row)| row.len() != n_features)
    {
        return Err(ClusterError::RaggedInput(format!(
            "Point {} has {} features, expected {}",
            i,
            row.len(),
            n_features
        )));
    }

    let flat: Vec<f64> = rows.iter().flatten().copied().collect();
    Array2::from_shape_vec((rows.len(), n_features), flat)
        .map_err(|e| ClusterError::RaggedInput(e.to_string()))
}

/// Partition `data` into `config.k` clusters whose sizes differ by at most one.
///
/// A balanced starting labeling is built from k-means++ seeds, then improved by
/// local search with single moves and pairwise swaps. Every cluster ends with
/// between `floor(n/k)` and `ceil(n/k)` members.
pub fn same_size_kmeans<D: Distance + ?Sized>(
    data: &ArrayView2<f64>,
    config: &SameSizeConfig,
    distance: &D,
) -> Result<SameSizeResult, ClusterError> {
    let k = config.k;
    validate_points(data, k)?;
    distance.validate_dimensions(data.ncols())?;

    let start = Instant::now();
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);

    let (mut labels, mut capacity) = initialize(data, k, distance, &mut rng)?;
    let outcome = refine(data, &mut labels, &mut capacity, distance, config.max_iters)?;

    let dist = checked_pairwise(distance, data, &outcome.centers.view())?;
    let total_distance = total_cost(&dist.view(), &labels);
    let elapsed = start.elapsed().as_secs_f64();

    if config.verbose {
        tracing::info!(
            n_samples = data.nrows(),
            n_features = data.ncols(),
            k,
            minsize = capacity.minsize(),
            maxsize = capacity.maxsize(),
            iterations = outcome.n_iterations,
            converged = outcome.converged,
            pending = outcome.pending_transfers,
            total_distance,
            elapsed_secs = elapsed,
            "same-size k-means finished"
        );
    } else {
        tracing::debug!(
            n_samples = data.nrows(),
            k,
            iterations = outcome.n_iterations,
            converged = outcome.converged,
            pending = outcome.pending_transfers,
            total_distance,
            elapsed_secs = elapsed,
            "same-size k-means finished"
        );
    }

    Ok(SameSizeResult {
        centers: outcome.centers,
        labels: Array1::from_vec(labels),
        cluster_sizes: capacity.counts().to_vec(),
        n_iterations: outcome.n_iterations,
        pending_transfers: outcome.pending_transfers,
        converged: outcome.converged,
        total_distance,
    })
}

/// Assign each point to its nearest center. Size limits do not apply here.
pub fn predict_labels<D: Distance + ?Sized>(
    data: &ArrayView2<f64>,
    centers: &ArrayView2<f64>,
    distance: &D,
) -> Result<Array1<usize>, ClusterError> {
    if centers.nrows() == 0 {
        return Err(ClusterError::EmptyInput(
            "Cannot predict with zero centers".to_string(),
        ));
    }

    if data.ncols() != centers.ncols() {
        return Err(ClusterError::InvalidDimensions(format!(
            "Expected {} features, got {}",
            centers.ncols(),
            data.ncols()
        )));
    }

    let dist = checked_pairwise(distance, data, centers)?;
    let mut labels = Array1::zeros(data.nrows());
    Zip::from(&mut labels)
        .and(dist.rows())
        .par_for_each(|label, row| *label = argmin(&row));

    Ok(labels)
}
