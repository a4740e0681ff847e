use crate::algorithm::validate_points;
use crate::clusterer::Clusterer;
use crate::config::FuzzyConfig;
use crate::distance::{checked_pairwise, Distance, Euclidean};
use crate::error::ClusterError;
use ndarray::{Array1, Array2, ArrayView2, Axis, Zip};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::time::Instant;

/// Result of the fuzzy c-means algorithm
#[derive(Debug, Clone)]
pub struct FuzzyResult {
    pub centers: Array2<f64>,
    /// Membership matrix (n_samples, k); each row sums to 1
    pub membership: Array2<f64>,
    pub n_iterations: usize,
    pub converged: bool,
}

fn validate_config(config: &FuzzyConfig) -> Result<(), ClusterError> {
    if !config.fuzziness.is_finite() || config.fuzziness <= 1.0 {
        return Err(ClusterError::InvalidParameter(format!(
            "fuzziness must be a finite value greater than 1, got {}",
            config.fuzziness
        )));
    }
    if config.epsilon.is_nan() || config.epsilon < 0.0 {
        return Err(ClusterError::InvalidParameter(format!(
            "epsilon must be non-negative, got {}",
            config.epsilon
        )));
    }
    Ok(())
}

/// Run fuzzy c-means on `data`.
///
/// Starts from a random row-normalized membership matrix and alternates center
/// and membership updates until the membership moves less than `epsilon`
/// (Frobenius norm) or `max_iters` updates ran. At least one update always runs.
pub fn fuzzy_cmeans<D: Distance + ?Sized>(
    data: &ArrayView2<f64>,
    config: &FuzzyConfig,
    distance: &D,
) -> Result<FuzzyResult, ClusterError> {
    let k = config.k;
    validate_points(data, k)?;
    validate_config(config)?;
    distance.validate_dimensions(data.ncols())?;

    let start = Instant::now();
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let mut membership = random_membership(data.nrows(), k, &mut rng);

    let mut centers;
    let mut n_iterations = 0;
    let mut converged = false;

    loop {
        centers = weighted_centers(data, &membership.view(), config.fuzziness);
        let dist = checked_pairwise(distance, data, &centers.view())?;
        let next = membership_from_distances(&dist.view(), config.fuzziness);

        let change = (&next - &membership).mapv(|v| v * v).sum().sqrt();
        membership = next;
        n_iterations += 1;

        tracing::debug!(iteration = n_iterations, change, "fuzzy c-means update");

        if change < config.epsilon {
            converged = true;
            break;
        }
        if n_iterations >= config.max_iters {
            break;
        }
    }

    let elapsed = start.elapsed().as_secs_f64();
    if config.verbose {
        tracing::info!(
            n_samples = data.nrows(),
            k,
            iterations = n_iterations,
            converged,
            elapsed_secs = elapsed,
            "fuzzy c-means finished"
        );
    } else {
        tracing::debug!(
            n_samples = data.nrows(),
            k,
            iterations = n_iterations,
            converged,
            elapsed_secs = elapsed,
            "fuzzy c-means finished"
        );
    }

    Ok(FuzzyResult {
        centers,
        membership,
        n_iterations,
        converged,
    })
}

fn random_membership(n_samples: usize, k: usize, rng: &mut ChaCha8Rng) -> Array2<f64> {
    let mut membership = Array2::from_shape_simple_fn((n_samples, k), || rng.gen::<f64>());
    for mut row in membership.rows_mut() {
        let total = row.sum();
        if total > 0.0 {
            row /= total;
        } else {
            row.fill(1.0 / k as f64);
        }
    }
    membership
}

/// Centers weighted by membership raised to the fuzziness exponent.
///
/// A cluster with zero total weight falls back to the mean of all points.
fn weighted_centers(
    data: &ArrayView2<f64>,
    membership: &ArrayView2<f64>,
    fuzziness: f64,
) -> Array2<f64> {
    let weights = membership.mapv(|u| u.powf(fuzziness));
    let mut centers = weights.t().dot(data);
    let totals = weights.sum_axis(Axis(0));

    for (mut center, &total) in centers.rows_mut().into_iter().zip(totals.iter()) {
        if total > 0.0 {
            center /= total;
        } else if let Some(mean) = data.mean_axis(Axis(0)) {
            center.assign(&mean);
        }
    }

    centers
}

/// Membership of each point in each cluster from its distances to the centers.
///
/// `u_ij = 1 / sum_l (d_ij / d_il)^(2 / (m - 1))`. A point lying exactly on one
/// or more centers splits its membership evenly across those centers.
pub fn membership_from_distances(dist: &ArrayView2<f64>, fuzziness: f64) -> Array2<f64> {
    let power = 2.0 / (fuzziness - 1.0);
    let mut membership = Array2::zeros(dist.raw_dim());

    Zip::from(membership.rows_mut())
        .and(dist.rows())
        .par_for_each(|mut u, d| {
            let zeros = d.iter().filter(|&&v| v == 0.0).count();
            if zeros > 0 {
                let share = 1.0 / zeros as f64;
                Zip::from(&mut u).and(&d).for_each(|u, &v| {
                    *u = if v == 0.0 { share } else { 0.0 };
                });
                return;
            }

            let inverse: Array1<f64> = d.mapv(|v| v.powf(power).recip());
            let total = inverse.sum();
            Zip::from(&mut u)
                .and(&inverse)
                .for_each(|u, &inv| *u = inv / total);
        });

    membership
}

/// Index of the largest membership per row. Ties resolve to the lowest index.
fn argmax_rows(membership: &ArrayView2<f64>) -> Array1<usize> {
    membership
        .rows()
        .into_iter()
        .map(|row| {
            let mut best = 0;
            for (j, &v) in row.iter().enumerate() {
                if v > row[best] {
                    best = j;
                }
            }
            best
        })
        .collect()
}

/// Fuzzy c-means clustering compatible with ndarray.
///
/// Every point receives a degree of membership in each cluster; `predict()`
/// returns the cluster with the highest membership.
///
/// # Example
///
/// ```
/// use constrained_clustering_rs::{FuzzyCMeans, FuzzyConfig};
/// use ndarray::array;
///
/// let data = array![[0.0, 0.0], [0.0, 1.0], [10.0, 10.0], [10.0, 11.0]];
///
/// let mut fcm = FuzzyCMeans::with_config(FuzzyConfig::new(2).with_fuzziness(2.0));
/// let labels = fcm.fit(&data.view()).unwrap().predict(&data.view()).unwrap();
/// assert_eq!(labels[0], labels[1]);
/// assert_ne!(labels[0], labels[2]);
///
/// let membership = fcm.membership().unwrap();
/// assert!((membership.row(0).sum() - 1.0).abs() < 1e-9);
/// assert_eq!(fcm.k(), 2);
/// assert_eq!(fcm.d(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct FuzzyCMeans<D = Euclidean> {
    config: FuzzyConfig,
    distance: D,
    d: usize,
    fitted: Option<FuzzyResult>,
}

impl FuzzyCMeans<Euclidean> {
    /// Create a new model with default configuration and Euclidean distance.
    pub fn new(k: usize) -> Self {
        Self::with_config(FuzzyConfig::new(k))
    }

    /// Create a new model with custom configuration and Euclidean distance.
    pub fn with_config(config: FuzzyConfig) -> Self {
        Self::with_distance(config, Euclidean)
    }
}

impl<D: Distance> FuzzyCMeans<D> {
    /// Create a new model with a custom distance metric.
    pub fn with_distance(config: FuzzyConfig, distance: D) -> Self {
        Self {
            config,
            distance,
            d: 0,
            fitted: None,
        }
    }

    /// Fit the model to the given data, replacing any previous fit.
    pub fn train(&mut self, data: &ArrayView2<f64>) -> Result<(), ClusterError> {
        let result = fuzzy_cmeans(data, &self.config, &self.distance)?;
        self.d = data.ncols();
        self.fitted = Some(result);
        Ok(())
    }

    /// Fit the model to the data, returning `&mut Self` for method chaining.
    pub fn fit(&mut self, data: &ArrayView2<f64>) -> Result<&mut Self, ClusterError> {
        self.train(data)?;
        Ok(self)
    }

    /// Membership of each row of `data` in each fitted cluster.
    pub fn predict_membership(&self, data: &ArrayView2<f64>) -> Result<Array2<f64>, ClusterError> {
        let fitted = self.fitted.as_ref().ok_or(ClusterError::NotFitted)?;

        if data.ncols() != self.d {
            return Err(ClusterError::InvalidDimensions(format!(
                "Expected {} features, got {}",
                self.d,
                data.ncols()
            )));
        }

        let dist = checked_pairwise(&self.distance, data, &fitted.centers.view())?;
        Ok(membership_from_distances(&dist.view(), self.config.fuzziness))
    }

    /// Cluster with the highest membership for each row of `data`.
    pub fn predict(&self, data: &ArrayView2<f64>) -> Result<Array1<usize>, ClusterError> {
        let membership = self.predict_membership(data)?;
        Ok(argmax_rows(&membership.view()))
    }

    /// Fit the model and return the highest-membership cluster of each training point.
    pub fn fit_predict(&mut self, data: &ArrayView2<f64>) -> Result<Array1<usize>, ClusterError> {
        self.train(data)?;
        let fitted = self.fitted.as_ref().ok_or(ClusterError::NotFitted)?;
        Ok(argmax_rows(&fitted.membership.view()))
    }

    /// Get the centers of the fitted model.
    pub fn centroids(&self) -> Option<&Array2<f64>> {
        self.fitted.as_ref().map(|f| &f.centers)
    }

    /// Membership matrix of the training data.
    pub fn membership(&self) -> Option<&Array2<f64>> {
        self.fitted.as_ref().map(|f| &f.membership)
    }

    /// Number of membership updates run by the last fit.
    pub fn n_iterations(&self) -> Option<usize> {
        self.fitted.as_ref().map(|f| f.n_iterations)
    }

    /// Whether the last fit stopped below the `epsilon` threshold.
    pub fn converged(&self) -> Option<bool> {
        self.fitted.as_ref().map(|f| f.converged)
    }

    /// Get the number of clusters.
    pub fn k(&self) -> usize {
        self.config.k
    }

    /// Get the number of features (dimensions).
    pub fn d(&self) -> usize {
        self.d
    }

    /// Get the configuration.
    pub fn config(&self) -> &FuzzyConfig {
        &self.config
    }
}

impl<D: Distance> Clusterer for FuzzyCMeans<D> {
    fn fit(&mut self, data: &ArrayView2<f64>) -> Result<(), ClusterError> {
        self.train(data)
    }

    fn predict(&self, data: &ArrayView2<f64>) -> Result<Array1<usize>, ClusterError> {
        FuzzyCMeans::<D>::predict(self, data)
    }

    fn centers(&self) -> Option<&Array2<f64>> {
        self.centroids()
    }

    fn n_clusters(&self) -> usize {
        self.config.k
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::Haversine;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn two_blobs() -> Array2<f64> {
        array![
            [0.0, 0.0],
            [0.1, 0.0],
            [0.0, 0.1],
            [0.1, 0.1],
            [10.0, 10.0],
            [10.1, 10.0],
            [10.0, 10.1],
            [10.1, 10.1],
        ]
    }

    #[test]
    fn test_membership_rows_sum_to_one() {
        let dist = array![[1.0, 2.0, 4.0], [3.0, 3.0, 3.0]];
        let membership = membership_from_distances(&dist.view(), 2.0);

        for row in membership.rows() {
            assert_relative_eq!(row.sum(), 1.0, epsilon = 1e-12);
        }
        assert!(membership[[0, 0]] > membership[[0, 1]]);
        assert!(membership[[0, 1]] > membership[[0, 2]]);
        assert_relative_eq!(membership[[1, 0]], 1.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_membership_zero_distance() {
        let dist = array![[0.0, 2.0, 0.0]];
        let membership = membership_from_distances(&dist.view(), 2.0);

        assert_eq!(membership, array![[0.5, 0.0, 0.5]]);
    }

    #[test]
    fn test_fuzzy_separates_blobs() {
        let data = two_blobs();
        let mut fcm = FuzzyCMeans::new(2);

        let labels = fcm.fit_predict(&data.view()).unwrap();

        assert_eq!(labels[0], labels[1]);
        assert_eq!(labels[0], labels[3]);
        assert_eq!(labels[4], labels[7]);
        assert_ne!(labels[0], labels[4]);
        assert!(fcm.converged().unwrap());

        let membership = fcm.membership().unwrap();
        assert_eq!(membership.dim(), (8, 2));
        assert!(membership[[0, labels[0]]] > 0.99);
    }

    #[test]
    fn test_fuzzy_deterministic() {
        let data = two_blobs();
        let mut a = FuzzyCMeans::with_config(FuzzyConfig::new(2).with_seed(5));
        let mut b = FuzzyCMeans::with_config(FuzzyConfig::new(2).with_seed(5));

        a.train(&data.view()).unwrap();
        b.train(&data.view()).unwrap();

        assert_eq!(a.centroids(), b.centroids());
        assert_eq!(a.n_iterations(), b.n_iterations());
    }

    #[test]
    fn test_fuzzy_predict_membership() {
        let data = two_blobs();
        let mut fcm = FuzzyCMeans::new(2);
        fcm.train(&data.view()).unwrap();

        let probe = array![[5.0, 5.0], [0.0, 0.0]];
        let membership = fcm.predict_membership(&probe.view()).unwrap();

        assert_relative_eq!(membership.row(0).sum(), 1.0, epsilon = 1e-12);
        assert!(membership.row(1).iter().any(|&u| u > 0.99));
    }

    #[test]
    fn test_fuzzy_invalid_fuzziness() {
        let data = two_blobs();
        let mut fcm = FuzzyCMeans::with_config(FuzzyConfig::new(2).with_fuzziness(1.0));

        let result = fcm.train(&data.view());
        assert!(matches!(result, Err(ClusterError::InvalidParameter(_))));
    }

    #[test]
    fn test_fuzzy_predict_before_fit() {
        let fcm = FuzzyCMeans::new(2);
        let result = fcm.predict(&two_blobs().view());
        assert!(matches!(result, Err(ClusterError::NotFitted)));
    }

    #[test]
    fn test_fuzzy_haversine() {
        // Two groups of nearby cities, coordinates in radians.
        let data = array![
            [0.8527, 0.0406],
            [0.8530, 0.0410],
            [0.8525, 0.0402],
            [0.5948, -1.2916],
            [0.5950, -1.2920],
            [0.5945, -1.2912],
        ];
        let mut fcm = FuzzyCMeans::with_distance(FuzzyConfig::new(2), Haversine::default());

        let labels = fcm.fit_predict(&data.view()).unwrap();

        assert_eq!(labels[0], labels[1]);
        assert_eq!(labels[0], labels[2]);
        assert_eq!(labels[3], labels[4]);
        assert_eq!(labels[3], labels[5]);
        assert_ne!(labels[0], labels[3]);
    }
}
