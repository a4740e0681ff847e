use crate::algorithm::{predict_labels, same_size_kmeans};
use crate::clusterer::Clusterer;
use crate::config::SameSizeConfig;
use crate::distance::{Distance, Euclidean};
use crate::error::ClusterError;
use ndarray::{Array1, Array2, ArrayView2};

/// Same-size k-means clustering compatible with ndarray.
///
/// Fitting splits the data into `k` clusters whose sizes differ by at most one
/// while keeping points close to their cluster center. Prediction assigns new
/// points to the nearest fitted center without any size limit.
///
/// The distance metric is a type parameter; Euclidean distance is the default.
///
/// # Example
///
/// ```
/// use constrained_clustering_rs::SameSizeKMeans;
/// use ndarray::array;
///
/// let data = array![[0.0, 0.0], [0.0, 1.0], [5.0, 5.0], [5.0, 6.0], [10.0, 0.0], [10.0, 1.0]];
///
/// let mut kmeans = SameSizeKMeans::new(3);
/// kmeans.train(&data.view()).unwrap();
///
/// let labels = kmeans.labels().unwrap();
/// assert_eq!(labels[0], labels[1]);
/// assert_eq!(labels[2], labels[3]);
/// assert_eq!(labels[4], labels[5]);
/// ```
#[derive(Debug, Clone)]
pub struct SameSizeKMeans<D = Euclidean> {
    /// Model configuration
    config: SameSizeConfig,

    /// Distance metric used for fitting and prediction
    distance: D,

    /// Number of features (dimensions), 0 until fitted
    d: usize,

    /// Fitted state (None if not yet fitted)
    fitted: Option<Fitted>,
}

#[derive(Debug, Clone)]
struct Fitted {
    centroids: Array2<f64>,
    labels: Array1<usize>,
    cluster_sizes: Vec<usize>,
    n_iterations: usize,
    pending_transfers: usize,
    converged: bool,
    total_distance: f64,
}

impl SameSizeKMeans<Euclidean> {
    /// Create a new model with default configuration and Euclidean distance.
    pub fn new(k: usize) -> Self {
        Self::with_config(SameSizeConfig::new(k))
    }

    /// Create a new model with custom configuration and Euclidean distance.
    pub fn with_config(config: SameSizeConfig) -> Self {
        Self::with_distance(config, Euclidean)
    }
}

impl<D: Distance> SameSizeKMeans<D> {
    /// Create a new model with a custom distance metric.
    pub fn with_distance(config: SameSizeConfig, distance: D) -> Self {
        Self {
            config,
            distance,
            d: 0,
            fitted: None,
        }
    }

    /// Fit the model to the given data, replacing any previous fit.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `k` is 0 or larger than the number of samples
    /// - The data has no rows or no columns
    /// - The distance metric rejects the dimensionality or returns a malformed matrix
    pub fn train(&mut self, data: &ArrayView2<f64>) -> Result<(), ClusterError> {
        let result = same_size_kmeans(data, &self.config, &self.distance)?;

        self.d = data.ncols();
        self.fitted = Some(Fitted {
            centroids: result.centers,
            labels: result.labels,
            cluster_sizes: result.cluster_sizes,
            n_iterations: result.n_iterations,
            pending_transfers: result.pending_transfers,
            converged: result.converged,
            total_distance: result.total_distance,
        });
        Ok(())
    }

    /// Fit the model to the data.
    ///
    /// Equivalent to `train()`, returning `&mut Self` for method chaining.
    pub fn fit(&mut self, data: &ArrayView2<f64>) -> Result<&mut Self, ClusterError> {
        self.train(data)?;
        Ok(self)
    }

    /// Predict cluster assignments for new data.
    ///
    /// Points go to their nearest center; cluster sizes are not constrained.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The model has not been fitted yet
    /// - Data dimensions don't match the training data
    pub fn predict(&self, data: &ArrayView2<f64>) -> Result<Array1<usize>, ClusterError> {
        let fitted = self.fitted.as_ref().ok_or(ClusterError::NotFitted)?;

        let n_features = data.ncols();
        if n_features != self.d {
            return Err(ClusterError::InvalidDimensions(format!(
                "Expected {} features, got {}",
                self.d, n_features
            )));
        }

        predict_labels(data, &fitted.centroids.view(), &self.distance)
    }

    /// Fit the model and return the balanced training labels.
    ///
    /// Unlike `predict()` on the same data, these labels honour the size limits.
    pub fn fit_predict(&mut self, data: &ArrayView2<f64>) -> Result<Array1<usize>, ClusterError> {
        self.train(data)?;
        self.labels().cloned().ok_or(ClusterError::NotFitted)
    }

    /// Get the centroids of the fitted model.
    pub fn centroids(&self) -> Option<&Array2<f64>> {
        self.fitted.as_ref().map(|f| &f.centroids)
    }

    /// Get the balanced labels of the training data.
    pub fn labels(&self) -> Option<&Array1<usize>> {
        self.fitted.as_ref().map(|f| &f.labels)
    }

    /// Get the size of each fitted cluster.
    pub fn cluster_sizes(&self) -> Option<&[usize]> {
        self.fitted.as_ref().map(|f| f.cluster_sizes.as_slice())
    }

    /// Number of local search passes run by the last fit.
    pub fn n_iterations(&self) -> Option<usize> {
        self.fitted.as_ref().map(|f| f.n_iterations)
    }

    /// Transfers still pending when the last fit stopped.
    pub fn pending_transfers(&self) -> Option<usize> {
        self.fitted.as_ref().map(|f| f.pending_transfers)
    }

    /// Whether the last fit reached a pass with no moves or swaps.
    pub fn converged(&self) -> Option<bool> {
        self.fitted.as_ref().map(|f| f.converged)
    }

    /// Sum of distances from each training point to its own center.
    pub fn total_distance(&self) -> Option<f64> {
        self.fitted.as_ref().map(|f| f.total_distance)
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
    pub fn config(&self) -> &SameSizeConfig {
        &self.config
    }

    /// Get the distance metric.
    pub fn distance(&self) -> &D {
        &self.distance
    }
}

impl<D: Distance> Clusterer for SameSizeKMeans<D> {
    fn fit(&mut self, data: &ArrayView2<f64>) -> Result<(), ClusterError> {
        self.train(data)
    }

    fn predict(&self, data: &ArrayView2<f64>) -> Result<Array1<usize>, ClusterError> {
        SameSizeKMeans::<D>::predict(self, data)
    }

    fn fit_predict(&mut self, data: &ArrayView2<f64>) -> Result<Array1<usize>, ClusterError> {
        SameSizeKMeans::<D>::fit_predict(self, data)
    }

    fn centers(&self) -> Option<&Array2<f64>> {
        self.centroids()
    }

    fn n_clusters(&self) -> usize {
        self.config.k
    }
}
