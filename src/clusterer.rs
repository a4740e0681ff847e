use crate::error::ClusterError;
use ndarray::{Array1, Array2, ArrayView2};

/// Common fit/predict interface shared by the clustering models.
///
/// Each model keeps its own fitted state; nothing is shared between
/// implementations.
pub trait Clusterer {
    /// Fit the model to `data` of shape (n_samples, n_features).
    fn fit(&mut self, data: &ArrayView2<f64>) -> Result<(), ClusterError>;

    /// Hard cluster label for each row of `data`.
    fn predict(&self, data: &ArrayView2<f64>) -> Result<Array1<usize>, ClusterError>;

    /// Fit, then label the same data.
    fn fit_predict(&mut self, data: &ArrayView2<f64>) -> Result<Array1<usize>, ClusterError> {
        Clusterer::fit(self, data)?;
        Clusterer::predict(self, data)
    }

    /// Fitted centers, one row per cluster.
    fn centers(&self) -> Option<&Array2<f64>>;

    /// The configured number of clusters.
    fn n_clusters(&self) -> usize;
}
