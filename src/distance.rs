use crate::error::ClusterError;
use ndarray::{Array2, ArrayView1, ArrayView2, Zip};

/// A pairwise distance provider.
///
/// `pairwise(a, b)` must return an `a.nrows() x b.nrows()` matrix of non-negative
/// distances and must be pure: the same inputs always give the same matrix.
/// Any function satisfying this contract can drive the clustering algorithms,
/// including plain closures with the signature
/// `Fn(&ArrayView2<f64>, &ArrayView2<f64>) -> Array2<f64>`.
pub trait Distance: Send + Sync {
    /// Compute the distance from every row of `a` to every row of `b`.
    fn pairwise(&self, a: &ArrayView2<f64>, b: &ArrayView2<f64>) -> Array2<f64>;

    /// Reject dimensionalities the metric is not defined for.
    fn validate_dimensions(&self, _n_features: usize) -> Result<(), ClusterError> {
        Ok(())
    }
}

impl<F> Distance for F
where
    F: Fn(&ArrayView2<f64>, &ArrayView2<f64>) -> Array2<f64> + Send + Sync,
{
    fn pairwise(&self, a: &ArrayView2<f64>, b: &ArrayView2<f64>) -> Array2<f64> {
        self(a, b)
    }
}

/// Straight-line (L2) distance, the default metric.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Euclidean;

impl Distance for Euclidean {
    fn pairwise(&self, a: &ArrayView2<f64>, b: &ArrayView2<f64>) -> Array2<f64> {
        pairwise_with(a, b, |x, y| squared_l2(&x, &y).sqrt())
    }
}

/// Squared L2 distance. Not a metric, but cheaper and order-preserving.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SquaredEuclidean;

impl Distance for SquaredEuclidean {
    fn pairwise(&self, a: &ArrayView2<f64>, b: &ArrayView2<f64>) -> Array2<f64> {
        pairwise_with(a, b, |x, y| squared_l2(&x, &y))
    }
}

/// City-block (L1) distance.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Manhattan;

impl Distance for Manhattan {
    fn pairwise(&self, a: &ArrayView2<f64>, b: &ArrayView2<f64>) -> Array2<f64> {
        pairwise_with(a, b, |x, y| {
            x.iter().zip(y.iter()).map(|(p, q)| (p - q).abs()).sum()
        })
    }
}

/// Great-circle distance between `[latitude, longitude]` pairs given in radians.
///
/// With the default radius of 1.0 the result is the central angle, matching
/// scikit-learn's `haversine_distances`. Use [`Haversine::EARTH_RADIUS_KM`] to get
/// kilometres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Haversine {
    pub radius: f64,
}

impl Haversine {
    /// Mean Earth radius in kilometres
    pub const EARTH_RADIUS_KM: f64 = 6371.0088;

    pub fn new(radius: f64) -> Self {
        Self { radius }
    }

    pub fn earth_km() -> Self {
        Self::new(Self::EARTH_RADIUS_KM)
    }
}

impl Default for Haversine {
    fn default() -> Self {
        Self { radius: 1.0 }
    }
}

impl Distance for Haversine {
    fn pairwise(&self, a: &ArrayView2<f64>, b: &ArrayView2<f64>) -> Array2<f64> {
        let radius = self.radius;
        pairwise_with(a, b, move |x, y| {
            let (lat1, lon1) = (x[0], x[1]);
            let (lat2, lon2) = (y[0], y[1]);
            let sin_dlat = ((lat2 - lat1) / 2.0).sin();
            let sin_dlon = ((lon2 - lon1) / 2.0).sin();
            let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
            2.0 * radius * h.clamp(0.0, 1.0).sqrt().asin()
        })
    }

    fn validate_dimensions(&self, n_features: usize) -> Result<(), ClusterError> {
        if n_features != 2 {
            return Err(ClusterError::InvalidDimensions(format!(
                "Haversine distance expects [lat, lon] pairs, got {} features",
                n_features
            )));
        }
        Ok(())
    }
}

#[inline]
fn squared_l2(x: &ArrayView1<f64>, y: &ArrayView1<f64>) -> f64 {
    x.iter()
        .zip(y.iter())
        .map(|(p, q)| {
            let d = p - q;
            d * d
        })
        .sum()
}

/// Build a distance matrix from a per-pair kernel, one output row per row of `a`.
///
/// Rows are filled in parallel; each worker writes only its own row.
pub fn pairwise_with<K>(a: &ArrayView2<f64>, b: &ArrayView2<f64>, kernel: K) -> Array2<f64>
where
    K: Fn(ArrayView1<f64>, ArrayView1<f64>) -> f64 + Sync,
{
    let mut out = Array2::zeros((a.nrows(), b.nrows()));

    Zip::from(out.rows_mut())
        .and(a.rows())
        .par_for_each(|mut out_row, a_row| {
            for (j, b_row) in b.rows().into_iter().enumerate() {
                out_row[j] = kernel(a_row, b_row);
            }
        });

    out
}

/// Run a distance provider and check that its output honours the contract.
pub fn checked_pairwise<D: Distance + ?Sized>(
    distance: &D,
    a: &ArrayView2<f64>,
    b: &ArrayView2<f64>,
) -> Result<Array2<f64>, ClusterError> {
    let dist = distance.pairwise(a, b);

    if dist.dim() != (a.nrows(), b.nrows()) {
        return Err(ClusterError::InvalidDistance(format!(
            "Expected a {}x{} matrix, got {}x{}",
            a.nrows(),
            b.nrows(),
            dist.nrows(),
            dist.ncols()
        )));
    }

    if let Some(bad) = dist.iter().find(|v| v.is_nan() || **v < 0.0) {
        return Err(ClusterError::InvalidDistance(format!(
            "Distances must be non-negative numbers, found {}",
            bad
        )));
    }

    Ok(dist)
}

/// Index of the smallest value in a row. Ties resolve to the lowest index.
#[inline]
pub fn argmin(row: &ArrayView1<f64>) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (j, &d) in row.iter().enumerate() {
        if d < best_dist {
            best_dist = d;
            best = j;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_euclidean_pairwise() {
        let a = array![[0.0, 0.0], [3.0, 4.0]];
        let b = array![[0.0, 0.0], [6.0, 8.0], [3.0, 0.0]];

        let dist = Euclidean.pairwise(&a.view(), &b.view());

        assert_eq!(dist.dim(), (2, 3));
        assert_relative_eq!(dist[[0, 0]], 0.0);
        assert_relative_eq!(dist[[0, 1]], 10.0, epsilon = 1e-12);
        assert_relative_eq!(dist[[1, 0]], 5.0, epsilon = 1e-12);
        assert_relative_eq!(dist[[1, 2]], 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_manhattan_and_squared() {
        let a = array![[1.0, 2.0]];
        let b = array![[4.0, 6.0]];

        assert_relative_eq!(Manhattan.pairwise(&a.view(), &b.view())[[0, 0]], 7.0);
        assert_relative_eq!(SquaredEuclidean.pairwise(&a.view(), &b.view())[[0, 0]], 25.0);
    }

    #[test]
    fn test_haversine_quarter_circle() {
        let equator = array![[0.0, 0.0]];
        let pole = array![[std::f64::consts::FRAC_PI_2, 0.0]];

        let dist = Haversine::default().pairwise(&equator.view(), &pole.view());
        assert_relative_eq!(dist[[0, 0]], std::f64::consts::FRAC_PI_2, epsilon = 1e-12);

        let km = Haversine::earth_km().pairwise(&equator.view(), &pole.view());
        assert_relative_eq!(
            km[[0, 0]],
            Haversine::EARTH_RADIUS_KM * std::f64::consts::FRAC_PI_2,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_haversine_rejects_wrong_dimensions() {
        assert!(Haversine::default().validate_dimensions(2).is_ok());
        assert!(matches!(
            Haversine::default().validate_dimensions(3),
            Err(ClusterError::InvalidDimensions(_))
        ));
    }

    fn constant(a: &ArrayView2<f64>, b: &ArrayView2<f64>) -> Array2<f64> {
        Array2::from_elem((a.nrows(), b.nrows()), 1.0)
    }

    fn wrong_shape(_: &ArrayView2<f64>, _: &ArrayView2<f64>) -> Array2<f64> {
        Array2::zeros((1, 1))
    }

    fn negative(a: &ArrayView2<f64>, b: &ArrayView2<f64>) -> Array2<f64> {
        Array2::from_elem((a.nrows(), b.nrows()), -1.0)
    }

    #[test]
    fn test_function_is_distance() {
        let a = array![[0.0], [5.0]];

        let dist = checked_pairwise(&constant, &a.view(), &a.view()).unwrap();
        assert_eq!(dist.dim(), (2, 2));
        assert!(dist.iter().all(|&d| d == 1.0));
    }

    #[test]
    fn test_checked_pairwise_rejects_bad_output() {
        let a = array![[0.0], [5.0]];

        assert!(matches!(
            checked_pairwise(&wrong_shape, &a.view(), &a.view()),
            Err(ClusterError::InvalidDistance(_))
        ));
        assert!(matches!(
            checked_pairwise(&negative, &a.view(), &a.view()),
            Err(ClusterError::InvalidDistance(_))
        ));
    }

    #[test]
    fn test_argmin_prefers_lowest_index() {
        let row = array![3.0, 1.0, 1.0, 2.0];
        assert_eq!(argmin(&row.view()), 1);

        let flat = array![1.0, 1.0, 1.0];
        assert_eq!(argmin(&flat.view()), 0);
    }
}
