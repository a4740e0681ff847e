//! # constrained-clustering-rs
//!
//! Size-constrained clustering in Rust, compatible with ndarray.
//!
//! ## Features
//!
//! - **Same-size k-means**: partitions `n` points into `k` clusters whose sizes
//!   differ by at most one, using k-means++ seeding, a capacity-aware greedy
//!   assignment and a local search with single moves and pairwise swaps
//! - **Fuzzy c-means**: soft clustering with a membership matrix
//! - **Pluggable distances**: Euclidean, Manhattan, haversine, or any function
//!   returning a pairwise distance matrix
//! - **Parallel computation**: distance matrices and scoring use rayon
//! - **Reproducible**: every fit is seeded explicitly, no global random state
//!
//! ## Example
//!
//! ```rust
//! use constrained_clustering_rs::{SameSizeConfig, SameSizeKMeans};
//! use ndarray::Array2;
//! use ndarray_rand::RandomExt;
//! use ndarray_rand::rand_distr::Uniform;
//!
//! let data = Array2::random((1000, 8), Uniform::new(-1.0, 1.0));
//!
//! let config = SameSizeConfig::new(10).with_max_iters(100).with_seed(42);
//! let mut kmeans = SameSizeKMeans::with_config(config);
//! kmeans.train(&data.view()).unwrap();
//!
//! // Every cluster holds exactly 100 points
//! assert!(kmeans.cluster_sizes().unwrap().iter().all(|&size| size == 100));
//!
//! // New points go to their nearest center, with no size limit
//! let labels = kmeans.predict(&data.view()).unwrap();
//! assert_eq!(labels.len(), 1000);
//! ```
//!
//! ## Custom Distances
//!
//! ```rust
//! use constrained_clustering_rs::{Haversine, SameSizeConfig, SameSizeKMeans};
//! use ndarray::array;
//!
//! // [latitude, longitude] in radians
//! let cities = array![
//!     [0.8527, 0.0406],
//!     [0.8530, 0.0410],
//!     [0.5948, -1.2916],
//!     [0.5950, -1.2920],
//! ];
//!
//! let mut kmeans = SameSizeKMeans::with_distance(SameSizeConfig::new(2), Haversine::earth_km());
//! let labels = kmeans.fit_predict(&cities.view()).unwrap();
//! assert_eq!(labels[0], labels[1]);
//! assert_ne!(labels[0], labels[2]);
//! ```

mod algorithm;
mod capacity;
mod clusterer;
mod config;
mod distance;
mod error;
mod fuzzy;
mod init;
mod kmeans;
mod refine;

pub use algorithm::{points_from_rows, predict_labels, same_size_kmeans, SameSizeResult};
pub use capacity::CapacityTracker;
pub use clusterer::Clusterer;
pub use config::{FuzzyConfig, SameSizeConfig};
pub use distance::{pairwise_with, Distance, Euclidean, Haversine, Manhattan, SquaredEuclidean};
pub use error::ClusterError;
pub use fuzzy::{fuzzy_cmeans, membership_from_distances, FuzzyCMeans, FuzzyResult};
pub use kmeans::SameSizeKMeans;
