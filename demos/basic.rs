//! Basic example demonstrating same-size k-means and fuzzy c-means
//!
//! Run with: cargo run --example basic --release

use constrained_clustering_rs::{FuzzyCMeans, FuzzyConfig, SameSizeConfig, SameSizeKMeans};
use ndarray::Array2;
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

fn main() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to install logger");

    println!("=== constrained-clustering-rs example ===\n");

    // Uneven blobs: the first center gets twice as many points as the others
    let n_samples = 300;
    let n_features = 2;
    let n_clusters = 3;
    let centers = [[-5.0f64, -5.0], [0.0, 5.0], [5.0, -5.0]];

    println!("Generating {} samples with {} features...", n_samples, n_features);

    let mut data = Array2::<f64>::zeros((n_samples, n_features));
    for i in 0..n_samples {
        let cluster_idx = match i % 4 {
            0 | 1 => 0,
            2 => 1,
            _ => 2,
        };
        let noise = Array2::random((1, n_features), Uniform::new(-1.5, 1.5));
        data[[i, 0]] = centers[cluster_idx][0] + noise[[0, 0]];
        data[[i, 1]] = centers[cluster_idx][1] + noise[[0, 1]];
    }

    println!("True cluster centers:");
    for (i, center) in centers.iter().enumerate() {
        println!("  Cluster {}: ({:.2}, {:.2})", i, center[0], center[1]);
    }
    println!();

    let config = SameSizeConfig::new(n_clusters)
        .with_max_iters(100)
        .with_seed(42)
        .with_verbose(true);

    println!("Running same-size k-means with k={}...\n", n_clusters);

    let mut kmeans = SameSizeKMeans::with_config(config);
    kmeans.train(&data.view()).expect("Training failed");

    println!("\nLearned centroids:");
    let centroids = kmeans.centroids().expect("Model is fitted");
    for i in 0..centroids.nrows() {
        println!(
            "  Centroid {}: ({:.4}, {:.4})",
            i,
            centroids[[i, 0]],
            centroids[[i, 1]]
        );
    }
    println!();

    println!("Balanced cluster distribution:");
    for (i, count) in kmeans.cluster_sizes().unwrap_or_default().iter().enumerate() {
        println!(
            "  Cluster {}: {} samples ({:.1}%)",
            i,
            count,
            (*count as f64 / n_samples as f64) * 100.0
        );
    }
    println!(
        "  Pending transfers: {}, converged: {}",
        kmeans.pending_transfers().unwrap_or_default(),
        kmeans.converged().unwrap_or_default()
    );
    println!();

    // Prediction ignores size limits, so the big blob gets its points back
    let predicted = kmeans.predict(&data.view()).expect("Prediction failed");
    let mut predicted_counts = vec![0usize; n_clusters];
    for &label in predicted.iter() {
        predicted_counts[label] += 1;
    }
    println!("Unconstrained nearest-center distribution: {:?}\n", predicted_counts);

    println!("Running fuzzy c-means with k={}...\n", n_clusters);

    let mut fcm = FuzzyCMeans::with_config(FuzzyConfig::new(n_clusters).with_verbose(true));
    let labels = fcm.fit_predict(&data.view()).expect("Training failed");
    let membership = fcm.membership().expect("Model is fitted");

    println!("\nFirst 5 fuzzy memberships:");
    for i in 0..5 {
        println!(
            "  Sample {} at ({:.2}, {:.2}) -> Cluster {} {:.3?}",
            i,
            data[[i, 0]],
            data[[i, 1]],
            labels[i],
            membership.row(i).to_vec()
        );
    }

    println!("\n=== Done! ===");
}
