//! Run same-size k-means on a .npy file.
//!
//! Reads an (n_samples, n_features) `f64` array, fits the model and writes the
//! balanced labels (`i64`) and the centers to two .npy files.
//!
//! Usage: `cluster-npy <input.npy> <labels.npy> <centers.npy> <k> <seed> <max_iters> [metric]`
//!
//! `metric` is one of `euclidean` (default), `manhattan` or `haversine`
//! (`[lat, lon]` in radians). Set `CLUSTER_LOG=debug` to trace every pass.

use constrained_clustering_rs::{
    Distance, Euclidean, Haversine, Manhattan, SameSizeConfig, SameSizeKMeans,
};
use ndarray::{Array1, Array2};
use ndarray_npy::{ReadNpyExt, WriteNpyExt};
use std::env;
use std::fs::File;
use std::io::BufReader;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    if args.len() != 7 && args.len() != 8 {
        eprintln!(
            "Usage: {} <input.npy> <labels.npy> <centers.npy> <k> <seed> <max_iters> [metric]",
            args[0]
        );
        std::process::exit(1);
    }

    let log_level = match env::var("CLUSTER_LOG").as_deref() {
        Ok("debug") => Level::DEBUG,
        Ok("warn") => Level::WARN,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let input_path = &args[1];
    let labels_path = &args[2];
    let centers_path = &args[3];
    let k: usize = args[4].parse()?;
    let seed: u64 = args[5].parse()?;
    let max_iters: usize = args[6].parse()?;
    let metric = args.get(7).map(String::as_str).unwrap_or("euclidean");

    let reader = BufReader::new(File::open(input_path)?);
    let data: Array2<f64> = Array2::read_npy(reader)?;

    tracing::info!(
        n_samples = data.nrows(),
        n_features = data.ncols(),
        k,
        seed,
        max_iters,
        metric,
        "loaded data"
    );

    let config = SameSizeConfig::new(k)
        .with_seed(seed)
        .with_max_iters(max_iters)
        .with_verbose(true);

    match metric {
        "euclidean" => run(config, Euclidean, &data, labels_path, centers_path),
        "manhattan" => run(config, Manhattan, &data, labels_path, centers_path),
        "haversine" => run(config, Haversine::default(), &data, labels_path, centers_path),
        other => Err(format!("Unknown metric: {}", other).into()),
    }
}

fn run<D: Distance>(
    config: SameSizeConfig,
    distance: D,
    data: &Array2<f64>,
    labels_path: &str,
    centers_path: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kmeans = SameSizeKMeans::with_distance(config, distance);
    kmeans.train(&data.view())?;

    let labels: Array1<i64> = kmeans
        .labels()
        .ok_or("No labels after training")?
        .mapv(|label| label as i64);
    let centers = kmeans.centroids().ok_or("No centers after training")?;

    labels.write_npy(File::create(labels_path)?)?;
    centers.write_npy(File::create(centers_path)?)?;

    tracing::info!(
        sizes = ?kmeans.cluster_sizes().unwrap_or_default(),
        pending = kmeans.pending_transfers().unwrap_or_default(),
        labels_path,
        centers_path,
        "saved results"
    );

    Ok(())
}
