use constrained_clustering_rs::{
    FuzzyCMeans, FuzzyConfig, Haversine, SameSizeConfig, SameSizeKMeans,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ndarray::Array2;
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use std::time::Duration;

fn benchmark_same_size_varying_samples(c: &mut Criterion) {
    let mut group = c.benchmark_group("same_size_samples");
    group.sample_size(10);
    group.warm_up_time(Duration::from_millis(500));
    group.measurement_time(Duration::from_secs(2));

    let n_features = 16;
    let k = 10;
    let sample_sizes = [500, 1_000, 2_000];

    for n_samples in sample_sizes.iter() {
        group.throughput(Throughput::Elements(*n_samples as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(n_samples),
            n_samples,
            |b, &n_samples| {
                let data = Array2::random((n_samples, n_features), Uniform::new(-1.0, 1.0));
                let config = SameSizeConfig::new(k).with_max_iters(20).with_seed(42);

                b.iter(|| {
                    let mut kmeans = SameSizeKMeans::with_config(config.clone());
                    kmeans.train(black_box(&data.view())).unwrap();
                    kmeans
                });
            },
        );
    }
    group.finish();
}

fn benchmark_same_size_varying_clusters(c: &mut Criterion) {
    let mut group = c.benchmark_group("same_size_clusters");
    group.sample_size(10);
    group.warm_up_time(Duration::from_millis(500));
    group.measurement_time(Duration::from_secs(2));

    let n_samples = 1_000;
    let n_features = 16;
    let cluster_counts = [5, 20, 50];

    for k in cluster_counts.iter() {
        group.throughput(Throughput::Elements(*k as u64));
        group.bench_with_input(BenchmarkId::from_parameter(k), k, |b, &k| {
            let data = Array2::random((n_samples, n_features), Uniform::new(-1.0, 1.0));
            let config = SameSizeConfig::new(k).with_max_iters(20).with_seed(42);

            b.iter(|| {
                let mut kmeans = SameSizeKMeans::with_config(config.clone());
                kmeans.train(black_box(&data.view())).unwrap();
                kmeans
            });
        });
    }
    group.finish();
}

fn benchmark_same_size_haversine(c: &mut Criterion) {
    let mut group = c.benchmark_group("same_size_haversine");
    group.sample_size(10);
    group.warm_up_time(Duration::from_millis(500));
    group.measurement_time(Duration::from_secs(2));

    group.bench_function("1k_points_8_clusters", |b| {
        let data = Array2::random((1_000, 2), Uniform::new(-1.0, 1.0));
        let config = SameSizeConfig::new(8).with_max_iters(20).with_seed(42);

        b.iter(|| {
            let mut kmeans = SameSizeKMeans::with_distance(config.clone(), Haversine::earth_km());
            kmeans.train(black_box(&data.view())).unwrap();
            kmeans
        });
    });
    group.finish();
}

fn benchmark_predict(c: &mut Criterion) {
    let mut group = c.benchmark_group("same_size_predict");
    group.sample_size(10);
    group.warm_up_time(Duration::from_millis(500));
    group.measurement_time(Duration::from_secs(2));

    let n_train = 1_000;
    let n_features = 32;
    let k = 20;
    let predict_sizes = [1_000, 5_000];

    // Pre-train the model
    let train_data = Array2::random((n_train, n_features), Uniform::new(-1.0, 1.0));
    let mut kmeans = SameSizeKMeans::with_config(SameSizeConfig::new(k).with_max_iters(20));
    kmeans.train(&train_data.view()).unwrap();

    for n_predict in predict_sizes.iter() {
        group.throughput(Throughput::Elements(*n_predict as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(n_predict),
            n_predict,
            |b, &n_predict| {
                let test_data = Array2::random((n_predict, n_features), Uniform::new(-1.0, 1.0));

                b.iter(|| kmeans.predict(black_box(&test_data.view())).unwrap());
            },
        );
    }
    group.finish();
}

fn benchmark_fuzzy(c: &mut Criterion) {
    let mut group = c.benchmark_group("fuzzy_cmeans");
    group.sample_size(10);
    group.warm_up_time(Duration::from_millis(500));
    group.measurement_time(Duration::from_secs(2));

    group.bench_function("2k_samples_10_clusters", |b| {
        let data = Array2::random((2_000, 16), Uniform::new(-1.0, 1.0));
        let config = FuzzyConfig::new(10).with_max_iters(50);

        b.iter(|| {
            let mut fcm = FuzzyCMeans::with_config(config.clone());
            fcm.train(black_box(&data.view())).unwrap();
            fcm
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    benchmark_same_size_varying_samples,
    benchmark_same_size_varying_clusters,
    benchmark_same_size_haversine,
    benchmark_predict,
    benchmark_fuzzy,
);

criterion_main!(benches);
