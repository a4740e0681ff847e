use crate::capacity::CapacityTracker;
use crate::distance::{checked_pairwise, Distance};
use crate::error::ClusterError;
use ndarray::{Array1, ArrayView2, Axis, Zip};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::collections::BTreeSet;

/// Pick `k` well-spread seed points with greedy k-means++.
///
/// The first seed is uniform. Every later seed is sampled with probability
/// proportional to the squared distance to its nearest chosen seed; `2 + ln(k)`
/// candidates are drawn per step and the one that most reduces the total
/// potential wins. When all remaining weight is zero (duplicate points) the next
/// seed is drawn uniformly from the points not yet chosen.
///
/// Returns the row indices of the chosen seeds.
pub fn kmeans_plus_plus<D: Distance + ?Sized>(
    data: &ArrayView2<f64>,
    k: usize,
    distance: &D,
    rng: &mut ChaCha8Rng,
) -> Result<Vec<usize>, ClusterError> {
    let n_samples = data.nrows();
    let n_local_trials = 2 + (k as f64).ln() as usize;

    let first = rng.gen_range(0..n_samples);
    let mut seeds = vec![first];
    let mut closest = squared_distances_to(data, &[first], distance)?.column(0).to_owned();

    while seeds.len() < k {
        let potential = closest.sum();

        if potential <= 0.0 || !potential.is_finite() {
            let remaining: Vec<usize> = (0..n_samples).filter(|i| !seeds.contains(i)).collect();
            let pick = remaining[rng.gen_range(0..remaining.len())];
            let to_pick = squared_distances_to(data, &[pick], distance)?;
            Zip::from(&mut closest)
                .and(to_pick.column(0))
                .for_each(|c, &d| *c = c.min(d));
            seeds.push(pick);
            continue;
        }

        let weights = WeightedIndex::new(closest.iter().copied())
            .map_err(|e| ClusterError::InvalidDistance(format!("Cannot sample seeds: {}", e)))?;
        let mut candidates = Vec::with_capacity(n_local_trials);
        for _ in 0..n_local_trials {
            candidates.push(weights.sample(&mut *rng));
        }
        let to_candidates = squared_distances_to(data, &candidates, distance)?;

        let mut best: Option<(usize, f64, Array1<f64>)> = None;
        for (trial, column) in to_candidates.axis_iter(Axis(1)).enumerate() {
            let mut updated = closest.clone();
            Zip::from(&mut updated)
                .and(column)
                .for_each(|c, &d| *c = c.min(d));
            let trial_potential = updated.sum();

            if best
                .as_ref()
                .map_or(true, |(_, pot, _)| trial_potential < *pot)
            {
                best = Some((candidates[trial], trial_potential, updated));
            }
        }

        if let Some((seed, _, updated)) = best {
            seeds.push(seed);
            closest = updated;
        }
    }

    Ok(seeds)
}

fn squared_distances_to<D: Distance + ?Sized>(
    data: &ArrayView2<f64>,
    indices: &[usize],
    distance: &D,
) -> Result<ndarray::Array2<f64>, ClusterError> {
    let targets = data.select(Axis(0), indices);
    let mut dist = checked_pairwise(distance, data, &targets.view())?;
    dist.mapv_inplace(|d| d * d);
    Ok(dist)
}

/// Greedily assign every point to a cluster under hard size limits.
///
/// Points with the strongest preference (largest gap between their farthest and
/// nearest open cluster) are placed first, each into its nearest open cluster.
/// A cluster leaves the open set as soon as it is full, and the remaining
/// priorities are then recomputed over the clusters still open.
///
/// Exactly `n mod k` clusters are allowed to reach `maxsize`; once they have,
/// every other cluster is capped at `minsize`, so the final sizes always sum to
/// `n` within the tracker's bounds.
pub fn assign_balanced(dist: &ArrayView2<f64>, capacity: &mut CapacityTracker) -> Vec<usize> {
    let (n_samples, k) = dist.dim();
    let n_large = n_samples % k;

    let mut labels = vec![usize::MAX; n_samples];
    let mut unassigned: Vec<usize> = (0..n_samples).collect();
    let mut open: BTreeSet<usize> = (0..k).collect();
    let mut large_filled = 0;

    while !unassigned.is_empty() {
        let mut order: Vec<(usize, f64, usize)> = unassigned
            .par_iter()
            .map(|&i| {
                let row = dist.row(i);
                let mut nearest = usize::MAX;
                let mut lo = f64::INFINITY;
                let mut hi = f64::NEG_INFINITY;
                for &c in &open {
                    let d = row[c];
                    if d < lo || nearest == usize::MAX {
                        lo = d;
                        nearest = c;
                    }
                    hi = hi.max(d);
                }
                (i, hi - lo, nearest)
            })
            .collect();
        order.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

        for (i, _, cluster) in order {
            labels[i] = cluster;
            capacity.admit(cluster);

            let mut closed = false;
            if capacity.count(cluster) == capacity.maxsize() {
                if capacity.maxsize() > capacity.minsize() {
                    large_filled += 1;
                }
                open.remove(&cluster);
                closed = true;
            }
            if large_filled == n_large {
                let at_min: Vec<usize> = open
                    .iter()
                    .copied()
                    .filter(|&c| capacity.count(c) >= capacity.minsize())
                    .collect();
                for c in at_min {
                    open.remove(&c);
                    closed = true;
                }
            }
            if closed {
                break;
            }
        }

        unassigned.retain(|&i| labels[i] == usize::MAX);
    }

    labels
}

/// Build a balanced starting labeling from k-means++ seeds.
pub fn initialize<D: Distance + ?Sized>(
    data: &ArrayView2<f64>,
    k: usize,
    distance: &D,
    rng: &mut ChaCha8Rng,
) -> Result<(Vec<usize>, CapacityTracker), ClusterError> {
    let seeds = kmeans_plus_plus(data, k, distance, rng)?;
    let seed_points = data.select(Axis(0), &seeds);
    let dist = checked_pairwise(distance, data, &seed_points.view())?;

    let mut capacity = CapacityTracker::new(data.nrows(), k);
    let labels = assign_balanced(&dist.view(), &mut capacity);

    tracing::debug!(
        seeds = ?seeds,
        counts = ?capacity.counts(),
        "initial balanced assignment"
    );

    Ok((labels, capacity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::Euclidean;
    use ndarray::array;
    use ndarray_rand::rand_distr::Uniform;
    use ndarray_rand::RandomExt;
    use rand::SeedableRng;

    #[test]
    fn test_kmeans_plus_plus_distinct_seeds() {
        let data = array![[0.0, 0.0], [0.0, 1.0], [5.0, 5.0], [5.0, 6.0], [10.0, 0.0], [10.0, 1.0]];
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let seeds = kmeans_plus_plus(&data.view(), 3, &Euclidean, &mut rng).unwrap();

        assert_eq!(seeds.len(), 3);
        let unique: BTreeSet<usize> = seeds.iter().copied().collect();
        assert_eq!(unique.len(), 3);
    }

    #[test]
    fn test_kmeans_plus_plus_deterministic() {
        let mut data_rng = ChaCha8Rng::seed_from_u64(1);
        let data = ndarray::Array2::random_using((200, 4), Uniform::new(-1.0, 1.0), &mut data_rng);

        let mut rng_a = ChaCha8Rng::seed_from_u64(9);
        let mut rng_b = ChaCha8Rng::seed_from_u64(9);
        let a = kmeans_plus_plus(&data.view(), 7, &Euclidean, &mut rng_a).unwrap();
        let b = kmeans_plus_plus(&data.view(), 7, &Euclidean, &mut rng_b).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_kmeans_plus_plus_duplicate_points() {
        let data = ndarray::Array2::<f64>::zeros((5, 2));
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let seeds = kmeans_plus_plus(&data.view(), 5, &Euclidean, &mut rng).unwrap();

        let unique: BTreeSet<usize> = seeds.iter().copied().collect();
        assert_eq!(unique.len(), 5);
    }

    #[test]
    fn test_assign_balanced_prefers_nearest() {
        // Two points per seed, each point clearly closest to one seed.
        let dist = array![
            [0.1, 5.0, 9.0],
            [0.2, 5.0, 9.0],
            [5.0, 0.1, 5.0],
            [5.0, 0.2, 5.0],
            [9.0, 5.0, 0.1],
            [9.0, 5.0, 0.2],
        ];
        let mut capacity = CapacityTracker::new(6, 3);

        let labels = assign_balanced(&dist.view(), &mut capacity);

        assert_eq!(labels, vec![0, 0, 1, 1, 2, 2]);
        assert_eq!(capacity.counts(), &[2, 2, 2]);
    }

    #[test]
    fn test_assign_balanced_overflow_goes_to_next_nearest() {
        // Every point prefers cluster 0, which can hold only two.
        let dist = array![[0.0, 1.0], [0.0, 9.0], [0.0, 5.0], [0.0, 2.0]];
        let mut capacity = CapacityTracker::new(4, 2);

        let labels = assign_balanced(&dist.view(), &mut capacity);

        // Highest priority (largest gap) first: points 1 and 2 keep cluster 0.
        assert_eq!(labels, vec![1, 0, 0, 1]);
        assert_eq!(capacity.counts(), &[2, 2]);
    }

    #[test]
    fn test_assign_balanced_uneven_split() {
        // n = 10, k = 4: two clusters of three, two of two, never one of one.
        let dist = array![
            [0.0, 1.0, 2.0, 3.0],
            [0.0, 1.0, 2.0, 3.0],
            [0.0, 1.0, 2.0, 3.0],
            [0.0, 1.0, 2.0, 3.0],
            [0.0, 1.0, 2.0, 3.0],
            [0.0, 1.0, 2.0, 3.0],
            [0.0, 1.0, 2.0, 3.0],
            [0.0, 1.0, 2.0, 3.0],
            [0.0, 1.0, 2.0, 3.0],
            [0.0, 1.0, 2.0, 3.0],
        ];
        let mut capacity = CapacityTracker::new(10, 4);

        let labels = assign_balanced(&dist.view(), &mut capacity);

        assert_eq!(labels.len(), 10);
        assert!(capacity.is_balanced());
        assert_eq!(capacity.total(), 10);
        let mut sizes = capacity.counts().to_vec();
        sizes.sort_unstable();
        assert_eq!(sizes, vec![2, 2, 3, 3]);
    }

    #[test]
    fn test_assign_balanced_one_per_cluster() {
        let dist = array![[1.0, 1.0, 1.0], [1.0, 1.0, 1.0], [1.0, 1.0, 1.0]];
        let mut capacity = CapacityTracker::new(3, 3);

        let labels = assign_balanced(&dist.view(), &mut capacity);

        assert_eq!(labels, vec![0, 1, 2]);
    }
}
