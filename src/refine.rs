use crate::capacity::CapacityTracker;
use crate::distance::{argmin, checked_pairwise, Distance};
use crate::error::ClusterError;
use ndarray::{Array2, ArrayView2, Zip};
use rayon::prelude::*;

/// What one local search pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassStats {
    /// Single points moved to a cluster with spare room
    pub moves: usize,
    /// Pairs of points exchanged between two clusters
    pub swaps: usize,
    /// Points queued because capacity blocked their move
    pub deferred: usize,
    /// Points still queued when the pass ended
    pub pending: usize,
}

impl PassStats {
    /// Whether the pass changed the labeling.
    pub fn changed(&self) -> bool {
        self.moves + self.swaps > 0
    }
}

/// Final state of the local search.
#[derive(Debug, Clone)]
pub struct RefineOutcome {
    pub centers: Array2<f64>,
    pub n_iterations: usize,
    pub pending_transfers: usize,
    pub converged: bool,
}

/// Mean of the points assigned to each cluster.
///
/// # Panics
///
/// Panics if a cluster has no members. Balanced labelings never leave a cluster
/// empty, so this signals a broken capacity invariant.
pub fn compute_centers(data: &ArrayView2<f64>, labels: &[usize], k: usize) -> Array2<f64> {
    let n_features = data.ncols();
    let mut sums = Array2::<f64>::zeros((k, n_features));
    let mut counts = vec![0usize; k];

    for (row, &label) in data.rows().into_iter().zip(labels) {
        let mut sum = sums.row_mut(label);
        sum += &row;
        counts[label] += 1;
    }

    for (cluster, &count) in counts.iter().enumerate() {
        assert!(
            count > 0,
            "capacity invariant violated: cluster {} is empty",
            cluster
        );
        sums.row_mut(cluster).mapv_inplace(|v| v / count as f64);
    }

    sums
}

/// One greedy pass over the points, most dissatisfied first.
///
/// For each point whose nearest center is not its own:
/// - swap with a point queued to leave the destination when the combined gain is positive,
/// - otherwise move it if both clusters stay within bounds,
/// - otherwise queue it on its current cluster if leaving would help.
///
/// Ties in preference are broken by point index so the pass is reproducible.
pub fn refine_pass(
    dist: &ArrayView2<f64>,
    labels: &mut [usize],
    capacity: &mut CapacityTracker,
) -> PassStats {
    let k = dist.ncols();

    let mut preference: Vec<(usize, f64)> = labels
        .par_iter()
        .enumerate()
        .map(|(i, &label)| {
            let row = dist.row(i);
            let nearest = row.iter().copied().fold(f64::INFINITY, f64::min);
            (i, row[label] - nearest)
        })
        .collect();
    preference.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

    let mut transfer: Vec<Vec<usize>> = vec![Vec::new(); k];
    let mut stats = PassStats::default();

    for (i, _) in preference {
        let source = labels[i];
        let row = dist.row(i);
        let dest = argmin(&row);
        if dest == source {
            continue;
        }

        let gain = row[source] - row[dest];

        let mut partner: Option<(usize, usize, f64)> = None;
        for (pos, &other) in transfer[dest].iter().enumerate() {
            let combined = gain + dist[[other, dest]] - dist[[other, source]];
            if combined <= 0.0 {
                continue;
            }
            let better = match partner {
                None => true,
                Some((_, best_other, best)) => {
                    combined > best || (combined == best && other < best_other)
                }
            };
            if better {
                partner = Some((pos, other, combined));
            }
        }

        if let Some((pos, other, _)) = partner {
            transfer[dest].remove(pos);
            labels[other] = source;
            labels[i] = dest;
            stats.swaps += 1;
            continue;
        }

        if gain > 0.0 && capacity.can_accept(dest) && capacity.can_release(source) {
            capacity.transfer(source, dest);
            labels[i] = dest;
            stats.moves += 1;
            continue;
        }

        if gain > 0.0 {
            transfer[source].push(i);
            stats.deferred += 1;
        }
    }

    stats.pending = transfer.iter().map(Vec::len).sum();
    stats
}

/// Run local search passes until a pass changes nothing or `max_iters` passes ran.
///
/// Centers are recomputed from the final labels before returning, so they
/// always match the returned partition.
pub fn refine<D: Distance + ?Sized>(
    data: &ArrayView2<f64>,
    labels: &mut [usize],
    capacity: &mut CapacityTracker,
    distance: &D,
    max_iters: usize,
) -> Result<RefineOutcome, ClusterError> {
    let k = capacity.k();
    let mut n_iterations = 0;
    let mut pending_transfers = 0;
    let mut converged = false;

    for iteration in 0..max_iters {
        n_iterations = iteration + 1;

        let centers = compute_centers(data, labels, k);
        let dist = checked_pairwise(distance, data, &centers.view())?;
        let stats = refine_pass(&dist.view(), labels, capacity);
        pending_transfers = stats.pending;

        tracing::debug!(
            iteration = iteration + 1,
            moves = stats.moves,
            swaps = stats.swaps,
            deferred = stats.deferred,
            pending = stats.pending,
            "local search pass"
        );

        if !stats.changed() {
            converged = true;
            break;
        }
    }

    if !converged && pending_transfers > 0 {
        tracing::warn!(
            max_iters,
            pending_transfers,
            "reached maximum iterations with transfers still pending"
        );
    }

    debug_assert!(capacity.is_balanced());
    debug_assert_eq!(*capacity, CapacityTracker::from_labels(labels, k));

    Ok(RefineOutcome {
        centers: compute_centers(data, labels, k),
        n_iterations,
        pending_transfers,
        converged,
    })
}

/// Sum of distances from each point to its own center.
pub fn total_cost(dist: &ArrayView2<f64>, labels: &[usize]) -> f64 {
    let mut cost = 0.0;
    Zip::from(dist.rows()).and(labels).for_each(|row, &label| {
        cost += row[label];
    });
    cost
}
