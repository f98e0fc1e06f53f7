//! Exemplar-based clustering via affinity propagation.
//!
//! Message passing (responsibilities and availabilities, damped) over a
//! similarity matrix until the exemplar set is stable. The number of
//! groups is determined by the data and the preference value, not by the
//! caller: `target_count` is a hint, and the returned group count is
//! authoritative.
//!
//! Perfectly tied similarities make the messages permutation-symmetric and
//! the iteration cannot settle on an exemplar, so the matrix is perturbed
//! by a vanishing amount of noise drawn from the caller's seeded generator
//! before the first iteration.

use nalgebra::DMatrix;
use rand::rngs::StdRng;
use rand::Rng;

#[derive(Debug, Clone, Copy)]
pub(crate) struct ExemplarParams {
    pub damping: f64,
    pub max_iterations: u32,
    pub convergence_window: u32,
    /// Self-similarity for every candidate exemplar; `None` uses the
    /// median pairwise similarity.
    pub preference: Option<f64>,
}

/// Partitions nodes `0..n` into exemplar-centered groups.
///
/// Groups are ordered by exemplar index and each contains its exemplar;
/// members are ascending. When no exemplar emerges (or when there are no
/// more nodes than `target_count`), every node becomes its own group,
/// which downstream matching handles like a direct solve.
pub(crate) fn cluster(
    similarity: &DMatrix<f64>,
    target_count: usize,
    params: &ExemplarParams,
    rng: &mut StdRng,
) -> Vec<Vec<usize>> {
    let n = similarity.nrows();
    debug_assert_eq!(n, similarity.ncols(), "similarity matrix must be square");

    if n == 0 {
        return Vec::new();
    }
    if n <= target_count.max(1) {
        return (0..n).map(|i| vec![i]).collect();
    }

    let preference = params
        .preference
        .unwrap_or_else(|| median_off_diagonal(similarity));

    let mut s = similarity.clone();
    for k in 0..n {
        s[(k, k)] = preference;
    }
    let tie_break = 1e-9 * s.amax().max(1.0);
    for i in 0..n {
        for k in 0..n {
            s[(i, k)] += tie_break * (rng.gen::<f64>() - 0.5);
        }
    }

    let damping = params.damping;
    let update = |old: f64, new: f64| damping * old + (1.0 - damping) * new;

    let mut r = DMatrix::<f64>::zeros(n, n);
    let mut a = DMatrix::<f64>::zeros(n, n);
    let mut exemplars: Vec<usize> = Vec::new();
    let mut stable_for = 0u32;

    for _ in 0..params.max_iterations {
        // Responsibilities: how well k competes for i against the runner-up.
        for i in 0..n {
            let mut best = f64::NEG_INFINITY;
            let mut best_k = 0usize;
            let mut second = f64::NEG_INFINITY;
            for k in 0..n {
                let value = a[(i, k)] + s[(i, k)];
                if value > best {
                    second = best;
                    best = value;
                    best_k = k;
                } else if value > second {
                    second = value;
                }
            }
            for k in 0..n {
                let rival = if k == best_k { second } else { best };
                r[(i, k)] = update(r[(i, k)], s[(i, k)] - rival);
            }
        }

        // Availabilities: accumulated evidence that k is an exemplar.
        for k in 0..n {
            let mut positive_sum = 0.0;
            for i in 0..n {
                if i != k {
                    positive_sum += r[(i, k)].max(0.0);
                }
            }
            for i in 0..n {
                if i == k {
                    a[(k, k)] = update(a[(k, k)], positive_sum);
                } else {
                    let value = r[(k, k)] + positive_sum - r[(i, k)].max(0.0);
                    a[(i, k)] = update(a[(i, k)], value.min(0.0));
                }
            }
        }

        let current: Vec<usize> = (0..n).filter(|&k| r[(k, k)] + a[(k, k)] > 0.0).collect();
        if current == exemplars && !exemplars.is_empty() {
            stable_for += 1;
            if stable_for >= params.convergence_window {
                break;
            }
        } else {
            exemplars = current;
            stable_for = 0;
        }
    }

    if exemplars.is_empty() {
        return (0..n).map(|i| vec![i]).collect();
    }

    let mut groups: Vec<Vec<usize>> = vec![Vec::new(); exemplars.len()];
    for i in 0..n {
        if let Some(own) = exemplars.iter().position(|&e| e == i) {
            groups[own].push(i);
            continue;
        }
        let mut best = 0usize;
        for (gi, &e) in exemplars.iter().enumerate() {
            if similarity[(i, e)] > similarity[(i, exemplars[best])] {
                best = gi;
            }
        }
        groups[best].push(i);
    }
    groups
}

fn median_off_diagonal(similarity: &DMatrix<f64>) -> f64 {
    let n = similarity.nrows();
    let mut values = Vec::with_capacity(n * n.saturating_sub(1));
    for i in 0..n {
        for j in 0..n {
            if i != j {
                values.push(similarity[(i, j)]);
            }
        }
    }
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        values[mid]
    } else {
        0.5 * (values[mid - 1] + values[mid])
    }
}
