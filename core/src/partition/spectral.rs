//! Spectral bisection of a similarity matrix.
//!
//! Builds the unnormalized graph Laplacian `L = D - S`, embeds every node
//! as its coordinate in the Fiedler vector (the eigenvector of the
//! second-smallest eigenvalue), and splits the 1-D embedding with a seeded
//! 2-means step. The eigen-decomposition is delegated to nalgebra's
//! `SymmetricEigen`; asymmetric input is symmetrized first.

use nalgebra::{DMatrix, SymmetricEigen};
use rand::rngs::StdRng;
use rand::Rng;

/// A two-way split of node indices `0..n`. Either side may be empty when
/// the embedding carries no usable structure; callers must treat such a
/// split as degenerate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Bisection {
    pub left: Vec<usize>,
    pub right: Vec<usize>,
}

pub(crate) fn bisect(
    similarity: &DMatrix<f64>,
    kmeans_max_iterations: u32,
    rng: &mut StdRng,
) -> Bisection {
    let n = similarity.nrows();
    debug_assert_eq!(n, similarity.ncols(), "similarity matrix must be square");

    if n < 2 {
        return Bisection {
            left: (0..n).collect(),
            right: Vec::new(),
        };
    }

    let mut laplacian = DMatrix::<f64>::zeros(n, n);
    for i in 0..n {
        let mut degree = 0.0;
        for j in 0..n {
            if i == j {
                continue;
            }
            let weight = 0.5 * (similarity[(i, j)] + similarity[(j, i)]);
            laplacian[(i, j)] = -weight;
            degree += weight;
        }
        laplacian[(i, i)] = degree;
    }

    let eigen = SymmetricEigen::new(laplacian);
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| eigen.eigenvalues[a].total_cmp(&eigen.eigenvalues[b]));

    let embedding: Vec<f64> = eigen.eigenvectors.column(order[1]).iter().copied().collect();
    let labels = two_means(&embedding, kmeans_max_iterations, rng);

    let mut left = Vec::new();
    let mut right = Vec::new();
    for (node, &in_right) in labels.iter().enumerate() {
        if in_right {
            right.push(node);
        } else {
            left.push(node);
        }
    }
    Bisection { left, right }
}

/// 1-D 2-means: one random center, the farthest point as the other, then
/// Lloyd iterations to a fixed point or the iteration cap.
fn two_means(points: &[f64], max_iterations: u32, rng: &mut StdRng) -> Vec<bool> {
    let n = points.len();
    let mut labels = vec![false; n];

    let mut c0 = points[rng.gen_range(0..n)];
    let mut c1 = c0;
    for &p in points {
        if (p - c0).abs() > (c1 - c0).abs() {
            c1 = p;
        }
    }
    if c0 == c1 {
        return labels; // constant embedding, nothing to split
    }

    for _ in 0..max_iterations {
        let mut changed = false;
        for (i, &p) in points.iter().enumerate() {
            let in_right = (p - c1).abs() < (p - c0).abs();
            if labels[i] != in_right {
                labels[i] = in_right;
                changed = true;
            }
        }

        let (mut sum0, mut count0, mut sum1, mut count1) = (0.0, 0usize, 0.0, 0usize);
        for (i, &p) in points.iter().enumerate() {
            if labels[i] {
                sum1 += p;
                count1 += 1;
            } else {
                sum0 += p;
                count0 += 1;
            }
        }
        if count0 == 0 || count1 == 0 {
            break;
        }
        c0 = sum0 / count0 as f64;
        c1 = sum1 / count1 as f64;

        if !changed {
            break;
        }
    }

    labels
}
