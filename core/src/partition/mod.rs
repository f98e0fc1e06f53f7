//! Clustering strategies used to split large allocation problems.
//!
//! Two interchangeable strategies, both consuming a similarity (not
//! distance) matrix:
//!
//! - `spectral`: binary bisection via the graph Laplacian's Fiedler vector
//!   followed by a seeded 1-D 2-means step
//! - `exemplar`: affinity-propagation clustering with a self-determined
//!   group count
//!
//! Similarity is derived from shortest-path distances as `1 / dist`, with
//! self-similarity pinned to `1.0` and unreachable pairs at `0.0`.

pub(crate) mod exemplar;
pub(crate) mod spectral;

use nalgebra::DMatrix;

use crate::shortest_path::SearchTrees;

/// Pairwise inverse-distance similarity for `nodes`, each of which must be
/// a seed of `trees`.
pub(crate) fn inverse_distance_similarity(nodes: &[usize], trees: &SearchTrees) -> DMatrix<f64> {
    DMatrix::from_fn(nodes.len(), nodes.len(), |i, j| {
        let dist = trees.distance(nodes[i], nodes[j]);
        if dist == 0.0 {
            1.0
        } else if dist.is_finite() {
            1.0 / dist
        } else {
            0.0
        }
    })
}
