//! Optimal bipartite matching over rectangular cost matrices.
//!
//! Dense O(n^3) Hungarian algorithm (potentials formulation) over `f64`
//! costs. Rectangular inputs are padded to a square with a neutral
//! constant; maximization runs on the negated matrix. Intended for the
//! agent/goal counts a planning cycle produces, not for huge instances.

use nalgebra::DMatrix;

use crate::plan::DispatchError;

/// Solves the assignment problem for `costs`, returning `min(R, C)` pairs
/// of `(row, col)` ordered by row, each row and column used at most once,
/// minimizing (or with `maximize`, maximizing) the total cost.
///
/// Every entry must be finite; an unreachable distance has no meaningful
/// place in a matching and must be sanitized by the caller first. Ties are
/// resolved by scan order, so a fixed matrix always yields the same pairs.
pub fn solve_assignment(
    costs: &DMatrix<f64>,
    maximize: bool,
) -> Result<Vec<(usize, usize)>, DispatchError> {
    let (rows, cols) = costs.shape();

    for row in 0..rows {
        for col in 0..cols {
            let value = costs[(row, col)];
            if !value.is_finite() {
                return Err(DispatchError::NonFiniteCost { row, col, value });
            }
        }
    }

    if rows == 0 || cols == 0 {
        return Ok(Vec::new());
    }

    // Pad to a square. Dummy rows/cols are constant, so they shift every
    // candidate total equally and cannot change which real pairs win.
    let size = rows.max(cols);
    let mut square = vec![vec![0.0f64; size]; size];
    for row in 0..rows {
        for col in 0..cols {
            let value = costs[(row, col)];
            square[row][col] = if maximize { -value } else { value };
        }
    }

    let row_to_col = solve_square(&square);

    Ok(row_to_col
        .iter()
        .enumerate()
        .filter(|&(row, &col)| row < rows && col < cols)
        .map(|(row, &col)| (row, col))
        .collect())
}

/// Hungarian algorithm over a square matrix; `row_to_col[r]` is the column
/// assigned to row `r`. Indexing is 1-based internally, with row/col 0 as
/// the virtual start of each augmenting search.
fn solve_square(costs: &[Vec<f64>]) -> Vec<usize> {
    let n = costs.len();
    debug_assert!(costs.iter().all(|row| row.len() == n));

    let mut u = vec![0.0f64; n + 1];
    let mut v = vec![0.0f64; n + 1];
    let mut p = vec![0usize; n + 1];
    let mut way = vec![0usize; n + 1];

    for i in 1..=n {
        p[0] = i;
        let mut j0 = 0usize;
        let mut minv = vec![f64::INFINITY; n + 1];
        let mut used = vec![false; n + 1];

        loop {
            used[j0] = true;
            let i0 = p[j0];
            let mut delta = f64::INFINITY;
            let mut j1 = 0usize;

            for j in 1..=n {
                if used[j] {
                    continue;
                }
                let cur = costs[i0 - 1][j - 1] - u[i0] - v[j];
                if cur < minv[j] {
                    minv[j] = cur;
                    way[j] = j0;
                }
                if minv[j] < delta {
                    delta = minv[j];
                    j1 = j;
                }
            }

            for j in 0..=n {
                if used[j] {
                    u[p[j]] += delta;
                    v[j] -= delta;
                } else {
                    minv[j] -= delta;
                }
            }

            j0 = j1;
            if p[j0] == 0 {
                break;
            }
        }

        loop {
            let j1 = way[j0];
            p[j0] = p[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut row_to_col = vec![0usize; n];
    for j in 1..=n {
        if p[j] > 0 {
            row_to_col[p[j] - 1] = j - 1;
        }
    }
    row_to_col
}
