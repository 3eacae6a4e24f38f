//! Intra-route 2-opt.
//!
//! Reversing `stops[i..j]` replaces the boundary edges `(path[i], path[i+1])`
//! and `(path[j], path[j+1])` with `(path[i], path[j])` and
//! `(path[i+1], path[j+1])`. The interior legs flip direction, which only
//! matters when the oracle is asymmetric, so they are included in the delta.
//! Full passes repeat until one pass finds no improving reversal.

use tracing::trace;

use crate::route::RouteBuilder;
use crate::travel::{Node, TravelTable};

/// Routes shorter than this are left alone.
pub(crate) const MIN_STOPS: usize = 3;

/// Smallest duration reduction that counts as an improvement.
const IMPROVEMENT: f64 = 1e-6;

/// Runs 2-opt to a local optimum. Returns the number of reversals applied.
pub(crate) fn optimize(route: &mut RouteBuilder, table: &TravelTable) -> usize {
    if route.len() < MIN_STOPS {
        return 0;
    }

    let mut reversals = 0;
    loop {
        let mut improved = false;
        let n = route.len();
        for i in 0..n - 1 {
            for j in i + 2..=n {
                let delta = reversal_delta(route.path(), i, j, table);
                if delta < -IMPROVEMENT {
                    route.reverse(i, j, table);
                    trace!(i, j, delta, "2-opt reversal");
                    reversals += 1;
                    improved = true;
                }
            }
        }
        if !improved {
            return reversals;
        }
    }
}

/// Change in route duration from reversing `stops[i..j]`.
pub(crate) fn reversal_delta(path: &[Node], i: usize, j: usize, table: &TravelTable) -> f64 {
    let before = path[i];
    let first = path[i + 1];
    let last = path[j];
    let after = path[j + 1];

    let mut delta = table.duration(before, last) + table.duration(first, after)
        - table.duration(before, first)
        - table.duration(last, after);
    for k in i + 1..j {
        delta += table.duration(path[k + 1], path[k]) - table.duration(path[k], path[k + 1]);
    }
    delta
}
