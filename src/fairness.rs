//! Lexicographic fairness key used to rank candidate moves.
//!
//! The key is `(unassigned, unused carriers, max detour, sum detour)`, lower
//! is better. Detour fields compare with a tolerance so that states within
//! `epsilon` seconds of each other tie and the cheaper move wins.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::route::RouteBuilder;

/// Default detour tolerance in seconds.
pub const DEFAULT_EPSILON: f64 = 5.0;

/// Snapshot of the assignment state, computed over regular routes only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FairnessTuple {
    pub unassigned: usize,
    pub unused_carriers: usize,
    pub max_detour: f64,
    pub sum_detour: f64,
}

impl FairnessTuple {
    /// Total order with `epsilon` tolerance on the detour fields.
    pub fn compare(&self, other: &Self, epsilon: f64) -> Ordering {
        self.unassigned
            .cmp(&other.unassigned)
            .then(self.unused_carriers.cmp(&other.unused_carriers))
            .then_with(|| compare_detour(self.max_detour, other.max_detour, epsilon))
            .then_with(|| compare_detour(self.sum_detour, other.sum_detour, epsilon))
    }

    pub fn is_better_than(&self, other: &Self, epsilon: f64) -> bool {
        self.compare(other, epsilon) == Ordering::Less
    }
}

fn compare_detour(a: f64, b: f64, epsilon: f64) -> Ordering {
    if (a - b).abs() < epsilon {
        Ordering::Equal
    } else {
        a.total_cmp(&b)
    }
}

/// Hypothetical new state of one route.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RouteChange {
    pub(crate) route: usize,
    pub(crate) detour: f64,
    pub(crate) stops: usize,
}

/// Per-route detours captured once per decision so candidates can be scored
/// without touching the routes.
#[derive(Debug, Clone)]
pub(crate) struct FairnessState {
    detours: Vec<f64>,
    stops: Vec<usize>,
    unassigned: usize,
}

impl FairnessState {
    /// `routes` must hold regular routes only; changes refer to their positions.
    pub(crate) fn capture(routes: &[RouteBuilder], unassigned: usize) -> Self {
        Self {
            detours: routes.iter().map(RouteBuilder::detour).collect(),
            stops: routes.iter().map(RouteBuilder::len).collect(),
            unassigned,
        }
    }

    pub(crate) fn tuple(&self) -> FairnessTuple {
        self.tuple_with(&[], self.unassigned)
    }

    /// Tuple that would result from applying `changes`.
    pub(crate) fn tuple_with(&self, changes: &[RouteChange], unassigned: usize) -> FairnessTuple {
        let mut unused_carriers = 0;
        let mut max_detour = 0.0_f64;
        let mut sum_detour = 0.0;
        for (index, (&detour, &stops)) in self.detours.iter().zip(&self.stops).enumerate() {
            let (detour, stops) = changes
                .iter()
                .find(|change| change.route == index)
                .map_or((detour, stops), |change| (change.detour, change.stops));
            if stops == 0 {
                unused_carriers += 1;
            }
            max_detour = max_detour.max(detour);
            sum_detour += detour;
        }
        FairnessTuple {
            unassigned,
            unused_carriers,
            max_detour,
            sum_detour,
        }
    }
}

/// A scored candidate move.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Ranked<M> {
    pub(crate) tuple: FairnessTuple,
    /// Marginal duration of the move, used to break tuple ties.
    pub(crate) cost: f64,
    pub(crate) action: M,
}

/// Keeps `best` unless `next` is strictly better, or ties and is cheaper.
pub(crate) fn pick<M>(best: Option<Ranked<M>>, next: Ranked<M>, epsilon: f64) -> Option<Ranked<M>> {
    match best {
        None => Some(next),
        Some(best) => match next.tuple.compare(&best.tuple, epsilon) {
            Ordering::Less => Some(next),
            Ordering::Greater => Some(best),
            Ordering::Equal if next.cost < best.cost => Some(next),
            Ordering::Equal => Some(best),
        },
    }
}
