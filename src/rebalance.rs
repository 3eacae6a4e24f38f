//! Inter-route rebalancing: relocate and swap moves between regular routes,
//! accepted only when the fairness tuple strictly improves.

use tracing::{debug, trace};

use crate::error::RoutingError;
use crate::fairness::{FairnessState, Ranked, RouteChange, pick};
use crate::route::RouteBuilder;
use crate::solver::{Phase, PhaseGuard};
use crate::travel::TravelTable;
use crate::two_opt;

/// How a rebalancing run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RebalanceOutcome {
    pub(crate) iterations: usize,
    pub(crate) moves: usize,
    /// The iteration cap was reached while moves were still being accepted.
    pub(crate) capped: bool,
}

#[derive(Debug, Clone, Copy)]
struct Relocate {
    from_pos: usize,
    to_pos: usize,
}

#[derive(Debug, Clone, Copy)]
struct Swap {
    a_pos: usize,
    b_pos: usize,
}

pub(crate) fn rebalance(
    routes: &mut [RouteBuilder],
    unassigned: usize,
    table: &TravelTable,
    epsilon: f64,
    max_iterations: usize,
    guard: &PhaseGuard,
) -> Result<RebalanceOutcome, RoutingError> {
    let mut moves = 0;
    for iteration in 0..max_iterations {
        guard.check(Phase::InterRoute)?;

        let mut accepted = 0;
        for a in 0..routes.len() {
            for b in 0..routes.len() {
                if a == b {
                    continue;
                }
                if relocate(routes, a, b, unassigned, table, epsilon) {
                    accepted += settle(routes, a, b, table);
                }
                if relocate(routes, b, a, unassigned, table, epsilon) {
                    accepted += settle(routes, a, b, table);
                }
                if swap(routes, a, b, unassigned, table, epsilon) {
                    accepted += settle(routes, a, b, table);
                }
            }
        }

        moves += accepted;
        debug!(iteration, accepted, "rebalance iteration");
        if accepted == 0 {
            return Ok(RebalanceOutcome {
                iterations: iteration + 1,
                moves,
                capped: false,
            });
        }
    }

    Ok(RebalanceOutcome {
        iterations: max_iterations,
        moves,
        capped: max_iterations > 0,
    })
}

/// Re-optimizes both routes touched by an accepted move.
fn settle(routes: &mut [RouteBuilder], a: usize, b: usize, table: &TravelTable) -> usize {
    two_opt::optimize(&mut routes[a], table);
    two_opt::optimize(&mut routes[b], table);
    1
}

/// Moves the best single item from `from` into `to` if that improves the tuple.
fn relocate(
    routes: &mut [RouteBuilder],
    from: usize,
    to: usize,
    unassigned: usize,
    table: &TravelTable,
    epsilon: f64,
) -> bool {
    let source = &routes[from];
    let target = &routes[to];
    if source.is_empty() || !target.has_capacity() {
        return false;
    }

    let state = FairnessState::capture(routes, unassigned);
    let current = state.tuple();
    let mut best = None;
    for from_pos in 0..source.len() {
        let item = source.stops()[from_pos];
        let source_duration = source.duration_without(from_pos, table);
        for to_pos in 0..=target.len() {
            let target_duration = target.duration_with_insertion(to_pos, item, table);
            let changes = [
                RouteChange {
                    route: from,
                    detour: source_duration - source.baseline(),
                    stops: source.len() - 1,
                },
                RouteChange {
                    route: to,
                    detour: target_duration - target.baseline(),
                    stops: target.len() + 1,
                },
            ];
            let candidate = Ranked {
                tuple: state.tuple_with(&changes, unassigned),
                cost: source_duration + target_duration - source.duration() - target.duration(),
                action: Relocate { from_pos, to_pos },
            };
            best = pick(best, candidate, epsilon);
        }
    }

    match best {
        Some(best) if best.tuple.is_better_than(&current, epsilon) => {
            let Relocate { from_pos, to_pos } = best.action;
            let item = routes[from].remove(from_pos, table);
            routes[to].insert(to_pos, item, table);
            trace!(from, to, item, to_pos, "relocated");
            true
        }
        _ => false,
    }
}

/// Exchanges one item of `a` with one item of `b`, each taking the other's position.
fn swap(
    routes: &mut [RouteBuilder],
    a: usize,
    b: usize,
    unassigned: usize,
    table: &TravelTable,
    epsilon: f64,
) -> bool {
    let left = &routes[a];
    let right = &routes[b];
    if left.is_empty() || right.is_empty() {
        return false;
    }

    let state = FairnessState::capture(routes, unassigned);
    let current = state.tuple();
    let mut best = None;
    for a_pos in 0..left.len() {
        for b_pos in 0..right.len() {
            let left_duration = left.duration_with_replacement(a_pos, right.stops()[b_pos], table);
            let right_duration = right.duration_with_replacement(b_pos, left.stops()[a_pos], table);
            let changes = [
                RouteChange {
                    route: a,
                    detour: left_duration - left.baseline(),
                    stops: left.len(),
                },
                RouteChange {
                    route: b,
                    detour: right_duration - right.baseline(),
                    stops: right.len(),
                },
            ];
            let candidate = Ranked {
                tuple: state.tuple_with(&changes, unassigned),
                cost: left_duration + right_duration - left.duration() - right.duration(),
                action: Swap { a_pos, b_pos },
            };
            best = pick(best, candidate, epsilon);
        }
    }

    match best {
        Some(best) if best.tuple.is_better_than(&current, epsilon) => {
            let Swap { a_pos, b_pos } = best.action;
            let incoming = routes[b].stops()[b_pos];
            let outgoing = routes[a].replace(a_pos, incoming, table);
            routes[b].replace(b_pos, outgoing, table);
            trace!(a, b, outgoing, incoming, "swapped");
            true
        }
        _ => false,
    }
}
