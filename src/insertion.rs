//! Insertion cost evaluation, guaranteed seeding and fairness-driven
//! cheapest insertion.

use rayon::prelude::*;
use tracing::trace;

use crate::fairness::{FairnessState, Ranked, RouteChange, pick};
use crate::route::RouteBuilder;
use crate::travel::{Node, TravelTable};

/// Marginal duration of visiting `p` between `a` and `b`.
pub(crate) fn insertion_cost(table: &TravelTable, a: Node, b: Node, p: Node) -> f64 {
    table.duration(a, p) + table.duration(p, b) - table.duration(a, b)
}

/// Gives every route one seed item by greedy bipartite matching.
///
/// Runs only when there are at least as many items as routes. Pairs are taken
/// cheapest first; equal costs keep discovery order (route-major).
pub(crate) fn seed(
    routes: &mut [RouteBuilder],
    unassigned: &mut Vec<usize>,
    table: &TravelTable,
) -> usize {
    if routes.is_empty() || unassigned.len() < routes.len() {
        return 0;
    }

    let mut pairs = Vec::with_capacity(routes.len() * unassigned.len());
    for (r, route) in routes.iter().enumerate() {
        for (slot, &item) in unassigned.iter().enumerate() {
            let cost = insertion_cost(
                table,
                route.node_before(0),
                route.destination(),
                table.participant(item),
            );
            pairs.push((cost, r, slot));
        }
    }
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut route_seeded = vec![false; routes.len()];
    let mut item_taken = vec![false; unassigned.len()];
    let mut seeded = 0;
    for (cost, r, slot) in pairs {
        if route_seeded[r] || item_taken[slot] || !routes[r].has_capacity() {
            continue;
        }
        routes[r].insert(0, unassigned[slot], table);
        trace!(route = r, item = unassigned[slot], cost, "seeded");
        route_seeded[r] = true;
        item_taken[slot] = true;
        seeded += 1;
        if seeded == routes.len() {
            break;
        }
    }

    let mut taken = item_taken.into_iter();
    unassigned.retain(|_| !taken.next().unwrap_or(false));
    seeded
}

#[derive(Debug, Clone, Copy)]
struct Insertion {
    slot: usize,
    route: usize,
    pos: usize,
}

/// Inserts items one at a time, each time applying the (item, route, position)
/// triple with the best resulting fairness tuple. Stops when every route is full.
pub(crate) fn insert_cheapest(
    routes: &mut [RouteBuilder],
    unassigned: &mut Vec<usize>,
    table: &TravelTable,
    epsilon: f64,
    parallel: bool,
) -> usize {
    let mut inserted = 0;
    while !unassigned.is_empty() {
        let state = FairnessState::capture(routes, unassigned.len());
        let remaining = unassigned.len() - 1;
        let shared: &[RouteBuilder] = routes;

        let evaluate = |(slot, &item): (usize, &usize)| -> Option<Ranked<Insertion>> {
            let mut best = None;
            for (r, route) in shared.iter().enumerate() {
                if !route.has_capacity() {
                    continue;
                }
                for pos in 0..=route.len() {
                    let duration = route.duration_with_insertion(pos, item, table);
                    let change = RouteChange {
                        route: r,
                        detour: duration - route.baseline(),
                        stops: route.len() + 1,
                    };
                    let candidate = Ranked {
                        tuple: state.tuple_with(&[change], remaining),
                        cost: duration - route.duration(),
                        action: Insertion { slot, route: r, pos },
                    };
                    best = pick(best, candidate, epsilon);
                }
            }
            best
        };

        // Per-item winners are reduced in item order, so both paths agree.
        let per_item: Vec<Option<Ranked<Insertion>>> = if parallel {
            unassigned.par_iter().enumerate().map(&evaluate).collect()
        } else {
            unassigned.iter().enumerate().map(&evaluate).collect()
        };
        let best = per_item
            .into_iter()
            .flatten()
            .fold(None, |best, candidate| pick(best, candidate, epsilon));

        let Some(best) = best else {
            break;
        };
        let Insertion { slot, route, pos } = best.action;
        let item = unassigned.remove(slot);
        routes[route].insert(pos, item, table);
        trace!(route, item, pos, cost = best.cost, "inserted");
        inserted += 1;
    }
    inserted
}
