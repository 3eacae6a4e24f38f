//! One carrier's mutable path between the origin and its destination.

use crate::insertion;
use crate::travel::{Node, TravelTable};

/// Which request slot a route belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RouteOwner {
    /// Index into the request's regular drivers.
    Driver(usize),
    Overflow,
}

/// Route state owned by the orchestrator for one routing call.
///
/// `path` is always `[origin, stops.., destination]` and `duration` always
/// matches the current stop order.
#[derive(Debug, Clone)]
pub(crate) struct RouteBuilder {
    pub(crate) owner: RouteOwner,
    capacity: usize,
    stops: Vec<usize>,
    path: Vec<Node>,
    baseline: f64,
    duration: f64,
}

impl RouteBuilder {
    /// Empty route for a regular driver; `baseline` is origin to home.
    pub(crate) fn for_driver(index: usize, capacity: usize, table: &TravelTable) -> Self {
        let origin = table.origin();
        let home = table.home(index);
        let baseline = table.duration(origin, home);
        Self {
            owner: RouteOwner::Driver(index),
            capacity,
            stops: Vec::new(),
            path: vec![origin, home],
            baseline,
            duration: baseline,
        }
    }

    /// Empty overflow route; it returns to the origin so its baseline is zero.
    pub(crate) fn for_overflow(capacity: usize, table: &TravelTable) -> Self {
        let origin = table.origin();
        Self {
            owner: RouteOwner::Overflow,
            capacity,
            stops: Vec::new(),
            path: vec![origin, origin],
            baseline: 0.0,
            duration: 0.0,
        }
    }

    pub(crate) fn is_overflow(&self) -> bool {
        self.owner == RouteOwner::Overflow
    }

    pub(crate) fn stops(&self) -> &[usize] {
        &self.stops
    }

    pub(crate) fn path(&self) -> &[Node] {
        &self.path
    }

    pub(crate) fn len(&self) -> usize {
        self.stops.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn has_capacity(&self) -> bool {
        self.stops.len() < self.capacity
    }

    pub(crate) fn baseline(&self) -> f64 {
        self.baseline
    }

    pub(crate) fn duration(&self) -> f64 {
        self.duration
    }

    pub(crate) fn detour(&self) -> f64 {
        self.duration - self.baseline
    }

    pub(crate) fn destination(&self) -> Node {
        self.path[self.path.len() - 1]
    }

    /// Node sitting before stop position `pos` (the origin for position 0).
    pub(crate) fn node_before(&self, pos: usize) -> Node {
        self.path[pos]
    }

    /// Node sitting after stop position `pos` (the destination past the end).
    pub(crate) fn node_after(&self, pos: usize) -> Node {
        self.path[pos + 2]
    }

    /// Route duration if `item` were spliced in at `pos` (0..=len).
    pub(crate) fn duration_with_insertion(
        &self,
        pos: usize,
        item: usize,
        table: &TravelTable,
    ) -> f64 {
        let a = self.path[pos];
        let b = self.path[pos + 1];
        self.duration + insertion::insertion_cost(table, a, b, table.participant(item))
    }

    /// Route duration if the stop at `pos` were taken out.
    pub(crate) fn duration_without(&self, pos: usize, table: &TravelTable) -> f64 {
        self.duration
            - insertion::insertion_cost(
                table,
                self.node_before(pos),
                self.node_after(pos),
                self.path[pos + 1],
            )
    }

    /// Route duration if the stop at `pos` were replaced by `item`.
    pub(crate) fn duration_with_replacement(
        &self,
        pos: usize,
        item: usize,
        table: &TravelTable,
    ) -> f64 {
        let a = self.node_before(pos);
        let b = self.node_after(pos);
        self.duration - insertion::insertion_cost(table, a, b, self.path[pos + 1])
            + insertion::insertion_cost(table, a, b, table.participant(item))
    }

    pub(crate) fn insert(&mut self, pos: usize, item: usize, table: &TravelTable) {
        self.stops.insert(pos, item);
        self.rebuild(table);
    }

    pub(crate) fn push(&mut self, item: usize, table: &TravelTable) {
        self.stops.push(item);
        self.rebuild(table);
    }

    pub(crate) fn remove(&mut self, pos: usize, table: &TravelTable) -> usize {
        let item = self.stops.remove(pos);
        self.rebuild(table);
        item
    }

    pub(crate) fn replace(&mut self, pos: usize, item: usize, table: &TravelTable) -> usize {
        let old = std::mem::replace(&mut self.stops[pos], item);
        self.rebuild(table);
        old
    }

    /// Reverses `stops[i..j]`.
    pub(crate) fn reverse(&mut self, i: usize, j: usize, table: &TravelTable) {
        self.stops[i..j].reverse();
        self.rebuild(table);
    }

    fn rebuild(&mut self, table: &TravelTable) {
        let origin = self.path[0];
        let destination = self.destination();
        self.path.clear();
        self.path.push(origin);
        self.path
            .extend(self.stops.iter().map(|&item| table.participant(item)));
        self.path.push(destination);
        self.duration = self
            .path
            .windows(2)
            .map(|leg| table.duration(leg[0], leg[1]))
            .sum();
    }
}
