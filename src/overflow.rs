//! Overflow fallback: nearest-neighbour fill of the shared vehicle.

use tracing::trace;

use crate::route::RouteBuilder;
use crate::travel::TravelTable;
use crate::two_opt;

/// Appends the unassigned item nearest to the current tail until the vehicle
/// is full or nothing is left, then applies 2-opt. Returns how many items
/// were taken.
pub(crate) fn absorb(
    route: &mut RouteBuilder,
    unassigned: &mut Vec<usize>,
    table: &TravelTable,
) -> usize {
    let mut taken = 0;
    while route.has_capacity() && !unassigned.is_empty() {
        let tail = route.node_before(route.len());
        let mut nearest = 0;
        let mut nearest_duration = f64::INFINITY;
        for (slot, &item) in unassigned.iter().enumerate() {
            let duration = table.duration(tail, table.participant(item));
            if duration < nearest_duration {
                nearest = slot;
                nearest_duration = duration;
            }
        }
        let item = unassigned.remove(nearest);
        route.push(item, table);
        trace!(item, duration = nearest_duration, "overflow drop-off");
        taken += 1;
    }
    two_opt::optimize(route, table);
    taken
}
