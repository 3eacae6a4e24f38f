//! Routing output and its assembly from finished routes.

use serde::{Deserialize, Serialize};

use crate::route::{RouteBuilder, RouteOwner};
use crate::traits::{Coordinate, Driver, Leg, Participant};
use crate::travel::TravelTable;

/// One drop-off in a route, with the leg that reached it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopResult<ParticipantId> {
    pub participant_id: ParticipantId,
    pub location: Coordinate,
    pub leg: Leg,
    /// Distance and duration from the origin up to this stop.
    pub cumulative: Leg,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResult<DriverId, ParticipantId> {
    pub driver_id: DriverId,
    /// Who operates the overflow vehicle; `None` for regular drivers.
    pub operator_id: Option<DriverId>,
    pub is_overflow: bool,
    pub destination: Coordinate,
    pub stops: Vec<StopResult<ParticipantId>>,
    /// Last stop to destination.
    pub final_leg: Leg,
    pub total_distance_meters: f64,
    pub total_duration_secs: f64,
    pub baseline_duration_secs: f64,
    /// Always zero for the overflow vehicle.
    pub detour_secs: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoutingSummary {
    pub participants_routed: usize,
    pub drivers_used: usize,
    pub total_distance_meters: f64,
    pub total_duration_secs: f64,
    pub max_detour_secs: f64,
    pub sum_detour_secs: f64,
    /// Averaged over regular drivers that received at least one participant.
    pub avg_detour_secs: f64,
    pub used_overflow: bool,
}

/// Non-fatal observations about a routing call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RoutingWarning<DriverId, ParticipantId> {
    UnusedDriver { driver: DriverId },
    OverflowUsed { participants: usize },
    RebalanceIterationCap { iterations: usize },
    ParticipantAtOrigin { participant: ParticipantId },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingResult<DriverId, ParticipantId> {
    pub routes: Vec<RouteResult<DriverId, ParticipantId>>,
    pub summary: RoutingSummary,
    pub warnings: Vec<RoutingWarning<DriverId, ParticipantId>>,
}

impl<DriverId: Clone, ParticipantId: Clone> RoutingResult<DriverId, ParticipantId> {
    /// The partition this result encodes: each route's driver and its ordered participants.
    pub fn assignment(&self) -> Vec<(DriverId, Vec<ParticipantId>)> {
        self.routes
            .iter()
            .map(|route| {
                (
                    route.driver_id.clone(),
                    route
                        .stops
                        .iter()
                        .map(|stop| stop.participant_id.clone())
                        .collect(),
                )
            })
            .collect()
    }
}

impl<DriverId: PartialEq, ParticipantId> RoutingResult<DriverId, ParticipantId> {
    pub fn route_for(&self, driver: &DriverId) -> Option<&RouteResult<DriverId, ParticipantId>> {
        self.routes.iter().find(|route| &route.driver_id == driver)
    }
}

/// Walks every non-empty route and aggregates the summary.
///
/// `routes` may be in any order; output follows request driver order with the
/// overflow vehicle last.
pub(crate) fn assemble<P, D>(
    participants: &[P],
    drivers: &[D],
    overflow: Option<(&D, Option<&D::Id>)>,
    routes: &[RouteBuilder],
    table: &TravelTable,
    warnings: Vec<RoutingWarning<D::Id, P::Id>>,
) -> RoutingResult<D::Id, P::Id>
where
    P: Participant,
    D: Driver,
{
    let mut ordered: Vec<&RouteBuilder> = routes.iter().filter(|route| !route.is_empty()).collect();
    ordered.sort_by_key(|route| match route.owner {
        RouteOwner::Driver(index) => index,
        RouteOwner::Overflow => usize::MAX,
    });

    let mut summary = RoutingSummary::default();
    let mut results = Vec::with_capacity(ordered.len());
    for route in ordered {
        let (driver_id, operator_id) = match route.owner {
            RouteOwner::Driver(index) => (drivers[index].id().clone(), None),
            RouteOwner::Overflow => match overflow {
                Some((vehicle, operator)) => (vehicle.id().clone(), operator.cloned()),
                None => continue,
            },
        };
        let result = walk(route, driver_id, operator_id, participants, table);

        summary.participants_routed += result.stops.len();
        summary.total_distance_meters += result.total_distance_meters;
        summary.total_duration_secs += result.total_duration_secs;
        if result.is_overflow {
            summary.used_overflow = true;
        } else {
            summary.drivers_used += 1;
            summary.max_detour_secs = summary.max_detour_secs.max(result.detour_secs);
            summary.sum_detour_secs += result.detour_secs;
        }
        results.push(result);
    }
    if summary.drivers_used > 0 {
        summary.avg_detour_secs = summary.sum_detour_secs / summary.drivers_used as f64;
    }

    RoutingResult {
        routes: results,
        summary,
        warnings,
    }
}

fn walk<P, DriverId>(
    route: &RouteBuilder,
    driver_id: DriverId,
    operator_id: Option<DriverId>,
    participants: &[P],
    table: &TravelTable,
) -> RouteResult<DriverId, P::Id>
where
    P: Participant,
{
    let path = route.path();
    let mut cumulative = Leg::ZERO;
    let mut stops = Vec::with_capacity(route.len());
    for (pos, &item) in route.stops().iter().enumerate() {
        let leg = table.leg(path[pos], path[pos + 1]);
        cumulative.distance_meters += leg.distance_meters;
        cumulative.duration_secs += leg.duration_secs;
        stops.push(StopResult {
            participant_id: participants[item].id().clone(),
            location: participants[item].location(),
            leg,
            cumulative,
        });
    }

    let final_leg = table.leg(path[path.len() - 2], route.destination());
    let is_overflow = route.is_overflow();
    RouteResult {
        driver_id,
        operator_id,
        is_overflow,
        destination: table.coordinate(route.destination()),
        stops,
        final_leg,
        total_distance_meters: cumulative.distance_meters + final_leg.distance_meters,
        total_duration_secs: cumulative.duration_secs + final_leg.duration_secs,
        baseline_duration_secs: route.baseline(),
        detour_secs: if is_overflow { 0.0 } else { route.detour() },
    }
}
