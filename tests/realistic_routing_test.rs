//! Realistic routing tests using real Las Vegas locations.
//!
//! Travel times come from the haversine oracle, so these run without a
//! routing backend. `osrm_integration.rs` covers the road network.

mod fixtures;

use carpool_planner::haversine::HaversineOracle;
use carpool_planner::{Leg, RoutingWarning, SolveOptions, solve};

use fixtures::las_vegas_locations::{
    HENDERSON, HOMES, Location, NORTH_EAST, SOUTH_STRIP, VENUES,
};
use fixtures::{TestDriver, TestId, TestParticipant, TestRequest, with_overflow};

// ============================================================================
// Test Infrastructure
// ============================================================================

fn participants_from(areas: &[&[Location]]) -> Vec<TestParticipant> {
    areas
        .iter()
        .flat_map(|area| area.iter())
        .map(|loc| TestParticipant::new(loc.name).at(loc.lat, loc.lng))
        .collect()
}

fn drivers(capacity: i32) -> Vec<TestDriver> {
    HOMES
        .iter()
        .map(|home| TestDriver::new(home.name).home(home.lat, home.lng).capacity(capacity))
        .collect()
}

fn event_request(participants: Vec<TestParticipant>, drivers: Vec<TestDriver>) -> TestRequest {
    TestRequest {
        origin: VENUES[0].coords(),
        participants,
        drivers,
        overflow: None,
        overflow_operator: None,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn test_event_dispersal_places_everyone() {
    let req = event_request(
        participants_from(&[HENDERSON, NORTH_EAST, SOUTH_STRIP]),
        drivers(6),
    );

    let result = solve(&req, &HaversineOracle::default(), SolveOptions::default()).unwrap();

    assert_eq!(result.summary.participants_routed, 16);
    assert!(!result.summary.used_overflow);
    for route in &result.routes {
        assert!(route.stops.len() <= 6);
        assert!(route.detour_secs >= -1e-6, "{:?} has a negative detour", route.driver_id);
        assert!(route.total_duration_secs >= route.baseline_duration_secs - 1e-6);
    }
    // Every hour-long city crossing would show up here.
    assert!(
        result.summary.max_detour_secs < 3600.0,
        "max detour {}s",
        result.summary.max_detour_secs
    );
}

#[test]
fn test_overflow_van_returns_to_venue() {
    let req = with_overflow(
        event_request(participants_from(&[HENDERSON, NORTH_EAST, SOUTH_STRIP]), drivers(4)),
        TestDriver::overflow("Shuttle Van").capacity(6),
        "Event Staff",
    );

    let result = solve(&req, &HaversineOracle::default(), SolveOptions::default()).unwrap();

    assert!(result.summary.used_overflow);
    assert_eq!(result.summary.drivers_used, 3);
    let van = result.routes.last().unwrap();
    assert!(van.is_overflow);
    assert_eq!(van.stops.len(), 4);
    assert_eq!(van.destination, VENUES[0].coords());
    assert_eq!(van.operator_id, Some(TestId::new("Event Staff")));
    assert!(result
        .warnings
        .contains(&RoutingWarning::OverflowUsed { participants: 4 }));
}

#[test]
fn test_participant_at_driver_home_costs_nothing_extra() {
    // "Budget Suites South" is both a drop-off and the driver's home.
    let stops = [SOUTH_STRIP[4], SOUTH_STRIP[0], SOUTH_STRIP[1]];
    let home = HOMES[2];
    let req = event_request(
        participants_from(&[&stops[..]]),
        vec![TestDriver::new(home.name).home(home.lat, home.lng).capacity(3)],
    );

    let result = solve(&req, &HaversineOracle::default(), SolveOptions::default()).unwrap();

    let route = &result.routes[0];
    assert_eq!(route.stops.len(), 3);
    assert_eq!(route.stops.last().unwrap().location, home.coords());
    assert_eq!(route.final_leg, Leg::ZERO);
}

#[test]
fn test_parallel_and_serial_runs_agree() {
    let req = event_request(
        participants_from(&[HENDERSON, NORTH_EAST, SOUTH_STRIP]),
        drivers(6),
    );
    let oracle = HaversineOracle::default();

    let parallel = solve(&req, &oracle, SolveOptions::default()).unwrap();
    let serial = solve(
        &req,
        &oracle,
        SolveOptions {
            parallel: false,
            ..SolveOptions::default()
        },
    )
    .unwrap();

    assert_eq!(parallel, serial);
}
