//! Generated instances: capacity, conservation and determinism hold for any input.

mod fixtures;

use std::collections::HashSet;

use carpool_planner::{RoutingError, SolveOptions, solve};
use proptest::prelude::*;

use fixtures::{PlaneOracle, TestDriver, TestParticipant, TestRequest, request, with_overflow};

prop_compose! {
    fn participants()
    (points in prop::collection::vec((-10.0..10.0f64, -10.0..10.0f64), 0..16))
    -> Vec<TestParticipant> {
        points
            .into_iter()
            .enumerate()
            .map(|(i, (lat, lng))| TestParticipant::new(&format!("p{i}")).at(lat, lng))
            .collect()
    }
}

prop_compose! {
    fn drivers()
    (homes in prop::collection::vec((-10.0..10.0f64, -10.0..10.0f64, 1..5i32), 1..4))
    -> Vec<TestDriver> {
        homes
            .into_iter()
            .enumerate()
            .map(|(i, (lat, lng, capacity))| {
                TestDriver::new(&format!("d{i}")).home(lat, lng).capacity(capacity)
            })
            .collect()
    }
}

fn requests() -> impl Strategy<Value = TestRequest> {
    (participants(), drivers(), prop::option::of(1..8i32)).prop_map(
        |(participants, drivers, overflow)| {
            let base = request(participants, drivers);
            match overflow {
                Some(capacity) => {
                    with_overflow(base, TestDriver::overflow("van").capacity(capacity), "op")
                }
                None => base,
            }
        },
    )
}

fn total_capacity(req: &TestRequest) -> usize {
    req.drivers
        .iter()
        .chain(req.overflow.as_ref())
        .map(|driver| driver.capacity as usize)
        .sum()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn places_everyone_or_reports_the_shortfall(req in requests()) {
        let capacity = total_capacity(&req);
        let items = req.participants.len();

        match solve(&req, &PlaneOracle::new(), SolveOptions::default()) {
            Ok(result) => {
                prop_assert!(items <= capacity);
                prop_assert_eq!(result.summary.participants_routed, items);

                let mut seen = HashSet::new();
                for route in &result.routes {
                    let limit = if route.is_overflow {
                        req.overflow.as_ref().map_or(0, |van| van.capacity as usize)
                    } else {
                        req.drivers
                            .iter()
                            .find(|driver| driver.id == route.driver_id)
                            .map_or(0, |driver| driver.capacity as usize)
                    };
                    prop_assert!(!route.stops.is_empty());
                    prop_assert!(route.stops.len() <= limit);
                    for stop in &route.stops {
                        prop_assert!(seen.insert(stop.participant_id.clone()));
                    }
                    if !route.is_overflow {
                        prop_assert!(route.detour_secs >= -1e-6);
                    }
                }
                prop_assert_eq!(seen.len(), items);
            }
            Err(RoutingError::CapacityExceeded { unassigned, total_capacity, total_items }) => {
                prop_assert_eq!(total_capacity, capacity);
                prop_assert_eq!(total_items, items);
                prop_assert_eq!(unassigned, items - capacity);
            }
            Err(other) => prop_assert!(false, "unexpected error {:?}", other),
        }
    }

    #[test]
    fn same_input_same_output(req in requests(), seed in prop::option::of(any::<u64>())) {
        let options = || SolveOptions { shuffle_seed: seed, ..SolveOptions::default() };
        let first = solve(&req, &PlaneOracle::new(), options());
        let serial = SolveOptions { parallel: false, ..options() };
        let second = solve(&req, &PlaneOracle::new(), serial);

        match (first, second) {
            (Ok(a), Ok(b)) => prop_assert_eq!(a, b),
            (Err(a), Err(b)) => prop_assert_eq!(a.to_string(), b.to_string()),
            (a, b) => prop_assert!(false, "diverged: {:?} vs {:?}", a.is_ok(), b.is_ok()),
        }
    }
}
