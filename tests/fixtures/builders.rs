//! Builders and deterministic oracles shared by the integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Serialize;

use carpool_planner::{
    Coordinate, DistanceOracle, Driver, Leg, OracleError, Participant, RoutingRequest,
};

#[derive(Clone, Debug, Hash, Eq, PartialEq, PartialOrd, Ord, Serialize)]
pub struct TestId(pub String);

impl TestId {
    pub fn new(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[derive(Clone, Debug)]
pub struct TestParticipant {
    pub id: TestId,
    pub location: Coordinate,
}

impl TestParticipant {
    pub fn new(id: &str) -> Self {
        Self {
            id: TestId::new(id),
            location: Coordinate::new(0.0, 0.0),
        }
    }

    pub fn at(mut self, lat: f64, lng: f64) -> Self {
        self.location = Coordinate::new(lat, lng);
        self
    }
}

impl Participant for TestParticipant {
    type Id = TestId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn location(&self) -> Coordinate {
        self.location
    }
}

#[derive(Clone, Debug)]
pub struct TestDriver {
    pub id: TestId,
    pub home: Coordinate,
    pub capacity: i32,
    pub overflow: bool,
}

impl TestDriver {
    pub fn new(id: &str) -> Self {
        Self {
            id: TestId::new(id),
            home: Coordinate::new(0.0, 0.0),
            capacity: 4,
            overflow: false,
        }
    }

    /// Shared vehicle; its home is ignored because it returns to the origin.
    pub fn overflow(id: &str) -> Self {
        Self {
            overflow: true,
            capacity: 10,
            ..Self::new(id)
        }
    }

    pub fn home(mut self, lat: f64, lng: f64) -> Self {
        self.home = Coordinate::new(lat, lng);
        self
    }

    pub fn capacity(mut self, capacity: i32) -> Self {
        self.capacity = capacity;
        self
    }
}

impl Driver for TestDriver {
    type Id = TestId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn home(&self) -> Coordinate {
        self.home
    }

    fn capacity(&self) -> i32 {
        self.capacity
    }

    fn is_overflow(&self) -> bool {
        self.overflow
    }
}

pub type TestRequest = RoutingRequest<TestParticipant, TestDriver>;

pub fn request(participants: Vec<TestParticipant>, drivers: Vec<TestDriver>) -> TestRequest {
    RoutingRequest {
        origin: Coordinate::new(0.0, 0.0),
        participants,
        drivers,
        overflow: None,
        overflow_operator: None,
    }
}

pub fn with_overflow(mut request: TestRequest, vehicle: TestDriver, operator: &str) -> TestRequest {
    request.overflow = Some(vehicle);
    request.overflow_operator = Some(TestId::new(operator));
    request
}

/// Euclidean plane: one coordinate unit is one minute of driving and one kilometre.
pub struct PlaneOracle {
    pub matrix_calls: AtomicUsize,
}

impl PlaneOracle {
    pub fn new() -> Self {
        Self {
            matrix_calls: AtomicUsize::new(0),
        }
    }
}

impl DistanceOracle for PlaneOracle {
    fn get_distance(&self, from: Coordinate, to: Coordinate) -> Result<Leg, OracleError> {
        let d = ((from.lat - to.lat).powi(2) + (from.lng - to.lng).powi(2)).sqrt();
        Ok(Leg::new(d * 1000.0, d * 60.0))
    }

    fn get_distance_matrix(&self, points: &[Coordinate]) -> Result<Vec<Vec<Leg>>, OracleError> {
        self.matrix_calls.fetch_add(1, Ordering::SeqCst);
        points
            .iter()
            .map(|a| {
                points
                    .iter()
                    .map(|b| self.get_distance(*a, *b))
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect()
    }
}

/// Oracle whose every answer is a failure.
pub struct DownOracle;

impl DistanceOracle for DownOracle {
    fn get_distance(&self, _from: Coordinate, _to: Coordinate) -> Result<Leg, OracleError> {
        Err(OracleError::Status {
            code: "NoRoute".to_string(),
            message: "routing backend unavailable".to_string(),
        })
    }
}
