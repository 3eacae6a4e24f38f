//! Core domain traits for the carpool planner.
//!
//! These are intentionally minimal. Concrete apps implement them for their
//! own participant and driver records.

use std::fmt::Debug;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::error::OracleError;

/// Decimal places used when deciding whether two coordinates are the same point.
pub const COORDINATE_PRECISION: i32 = 5;

/// Unique identifier for planner entities.
pub trait Id: Clone + Eq + Hash + Debug {}

impl<T> Id for T where T: Clone + Eq + Hash + Debug {}

/// Geographic point (lat, lng).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Rounded key used for same-point detection and de-duplication.
    pub fn key(&self) -> (i64, i64) {
        let scale = 10f64.powi(COORDINATE_PRECISION);
        (
            (self.lat * scale).round() as i64,
            (self.lng * scale).round() as i64,
        )
    }

    pub fn same_point(&self, other: &Coordinate) -> bool {
        self.key() == other.key()
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self { lat, lng }
    }
}

/// Travel between two points as answered by a [`DistanceOracle`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Leg {
    pub distance_meters: f64,
    pub duration_secs: f64,
}

impl Leg {
    pub const ZERO: Leg = Leg {
        distance_meters: 0.0,
        duration_secs: 0.0,
    };

    pub fn new(distance_meters: f64, duration_secs: f64) -> Self {
        Self {
            distance_meters,
            duration_secs,
        }
    }
}

/// Someone to be driven from the origin to their own location.
pub trait Participant {
    type Id: Id;

    fn id(&self) -> &Self::Id;

    /// Drop-off location.
    fn location(&self) -> Coordinate;
}

/// A capacity-limited carrier.
pub trait Driver {
    type Id: Id;

    fn id(&self) -> &Self::Id;

    /// Where the driver ends up after the last drop-off.
    fn home(&self) -> Coordinate;

    /// Number of participants the driver can take.
    fn capacity(&self) -> i32;

    /// Marks the shared last-resort vehicle. It returns to the origin instead of a home.
    fn is_overflow(&self) -> bool {
        false
    }
}

/// Provides travel distance and duration between coordinates.
///
/// The planner treats answers as authoritative and never retries a failed call.
pub trait DistanceOracle: Sync {
    fn get_distance(&self, from: Coordinate, to: Coordinate) -> Result<Leg, OracleError>;

    /// Full N x N grid indexed by the provided point order.
    fn get_distance_matrix(&self, points: &[Coordinate]) -> Result<Vec<Vec<Leg>>, OracleError> {
        points
            .iter()
            .map(|from| {
                points
                    .iter()
                    .map(|to| {
                        if from.same_point(to) {
                            Ok(Leg::ZERO)
                        } else {
                            self.get_distance(*from, *to)
                        }
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect()
    }

    /// Batch-populates whatever cache the oracle keeps. Oracles without a
    /// cache have nothing to do.
    fn prewarm_cache(&self, _points: &[Coordinate]) -> Result<(), OracleError> {
        Ok(())
    }
}
