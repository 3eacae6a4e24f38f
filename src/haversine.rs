//! Straight-line distance oracle for when no routing backend is reachable.
//!
//! Legs are great-circle distances driven at a fixed speed, so they ignore
//! the road network and are always symmetric.

use crate::error::OracleError;
use crate::traits::{Coordinate, DistanceOracle, Leg};

const DEFAULT_SPEED_KMH: f64 = 40.0;

const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Clone)]
pub struct HaversineOracle {
    /// Assumed average driving speed in km/h.
    pub speed_kmh: f64,
}

impl Default for HaversineOracle {
    fn default() -> Self {
        Self::new(DEFAULT_SPEED_KMH)
    }
}

impl HaversineOracle {
    pub fn new(speed_kmh: f64) -> Self {
        Self { speed_kmh }
    }

    fn leg_for_km(&self, km: f64) -> Leg {
        Leg::new(km * 1000.0, km / self.speed_kmh * 3600.0)
    }
}

impl DistanceOracle for HaversineOracle {
    fn get_distance(&self, from: Coordinate, to: Coordinate) -> Result<Leg, OracleError> {
        if from.same_point(&to) {
            return Ok(Leg::ZERO);
        }
        Ok(self.leg_for_km(great_circle_km(from, to)))
    }
}

fn great_circle_km(from: Coordinate, to: Coordinate) -> f64 {
    let (phi1, phi2) = (from.lat.to_radians(), to.lat.to_radians());
    let half_dphi = (to.lat - from.lat).to_radians() / 2.0;
    let half_dlambda = (to.lng - from.lng).to_radians() / 2.0;

    let h = half_dphi.sin().powi(2) + phi1.cos() * phi2.cos() * half_dlambda.sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}
