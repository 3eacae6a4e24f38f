//! carpool-planner core
//!
//! Capacitated assignment and routing of participants to drivers leaving a
//! common origin for their homes, balancing each driver's detour.

pub mod traits;
pub mod error;
pub mod fairness;
pub mod result;
pub mod solver;
pub mod osrm;
pub mod haversine;

mod travel;
mod route;
mod insertion;
mod two_opt;
mod rebalance;
mod overflow;

pub use error::{InputError, OracleError, RoutingError};
pub use fairness::FairnessTuple;
pub use result::{RouteResult, RoutingResult, RoutingSummary, RoutingWarning, StopResult};
pub use solver::{CancellationToken, Phase, RoutingRequest, SolveOptions, refine, solve, validate};
pub use traits::{Coordinate, DistanceOracle, Driver, Leg, Participant};
