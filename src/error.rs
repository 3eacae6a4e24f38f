//! Error types for oracle lookups and routing calls.

use thiserror::Error;

use crate::solver::Phase;

/// Failure of a distance/duration lookup.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("oracle request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("oracle answered {code}: {message}")]
    Status { code: String, message: String },
    #[error("oracle has no route from point {from} to point {to}")]
    MissingValue { from: usize, to: usize },
    #[error("oracle returned {rows} rows for {expected} points")]
    MalformedMatrix { expected: usize, rows: usize },
}

/// Request rejected before any oracle call was made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("driver {driver} has a capacity of zero or less")]
    NonPositiveCapacity { driver: String },
    #[error("driver {driver} appears more than once")]
    DuplicateDriver { driver: String },
    #[error("regular driver {driver} is flagged as the overflow vehicle")]
    OverflowFlagOnRegularDriver { driver: String },
    #[error("overflow vehicle {driver} is not flagged as overflow")]
    OverflowNotFlagged { driver: String },
    #[error("overflow vehicle supplied without an operator")]
    MissingOverflowOperator,
    #[error("participant {participant} appears more than once")]
    DuplicateParticipant { participant: String },
    #[error("{what} has a non-finite coordinate")]
    NonFiniteCoordinate { what: String },
    #[error("assignment names unknown driver {driver}")]
    UnknownDriver { driver: String },
    #[error("assignment names unknown participant {participant}")]
    UnknownParticipant { participant: String },
    #[error("participant {participant} is assigned more than once")]
    DuplicateAssignment { participant: String },
    #[error("assignment leaves participant {participant} unplaced")]
    IncompleteAssignment { participant: String },
    #[error("assignment gives driver {driver} {assigned} participants for capacity {capacity}")]
    AssignmentOverCapacity {
        driver: String,
        assigned: usize,
        capacity: usize,
    },
}

/// Failure of a whole routing call. No partial result is ever returned.
#[derive(Debug, Error)]
pub enum RoutingError {
    #[error(transparent)]
    OracleFailure(#[from] OracleError),
    #[error(
        "{unassigned} of {total_items} participants unplaced (total capacity {total_capacity})"
    )]
    CapacityExceeded {
        unassigned: usize,
        total_capacity: usize,
        total_items: usize,
    },
    #[error("invalid routing request: {0}")]
    InvalidInput(#[from] InputError),
    #[error("routing cancelled before {phase}")]
    Cancelled { phase: Phase },
    #[error("routing deadline passed before {phase}")]
    DeadlineExceeded { phase: Phase },
}
