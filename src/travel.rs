//! Per-call travel table, filled by a single matrix request to the oracle.

use std::collections::HashMap;

use crate::error::OracleError;
use crate::traits::{Coordinate, DistanceOracle, Leg};

/// Index of a point inside a [`TravelTable`].
pub(crate) type Node = usize;

/// Immutable distance/duration lookup for one routing call.
///
/// Node layout: origin first, then participants in request order, then
/// driver homes in request order. Nodes sharing a rounded coordinate share a
/// matrix row, so their legs are zero without asking the oracle.
#[derive(Debug, Clone)]
pub(crate) struct TravelTable {
    coords: Vec<Coordinate>,
    slots: Vec<usize>,
    legs: Vec<Vec<Leg>>,
    participants: usize,
}

impl TravelTable {
    pub(crate) fn build<O>(
        oracle: &O,
        origin: Coordinate,
        participants: &[Coordinate],
        homes: &[Coordinate],
    ) -> Result<Self, OracleError>
    where
        O: DistanceOracle + ?Sized,
    {
        let mut coords = Vec::with_capacity(1 + participants.len() + homes.len());
        coords.push(origin);
        coords.extend_from_slice(participants);
        coords.extend_from_slice(homes);

        let mut seen: HashMap<(i64, i64), usize> = HashMap::new();
        let mut unique = Vec::new();
        let slots = coords
            .iter()
            .map(|coord| {
                *seen.entry(coord.key()).or_insert_with(|| {
                    unique.push(*coord);
                    unique.len() - 1
                })
            })
            .collect::<Vec<_>>();

        oracle.prewarm_cache(&unique)?;
        let mut legs = oracle.get_distance_matrix(&unique)?;
        if legs.len() != unique.len() {
            return Err(OracleError::MalformedMatrix {
                expected: unique.len(),
                rows: legs.len(),
            });
        }
        if let Some(row) = legs.iter().find(|row| row.len() != unique.len()) {
            return Err(OracleError::MalformedMatrix {
                expected: unique.len(),
                rows: row.len(),
            });
        }
        for (i, row) in legs.iter_mut().enumerate() {
            row[i] = Leg::ZERO;
        }

        Ok(Self {
            coords,
            slots,
            legs,
            participants: participants.len(),
        })
    }

    pub(crate) fn origin(&self) -> Node {
        0
    }

    pub(crate) fn participant(&self, index: usize) -> Node {
        1 + index
    }

    pub(crate) fn home(&self, index: usize) -> Node {
        1 + self.participants + index
    }

    pub(crate) fn coordinate(&self, node: Node) -> Coordinate {
        self.coords[node]
    }

    pub(crate) fn leg(&self, from: Node, to: Node) -> Leg {
        self.legs[self.slots[from]][self.slots[to]]
    }

    pub(crate) fn duration(&self, from: Node, to: Node) -> f64 {
        self.leg(from, to).duration_secs
    }

    /// Number of distinct points the oracle was asked about.
    pub(crate) fn distinct_points(&self) -> usize {
        self.legs.len()
    }
}
