//! Carpool routing solver.
//!
//! A call runs its phases strictly in order over routes it owns exclusively:
//! baseline, seeding, cheapest insertion, intra-route 2-opt, inter-route
//! rebalancing, overflow fallback and result assembly.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::{debug, debug_span, info, warn};

use crate::error::{InputError, RoutingError};
use crate::fairness::DEFAULT_EPSILON;
use crate::result::{RoutingResult, RoutingWarning, assemble};
use crate::route::{RouteBuilder, RouteOwner};
use crate::traits::{Coordinate, DistanceOracle, Driver, Participant};
use crate::travel::TravelTable;
use crate::{insertion, overflow, rebalance, two_opt};

/// Inputs for one routing call.
#[derive(Debug, Clone)]
pub struct RoutingRequest<P, D: Driver> {
    /// Shared starting point of every route.
    pub origin: Coordinate,
    pub participants: Vec<P>,
    pub drivers: Vec<D>,
    /// Shared last-resort vehicle; must report `is_overflow() == true`.
    pub overflow: Option<D>,
    /// Who operates the overflow vehicle. Required when `overflow` is set.
    pub overflow_operator: Option<D::Id>,
}

#[derive(Debug, Clone)]
pub struct SolveOptions {
    /// Detour tolerance (seconds) under which two states tie.
    pub fairness_epsilon: f64,
    /// Upper bound on inter-route rebalancing passes.
    pub max_rebalance_iterations: usize,
    /// Shuffles driver order before seeding. `None` keeps request order.
    pub shuffle_seed: Option<u64>,
    /// Evaluate insertion candidates on the rayon pool.
    pub parallel: bool,
    pub deadline: Option<Instant>,
    pub cancellation: Option<CancellationToken>,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            fairness_epsilon: DEFAULT_EPSILON,
            max_rebalance_iterations: 50,
            shuffle_seed: None,
            parallel: true,
            deadline: None,
            cancellation: None,
        }
    }
}

/// Cooperative cancellation flag shared with the caller.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Baseline,
    Seeding,
    Insertion,
    IntraRoute,
    InterRoute,
    Overflow,
    Assembly,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Baseline => "baseline",
            Phase::Seeding => "seeding",
            Phase::Insertion => "insertion",
            Phase::IntraRoute => "intra-route refinement",
            Phase::InterRoute => "inter-route refinement",
            Phase::Overflow => "overflow fallback",
            Phase::Assembly => "result assembly",
        };
        f.write_str(name)
    }
}

/// Deadline and cancellation checks between phases.
#[derive(Debug, Clone)]
pub(crate) struct PhaseGuard {
    deadline: Option<Instant>,
    cancellation: Option<CancellationToken>,
}

impl PhaseGuard {
    pub(crate) fn new(options: &SolveOptions) -> Self {
        Self {
            deadline: options.deadline,
            cancellation: options.cancellation.clone(),
        }
    }

    pub(crate) fn check(&self, phase: Phase) -> Result<(), RoutingError> {
        if self
            .cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
        {
            return Err(RoutingError::Cancelled { phase });
        }
        if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return Err(RoutingError::DeadlineExceeded { phase });
        }
        Ok(())
    }
}

/// Routes a request: partitions participants among drivers and orders each
/// driver's drop-offs.
///
/// Fails with [`RoutingError::CapacityExceeded`] when participants remain
/// after the overflow vehicle (if any) is full.
pub fn solve<P, D, O>(
    request: &RoutingRequest<P, D>,
    oracle: &O,
    options: SolveOptions,
) -> Result<RoutingResult<D::Id, P::Id>, RoutingError>
where
    P: Participant,
    D: Driver,
    O: DistanceOracle + ?Sized,
{
    let span = debug_span!(
        "solve",
        participants = request.participants.len(),
        drivers = request.drivers.len()
    );
    let _enter = span.enter();

    validate(request)?;
    let guard = PhaseGuard::new(&options);
    let mut plan = Plan::start(request, oracle, &options, &guard)?;
    plan.check_conservation(Phase::Baseline);

    guard.check(Phase::Seeding)?;
    let seeded = insertion::seed(&mut plan.routes, &mut plan.unassigned, &plan.table);
    debug!(seeded, "seeding done");
    plan.check_conservation(Phase::Seeding);

    guard.check(Phase::Insertion)?;
    let inserted = insertion::insert_cheapest(
        &mut plan.routes,
        &mut plan.unassigned,
        &plan.table,
        options.fairness_epsilon,
        options.parallel,
    );
    debug!(inserted, "insertion done");
    plan.check_conservation(Phase::Insertion);

    plan.refine_routes(&options, &guard)?;

    guard.check(Phase::Overflow)?;
    plan.overflow_fallback()?;
    plan.check_conservation(Phase::Overflow);

    guard.check(Phase::Assembly)?;
    Ok(plan.finish())
}

/// Re-optimizes a fixed partition, e.g. the [`RoutingResult::assignment`] of
/// an earlier call. Only intra- and inter-route refinement run; every
/// participant must appear exactly once.
pub fn refine<P, D, O>(
    request: &RoutingRequest<P, D>,
    assignment: &[(D::Id, Vec<P::Id>)],
    oracle: &O,
    options: SolveOptions,
) -> Result<RoutingResult<D::Id, P::Id>, RoutingError>
where
    P: Participant,
    D: Driver,
    O: DistanceOracle + ?Sized,
{
    let span = debug_span!("refine", routes = assignment.len());
    let _enter = span.enter();

    validate(request)?;
    let guard = PhaseGuard::new(&options);
    let mut plan = Plan::start(request, oracle, &options, &guard)?;
    plan.apply_assignment(assignment)?;
    plan.check_conservation(Phase::Baseline);

    plan.refine_routes(&options, &guard)?;
    if let Some(route) = plan.overflow.as_mut() {
        two_opt::optimize(route, &plan.table);
    }

    guard.check(Phase::Assembly)?;
    Ok(plan.finish())
}

/// Rejects malformed requests before the oracle is consulted.
pub fn validate<P, D>(request: &RoutingRequest<P, D>) -> Result<(), InputError>
where
    P: Participant,
    D: Driver,
{
    if !request.origin.is_finite() {
        return Err(InputError::NonFiniteCoordinate {
            what: "origin".to_string(),
        });
    }

    let mut participant_ids = HashSet::new();
    for participant in &request.participants {
        if !participant.location().is_finite() {
            return Err(InputError::NonFiniteCoordinate {
                what: format!("participant {:?}", participant.id()),
            });
        }
        if !participant_ids.insert(participant.id()) {
            return Err(InputError::DuplicateParticipant {
                participant: format!("{:?}", participant.id()),
            });
        }
    }

    let mut driver_ids = HashSet::new();
    for driver in &request.drivers {
        let name = format!("{:?}", driver.id());
        if driver.capacity() <= 0 {
            return Err(InputError::NonPositiveCapacity { driver: name });
        }
        if driver.is_overflow() {
            return Err(InputError::OverflowFlagOnRegularDriver { driver: name });
        }
        if !driver.home().is_finite() {
            return Err(InputError::NonFiniteCoordinate {
                what: format!("driver {name}"),
            });
        }
        if !driver_ids.insert(driver.id()) {
            return Err(InputError::DuplicateDriver { driver: name });
        }
    }

    if let Some(vehicle) = &request.overflow {
        let name = format!("{:?}", vehicle.id());
        if vehicle.capacity() <= 0 {
            return Err(InputError::NonPositiveCapacity { driver: name });
        }
        if !vehicle.is_overflow() {
            return Err(InputError::OverflowNotFlagged { driver: name });
        }
        if request.overflow_operator.is_none() {
            return Err(InputError::MissingOverflowOperator);
        }
        if driver_ids.contains(vehicle.id()) {
            return Err(InputError::DuplicateDriver { driver: name });
        }
    }

    Ok(())
}

/// Mutable state of one call, owned by the orchestrator.
struct Plan<'r, P: Participant, D: Driver> {
    request: &'r RoutingRequest<P, D>,
    table: TravelTable,
    /// Regular routes, possibly shuffled.
    routes: Vec<RouteBuilder>,
    overflow: Option<RouteBuilder>,
    unassigned: Vec<usize>,
    warnings: Vec<RoutingWarning<D::Id, P::Id>>,
}

impl<'r, P, D> Plan<'r, P, D>
where
    P: Participant,
    D: Driver,
{
    /// Builds the travel table and every regular route's baseline.
    fn start<O>(
        request: &'r RoutingRequest<P, D>,
        oracle: &O,
        options: &SolveOptions,
        guard: &PhaseGuard,
    ) -> Result<Self, RoutingError>
    where
        O: DistanceOracle + ?Sized,
    {
        guard.check(Phase::Baseline)?;
        let participants: Vec<Coordinate> = request
            .participants
            .iter()
            .map(Participant::location)
            .collect();
        let homes: Vec<Coordinate> = request.drivers.iter().map(Driver::home).collect();
        let table = TravelTable::build(oracle, request.origin, &participants, &homes)?;
        debug!(points = table.distinct_points(), "travel table ready");

        let mut routes: Vec<RouteBuilder> = request
            .drivers
            .iter()
            .enumerate()
            .map(|(index, driver)| RouteBuilder::for_driver(index, capacity_of(driver), &table))
            .collect();
        if let Some(seed) = options.shuffle_seed {
            routes.shuffle(&mut StdRng::seed_from_u64(seed));
        }

        let mut warnings = Vec::new();
        for participant in &request.participants {
            if participant.location().same_point(&request.origin) {
                warnings.push(RoutingWarning::ParticipantAtOrigin {
                    participant: participant.id().clone(),
                });
            }
        }

        Ok(Self {
            request,
            table,
            routes,
            overflow: None,
            unassigned: (0..request.participants.len()).collect(),
            warnings,
        })
    }

    /// Loads a caller-supplied partition in its given order.
    fn apply_assignment(&mut self, assignment: &[(D::Id, Vec<P::Id>)]) -> Result<(), InputError> {
        let request = self.request;
        let participant_index: HashMap<&P::Id, usize> = request
            .participants
            .iter()
            .enumerate()
            .map(|(index, participant)| (participant.id(), index))
            .collect();
        let mut assigned = vec![false; request.participants.len()];
        let table = &self.table;

        for (driver_id, participant_ids) in assignment {
            let route = match request.drivers.iter().position(|driver| driver.id() == driver_id) {
                Some(index) => self
                    .routes
                    .iter_mut()
                    .find(|route| route.owner == RouteOwner::Driver(index)),
                None => match &request.overflow {
                    Some(vehicle) if vehicle.id() == driver_id => {
                        let capacity = capacity_of(vehicle);
                        Some(
                            self.overflow
                                .get_or_insert_with(|| RouteBuilder::for_overflow(capacity, table)),
                        )
                    }
                    _ => None,
                },
            };
            let route = route.ok_or_else(|| InputError::UnknownDriver {
                driver: format!("{driver_id:?}"),
            })?;

            for participant_id in participant_ids {
                let &item = participant_index.get(participant_id).ok_or_else(|| {
                    InputError::UnknownParticipant {
                        participant: format!("{participant_id:?}"),
                    }
                })?;
                if std::mem::replace(&mut assigned[item], true) {
                    return Err(InputError::DuplicateAssignment {
                        participant: format!("{participant_id:?}"),
                    });
                }
                if !route.has_capacity() {
                    return Err(InputError::AssignmentOverCapacity {
                        driver: format!("{driver_id:?}"),
                        assigned: participant_ids.len(),
                        capacity: route.capacity(),
                    });
                }
                route.push(item, table);
            }
        }

        if let Some(missing) = assigned.iter().position(|&done| !done) {
            return Err(InputError::IncompleteAssignment {
                participant: format!("{:?}", request.participants[missing].id()),
            });
        }
        self.unassigned.clear();
        if let Some(taken) = self.overflow.as_ref().map(RouteBuilder::len).filter(|&n| n > 0) {
            self.warn(RoutingWarning::OverflowUsed {
                participants: taken,
            });
        }
        Ok(())
    }

    /// Phases 3 and 4 over the regular routes.
    fn refine_routes(
        &mut self,
        options: &SolveOptions,
        guard: &PhaseGuard,
    ) -> Result<(), RoutingError> {
        guard.check(Phase::IntraRoute)?;
        let reversals: usize = self
            .routes
            .iter_mut()
            .map(|route| two_opt::optimize(route, &self.table))
            .sum();
        debug!(reversals, "intra-route refinement done");
        self.check_conservation(Phase::IntraRoute);

        guard.check(Phase::InterRoute)?;
        let outcome = rebalance::rebalance(
            &mut self.routes,
            self.unassigned.len(),
            &self.table,
            options.fairness_epsilon,
            options.max_rebalance_iterations,
            guard,
        )?;
        debug!(
            iterations = outcome.iterations,
            moves = outcome.moves,
            "inter-route refinement done"
        );
        if outcome.capped {
            self.warn(RoutingWarning::RebalanceIterationCap {
                iterations: outcome.iterations,
            });
        }
        self.check_conservation(Phase::InterRoute);
        Ok(())
    }

    /// Phase 5. Any participant still unplaced afterwards fails the call.
    fn overflow_fallback(&mut self) -> Result<(), RoutingError> {
        let request = self.request;
        if !self.unassigned.is_empty() {
            if let Some(vehicle) = &request.overflow {
                let mut route = RouteBuilder::for_overflow(capacity_of(vehicle), &self.table);
                let taken = overflow::absorb(&mut route, &mut self.unassigned, &self.table);
                self.overflow = Some(route);
                self.warn(RoutingWarning::OverflowUsed {
                    participants: taken,
                });
            }
        }

        if self.unassigned.is_empty() {
            return Ok(());
        }
        let total_capacity = request
            .drivers
            .iter()
            .chain(request.overflow.as_ref())
            .map(capacity_of)
            .sum();
        Err(RoutingError::CapacityExceeded {
            unassigned: self.unassigned.len(),
            total_capacity,
            total_items: request.participants.len(),
        })
    }

    fn finish(mut self) -> RoutingResult<D::Id, P::Id> {
        let request = self.request;
        let unused: Vec<D::Id> = self
            .routes
            .iter()
            .filter(|route| route.is_empty())
            .filter_map(|route| match route.owner {
                RouteOwner::Driver(index) => Some(request.drivers[index].id().clone()),
                RouteOwner::Overflow => None,
            })
            .collect();
        for driver in unused {
            self.warn(RoutingWarning::UnusedDriver { driver });
        }

        let mut routes = self.routes;
        routes.extend(self.overflow);
        let overflow = request
            .overflow
            .as_ref()
            .map(|vehicle| (vehicle, request.overflow_operator.as_ref()));
        let result = assemble(
            &request.participants,
            &request.drivers,
            overflow,
            &routes,
            &self.table,
            self.warnings,
        );
        info!(
            participants = result.summary.participants_routed,
            drivers = result.summary.drivers_used,
            distance_m = result.summary.total_distance_meters,
            max_detour_s = result.summary.max_detour_secs,
            overflow = result.summary.used_overflow,
            "routing complete"
        );
        result
    }

    fn warn(&mut self, warning: RoutingWarning<D::Id, P::Id>) {
        warn!(?warning, "routing warning");
        self.warnings.push(warning);
    }

    fn check_conservation(&self, phase: Phase) {
        let placed: usize = self
            .routes
            .iter()
            .chain(self.overflow.as_ref())
            .map(RouteBuilder::len)
            .sum();
        debug!(%phase, placed, unassigned = self.unassigned.len(), "phase boundary");
        debug_assert_eq!(placed + self.unassigned.len(), self.request.participants.len());
        debug_assert!(self
            .routes
            .iter()
            .chain(self.overflow.as_ref())
            .all(|route| route.len() <= route.capacity()));
    }
}

fn capacity_of<D: Driver>(driver: &D) -> usize {
    usize::try_from(driver.capacity()).unwrap_or(0)
}
