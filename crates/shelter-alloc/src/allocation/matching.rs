use std::cmp::Ordering;
use std::fmt;

use serde::{Serialize, Serializer};
use tracing::{info, warn};

use super::availability::{AvailabilityTracker, ShelterAvailability};
use super::domain::{Assignment, AssignmentId, Citizen, CitizenId, Shelter, ShelterId};
use super::ranking::PriorityRanker;
use super::repository::{AssignmentRepository, RepositoryError};

/// Why a citizen could not be placed during auto-assign.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// Free beds exist, but none in a shelter safe for the citizen's health status.
    NoLowRiskShelter,
    NoCapacity,
    Persistence,
}

impl FailureReason {
    pub const fn label(self) -> &'static str {
        match self {
            FailureReason::NoLowRiskShelter => "no low-risk shelter available",
            FailureReason::NoCapacity => "no capacity available",
            FailureReason::Persistence => "persistence error",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for FailureReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentOutcome {
    Ok,
    Fail,
}

/// Per-citizen line of an auto-assign run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignmentResult {
    pub citizen_id: CitizenId,
    pub citizen_name: String,
    pub outcome: AssignmentOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignment_id: Option<AssignmentId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shelter_id: Option<ShelterId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shelter_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<FailureReason>,
}

impl AssignmentResult {
    fn placed(citizen: &Citizen, assignment: &Assignment, shelter: &Shelter) -> Self {
        Self {
            citizen_id: citizen.id.clone(),
            citizen_name: citizen.full_name(),
            outcome: AssignmentOutcome::Ok,
            assignment_id: Some(assignment.id.clone()),
            shelter_id: Some(shelter.id.clone()),
            shelter_name: Some(shelter.name.clone()),
            reason: None,
        }
    }

    fn failed(citizen: &Citizen, reason: FailureReason) -> Self {
        Self {
            citizen_id: citizen.id.clone(),
            citizen_name: citizen.full_name(),
            outcome: AssignmentOutcome::Fail,
            assignment_id: None,
            shelter_id: None,
            shelter_name: None,
            reason: Some(reason),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.outcome == AssignmentOutcome::Ok
    }
}

/// Shelter preference: safest first, then most free beds, then lowest shelter id.
fn preference(left: &ShelterAvailability, right: &ShelterAvailability) -> Ordering {
    left.shelter
        .risk_level
        .cmp(&right.shelter.risk_level)
        .then_with(|| right.available().cmp(&left.available()))
        .then_with(|| left.shelter.id.cmp(&right.shelter.id))
}

/// Decides a shelter for each ranked citizen and commits the placements.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchEngine {
    ranker: PriorityRanker,
}

impl MatchEngine {
    pub fn new(ranker: PriorityRanker) -> Self {
        Self { ranker }
    }

    /// Pick the best shelter for `citizen` from the tracker's current snapshot.
    pub fn select<'t>(
        &self,
        citizen: &Citizen,
        tracker: &'t AvailabilityTracker,
    ) -> Result<&'t ShelterAvailability, FailureReason> {
        let mut with_capacity = tracker
            .entries()
            .iter()
            .filter(|entry| entry.available() > 0)
            .peekable();

        if with_capacity.peek().is_none() {
            return Err(FailureReason::NoCapacity);
        }

        with_capacity
            .filter(|entry| entry.shelter.admits(citizen.health_status))
            .min_by(|left, right| preference(left, right))
            .ok_or(FailureReason::NoLowRiskShelter)
    }

    /// Place `ranked` citizens in order against `tracker`, committing each through `assignments`.
    ///
    /// A failure for one citizen is recorded and the run moves on to the next.
    pub fn run<A>(
        &self,
        ranked: &[Citizen],
        tracker: &mut AvailabilityTracker,
        assignments: &A,
    ) -> Vec<AssignmentResult>
    where
        A: AssignmentRepository + ?Sized,
    {
        let mut results = Vec::with_capacity(ranked.len());

        for citizen in ranked {
            let shelter = match self.select(citizen, tracker) {
                Ok(entry) => entry.shelter.clone(),
                Err(reason) => {
                    warn!(citizen_id = %citizen.id, %reason, "citizen not placed");
                    results.push(AssignmentResult::failed(citizen, reason));
                    continue;
                }
            };

            match assignments.add(&citizen.id, &shelter.id) {
                Ok(assignment) => {
                    tracker.decrement(&shelter.id);
                    info!(
                        citizen_id = %citizen.id,
                        shelter_id = %shelter.id,
                        assignment_id = %assignment.id,
                        "citizen placed"
                    );
                    results.push(AssignmentResult::placed(citizen, &assignment, &shelter));
                }
                Err(error) => {
                    warn!(
                        citizen_id = %citizen.id,
                        shelter_id = %shelter.id,
                        %error,
                        "assignment commit failed"
                    );
                    results.push(AssignmentResult::failed(citizen, FailureReason::Persistence));
                }
            }
        }

        results
    }

    /// Rank `citizens`, snapshot `shelters` against current occupancy, and run the batch.
    ///
    /// Only the initial occupancy read can fail the whole call.
    pub fn auto_assign<A>(
        &self,
        citizens: Vec<Citizen>,
        shelters: Vec<Shelter>,
        assignments: &A,
    ) -> Result<Vec<AssignmentResult>, RepositoryError>
    where
        A: AssignmentRepository + ?Sized,
    {
        let active = assignments.list_active()?;
        let ranked = self.ranker.rank_unassigned(citizens, &active);
        let mut tracker = AvailabilityTracker::from_snapshot(shelters, &active);
        Ok(self.run(&ranked, &mut tracker, assignments))
    }
}
