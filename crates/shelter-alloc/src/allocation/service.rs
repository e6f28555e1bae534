use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::info;

use super::domain::{Citizen, CitizenId, CitizenType, Shelter, ShelterId};
use super::error::AllocationError;
use super::manual::{ManualAssignment, ManualAssignmentValidator};
use super::matching::{AssignmentResult, MatchEngine};
use super::ranking::PriorityRanker;
use super::registration::RegistrationRequest;
use super::report::{
    AllocationReport, AllocationSnapshot, AllocationSummary, ShelterOccupancyView,
};
use super::repository::{AssignmentRepository, CitizenRepository, ShelterRepository};

/// Service composing the repositories with the ranker, match engine, and manual validator.
///
/// Every operation that writes (registration, auto-assign, manual-assign) runs under one
/// allocation lock, so occupancy read at the start of an operation cannot be invalidated by
/// another writer before its commit. Reports read without taking the lock.
pub struct AllocationService<C, S, A> {
    citizens: Arc<C>,
    shelters: Arc<S>,
    assignments: Arc<A>,
    ranker: PriorityRanker,
    engine: MatchEngine,
    validator: ManualAssignmentValidator,
    allocation_lock: Mutex<()>,
}

impl<C, S, A> AllocationService<C, S, A>
where
    C: CitizenRepository + 'static,
    S: ShelterRepository + 'static,
    A: AssignmentRepository + 'static,
{
    pub fn new(citizens: Arc<C>, shelters: Arc<S>, assignments: Arc<A>) -> Self {
        let ranker = PriorityRanker;
        Self {
            citizens,
            shelters,
            assignments,
            ranker,
            engine: MatchEngine::new(ranker),
            validator: ManualAssignmentValidator,
            allocation_lock: Mutex::new(()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        // The guarded value is `()`, so a poisoned lock carries no broken state.
        self.allocation_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Validate raw input and persist a new citizen.
    pub fn register_citizen(
        &self,
        request: RegistrationRequest,
    ) -> Result<Citizen, AllocationError> {
        let new_citizen = request.validate()?;
        let _guard = self.lock();
        let citizen = self.citizens.add(new_citizen)?;
        info!(
            citizen_id = %citizen.id,
            citizen_type = citizen.citizen_type.label(),
            "citizen registered"
        );
        Ok(citizen)
    }

    pub fn citizens(&self) -> Result<Vec<Citizen>, AllocationError> {
        Ok(self.citizens.list_all()?)
    }

    pub fn shelters(&self) -> Result<Vec<Shelter>, AllocationError> {
        Ok(self.shelters.list_all()?)
    }

    /// Citizens without an active assignment, highest priority first.
    pub fn rank_unassigned(&self) -> Result<Vec<Citizen>, AllocationError> {
        let citizens = self.citizens.list_all()?;
        let active = self.assignments.list_active()?;
        Ok(self.ranker.rank_unassigned(citizens, &active))
    }

    /// Place every unassigned citizen in priority order.
    pub fn auto_assign(&self) -> Result<Vec<AssignmentResult>, AllocationError> {
        let _guard = self.lock();
        let citizens = self.citizens.list_all()?;
        let shelters = self.shelters.list_all()?;
        let results = self
            .engine
            .auto_assign(citizens, shelters, self.assignments.as_ref())?;

        let placed = results.iter().filter(|result| result.is_ok()).count();
        info!(
            processed = results.len(),
            placed,
            failed = results.len() - placed,
            "auto-assign finished"
        );
        Ok(results)
    }

    pub fn manual_assign(
        &self,
        citizen_id: &CitizenId,
        shelter_id: &ShelterId,
    ) -> Result<ManualAssignment, AllocationError> {
        let _guard = self.lock();
        self.validator.assign(
            self.citizens.as_ref(),
            self.shelters.as_ref(),
            self.assignments.as_ref(),
            citizen_id,
            shelter_id,
        )
    }

    pub fn snapshot(&self) -> Result<AllocationSnapshot, AllocationError> {
        Ok(AllocationSnapshot::load(
            self.citizens.as_ref(),
            self.shelters.as_ref(),
            self.assignments.as_ref(),
        )?)
    }

    pub fn shelter_occupancy(&self) -> Result<Vec<ShelterOccupancyView>, AllocationError> {
        Ok(self.snapshot()?.shelter_occupancy())
    }

    pub fn allocation_report(&self) -> Result<AllocationReport, AllocationError> {
        Ok(self.snapshot()?.report())
    }

    pub fn allocation_summary(&self) -> Result<AllocationSummary, AllocationError> {
        Ok(self.snapshot()?.summary())
    }

    pub fn citizens_by_type(&self) -> Result<Vec<(CitizenType, Vec<Citizen>)>, AllocationError> {
        Ok(self.snapshot()?.citizens_by_type())
    }
}
