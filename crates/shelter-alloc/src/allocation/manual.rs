use serde::Serialize;
use tracing::info;

use super::domain::{Assignment, Citizen, CitizenId, Shelter, ShelterId};
use super::error::AllocationError;
use super::repository::{AssignmentRepository, CitizenRepository, ShelterRepository};

/// Committed manual placement, enriched for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManualAssignment {
    pub assignment: Assignment,
    pub citizen_name: String,
    pub shelter_name: String,
}

/// Checks a caller-chosen (citizen, shelter) pairing against the same rules auto-assign obeys.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManualAssignmentValidator;

impl ManualAssignmentValidator {
    /// Run every check in order and stop at the first violation. Nothing is written.
    pub fn validate<C, S, A>(
        &self,
        citizens: &C,
        shelters: &S,
        assignments: &A,
        citizen_id: &CitizenId,
        shelter_id: &ShelterId,
    ) -> Result<(Citizen, Shelter), AllocationError>
    where
        C: CitizenRepository + ?Sized,
        S: ShelterRepository + ?Sized,
        A: AssignmentRepository + ?Sized,
    {
        let citizen = citizens
            .get_by_id(citizen_id)?
            .ok_or_else(|| AllocationError::CitizenNotFound(citizen_id.clone()))?;

        if assignments.active_for_citizen(citizen_id)?.is_some() {
            return Err(AllocationError::AlreadyAssigned(citizen_id.clone()));
        }

        let shelter = shelters
            .get_by_id(shelter_id)?
            .ok_or_else(|| AllocationError::ShelterNotFound(shelter_id.clone()))?;

        let occupancy = assignments
            .list_active()?
            .iter()
            .filter(|assignment| &assignment.shelter_id == shelter_id)
            .count();
        if occupancy >= shelter.max_capacity as usize {
            return Err(AllocationError::Capacity {
                shelter_id: shelter.id,
                name: shelter.name,
                max_capacity: shelter.max_capacity,
            });
        }

        if !shelter.admits(citizen.health_status) {
            return Err(AllocationError::RiskConstraint {
                citizen_id: citizen.id,
                health_status: citizen.health_status,
                shelter_id: shelter.id,
                risk_level: shelter.risk_level,
            });
        }

        Ok((citizen, shelter))
    }

    /// Validate, then commit the assignment.
    pub fn assign<C, S, A>(
        &self,
        citizens: &C,
        shelters: &S,
        assignments: &A,
        citizen_id: &CitizenId,
        shelter_id: &ShelterId,
    ) -> Result<ManualAssignment, AllocationError>
    where
        C: CitizenRepository + ?Sized,
        S: ShelterRepository + ?Sized,
        A: AssignmentRepository + ?Sized,
    {
        let (citizen, shelter) =
            self.validate(citizens, shelters, assignments, citizen_id, shelter_id)?;

        let assignment = assignments.add(&citizen.id, &shelter.id)?;
        info!(
            citizen_id = %citizen.id,
            shelter_id = %shelter.id,
            assignment_id = %assignment.id,
            "manual assignment committed"
        );

        Ok(ManualAssignment {
            assignment,
            citizen_name: citizen.full_name(),
            shelter_name: shelter.name,
        })
    }
}
