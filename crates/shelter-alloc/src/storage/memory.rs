use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::allocation::domain::{
    Assignment, AssignmentId, AssignmentStatus, Citizen, CitizenId, NewCitizen, Shelter,
    ShelterId,
};
use crate::allocation::repository::{
    AssignmentRepository, CitizenRepository, RepositoryError, ShelterRepository,
};

use super::{local_today, Clock, IdSequence};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug)]
pub struct MemoryCitizenRepository {
    records: Mutex<Vec<Citizen>>,
    sequence: IdSequence,
    clock: Clock,
}

impl Default for MemoryCitizenRepository {
    fn default() -> Self {
        Self::with_citizens(Vec::new())
    }
}

impl MemoryCitizenRepository {
    pub fn with_citizens(citizens: Vec<Citizen>) -> Self {
        let sequence =
            IdSequence::seeded("C", citizens.iter().map(|citizen| citizen.id.0.as_str()));
        Self {
            records: Mutex::new(citizens),
            sequence,
            clock: local_today,
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }
}

impl CitizenRepository for MemoryCitizenRepository {
    fn list_all(&self) -> Result<Vec<Citizen>, RepositoryError> {
        Ok(lock(&self.records).clone())
    }

    fn get_by_id(&self, id: &CitizenId) -> Result<Option<Citizen>, RepositoryError> {
        Ok(lock(&self.records)
            .iter()
            .find(|citizen| &citizen.id == id)
            .cloned())
    }

    fn add(&self, citizen: NewCitizen) -> Result<Citizen, RepositoryError> {
        let mut records = lock(&self.records);
        if records
            .iter()
            .any(|existing| existing.national_id == citizen.national_id)
        {
            return Err(RepositoryError::DuplicateNationalId(citizen.national_id));
        }

        let stored = citizen.into_citizen(CitizenId(self.sequence.next_id()?), (self.clock)());
        records.push(stored.clone());
        Ok(stored)
    }
}

#[derive(Debug, Default)]
pub struct MemoryShelterRepository {
    shelters: Vec<Shelter>,
}

impl MemoryShelterRepository {
    pub fn new(shelters: Vec<Shelter>) -> Self {
        Self { shelters }
    }
}

impl ShelterRepository for MemoryShelterRepository {
    fn list_all(&self) -> Result<Vec<Shelter>, RepositoryError> {
        Ok(self.shelters.clone())
    }

    fn get_by_id(&self, id: &ShelterId) -> Result<Option<Shelter>, RepositoryError> {
        Ok(self.shelters.iter().find(|shelter| &shelter.id == id).cloned())
    }
}

#[derive(Debug)]
pub struct MemoryAssignmentRepository {
    records: Mutex<Vec<Assignment>>,
    sequence: IdSequence,
    clock: Clock,
}

impl Default for MemoryAssignmentRepository {
    fn default() -> Self {
        Self::with_assignments(Vec::new())
    }
}

impl MemoryAssignmentRepository {
    pub fn with_assignments(assignments: Vec<Assignment>) -> Self {
        let sequence = IdSequence::seeded(
            "A",
            assignments.iter().map(|assignment| assignment.id.0.as_str()),
        );
        Self {
            records: Mutex::new(assignments),
            sequence,
            clock: local_today,
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }
}

impl AssignmentRepository for MemoryAssignmentRepository {
    fn list_all(&self) -> Result<Vec<Assignment>, RepositoryError> {
        Ok(lock(&self.records).clone())
    }

    fn add(
        &self,
        citizen_id: &CitizenId,
        shelter_id: &ShelterId,
    ) -> Result<Assignment, RepositoryError> {
        let mut records = lock(&self.records);
        if records
            .iter()
            .any(|existing| existing.is_active() && &existing.citizen_id == citizen_id)
        {
            return Err(RepositoryError::AlreadyAssigned(citizen_id.clone()));
        }

        let assignment = Assignment {
            id: AssignmentId(self.sequence.next_id()?),
            citizen_id: citizen_id.clone(),
            shelter_id: shelter_id.clone(),
            assigned_date: (self.clock)(),
            status: AssignmentStatus::Active,
        };
        records.push(assignment.clone());
        Ok(assignment)
    }
}
