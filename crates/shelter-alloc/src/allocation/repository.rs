use super::domain::{Assignment, Citizen, CitizenId, NewCitizen, Shelter, ShelterId};

/// Registered citizens, in storage order.
pub trait CitizenRepository: Send + Sync {
    fn list_all(&self) -> Result<Vec<Citizen>, RepositoryError>;
    fn get_by_id(&self, id: &CitizenId) -> Result<Option<Citizen>, RepositoryError>;
    /// Persist a new citizen, generating its id and registration date.
    ///
    /// Fails with [`RepositoryError::DuplicateNationalId`] without writing anything when the
    /// national id is already registered.
    fn add(&self, citizen: NewCitizen) -> Result<Citizen, RepositoryError>;
}

/// Static shelter reference set.
pub trait ShelterRepository: Send + Sync {
    fn list_all(&self) -> Result<Vec<Shelter>, RepositoryError>;

    fn get_by_id(&self, id: &ShelterId) -> Result<Option<Shelter>, RepositoryError> {
        Ok(self
            .list_all()?
            .into_iter()
            .find(|shelter| &shelter.id == id))
    }
}

pub trait AssignmentRepository: Send + Sync {
    fn list_all(&self) -> Result<Vec<Assignment>, RepositoryError>;

    fn list_active(&self) -> Result<Vec<Assignment>, RepositoryError> {
        Ok(self
            .list_all()?
            .into_iter()
            .filter(Assignment::is_active)
            .collect())
    }

    fn active_for_citizen(
        &self,
        citizen_id: &CitizenId,
    ) -> Result<Option<Assignment>, RepositoryError> {
        Ok(self
            .list_active()?
            .into_iter()
            .find(|assignment| &assignment.citizen_id == citizen_id))
    }

    /// Record a new active assignment dated today.
    ///
    /// Fails with [`RepositoryError::AlreadyAssigned`] when the citizen already holds an active
    /// assignment. A failed call leaves storage untouched.
    fn add(
        &self,
        citizen_id: &CitizenId,
        shelter_id: &ShelterId,
    ) -> Result<Assignment, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("national id {0} is already registered")]
    DuplicateNationalId(String),
    #[error("citizen {0} already holds an active assignment")]
    AlreadyAssigned(CitizenId),
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
