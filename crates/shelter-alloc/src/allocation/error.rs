use serde::Serialize;

use super::domain::{CitizenId, HealthStatus, ShelterId};
use super::registration::ValidationError;
use super::repository::RepositoryError;

/// Coarse classification of [`AllocationError`] for callers that map errors to responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Duplicate,
    NotFound,
    Capacity,
    RiskConstraint,
    Persistence,
}

impl ErrorKind {
    pub const fn label(self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Duplicate => "duplicate",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Capacity => "capacity",
            ErrorKind::RiskConstraint => "risk_constraint",
            ErrorKind::Persistence => "persistence",
        }
    }
}

/// Error raised by registration and allocation operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AllocationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("national id {0} is already registered")]
    DuplicateNationalId(String),
    #[error("citizen {0} already holds an active assignment")]
    AlreadyAssigned(CitizenId),
    #[error("citizen {0} not found")]
    CitizenNotFound(CitizenId),
    #[error("shelter {0} not found")]
    ShelterNotFound(ShelterId),
    #[error("shelter {name} is full (capacity {max_capacity})")]
    Capacity {
        shelter_id: ShelterId,
        name: String,
        max_capacity: u32,
    },
    #[error("{health_status} citizens need a low-risk shelter (shelter {shelter_id} has risk level {risk_level})")]
    RiskConstraint {
        citizen_id: CitizenId,
        health_status: HealthStatus,
        shelter_id: ShelterId,
        risk_level: u8,
    },
    #[error("persistence error: {0}")]
    Persistence(String),
}

impl AllocationError {
    pub const fn kind(&self) -> ErrorKind {
        match self {
            AllocationError::Validation(_) => ErrorKind::Validation,
            AllocationError::DuplicateNationalId(_) | AllocationError::AlreadyAssigned(_) => {
                ErrorKind::Duplicate
            }
            AllocationError::CitizenNotFound(_) | AllocationError::ShelterNotFound(_) => {
                ErrorKind::NotFound
            }
            AllocationError::Capacity { .. } => ErrorKind::Capacity,
            AllocationError::RiskConstraint { .. } => ErrorKind::RiskConstraint,
            AllocationError::Persistence(_) => ErrorKind::Persistence,
        }
    }
}

impl From<RepositoryError> for AllocationError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::DuplicateNationalId(national_id) => {
                Self::DuplicateNationalId(national_id)
            }
            RepositoryError::AlreadyAssigned(citizen_id) => Self::AlreadyAssigned(citizen_id),
            RepositoryError::Unavailable(reason) => Self::Persistence(reason),
        }
    }
}
