//! Allocation engine: priority ranking, capacity snapshots, automatic matching, and
//! validated manual placements, plus the read-only reports derived from the same data.

pub mod availability;
pub mod domain;
pub mod error;
pub mod manual;
pub mod matching;
pub mod ranking;
pub mod registration;
pub mod report;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use availability::{AvailabilityTracker, ShelterAvailability};
pub use domain::{
    Assignment, AssignmentId, AssignmentStatus, Citizen, CitizenId, CitizenType, HealthStatus,
    NewCitizen, Shelter, ShelterId, LOW_RISK_THRESHOLD,
};
pub use error::{AllocationError, ErrorKind};
pub use manual::{ManualAssignment, ManualAssignmentValidator};
pub use matching::{AssignmentOutcome, AssignmentResult, FailureReason, MatchEngine};
pub use ranking::{PriorityKey, PriorityRanker};
pub use registration::{RegistrationRequest, ValidationError};
pub use report::{
    AllocationReport, AllocationSnapshot, AllocationStatus, AllocationSummary,
    CitizenAllocationView, ShelterOccupancyView, TypeBreakdown,
};
pub use repository::{AssignmentRepository, CitizenRepository, RepositoryError, ShelterRepository};
pub use router::{allocation_router, ManualAssignmentRequest};
pub use service::AllocationService;
