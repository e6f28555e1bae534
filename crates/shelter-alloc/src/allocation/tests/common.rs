use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::allocation::domain::{
    Assignment, AssignmentId, AssignmentStatus, Citizen, CitizenId, CitizenType, HealthStatus,
    Shelter, ShelterId,
};
use crate::allocation::repository::{AssignmentRepository, RepositoryError};
use crate::allocation::{allocation_router, AllocationService};
use crate::storage::{MemoryAssignmentRepository, MemoryCitizenRepository, MemoryShelterRepository};

pub(super) type MemoryService =
    AllocationService<MemoryCitizenRepository, MemoryShelterRepository, MemoryAssignmentRepository>;

pub(super) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 11, 3).expect("valid date")
}

pub(super) fn citizen(
    id: &str,
    age: u32,
    citizen_type: CitizenType,
    health_status: HealthStatus,
) -> Citizen {
    Citizen {
        id: CitizenId(id.to_string()),
        national_id: format!("{:0>13}", id.trim_start_matches('C')),
        first_name: format!("Name{id}"),
        last_name: "Doe".to_string(),
        age,
        health_status,
        citizen_type,
        registered_date: NaiveDate::from_ymd_opt(2025, 10, 1),
        phone: "-".to_string(),
    }
}

pub(super) fn shelter(id: &str, max_capacity: u32, risk_level: u8) -> Shelter {
    Shelter {
        id: ShelterId(id.to_string()),
        name: format!("Shelter {id}"),
        max_capacity,
        risk_level,
    }
}

pub(super) fn active(id: &str, citizen_id: &str, shelter_id: &str) -> Assignment {
    Assignment {
        id: AssignmentId(id.to_string()),
        citizen_id: CitizenId(citizen_id.to_string()),
        shelter_id: ShelterId(shelter_id.to_string()),
        assigned_date: today(),
        status: AssignmentStatus::Active,
    }
}

pub(super) fn citizen_id(id: &str) -> CitizenId {
    CitizenId(id.to_string())
}

pub(super) fn shelter_id(id: &str) -> ShelterId {
    ShelterId(id.to_string())
}

/// Mixed population used across the scenario tests.
pub(super) fn population() -> Vec<Citizen> {
    vec![
        citizen("C001", 35, CitizenType::General, HealthStatus::Healthy),
        citizen("C002", 72, CitizenType::General, HealthStatus::Chronic),
        citizen("C003", 8, CitizenType::Vip, HealthStatus::Healthy),
        citizen("C004", 41, CitizenType::RiskGroup, HealthStatus::Critical),
        citizen("C005", 29, CitizenType::Vip, HealthStatus::Healthy),
    ]
}

pub(super) fn build_service(
    citizens: Vec<Citizen>,
    shelters: Vec<Shelter>,
    assignments: Vec<Assignment>,
) -> (MemoryService, Arc<MemoryAssignmentRepository>) {
    let assignments = Arc::new(
        MemoryAssignmentRepository::with_assignments(assignments).with_clock(today),
    );
    let service = AllocationService::new(
        Arc::new(MemoryCitizenRepository::with_citizens(citizens).with_clock(today)),
        Arc::new(MemoryShelterRepository::new(shelters)),
        assignments.clone(),
    );
    (service, assignments)
}

pub(super) fn router_with_service(service: MemoryService) -> axum::Router {
    allocation_router(Arc::new(service))
}

/// Delegates to an in-memory table but refuses to commit for the listed citizens.
#[derive(Debug, Default)]
pub(super) struct FlakyAssignments {
    pub(super) inner: MemoryAssignmentRepository,
    pub(super) refuse: Vec<CitizenId>,
    pub(super) attempts: Mutex<Vec<CitizenId>>,
}

impl FlakyAssignments {
    pub(super) fn refusing(ids: &[&str]) -> Self {
        Self {
            inner: MemoryAssignmentRepository::default().with_clock(today),
            refuse: ids.iter().map(|id| citizen_id(id)).collect(),
            attempts: Mutex::new(Vec::new()),
        }
    }
}

impl AssignmentRepository for FlakyAssignments {
    fn list_all(&self) -> Result<Vec<Assignment>, RepositoryError> {
        self.inner.list_all()
    }

    fn add(
        &self,
        citizen_id: &CitizenId,
        shelter_id: &ShelterId,
    ) -> Result<Assignment, RepositoryError> {
        self.attempts
            .lock()
            .expect("attempt log poisoned")
            .push(citizen_id.clone());
        if self.refuse.contains(citizen_id) {
            return Err(RepositoryError::Unavailable("disk full".to_string()));
        }
        self.inner.add(citizen_id, shelter_id)
    }
}

pub(super) struct UnavailableAssignments;

impl AssignmentRepository for UnavailableAssignments {
    fn list_all(&self) -> Result<Vec<Assignment>, RepositoryError> {
        Err(RepositoryError::Unavailable("assignments.csv locked".to_string()))
    }

    fn add(
        &self,
        _citizen_id: &CitizenId,
        _shelter_id: &ShelterId,
    ) -> Result<Assignment, RepositoryError> {
        Err(RepositoryError::Unavailable("assignments.csv locked".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
