use std::sync::Arc;

use super::common::*;
use crate::allocation::domain::{CitizenType, HealthStatus};
use crate::allocation::repository::AssignmentRepository;
use crate::allocation::{AllocationError, ErrorKind};
use crate::storage::MemoryAssignmentRepository;

fn service_with_one_bed_each() -> (MemoryService, Arc<MemoryAssignmentRepository>) {
    build_service(
        population(),
        vec![shelter("S001", 1, 1), shelter("S002", 1, 4)],
        vec![active("A001", "C001", "S002")],
    )
}

#[test]
fn missing_citizen_is_reported_before_anything_else() {
    let (service, _) = service_with_one_bed_each();
    let error = service
        .manual_assign(&citizen_id("C404"), &shelter_id("S404"))
        .expect_err("unknown citizen");
    assert_eq!(error, AllocationError::CitizenNotFound(citizen_id("C404")));
}

#[test]
fn existing_assignment_is_reported_before_shelter_lookup() {
    let (service, _) = service_with_one_bed_each();
    let error = service
        .manual_assign(&citizen_id("C001"), &shelter_id("S404"))
        .expect_err("already placed");
    assert_eq!(error, AllocationError::AlreadyAssigned(citizen_id("C001")));
    assert_eq!(error.kind(), ErrorKind::Duplicate);
}

#[test]
fn missing_shelter_is_not_found() {
    let (service, _) = service_with_one_bed_each();
    let error = service
        .manual_assign(&citizen_id("C002"), &shelter_id("S404"))
        .expect_err("unknown shelter");
    assert_eq!(error.kind(), ErrorKind::NotFound);
}

#[test]
fn capacity_is_checked_before_risk() {
    let (service, _) = service_with_one_bed_each();
    // C004 is critical and S002 is both full and high risk.
    let error = service
        .manual_assign(&citizen_id("C004"), &shelter_id("S002"))
        .expect_err("full shelter");
    assert!(matches!(
        error,
        AllocationError::Capacity { ref shelter_id, max_capacity: 1, .. } if shelter_id.0 == "S002"
    ));
}

#[test]
fn risk_constraint_blocks_vulnerable_citizens() {
    let (service, assignments) = build_service(
        vec![citizen("C001", 50, CitizenType::General, HealthStatus::Chronic)],
        vec![shelter("S001", 10, 3)],
        Vec::new(),
    );

    let error = service
        .manual_assign(&citizen_id("C001"), &shelter_id("S001"))
        .expect_err("risk too high");
    assert_eq!(error.kind(), ErrorKind::RiskConstraint);
    assert!(error.to_string().contains("chronic"));
    assert!(assignments.list_all().expect("list").is_empty());
}

#[test]
fn valid_pairing_is_committed_with_display_names() {
    let (service, assignments) = service_with_one_bed_each();
    let placed = service
        .manual_assign(&citizen_id("C004"), &shelter_id("S001"))
        .expect("placement succeeds");

    assert_eq!(placed.assignment.id.0, "A002");
    assert_eq!(placed.assignment.assigned_date, today());
    assert_eq!(placed.citizen_name, "NameC004 Doe");
    assert_eq!(placed.shelter_name, "Shelter S001");
    assert_eq!(assignments.list_active().expect("active").len(), 2);

    let again = service
        .manual_assign(&citizen_id("C004"), &shelter_id("S001"))
        .expect_err("second placement rejected");
    assert_eq!(again, AllocationError::AlreadyAssigned(citizen_id("C004")));
}
