//! End-to-end allocation scenarios driven through the public service facade.
//!
//! Each test builds a fresh in-memory world, so ids and dates are fully predictable.

mod common {
    use std::sync::Arc;

    use chrono::NaiveDate;

    use shelter_alloc::allocation::{
        AllocationService, Citizen, CitizenId, CitizenType, HealthStatus, RegistrationRequest,
        Shelter, ShelterId,
    };
    use shelter_alloc::storage::{
        MemoryAssignmentRepository, MemoryCitizenRepository, MemoryShelterRepository,
    };

    pub(super) type Service = AllocationService<
        MemoryCitizenRepository,
        MemoryShelterRepository,
        MemoryAssignmentRepository,
    >;

    pub(super) fn intake_day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, 14).expect("valid date")
    }

    pub(super) fn shelters() -> Vec<Shelter> {
        vec![
            Shelter {
                id: ShelterId("S001".to_string()),
                name: "Provincial Hall".to_string(),
                max_capacity: 2,
                risk_level: 1,
            },
            Shelter {
                id: ShelterId("S002".to_string()),
                name: "Temple Grounds".to_string(),
                max_capacity: 2,
                risk_level: 2,
            },
            Shelter {
                id: ShelterId("S003".to_string()),
                name: "Riverside School".to_string(),
                max_capacity: 3,
                risk_level: 4,
            },
        ]
    }

    pub(super) fn request(
        national_id: &str,
        name: &str,
        age: u32,
        health: &str,
        citizen_type: &str,
    ) -> RegistrationRequest {
        RegistrationRequest {
            national_id: national_id.to_string(),
            first_name: name.to_string(),
            last_name: "Evac".to_string(),
            age: age.to_string(),
            health_status: health.to_string(),
            citizen_type: citizen_type.to_string(),
            phone: Some("081-000-0000".to_string()),
        }
    }

    pub(super) fn empty_service() -> Service {
        AllocationService::new(
            Arc::new(MemoryCitizenRepository::default().with_clock(intake_day)),
            Arc::new(MemoryShelterRepository::new(shelters())),
            Arc::new(MemoryAssignmentRepository::default().with_clock(intake_day)),
        )
    }

    pub(super) fn register_all(service: &Service) -> Vec<Citizen> {
        [
            request("1000000000001", "Arun", 34, "healthy", "general"),
            request("1000000000002", "Boon", 81, "critical", "general"),
            request("1000000000003", "Chai", 45, "chronic", "risk_group"),
            request("1000000000004", "Dao", 6, "healthy", "vip"),
            request("1000000000005", "Ekk", 52, "critical", "vip"),
            request("1000000000006", "Fah", 28, "healthy", "vip"),
            request("1000000000007", "Gun", 39, "chronic", "general"),
        ]
        .into_iter()
        .map(|request| service.register_citizen(request).expect("registration"))
        .collect()
    }

    pub(super) fn id(value: &str) -> CitizenId {
        CitizenId(value.to_string())
    }

    pub(super) fn types() -> [CitizenType; 3] {
        [CitizenType::RiskGroup, CitizenType::Vip, CitizenType::General]
    }

    pub(super) fn health(value: &str) -> HealthStatus {
        HealthStatus::parse(value).expect("known health status")
    }
}

use common::*;
use shelter_alloc::allocation::{AllocationError, CitizenType, FailureReason, ShelterId};

#[test]
fn registered_citizens_get_sequential_ids() {
    let service = empty_service();
    let citizens = register_all(&service);

    let ids: Vec<&str> = citizens.iter().map(|citizen| citizen.id.0.as_str()).collect();
    assert_eq!(ids, ["C001", "C002", "C003", "C004", "C005", "C006", "C007"]);
    assert!(citizens
        .iter()
        .all(|citizen| citizen.registered_date == Some(intake_day())));
    assert_eq!(citizens[1].health_status, health("critical"));
}

#[test]
fn auto_assign_fills_safe_beds_with_the_most_vulnerable_first() {
    let service = empty_service();
    register_all(&service);

    let results = service.auto_assign().expect("auto-assign");
    let lines: Vec<(&str, Option<&str>)> = results
        .iter()
        .map(|result| {
            (
                result.citizen_id.0.as_str(),
                result.shelter_id.as_ref().map(|id| id.0.as_str()),
            )
        })
        .collect();

    // Priority: Dao (child vip), Boon (elder general), Chai (risk group), Ekk (vip critical),
    // Fah (vip healthy), Gun (general chronic), Arun (general healthy).
    assert_eq!(
        lines,
        [
            ("C004", Some("S001")),
            ("C002", Some("S001")),
            ("C003", Some("S002")),
            ("C005", Some("S002")),
            ("C006", Some("S003")),
            ("C007", None),
            ("C001", Some("S003")),
        ]
    );
    assert_eq!(results[5].reason, Some(FailureReason::NoLowRiskShelter));

    let summary = service.allocation_summary().expect("summary");
    assert_eq!(summary.assigned, 6);
    assert_eq!(summary.unassigned, 1);
    assert_eq!(summary.total_occupancy, 6);
    assert_eq!(summary.total_capacity, 7);
}

#[test]
fn manual_override_follows_the_same_rules() {
    let service = empty_service();
    register_all(&service);

    let error = service
        .manual_assign(&id("C007"), &ShelterId("S003".to_string()))
        .expect_err("chronic citizen cannot go to a high-risk shelter");
    assert!(matches!(error, AllocationError::RiskConstraint { .. }));

    let placed = service
        .manual_assign(&id("C007"), &ShelterId("S002".to_string()))
        .expect("low-risk placement");
    assert_eq!(placed.assignment.id.0, "A001");
    assert_eq!(placed.citizen_name, "Gun Evac");

    let results = service.auto_assign().expect("auto-assign");
    assert_eq!(results.len(), 6);
    assert!(results
        .iter()
        .all(|result| result.citizen_id != id("C007")));
}

#[test]
fn grouping_and_reports_use_priority_type_order() {
    let service = empty_service();
    register_all(&service);
    service.auto_assign().expect("auto-assign");

    let grouped = service.citizens_by_type().expect("grouped");
    let order: Vec<CitizenType> = grouped.iter().map(|(kind, _)| *kind).collect();
    assert_eq!(order, types());

    let report = service.allocation_report().expect("report");
    let unassigned: Vec<&str> = report
        .unassigned()
        .map(|entry| entry.citizen.id.0.as_str())
        .collect();
    assert_eq!(unassigned, ["C007"]);
    assert_eq!(report.assigned().count(), 6);
}
