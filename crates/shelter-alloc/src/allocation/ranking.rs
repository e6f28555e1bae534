use std::collections::HashSet;

use chrono::NaiveDate;

use super::domain::{Assignment, Citizen, CitizenId, CitizenType, HealthStatus};

/// Children below this age are prioritised.
pub const CHILD_AGE_LIMIT: u32 = 15;
/// Citizens at or above this age are prioritised.
pub const ELDER_AGE: u32 = 60;

/// Sort key for allocation priority. Smaller keys are served first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PriorityKey {
    age_group: u8,
    citizen_type: u8,
    health: u8,
    registration: (bool, Option<NaiveDate>),
}

impl PriorityKey {
    pub fn for_citizen(citizen: &Citizen) -> Self {
        let age_group = if citizen.age < CHILD_AGE_LIMIT || citizen.age >= ELDER_AGE {
            0
        } else {
            1
        };

        Self {
            age_group,
            citizen_type: type_rank(citizen.citizen_type),
            health: health_rank(citizen.health_status),
            // Missing dates sort after every known date.
            registration: (citizen.registered_date.is_none(), citizen.registered_date),
        }
    }
}

const fn type_rank(citizen_type: CitizenType) -> u8 {
    match citizen_type {
        CitizenType::RiskGroup => 0,
        CitizenType::Vip => 1,
        CitizenType::General => 2,
        CitizenType::Unknown => 3,
    }
}

const fn health_rank(health: HealthStatus) -> u8 {
    match health {
        HealthStatus::Critical => 0,
        HealthStatus::Chronic => 1,
        HealthStatus::Healthy => 2,
        HealthStatus::Unknown => 3,
    }
}

/// Orders unassigned citizens, highest priority first.
#[derive(Debug, Clone, Copy, Default)]
pub struct PriorityRanker;

impl PriorityRanker {
    /// Stable sort: citizens with equal keys keep their input order.
    pub fn rank(&self, mut citizens: Vec<Citizen>) -> Vec<Citizen> {
        citizens.sort_by_key(PriorityKey::for_citizen);
        citizens
    }

    /// Drop citizens holding an active assignment, then rank the rest.
    pub fn rank_unassigned(&self, citizens: Vec<Citizen>, active: &[Assignment]) -> Vec<Citizen> {
        let assigned: HashSet<&CitizenId> = active
            .iter()
            .filter(|assignment| assignment.is_active())
            .map(|assignment| &assignment.citizen_id)
            .collect();

        let unassigned = citizens
            .into_iter()
            .filter(|citizen| !assigned.contains(&citizen.id))
            .collect();

        self.rank(unassigned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocation::domain::{AssignmentId, AssignmentStatus, ShelterId};

    fn citizen(
        id: &str,
        age: u32,
        citizen_type: CitizenType,
        health_status: HealthStatus,
        registered: Option<(i32, u32, u32)>,
    ) -> Citizen {
        Citizen {
            id: CitizenId(id.to_string()),
            national_id: format!("{:0>13}", id.trim_start_matches('C')),
            first_name: id.to_string(),
            last_name: "Test".to_string(),
            age,
            health_status,
            citizen_type,
            registered_date: registered
                .map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).expect("valid date")),
            phone: "-".to_string(),
        }
    }

    fn ids(citizens: &[Citizen]) -> Vec<&str> {
        citizens.iter().map(|citizen| citizen.id.0.as_str()).collect()
    }

    #[test]
    fn vulnerable_ages_outrank_type_and_health() {
        let ranked = PriorityRanker.rank(vec![
            citizen("C001", 30, CitizenType::RiskGroup, HealthStatus::Critical, None),
            citizen("C002", 70, CitizenType::General, HealthStatus::Healthy, None),
            citizen("C003", 14, CitizenType::General, HealthStatus::Healthy, None),
            citizen("C004", 15, CitizenType::General, HealthStatus::Healthy, None),
            citizen("C005", 60, CitizenType::General, HealthStatus::Healthy, None),
        ]);
        assert_eq!(ids(&ranked), ["C002", "C003", "C005", "C001", "C004"]);
    }

    #[test]
    fn type_then_health_then_registration_date() {
        let ranked = PriorityRanker.rank(vec![
            citizen("C001", 30, CitizenType::General, HealthStatus::Critical, Some((2024, 1, 1))),
            citizen("C002", 30, CitizenType::Vip, HealthStatus::Healthy, Some((2024, 1, 1))),
            citizen("C003", 30, CitizenType::RiskGroup, HealthStatus::Healthy, Some((2024, 1, 2))),
            citizen("C004", 30, CitizenType::RiskGroup, HealthStatus::Healthy, Some((2024, 1, 1))),
            citizen("C005", 30, CitizenType::RiskGroup, HealthStatus::Chronic, Some((2024, 3, 1))),
            citizen("C006", 30, CitizenType::Unknown, HealthStatus::Critical, Some((2020, 1, 1))),
        ]);
        assert_eq!(ids(&ranked), ["C005", "C004", "C003", "C002", "C001", "C006"]);
    }

    #[test]
    fn missing_registration_date_sorts_last_within_group() {
        let ranked = PriorityRanker.rank(vec![
            citizen("C001", 40, CitizenType::General, HealthStatus::Healthy, None),
            citizen("C002", 40, CitizenType::General, HealthStatus::Healthy, Some((2030, 1, 1))),
        ]);
        assert_eq!(ids(&ranked), ["C002", "C001"]);
    }

    #[test]
    fn equal_keys_keep_input_order() {
        let input = vec![
            citizen("C009", 40, CitizenType::General, HealthStatus::Healthy, None),
            citizen("C003", 40, CitizenType::General, HealthStatus::Healthy, None),
            citizen("C007", 40, CitizenType::General, HealthStatus::Healthy, None),
        ];
        let ranked = PriorityRanker.rank(input);
        assert_eq!(ids(&ranked), ["C009", "C003", "C007"]);
    }

    #[test]
    fn rank_unassigned_skips_only_active_holders() {
        let citizens = vec![
            citizen("C001", 70, CitizenType::General, HealthStatus::Healthy, None),
            citizen("C002", 30, CitizenType::General, HealthStatus::Healthy, None),
            citizen("C003", 30, CitizenType::General, HealthStatus::Healthy, None),
        ];
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid date");
        let active = vec![
            Assignment {
                id: AssignmentId("A001".to_string()),
                citizen_id: CitizenId("C001".to_string()),
                shelter_id: ShelterId("S001".to_string()),
                assigned_date: date,
                status: AssignmentStatus::Active,
            },
            Assignment {
                id: AssignmentId("A002".to_string()),
                citizen_id: CitizenId("C003".to_string()),
                shelter_id: ShelterId("S001".to_string()),
                assigned_date: date,
                status: AssignmentStatus::Discharged,
            },
        ];

        let ranked = PriorityRanker.rank_unassigned(citizens, &active);
        assert_eq!(ids(&ranked), ["C002", "C003"]);
    }
}
