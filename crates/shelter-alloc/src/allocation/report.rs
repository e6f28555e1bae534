use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use super::availability::AvailabilityTracker;
use super::domain::{Assignment, Citizen, CitizenId, CitizenType, Shelter, ShelterId};
use super::repository::{
    AssignmentRepository, CitizenRepository, RepositoryError, ShelterRepository,
};

/// Point-in-time copy of all three tables, used to derive read-only reports.
#[derive(Debug, Clone)]
pub struct AllocationSnapshot {
    pub citizens: Vec<Citizen>,
    pub shelters: Vec<Shelter>,
    pub active: Vec<Assignment>,
}

impl AllocationSnapshot {
    pub fn load<C, S, A>(
        citizens: &C,
        shelters: &S,
        assignments: &A,
    ) -> Result<Self, RepositoryError>
    where
        C: CitizenRepository + ?Sized,
        S: ShelterRepository + ?Sized,
        A: AssignmentRepository + ?Sized,
    {
        Ok(Self {
            citizens: citizens.list_all()?,
            shelters: shelters.list_all()?,
            active: assignments.list_active()?,
        })
    }

    pub fn shelter_occupancy(&self) -> Vec<ShelterOccupancyView> {
        AvailabilityTracker::from_snapshot(self.shelters.clone(), &self.active)
            .entries()
            .iter()
            .map(|entry| ShelterOccupancyView {
                shelter_id: entry.shelter.id.clone(),
                name: entry.shelter.name.clone(),
                max_capacity: entry.shelter.max_capacity,
                risk_level: entry.shelter.risk_level,
                occupancy: entry.occupancy,
                available: entry.available(),
            })
            .collect()
    }

    /// Every citizen in storage order, joined with their active assignment if any.
    pub fn report(&self) -> AllocationReport {
        let by_citizen: HashMap<&CitizenId, &Assignment> = self
            .active
            .iter()
            .map(|assignment| (&assignment.citizen_id, assignment))
            .collect();
        let shelters: HashMap<&ShelterId, &Shelter> = self
            .shelters
            .iter()
            .map(|shelter| (&shelter.id, shelter))
            .collect();

        let entries = self
            .citizens
            .iter()
            .map(|citizen| match by_citizen.get(&citizen.id) {
                Some(assignment) => CitizenAllocationView {
                    citizen: citizen.clone(),
                    status: AllocationStatus::Assigned,
                    shelter_id: Some(assignment.shelter_id.clone()),
                    shelter_name: Some(
                        shelters
                            .get(&assignment.shelter_id)
                            .map(|shelter| shelter.name.clone())
                            .unwrap_or_else(|| "?".to_string()),
                    ),
                    assigned_date: Some(assignment.assigned_date),
                },
                None => CitizenAllocationView {
                    citizen: citizen.clone(),
                    status: AllocationStatus::Unassigned,
                    shelter_id: None,
                    shelter_name: None,
                    assigned_date: None,
                },
            })
            .collect();

        AllocationReport { entries }
    }

    pub fn summary(&self) -> AllocationSummary {
        let report = self.report();
        let occupancy = self.shelter_occupancy();

        let mut counts: HashMap<CitizenType, TypeBreakdown> = HashMap::new();
        for entry in &report.entries {
            let breakdown = counts
                .entry(entry.citizen.citizen_type)
                .or_insert_with(|| TypeBreakdown::empty(entry.citizen.citizen_type));
            breakdown.total += 1;
            match entry.status {
                AllocationStatus::Assigned => breakdown.assigned += 1,
                AllocationStatus::Unassigned => breakdown.unassigned += 1,
            }
        }

        let by_type = CitizenType::ordered()
            .into_iter()
            .filter_map(|citizen_type| counts.remove(&citizen_type))
            .collect();

        let assigned = report.assigned().count();
        AllocationSummary {
            total_citizens: report.entries.len(),
            assigned,
            unassigned: report.entries.len() - assigned,
            total_shelters: self.shelters.len(),
            total_capacity: occupancy.iter().map(|view| view.max_capacity).sum(),
            total_occupancy: occupancy.iter().map(|view| view.occupancy).sum(),
            by_type,
        }
    }

    /// Citizens grouped by type in priority order, storage order within a group.
    pub fn citizens_by_type(&self) -> Vec<(CitizenType, Vec<Citizen>)> {
        CitizenType::ordered()
            .into_iter()
            .map(|citizen_type| {
                let members: Vec<Citizen> = self
                    .citizens
                    .iter()
                    .filter(|citizen| citizen.citizen_type == citizen_type)
                    .cloned()
                    .collect();
                (citizen_type, members)
            })
            .filter(|(_, members)| !members.is_empty())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShelterOccupancyView {
    pub shelter_id: ShelterId,
    pub name: String,
    pub max_capacity: u32,
    pub risk_level: u8,
    pub occupancy: u32,
    pub available: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationStatus {
    Assigned,
    Unassigned,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CitizenAllocationView {
    pub citizen: Citizen,
    pub status: AllocationStatus,
    pub shelter_id: Option<ShelterId>,
    pub shelter_name: Option<String>,
    pub assigned_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AllocationReport {
    pub entries: Vec<CitizenAllocationView>,
}

impl AllocationReport {
    pub fn assigned(&self) -> impl Iterator<Item = &CitizenAllocationView> {
        self.entries
            .iter()
            .filter(|entry| entry.status == AllocationStatus::Assigned)
    }

    pub fn unassigned(&self) -> impl Iterator<Item = &CitizenAllocationView> {
        self.entries
            .iter()
            .filter(|entry| entry.status == AllocationStatus::Unassigned)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeBreakdown {
    pub citizen_type: CitizenType,
    pub total: usize,
    pub assigned: usize,
    pub unassigned: usize,
}

impl TypeBreakdown {
    fn empty(citizen_type: CitizenType) -> Self {
        Self {
            citizen_type,
            total: 0,
            assigned: 0,
            unassigned: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AllocationSummary {
    pub total_citizens: usize,
    pub assigned: usize,
    pub unassigned: usize,
    pub total_shelters: usize,
    pub total_capacity: u32,
    pub total_occupancy: u32,
    pub by_type: Vec<TypeBreakdown>,
}
