use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use super::domain::{Assignment, Shelter, ShelterId};
use super::repository::{AssignmentRepository, RepositoryError};

/// One shelter's capacity as seen at the start of an allocation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShelterAvailability {
    pub shelter: Shelter,
    pub occupancy: u32,
}

impl ShelterAvailability {
    pub fn available(&self) -> u32 {
        self.shelter.max_capacity.saturating_sub(self.occupancy)
    }
}

/// In-memory capacity snapshot for a single allocation run.
///
/// Built once from storage and then only updated through [`AvailabilityTracker::decrement`];
/// it never re-reads storage, so decisions within a run are consistent with each other.
#[derive(Debug, Clone)]
pub struct AvailabilityTracker {
    entries: Vec<ShelterAvailability>,
    index: HashMap<ShelterId, usize>,
}

impl AvailabilityTracker {
    /// Count active assignments per shelter. Assignments pointing at unknown shelters are ignored.
    pub fn from_snapshot(shelters: Vec<Shelter>, assignments: &[Assignment]) -> Self {
        let mut occupancy: HashMap<&ShelterId, u32> = HashMap::new();
        for assignment in assignments.iter().filter(|assignment| assignment.is_active()) {
            *occupancy.entry(&assignment.shelter_id).or_default() += 1;
        }

        let entries: Vec<ShelterAvailability> = shelters
            .into_iter()
            .map(|shelter| {
                let occupancy = occupancy.get(&shelter.id).copied().unwrap_or(0);
                ShelterAvailability { shelter, occupancy }
            })
            .collect();

        let index = entries
            .iter()
            .enumerate()
            .map(|(position, entry)| (entry.shelter.id.clone(), position))
            .collect();

        Self { entries, index }
    }

    /// Snapshot `shelters` against the repository's current active assignments.
    pub fn capture<A>(shelters: Vec<Shelter>, assignments: &A) -> Result<Self, RepositoryError>
    where
        A: AssignmentRepository + ?Sized,
    {
        let active = assignments.list_active()?;
        let tracker = Self::from_snapshot(shelters, &active);
        debug!(
            shelters = tracker.entries.len(),
            active = active.len(),
            free_beds = tracker.total_available(),
            "captured availability snapshot"
        );
        Ok(tracker)
    }

    pub fn entries(&self) -> &[ShelterAvailability] {
        &self.entries
    }

    pub fn get(&self, shelter_id: &ShelterId) -> Option<&ShelterAvailability> {
        self.index
            .get(shelter_id)
            .map(|position| &self.entries[*position])
    }

    /// `None` when the shelter is not part of the snapshot.
    pub fn available(&self, shelter_id: &ShelterId) -> Option<u32> {
        self.get(shelter_id).map(ShelterAvailability::available)
    }

    pub fn total_available(&self) -> u32 {
        self.entries.iter().map(ShelterAvailability::available).sum()
    }

    /// Consume one bed after a successful commit. Returns `false` if nothing could be taken.
    pub fn decrement(&mut self, shelter_id: &ShelterId) -> bool {
        let Some(position) = self.index.get(shelter_id).copied() else {
            return false;
        };
        let entry = &mut self.entries[position];
        if entry.available() == 0 {
            return false;
        }
        entry.occupancy += 1;
        true
    }
}
