//! Repository adapters: in-memory tables for tests and demos, CSV files for the CLI and server.

pub mod flat_file;
pub mod memory;

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{Local, NaiveDate};

use crate::allocation::repository::RepositoryError;

pub use flat_file::CsvTables;
pub use memory::{MemoryAssignmentRepository, MemoryCitizenRepository, MemoryShelterRepository};

/// Source of the date stamped on new registrations and assignments.
pub type Clock = fn() -> NaiveDate;

pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// Generates `<prefix><zero-padded number>` ids from an atomic counter.
#[derive(Debug)]
pub struct IdSequence {
    prefix: &'static str,
    /// Highest number issued or observed so far.
    last: AtomicU64,
}

impl IdSequence {
    pub fn new(prefix: &'static str) -> Self {
        Self {
            prefix,
            last: AtomicU64::new(0),
        }
    }

    /// Continue after the highest numeric suffix among `existing`.
    pub fn seeded<'a, I>(prefix: &'static str, existing: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let sequence = Self::new(prefix);
        for id in existing {
            sequence.observe(id);
        }
        sequence
    }

    /// Ensure future ids sort after `id`. Ids with another prefix or no numeric suffix are ignored.
    pub fn observe(&self, id: &str) {
        if let Some(number) = id
            .strip_prefix(self.prefix)
            .and_then(|suffix| suffix.parse::<u64>().ok())
        {
            self.last.fetch_max(number, Ordering::Relaxed);
        }
    }

    /// Fails once the numeric suffix space is used up instead of reissuing an id.
    pub fn next_id(&self) -> Result<String, RepositoryError> {
        let previous = self
            .last
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |last| last.checked_add(1))
            .map_err(|_| {
                RepositoryError::Unavailable(format!("no {} ids left to issue", self.prefix))
            })?;
        Ok(format!("{}{:03}", self.prefix, previous + 1))
    }
}
