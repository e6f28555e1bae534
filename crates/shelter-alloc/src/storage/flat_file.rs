use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::allocation::domain::{
    Assignment, AssignmentId, AssignmentStatus, Citizen, CitizenId, CitizenType, HealthStatus,
    NewCitizen, Shelter, ShelterId,
};
use crate::allocation::repository::{
    AssignmentRepository, CitizenRepository, RepositoryError, ShelterRepository,
};

use super::{local_today, Clock, IdSequence};

pub const CITIZENS_FILE: &str = "citizens.csv";
pub const SHELTERS_FILE: &str = "shelters.csv";
pub const ASSIGNMENTS_FILE: &str = "assignments.csv";

const DATE_FORMAT: &str = "%Y-%m-%d";

fn unavailable(path: &Path, error: impl Display) -> RepositoryError {
    RepositoryError::Unavailable(format!("{}: {error}", path.display()))
}

/// A missing file reads as an empty table.
fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, RepositoryError> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|error| unavailable(path, error))?;

    reader
        .deserialize::<T>()
        .collect::<Result<Vec<T>, csv::Error>>()
        .map_err(|error| unavailable(path, error))
}

/// Rewrite the whole table, header included. Rows go to a temporary sibling that replaces
/// `path` only once every row is flushed and synced, so a failed write leaves the old table.
fn write_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), RepositoryError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut staged = NamedTempFile::new_in(dir).map_err(|error| unavailable(path, error))?;

    {
        let mut writer = csv::Writer::from_writer(staged.as_file_mut());
        for row in rows {
            writer.serialize(row).map_err(|error| unavailable(path, error))?;
        }
        writer.flush().map_err(|error| unavailable(path, error))?;
    }
    staged
        .as_file()
        .sync_all()
        .map_err(|error| unavailable(path, error))?;
    staged.persist(path).map_err(|error| unavailable(path, error))?;

    debug!(path = %path.display(), rows = rows.len(), "table rewritten");
    Ok(())
}

/// Enum and date columns stay as stored text so rewriting the table reproduces rows this
/// build cannot interpret.
#[derive(Debug, Serialize, Deserialize)]
struct CitizenRow {
    citizen_id: String,
    national_id: String,
    first_name: String,
    last_name: String,
    age: u32,
    health_status: String,
    citizen_type: String,
    #[serde(default)]
    registered_date: String,
    #[serde(default)]
    phone: String,
}

impl CitizenRow {
    fn to_citizen(&self) -> Result<Citizen, String> {
        let registered_date = if self.registered_date.is_empty() {
            None
        } else {
            let date = NaiveDate::parse_from_str(&self.registered_date, DATE_FORMAT)
                .map_err(|error| {
                    format!(
                        "citizen {} has invalid registration date {:?}: {error}",
                        self.citizen_id, self.registered_date
                    )
                })?;
            Some(date)
        };
        Ok(Citizen {
            id: CitizenId(self.citizen_id.clone()),
            national_id: self.national_id.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            age: self.age,
            health_status: HealthStatus::parse(&self.health_status)
                .unwrap_or(HealthStatus::Unknown),
            citizen_type: CitizenType::parse(&self.citizen_type).unwrap_or(CitizenType::Unknown),
            registered_date,
            phone: self.phone.clone(),
        })
    }
}

impl From<&Citizen> for CitizenRow {
    fn from(citizen: &Citizen) -> Self {
        CitizenRow {
            citizen_id: citizen.id.0.clone(),
            national_id: citizen.national_id.clone(),
            first_name: citizen.first_name.clone(),
            last_name: citizen.last_name.clone(),
            age: citizen.age,
            health_status: citizen.health_status.label().to_string(),
            citizen_type: citizen.citizen_type.label().to_string(),
            registered_date: citizen
                .registered_date
                .map(|date| date.format(DATE_FORMAT).to_string())
                .unwrap_or_default(),
            phone: citizen.phone.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ShelterRow {
    shelter_id: String,
    name: String,
    max_capacity: u32,
    risk_level: u8,
}

impl TryFrom<ShelterRow> for Shelter {
    type Error = String;

    fn try_from(row: ShelterRow) -> Result<Self, Self::Error> {
        if row.max_capacity == 0 {
            return Err(format!("shelter {} has zero capacity", row.shelter_id));
        }
        if !(1..=5).contains(&row.risk_level) {
            return Err(format!(
                "shelter {} has risk level {} outside 1-5",
                row.shelter_id, row.risk_level
            ));
        }
        Ok(Shelter {
            id: ShelterId(row.shelter_id),
            name: row.name,
            max_capacity: row.max_capacity,
            risk_level: row.risk_level,
        })
    }
}

/// Assignment columns are read as text so blank padding rows can be skipped before decoding.
#[derive(Debug, Default, Serialize, Deserialize)]
struct AssignmentRow {
    assignment_id: String,
    #[serde(default)]
    citizen_id: String,
    #[serde(default)]
    shelter_id: String,
    #[serde(default)]
    assigned_date: String,
    #[serde(default)]
    status: String,
}

impl AssignmentRow {
    fn into_assignment(self) -> Result<Assignment, String> {
        let assigned_date = NaiveDate::parse_from_str(&self.assigned_date, DATE_FORMAT)
            .map_err(|error| {
                format!(
                    "assignment {} has invalid date {:?}: {error}",
                    self.assignment_id, self.assigned_date
                )
            })?;
        let status = match self.status.as_str() {
            "active" => AssignmentStatus::Active,
            "discharged" => AssignmentStatus::Discharged,
            other => {
                return Err(format!(
                    "assignment {} has unknown status {other:?}",
                    self.assignment_id
                ))
            }
        };
        Ok(Assignment {
            id: AssignmentId(self.assignment_id),
            citizen_id: CitizenId(self.citizen_id),
            shelter_id: ShelterId(self.shelter_id),
            assigned_date,
            status,
        })
    }
}

impl From<&Assignment> for AssignmentRow {
    fn from(assignment: &Assignment) -> Self {
        AssignmentRow {
            assignment_id: assignment.id.0.clone(),
            citizen_id: assignment.citizen_id.0.clone(),
            shelter_id: assignment.shelter_id.0.clone(),
            assigned_date: assignment.assigned_date.format(DATE_FORMAT).to_string(),
            status: assignment.status.label().to_string(),
        }
    }
}

/// `citizens.csv`, keyed by `citizen_id`, unique on `national_id`.
#[derive(Debug)]
pub struct CsvCitizenRepository {
    path: PathBuf,
    sequence: IdSequence,
    write_lock: Mutex<()>,
    clock: Clock,
}

impl CsvCitizenRepository {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, RepositoryError> {
        let path = path.into();
        let rows: Vec<CitizenRow> = read_rows(&path)?;
        let sequence = IdSequence::seeded("C", rows.iter().map(|row| row.citizen_id.as_str()));
        Ok(Self {
            path,
            sequence,
            write_lock: Mutex::new(()),
            clock: local_today,
        })
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    fn load(&self) -> Result<Vec<Citizen>, RepositoryError> {
        let rows: Vec<CitizenRow> = read_rows(&self.path)?;
        rows.iter()
            .map(|row| row.to_citizen().map_err(|error| unavailable(&self.path, error)))
            .collect()
    }
}

impl CitizenRepository for CsvCitizenRepository {
    fn list_all(&self) -> Result<Vec<Citizen>, RepositoryError> {
        self.load()
    }

    fn get_by_id(&self, id: &CitizenId) -> Result<Option<Citizen>, RepositoryError> {
        Ok(self.load()?.into_iter().find(|citizen| &citizen.id == id))
    }

    fn add(&self, citizen: NewCitizen) -> Result<Citizen, RepositoryError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        // Existing rows are written back exactly as read, provided every one of them decodes.
        let mut rows: Vec<CitizenRow> = read_rows(&self.path)?;
        for row in &rows {
            row.to_citizen().map_err(|error| unavailable(&self.path, error))?;
        }
        if rows
            .iter()
            .any(|existing| existing.national_id == citizen.national_id)
        {
            return Err(RepositoryError::DuplicateNationalId(citizen.national_id));
        }

        // Rows written by another process since open still count towards the sequence.
        for existing in &rows {
            self.sequence.observe(&existing.citizen_id);
        }
        let stored = citizen.into_citizen(CitizenId(self.sequence.next_id()?), (self.clock)());
        rows.push(CitizenRow::from(&stored));

        write_rows(&self.path, &rows)?;
        Ok(stored)
    }
}

/// `shelters.csv`, read-only reference data.
#[derive(Debug)]
pub struct CsvShelterRepository {
    path: PathBuf,
}

impl CsvShelterRepository {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ShelterRepository for CsvShelterRepository {
    fn list_all(&self) -> Result<Vec<Shelter>, RepositoryError> {
        let rows: Vec<ShelterRow> = read_rows(&self.path)?;
        rows.into_iter()
            .map(|row| Shelter::try_from(row).map_err(|error| unavailable(&self.path, error)))
            .collect()
    }
}

/// `assignments.csv`. Blank rows are skipped on read.
#[derive(Debug)]
pub struct CsvAssignmentRepository {
    path: PathBuf,
    sequence: IdSequence,
    write_lock: Mutex<()>,
    clock: Clock,
}

impl CsvAssignmentRepository {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, RepositoryError> {
        let path = path.into();
        let rows: Vec<AssignmentRow> = read_rows(&path)?;
        let sequence =
            IdSequence::seeded("A", rows.iter().map(|row| row.assignment_id.as_str()));
        Ok(Self {
            path,
            sequence,
            write_lock: Mutex::new(()),
            clock: local_today,
        })
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }
}

impl AssignmentRepository for CsvAssignmentRepository {
    fn list_all(&self) -> Result<Vec<Assignment>, RepositoryError> {
        let rows: Vec<AssignmentRow> = read_rows(&self.path)?;
        rows.into_iter()
            .filter(|row| !row.assignment_id.is_empty())
            .map(|row| {
                row.into_assignment()
                    .map_err(|error| unavailable(&self.path, error))
            })
            .collect()
    }

    fn add(
        &self,
        citizen_id: &CitizenId,
        shelter_id: &ShelterId,
    ) -> Result<Assignment, RepositoryError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut assignments = self.list_all()?;
        if assignments
            .iter()
            .any(|existing| existing.is_active() && &existing.citizen_id == citizen_id)
        {
            return Err(RepositoryError::AlreadyAssigned(citizen_id.clone()));
        }

        for existing in &assignments {
            self.sequence.observe(&existing.id.0);
        }
        let assignment = Assignment {
            id: AssignmentId(self.sequence.next_id()?),
            citizen_id: citizen_id.clone(),
            shelter_id: shelter_id.clone(),
            assigned_date: (self.clock)(),
            status: AssignmentStatus::Active,
        };
        assignments.push(assignment.clone());

        let rows: Vec<AssignmentRow> = assignments.iter().map(AssignmentRow::from).collect();
        write_rows(&self.path, &rows)?;
        Ok(assignment)
    }
}

/// The three flat-file tables under one data directory.
#[derive(Debug, Clone)]
pub struct CsvTables {
    pub citizens: Arc<CsvCitizenRepository>,
    pub shelters: Arc<CsvShelterRepository>,
    pub assignments: Arc<CsvAssignmentRepository>,
}

impl CsvTables {
    /// Open (creating the directory if needed) `citizens.csv`, `shelters.csv`, and
    /// `assignments.csv` under `data_dir`.
    pub fn open(data_dir: &Path) -> Result<Self, RepositoryError> {
        fs::create_dir_all(data_dir).map_err(|error| unavailable(data_dir, error))?;
        Ok(Self {
            citizens: Arc::new(CsvCitizenRepository::open(data_dir.join(CITIZENS_FILE))?),
            shelters: Arc::new(CsvShelterRepository::open(data_dir.join(SHELTERS_FILE))),
            assignments: Arc::new(CsvAssignmentRepository::open(
                data_dir.join(ASSIGNMENTS_FILE),
            )?),
        })
    }
}
