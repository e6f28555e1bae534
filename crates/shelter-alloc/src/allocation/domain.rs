use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Shelters at or below this risk level are considered safe for health-risk citizens.
pub const LOW_RISK_THRESHOLD: u8 = 2;

/// Identifier wrapper for registered citizens (`C001`, `C002`, ...).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CitizenId(pub String);

/// Identifier wrapper for shelters (`S001`, ...).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShelterId(pub String);

/// Identifier wrapper for assignments (`A001`, ...).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssignmentId(pub String);

impl fmt::Display for CitizenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for ShelterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for AssignmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Health severity driving shelter eligibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    Chronic,
    Critical,
    /// Value present in storage that this build does not recognise.
    #[serde(other)]
    Unknown,
}

impl HealthStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "healthy" => Some(Self::Healthy),
            "chronic" => Some(Self::Chronic),
            "critical" => Some(Self::Critical),
            _ => None,
        }
    }

    /// Chronic and critical citizens may only be placed in low-risk shelters.
    pub const fn requires_low_risk(self) -> bool {
        matches!(self, Self::Chronic | Self::Critical)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Chronic => "chronic",
            Self::Critical => "critical",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Population classification used for priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CitizenType {
    General,
    RiskGroup,
    Vip,
    #[serde(other)]
    Unknown,
}

impl CitizenType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "general" => Some(Self::General),
            "risk_group" => Some(Self::RiskGroup),
            "vip" => Some(Self::Vip),
            _ => None,
        }
    }

    /// Types in allocation priority order.
    pub const fn ordered() -> [CitizenType; 4] {
        [Self::RiskGroup, Self::Vip, Self::General, Self::Unknown]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::General => "general",
            Self::RiskGroup => "risk_group",
            Self::Vip => "vip",
            Self::Unknown => "unknown",
        }
    }
}

/// Registered individual eligible for a shelter bed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citizen {
    pub id: CitizenId,
    pub national_id: String,
    pub first_name: String,
    pub last_name: String,
    pub age: u32,
    pub health_status: HealthStatus,
    pub citizen_type: CitizenType,
    pub registered_date: Option<NaiveDate>,
    pub phone: String,
}

impl Citizen {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Validated registration data awaiting an id and registration date from the repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCitizen {
    pub national_id: String,
    pub first_name: String,
    pub last_name: String,
    pub age: u32,
    pub health_status: HealthStatus,
    pub citizen_type: CitizenType,
    pub phone: String,
}

impl NewCitizen {
    pub fn into_citizen(self, id: CitizenId, registered_date: NaiveDate) -> Citizen {
        Citizen {
            id,
            national_id: self.national_id,
            first_name: self.first_name,
            last_name: self.last_name,
            age: self.age,
            health_status: self.health_status,
            citizen_type: self.citizen_type,
            registered_date: Some(registered_date),
            phone: self.phone,
        }
    }
}

/// Shelter reference data. Never mutated by allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shelter {
    pub id: ShelterId,
    pub name: String,
    pub max_capacity: u32,
    /// 1 (safest) to 5.
    pub risk_level: u8,
}

impl Shelter {
    pub const fn is_low_risk(&self) -> bool {
        self.risk_level <= LOW_RISK_THRESHOLD
    }

    /// Whether a citizen with `health` may be placed here, ignoring capacity.
    pub const fn admits(&self, health: HealthStatus) -> bool {
        !health.requires_low_risk() || self.is_low_risk()
    }
}

/// Lifecycle of an assignment. Only `Active` is ever produced by allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    Active,
    Discharged,
}

impl AssignmentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            AssignmentStatus::Active => "active",
            AssignmentStatus::Discharged => "discharged",
        }
    }
}

/// A citizen occupying one bed in a shelter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: AssignmentId,
    pub citizen_id: CitizenId,
    pub shelter_id: ShelterId,
    pub assigned_date: NaiveDate,
    pub status: AssignmentStatus,
}

impl Assignment {
    pub fn is_active(&self) -> bool {
        self.status == AssignmentStatus::Active
    }
}
