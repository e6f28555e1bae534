use serde::{Deserialize, Deserializer, Serialize};

use super::domain::{CitizenType, HealthStatus, NewCitizen};

const NATIONAL_ID_DIGITS: usize = 13;
const MAX_AGE: u32 = 150;

/// Raw registration input as typed by an operator or posted by a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationRequest {
    pub national_id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(deserialize_with = "age_from_number_or_text")]
    pub age: String,
    pub health_status: String,
    pub citizen_type: String,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Malformed registration input. Raised before any repository is touched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("national id must be exactly 13 digits (found {0:?})")]
    NationalIdFormat(String),
    #[error("{0} must not be empty")]
    MissingField(&'static str),
    #[error("age must be a whole number between 0 and 150 (found {0:?})")]
    InvalidAge(String),
    #[error("health status must be one of healthy, chronic, critical (found {0:?})")]
    UnknownHealthStatus(String),
    #[error("citizen type must be one of general, risk_group, vip (found {0:?})")]
    UnknownCitizenType(String),
}

impl RegistrationRequest {
    /// Check every field in order, stopping at the first violation.
    pub fn validate(self) -> Result<NewCitizen, ValidationError> {
        let national_id = self.national_id.trim().to_string();
        if national_id.len() != NATIONAL_ID_DIGITS
            || !national_id.bytes().all(|byte| byte.is_ascii_digit())
        {
            return Err(ValidationError::NationalIdFormat(national_id));
        }

        let first_name = required(&self.first_name, "first name")?;
        let last_name = required(&self.last_name, "last name")?;

        let age = self
            .age
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|age| *age <= MAX_AGE)
            .ok_or_else(|| ValidationError::InvalidAge(self.age.trim().to_string()))?;

        let health_status = HealthStatus::parse(&self.health_status)
            .ok_or_else(|| ValidationError::UnknownHealthStatus(self.health_status.clone()))?;
        let citizen_type = CitizenType::parse(&self.citizen_type)
            .ok_or_else(|| ValidationError::UnknownCitizenType(self.citizen_type.clone()))?;

        let phone = self
            .phone
            .map(|phone| phone.trim().to_string())
            .filter(|phone| !phone.is_empty())
            .unwrap_or_else(|| "-".to_string());

        Ok(NewCitizen {
            national_id,
            first_name,
            last_name,
            age,
            health_status,
            citizen_type,
            phone,
        })
    }
}

fn required(value: &str, field: &'static str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(trimmed.to_string())
    }
}

fn age_from_number_or_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawAge {
        Number(i64),
        Text(String),
    }

    Ok(match RawAge::deserialize(deserializer)? {
        RawAge::Number(value) => value.to_string(),
        RawAge::Text(value) => value,
    })
}
