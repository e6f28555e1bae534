use metrics_exporter_prometheus::PrometheusHandle;
use shelter_alloc::allocation::{
    AllocationService, Citizen, CitizenId, CitizenType, HealthStatus, Shelter, ShelterId,
};
use shelter_alloc::error::AppError;
use shelter_alloc::storage::flat_file::{
    CsvAssignmentRepository, CsvCitizenRepository, CsvShelterRepository,
};
use shelter_alloc::storage::{
    CsvTables, MemoryAssignmentRepository, MemoryCitizenRepository, MemoryShelterRepository,
};
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type CsvService =
    AllocationService<CsvCitizenRepository, CsvShelterRepository, CsvAssignmentRepository>;

pub(crate) type MemoryService = AllocationService<
    MemoryCitizenRepository,
    MemoryShelterRepository,
    MemoryAssignmentRepository,
>;

/// Service over the CSV tables in `data_dir`.
pub(crate) fn open_csv_service(data_dir: &Path) -> Result<CsvService, AppError> {
    let tables = CsvTables::open(data_dir)?;
    debug!(data_dir = %data_dir.display(), "opened csv tables");
    Ok(AllocationService::new(
        tables.citizens,
        tables.shelters,
        tables.assignments,
    ))
}

pub(crate) fn demo_shelters() -> Vec<Shelter> {
    [
        ("S001", "Provincial Sports Hall", 3, 1),
        ("S002", "Wat Pho Chai Temple", 2, 2),
        ("S003", "Riverside School", 4, 3),
        ("S004", "Old Market Warehouse", 2, 5),
    ]
    .into_iter()
    .map(|(id, name, max_capacity, risk_level)| Shelter {
        id: ShelterId(id.to_string()),
        name: name.to_string(),
        max_capacity,
        risk_level,
    })
    .collect()
}

pub(crate) fn demo_citizens() -> Vec<Citizen> {
    [
        ("Somchai", "Jaidee", 45, HealthStatus::Healthy, CitizenType::General, 1),
        ("Malee", "Srisuk", 78, HealthStatus::Chronic, CitizenType::General, 1),
        ("Niran", "Thongdee", 9, HealthStatus::Healthy, CitizenType::RiskGroup, 2),
        ("Kanya", "Boonmee", 34, HealthStatus::Critical, CitizenType::RiskGroup, 2),
        ("Prasit", "Kaewkla", 52, HealthStatus::Healthy, CitizenType::Vip, 3),
        ("Anong", "Wongsa", 67, HealthStatus::Critical, CitizenType::Vip, 3),
        ("Chaiya", "Phromma", 29, HealthStatus::Chronic, CitizenType::General, 4),
        ("Ratana", "Inthong", 41, HealthStatus::Healthy, CitizenType::General, 4),
        ("Wichai", "Saelim", 12, HealthStatus::Chronic, CitizenType::General, 5),
        ("Duangjai", "Chan", 38, HealthStatus::Chronic, CitizenType::RiskGroup, 5),
        ("Kittisak", "Ruang", 25, HealthStatus::Healthy, CitizenType::General, 6),
        ("Pim", "Sombat", 63, HealthStatus::Healthy, CitizenType::RiskGroup, 6),
    ]
    .into_iter()
    .enumerate()
    .map(
        |(index, (first_name, last_name, age, health_status, citizen_type, day))| Citizen {
            id: CitizenId(format!("C{:03}", index + 1)),
            national_id: format!("11017000{:05}", index + 1),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            age,
            health_status,
            citizen_type,
            registered_date: chrono::NaiveDate::from_ymd_opt(2025, 10, day),
            phone: "-".to_string(),
        },
    )
    .collect()
}

/// Self-contained in-memory world for the `demo` command.
pub(crate) fn demo_service() -> MemoryService {
    AllocationService::new(
        Arc::new(MemoryCitizenRepository::with_citizens(demo_citizens())),
        Arc::new(MemoryShelterRepository::new(demo_shelters())),
        Arc::new(MemoryAssignmentRepository::default()),
    )
}
