use crate::infra::demo_service;
use shelter_alloc::allocation::{
    AllocationReport, AllocationService, AllocationSummary, AssignmentRepository,
    AssignmentResult, Citizen, CitizenAllocationView, CitizenRepository, CitizenType,
    ManualAssignment, ShelterOccupancyView, ShelterRepository,
};
use shelter_alloc::error::AppError;
use std::fmt::Write;

pub(crate) fn render_citizens(groups: &[(CitizenType, Vec<Citizen>)]) -> String {
    let mut out = String::new();
    if groups.is_empty() {
        out.push_str("No citizens registered.\n");
        return out;
    }
    for (citizen_type, members) in groups {
        let _ = writeln!(out, "[{}] {} citizen(s)", citizen_type.label(), members.len());
        for citizen in members {
            let registered = citizen
                .registered_date
                .map(|date| date.to_string())
                .unwrap_or_else(|| "-".to_string());
            let _ = writeln!(
                out,
                "  {:<6} {:<28} age {:>3}  {:<8}  registered {}  phone {}",
                citizen.id,
                citizen.full_name(),
                citizen.age,
                citizen.health_status.label(),
                registered,
                citizen.phone
            );
        }
    }
    out
}

pub(crate) fn render_shelters(shelters: &[ShelterOccupancyView]) -> String {
    let mut out = String::new();
    for view in shelters {
        let _ = writeln!(
            out,
            "{:<6} {:<28} risk {}  {:>3}/{:<3} occupied  {:>3} free",
            view.shelter_id, view.name, view.risk_level, view.occupancy, view.max_capacity,
            view.available
        );
    }
    if shelters.is_empty() {
        out.push_str("No shelters configured.\n");
    }
    out
}

pub(crate) fn render_results(results: &[AssignmentResult]) -> String {
    let mut out = String::new();
    if results.is_empty() {
        out.push_str("Nobody is waiting for a bed.\n");
        return out;
    }
    for result in results {
        match (&result.shelter_id, &result.shelter_name, &result.assignment_id) {
            (Some(shelter_id), Some(shelter_name), Some(assignment_id)) if result.is_ok() => {
                let _ = writeln!(
                    out,
                    "[OK]   {} {} -> {} {} ({})",
                    result.citizen_id, result.citizen_name, shelter_id, shelter_name,
                    assignment_id
                );
            }
            _ => {
                let reason = result
                    .reason
                    .map(|reason| reason.label())
                    .unwrap_or("unknown");
                let _ = writeln!(
                    out,
                    "[FAIL] {} {}: {}",
                    result.citizen_id, result.citizen_name, reason
                );
            }
        }
    }
    let placed = results.iter().filter(|result| result.is_ok()).count();
    let _ = writeln!(
        out,
        "Placed {placed} of {} waiting citizen(s).",
        results.len()
    );
    out
}

pub(crate) fn render_manual(placed: &ManualAssignment) -> String {
    format!(
        "Assigned {} {} to {} {} ({}, {})\n",
        placed.assignment.citizen_id,
        placed.citizen_name,
        placed.assignment.shelter_id,
        placed.shelter_name,
        placed.assignment.id,
        placed.assignment.assigned_date
    )
}

pub(crate) fn render_summary(summary: &AllocationSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Citizens:        {}", summary.total_citizens);
    let _ = writeln!(out, "  assigned:      {}", summary.assigned);
    let _ = writeln!(out, "  unassigned:    {}", summary.unassigned);
    let _ = writeln!(out, "Shelters:        {}", summary.total_shelters);
    let _ = writeln!(out, "  capacity:      {}", summary.total_capacity);
    let _ = writeln!(out, "  occupied:      {}", summary.total_occupancy);
    let _ = writeln!(
        out,
        "  free:          {}",
        summary.total_capacity.saturating_sub(summary.total_occupancy)
    );
    out.push_str("By type:\n");
    for row in &summary.by_type {
        let _ = writeln!(
            out,
            "  {:<12} total {:>4}  assigned {:>4}  unassigned {:>4}",
            row.citizen_type.label(),
            row.total,
            row.assigned,
            row.unassigned
        );
    }
    out
}

fn render_entry(out: &mut String, entry: &CitizenAllocationView) {
    let placement = match (&entry.shelter_id, &entry.shelter_name, entry.assigned_date) {
        (Some(shelter_id), Some(name), Some(date)) => format!("{shelter_id} {name} since {date}"),
        _ => "waiting".to_string(),
    };
    let _ = writeln!(
        out,
        "{:<6} {:<28} {:<10} {:<8} {}",
        entry.citizen.id,
        entry.citizen.full_name(),
        entry.citizen.citizen_type.label(),
        entry.citizen.health_status.label(),
        placement
    );
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReportFilter {
    Assigned,
    Unassigned,
    Full,
}

pub(crate) fn render_report(report: &AllocationReport, filter: ReportFilter) -> String {
    let mut out = String::new();
    let entries: Vec<&CitizenAllocationView> = match filter {
        ReportFilter::Assigned => report.assigned().collect(),
        ReportFilter::Unassigned => report.unassigned().collect(),
        ReportFilter::Full => report.entries.iter().collect(),
    };
    for entry in &entries {
        render_entry(&mut out, entry);
    }
    let _ = writeln!(out, "{} citizen(s) listed.", entries.len());
    out
}

/// The operations behind each CLI subcommand, independent of where the tables live.
pub(crate) struct Console<'a, C, S, A> {
    service: &'a AllocationService<C, S, A>,
}

impl<'a, C, S, A> Console<'a, C, S, A>
where
    C: CitizenRepository + 'static,
    S: ShelterRepository + 'static,
    A: AssignmentRepository + 'static,
{
    pub(crate) fn new(service: &'a AllocationService<C, S, A>) -> Self {
        Self { service }
    }

    pub(crate) fn citizens(&self) -> Result<String, AppError> {
        Ok(render_citizens(&self.service.citizens_by_type()?))
    }

    pub(crate) fn shelters(&self) -> Result<String, AppError> {
        Ok(render_shelters(&self.service.shelter_occupancy()?))
    }

    pub(crate) fn auto_assign(&self) -> Result<String, AppError> {
        Ok(render_results(&self.service.auto_assign()?))
    }

    pub(crate) fn summary(&self) -> Result<String, AppError> {
        Ok(render_summary(&self.service.allocation_summary()?))
    }

    pub(crate) fn report(&self, filter: ReportFilter) -> Result<String, AppError> {
        Ok(render_report(&self.service.allocation_report()?, filter))
    }
}

/// Walk through a full allocation round on a built-in data set without touching disk.
pub(crate) fn run_demo() -> Result<(), AppError> {
    let service = demo_service();
    let console = Console::new(&service);

    println!("Shelter allocation demo");
    println!("\nShelters before allocation");
    print!("{}", console.shelters()?);
    println!("\nWaiting list by priority");
    for (position, citizen) in service.rank_unassigned()?.iter().enumerate() {
        println!(
            "  {:>2}. {} {} (age {}, {}, {})",
            position + 1,
            citizen.id,
            citizen.full_name(),
            citizen.age,
            citizen.citizen_type.label(),
            citizen.health_status.label()
        );
    }
    println!("\nAuto-assign");
    print!("{}", console.auto_assign()?);
    println!("\nShelters after allocation");
    print!("{}", console.shelters()?);
    println!("\nSummary");
    print!("{}", console.summary()?);
    Ok(())
}
