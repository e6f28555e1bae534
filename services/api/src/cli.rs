use crate::console::{render_manual, run_demo, Console, ReportFilter};
use crate::infra::open_csv_service;
use crate::server;
use clap::{Args, Parser, Subcommand};
use shelter_alloc::allocation::{CitizenId, RegistrationRequest, ShelterId};
use shelter_alloc::config::AppConfig;
use shelter_alloc::error::AppError;
use shelter_alloc::telemetry;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Shelter Allocation",
    about = "Register evacuees and allocate shelter beds from the command line",
    version
)]
struct Cli {
    /// Directory holding citizens.csv, shelters.csv, and assignments.csv
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// List or register citizens
    Citizens {
        #[command(subcommand)]
        command: CitizensCommand,
    },
    /// Inspect shelters
    Shelters {
        #[command(subcommand)]
        command: SheltersCommand,
    },
    /// Allocate beds automatically or by hand
    Assign {
        #[command(subcommand)]
        command: AssignCommand,
    },
    /// Print allocation reports
    Report {
        #[command(subcommand)]
        command: ReportCommand,
    },
    /// Run an allocation round on built-in sample data, without reading or writing files
    Demo,
}

#[derive(Subcommand, Debug)]
enum CitizensCommand {
    /// List citizens grouped by type
    List,
    /// Register a new citizen
    Register(RegisterArgs),
}

#[derive(Subcommand, Debug)]
enum SheltersCommand {
    /// List shelters with current occupancy
    List,
}

#[derive(Subcommand, Debug)]
enum AssignCommand {
    /// Place every waiting citizen in priority order
    Auto,
    /// Place one citizen in a chosen shelter
    Manual(ManualArgs),
}

#[derive(Subcommand, Debug)]
enum ReportCommand {
    /// Totals and a breakdown by citizen type
    Summary,
    /// Citizens holding a bed
    Assigned,
    /// Citizens still waiting
    Unassigned,
    /// Every citizen with their placement
    Full,
}

#[derive(Args, Debug)]
struct RegisterArgs {
    /// 13-digit national id
    #[arg(long)]
    national_id: String,
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
    #[arg(long)]
    age: String,
    /// healthy, chronic, or critical
    #[arg(long)]
    health_status: String,
    /// general, risk_group, or vip
    #[arg(long)]
    citizen_type: String,
    #[arg(long)]
    phone: Option<String>,
}

impl From<RegisterArgs> for RegistrationRequest {
    fn from(args: RegisterArgs) -> Self {
        RegistrationRequest {
            national_id: args.national_id,
            first_name: args.first_name,
            last_name: args.last_name,
            age: args.age,
            health_status: args.health_status,
            citizen_type: args.citizen_type,
            phone: args.phone,
        }
    }
}

#[derive(Args, Debug)]
struct ManualArgs {
    #[arg(long)]
    citizen_id: String,
    #[arg(long)]
    shelter_id: String,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let mut config = AppConfig::load()?;
    if let Some(data_dir) = cli.data_dir {
        config.storage.data_dir = data_dir;
    }
    telemetry::init(&config.telemetry)?;

    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    let output = match command {
        Command::Serve(args) => return server::run(config, args).await,
        Command::Demo => return run_demo(),
        Command::Citizens { command } => {
            let service = open_csv_service(&config.storage.data_dir)?;
            match command {
                CitizensCommand::List => Console::new(&service).citizens()?,
                CitizensCommand::Register(args) => {
                    let citizen = service.register_citizen(args.into())?;
                    format!(
                        "Registered {} {} ({}, {})\n",
                        citizen.id,
                        citizen.full_name(),
                        citizen.citizen_type.label(),
                        citizen.health_status.label()
                    )
                }
            }
        }
        Command::Shelters {
            command: SheltersCommand::List,
        } => Console::new(&open_csv_service(&config.storage.data_dir)?).shelters()?,
        Command::Assign { command } => {
            let service = open_csv_service(&config.storage.data_dir)?;
            match command {
                AssignCommand::Auto => Console::new(&service).auto_assign()?,
                AssignCommand::Manual(args) => render_manual(&service.manual_assign(
                    &CitizenId(args.citizen_id),
                    &ShelterId(args.shelter_id),
                )?),
            }
        }
        Command::Report { command } => {
            let service = open_csv_service(&config.storage.data_dir)?;
            let console = Console::new(&service);
            match command {
                ReportCommand::Summary => console.summary()?,
                ReportCommand::Assigned => console.report(ReportFilter::Assigned)?,
                ReportCommand::Unassigned => console.report(ReportFilter::Unassigned)?,
                ReportCommand::Full => console.report(ReportFilter::Full)?,
            }
        }
    };

    print!("{output}");
    Ok(())
}
