use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use vaxsched_core::*;

#[derive(Parser)]
#[command(name = "vaxsched")]
#[command(about = "Clinic vaccination scheduling client", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory (holds the staff session)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List supported vaccines
    Vaccines,

    /// Show the dose schedule for a vaccine
    Plan {
        /// Vaccine (flu, hep_b, tetanus, shingles, hpv, pneumonia, chickenpox, rabies)
        #[arg(long)]
        vaccine: String,

        /// First dose date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        start: Option<String>,

        /// Output format (table, json, csv)
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Register a patient
    Register {
        #[arg(long)]
        line_user_id: String,

        /// Patient name as typed in the form
        #[arg(long)]
        name: Option<String>,

        /// LINE display name, used when no name is typed
        #[arg(long)]
        display_name: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        email: Option<String>,

        /// Print the payload without sending it
        #[arg(long)]
        dry_run: bool,
    },

    /// Quick-book a vaccine for a patient
    Book {
        #[arg(long)]
        line_user_id: String,

        #[arg(long)]
        vaccine: String,

        /// Registration date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,

        /// Print the payload without sending it
        #[arg(long)]
        dry_run: bool,
    },

    /// Log in as staff
    Login {
        #[arg(long)]
        staff_id: String,

        /// Prompted for when omitted (the prompt echoes what you type)
        #[arg(long)]
        password: Option<String>,
    },

    /// Forget the staff session
    Logout,

    /// Show the logged-in staff member
    Whoami,

    /// Search patients by name, phone number or LINE user id (staff)
    Search { query: String },

    /// Assign a dose schedule to a patient (staff, not Reader)
    Assign {
        #[arg(long)]
        line_user_id: String,

        #[arg(long)]
        vaccine: String,

        /// First dose date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        first_dose_date: Option<String>,

        /// Print the payload without sending it
        #[arg(long)]
        dry_run: bool,
    },
}

fn main() -> ExitCode {
    vaxsched_core::logging::init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match cli.config.as_deref() {
        Some(path) => {
            let mut config = Config::load_from(path)?;
            config.apply_env_overrides(|key| std::env::var(key).ok());
            config
        }
        None => Config::load()?,
    };
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let session_file = session_path(&data_dir);
    tracing::debug!("Using data directory {:?}", data_dir);

    match cli.command {
        Commands::Vaccines => cmd_vaccines(),
        Commands::Plan {
            vaccine,
            start,
            format,
        } => cmd_plan(&vaccine, start.as_deref(), &format),
        Commands::Register {
            line_user_id,
            name,
            display_name,
            phone,
            email,
            dry_run,
        } => {
            let request = RegisterPatient::from_form(
                &line_user_id,
                name.as_deref(),
                display_name.as_deref(),
                phone.as_deref(),
                email.as_deref(),
            )?;
            cmd_register(&config, request, dry_run)
        }
        Commands::Book {
            line_user_id,
            vaccine,
            date,
            dry_run,
        } => cmd_book(&config, &line_user_id, &vaccine, date.as_deref(), dry_run),
        Commands::Login { staff_id, password } => {
            cmd_login(&config, &session_file, &staff_id, password)
        }
        Commands::Logout => cmd_logout(&session_file),
        Commands::Whoami => cmd_whoami(&session_file),
        Commands::Search { query } => cmd_search(&config, &session_file, &query),
        Commands::Assign {
            line_user_id,
            vaccine,
            first_dose_date,
            dry_run,
        } => cmd_assign(
            &config,
            &session_file,
            &line_user_id,
            &vaccine,
            first_dose_date.as_deref(),
            dry_run,
        ),
    }
}

fn cmd_vaccines() -> Result<()> {
    for def in checked_catalog()?.iter() {
        println!(
            "{:<11} {} ({} doses)",
            def.kind.as_str(),
            def.label,
            def.dose_count()
        );
    }
    Ok(())
}

fn cmd_plan(vaccine: &str, start: Option<&str>, format: &str) -> Result<()> {
    let kind = parse_vaccine_kind(vaccine)?;
    let start = start.map(parse_date_iso).transpose()?;
    let format: PlanFormat = format.parse()?;

    let plan = plan_for(kind, start)?;
    let out = render_plan(vaccine_label(kind)?, &plan, format)?;
    println!("{}", out.trim_end());
    Ok(())
}

fn cmd_register(config: &Config, request: RegisterPatient, dry_run: bool) -> Result<()> {
    if dry_run {
        return print_dry_run(&VaccineWebhookRequest::Register(request));
    }

    let client = BackendClient::from_config(&config.backend)?;
    let data = client.register_patient(&request)?;
    print_result("register", data)
}

fn cmd_book(
    config: &Config,
    line_user_id: &str,
    vaccine: &str,
    date: Option<&str>,
    dry_run: bool,
) -> Result<()> {
    let kind = parse_vaccine_kind(vaccine)?;
    let date = date_or_today(date)?;
    let request = BookVaccine::new(line_user_id, kind, Some(date))?;

    show_estimate(kind, date)?;

    if dry_run {
        return print_dry_run(&VaccineWebhookRequest::Book(request));
    }

    let client = BackendClient::from_config(&config.backend)?;
    let data = client.book_vaccine(&request)?;
    print_result("book", data)
}

fn cmd_login(
    config: &Config,
    session_file: &Path,
    staff_id: &str,
    password: Option<String>,
) -> Result<()> {
    let password = match password {
        Some(p) => p,
        None => prompt_password()?,
    };
    let credentials = StaffCredentials::new(staff_id, &password)?;

    let client = BackendClient::from_config(&config.backend)?;
    let session = client.check_staff(&credentials)?;
    session.save(session_file)?;

    println!("✓ Logged in as {} ({})", session.name, session.role);
    Ok(())
}

fn cmd_logout(session_file: &Path) -> Result<()> {
    if StaffSession::clear(session_file)? {
        println!("✓ Logged out");
    } else {
        println!("No active session.");
    }
    Ok(())
}

fn cmd_whoami(session_file: &Path) -> Result<()> {
    match StaffSession::load(session_file)? {
        Some(session) => println!("{} ({})", session.name, session.role),
        None => println!("Not logged in."),
    }
    Ok(())
}

fn cmd_search(config: &Config, session_file: &Path, query: &str) -> Result<()> {
    StaffSession::require(session_file)?;

    let client = BackendClient::from_config(&config.backend)?;
    let patients = client.search_patients(query)?;

    if patients.is_empty() {
        println!("No patients found.");
        return Ok(());
    }

    for patient in &patients {
        println!(
            "{}  {}",
            patient.name().unwrap_or("(ไม่ระบุชื่อ)"),
            patient.line_user_id
        );
    }
    Ok(())
}

fn cmd_assign(
    config: &Config,
    session_file: &Path,
    line_user_id: &str,
    vaccine: &str,
    first_dose_date: Option<&str>,
    dry_run: bool,
) -> Result<()> {
    let session = StaffSession::require(session_file)?;
    session.ensure_can_assign()?;

    let kind = parse_vaccine_kind(vaccine)?;
    let first_dose_date = date_or_today(first_dose_date)?;
    let request = AssignSchedule::new(line_user_id, kind, Some(first_dose_date))?;

    let plan = plan_for(kind, Some(first_dose_date))?;
    println!("{}", render_plan(vaccine_label(kind)?, &plan, PlanFormat::Table)?.trim_end());

    if dry_run {
        return print_dry_run(&request);
    }

    let client = BackendClient::from_config(&config.backend)?;
    let data = client.assign_schedule(&request)?;
    print_result("assign", data)
}

fn checked_catalog() -> Result<&'static Catalog> {
    let catalog = get_default_catalog();
    let errors = catalog.validate();
    if !errors.is_empty() {
        eprintln!("Catalog validation errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::CatalogValidation("Invalid catalog".into()));
    }
    Ok(catalog)
}

fn vaccine_label(kind: VaccineKind) -> Result<&'static str> {
    checked_catalog()?
        .get(kind)
        .map(|def| def.label.as_str())
        .ok_or_else(|| Error::InvalidVaccineKind(kind.to_string()))
}

fn date_or_today(date: Option<&str>) -> Result<NaiveDate> {
    Ok(date.map(parse_date_iso).transpose()?.unwrap_or_else(today))
}

fn show_estimate(kind: VaccineKind, start: NaiveDate) -> Result<()> {
    let plan = plan_for(kind, Some(start))?;
    let heading = format!("{} (estimated schedule)", vaccine_label(kind)?);
    println!("{}", render_plan(&heading, &plan, PlanFormat::Table)?.trim_end());
    Ok(())
}

fn print_dry_run<P: serde::Serialize>(payload: &P) -> Result<()> {
    println!("\n[Dry run - not sent]");
    println!("{}", serde_json::to_string_pretty(payload)?);
    Ok(())
}

fn print_result(stage: &str, data: Value) -> Result<()> {
    let result = json!({ "ok": true, "stage": stage, "data": data });
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

/// Read the password from stdin; input is not hidden
fn prompt_password() -> Result<String> {
    print!("Password (input is visible): ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim_end_matches(['\r', '\n']).to_string())
}
