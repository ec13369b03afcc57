use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use chrono::Local;
use clap::{ArgGroup, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod attendance;
mod error;
mod http;
mod import;
mod models;
mod registry;
mod report;
mod routine;
mod snapshot;

use attendance::AttendanceService;
use registry::ActivitySourceRegistry;
use snapshot::StateSnapshot;

#[derive(Parser)]
#[command(name = "attendance-routine")]
#[command(about = "Class attendance and daily routine service for Group Scholar", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the attendance and routine HTTP API
    Serve {
        #[arg(long, env = "ATTENDANCE_BIND", default_value = "127.0.0.1:5000")]
        bind: SocketAddr,
        /// State file loaded at startup and written on shutdown
        #[arg(long, env = "ATTENDANCE_SNAPSHOT")]
        snapshot: Option<PathBuf>,
        /// Start from the demo roster when there is no snapshot yet
        #[arg(long)]
        seed: bool,
        #[arg(long)]
        roster: Option<PathBuf>,
        #[arg(long)]
        activities: Option<PathBuf>,
    },
    /// Print a student's daily routine
    Routine {
        #[arg(long)]
        student: String,
        #[arg(long, env = "ATTENDANCE_SNAPSHOT")]
        snapshot: Option<PathBuf>,
        #[arg(long)]
        seed: bool,
    },
    /// List the students checked in to a class
    Presence {
        #[arg(long)]
        class: String,
        #[arg(long, env = "ATTENDANCE_SNAPSHOT")]
        snapshot: PathBuf,
    },
    /// Import roster or activity CSV files into a snapshot
    #[command(group(
        ArgGroup::new("source")
            .args(["roster", "activities"])
            .required(true)
            .multiple(true)
    ))]
    Import {
        #[arg(long)]
        roster: Option<PathBuf>,
        #[arg(long)]
        activities: Option<PathBuf>,
        #[arg(long, env = "ATTENDANCE_SNAPSHOT")]
        snapshot: PathBuf,
    },
    /// Generate a markdown attendance report
    Report {
        #[arg(long, env = "ATTENDANCE_SNAPSHOT")]
        snapshot: PathBuf,
        #[arg(long)]
        class: Option<String>,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            bind,
            snapshot: snapshot_path,
            seed,
            roster,
            activities,
        } => {
            let (attendance, registry) = load_state(snapshot_path.as_deref(), seed)?;
            import_files(&registry, roster.as_deref(), activities.as_deref())?;

            let attendance = Arc::new(attendance);
            let registry = Arc::new(registry);
            let app = http::create_router(http::AppState::new(
                Arc::clone(&attendance),
                Arc::clone(&registry),
            ));

            let listener = tokio::net::TcpListener::bind(bind)
                .await
                .with_context(|| format!("failed to bind {bind}"))?;
            info!("listening on http://{bind}");
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            if let Some(path) = snapshot_path {
                snapshot::save(&path, &StateSnapshot::capture(&attendance, &registry))?;
                info!(path = %path.display(), "snapshot written");
            }
        }
        Commands::Routine {
            student,
            snapshot: snapshot_path,
            seed,
        } => {
            let (_, registry) = load_state(snapshot_path.as_deref(), seed)?;
            let items = routine::daily_routine(&registry, &student);

            println!("Daily routine for {student}:");
            for item in items.iter() {
                println!("{:>8}  {}", item.time_of_day.to_string(), item.activity);
            }
        }
        Commands::Presence {
            class,
            snapshot: snapshot_path,
        } => {
            let (attendance, _) = load_state(Some(snapshot_path.as_path()), false)?;
            let present = attendance.present_students(&class);

            if present.is_empty() {
                println!("No one has checked in to {class}.");
                return Ok(());
            }

            println!("Present in {class}:");
            for student_id in present.iter() {
                println!("- {student_id}");
            }
        }
        Commands::Import {
            roster,
            activities,
            snapshot: snapshot_path,
        } => {
            let (attendance, registry) = load_state(Some(snapshot_path.as_path()), false)?;
            import_files(&registry, roster.as_deref(), activities.as_deref())?;
            snapshot::save(&snapshot_path, &StateSnapshot::capture(&attendance, &registry))?;
            println!("Snapshot updated at {}.", snapshot_path.display());
        }
        Commands::Report {
            snapshot: snapshot_path,
            class,
            out,
        } => {
            let (attendance, registry) = load_state(Some(snapshot_path.as_path()), false)?;
            let report = report::build_report(
                class.as_deref(),
                Local::now().naive_local(),
                &attendance.ledger(),
                &registry.snapshot(),
            );
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}

fn load_state(
    snapshot_path: Option<&Path>,
    seed: bool,
) -> anyhow::Result<(AttendanceService, ActivitySourceRegistry)> {
    let attendance = AttendanceService::new();
    let registry = match snapshot_path.map(snapshot::load).transpose()?.flatten() {
        Some(state) => {
            let registry = ActivitySourceRegistry::new();
            state.restore_into(&attendance, &registry);
            info!("state restored from snapshot");
            registry
        }
        None if seed => {
            info!("starting from the demo roster");
            ActivitySourceRegistry::seeded()
        }
        None => ActivitySourceRegistry::new(),
    };

    Ok((attendance, registry))
}

fn import_files(
    registry: &ActivitySourceRegistry,
    roster: Option<&Path>,
    activities: Option<&Path>,
) -> anyhow::Result<()> {
    if let Some(path) = roster {
        import::import_roster(registry, path)?;
    }
    if let Some(path) = activities {
        import::import_activities(registry, path)?;
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "cannot listen for ctrl-c, shutdown only by kill");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
