//! `seatgrid` CLI: render availability grids and extension windows from a provider
//! snapshot on the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Grid for every room, as JSON (stdin → stdout)
//! cat snapshot.json | seatgrid grid --now 2026-03-16T10:10:00+09:00
//!
//! # Two rooms, rendered as a table
//! seatgrid grid -i snapshot.json --rooms A,B --format table
//!
//! # Day-wise grid for five days from a reference date
//! seatgrid grid -i lockers.json --date 2026-03-16 --days 5
//!
//! # Extension window for room A starting at 14:00
//! seatgrid extend -i snapshot.json --room A --start 14:00:00
//!
//! # Booking request for the first three options of that window
//! seatgrid extend -i snapshot.json --room A --start 14:00:00 --through 2 --desk A-7
//!
//! # Re-read the snapshot every 1.5s and print the grid whenever it changes
//! seatgrid watch -i snapshot.json
//! ```
//!
//! Logging goes to stderr and is controlled by `RUST_LOG` (default `warn`).

mod poller;

use std::io::{self, Read};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use seat_engine::{
    extension_window, generate_grid, BookingRequest, EngineConfig, GridOutcome, GridQuery,
    SlotGrid, SlotStatus, Snapshot,
};
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::poller::Poller;

#[derive(Parser)]
#[command(
    name = "seatgrid",
    version,
    about = "Seat and room availability grids"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Engine config file (JSON: timezone, slot_minutes, dst_policy)
    #[arg(long, global = true)]
    config: Option<String>,

    /// IANA timezone; overrides the config file
    #[arg(long, global = true)]
    timezone: Option<String>,
}

#[derive(Args)]
struct SnapshotArgs {
    /// Snapshot file (reads from stdin if omitted)
    #[arg(short, long)]
    input: Option<String>,
    /// Current time as RFC 3339 (defaults to the system clock)
    #[arg(long)]
    now: Option<String>,
    /// Reference date, YYYY-MM-DD (defaults to today)
    #[arg(long)]
    date: Option<String>,
    /// Comma-separated room codes (all rooms if omitted)
    #[arg(long, value_delimiter = ',')]
    rooms: Vec<String>,
    /// Day-wise grids: number of days from the reference date
    #[arg(long)]
    days: Option<u32>,
    /// Evaluate a single desk instead of the whole room
    #[arg(long)]
    desk: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Table,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the slot grid
    Grid {
        #[command(flatten)]
        snapshot: SnapshotArgs,
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// List extension options from a start slot, or build a booking request
    Extend {
        #[command(flatten)]
        snapshot: SnapshotArgs,
        /// Room code
        #[arg(long)]
        room: String,
        /// Start slot label (HH:MM:SS or YYYY-MM-DD)
        #[arg(long)]
        start: String,
        /// Index of the last selected option; prints a booking request instead
        #[arg(long)]
        through: Option<usize>,
        /// Comma-separated member ids for multi-user bookings
        #[arg(long, value_delimiter = ',', requires = "through")]
        members: Vec<String>,
    },
    /// Re-read the snapshot periodically and print the grid when it changes
    Watch {
        #[command(flatten)]
        snapshot: SnapshotArgs,
        /// Poll interval in milliseconds
        #[arg(long, default_value_t = 1500)]
        interval_ms: u64,
        /// Exit after printing this many grids
        #[arg(long)]
        max_changes: Option<usize>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger()?;

    let config = load_config(cli.config.as_deref(), cli.timezone.as_deref())?;

    match cli.command {
        Commands::Grid {
            snapshot,
            format,
            output,
        } => {
            let outcome = build_outcome(&read_input(snapshot.input.as_deref())?, &snapshot, &config)?;
            let rendered = match format {
                Format::Json => serde_json::to_string_pretty(&outcome)?,
                Format::Table => render_table(&outcome),
            };
            write_output(output.as_deref(), &rendered)?;
        }
        Commands::Extend {
            snapshot,
            room,
            start,
            through,
            members,
        } => {
            let outcome = build_outcome(&read_input(snapshot.input.as_deref())?, &snapshot, &config)?;
            let grid = require_grid(outcome)?;
            let window = extension_window(&grid, &room, &start)
                .with_context(|| format!("Failed to build extension window for room {}", room))?;

            let rendered = match through {
                Some(last) => {
                    let request = BookingRequest::from_selection(
                        &grid,
                        &room,
                        &window,
                        last,
                        snapshot.desk.as_deref(),
                    )
                    .context("Invalid selection")?
                    .with_members(members);
                    serde_json::to_string_pretty(&request)?
                }
                None => serde_json::to_string_pretty(&window)?,
            };
            write_output(None, &rendered)?;
        }
        Commands::Watch {
            snapshot,
            interval_ms,
            max_changes,
        } => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .context("Failed to start runtime")?;
            runtime.block_on(watch_grid(snapshot, config, interval_ms, max_changes))?;
        }
    }

    Ok(())
}

fn init_logger() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialise logging: {}", e))
}

fn load_config(path: Option<&str>, timezone: Option<&str>) -> Result<EngineConfig> {
    let mut config = match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {}", path))?;
            EngineConfig::from_json(&json).with_context(|| format!("Invalid config: {}", path))?
        }
        None => EngineConfig::default(),
    };
    if let Some(tz) = timezone {
        config = config.with_timezone(tz)?;
    }
    Ok(config)
}

fn build_query(args: &SnapshotArgs) -> Result<GridQuery> {
    let now = match args.now.as_deref() {
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .with_context(|| format!("Invalid --now '{}', expected RFC 3339", raw))?
            .with_timezone(&Utc),
        None => Utc::now(),
    };

    let mut query = GridQuery::at(now).rooms(&args.rooms);
    if let Some(raw) = args.date.as_deref() {
        let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .with_context(|| format!("Invalid --date '{}', expected YYYY-MM-DD", raw))?;
        query = query.on_date(date);
    }
    if let Some(days) = args.days {
        query = query.days(days);
    }
    if let Some(desk) = args.desk.as_deref() {
        query = query.desk(desk);
    }
    Ok(query)
}

fn build_outcome(json: &str, args: &SnapshotArgs, config: &EngineConfig) -> Result<GridOutcome> {
    let snapshot = Snapshot::from_json(json).context("Failed to parse snapshot")?;
    let query = build_query(args)?;
    let desks = snapshot.desk_records(config);
    Ok(generate_grid(&snapshot.rooms, &desks, &query, config))
}

fn require_grid(outcome: GridOutcome) -> Result<SlotGrid> {
    match outcome {
        GridOutcome::Grid(grid) => Ok(grid),
        GridOutcome::NoData(reason) => anyhow::bail!("No grid data: {:?}", reason),
    }
}

/// One line per slot, one column per room: `.` available, `R` reserved, `x` closed.
fn render_table(outcome: &GridOutcome) -> String {
    let grid = match outcome {
        GridOutcome::Grid(grid) => grid,
        GridOutcome::NoData(reason) => return format!("no data: {:?}\n", reason),
    };

    let mut out = String::new();
    let width = grid.rows.first().map_or(8, |r| r.slot.label().len());
    out.push_str(&format!("{:width$}", "", width = width));
    for header in &grid.headers {
        out.push_str(&format!("  {}", header.room_code));
    }
    out.push('\n');

    for row in &grid.rows {
        out.push_str(&row.slot.label());
        for (cell, header) in row.cells.iter().zip(&grid.headers) {
            let mark = match cell.status {
                SlotStatus::Available => '.',
                SlotStatus::Reserve => 'R',
                SlotStatus::Closed => 'x',
            };
            out.push_str(&format!("  {:<w$}", mark, w = header.room_code.len()));
        }
        out.push('\n');
    }
    out
}

async fn watch_grid(
    args: SnapshotArgs,
    config: EngineConfig,
    interval_ms: u64,
    max_changes: Option<usize>,
) -> Result<()> {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(true);
        }
    });

    // Stdin can only be read once; a file is re-read on every tick.
    let stdin = match args.input {
        Some(_) => None,
        None => Some(read_input(None)?),
    };

    let mut poller = Poller::new(Duration::from_millis(interval_ms), shutdown_rx);
    if let Some(max) = max_changes {
        poller = poller.max_changes(max);
    }

    let changes = poller
        .run(
            || {
                let json = match &stdin {
                    Some(json) => json.clone(),
                    None => read_input(args.input.as_deref())?,
                };
                build_outcome(&json, &args, &config)
            },
            |outcome| {
                let line = serde_json::to_string(outcome)?;
                println!("{}", line);
                Ok(())
            },
        )
        .await?;

    info!(changes, "watch stopped");
    Ok(())
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
