use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use rover_core::{
    CommandMode, DispatchSettings, MemoryStore, PathOverlay, RoverId, StartPolicy, dispatch_rover,
};
use rover_protocol::{MinesDocument, RoverDocument, to_json};

use scenario::Scenario;

mod scenario;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Dispatch rovers of a scenario and print their documents
    Dispatch {
        /// Scenario file (TOML)
        scenario: PathBuf,

        /// Only dispatch these rovers, in the given order (default: all)
        #[arg(short, long = "rover")]
        rovers: Vec<RoverId>,

        /// Reject command strings with characters other than M, R, L, D
        #[arg(long)]
        strict: bool,

        /// Start from each rover's last position instead of the origin
        #[arg(long)]
        resume: bool,

        /// Write the updated scenario here
        #[arg(short, long)]
        save: Option<PathBuf>,
    },
    /// Print the map and the mine registry of a scenario
    Show {
        /// Scenario file (TOML)
        scenario: PathBuf,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();

    match args.command {
        Command::Dispatch {
            scenario,
            rovers,
            strict,
            resume,
            save,
        } => {
            let scenario = Scenario::load(&scenario)?;
            let mut settings = scenario.settings;
            if strict {
                settings.command_mode = CommandMode::Strict;
            }
            if resume {
                settings.start_policy = StartPolicy::Resume;
            }
            log::debug!("settings: {settings:?}");

            let mut store = scenario.build_store()?;
            let rovers = if rovers.is_empty() {
                store.rovers().map(|rover| rover.id).collect()
            } else {
                rovers
            };
            let failed = dispatch_all(&mut store, &rovers, settings);

            if let Some(path) = save {
                Scenario::from_store(&store, settings)?.save(&path)?;
                log::info!("Saved scenario to {}", path.display());
            }
            if !failed.is_empty() {
                bail!("{} of {} dispatch(es) failed: {failed:?}", failed.len(), rovers.len());
            }
        }
        Command::Show { scenario } => {
            let scenario = Scenario::load(&scenario)?;
            let store = scenario.build_store()?;
            let grid = store.grid().context("Scenario has no map")?;
            print!("{}", PathOverlay::from_grid(grid));
            println!();
            let mines = MinesDocument::from_records(grid.size(), store.mines())?;
            println!("{}", to_json(&mines)?);
            for rover in store.rovers() {
                println!("{}", to_json(&RoverDocument::from_rover(rover))?);
            }
        }
    }

    Ok(())
}

/// Dispatches `rovers` in order. A failed dispatch is logged and the rest
/// still run; the ids that failed are returned.
fn dispatch_all(
    store: &mut MemoryStore,
    rovers: &[RoverId],
    settings: DispatchSettings,
) -> Vec<RoverId> {
    let mut failed = Vec::new();
    for &rover_id in rovers {
        if let Err(err) = run_dispatch(store, rover_id, settings) {
            log::error!("{err:#}");
            failed.push(rover_id);
        }
    }
    failed
}

fn run_dispatch(
    store: &mut MemoryStore,
    rover_id: RoverId,
    settings: DispatchSettings,
) -> Result<()> {
    let report = dispatch_rover(store, rover_id, settings)
        .with_context(|| format!("Dispatch of rover {rover_id} failed"))?;
    let rover = store.rover(rover_id)?;

    println!("rover {rover_id}: {}", report.status);
    print!("{}", report.overlay);
    for mine in &report.removed_mines {
        println!(
            "disarmed mine {} ({}) at {:?}",
            mine.id,
            mine.serial_number,
            mine.position()
        );
    }
    println!("{}", to_json(&RoverDocument::from_dispatch(rover, &report.overlay))?);
    Ok(())
}
