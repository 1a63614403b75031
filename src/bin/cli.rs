use clap::{Parser, Subcommand};
use sleep_groups::simulation::{SimulationConfig, spawn_simulation};
use sleep_groups::{
    CheckpointTable, GroupingConfig, SchedulePlan, build_groups, now_epoch_seconds, plan_schedule,
    save_plan_to_json, update_checkpoint_table,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "sleep-groups")]
#[command(about = "Group tree nodes that must sleep together and stagger their windows", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the groups derived from a checkpoint table.
    Groups {
        table: PathBuf,

        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Assign sleep windows and write them back into the table.
    Assign {
        table: PathBuf,

        #[arg(long)]
        config: Option<PathBuf>,

        /// Also write the plan as JSON.
        #[arg(long)]
        plan: Option<PathBuf>,

        /// Unix seconds to start from (defaults to now).
        #[arg(long)]
        base_time: Option<f64>,

        /// Also store the plan in a SQLite database.
        #[arg(long)]
        sqlite: Option<PathBuf>,
    },
    /// Cycle random groups through wake and sleep until Ctrl-C.
    Simulate {
        table: PathBuf,

        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long)]
        cycles: Option<usize>,

        #[arg(long)]
        seed: Option<u64>,
    },
}

fn load_config(path: Option<&Path>) -> CliResult<GroupingConfig> {
    match path {
        Some(path) => Ok(GroupingConfig::from_json_file(path)?),
        None => Ok(GroupingConfig::default()),
    }
}

#[cfg(feature = "sqlite")]
fn store_plan(path: &Path, plan: &SchedulePlan) -> CliResult<()> {
    use sleep_groups::{ScheduleStore, SqliteScheduleStore};
    SqliteScheduleStore::new(path)?.save_plan(plan)?;
    Ok(())
}

#[cfg(not(feature = "sqlite"))]
fn store_plan(_path: &Path, _plan: &SchedulePlan) -> CliResult<()> {
    Err("rebuild with the `sqlite` feature to store plans in SQLite".into())
}

fn print_plan(plan: &SchedulePlan) {
    for window in &plan.windows {
        let members = window.members.iter().cloned().collect::<Vec<_>>().join(", ");
        let entry = window.entry();
        let sleep = entry
            .sleep_at_utc()
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| window.sleep_at.to_string());
        let wake = entry
            .wake_at_utc()
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| window.wake_at.to_string());
        println!("group {:<3} sleep {}  wake {}  [{}]", window.index, sleep, wake, members);
    }
}

#[tokio::main]
async fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Commands::Groups { table, config } => {
            let config = load_config(config.as_deref())?;
            let parent_map = CheckpointTable::load(&table)?.parent_map();
            let (groups, summary) = build_groups(&parent_map, &config)?;
            for (index, group) in groups.iter().enumerate() {
                let members = group.iter().cloned().collect::<Vec<_>>().join(", ");
                println!("group {:<3} [{}]", index, members);
            }
            println!("{}", summary.to_cli_summary());
        }
        Commands::Assign {
            table,
            config,
            plan,
            base_time,
            sqlite,
        } => {
            let config = load_config(config.as_deref())?;
            let parent_map = CheckpointTable::load(&table)?.parent_map();
            let base_time = base_time.unwrap_or_else(now_epoch_seconds);
            let (schedule, summary) = plan_schedule(&parent_map, &config, base_time)?;
            update_checkpoint_table(&table, &schedule)?;
            if let Some(path) = plan {
                save_plan_to_json(&schedule, &path)?;
                println!("Plan saved to {}.", path.display());
            }
            if let Some(path) = sqlite {
                store_plan(&path, &schedule)?;
                println!("Plan stored in {}.", path.display());
            }
            print_plan(&schedule);
            println!("Table updated ({}).", summary.to_cli_summary());
        }
        Commands::Simulate {
            table,
            config,
            cycles,
            seed,
        } => {
            let config = load_config(config.as_deref())?;
            let parent_map = CheckpointTable::load(&table)?.parent_map();
            let (groups, _) = build_groups(&parent_map, &config)?;
            let mut sim_config = SimulationConfig::from_grouping(&config)?;
            sim_config.seed = seed;
            sim_config.max_cycles = cycles;

            let mut handle = spawn_simulation(groups, sim_config);
            let finished = tokio::select! {
                report = handle.join() => Some(report?),
                _ = tokio::signal::ctrl_c() => None,
            };
            let report = match finished {
                Some(report) => report,
                None => handle.stop_and_join().await?,
            };
            println!(
                "Simulation ended after {} cycles ({:?}).",
                report.cycles, report.outcome
            );
        }
    }
    Ok(())
}
