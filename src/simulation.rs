//! Wake/sleep simulation over a set of groups.
//!
//! Each cycle picks a group at random, keeps it awake for the active duration
//! and then asleep for the inactive duration. Without a cycle limit the loop
//! never ends on its own: it runs until the stop signal fires or the
//! [`SimulationHandle`] is dropped.

use crate::config::{ConfigError, GroupingConfig};
use crate::group::Group;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub active: Duration,
    pub inactive: Duration,
    /// Fixed seed for reproducible group selection.
    pub seed: Option<u64>,
    pub max_cycles: Option<usize>,
}

impl SimulationConfig {
    pub fn from_grouping(config: &GroupingConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            active: Duration::from_secs_f64(config.active_duration_secs),
            inactive: Duration::from_secs_f64(config.inactive_duration_secs),
            seed: None,
            max_cycles: None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupState {
    Wake,
    Sleep,
}

impl fmt::Display for GroupState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupState::Wake => write!(f, "wake"),
            GroupState::Sleep => write!(f, "sleep"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationOutcome {
    Stopped,
    CycleLimit,
    NoGroups,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationReport {
    pub cycles: usize,
    /// Completed cycles per group index.
    pub visits: Vec<usize>,
    pub outcome: SimulationOutcome,
}

pub struct SimulationHandle {
    stop: watch::Sender<bool>,
    task: JoinHandle<SimulationReport>,
}

impl SimulationHandle {
    pub fn stop(&self) {
        // receiver gone means the task already finished
        let _ = self.stop.send(true);
    }

    /// Waits for the task to finish. The stop sender stays alive meanwhile, so
    /// an unlimited simulation only returns after `stop` is called elsewhere.
    pub async fn join(&mut self) -> Result<SimulationReport, JoinError> {
        (&mut self.task).await
    }

    pub async fn stop_and_join(mut self) -> Result<SimulationReport, JoinError> {
        self.stop();
        self.join().await
    }
}

/// Runs the simulation on the current tokio runtime.
pub fn spawn_simulation(groups: Vec<Group>, config: SimulationConfig) -> SimulationHandle {
    let (stop, stop_rx) = watch::channel(false);
    let task = tokio::spawn(run_simulation(groups, config, stop_rx));
    SimulationHandle { stop, task }
}

pub async fn run_simulation(
    groups: Vec<Group>,
    config: SimulationConfig,
    mut stop: watch::Receiver<bool>,
) -> SimulationReport {
    let mut report = SimulationReport {
        cycles: 0,
        visits: vec![0; groups.len()],
        outcome: SimulationOutcome::NoGroups,
    };
    if groups.is_empty() {
        return report;
    }

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    loop {
        if config.max_cycles.is_some_and(|max| report.cycles >= max) {
            report.outcome = SimulationOutcome::CycleLimit;
            return report;
        }

        let index = rng.gen_range(0..groups.len());
        info!(index, members = ?groups[index], "Randomly selected group");

        for (state, duration) in [
            (GroupState::Wake, config.active),
            (GroupState::Sleep, config.inactive),
        ] {
            info!(
                "Group {index} is in {state} state for {} seconds.",
                duration.as_secs_f64()
            );
            if wait_or_stop(&mut stop, duration).await {
                report.outcome = SimulationOutcome::Stopped;
                return report;
            }
        }

        report.cycles += 1;
        report.visits[index] += 1;
    }
}

/// Sleeps for `duration`; returns true if the stop signal fired first.
async fn wait_or_stop(stop: &mut watch::Receiver<bool>, duration: Duration) -> bool {
    if *stop.borrow() {
        return true;
    }
    let sleep = tokio::time::sleep(duration);
    tokio::pin!(sleep);
    loop {
        tokio::select! {
            _ = &mut sleep => return false,
            changed = stop.changed() => match changed {
                Err(_) => return true,
                Ok(()) if *stop.borrow() => return true,
                Ok(()) => {}
            },
        }
    }
}
