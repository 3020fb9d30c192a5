//! The `orbis` command-line simulator.
//!
//! Loads a configuration file, runs the simulation over a group of
//! in-process ranks and writes the coordinator's trajectory history to
//! the output file. `RUST_LOG` controls log verbosity (default `info`).

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};
use orbis::comm::{Communicator, LocalGroup};
use orbis::config::{load, SimulationFile, DEFAULT_MAX_BODY_SIZE};
use orbis::engine::{RunConfig, Simulation, TrajectoryFile, TrajectorySink};

#[derive(Parser, Debug)]
#[command(name = "orbis", version, about = "Distributed n-body simulation with collisions")]
struct Args {
    /// KEY=VALUE configuration file.
    config: PathBuf,

    /// Trajectory output file.
    output: PathBuf,

    /// Capacity of the body array.
    #[arg(default_value_t = DEFAULT_MAX_BODY_SIZE)]
    max_body_size: usize,

    /// Number of in-process ranks.
    #[arg(long, default_value_t = 1)]
    ranks: usize,

    /// Seed for belt generation, splits and comets.
    #[arg(long, default_value_t = RunConfig::default().seed)]
    seed: u64,

    /// Samples buffered per body before the trajectory file is appended to.
    #[arg(long, default_value_t = RunConfig::default().history_depth)]
    history_depth: usize,
}

impl Args {
    fn run_config(&self, file: &SimulationFile) -> RunConfig {
        RunConfig {
            num_timesteps: file.num_timesteps,
            dt: file.dt,
            output_frequency: file.output_frequency,
            display_frequency: file.display_frequency,
            max_body_size: self.max_body_size,
            history_depth: self.history_depth,
            seed: self.seed,
            ..RunConfig::default()
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if args.ranks == 0 {
        error!("--ranks must be at least 1");
        return ExitCode::FAILURE;
    }

    let file = match load(&args.config, args.max_body_size, args.seed) {
        Ok(file) => file,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    let config = args.run_config(&file);
    let bodies = file.bodies;

    let results = LocalGroup::run(args.ranks, |comm| {
        let sink = comm
            .is_coordinator()
            .then(|| Box::new(TrajectoryFile::new(&args.output)) as Box<dyn TrajectorySink + Send>);
        let mut sim = Simulation::new(comm, config.clone(), bodies.clone(), sink)?;
        sim.run()
    });

    let mut failed = false;
    for (rank, result) in results.into_iter().enumerate() {
        match result {
            Ok(summary) if rank == 0 => info!(
                "finished {} timesteps: {} asteroid and {} comet collisions, {} splits",
                summary.timesteps,
                summary.tally.asteroids,
                summary.tally.comets,
                summary.totals.splits
            ),
            Ok(_) => {}
            Err(e) => {
                error!("rank {rank}: {e}");
                failed = true;
            }
        }
    }
    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positional_capacity_defaults_to_one_hundred() {
        let args = Args::try_parse_from(["orbis", "sim.cfg", "out.txt"]).unwrap();
        assert_eq!(args.max_body_size, 100);
        assert_eq!(args.ranks, 1);
        assert_eq!(args.seed, 8759);
        assert_eq!(args.history_depth, 10_000);
    }

    #[test]
    fn flags_and_capacity_are_parsed() {
        let args = Args::try_parse_from([
            "orbis", "sim.cfg", "out.txt", "500", "--ranks", "4", "--seed", "1",
        ])
        .unwrap();
        assert_eq!(args.max_body_size, 500);
        assert_eq!(args.ranks, 4);
        assert_eq!(args.seed, 1);
    }

    #[test]
    fn missing_output_is_rejected() {
        assert!(Args::try_parse_from(["orbis", "sim.cfg"]).is_err());
    }

    #[test]
    fn file_values_flow_into_the_run_config() {
        let args = Args::try_parse_from(["orbis", "a", "b", "64", "--history-depth", "7"]).unwrap();
        let file = SimulationFile {
            num_timesteps: 5,
            dt: 2.5,
            ..SimulationFile::default()
        };
        let config = args.run_config(&file);
        assert_eq!(config.num_timesteps, 5);
        assert_eq!(config.dt, 2.5);
        assert_eq!(config.max_body_size, 64);
        assert_eq!(config.history_depth, 7);
        assert!(config.validate().is_ok());
    }
}
