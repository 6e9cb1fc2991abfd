/*
 *  Copyright (C) 2025  Markus Elias Gerber
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  You should have received a copy of the GNU General Public License
 *  along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

use std::{env, io::stdout, process::exit, thread};

use env_logger::{Builder, Env};
use log::{error, info};
use mesh_matching::{
    experiments::{
        repeated_trials, worker_streams, BitmapSource, Density, TrialOptions, TrialReport,
    },
    MeshError, Strategy,
};

const SEED: u64 = 5446535461589659585;

/// Number of objects per page of the sweep, `1..MAX_ONES`
const MAX_ONES: usize = 8;

struct ExperimentOptions {
    length: usize,
    count: usize,
    repetitions: usize,
    threads: usize,
    strategies: Vec<Strategy>,
}

impl Default for ExperimentOptions {
    fn default() -> Self {
        Self {
            length: 16,
            count: 100,
            repetitions: 10,
            threads: thread::available_parallelism().map(|n| n.get()).unwrap_or(1),
            strategies: TrialOptions::default().strategies,
        }
    }
}

fn parse_number(value: &str, what: &'static str) -> Result<usize, MeshError> {
    value.parse().map_err(|_| MeshError::InvalidConfig(what))
}

/// usage: desktop_experiment [length] [count] [repetitions] [threads] [strategy,...]
fn parse_args() -> Result<ExperimentOptions, MeshError> {
    let mut options = ExperimentOptions::default();
    let args: Vec<String> = env::args().skip(1).collect();

    if let Some(length) = args.first() {
        options.length = parse_number(length, "length has to be a number")?;
    }
    if let Some(count) = args.get(1) {
        options.count = parse_number(count, "count has to be a number")?;
    }
    if let Some(repetitions) = args.get(2) {
        options.repetitions = parse_number(repetitions, "repetitions has to be a number")?;
    }
    if let Some(threads) = args.get(3) {
        options.threads = parse_number(threads, "threads has to be a number")?.max(1);
    }
    if let Some(strategies) = args.get(4) {
        options.strategies = strategies
            .split(',')
            .map(|s| s.parse())
            .collect::<Result<Vec<Strategy>, _>>()?;
    }

    Ok(options)
}

fn run() -> Result<(), MeshError> {
    let options = parse_args()?;
    let sweep: Vec<usize> = (1..MAX_ONES).filter(|ones| *ones <= options.length).collect();

    info!(
        "Running {} trials per point on {} pages of length {} with {} threads",
        options.repetitions, options.count, options.length, options.threads
    );

    let rngs = worker_streams(SEED, options.threads);

    let mut reports: Vec<(usize, Result<TrialReport, MeshError>)> = thread::scope(|s| {
        let handles: Vec<_> = rngs
            .into_iter()
            .enumerate()
            .map(|(worker, mut rng)| {
                let options = &options;
                let sweep = &sweep;
                s.spawn(move || {
                    sweep
                        .iter()
                        .skip(worker)
                        .step_by(options.threads)
                        .map(|ones| {
                            let trial = TrialOptions {
                                length: options.length,
                                count: options.count,
                                source: BitmapSource::Independent(Density::Ones(*ones)),
                                repetitions: options.repetitions,
                                strategies: options.strategies.clone(),
                            };
                            (*ones, repeated_trials(&trial, &mut rng))
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        handles
            .into_iter()
            .flat_map(|handle| match handle.join() {
                Ok(reports) => reports,
                Err(panic) => std::panic::resume_unwind(panic),
            })
            .collect()
    });
    reports.sort_by_key(|(ones, _)| *ones);

    for (ones, report) in reports {
        let report = report?;
        info!("Finished {} objects per page", ones);

        print!("[TRIAL-INFO] ");
        serde_json::to_writer(stdout(), &report)?;
        println!();
    }

    Ok(())
}

fn main() {
    Builder::from_env(Env::default())
        .filter_level(log::LevelFilter::Info)
        .format_module_path(false)
        .init();

    if let Err(err) = run() {
        error!("{}", err);
        exit(1);
    }
}
