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

use std::time::Instant;

use log::{debug, info};
use rand::Rng;
use rand_xoshiro::{rand_core::SeedableRng, Xoshiro256PlusPlus};
use serde::Serialize;

use super::generate::{const_occupancy_bitmaps, independent_bitmaps, Density};
use crate::{mesh, MeshError, PageSet, Strategy};

/// Kind of synthetic batch a trial meshes
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub enum BitmapSource {
    Independent(Density),
    ConstOccupancy(usize),
}

impl BitmapSource {
    fn generate<R: Rng + ?Sized>(&self, rng: &mut R, length: usize, count: usize) -> Result<PageSet, MeshError> {
        match *self {
            BitmapSource::Independent(density) => independent_bitmaps(rng, length, count, density),
            BitmapSource::ConstOccupancy(ones) => const_occupancy_bitmaps(rng, length, count, ones),
        }
    }
}

#[derive(Clone, Debug)]
pub struct TrialOptions {
    pub length: usize,
    pub count: usize,
    pub source: BitmapSource,
    pub repetitions: usize,
    pub strategies: Vec<Strategy>,
}

impl Default for TrialOptions {
    fn default() -> Self {
        Self {
            length: 16,
            count: 100,
            source: BitmapSource::Independent(Density::Ones(4)),
            repetitions: 10,
            strategies: vec![
                Strategy::Greedy,
                Strategy::SplitGreedy(Default::default()),
                Strategy::Exact,
            ],
        }
    }
}

/// Aggregated results of one strategy over all repetitions.
///
/// Standard deviations are population deviations.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StrategyStats {
    pub strategy: &'static str,
    pub mean_freed_percentage: f64,
    pub std_dev_freed_percentage: f64,
    pub mean_ms: f64,
    pub std_dev_ms: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TrialReport {
    pub length: usize,
    pub count: usize,
    pub repetitions: usize,
    pub source: BitmapSource,
    pub stats: Vec<StrategyStats>,
}

/// Generates `repetitions` batches and meshes every batch with every strategy.
///
/// All strategies see the same batches.
pub fn repeated_trials<R: Rng + ?Sized>(options: &TrialOptions, rng: &mut R) -> Result<TrialReport, MeshError> {
    if options.repetitions == 0 {
        return Err(MeshError::InvalidConfig("at least one repetition is required"));
    }
    for strategy in &options.strategies {
        strategy.validate()?;
    }

    let strategy_count = options.strategies.len();
    let mut freed = vec![Vec::with_capacity(options.repetitions); strategy_count];
    let mut times = vec![Vec::with_capacity(options.repetitions); strategy_count];

    for repetition in 0..options.repetitions {
        let set = options.source.generate(rng, options.length, options.count)?;

        for (i, strategy) in options.strategies.iter().enumerate() {
            let start = Instant::now();
            let result = mesh(set.clone(), strategy, rng)?;
            let elapsed = start.elapsed();

            freed[i].push(result.freed_percentage());
            times[i].push(elapsed.as_secs_f64() * 1000.0);
        }

        debug!("Finished repetition {}/{}", repetition + 1, options.repetitions);
    }

    let stats = options
        .strategies
        .iter()
        .enumerate()
        .map(|(i, strategy)| {
            let (mean_freed_percentage, std_dev_freed_percentage) = mean_std_dev(&freed[i]);
            let (mean_ms, std_dev_ms) = mean_std_dev(&times[i]);
            StrategyStats {
                strategy: strategy.identifier(),
                mean_freed_percentage,
                std_dev_freed_percentage,
                mean_ms,
                std_dev_ms,
            }
        })
        .collect::<Vec<_>>();

    for s in &stats {
        info!(
            "{}: {:.2}% freed (+-{:.2}) in {:.3}ms",
            s.strategy, s.mean_freed_percentage, s.std_dev_freed_percentage, s.mean_ms
        );
    }

    Ok(TrialReport {
        length: options.length,
        count: options.count,
        repetitions: options.repetitions,
        source: options.source,
        stats,
    })
}

/// `count` random streams derived from `seed`, each `2^128` draws apart.
///
/// Give every worker its own stream to run trials in parallel without
/// overlapping random sequences.
pub fn worker_streams(seed: u64, count: usize) -> Vec<Xoshiro256PlusPlus> {
    let mut stream = Xoshiro256PlusPlus::seed_from_u64(seed);
    let mut streams = Vec::with_capacity(count);
    for _ in 0..count {
        streams.push(stream.clone());
        stream.jump();
    }
    streams
}

fn mean_std_dev(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    (mean, variance.sqrt())
}
