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

use std::{env, process::exit};

use env_logger::{Builder, Env};
use log::error;
use mesh_matching::{
    experiments::{analyze_dump, read_mesh_dump},
    MeshError, Strategy,
};
use rand::{rngs::SmallRng, SeedableRng};

const SEED: u64 = 5446535461589659585;
const MB: f64 = 1.0 / 1024.0 / 1024.0;

/// usage: dump_analysis <dump.json> [strategy]
fn run() -> Result<(), MeshError> {
    let mut args = env::args().skip(1);
    let path = args
        .next()
        .ok_or(MeshError::InvalidConfig("usage: dump_analysis <dump.json> [strategy]"))?;
    let strategy: Strategy = match args.next() {
        Some(identifier) => identifier.parse()?,
        None => Strategy::Greedy,
    };

    let size_classes = read_mesh_dump(&path)?;

    let total_size: usize = size_classes
        .values()
        .flatten()
        .map(|span| span.object_size * span.length)
        .sum();
    println!("Total heap size: {:.1} MiB", total_size as f64 * MB);

    let mut rng = SmallRng::seed_from_u64(SEED);
    let reports = analyze_dump(&size_classes, &strategy, &mut rng)?;

    for report in &reports {
        println!(
            "\t{:>5}: {} spans ({} meshes)",
            report.object_size, report.spans, report.meshes
        );
    }

    let saved: usize = reports.iter().map(|r| r.freed_bytes).sum();
    println!("Saved size: {:.1} MiB ({})", saved as f64 * MB, strategy);

    Ok(())
}

fn main() {
    Builder::from_env(Env::default())
        .filter_level(log::LevelFilter::Warn)
        .format_module_path(false)
        .init();

    if let Err(err) = run() {
        error!("{}", err);
        exit(1);
    }
}
