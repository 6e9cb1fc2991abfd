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

use std::{fmt, str::FromStr};

use log::debug;
use rand::Rng;

use crate::{
    cutoff::CutoffConfig,
    modules::mesher::{
        ColoringMesherModule, ExactMesherModule, GreedyMesherModule, MesherModule,
        RandomMesherModule, SimpleMesherModule, SplitConfig, SplitGreedyMesherModule,
        DEFAULT_ATTEMPTS,
    },
    MeshError, MeshResult, PageSet, RecordId,
};

/// Every meshing strategy with its parameters.
///
/// Parsing an identifier with [`str::parse`] gives the strategy with default
/// parameters.
#[derive(Clone, Debug, PartialEq)]
pub enum Strategy {
    /// Maximum matching, never misses a mesh
    Exact,
    Greedy,
    /// Greedy with cutoff pruning, may miss meshes with a bounded probability
    GreedyCutoff(CutoffConfig),
    SplitGreedy(SplitConfig),
    Random { attempts: usize },
    Coloring,
    Simple,
}

impl Strategy {
    pub const IDENTIFIERS: [&'static str; 7] = [
        "exact",
        "greedy",
        "greedy-cutoff",
        "split-greedy",
        "random",
        "coloring",
        "simple",
    ];

    pub fn identifier(&self) -> &'static str {
        match self {
            Strategy::Exact => "exact",
            Strategy::Greedy => "greedy",
            Strategy::GreedyCutoff(_) => "greedy-cutoff",
            Strategy::SplitGreedy(_) => "split-greedy",
            Strategy::Random { .. } => "random",
            Strategy::Coloring => "coloring",
            Strategy::Simple => "simple",
        }
    }

    /// Only the exact strategy guarantees a maximum number of meshes.
    pub fn is_exact(&self) -> bool {
        matches!(self, Strategy::Exact)
    }

    /// Strategies that skip candidates based on a probability estimate
    /// rather than a compatibility test.
    pub fn is_approximate(&self) -> bool {
        match self {
            Strategy::GreedyCutoff(_) => true,
            Strategy::SplitGreedy(config) => config.cutoff.is_some(),
            _ => false,
        }
    }

    /// Checks the parameters without looking at any records
    pub fn validate(&self) -> Result<(), MeshError> {
        match self {
            Strategy::GreedyCutoff(config) => config.validate(),
            Strategy::SplitGreedy(SplitConfig {
                cutoff: Some(config),
                ..
            }) => config.validate(),
            _ => Ok(()),
        }
    }
}

impl FromStr for Strategy {
    type Err = MeshError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exact" => Ok(Strategy::Exact),
            "greedy" => Ok(Strategy::Greedy),
            "greedy-cutoff" => Ok(Strategy::GreedyCutoff(CutoffConfig::default())),
            "split-greedy" => Ok(Strategy::SplitGreedy(SplitConfig::default())),
            "random" => Ok(Strategy::Random {
                attempts: DEFAULT_ATTEMPTS,
            }),
            "coloring" => Ok(Strategy::Coloring),
            "simple" => Ok(Strategy::Simple),
            _ => Err(MeshError::UnknownStrategy(s.to_string())),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

/// Meshes the records of `set` with `strategy`.
///
/// The parameters are validated before any record is looked at. `rng` is only
/// used by randomized strategies and for splitting ties.
pub fn mesh<R: Rng + ?Sized>(
    set: PageSet,
    strategy: &Strategy,
    rng: &mut R,
) -> Result<MeshResult, MeshError> {
    strategy.validate()?;

    debug!(
        "Meshing {} records of length {} with {}",
        set.len(),
        set.bitmap_len(),
        strategy
    );

    match strategy {
        Strategy::Exact => run(ExactMesherModule::new(), set, rng),
        Strategy::Greedy => run(GreedyMesherModule::new(), set, rng),
        Strategy::GreedyCutoff(config) => run(GreedyMesherModule::with_cutoff(*config), set, rng),
        Strategy::SplitGreedy(config) => {
            run(SplitGreedyMesherModule::new(config.clone()), set, rng)
        }
        Strategy::Random { attempts } => run(RandomMesherModule::new(*attempts), set, rng),
        Strategy::Coloring => run(ColoringMesherModule::new(), set, rng),
        Strategy::Simple => run(SimpleMesherModule::new(), set, rng),
    }
}

/// Meshes records of `bucket1` with records of `bucket2` of a set the caller
/// already split.
///
/// Only the greedy strategies take buckets, every other strategy is rejected
/// with [`MeshError::InvalidConfig`].
pub fn mesh_buckets(
    mut set: PageSet,
    strategy: &Strategy,
    bucket1: &[RecordId],
    bucket2: &[RecordId],
) -> Result<MeshResult, MeshError> {
    strategy.validate()?;

    let module = match strategy {
        Strategy::Greedy => GreedyMesherModule::new(),
        Strategy::GreedyCutoff(config) => GreedyMesherModule::with_cutoff(*config),
        _ => return Err(MeshError::InvalidConfig("only greedy strategies mesh given buckets")),
    };

    debug!(
        "Meshing buckets of {} and {} records with {}",
        bucket1.len(),
        bucket2.len(),
        strategy
    );

    let pairs = module.mesh_buckets(&mut set, bucket1, bucket2)?;
    Ok(MeshResult::new(set, pairs, None))
}

fn run<M: MesherModule, R: Rng + ?Sized>(
    mut module: M,
    mut set: PageSet,
    rng: &mut R,
) -> Result<MeshResult, MeshError> {
    let pairs = module.mesh(&mut set, rng)?;
    Ok(MeshResult::new(set, pairs, module.coloring_bound()))
}
