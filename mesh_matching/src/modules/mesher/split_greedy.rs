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

use std::mem;

use log::{debug, trace};
use rand::Rng;

use super::{cross_traverse, MeshPair, MesherModule};
use crate::{
    cutoff::{CutoffConfig, CutoffTable},
    splitter::{Splitter, TieBreak},
    MeshError, PageSet, RecordId,
};

/// Options for [`SplitGreedyMesherModule`]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SplitConfig {
    /// Prune cross-bucket scans with a cutoff table
    pub cutoff: Option<CutoffConfig>,

    pub tie_break: TieBreak,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SplitState {
    /// Nothing partitioned yet
    Initial,

    /// Both buckets are filled and the next cross-bucket pass is due
    Bucketed,

    /// A pass left unmatched records on both sides, or a split put every
    /// record on one side. The residue waits for the next pattern.
    ResplitPending,

    /// Patterns ran out or a pass emptied a bucket, remaining records stay
    /// unmatched
    Exhausted,
}

/// Cross-bucket greedy meshing on top of the [`Splitter`].
///
/// Records far apart from each other in Hamming distance to a striped
/// pattern end up in different buckets and only pairs across the buckets are
/// considered. After each pass the unmatched residue is split again with the
/// next pattern. A split that puts every record on one side is retried with
/// the next pattern. Once the patterns run out the residue is accepted as
/// unmatched, there is no fallback search.
#[derive(Clone, Debug)]
pub struct SplitGreedyMesherModule {
    config: SplitConfig,
    state: SplitState,
    passes: usize,
}

impl SplitGreedyMesherModule {
    pub fn new(config: SplitConfig) -> Self {
        Self {
            config,
            state: SplitState::Initial,
            passes: 0,
        }
    }

    /// State the last run ended in
    pub fn state(&self) -> SplitState {
        self.state
    }

    /// Number of cross-bucket passes of the last run
    pub fn passes(&self) -> usize {
        self.passes
    }

    fn transition(&mut self, next: SplitState) {
        trace!("split-greedy: {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

impl Default for SplitGreedyMesherModule {
    fn default() -> Self {
        Self::new(SplitConfig::default())
    }
}

impl MesherModule for SplitGreedyMesherModule {
    fn name(&self) -> &'static str {
        "split-greedy"
    }

    fn mesh<R: Rng + ?Sized>(
        &mut self,
        set: &mut PageSet,
        rng: &mut R,
    ) -> Result<Vec<MeshPair>, MeshError> {
        self.state = SplitState::Initial;
        self.passes = 0;

        let ids = set.unmatched_ids();
        let cutoffs = match &self.config.cutoff {
            Some(config) => Some(CutoffTable::build(set, ids.iter().copied(), config)?),
            None => None,
        };

        let mut pairs = Vec::with_capacity(ids.len() / 2);
        if ids.len() < 2 {
            self.transition(SplitState::Exhausted);
            return Ok(pairs);
        }

        let mut splitter = Splitter::new(set.bitmap_len()).with_tie_break(self.config.tie_break);
        let mut bucket1: Vec<RecordId> = Vec::new();
        let mut bucket2: Vec<RecordId> = Vec::new();

        loop {
            match self.state {
                SplitState::Initial => {
                    if splitter.is_exhausted() {
                        self.transition(SplitState::Exhausted);
                        continue;
                    }
                    (bucket1, bucket2) = splitter.partition(set, &ids, rng, true)?;
                    self.transition(next_after_split(&bucket1, &bucket2));
                }
                SplitState::Bucketed => {
                    set.sort_by_occupancy(&mut bucket1);
                    set.sort_by_occupancy(&mut bucket2);

                    let found = cross_traverse(set, &bucket1, &bucket2, cutoffs.as_ref(), &mut pairs);
                    self.passes += 1;

                    set.retain_unmatched(&mut bucket1);
                    set.retain_unmatched(&mut bucket2);
                    trace!(
                        "split-greedy: pass {} found {} meshes, {} / {} left",
                        self.passes,
                        found,
                        bucket1.len(),
                        bucket2.len()
                    );

                    if bucket1.is_empty() || bucket2.is_empty() {
                        self.transition(SplitState::Exhausted);
                    } else {
                        self.transition(SplitState::ResplitPending);
                    }
                }
                SplitState::ResplitPending => {
                    if splitter.is_exhausted() {
                        self.transition(SplitState::Exhausted);
                        continue;
                    }
                    (bucket1, bucket2) = splitter.repartition(
                        set,
                        mem::take(&mut bucket1),
                        mem::take(&mut bucket2),
                        rng,
                        true,
                    )?;
                    self.transition(next_after_split(&bucket1, &bucket2));
                }
                SplitState::Exhausted => break,
            }
        }

        debug!(
            "split-greedy: found {} meshes among {} records in {} passes",
            pairs.len(),
            ids.len(),
            self.passes
        );

        Ok(pairs)
    }
}

/// A split with an empty side has no cross-bucket pairs
fn next_after_split(bucket1: &[RecordId], bucket2: &[RecordId]) -> SplitState {
    if bucket1.is_empty() || bucket2.is_empty() {
        SplitState::ResplitPending
    } else {
        SplitState::Bucketed
    }
}
