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

use log::debug;
use rand::{seq::SliceRandom, Rng};

use super::{MeshPair, MesherModule};
use crate::{MeshError, PageSet};

/// Number of shuffle rounds if nothing else is configured
pub const DEFAULT_ATTEMPTS: usize = 100;

/// Randomized reference strategy.
///
/// Every attempt shuffles the unmatched records and tests the adjacent pairs
/// `(2k, 2k+1)`. Matched records are removed before the next attempt. The
/// result depends entirely on the random source, use it as a statistical
/// lower bound only.
#[derive(Clone, Debug)]
pub struct RandomMesherModule {
    attempts: usize,
}

impl RandomMesherModule {
    pub fn new(attempts: usize) -> Self {
        Self { attempts }
    }

    pub fn attempts(&self) -> usize {
        self.attempts
    }
}

impl Default for RandomMesherModule {
    fn default() -> Self {
        Self::new(DEFAULT_ATTEMPTS)
    }
}

impl MesherModule for RandomMesherModule {
    fn name(&self) -> &'static str {
        "random"
    }

    fn mesh<R: Rng + ?Sized>(
        &mut self,
        set: &mut PageSet,
        rng: &mut R,
    ) -> Result<Vec<MeshPair>, MeshError> {
        let mut pool = set.unmatched_ids();
        let total = pool.len();
        let mut pairs = Vec::new();
        let mut rounds = 0;

        while rounds < self.attempts && pool.len() >= 2 {
            pool.shuffle(rng);

            for chunk in pool.chunks_exact(2) {
                if set.is_compatible(chunk[0], chunk[1]) {
                    set.mark_matched(chunk[0], chunk[1]);
                    pairs.push((chunk[0], chunk[1]));
                }
            }

            set.retain_unmatched(&mut pool);
            rounds += 1;
        }

        debug!(
            "random: found {} meshes among {} records in {} rounds",
            pairs.len(),
            total,
            rounds
        );

        Ok(pairs)
    }
}
