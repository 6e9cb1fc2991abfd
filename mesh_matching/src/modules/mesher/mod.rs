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

mod coloring;
mod exact;
mod graph;
mod greedy;
mod random;
mod simple;
mod split_greedy;

pub use coloring::{ColoringBound, ColoringMesherModule};
pub use exact::ExactMesherModule;
pub use greedy::GreedyMesherModule;
pub use random::{RandomMesherModule, DEFAULT_ATTEMPTS};
pub use simple::SimpleMesherModule;
pub use split_greedy::{SplitConfig, SplitGreedyMesherModule, SplitState};

use rand::Rng;

use crate::{cutoff::CutoffTable, MeshError, PageSet, RecordId};

/// Two meshed records of the same [`PageSet`]
pub type MeshPair = (RecordId, RecordId);

/// A meshing strategy.
///
/// Implementations look at every record of `set` that is not matched yet,
/// mark the records they mesh and return the pairs in the order they were
/// found. Every returned pair is compatible and no record appears twice.
pub trait MesherModule {
    /// Identifier of this strategy
    fn name(&self) -> &'static str;

    /// Meshes the unmatched records of `set`.
    ///
    /// Strategies that are not randomized never touch `rng`.
    fn mesh<R: Rng + ?Sized>(
        &mut self,
        set: &mut PageSet,
        rng: &mut R,
    ) -> Result<Vec<MeshPair>, MeshError>;

    /// Bound on freeable pages if pages may be meshed in groups bigger than two.
    ///
    /// Only available after [`MesherModule::mesh`] was called on a strategy
    /// that computes it.
    fn coloring_bound(&self) -> Option<ColoringBound> {
        None
    }
}

/// Looks at every record in `ids` in order and meshes it with the first
/// compatible, unmatched record that comes after it.
///
/// `ids` has to be sorted by occupancy if `cutoffs` is given, because the
/// scan of a row stops at the first candidate above the cutoff.
pub(crate) fn greedy_traverse(
    set: &mut PageSet,
    ids: &[RecordId],
    cutoffs: Option<&CutoffTable>,
    pairs: &mut Vec<MeshPair>,
) {
    for (pos, &anchor) in ids.iter().enumerate() {
        if set.is_matched(anchor) {
            continue;
        }
        let anchor_occupancy = set.occupancy(anchor);

        for &candidate in &ids[pos + 1..] {
            if set.is_matched(candidate) {
                continue;
            }

            if let Some(table) = cutoffs {
                if table.prunes(anchor_occupancy, set.occupancy(candidate)) {
                    break;
                }
            }

            if set.is_compatible(anchor, candidate) {
                set.mark_matched(anchor, candidate);
                pairs.push((anchor, candidate));
                break;
            }
        }
    }
}

/// Same as [`greedy_traverse`], but only meshes records of `bucket1` with
/// records of `bucket2`. Returns the number of found pairs.
pub(crate) fn cross_traverse(
    set: &mut PageSet,
    bucket1: &[RecordId],
    bucket2: &[RecordId],
    cutoffs: Option<&CutoffTable>,
    pairs: &mut Vec<MeshPair>,
) -> usize {
    let before = pairs.len();

    for &anchor in bucket1 {
        if set.is_matched(anchor) {
            continue;
        }
        let anchor_occupancy = set.occupancy(anchor);

        for &candidate in bucket2 {
            if let Some(table) = cutoffs {
                if table.prunes(anchor_occupancy, set.occupancy(candidate)) {
                    break;
                }
            }

            if set.is_matched(candidate) {
                continue;
            }

            if set.is_compatible(anchor, candidate) {
                set.mark_matched(anchor, candidate);
                pairs.push((anchor, candidate));
                break;
            }
        }
    }

    pairs.len() - before
}

#[cfg(test)]
pub(crate) mod test {
    use std::collections::HashSet;

    use rand::{rngs::SmallRng, Rng, SeedableRng};

    use super::{cross_traverse, greedy_traverse, MeshPair, MesherModule};
    use crate::{PageRecord, PageSet};

    pub(crate) const SEED: u64 = 5446535461589659585;

    /// Random batch where every bit is set with probability `density`
    pub(crate) fn random_set<R: Rng>(rng: &mut R, length: usize, count: usize, density: f64) -> PageSet {
        let records = (0..count)
            .map(|_| {
                let bits: Vec<bool> = (0..length).map(|_| rng.gen_bool(density)).collect();
                PageRecord::from_bits(&bits)
            })
            .collect();
        PageSet::from_records(records).unwrap()
    }

    /// Checks soundness and accounting of a finished run
    pub(crate) fn check_pairs(set: &PageSet, pairs: &[MeshPair]) {
        let mut seen = HashSet::new();
        for (a, b) in pairs {
            assert!(set.is_compatible(*a, *b), "incompatible pair {:?}/{:?}", a, b);
            assert!(seen.insert(*a), "record {:?} used twice", a);
            assert!(seen.insert(*b), "record {:?} used twice", b);
            assert!(set.is_matched(*a) && set.is_matched(*b));
        }
        assert_eq!(2 * pairs.len() + set.unmatched_ids().len(), set.len());
    }

    /// Runs `module` on a few random batches and checks every result
    pub(crate) fn test_mesher_soundness<M: MesherModule, F: Fn() -> M>(new_module: F) {
        let mut rng = SmallRng::seed_from_u64(SEED);
        for (length, count, density) in [(8, 40, 0.3), (32, 100, 0.2), (64, 150, 0.1), (128, 60, 0.05)] {
            let mut set = random_set(&mut rng, length, count, density);
            let pairs = new_module().mesh(&mut set, &mut rng).unwrap();
            check_pairs(&set, &pairs);
        }
    }

    /// Empty batches, single records and all-ones batches never produce pairs
    pub(crate) fn test_mesher_degenerate<M: MesherModule, F: Fn() -> M>(new_module: F) {
        let mut rng = SmallRng::seed_from_u64(SEED);

        let mut empty = PageSet::from_bitmaps(Vec::<&str>::new()).unwrap();
        assert!(new_module().mesh(&mut empty, &mut rng).unwrap().is_empty());

        let mut single = PageSet::from_bitmaps(["0000"]).unwrap();
        assert!(new_module().mesh(&mut single, &mut rng).unwrap().is_empty());
        assert_eq!(single.unmatched_ids().len(), 1);

        let mut full = PageSet::from_bitmaps(["11111111"; 4]).unwrap();
        assert!(new_module().mesh(&mut full, &mut rng).unwrap().is_empty());
        assert_eq!(full.unmatched_ids().len(), 4);
    }

    #[test]
    fn test_greedy_traverse_first_match() {
        let mut set = PageSet::from_bitmaps(["1000", "0100", "1000", "0010"]).unwrap();
        let ids: Vec<_> = set.ids().collect();
        let mut pairs = vec![];

        greedy_traverse(&mut set, &ids, None, &mut pairs);

        assert_eq!(pairs, vec![(ids[0], ids[1]), (ids[2], ids[3])]);
    }

    #[test]
    fn test_cross_traverse_only_across() {
        // 0 and 1 would mesh, but they share a bucket
        let mut set = PageSet::from_bitmaps(["1100", "0011", "1110", "1111"]).unwrap();
        let ids: Vec<_> = set.ids().collect();
        let mut pairs = vec![];

        let found = cross_traverse(&mut set, &[ids[0], ids[1]], &[ids[2], ids[3]], None, &mut pairs);

        assert_eq!(found, 0);
        assert!(pairs.is_empty());
    }
}
