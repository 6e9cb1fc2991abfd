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
use rand::Rng;

use super::{cross_traverse, greedy_traverse, MeshPair, MesherModule};
use crate::{
    cutoff::{CutoffConfig, CutoffTable},
    MeshError, PageSet, RecordId,
};

/// Occupancy ordered first-fit meshing.
///
/// Records are sorted by increasing occupancy (stable, so equal occupancies
/// keep their input order) because sparse pages mesh with more pages. Each
/// unmatched record is meshed with the first compatible record after it.
///
/// With a [`CutoffConfig`] the scan of a row stops at the first candidate
/// above the anchor's cutoff. This is faster on skewed occupancies but may
/// miss compatible pairs.
#[derive(Clone, Debug, Default)]
pub struct GreedyMesherModule {
    cutoff: Option<CutoffConfig>,
}

impl GreedyMesherModule {
    pub fn new() -> Self {
        Self { cutoff: None }
    }

    pub fn with_cutoff(cutoff: CutoffConfig) -> Self {
        Self {
            cutoff: Some(cutoff),
        }
    }

    /// Meshes records of `bucket1` with records of `bucket2`, never two
    /// records of the same bucket.
    ///
    /// The buckets are scanned in the given order, every record of `bucket1`
    /// takes the first compatible record of `bucket2`. With a cutoff both
    /// buckets are sorted by occupancy first. Records that are already
    /// matched are skipped.
    pub fn mesh_buckets(
        &self,
        set: &mut PageSet,
        bucket1: &[RecordId],
        bucket2: &[RecordId],
    ) -> Result<Vec<MeshPair>, MeshError> {
        check_buckets(set, bucket1, bucket2)?;

        let mut bucket1 = bucket1.to_vec();
        let mut bucket2 = bucket2.to_vec();
        let cutoffs = match &self.cutoff {
            Some(config) => {
                set.sort_by_occupancy(&mut bucket1);
                set.sort_by_occupancy(&mut bucket2);
                let ids = bucket1.iter().chain(bucket2.iter()).copied();
                Some(CutoffTable::build(set, ids, config)?)
            }
            None => None,
        };

        let mut pairs = Vec::with_capacity(bucket1.len().min(bucket2.len()));
        cross_traverse(set, &bucket1, &bucket2, cutoffs.as_ref(), &mut pairs);

        debug!(
            "{}: found {} meshes between buckets of {} and {} records",
            self.name(),
            pairs.len(),
            bucket1.len(),
            bucket2.len()
        );

        Ok(pairs)
    }
}

/// Buckets have to reference records of `set` and must not share a record
fn check_buckets(set: &PageSet, bucket1: &[RecordId], bucket2: &[RecordId]) -> Result<(), MeshError> {
    let mut seen = vec![false; set.len()];
    for id in bucket1.iter().chain(bucket2.iter()) {
        match seen.get_mut(id.index()) {
            None => return Err(MeshError::InvalidConfig("bucket references a record outside of the set")),
            Some(true) => return Err(MeshError::InvalidConfig("record appears in more than one bucket slot")),
            Some(slot) => *slot = true,
        }
    }
    Ok(())
}

impl MesherModule for GreedyMesherModule {
    fn name(&self) -> &'static str {
        if self.cutoff.is_some() {
            "greedy-cutoff"
        } else {
            "greedy"
        }
    }

    fn mesh<R: Rng + ?Sized>(
        &mut self,
        set: &mut PageSet,
        _rng: &mut R,
    ) -> Result<Vec<MeshPair>, MeshError> {
        let mut ids = set.unmatched_ids();
        set.sort_by_occupancy(&mut ids);

        let cutoffs = match &self.cutoff {
            Some(config) => Some(CutoffTable::build(set, ids.iter().copied(), config)?),
            None => None,
        };

        let mut pairs = Vec::with_capacity(ids.len() / 2);
        greedy_traverse(set, &ids, cutoffs.as_ref(), &mut pairs);

        debug!(
            "{}: found {} meshes among {} records",
            self.name(),
            pairs.len(),
            ids.len()
        );

        Ok(pairs)
    }
}

#[cfg(test)]
mod test {
    use rand::{rngs::SmallRng, SeedableRng};

    use super::GreedyMesherModule;
    use crate::{
        cutoff::CutoffConfig,
        modules::mesher::{test::*, MesherModule},
        MeshError, PageSet,
    };

    #[test]
    fn test_greedy_scenario() {
        // the two sparse pages come first after sorting and take each other
        let mut set =
            PageSet::from_bitmaps(["11100000", "11111000", "00011111", "00000111"]).unwrap();
        let ids: Vec<_> = set.ids().collect();
        let mut rng = SmallRng::seed_from_u64(SEED);

        let pairs = GreedyMesherModule::new().mesh(&mut set, &mut rng).unwrap();

        assert_eq!(pairs, vec![(ids[0], ids[3])]);
        assert_eq!(set.unmatched_ids(), vec![ids[1], ids[2]]);
        check_pairs(&set, &pairs);
    }

    #[test]
    fn test_greedy_buckets_scenario() {
        let mut set =
            PageSet::from_bitmaps(["11100000", "11111000", "00011111", "00000111"]).unwrap();
        let ids: Vec<_> = set.ids().collect();

        let pairs = GreedyMesherModule::new()
            .mesh_buckets(&mut set, &[ids[0], ids[1]], &[ids[2], ids[3]])
            .unwrap();

        assert_eq!(pairs, vec![(ids[0], ids[2]), (ids[1], ids[3])]);
        assert!(set.unmatched_ids().is_empty());
        check_pairs(&set, &pairs);
    }

    #[test]
    fn test_buckets_never_mesh_inside() {
        // 0 and 1 fit each other, but share a bucket
        let mut set = PageSet::from_bitmaps(["1100", "0011", "1111"]).unwrap();
        let ids: Vec<_> = set.ids().collect();

        for module in [
            GreedyMesherModule::new(),
            GreedyMesherModule::with_cutoff(CutoffConfig::default()),
        ] {
            let mut bucket_set = set.clone();
            let pairs = module
                .mesh_buckets(&mut bucket_set, &[ids[0], ids[1]], &[ids[2]])
                .unwrap();
            assert!(pairs.is_empty());
        }

        let pairs = GreedyMesherModule::new().mesh_buckets(&mut set, &[ids[0]], &[]).unwrap();
        assert!(pairs.is_empty());
        assert_eq!(set.unmatched_ids().len(), 3);
    }

    #[test]
    fn test_invalid_buckets() {
        let mut set = PageSet::from_bitmaps(["1000", "0100"]).unwrap();
        let other = PageSet::from_bitmaps(["1000", "0100", "0010"]).unwrap();
        let ids: Vec<_> = set.ids().collect();
        let foreign: Vec<_> = other.ids().collect();
        let module = GreedyMesherModule::new();

        let res = module.mesh_buckets(&mut set, &[ids[0]], &[ids[0]]);
        assert!(matches!(res, Err(MeshError::InvalidConfig(_))));

        let res = module.mesh_buckets(&mut set, &[ids[0]], &[foreign[2]]);
        assert!(matches!(res, Err(MeshError::InvalidConfig(_))));

        assert_eq!(set.unmatched_ids().len(), 2);
    }

    #[test]
    fn test_greedy_sparse_first() {
        // the sparse page is looked at first and takes the first page it fits
        let mut set = PageSet::from_bitmaps(["1110", "0001", "1000"]).unwrap();
        let ids: Vec<_> = set.ids().collect();
        let mut rng = SmallRng::seed_from_u64(SEED);

        let pairs = GreedyMesherModule::new().mesh(&mut set, &mut rng).unwrap();
        assert_eq!(pairs, vec![(ids[1], ids[2])]);
    }

    #[test]
    fn test_greedy_deterministic() {
        let mut rng = SmallRng::seed_from_u64(SEED);
        let set = random_set(&mut rng, 64, 200, 0.15);

        for module in [
            GreedyMesherModule::new(),
            GreedyMesherModule::with_cutoff(CutoffConfig::with_probability(1e-2)),
        ] {
            let mut first_set = set.clone();
            let mut second_set = set.clone();
            let first = module.clone().mesh(&mut first_set, &mut rng).unwrap();
            let second = module.clone().mesh(&mut second_set, &mut rng).unwrap();
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_cutoff_never_finds_more() {
        let mut rng = SmallRng::seed_from_u64(SEED);
        let mut greedy_total = 0;
        let mut cutoff_total = 0;

        for _ in 0..10 {
            let set = random_set(&mut rng, 128, 200, 0.2);

            let mut greedy_set = set.clone();
            greedy_total += GreedyMesherModule::new().mesh(&mut greedy_set, &mut rng).unwrap().len();

            let mut cutoff_set = set.clone();
            let pairs = GreedyMesherModule::with_cutoff(CutoffConfig::with_probability(1e-1))
                .mesh(&mut cutoff_set, &mut rng)
                .unwrap();
            check_pairs(&cutoff_set, &pairs);
            cutoff_total += pairs.len();
        }

        assert!(cutoff_total <= greedy_total);
    }

    #[test]
    fn test_greedy_soundness() {
        test_mesher_soundness(GreedyMesherModule::new);
        test_mesher_soundness(|| GreedyMesherModule::with_cutoff(CutoffConfig::default()));
    }

    #[test]
    fn test_greedy_degenerate() {
        test_mesher_degenerate(GreedyMesherModule::new);
        test_mesher_degenerate(|| GreedyMesherModule::with_cutoff(CutoffConfig::default()));
    }

    #[test]
    fn test_invalid_cutoff() {
        let mut set = PageSet::from_bitmaps(["1000", "0100"]).unwrap();
        let mut rng = SmallRng::seed_from_u64(SEED);
        let res = GreedyMesherModule::with_cutoff(CutoffConfig::with_probability(2.0)).mesh(&mut set, &mut rng);
        assert!(res.is_err());
        // nothing was meshed
        assert_eq!(set.unmatched_ids().len(), 2);
    }
}
