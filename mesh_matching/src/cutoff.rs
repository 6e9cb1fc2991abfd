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

use crate::{MeshError, PageSet, RecordId};

/// Parameters of a [`CutoffTable`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CutoffConfig {
    /// Candidates whose chance of being compatible with the anchor is below
    /// this value are not tested. Has to be in `(0, 1]`.
    pub probability: f64,

    /// Only every `step`-th candidate occupancy is evaluated while building.
    /// Bigger steps build faster but give coarser cutoffs.
    pub step: usize,

    /// Candidate occupancies `>= search_limit` are never evaluated.
    /// `None` means half of the bitmap length.
    pub search_limit: Option<usize>,
}

impl Default for CutoffConfig {
    fn default() -> Self {
        Self {
            probability: 1e-3,
            step: 5,
            search_limit: None,
        }
    }
}

impl CutoffConfig {
    pub fn with_probability(probability: f64) -> Self {
        Self {
            probability,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), MeshError> {
        // also rejects NaN
        if !(self.probability > 0.0 && self.probability <= 1.0) {
            return Err(MeshError::InvalidCutoffProbability(self.probability));
        }
        if self.step == 0 {
            return Err(MeshError::InvalidConfig("cutoff step must not be zero"));
        }
        Ok(())
    }
}

/// Probability that a page with `occ2` uniformly placed objects is compatible
/// with a fixed page holding `occ1` objects, both with `length` slots.
///
/// This is `C(length - occ1, occ2) / C(length, occ2)`, evaluated as the
/// product `(length-occ1-k) / (length-k)` for `k in 0..occ2` so it never
/// leaves the `f64` range.
pub fn compatibility_probability(length: usize, occ1: usize, occ2: usize) -> f64 {
    let mut probability = 1.0;
    for k in 0..occ2 {
        if occ1 + k >= length {
            // not enough free slots left
            return 0.0;
        }
        probability *= (length - occ1 - k) as f64 / (length - k) as f64;
    }
    probability
}

/// Per occupancy pruning thresholds.
///
/// For an anchor with occupancy `o`, every candidate with an occupancy of at
/// least `cutoff(o)` is assumed to be too unlikely to be compatible. This is a
/// model of uniformly random bitmaps, not a bound: pruning can skip pairs that
/// are actually compatible.
#[derive(Clone, Debug)]
pub struct CutoffTable {
    cutoffs: Vec<Option<usize>>,
}

impl CutoffTable {
    /// Computes cutoffs for every distinct occupancy among `ids`.
    pub fn build<I>(set: &PageSet, ids: I, config: &CutoffConfig) -> Result<Self, MeshError>
    where
        I: IntoIterator<Item = RecordId>,
    {
        config.validate()?;

        let length = set.bitmap_len();
        let search_limit = config.search_limit.unwrap_or(length / 2).min(length + 1);

        let mut cutoffs = vec![None; length + 1];
        let mut evaluated = vec![false; length + 1];

        for id in ids {
            let occ1 = set.occupancy(id);
            if evaluated[occ1] {
                continue;
            }
            evaluated[occ1] = true;

            cutoffs[occ1] = (0..search_limit)
                .step_by(config.step)
                .find(|occ2| compatibility_probability(length, occ1, *occ2) < config.probability);
        }

        debug!(
            "Built cutoff table for length {} (probability={}, {} occupancies)",
            length,
            config.probability,
            evaluated.iter().filter(|e| **e).count()
        );

        Ok(CutoffTable { cutoffs })
    }

    /// Cutoff occupancy for an anchor with `occupancy`. `None` means no pruning.
    #[inline]
    pub fn cutoff(&self, occupancy: usize) -> Option<usize> {
        self.cutoffs.get(occupancy).copied().flatten()
    }

    /// `true` if a candidate with `candidate` occupancy should not be tested
    /// against an anchor with `anchor` occupancy.
    #[inline]
    pub fn prunes(&self, anchor: usize, candidate: usize) -> bool {
        matches!(self.cutoff(anchor), Some(cutoff) if candidate >= cutoff)
    }
}

#[cfg(test)]
mod test {
    use super::{compatibility_probability, CutoffConfig, CutoffTable};
    use crate::{MeshError, PageRecord, PageSet};

    fn set_with_occupancies(length: usize, occupancies: &[usize]) -> PageSet {
        let records = occupancies
            .iter()
            .map(|occ| {
                let bits: Vec<bool> = (0..length).map(|i| i < *occ).collect();
                PageRecord::from_bits(&bits)
            })
            .collect();
        PageSet::from_records(records).unwrap()
    }

    #[test]
    fn test_probability_closed_form() {
        assert_eq!(compatibility_probability(8, 3, 0), 1.0);
        // C(5, 2) / C(8, 2) = 10 / 28
        let p = compatibility_probability(8, 3, 2);
        assert!((p - 10.0 / 28.0).abs() < 1e-12);
        // not enough free slots
        assert_eq!(compatibility_probability(8, 5, 4), 0.0);
        assert_eq!(compatibility_probability(8, 8, 1), 0.0);
    }

    #[test]
    fn test_cutoff_below_half_length() {
        let set = set_with_occupancies(128, &[40]);
        let table = CutoffTable::build(&set, set.ids(), &CutoffConfig::with_probability(1e-3)).unwrap();

        let cutoff = table.cutoff(40).expect("occupancy 40 should be pruned");
        assert!(cutoff < 64);
        assert_eq!(cutoff, 20);
        assert!(table.prunes(40, 20));
        assert!(!table.prunes(40, 19));
    }

    #[test]
    fn test_cutoffs_non_increasing() {
        let occupancies: Vec<usize> = (0..=64).collect();
        let set = set_with_occupancies(128, &occupancies);
        let table = CutoffTable::build(&set, set.ids(), &CutoffConfig::with_probability(1e-3)).unwrap();

        let mut last = usize::MAX;
        for occ in occupancies {
            let cutoff = table.cutoff(occ).unwrap_or(usize::MAX);
            assert!(cutoff <= last, "cutoff for {} grew to {}", occ, cutoff);
            last = cutoff;
        }

        // sparse anchors are never pruned within the search range
        assert_eq!(table.cutoff(0), None);
    }

    #[test]
    fn test_unknown_occupancy_not_pruned() {
        let set = set_with_occupancies(128, &[40]);
        let table = CutoffTable::build(&set, set.ids(), &CutoffConfig::default()).unwrap();
        assert_eq!(table.cutoff(41), None);
        assert!(!table.prunes(41, 120));
    }

    #[test]
    fn test_invalid_probability() {
        let set = set_with_occupancies(16, &[4]);
        for probability in [0.0, -0.5, 1.5, f64::NAN] {
            let res = CutoffTable::build(&set, set.ids(), &CutoffConfig::with_probability(probability));
            assert!(matches!(res, Err(MeshError::InvalidCutoffProbability(_))));
        }
        assert!(CutoffTable::build(&set, set.ids(), &CutoffConfig::with_probability(1.0)).is_ok());

        let config = CutoffConfig {
            step: 0,
            ..Default::default()
        };
        assert!(matches!(
            CutoffTable::build(&set, set.ids(), &config),
            Err(MeshError::InvalidConfig(_))
        ));
    }
}
