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

use std::collections::HashSet;

use crate::{
    modules::mesher::{ColoringBound, MeshPair},
    MeshError, PageRecord, PageSet, RecordId,
};

/// Outcome of one matching run.
///
/// Owns the meshed [`PageSet`], so the pairs can be resolved to records.
#[derive(Clone, Debug)]
pub struct MeshResult {
    set: PageSet,
    pairs: Vec<MeshPair>,
    coloring_bound: Option<ColoringBound>,
}

impl MeshResult {
    pub(crate) fn new(set: PageSet, pairs: Vec<MeshPair>, coloring_bound: Option<ColoringBound>) -> Self {
        MeshResult {
            set,
            pairs,
            coloring_bound,
        }
    }

    #[inline]
    pub fn set(&self) -> &PageSet {
        &self.set
    }

    pub fn into_set(self) -> PageSet {
        self.set
    }

    /// Meshed records in the order the strategy found them
    pub fn pairs(&self) -> impl Iterator<Item = (&PageRecord, &PageRecord)> {
        self.pairs
            .iter()
            .map(|(a, b)| (self.set.get(*a), self.set.get(*b)))
    }

    #[inline]
    pub fn pair_ids(&self) -> &[MeshPair] {
        &self.pairs
    }

    pub fn unmatched(&self) -> impl Iterator<Item = &PageRecord> {
        self.set
            .iter()
            .filter(|(id, _)| !self.set.is_matched(*id))
            .map(|(_, record)| record)
    }

    pub fn unmatched_ids(&self) -> Vec<RecordId> {
        self.set.unmatched_ids()
    }

    /// Number of pairs, which equals the number of pages that can be freed
    #[inline]
    pub fn meshed_count(&self) -> usize {
        self.pairs.len()
    }

    /// Only set by the coloring strategy
    #[inline]
    pub fn coloring_bound(&self) -> Option<ColoringBound> {
        self.coloring_bound
    }

    /// Verifies that every pair is compatible, no record is meshed twice and
    /// every record is either meshed or unmatched.
    pub fn check(&self) -> Result<(), MeshError> {
        let mut seen = HashSet::with_capacity(self.pairs.len() * 2);

        for (a, b) in &self.pairs {
            if !self.set.is_compatible(*a, *b) {
                return Err(MeshError::InvariantViolation(format!(
                    "records {} and {} are not compatible",
                    a.index(),
                    b.index()
                )));
            }
            for id in [a, b] {
                if !seen.insert(*id) {
                    return Err(MeshError::InvariantViolation(format!(
                        "record {} is meshed more than once",
                        id.index()
                    )));
                }
                if !self.set.is_matched(*id) {
                    return Err(MeshError::InvariantViolation(format!(
                        "record {} is meshed but not marked as matched",
                        id.index()
                    )));
                }
            }
        }

        let unmatched = self.set.unmatched_ids().len();
        if 2 * self.pairs.len() + unmatched != self.set.len() {
            return Err(MeshError::InvariantViolation(format!(
                "{} pairs and {} unmatched records do not add up to {} records",
                self.pairs.len(),
                unmatched,
                self.set.len()
            )));
        }

        Ok(())
    }

    /// Bytes released if objects of `object_size` bytes are meshed: every pair
    /// frees one page of `bitmap_len` slots.
    pub fn freed_bytes(&self, object_size: usize) -> usize {
        object_size * self.set.bitmap_len() * self.pairs.len()
    }

    /// Percentage of pages of this batch that are freed
    pub fn freed_percentage(&self) -> f64 {
        if self.set.is_empty() {
            return 0.0;
        }
        self.pairs.len() as f64 * 100.0 / self.set.len() as f64
    }
}
