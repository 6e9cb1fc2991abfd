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

use log::{trace, warn};
use rand::Rng;

use crate::{
    util::{bit_array::BitArray, floor_log2},
    MeshError, PageSet, RecordId,
};

/// How records at exactly half the bitmap length away from the splitting
/// pattern are assigned.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TieBreak {
    /// Fair coin flip per record, drawn from the injected random source
    #[default]
    Coin,
    /// Deterministic, alternates between the two buckets
    Alternate,
}

/// Partitions page sets by their Hamming distance to striped patterns.
///
/// Pattern `i` (counting from 1) consists of `2^(i-1)` runs of
/// `length / 2^i` ones, each followed by as many zeros:
///
/// ```text
/// length 8:  11110000
///            11001100
///            10101010
/// ```
///
/// Every partition uses the current pattern and optionally advances to the
/// next one. The splitter never wraps around: once all patterns are used up,
/// further advancing partitions fail with [`MeshError::SplitterExhausted`].
#[derive(Clone, Debug)]
pub struct Splitter {
    length: usize,
    patterns: Vec<BitArray>,
    current_method: usize,
    tie_break: TieBreak,

    /// next bucket for [`TieBreak::Alternate`]
    alternate_first: bool,
}

impl Splitter {
    pub fn new(length: usize) -> Self {
        let num_splitters = if length > 1 { floor_log2(length) } else { 0 };
        if !length.is_power_of_two() {
            warn!(
                "Splitter built for length {} which is not a power of two, patterns are truncated",
                length
            );
        }

        let patterns = (1..=num_splitters)
            .map(|i| {
                let block = length >> i;
                let mut pattern = BitArray::new(length);
                for j in 0..length {
                    pattern.set((j / block) % 2 == 0, j);
                }
                pattern
            })
            .collect();

        trace!("Created splitter for length {} with {} patterns", length, num_splitters);

        Splitter {
            length,
            patterns,
            current_method: 0,
            tie_break: TieBreak::default(),
            alternate_first: true,
        }
    }

    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    /// Number of available patterns, `floor(log2(length))`
    #[inline]
    pub fn num_splitters(&self) -> usize {
        self.patterns.len()
    }

    #[inline]
    pub fn current_method(&self) -> usize {
        self.current_method
    }

    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.current_method >= self.patterns.len()
    }

    pub fn patterns(&self) -> &[BitArray] {
        &self.patterns
    }

    /// Skips the current pattern
    pub fn advance(&mut self) {
        if !self.is_exhausted() {
            self.current_method += 1;
        }
    }

    /// Splits `ids` into two buckets using the current pattern.
    ///
    /// Records closer than `length / 2` to the pattern go to the first bucket,
    /// records further away to the second one, ties are resolved according to
    /// the [`TieBreak`] policy. With `advance` set the next call uses the next
    /// pattern.
    pub fn partition<R: Rng + ?Sized>(
        &mut self,
        set: &PageSet,
        ids: &[RecordId],
        rng: &mut R,
        advance: bool,
    ) -> Result<(Vec<RecordId>, Vec<RecordId>), MeshError> {
        if self.is_exhausted() {
            return Err(MeshError::SplitterExhausted(self.patterns.len()));
        }
        debug_assert_eq!(set.bitmap_len(), self.length);

        let pattern = &self.patterns[self.current_method];
        let half = self.length / 2;

        let mut bucket1 = Vec::with_capacity(ids.len() / 2 + 1);
        let mut bucket2 = Vec::with_capacity(ids.len() / 2 + 1);

        for id in ids {
            let distance = set.get(*id).bitmap().hamming_distance(pattern);

            let first = if distance < half {
                true
            } else if distance > half {
                false
            } else {
                match self.tie_break {
                    TieBreak::Coin => rng.gen_bool(0.5),
                    TieBreak::Alternate => {
                        self.alternate_first = !self.alternate_first;
                        !self.alternate_first
                    }
                }
            };

            if first {
                bucket1.push(*id);
            } else {
                bucket2.push(*id);
            }
        }

        trace!(
            "Split {} records with pattern {}: {} / {}",
            ids.len(),
            self.current_method,
            bucket1.len(),
            bucket2.len()
        );

        if advance {
            self.current_method += 1;
        }

        Ok((bucket1, bucket2))
    }

    /// Joins both buckets and partitions them again.
    pub fn repartition<R: Rng + ?Sized>(
        &mut self,
        set: &PageSet,
        mut bucket1: Vec<RecordId>,
        bucket2: Vec<RecordId>,
        rng: &mut R,
        advance: bool,
    ) -> Result<(Vec<RecordId>, Vec<RecordId>), MeshError> {
        bucket1.extend(bucket2);
        self.partition(set, &bucket1, rng, advance)
    }
}
