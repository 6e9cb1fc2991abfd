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

use crate::{util::bit_array::BitArray, MeshError};

/// Occupancy bitmap of a single page.
///
/// Each bit marks whether the slot at that position is in use. The occupancy
/// is computed once at construction and cached.
#[derive(Clone, PartialEq, Eq)]
pub struct PageRecord {
    bitmap: BitArray,
    occupancy: usize,
}

impl PageRecord {
    /// Parses a bitmap given as a string of `'0'` and `'1'` characters.
    pub fn parse(bitmap: &str) -> Result<Self, MeshError> {
        Self::parse_indexed(0, bitmap)
    }

    /// Same as [`PageRecord::parse`], `index` is only used for error reporting
    pub(crate) fn parse_indexed(index: usize, bitmap: &str) -> Result<Self, MeshError> {
        let mut bits = BitArray::new(bitmap.chars().count());
        for (i, c) in bitmap.chars().enumerate() {
            match c {
                '0' => {}
                '1' => bits.set(true, i),
                found => return Err(MeshError::InvalidBitmap { index, found }),
            }
        }

        Ok(Self::from_bit_array(bits))
    }

    pub fn from_bits(bits: &[bool]) -> Self {
        Self::from_bit_array(BitArray::from_bools(bits))
    }

    pub fn from_bit_array(bitmap: BitArray) -> Self {
        let occupancy = bitmap.count_ones();
        PageRecord { bitmap, occupancy }
    }

    #[inline]
    pub fn bitmap(&self) -> &BitArray {
        &self.bitmap
    }

    /// Word encoding used for the compatibility test
    #[inline]
    pub fn encoded(&self) -> &[u64] {
        self.bitmap.words()
    }

    /// Number of slots in use
    #[inline]
    pub fn occupancy(&self) -> usize {
        self.occupancy
    }

    /// Number of slots of the page
    #[inline]
    pub fn len(&self) -> usize {
        self.bitmap.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bitmap.is_empty()
    }

    /// Two pages are compatible (meshable) if no slot is in use in both of them.
    #[inline]
    pub fn is_compatible(&self, other: &PageRecord) -> bool {
        self.bitmap.is_disjoint(&other.bitmap)
    }

    pub fn to_bit_string(&self) -> String {
        self.bitmap.to_bit_string()
    }
}

impl core::fmt::Debug for PageRecord {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PageRecord")
            .field("bitmap", &self.to_bit_string())
            .field("occupancy", &self.occupancy)
            .finish()
    }
}
