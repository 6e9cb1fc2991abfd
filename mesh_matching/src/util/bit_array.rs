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

use super::div_ceil;

type Word = u64;
const WORD_BITS: usize = Word::BITS as usize;

/// Fixed length bit storage backed by 64 bit words.
///
/// Bit `i` corresponds to character `i` of the textual form, so `"1000"` has
/// only bit 0 set. Bits past `len` inside the last word are always zero,
/// which lets comparisons work on whole words.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BitArray {
    words: Box<[Word]>,
    len: usize,
}

impl BitArray {
    /// Creates an array of `len` unset bits
    pub fn new(len: usize) -> Self {
        BitArray {
            words: vec![0; div_ceil(len, WORD_BITS)].into_boxed_slice(),
            len,
        }
    }

    pub fn from_bools(bits: &[bool]) -> Self {
        let mut arr = Self::new(bits.len());
        for (index, bit) in bits.iter().enumerate() {
            arr.set(*bit, index);
        }
        arr
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn set(&mut self, value: bool, index: usize) {
        debug_assert!(index < self.len, "index {} out of range {}", index, self.len);
        let arr_index = index / WORD_BITS;
        let internal_index = index % WORD_BITS;

        let item = &mut self.words[arr_index];
        if value {
            // set bit
            *item |= 1 << internal_index;
        } else {
            // unset bit
            *item &= !(1 << internal_index);
        }
    }

    #[inline]
    pub fn is_set(&self, index: usize) -> bool {
        debug_assert!(index < self.len, "index {} out of range {}", index, self.len);
        let arr_index = index / WORD_BITS;
        let internal_index = index % WORD_BITS;

        (self.words[arr_index] & (1 << internal_index)) != 0
    }

    /// Number of set bits
    #[inline]
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// `true` if no bit is set in both arrays.
    #[inline]
    pub fn is_disjoint(&self, other: &BitArray) -> bool {
        debug_assert_eq!(self.len, other.len);
        self.words
            .iter()
            .zip(other.words.iter())
            .all(|(a, b)| a & b == 0)
    }

    /// Number of positions where the two arrays differ
    #[inline]
    pub fn hamming_distance(&self, other: &BitArray) -> usize {
        debug_assert_eq!(self.len, other.len);
        self.words
            .iter()
            .zip(other.words.iter())
            .map(|(a, b)| (a ^ b).count_ones() as usize)
            .sum()
    }

    /// The raw words, least significant bit first
    #[inline]
    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len).map(move |i| self.is_set(i))
    }

    /// Textual form, one `'0'`/`'1'` character per bit
    pub fn to_bit_string(&self) -> String {
        self.iter().map(|b| if b { '1' } else { '0' }).collect()
    }
}

impl core::fmt::Debug for BitArray {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "BitArray({})", self.to_bit_string())
    }
}
