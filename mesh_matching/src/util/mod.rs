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

pub(crate) mod bit_array;

/// efficient way to calculate: ceil(x / y)
#[inline]
pub(crate) const fn div_ceil(num: usize, div: usize) -> usize {
    (num + div - 1) / div
}

/// floor(log2(x)) for `x > 0`
#[inline]
pub(crate) const fn floor_log2(x: usize) -> usize {
    debug_assert!(x > 0);
    (usize::BITS - 1 - x.leading_zeros()) as usize
}

#[cfg(test)]
mod test {
    use super::{div_ceil, floor_log2};

    #[test]
    fn test_div_ceil() {
        // just test a bunch of different values
        for y in 1..100 {
            for x in 0..y * 3 {
                let expected_value = if x % y == 0 { x / y } else { (x / y) + 1 };

                assert_eq!(div_ceil(x, y), expected_value);
            }
        }
    }

    #[test]
    fn test_floor_log2() {
        assert_eq!(floor_log2(1), 0);
        assert_eq!(floor_log2(8), 3);
        assert_eq!(floor_log2(32), 5);
        assert_eq!(floor_log2(33), 5);
        assert_eq!(floor_log2(255), 7);
        assert_eq!(floor_log2(256), 8);
    }
}
