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

use rand::{seq::index::sample, Rng};
use serde::Serialize;

use crate::{BitArray, MeshError, PageRecord, PageSet};

/// How densely [`independent_bitmaps`] fills the pages.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub enum Density {
    /// Expected number of objects per page, every slot is used with
    /// probability `k / length`
    Ones(usize),

    /// Probability that two pages are compatible, every slot is used with
    /// probability `sqrt(1 - q^(1/length))`
    MeshProbability(f64),
}

impl Density {
    /// Probability that a single slot is in use
    pub fn bit_probability(&self, length: usize) -> Result<f64, MeshError> {
        match *self {
            Density::Ones(0) => Err(MeshError::InvalidConfig("number of ones must not be zero")),
            Density::Ones(ones) if ones > length => {
                Err(MeshError::InvalidConfig("more ones than slots per page"))
            }
            Density::Ones(ones) => Ok(ones as f64 / length as f64),
            Density::MeshProbability(q) if !(0.0..=1.0).contains(&q) => {
                Err(MeshError::InvalidConfig("mesh probability must be in [0, 1]"))
            }
            Density::MeshProbability(q) => Ok((1.0 - q.powf(1.0 / length as f64)).sqrt()),
        }
    }
}

/// `count` pages where exactly `ones` randomly chosen slots are in use
pub fn const_occupancy_bitmaps<R: Rng + ?Sized>(
    rng: &mut R,
    length: usize,
    count: usize,
    ones: usize,
) -> Result<PageSet, MeshError> {
    if length == 0 {
        return Err(MeshError::EmptyBitmap);
    }
    if ones > length {
        return Err(MeshError::InvalidConfig("more ones than slots per page"));
    }

    let records = (0..count)
        .map(|_| {
            let mut bitmap = BitArray::new(length);
            for slot in sample(rng, length, ones) {
                bitmap.set(true, slot);
            }
            PageRecord::from_bit_array(bitmap)
        })
        .collect();

    PageSet::from_records(records)
}

/// `count` pages where every slot is in use independently of all others
pub fn independent_bitmaps<R: Rng + ?Sized>(
    rng: &mut R,
    length: usize,
    count: usize,
    density: Density,
) -> Result<PageSet, MeshError> {
    if length == 0 {
        return Err(MeshError::EmptyBitmap);
    }
    let p = density.bit_probability(length)?;

    let records = (0..count)
        .map(|_| {
            let mut bitmap = BitArray::new(length);
            for slot in 0..length {
                bitmap.set(rng.gen_bool(p), slot);
            }
            PageRecord::from_bit_array(bitmap)
        })
        .collect();

    PageSet::from_records(records)
}
