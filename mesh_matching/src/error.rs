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

use thiserror::Error;

/// Errors that can occur while building page sets or running a mesher.
///
/// Finding no meshes is never an error: it is a successful run with zero pairs.
#[derive(Debug, Error)]
pub enum MeshError {
    #[error("bitmap {index} has length {found}, but the batch uses length {expected}")]
    LengthMismatch {
        index: usize,
        expected: usize,
        found: usize,
    },
    #[error("bitmap {index} contains invalid character {found:?} (only '0' and '1' are allowed)")]
    InvalidBitmap { index: usize, found: char },
    #[error("bitmaps must contain at least one slot")]
    EmptyBitmap,
    #[error("unknown meshing strategy \"{0}\"")]
    UnknownStrategy(String),
    #[error("cutoff probability {0} is outside of (0, 1]")]
    InvalidCutoffProbability(f64),
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
    #[error("all {0} splitting patterns are used up")]
    SplitterExhausted(usize),
    #[error("meshing result violates an invariant: {0}")]
    InvariantViolation(String),
    #[cfg(feature = "experiments")]
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[cfg(feature = "experiments")]
    #[error("invalid mesh dump entry: {0}")]
    Json(#[from] serde_json::Error),
}
