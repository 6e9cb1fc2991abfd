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

//! Drivers around the engine: synthetic batches, mesh dumps of a running
//! allocator and repeated trials.

mod dump;
mod generate;
mod trials;

pub use dump::{
    analyze_dump, parse_mesh_dump, read_mesh_dump, span_set, SizeClassReport, SpanRecord,
    MAX_MESHABLE_OBJECT_SIZE,
};
pub use generate::{const_occupancy_bitmaps, independent_bitmaps, Density};
pub use trials::{
    repeated_trials, worker_streams, BitmapSource, StrategyStats, TrialOptions, TrialReport,
};
