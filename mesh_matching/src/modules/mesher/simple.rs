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

use super::{MeshPair, MesherModule};
use crate::{MeshError, PageSet};

/// Meshes neighbours in input order.
///
/// A single pass over the pairs `(2k, 2k+1)` of unmatched records. This is
/// what a runtime without any search budget can afford, other strategies are
/// compared against it.
#[derive(Clone, Debug, Default)]
pub struct SimpleMesherModule;

impl SimpleMesherModule {
    pub fn new() -> Self {
        Self
    }
}

impl MesherModule for SimpleMesherModule {
    fn name(&self) -> &'static str {
        "simple"
    }

    fn mesh<R: Rng + ?Sized>(
        &mut self,
        set: &mut PageSet,
        _rng: &mut R,
    ) -> Result<Vec<MeshPair>, MeshError> {
        let ids = set.unmatched_ids();
        let mut pairs = Vec::new();

        for chunk in ids.chunks_exact(2) {
            if set.is_compatible(chunk[0], chunk[1]) {
                set.mark_matched(chunk[0], chunk[1]);
                pairs.push((chunk[0], chunk[1]));
            }
        }

        debug!("simple: found {} meshes among {} records", pairs.len(), ids.len());
        Ok(pairs)
    }
}
