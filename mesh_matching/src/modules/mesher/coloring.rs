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

use super::{graph::CompatibilityGraph, MeshPair, MesherModule};
use crate::{MeshError, PageSet, RecordId};

/// Result of coloring the incompatibility graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "experiments", derive(serde::Serialize))]
pub struct ColoringBound {
    /// Number of colors used, every color class can share one physical page
    pub colors: usize,

    /// `records - colors`, pages that could be freed if any number of pages
    /// may be meshed together
    pub freeable: usize,
}

/// Meshing without the "pairs only" restriction.
///
/// Colors the complement of the compatibility graph greedily, largest degree
/// first. Records of one color are pairwise compatible, so each color class
/// could be meshed onto a single page. The resulting [`ColoringBound`] is a
/// ceiling for comparison, not a plan the runtime can execute.
///
/// To keep results comparable with the pairwise strategies, the records of
/// each color class are additionally meshed in pairs.
#[derive(Clone, Debug, Default)]
pub struct ColoringMesherModule {
    bound: Option<ColoringBound>,
    classes: Vec<Vec<RecordId>>,
}

impl ColoringMesherModule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Color classes of the last run
    pub fn classes(&self) -> &[Vec<RecordId>] {
        &self.classes
    }
}

impl MesherModule for ColoringMesherModule {
    fn name(&self) -> &'static str {
        "coloring"
    }

    fn mesh<R: Rng + ?Sized>(
        &mut self,
        set: &mut PageSet,
        _rng: &mut R,
    ) -> Result<Vec<MeshPair>, MeshError> {
        let graph = CompatibilityGraph::build(set, set.unmatched_ids());
        let n = graph.vertex_count();

        // in the complement, a high degree means few compatible records
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by_key(|v| graph.degree(*v));

        let mut color: Vec<Option<usize>> = vec![None; n];
        let mut compatible = vec![false; n];
        let mut taken = Vec::new();
        let mut color_count = 0;

        for &v in &order {
            for &u in &graph.adjacency[v] {
                compatible[u] = true;
            }

            // colors of all colored records that do not mesh with `v`
            taken.clear();
            taken.resize(color_count + 1, false);
            for u in 0..n {
                if u == v || compatible[u] {
                    continue;
                }
                if let Some(c) = color[u] {
                    taken[c] = true;
                }
            }

            let c = taken.iter().position(|t| !*t).unwrap_or(color_count);
            color[v] = Some(c);
            color_count = color_count.max(c + 1);

            for &u in &graph.adjacency[v] {
                compatible[u] = false;
            }
        }

        let mut classes = vec![Vec::new(); color_count];
        for v in 0..n {
            if let Some(c) = color[v] {
                classes[c].push(graph.ids[v]);
            }
        }

        let mut pairs = Vec::new();
        for class in &classes {
            for chunk in class.chunks_exact(2) {
                set.mark_matched(chunk[0], chunk[1]);
                pairs.push((chunk[0], chunk[1]));
            }
        }

        let bound = ColoringBound {
            colors: color_count,
            freeable: n - color_count,
        };
        debug!(
            "coloring: {} records need {} pages ({} meshes in pairs)",
            n,
            color_count,
            pairs.len()
        );

        self.bound = Some(bound);
        self.classes = classes;
        Ok(pairs)
    }

    fn coloring_bound(&self) -> Option<ColoringBound> {
        self.bound
    }
}

#[cfg(test)]
mod test {
    use rand::{rngs::SmallRng, SeedableRng};

    use super::{ColoringBound, ColoringMesherModule};
    use crate::{
        modules::mesher::{test::*, ExactMesherModule, MesherModule},
        PageSet,
    };

    #[test]
    fn test_three_pages_share_one() {
        // all three are pairwise disjoint, pairs alone can only free one page
        let mut set = PageSet::from_bitmaps(["1100", "0010", "0001", "1111"]).unwrap();
        let mut rng = SmallRng::seed_from_u64(SEED);
        let mut module = ColoringMesherModule::new();

        let pairs = module.mesh(&mut set, &mut rng).unwrap();

        assert_eq!(
            module.coloring_bound(),
            Some(ColoringBound {
                colors: 2,
                freeable: 2
            })
        );
        assert_eq!(pairs.len(), 1);
        check_pairs(&set, &pairs);

        // every class is pairwise compatible
        for class in module.classes() {
            for a in class {
                for b in class {
                    assert!(a == b || set.is_compatible(*a, *b));
                }
            }
        }
    }

    #[test]
    fn test_class_pairs_never_beat_exact() {
        let mut rng = SmallRng::seed_from_u64(SEED);
        for _ in 0..10 {
            let set = random_set(&mut rng, 16, 40, 0.2);

            let mut coloring_set = set.clone();
            let mut module = ColoringMesherModule::new();
            let pairs = module.mesh(&mut coloring_set, &mut rng).unwrap();
            check_pairs(&coloring_set, &pairs);
            let bound = module.coloring_bound().unwrap();
            assert_eq!(bound.colors + bound.freeable, set.len());

            let mut exact_set = set.clone();
            let exact = ExactMesherModule::new().mesh(&mut exact_set, &mut rng).unwrap();
            assert!(exact.len() >= pairs.len());
        }
    }

    #[test]
    fn test_coloring_soundness() {
        test_mesher_soundness(ColoringMesherModule::new);
        test_mesher_degenerate(ColoringMesherModule::new);
    }
}
