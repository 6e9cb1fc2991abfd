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

use log::trace;

use crate::{PageSet, RecordId};

/// Undirected graph with one vertex per record and an edge between every
/// two compatible records.
///
/// Vertex `v` stands for `ids[v]`. Building it takes `O(n^2)` compatibility
/// tests.
pub(crate) struct CompatibilityGraph {
    pub(crate) ids: Vec<RecordId>,
    pub(crate) adjacency: Vec<Vec<usize>>,
}

impl CompatibilityGraph {
    pub(crate) fn build(set: &PageSet, ids: Vec<RecordId>) -> Self {
        let mut adjacency = vec![Vec::new(); ids.len()];

        for v in 0..ids.len() {
            for u in v + 1..ids.len() {
                if set.is_compatible(ids[v], ids[u]) {
                    adjacency[v].push(u);
                    adjacency[u].push(v);
                }
            }
        }

        trace!(
            "Built compatibility graph with {} vertices and {} edges",
            ids.len(),
            adjacency.iter().map(|a| a.len()).sum::<usize>() / 2
        );

        CompatibilityGraph { ids, adjacency }
    }

    #[inline]
    pub(crate) fn vertex_count(&self) -> usize {
        self.ids.len()
    }

    #[inline]
    pub(crate) fn degree(&self, v: usize) -> usize {
        self.adjacency[v].len()
    }
}

#[cfg(test)]
mod test {
    use super::CompatibilityGraph;
    use crate::PageSet;

    #[test]
    fn test_edges_are_compatible_pairs() {
        let set = PageSet::from_bitmaps(["1100", "0011", "0010", "1111", "0000"]).unwrap();
        let graph = CompatibilityGraph::build(&set, set.ids().collect());

        assert_eq!(graph.vertex_count(), 5);
        assert_eq!(graph.adjacency[0], vec![1, 2, 4]);
        assert_eq!(graph.adjacency[1], vec![0, 4]);
        assert_eq!(graph.degree(3), 1);
        // no self loops, even for the empty page
        assert_eq!(graph.adjacency[4], vec![0, 1, 2, 3]);
    }
}
