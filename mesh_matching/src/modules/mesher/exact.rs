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

use std::collections::VecDeque;

use log::debug;
use rand::Rng;

use super::{graph::CompatibilityGraph, MeshPair, MesherModule};
use crate::{MeshError, PageSet};

const NONE: usize = usize::MAX;

/// Maximum cardinality meshing.
///
/// Computes a maximum matching of the compatibility graph with Edmonds'
/// blossom algorithm, so no pairwise strategy can ever find more meshes on
/// the same records. Runs in `O(n^3)` and is meant for offline validation of
/// small and medium batches.
#[derive(Clone, Debug, Default)]
pub struct ExactMesherModule;

impl ExactMesherModule {
    pub fn new() -> Self {
        Self
    }
}

impl MesherModule for ExactMesherModule {
    fn name(&self) -> &'static str {
        "exact"
    }

    fn mesh<R: Rng + ?Sized>(
        &mut self,
        set: &mut PageSet,
        _rng: &mut R,
    ) -> Result<Vec<MeshPair>, MeshError> {
        let graph = CompatibilityGraph::build(set, set.unmatched_ids());
        let mate = maximum_matching(&graph.adjacency);

        let mut pairs = Vec::new();
        for (v, &m) in mate.iter().enumerate() {
            if m != NONE && v < m {
                let (a, b) = (graph.ids[v], graph.ids[m]);
                set.mark_matched(a, b);
                pairs.push((a, b));
            }
        }

        debug!(
            "exact: found {} meshes among {} records",
            pairs.len(),
            graph.vertex_count()
        );

        Ok(pairs)
    }
}

/// Returns the mate of every vertex (`NONE` if unmatched) of a maximum
/// matching of the graph given by `adjacency`.
fn maximum_matching(adjacency: &[Vec<usize>]) -> Vec<usize> {
    let mut state = BlossomState::new(adjacency);

    // a greedy start matching saves most augmenting path searches
    for v in 0..state.n {
        if state.mate[v] == NONE {
            if let Some(&u) = adjacency[v].iter().find(|u| state.mate[**u] == NONE) {
                state.mate[v] = u;
                state.mate[u] = v;
            }
        }
    }

    for root in 0..state.n {
        if state.mate[root] == NONE {
            if let Some(end) = state.find_augmenting_path(root) {
                state.augment(end);
            }
        }
    }

    state.mate
}

struct BlossomState<'a> {
    adjacency: &'a [Vec<usize>],
    n: usize,
    mate: Vec<usize>,

    /// predecessor on the alternating tree
    parent: Vec<usize>,

    /// base vertex of the blossom a vertex currently belongs to
    base: Vec<usize>,

    /// vertex is an even (outer) vertex of the current tree
    used: Vec<bool>,
    in_blossom: Vec<bool>,
    queue: VecDeque<usize>,
}

impl<'a> BlossomState<'a> {
    fn new(adjacency: &'a [Vec<usize>]) -> Self {
        let n = adjacency.len();
        BlossomState {
            adjacency,
            n,
            mate: vec![NONE; n],
            parent: vec![NONE; n],
            base: (0..n).collect(),
            used: vec![false; n],
            in_blossom: vec![false; n],
            queue: VecDeque::new(),
        }
    }

    /// Lowest common ancestor of the blossom bases of `a` and `b`
    fn lowest_common_ancestor(&self, mut a: usize, mut b: usize) -> usize {
        let mut on_path = vec![false; self.n];
        loop {
            a = self.base[a];
            on_path[a] = true;
            if self.mate[a] == NONE {
                break;
            }
            a = self.parent[self.mate[a]];
        }
        loop {
            b = self.base[b];
            if on_path[b] {
                return b;
            }
            b = self.parent[self.mate[b]];
        }
    }

    fn mark_path(&mut self, mut v: usize, blossom_base: usize, mut child: usize) {
        while self.base[v] != blossom_base {
            self.in_blossom[self.base[v]] = true;
            self.in_blossom[self.base[self.mate[v]]] = true;
            self.parent[v] = child;
            child = self.mate[v];
            v = self.parent[self.mate[v]];
        }
    }

    /// BFS over alternating paths starting at the unmatched vertex `root`.
    /// Returns the unmatched end of an augmenting path if there is one.
    fn find_augmenting_path(&mut self, root: usize) -> Option<usize> {
        self.used.iter_mut().for_each(|u| *u = false);
        self.parent.iter_mut().for_each(|p| *p = NONE);
        for (i, b) in self.base.iter_mut().enumerate() {
            *b = i;
        }
        self.queue.clear();

        self.used[root] = true;
        self.queue.push_back(root);

        let adjacency = self.adjacency;
        while let Some(v) = self.queue.pop_front() {
            for &to in &adjacency[v] {
                if self.base[v] == self.base[to] || self.mate[v] == to {
                    continue;
                }

                if to == root || (self.mate[to] != NONE && self.parent[self.mate[to]] != NONE) {
                    // odd cycle: contract the blossom
                    let blossom_base = self.lowest_common_ancestor(v, to);
                    self.in_blossom.iter_mut().for_each(|b| *b = false);
                    self.mark_path(v, blossom_base, to);
                    self.mark_path(to, blossom_base, v);

                    for i in 0..self.n {
                        if self.in_blossom[self.base[i]] {
                            self.base[i] = blossom_base;
                            if !self.used[i] {
                                self.used[i] = true;
                                self.queue.push_back(i);
                            }
                        }
                    }
                } else if self.parent[to] == NONE {
                    self.parent[to] = v;
                    if self.mate[to] == NONE {
                        return Some(to);
                    }
                    let next = self.mate[to];
                    self.used[next] = true;
                    self.queue.push_back(next);
                }
            }
        }

        None
    }

    /// Flips the matched and unmatched edges along the path ending in `v`
    fn augment(&mut self, mut v: usize) {
        while v != NONE {
            let pv = self.parent[v];
            let ppv = self.mate[pv];
            self.mate[v] = pv;
            self.mate[pv] = v;
            v = ppv;
        }
    }
}

#[cfg(test)]
mod test {
    use rand::{rngs::SmallRng, SeedableRng};

    use super::{maximum_matching, ExactMesherModule, NONE};
    use crate::{
        modules::mesher::{test::*, GreedyMesherModule, MesherModule},
        PageSet,
    };

    fn matching_size(adjacency: &[Vec<usize>]) -> usize {
        let mate = maximum_matching(adjacency);
        for (v, m) in mate.iter().enumerate() {
            if *m != NONE {
                assert_eq!(mate[*m], v, "mate is not symmetric");
                assert!(adjacency[v].contains(m), "matched along missing edge");
            }
        }
        mate.iter().filter(|m| **m != NONE).count() / 2
    }

    fn undirected(n: usize, edges: &[(usize, usize)]) -> Vec<Vec<usize>> {
        let mut adjacency = vec![Vec::new(); n];
        for (a, b) in edges {
            adjacency[*a].push(*b);
            adjacency[*b].push(*a);
        }
        adjacency
    }

    #[test]
    fn test_path_needs_augmentation() {
        // path 1-0-2-3, the greedy start only takes 0-2
        let adjacency = undirected(4, &[(0, 2), (1, 0), (2, 3)]);
        assert_eq!(matching_size(&adjacency), 2);
    }

    #[test]
    fn test_blossom() {
        // triangle 0-1-2 with a tail 2-3 and 0-4, 1-5
        let adjacency = undirected(6, &[(0, 1), (1, 2), (2, 0), (2, 3), (0, 4), (1, 5)]);
        assert_eq!(matching_size(&adjacency), 3);

        // odd cycle of length 5 with a pendant vertex
        let adjacency = undirected(6, &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 0), (4, 5)]);
        assert_eq!(matching_size(&adjacency), 3);
    }

    #[test]
    fn test_exact_beats_greedy_order() {
        // greedy meshes 0001 with 1000 and strands the rest
        let mut set = PageSet::from_bitmaps(["0001", "1000", "0111", "1110"]).unwrap();
        let mut rng = SmallRng::seed_from_u64(SEED);

        let mut greedy_set = set.clone();
        let greedy = GreedyMesherModule::new().mesh(&mut greedy_set, &mut rng).unwrap();
        assert_eq!(greedy.len(), 1);

        let pairs = ExactMesherModule::new().mesh(&mut set, &mut rng).unwrap();
        assert_eq!(pairs.len(), 2);
        check_pairs(&set, &pairs);
    }

    #[test]
    fn test_exact_dominates_greedy() {
        let mut rng = SmallRng::seed_from_u64(SEED);
        for _ in 0..20 {
            let set = random_set(&mut rng, 32, 60, 0.25);

            let mut exact_set = set.clone();
            let exact = ExactMesherModule::new().mesh(&mut exact_set, &mut rng).unwrap();
            check_pairs(&exact_set, &exact);

            let mut greedy_set = set.clone();
            let greedy = GreedyMesherModule::new().mesh(&mut greedy_set, &mut rng).unwrap();
            assert!(exact.len() >= greedy.len());
        }
    }

    #[test]
    fn test_exact_soundness() {
        test_mesher_soundness(ExactMesherModule::new);
        test_mesher_degenerate(ExactMesherModule::new);
    }
}
