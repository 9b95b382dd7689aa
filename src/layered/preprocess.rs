// Online routing and spectrum allocation for elastic optical networks.
//
// This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation; either version 2 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along
// with this program; if not, write to the Free Software Foundation, Inc.,
// 51 Franklin Street, Fifth Floor, Boston, MA 02110-1301 USA.

//! Pruning passes that remove arcs which cannot belong to any feasible
//! routing of a demand, at three progressively stronger levels.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use petgraph::stable_graph::{EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use crate::model::{Instance, EPSILON};

use super::LayeredGraph;

/// How aggressively to prune a layered graph before handing it to a solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PreprocessingLevel {
    /// Only load- and endpoint-infeasible arcs are removed.
    None,
    /// [`PreprocessingLevel::None`] plus a single length-feasibility pass.
    Partial,
    /// [`PreprocessingLevel::None`] plus length-feasibility passes repeated
    /// to a fixed point.
    Full,
}

/// Runs the preprocessor configured by `level` against `graph`, using
/// `instance` to re-check slice-window availability.
pub fn preprocess(graph: &mut LayeredGraph, instance: &Instance, level: PreprocessingLevel) {
    erase_non_routable_arcs(graph, instance);
    if level >= PreprocessingLevel::Partial {
        length_preprocessing_pass(graph);
    }
    if level == PreprocessingLevel::Full {
        loop {
            let erased = length_preprocessing_pass(graph);
            log::debug!(
                "full preprocessing pass for demand {}: erased {erased} arcs, {} remain",
                graph.demand_id(),
                graph.arc_count()
            );
            if erased == 0 {
                break;
            }
        }
    }
}

/// Removes arcs that cannot carry this demand's load, and arcs that leave
/// the target or enter the source (which can never lie on a simple path).
fn erase_non_routable_arcs(graph: &mut LayeredGraph, instance: &Instance) {
    let demand = graph.demand().clone();
    let source = graph.source();
    let target = graph.target();
    let to_remove: Vec<EdgeIndex> = graph
        .graph()
        .edge_indices()
        .filter(|&e| {
            let (u, v) = graph.graph().edge_endpoints(e).expect("edge exists");
            let arc = graph.graph()[e];
            let u_label = graph.graph()[u].0;
            let v_label = graph.graph()[v].0;
            !instance.has_enough_space(arc.link, arc.slice, &demand)
                || u_label == target
                || v_label == source
        })
        .collect();
    for e in to_remove {
        graph.graph_mut().remove_edge(e);
    }
}

/// A single length-feasibility sweep: erases arcs whose best possible
/// through-length exceeds the demand's budget. Returns the number of arcs
/// erased (either individually, or as part of a whole-slice erasure).
fn length_preprocessing_pass(graph: &mut LayeredGraph) -> usize {
    let max_length = graph.demand().max_length();
    let source = graph.source();
    let target = graph.target();

    let sources: Vec<NodeIndex> = graph.nodes_with_label(source).collect();
    let targets: Vec<NodeIndex> = graph.nodes_with_label(target).collect();

    let dist_from_source = shortest_distances(graph, &sources, Direction::Outgoing);
    let dist_to_target = shortest_distances(graph, &targets, Direction::Incoming);

    let mut to_remove: Vec<EdgeIndex> = Vec::new();
    let mut slices_to_erase: Vec<usize> = Vec::new();

    for e in graph.graph().edge_indices() {
        let (u, v) = graph.graph().edge_endpoints(e).expect("edge exists");
        let arc = graph.graph()[e];
        match (dist_from_source.get(&u), dist_to_target.get(&v)) {
            (Some(&du), Some(&dv)) => {
                if du + arc.length + dv > max_length + EPSILON {
                    to_remove.push(e);
                }
            }
            _ => slices_to_erase.push(arc.slice),
        }
    }

    let mut erased = 0;
    if !slices_to_erase.is_empty() {
        erased += erase_slices(graph, &slices_to_erase);
    }
    for e in to_remove {
        if graph.graph_mut().remove_edge(e).is_some() {
            erased += 1;
        }
    }
    erased
}

/// Removes every arc whose slice index is in `slices`.
fn erase_slices(graph: &mut LayeredGraph, slices: &[usize]) -> usize {
    let set: std::collections::HashSet<usize> = slices.iter().copied().collect();
    let to_remove: Vec<EdgeIndex> = graph
        .graph()
        .edge_indices()
        .filter(|&e| set.contains(&graph.graph()[e].slice))
        .collect();
    let n = to_remove.len();
    for e in to_remove {
        graph.graph_mut().remove_edge(e);
    }
    n
}

/// Min-heap entry ordered by ascending distance (graphs here never carry
/// NaN weights, so a total order via `partial_cmp` is safe).
struct HeapEntry(f64, NodeIndex);

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}
impl Eq for HeapEntry {}
impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other.0.partial_cmp(&self.0).unwrap_or(Ordering::Equal)
    }
}

/// Multi-source Dijkstra seeded at distance 0 from every node in `starts`,
/// following arcs in `direction` (Outgoing for a forward search from the
/// demand's source layer, Incoming for a backward search into the target
/// layer).
fn shortest_distances(
    graph: &LayeredGraph,
    starts: &[NodeIndex],
    direction: Direction,
) -> HashMap<NodeIndex, f64> {
    let mut dist: HashMap<NodeIndex, f64> = HashMap::new();
    let mut heap = BinaryHeap::new();
    for &s in starts {
        dist.insert(s, 0.0);
        heap.push(HeapEntry(0.0, s));
    }
    while let Some(HeapEntry(d, u)) = heap.pop() {
        if dist.get(&u).is_some_and(|&best| d > best) {
            continue;
        }
        for edge in graph.graph().edges_directed(u, direction) {
            let v = if direction == Direction::Outgoing {
                edge.target()
            } else {
                edge.source()
            };
            let nd = d + edge.weight().length;
            let better = match dist.get(&v) {
                Some(&best) => nd < best,
                None => true,
            };
            if better {
                dist.insert(v, nd);
                heap.push(HeapEntry(nd, v));
            }
        }
    }
    dist
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Demand, PhysicalLink};

    fn triangle() -> Instance {
        let links = vec![
            PhysicalLink::new(0, 0, 1, 100.0, 4, 1.0),
            PhysicalLink::new(1, 1, 2, 100.0, 4, 1.0),
            PhysicalLink::new(2, 0, 2, 100.0, 4, 1.0),
        ];
        Instance::new(3, links)
    }

    #[test]
    fn full_preprocessing_prunes_infeasible_detour() {
        let inst = triangle();
        // maxLength just enough for the direct 0-2 link, not the 0-1-2 detour.
        let demand = Demand::new(0, 0, 2, 1, 150.0);
        let mut lg = LayeredGraph::build(&inst, &demand);
        preprocess(&mut lg, &inst, PreprocessingLevel::Full);
        // only arcs on link 2 (the direct link) should remain.
        assert!(lg.graph().edge_weights().all(|a| a.link == 2));
    }

    #[test]
    fn full_preprocessing_erases_everything_when_infeasible() {
        let links = vec![
            PhysicalLink::new(0, 0, 1, 1000.0, 2, 1.0),
            PhysicalLink::new(1, 1, 2, 1000.0, 2, 1.0),
            PhysicalLink::new(2, 2, 3, 1000.0, 2, 1.0),
        ];
        let inst = Instance::new(4, links);
        let demand = Demand::new(0, 0, 3, 1, 1500.0);
        let mut lg = LayeredGraph::build(&inst, &demand);
        preprocess(&mut lg, &inst, PreprocessingLevel::Full);
        assert_eq!(lg.arc_count(), 0);
    }
}
