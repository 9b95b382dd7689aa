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

//! Extended / layered graph construction: the product of the physical
//! topology with the slice axis, restricted to currently free cells.

pub mod preprocess;

use std::collections::HashMap;

use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};

use crate::model::{Demand, Instance};

pub use preprocess::PreprocessingLevel;

/// A vertex of a layered graph: a (physical node label, slice index) pair.
pub type Vertex = (usize, usize);

/// The data carried by one arc of a layered graph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcData {
    /// Id of the physical link this arc was lifted from.
    pub link: usize,
    /// Slice index preserved across both endpoints of the arc.
    pub slice: usize,
    /// Physical length of the underlying link.
    pub length: f64,
    /// True once a solver has marked this arc as part of the chosen path.
    pub on_path: bool,
}

/// The extended graph built for a single pending demand.
#[derive(Debug, Clone)]
pub struct LayeredGraph {
    demand: Demand,
    graph: StableDiGraph<Vertex, ArcData>,
    index: HashMap<Vertex, NodeIndex>,
}

impl LayeredGraph {
    /// Builds the layered graph for `demand` against the current occupancy
    /// state of `instance`. For every free slice of every link, two arcs are
    /// created (one per direction), both preserving the slice index.
    pub fn build(instance: &Instance, demand: &Demand) -> Self {
        let mut graph = StableDiGraph::new();
        let mut index = HashMap::new();

        let mut get_node = |graph: &mut StableDiGraph<Vertex, ArcData>,
                             index: &mut HashMap<Vertex, NodeIndex>,
                             v: Vertex| {
            *index.entry(v).or_insert_with(|| graph.add_node(v))
        };

        for link in instance.links() {
            let (u, v) = (link.source(), link.target());
            for (slice, cell) in link.spectrum().iter().enumerate() {
                if !cell.is_free() {
                    continue;
                }
                let arc = ArcData {
                    link: link.id(),
                    slice,
                    length: link.length(),
                    on_path: false,
                };
                let nu = get_node(&mut graph, &mut index, (u, slice));
                let nv = get_node(&mut graph, &mut index, (v, slice));
                graph.add_edge(nu, nv, arc);
                graph.add_edge(nv, nu, arc);
            }
        }

        Self {
            demand: demand.clone(),
            graph,
            index,
        }
    }

    /// The demand this graph was built for.
    pub fn demand_id(&self) -> usize {
        self.demand.id()
    }

    /// The demand this graph was built for.
    pub fn demand(&self) -> &Demand {
        &self.demand
    }

    /// The demand's source node label.
    pub fn source(&self) -> usize {
        self.demand.source()
    }

    /// The demand's target node label.
    pub fn target(&self) -> usize {
        self.demand.target()
    }

    /// The underlying graph.
    pub fn graph(&self) -> &StableDiGraph<Vertex, ArcData> {
        &self.graph
    }

    /// Mutable access to the underlying graph, used by the preprocessor.
    pub fn graph_mut(&mut self) -> &mut StableDiGraph<Vertex, ArcData> {
        &mut self.graph
    }

    /// Every node index whose label matches `label`.
    pub fn nodes_with_label(&self, label: usize) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph
            .node_indices()
            .filter(move |&n| self.graph[n].0 == label)
    }

    /// Total number of arcs currently in the graph.
    pub fn arc_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Marks `edge` as lying on the chosen path.
    pub fn mark_on_path(&mut self, edge: EdgeIndex) {
        if let Some(w) = self.graph.edge_weight_mut(edge) {
            w.on_path = true;
        }
    }

    /// Every arc currently marked on-path, in arbitrary order.
    pub fn on_path_arcs(&self) -> impl Iterator<Item = &ArcData> + '_ {
        self.graph.edge_weights().filter(|a| a.on_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PhysicalLink;

    fn two_node_instance() -> Instance {
        let links = vec![PhysicalLink::new(0, 0, 1, 100.0, 4, 1.0)];
        Instance::new(2, links)
    }

    #[test]
    fn build_creates_arcs_for_every_free_slice_both_directions() {
        let inst = two_node_instance();
        let demand = Demand::new(0, 0, 1, 1, 200.0);
        let lg = LayeredGraph::build(&inst, &demand);
        // 4 slices, both directions => 8 arcs.
        assert_eq!(lg.arc_count(), 8);
        assert_eq!(lg.nodes_with_label(0).count(), 4);
    }
}
