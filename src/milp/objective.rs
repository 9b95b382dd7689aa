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

//! The five objective metrics a batch can be optimized for.

use petgraph::stable_graph::EdgeIndex;

use crate::layered::LayeredGraph;
use crate::model::Instance;

/// Which quantity the MILP/subgradient solvers minimize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectiveMetric {
    /// Favors low slice indices near the demand's source.
    LowestSliceFirst,
    /// Favors packing new demands against the highest slice already used.
    PackAgainstUsage,
    /// Minimizes hop count.
    HopCount,
    /// Minimizes total physical length.
    PhysicalLength,
    /// Like [`ObjectiveMetric::LowestSliceFirst`], but anchored to the
    /// network-wide maximum used slice rather than a per-link one.
    PackAgainstGlobalUsage,
}

impl ObjectiveMetric {
    /// Parses the metric names used in the parameters file: `1`, `1p`, `2`,
    /// `4`, `8`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "1" => Some(Self::LowestSliceFirst),
            "1p" => Some(Self::PackAgainstUsage),
            "2" => Some(Self::HopCount),
            "4" => Some(Self::PhysicalLength),
            "8" => Some(Self::PackAgainstGlobalUsage),
            _ => None,
        }
    }
}

/// The per-arc coefficient of the objective, for `edge` in `graph`.
pub fn arc_coefficient(
    metric: ObjectiveMetric,
    instance: &Instance,
    graph: &LayeredGraph,
    edge: EdgeIndex,
) -> f64 {
    let arc = graph.graph()[edge];
    let (u, _v) = graph.graph().edge_endpoints(edge).expect("edge exists");
    let u_label = graph.graph()[u].0;
    let source = graph.source();

    match metric {
        ObjectiveMetric::LowestSliceFirst => {
            if u_label == source {
                arc.slice as f64 + 1.0
            } else {
                1.0
            }
        }
        ObjectiveMetric::PackAgainstUsage => {
            let max_used = instance.links()[arc.link].max_used_slice();
            if arc.slice <= max_used {
                max_used as f64
            } else {
                arc.slice as f64
            }
        }
        ObjectiveMetric::HopCount => 1.0,
        ObjectiveMetric::PhysicalLength => arc.length,
        ObjectiveMetric::PackAgainstGlobalUsage => {
            let global_max = instance
                .links()
                .iter()
                .map(|l| l.max_used_slice())
                .max()
                .unwrap_or(0);
            if u_label == source {
                if arc.slice <= global_max {
                    global_max as f64 + 1.0
                } else {
                    arc.slice as f64 + 1.0
                }
            } else {
                1.0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Demand, PhysicalLink};

    #[test]
    fn hop_count_metric_is_constant() {
        let links = vec![PhysicalLink::new(0, 0, 1, 50.0, 2, 1.0)];
        let inst = Instance::new(2, links);
        let demand = Demand::new(0, 0, 1, 1, 100.0);
        let graph = LayeredGraph::build(&inst, &demand);
        let edge = graph.graph().edge_indices().next().unwrap();
        assert_eq!(arc_coefficient(ObjectiveMetric::HopCount, &inst, &graph, edge), 1.0);
    }

    #[test]
    fn physical_length_metric_matches_link_length() {
        let links = vec![PhysicalLink::new(0, 0, 1, 50.0, 2, 1.0)];
        let inst = Instance::new(2, links);
        let demand = Demand::new(0, 0, 1, 1, 100.0);
        let graph = LayeredGraph::build(&inst, &demand);
        let edge = graph.graph().edge_indices().next().unwrap();
        assert_eq!(
            arc_coefficient(ObjectiveMetric::PhysicalLength, &inst, &graph, edge),
            50.0
        );
    }
}
