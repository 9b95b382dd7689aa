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

//! Lagrangian subgradient solver for the single-demand Constrained Shortest
//! Path: relaxes the length constraint into the objective and alternates
//! shortest-path computation with multiplier updates.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use petgraph::stable_graph::{EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use crate::error::{CspInfeasible, RsaError};
use crate::layered::LayeredGraph;
use crate::milp::ObjectiveMetric;
use crate::model::{Instance, EPSILON};

/// Denominator floor for the step-size formula, avoiding division blow-up
/// when the current path's slack is (near) zero. See DESIGN.md's resolution
/// of the step-size open question.
const MIN_STEP_DENOMINATOR: f64 = 1e-6;

/// Stand-in for "no feasible path found yet", used in place of the
/// infinite upper bound the relaxation starts with. Large enough that the
/// step-size numerator stays meaningfully signed, small enough to never
/// overflow when multiplied by `lambda`.
const UB_SENTINEL: f64 = f64::MAX / 2.0;

/// Tunables read from the parameters file.
#[derive(Debug, Clone, Copy)]
pub struct SubgradientConfig {
    /// u_0: initial Lagrangian multiplier.
    pub multiplier_zero: f64,
    /// lambda_0: initial step-size damping factor.
    pub lambda_zero: f64,
    /// Number of iterations without an LB improvement before halving lambda.
    pub nb_iterations_without_improvement: usize,
    /// Hard cap on the number of iterations.
    pub max_nb_iterations: usize,
}

/// Terminal state of a [`solve`] invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverState {
    /// `LB >= UB - epsilon`: the incumbent path is provably optimal.
    Optimal,
    /// The iteration cap was reached before converging.
    Exhausted,
}

/// The outcome of solving one demand's CSP.
#[derive(Debug, Clone)]
pub struct SubgradientOutcome {
    /// Why iteration stopped.
    pub state: SolverState,
    /// Best known lower bound at termination.
    pub lower_bound: f64,
    /// Best known upper bound (cost of the incumbent path) at termination.
    pub upper_bound: f64,
    /// Number of iterations run.
    pub iterations: usize,
}

/// Solves the demand's CSP in-place: on success, `graph` has every arc of
/// the incumbent path marked on-path via [`LayeredGraph::mark_on_path`].
pub fn solve(
    graph: &mut LayeredGraph,
    instance: &Instance,
    metric: ObjectiveMetric,
    config: &SubgradientConfig,
) -> Result<SubgradientOutcome, RsaError> {
    let demand_id = graph.demand_id();
    let max_length = graph.demand().max_length();

    let base_cost: HashMap<EdgeIndex, f64> = graph
        .graph()
        .edge_indices()
        .map(|e| (e, crate::milp::objective::arc_coefficient(metric, instance, graph, e)))
        .collect();
    let length: HashMap<EdgeIndex, f64> = graph
        .graph()
        .edge_indices()
        .map(|e| (e, graph.graph()[e].length))
        .collect();

    let mut multiplier = config.multiplier_zero;
    let mut lambda = config.lambda_zero;
    let mut lb = f64::MIN;
    let mut ub = UB_SENTINEL;
    let mut it_without_improvement = 0usize;
    let mut iteration = 0usize;
    let mut incumbent: Option<Vec<EdgeIndex>> = None;

    loop {
        let cost: HashMap<EdgeIndex, f64> = base_cost
            .iter()
            .map(|(&e, &c)| (e, c + multiplier * length[&e]))
            .collect();

        let (dist, pred) = dijkstra(graph, &cost);
        let target_node = best_target(graph, &dist).ok_or(CspInfeasible::Unreachable(demand_id))?;
        let path = reconstruct(graph, &pred, target_node);

        let dist_t = dist[&target_node];
        let current_cost = dist_t - max_length * multiplier;
        let path_length: f64 = path.iter().map(|e| length[e]).sum();
        let path_cost: f64 = path.iter().map(|e| base_cost[e]).sum();
        let slack = max_length - path_length;

        if iteration == 0 && slack < -EPSILON {
            // first path is infeasible: fall back to a pure-length shortest
            // path to decide overall feasibility, mirroring testFeasibility.
            let (len_dist, len_pred) = dijkstra(graph, &length);
            let len_target = best_target(graph, &len_dist).ok_or(CspInfeasible::Unreachable(demand_id))?;
            if len_dist[&len_target] >= max_length + EPSILON {
                return Err(CspInfeasible::LengthExceeded(demand_id, len_dist[&len_target], max_length).into());
            }
            let len_path = reconstruct(graph, &len_pred, len_target);
            let len_path_cost: f64 = len_path.iter().map(|e| base_cost[e]).sum();
            ub = ub.min(len_path_cost);
            incumbent = Some(len_path);
        } else if slack >= -EPSILON && path_cost < ub {
            ub = path_cost;
            incumbent = Some(path.clone());
        }

        if current_cost > lb {
            lb = current_cost;
            it_without_improvement = 0;
        } else {
            it_without_improvement += 1;
        }

        log::debug!(
            "demand {demand_id} iter {iteration}: LB={lb:.3} UB={ub:.3} slack={slack:.3} u={multiplier:.4} lambda={lambda:.4}"
        );

        if lb >= ub - EPSILON {
            commit(graph, &incumbent);
            return Ok(SubgradientOutcome {
                state: SolverState::Optimal,
                lower_bound: lb,
                upper_bound: ub,
                iterations: iteration,
            });
        }
        if iteration >= config.max_nb_iterations {
            commit(graph, &incumbent);
            return Ok(SubgradientOutcome {
                state: SolverState::Exhausted,
                lower_bound: lb,
                upper_bound: ub,
                iterations: iteration,
            });
        }

        let denom = (slack * slack).max(MIN_STEP_DENOMINATOR);
        let step_size = lambda * (ub - current_cost) / denom;
        multiplier = (multiplier + step_size * (-slack)).max(0.0);

        if it_without_improvement >= config.nb_iterations_without_improvement {
            lambda /= 2.0;
            it_without_improvement = 0;
        }

        iteration += 1;
    }
}

/// Marks every arc of the incumbent path as on-path, if one was found.
fn commit(graph: &mut LayeredGraph, incumbent: &Option<Vec<EdgeIndex>>) {
    if let Some(path) = incumbent {
        for &e in path {
            graph.mark_on_path(e);
        }
    }
}

/// The target-labeled node with the smallest recorded distance, if any was
/// reached.
fn best_target(graph: &LayeredGraph, dist: &HashMap<NodeIndex, f64>) -> Option<NodeIndex> {
    graph
        .nodes_with_label(graph.target())
        .filter_map(|n| dist.get(&n).map(|&d| (n, d)))
        .min_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(Ordering::Equal))
        .map(|(n, _)| n)
}

/// Min-heap entry ordered by ascending distance.
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

/// Multi-source Dijkstra from every node labeled with the demand's source,
/// weighted by `cost`. Acts as the "contract all source-label nodes into
/// one" step of the original implementation without mutating the graph.
fn dijkstra(
    graph: &LayeredGraph,
    cost: &HashMap<EdgeIndex, f64>,
) -> (HashMap<NodeIndex, f64>, HashMap<NodeIndex, EdgeIndex>) {
    let mut dist: HashMap<NodeIndex, f64> = HashMap::new();
    let mut pred: HashMap<NodeIndex, EdgeIndex> = HashMap::new();
    let mut heap = BinaryHeap::new();

    for n in graph.nodes_with_label(graph.source()) {
        dist.insert(n, 0.0);
        heap.push(HeapEntry(0.0, n));
    }

    while let Some(HeapEntry(d, u)) = heap.pop() {
        if dist.get(&u).is_some_and(|&best| d > best) {
            continue;
        }
        for edge in graph.graph().edges_directed(u, Direction::Outgoing) {
            let v = edge.target();
            let w = cost[&edge.id()];
            let nd = d + w;
            let better = match dist.get(&v) {
                Some(&best) => nd < best,
                None => true,
            };
            if better {
                dist.insert(v, nd);
                pred.insert(v, edge.id());
                heap.push(HeapEntry(nd, v));
            }
        }
    }
    (dist, pred)
}

/// Walks `pred` back from `target` to any source-labeled node, returning
/// the arcs of the path in source-to-target order.
fn reconstruct(
    graph: &LayeredGraph,
    pred: &HashMap<NodeIndex, EdgeIndex>,
    target: NodeIndex,
) -> Vec<EdgeIndex> {
    let mut path = Vec::new();
    let mut n = target;
    while graph.graph()[n].0 != graph.source() {
        let Some(&edge) = pred.get(&n) else { break };
        let (u, _) = graph.graph().edge_endpoints(edge).expect("edge exists");
        path.push(edge);
        n = u;
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use test_log::test;

    use super::*;
    use crate::layered::preprocess::{preprocess, PreprocessingLevel};
    use crate::model::{Demand, PhysicalLink};

    fn default_config() -> SubgradientConfig {
        SubgradientConfig {
            multiplier_zero: 0.0,
            lambda_zero: 1.0,
            nb_iterations_without_improvement: 5,
            max_nb_iterations: 50,
        }
    }

    #[test]
    fn direct_link_is_optimal_at_first_iteration() {
        let links = vec![
            PhysicalLink::new(0, 0, 1, 100.0, 4, 1.0),
            PhysicalLink::new(1, 1, 2, 100.0, 4, 1.0),
            PhysicalLink::new(2, 0, 2, 100.0, 4, 1.0),
        ];
        let inst = Instance::new(3, links);
        let demand = Demand::new(0, 0, 2, 1, 150.0);
        let mut lg = LayeredGraph::build(&inst, &demand);
        preprocess(&mut lg, &inst, PreprocessingLevel::None);
        let outcome = solve(&mut lg, &inst, ObjectiveMetric::PhysicalLength, &default_config()).unwrap();
        assert_eq!(outcome.state, SolverState::Optimal);
        assert_relative_eq!(outcome.lower_bound, outcome.upper_bound, epsilon = 1.0, max_relative = 1e-2);
        assert_eq!(lg.on_path_arcs().count(), 1);
    }

    #[test]
    fn two_node_direct_link_routes_on_first_free_slice() {
        let links = vec![PhysicalLink::new(0, 0, 1, 100.0, 4, 1.0)];
        let inst = Instance::new(2, links);
        let demand = Demand::new(0, 0, 1, 1, 200.0);
        let mut lg = LayeredGraph::build(&inst, &demand);
        preprocess(&mut lg, &inst, PreprocessingLevel::None);
        let outcome = solve(&mut lg, &inst, ObjectiveMetric::LowestSliceFirst, &default_config()).unwrap();
        assert_eq!(outcome.state, SolverState::Optimal);
        let arcs: Vec<_> = lg.on_path_arcs().collect();
        assert_eq!(arcs.len(), 1);
        assert_eq!(arcs[0].slice, 0);
    }

    #[test]
    fn unreachable_target_is_infeasible() {
        let links = vec![PhysicalLink::new(0, 0, 1, 100.0, 4, 1.0)];
        let inst = Instance::new(3, links);
        let demand = Demand::new(0, 0, 2, 1, 500.0);
        let mut lg = LayeredGraph::build(&inst, &demand);
        let err = solve(&mut lg, &inst, ObjectiveMetric::PhysicalLength, &default_config()).unwrap_err();
        assert!(matches!(err, RsaError::CspInfeasible(CspInfeasible::Unreachable(0))));
    }
}
