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

//! The multi-commodity 0/1 flow formulation of routing-and-spectrum
//! assignment, solved with `good_lp` over the CBC backend.

pub mod objective;

use std::collections::HashMap;

use good_lp::{
    constraint,
    solvers::coin_cbc::{coin_cbc as create_solver, CoinCbcProblem},
    variable, Expression, ProblemVariables, ResolutionError, Solution, SolverModel, Variable,
};
use petgraph::stable_graph::EdgeIndex;
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use petgraph::Direction;

pub use objective::ObjectiveMetric;

use crate::error::{MilpNonOptimal, RsaError};
use crate::layered::LayeredGraph;
use crate::model::Instance;

/// Decision variables of the formulation, grouped by demand position within
/// the batch (not by demand id, since a batch only ever contains a subset of
/// the pool).
struct IlpVars {
    /// `x[i][edge]` for the `i`-th graph in the batch.
    x: Vec<HashMap<EdgeIndex, Variable>>,
}

/// Solves one batch of layered graphs jointly. On success, every graph has
/// had [`LayeredGraph::mark_on_path`] called for each arc selected by the
/// optimal solution.
pub fn solve_batch(
    graphs: &mut [LayeredGraph],
    instance: &Instance,
    metric: ObjectiveMetric,
    hide_output: bool,
) -> Result<(), RsaError> {
    log::info!("building MILP model for a batch of {} demands", graphs.len());
    let (vars, problem) = setup_vars(graphs);

    let objective = build_objective(&vars, graphs, instance, metric);
    let mut problem = create_solver(problem.minimise(objective));

    if hide_output {
        problem.set_parameter("logLevel", "0");
    }
    #[cfg(feature = "cbc-parallel")]
    problem.set_parameter("threads", &format!("{}", num_cpus::get()));

    let rows_before = problem.as_inner().num_rows();
    setup_constraints(&mut problem, &vars, graphs);
    log::debug!(
        "{} equations added for this batch",
        problem.as_inner().num_rows() - rows_before
    );

    log::info!("solving the MILP model...");
    let solution = match problem.solve() {
        Ok(s) => s,
        Err(ResolutionError::Infeasible) => {
            return Err(MilpNonOptimal {
                status: "Infeasible".to_string(),
            }
            .into())
        }
        Err(e) => {
            return Err(MilpNonOptimal {
                status: format!("{e:?}"),
            }
            .into())
        }
    };

    for (i, graph) in graphs.iter_mut().enumerate() {
        for (&edge, &var) in &vars.x[i] {
            if solution.value(var) >= 0.9 {
                graph.mark_on_path(edge);
            }
        }
    }
    log::info!("batch solved to optimality");
    Ok(())
}

/// Creates one binary variable per arc of every graph in the batch.
fn setup_vars(graphs: &[LayeredGraph]) -> (IlpVars, ProblemVariables) {
    let mut problem = ProblemVariables::new();
    let p = &mut problem;
    let x = graphs
        .iter()
        .map(|g| {
            g.graph()
                .edge_indices()
                .map(|e| (e, p.add(variable().binary())))
                .collect::<HashMap<_, _>>()
        })
        .collect();
    (IlpVars { x }, problem)
}

/// Sums every arc's objective coefficient times its decision variable, over
/// every graph in the batch.
fn build_objective(
    vars: &IlpVars,
    graphs: &[LayeredGraph],
    instance: &Instance,
    metric: ObjectiveMetric,
) -> Expression {
    let mut objective = Expression::from(0.0);
    for (i, graph) in graphs.iter().enumerate() {
        for edge in graph.graph().edge_indices() {
            let coeff = objective::arc_coefficient(metric, instance, graph, edge);
            objective += coeff * vars.x[i][&edge];
        }
    }
    objective
}

/// Adds every constraint family to `problem`.
fn setup_constraints(problem: &mut CoinCbcProblem, vars: &IlpVars, graphs: &[LayeredGraph]) {
    setup_source_constraints(problem, vars, graphs);
    setup_flow_conservation_constraints(problem, vars, graphs);
    setup_target_constraints(problem, vars, graphs);
    setup_length_constraints(problem, vars, graphs);
    setup_non_overlapping_constraints(problem, vars, graphs);
}

/// For every node label, bounds the number of outgoing arcs selected: 1 at
/// the source, 0 at the target (a path never leaves its own target), at
/// most 1 elsewhere.
fn setup_source_constraints(problem: &mut CoinCbcProblem, vars: &IlpVars, graphs: &[LayeredGraph]) {
    for (i, graph) in graphs.iter().enumerate() {
        let labels: std::collections::HashSet<usize> =
            graph.graph().node_weights().map(|&(label, _)| label).collect();
        for label in labels {
            let expr: Expression = graph
                .nodes_with_label(label)
                .flat_map(|n| graph.graph().edges_directed(n, Direction::Outgoing))
                .map(|e| Expression::from(vars.x[i][&e.id()]))
                .sum();
            if label == graph.source() {
                problem.add_constraint(constraint!(expr.clone() == 1));
            } else if label == graph.target() {
                problem.add_constraint(constraint!(expr.clone() == 0));
            } else {
                problem.add_constraint(constraint!(expr.clone() <= 1));
            }
        }
    }
}

/// At every non-source, non-target node, requires inflow to equal outflow.
fn setup_flow_conservation_constraints(
    problem: &mut CoinCbcProblem,
    vars: &IlpVars,
    graphs: &[LayeredGraph],
) {
    for (i, graph) in graphs.iter().enumerate() {
        for n in graph.graph().node_indices() {
            let label = graph.graph()[n].0;
            if label == graph.source() || label == graph.target() {
                continue;
            }
            let out_expr: Expression = graph
                .graph()
                .edges_directed(n, Direction::Outgoing)
                .map(|e| Expression::from(vars.x[i][&e.id()]))
                .sum();
            let in_expr: Expression = graph
                .graph()
                .edges_directed(n, Direction::Incoming)
                .map(|e| Expression::from(vars.x[i][&e.id()]))
                .sum();
            problem.add_constraint(constraint!(out_expr - in_expr == 0));
        }
    }
}

/// Requires exactly one arc to enter a target-labeled node.
fn setup_target_constraints(problem: &mut CoinCbcProblem, vars: &IlpVars, graphs: &[LayeredGraph]) {
    for (i, graph) in graphs.iter().enumerate() {
        let expr: Expression = graph
            .nodes_with_label(graph.target())
            .flat_map(|n| graph.graph().edges_directed(n, Direction::Incoming))
            .map(|e| Expression::from(vars.x[i][&e.id()]))
            .sum();
        problem.add_constraint(constraint!(expr == 1));
    }
}

/// Bounds the selected path's total physical length by the demand's budget.
fn setup_length_constraints(problem: &mut CoinCbcProblem, vars: &IlpVars, graphs: &[LayeredGraph]) {
    for (i, graph) in graphs.iter().enumerate() {
        let expr: Expression = graph
            .graph()
            .edge_references()
            .map(|e| e.weight().length * vars.x[i][&e.id()])
            .sum();
        problem.add_constraint(constraint!(expr <= graph.demand().max_length()));
    }
}

/// For every unordered pair of demands in the batch, and every (link,slice)
/// cell touched by the first demand's graph, forbids the two demands from
/// both claiming overlapping slice windows on that link.
fn setup_non_overlapping_constraints(
    problem: &mut CoinCbcProblem,
    vars: &IlpVars,
    graphs: &[LayeredGraph],
) {
    for i in 0..graphs.len() {
        for j in (i + 1)..graphs.len() {
            add_non_overlap_pair(problem, vars, graphs, i, j);
            add_non_overlap_pair(problem, vars, graphs, j, i);
        }
    }
}

/// Adds, for every (link,slice) cell touched by `graphs[a]`, the constraint
/// that `a`'s usage of that cell plus `b`'s usage of the overlapping window
/// is at most 1.
fn add_non_overlap_pair(
    problem: &mut CoinCbcProblem,
    vars: &IlpVars,
    graphs: &[LayeredGraph],
    a: usize,
    b: usize,
) {
    let load_a = graphs[a].demand().load();
    let load_b = graphs[b].demand().load();

    let mut by_cell: HashMap<(usize, usize), Vec<EdgeIndex>> = HashMap::new();
    for e in graphs[a].graph().edge_references() {
        by_cell
            .entry((e.weight().link, e.weight().slice))
            .or_default()
            .push(e.id());
    }

    for (&(link, slice), a_edges) in &by_cell {
        let a_expr: Expression = a_edges.iter().map(|&e| Expression::from(vars.x[a][&e])).sum();
        let window_lo = slice.saturating_sub(load_a - 1);
        let window_hi = slice + load_b - 1;
        let b_expr: Expression = graphs[b]
            .graph()
            .edge_references()
            .filter(|e| {
                e.weight().link == link && e.weight().slice >= window_lo && e.weight().slice <= window_hi
            })
            .map(|e| Expression::from(vars.x[b][&e.id()]))
            .sum();
        problem.add_constraint(constraint!(a_expr + b_expr <= 1));
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::layered::preprocess::{preprocess, PreprocessingLevel};
    use crate::model::{Demand, PhysicalLink};

    #[test]
    fn milp_routes_around_preoccupied_direct_link() {
        let links = vec![
            PhysicalLink::new(0, 0, 1, 100.0, 4, 1.0),
            PhysicalLink::new(1, 1, 2, 100.0, 4, 1.0),
            PhysicalLink::new(2, 0, 2, 100.0, 2, 1.0),
        ];
        let mut inst = Instance::new(3, links);
        let blocker = Demand::new(0, 0, 2, 2, 100.0);
        inst.push_demand(blocker);
        inst.commit_path(
            0,
            &[crate::model::PathArc {
                link: 2,
                last_slice: 1,
            }],
        );

        let demand = Demand::new(1, 0, 2, 2, 250.0);
        let mut lg = LayeredGraph::build(&inst, &demand);
        preprocess(&mut lg, &inst, PreprocessingLevel::Full);
        let mut graphs = vec![lg];
        solve_batch(&mut graphs, &inst, ObjectiveMetric::PhysicalLength, true).expect("solvable");

        let used_links: std::collections::HashSet<usize> =
            graphs[0].on_path_arcs().map(|a| a.link).collect();
        pretty_assertions_sorted::assert_eq!(used_links, [0, 1].into_iter().collect());
    }

    #[test]
    fn two_demands_on_single_link_get_disjoint_slices() {
        let links = vec![PhysicalLink::new(0, 0, 1, 10.0, 2, 1.0)];
        let inst = Instance::new(2, links);
        let d1 = Demand::new(0, 0, 1, 1, 10.0);
        let d2 = Demand::new(1, 0, 1, 1, 10.0);
        let mut g1 = LayeredGraph::build(&inst, &d1);
        let mut g2 = LayeredGraph::build(&inst, &d2);
        preprocess(&mut g1, &inst, PreprocessingLevel::None);
        preprocess(&mut g2, &inst, PreprocessingLevel::None);
        let mut graphs = vec![g1, g2];
        solve_batch(&mut graphs, &inst, ObjectiveMetric::HopCount, true).expect("solvable");
        assert_eq!(graphs[0].on_path_arcs().count(), 1);
        assert_eq!(graphs[1].on_path_arcs().count(), 1);
    }
}
