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

//! Batch sequencing: ingests the initial mapping, then walks the online
//! demand folder file by file, routing demands `nbDemandsAtOnce` at a time
//! and snapshotting the occupancy state after every batch.

use rayon::prelude::*;

use crate::error::RsaError;
use crate::io::{csv_in, csv_out, Method, Parameters};
use crate::layered::{preprocess, LayeredGraph};
use crate::milp;
use crate::model::{Instance, PathArc};
use crate::subgradient::{self, SubgradientConfig};

/// Session-scoped sequencing state: every exported snapshot is tagged with
/// this monotonically increasing solve index, so artifacts never collide and
/// their order is recoverable from their names alone.
#[derive(Debug, Default)]
pub struct Driver {
    solve_counter: usize,
}

impl Driver {
    /// Starts a fresh run, with the solve counter at 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the initial instance from the link, demand and assignment
    /// files, and writes the counter-0 snapshot of that initial mapping.
    pub fn load_initial_instance(&mut self, params: &Parameters) -> Result<Instance, RsaError> {
        let (nb_nodes, links) = csv_in::read_topology(&params.link_file)?;
        let mut instance = Instance::new(nb_nodes, links);

        for demand in csv_in::read_demands(&params.demand_file)? {
            instance.push_demand(demand);
        }

        let violations = csv_in::read_assignment(&params.assignment_file, &mut instance)?;
        for v in &violations {
            log::warn!("{v}");
        }

        instance.set_nb_initial_demands(instance.nb_routed_demands());
        log::info!(
            "initial mapping: {} demands routed out of {}",
            instance.nb_routed_demands(),
            instance.nb_demands()
        );

        self.snapshot(params, &instance, "initial")?;
        Ok(instance)
    }

    /// Runs every online demand file in directory order against `instance`,
    /// snapshotting the occupancy state after every batch solved.
    pub fn run_online_phase(&mut self, params: &Parameters, instance: &mut Instance) -> Result<(), RsaError> {
        for path in params.online_demand_files()? {
            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("batch")
                .to_string();
            log::info!("ingesting online demand file {}", path.display());

            let new_demands = csv_in::read_online_demands(&path, instance.nb_routed_demands())?;
            for demand in new_demands {
                instance.push_demand(demand);
            }

            match self.route_pending_demands(params, instance, &stem) {
                Ok(()) => {}
                Err(RsaError::MilpNonOptimal(e)) => {
                    log::error!("batch for {stem} did not reach optimality ({e}), skipping to next file");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Routes every currently pending demand, `nbDemandsAtOnce` at a time,
    /// snapshotting the occupancy state after each batch.
    fn route_pending_demands(&mut self, params: &Parameters, instance: &mut Instance, stem: &str) -> Result<(), RsaError> {
        loop {
            let batch_ids: Vec<usize> = instance
                .pending_demand_ids()
                .into_iter()
                .take(params.nb_demands_at_once)
                .collect();
            if batch_ids.is_empty() {
                return Ok(());
            }

            let instance_ref: &Instance = instance;
            let mut graphs: Vec<LayeredGraph> = batch_ids
                .par_iter()
                .map(|&id| {
                    let demand = instance_ref.demand(id).expect("pending demand id must exist").clone();
                    let mut graph = LayeredGraph::build(instance_ref, &demand);
                    preprocess::preprocess(&mut graph, instance_ref, params.preprocessing_level);
                    graph
                })
                .collect();

            match params.method {
                Method::Milp => {
                    milp::solve_batch(&mut graphs, instance, params.obj, cfg!(feature = "hide-cbc-output"))?;
                    for graph in &graphs {
                        commit(instance, graph);
                    }
                }
                Method::Subgradient => {
                    let config = SubgradientConfig {
                        multiplier_zero: params.lagrangian_multiplier_zero,
                        lambda_zero: params.lagrangian_lambda_zero,
                        nb_iterations_without_improvement: params.nb_iterations_without_improvement,
                        max_nb_iterations: params.max_nb_iterations,
                    };
                    for graph in &mut graphs {
                        subgradient::solve(graph, instance, params.obj, &config)?;
                        commit(instance, graph);
                    }
                }
            }

            self.snapshot(params, instance, stem)?;
        }
    }

    /// Writes the occupancy snapshot and appends to `results.csv`, tagged
    /// `<stem>_<solve_counter>`, then advances the counter.
    fn snapshot(&mut self, params: &Parameters, instance: &Instance, stem: &str) -> Result<(), RsaError> {
        let tag = format!("{stem}_{}", self.solve_counter);
        csv_out::write_snapshot(&params.output_path, &tag, instance, params.nb_slices_in_output_file)?;
        csv_out::append_results(&params.output_path, &tag, instance)?;
        self.solve_counter += 1;
        Ok(())
    }
}

/// Translates a graph's on-path arcs into a [`PathArc`] list and commits it.
fn commit(instance: &mut Instance, graph: &LayeredGraph) {
    let path: Vec<PathArc> = graph
        .on_path_arcs()
        .map(|a| PathArc {
            link: a.link,
            last_slice: a.slice,
        })
        .collect();
    if !path.is_empty() {
        instance.commit_path(graph.demand_id(), &path);
    }
}
