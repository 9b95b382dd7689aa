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

//! The instance: topology, frequency spectrum occupation and the demand pool.

use super::{Demand, PhysicalLink};

/// The initial mapping plus every demand seen so far, routed or pending.
#[derive(Debug, Clone)]
pub struct Instance {
    nb_nodes: usize,
    links: Vec<PhysicalLink>,
    demands: Vec<Demand>,
    nb_initial_demands: usize,
}

/// One arc of a chosen path: the physical link it traverses and the slice
/// index used on that link (the same slice index on every link, since the
/// layered graph preserves slice across hops).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathArc {
    /// Id of the physical link traversed.
    pub link: usize,
    /// Last slice index of the demand's window on this link.
    pub last_slice: usize,
}

impl Instance {
    /// Builds an instance from an already-read topology. The demand pool
    /// starts empty; `nb_initial_demands` is set once `readDemands` +
    /// `readDemandAssignment` populate it via [`Instance::push_demand`].
    pub fn new(nb_nodes: usize, links: Vec<PhysicalLink>) -> Self {
        Self {
            nb_nodes,
            links,
            demands: Vec::new(),
            nb_initial_demands: 0,
        }
    }

    /// Number of nodes in the physical topology.
    pub fn nb_nodes(&self) -> usize {
        self.nb_nodes
    }

    /// All physical links, in id order.
    pub fn links(&self) -> &[PhysicalLink] {
        &self.links
    }

    /// The demand with this id, if any.
    pub fn demand(&self, id: usize) -> Option<&Demand> {
        self.demands.iter().find(|d| d.id() == id)
    }

    /// All demands known so far, routed or pending.
    pub fn demands(&self) -> &[Demand] {
        &self.demands
    }

    /// Appends a freshly parsed demand to the pool.
    pub fn push_demand(&mut self, demand: Demand) {
        self.demands.push(demand);
    }

    /// Number of demands routed in the very first mapping, recorded once
    /// the initial assignment file has been applied.
    pub fn nb_initial_demands(&self) -> usize {
        self.nb_initial_demands
    }

    /// Records the number of demands routed by the initial mapping. Called
    /// once, right after the assignment file has been applied.
    pub fn set_nb_initial_demands(&mut self, nb: usize) {
        self.nb_initial_demands = nb;
    }

    /// Total number of demands known so far (routed + pending).
    pub fn nb_demands(&self) -> usize {
        self.demands.len()
    }

    /// Number of demands currently routed.
    pub fn nb_routed_demands(&self) -> usize {
        self.demands.iter().filter(|d| d.is_routed()).count()
    }

    /// Number of demands still pending.
    pub fn nb_pending_demands(&self) -> usize {
        self.nb_demands() - self.nb_routed_demands()
    }

    /// Ids of every pending demand, in pool order.
    pub fn pending_demand_ids(&self) -> Vec<usize> {
        self.demands
            .iter()
            .filter(|d| !d.is_routed())
            .map(Demand::id)
            .collect()
    }

    /// The id of the first link directly connecting `source` to `target` in
    /// either direction, if one exists.
    pub fn link_between(&self, source: usize, target: usize) -> Option<usize> {
        self.links
            .iter()
            .find(|l| {
                (l.source() == source && l.target() == target)
                    || (l.source() == target && l.target() == source)
            })
            .map(PhysicalLink::id)
    }

    /// Checks whether `link` has room for `demand` with last slice `pos`.
    pub fn has_enough_space(&self, link: usize, pos: usize, demand: &Demand) -> bool {
        self.links[link].has_enough_space(pos, demand)
    }

    /// Assigns `demand_id` the given path atomically: every arc's slice
    /// window is marked occupied only after every arc has been validated as
    /// free, so a mid-write failure never leaves a partially-occupied path.
    ///
    /// # Panics
    /// Panics if any arc in `path` is not actually free for this demand;
    /// callers (the solution writer, §4.5) are expected to only pass arcs
    /// that the chosen method reported on-path.
    pub fn commit_path(&mut self, demand_id: usize, path: &[PathArc]) {
        let demand = self
            .demands
            .iter()
            .find(|d| d.id() == demand_id)
            .cloned()
            .expect("demand id must exist in the pool");
        for arc in path {
            assert!(
                self.links[arc.link].has_enough_space(arc.last_slice, &demand),
                "solution writer: arc {:?} not free for demand {demand_id}",
                arc
            );
        }
        for arc in path {
            self.links[arc.link].assign_slices(arc.last_slice, &demand);
        }
        let last_slice = path
            .iter()
            .map(|a| a.last_slice)
            .max()
            .expect("a routed demand must traverse at least one arc");
        let demand = self
            .demands
            .iter_mut()
            .find(|d| d.id() == demand_id)
            .expect("demand id must exist in the pool");
        demand.mark_routed(last_slice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_instance() -> Instance {
        let links = vec![PhysicalLink::new(0, 0, 1, 100.0, 4, 1.0)];
        let mut inst = Instance::new(2, links);
        inst.push_demand(Demand::new(0, 0, 1, 2, 200.0));
        inst
    }

    #[test]
    fn commit_path_marks_demand_routed_and_occupies_slices() {
        let mut inst = sample_instance();
        inst.commit_path(
            0,
            &[PathArc {
                link: 0,
                last_slice: 1,
            }],
        );
        assert!(inst.demand(0).unwrap().is_routed());
        assert_eq!(inst.demand(0).unwrap().slice_allocation(), Some(1));
        assert!(!inst.has_enough_space(0, 1, &Demand::new(1, 0, 1, 1, 10.0)));
    }

    #[test]
    fn link_between_is_direction_agnostic() {
        let inst = sample_instance();
        assert_eq!(inst.link_between(0, 1), Some(0));
        assert_eq!(inst.link_between(1, 0), Some(0));
    }
}
