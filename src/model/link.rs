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

//! A directed physical link and the frequency spectrum it carries.

use super::demand::Demand;

/// One cell of a link's frequency spectrum: free, or owned by a demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Slice {
    /// No demand currently occupies this slice.
    #[default]
    Free,
    /// The slice is occupied by the demand with this id.
    Occupied(usize),
}

impl Slice {
    /// True if the slice is not occupied by any demand.
    pub fn is_free(&self) -> bool {
        matches!(self, Slice::Free)
    }
}

/// A directed edge of the physical topology, together with the frequency
/// spectrum it carries.
#[derive(Debug, Clone)]
pub struct PhysicalLink {
    id: usize,
    source: usize,
    target: usize,
    length: f64,
    cost: f64,
    spectrum: Vec<Slice>,
}

impl PhysicalLink {
    /// Creates a new link with every slice free.
    pub fn new(id: usize, source: usize, target: usize, length: f64, nb_slices: usize, cost: f64) -> Self {
        Self {
            id,
            source,
            target,
            length,
            cost,
            spectrum: vec![Slice::Free; nb_slices],
        }
    }

    /// This link's id.
    pub fn id(&self) -> usize {
        self.id
    }

    /// The link's source node.
    pub fn source(&self) -> usize {
        self.source
    }

    /// The link's target node.
    pub fn target(&self) -> usize {
        self.target
    }

    /// The link's physical length.
    pub fn length(&self) -> f64 {
        self.length
    }

    /// The cost of routing through this link.
    pub fn cost(&self) -> f64 {
        self.cost
    }

    /// The number of slices the spectrum is divided into.
    pub fn nb_slices(&self) -> usize {
        self.spectrum.len()
    }

    /// The current state of every slice.
    pub fn spectrum(&self) -> &[Slice] {
        &self.spectrum
    }

    /// True if the window `[pos - demand.load() + 1, pos]` is in range and
    /// entirely free, i.e. `demand` could be assigned with last slice `pos`.
    pub fn has_enough_space(&self, pos: usize, demand: &Demand) -> bool {
        if demand.load() == 0 || pos + 1 < demand.load() {
            return false;
        }
        let start = pos + 1 - demand.load();
        if pos >= self.spectrum.len() {
            return false;
        }
        self.spectrum[start..=pos].iter().all(Slice::is_free)
    }

    /// Marks the window `[pos - demand.load() + 1, pos]` as owned by `demand`.
    ///
    /// # Panics
    /// Panics if the window is not entirely free; callers must check
    /// [`PhysicalLink::has_enough_space`] first.
    pub fn assign_slices(&mut self, pos: usize, demand: &Demand) {
        assert!(self.has_enough_space(pos, demand), "slice window not free");
        let start = pos + 1 - demand.load();
        for slice in &mut self.spectrum[start..=pos] {
            *slice = Slice::Occupied(demand.id());
        }
    }

    /// The highest slice index currently occupied on this link, or `0` if
    /// no slice is occupied (matches the original implementation's
    /// `getMaxUsedSlicePosition`, which never returns a negative sentinel).
    pub fn max_used_slice(&self) -> usize {
        self.spectrum
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.is_free())
            .map(|(i, _)| i)
            .max()
            .unwrap_or(0)
    }

    /// A compact `[source+1,target+1]` description, matching the on-disk
    /// 1-based node numbering used by the original CSV format.
    pub fn display_string(&self) -> String {
        format!("[{},{}]", self.source + 1, self.target + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demand(load: usize) -> Demand {
        Demand::new(0, 0, 1, load, 100.0)
    }

    #[test]
    fn has_enough_space_respects_window() {
        let link = PhysicalLink::new(0, 0, 1, 10.0, 4, 1.0);
        assert!(link.has_enough_space(1, &demand(2)));
        assert!(!link.has_enough_space(0, &demand(2)), "window would start below zero");
    }

    #[test]
    fn assign_then_check_rejects_overlap() {
        let mut link = PhysicalLink::new(0, 0, 1, 10.0, 4, 1.0);
        link.assign_slices(1, &demand(2));
        assert!(!link.has_enough_space(2, &demand(2)));
        assert!(link.has_enough_space(3, &demand(1)));
    }
}
