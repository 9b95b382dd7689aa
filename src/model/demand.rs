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

//! A traffic demand requesting a routed path and a contiguous slice window.

use super::UNASSIGNED;

/// A request to route `load` contiguous slices from `source` to `target`
/// along a path no longer than `max_length`.
#[derive(Debug, Clone, PartialEq)]
pub struct Demand {
    id: usize,
    source: usize,
    target: usize,
    load: usize,
    max_length: f64,
    routed: bool,
    slice_allocation: usize,
}

impl Demand {
    /// Creates a new, unrouted demand.
    pub fn new(id: usize, source: usize, target: usize, load: usize, max_length: f64) -> Self {
        Self {
            id,
            source,
            target,
            load,
            max_length,
            routed: false,
            slice_allocation: UNASSIGNED,
        }
    }

    /// This demand's id.
    pub fn id(&self) -> usize {
        self.id
    }

    /// The demand's source node.
    pub fn source(&self) -> usize {
        self.source
    }

    /// The demand's target node.
    pub fn target(&self) -> usize {
        self.target
    }

    /// Number of contiguous slices required on every link of the path.
    pub fn load(&self) -> usize {
        self.load
    }

    /// Maximum allowed physical path length.
    pub fn max_length(&self) -> f64 {
        self.max_length
    }

    /// True once the demand has been assigned a path and slice window.
    pub fn is_routed(&self) -> bool {
        self.routed
    }

    /// The index of the last slice of this demand's window, or `None` if
    /// the demand is not yet routed. Mirrors `routed <=> sliceAllocation !=
    /// unassigned`.
    pub fn slice_allocation(&self) -> Option<usize> {
        self.routed.then_some(self.slice_allocation)
    }

    /// Marks the demand as routed, with the given last slice index.
    pub fn mark_routed(&mut self, last_slice: usize) {
        self.routed = true;
        self.slice_allocation = last_slice;
    }

    /// A compact `(source, target, load)` description, as emitted in the
    /// assignment file's header cells. Node ids are rendered 1-based, to
    /// match the on-disk CSV numbering.
    pub fn display_string(&self) -> String {
        format!("({},{},{})", self.source + 1, self.target + 1, self.load)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_demand_is_unrouted() {
        let d = Demand::new(3, 0, 1, 2, 100.0);
        assert!(!d.is_routed());
        assert_eq!(d.slice_allocation(), None);
    }

    #[test]
    fn mark_routed_sets_allocation() {
        let mut d = Demand::new(3, 0, 1, 2, 100.0);
        d.mark_routed(5);
        assert!(d.is_routed());
        assert_eq!(d.slice_allocation(), Some(5));
    }
}
