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

//! The occupancy model: physical topology, frequency spectrum, demand pool
//! and the `Instance` that ties them together.

mod demand;
mod instance;
mod link;

pub use demand::Demand;
pub use instance::{Instance, PathArc};
pub use link::{PhysicalLink, Slice};

/// Tolerance used whenever a length or cost comparison needs to tolerate
/// floating-point noise (`EPSILON` in the original implementation).
pub const EPSILON: f64 = 1e-4;

/// Marks a [`Demand`] as not yet assigned a slice.
pub const UNASSIGNED: usize = usize::MAX;
