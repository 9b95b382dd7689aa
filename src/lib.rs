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

//! # Online routing and spectrum allocation
//!
//! Routes traffic demands over an elastic optical network: for every
//! pending demand, finds a path through the physical topology and a
//! contiguous window of frequency slices along that path, without
//! double-booking any slice already held by another demand.
//!
//! ## Structure
//! - [`model`] is the occupancy model: nodes, physical links, the frequency
//!   spectrum, and the demand pool tied together by [`model::Instance`].
//! - [`layered`] builds, for a single demand, the extended graph (physical
//!   topology crossed with the slice axis) and prunes it with
//!   [`layered::PreprocessingLevel`].
//! - [`milp`] solves a batch of demands jointly as a 0/1 multi-commodity flow
//!   problem.
//! - [`subgradient`] solves one demand at a time via a Lagrangian relaxation
//!   of the constrained shortest path problem.
//! - [`io`] reads the run configuration and the topology/demand/assignment
//!   CSVs, and writes the occupancy snapshots and results log.
//! - [`driver`] sequences the online demand folder into batches and commits
//!   each batch's solution back into the instance.
//! - [`error`] collects every failure boundary into [`error::RsaError`].

#![deny(missing_docs, clippy::missing_docs_in_private_items, missing_debug_implementations)]
#![allow(clippy::result_large_err)]

pub mod driver;
pub mod error;
pub mod io;
pub mod layered;
pub mod milp;
pub mod model;
pub mod subgradient;

pub use error::{Result, RsaError};
