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

//! Typed errors for every failure boundary of a run: configuration, input
//! parsing, topology/demand consistency, the constrained-shortest-path
//! solver, and the MILP solver.

use thiserror::Error;

/// Top-level error produced by any stage of a run.
#[derive(Debug, Error)]
pub enum RsaError {
    /// The parameters file is missing, unreadable, or missing a required key.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A CSV or parameter value could not be parsed into its target type.
    #[error("input parse error: {0}")]
    Parse(#[from] ParseError),

    /// The assignment file disagrees with the demand file about a routed
    /// demand. Reported, not fatal: the offending slot is not trusted.
    #[error("consistency violation: {0}")]
    Consistency(#[from] ConsistencyViolation),

    /// The constrained shortest path problem has no feasible solution.
    #[error("constrained shortest path is infeasible: {0}")]
    CspInfeasible(#[from] CspInfeasible),

    /// The MILP solver did not return an optimal solution for this batch.
    #[error("MILP solve did not reach optimality: {0}")]
    MilpNonOptimal(#[from] MilpNonOptimal),

    /// An I/O failure while reading or writing a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, RsaError>;

/// A problem with the run's configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A key required to run was absent from the parameters file.
    #[error("missing required parameter `{0}`")]
    MissingKey(String),

    /// A key was present but its value could not be parsed as the expected type.
    #[error("parameter `{key}` has invalid value `{value}`")]
    InvalidValue {
        /// The offending key.
        key: String,
        /// The raw value that failed to parse.
        value: String,
    },

    /// The parameters file itself could not be opened.
    #[error("could not read parameters file `{0}`: {1}")]
    UnreadableFile(String, std::io::Error),

    /// `onlineDemandFolder` does not exist or is not a directory.
    #[error("online demand folder `{0}` could not be listed: {1}")]
    UnreadableFolder(String, std::io::Error),
}

/// A malformed input record.
#[derive(Debug, Error)]
pub enum ParseError {
    /// A CSV row failed to deserialize.
    #[error("malformed row in `{file}`: {source}")]
    Csv {
        /// Path of the offending file.
        file: String,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// The assignment file's header cell did not match the expected
    /// `k_<id>= (src,tgt,load)` pattern.
    #[error("malformed assignment header cell: `{0}`")]
    AssignmentHeader(String),

    /// A demand record has source == target, which is never routable.
    #[error("demand {id} has identical source and target ({node})")]
    DegenerateDemand {
        /// The demand's id.
        id: usize,
        /// The shared source/target node id.
        node: usize,
    },
}

/// The assignment file's record for a demand disagrees with the demand file.
#[derive(Debug, Error)]
#[error("demand {id}: assignment file says ({src},{tgt},{load}), demand file disagrees")]
pub struct ConsistencyViolation {
    /// The demand id in question.
    pub id: usize,
    /// Source recovered from the assignment file header.
    pub src: usize,
    /// Target recovered from the assignment file header.
    pub tgt: usize,
    /// Load recovered from the assignment file header.
    pub load: usize,
}

/// The constrained shortest path has no feasible solution for this demand.
#[derive(Debug, Error)]
pub enum CspInfeasible {
    /// No path exists at all between source and target in the layered graph.
    #[error("demand {0}: target is unreachable in the layered graph")]
    Unreachable(usize),

    /// Even the shortest path by physical length exceeds the demand's budget.
    #[error("demand {0}: shortest path length {1} exceeds maxLength {2}")]
    LengthExceeded(usize, f64, f64),
}

/// The MILP solver returned a non-optimal status for the current batch.
#[derive(Debug, Error)]
#[error("batch solve returned {status:?} instead of Optimal")]
pub struct MilpNonOptimal {
    /// The solver's reported status.
    pub status: String,
}
