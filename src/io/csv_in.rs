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

//! CSV ingestion: topology, demands, and the (irregular) assignment matrix.

use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;

use crate::error::{ConsistencyViolation, ParseError};
use crate::model::{Demand, Instance, PathArc, PhysicalLink};

#[derive(Debug, Deserialize)]
struct LinkRow {
    id: usize,
    source: usize,
    target: usize,
    length: f64,
    #[serde(rename = "nbSlices")]
    nb_slices: usize,
    cost: f64,
}

#[derive(Debug, Deserialize)]
struct DemandRow {
    id: usize,
    source: usize,
    target: usize,
    load: usize,
    #[serde(rename = "maxLength")]
    max_length: f64,
}

/// Opens a semicolon-delimited CSV reader over `path`.
fn reader_for(path: &Path) -> Result<csv::Reader<std::fs::File>, ParseError> {
    csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .from_path(path)
        .map_err(|e| ParseError::Csv {
            file: path.display().to_string(),
            source: e,
        })
}

/// Reads the topology CSV and returns `(nb_nodes, links)`. Ids are
/// converted from the file's 1-based numbering to 0-based.
pub fn read_topology(path: &Path) -> Result<(usize, Vec<PhysicalLink>), ParseError> {
    let mut reader = reader_for(path)?;
    let mut links = Vec::new();
    let mut max_node = 0usize;
    for row in reader.deserialize() {
        let row: LinkRow = row.map_err(|e| ParseError::Csv {
            file: path.display().to_string(),
            source: e,
        })?;
        let (source, target) = (row.source - 1, row.target - 1);
        max_node = max_node.max(source).max(target);
        links.push(PhysicalLink::new(row.id - 1, source, target, row.length, row.nb_slices, row.cost));
    }
    Ok((max_node + 1, links))
}

/// Reads the initial demand CSV, in file order, 1-based ids converted to
/// 0-based.
pub fn read_demands(path: &Path) -> Result<Vec<Demand>, ParseError> {
    read_demand_rows(path, 0)
}

/// Reads an online demand batch file, offsetting every id by
/// `nb_routed_demands` as the original implementation does (ids in the
/// batch file are local to that file, not global to the pool).
pub fn read_online_demands(path: &Path, nb_routed_demands: usize) -> Result<Vec<Demand>, ParseError> {
    read_demand_rows(path, nb_routed_demands)
}

/// Shared implementation of [`read_demands`] and [`read_online_demands`].
fn read_demand_rows(path: &Path, id_offset: usize) -> Result<Vec<Demand>, ParseError> {
    let mut reader = reader_for(path)?;
    let mut demands = Vec::new();
    for row in reader.deserialize() {
        let row: DemandRow = row.map_err(|e| ParseError::Csv {
            file: path.display().to_string(),
            source: e,
        })?;
        let id = row.id - 1 + id_offset;
        let (source, target) = (row.source - 1, row.target - 1);
        if source == target {
            return Err(ParseError::DegenerateDemand { id, node: source });
        }
        demands.push(Demand::new(id, source, target, row.load, row.max_length));
    }
    Ok(demands)
}

lazy_static! {
    static ref HEADER_CELL: Regex = Regex::new(r"^k_(\d+)=\s*\((\d+),(\d+),(\d+)\)$").unwrap();
}

/// Applies the assignment CSV to `instance`: validates every routed
/// demand's header cell against the demand pool, then walks the matrix
/// body and the trailing `slice allocation` row to mark demands routed and
/// occupy their slices.
///
/// Consistency violations are logged and returned so the driver can decide
/// whether to treat them as fatal; the offending demand is simply left
/// untouched (not marked routed) in that case.
pub fn read_assignment(
    path: &Path,
    instance: &mut Instance,
) -> Result<Vec<ConsistencyViolation>, ParseError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| ParseError::Csv {
            file: path.display().to_string(),
            source: e,
        })?;
    let rows: Vec<csv::StringRecord> = reader
        .records()
        .collect::<Result<_, _>>()
        .map_err(|e| ParseError::Csv {
            file: path.display().to_string(),
            source: e,
        })?;
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let header = &rows[0];
    // Column index -> demand id, for every routed-demand header cell.
    let mut column_demand: Vec<Option<usize>> = vec![None; header.len()];
    let mut violations = Vec::new();

    for (col, cell) in header.iter().enumerate().skip(1) {
        let cell = cell.trim();
        if cell.is_empty() {
            continue;
        }
        let Some(caps) = HEADER_CELL.captures(cell) else {
            return Err(ParseError::AssignmentHeader(cell.to_string()));
        };
        let id: usize = caps[1].parse().unwrap();
        let id = id - 1;
        let src: usize = caps[2].parse::<usize>().unwrap() - 1;
        let tgt: usize = caps[3].parse::<usize>().unwrap() - 1;
        let load: usize = caps[4].parse().unwrap();

        match instance.demand(id) {
            Some(d) if d.source() == src && d.target() == tgt && d.load() == load => {
                column_demand[col] = Some(id);
            }
            _ => {
                violations.push(ConsistencyViolation {
                    id,
                    src,
                    tgt,
                    load,
                });
            }
        }
    }

    let Some(alloc_row) = rows.iter().find(|r| r.get(0).is_some_and(|c| c.contains("slice allocation"))) else {
        return Ok(violations);
    };

    for (col, demand_id) in column_demand.iter().enumerate() {
        let Some(demand_id) = demand_id else { continue };
        let Some(alloc_cell) = alloc_row.get(col) else { continue };
        let Ok(last_slice) = alloc_cell.trim().parse::<usize>() else {
            continue;
        };
        let last_slice = last_slice - 1;

        let mut arcs = Vec::new();
        for (edge_row_idx, link) in instance.links().iter().enumerate() {
            let Some(row) = rows.get(edge_row_idx + 1) else { continue };
            let Some(mark) = row.get(col) else { continue };
            if mark.trim() == "1" {
                arcs.push(PathArc {
                    link: link.id(),
                    last_slice,
                });
            }
        }
        if !arcs.is_empty() {
            instance.commit_path(*demand_id, &arcs);
        }
    }

    Ok(violations)
}
