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

//! CSV emission: the slice-holes matrix, the assignment matrix and the
//! append-only results log.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use crate::model::Instance;

/// Writes `Edge_Slice_Holes_<tag>.csv` and `Demand_edges_slices_<tag>.csv`
/// into `output_dir`.
pub fn write_snapshot(
    output_dir: &Path,
    tag: &str,
    instance: &Instance,
    nb_slices_in_output_file: usize,
) -> std::io::Result<()> {
    write_edge_slice_holes(output_dir, tag, instance, nb_slices_in_output_file)?;
    write_demand_edge_slices(output_dir, tag, instance)?;
    Ok(())
}

/// Writes the slice x edge occupancy matrix.
fn write_edge_slice_holes(
    output_dir: &Path,
    tag: &str,
    instance: &Instance,
    nb_slices_in_output_file: usize,
) -> std::io::Result<()> {
    let path = output_dir.join(format!("Edge_Slice_Holes_{tag}.csv"));
    let mut file = std::fs::File::create(path)?;

    write!(file, " Slice-Edge ;")?;
    for i in 0..instance.links().len() {
        write!(file, "e_{};", i + 1)?;
    }
    writeln!(file)?;

    for s in 0..nb_slices_in_output_file {
        write!(file, "s_{};", s + 1)?;
        for link in instance.links() {
            let used = s < link.nb_slices() && !link.spectrum()[s].is_free();
            write!(file, "{};", if used { 1 } else { 0 })?;
        }
        writeln!(file)?;
    }

    let nb_new = instance.nb_routed_demands().saturating_sub(instance.nb_initial_demands());
    writeln!(file, "Nb_New_Demands:;{nb_new}")?;
    Ok(())
}

/// Writes the per-demand path/slice assignment matrix.
fn write_demand_edge_slices(output_dir: &Path, tag: &str, instance: &Instance) -> std::io::Result<()> {
    let path = output_dir.join(format!("Demand_edges_slices_{tag}.csv"));
    let mut file = std::fs::File::create(path)?;

    let routed: Vec<_> = instance.demands().iter().filter(|d| d.is_routed()).collect();

    write!(file, "edge_slice_demand;")?;
    for d in &routed {
        write!(file, "k_{}= {};", d.id() + 1, d.display_string())?;
    }
    writeln!(file)?;

    for link in instance.links() {
        write!(file, "{};", link.display_string())?;
        for d in &routed {
            let on_link = link
                .spectrum()
                .iter()
                .any(|s| matches!(s, crate::model::Slice::Occupied(id) if *id == d.id()));
            write!(file, "{};", if on_link { "1" } else { " " })?;
        }
        writeln!(file)?;
    }

    write!(file, " slice allocation ;")?;
    for d in &routed {
        write!(file, "{};", d.slice_allocation().unwrap_or(0) + 1)?;
    }
    writeln!(file)?;
    Ok(())
}

/// Appends one row to `results.csv`: the batch tag, the number of newly
/// routed demands, and the total routed so far. The header is written once,
/// the first time the file is created.
pub fn append_results(output_dir: &Path, file_name: &str, instance: &Instance) -> std::io::Result<()> {
    let path = output_dir.join("results.csv");
    let is_new = !path.exists();
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    if is_new {
        writeln!(file, "file;new_routed;total_routed")?;
    }
    let nb_routed = instance.nb_routed_demands();
    let new_routed = nb_routed.saturating_sub(instance.nb_initial_demands());
    writeln!(file, "{file_name};{new_routed};{nb_routed}")?;
    Ok(())
}
