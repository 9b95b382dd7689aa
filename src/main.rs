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

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use elastic_rsa::driver::Driver;
use elastic_rsa::io::Parameters;
use elastic_rsa::RsaError;

/// Routes online traffic demands over an elastic optical network.
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    /// Path to the run's `key=value` parameters file.
    parameters: PathBuf,
}

fn main() -> ExitCode {
    pretty_env_logger::init_timed();

    let args = Cli::parse();

    match run(&args.parameters) {
        Ok(()) => ExitCode::SUCCESS,
        // a demand with no feasible constrained shortest path ends the run,
        // but is not an operational failure: mirrors main.cpp's exit(0) on
        // both the unreachable-target and testFeasibility-false paths.
        Err(RsaError::CspInfeasible(e)) => {
            log::info!("run ended: {e}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Loads the configuration, ingests the initial mapping, and runs every
/// online demand batch.
fn run(parameters_path: &std::path::Path) -> elastic_rsa::Result<()> {
    let params = Parameters::read(parameters_path)?;
    let mut driver = Driver::new();
    let mut instance = driver.load_initial_instance(&params)?;
    driver.run_online_phase(&params, &mut instance)?;
    log::info!(
        "run complete: {} demands routed out of {}",
        instance.nb_routed_demands(),
        instance.nb_demands()
    );
    Ok(())
}
