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

//! Parses the `key=value` run configuration and enumerates the online
//! demand folder.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::layered::PreprocessingLevel;
use crate::milp::ObjectiveMetric;

/// Which engine routes each batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Solve the batch jointly with the MILP formulation.
    Milp,
    /// Solve the batch one demand at a time with the subgradient solver.
    Subgradient,
}

/// The fully parsed, validated run configuration.
#[derive(Debug, Clone)]
pub struct Parameters {
    /// Path to the CSV describing the physical topology.
    pub link_file: PathBuf,
    /// Path to the CSV describing the demands of the initial mapping.
    pub demand_file: PathBuf,
    /// Path to the CSV describing the initial slice assignment.
    pub assignment_file: PathBuf,
    /// Directory of additional online demand batches.
    pub online_demand_folder: PathBuf,
    /// Directory output files are written to.
    pub output_path: PathBuf,
    /// Batch size.
    pub nb_demands_at_once: usize,
    /// Row count used when emitting the slice-holes matrix.
    pub nb_slices_in_output_file: usize,
    /// Which solver handles each batch.
    pub method: Method,
    /// How aggressively layered graphs are pruned before solving.
    pub preprocessing_level: PreprocessingLevel,
    /// Which objective metric to optimize.
    pub obj: ObjectiveMetric,
    /// u_0, the subgradient's initial Lagrangian multiplier.
    pub lagrangian_multiplier_zero: f64,
    /// lambda_0, the subgradient's initial step-size damping.
    pub lagrangian_lambda_zero: f64,
    /// Iterations without LB improvement before halving lambda.
    pub nb_iterations_without_improvement: usize,
    /// Hard cap on subgradient iterations.
    pub max_nb_iterations: usize,
}

impl Parameters {
    /// Reads and validates the parameters file at `path`.
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)
            .map_err(|e| ConfigError::UnreadableFile(path.display().to_string(), e))?;
        let raw = parse_key_value(&text);
        Self::from_raw(&raw)
    }

    fn from_raw(raw: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let string = |key: &str| -> Result<PathBuf, ConfigError> {
            raw.get(key)
                .map(PathBuf::from)
                .ok_or_else(|| ConfigError::MissingKey(key.to_string()))
        };
        let int = |key: &str| -> Result<i64, ConfigError> {
            let value = raw.get(key).ok_or_else(|| ConfigError::MissingKey(key.to_string()))?;
            value.parse::<i64>().map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                value: value.clone(),
            })
        };
        let float = |key: &str| -> Result<f64, ConfigError> {
            let value = raw.get(key).ok_or_else(|| ConfigError::MissingKey(key.to_string()))?;
            value.parse::<f64>().map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                value: value.clone(),
            })
        };

        let method = match int("method")? {
            0 => Method::Milp,
            1 => Method::Subgradient,
            other => {
                return Err(ConfigError::InvalidValue {
                    key: "method".to_string(),
                    value: other.to_string(),
                })
            }
        };
        let preprocessing_level = match int("preprocessingLevel")? {
            0 => PreprocessingLevel::None,
            1 => PreprocessingLevel::Partial,
            2 => PreprocessingLevel::Full,
            other => {
                return Err(ConfigError::InvalidValue {
                    key: "preprocessingLevel".to_string(),
                    value: other.to_string(),
                })
            }
        };
        let obj_raw = raw.get("obj").ok_or_else(|| ConfigError::MissingKey("obj".to_string()))?;
        let obj = ObjectiveMetric::parse(obj_raw).ok_or_else(|| ConfigError::InvalidValue {
            key: "obj".to_string(),
            value: obj_raw.clone(),
        })?;

        Ok(Parameters {
            link_file: string("linkFile")?,
            demand_file: string("demandFile")?,
            assignment_file: string("assignmentFile")?,
            online_demand_folder: string("onlineDemandFolder")?,
            output_path: string("outputPath")?,
            nb_demands_at_once: int("nbDemandsAtOnce")? as usize,
            nb_slices_in_output_file: int("nbSlicesInOutputFile")? as usize,
            method,
            preprocessing_level,
            obj,
            lagrangian_multiplier_zero: float("lagrangianMultiplier_zero")?,
            lagrangian_lambda_zero: float("lagrangianLambda_zero")?,
            nb_iterations_without_improvement: int("nbIterationsWithoutImprovement")? as usize,
            max_nb_iterations: int("maxNbIterations")? as usize,
        })
    }

    /// Lists the online demand files in directory order, skipping
    /// dotfiles.
    pub fn online_demand_files(&self) -> Result<Vec<PathBuf>, ConfigError> {
        let mut entries: Vec<PathBuf> = fs::read_dir(&self.online_demand_folder)
            .map_err(|e| ConfigError::UnreadableFolder(self.online_demand_folder.display().to_string(), e))?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                !p.file_name()
                    .and_then(|n| n.to_str())
                    .map(|n| n.starts_with('.'))
                    .unwrap_or(true)
            })
            .collect();
        entries.sort();
        Ok(entries)
    }
}

/// Parses a `key=value` text body, skipping blank lines and `#` comments.
/// Unknown keys are kept in the map (the caller decides which are
/// recognized); a later duplicate key overwrites an earlier one.
fn parse_key_value(text: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            log::warn!("ignoring malformed parameter line: `{line}`");
            continue;
        };
        let key = key.trim();
        let value = value.trim();
        if !KNOWN_KEYS.contains(&key) {
            log::warn!("ignoring unrecognized parameter `{key}`");
        }
        map.insert(key.to_string(), value.to_string());
    }
    map
}

const KNOWN_KEYS: &[&str] = &[
    "linkFile",
    "demandFile",
    "assignmentFile",
    "onlineDemandFolder",
    "outputPath",
    "nbDemandsAtOnce",
    "nbSlicesInOutputFile",
    "method",
    "preprocessingLevel",
    "obj",
    "lagrangianMultiplier_zero",
    "lagrangianLambda_zero",
    "nbIterationsWithoutImprovement",
    "maxNbIterations",
];

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> HashMap<String, String> {
        parse_key_value(
            "linkFile=topo/Link.csv\n\
             demandFile=topo/Demand.csv\n\
             assignmentFile=topo/Assignment.csv\n\
             onlineDemandFolder=online\n\
             outputPath=out\n\
             nbDemandsAtOnce=3\n\
             nbSlicesInOutputFile=10\n\
             method=0\n\
             preprocessingLevel=2\n\
             obj=4\n\
             lagrangianMultiplier_zero=0\n\
             lagrangianLambda_zero=1\n\
             nbIterationsWithoutImprovement=5\n\
             maxNbIterations=50\n",
        )
    }

    #[test]
    fn parses_a_well_formed_file() {
        let params = Parameters::from_raw(&sample()).unwrap();
        assert_eq!(params.nb_demands_at_once, 3);
        assert_eq!(params.method, Method::Milp);
        assert_eq!(params.preprocessing_level, PreprocessingLevel::Full);
        assert_eq!(params.obj, ObjectiveMetric::PhysicalLength);
    }

    #[test]
    fn missing_required_key_is_an_error() {
        let mut raw = sample();
        raw.remove("linkFile");
        let err = Parameters::from_raw(&raw).unwrap_err();
        assert!(matches!(err, ConfigError::MissingKey(k) if k == "linkFile"));
    }

    #[test]
    fn unknown_keys_are_ignored_not_fatal() {
        let mut text = String::from("unknownKey=123\n");
        text.push_str(
            "linkFile=a\ndemandFile=b\nassignmentFile=c\nonlineDemandFolder=d\noutputPath=e\n\
             nbDemandsAtOnce=1\nnbSlicesInOutputFile=1\nmethod=1\npreprocessingLevel=0\nobj=2\n\
             lagrangianMultiplier_zero=0\nlagrangianLambda_zero=1\nnbIterationsWithoutImprovement=1\n\
             maxNbIterations=1\n",
        );
        let raw = parse_key_value(&text);
        assert!(Parameters::from_raw(&raw).is_ok());
    }
}
