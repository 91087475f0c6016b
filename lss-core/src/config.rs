//! YAML configuration sections.
//!
//! Analysis settings live in a single YAML document whose top-level keys name
//! independent sections:
//!
//! ```yaml
//! KiDS_QSO:
//!   nside: 256
//!   selection:
//!     max_mag_r: 23.5
//! cosmology:
//!   omega_c: 0.25
//!   omega_b: 0.05
//!   h: 0.67
//!   n_s: 0.96
//! ```
//!
//! [`get_config`] returns one section as an untyped mapping. Prefer
//! [`load_section`] with a `Deserialize` struct so that missing or misspelled
//! fields fail at load time.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde_yml::{Mapping, Value};

use crate::errors::{LssError, LssResult};

/// Location of the shared configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "../configs.yml";

/// Reads section `name` from [`DEFAULT_CONFIG_PATH`].
pub fn get_config(name: &str) -> LssResult<Mapping> {
    get_config_from(DEFAULT_CONFIG_PATH, name)
}

/// Reads section `name` from the YAML document at `path`.
pub fn get_config_from<P: AsRef<Path>>(path: P, name: &str) -> LssResult<Mapping> {
    let section = read_section(path.as_ref(), name)?;
    match section {
        Value::Mapping(mapping) => Ok(mapping),
        _ => Err(LssError::config(format!(
            "section '{name}' is not a mapping"
        ))),
    }
}

/// Deserializes section `name` of the YAML document at `path` into `T`.
pub fn load_section<T, P>(path: P, name: &str) -> LssResult<T>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let section = read_section(path.as_ref(), name)?;
    from_value(section, name)
}

/// Deserializes an already loaded section into `T`.
pub fn from_mapping<T: DeserializeOwned>(mapping: Mapping, name: &str) -> LssResult<T> {
    from_value(Value::Mapping(mapping), name)
}

fn from_value<T: DeserializeOwned>(value: Value, name: &str) -> LssResult<T> {
    serde_yml::from_value(value)
        .map_err(|e| LssError::config(format!("section '{name}': {e}")))
}

fn read_section(path: &Path, name: &str) -> LssResult<Value> {
    let text = fs::read_to_string(path)?;
    let document: Value = serde_yml::from_str(&text).map_err(|e| {
        LssError::config(format!("failed to parse {}: {e}", path.display()))
    })?;

    let mut root = match document {
        Value::Mapping(root) => root,
        _ => {
            return Err(LssError::config(format!(
                "{} does not contain named sections",
                path.display()
            )))
        }
    };

    root.remove(name)
        .ok_or_else(|| LssError::config(format!("section '{name}' not found")))
}
