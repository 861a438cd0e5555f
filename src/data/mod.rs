/*!
Dataset model + file persistence.

A `Dataset` is a named, unit-annotated field of `f64` values with a shape
and free-form attributes. It is the rich object most commands consume and
produce.

Files:
  *.json            JSON
  *.yaml | *.yml    YAML (converted to JSON values on load)

Key items:
  load_dataset / save_dataset
  load_json / save_value
*/

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::Value;

/// Errors from reading or writing dataset / JSON files.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("unable to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unable to parse JSON file {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("unable to parse YAML file {}: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("dataset '{name}' has shape {shape:?} but {len} values")]
    Shape {
        name: String,
        shape: Vec<usize>,
        len: usize,
    },
    #[error("{0} cannot be written to a file")]
    Unpersistable(&'static str),
}

/* ---- Dataset ---- */

/// A gridded field with metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub name: String,
    #[serde(default)]
    pub units: String,
    pub shape: Vec<usize>,
    pub values: Vec<f64>,
    #[serde(default)]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

impl Dataset {
    pub fn new(
        name: impl Into<String>,
        units: impl Into<String>,
        shape: Vec<usize>,
        values: Vec<f64>,
    ) -> Self {
        Self {
            name: name.into(),
            units: units.into(),
            shape,
            values,
            attributes: BTreeMap::new(),
        }
    }

    /// Check that the number of values matches the shape.
    pub fn validate(&self) -> Result<(), DataError> {
        let expected: usize = self.shape.iter().product();
        if expected != self.values.len() {
            return Err(DataError::Shape {
                name: self.name.clone(),
                shape: self.shape.clone(),
                len: self.values.len(),
            });
        }
        Ok(())
    }

    /// A copy with the same metadata and new values.
    pub fn with_values(&self, values: Vec<f64>) -> Self {
        Self {
            values,
            ..self.clone()
        }
    }

    pub fn min(&self) -> Option<f64> {
        self.values.iter().copied().reduce(f64::min)
    }

    pub fn max(&self) -> Option<f64> {
        self.values.iter().copied().reduce(f64::max)
    }

    pub fn mean(&self) -> Option<f64> {
        if self.values.is_empty() {
            return None;
        }
        Some(self.values.iter().sum::<f64>() / self.values.len() as f64)
    }

    fn shape_label(&self) -> String {
        self.shape
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join(" x ")
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / ({})  (shape: {})", self.name, self.units, self.shape_label())?;
        if !self.attributes.is_empty() {
            write!(f, "\n    attributes:")?;
            for (k, v) in &self.attributes {
                match v {
                    serde_json::Value::String(s) => write!(f, "\n        {k}: {s}")?,
                    other => write!(f, "\n        {k}: {other}")?,
                }
            }
        }
        Ok(())
    }
}

/* ---- Loading ---- */

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"))
        .unwrap_or(false)
}

/// Read a JSON or YAML file (by extension) into a JSON value.
pub fn load_json(path: impl AsRef<Path>) -> Result<serde_json::Value, DataError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if is_yaml(path) {
        let yaml: serde_yaml::Value = serde_yaml::from_str(&raw).map_err(|source| DataError::Yaml {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::to_value(yaml).map_err(|source| DataError::Json {
            path: path.to_path_buf(),
            source,
        })
    } else {
        serde_json::from_str(&raw).map_err(|source| DataError::Json {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Load and validate a dataset file.
pub fn load_dataset(path: impl AsRef<Path>) -> Result<Dataset, DataError> {
    let path = path.as_ref();
    let value = load_json(path)?;
    let dataset: Dataset = serde_json::from_value(value).map_err(|source| DataError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    dataset.validate()?;
    Ok(dataset)
}

/* ---- Saving ---- */

fn write_file(path: &Path, contents: String) -> Result<(), DataError> {
    std::fs::write(path, contents).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write_structured<T: Serialize>(path: &Path, value: &T) -> Result<(), DataError> {
    let contents = if is_yaml(path) {
        serde_yaml::to_string(value).map_err(|source| DataError::Yaml {
            path: path.to_path_buf(),
            source,
        })?
    } else {
        let mut s = serde_json::to_string_pretty(value).map_err(|source| DataError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        s.push('\n');
        s
    };
    write_file(path, contents)
}

pub fn save_dataset(dataset: &Dataset, path: impl AsRef<Path>) -> Result<(), DataError> {
    write_structured(path.as_ref(), dataset)
}

/// Persist any materializable result.
pub fn save_value(value: &Value, path: impl AsRef<Path>) -> Result<(), DataError> {
    let path = path.as_ref();
    match value {
        Value::Dataset(ds) => save_dataset(ds, path),
        Value::Json(v) => write_structured(path, v),
        Value::Text(s) => write_file(path, format!("{s}\n")),
        Value::Integer(n) => write_file(path, format!("{n}\n")),
        Value::Number(n) => write_file(path, format!("{n}\n")),
        Value::Bool(b) => write_file(path, format!("{b}\n")),
        Value::None => Err(DataError::Unpersistable("an empty result")),
        Value::DryRun(_) => Err(DataError::Unpersistable("a dry-run argument list")),
    }
}
