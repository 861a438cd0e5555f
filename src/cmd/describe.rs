//! `describe` - text summary of a dataset.

use anyhow::Result;

use super::binder::{Param, ParamKind, Signature};
use super::{BoundArgs, CallContext};
use crate::data::Dataset;
use crate::engine::{CommandOutput, Value};

pub const DESCRIPTION: &str =
    "Summarise a dataset: name, units, shape, value range and attributes.";

pub const SIGNATURE: Signature = Signature::new(&[Param::required(
    "dataset",
    ParamKind::Dataset,
    "Dataset to describe",
)]);

fn stat(v: Option<f64>) -> String {
    v.map(|x| x.to_string()).unwrap_or_else(|| "n/a".into())
}

pub fn describe(ds: &Dataset) -> String {
    let mut lines = vec![
        format!("name: {}", ds.name),
        format!("units: {}", ds.units),
        format!(
            "shape: {}",
            ds.shape.iter().map(|d| d.to_string()).collect::<Vec<_>>().join(" x ")
        ),
        format!("min: {}", stat(ds.min())),
        format!("max: {}", stat(ds.max())),
        format!("mean: {}", stat(ds.mean())),
    ];
    if !ds.attributes.is_empty() {
        lines.push("attributes:".into());
        for (k, v) in &ds.attributes {
            match v {
                serde_json::Value::String(s) => lines.push(format!("  {k}: {s}")),
                other => lines.push(format!("  {k}: {other}")),
            }
        }
    }
    lines.join("\n")
}

pub fn run(_: &CallContext<'_>, mut args: BoundArgs) -> Result<CommandOutput> {
    let ds = args.dataset("dataset")?;
    Ok(CommandOutput::Single(Value::Text(describe(&ds))))
}
