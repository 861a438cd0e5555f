//! `update-attributes` - apply a JSON object of attribute changes.
//!
//! `null` or `"remove"` deletes a key; any other value sets it.

use anyhow::{Result, bail};

use super::binder::{Param, ParamKind, Signature};
use super::{BoundArgs, CallContext};
use crate::data::Dataset;
use crate::engine::{CommandOutput, Value};

pub const DESCRIPTION: &str = "Update dataset attributes from a JSON or YAML mapping.\n\n\
Keys mapped to null or \"remove\" are deleted; all other keys are set to the \
given value.";

pub const SIGNATURE: Signature = Signature::new(&[
    Param::required("dataset", ParamKind::Dataset, "Dataset to update"),
    Param::required("attributes", ParamKind::Json, "Mapping of attribute changes"),
]);

pub fn update_attributes(mut ds: Dataset, changes: &serde_json::Value) -> Result<Dataset> {
    let Some(changes) = changes.as_object() else {
        bail!("attribute changes must be a mapping, got {changes}");
    };
    for (key, value) in changes {
        match value {
            serde_json::Value::Null => {
                ds.attributes.remove(key);
            }
            serde_json::Value::String(s) if s == "remove" => {
                ds.attributes.remove(key);
            }
            other => {
                ds.attributes.insert(key.clone(), other.clone());
            }
        }
    }
    Ok(ds)
}

pub fn run(_: &CallContext<'_>, mut args: BoundArgs) -> Result<CommandOutput> {
    let ds = args.dataset("dataset")?;
    let Some(changes) = args.json("attributes")? else {
        bail!("missing attribute changes");
    };
    Ok(CommandOutput::Single(Value::Dataset(update_attributes(ds, &changes)?)))
}
