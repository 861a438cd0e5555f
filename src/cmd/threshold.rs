/*!
threshold.rs - `threshold` command.

Primary result: `probability_of_<name>_above_threshold` (or `_below_`), 1.0
where the value exceeds the threshold, 0.0 elsewhere; units `1`.
Intermediate result: `<name>_threshold_difference`, value minus threshold,
original units.
*/

use anyhow::Result;

use super::binder::{Param, ParamKind, Signature};
use super::{BoundArgs, CallContext};
use crate::data::Dataset;
use crate::engine::{CommandOutput, Value};

pub const DESCRIPTION: &str = "Convert a dataset into a binary exceedance field.\n\n\
Points strictly above THRESHOLD (or strictly below it with --below) become 1, \
all others 0. The signed difference from the threshold is available as the \
intermediate result.";

pub const SIGNATURE: Signature = Signature::new(&[
    Param::required("dataset", ParamKind::Dataset, "Input dataset"),
    Param::required("threshold", ParamKind::Number, "Threshold in the dataset's units"),
    Param::flag("below", "Flag values below the threshold instead"),
]);

pub struct Thresholded {
    pub exceedance: Dataset,
    pub difference: Dataset,
}

pub fn threshold(ds: &Dataset, threshold: f64, below: bool) -> Thresholded {
    let direction = if below { "below" } else { "above" };
    let mut exceedance = ds.with_values(
        ds.values
            .iter()
            .map(|&v| {
                let hit = if below { v < threshold } else { v > threshold };
                if hit { 1.0 } else { 0.0 }
            })
            .collect(),
    );
    exceedance.name = format!("probability_of_{}_{direction}_threshold", ds.name);
    exceedance.units = "1".into();
    exceedance
        .attributes
        .insert("threshold".into(), serde_json::json!(threshold));
    exceedance
        .attributes
        .insert("threshold_units".into(), serde_json::json!(ds.units));

    let mut difference = ds.with_values(ds.values.iter().map(|v| v - threshold).collect());
    difference.name = format!("{}_threshold_difference", ds.name);

    Thresholded {
        exceedance,
        difference,
    }
}

pub fn run(_: &CallContext<'_>, mut args: BoundArgs) -> Result<CommandOutput> {
    let ds = args.dataset("dataset")?;
    let value = args.number("threshold")?;
    let below = args.flag("below");
    let out = threshold(&ds, value, below);
    Ok(CommandOutput::WithIntermediate {
        primary: Value::Dataset(out.exceedance),
        intermediate: Value::Dataset(out.difference),
    })
}
