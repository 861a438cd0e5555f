//! `combine` - element-wise combination of equally shaped datasets.

use anyhow::{Result, bail};

use super::binder::{Param, ParamKind, Signature};
use super::{BoundArgs, CallContext};
use crate::data::Dataset;
use crate::engine::{CommandOutput, Value};

pub const DESCRIPTION: &str = "Combine datasets element-wise.\n\n\
All inputs must have the same shape. The result keeps the name, units and \
attributes of the first dataset unless --new-name is given.";

pub const SIGNATURE: Signature = Signature::new(&[
    Param::variadic("datasets", ParamKind::Dataset, "Datasets to combine"),
    Param::option("operation", ParamKind::Text, "One of + - * max min mean").with_default("+"),
    Param::option("new-name", ParamKind::Text, "Name of the combined dataset"),
]);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    Max,
    Min,
    Mean,
}

impl Operation {
    pub fn parse(raw: &str) -> Result<Self> {
        Ok(match raw {
            "+" | "add" => Operation::Add,
            "-" | "subtract" => Operation::Subtract,
            "*" | "multiply" => Operation::Multiply,
            "max" => Operation::Max,
            "min" => Operation::Min,
            "mean" => Operation::Mean,
            other => bail!("unknown operation '{other}' (expected one of + - * max min mean)"),
        })
    }

    fn apply(self, acc: f64, x: f64) -> f64 {
        match self {
            Operation::Add | Operation::Mean => acc + x,
            Operation::Subtract => acc - x,
            Operation::Multiply => acc * x,
            Operation::Max => acc.max(x),
            Operation::Min => acc.min(x),
        }
    }
}

pub fn combine(datasets: &[Dataset], op: Operation) -> Result<Dataset> {
    let Some((first, rest)) = datasets.split_first() else {
        bail!("no datasets to combine");
    };
    let mut values = first.values.clone();
    for ds in rest {
        if ds.shape != first.shape {
            bail!(
                "cannot combine '{}' with shape {:?} and '{}' with shape {:?}",
                first.name,
                first.shape,
                ds.name,
                ds.shape
            );
        }
        for (acc, x) in values.iter_mut().zip(&ds.values) {
            *acc = op.apply(*acc, *x);
        }
    }
    if op == Operation::Mean {
        let n = datasets.len() as f64;
        values.iter_mut().for_each(|v| *v /= n);
    }
    Ok(first.with_values(values))
}

pub fn run(_: &CallContext<'_>, mut args: BoundArgs) -> Result<CommandOutput> {
    let datasets = args.datasets("datasets")?;
    let op = Operation::parse(args.text("operation").as_deref().unwrap_or("+"))?;
    let mut combined = combine(&datasets, op)?;
    if let Some(name) = args.text("new-name") {
        combined.name = name;
    }
    Ok(CommandOutput::Single(Value::Dataset(combined)))
}
