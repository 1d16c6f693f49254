//! Terminal output: Arrow pretty tables, or JSON with `--json`.

use std::sync::Arc;

use arrow::array::{ArrayRef, BooleanArray, Float32Array, StringArray, UInt32Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use arxivist_core::{HealthStatus, Recommendation, SubjectPrediction};
use serde::Serialize;

pub fn print_predictions(predictions: &[SubjectPrediction], json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(predictions);
    }
    let batch = ranked_batch(
        "label",
        predictions.iter().map(|p| (p.label.as_str(), p.score)),
    )?;
    println!("{}", render(&batch)?);
    Ok(())
}

pub fn print_recommendations(
    recommendations: &[Recommendation],
    json: bool,
) -> anyhow::Result<()> {
    if json {
        return print_json(recommendations);
    }
    let batch = ranked_batch(
        "title",
        recommendations.iter().map(|r| (r.title.as_str(), r.score)),
    )?;
    println!("{}", render(&batch)?);
    Ok(())
}

pub fn print_health(health: &HealthStatus, json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(health);
    }
    println!("models_dir: {}", health.models_dir);
    println!("ready:      {}", health.ready);
    println!("checked_at: {}", health.checked_at);
    println!("{}", render(&asset_batch(health)?)?);
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn render(batch: &RecordBatch) -> anyhow::Result<String> {
    Ok(pretty_format_batches(std::slice::from_ref(batch))?.to_string())
}

/// `rank | <name> | score` rows, ranks starting at 1.
fn ranked_batch<'a>(
    name: &str,
    rows: impl Iterator<Item = (&'a str, f32)>,
) -> anyhow::Result<RecordBatch> {
    let (names, scores): (Vec<&str>, Vec<f32>) = rows.unzip();
    let ranks: Vec<u32> = (1..=names.len() as u32).collect();

    let schema = Arc::new(Schema::new(vec![
        Field::new("rank", DataType::UInt32, false),
        Field::new(name, DataType::Utf8, false),
        Field::new("score", DataType::Float32, false),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(UInt32Array::from(ranks)),
        Arc::new(StringArray::from(names)),
        Arc::new(Float32Array::from(scores)),
    ];
    Ok(RecordBatch::try_new(schema, columns)?)
}

fn asset_batch(health: &HealthStatus) -> anyhow::Result<RecordBatch> {
    let keys: Vec<&str> = health.assets.keys().copied().collect();
    let present: Vec<bool> = health.assets.values().copied().collect();

    let schema = Arc::new(Schema::new(vec![
        Field::new("asset", DataType::Utf8, false),
        Field::new("present", DataType::Boolean, false),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(keys)),
        Arc::new(BooleanArray::from(present)),
    ];
    Ok(RecordBatch::try_new(schema, columns)?)
}
