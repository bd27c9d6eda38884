use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde_json::Value as JsonValue;

use super::model::{MeasureTable, SubjectRow, Value};

/// Column that uniquely identifies an exam-taker in every input table.
pub const SUBJECT_COLUMN: &str = "subjectcode";

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load one exam's LCA results from a directory.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`  – header row with a `subjectcode` column (canonical)
/// * `.json` – records-oriented array: `[{ "subjectcode": "...", ...measures }, ...]`
///
/// Emits a warning when any subject code repeats; rows are never dropped.
pub fn load_results(dir: &Path, filename: &str) -> Result<MeasureTable> {
    let path = dir.join(filename);
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" => load_csv(&path),
        "json" => load_json(&path),
        other => bail!("Unsupported file extension: .{other}"),
    }?;

    log::info!(
        "Loaded {} subjects from {} with columns {:?}",
        table.len(),
        path.display(),
        table.columns
    );
    warn_on_duplicates(&table);
    Ok(table)
}

/// Load the per-subject metadata table, if present.
///
/// A missing file is not an error: the comparison itself never needs the
/// metadata, so the run proceeds without the join.  A present-but-malformed
/// file still fails.
pub fn load_subject_info(data_dir: &Path, filename: &Path) -> Result<Option<MeasureTable>> {
    let path = data_dir.join(filename);
    if !path.exists() {
        log::warn!("No subject info at {}; continuing without it", path.display());
        return Ok(None);
    }
    let table = load_csv(&path)?;
    warn_on_duplicates(&table);
    Ok(Some(table))
}

/// One warning per table, naming every duplicated code.
fn warn_on_duplicates(table: &MeasureTable) {
    let dups = table.duplicate_subjects();
    if !dups.is_empty() {
        log::warn!("Some subject codes occur more than once: {dups:?}");
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: UTF-8, comma-separated, header row with column names, one of
/// which is `subjectcode`.  All other columns are type-guessed per cell.
fn load_csv(path: &Path) -> Result<MeasureTable> {
    let mut reader =
        csv::Reader::from_path(path).with_context(|| format!("opening CSV {}", path.display()))?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let subject_idx = headers
        .iter()
        .position(|h| h == SUBJECT_COLUMN)
        .with_context(|| format!("CSV missing '{SUBJECT_COLUMN}' column"))?;

    let columns: Vec<String> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != subject_idx)
        .map(|(_, h)| h.clone())
        .collect();

    let mut rows = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;

        let subject = record.get(subject_idx).unwrap_or("").trim().to_string();
        if subject.is_empty() {
            bail!("CSV row {row_no}: empty '{SUBJECT_COLUMN}' value");
        }

        let mut values = BTreeMap::new();
        for (col_idx, cell) in record.iter().enumerate() {
            if col_idx == subject_idx {
                continue;
            }
            let col_name = &headers[col_idx];
            values.insert(col_name.clone(), guess_value(cell));
        }

        rows.push(SubjectRow { subject, values });
    }

    Ok(MeasureTable::new(rows, columns))
}

fn guess_value(s: &str) -> Value {
    let s = s.trim();
    if s.is_empty() {
        return Value::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return Value::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return Value::Float(f);
    }
    if s == "true" || s == "false" {
        return Value::Bool(s == "true");
    }
    Value::String(s.to_string())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "subjectcode": "S001", "ld": 0.44, "cttr": 5.1 },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<MeasureTable> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading JSON {}", path.display()))?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut columns: Vec<String> = Vec::new();
    let mut rows = Vec::with_capacity(records.len());

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let subject = obj
            .get(SUBJECT_COLUMN)
            .and_then(|v| v.as_str())
            .with_context(|| format!("Row {i}: missing or non-string '{SUBJECT_COLUMN}'"))?
            .to_string();

        let mut values = BTreeMap::new();
        for (key, val) in obj {
            if key == SUBJECT_COLUMN {
                continue;
            }
            if !columns.contains(key) {
                columns.push(key.clone());
            }
            values.insert(key.clone(), json_to_value(val));
        }

        rows.push(SubjectRow { subject, values });
    }

    Ok(MeasureTable::new(rows, columns))
}

fn json_to_value(val: &JsonValue) -> Value {
    match val {
        JsonValue::String(s) => Value::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Value::Float(f)
            } else {
                Value::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Null => Value::Null,
        other => Value::String(other.to_string()),
    }
}
