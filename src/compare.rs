use std::collections::{BTreeMap, BTreeSet};

use crate::data::filter::select_columns;
use crate::data::model::{MeasureTable, SubjectRow, TableError, Value};

// ---------------------------------------------------------------------------
// Paired differ – exams written in the same language
// ---------------------------------------------------------------------------

/// Per-subject differences on the given measures between two exams that
/// share their subjects.
///
/// The result's rows are the subjects present in *both* tables, in the
/// first table's row order (each code once); each cell is
/// `second − first`.  Subjects present in only one table are excluded:
/// an unmatched subject has no difference to compute.
pub fn paired_diff(
    first: &MeasureTable,
    second: &MeasureTable,
    measures: &[String],
) -> Result<MeasureTable, TableError> {
    let first_sel = select_columns(first, measures)?;
    let second_sel = select_columns(second, measures)?;

    let mut seen = BTreeSet::new();
    let mut rows = Vec::new();

    for row in &first_sel.rows {
        let Some(other) = second_sel.get(&row.subject) else {
            continue;
        };
        if !seen.insert(row.subject.clone()) {
            continue;
        }

        let mut values = BTreeMap::new();
        for measure in measures {
            let a = numeric_cell(row, measure)?;
            let b = numeric_cell(other, measure)?;
            values.insert(measure.clone(), Value::Float(b - a));
        }
        rows.push(SubjectRow {
            subject: row.subject.clone(),
            values,
        });
    }

    Ok(MeasureTable::new(rows, measures.to_vec()))
}

// ---------------------------------------------------------------------------
// Aggregate differ – exams written in different languages
// ---------------------------------------------------------------------------

/// Difference of the column-wise means on the given measures,
/// `mean(second) − mean(first)` per measure.
///
/// Subject identities are not comparable across languages, so no
/// row-level output exists in this mode.
pub fn aggregate_diff(
    first: &MeasureTable,
    second: &MeasureTable,
    measures: &[String],
) -> Result<Vec<(String, f64)>, TableError> {
    let means1 = column_means(first, measures)?;
    let means2 = column_means(second, measures)?;

    Ok(means1
        .iter()
        .zip(&means2)
        .map(|((measure, a), (_, b))| (measure.clone(), b - a))
        .collect())
}

// ---------------------------------------------------------------------------
// Column means
// ---------------------------------------------------------------------------

/// Column-wise mean of the given measures, in measure order.
///
/// Null cells (and NaN values) are skipped; a measure with no numeric
/// values yields NaN.  A string or bool cell is a hard error.
pub fn column_means(
    table: &MeasureTable,
    measures: &[String],
) -> Result<Vec<(String, f64)>, TableError> {
    let projected = select_columns(table, measures)?;

    let mut means = Vec::with_capacity(measures.len());
    for measure in &projected.columns {
        let mut sum = 0.0;
        let mut count = 0usize;
        for row in &projected.rows {
            let value = match row.values.get(measure) {
                None | Some(Value::Null) => continue,
                Some(v) => v.as_f64().ok_or_else(|| TableError::NonNumeric {
                    subject: row.subject.clone(),
                    measure: measure.clone(),
                })?,
            };
            if value.is_nan() {
                continue;
            }
            sum += value;
            count += 1;
        }
        let mean = if count == 0 { f64::NAN } else { sum / count as f64 };
        means.push((measure.clone(), mean));
    }

    Ok(means)
}

/// Numeric view of one cell.  Null (or an absent cell) reads as NaN so the
/// difference propagates it; strings and bools are a hard error.
fn numeric_cell(row: &SubjectRow, measure: &str) -> Result<f64, TableError> {
    match row.values.get(measure) {
        None | Some(Value::Null) => Ok(f64::NAN),
        Some(v) => v.as_f64().ok_or_else(|| TableError::NonNumeric {
            subject: row.subject.clone(),
            measure: measure.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &[(&str, &[(&str, f64)])]) -> MeasureTable {
        let mut columns: Vec<String> = Vec::new();
        let rows = rows
            .iter()
            .map(|(subject, cells)| {
                let mut values = BTreeMap::new();
                for (measure, value) in *cells {
                    if !columns.contains(&measure.to_string()) {
                        columns.push(measure.to_string());
                    }
                    values.insert(measure.to_string(), Value::Float(*value));
                }
                SubjectRow {
                    subject: subject.to_string(),
                    values,
                }
            })
            .collect();
        MeasureTable::new(rows, columns)
    }

    fn measures(names: &[&str]) -> Vec<String> {
        names.iter().map(|m| m.to_string()).collect()
    }

    #[test]
    fn test_paired_diff_intersection_scenario() {
        // T1 = {A: ld=1.0, B: ld=2.0}, T2 = {A: ld=1.5, C: ld=3.0}
        // → exactly {A: ld=0.5}; B and C are excluded.
        let t1 = table(&[("A", &[("ld", 1.0)]), ("B", &[("ld", 2.0)])]);
        let t2 = table(&[("A", &[("ld", 1.5)]), ("C", &[("ld", 3.0)])]);

        let diff = paired_diff(&t1, &t2, &measures(&["ld"])).unwrap();
        assert_eq!(diff.len(), 1);
        assert_eq!(diff.get("A").unwrap().values["ld"], Value::Float(0.5));
        assert!(diff.get("B").is_none());
        assert!(diff.get("C").is_none());
    }

    #[test]
    fn test_paired_diff_value_law() {
        let t1 = table(&[
            ("A", &[("ld", 1.0), ("cttr", 4.0)]),
            ("B", &[("ld", 2.0), ("cttr", 5.0)]),
        ]);
        let t2 = table(&[
            ("B", &[("ld", 2.5), ("cttr", 4.0)]),
            ("A", &[("ld", 0.5), ("cttr", 6.0)]),
        ]);

        let diff = paired_diff(&t1, &t2, &measures(&["ld", "cttr"])).unwrap();
        for subject in ["A", "B"] {
            for measure in ["ld", "cttr"] {
                let expected = t2.get(subject).unwrap().values[measure].as_f64().unwrap()
                    - t1.get(subject).unwrap().values[measure].as_f64().unwrap();
                assert_eq!(
                    diff.get(subject).unwrap().values[measure],
                    Value::Float(expected)
                );
            }
        }
    }

    #[test]
    fn test_paired_diff_row_order_follows_first_table() {
        let t1 = table(&[("B", &[("ld", 1.0)]), ("A", &[("ld", 2.0)])]);
        let t2 = table(&[("A", &[("ld", 3.0)]), ("B", &[("ld", 4.0)])]);

        let diff = paired_diff(&t1, &t2, &measures(&["ld"])).unwrap();
        let subjects: Vec<&str> = diff.rows.iter().map(|r| r.subject.as_str()).collect();
        assert_eq!(subjects, vec!["B", "A"]);
    }

    #[test]
    fn test_paired_diff_antisymmetry() {
        let t1 = table(&[("A", &[("ld", 1.0)]), ("B", &[("ld", 2.5)])]);
        let t2 = table(&[("A", &[("ld", 1.5)]), ("B", &[("ld", 2.0)])]);
        let ms = measures(&["ld"]);

        let forward = paired_diff(&t1, &t2, &ms).unwrap();
        let backward = paired_diff(&t2, &t1, &ms).unwrap();

        for row in &forward.rows {
            let fwd = row.values["ld"].as_f64().unwrap();
            let bwd = backward.get(&row.subject).unwrap().values["ld"]
                .as_f64()
                .unwrap();
            assert_eq!(fwd, -bwd);
        }
    }

    #[test]
    fn test_paired_diff_null_yields_nan() {
        let mut t1 = table(&[("A", &[("ld", 1.0)])]);
        t1.rows[0].values.insert("ld".to_string(), Value::Null);
        let t2 = table(&[("A", &[("ld", 1.5)])]);

        let diff = paired_diff(&t1, &t2, &measures(&["ld"])).unwrap();
        match &diff.get("A").unwrap().values["ld"] {
            Value::Float(v) => assert!(v.is_nan()),
            other => panic!("expected Float(NaN), got {other:?}"),
        }
    }

    #[test]
    fn test_paired_diff_non_numeric_fails() {
        let mut t1 = table(&[("A", &[("ld", 1.0)])]);
        t1.rows[0]
            .values
            .insert("ld".to_string(), Value::String("oops".into()));
        let t2 = table(&[("A", &[("ld", 1.5)])]);

        let err = paired_diff(&t1, &t2, &measures(&["ld"])).unwrap_err();
        assert_eq!(
            err,
            TableError::NonNumeric {
                subject: "A".to_string(),
                measure: "ld".to_string()
            }
        );
    }

    #[test]
    fn test_paired_diff_missing_measure_fails() {
        let t1 = table(&[("A", &[("ld", 1.0)])]);
        let t2 = table(&[("A", &[("ld", 1.5)])]);

        let err = paired_diff(&t1, &t2, &measures(&["cttr"])).unwrap_err();
        assert_eq!(err, TableError::MissingColumn("cttr".to_string()));
    }

    #[test]
    fn test_aggregate_diff_scenario() {
        // T1 ld = [1.0, 2.0], T2 ld = [2.0, 4.0] → 3.0 - 1.5 = 1.5
        let t1 = table(&[("A", &[("ld", 1.0)]), ("B", &[("ld", 2.0)])]);
        let t2 = table(&[("C", &[("ld", 2.0)]), ("D", &[("ld", 4.0)])]);

        let diff = aggregate_diff(&t1, &t2, &measures(&["ld"])).unwrap();
        assert_eq!(diff, vec![("ld".to_string(), 1.5)]);
    }

    #[test]
    fn test_aggregate_diff_antisymmetry() {
        let t1 = table(&[("A", &[("ld", 1.0), ("cttr", 3.0)])]);
        let t2 = table(&[("B", &[("ld", 2.0), ("cttr", 7.0)])]);
        let ms = measures(&["ld", "cttr"]);

        let forward = aggregate_diff(&t1, &t2, &ms).unwrap();
        let backward = aggregate_diff(&t2, &t1, &ms).unwrap();

        for ((m1, v1), (m2, v2)) in forward.iter().zip(&backward) {
            assert_eq!(m1, m2);
            assert_eq!(*v1, -*v2);
        }
    }

    #[test]
    fn test_column_means_skip_null_cells() {
        let mut t = table(&[
            ("A", &[("ld", 1.0)]),
            ("B", &[("ld", 3.0)]),
            ("C", &[("ld", 0.0)]),
        ]);
        t.rows[2].values.insert("ld".to_string(), Value::Null);

        let means = column_means(&t, &measures(&["ld"])).unwrap();
        assert_eq!(means, vec![("ld".to_string(), 2.0)]);
    }

    #[test]
    fn test_column_means_all_null_is_nan() {
        let mut t = table(&[("A", &[("ld", 0.0)])]);
        t.rows[0].values.insert("ld".to_string(), Value::Null);

        let means = column_means(&t, &measures(&["ld"])).unwrap();
        assert!(means[0].1.is_nan());
    }
}
