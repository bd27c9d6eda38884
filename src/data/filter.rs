use super::model::{MeasureTable, SubjectRow, TableError};

// ---------------------------------------------------------------------------
// Column projection
// ---------------------------------------------------------------------------

/// Project a table down to the given measure columns.
///
/// The result has exactly the requested columns, in the requested order,
/// over the same row set and row order as the input.  Every requested
/// column must exist in the input.
pub fn select_columns(
    table: &MeasureTable,
    columns: &[String],
) -> Result<MeasureTable, TableError> {
    for col in columns {
        if !table.columns.contains(col) {
            return Err(TableError::MissingColumn(col.clone()));
        }
    }

    let rows = table
        .rows
        .iter()
        .map(|row| SubjectRow {
            subject: row.subject.clone(),
            values: columns
                .iter()
                .filter_map(|col| row.values.get(col).map(|v| (col.clone(), v.clone())))
                .collect(),
        })
        .collect();

    Ok(MeasureTable::new(rows, columns.to_vec()))
}
