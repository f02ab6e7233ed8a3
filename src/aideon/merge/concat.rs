use tracing::{debug, instrument};

use crate::aideon::merge::model::{Cell, MergedTable, Table};
use crate::aideon::merge::normalize::Normalized;
use crate::aideon::merge::options::MergeOptions;

/// Concatenates the normalized tables row-wise, in source order.
///
/// Data columns follow the unified schema. Widened tables line up by
/// construction; a degraded table is laid out by position, its column `i`
/// filling schema column `i`, with surplus columns dropped and missing ones
/// left null.
///
/// With `add_source_column` a trailing column records each row's source file
/// name. A schema column already carrying that label is overwritten in place
/// rather than duplicated. With `ignore_headers` the displayed data labels are overwritten by
/// position with `first_header`; the values underneath keep schema order, so
/// a label may end up above another column's data.
#[instrument(level = "info", skip_all, fields(table_count = normalized.tables.len()))]
pub fn concatenate(
    normalized: &Normalized,
    options: &MergeOptions,
    first_header: &[String],
) -> MergedTable {
    let width = normalized.schema.len();
    let row_count = normalized.total_rows();

    let mut columns: Vec<Vec<Cell>> = (0..width)
        .map(|_| Vec::with_capacity(row_count))
        .collect();
    let mut provenance: Vec<Cell> = Vec::new();

    for table in &normalized.tables {
        append_positionally(&mut columns, table);
        if options.add_source_column {
            provenance.extend(std::iter::repeat_n(
                Cell::text(table.name.as_str()),
                table.row_count,
            ));
        }
    }

    let mut header = normalized.schema.labels().to_vec();
    if options.ignore_headers {
        for (slot, label) in header.iter_mut().zip(first_header) {
            slot.clone_from(label);
        }
    }

    if options.add_source_column {
        let label = &options.source_column_name;
        match normalized.schema.position(label) {
            Some(index) => {
                debug!(%label, "source column replaces existing column");
                header[index].clone_from(label);
                columns[index] = provenance;
            }
            None => {
                header.push(label.clone());
                columns.push(provenance);
            }
        }
    }

    debug!(rows = row_count, columns = header.len(), "tables concatenated");
    MergedTable {
        header,
        columns,
        row_count,
    }
}

fn append_positionally(columns: &mut [Vec<Cell>], table: &Table) {
    for (index, target) in columns.iter_mut().enumerate() {
        let source = table.columns.get(index).map(|column| column.values.as_slice());
        target.extend((0..table.row_count).map(|row| {
            source
                .and_then(|values| values.get(row))
                .cloned()
                .unwrap_or(Cell::Null)
        }));
    }
}
