use std::collections::HashMap;

use anyhow::{Context, Result, anyhow};
use log::info;

use crate::{cli::FrequencyArgs, data::Value, loader, table};

pub fn execute(args: &FrequencyArgs) -> Result<()> {
    let table = loader::load_table(&args.input)
        .with_context(|| format!("Loading beatmaps from {:?}", args.input))?;
    let column_index = table
        .schema
        .column_index(&args.column)
        .ok_or_else(|| anyhow!("Column '{}' not found in {:?}", args.column, args.input))?;

    let displayed = table
        .rows_for_mode(args.mode)
        .filter_map(|row| row.get(column_index).and_then(|cell| cell.as_ref()))
        .map(Value::as_display)
        .collect::<Vec<_>>();
    let total = displayed.len();
    let counts = top_values(displayed.iter().map(String::as_str), args.top);

    let rows = counts
        .into_iter()
        .map(|(value, count)| {
            let percent = if total > 0 {
                (count as f64 / total as f64) * 100.0
            } else {
                0.0
            };
            vec![value, count.to_string(), format!("{percent:.2}%")]
        })
        .collect::<Vec<_>>();
    let headers = vec![args.column.clone(), "count".to_string(), "percent".to_string()];
    table::print_table(&headers, &rows);
    info!(
        "Counted {} distinct value(s) shown from {} non-empty cell(s) in '{}'",
        rows.len(),
        total,
        args.column
    );
    Ok(())
}

/// Counts values and returns at most `top` of them, most frequent first.
///
/// Equal counts keep the order in which the values first appeared, so the
/// result only depends on the input order.
pub fn top_values<'a, I>(values: I, top: usize) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut positions: HashMap<&'a str, usize> = HashMap::new();
    let mut counts: Vec<(&'a str, usize)> = Vec::new();
    for value in values {
        match positions.get(value) {
            Some(&idx) => counts[idx].1 += 1,
            None => {
                positions.insert(value, counts.len());
                counts.push((value, 1));
            }
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(top);
    counts
        .into_iter()
        .map(|(value, count)| (value.to_string(), count))
        .collect()
}
