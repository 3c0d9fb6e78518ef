//! Loading the beatmap dump into a deduplicated, typed table.
//!
//! Raw rows are kept as strings until deduplication is done; equality on the
//! upstream text avoids comparing floats. Typing then follows the declared
//! schema in [`crate::schema`], falling back to inference for columns the
//! schema does not know about.

use std::{
    collections::{HashMap, HashSet},
    fs::{self, File},
    io::BufReader,
    path::Path,
};

use anyhow::{Context, Result};
use log::{debug, info, warn};
use serde_json::{Map, Value as JsonValue};

use crate::{
    beatmap::Beatmap,
    data::{Value, parse_typed_value},
    error::{CoercionWarning, LoadError},
    io_utils,
    schema::{self, ColumnMeta, Schema},
};

/// Untyped rows in column order; `None` marks a field absent from the record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

#[derive(Debug, Clone, Default)]
pub struct LoadedTable {
    pub schema: Schema,
    pub rows: Vec<Vec<Option<Value>>>,
    pub duplicates_removed: usize,
    pub warnings: Vec<CoercionWarning>,
}

impl LoadedTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let index = self.schema.column_index(column)?;
        self.rows.get(row)?.get(index)?.as_ref()
    }

    /// Rows whose `mode` equals `mode`, or every row when no mode is given.
    pub fn rows_for_mode(&self, mode: Option<i64>) -> impl Iterator<Item = &[Option<Value>]> {
        let mode_idx = self.schema.column_index("mode");
        self.rows.iter().map(Vec::as_slice).filter(move |row| match mode {
            None => true,
            Some(wanted) => mode_idx
                .and_then(|idx| row.get(idx))
                .and_then(|cell| cell.as_ref())
                .and_then(Value::as_i64)
                == Some(wanted),
        })
    }

    /// Projects every row onto the fields the report uses.
    pub fn beatmaps(&self) -> Vec<Beatmap> {
        let columns = crate::beatmap::BeatmapColumns::resolve(&self.schema);
        self.rows.iter().map(|row| columns.project(row)).collect()
    }
}

/// Loads either the JSON dump or a previously written CSV cache.
pub fn load_table(path: &Path) -> Result<LoadedTable, LoadError> {
    if io_utils::is_csv_path(path) {
        read_csv(path)
    } else {
        load_json(path)
    }
}

pub fn load_json(path: &Path) -> Result<LoadedTable, LoadError> {
    let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let raw = parse_json_records(path, &text)?;
    info!(
        "Read {} record(s) across {} column(s) from {:?}",
        raw.rows.len(),
        raw.headers.len(),
        path
    );
    Ok(finish(raw))
}

pub fn read_csv(path: &Path) -> Result<LoadedTable, LoadError> {
    let csv_error = |source| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = io_utils::open_csv_reader(BufReader::new(file));
    let headers = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(str::to_string)
        .collect::<Vec<_>>();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        rows.push(
            record
                .iter()
                .map(|field| (!field.trim().is_empty()).then(|| field.to_string()))
                .collect(),
        );
    }
    info!("Read {} cached row(s) from {:?}", rows.len(), path);
    Ok(finish(RawTable { headers, rows }))
}

fn finish(raw: RawTable) -> LoadedTable {
    let (unique, duplicates_removed) = deduplicate(raw);
    if duplicates_removed > 0 {
        info!("Dropped {duplicates_removed} duplicate row(s)");
    }
    let mut table = type_table(unique);
    table.duplicates_removed = duplicates_removed;
    log_warnings(&table.warnings);
    table
}

/// Accepts a flat array of records or the downloader's array of result pages.
pub fn parse_json_records(path: &Path, text: &str) -> Result<RawTable, LoadError> {
    let document: JsonValue = serde_json::from_str(text).map_err(|source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    let items = match document {
        JsonValue::Array(items) => items,
        other => {
            return Err(LoadError::NotRecordArray {
                path: path.to_path_buf(),
                found: json_kind(&other),
            });
        }
    };

    let mut records: Vec<Map<String, JsonValue>> = Vec::with_capacity(items.len());
    for item in items {
        match item {
            JsonValue::Object(record) => records.push(record),
            JsonValue::Array(page) => {
                for entry in page {
                    match entry {
                        JsonValue::Object(record) => records.push(record),
                        other => {
                            return Err(LoadError::NotAnObject {
                                path: path.to_path_buf(),
                                index: records.len() + 1,
                                found: json_kind(&other),
                            });
                        }
                    }
                }
            }
            other => {
                return Err(LoadError::NotAnObject {
                    path: path.to_path_buf(),
                    index: records.len() + 1,
                    found: json_kind(&other),
                });
            }
        }
    }

    let mut headers: Vec<String> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    for record in &records {
        for key in record.keys() {
            if !positions.contains_key(key) {
                positions.insert(key.clone(), headers.len());
                headers.push(key.clone());
            }
        }
    }

    let rows = records
        .iter()
        .map(|record| {
            let mut row = vec![None; headers.len()];
            for (key, value) in record {
                row[positions[key]] = json_cell(value);
            }
            row
        })
        .collect();
    Ok(RawTable { headers, rows })
}

fn json_cell(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::Null => None,
        JsonValue::String(s) if s.trim().is_empty() => None,
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(if *b { "1" } else { "0" }.to_string()),
        nested => Some(nested.to_string()),
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

/// Keeps the first of every set of identical rows, preserving input order.
pub fn deduplicate(raw: RawTable) -> (RawTable, usize) {
    let RawTable { headers, rows } = raw;
    let total = rows.len();
    let mut seen: HashSet<Vec<Option<String>>> = HashSet::with_capacity(total);
    let rows = rows
        .into_iter()
        .filter(|row| seen.insert(row.clone()))
        .collect::<Vec<_>>();
    let removed = total - rows.len();
    (RawTable { headers, rows }, removed)
}

pub fn type_table(raw: RawTable) -> LoadedTable {
    let columns = raw
        .headers
        .iter()
        .enumerate()
        .map(|(idx, name)| match schema::declared_type(name) {
            Some(datatype) => ColumnMeta {
                name: name.clone(),
                datatype,
                declared: true,
            },
            None => {
                let datatype = schema::infer_column_type(
                    raw.rows
                        .iter()
                        .filter_map(|row| row.get(idx).and_then(|cell| cell.as_deref())),
                );
                debug!("Inferred {datatype} for undeclared column '{name}'");
                ColumnMeta {
                    name: name.clone(),
                    datatype,
                    declared: false,
                }
            }
        })
        .collect::<Vec<_>>();

    let mut warnings = Vec::new();
    let rows = raw
        .rows
        .iter()
        .enumerate()
        .map(|(row_idx, row)| {
            columns
                .iter()
                .enumerate()
                .map(|(col_idx, column)| {
                    let raw_cell = row.get(col_idx).and_then(|cell| cell.as_deref())?;
                    match parse_typed_value(raw_cell, &column.datatype) {
                        Ok(value) => value,
                        Err(_) => {
                            warnings.push(CoercionWarning {
                                column: column.name.clone(),
                                record: row_idx + 1,
                                raw: raw_cell.to_string(),
                                expected: column.datatype,
                            });
                            Some(Value::Text(raw_cell.to_string()))
                        }
                    }
                })
                .collect()
        })
        .collect();

    LoadedTable {
        schema: Schema { columns },
        rows,
        duplicates_removed: 0,
        warnings,
    }
}

fn log_warnings(warnings: &[CoercionWarning]) {
    let mut per_column: Vec<(&str, usize)> = Vec::new();
    for warning in warnings {
        debug!("{warning}");
        match per_column
            .iter_mut()
            .find(|(column, _)| *column == warning.column)
        {
            Some((_, count)) => *count += 1,
            None => per_column.push((warning.column.as_str(), 1)),
        }
    }
    for (column, count) in per_column {
        warn!("{count} value(s) in column '{column}' could not be coerced and were kept as text");
    }
}

pub fn write_csv(table: &LoadedTable, path: &Path) -> Result<()> {
    let mut writer = io_utils::open_csv_writer(path)?;
    writer
        .write_record(table.schema.headers())
        .with_context(|| format!("Writing header to {path:?}"))?;
    for (idx, row) in table.rows.iter().enumerate() {
        let record = row
            .iter()
            .map(|cell| cell.as_ref().map(Value::as_display).unwrap_or_default())
            .collect::<Vec<_>>();
        writer
            .write_record(&record)
            .with_context(|| format!("Writing row {} to {path:?}", idx + 2))?;
    }
    writer
        .flush()
        .with_context(|| format!("Flushing {path:?}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColumnType;

    fn raw(headers: &[&str], rows: &[&[Option<&str>]]) -> RawTable {
        RawTable {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(|cell| cell.map(str::to_string)).collect())
                .collect(),
        }
    }

    #[test]
    fn deduplicate_keeps_first_occurrence_in_order() {
        let table = raw(
            &["beatmap_id", "title"],
            &[
                &[Some("1"), Some("a")],
                &[Some("2"), Some("b")],
                &[Some("1"), Some("a")],
                &[Some("1"), None],
            ],
        );
        let (unique, removed) = deduplicate(table);
        assert_eq!(removed, 1);
        assert_eq!(unique.rows.len(), 3);
        assert_eq!(unique.rows[2], vec![Some("1".to_string()), None]);
    }

    #[test]
    fn type_table_applies_declared_types_and_warns() {
        let table = type_table(raw(
            &["playcount", "creator", "extra"],
            &[
                &[Some("100"), Some("1234"), Some("1.5")],
                &[Some("lots"), Some("peppy"), Some("2")],
            ],
        ));
        assert_eq!(table.schema.columns[0].datatype, ColumnType::Integer);
        assert_eq!(table.schema.columns[1].datatype, ColumnType::Text);
        assert_eq!(table.schema.columns[2].datatype, ColumnType::Float);
        assert!(!table.schema.columns[2].declared);
        assert_eq!(table.rows[0][0], Some(Value::Integer(100)));
        assert_eq!(table.rows[0][1], Some(Value::Text("1234".into())));
        assert_eq!(table.rows[1][0], Some(Value::Text("lots".into())));
        assert_eq!(table.warnings.len(), 1);
        assert_eq!(table.warnings[0].record, 2);
        assert_eq!(table.warnings[0].expected, ColumnType::Integer);
    }

    #[test]
    fn json_pages_are_flattened() {
        let text = r#"[[{"beatmap_id":"1"},{"beatmap_id":"2"}],[{"beatmap_id":"3","mode":"0"}]]"#;
        let table = parse_json_records(Path::new("maps.json"), text).expect("parse pages");
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.headers.len(), 2);
        let mode_idx = table.headers.iter().position(|h| h == "mode").unwrap();
        assert_eq!(table.rows[0][mode_idx], None);
        assert_eq!(table.rows[2][mode_idx], Some("0".to_string()));
    }

    #[test]
    fn columns_follow_first_appearance() {
        let text = r#"[{"title":"a","artist":"b"},{"mode":"0","title":"c","bpm":"1"}]"#;
        let table = parse_json_records(Path::new("maps.json"), text).expect("parse");
        assert_eq!(table.headers, vec!["title", "artist", "mode", "bpm"]);
    }

    #[test]
    fn json_scalars_other_than_strings_are_stringified() {
        let text = r#"[{"bpm": 180.5, "video": true, "source": null}]"#;
        let table = parse_json_records(Path::new("maps.json"), text).expect("parse");
        let cell = |name: &str| {
            let idx = table.headers.iter().position(|h| h == name).unwrap();
            table.rows[0][idx].clone()
        };
        assert_eq!(cell("bpm"), Some("180.5".to_string()));
        assert_eq!(cell("video"), Some("1".to_string()));
        assert_eq!(cell("source"), None);
    }

    #[test]
    fn json_must_be_an_array_of_objects() {
        let err = parse_json_records(Path::new("maps.json"), r#"{"error":"bad key"}"#).unwrap_err();
        assert!(matches!(err, LoadError::NotRecordArray { found: "an object", .. }));

        let err = parse_json_records(Path::new("maps.json"), r#"[{"a":"1"}, 5]"#).unwrap_err();
        assert!(matches!(err, LoadError::NotAnObject { index: 2, .. }));

        let err = parse_json_records(Path::new("maps.json"), "[{").unwrap_err();
        assert!(matches!(err, LoadError::Json { .. }));
    }
}
