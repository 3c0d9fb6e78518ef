//! Column schema for the beatmap table.
//!
//! Known upstream API fields carry a declared [`ColumnType`] so that
//! numeric-looking free text (a creator called `"1234"`, say) stays text and
//! string-encoded numbers always become numbers. Columns the dump contains
//! that are not declared here are inferred from their values.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    Integer,
    Float,
    Text,
    Timestamp,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Integer => "Integer",
            ColumnType::Float => "Float",
            ColumnType::Text => "Text",
            ColumnType::Timestamp => "Timestamp",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Integer | ColumnType::Float)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared types for the fields returned by the osu! `get_beatmaps` API.
pub const BEATMAP_COLUMNS: &[(&str, ColumnType)] = &[
    ("beatmapset_id", ColumnType::Integer),
    ("beatmap_id", ColumnType::Integer),
    ("approved", ColumnType::Integer),
    ("total_length", ColumnType::Integer),
    ("hit_length", ColumnType::Integer),
    ("version", ColumnType::Text),
    ("file_md5", ColumnType::Text),
    ("diff_size", ColumnType::Float),
    ("diff_overall", ColumnType::Float),
    ("diff_approach", ColumnType::Float),
    ("diff_drain", ColumnType::Float),
    ("diff_aim", ColumnType::Float),
    ("diff_speed", ColumnType::Float),
    ("mode", ColumnType::Integer),
    ("count_normal", ColumnType::Integer),
    ("count_slider", ColumnType::Integer),
    ("count_spinner", ColumnType::Integer),
    ("submit_date", ColumnType::Timestamp),
    ("approved_date", ColumnType::Timestamp),
    ("last_update", ColumnType::Timestamp),
    ("artist", ColumnType::Text),
    ("title", ColumnType::Text),
    ("creator", ColumnType::Text),
    ("creator_id", ColumnType::Integer),
    ("bpm", ColumnType::Float),
    ("source", ColumnType::Text),
    ("tags", ColumnType::Text),
    ("genre_id", ColumnType::Integer),
    ("language_id", ColumnType::Integer),
    ("favourite_count", ColumnType::Integer),
    ("rating", ColumnType::Float),
    ("storyboard", ColumnType::Integer),
    ("video", ColumnType::Integer),
    ("download_unavailable", ColumnType::Integer),
    ("audio_unavailable", ColumnType::Integer),
    ("playcount", ColumnType::Integer),
    ("passcount", ColumnType::Integer),
    ("packs", ColumnType::Text),
    ("max_combo", ColumnType::Integer),
    ("difficultyrating", ColumnType::Float),
];

pub fn declared_type(name: &str) -> Option<ColumnType> {
    BEATMAP_COLUMNS
        .iter()
        .find(|(column, _)| *column == name)
        .map(|(_, ty)| *ty)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMeta {
    pub name: String,
    pub datatype: ColumnType,
    /// False when the type was inferred from the data.
    pub declared: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub columns: Vec<ColumnMeta>,
}

impl Schema {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column.name == name)
    }

    pub fn headers(&self) -> Vec<String> {
        self.columns.iter().map(|column| column.name.clone()).collect()
    }

    pub fn numeric_columns(&self) -> impl Iterator<Item = (usize, &ColumnMeta)> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, column)| column.datatype.is_numeric())
    }
}

/// Picks a type for an undeclared column: Integer when every present value is
/// an integer, Float when every one is a float, Text otherwise.
pub fn infer_column_type<'a, I>(values: I) -> ColumnType
where
    I: IntoIterator<Item = &'a str>,
{
    let mut all_integer = true;
    let mut all_float = true;
    let mut seen = false;
    for value in values {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            continue;
        }
        seen = true;
        if all_integer && trimmed.parse::<i64>().is_err() {
            all_integer = false;
        }
        if trimmed.parse::<f64>().is_err() {
            all_float = false;
            break;
        }
    }
    match (seen, all_integer, all_float) {
        (false, _, _) => ColumnType::Text,
        (true, true, _) => ColumnType::Integer,
        (true, false, true) => ColumnType::Float,
        _ => ColumnType::Text,
    }
}
