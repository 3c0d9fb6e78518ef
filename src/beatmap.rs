use chrono::NaiveDateTime;
use serde::Serialize;

use crate::{data::Value, schema::Schema};

/// The fields of one beatmap difficulty that the report reads.
///
/// Every field is optional: a column may be missing from the dump, or a cell
/// may have failed coercion and been kept as text in the loaded table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Beatmap {
    pub beatmapset_id: Option<i64>,
    pub beatmap_id: Option<i64>,
    pub artist: Option<String>,
    pub title: Option<String>,
    pub source: Option<String>,
    pub creator: Option<String>,
    pub version: Option<String>,
    pub difficultyrating: Option<f64>,
    pub total_length: Option<i64>,
    pub hit_length: Option<i64>,
    pub bpm: Option<f64>,
    pub diff_approach: Option<f64>,
    pub max_combo: Option<i64>,
    pub playcount: Option<i64>,
    pub favourite_count: Option<i64>,
    pub mode: Option<i64>,
    pub approved_date: Option<NaiveDateTime>,
}

/// Column positions resolved once per table.
#[derive(Debug, Clone, Default)]
pub(crate) struct BeatmapColumns {
    beatmapset_id: Option<usize>,
    beatmap_id: Option<usize>,
    artist: Option<usize>,
    title: Option<usize>,
    source: Option<usize>,
    creator: Option<usize>,
    version: Option<usize>,
    difficultyrating: Option<usize>,
    total_length: Option<usize>,
    hit_length: Option<usize>,
    bpm: Option<usize>,
    diff_approach: Option<usize>,
    max_combo: Option<usize>,
    playcount: Option<usize>,
    favourite_count: Option<usize>,
    mode: Option<usize>,
    approved_date: Option<usize>,
}

impl BeatmapColumns {
    pub(crate) fn resolve(schema: &Schema) -> Self {
        let idx = |name: &str| schema.column_index(name);
        Self {
            beatmapset_id: idx("beatmapset_id"),
            beatmap_id: idx("beatmap_id"),
            artist: idx("artist"),
            title: idx("title"),
            source: idx("source"),
            creator: idx("creator"),
            version: idx("version"),
            difficultyrating: idx("difficultyrating"),
            total_length: idx("total_length"),
            hit_length: idx("hit_length"),
            bpm: idx("bpm"),
            diff_approach: idx("diff_approach"),
            max_combo: idx("max_combo"),
            playcount: idx("playcount"),
            favourite_count: idx("favourite_count"),
            mode: idx("mode"),
            approved_date: idx("approved_date"),
        }
    }

    pub(crate) fn project(&self, row: &[Option<Value>]) -> Beatmap {
        let cell = |idx: Option<usize>| idx.and_then(|i| row.get(i)).and_then(|c| c.as_ref());
        let int = |idx| cell(idx).and_then(Value::as_i64);
        let float = |idx| cell(idx).and_then(Value::as_f64);
        let text = |idx| cell(idx).and_then(Value::as_text).map(str::to_string);
        Beatmap {
            beatmapset_id: int(self.beatmapset_id),
            beatmap_id: int(self.beatmap_id),
            artist: text(self.artist),
            title: text(self.title),
            source: text(self.source),
            creator: text(self.creator),
            version: text(self.version),
            difficultyrating: float(self.difficultyrating),
            total_length: int(self.total_length),
            hit_length: int(self.hit_length),
            bpm: float(self.bpm),
            diff_approach: float(self.diff_approach),
            max_combo: int(self.max_combo),
            playcount: int(self.playcount),
            favourite_count: int(self.favourite_count),
            mode: int(self.mode),
            approved_date: cell(self.approved_date).and_then(Value::as_timestamp),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ColumnMeta, ColumnType};

    fn schema(names: &[(&str, ColumnType)]) -> Schema {
        Schema {
            columns: names
                .iter()
                .map(|(name, datatype)| ColumnMeta {
                    name: name.to_string(),
                    datatype: *datatype,
                    declared: true,
                })
                .collect(),
        }
    }

    #[test]
    fn projection_drops_cells_kept_as_text() {
        let schema = schema(&[
            ("playcount", ColumnType::Integer),
            ("artist", ColumnType::Text),
            ("bpm", ColumnType::Float),
        ]);
        let columns = BeatmapColumns::resolve(&schema);
        let row = vec![
            Some(Value::Text("n/a".into())),
            Some(Value::Text("xi".into())),
            Some(Value::Float(222.22)),
        ];
        let beatmap = columns.project(&row);
        assert_eq!(beatmap.playcount, None);
        assert_eq!(beatmap.artist.as_deref(), Some("xi"));
        assert_eq!(beatmap.bpm, Some(222.22));
        assert_eq!(beatmap.mode, None);
    }

    #[test]
    fn integer_columns_feed_float_fields() {
        let schema = schema(&[("difficultyrating", ColumnType::Integer)]);
        let beatmap = BeatmapColumns::resolve(&schema).project(&[Some(Value::Integer(4))]);
        assert_eq!(beatmap.difficultyrating, Some(4.0));
    }
}
