use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::{beatmap::Beatmap, config::Taxonomy, error::ConfigError};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedBeatmap {
    pub beatmap: Beatmap,
    pub spread_name: Option<String>,
    pub month: Option<NaiveDate>,
    pub mode_name: String,
}

impl EnrichedBeatmap {
    pub fn is_standard(&self) -> bool {
        self.beatmap.mode == Some(0)
    }
}

/// Derives the spread label, approval month and mode name of each map without
/// touching its source fields. Enriching an enriched row again is a no-op.
#[derive(Debug, Clone)]
pub struct Enricher {
    taxonomy: Taxonomy,
}

impl Enricher {
    pub fn new(taxonomy: Taxonomy) -> Result<Self, ConfigError> {
        taxonomy.validate()?;
        Ok(Self { taxonomy })
    }

    pub fn enrich(&self, beatmaps: Vec<Beatmap>) -> Vec<EnrichedBeatmap> {
        beatmaps
            .into_iter()
            .map(|beatmap| self.enrich_one(beatmap))
            .collect()
    }

    pub fn enrich_one(&self, beatmap: Beatmap) -> EnrichedBeatmap {
        EnrichedBeatmap {
            spread_name: beatmap
                .difficultyrating
                .and_then(|rating| self.spread_label(rating))
                .map(str::to_string),
            month: beatmap.approved_date.map(month_of),
            mode_name: self.mode_label(beatmap.mode).to_string(),
            beatmap,
        }
    }

    /// Recomputes the derived fields of already enriched rows.
    pub fn refresh(&self, rows: &[EnrichedBeatmap]) -> Vec<EnrichedBeatmap> {
        rows.iter()
            .map(|row| self.enrich_one(row.beatmap.clone()))
            .collect()
    }

    /// Label of the last bucket whose lower bound is `<= rating`. Ratings
    /// below the first bound take the first label; NaN has no label.
    pub fn spread_label(&self, rating: f64) -> Option<&str> {
        if rating.is_nan() {
            return None;
        }
        let position = self
            .taxonomy
            .spread_boundaries
            .partition_point(|&boundary| boundary <= rating);
        let index = position.saturating_sub(1);
        self.taxonomy.spread_labels.get(index).map(String::as_str)
    }

    pub fn mode_label(&self, mode: Option<i64>) -> &str {
        mode.and_then(|code| usize::try_from(code).ok())
            .and_then(|code| self.taxonomy.mode_labels.get(code))
            .map(String::as_str)
            .unwrap_or(self.taxonomy.unknown_mode_label.as_str())
    }
}

pub fn month_of(timestamp: NaiveDateTime) -> NaiveDate {
    let date = timestamp.date();
    date.with_day(1).unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enricher() -> Enricher {
        Enricher::new(Taxonomy::default()).expect("default taxonomy")
    }

    #[test]
    fn spread_boundaries_belong_to_upper_bucket() {
        let enricher = enricher();
        assert_eq!(enricher.spread_label(1.50), Some("Easy"));
        assert_eq!(enricher.spread_label(1.51), Some("Normal"));
        assert_eq!(enricher.spread_label(2.0), Some("Normal"));
        assert_eq!(enricher.spread_label(2.26), Some("Hard"));
        assert_eq!(enricher.spread_label(6.76), Some("Expert+"));
        assert_eq!(enricher.spread_label(10.0), Some("Expert+"));
    }

    #[test]
    fn ratings_below_first_bound_clamp_to_first_label() {
        let enricher = enricher();
        assert_eq!(enricher.spread_label(-0.5), Some("Easy"));
        assert_eq!(enricher.spread_label(f64::NEG_INFINITY), Some("Easy"));
        assert_eq!(enricher.spread_label(f64::NAN), None);
    }

    #[test]
    fn unknown_modes_get_fallback_label() {
        let enricher = enricher();
        assert_eq!(enricher.mode_label(Some(0)), "Standard");
        assert_eq!(enricher.mode_label(Some(3)), "Mania");
        assert_eq!(enricher.mode_label(Some(4)), "Unknown");
        assert_eq!(enricher.mode_label(Some(-1)), "Unknown");
        assert_eq!(enricher.mode_label(None), "Unknown");
    }

    #[test]
    fn month_truncates_to_first_day() {
        let ts = NaiveDate::from_ymd_opt(2016, 2, 29)
            .unwrap()
            .and_hms_opt(23, 59, 59)
            .unwrap();
        assert_eq!(month_of(ts), NaiveDate::from_ymd_opt(2016, 2, 1).unwrap());
    }

    #[test]
    fn missing_fields_propagate_as_none() {
        let row = enricher().enrich_one(Beatmap::default());
        assert_eq!(row.spread_name, None);
        assert_eq!(row.month, None);
        assert_eq!(row.mode_name, "Unknown");
    }
}
