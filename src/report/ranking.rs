use itertools::Itertools;

use crate::{enrich::EnrichedBeatmap, table::TextTable};

use super::{Artifact, ReportInput, ReportJob};

/// One row per mapset (the first in table order), most favourited first.
/// Equal counts keep table order.
pub fn most_favorited<'a>(rows: &'a [EnrichedBeatmap], top: usize) -> Vec<&'a EnrichedBeatmap> {
    rows.iter()
        .filter(|row| row.beatmap.beatmapset_id.is_some())
        .unique_by(|row| row.beatmap.beatmapset_id)
        .sorted_by(|a, b| b.beatmap.favourite_count.cmp(&a.beatmap.favourite_count))
        .take(top)
        .collect()
}

/// Every difficulty ranked on its own, most played first.
pub fn most_played<'a>(rows: &'a [EnrichedBeatmap], top: usize) -> Vec<&'a EnrichedBeatmap> {
    rows.iter()
        .sorted_by(|a, b| b.beatmap.playcount.cmp(&a.beatmap.playcount))
        .take(top)
        .collect()
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn count(value: Option<i64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

pub fn most_favorited_table(job: &ReportJob, input: &ReportInput<'_>) -> Artifact {
    let ranked = most_favorited(input.rows, input.config.ranking_top);
    let rows = ranked
        .iter()
        .map(|row| {
            let map = &row.beatmap;
            vec![
                text(&map.creator),
                text(&map.artist),
                text(&map.title),
                count(map.favourite_count),
            ]
        })
        .collect();
    let headers = ["creator", "artist", "title", "favourite_count"]
        .map(String::from)
        .to_vec();
    Artifact::table(job, TextTable::new(headers, rows), ranked.len())
}

pub fn most_played_table(job: &ReportJob, input: &ReportInput<'_>) -> Artifact {
    let ranked = most_played(input.rows, input.config.ranking_top);
    let rows = ranked
        .iter()
        .map(|row| {
            let map = &row.beatmap;
            vec![
                text(&map.creator),
                text(&map.artist),
                text(&map.title),
                text(&map.version),
                count(map.playcount),
            ]
        })
        .collect();
    let headers = ["creator", "artist", "title", "version", "playcount"]
        .map(String::from)
        .to_vec();
    Artifact::table(job, TextTable::new(headers, rows), ranked.len())
}
