use anyhow::Result;

use crate::config::BinSpec;

use super::{
    Artifact, ReportInput, ReportJob,
    charts::{self, Axes, BarLayout, BarSeries},
    svg::{SPREAD_COLORS, palette},
};

/// Summed playcount per bin, one row per spread label in taxonomy order.
#[derive(Debug, Clone, PartialEq)]
pub struct SpreadPlaycounts {
    pub labels: Vec<String>,
    pub sums: Vec<Vec<f64>>,
    pub rows_used: usize,
}

pub fn playcount_by_spread(input: &ReportInput<'_>, bins: &BinSpec) -> SpreadPlaycounts {
    let labels = input.config.taxonomy.spread_labels.clone();
    let mut sums = vec![vec![0.0; bins.bin_count()]; labels.len()];
    let mut rows_used = 0usize;
    for row in input.standard() {
        let Some(spread) = row
            .spread_name
            .as_deref()
            .and_then(|name| labels.iter().position(|label| label == name))
        else {
            continue;
        };
        let (Some(hit_length), Some(playcount)) = (row.beatmap.hit_length, row.beatmap.playcount)
        else {
            continue;
        };
        if let Some(bin) = bins.index_of(hit_length as f64) {
            sums[spread][bin] += playcount as f64;
            rows_used += 1;
        }
    }
    SpreadPlaycounts {
        labels,
        sums,
        rows_used,
    }
}

fn bin_labels(bins: &BinSpec) -> Vec<String> {
    (0..bins.bin_count())
        .map(|idx| {
            format!(
                "{}-{}",
                bins.lower_edge(idx),
                bins.lower_edge(idx) + bins.width
            )
        })
        .collect()
}

pub fn render(job: &ReportJob, layout: BarLayout, input: &ReportInput<'_>) -> Result<Artifact> {
    let bins = match layout {
        BarLayout::Grouped => input.config.playcount_by_length.grouped,
        BarLayout::Stacked => input.config.playcount_by_length.stacked,
    };
    bins.validate(&format!("playcount_by_length.{}", layout.as_str()))?;
    let totals = playcount_by_spread(input, &bins);
    let series = totals
        .labels
        .into_iter()
        .zip(totals.sums)
        .enumerate()
        .map(|(idx, (label, values))| BarSeries {
            label,
            color: palette(&SPREAD_COLORS, idx),
            values,
        })
        .collect::<Vec<_>>();
    let title = job.title();
    let axes = Axes {
        title: &title,
        x_label: "drain time (s)",
        y_label: "total playcount",
    };
    let svg = charts::bar_chart(&axes, &bin_labels(&bins), &series, layout, 1);
    Ok(Artifact::figure(job, svg, totals.rows_used))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{beatmap::Beatmap, config::ReportConfig, enrich::Enricher};

    fn map(mode: i64, rating: f64, hit_length: i64, playcount: i64) -> Beatmap {
        Beatmap {
            mode: Some(mode),
            difficultyrating: Some(rating),
            hit_length: Some(hit_length),
            playcount: Some(playcount),
            ..Beatmap::default()
        }
    }

    #[test]
    fn sums_playcount_per_spread_and_bin() {
        let rows = Enricher::new(Default::default()).unwrap().enrich(vec![
            map(0, 2.0, 10, 100),
            map(0, 2.1, 29, 50),
            map(0, 2.1, 30, 7),
            map(0, 4.0, 200, 1_000),
            map(1, 2.0, 10, 9_999),
            map(0, 2.0, 400, 9_999),
        ]);
        let config = ReportConfig::default();
        let input = ReportInput::new(&rows, &config);
        let totals = playcount_by_spread(&input, &config.playcount_by_length.grouped);
        assert_eq!(totals.labels[1], "Normal");
        assert_eq!(totals.sums[1][0], 150.0);
        assert_eq!(totals.sums[1][1], 7.0);
        assert_eq!(totals.sums[3][6], 1_000.0);
        assert_eq!(totals.rows_used, 4);

        let stacked = playcount_by_spread(&input, &config.playcount_by_length.stacked);
        assert_eq!(stacked.sums[3], vec![0.0, 1_000.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(stacked.rows_used, 1);
    }
}
