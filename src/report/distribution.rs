use anyhow::Result;

use crate::{beatmap::Beatmap, config::BinSpec};

use super::{
    Artifact, ReportInput, ReportJob,
    charts::{self, Axes, Series},
    svg::{MODE_COLORS, Scale, palette},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    DifficultyRating,
    TotalLength,
    Playcount,
    LogPlaycount,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::DifficultyRating,
        Metric::TotalLength,
        Metric::Playcount,
        Metric::LogPlaycount,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            Metric::DifficultyRating => "difficulty-rating",
            Metric::TotalLength => "total-length",
            Metric::Playcount => "playcount",
            Metric::LogPlaycount => "log-playcount",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Metric::DifficultyRating => "Star rating distribution",
            Metric::TotalLength => "Map length distribution",
            Metric::Playcount => "Playcount distribution",
            Metric::LogPlaycount => "Log10 playcount distribution",
        }
    }

    pub fn axis_label(&self) -> &'static str {
        match self {
            Metric::DifficultyRating => "star rating",
            Metric::TotalLength => "total length (s)",
            Metric::Playcount => "playcount",
            Metric::LogPlaycount => "log10(playcount)",
        }
    }

    pub fn bins(&self, input: &ReportInput<'_>) -> BinSpec {
        let bins = &input.config.distributions;
        match self {
            Metric::DifficultyRating => bins.difficulty,
            Metric::TotalLength => bins.total_length,
            Metric::Playcount => bins.playcount,
            Metric::LogPlaycount => bins.log_playcount,
        }
    }

    /// The plotted value; the log view has none for non-positive playcounts.
    pub fn value(&self, beatmap: &Beatmap) -> Option<f64> {
        match self {
            Metric::DifficultyRating => beatmap.difficultyrating,
            Metric::TotalLength => beatmap.total_length.map(|v| v as f64),
            Metric::Playcount => beatmap.playcount.map(|v| v as f64),
            Metric::LogPlaycount => beatmap
                .playcount
                .filter(|&count| count > 0)
                .map(|count| (count as f64).log10()),
        }
    }
}

/// Counts per bin; values outside the bin range are dropped.
pub fn histogram<I>(values: I, bins: &BinSpec) -> Vec<u64>
where
    I: IntoIterator<Item = f64>,
{
    let mut counts = vec![0u64; bins.bin_count()];
    for value in values {
        if let Some(idx) = bins.index_of(value) {
            counts[idx] += 1;
        }
    }
    counts
}

struct ModeHistograms {
    labels: Vec<String>,
    counts: Vec<Vec<u64>>,
    rows_used: usize,
    excluded: usize,
}

fn per_mode(metric: Metric, input: &ReportInput<'_>) -> Result<ModeHistograms> {
    let bins = metric.bins(input);
    bins.validate(metric.slug())?;
    let labels = input.config.taxonomy.mode_labels.clone();
    let mut values = vec![Vec::new(); labels.len()];
    let mut excluded = 0usize;
    for (code, row) in input.known_modes() {
        match metric.value(&row.beatmap) {
            Some(value) => values[code].push(value),
            None if metric == Metric::LogPlaycount && row.beatmap.playcount.is_some() => {
                excluded += 1
            }
            None => {}
        }
    }
    let rows_used = values.iter().map(Vec::len).sum();
    let counts = values
        .into_iter()
        .map(|mode_values| histogram(mode_values, &bins))
        .collect();
    Ok(ModeHistograms {
        labels,
        counts,
        rows_used,
        excluded,
    })
}

fn annotate(artifact: Artifact, excluded: usize) -> Artifact {
    if excluded > 0 {
        artifact.with_note(format!(
            "{excluded} map(s) with playcount <= 0 excluded from the log scale"
        ))
    } else {
        artifact
    }
}

/// Frequency polygons of every mode over shared bins.
pub fn overlay(job: &ReportJob, metric: Metric, input: &ReportInput<'_>) -> Result<Artifact> {
    let bins = metric.bins(input);
    let histograms = per_mode(metric, input)?;
    let series = histograms
        .labels
        .iter()
        .zip(&histograms.counts)
        .enumerate()
        .map(|(idx, (label, counts))| Series {
            label: label.clone(),
            color: palette(&MODE_COLORS, idx),
            points: counts
                .iter()
                .enumerate()
                .map(|(bin, &count)| (bins.center(bin), count as f64))
                .collect(),
        })
        .collect::<Vec<_>>();
    let title = job.title();
    let axes = Axes {
        title: &title,
        x_label: metric.axis_label(),
        y_label: "maps",
    };
    let svg = charts::line_chart(&axes, Scale::new(bins.start, bins.end), &series);
    Ok(annotate(
        Artifact::figure(job, svg, histograms.rows_used),
        histograms.excluded,
    ))
}

/// One histogram panel per mode.
pub fn panels(job: &ReportJob, metric: Metric, input: &ReportInput<'_>) -> Result<Artifact> {
    let bins = metric.bins(input);
    let histograms = per_mode(metric, input)?;
    let panels = histograms
        .labels
        .into_iter()
        .zip(histograms.counts)
        .enumerate()
        .map(|(idx, (label, counts))| (label, palette(&MODE_COLORS, idx), counts))
        .collect::<Vec<_>>();
    let title = job.title();
    let axes = Axes {
        title: &title,
        x_label: metric.axis_label(),
        y_label: "maps",
    };
    let svg = charts::histogram_panels(&axes, &bins, &panels);
    Ok(annotate(
        Artifact::figure(job, svg, histograms.rows_used),
        histograms.excluded,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn histogram_drops_values_outside_range() {
        let bins = BinSpec::new(0.0, 3.0, 1.0);
        let counts = histogram([0.0, 0.5, 1.0, 2.99, 3.0, -0.1, f64::NAN], &bins);
        assert_eq!(counts, vec![2, 1, 1]);
    }

    #[test]
    fn log_playcount_skips_non_positive_counts() {
        let mut beatmap = Beatmap {
            playcount: Some(0),
            ..Beatmap::default()
        };
        assert_eq!(Metric::LogPlaycount.value(&beatmap), None);
        beatmap.playcount = Some(-3);
        assert_eq!(Metric::LogPlaycount.value(&beatmap), None);
        beatmap.playcount = Some(1_000);
        let log = Metric::LogPlaycount.value(&beatmap).unwrap();
        assert!((log - 3.0).abs() < 1e-12);
        assert_eq!(Metric::Playcount.value(&beatmap), Some(1_000.0));
    }
}
