use anyhow::{Result, anyhow};
use chrono::{Datelike, Months, NaiveDate};

use super::{
    Artifact, ReportInput, ReportJob,
    charts::{self, Axes, BarLayout, BarSeries, Series},
    svg::{MODE_COLORS, Scale, palette},
};

/// Counts over every month between the first and last approval, inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyCounts {
    pub months: Vec<NaiveDate>,
    /// Indexed by mode code, then by month.
    pub counts: Vec<Vec<u64>>,
    pub rows_used: usize,
}

pub fn monthly_counts(input: &ReportInput<'_>) -> Result<MonthlyCounts> {
    let modes = input.config.taxonomy.mode_labels.len();
    let dated = input
        .known_modes()
        .filter_map(|(code, row)| row.month.map(|month| (code, month)))
        .collect::<Vec<_>>();
    let (Some(first), Some(last)) = (
        dated.iter().map(|(_, month)| *month).min(),
        dated.iter().map(|(_, month)| *month).max(),
    ) else {
        return Ok(MonthlyCounts {
            months: Vec::new(),
            counts: vec![Vec::new(); modes],
            rows_used: 0,
        });
    };

    let mut months = Vec::new();
    let mut current = first;
    while current <= last {
        months.push(current);
        current = current
            .checked_add_months(Months::new(1))
            .ok_or_else(|| anyhow!("Month after {current} is out of range"))?;
    }

    let mut counts = vec![vec![0u64; months.len()]; modes];
    for (code, month) in &dated {
        let idx = month_offset(first, *month);
        counts[*code][idx] += 1;
    }
    Ok(MonthlyCounts {
        months,
        counts,
        rows_used: dated.len(),
    })
}

fn month_offset(first: NaiveDate, month: NaiveDate) -> usize {
    let years = month.year() - first.year();
    let offset = years * 12 + month.month() as i32 - first.month() as i32;
    offset.max(0) as usize
}

fn fractional_month(month: NaiveDate) -> f64 {
    month.year() as f64 + month.month0() as f64 / 12.0
}

fn month_labels(months: &[NaiveDate]) -> Vec<String> {
    months
        .iter()
        .map(|month| month.format("%Y-%m").to_string())
        .collect()
}

pub fn stacked_bars(job: &ReportJob, input: &ReportInput<'_>) -> Result<Artifact> {
    let monthly = monthly_counts(input)?;
    let series = input
        .config
        .taxonomy
        .mode_labels
        .iter()
        .zip(&monthly.counts)
        .enumerate()
        .map(|(idx, (label, counts))| BarSeries {
            label: label.clone(),
            color: palette(&MODE_COLORS, idx),
            values: counts.iter().map(|&count| count as f64).collect(),
        })
        .collect::<Vec<_>>();
    let title = job.title();
    let axes = Axes {
        title: &title,
        x_label: "approval month",
        y_label: "maps",
    };
    let label_every = monthly.months.len().div_ceil(12).max(1);
    let svg = charts::bar_chart(
        &axes,
        &month_labels(&monthly.months),
        &series,
        BarLayout::Stacked,
        label_every,
    );
    Ok(Artifact::figure(job, svg, monthly.rows_used))
}

pub fn polygons(job: &ReportJob, input: &ReportInput<'_>) -> Result<Artifact> {
    let monthly = monthly_counts(input)?;
    let series = input
        .config
        .taxonomy
        .mode_labels
        .iter()
        .zip(&monthly.counts)
        .enumerate()
        .map(|(idx, (label, counts))| Series {
            label: label.clone(),
            color: palette(&MODE_COLORS, idx),
            points: monthly
                .months
                .iter()
                .zip(counts)
                .map(|(month, &count)| (fractional_month(*month), count as f64))
                .collect(),
        })
        .collect::<Vec<_>>();
    let x = match (monthly.months.first(), monthly.months.last()) {
        (Some(first), Some(last)) => Scale::new(fractional_month(*first), fractional_month(*last)),
        _ => Scale::new(0.0, 1.0),
    };
    let title = job.title();
    let axes = Axes {
        title: &title,
        x_label: "approval date",
        y_label: "maps",
    };
    let svg = charts::line_chart(&axes, x, &series);
    Ok(Artifact::figure(job, svg, monthly.rows_used))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        beatmap::Beatmap,
        config::ReportConfig,
        enrich::{EnrichedBeatmap, Enricher},
    };

    fn row(mode: i64, date: Option<(i32, u32)>) -> EnrichedBeatmap {
        let enricher = Enricher::new(Default::default()).unwrap();
        enricher.enrich_one(Beatmap {
            mode: Some(mode),
            approved_date: date.map(|(y, m)| {
                NaiveDate::from_ymd_opt(y, m, 15)
                    .unwrap()
                    .and_hms_opt(12, 0, 0)
                    .unwrap()
            }),
            ..Beatmap::default()
        })
    }

    #[test]
    fn months_form_a_continuous_range() {
        let rows = vec![
            row(0, Some((2015, 11))),
            row(1, Some((2016, 2))),
            row(0, Some((2016, 2))),
            row(0, None),
            row(7, Some((2016, 1))),
        ];
        let config = ReportConfig::default();
        let monthly = monthly_counts(&ReportInput::new(&rows, &config)).unwrap();
        assert_eq!(monthly.months.len(), 4);
        assert_eq!(monthly.months[0], NaiveDate::from_ymd_opt(2015, 11, 1).unwrap());
        assert_eq!(monthly.counts[0], vec![1, 0, 0, 1]);
        assert_eq!(monthly.counts[1], vec![0, 0, 0, 1]);
        assert_eq!(monthly.rows_used, 3);
    }

    #[test]
    fn no_dated_rows_yield_empty_range() {
        let rows = vec![row(0, None)];
        let config = ReportConfig::default();
        let monthly = monthly_counts(&ReportInput::new(&rows, &config)).unwrap();
        assert!(monthly.months.is_empty());
        assert_eq!(monthly.rows_used, 0);
    }
}
