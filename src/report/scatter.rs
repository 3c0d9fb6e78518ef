//! Pairwise scatter plots over osu!standard maps.
//!
//! Axis domains are fixed by [`crate::config::ScatterDomains`]. Points outside
//! the domain are not drawn, but still count towards `rows_used` and the
//! regression.

use anyhow::Result;
use chrono::{Datelike, NaiveDateTime, Timelike};

use crate::{beatmap::Beatmap, config::PlotDomain, stats::LinearFit};

use super::{
    Artifact, ReportInput, ReportJob,
    charts::{self, Axes, Series},
    svg::{SPREAD_COLORS, palette},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScatterPlot {
    ApproachVsBpm,
    StarsVsLength,
    ComboVsDrain,
    FavouritesVsPlaycount,
    PlaycountVsLength,
    RatingsVsDate,
}

type Extract = fn(&Beatmap) -> Option<(f64, f64)>;

impl ScatterPlot {
    pub const ALL: [ScatterPlot; 6] = [
        ScatterPlot::ApproachVsBpm,
        ScatterPlot::StarsVsLength,
        ScatterPlot::ComboVsDrain,
        ScatterPlot::FavouritesVsPlaycount,
        ScatterPlot::PlaycountVsLength,
        ScatterPlot::RatingsVsDate,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            ScatterPlot::ApproachVsBpm => "approach-rate-vs-bpm",
            ScatterPlot::StarsVsLength => "star-rating-vs-length",
            ScatterPlot::ComboVsDrain => "max-combo-vs-drain-time",
            ScatterPlot::FavouritesVsPlaycount => "favourites-vs-playcount",
            ScatterPlot::PlaycountVsLength => "playcount-vs-length",
            ScatterPlot::RatingsVsDate => "ratings-vs-approval-date",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ScatterPlot::ApproachVsBpm => "Approach rate vs BPM (osu!standard)",
            ScatterPlot::StarsVsLength => "Star rating vs map length (osu!standard)",
            ScatterPlot::ComboVsDrain => "Max combo vs drain time (osu!standard)",
            ScatterPlot::FavouritesVsPlaycount => "Favourites vs playcount (osu!standard)",
            ScatterPlot::PlaycountVsLength => "Playcount vs map length (osu!standard)",
            ScatterPlot::RatingsVsDate => {
                "Approach rate and star rating vs approval date (osu!standard)"
            }
        }
    }

    fn axis_labels(&self) -> (&'static str, &'static str) {
        match self {
            ScatterPlot::ApproachVsBpm => ("bpm", "approach rate"),
            ScatterPlot::StarsVsLength => ("total length (s)", "star rating"),
            ScatterPlot::ComboVsDrain => ("drain time (s)", "max combo"),
            ScatterPlot::FavouritesVsPlaycount => ("playcount", "favourites"),
            ScatterPlot::PlaycountVsLength => ("total length (s)", "playcount"),
            ScatterPlot::RatingsVsDate => ("approval date", "rating"),
        }
    }

    fn domain(&self, input: &ReportInput<'_>) -> PlotDomain {
        let domains = &input.config.scatter;
        match self {
            ScatterPlot::ApproachVsBpm => domains.approach_vs_bpm,
            ScatterPlot::StarsVsLength => domains.stars_vs_length,
            ScatterPlot::ComboVsDrain => domains.combo_vs_drain,
            ScatterPlot::FavouritesVsPlaycount => domains.favourites_vs_playcount,
            ScatterPlot::PlaycountVsLength => domains.playcount_vs_length,
            ScatterPlot::RatingsVsDate => domains.ratings_vs_date,
        }
    }

    /// Labelled point extractors; most plots have a single series.
    fn series(&self) -> Vec<(&'static str, Extract)> {
        match self {
            ScatterPlot::ApproachVsBpm => vec![("maps", approach_vs_bpm as Extract)],
            ScatterPlot::StarsVsLength => vec![("maps", stars_vs_length as Extract)],
            ScatterPlot::ComboVsDrain => vec![("maps", combo_vs_drain as Extract)],
            ScatterPlot::FavouritesVsPlaycount => {
                vec![("maps", favourites_vs_playcount as Extract)]
            }
            ScatterPlot::PlaycountVsLength => vec![("maps", playcount_vs_length as Extract)],
            ScatterPlot::RatingsVsDate => vec![
                ("approach rate", approach_vs_date as Extract),
                ("star rating", stars_vs_date as Extract),
            ],
        }
    }
}

fn approach_vs_bpm(map: &Beatmap) -> Option<(f64, f64)> {
    Some((map.bpm?, map.diff_approach?))
}

fn stars_vs_length(map: &Beatmap) -> Option<(f64, f64)> {
    Some((map.total_length? as f64, map.difficultyrating?))
}

fn combo_vs_drain(map: &Beatmap) -> Option<(f64, f64)> {
    Some((map.hit_length? as f64, map.max_combo? as f64))
}

fn favourites_vs_playcount(map: &Beatmap) -> Option<(f64, f64)> {
    Some((map.playcount? as f64, map.favourite_count? as f64))
}

fn playcount_vs_length(map: &Beatmap) -> Option<(f64, f64)> {
    Some((map.total_length? as f64, map.playcount? as f64))
}

fn approach_vs_date(map: &Beatmap) -> Option<(f64, f64)> {
    Some((fractional_year(map.approved_date?), map.diff_approach?))
}

fn stars_vs_date(map: &Beatmap) -> Option<(f64, f64)> {
    Some((fractional_year(map.approved_date?), map.difficultyrating?))
}

/// Calendar year plus the elapsed share of that year.
pub fn fractional_year(timestamp: NaiveDateTime) -> f64 {
    let year = timestamp.year();
    let days_in_year = if is_leap_year(year) { 366.0 } else { 365.0 };
    let elapsed =
        timestamp.ordinal0() as f64 + timestamp.num_seconds_from_midnight() as f64 / 86_400.0;
    year as f64 + elapsed / days_in_year
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

pub fn render(
    job: &ReportJob,
    plot: ScatterPlot,
    input: &ReportInput<'_>,
) -> Result<Artifact> {
    let domain = plot.domain(input);
    domain.validate(&format!("scatter.{}", plot.slug()))?;
    let standard = input.standard().collect::<Vec<_>>();
    let extractors = plot.series();
    let series = extractors
        .iter()
        .enumerate()
        .map(|(idx, &(label, extract))| Series {
            label: label.to_string(),
            color: palette(&SPREAD_COLORS, idx + 4),
            points: standard
                .iter()
                .filter_map(|row| extract(&row.beatmap))
                .filter(|(x, y)| x.is_finite() && y.is_finite())
                .collect(),
        })
        .collect::<Vec<_>>();
    let rows_used = standard
        .iter()
        .filter(|row| {
            extractors
                .iter()
                .any(|(_, extract)| extract(&row.beatmap).is_some())
        })
        .count();

    let fit = match plot {
        ScatterPlot::ComboVsDrain => series
            .first()
            .and_then(|s| LinearFit::ordinary_least_squares(&s.points)),
        _ => None,
    };

    let (x_label, y_label) = plot.axis_labels();
    let title = job.title();
    let axes = Axes {
        title: &title,
        x_label,
        y_label,
    };
    let (svg, drawn) = charts::scatter_chart(
        &axes,
        &domain,
        &series,
        input.config.point_opacity,
        fit.as_ref(),
    );
    let total_points = series.iter().map(|s| s.points.len()).sum::<usize>();
    let mut notes = Vec::new();
    if let Some(fit) = fit {
        notes.push(fit.summary());
    }
    if drawn < total_points {
        notes.push(format!(
            "{} of {} point(s) outside the plotted range",
            total_points - drawn,
            total_points
        ));
    }
    let artifact = Artifact::figure(job, svg, rows_used);
    Ok(if notes.is_empty() {
        artifact
    } else {
        artifact.with_note(notes.join("; "))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::ReportConfig, enrich::Enricher};
    use chrono::NaiveDate;

    #[test]
    fn fractional_year_tracks_elapsed_days() {
        let new_year = NaiveDate::from_ymd_opt(2014, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(fractional_year(new_year), 2014.0);
        let midyear = NaiveDate::from_ymd_opt(2016, 7, 2)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert!((fractional_year(midyear) - 2016.5).abs() < 1e-9);
    }

    #[test]
    fn combo_plot_reports_regression_and_ignores_other_modes() {
        let enricher = Enricher::new(Default::default()).unwrap();
        let mut maps = (1..=5)
            .map(|i| Beatmap {
                mode: Some(0),
                hit_length: Some(i * 150),
                max_combo: Some(i * 750 + 10),
                ..Beatmap::default()
            })
            .collect::<Vec<_>>();
        maps.push(Beatmap {
            mode: Some(3),
            hit_length: Some(100),
            max_combo: Some(9_000),
            ..Beatmap::default()
        });
        let rows = enricher.enrich(maps);
        let config = ReportConfig::default();
        let job = ReportJob::Scatter(ScatterPlot::ComboVsDrain);
        let artifact = render(&job, ScatterPlot::ComboVsDrain, &ReportInput::new(&rows, &config))
            .expect("render scatter");
        assert_eq!(artifact.rows_used, 5);
        let note = artifact.note.unwrap();
        assert!(note.starts_with("y = 5.0000x + 10.0000"), "{note}");
        assert!(note.contains("over 5 maps"));
        assert!(note.contains("2 of 5 point(s) outside"), "{note}");
    }
}
