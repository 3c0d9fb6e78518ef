//! Report jobs over the enriched beatmaps.
//!
//! Every [`ReportJob`] is a read-only projection of the enriched rows that
//! produces one [`Artifact`]. Jobs run independently: one failing job is
//! logged and recorded in the [`ReportOutcome`] while the rest still run.

pub mod charts;
pub mod distribution;
pub mod frequency;
pub mod html;
pub mod playcount;
pub mod ranking;
pub mod scatter;
pub mod svg;
pub mod temporal;

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use log::{error, info};

use crate::{config::ReportConfig, enrich::EnrichedBeatmap, io_utils, table::TextTable};

use self::{
    charts::BarLayout, distribution::Metric, frequency::TextField, scatter::ScatterPlot,
};

pub const NO_ROWS_NOTE: &str = "no rows";

#[derive(Debug, Clone, PartialEq)]
pub enum ArtifactBody {
    Figure(String),
    Table(TextTable),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub slug: String,
    pub title: String,
    pub body: ArtifactBody,
    /// Rows of the filtered subset the artifact was computed from.
    pub rows_used: usize,
    pub note: Option<String>,
}

impl Artifact {
    pub fn figure(job: &ReportJob, svg: String, rows_used: usize) -> Self {
        Self {
            slug: job.slug(),
            title: job.title(),
            body: ArtifactBody::Figure(svg),
            rows_used,
            note: None,
        }
    }

    pub fn table(job: &ReportJob, table: TextTable, rows_used: usize) -> Self {
        Self {
            slug: job.slug(),
            title: job.title(),
            body: ArtifactBody::Table(table),
            rows_used,
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.rows_used == 0
    }

    pub fn svg(&self) -> Option<&str> {
        match &self.body {
            ArtifactBody::Figure(svg) => Some(svg),
            ArtifactBody::Table(_) => None,
        }
    }

    pub fn text_table(&self) -> Option<&TextTable> {
        match &self.body {
            ArtifactBody::Table(table) => Some(table),
            ArtifactBody::Figure(_) => None,
        }
    }

    fn mark_empty(&mut self) {
        self.note = Some(match self.note.take() {
            Some(note) => format!("{NO_ROWS_NOTE}; {note}"),
            None => NO_ROWS_NOTE.to_string(),
        });
    }
}

/// The rows and configuration every job reads from.
#[derive(Debug, Clone, Copy)]
pub struct ReportInput<'a> {
    pub rows: &'a [EnrichedBeatmap],
    pub config: &'a ReportConfig,
}

impl<'a> ReportInput<'a> {
    pub fn new(rows: &'a [EnrichedBeatmap], config: &'a ReportConfig) -> Self {
        Self { rows, config }
    }

    pub fn standard(self) -> impl Iterator<Item = &'a EnrichedBeatmap> + 'a {
        self.rows.iter().filter(|row| row.is_standard())
    }

    /// Rows whose mode code has a configured label, paired with that code.
    pub fn known_modes(self) -> impl Iterator<Item = (usize, &'a EnrichedBeatmap)> + 'a {
        let modes = self.config.taxonomy.mode_labels.len();
        self.rows.iter().filter_map(move |row| {
            let code = usize::try_from(row.beatmap.mode?).ok()?;
            (code < modes).then_some((code, row))
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReportJob {
    DistributionOverlay(Metric),
    DistributionPanels(Metric),
    MonthlyBars,
    MonthlyPolygon,
    Frequency(TextField),
    MostFavorited,
    MostPlayed,
    Scatter(ScatterPlot),
    PlaycountBySpread(BarLayout),
}

impl ReportJob {
    /// The stock report, in output order.
    pub fn all() -> Vec<ReportJob> {
        let mut jobs = Vec::new();
        for metric in Metric::ALL {
            jobs.push(ReportJob::DistributionOverlay(metric));
            jobs.push(ReportJob::DistributionPanels(metric));
        }
        jobs.push(ReportJob::MonthlyBars);
        jobs.push(ReportJob::MonthlyPolygon);
        jobs.extend(TextField::ALL.into_iter().map(ReportJob::Frequency));
        jobs.push(ReportJob::MostFavorited);
        jobs.push(ReportJob::MostPlayed);
        jobs.extend(ScatterPlot::ALL.into_iter().map(ReportJob::Scatter));
        jobs.push(ReportJob::PlaycountBySpread(BarLayout::Grouped));
        jobs.push(ReportJob::PlaycountBySpread(BarLayout::Stacked));
        jobs
    }

    pub fn slug(&self) -> String {
        match self {
            ReportJob::DistributionOverlay(metric) => format!("{}-by-mode", metric.slug()),
            ReportJob::DistributionPanels(metric) => format!("{}-panels", metric.slug()),
            ReportJob::MonthlyBars => "approvals-per-month".to_string(),
            ReportJob::MonthlyPolygon => "approvals-per-month-polygon".to_string(),
            ReportJob::Frequency(field) => format!("top-{}", field.plural()),
            ReportJob::MostFavorited => "most-favorited-mapsets".to_string(),
            ReportJob::MostPlayed => "most-played-maps".to_string(),
            ReportJob::Scatter(plot) => plot.slug().to_string(),
            ReportJob::PlaycountBySpread(layout) => {
                format!("playcount-by-drain-time-{}", layout.as_str())
            }
        }
    }

    pub fn title(&self) -> String {
        match self {
            ReportJob::DistributionOverlay(metric) => {
                format!("{} by game mode", metric.title())
            }
            ReportJob::DistributionPanels(metric) => {
                format!("{} histograms per game mode", metric.title())
            }
            ReportJob::MonthlyBars => "Ranked maps per month by game mode".to_string(),
            ReportJob::MonthlyPolygon => {
                "Ranked maps per month by game mode (frequency polygons)".to_string()
            }
            ReportJob::Frequency(field) => format!("Most common {}", field.plural()),
            ReportJob::MostFavorited => "Most favorited mapsets".to_string(),
            ReportJob::MostPlayed => "Most played maps".to_string(),
            ReportJob::Scatter(plot) => plot.title().to_string(),
            ReportJob::PlaycountBySpread(BarLayout::Grouped) => {
                "Total playcount by drain time and difficulty spread".to_string()
            }
            ReportJob::PlaycountBySpread(BarLayout::Stacked) => {
                "Total playcount by drain time and difficulty spread (stacked)".to_string()
            }
        }
    }

    pub fn run(&self, input: &ReportInput<'_>) -> Result<Artifact> {
        match self {
            ReportJob::DistributionOverlay(metric) => distribution::overlay(self, *metric, input),
            ReportJob::DistributionPanels(metric) => distribution::panels(self, *metric, input),
            ReportJob::MonthlyBars => temporal::stacked_bars(self, input),
            ReportJob::MonthlyPolygon => temporal::polygons(self, input),
            ReportJob::Frequency(field) => Ok(frequency::top_table(self, *field, input)),
            ReportJob::MostFavorited => Ok(ranking::most_favorited_table(self, input)),
            ReportJob::MostPlayed => Ok(ranking::most_played_table(self, input)),
            ReportJob::Scatter(plot) => scatter::render(self, *plot, input),
            ReportJob::PlaycountBySpread(layout) => playcount::render(self, *layout, input),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobFailure {
    pub slug: String,
    pub title: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Section {
    Rendered(Artifact),
    Failed(JobFailure),
}

impl Section {
    pub fn slug(&self) -> &str {
        match self {
            Section::Rendered(artifact) => &artifact.slug,
            Section::Failed(failure) => &failure.slug,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportOutcome {
    pub sections: Vec<Section>,
}

impl ReportOutcome {
    pub fn artifacts(&self) -> impl Iterator<Item = &Artifact> {
        self.sections.iter().filter_map(|section| match section {
            Section::Rendered(artifact) => Some(artifact),
            Section::Failed(_) => None,
        })
    }

    pub fn failures(&self) -> impl Iterator<Item = &JobFailure> {
        self.sections.iter().filter_map(|section| match section {
            Section::Failed(failure) => Some(failure),
            Section::Rendered(_) => None,
        })
    }

    pub fn artifact(&self, slug: &str) -> Option<&Artifact> {
        self.artifacts().find(|artifact| artifact.slug == slug)
    }
}

pub fn generate(rows: &[EnrichedBeatmap], config: &ReportConfig) -> ReportOutcome {
    run_jobs(&ReportJob::all(), &ReportInput::new(rows, config))
}

pub fn run_jobs(jobs: &[ReportJob], input: &ReportInput<'_>) -> ReportOutcome {
    let sections = jobs
        .iter()
        .map(|job| match job.run(input) {
            Ok(mut artifact) => {
                if artifact.is_empty() {
                    info!("'{}' has no rows after filtering", artifact.slug);
                    artifact.mark_empty();
                }
                Section::Rendered(artifact)
            }
            Err(err) => {
                error!("Report job '{}' failed: {err:#}", job.slug());
                Section::Failed(JobFailure {
                    slug: job.slug(),
                    title: job.title(),
                    message: format!("{err:#}"),
                })
            }
        })
        .collect();
    ReportOutcome { sections }
}

/// Figure file name for the section at zero-based `position`.
pub fn figure_file_name(position: usize, slug: &str) -> String {
    format!("{:02}-{slug}.svg", position + 1)
}

/// Writes one SVG per figure plus `index.html` and returns the written paths.
pub fn write_report(outcome: &ReportOutcome, dir: &Path) -> Result<Vec<PathBuf>> {
    io_utils::ensure_directory(dir)
        .with_context(|| format!("Creating report directory {dir:?}"))?;
    let mut written = Vec::new();
    for (position, section) in outcome.sections.iter().enumerate() {
        if let Section::Rendered(artifact) = section
            && let Some(svg) = artifact.svg()
        {
            let path = dir.join(figure_file_name(position, &artifact.slug));
            io_utils::write_text_file(&path, svg)
                .with_context(|| format!("Writing figure {path:?}"))?;
            written.push(path);
        }
    }

    let index = dir.join("index.html");
    let file = File::create(&index).with_context(|| format!("Creating {index:?}"))?;
    let mut writer = BufWriter::new(file);
    html::write(&mut writer, outcome).with_context(|| format!("Writing {index:?}"))?;
    writer.flush().with_context(|| format!("Flushing {index:?}"))?;
    written.push(index);
    info!(
        "Wrote {} figure(s) and index.html to {:?} ({} failed job(s))",
        written.len() - 1,
        dir,
        outcome.failures().count()
    );
    Ok(written)
}
