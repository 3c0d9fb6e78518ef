//! Report configuration: spread/mode taxonomy, histogram bins and plot domains.
//!
//! Every lookup table the report depends on lives here and is passed explicitly
//! into the enricher and the report jobs. [`ReportConfig::default`] reproduces
//! the stock report; a YAML file can override any subset of keys.

use std::{fs::File, io::BufReader, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const UNKNOWN_LABEL: &str = "Unknown";

/// Upper bound on the number of bins a single [`BinSpec`] may describe.
pub const MAX_BINS: f64 = 1_000_000.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Taxonomy {
    /// Ascending lower bounds of the spread buckets; the last bucket is unbounded.
    pub spread_boundaries: Vec<f64>,
    pub spread_labels: Vec<String>,
    /// Indexed by the integer `mode` code.
    pub mode_labels: Vec<String>,
    pub unknown_mode_label: String,
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self {
            spread_boundaries: vec![0.0, 1.51, 2.26, 3.76, 5.26, 6.76],
            spread_labels: ["Easy", "Normal", "Hard", "Insane", "Expert", "Expert+"]
                .into_iter()
                .map(String::from)
                .collect(),
            mode_labels: ["Standard", "Taiko", "CtB", "Mania"]
                .into_iter()
                .map(String::from)
                .collect(),
            unknown_mode_label: UNKNOWN_LABEL.to_string(),
        }
    }
}

impl Taxonomy {
    pub fn new(
        spread_boundaries: Vec<f64>,
        spread_labels: Vec<String>,
        mode_labels: Vec<String>,
    ) -> Result<Self, ConfigError> {
        let taxonomy = Self {
            spread_boundaries,
            spread_labels,
            mode_labels,
            unknown_mode_label: UNKNOWN_LABEL.to_string(),
        };
        taxonomy.validate()?;
        Ok(taxonomy)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.spread_boundaries.is_empty() {
            return Err(ConfigError::EmptyTaxonomy);
        }
        if self.spread_boundaries.len() != self.spread_labels.len() {
            return Err(ConfigError::LabelCountMismatch {
                boundaries: self.spread_boundaries.len(),
                labels: self.spread_labels.len(),
            });
        }
        let mut previous = f64::NEG_INFINITY;
        for &boundary in &self.spread_boundaries {
            if !boundary.is_finite() || boundary <= previous {
                return Err(ConfigError::UnorderedBoundaries(boundary));
            }
            previous = boundary;
        }
        Ok(())
    }
}

/// Fixed-width, half-open bins covering `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BinSpec {
    pub start: f64,
    pub end: f64,
    pub width: f64,
}

impl BinSpec {
    pub const fn new(start: f64, end: f64, width: f64) -> Self {
        Self { start, end, width }
    }

    pub fn validate(&self, name: &str) -> Result<(), ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidBins {
            name: name.to_string(),
            reason: reason.to_string(),
        };
        if !(self.start.is_finite() && self.end.is_finite() && self.width.is_finite()) {
            return Err(invalid("bounds and width must be finite"));
        }
        if self.width <= 0.0 {
            return Err(invalid("width must be positive"));
        }
        if self.end <= self.start {
            return Err(invalid("end must be greater than start"));
        }
        if (self.end - self.start) / self.width > MAX_BINS {
            return Err(invalid("too many bins"));
        }
        Ok(())
    }

    pub fn bin_count(&self) -> usize {
        ((self.end - self.start) / self.width).round().max(0.0) as usize
    }

    /// Index of the bin containing `value`, or `None` outside `[start, end)`.
    pub fn index_of(&self, value: f64) -> Option<usize> {
        if !value.is_finite() || value < self.start || value >= self.end {
            return None;
        }
        // Absorb representation error so that e.g. 0.15 lands in [0.15, 0.20).
        let position = ((value - self.start) / self.width + 1e-9).floor() as usize;
        (position < self.bin_count()).then_some(position)
    }

    pub fn lower_edge(&self, index: usize) -> f64 {
        self.start + index as f64 * self.width
    }

    pub fn center(&self, index: usize) -> f64 {
        self.lower_edge(index) + self.width / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    pub min: f64,
    pub max: f64,
}

impl Domain {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn validate(&self, name: &str) -> Result<(), ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidSetting {
            name: name.to_string(),
            reason: reason.to_string(),
        };
        if !(self.min.is_finite() && self.max.is_finite()) {
            return Err(invalid("bounds must be finite"));
        }
        if self.max <= self.min {
            return Err(invalid("max must be greater than min"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlotDomain {
    pub x: Domain,
    pub y: Domain,
}

impl PlotDomain {
    pub const fn new(x: Domain, y: Domain) -> Self {
        Self { x, y }
    }

    pub fn validate(&self, name: &str) -> Result<(), ConfigError> {
        self.x.validate(&format!("{name}.x"))?;
        self.y.validate(&format!("{name}.y"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistributionBins {
    pub difficulty: BinSpec,
    pub total_length: BinSpec,
    pub playcount: BinSpec,
    pub log_playcount: BinSpec,
}

impl Default for DistributionBins {
    fn default() -> Self {
        Self {
            difficulty: BinSpec::new(0.0, 10.0, 0.05),
            total_length: BinSpec::new(0.0, 600.0, 1.0),
            playcount: BinSpec::new(0.0, 1_000_000.0, 5_000.0),
            log_playcount: BinSpec::new(0.0, 7.0, 0.1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScatterDomains {
    pub approach_vs_bpm: PlotDomain,
    pub stars_vs_length: PlotDomain,
    pub combo_vs_drain: PlotDomain,
    pub favourites_vs_playcount: PlotDomain,
    pub playcount_vs_length: PlotDomain,
    /// x is the approval date as a fractional year.
    pub ratings_vs_date: PlotDomain,
}

impl Default for ScatterDomains {
    fn default() -> Self {
        Self {
            approach_vs_bpm: PlotDomain::new(Domain::new(0.0, 400.0), Domain::new(0.0, 11.0)),
            stars_vs_length: PlotDomain::new(Domain::new(0.0, 600.0), Domain::new(0.0, 10.0)),
            combo_vs_drain: PlotDomain::new(Domain::new(0.0, 600.0), Domain::new(0.0, 3_000.0)),
            favourites_vs_playcount: PlotDomain::new(
                Domain::new(0.0, 2_000_000.0),
                Domain::new(0.0, 5_000.0),
            ),
            playcount_vs_length: PlotDomain::new(
                Domain::new(0.0, 600.0),
                Domain::new(0.0, 1_000_000.0),
            ),
            ratings_vs_date: PlotDomain::new(Domain::new(2007.0, 2020.0), Domain::new(0.0, 11.0)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaycountBins {
    pub grouped: BinSpec,
    pub stacked: BinSpec,
}

impl Default for PlaycountBins {
    fn default() -> Self {
        Self {
            grouped: BinSpec::new(0.0, 360.0, 30.0),
            stacked: BinSpec::new(150.0, 360.0, 30.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub taxonomy: Taxonomy,
    pub distributions: DistributionBins,
    pub frequency_top: usize,
    pub ranking_top: usize,
    pub scatter: ScatterDomains,
    pub point_opacity: f64,
    pub playcount_by_length: PlaycountBins,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            taxonomy: Taxonomy::default(),
            distributions: DistributionBins::default(),
            frequency_top: 20,
            ranking_top: 50,
            scatter: ScatterDomains::default(),
            point_opacity: 0.15,
            playcount_by_length: PlaycountBins::default(),
        }
    }
}

impl ReportConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let file = File::open(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: ReportConfig =
            serde_yaml::from_reader(BufReader::new(file)).map_err(|source| ConfigError::Yaml {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.taxonomy.validate()?;
        let bins = [
            ("difficulty", &self.distributions.difficulty),
            ("total_length", &self.distributions.total_length),
            ("playcount", &self.distributions.playcount),
            ("log_playcount", &self.distributions.log_playcount),
            ("playcount_by_length.grouped", &self.playcount_by_length.grouped),
            ("playcount_by_length.stacked", &self.playcount_by_length.stacked),
        ];
        for (name, spec) in bins {
            spec.validate(name)?;
        }
        let scatter = &self.scatter;
        let domains = [
            ("scatter.approach_vs_bpm", &scatter.approach_vs_bpm),
            ("scatter.stars_vs_length", &scatter.stars_vs_length),
            ("scatter.combo_vs_drain", &scatter.combo_vs_drain),
            ("scatter.favourites_vs_playcount", &scatter.favourites_vs_playcount),
            ("scatter.playcount_vs_length", &scatter.playcount_vs_length),
            ("scatter.ratings_vs_date", &scatter.ratings_vs_date),
        ];
        for (name, domain) in domains {
            domain.validate(name)?;
        }
        if !(0.0..=1.0).contains(&self.point_opacity) {
            return Err(ConfigError::InvalidSetting {
                name: "point_opacity".to_string(),
                reason: format!("{} is outside 0..=1", self.point_opacity),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        ReportConfig::default().validate().expect("default config");
    }

    #[test]
    fn taxonomy_rejects_mismatched_labels() {
        let err = Taxonomy::new(vec![0.0, 2.0], vec!["Easy".into()], Vec::new()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::LabelCountMismatch {
                boundaries: 2,
                labels: 1
            }
        ));
    }

    #[test]
    fn taxonomy_rejects_descending_boundaries() {
        let err = Taxonomy::new(
            vec![0.0, 3.0, 2.0],
            vec!["a".into(), "b".into(), "c".into()],
            Vec::new(),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::UnorderedBoundaries(v) if v == 2.0));
    }

    #[test]
    fn bin_index_is_half_open() {
        let bins = BinSpec::new(0.0, 360.0, 30.0);
        assert_eq!(bins.bin_count(), 12);
        assert_eq!(bins.index_of(0.0), Some(0));
        assert_eq!(bins.index_of(29.9), Some(0));
        assert_eq!(bins.index_of(30.0), Some(1));
        assert_eq!(bins.index_of(359.0), Some(11));
        assert_eq!(bins.index_of(360.0), None);
        assert_eq!(bins.index_of(-1.0), None);
        assert_eq!(bins.index_of(f64::NAN), None);
    }

    #[test]
    fn fine_bins_absorb_float_error() {
        let bins = BinSpec::new(0.0, 10.0, 0.05);
        assert_eq!(bins.bin_count(), 200);
        assert_eq!(bins.index_of(0.15), Some(3));
        assert_eq!(bins.index_of(9.99), Some(199));
    }

    #[test]
    fn bins_finer_than_the_cap_are_rejected() {
        let err = BinSpec::new(0.0, 10.0, 1e-300).validate("difficulty").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidBins { ref reason, .. } if reason == "too many bins"
        ));
        BinSpec::new(0.0, 1_000_000.0, 1.0)
            .validate("playcount")
            .expect("exactly at the cap");
    }

    #[test]
    fn inverted_scatter_domain_is_rejected() {
        let mut config = ReportConfig::default();
        config.scatter.combo_vs_drain.y = Domain::new(3_000.0, 0.0);
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidSetting { ref name, .. } if name == "scatter.combo_vs_drain.y"
        ));

        config.scatter.combo_vs_drain.y = Domain::new(0.0, f64::INFINITY);
        assert!(config.validate().is_err());
    }

    #[test]
    fn point_opacity_must_be_a_fraction() {
        let mut config = ReportConfig::default();
        config.point_opacity = 1.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidSetting { ref name, .. }) if name == "point_opacity"
        ));
        config.point_opacity = f64::NAN;
        assert!(config.validate().is_err());
        config.point_opacity = 1.0;
        config.validate().expect("opaque points are allowed");
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config: ReportConfig = serde_yaml::from_str("frequency_top: 5\n").expect("parse yaml");
        assert_eq!(config.frequency_top, 5);
        assert_eq!(config.ranking_top, 50);
        assert_eq!(config.taxonomy, Taxonomy::default());
    }
}
