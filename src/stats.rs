use anyhow::{Context, Result, anyhow};
use log::info;

use crate::{
    cli::StatsArgs,
    loader::{self, LoadedTable},
    table,
};

pub fn execute(args: &StatsArgs) -> Result<()> {
    let table = loader::load_table(&args.input)
        .with_context(|| format!("Loading beatmaps from {:?}", args.input))?;
    let columns = resolve_columns(&table, &args.columns)?;
    if columns.is_empty() {
        return Err(anyhow!(
            "No numeric columns available. Supply --columns to continue."
        ));
    }

    let mut stats = columns
        .iter()
        .map(|&idx| ColumnStats::new(table.schema.columns[idx].name.clone()))
        .collect::<Vec<_>>();
    let mut rows_seen = 0usize;
    for row in table.rows_for_mode(args.mode) {
        rows_seen += 1;
        for (stat, &idx) in stats.iter_mut().zip(&columns) {
            if let Some(value) = row
                .get(idx)
                .and_then(|cell| cell.as_ref())
                .and_then(|value| value.as_f64())
            {
                stat.add_value(value);
            }
        }
    }

    let rows = stats.iter().map(ColumnStats::render_row).collect::<Vec<_>>();
    let headers = ["column", "count", "min", "max", "mean", "median", "std_dev"]
        .map(String::from)
        .to_vec();
    table::print_table(&headers, &rows);
    info!(
        "Computed summary statistics for {} column(s) over {} row(s)",
        rows.len(),
        rows_seen
    );
    Ok(())
}

fn resolve_columns(table: &LoadedTable, specified: &[String]) -> Result<Vec<usize>> {
    if specified.is_empty() {
        return Ok(table.schema.numeric_columns().map(|(idx, _)| idx).collect());
    }
    specified
        .iter()
        .map(|name| {
            let idx = table.schema.column_index(name).ok_or_else(|| {
                anyhow!("Column '{name}' not found in {:?}", table.schema.headers())
            })?;
            let column = &table.schema.columns[idx];
            if !column.datatype.is_numeric() {
                return Err(anyhow!(
                    "Column '{}' is type {} and cannot be profiled for statistics",
                    column.name,
                    column.datatype
                ));
            }
            Ok(idx)
        })
        .collect()
}

/// Running summary of one numeric column.
#[derive(Debug, Clone)]
pub struct ColumnStats {
    pub name: String,
    values: Vec<f64>,
    sum: f64,
    sum_squares: f64,
    min: Option<f64>,
    max: Option<f64>,
}

impl ColumnStats {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: Vec::new(),
            sum: 0.0,
            sum_squares: 0.0,
            min: None,
            max: None,
        }
    }

    pub fn add_value(&mut self, value: f64) {
        if !value.is_finite() {
            return;
        }
        self.sum += value;
        self.sum_squares += value * value;
        self.min = Some(self.min.map_or(value, |current| current.min(value)));
        self.max = Some(self.max.map_or(value, |current| current.max(value)));
        self.values.push(value);
    }

    pub fn count(&self) -> usize {
        self.values.len()
    }

    pub fn min(&self) -> Option<f64> {
        self.min
    }

    pub fn max(&self) -> Option<f64> {
        self.max
    }

    pub fn mean(&self) -> Option<f64> {
        (self.count() > 0).then(|| self.sum / self.count() as f64)
    }

    pub fn median(&self) -> Option<f64> {
        if self.values.is_empty() {
            return None;
        }
        let mut sorted = self.values.clone();
        sorted.sort_by(f64::total_cmp);
        let mid = sorted.len() / 2;
        if sorted.len().is_multiple_of(2) {
            Some((sorted[mid - 1] + sorted[mid]) / 2.0)
        } else {
            Some(sorted[mid])
        }
    }

    /// Sample standard deviation.
    pub fn std_dev(&self) -> Option<f64> {
        let count = self.count();
        if count < 2 {
            return None;
        }
        let mean = self.mean()?;
        let variance = (self.sum_squares - count as f64 * mean * mean) / (count as f64 - 1.0);
        Some(variance.max(0.0).sqrt())
    }

    pub fn render_row(&self) -> Vec<String> {
        let metric = |value: Option<f64>| value.map(format_number).unwrap_or_default();
        vec![
            self.name.clone(),
            self.count().to_string(),
            metric(self.min),
            metric(self.max),
            metric(self.mean()),
            metric(self.median()),
            metric(self.std_dev()),
        ]
    }
}

/// Ordinary least squares fit of `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    pub n: usize,
}

impl LinearFit {
    /// `None` with fewer than two finite points or no spread in `x`.
    pub fn ordinary_least_squares(points: &[(f64, f64)]) -> Option<Self> {
        let finite = points
            .iter()
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .copied()
            .collect::<Vec<_>>();
        let n = finite.len();
        if n < 2 {
            return None;
        }
        let count = n as f64;
        let mean_x = finite.iter().map(|(x, _)| x).sum::<f64>() / count;
        let mean_y = finite.iter().map(|(_, y)| y).sum::<f64>() / count;
        let (mut sxx, mut sxy, mut syy) = (0.0, 0.0, 0.0);
        for (x, y) in &finite {
            let dx = x - mean_x;
            let dy = y - mean_y;
            sxx += dx * dx;
            sxy += dx * dy;
            syy += dy * dy;
        }
        if sxx == 0.0 {
            return None;
        }
        let slope = sxy / sxx;
        let intercept = mean_y - slope * mean_x;
        // A constant y is explained perfectly by a flat line.
        let r_squared = if syy == 0.0 {
            1.0
        } else {
            (sxy * sxy) / (sxx * syy)
        };
        Some(Self {
            slope,
            intercept,
            r_squared,
            n,
        })
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    pub fn summary(&self) -> String {
        format!(
            "y = {:.4}x {} {:.4}; R\u{b2} = {:.4} over {} maps",
            self.slope,
            if self.intercept < 0.0 { '-' } else { '+' },
            self.intercept.abs(),
            self.r_squared,
            self.n
        )
    }
}

pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.4}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_stats_summarize_values() {
        let mut stats = ColumnStats::new("bpm");
        for value in [120.0, 180.0, 150.0, 170.0] {
            stats.add_value(value);
        }
        stats.add_value(f64::NAN);
        assert_eq!(stats.count(), 4);
        assert_eq!(stats.min(), Some(120.0));
        assert_eq!(stats.max(), Some(180.0));
        assert_eq!(stats.mean(), Some(155.0));
        assert_eq!(stats.median(), Some(160.0));
        let std_dev = stats.std_dev().unwrap();
        assert!((std_dev - 26.4575).abs() < 1e-3);
    }

    #[test]
    fn single_value_has_no_std_dev() {
        let mut stats = ColumnStats::new("playcount");
        stats.add_value(5.0);
        assert_eq!(stats.std_dev(), None);
        assert_eq!(stats.render_row()[6], "");
    }

    #[test]
    fn least_squares_recovers_exact_line() {
        let points = (0..10)
            .map(|x| (x as f64, 3.0 * x as f64 + 2.0))
            .collect::<Vec<_>>();
        let fit = LinearFit::ordinary_least_squares(&points).unwrap();
        assert!((fit.slope - 3.0).abs() < 1e-9);
        assert!((fit.intercept - 2.0).abs() < 1e-9);
        assert!((fit.r_squared - 1.0).abs() < 1e-9);
        assert_eq!(fit.n, 10);
        assert!((fit.predict(20.0) - 62.0).abs() < 1e-9);
    }

    #[test]
    fn least_squares_needs_spread_in_x() {
        assert!(LinearFit::ordinary_least_squares(&[(1.0, 2.0)]).is_none());
        assert!(LinearFit::ordinary_least_squares(&[(1.0, 2.0), (1.0, 3.0)]).is_none());
    }

    #[test]
    fn noisy_fit_has_partial_r_squared() {
        let points = [(0.0, 0.0), (1.0, 2.0), (2.0, 1.0), (3.0, 3.0)];
        let fit = LinearFit::ordinary_least_squares(&points).unwrap();
        assert!(fit.r_squared > 0.0 && fit.r_squared < 1.0);
    }
}
