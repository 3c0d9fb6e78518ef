use crate::{
    config::{BinSpec, PlotDomain},
    stats::LinearFit,
};

use super::svg::{Frame, Scale, SvgDocument};

const WIDTH: f64 = 900.0;
const HEIGHT: f64 = 520.0;
const MARGIN_LEFT: f64 = 80.0;
const MARGIN_RIGHT: f64 = 150.0;
const MARGIN_TOP: f64 = 50.0;
const MARGIN_BOTTOM: f64 = 60.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub color: &'static str,
    pub points: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarSeries {
    pub label: String,
    pub color: &'static str,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarLayout {
    Grouped,
    Stacked,
}

impl BarLayout {
    pub fn as_str(&self) -> &'static str {
        match self {
            BarLayout::Grouped => "grouped",
            BarLayout::Stacked => "stacked",
        }
    }
}

pub struct Axes<'a> {
    pub title: &'a str,
    pub x_label: &'a str,
    pub y_label: &'a str,
}

fn main_frame(x: Scale, y: Scale) -> Frame {
    Frame {
        left: MARGIN_LEFT,
        top: MARGIN_TOP,
        width: WIDTH - MARGIN_LEFT - MARGIN_RIGHT,
        height: HEIGHT - MARGIN_TOP - MARGIN_BOTTOM,
        x,
        y,
    }
}

fn legend_entries<'a>(
    labels: impl Iterator<Item = (&'a String, &'static str)>,
) -> Vec<(String, &'static str)> {
    labels.map(|(label, color)| (label.clone(), color)).collect()
}

fn max_of(values: impl Iterator<Item = f64>) -> f64 {
    values.filter(|v| v.is_finite()).fold(0.0, f64::max)
}

/// One polyline per series over a shared x scale; y starts at zero.
pub fn line_chart(axes: &Axes<'_>, x: Scale, series: &[Series]) -> String {
    let y_max = max_of(series.iter().flat_map(|s| s.points.iter().map(|(_, y)| *y)));
    let frame = main_frame(x, Scale::new(0.0, y_max * 1.05));
    let mut doc = SvgDocument::new(WIDTH, HEIGHT);
    doc.heading(axes.title);
    doc.axes(&frame, axes.x_label, axes.y_label);
    for s in series {
        doc.polyline(&frame, &s.points, s.color);
    }
    doc.legend(
        frame.left + frame.width + 16.0,
        frame.top + 12.0,
        &legend_entries(series.iter().map(|s| (&s.label, s.color))),
    );
    doc.finish()
}

/// Small multiples: one histogram per panel, two panels per row.
pub fn histogram_panels(
    axes: &Axes<'_>,
    bins: &BinSpec,
    panels: &[(String, &'static str, Vec<u64>)],
) -> String {
    let columns = 2usize;
    let rows = panels.len().div_ceil(columns).max(1);
    let panel_width = 440.0;
    let panel_height = 260.0;
    let width = panel_width * columns as f64;
    let height = 50.0 + panel_height * rows as f64;
    let mut doc = SvgDocument::new(width, height);
    doc.heading(axes.title);

    let x = Scale::new(bins.start, bins.end);
    for (idx, (label, color, counts)) in panels.iter().enumerate() {
        let col = idx % columns;
        let row = idx / columns;
        let y_max = counts.iter().copied().max().unwrap_or(0) as f64;
        let frame = Frame {
            left: col as f64 * panel_width + 70.0,
            top: 50.0 + row as f64 * panel_height + 24.0,
            width: panel_width - 100.0,
            height: panel_height - 90.0,
            x,
            y: Scale::new(0.0, y_max * 1.05),
        };
        doc.text(
            frame.left + frame.width / 2.0,
            frame.top - 8.0,
            "middle",
            13,
            label,
        );
        doc.axes(&frame, axes.x_label, axes.y_label);
        for (bin, &count) in counts.iter().enumerate() {
            if count == 0 {
                continue;
            }
            let lower = bins.lower_edge(bin);
            doc.bar(&frame, (lower, lower + bins.width), (0.0, count as f64), color);
        }
    }
    doc.finish()
}

/// Bars over categorical slots, either side by side or stacked.
pub fn bar_chart(
    axes: &Axes<'_>,
    categories: &[String],
    series: &[BarSeries],
    layout: BarLayout,
    label_every: usize,
) -> String {
    let y_max = match layout {
        BarLayout::Grouped => max_of(series.iter().flat_map(|s| s.values.iter().copied())),
        BarLayout::Stacked => max_of((0..categories.len()).map(|idx| {
            series
                .iter()
                .filter_map(|s| s.values.get(idx))
                .sum::<f64>()
        })),
    };
    let frame = main_frame(
        Scale::new(0.0, categories.len().max(1) as f64),
        Scale::new(0.0, y_max * 1.05),
    );
    let mut doc = SvgDocument::new(WIDTH, HEIGHT);
    doc.heading(axes.title);
    doc.category_axes(&frame, categories, label_every, axes.x_label, axes.y_label);

    let slot_fill = 0.8;
    let group = series.len().max(1) as f64;
    for idx in 0..categories.len() {
        let slot_left = idx as f64 + (1.0 - slot_fill) / 2.0;
        let mut stacked = 0.0;
        for (position, s) in series.iter().enumerate() {
            let value = s.values.get(idx).copied().unwrap_or(0.0);
            if value <= 0.0 || !value.is_finite() {
                continue;
            }
            match layout {
                BarLayout::Grouped => {
                    let width = slot_fill / group;
                    let left = slot_left + position as f64 * width;
                    doc.bar(&frame, (left, left + width), (0.0, value), s.color);
                }
                BarLayout::Stacked => {
                    doc.bar(
                        &frame,
                        (slot_left, slot_left + slot_fill),
                        (stacked, stacked + value),
                        s.color,
                    );
                    stacked += value;
                }
            }
        }
    }
    doc.legend(
        frame.left + frame.width + 16.0,
        frame.top + 12.0,
        &legend_entries(series.iter().map(|s| (&s.label, s.color))),
    );
    doc.finish()
}

/// Scatter plot over a fixed domain. Returns the SVG and the number of
/// points drawn inside the domain.
pub fn scatter_chart(
    axes: &Axes<'_>,
    domain: &PlotDomain,
    series: &[Series],
    opacity: f64,
    fit: Option<&LinearFit>,
) -> (String, usize) {
    let frame = main_frame(
        Scale::new(domain.x.min, domain.x.max),
        Scale::new(domain.y.min, domain.y.max),
    );
    let mut doc = SvgDocument::new(WIDTH, HEIGHT);
    doc.heading(axes.title);
    doc.axes(&frame, axes.x_label, axes.y_label);
    let mut drawn = 0;
    for s in series {
        drawn += doc.points(&frame, &s.points, s.color, opacity);
    }
    let mut legend = legend_entries(series.iter().map(|s| (&s.label, s.color)));
    if let Some(fit) = fit {
        let from = (domain.x.min, fit.predict(domain.x.min));
        let to = (domain.x.max, fit.predict(domain.x.max));
        doc.segment(&frame, from, to, "#1f2430");
        legend.push(("least squares".to_string(), "#1f2430"));
    }
    if series.len() > 1 || fit.is_some() {
        doc.legend(frame.left + frame.width + 16.0, frame.top + 12.0, &legend);
    }
    (doc.finish(), drawn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Domain;

    fn axes() -> Axes<'static> {
        Axes {
            title: "t",
            x_label: "x",
            y_label: "y",
        }
    }

    #[test]
    fn stacked_bars_skip_empty_segments() {
        let categories = vec!["a".to_string(), "b".to_string()];
        let series = vec![
            BarSeries {
                label: "one".into(),
                color: "#111111",
                values: vec![1.0, 0.0],
            },
            BarSeries {
                label: "two".into(),
                color: "#222222",
                values: vec![2.0, 3.0],
            },
        ];
        let svg = bar_chart(&axes(), &categories, &series, BarLayout::Stacked, 1);
        assert_eq!(svg.matches("fill='#111111'/>").count(), 2);
        assert_eq!(svg.matches("fill='#222222'/>").count(), 3);
    }

    #[test]
    fn scatter_counts_points_inside_domain() {
        let domain = PlotDomain::new(Domain::new(0.0, 10.0), Domain::new(0.0, 10.0));
        let series = vec![Series {
            label: "maps".into(),
            color: "#333333",
            points: vec![(1.0, 1.0), (20.0, 1.0), (5.0, 5.0)],
        }];
        let fit = LinearFit::ordinary_least_squares(&series[0].points);
        let (svg, drawn) = scatter_chart(&axes(), &domain, &series, 0.15, fit.as_ref());
        assert_eq!(drawn, 2);
        assert!(svg.contains("stroke-dasharray"));
        assert!(svg.contains("least squares"));
    }

    #[test]
    fn panels_grid_grows_by_rows() {
        let bins = BinSpec::new(0.0, 4.0, 1.0);
        let panels = (0..3)
            .map(|i| (format!("p{i}"), "#444444", vec![1, 0, 2, 0]))
            .collect::<Vec<_>>();
        let svg = histogram_panels(&axes(), &bins, &panels);
        assert!(svg.contains("height='570'"));
        assert_eq!(svg.matches("fill='#444444'/>").count(), 6);
    }
}
