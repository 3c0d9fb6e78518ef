use std::fmt::Write as _;

pub const FONT: &str = "Inter, Segoe UI, Helvetica, sans-serif";

pub const MODE_COLORS: [&str; 4] = ["#e8588f", "#f0a33a", "#3fa7d6", "#59c36a"];
pub const SPREAD_COLORS: [&str; 6] = [
    "#88c9f2", "#7fd18b", "#f5d04a", "#f59a4a", "#e8588f", "#6b4fa8",
];

pub fn palette(colors: &[&'static str], index: usize) -> &'static str {
    colors[index % colors.len()]
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale {
    pub min: f64,
    pub max: f64,
}

impl Scale {
    pub fn new(min: f64, max: f64) -> Self {
        if max > min {
            Self { min, max }
        } else {
            Self { min, max: min + 1.0 }
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value.is_finite() && value >= self.min && value <= self.max
    }

    fn fraction(&self, value: f64) -> f64 {
        (value - self.min) / (self.max - self.min)
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

/// Maps data coordinates onto a rectangle of the canvas. Marks outside the
/// scales are skipped (points) or clipped (lines, bars).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub x: Scale,
    pub y: Scale,
}

impl Frame {
    pub fn px(&self, value: f64) -> f64 {
        self.left + self.x.fraction(value) * self.width
    }

    pub fn py(&self, value: f64) -> f64 {
        self.top + self.height - self.y.fraction(value) * self.height
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.x.contains(x) && self.y.contains(y)
    }
}

/// Step between roughly `target` ticks, rounded to 1, 2 or 5 times a power of ten.
pub fn nice_step(scale: Scale, target: usize) -> f64 {
    let raw = (scale.max - scale.min) / target.max(1) as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    let normalized = raw / magnitude;
    let factor = if normalized <= 1.0 {
        1.0
    } else if normalized <= 2.0 {
        2.0
    } else if normalized <= 5.0 {
        5.0
    } else {
        10.0
    };
    factor * magnitude
}

pub fn nice_ticks(scale: Scale, target: usize) -> Vec<f64> {
    let step = nice_step(scale, target);
    if !step.is_finite() || step <= 0.0 {
        return vec![scale.min];
    }
    let mut ticks = Vec::new();
    let mut tick = (scale.min / step).ceil() * step;
    while tick <= scale.max + step * 1e-9 {
        ticks.push(tick);
        tick += step;
    }
    ticks
}

pub fn format_tick(value: f64, step: f64) -> String {
    let magnitude = value.abs();
    if magnitude >= 1_000_000.0 {
        return format!("{}M", trim_decimal(value / 1_000_000.0));
    }
    if magnitude >= 10_000.0 {
        return format!("{}k", trim_decimal(value / 1_000.0));
    }
    let decimals = if step >= 1.0 {
        0
    } else {
        (-step.log10().floor()) as usize
    };
    format!("{value:.decimals$}")
}

fn trim_decimal(value: f64) -> String {
    let text = format!("{value:.1}");
    text.strip_suffix(".0").map(str::to_string).unwrap_or(text)
}

pub fn escape_text(value: &str) -> String {
    crate::table::escape_html(value)
}

#[derive(Debug, Clone)]
pub struct SvgDocument {
    width: f64,
    height: f64,
    body: String,
    clip_count: usize,
}

impl SvgDocument {
    pub fn new(width: f64, height: f64) -> Self {
        let mut body = String::new();
        let _ = writeln!(
            body,
            "  <rect width='{width:.0}' height='{height:.0}' fill='#ffffff'/>"
        );
        Self {
            width,
            height,
            body,
            clip_count: 0,
        }
    }

    pub fn heading(&mut self, text: &str) {
        let _ = writeln!(
            self.body,
            "  <text x='{:.1}' y='28' text-anchor='middle' fill='#1f2430' font-family='{FONT}' font-size='18' font-weight='600'>{}</text>",
            self.width / 2.0,
            escape_text(text)
        );
    }

    pub fn text(&mut self, x: f64, y: f64, anchor: &str, size: u32, text: &str) {
        let _ = writeln!(
            self.body,
            "  <text x='{x:.1}' y='{y:.1}' text-anchor='{anchor}' fill='#3a4150' font-family='{FONT}' font-size='{size}'>{}</text>",
            escape_text(text)
        );
    }

    /// Frame border, numeric ticks on both axes and axis labels.
    pub fn axes(&mut self, frame: &Frame, x_label: &str, y_label: &str) {
        self.frame_border(frame);
        let x_step = nice_step(frame.x, 6);
        for tick in nice_ticks(frame.x, 6) {
            let x = frame.px(tick);
            self.tick_line(x, frame.top + frame.height, x, frame.top + frame.height + 5.0);
            self.text(
                x,
                frame.top + frame.height + 18.0,
                "middle",
                11,
                &format_tick(tick, x_step),
            );
        }
        self.y_ticks(frame);
        self.axis_labels(frame, x_label, y_label);
    }

    /// Like [`Self::axes`] but with one labelled slot per category on x.
    /// Only every `label_every`-th category is labelled.
    pub fn category_axes(
        &mut self,
        frame: &Frame,
        categories: &[String],
        label_every: usize,
        x_label: &str,
        y_label: &str,
    ) {
        self.frame_border(frame);
        let every = label_every.max(1);
        for (idx, category) in categories.iter().enumerate() {
            if idx % every != 0 {
                continue;
            }
            let x = frame.px(idx as f64 + 0.5);
            self.tick_line(x, frame.top + frame.height, x, frame.top + frame.height + 5.0);
            self.text(x, frame.top + frame.height + 18.0, "middle", 11, category);
        }
        self.y_ticks(frame);
        self.axis_labels(frame, x_label, y_label);
    }

    fn frame_border(&mut self, frame: &Frame) {
        let _ = writeln!(
            self.body,
            "  <rect x='{:.1}' y='{:.1}' width='{:.1}' height='{:.1}' fill='#fafbfc' stroke='#c7ccd6'/>",
            frame.left, frame.top, frame.width, frame.height
        );
    }

    fn y_ticks(&mut self, frame: &Frame) {
        let y_step = nice_step(frame.y, 5);
        for tick in nice_ticks(frame.y, 5) {
            let y = frame.py(tick);
            let _ = writeln!(
                self.body,
                "  <line x1='{:.1}' y1='{y:.1}' x2='{:.1}' y2='{y:.1}' stroke='#e3e6ec'/>",
                frame.left,
                frame.left + frame.width
            );
            self.text(frame.left - 6.0, y + 4.0, "end", 11, &format_tick(tick, y_step));
        }
    }

    fn axis_labels(&mut self, frame: &Frame, x_label: &str, y_label: &str) {
        self.text(
            frame.left + frame.width / 2.0,
            frame.top + frame.height + 38.0,
            "middle",
            12,
            x_label,
        );
        let x = frame.left - 48.0;
        let y = frame.top + frame.height / 2.0;
        let _ = writeln!(
            self.body,
            "  <text x='{x:.1}' y='{y:.1}' transform='rotate(-90 {x:.1} {y:.1})' text-anchor='middle' fill='#3a4150' font-family='{FONT}' font-size='12'>{}</text>",
            escape_text(y_label)
        );
    }

    fn tick_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        let _ = writeln!(
            self.body,
            "  <line x1='{x1:.1}' y1='{y1:.1}' x2='{x2:.1}' y2='{y2:.1}' stroke='#8a92a3'/>"
        );
    }

    fn clip(&mut self, frame: &Frame) -> String {
        self.clip_count += 1;
        let id = format!("clip{}", self.clip_count);
        let _ = writeln!(
            self.body,
            "  <clipPath id='{id}'><rect x='{:.1}' y='{:.1}' width='{:.1}' height='{:.1}'/></clipPath>",
            frame.left, frame.top, frame.width, frame.height
        );
        id
    }

    pub fn polyline(&mut self, frame: &Frame, points: &[(f64, f64)], color: &str) {
        if points.is_empty() {
            return;
        }
        let clip = self.clip(frame);
        let path = points
            .iter()
            .map(|(x, y)| format!("{:.2},{:.2}", frame.px(*x), frame.py(*y)))
            .collect::<Vec<_>>()
            .join(" ");
        let _ = writeln!(
            self.body,
            "  <polyline clip-path='url(#{clip})' points='{path}' fill='none' stroke='{color}' stroke-width='1.6' stroke-linejoin='round'/>"
        );
    }

    /// Draws the points inside the frame and returns how many were drawn.
    pub fn points(
        &mut self,
        frame: &Frame,
        points: &[(f64, f64)],
        color: &str,
        opacity: f64,
    ) -> usize {
        let mut drawn = 0;
        let _ = writeln!(
            self.body,
            "  <g fill='{color}' fill-opacity='{opacity:.2}'>"
        );
        for &(x, y) in points {
            if !frame.contains(x, y) {
                continue;
            }
            let _ = writeln!(
                self.body,
                "    <circle cx='{:.1}' cy='{:.1}' r='2'/>",
                frame.px(x),
                frame.py(y)
            );
            drawn += 1;
        }
        let _ = writeln!(self.body, "  </g>");
        drawn
    }

    /// Rectangle spanning `[x0, x1] x [y0, y1]` in data space, clamped to the frame.
    pub fn bar(&mut self, frame: &Frame, x: (f64, f64), y: (f64, f64), color: &str) {
        let (x0, x1) = (frame.x.clamp(x.0), frame.x.clamp(x.1));
        let (y0, y1) = (frame.y.clamp(y.0), frame.y.clamp(y.1));
        let width = frame.px(x1) - frame.px(x0);
        let height = frame.py(y0) - frame.py(y1);
        if width <= 0.0 || height <= 0.0 {
            return;
        }
        let _ = writeln!(
            self.body,
            "  <rect x='{:.2}' y='{:.2}' width='{width:.2}' height='{height:.2}' fill='{color}'/>",
            frame.px(x0),
            frame.py(y1)
        );
    }

    /// Straight line between two data points, clipped to the frame.
    pub fn segment(&mut self, frame: &Frame, from: (f64, f64), to: (f64, f64), color: &str) {
        let clip = self.clip(frame);
        let _ = writeln!(
            self.body,
            "  <line clip-path='url(#{clip})' x1='{:.2}' y1='{:.2}' x2='{:.2}' y2='{:.2}' stroke='{color}' stroke-width='2' stroke-dasharray='6 4'/>",
            frame.px(from.0),
            frame.py(from.1),
            frame.px(to.0),
            frame.py(to.1)
        );
    }

    pub fn legend(&mut self, left: f64, top: f64, entries: &[(String, &str)]) {
        for (idx, (label, color)) in entries.iter().enumerate() {
            let y = top + idx as f64 * 16.0;
            let _ = writeln!(
                self.body,
                "  <rect x='{left:.1}' y='{:.1}' width='10' height='10' fill='{color}'/>",
                y - 9.0
            );
            self.text(left + 15.0, y, "start", 11, label);
        }
    }

    pub fn finish(self) -> String {
        let mut svg = String::new();
        let _ = writeln!(
            svg,
            "<svg xmlns='http://www.w3.org/2000/svg' width='{w:.0}' height='{h:.0}' viewBox='0 0 {w:.0} {h:.0}' role='img'>",
            w = self.width,
            h = self.height
        );
        svg.push_str(&self.body);
        svg.push_str("</svg>\n");
        svg
    }
}
