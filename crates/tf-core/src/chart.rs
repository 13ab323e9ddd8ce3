//! Stacked-area chart geometry.
//!
//! Turns an [`Aggregation`] into per-category closed outlines made of cubic
//! segments. Control points are clamped to the drawable band: an unclamped
//! handle lets the curve dip below the baseline or rise above the top, which
//! would draw minutes that do not exist.

use std::fmt::{self, Write};

use serde::Serialize;

use crate::aggregate::{Aggregation, Granularity};

/// Strength of the tangent handles relative to the neighbour distance.
pub const SMOOTHING: f64 = 0.2;

/// Smallest value mapped to the drawable top, in minutes.
///
/// Keeps a sparse chart from stretching a few minutes to full height.
pub const MIN_SCALE_MINUTES: u32 = 60;

const DEFAULT_FILL: &str = "#a1a1aa";

/// Pixel size of the chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartLayout {
    pub width: f64,
    pub height: f64,
    /// Margin on every side of the drawable area.
    pub padding: f64,
}

impl Default for ChartLayout {
    fn default() -> Self {
        Self {
            width: 360.0,
            height: 200.0,
            padding: 20.0,
        }
    }
}

impl ChartLayout {
    pub fn bounds(&self) -> Bounds {
        Bounds {
            top: self.padding,
            bottom: (self.height - self.padding).max(self.padding),
        }
    }

    /// X of every bucket, evenly spaced; a single bucket is centred.
    #[expect(
        clippy::cast_precision_loss,
        reason = "bucket counts are at most a few dozen"
    )]
    pub fn x_positions(&self, count: usize) -> Vec<f64> {
        match count {
            0 => Vec::new(),
            1 => vec![self.width / 2.0],
            _ => {
                let span = self.width - 2.0 * self.padding;
                let step = span / (count - 1) as f64;
                (0..count).map(|i| self.padding + step * i as f64).collect()
            }
        }
    }
}

/// Vertical extent of the drawable area (SVG coordinates, top < bottom).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub top: f64,
    pub bottom: f64,
}

impl Bounds {
    pub fn clamp(&self, y: f64) -> f64 {
        y.clamp(self.top, self.bottom)
    }

    pub fn contains(&self, y: f64) -> bool {
        (self.top..=self.bottom).contains(&y)
    }

    /// Y of a stacked value; `scale` minutes map to the top.
    pub fn y_for(&self, minutes: u32, scale: u32) -> f64 {
        let ratio = f64::from(minutes) / f64::from(scale.max(1));
        self.clamp(self.bottom - ratio * (self.bottom - self.top))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", format_coord(self.x), format_coord(self.y))
    }
}

/// One step of an outline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    CubicTo { c1: Point, c2: Point, to: Point },
    Close,
}

impl PathCommand {
    /// Control points of a cubic segment.
    pub const fn control_points(&self) -> Option<(Point, Point)> {
        match self {
            Self::CubicTo { c1, c2, .. } => Some((*c1, *c2)),
            _ => None,
        }
    }
}

impl fmt::Display for PathCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MoveTo(p) => write!(f, "M {p}"),
            Self::LineTo(p) => write!(f, "L {p}"),
            Self::CubicTo { c1, c2, to } => write!(f, "C {c1} {c2} {to}"),
            Self::Close => write!(f, "Z"),
        }
    }
}

/// SVG path data for `commands`.
pub fn path_data(commands: &[PathCommand]) -> String {
    commands
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Two decimals, trailing zeros dropped, no negative zero.
fn format_coord(value: f64) -> String {
    if value.abs() < 0.005 {
        return "0".to_string();
    }
    let s = format!("{value:.2}");
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Tangent handle of `current`.
///
/// The handle runs along `next - previous` scaled by [`SMOOTHING`]; a missing
/// neighbour is replaced by `current`. `reverse` mirrors the handle for the
/// incoming side. Y is clamped to `bounds`.
pub fn control_point(
    current: Point,
    previous: Option<Point>,
    next: Option<Point>,
    reverse: bool,
    bounds: Bounds,
) -> Point {
    let previous = previous.unwrap_or(current);
    let next = next.unwrap_or(current);
    let sign: f64 = if reverse { -1.0 } else { 1.0 };

    let x = sign.mul_add((next.x - previous.x) * SMOOTHING, current.x);
    let y = sign.mul_add((next.y - previous.y) * SMOOTHING, current.y);
    Point::new(x, bounds.clamp(y))
}

/// Cubic segments through `points`, without the initial move.
fn smooth_segments(points: &[Point], bounds: Bounds) -> Vec<PathCommand> {
    (1..points.len())
        .map(|i| {
            let start = control_point(
                points[i - 1],
                i.checked_sub(2).map(|j| points[j]),
                Some(points[i]),
                false,
                bounds,
            );
            let end = control_point(
                points[i],
                Some(points[i - 1]),
                points.get(i + 1).copied(),
                true,
                bounds,
            );
            PathCommand::CubicTo {
                c1: start,
                c2: end,
                to: points[i],
            }
        })
        .collect()
}

/// Smooth open curve through `points`.
pub fn smooth_path(points: &[Point], bounds: Bounds) -> Vec<PathCommand> {
    let Some(&first) = points.first() else {
        return Vec::new();
    };
    let mut commands = vec![PathCommand::MoveTo(first)];
    commands.extend(smooth_segments(points, bounds));
    commands
}

/// Closed band between a top and a bottom boundary.
///
/// Runs along the smoothed top left to right, drops straight to the last
/// bottom point, follows the smoothed bottom right to left and returns
/// straight to the first top point.
pub fn area_path(top: &[Point], bottom: &[Point], bounds: Bounds) -> Vec<PathCommand> {
    let (Some(&first_top), Some(&last_bottom)) = (top.first(), bottom.last()) else {
        return Vec::new();
    };

    let reversed: Vec<Point> = bottom.iter().rev().copied().collect();
    let mut commands = smooth_path(top, bounds);
    commands.push(PathCommand::LineTo(last_bottom));
    commands.extend(smooth_segments(&reversed, bounds));
    commands.push(PathCommand::LineTo(first_top));
    commands.push(PathCommand::Close);
    commands
}

/// One category's band across all buckets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub name: String,
    pub color: String,
    pub accent: Option<String>,
    pub top: Vec<Point>,
    pub bottom: Vec<Point>,
    pub path: Vec<PathCommand>,
}

impl ChartSeries {
    /// SVG path data of the band.
    pub fn d(&self) -> String {
        path_data(&self.path)
    }

    pub fn fill(&self) -> &str {
        self.accent.as_deref().unwrap_or(DEFAULT_FILL)
    }
}

/// Everything needed to draw the trend chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    pub granularity: Granularity,
    pub layout: ChartLayout,
    pub bounds: Bounds,
    /// Minutes mapped to the drawable top.
    pub scale_minutes: u32,
    pub xs: Vec<f64>,
    pub labels: Vec<String>,
    pub series: Vec<ChartSeries>,
}

/// Lays out `aggregation` in `layout`.
///
/// The baseline sits at the drawable bottom and the largest bucket total
/// (at least [`MIN_SCALE_MINUTES`]) at the drawable top.
pub fn layout_chart(aggregation: &Aggregation, layout: &ChartLayout) -> ChartData {
    let bounds = layout.bounds();
    let scale_minutes = aggregation.max_total().max(MIN_SCALE_MINUTES);
    let xs = layout.x_positions(aggregation.buckets.len());

    let series = aggregation
        .categories
        .iter()
        .enumerate()
        .map(|(index, category)| {
            let (top, bottom): (Vec<Point>, Vec<Point>) = aggregation
                .buckets
                .iter()
                .zip(&xs)
                .map(|(bucket, &x)| {
                    let extent = bucket.stack.get(index).copied().unwrap_or_default();
                    (
                        Point::new(x, bounds.y_for(extent.top, scale_minutes)),
                        Point::new(x, bounds.y_for(extent.bottom, scale_minutes)),
                    )
                })
                .unzip();
            let path = area_path(&top, &bottom, bounds);
            ChartSeries {
                name: category.name.clone(),
                color: category.color.clone(),
                accent: category.accent.clone(),
                top,
                bottom,
                path,
            }
        })
        .collect();

    ChartData {
        granularity: aggregation.granularity,
        layout: *layout,
        bounds,
        scale_minutes,
        xs,
        labels: aggregation
            .buckets
            .iter()
            .map(|b| b.period.label.clone())
            .collect(),
        series,
    }
}

impl ChartData {
    /// Every control point of every series.
    pub fn control_points(&self) -> impl Iterator<Item = Point> + '_ {
        self.series
            .iter()
            .flat_map(|s| s.path.iter().filter_map(PathCommand::control_points))
            .flat_map(|(c1, c2)| [c1, c2])
    }

    /// Renders a standalone SVG document.
    pub fn to_svg(&self) -> String {
        let width = format_coord(self.layout.width);
        let height = format_coord(self.layout.height);
        let mut svg = String::new();
        // Writing to a String cannot fail.
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {width} {height}" width="{width}" height="{height}">"#
        );
        for series in &self.series {
            let _ = writeln!(
                svg,
                r#"<path d="{}" fill="{}" fill-opacity="0.85"><title>{}</title></path>"#,
                series.d(),
                escape_xml(series.fill()),
                escape_xml(&series.name)
            );
        }
        let label_y = format_coord(self.layout.padding.mul_add(0.8, self.bounds.bottom));
        for (x, label) in self.xs.iter().zip(&self.labels) {
            let _ = writeln!(
                svg,
                r#"<text x="{}" y="{label_y}" text-anchor="middle" font-size="10">{}</text>"#,
                format_coord(*x),
                escape_xml(label)
            );
        }
        svg.push_str("</svg>\n");
        svg
    }
}

fn escape_xml(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
