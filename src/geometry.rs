// report-pdf: Geometry kernel
//
// Pure math for the chart and box primitives. Coordinates are millimetres with a
// top-left origin and Y growing downwards, so increasing angles sweep clockwise.

use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_2, PI, TAU};
use thiserror::Error;

// ============================================================================
// Constants
// ============================================================================

/// Triangles per pie slice (about 6 degrees each for a typical slice)
pub const DEFAULT_SLICE_STEPS: usize = 30;

/// Inner cutout radius as a fraction of the outer radius
pub const DONUT_INNER_RATIO: f32 = 0.5;

/// Horizontal gap between bars
pub const DEFAULT_BAR_GAP: f32 = 4.0;

/// Pie charts start at 12 o'clock
pub const PIE_START_ANGLE: f32 = -FRAC_PI_2;

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("no values to lay out")]
    Empty,
    #[error("value at index {0} is not finite")]
    NonFinite(usize),
    #[error("value at index {0} is negative")]
    Negative(usize),
    #[error("values sum to zero")]
    ZeroTotal,
    #[error("invalid {name}: {value}")]
    InvalidParameter { name: &'static str, value: f32 },
}

// ============================================================================
// Primitives
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Point on a circle around `self` at `angle` radians.
    pub fn polar(self, radius: f32, angle: f32) -> Self {
        Self::new(self.x + radius * angle.cos(), self.y + radius * angle.sin())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle(pub [Point; 3]);

impl Triangle {
    pub fn area(&self) -> f32 {
        let [a, b, c] = self.0;
        ((b.x - a.x) * (c.y - a.y) - (c.x - a.x) * (b.y - a.y)).abs() / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: Point,
    pub radius: f32,
}

/// Angular extent of one pie slice, in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliceAngles {
    pub start: f32,
    pub end: f32,
}

impl SliceAngles {
    pub fn sweep(&self) -> f32 {
        self.end - self.start
    }
}

// ============================================================================
// Validation
// ============================================================================

/// Checks a chart series: non-empty, finite and non-negative.
pub fn validate_series(values: &[f32]) -> Result<(), GeometryError> {
    if values.is_empty() {
        return Err(GeometryError::Empty);
    }
    for (i, v) in values.iter().enumerate() {
        if !v.is_finite() {
            return Err(GeometryError::NonFinite(i));
        }
        if *v < 0.0 {
            return Err(GeometryError::Negative(i));
        }
    }
    Ok(())
}

fn check_param(name: &'static str, value: f32) -> Result<f32, GeometryError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(GeometryError::InvalidParameter { name, value })
    }
}

// ============================================================================
// Pie Charts
// ============================================================================

/// Splits a full turn proportionally to `values`, starting at 12 o'clock and
/// proceeding clockwise. The last slice always closes the circle exactly.
pub fn pie_slices(values: &[f32]) -> Result<Vec<SliceAngles>, GeometryError> {
    validate_series(values)?;
    let total: f32 = values.iter().sum();
    if total <= 0.0 {
        return Err(GeometryError::ZeroTotal);
    }

    let full_turn_end = PIE_START_ANGLE + TAU;
    let mut start = PIE_START_ANGLE;
    let mut slices = Vec::with_capacity(values.len());
    for (i, value) in values.iter().enumerate() {
        let end = if i == values.len() - 1 {
            full_turn_end
        } else {
            start + TAU * value / total
        };
        slices.push(SliceAngles { start, end });
        start = end;
    }
    Ok(slices)
}

/// Approximates a circular sector as a fan of `steps` triangles around `center`.
pub fn triangulate_slice(
    center: Point,
    radius: f32,
    start_angle: f32,
    end_angle: f32,
    steps: usize,
) -> Result<Vec<Triangle>, GeometryError> {
    let radius = check_param("radius", radius)?;
    if steps == 0 {
        return Err(GeometryError::InvalidParameter { name: "steps", value: 0.0 });
    }
    if !start_angle.is_finite() || !end_angle.is_finite() {
        return Err(GeometryError::InvalidParameter { name: "angle", value: end_angle - start_angle });
    }

    let sweep = end_angle - start_angle;
    if sweep == 0.0 {
        return Ok(Vec::new());
    }

    let step = sweep / steps as f32;
    let triangles = (0..steps)
        .map(|i| {
            let a0 = start_angle + step * i as f32;
            let a1 = if i == steps - 1 { end_angle } else { a0 + step };
            Triangle([center, center.polar(radius, a0), center.polar(radius, a1)])
        })
        .collect();
    Ok(triangles)
}

/// Inner cutout that turns a pie into a donut.
pub fn donut_mask(center: Point, radius: f32, inner_ratio: f32) -> Result<Circle, GeometryError> {
    let radius = check_param("radius", radius)?;
    let ratio = check_param("inner ratio", inner_ratio)?;
    if ratio >= 1.0 {
        return Err(GeometryError::InvalidParameter { name: "inner ratio", value: ratio });
    }
    Ok(Circle { center, radius: radius * ratio })
}

// ============================================================================
// Bar Charts
// ============================================================================

/// Lays out bottom-anchored bars inside a `width` x `height` container whose
/// top-left corner is the origin. The top `label_reserve` is kept free for value
/// labels, so the tallest bar is exactly `height - label_reserve` tall.
pub fn bar_geometry(
    values: &[f32],
    width: f32,
    height: f32,
    gap: f32,
    label_reserve: f32,
) -> Result<Vec<Rect>, GeometryError> {
    validate_series(values)?;
    let width = check_param("width", width)?;
    let height = check_param("height", height)?;
    let gap = check_param("gap", gap)?;
    let label_reserve = check_param("label reserve", label_reserve)?;

    let drawable = height - label_reserve;
    if drawable <= 0.0 {
        return Err(GeometryError::InvalidParameter { name: "label reserve", value: label_reserve });
    }

    let n = values.len() as f32;
    let bar_width = (width - (n - 1.0) * gap) / n;
    if bar_width <= 0.0 {
        return Err(GeometryError::InvalidParameter { name: "width", value: width });
    }

    let max_value = values.iter().copied().fold(0.0_f32, f32::max);
    let bars = values
        .iter()
        .enumerate()
        .map(|(i, value)| {
            let bar_height = if max_value > 0.0 {
                value / max_value * drawable
            } else {
                0.0
            };
            Rect::new(i as f32 * (bar_width + gap), height - bar_height, bar_width, bar_height)
        })
        .collect();
    Ok(bars)
}

// ============================================================================
// Outlines
// ============================================================================

/// Closed polygon approximating a circle.
pub fn circle_polygon(center: Point, radius: f32, segments: usize) -> Vec<Point> {
    let segments = segments.max(3);
    (0..segments)
        .map(|i| center.polar(radius, TAU * i as f32 / segments as f32))
        .collect()
}

/// Closed polygon for a rectangle with rounded corners. The radius is clamped
/// to half the shorter side; a zero radius yields the four plain corners.
pub fn rounded_rect_polygon(rect: Rect, radius: f32, corner_segments: usize) -> Vec<Point> {
    let r = radius.max(0.0).min(rect.width / 2.0).min(rect.height / 2.0);
    if r <= 0.0 || corner_segments == 0 {
        return vec![
            Point::new(rect.x, rect.y),
            Point::new(rect.x + rect.width, rect.y),
            Point::new(rect.x + rect.width, rect.bottom()),
            Point::new(rect.x, rect.bottom()),
        ];
    }

    // Corner arc centers, clockwise from top-left, with their starting angles.
    let corners = [
        (Point::new(rect.x + r, rect.y + r), PI),
        (Point::new(rect.x + rect.width - r, rect.y + r), PI + FRAC_PI_2),
        (Point::new(rect.x + rect.width - r, rect.bottom() - r), 0.0),
        (Point::new(rect.x + r, rect.bottom() - r), FRAC_PI_2),
    ];

    let mut points = Vec::with_capacity(4 * (corner_segments + 1));
    for (center, start) in corners {
        for i in 0..=corner_segments {
            let angle = start + FRAC_PI_2 * i as f32 / corner_segments as f32;
            points.push(center.polar(r, angle));
        }
    }
    points
}
