// report-pdf: Donut and bar charts drawn from raw primitives

use crate::canvas::{Align, PrimitiveCanvas, Rgb, TextStyle};
use crate::error::Result;
use crate::format::{format_compact, round_half_up, truncate_chars};
use crate::geometry::{self, Point, Rect, DEFAULT_BAR_GAP, DEFAULT_SLICE_STEPS, DONUT_INNER_RATIO};
use crate::theme::ReportTheme;

// ============================================================================
// Constants
// ============================================================================

/// Space between the donut and its legend
const LEGEND_GAP_MM: f32 = 12.0;
const LEGEND_ROW_MM: f32 = 7.0;
const SWATCH_MM: f32 = 4.0;

/// Headroom above the tallest bar for its value label
const VALUE_LABEL_RESERVE_MM: f32 = 6.0;

/// Band below the baseline for category labels
const CATEGORY_BAND_MM: f32 = 7.0;

const MAX_CATEGORY_CHARS: usize = 10;
const BAR_CORNER_RADIUS_MM: f32 = 1.0;
const AXIS_WIDTH_MM: f32 = 0.3;
const CHART_LABEL_FONT_SIZE: f32 = 7.0;

pub const AXIS_COLOR: Rgb = Rgb::new(148, 163, 184);
pub const MUTED_TEXT: Rgb = Rgb::new(100, 116, 139);
pub const LABEL_TEXT: Rgb = Rgb::new(30, 41, 59);

// ============================================================================
// Chart Specs
// ============================================================================

/// `color: None` takes the theme palette color for the slice's position.
#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub value: f32,
    pub label: String,
    pub color: Option<Rgb>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieSpec {
    pub title: String,
    pub slices: Vec<PieSlice>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub value: f32,
    pub label: String,
    pub color: Option<Rgb>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueFormat {
    #[default]
    Count,
    Currency,
}

impl ValueFormat {
    pub fn label(self, value: f32) -> String {
        match self {
            ValueFormat::Count => format_compact(value as f64),
            ValueFormat::Currency => format!("${}", format_compact(value as f64)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarSpec {
    pub title: String,
    pub bars: Vec<Bar>,
    pub format: ValueFormat,
}

// ============================================================================
// Pie Chart
// ============================================================================

/// Slice share as shown in the legend, rounded to one decimal with halves up.
pub fn legend_percent(value: f32, total: f32) -> String {
    let tenths = round_half_up(value as f64 / total as f64 * 1000.0);
    format!("{:.1}", tenths / 10.0)
}

/// Draws a donut chart centered at `center` with its legend to the right.
/// An empty spec draws nothing.
pub fn draw_pie_chart<C: PrimitiveCanvas>(
    canvas: &mut C,
    center: Point,
    radius: f32,
    spec: &PieSpec,
    theme: &ReportTheme,
) -> Result<()> {
    if spec.slices.is_empty() {
        return Ok(());
    }

    let values: Vec<f32> = spec.slices.iter().map(|s| s.value).collect();
    let angles = geometry::pie_slices(&values)?;
    let total: f32 = values.iter().sum();

    for (i, (slice, angle)) in spec.slices.iter().zip(&angles).enumerate() {
        canvas.set_fill_color(slice.color.unwrap_or_else(|| theme.palette_color(i)));
        let fan = geometry::triangulate_slice(center, radius, angle.start, angle.end, DEFAULT_SLICE_STEPS)?;
        for triangle in &fan {
            canvas.fill_triangle(triangle);
        }
    }

    let mask = geometry::donut_mask(center, radius, DONUT_INNER_RATIO)?;
    canvas.set_fill_color(theme.background);
    canvas.fill_circle(mask.center, mask.radius);

    // Legend
    let legend_x = center.x + radius + LEGEND_GAP_MM;
    let mut legend_y = center.y - radius + SWATCH_MM;
    let style = TextStyle::regular(theme.body_font_size);
    canvas.set_text_color(LABEL_TEXT);
    for (i, slice) in spec.slices.iter().enumerate() {
        canvas.set_fill_color(slice.color.unwrap_or_else(|| theme.palette_color(i)));
        canvas.fill_rect(Rect::new(legend_x, legend_y - SWATCH_MM + 0.8, SWATCH_MM, SWATCH_MM), 0.8);
        canvas.draw_text(
            &format!("{} ({}%)", slice.label, legend_percent(slice.value, total)),
            Point::new(legend_x + SWATCH_MM + 2.0, legend_y),
            &style,
        );
        legend_y += LEGEND_ROW_MM;
    }

    Ok(())
}

// ============================================================================
// Bar Chart
// ============================================================================

/// Draws a bar chart inside the box at `origin`. The bottom band holds the
/// category labels; value labels sit above each bar. An empty spec draws nothing.
pub fn draw_bar_chart<C: PrimitiveCanvas>(
    canvas: &mut C,
    origin: Point,
    width: f32,
    height: f32,
    spec: &BarSpec,
    theme: &ReportTheme,
) -> Result<()> {
    if spec.bars.is_empty() {
        return Ok(());
    }

    let plot_height = height - CATEGORY_BAND_MM;
    let values: Vec<f32> = spec.bars.iter().map(|b| b.value).collect();
    let rects = geometry::bar_geometry(&values, width, plot_height, DEFAULT_BAR_GAP, VALUE_LABEL_RESERVE_MM)?;

    let baseline = origin.y + plot_height;
    canvas.set_stroke_color(AXIS_COLOR);
    canvas.stroke_line(
        Point::new(origin.x, baseline),
        Point::new(origin.x + width, baseline),
        AXIS_WIDTH_MM,
    );

    canvas.set_text_color(LABEL_TEXT);
    let value_style = TextStyle::bold(CHART_LABEL_FONT_SIZE).aligned(Align::Center);
    let category_style = TextStyle::regular(CHART_LABEL_FONT_SIZE)
        .aligned(Align::Center)
        .colored(MUTED_TEXT);

    for (i, (bar, local)) in spec.bars.iter().zip(&rects).enumerate() {
        let rect = Rect::new(origin.x + local.x, origin.y + local.y, local.width, local.height);
        if rect.height > 0.0 {
            canvas.set_fill_color(bar.color.unwrap_or_else(|| theme.palette_color(i)));
            canvas.fill_rect(rect, BAR_CORNER_RADIUS_MM);
        }

        canvas.draw_text(
            &spec.format.label(bar.value),
            Point::new(rect.center_x(), rect.y - 1.5),
            &value_style,
        );
        canvas.draw_text(
            &truncate_chars(&bar.label, MAX_CATEGORY_CHARS),
            Point::new(rect.center_x(), baseline + 4.5),
            &category_style,
        );
    }

    Ok(())
}
