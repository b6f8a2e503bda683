// report-pdf: Paginated tables

use log::{debug, warn};

use crate::canvas::metrics::PT_TO_MM;
use crate::canvas::{Align, FontWeight, PrimitiveCanvas, Rgb, TextStyle};
use crate::chart::MUTED_TEXT;
use crate::error::Result;
use crate::geometry::{Point, Rect};
use crate::layout::{LayoutCursor, PageFrame};

// ============================================================================
// Constants
// ============================================================================

pub const CELL_PADDING_MM: f32 = 2.5;

/// Caption line above the header row
pub const CAPTION_HEIGHT_MM: f32 = 6.0;

pub const EMPTY_TABLE_MESSAGE: &str = "No data available";

const STRIPE_COLOR: Rgb = Rgb::new(243, 246, 250);
const BORDER_COLOR: Rgb = Rgb::new(226, 232, 240);
const BORDER_WIDTH_MM: f32 = 0.2;
pub const BODY_TEXT: Rgb = Rgb::new(30, 41, 59);

// ============================================================================
// Table Description
// ============================================================================

/// Which theme color fills the header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tone {
    #[default]
    Primary,
    Secondary,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableSpec {
    /// Drawn above the header and kept on the same page as it
    pub caption: Option<String>,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Column widths in mm; split evenly across the content width when absent
    pub column_widths: Option<Vec<f32>>,
    /// Per-column alignment; missing entries are left-aligned
    pub column_align: Vec<Align>,
    pub header_tone: Tone,
}

impl TableSpec {
    pub fn new<S: Into<String>>(headers: impl IntoIterator<Item = S>) -> Self {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    pub fn with_rows(mut self, rows: Vec<Vec<String>>) -> Self {
        self.rows = rows;
        self
    }

    pub fn with_align(mut self, align: Vec<Align>) -> Self {
        self.column_align = align;
        self
    }

    pub fn with_tone(mut self, tone: Tone) -> Self {
        self.header_tone = tone;
        self
    }

    fn align(&self, column: usize) -> Align {
        self.column_align.get(column).copied().unwrap_or_default()
    }
}

/// Resolved colors and font size for one table.
#[derive(Debug, Clone, Copy)]
pub struct TableStyle {
    pub header_fill: Rgb,
    pub font_size: f32,
}

/// Fixed row height for a body font size in points.
pub fn row_height(font_size: f32) -> f32 {
    font_size * PT_TO_MM + 2.0 * CELL_PADDING_MM
}

fn column_widths(table: &TableSpec, frame: &PageFrame) -> Vec<f32> {
    let columns = table.headers.len().max(1);
    match &table.column_widths {
        Some(widths) if widths.len() == columns => widths.clone(),
        Some(widths) => {
            warn!(
                "ignoring {} column widths for a {}-column table",
                widths.len(),
                columns
            );
            vec![frame.content_width() / columns as f32; columns]
        }
        None => vec![frame.content_width() / columns as f32; columns],
    }
}

// ============================================================================
// Rendering
// ============================================================================

/// Draws `table` at the cursor, breaking pages between rows and repeating the
/// header on every page the table spans. Leaves the cursor below the last row.
pub fn render_table<C: PrimitiveCanvas>(
    canvas: &mut C,
    cursor: &mut LayoutCursor,
    frame: &PageFrame,
    table: &TableSpec,
    style: &TableStyle,
) -> Result<()> {
    let row_h = row_height(style.font_size);
    let widths = column_widths(table, frame);
    let caption_h = if table.caption.is_some() { CAPTION_HEIGHT_MM } else { 0.0 };

    // Caption, header and first row stay together.
    cursor.ensure_room(canvas, frame, caption_h + 2.0 * row_h)?;
    canvas.set_text_color(BODY_TEXT);

    if let Some(caption) = &table.caption {
        canvas.draw_text(
            caption,
            Point::new(frame.left, cursor.y + 4.0),
            &TextStyle::bold(style.font_size),
        );
        cursor.y += caption_h;
    }

    draw_header(canvas, cursor.y, frame.left, &widths, table, style);
    cursor.y += row_h;

    if table.rows.is_empty() {
        warn!("table {:?} has no rows", table.caption.as_deref().unwrap_or("untitled"));
        canvas.draw_text(
            EMPTY_TABLE_MESSAGE,
            Point::new(frame.left + CELL_PADDING_MM, text_baseline(cursor.y, row_h, style.font_size)),
            &TextStyle::regular(style.font_size).colored(MUTED_TEXT),
        );
        draw_row_border(canvas, cursor.y + row_h, frame.left, widths.iter().sum());
        cursor.y += row_h;
        return Ok(());
    }

    for (index, row) in table.rows.iter().enumerate() {
        if cursor.y + row_h > frame.bottom {
            cursor.new_page(canvas, frame)?;
            debug!("table continues on page {}", cursor.page_index + 1);
            draw_header(canvas, cursor.y, frame.left, &widths, table, style);
            cursor.y += row_h;
        }
        draw_body_row(canvas, cursor.y, frame.left, &widths, table, row, index, style);
        cursor.y += row_h;
    }

    Ok(())
}

fn text_baseline(row_top: f32, row_h: f32, font_size: f32) -> f32 {
    row_top + row_h / 2.0 + font_size * PT_TO_MM * 0.35
}

fn cell_anchor(x: f32, width: f32, align: Align) -> f32 {
    match align {
        Align::Left => x + CELL_PADDING_MM,
        Align::Center => x + width / 2.0,
        Align::Right => x + width - CELL_PADDING_MM,
    }
}

fn draw_header<C: PrimitiveCanvas>(
    canvas: &mut C,
    y: f32,
    left: f32,
    widths: &[f32],
    table: &TableSpec,
    style: &TableStyle,
) {
    let row_h = row_height(style.font_size);
    canvas.set_fill_color(style.header_fill);
    canvas.fill_rect(Rect::new(left, y, widths.iter().sum(), row_h), 0.0);

    let mut x = left;
    for (column, (header, width)) in table.headers.iter().zip(widths).enumerate() {
        let align = table.align(column);
        let text = first_line(canvas, header, *width, style.font_size, FontWeight::Bold);
        canvas.draw_text(
            &text,
            Point::new(cell_anchor(x, *width, align), text_baseline(y, row_h, style.font_size)),
            &TextStyle::bold(style.font_size).aligned(align).colored(Rgb::WHITE),
        );
        x += width;
    }
}

#[allow(clippy::too_many_arguments)]
fn draw_body_row<C: PrimitiveCanvas>(
    canvas: &mut C,
    y: f32,
    left: f32,
    widths: &[f32],
    table: &TableSpec,
    row: &[String],
    index: usize,
    style: &TableStyle,
) {
    let row_h = row_height(style.font_size);
    let total_width: f32 = widths.iter().sum();

    if index % 2 == 1 {
        canvas.set_fill_color(STRIPE_COLOR);
        canvas.fill_rect(Rect::new(left, y, total_width, row_h), 0.0);
    }

    let mut x = left;
    for (column, width) in widths.iter().enumerate() {
        let cell = row.get(column).map(String::as_str).unwrap_or("");
        let align = table.align(column);
        let text = first_line(canvas, cell, *width, style.font_size, FontWeight::Regular);
        canvas.draw_text(
            &text,
            Point::new(cell_anchor(x, *width, align), text_baseline(y, row_h, style.font_size)),
            &TextStyle::regular(style.font_size).aligned(align),
        );
        x += width;
    }

    draw_row_border(canvas, y + row_h, left, total_width);
}

fn draw_row_border<C: PrimitiveCanvas>(canvas: &mut C, y: f32, left: f32, width: f32) {
    canvas.set_stroke_color(BORDER_COLOR);
    canvas.stroke_line(Point::new(left, y), Point::new(left + width, y), BORDER_WIDTH_MM);
}

/// Rows have a fixed height, so overflowing cell text keeps its first wrapped line.
fn first_line<C: PrimitiveCanvas>(
    canvas: &C,
    text: &str,
    width: f32,
    font_size: f32,
    weight: FontWeight,
) -> String {
    canvas
        .wrap_text(text, width - 2.0 * CELL_PADDING_MM, font_size, weight)
        .into_iter()
        .next()
        .unwrap_or_default()
}
