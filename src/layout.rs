// report-pdf: Page flow for report documents
//
// The engine owns the canvas and the layout cursor. Every section reserves its
// estimated height first; if that would cross the bottom of the page frame, a new
// page is started and the section is drawn at the top of it.

use ::image::DynamicImage;
use chrono::NaiveDate;
use log::debug;

use crate::canvas::metrics::PT_TO_MM;
use crate::canvas::{Align, FontWeight, PrimitiveCanvas, RenderedDocument, Rgb, TextStyle};
use crate::chart::{self, BarSpec, PieSpec, MUTED_TEXT};
use crate::error::Result;
use crate::format::format_date_display;
use crate::geometry::{Point, Rect};
use crate::table::{self, TableSpec, TableStyle, Tone};
use crate::theme::ReportTheme;

// ============================================================================
// Constants
// ============================================================================

pub const BANNER_HEIGHT_MM: f32 = 40.0;

/// Space between the banner and the first section
pub const BANNER_GAP_MM: f32 = 15.0;

/// Space above the bottom margin kept free for the footer
pub const FOOTER_BAND_MM: f32 = 20.0;

pub const HEADING_HEIGHT_MM: f32 = 10.0;

/// Room a heading needs below it so it never ends a page
pub const HEADING_RESERVE_MM: f32 = 20.0;

pub const CARD_HEIGHT_MM: f32 = 22.0;
pub const CARD_GAP_MM: f32 = 5.0;
pub const MAX_CARDS_PER_ROW: usize = 4;

pub const SECTION_GAP_MM: f32 = 8.0;

pub const PIE_RADIUS_MM: f32 = 28.0;
pub const BAR_CHART_HEIGHT_MM: f32 = 60.0;
pub const CHART_TITLE_HEIGHT_MM: f32 = 7.0;
pub const PLACEHOLDER_HEIGHT_MM: f32 = 14.0;

/// Logo box in the banner
const LOGO_MAX_WIDTH_MM: f32 = 40.0;
const LOGO_MAX_HEIGHT_MM: f32 = 22.0;

const TITLE_FONT_SIZE: f32 = 20.0;
const SUBTITLE_FONT_SIZE: f32 = 11.0;
const SMALL_FONT_SIZE: f32 = 8.0;
const CARD_VALUE_FONT_SIZE: f32 = 14.0;

const HEADING_TEXT: Rgb = Rgb::new(15, 23, 42);
const PLACEHOLDER_FILL: Rgb = Rgb::new(241, 245, 249);

// ============================================================================
// Layout Types
// ============================================================================

/// Printable area of every page, in mm from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageFrame {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl PageFrame {
    pub fn new(page_width: f32, page_height: f32, theme: &ReportTheme) -> Self {
        Self {
            left: theme.margin,
            right: page_width - theme.margin,
            top: theme.margin,
            bottom: page_height - theme.margin - FOOTER_BAND_MM,
        }
    }

    pub fn content_width(&self) -> f32 {
        self.right - self.left
    }

    pub fn content_height(&self) -> f32 {
        self.bottom - self.top
    }
}

/// Where the next section starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutCursor {
    pub page_index: usize,
    pub y: f32,
}

impl LayoutCursor {
    pub fn fits(&self, height: f32, frame: &PageFrame) -> bool {
        self.y + height <= frame.bottom
    }

    pub fn new_page<C: PrimitiveCanvas>(&mut self, canvas: &mut C, frame: &PageFrame) -> Result<()> {
        canvas.new_page()?;
        self.page_index = canvas.current_page();
        self.y = frame.top;
        debug!("page break, now on page {}", self.page_index + 1);
        Ok(())
    }

    /// Starts a new page unless `height` fits below the cursor. A block taller
    /// than a whole page is drawn from the top of the current page if the cursor
    /// is already there. Returns whether a page was added.
    pub fn ensure_room<C: PrimitiveCanvas>(
        &mut self,
        canvas: &mut C,
        frame: &PageFrame,
        height: f32,
    ) -> Result<bool> {
        if self.fits(height, frame) || self.y <= frame.top {
            return Ok(false);
        }
        self.new_page(canvas, frame)?;
        Ok(true)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatCard {
    pub label: String,
    pub value: String,
}

impl StatCard {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self { label: label.into(), value: value.into() }
    }
}

/// How a chart is positioned.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Placement {
    /// Reserve the chart's height at the cursor and advance past it
    #[default]
    Flow,
    /// Top-left corner on the current page; the cursor does not move
    Absolute(Point),
}

/// One section of a report, in drawing order.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutInstruction {
    Heading(String),
    StatCards(Vec<StatCard>),
    Table(TableSpec),
    PieChart(PieSpec),
    BarChart(BarSpec),
    /// Stands in for a section whose data could not be drawn
    Placeholder(String),
}

/// Banner content for the first page.
pub struct DocumentHeader<'a> {
    pub title: &'a str,
    pub subtitle: &'a str,
    pub generated: NaiveDate,
    pub report_id: Option<&'a str>,
    pub logo: Option<&'a DynamicImage>,
}

// ============================================================================
// Engine
// ============================================================================

pub struct ReportLayoutEngine<C: PrimitiveCanvas> {
    canvas: C,
    theme: ReportTheme,
    frame: PageFrame,
    cursor: LayoutCursor,
}

impl<C: PrimitiveCanvas> ReportLayoutEngine<C> {
    pub fn new(canvas: C, theme: ReportTheme) -> Self {
        let frame = PageFrame::new(canvas.page_width(), canvas.page_height(), &theme);
        let cursor = LayoutCursor { page_index: canvas.current_page(), y: frame.top };
        Self { canvas, theme, frame, cursor }
    }

    pub fn cursor(&self) -> LayoutCursor {
        self.cursor
    }

    pub fn frame(&self) -> &PageFrame {
        &self.frame
    }

    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    /// Paints the banner on the current page and moves the cursor below it.
    pub fn begin_document(&mut self, header: &DocumentHeader<'_>) {
        let width = self.canvas.page_width();
        let white = TextStyle::regular(SUBTITLE_FONT_SIZE).colored(Rgb::WHITE);

        self.canvas.set_fill_color(self.theme.primary);
        self.canvas.fill_rect(Rect::new(0.0, 0.0, width, BANNER_HEIGHT_MM), 0.0);
        self.canvas.set_fill_color(self.theme.secondary);
        self.canvas.fill_rect(Rect::new(0.0, BANNER_HEIGHT_MM - 1.5, width, 1.5), 0.0);

        self.canvas.draw_text(
            header.title,
            Point::new(self.frame.left, 17.0),
            &TextStyle::bold(TITLE_FONT_SIZE).colored(Rgb::WHITE),
        );
        self.canvas.draw_text(header.subtitle, Point::new(self.frame.left, 25.0), &white);
        self.canvas.draw_text(
            &format!("Generated: {}", format_date_display(&header.generated)),
            Point::new(self.frame.left, 32.0),
            &TextStyle::regular(SMALL_FONT_SIZE + 1.0).colored(Rgb::WHITE),
        );

        if let Some(report_id) = header.report_id {
            self.canvas.draw_text(
                &format!("Report ID: {}", report_id),
                Point::new(self.frame.right, 32.0),
                &TextStyle::regular(SMALL_FONT_SIZE).aligned(Align::Right).colored(Rgb::WHITE),
            );
        }

        if let Some(logo) = header.logo {
            let (w, h) = fit_within(logo.width(), logo.height(), LOGO_MAX_WIDTH_MM, LOGO_MAX_HEIGHT_MM);
            self.canvas.draw_image(logo, Rect::new(self.frame.right - w, 5.0, w, h));
        }

        self.cursor = LayoutCursor {
            page_index: self.canvas.current_page(),
            y: BANNER_HEIGHT_MM + BANNER_GAP_MM,
        };
    }

    pub fn add_section_heading(&mut self, text: &str) -> Result<()> {
        self.cursor
            .ensure_room(&mut self.canvas, &self.frame, HEADING_HEIGHT_MM + HEADING_RESERVE_MM)?;
        debug!("heading {:?} at y={:.1}", text, self.cursor.y);

        let size = self.theme.heading_font_size;
        let baseline = self.cursor.y + size * PT_TO_MM;
        self.canvas.set_text_color(HEADING_TEXT);
        self.canvas.draw_text(text, Point::new(self.frame.left, baseline), &TextStyle::bold(size));
        self.canvas.set_stroke_color(self.theme.secondary);
        self.canvas.stroke_line(
            Point::new(self.frame.left, baseline + 2.0),
            Point::new(self.frame.left + 30.0, baseline + 2.0),
            0.6,
        );
        self.cursor.y += HEADING_HEIGHT_MM;
        Ok(())
    }

    /// Lays cards out in rows of up to four equal-width cards.
    pub fn add_stat_cards(&mut self, cards: &[StatCard]) -> Result<()> {
        for row in cards.chunks(MAX_CARDS_PER_ROW) {
            self.cursor.ensure_room(&mut self.canvas, &self.frame, CARD_HEIGHT_MM)?;

            let n = row.len() as f32;
            let card_width = (self.frame.content_width() - (n - 1.0) * CARD_GAP_MM) / n;
            for (i, card) in row.iter().enumerate() {
                let x = self.frame.left + i as f32 * (card_width + CARD_GAP_MM);
                self.draw_stat_card(card, Rect::new(x, self.cursor.y, card_width, CARD_HEIGHT_MM));
            }
            self.cursor.y += CARD_HEIGHT_MM + SECTION_GAP_MM;
        }
        Ok(())
    }

    fn draw_stat_card(&mut self, card: &StatCard, rect: Rect) {
        self.canvas.set_fill_color(self.theme.primary.tint(0.9));
        self.canvas.fill_rect(rect, 2.0);
        self.canvas.set_fill_color(self.theme.primary);
        self.canvas.fill_rect(Rect::new(rect.x, rect.y + 2.0, 1.2, rect.height - 4.0), 0.0);

        let text_width = rect.width - 10.0;
        let value = self
            .canvas
            .wrap_text(&card.value, text_width, CARD_VALUE_FONT_SIZE, FontWeight::Bold)
            .into_iter()
            .next()
            .unwrap_or_default();
        self.canvas.draw_text(
            &value,
            Point::new(rect.x + 5.0, rect.y + 10.0),
            &TextStyle::bold(CARD_VALUE_FONT_SIZE).colored(self.theme.primary),
        );
        self.canvas.draw_text(
            &card.label,
            Point::new(rect.x + 5.0, rect.y + 17.0),
            &TextStyle::regular(SMALL_FONT_SIZE).colored(MUTED_TEXT),
        );
    }

    pub fn add_table(&mut self, spec: &TableSpec) -> Result<()> {
        let style = TableStyle {
            header_fill: match spec.header_tone {
                Tone::Primary => self.theme.primary,
                Tone::Secondary => self.theme.secondary,
            },
            font_size: self.theme.body_font_size,
        };
        table::render_table(&mut self.canvas, &mut self.cursor, &self.frame, spec, &style)?;
        self.cursor.y += SECTION_GAP_MM;
        Ok(())
    }

    pub fn add_pie_chart(&mut self, spec: &PieSpec, placement: Placement) -> Result<()> {
        if spec.slices.is_empty() {
            debug!("skipping empty pie chart {:?}", spec.title);
            return Ok(());
        }
        let block = CHART_TITLE_HEIGHT_MM + 2.0 * PIE_RADIUS_MM + 4.0;
        let origin = self.place(placement, block)?;

        self.draw_chart_title(&spec.title, origin);
        let center = Point::new(
            origin.x + PIE_RADIUS_MM + 2.0,
            origin.y + CHART_TITLE_HEIGHT_MM + PIE_RADIUS_MM,
        );
        chart::draw_pie_chart(&mut self.canvas, center, PIE_RADIUS_MM, spec, &self.theme)?;

        self.advance_past(placement, block);
        Ok(())
    }

    pub fn add_bar_chart(&mut self, spec: &BarSpec, placement: Placement) -> Result<()> {
        if spec.bars.is_empty() {
            debug!("skipping empty bar chart {:?}", spec.title);
            return Ok(());
        }
        let block = CHART_TITLE_HEIGHT_MM + BAR_CHART_HEIGHT_MM;
        let origin = self.place(placement, block)?;

        self.draw_chart_title(&spec.title, origin);
        chart::draw_bar_chart(
            &mut self.canvas,
            Point::new(origin.x, origin.y + CHART_TITLE_HEIGHT_MM),
            self.frame.content_width(),
            BAR_CHART_HEIGHT_MM,
            spec,
            &self.theme,
        )?;

        self.advance_past(placement, block);
        Ok(())
    }

    pub fn add_placeholder(&mut self, message: &str) -> Result<()> {
        self.cursor.ensure_room(&mut self.canvas, &self.frame, PLACEHOLDER_HEIGHT_MM)?;
        let rect = Rect::new(self.frame.left, self.cursor.y, self.frame.content_width(), PLACEHOLDER_HEIGHT_MM);
        self.canvas.set_fill_color(PLACEHOLDER_FILL);
        self.canvas.fill_rect(rect, 2.0);
        self.canvas.draw_text(
            message,
            Point::new(rect.center_x(), rect.y + rect.height / 2.0 + 1.2),
            &TextStyle::regular(self.theme.body_font_size)
                .aligned(Align::Center)
                .colored(MUTED_TEXT),
        );
        self.cursor.y += PLACEHOLDER_HEIGHT_MM + SECTION_GAP_MM;
        Ok(())
    }

    pub fn apply(&mut self, instruction: &LayoutInstruction) -> Result<()> {
        match instruction {
            LayoutInstruction::Heading(text) => self.add_section_heading(text),
            LayoutInstruction::StatCards(cards) => self.add_stat_cards(cards),
            LayoutInstruction::Table(spec) => self.add_table(spec),
            LayoutInstruction::PieChart(spec) => self.add_pie_chart(spec, Placement::Flow),
            LayoutInstruction::BarChart(spec) => self.add_bar_chart(spec, Placement::Flow),
            LayoutInstruction::Placeholder(message) => self.add_placeholder(message),
        }
    }

    /// Stamps the footer on every page and serializes the document.
    pub fn finish(mut self) -> Result<RenderedDocument> {
        let total = self.canvas.page_count();
        let width = self.canvas.page_width();
        let height = self.canvas.page_height();
        let rule_y = height - self.theme.margin - 5.0;
        let footer_style = TextStyle::regular(SMALL_FONT_SIZE)
            .aligned(Align::Center)
            .colored(MUTED_TEXT);

        for page in 0..total {
            self.canvas.set_page(page)?;
            self.canvas.set_stroke_color(chart::AXIS_COLOR);
            self.canvas.stroke_line(
                Point::new(self.frame.left, rule_y),
                Point::new(self.frame.right, rule_y),
                0.2,
            );
            self.canvas.draw_text(
                &footer_text(page + 1, total, &self.theme.brand_name),
                Point::new(width / 2.0, rule_y + 6.0),
                &footer_style,
            );
        }

        debug!("finalizing document with {} page(s)", total);
        self.canvas.finalize()
    }

    fn place(&mut self, placement: Placement, block: f32) -> Result<Point> {
        match placement {
            Placement::Flow => {
                self.cursor.ensure_room(&mut self.canvas, &self.frame, block)?;
                Ok(Point::new(self.frame.left, self.cursor.y))
            }
            Placement::Absolute(origin) => Ok(origin),
        }
    }

    fn advance_past(&mut self, placement: Placement, block: f32) {
        if placement == Placement::Flow {
            self.cursor.y += block + SECTION_GAP_MM;
        }
    }

    fn draw_chart_title(&mut self, title: &str, origin: Point) {
        if title.is_empty() {
            return;
        }
        self.canvas.set_text_color(HEADING_TEXT);
        self.canvas.draw_text(
            title,
            Point::new(origin.x, origin.y + 4.0),
            &TextStyle::bold(self.theme.body_font_size + 1.0),
        );
    }
}

pub fn footer_text(page: usize, total: usize, brand: &str) -> String {
    format!("Page {} of {} | {} | Confidential", page, total, brand)
}

/// Largest size with the image's aspect ratio inside `max_width` x `max_height`.
fn fit_within(width_px: u32, height_px: u32, max_width: f32, max_height: f32) -> (f32, f32) {
    if width_px == 0 || height_px == 0 {
        return (0.0, 0.0);
    }
    let aspect_ratio = width_px as f32 / height_px as f32;
    if max_width / max_height > aspect_ratio {
        // Height-constrained
        (max_height * aspect_ratio, max_height)
    } else {
        (max_width, max_width / aspect_ratio)
    }
}
