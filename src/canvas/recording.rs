// report-pdf: Display-list backend
//
// Records every primitive per page. The finalized bytes are the display list as
// JSON, which is what `--display-list` writes and what the tests inspect.

use ::image::DynamicImage;
use serde::{Deserialize, Serialize};

use super::{Align, FontWeight, PrimitiveCanvas, RenderedDocument, Rgb, TextStyle};
use crate::error::{ReportError, Result};
use crate::geometry::{Point, Rect, Triangle};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawOp {
    Triangle {
        points: [Point; 3],
        color: Rgb,
    },
    Rect {
        rect: Rect,
        radius: f32,
        color: Rgb,
    },
    Line {
        from: Point,
        to: Point,
        width: f32,
        color: Rgb,
    },
    Circle {
        center: Point,
        radius: f32,
        color: Rgb,
    },
    Text {
        text: String,
        at: Point,
        size: f32,
        weight: FontWeight,
        align: Align,
        color: Rgb,
    },
    Image {
        rect: Rect,
        width_px: u32,
        height_px: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayList {
    pub page_width: f32,
    pub page_height: f32,
    pub pages: Vec<Vec<DrawOp>>,
}

impl DisplayList {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| ReportError::RenderBackend(e.to_string()))
    }

    /// Text strings drawn on page `index`, in drawing order.
    pub fn texts_on_page(&self, index: usize) -> Vec<&str> {
        self.pages
            .get(index)
            .map(|ops| {
                ops.iter()
                    .filter_map(|op| match op {
                        DrawOp::Text { text, .. } => Some(text.as_str()),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn all_texts(&self) -> Vec<&str> {
        (0..self.pages.len()).flat_map(|i| self.texts_on_page(i)).collect()
    }
}

pub struct RecordingCanvas {
    list: DisplayList,
    current: usize,
    max_pages: usize,
    fill: Rgb,
    stroke: Rgb,
    text: Rgb,
}

impl RecordingCanvas {
    pub fn new(page_width: f32, page_height: f32, max_pages: usize) -> Self {
        Self {
            list: DisplayList { page_width, page_height, pages: vec![Vec::new()] },
            current: 0,
            max_pages: max_pages.max(1),
            fill: Rgb::BLACK,
            stroke: Rgb::BLACK,
            text: Rgb::BLACK,
        }
    }

    pub fn display_list(&self) -> &DisplayList {
        &self.list
    }

    fn push(&mut self, op: DrawOp) {
        self.list.pages[self.current].push(op);
    }
}

impl PrimitiveCanvas for RecordingCanvas {
    fn page_width(&self) -> f32 {
        self.list.page_width
    }

    fn page_height(&self) -> f32 {
        self.list.page_height
    }

    fn page_count(&self) -> usize {
        self.list.pages.len()
    }

    fn current_page(&self) -> usize {
        self.current
    }

    fn new_page(&mut self) -> Result<()> {
        if self.list.pages.len() >= self.max_pages {
            return Err(ReportError::RenderBackend(format!(
                "page limit of {} reached",
                self.max_pages
            )));
        }
        self.list.pages.push(Vec::new());
        self.current = self.list.pages.len() - 1;
        Ok(())
    }

    fn set_page(&mut self, index: usize) -> Result<()> {
        if index >= self.list.pages.len() {
            return Err(ReportError::RenderBackend(format!("no page at index {}", index)));
        }
        self.current = index;
        Ok(())
    }

    fn set_fill_color(&mut self, color: Rgb) {
        self.fill = color;
    }

    fn set_stroke_color(&mut self, color: Rgb) {
        self.stroke = color;
    }

    fn set_text_color(&mut self, color: Rgb) {
        self.text = color;
    }

    fn fill_triangle(&mut self, triangle: &Triangle) {
        let color = self.fill;
        self.push(DrawOp::Triangle { points: triangle.0, color });
    }

    fn fill_rect(&mut self, rect: Rect, corner_radius: f32) {
        let color = self.fill;
        self.push(DrawOp::Rect { rect, radius: corner_radius, color });
    }

    fn stroke_line(&mut self, from: Point, to: Point, width: f32) {
        let color = self.stroke;
        self.push(DrawOp::Line { from, to, width, color });
    }

    fn fill_circle(&mut self, center: Point, radius: f32) {
        let color = self.fill;
        self.push(DrawOp::Circle { center, radius, color });
    }

    fn draw_text(&mut self, text: &str, at: Point, style: &TextStyle) {
        let color = style.color.unwrap_or(self.text);
        self.push(DrawOp::Text {
            text: text.to_string(),
            at,
            size: style.size,
            weight: style.weight,
            align: style.align,
            color,
        });
    }

    fn draw_image(&mut self, image: &DynamicImage, rect: Rect) {
        self.push(DrawOp::Image { rect, width_px: image.width(), height_px: image.height() });
    }

    fn finalize(self) -> Result<RenderedDocument> {
        let page_count = self.list.pages.len();
        let bytes = serde_json::to_vec_pretty(&self.list)
            .map_err(|e| ReportError::RenderBackend(e.to_string()))?;
        Ok(RenderedDocument { bytes, page_count, extension: "json" })
    }
}
