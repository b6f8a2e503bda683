// report-pdf: printpdf backend

use ::image::{DynamicImage, Rgba, RgbImage};
use printpdf::path::{PaintMode, WindingOrder};
use printpdf::*;
use std::borrow::Cow;

use super::metrics::{self, PT_TO_MM};
use super::{FontWeight, PrimitiveCanvas, RenderedDocument, Rgb as Color8, TextStyle};
use crate::error::{ReportError, Result};
use crate::geometry::{self, Point as CanvasPoint, Rect, Triangle};

/// Segments used to flatten circles
const CIRCLE_SEGMENTS: usize = 48;

/// Segments per rounded corner
const CORNER_SEGMENTS: usize = 4;

const LAYER_NAME: &str = "Layer 1";

pub struct PdfCanvas {
    doc: PdfDocumentReference,
    layers: Vec<PdfLayerReference>,
    current: usize,
    font_regular: IndirectFontRef,
    font_bold: IndirectFontRef,
    width_mm: f32,
    height_mm: f32,
    max_pages: usize,
    fill: Color8,
    stroke: Color8,
    text: Color8,
}

impl PdfCanvas {
    pub fn new(title: &str, width_mm: f32, height_mm: f32, max_pages: usize) -> Result<Self> {
        let (doc, page1, layer1) = PdfDocument::new(title, Mm(width_mm), Mm(height_mm), LAYER_NAME);
        let first_layer = doc.get_page(page1).get_layer(layer1);

        let font_regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| ReportError::RenderBackend(e.to_string()))?;
        let font_bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| ReportError::RenderBackend(e.to_string()))?;

        Ok(Self {
            doc,
            layers: vec![first_layer],
            current: 0,
            font_regular,
            font_bold,
            width_mm,
            height_mm,
            max_pages: max_pages.max(1),
            fill: Color8::BLACK,
            stroke: Color8::BLACK,
            text: Color8::BLACK,
        })
    }

    fn layer(&self) -> &PdfLayerReference {
        &self.layers[self.current]
    }

    /// Flips a top-left canvas point into PDF space.
    fn pdf_point(&self, p: CanvasPoint) -> Point {
        Point::new(Mm(p.x), Mm(self.height_mm - p.y))
    }

    fn fill_polygon(&self, outline: &[CanvasPoint]) {
        if outline.len() < 3 {
            return;
        }
        let layer = self.layer();
        layer.set_fill_color(pdf_color(self.fill));
        let ring = outline.iter().map(|p| (self.pdf_point(*p), false)).collect();
        layer.add_polygon(Polygon {
            rings: vec![ring],
            mode: PaintMode::Fill,
            winding_order: WindingOrder::NonZero,
        });
    }
}

fn pdf_color(color: Color8) -> Color {
    let (r, g, b) = color.unit();
    Color::Rgb(Rgb::new(r, g, b, None))
}

/// Builtin fonts only cover WinAnsi; map the few symbols reports use and
/// replace anything else.
fn winansi_safe(text: &str) -> Cow<'_, str> {
    if text.chars().all(|c| (c as u32) < 0x80) {
        return Cow::Borrowed(text);
    }
    let mapped = text
        .chars()
        .map(|c| match c {
            '\u{1F3C6}' => '*',
            '\u{2013}' | '\u{2014}' => '-',
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201C}' | '\u{201D}' => '"',
            '\u{2022}' => '-',
            c if (c as u32) <= 0xFF => c,
            _ => '?',
        })
        .collect();
    Cow::Owned(mapped)
}

impl PrimitiveCanvas for PdfCanvas {
    fn page_width(&self) -> f32 {
        self.width_mm
    }

    fn page_height(&self) -> f32 {
        self.height_mm
    }

    fn page_count(&self) -> usize {
        self.layers.len()
    }

    fn current_page(&self) -> usize {
        self.current
    }

    fn new_page(&mut self) -> Result<()> {
        if self.layers.len() >= self.max_pages {
            return Err(ReportError::RenderBackend(format!(
                "page limit of {} reached",
                self.max_pages
            )));
        }
        let (page, layer) = self.doc.add_page(Mm(self.width_mm), Mm(self.height_mm), LAYER_NAME);
        self.layers.push(self.doc.get_page(page).get_layer(layer));
        self.current = self.layers.len() - 1;
        Ok(())
    }

    fn set_page(&mut self, index: usize) -> Result<()> {
        if index >= self.layers.len() {
            return Err(ReportError::RenderBackend(format!("no page at index {}", index)));
        }
        self.current = index;
        Ok(())
    }

    fn set_fill_color(&mut self, color: Color8) {
        self.fill = color;
    }

    fn set_stroke_color(&mut self, color: Color8) {
        self.stroke = color;
    }

    fn set_text_color(&mut self, color: Color8) {
        self.text = color;
    }

    fn fill_triangle(&mut self, triangle: &Triangle) {
        self.fill_polygon(&triangle.0);
    }

    fn fill_rect(&mut self, rect: Rect, corner_radius: f32) {
        if rect.width <= 0.0 || rect.height <= 0.0 {
            return;
        }
        let outline = geometry::rounded_rect_polygon(rect, corner_radius, CORNER_SEGMENTS);
        self.fill_polygon(&outline);
    }

    fn stroke_line(&mut self, from: CanvasPoint, to: CanvasPoint, width: f32) {
        let layer = self.layer();
        layer.set_outline_color(pdf_color(self.stroke));
        layer.set_outline_thickness(width / PT_TO_MM);
        layer.add_line(Line {
            points: vec![(self.pdf_point(from), false), (self.pdf_point(to), false)],
            is_closed: false,
        });
    }

    fn fill_circle(&mut self, center: CanvasPoint, radius: f32) {
        let outline = geometry::circle_polygon(center, radius, CIRCLE_SEGMENTS);
        self.fill_polygon(&outline);
    }

    fn draw_text(&mut self, text: &str, at: CanvasPoint, style: &TextStyle) {
        let text = winansi_safe(text);
        let width = metrics::text_width(&text, style.size, style.weight);
        let x = metrics::aligned_x(at.x, width, style.align);
        let font = match style.weight {
            FontWeight::Regular => &self.font_regular,
            FontWeight::Bold => &self.font_bold,
        };

        // PDF text is painted with the fill color.
        let layer = self.layer();
        layer.set_fill_color(pdf_color(style.color.unwrap_or(self.text)));
        layer.use_text(&*text, style.size, Mm(x), Mm(self.height_mm - at.y), font);
    }

    fn draw_image(&mut self, image: &DynamicImage, rect: Rect) {
        let rgba_image = image.to_rgba8();
        let (width_px, height_px) = rgba_image.dimensions();
        if width_px == 0 || height_px == 0 || rect.width <= 0.0 {
            return;
        }

        // Composite against white background
        let mut rgb_image = RgbImage::new(width_px, height_px);
        for (x, y, pixel) in rgba_image.enumerate_pixels() {
            let Rgba([r, g, b, a]) = *pixel;
            let alpha = a as f32 / 255.0;
            let blend = |c: u8| (c as f32 * alpha + 255.0 * (1.0 - alpha)) as u8;
            rgb_image.put_pixel(x, y, ::image::Rgb([blend(r), blend(g), blend(b)]));
        }

        let image = Image::from(ImageXObject {
            width: Px(width_px as usize),
            height: Px(height_px as usize),
            color_space: ColorSpace::Rgb,
            bits_per_component: ColorBits::Bit8,
            interpolate: true,
            image_data: rgb_image.into_raw(),
            image_filter: None,
            clipping_bbox: None,
            smask: None,
        });

        // DPI = pixels / (mm / 25.4)
        let dpi = (width_px as f32) / (rect.width / 25.4);

        image.add_to_layer(
            self.layer().clone(),
            ImageTransform {
                translate_x: Some(Mm(rect.x)),
                translate_y: Some(Mm(self.height_mm - rect.bottom())),
                dpi: Some(dpi),
                ..Default::default()
            },
        );
    }

    fn finalize(self) -> Result<RenderedDocument> {
        let page_count = self.layers.len();
        drop(self.layers);
        let bytes = self
            .doc
            .save_to_bytes()
            .map_err(|e| ReportError::RenderBackend(e.to_string()))?;
        Ok(RenderedDocument { bytes, page_count, extension: "pdf" })
    }
}
