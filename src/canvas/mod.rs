// report-pdf: Drawing surface shared by the chart and table renderers
//
// Coordinates are millimetres from the top-left corner of the current page. Text
// positions name the baseline.

pub mod metrics;
pub mod pdf;
pub mod recording;

use ::image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;
use crate::geometry::{Point, Rect, Triangle};

pub use pdf::PdfCanvas;
pub use recording::{DisplayList, DrawOp, RecordingCanvas};

// ============================================================================
// Colors and Text Styles
// ============================================================================

/// 8-bit RGB color, written as `#RRGGBB` in theme and display-list files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Mixes `self` towards white; `amount` 0.0 keeps the color, 1.0 is white.
    pub fn tint(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);
        let mix = |c: u8| (c as f32 + (255.0 - c as f32) * amount).round() as u8;
        Self::new(mix(self.r), mix(self.g), mix(self.b))
    }

    /// Components scaled to 0.0..=1.0.
    pub fn unit(self) -> (f32, f32, f32) {
        (self.r as f32 / 255.0, self.g as f32 / 255.0, self.b as f32 / 255.0)
    }
}

impl TryFrom<String> for Rgb {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        let hex = value.strip_prefix('#').unwrap_or(&value);
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(format!("expected #RRGGBB, got {:?}", value));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| format!("expected #RRGGBB, got {:?}", value))
        };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl From<Rgb> for String {
    fn from(color: Rgb) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Regular,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Font size is in points. `color` overrides the canvas text color for one call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub size: f32,
    pub weight: FontWeight,
    pub align: Align,
    pub color: Option<Rgb>,
}

impl TextStyle {
    pub fn regular(size: f32) -> Self {
        Self { size, weight: FontWeight::Regular, align: Align::Left, color: None }
    }

    pub fn bold(size: f32) -> Self {
        Self { weight: FontWeight::Bold, ..Self::regular(size) }
    }

    pub fn aligned(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn colored(mut self, color: Rgb) -> Self {
        self.color = Some(color);
        self
    }
}

// ============================================================================
// Output
// ============================================================================

/// Serialized output of a finished canvas.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub bytes: Vec<u8>,
    pub page_count: usize,
    /// File extension matching the byte format
    pub extension: &'static str,
}

// ============================================================================
// Canvas Interface
// ============================================================================

/// Minimal drawing surface. Drawing calls act on the current page; only page
/// management and `finalize` can fail.
pub trait PrimitiveCanvas {
    fn page_width(&self) -> f32;
    fn page_height(&self) -> f32;
    fn page_count(&self) -> usize;
    fn current_page(&self) -> usize;

    /// Appends a page and makes it current.
    fn new_page(&mut self) -> Result<()>;

    /// Makes an existing page current again, e.g. to stamp footers.
    fn set_page(&mut self, index: usize) -> Result<()>;

    fn set_fill_color(&mut self, color: Rgb);
    fn set_stroke_color(&mut self, color: Rgb);
    fn set_text_color(&mut self, color: Rgb);

    fn fill_triangle(&mut self, triangle: &Triangle);
    fn fill_rect(&mut self, rect: Rect, corner_radius: f32);
    fn stroke_line(&mut self, from: Point, to: Point, width: f32);
    fn fill_circle(&mut self, center: Point, radius: f32);
    fn draw_text(&mut self, text: &str, at: Point, style: &TextStyle);
    fn draw_image(&mut self, image: &DynamicImage, rect: Rect);

    fn text_width(&self, text: &str, size: f32, weight: FontWeight) -> f32 {
        metrics::text_width(text, size, weight)
    }

    fn wrap_text(&self, text: &str, max_width: f32, size: f32, weight: FontWeight) -> Vec<String> {
        metrics::wrap_text(text, max_width, size, weight)
    }

    fn finalize(self) -> Result<RenderedDocument>
    where
        Self: Sized;
}
