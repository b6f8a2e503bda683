// report-pdf: Report styling configuration

use serde::{Deserialize, Serialize};

use crate::canvas::Rgb;
use crate::error::{ReportError, Result};

/// A4 dimensions in mm
const A4_WIDTH_MM: f32 = 210.0;
const A4_HEIGHT_MM: f32 = 297.0;

/// US Letter dimensions in mm
const LETTER_WIDTH_MM: f32 = 215.9;
const LETTER_HEIGHT_MM: f32 = 279.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    #[default]
    A4,
    Letter,
}

impl PageSize {
    /// Width and height in mm
    pub fn dimensions(self) -> (f32, f32) {
        match self {
            PageSize::A4 => (A4_WIDTH_MM, A4_HEIGHT_MM),
            PageSize::Letter => (LETTER_WIDTH_MM, LETTER_HEIGHT_MM),
        }
    }
}

/// Brand colors, page geometry and font sizes. Every field has a default, so a
/// theme file only needs the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReportTheme {
    pub brand_name: String,
    pub primary: Rgb,
    pub secondary: Rgb,
    /// Page background, also used for the donut cutout
    pub background: Rgb,
    /// Outer page margin in mm
    pub margin: f32,
    /// Font sizes in points
    pub body_font_size: f32,
    pub heading_font_size: f32,
    pub page_size: PageSize,
    /// Chart colors, cycled in order
    pub palette: Vec<Rgb>,
    pub max_pages: usize,
}

impl Default for ReportTheme {
    fn default() -> Self {
        Self {
            brand_name: "MoveFlow".to_string(),
            primary: Rgb::new(37, 99, 235),
            secondary: Rgb::new(16, 185, 129),
            background: Rgb::WHITE,
            margin: 15.0,
            body_font_size: 9.0,
            heading_font_size: 14.0,
            page_size: PageSize::A4,
            palette: vec![
                Rgb::new(37, 99, 235),
                Rgb::new(16, 185, 129),
                Rgb::new(245, 158, 11),
                Rgb::new(239, 68, 68),
                Rgb::new(139, 92, 246),
                Rgb::new(100, 116, 139),
            ],
            max_pages: 200,
        }
    }
}

impl ReportTheme {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ReportError::Theme(format!("{}: {}", path, e)))?;
        let theme: ReportTheme = serde_json::from_str(&content)
            .map_err(|e| ReportError::Theme(format!("Invalid JSON: {}", e)))?;
        theme.validate()?;
        Ok(theme)
    }

    pub fn validate(&self) -> Result<()> {
        let (width, _) = self.page_size.dimensions();
        if !(self.margin > 0.0 && self.margin < width / 4.0) {
            return Err(ReportError::Theme(format!("margin {} out of range", self.margin)));
        }
        if !(self.body_font_size > 0.0 && self.heading_font_size > 0.0) {
            return Err(ReportError::Theme("font sizes must be positive".to_string()));
        }
        if self.palette.is_empty() {
            return Err(ReportError::Theme("palette must contain at least one color".to_string()));
        }
        if self.max_pages == 0 {
            return Err(ReportError::Theme("maxPages must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn palette_color(&self, index: usize) -> Rgb {
        match self.palette.len() {
            0 => self.primary,
            n => self.palette[index % n],
        }
    }
}
