// report-pdf: Paginated marketing reports with tables and vector charts
//
// Pipeline: dataset -> builder (layout instructions) -> layout engine ->
// table/chart renderers -> canvas -> document bytes. Generation runs to
// completion in one call; each call owns its engine and canvas.

pub mod builder;
pub mod canvas;
pub mod chart;
pub mod dataset;
pub mod error;
pub mod format;
pub mod geometry;
pub mod layout;
pub mod table;
pub mod theme;

use ::image::DynamicImage;
use chrono::NaiveDate;
use log::info;

pub use canvas::{PdfCanvas, PrimitiveCanvas, RecordingCanvas, RenderedDocument};
pub use dataset::{AbTestReport, ConversionReport, ReportDataset, ReportKind};
pub use error::{ReportError, Result};
pub use layout::{DocumentHeader, LayoutInstruction, ReportLayoutEngine};
pub use theme::ReportTheme;

/// Caller-supplied context for one report.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub theme: ReportTheme,
    pub generated: NaiveDate,
    pub report_id: Option<String>,
    pub logo: Option<DynamicImage>,
}

impl ReportOptions {
    pub fn new(generated: NaiveDate) -> Self {
        Self { theme: ReportTheme::default(), generated, report_id: None, logo: None }
    }
}

/// `{kind}-report-{YYYY-MM-DD}.{extension}`
pub fn report_filename(kind: ReportKind, date: NaiveDate, extension: &str) -> String {
    format!("{}-report-{}.{}", kind.slug(), date.format("%Y-%m-%d"), extension)
}

/// Renders `dataset` as a PDF.
pub fn generate_report(dataset: &ReportDataset, options: &ReportOptions) -> Result<RenderedDocument> {
    let (width, height) = options.theme.page_size.dimensions();
    let canvas = PdfCanvas::new(dataset.kind().title(), width, height, options.theme.max_pages)?;
    render_report(canvas, dataset, options)
}

pub fn generate_ab_test_report(report: AbTestReport, options: &ReportOptions) -> Result<RenderedDocument> {
    generate_report(&ReportDataset::AbTest(report), options)
}

pub fn generate_conversion_report(
    report: ConversionReport,
    options: &ReportOptions,
) -> Result<RenderedDocument> {
    generate_report(&ReportDataset::Conversion(report), options)
}

/// Renders the JSON display list instead of a PDF.
pub fn generate_display_list(dataset: &ReportDataset, options: &ReportOptions) -> Result<RenderedDocument> {
    let (width, height) = options.theme.page_size.dimensions();
    render_report(RecordingCanvas::new(width, height, options.theme.max_pages), dataset, options)
}

/// Runs the full pipeline on any canvas backend.
pub fn render_report<C: PrimitiveCanvas>(
    canvas: C,
    dataset: &ReportDataset,
    options: &ReportOptions,
) -> Result<RenderedDocument> {
    options.theme.validate()?;
    let kind = dataset.kind();
    let instructions = builder::build(dataset);
    info!(
        "rendering {} with {} section(s)",
        kind.title(),
        instructions.len()
    );

    let mut engine = ReportLayoutEngine::new(canvas, options.theme.clone());
    engine.begin_document(&DocumentHeader {
        title: kind.title(),
        subtitle: kind.subtitle(),
        generated: options.generated,
        report_id: options.report_id.as_deref(),
        logo: options.logo.as_ref(),
    });
    for instruction in &instructions {
        engine.apply(instruction)?;
    }

    let document = engine.finish()?;
    info!(
        "rendered {} page(s), {} bytes",
        document.page_count,
        document.bytes.len()
    );
    Ok(document)
}
