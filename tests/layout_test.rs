use chrono::NaiveDate;

use report_pdf::builder::TROPHY;
use report_pdf::canvas::metrics::{text_width, wrap_text};
use report_pdf::canvas::{DisplayList, DrawOp, FontWeight, PrimitiveCanvas, RecordingCanvas, Rgb, TextStyle};
use report_pdf::chart::{
    draw_bar_chart, draw_pie_chart, legend_percent, Bar, BarSpec, PieSlice, PieSpec, ValueFormat, LABEL_TEXT,
};
use report_pdf::geometry::{Point, DEFAULT_SLICE_STEPS};
use report_pdf::layout::{
    footer_text, LayoutCursor, PageFrame, Placement, ReportLayoutEngine, StatCard, CARD_HEIGHT_MM,
    CHART_TITLE_HEIGHT_MM, HEADING_HEIGHT_MM, HEADING_RESERVE_MM, PIE_RADIUS_MM, SECTION_GAP_MM,
};
use report_pdf::table::{render_table, row_height, TableSpec, TableStyle, BODY_TEXT, EMPTY_TABLE_MESSAGE};
use report_pdf::theme::{PageSize, ReportTheme};
use report_pdf::{render_report, ReportDataset, ReportError, ReportOptions};

const A4: (f32, f32) = (210.0, 297.0);

fn recording() -> RecordingCanvas {
    RecordingCanvas::new(A4.0, A4.1, 50)
}

fn options() -> ReportOptions {
    ReportOptions::new(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap())
}

fn render_fixture(json: &str) -> DisplayList {
    let dataset: ReportDataset = serde_json::from_str(json).unwrap();
    let document = render_report(recording(), &dataset, &options()).unwrap();
    let list = DisplayList::from_bytes(&document.bytes).unwrap();
    assert_eq!(list.pages.len(), document.page_count);
    list
}

fn count(texts: &[&str], needle: &str) -> usize {
    texts.iter().filter(|t| **t == needle).count()
}

fn table_style() -> TableStyle {
    TableStyle { header_fill: Rgb::new(37, 99, 235), font_size: 9.0 }
}

#[test]
fn test_ab_test_report_fits_one_page() {
    let list = render_fixture(include_str!("fixtures/ab_test.json"));

    assert_eq!(list.pages.len(), 1);
    let texts = list.texts_on_page(0);
    assert_eq!(count(&texts, "A/B Test Summary"), 1);
    assert_eq!(count(&texts, "Variant"), 1);
    assert_eq!(count(&texts, "Control"), 1);
    assert_eq!(count(&texts, &format!("{} Variant A", TROPHY)), 1);
    assert_eq!(count(&texts, "Page 1 of 1 | MoveFlow | Confidential"), 1);
    assert!(texts.contains(&"Generated: March 1, 2025"));
}

#[test]
fn test_conversion_report_dropoff_column() {
    let list = render_fixture(include_str!("fixtures/conversion.json"));
    let texts = list.all_texts();

    for expected in ["71%", "90%", "n/a", "28,450", "Quote Request"] {
        assert!(texts.contains(&expected), "missing {:?}", expected);
    }
}

#[test]
fn test_every_page_gets_a_footer() {
    let list = render_fixture(include_str!("fixtures/analytics.json"));
    let total = list.pages.len();
    assert!(total >= 2, "analytics report should span pages, got {}", total);

    for page in 0..total {
        let texts = list.texts_on_page(page);
        assert_eq!(count(&texts, &footer_text(page + 1, total, "MoveFlow")), 1);
    }

    let texts = list.all_texts();
    assert!(texts.contains(&"Google Ads (39.6%)"));
    assert!(texts.contains(&"Young Prof"));
    assert!(texts.contains(&"$260.4k"));
}

#[test]
fn test_table_repeats_header_on_each_page() {
    let theme = ReportTheme::default();
    let mut canvas = recording();
    let frame = PageFrame::new(A4.0, A4.1, &theme);
    let mut cursor = LayoutCursor { page_index: 0, y: frame.top };

    let rows: Vec<Vec<String>> = (0..60).map(|i| vec![format!("row {}", i), i.to_string()]).collect();
    let spec = TableSpec::new(["Name", "Value"]).with_rows(rows);
    render_table(&mut canvas, &mut cursor, &frame, &spec, &table_style()).unwrap();

    let row_h = row_height(9.0);
    let per_page = ((frame.content_height() - row_h) / row_h).floor() as usize;
    let expected_pages = (60 + per_page - 1) / per_page;

    let list = canvas.display_list();
    assert_eq!(list.pages.len(), expected_pages);
    assert_eq!(cursor.page_index, expected_pages - 1);
    for page in 0..list.pages.len() {
        let texts = list.texts_on_page(page);
        assert_eq!(count(&texts, "Name"), 1, "page {} header count", page);
    }
    let body_rows: usize = (0..list.pages.len())
        .map(|p| list.texts_on_page(p).iter().filter(|t| t.starts_with("row ")).count())
        .sum();
    assert_eq!(body_rows, 60);
}

#[test]
fn test_empty_table_shows_no_data_row() {
    let theme = ReportTheme::default();
    let mut canvas = recording();
    let frame = PageFrame::new(A4.0, A4.1, &theme);
    let mut cursor = LayoutCursor { page_index: 0, y: 50.0 };

    render_table(&mut canvas, &mut cursor, &frame, &TableSpec::new(["A", "B"]), &table_style()).unwrap();

    assert!(canvas.display_list().texts_on_page(0).contains(&EMPTY_TABLE_MESSAGE));
    assert!((cursor.y - (50.0 + 2.0 * row_height(9.0))).abs() < 1e-4);
}

#[test]
fn test_overflowing_cell_keeps_first_line_only() {
    let theme = ReportTheme::default();
    let mut canvas = recording();
    let frame = PageFrame::new(A4.0, A4.1, &theme);
    let mut cursor = LayoutCursor { page_index: 0, y: 50.0 };

    let long = "long distance moving company with storage and packing services";
    let spec = TableSpec {
        column_widths: Some(vec![40.0, 140.0]),
        ..TableSpec::new(["Keyword", "Clicks"]).with_rows(vec![vec![long.to_string(), "1".to_string()]])
    };
    render_table(&mut canvas, &mut cursor, &frame, &spec, &table_style()).unwrap();

    let texts = canvas.display_list().texts_on_page(0);
    let cell = texts.iter().find(|t| long.starts_with(**t) && t.len() > 4).unwrap();
    assert!(cell.len() < long.len());
    assert!(!cell.ends_with("..."));
}

#[test]
fn test_single_slice_pie_is_full_donut() {
    let theme = ReportTheme::default();
    let mut canvas = recording();
    let spec = PieSpec {
        title: String::new(),
        slices: vec![PieSlice { value: 12.0, label: "Organic".to_string(), color: None }],
    };
    draw_pie_chart(&mut canvas, Point::new(60.0, 100.0), 28.0, &spec, &theme).unwrap();

    let ops = &canvas.display_list().pages[0];
    let triangles = ops.iter().filter(|op| matches!(op, DrawOp::Triangle { .. })).count();
    assert_eq!(triangles, DEFAULT_SLICE_STEPS);

    // Cutout drawn after the fan, in the page background color
    let cutout = ops.iter().position(|op| matches!(op, DrawOp::Circle { .. })).unwrap();
    assert!(cutout > triangles - 1);
    match &ops[cutout] {
        DrawOp::Circle { radius, color, .. } => {
            assert_eq!(*radius, 14.0);
            assert_eq!(*color, theme.background);
        }
        _ => unreachable!(),
    }
    assert!(canvas.display_list().texts_on_page(0).contains(&"Organic (100.0%)"));
}

#[test]
fn test_empty_charts_draw_nothing() {
    let theme = ReportTheme::default();
    let mut canvas = recording();

    draw_pie_chart(&mut canvas, Point::new(50.0, 50.0), 20.0, &PieSpec { title: "x".into(), slices: vec![] }, &theme)
        .unwrap();
    let bars = BarSpec { title: "x".into(), bars: vec![], format: ValueFormat::Count };
    draw_bar_chart(&mut canvas, Point::new(15.0, 50.0), 180.0, 60.0, &bars, &theme).unwrap();

    assert!(canvas.display_list().pages[0].is_empty());
}

#[test]
fn test_zero_total_pie_is_invalid_geometry() {
    let theme = ReportTheme::default();
    let mut canvas = recording();
    let spec = PieSpec {
        title: String::new(),
        slices: vec![PieSlice { value: 0.0, label: "None".to_string(), color: None }],
    };

    let result = draw_pie_chart(&mut canvas, Point::new(50.0, 50.0), 20.0, &spec, &theme);
    assert!(matches!(result, Err(ReportError::InvalidGeometry(_))));
}

#[test]
fn test_bar_chart_layout() {
    let theme = ReportTheme::default();
    let mut canvas = recording();
    let spec = BarSpec {
        title: String::new(),
        bars: vec![
            Bar { value: 312.0, label: "Young Professionals".to_string(), color: None },
            Bar { value: 141.0, label: "Seniors".to_string(), color: None },
        ],
        format: ValueFormat::Count,
    };
    draw_bar_chart(&mut canvas, Point::new(15.0, 50.0), 180.0, 60.0, &spec, &theme).unwrap();

    let ops = &canvas.display_list().pages[0];
    assert!(matches!(ops[0], DrawOp::Line { .. }), "baseline first");

    let heights: Vec<f32> = ops
        .iter()
        .filter_map(|op| match op {
            DrawOp::Rect { rect, .. } => Some(rect.height),
            _ => None,
        })
        .collect();
    assert_eq!(heights.len(), 2);
    assert_eq!(heights.iter().cloned().fold(0.0, f32::max), 60.0 - 7.0 - 6.0);

    let texts = canvas.display_list().texts_on_page(0);
    assert!(texts.contains(&"312"));
    assert!(texts.contains(&"Young Prof"));
    assert!(texts.contains(&"Seniors"));
}

#[test]
fn test_chart_placement() {
    let mut engine = ReportLayoutEngine::new(recording(), ReportTheme::default());
    let spec = PieSpec {
        title: "Sources".to_string(),
        slices: vec![
            PieSlice { value: 3.0, label: "A".to_string(), color: None },
            PieSlice { value: 1.0, label: "B".to_string(), color: None },
        ],
    };

    let before = engine.cursor();
    engine.add_pie_chart(&spec, Placement::Absolute(Point::new(100.0, 120.0))).unwrap();
    assert_eq!(engine.cursor(), before);

    engine.add_pie_chart(&spec, Placement::Flow).unwrap();
    let expected = before.y + CHART_TITLE_HEIGHT_MM + 2.0 * PIE_RADIUS_MM + 4.0 + SECTION_GAP_MM;
    assert!((engine.cursor().y - expected).abs() < 1e-4);
}

#[test]
fn test_heading_breaks_page_when_no_room() {
    let mut engine = ReportLayoutEngine::new(recording(), ReportTheme::default());
    let bottom = engine.frame().bottom;

    while engine.cursor().y + HEADING_HEIGHT_MM + HEADING_RESERVE_MM <= bottom {
        engine.add_placeholder("filler").unwrap();
    }
    assert_eq!(engine.cursor().page_index, 0);

    engine.add_section_heading("Conversion Funnel").unwrap();
    let cursor = engine.cursor();
    assert_eq!(cursor.page_index, 1);
    assert!((cursor.y - (engine.frame().top + HEADING_HEIGHT_MM)).abs() < 1e-4);
    assert!(engine.canvas().display_list().texts_on_page(1).contains(&"Conversion Funnel"));
}

#[test]
fn test_stat_cards_wrap_after_four() {
    let mut engine = ReportLayoutEngine::new(recording(), ReportTheme::default());
    let cards: Vec<StatCard> = (0..5).map(|i| StatCard::new(format!("Metric {}", i), i.to_string())).collect();

    let start = engine.cursor().y;
    engine.add_stat_cards(&cards).unwrap();
    assert!((engine.cursor().y - (start + 2.0 * (CARD_HEIGHT_MM + SECTION_GAP_MM))).abs() < 1e-4);
}

#[test]
fn test_page_limit_is_a_backend_error() {
    let mut engine = ReportLayoutEngine::new(RecordingCanvas::new(A4.0, A4.1, 2), ReportTheme::default());
    let rows: Vec<Vec<String>> = (0..100).map(|i| vec![i.to_string()]).collect();

    let result = engine.add_table(&TableSpec::new(["N"]).with_rows(rows));
    assert!(matches!(result, Err(ReportError::RenderBackend(_))));
}

#[test]
fn test_theme_file_overrides_defaults() {
    let theme: ReportTheme = serde_json::from_str(include_str!("fixtures/theme.json")).unwrap();

    assert_eq!(theme.brand_name, "Atlas Moving");
    assert_eq!(theme.primary, Rgb::new(0x0F, 0x76, 0x6E));
    assert_eq!(theme.primary.to_string(), "#0F766E");
    assert_eq!(theme.page_size, PageSize::Letter);
    assert_eq!(theme.body_font_size, 10.0);
    assert_eq!(theme.margin, ReportTheme::default().margin);
    assert!(theme.validate().is_ok());

    assert!(serde_json::from_str::<ReportTheme>(include_str!("fixtures/bad_theme.json")).is_err());

    let cramped = ReportTheme { margin: 80.0, ..ReportTheme::default() };
    assert!(matches!(cramped.validate(), Err(ReportError::Theme(_))));
}

#[test]
fn test_letter_pages_use_letter_size() {
    let dataset: ReportDataset = serde_json::from_str(include_str!("fixtures/ab_test.json")).unwrap();
    let mut opts = options();
    opts.theme.page_size = PageSize::Letter;
    let (w, h) = opts.theme.page_size.dimensions();

    let document = render_report(RecordingCanvas::new(w, h, 10), &dataset, &opts).unwrap();
    let list = DisplayList::from_bytes(&document.bytes).unwrap();
    assert_eq!((list.page_width, list.page_height), (215.9, 279.4));
}

#[test]
fn test_wrap_text_is_greedy() {
    let max = text_width("the quick brown", 9.0, FontWeight::Regular) - 0.01;
    let lines = wrap_text("the quick brown fox", max, 9.0, FontWeight::Regular);
    assert_eq!(lines, vec!["the quick", "brown fox"]);

    let narrow = text_width("abc", 9.0, FontWeight::Regular) + 0.001;
    let pieces = wrap_text("abcdefghij", narrow, 9.0, FontWeight::Regular);
    assert!(pieces.len() > 1);
    assert_eq!(pieces.concat(), "abcdefghij");
    assert!(pieces.iter().all(|p| text_width(p, 9.0, FontWeight::Regular) <= narrow));

    assert!(wrap_text("   ", 50.0, 9.0, FontWeight::Regular).is_empty());
}

#[test]
fn test_recording_canvas_pages() {
    let mut canvas = RecordingCanvas::new(A4.0, A4.1, 3);
    canvas.new_page().unwrap();
    canvas.new_page().unwrap();
    assert_eq!(canvas.current_page(), 2);
    assert!(canvas.new_page().is_err());

    canvas.set_page(0).unwrap();
    assert_eq!(canvas.current_page(), 0);
    assert!(canvas.set_page(3).is_err());

    let document = canvas.finalize().unwrap();
    assert_eq!(document.page_count, 3);
    assert_eq!(document.extension, "json");
}

fn text_color(list: &DisplayList, page: usize, needle: &str) -> Option<Rgb> {
    list.pages[page].iter().find_map(|op| match op {
        DrawOp::Text { text, color, .. } if text == needle => Some(*color),
        _ => None,
    })
}

#[test]
fn test_legend_percent_rounds_halves_up() {
    assert_eq!(legend_percent(1.0, 16.0), "6.3");
    assert_eq!(legend_percent(15.0, 16.0), "93.8");
    assert_eq!(legend_percent(1.0, 3.0), "33.3");

    let theme = ReportTheme::default();
    let mut canvas = recording();
    let spec = PieSpec {
        title: String::new(),
        slices: vec![
            PieSlice { value: 1.0, label: "Email".to_string(), color: None },
            PieSlice { value: 15.0, label: "Organic".to_string(), color: None },
        ],
    };
    draw_pie_chart(&mut canvas, Point::new(60.0, 100.0), 28.0, &spec, &theme).unwrap();

    let texts = canvas.display_list().texts_on_page(0);
    assert!(texts.contains(&"Email (6.3%)"));
    assert!(texts.contains(&"Organic (93.8%)"));
    assert_eq!(text_color(canvas.display_list(), 0, "Email (6.3%)"), Some(LABEL_TEXT));
}

#[test]
fn test_text_color_comes_from_canvas_state() {
    let mut canvas = recording();
    canvas.set_text_color(Rgb::new(200, 0, 0));
    canvas.draw_text("plain", Point::new(20.0, 20.0), &TextStyle::regular(9.0));
    canvas.draw_text("override", Point::new(20.0, 30.0), &TextStyle::regular(9.0).colored(Rgb::WHITE));
    assert_eq!(text_color(canvas.display_list(), 0, "plain"), Some(Rgb::new(200, 0, 0)));
    assert_eq!(text_color(canvas.display_list(), 0, "override"), Some(Rgb::WHITE));

    let theme = ReportTheme::default();
    let mut canvas = recording();
    let frame = PageFrame::new(A4.0, A4.1, &theme);
    let mut cursor = LayoutCursor { page_index: 0, y: 50.0 };
    let spec = TableSpec::new(["Stage"]).with_rows(vec![vec!["Landing".to_string()]]);
    render_table(&mut canvas, &mut cursor, &frame, &spec, &table_style()).unwrap();

    let list = canvas.display_list();
    assert_eq!(text_color(list, 0, "Landing"), Some(BODY_TEXT));
    assert_eq!(text_color(list, 0, "Stage"), Some(Rgb::WHITE));
}
