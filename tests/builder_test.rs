use chrono::NaiveDate;

use report_pdf::builder::{build, build_ab_test, build_conversion, funnel_dropoffs, NOT_AVAILABLE, TROPHY};
use report_pdf::chart::ValueFormat;
use report_pdf::dataset::{
    AbTest, AbTestReport, AnalyticsBreakdown, ConversionReport, FunnelStage, ReportDataset,
    ReportKind, Share, SummaryStats, TestStatus, Variant,
};
use report_pdf::format::{format_count, format_money, format_whole_percent};
use report_pdf::layout::LayoutInstruction;
use report_pdf::report_filename;
use report_pdf::table::TableSpec;

fn hero_test() -> AbTest {
    AbTest {
        name: "Homepage Hero CTA".to_string(),
        status: TestStatus::Completed,
        start_date: NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(),
        variants: vec![
            Variant { name: "Control".to_string(), visitors: 4521, conversions: 312, rate: 6.9 },
            Variant { name: "Variant A".to_string(), visitors: 4489, conversions: 387, rate: 8.6 },
        ],
        winner: Some("Variant A".to_string()),
        confidence: 94.0,
        lift: "+24.6%".to_string(),
    }
}

fn stage(name: &str, count: u64, rate: f64) -> FunnelStage {
    FunnelStage { name: name.to_string(), count, rate_percent: rate }
}

fn conversion_report() -> ConversionReport {
    ConversionReport {
        events: Vec::new(),
        funnel: vec![
            stage("Landing", 28450, 100.0),
            stage("Quote", 8234, 28.9),
            stage("Booking", 847, 3.0),
        ],
        summary_stats: SummaryStats {
            total_conversions: 847,
            conversion_rate_percent: 3.0,
            avg_time_to_convert: "2.4 days".to_string(),
            total_value: "$1,050,280".to_string(),
        },
        analytics: None,
    }
}

fn tables(instructions: &[LayoutInstruction]) -> Vec<&TableSpec> {
    instructions
        .iter()
        .filter_map(|i| match i {
            LayoutInstruction::Table(t) => Some(t),
            _ => None,
        })
        .collect()
}

fn headings(instructions: &[LayoutInstruction]) -> Vec<&str> {
    instructions
        .iter()
        .filter_map(|i| match i {
            LayoutInstruction::Heading(h) => Some(h.as_str()),
            _ => None,
        })
        .collect()
}

#[test]
fn test_funnel_dropoffs() {
    let dropoffs = funnel_dropoffs(&[100, 50, 50, 10]);
    assert_eq!(dropoffs.len(), 4);
    assert!((dropoffs[0].unwrap() - 0.5).abs() < 1e-9);
    assert!((dropoffs[1].unwrap() - 0.0).abs() < 1e-9);
    assert!((dropoffs[2].unwrap() - 0.8).abs() < 1e-9);
    assert_eq!(dropoffs[3], None);
}

#[test]
fn test_funnel_dropoffs_tolerate_zero_and_growth() {
    let dropoffs = funnel_dropoffs(&[0, 10, 20]);
    assert_eq!(dropoffs[0], None);
    assert!((dropoffs[1].unwrap() + 1.0).abs() < 1e-9);
    assert_eq!(dropoffs[2], None);
    assert!(funnel_dropoffs(&[]).is_empty());
}

#[test]
fn test_ab_test_report_instructions() {
    let instructions = build_ab_test(&AbTestReport { tests: vec![hero_test()] });

    assert_eq!(headings(&instructions), vec!["A/B Test Summary"]);
    assert!(matches!(instructions[1], LayoutInstruction::StatCards(ref cards) if cards.len() == 4));

    let tables = tables(&instructions);
    assert_eq!(tables.len(), 1);
    let table = tables[0];
    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.rows[0][0], "Control");
    assert_eq!(table.rows[1][0], format!("{} Variant A", TROPHY));
    assert_eq!(table.rows[0][1], "4,521");
    assert_eq!(table.rows[1][3], "8.6%");
    let caption = table.caption.as_deref().unwrap();
    assert!(caption.starts_with("Homepage Hero CTA | Completed"));
    assert!(caption.contains("Confidence 94%"));
    assert!(caption.contains("Lift +24.6%"));
}

#[test]
fn test_unknown_winner_is_not_marked() {
    let mut test = hero_test();
    test.winner = Some("Variant Z".to_string());
    test.variants.push(Variant { name: "Variant B".to_string(), visitors: 10, conversions: 1, rate: 10.0 });

    let instructions = build_ab_test(&AbTestReport { tests: vec![test] });
    let table = tables(&instructions)[0];
    assert_eq!(table.rows.len(), 3);
    assert!(table.rows.iter().all(|row| !row[0].contains(TROPHY)));
}

#[test]
fn test_winner_sentinels_deserialize_to_none() {
    for raw in [r#""-""#, r#""no winner yet""#, "null"] {
        let json = format!(
            r#"{{"name":"T","status":"running","startDate":"2025-02-01","variants":[],"winner":{},"confidence":50,"lift":"+0%"}}"#,
            raw
        );
        let test: AbTest = serde_json::from_str(&json).unwrap();
        assert_eq!(test.winner, None, "winner {} should be no winner", raw);
    }
}

#[test]
fn test_empty_ab_report_gets_placeholder() {
    let instructions = build_ab_test(&AbTestReport { tests: Vec::new() });
    assert!(matches!(instructions.last(), Some(LayoutInstruction::Placeholder(_))));
}

#[test]
fn test_conversion_report_instructions() {
    let instructions = build_conversion(&conversion_report());

    match &instructions[1] {
        LayoutInstruction::StatCards(cards) => {
            let labels: Vec<&str> = cards.iter().map(|c| c.label.as_str()).collect();
            assert_eq!(
                labels,
                vec!["Total Conversions", "Conversion Rate", "Avg. Time to Convert", "Total Value"]
            );
            assert_eq!(cards[1].value, "3.0%");
        }
        other => panic!("expected stat cards, got {:?}", other),
    }

    let tables = tables(&instructions);
    assert_eq!(tables.len(), 2);
    let dropoff: Vec<&str> = tables[0].rows.iter().map(|r| r[3].as_str()).collect();
    assert_eq!(dropoff, vec!["71%", "90%", NOT_AVAILABLE]);
    assert!(tables[1].rows.is_empty());

    assert!(!instructions
        .iter()
        .any(|i| matches!(i, LayoutInstruction::PieChart(_) | LayoutInstruction::BarChart(_))));
}

#[test]
fn test_analytics_charts_use_top_five() {
    let mut report = conversion_report();
    report.analytics = Some(AnalyticsBreakdown {
        click_distribution: ["Direct", "Google Ads", "Organic", "Facebook", "Referral", "Email"]
            .iter()
            .zip([400.0, 4200.0, 3100.0, 1800.0, 900.0, 600.0])
            .map(|(label, value)| Share { label: label.to_string(), value })
            .collect(),
        ..Default::default()
    });

    let instructions = build_conversion(&report);
    let pie = instructions
        .iter()
        .find_map(|i| match i {
            LayoutInstruction::PieChart(p) => Some(p),
            _ => None,
        })
        .expect("analytics report has a pie chart");

    let labels: Vec<&str> = pie.slices.iter().map(|s| s.label.as_str()).collect();
    assert_eq!(labels, vec!["Google Ads", "Organic", "Facebook", "Referral", "Email"]);

    // Empty segment and region lists become placeholders, not charts.
    let placeholders = instructions
        .iter()
        .filter(|i| matches!(i, LayoutInstruction::Placeholder(_)))
        .count();
    assert_eq!(placeholders, 2);
}

#[test]
fn test_zero_click_distribution_becomes_placeholder() {
    let mut report = conversion_report();
    report.analytics = Some(AnalyticsBreakdown {
        click_distribution: vec![Share { label: "Organic".to_string(), value: 0.0 }],
        ..Default::default()
    });

    let instructions = build_conversion(&report);
    assert!(instructions.iter().any(|i| matches!(
        i,
        LayoutInstruction::Placeholder(msg) if msg.starts_with("Click Distribution")
    )));
}

#[test]
fn test_builder_is_idempotent() {
    let dataset: ReportDataset = serde_json::from_str(include_str!("fixtures/analytics.json")).unwrap();

    let first = build(&dataset);
    let second = build(&dataset);
    assert_eq!(first, second);
    assert!(first.iter().any(|i| matches!(
        i,
        LayoutInstruction::BarChart(b) if b.format == ValueFormat::Currency && b.bars.len() == 5
    )));
}

#[test]
fn test_dataset_kind_and_filename() {
    let dataset: ReportDataset = serde_json::from_str(include_str!("fixtures/analytics.json")).unwrap();
    assert_eq!(dataset.kind(), ReportKind::Analytics);

    let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
    assert_eq!(report_filename(dataset.kind(), date, "pdf"), "analytics-report-2025-03-01.pdf");
    assert_eq!(report_filename(ReportKind::AbTest, date, "pdf"), "ab-test-report-2025-03-01.pdf");
}

#[test]
fn test_number_formatting() {
    assert_eq!(format_count(0), "0");
    assert_eq!(format_count(999), "999");
    assert_eq!(format_count(28450), "28,450");
    assert_eq!(format_count(1050280), "1,050,280");
    assert_eq!(format_money(260400.0), "$260,400");
    assert_eq!(format_whole_percent(0.7106), "71%");
}

#[test]
fn test_funnel_dropoff_rounds_halves_up() {
    let mut report = conversion_report();
    report.funnel = vec![stage("Landing", 8, 100.0), stage("Quote", 7, 87.5)];

    let instructions = build_conversion(&report);
    let dropoff: Vec<&str> = tables(&instructions)[0].rows.iter().map(|r| r[3].as_str()).collect();
    assert_eq!(dropoff, vec!["13%", NOT_AVAILABLE]);

    assert_eq!(format_whole_percent(0.125), "13%");
    assert_eq!(format_whole_percent(0.135), "14%");
    assert_eq!(format_whole_percent(1.0), "100%");
}
