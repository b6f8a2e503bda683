// report-pdf: Datasets to layout instructions
//
// Builders are pure: the same dataset always yields the same instruction list.
// Input problems are recovered here with placeholders so that only backend
// failures can abort a report.

use log::warn;

use crate::canvas::Align;
use crate::chart::{Bar, BarSpec, PieSlice, PieSpec, ValueFormat};
use crate::dataset::{AbTest, AbTestReport, ConversionReport, ReportDataset, TestStatus};
use crate::format::{format_count, format_date_display, format_money, format_rate, format_whole_percent};
use crate::geometry;
use crate::layout::{LayoutInstruction, StatCard};
use crate::table::{TableSpec, Tone};

/// Marks the winning variant
pub const TROPHY: &str = "\u{1F3C6}";

/// Charts show at most this many entries
pub const TOP_ENTRIES: usize = 5;

pub const NOT_AVAILABLE: &str = "n/a";

pub fn build(dataset: &ReportDataset) -> Vec<LayoutInstruction> {
    match dataset {
        ReportDataset::AbTest(report) => build_ab_test(report),
        ReportDataset::Conversion(report) => build_conversion(report),
    }
}

// ============================================================================
// A/B Test Report
// ============================================================================

pub fn build_ab_test(report: &AbTestReport) -> Vec<LayoutInstruction> {
    let mut out = vec![LayoutInstruction::Heading("A/B Test Summary".to_string())];

    if report.tests.is_empty() {
        warn!("A/B test report has no tests");
        out.push(LayoutInstruction::Placeholder("No A/B tests to report".to_string()));
        return out;
    }

    let running = report
        .tests
        .iter()
        .filter(|t| t.status == TestStatus::Running)
        .count();
    let visitors: u64 = report
        .tests
        .iter()
        .flat_map(|t| &t.variants)
        .map(|v| v.visitors)
        .sum();
    let winners = report.tests.iter().filter(|t| winning_variant(t).is_some()).count();

    out.push(LayoutInstruction::StatCards(vec![
        StatCard::new("Total Tests", format_count(report.tests.len() as u64)),
        StatCard::new("Running", format_count(running as u64)),
        StatCard::new("Total Visitors", format_count(visitors)),
        StatCard::new("Winners Declared", format_count(winners as u64)),
    ]));

    out.extend(report.tests.iter().map(|test| LayoutInstruction::Table(variant_table(test))));
    out
}

/// Index of the variant named as winner, if it names one that exists.
fn winning_variant(test: &AbTest) -> Option<usize> {
    let winner = test.winner.as_deref()?;
    let found = test.variants.iter().position(|v| v.name == winner);
    if found.is_none() {
        warn!("test {:?}: winner {:?} is not one of its variants", test.name, winner);
    }
    found
}

fn variant_table(test: &AbTest) -> TableSpec {
    if test.variants.len() < 2 {
        warn!("test {:?} has {} variant(s)", test.name, test.variants.len());
    }
    let winner = winning_variant(test);

    let rows = test
        .variants
        .iter()
        .enumerate()
        .map(|(i, variant)| {
            if variant.conversions > variant.visitors {
                warn!(
                    "test {:?}: variant {:?} has more conversions than visitors",
                    test.name, variant.name
                );
            }
            let name = if Some(i) == winner {
                format!("{} {}", TROPHY, variant.name)
            } else {
                variant.name.clone()
            };
            vec![
                name,
                format_count(variant.visitors),
                format_count(variant.conversions),
                format_rate(variant.rate),
            ]
        })
        .collect();

    let caption = format!(
        "{} | {} | Started {} | Confidence {:.0}% | Lift {}",
        test.name,
        test.status.label(),
        format_date_display(&test.start_date),
        test.confidence,
        test.lift
    );

    TableSpec::new(["Variant", "Visitors", "Conversions", "Conv. Rate"])
        .with_caption(caption)
        .with_rows(rows)
        .with_align(vec![Align::Left, Align::Right, Align::Right, Align::Right])
}

// ============================================================================
// Conversion Report
// ============================================================================

/// Fraction of entries lost between each stage and the next. The last stage and
/// stages with a zero count have no drop-off. Growth between stages gives a
/// negative value.
pub fn funnel_dropoffs(counts: &[u64]) -> Vec<Option<f64>> {
    (0..counts.len())
        .map(|i| match (counts[i], counts.get(i + 1)) {
            (0, _) | (_, None) => None,
            (current, Some(next)) => Some(1.0 - *next as f64 / current as f64),
        })
        .collect()
}

pub fn build_conversion(report: &ConversionReport) -> Vec<LayoutInstruction> {
    let stats = &report.summary_stats;
    let mut out = vec![
        LayoutInstruction::Heading("Conversion Summary".to_string()),
        LayoutInstruction::StatCards(vec![
            StatCard::new("Total Conversions", format_count(stats.total_conversions)),
            StatCard::new("Conversion Rate", format_rate(stats.conversion_rate_percent)),
            StatCard::new("Avg. Time to Convert", stats.avg_time_to_convert.clone()),
            StatCard::new("Total Value", stats.total_value.clone()),
        ]),
        LayoutInstruction::Heading("Conversion Funnel".to_string()),
        LayoutInstruction::Table(funnel_table(report)),
        LayoutInstruction::Heading("Conversion Events".to_string()),
        LayoutInstruction::Table(events_table(report)),
    ];

    if let Some(analytics) = &report.analytics {
        out.push(LayoutInstruction::Heading("Traffic & Audience".to_string()));

        let clicks = top_entries(&analytics.click_distribution, |s| s.value);
        out.push(pie_or_placeholder(
            "Click Distribution",
            clicks
                .iter()
                .filter(|s| s.value > 0.0)
                .map(|s| (s.label.clone(), s.value as f32))
                .collect(),
        ));

        let segments = top_entries(&analytics.segments, |s| s.conversions as f64);
        out.push(bar_or_placeholder(
            "Conversions by Segment",
            ValueFormat::Count,
            segments
                .iter()
                .map(|s| (s.segment.clone(), s.conversions as f32))
                .collect(),
        ));

        let regions = top_entries(&analytics.regions, |r| r.revenue);
        out.push(bar_or_placeholder(
            "Revenue by State",
            ValueFormat::Currency,
            regions.iter().map(|r| (r.state.clone(), r.revenue as f32)).collect(),
        ));

        out.push(LayoutInstruction::Heading("Top Keywords".to_string()));
        out.push(LayoutInstruction::Table(
            TableSpec::new(["Keyword", "Clicks", "Conversions", "Conv. Rate", "CPC"])
                .with_rows(
                    analytics
                        .keywords
                        .iter()
                        .map(|k| {
                            let rate = if k.clicks == 0 {
                                NOT_AVAILABLE.to_string()
                            } else {
                                format_rate(k.conversions as f64 / k.clicks as f64 * 100.0)
                            };
                            vec![
                                k.keyword.clone(),
                                format_count(k.clicks),
                                format_count(k.conversions),
                                rate,
                                k.cpc.clone(),
                            ]
                        })
                        .collect(),
                )
                .with_align(vec![Align::Left, Align::Right, Align::Right, Align::Right, Align::Right])
                .with_tone(Tone::Secondary),
        ));

        out.push(LayoutInstruction::Heading("Audience Segments".to_string()));
        out.push(LayoutInstruction::Table(
            TableSpec::new(["Segment", "Conversions", "Share"])
                .with_rows(
                    analytics
                        .segments
                        .iter()
                        .map(|s| vec![s.segment.clone(), format_count(s.conversions), format_rate(s.share)])
                        .collect(),
                )
                .with_align(vec![Align::Left, Align::Right, Align::Right])
                .with_tone(Tone::Secondary),
        ));

        out.push(LayoutInstruction::Heading("Geographic Performance".to_string()));
        out.push(LayoutInstruction::Table(
            TableSpec::new(["State", "Conversions", "Revenue"])
                .with_rows(
                    analytics
                        .regions
                        .iter()
                        .map(|r| vec![r.state.clone(), format_count(r.conversions), format_money(r.revenue)])
                        .collect(),
                )
                .with_align(vec![Align::Left, Align::Right, Align::Right])
                .with_tone(Tone::Secondary),
        ));
    }

    out
}

fn funnel_table(report: &ConversionReport) -> TableSpec {
    let counts: Vec<u64> = report.funnel.iter().map(|s| s.count).collect();
    let rows = report
        .funnel
        .iter()
        .zip(funnel_dropoffs(&counts))
        .map(|(stage, dropoff)| {
            vec![
                stage.name.clone(),
                format_count(stage.count),
                format_rate(stage.rate_percent),
                dropoff.map_or_else(|| NOT_AVAILABLE.to_string(), format_whole_percent),
            ]
        })
        .collect();

    TableSpec::new(["Stage", "Visitors", "Rate", "Drop-off"])
        .with_rows(rows)
        .with_align(vec![Align::Left, Align::Right, Align::Right, Align::Right])
}

fn events_table(report: &ConversionReport) -> TableSpec {
    let rows = report
        .events
        .iter()
        .map(|e| {
            vec![
                e.name.clone(),
                format_count(e.count),
                e.trend_label.clone(),
                e.avg_value.clone(),
                e.source.clone(),
            ]
        })
        .collect();

    TableSpec::new(["Event", "Count", "Trend", "Avg. Value", "Source"])
        .with_rows(rows)
        .with_align(vec![Align::Left, Align::Right, Align::Right, Align::Right, Align::Left])
}

// ============================================================================
// Charts
// ============================================================================

/// The `TOP_ENTRIES` largest items by `key`, ties kept in input order.
fn top_entries<T>(items: &[T], key: impl Fn(&T) -> f64) -> Vec<&T> {
    let mut sorted: Vec<&T> = items.iter().collect();
    sorted.sort_by(|a, b| key(b).total_cmp(&key(a)));
    sorted.truncate(TOP_ENTRIES);
    sorted
}

fn pie_or_placeholder(title: &str, data: Vec<(String, f32)>) -> LayoutInstruction {
    let values: Vec<f32> = data.iter().map(|(_, v)| *v).collect();
    match geometry::pie_slices(&values) {
        Ok(_) => LayoutInstruction::PieChart(PieSpec {
            title: title.to_string(),
            slices: data
                .into_iter()
                .map(|(label, value)| PieSlice { value, label, color: None })
                .collect(),
        }),
        Err(e) => {
            warn!("{}: {}", title, e);
            LayoutInstruction::Placeholder(format!("{}: no data available", title))
        }
    }
}

fn bar_or_placeholder(title: &str, format: ValueFormat, data: Vec<(String, f32)>) -> LayoutInstruction {
    let values: Vec<f32> = data.iter().map(|(_, v)| *v).collect();
    match geometry::validate_series(&values) {
        Ok(()) => LayoutInstruction::BarChart(BarSpec {
            title: title.to_string(),
            bars: data
                .into_iter()
                .map(|(label, value)| Bar { value, label, color: None })
                .collect(),
            format,
        }),
        Err(e) => {
            warn!("{}: {}", title, e);
            LayoutInstruction::Placeholder(format!("{}: no data available", title))
        }
    }
}
