// report-pdf: Report input data

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{ReportError, Result};

/// Winner values that mean "no variant has won yet"
const NO_WINNER_SENTINELS: [&str; 2] = ["-", "no winner yet"];

// ============================================================================
// Dataset
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ReportDataset {
    AbTest(AbTestReport),
    Conversion(ConversionReport),
}

impl ReportDataset {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ReportError::Dataset(format!("{}: {}", path, e)))?;
        serde_json::from_str(&content)
            .map_err(|e| ReportError::Dataset(format!("Invalid JSON: {}", e)))
    }

    pub fn kind(&self) -> ReportKind {
        match self {
            ReportDataset::AbTest(_) => ReportKind::AbTest,
            ReportDataset::Conversion(report) if report.analytics.is_some() => ReportKind::Analytics,
            ReportDataset::Conversion(_) => ReportKind::Conversion,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    AbTest,
    Conversion,
    Analytics,
}

impl ReportKind {
    /// Filename prefix
    pub fn slug(self) -> &'static str {
        match self {
            ReportKind::AbTest => "ab-test",
            ReportKind::Conversion => "conversion",
            ReportKind::Analytics => "analytics",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ReportKind::AbTest => "A/B Test Report",
            ReportKind::Conversion => "Conversion Report",
            ReportKind::Analytics => "Marketing Analytics Report",
        }
    }

    pub fn subtitle(self) -> &'static str {
        match self {
            ReportKind::AbTest => "Experiment performance and winning variants",
            ReportKind::Conversion => "Funnel performance and conversion events",
            ReportKind::Analytics => "Funnel, traffic sources and audience breakdown",
        }
    }
}

// ============================================================================
// A/B Tests
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbTestReport {
    pub tests: Vec<AbTest>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Running,
    Completed,
    Paused,
}

impl TestStatus {
    pub fn label(self) -> &'static str {
        match self {
            TestStatus::Running => "Running",
            TestStatus::Completed => "Completed",
            TestStatus::Paused => "Paused",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbTest {
    pub name: String,
    pub status: TestStatus,
    pub start_date: NaiveDate,
    pub variants: Vec<Variant>,
    /// `None` when no variant has won yet
    #[serde(default, deserialize_with = "winner_or_sentinel")]
    pub winner: Option<String>,
    /// Statistical confidence, 0-100
    pub confidence: f64,
    /// Signed percentage, e.g. `+24.6%`
    pub lift: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub name: String,
    pub visitors: u64,
    pub conversions: u64,
    /// Conversion rate, 0-100
    pub rate: f64,
}

fn winner_or_sentinel<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.filter(|name| {
        let trimmed = name.trim();
        !trimmed.is_empty() && !NO_WINNER_SENTINELS.iter().any(|s| s.eq_ignore_ascii_case(trimmed))
    }))
}

// ============================================================================
// Conversions
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionReport {
    pub events: Vec<ConversionEvent>,
    /// Stage counts are not guaranteed to be non-increasing
    pub funnel: Vec<FunnelStage>,
    pub summary_stats: SummaryStats,
    /// Present for the combined analytics report
    #[serde(default)]
    pub analytics: Option<AnalyticsBreakdown>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionEvent {
    pub name: String,
    pub count: u64,
    pub trend_label: String,
    /// Preformatted money string
    pub avg_value: String,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunnelStage {
    pub name: String,
    pub count: u64,
    pub rate_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStats {
    pub total_conversions: u64,
    pub conversion_rate_percent: f64,
    pub avg_time_to_convert: String,
    pub total_value: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalyticsBreakdown {
    pub click_distribution: Vec<Share>,
    pub segments: Vec<SegmentRow>,
    pub regions: Vec<RegionRow>,
    pub keywords: Vec<KeywordRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Share {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentRow {
    pub segment: String,
    pub conversions: u64,
    /// Share of all conversions, 0-100
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionRow {
    pub state: String,
    pub conversions: u64,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordRow {
    pub keyword: String,
    pub clicks: u64,
    pub conversions: u64,
    /// Preformatted cost per click
    pub cpc: String,
}
