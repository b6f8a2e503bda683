// report-pdf: Number and text formatting (en-US conventions)

use chrono::NaiveDate;

/// `28450` -> `28,450`
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Percentage already on a 0-100 scale, one decimal: `28.9%`
pub fn format_rate(percent: f64) -> String {
    format!("{:.1}%", percent)
}

/// Fraction rounded to a whole percent, halves rounding up: `0.709` -> `71%`,
/// `0.125` -> `13%`
pub fn format_whole_percent(fraction: f64) -> String {
    format!("{:.0}%", round_half_up(fraction * 100.0))
}

/// `{:.N}` rounds exact halves to even; report figures round them up.
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Whole dollars with separators: `$12,400`, `-$80`
pub fn format_money(value: f64) -> String {
    let rounded = value.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{}${}", sign, format_count(rounded.abs() as u64))
}

/// Short label for chart values: `950`, `4,521`, `12.4k`, `1.2M`
pub fn format_compact(value: f64) -> String {
    let abs = value.abs();
    if abs >= 1_000_000.0 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if abs >= 10_000.0 {
        format!("{:.1}k", value / 1_000.0)
    } else if value.fract() == 0.0 && value >= 0.0 {
        format_count(value as u64)
    } else {
        format!("{:.1}", value)
    }
}

/// Keeps at most `max` characters, without an ellipsis.
pub fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

pub fn format_date_display(date: &NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}
