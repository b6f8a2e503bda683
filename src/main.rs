// report-pdf: Generate marketing analytics reports

use ::image::DynamicImage;
use chrono::{Local, NaiveDate};
use clap::{ArgAction, Parser};
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use uuid::Uuid;

use report_pdf::{
    generate_display_list, generate_report, report_filename, ReportDataset, ReportError,
    ReportOptions, ReportTheme,
};

// ============================================================================
// Data Structures
// ============================================================================

/// CLI Arguments
#[derive(Parser, Debug)]
#[command(author, version, about = "Generate marketing analytics reports as PDF documents")]
struct Args {
    /// Report dataset (JSON with a "kind" of "abTest" or "conversion")
    #[arg(short, long)]
    input: String,

    /// Report date (YYYY-MM-DD format, defaults to today)
    #[arg(short, long)]
    date: Option<String>,

    /// Output filename (defaults to {kind}-report-{date}.pdf)
    #[arg(short, long)]
    output: Option<String>,

    /// Theme file (JSON) with brand colors, margins and font sizes
    #[arg(long)]
    theme: Option<String>,

    /// Brand name shown in the page footers
    #[arg(short, long)]
    brand: Option<String>,

    /// Logo image (file path or URL) to display in the banner
    #[arg(long)]
    logo: Option<String>,

    /// Write the JSON display list instead of a PDF
    #[arg(long)]
    display_list: bool,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn run(args: Args) -> Result<(), ReportError> {
    let date = parse_date(&args.date)?;
    let dataset = ReportDataset::load(&args.input)?;

    let mut theme = match &args.theme {
        Some(path) => ReportTheme::load(path)?,
        None => ReportTheme::default(),
    };
    if let Some(brand) = args.brand {
        theme.brand_name = brand;
    }

    let options = ReportOptions {
        theme,
        generated: date,
        report_id: Some(generate_short_id()),
        logo: load_logo(&args.logo)?,
    };

    // Render fully before touching the output path
    let document = if args.display_list {
        generate_display_list(&dataset, &options)?
    } else {
        generate_report(&dataset, &options)?
    };

    let output_file = args
        .output
        .unwrap_or_else(|| report_filename(dataset.kind(), date, document.extension));

    let file = File::create(&output_file)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(&document.bytes)?;
    writer.flush()?;

    println!("✓ Generated: {}", output_file);
    println!("  Report: {}", dataset.kind().title());
    println!("  Pages: {}", document.page_count);
    if let Some(id) = &options.report_id {
        println!("  Report ID: {}", id);
    }

    Ok(())
}

// ============================================================================
// Helper Functions
// ============================================================================

fn parse_date(date_str: &Option<String>) -> Result<NaiveDate, ReportError> {
    match date_str {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| ReportError::Date(s.clone())),
        None => Ok(Local::now().date_naive()),
    }
}

fn generate_short_id() -> String {
    let uuid = Uuid::new_v4();
    let hex = format!("{:x}", uuid);
    hex[..8].to_uppercase()
}

fn load_logo(path: &Option<String>) -> Result<Option<DynamicImage>, ReportError> {
    match path {
        Some(p) => {
            let image_bytes = if p.starts_with("http://") || p.starts_with("https://") {
                let response = ureq::get(p)
                    .call()
                    .map_err(|e| ReportError::Logo(format!("Failed to fetch URL: {}", e)))?;

                let mut bytes = Vec::new();
                response
                    .into_reader()
                    .read_to_end(&mut bytes)
                    .map_err(|e| ReportError::Logo(format!("Failed to read response: {}", e)))?;
                bytes
            } else {
                std::fs::read(p).map_err(|e| ReportError::Logo(format!("{}: {}", p, e)))?
            };

            let img = ::image::load_from_memory(&image_bytes)
                .map_err(|e| ReportError::Logo(format!("Failed to decode image: {}", e)))?;

            Ok(Some(img))
        }
        None => Ok(None),
    }
}
