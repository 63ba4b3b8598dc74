//! report-runner: headless analysis runner.
//!
//! Usage:
//!   report-runner --config ./data/config
//!   report-runner --config ./data/config --generate --seed 7
//!   report-runner --raw-dir data/raw --processed-dir data/processed --json

use anyhow::Result;
use shopfunnel_core::{
    config::AnalysisConfig,
    export, generator,
    loader::{self, DataPaths, RawData},
    pipeline::{self, ProcessedOutputs},
    report::{self, format_currency, format_percentage, AnalysisReport},
};
use std::env;
use std::path::{Path, PathBuf};

#[derive(serde::Serialize)]
struct RunSummary {
    seed: u64,
    generated: bool,
    funnel_rows: usize,
    customers: usize,
    sessions: usize,
    orders: usize,
    overall_conversion: f64,
    bottleneck_stage: Option<String>,
    bottleneck_rate: Option<f64>,
    processed_files: Vec<String>,
    report_markdown: String,
    report_json: String,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let config_dir = flag_value(&args, "--config").unwrap_or("./data/config");
    let generate = args.iter().any(|a| a == "--generate");
    let json_mode = args.iter().any(|a| a == "--json");

    let mut config = AnalysisConfig::load(config_dir)?;
    config.generation.seed = parse_arg(&args, "--seed", config.generation.seed);
    if let Some(dir) = flag_value(&args, "--raw-dir") {
        config.paths.raw_dir = dir.to_string();
    }
    if let Some(dir) = flag_value(&args, "--processed-dir") {
        config.paths.processed_dir = dir.to_string();
    }
    if let Some(dir) = flag_value(&args, "--reports-dir") {
        config.paths.reports_dir = dir.to_string();
    }

    if !json_mode {
        println!("E-commerce analysis: report-runner");
        println!("  config:     {config_dir}");
        println!("  seed:       {}", config.generation.seed);
        println!("  generate:   {generate}");
        println!("  raw:        {}", config.paths.raw_dir);
        println!("  processed:  {}", config.paths.processed_dir);
        println!("  reports:    {}", config.paths.reports_dir);
        println!();
    }

    let paths = DataPaths::from_config(&config.paths);
    if !generate && !paths.funnel().exists() {
        log::warn!(
            "{} not found; pass --generate to synthesize the raw tables",
            paths.funnel().display()
        );
    }
    if generate {
        let raw = generator::generate(&config.generation)?;
        export::write_raw(&paths, &raw)?;
    }

    let raw = loader::load_raw(&paths)?;
    let out = pipeline::process(&raw)?;
    let processed_files = export::write_processed(&paths, &out)?;

    let today = chrono::Local::now().date_naive();
    let analysis_report = AnalysisReport::build(&raw, &out, today);
    let (md_path, json_path) =
        report::write_report(Path::new(&config.paths.reports_dir), &analysis_report)?;
    log::info!(
        "run complete: {} processed tables, report at {}",
        processed_files.len(),
        md_path.display()
    );

    if json_mode {
        let summary = RunSummary {
            seed: config.generation.seed,
            generated: generate,
            funnel_rows: raw.funnel.len(),
            customers: raw.rfm.len(),
            sessions: raw.behavior.len(),
            orders: raw.sales.len(),
            overall_conversion: out.funnel.overall_conversion,
            bottleneck_stage: out.funnel.bottleneck.map(|b| b.stage.to_string()),
            bottleneck_rate: out.funnel.bottleneck.map(|b| b.rate),
            processed_files: processed_files.iter().map(|p| p.display().to_string()).collect(),
            report_markdown: md_path.display().to_string(),
            report_json: json_path.display().to_string(),
        };
        println!("{}", serde_json::to_string(&summary)?);
    } else {
        print_summary(&raw, &out, &processed_files, &md_path);
    }

    Ok(())
}

fn print_summary(raw: &RawData, out: &ProcessedOutputs, files: &[PathBuf], md_path: &Path) {
    println!("=== DATA ===");
    for table in raw.describe() {
        println!(
            "  {:<10} {:>8} rows  {:>2} columns",
            table.name, table.rows, table.columns
        );
    }

    println!();
    println!("=== FUNNEL ===");
    for row in &out.funnel.rows {
        let rate = row.rate.map(format_percentage).unwrap_or_else(|| "-".into());
        println!("  {:<10} {:>10}  {:>7}", row.stage.label(), row.total, rate);
    }
    println!(
        "  overall:   {}",
        format_percentage(out.funnel.overall_conversion)
    );
    match out.funnel.bottleneck {
        Some(b) => println!(
            "  bottleneck: {} ({})",
            b.stage.label(),
            format_percentage(b.rate)
        ),
        None => println!("  bottleneck: -"),
    }

    println!();
    println!("=== SEGMENTS ===");
    for seg in &out.rfm.segments {
        println!(
            "  {:<16} {:>5} customers ({})",
            seg.segment,
            seg.customer_count,
            format_percentage(seg.percentage)
        );
    }

    println!();
    println!("=== SALES ===");
    for cat in &out.sales.by_category {
        println!(
            "  {:<16} {:>5} orders  {:>16}",
            cat.category,
            cat.orders,
            format_currency(cat.revenue)
        );
    }

    println!();
    println!("=== OUTPUT ===");
    println!("  processed tables: {}", files.len());
    println!("  report:           {}", md_path.display());
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
