//! Summary report: one serializable struct, rendered as Markdown or JSON.

use crate::{
    error::AnalysisResult,
    funnel::{Bottleneck, FunnelRow},
    kpi::KpiMetric,
    loader::{RawData, TableInfo},
    pipeline::ProcessedOutputs,
    rfm::SegmentSummary,
    sales::CategorySalesRow,
    trend::PeriodTrendRow,
    types::Percent,
};
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

pub const MARKDOWN_FILE: &str = "analysis_summary.md";
pub const JSON_FILE: &str = "analysis_summary.json";

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub generated_on: NaiveDate,
    pub tables: Vec<TableInfo>,
    pub funnel: Vec<FunnelRow>,
    pub overall_conversion: Percent,
    pub bottleneck: Option<Bottleneck>,
    pub segments: Vec<SegmentSummary>,
    pub monthly_trend: Vec<PeriodTrendRow>,
    pub category_sales: Vec<CategorySalesRow>,
    pub kpis: Vec<KpiMetric>,
}

/// `1234567.891` → `"₺1,234,567.89"`.
pub fn format_currency(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}₺{grouped}.{:02}", cents % 100)
}

pub fn format_percentage(value: Percent) -> String {
    format!("{value:.1}%")
}

impl AnalysisReport {
    pub fn build(raw: &RawData, out: &ProcessedOutputs, generated_on: NaiveDate) -> Self {
        Self {
            generated_on,
            tables: raw.describe(),
            funnel: out.funnel.rows.clone(),
            overall_conversion: out.funnel.overall_conversion,
            bottleneck: out.funnel.bottleneck,
            segments: out.rfm.segments.clone(),
            monthly_trend: out.trend.monthly.clone(),
            category_sales: out.sales.by_category.clone(),
            kpis: out.kpis.clone(),
        }
    }

    pub fn to_json(&self) -> AnalysisResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_markdown(&self) -> AnalysisResult<String> {
        let mut md = String::new();
        self.render_markdown(&mut md)
            .map_err(|e| anyhow::anyhow!("Cannot render markdown report: {e}"))?;
        Ok(md)
    }

    fn render_markdown(&self, md: &mut String) -> std::fmt::Result {
        writeln!(md, "# E-commerce Sales Analysis")?;
        writeln!(md)?;
        writeln!(md, "Generated on {}.", self.generated_on)?;

        writeln!(md)?;
        writeln!(md, "## Data")?;
        writeln!(md)?;
        writeln!(md, "| Table | Rows | Columns |")?;
        writeln!(md, "|---|---:|---:|")?;
        for t in &self.tables {
            writeln!(md, "| {} | {} | {} |", t.name, t.rows, t.columns)?;
        }

        writeln!(md)?;
        writeln!(md, "## Funnel")?;
        writeln!(md)?;
        writeln!(md, "| Stage | Total | Conversion from previous |")?;
        writeln!(md, "|---|---:|---:|")?;
        for row in &self.funnel {
            let rate = row.rate.map(format_percentage).unwrap_or_else(|| "-".into());
            writeln!(md, "| {} | {} | {} |", row.stage.label(), row.total, rate)?;
        }
        writeln!(md)?;
        writeln!(
            md,
            "- Overall conversion: {}",
            format_percentage(self.overall_conversion)
        )?;
        match &self.bottleneck {
            Some(b) => writeln!(
                md,
                "- Bottleneck: {} at {}",
                b.stage.label(),
                format_percentage(b.rate)
            )?,
            None => writeln!(md, "- Bottleneck: -")?,
        }

        writeln!(md)?;
        writeln!(md, "## Customer Segments")?;
        writeln!(md)?;
        writeln!(
            md,
            "| Segment | Customers | Share | Avg recency (days) | Avg frequency | Avg monetary | Total monetary |"
        )?;
        writeln!(md, "|---|---:|---:|---:|---:|---:|---:|")?;
        for s in &self.segments {
            writeln!(
                md,
                "| {} | {} | {} | {:.1} | {:.2} | {} | {} |",
                s.segment,
                s.customer_count,
                format_percentage(s.percentage),
                s.avg_recency,
                s.avg_frequency,
                format_currency(s.avg_monetary),
                format_currency(s.total_monetary)
            )?;
        }

        writeln!(md)?;
        writeln!(md, "## Monthly Trend")?;
        writeln!(md)?;
        writeln!(md, "| Month | Views | Purchases | Mean daily conversion |")?;
        writeln!(md, "|---|---:|---:|---:|")?;
        for m in &self.monthly_trend {
            writeln!(
                md,
                "| {} | {} | {} | {} |",
                m.period,
                m.page_view,
                m.complete_purchase,
                format_percentage(m.mean_conversion_rate)
            )?;
        }

        writeln!(md)?;
        writeln!(md, "## Sales by Category")?;
        writeln!(md)?;
        writeln!(md, "| Category | Orders | Revenue | Avg order | Avg rating | Returns |")?;
        writeln!(md, "|---|---:|---:|---:|---:|---:|")?;
        for c in &self.category_sales {
            writeln!(
                md,
                "| {} | {} | {} | {} | {:.2} | {} |",
                c.category,
                c.orders,
                format_currency(c.revenue),
                format_currency(c.avg_order_value),
                c.avg_rating,
                format_percentage(c.return_rate)
            )?;
        }

        writeln!(md)?;
        writeln!(md, "## KPIs")?;
        writeln!(md)?;
        writeln!(md, "| Metric | Value | Unit |")?;
        writeln!(md, "|---|---:|---|")?;
        for k in &self.kpis {
            writeln!(md, "| {} | {:.2} | {} |", k.metric, k.value, k.unit)?;
        }
        Ok(())
    }
}

/// Write the Markdown and JSON renderings into `dir`.
pub fn write_report(dir: &Path, report: &AnalysisReport) -> AnalysisResult<(PathBuf, PathBuf)> {
    std::fs::create_dir_all(dir)?;
    let md_path = dir.join(MARKDOWN_FILE);
    let json_path = dir.join(JSON_FILE);
    std::fs::write(&md_path, report.to_markdown()?)?;
    std::fs::write(&json_path, report.to_json()?)?;
    log::info!("report: written to {}", dir.display());
    Ok((md_path, json_path))
}
