//! The analysis pass: every aggregator over one loaded dataset.
//!
//! EXECUTION ORDER (fixed):
//!   1. Funnel: totals, rates, bottleneck, category funnel
//!   2. RFM: quartile scores, segment and score summaries
//!   3. Trend: daily, daily funnel, weekly, monthly, category/day
//!   4. Behavior: session summaries, daily activity
//!   5. Sales: per-category order summary
//!   6. KPI: dashboard across funnel, behavior and RFM
//!
//! RULES:
//!   - Input tables are borrowed immutably; outputs are new values.
//!   - An empty table stops the pass with `NoData`.
//!   - A funnel without any defined step rate still completes; it just has
//!     no bottleneck.

use crate::{
    behavior::{
        daily_behavior, session_length_summary, session_summary, DailyBehaviorRow,
        SessionLengthRow, SessionSummaryRow,
    },
    error::{AnalysisError, AnalysisResult},
    funnel::{
        category_funnel, conversion_rates, find_bottleneck, funnel_rows, stage_totals, Bottleneck,
        CategoryFunnelRow, ConversionRates, FunnelRow, StageTotals,
    },
    kpi::{kpi_dashboard, KpiMetric},
    loader::RawData,
    rfm::{score_customers, score_summary, segment_summary, ScoreSummary, ScoredCustomer, SegmentSummary},
    sales::{category_sales, CategorySalesRow},
    trend::{
        category_trend, daily_funnel, daily_trend, period_trend, CategoryTrendRow, DailyFunnelRow,
        DailyTrendRow, PeriodTrendRow,
    },
    types::{Granularity, Percent},
};

#[derive(Debug, Clone)]
pub struct FunnelAnalysis {
    pub totals: StageTotals,
    pub rates: ConversionRates,
    /// `None` when no step rate is defined (e.g. no page views at all).
    pub bottleneck: Option<Bottleneck>,
    pub overall_conversion: Percent,
    pub rows: Vec<FunnelRow>,
    pub by_category: Vec<CategoryFunnelRow>,
}

#[derive(Debug, Clone)]
pub struct RfmAnalysis {
    pub scored: Vec<ScoredCustomer>,
    pub segments: Vec<SegmentSummary>,
    pub scores: Vec<ScoreSummary>,
}

#[derive(Debug, Clone)]
pub struct TrendAnalysis {
    pub daily: Vec<DailyTrendRow>,
    pub daily_funnel: Vec<DailyFunnelRow>,
    pub weekly: Vec<PeriodTrendRow>,
    pub monthly: Vec<PeriodTrendRow>,
    pub by_category: Vec<CategoryTrendRow>,
}

#[derive(Debug, Clone)]
pub struct BehaviorAnalysis {
    pub sessions: Vec<SessionSummaryRow>,
    pub session_lengths: Vec<SessionLengthRow>,
    pub daily: Vec<DailyBehaviorRow>,
}

#[derive(Debug, Clone)]
pub struct SalesAnalysis {
    pub by_category: Vec<CategorySalesRow>,
}

/// Everything one analysis pass produces.
#[derive(Debug, Clone)]
pub struct ProcessedOutputs {
    pub funnel: FunnelAnalysis,
    pub rfm: RfmAnalysis,
    pub trend: TrendAnalysis,
    pub behavior: BehaviorAnalysis,
    pub sales: SalesAnalysis,
    pub kpis: Vec<KpiMetric>,
}

pub fn analyze_funnel(raw: &RawData) -> AnalysisResult<FunnelAnalysis> {
    let totals = stage_totals(&raw.funnel)?;
    let rates = conversion_rates(&totals);
    let bottleneck = match find_bottleneck(&rates) {
        Ok(b) => {
            log::info!(
                "funnel: {} views, bottleneck {} at {:.1}%",
                totals.page_view,
                b.stage,
                b.rate
            );
            Some(b)
        }
        Err(AnalysisError::NoData { .. }) => {
            log::warn!(
                "funnel: {} rows but no defined step rate; no bottleneck",
                raw.funnel.len()
            );
            None
        }
        Err(e) => return Err(e),
    };
    Ok(FunnelAnalysis {
        rows: funnel_rows(&totals, &rates),
        overall_conversion: totals.overall_conversion(),
        by_category: category_funnel(&raw.funnel)?,
        totals,
        rates,
        bottleneck,
    })
}

pub fn analyze_rfm(raw: &RawData) -> AnalysisResult<RfmAnalysis> {
    let scored = score_customers(&raw.rfm)?;
    let segments = segment_summary(&raw.rfm)?;
    let scores = score_summary(&scored);
    log::info!(
        "rfm: {} customers, {} segments, {} distinct scores",
        scored.len(),
        segments.len(),
        scores.len()
    );
    Ok(RfmAnalysis {
        scored,
        segments,
        scores,
    })
}

pub fn analyze_trend(raw: &RawData) -> AnalysisResult<TrendAnalysis> {
    let daily = daily_trend(&raw.funnel)?;
    let weekly = period_trend(&daily, Granularity::Week)?;
    let monthly = period_trend(&daily, Granularity::Month)?;
    log::info!(
        "trend: {} days, {} weeks, {} months",
        daily.len(),
        weekly.len(),
        monthly.len()
    );
    Ok(TrendAnalysis {
        daily_funnel: daily_funnel(&raw.funnel)?,
        by_category: category_trend(&raw.funnel)?,
        daily,
        weekly,
        monthly,
    })
}

pub fn analyze_behavior(raw: &RawData) -> AnalysisResult<BehaviorAnalysis> {
    Ok(BehaviorAnalysis {
        sessions: session_summary(&raw.behavior)?,
        session_lengths: session_length_summary(&raw.behavior)?,
        daily: daily_behavior(&raw.behavior)?,
    })
}

pub fn analyze_sales(raw: &RawData) -> AnalysisResult<SalesAnalysis> {
    let by_category = category_sales(&raw.sales)?;
    log::info!(
        "sales: {} orders across {} categories",
        raw.sales.len(),
        by_category.len()
    );
    Ok(SalesAnalysis { by_category })
}

pub fn process(raw: &RawData) -> AnalysisResult<ProcessedOutputs> {
    Ok(ProcessedOutputs {
        funnel: analyze_funnel(raw)?,
        rfm: analyze_rfm(raw)?,
        trend: analyze_trend(raw)?,
        behavior: analyze_behavior(raw)?,
        sales: analyze_sales(raw)?,
        kpis: kpi_dashboard(&raw.funnel, &raw.behavior, &raw.rfm)?,
    })
}
