//! Headline KPI table combining funnel, behaviour and RFM data.

use crate::{
    error::{AnalysisError, AnalysisResult},
    funnel::{percent_or_zero, stage_totals},
    records::{BehaviorRecord, FunnelRecord, RfmRecord},
    segment::Segment,
};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiMetric {
    pub metric: &'static str,
    pub value: f64,
    pub unit: &'static str,
}

impl KpiMetric {
    fn new(metric: &'static str, value: f64, unit: &'static str) -> Self {
        Self {
            metric,
            value,
            unit,
        }
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

/// Fifteen headline metrics, in dashboard order.
pub fn kpi_dashboard(
    funnel: &[FunnelRecord],
    behavior: &[BehaviorRecord],
    rfm: &[RfmRecord],
) -> AnalysisResult<Vec<KpiMetric>> {
    let totals = stage_totals(funnel)?;
    if behavior.is_empty() {
        return Err(AnalysisError::NoData { table: "behavior" });
    }
    if rfm.is_empty() {
        return Err(AnalysisError::NoData { table: "rfm" });
    }

    let avg_session_minutes = mean(behavior.iter().map(|b| b.session_duration)) / 60.0;
    let avg_pages = mean(behavior.iter().map(|b| f64::from(b.pages_viewed)));
    let avg_bounce = mean(behavior.iter().map(|b| b.bounce_rate)) * 100.0;
    let return_rate = mean(behavior.iter().map(|b| f64::from(u8::from(b.return_visitor)))) * 100.0;

    let avg_order_value = mean(rfm.iter().map(|r| r.monetary));
    let lifetime_value = avg_order_value * mean(rfm.iter().map(|r| f64::from(r.frequency)));
    let total_monetary: f64 = rfm.iter().map(|r| r.monetary).sum();
    let champions_monetary: f64 = rfm
        .iter()
        .filter(|r| r.segment == Segment::Champions.label())
        .map(|r| r.monetary)
        .sum();
    let champions_share = if total_monetary > 0.0 {
        champions_monetary / total_monetary * 100.0
    } else {
        0.0
    };

    Ok(vec![
        KpiMetric::new("Total Page Views", totals.page_view as f64, "views"),
        KpiMetric::new("Total Cart Adds", totals.add_to_cart as f64, "adds"),
        KpiMetric::new("Total Checkouts", totals.start_checkout as f64, "checkouts"),
        KpiMetric::new("Total Purchases", totals.complete_purchase as f64, "purchases"),
        KpiMetric::new(
            "Overall Conversion Rate",
            percent_or_zero(totals.complete_purchase, totals.page_view),
            "%",
        ),
        KpiMetric::new(
            "Cart Conversion Rate",
            percent_or_zero(totals.add_to_cart, totals.page_view),
            "%",
        ),
        KpiMetric::new(
            "Checkout Conversion Rate",
            percent_or_zero(totals.start_checkout, totals.add_to_cart),
            "%",
        ),
        KpiMetric::new(
            "Purchase Conversion Rate",
            percent_or_zero(totals.complete_purchase, totals.start_checkout),
            "%",
        ),
        KpiMetric::new("Average Session Duration", avg_session_minutes, "minutes"),
        KpiMetric::new("Average Pages Viewed", avg_pages, "pages"),
        KpiMetric::new("Average Bounce Rate", avg_bounce, "%"),
        KpiMetric::new("Return Visitor Rate", return_rate, "%"),
        KpiMetric::new("Average Order Value", avg_order_value, "TL"),
        KpiMetric::new("Customer Lifetime Value", lifetime_value, "TL"),
        KpiMetric::new("Champions Percentage", champions_share, "%"),
    ])
}
