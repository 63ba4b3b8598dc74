//! Daily and period (ISO week / month) conversion trends.

use crate::{
    error::{AnalysisError, AnalysisResult},
    funnel::{percent_or_zero, StageTotals},
    records::{calendar_date, FunnelRecord},
    types::{Granularity, PeriodKey, Percent},
};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyTrendRow {
    #[serde(serialize_with = "calendar_date::serialize")]
    pub date: NaiveDate,
    pub page_view: u64,
    pub add_to_cart: u64,
    pub start_checkout: u64,
    pub complete_purchase: u64,
    /// Purchases per view that day; 0 on a day without views.
    pub conversion_rate: Percent,
}

impl DailyTrendRow {
    pub fn totals(&self) -> StageTotals {
        StageTotals {
            page_view: self.page_view,
            add_to_cart: self.add_to_cart,
            start_checkout: self.start_checkout,
            complete_purchase: self.complete_purchase,
        }
    }
}

/// Per-day stage sums with every step's conversion rate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyFunnelRow {
    #[serde(serialize_with = "calendar_date::serialize")]
    pub date: NaiveDate,
    pub page_view: u64,
    pub add_to_cart: u64,
    pub start_checkout: u64,
    pub complete_purchase: u64,
    pub cart_conversion_rate: Percent,
    pub checkout_conversion_rate: Percent,
    pub purchase_conversion_rate: Percent,
    pub overall_conversion_rate: Percent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodTrendRow {
    pub period: PeriodKey,
    pub days: usize,
    pub page_view: u64,
    pub add_to_cart: u64,
    pub start_checkout: u64,
    pub complete_purchase: u64,
    /// Unweighted mean of the daily conversion rates in the period.
    pub mean_conversion_rate: Percent,
}

impl PeriodTrendRow {
    pub fn totals(&self) -> StageTotals {
        StageTotals {
            page_view: self.page_view,
            add_to_cart: self.add_to_cart,
            start_checkout: self.start_checkout,
            complete_purchase: self.complete_purchase,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTrendRow {
    #[serde(serialize_with = "calendar_date::serialize")]
    pub date: NaiveDate,
    pub category: String,
    pub page_view: u64,
    pub complete_purchase: u64,
    pub conversion_rate: Percent,
}

/// Period a date belongs to. Weeks follow ISO-8601, so late-December days
/// can belong to week 1 of the next ISO year and early-January days to
/// week 52/53 of the previous one.
pub fn period_key(date: NaiveDate, granularity: Granularity) -> PeriodKey {
    match granularity {
        Granularity::Week => {
            let iso = date.iso_week();
            PeriodKey::Week {
                iso_year: iso.year(),
                week: iso.week(),
            }
        }
        Granularity::Month => PeriodKey::Month {
            year: date.year(),
            month: date.month(),
        },
    }
}

fn daily_totals(records: &[FunnelRecord]) -> AnalysisResult<BTreeMap<NaiveDate, StageTotals>> {
    if records.is_empty() {
        return Err(AnalysisError::NoData { table: "funnel" });
    }
    let mut days: BTreeMap<NaiveDate, StageTotals> = BTreeMap::new();
    for record in records {
        days.entry(record.date).or_default().add_record(record);
    }
    Ok(days)
}

/// Stage sums and conversion rate per calendar date, ascending.
pub fn daily_trend(records: &[FunnelRecord]) -> AnalysisResult<Vec<DailyTrendRow>> {
    Ok(daily_totals(records)?
        .into_iter()
        .map(|(date, totals)| DailyTrendRow {
            date,
            page_view: totals.page_view,
            add_to_cart: totals.add_to_cart,
            start_checkout: totals.start_checkout,
            complete_purchase: totals.complete_purchase,
            conversion_rate: totals.overall_conversion(),
        })
        .collect())
}

/// Per-day funnel with step rates against the previous stage and the overall
/// purchase / view rate. A day whose predecessor total is zero gets 0.
pub fn daily_funnel(records: &[FunnelRecord]) -> AnalysisResult<Vec<DailyFunnelRow>> {
    Ok(daily_totals(records)?
        .into_iter()
        .map(|(date, t)| DailyFunnelRow {
            date,
            page_view: t.page_view,
            add_to_cart: t.add_to_cart,
            start_checkout: t.start_checkout,
            complete_purchase: t.complete_purchase,
            cart_conversion_rate: percent_or_zero(t.add_to_cart, t.page_view),
            checkout_conversion_rate: percent_or_zero(t.start_checkout, t.add_to_cart),
            purchase_conversion_rate: percent_or_zero(t.complete_purchase, t.start_checkout),
            overall_conversion_rate: t.overall_conversion(),
        })
        .collect())
}

#[derive(Default)]
struct PeriodAccumulator {
    totals: StageTotals,
    days: usize,
    rate_sum: f64,
}

/// Regroup daily rows into weeks or months, in calendar order.
pub fn period_trend(
    daily: &[DailyTrendRow],
    granularity: Granularity,
) -> AnalysisResult<Vec<PeriodTrendRow>> {
    if daily.is_empty() {
        return Err(AnalysisError::NoData { table: "daily_trend" });
    }
    let mut periods: BTreeMap<PeriodKey, PeriodAccumulator> = BTreeMap::new();
    for row in daily {
        let acc = periods.entry(period_key(row.date, granularity)).or_default();
        acc.totals.merge(&row.totals());
        acc.days += 1;
        acc.rate_sum += row.conversion_rate;
    }

    Ok(periods
        .into_iter()
        .map(|(period, acc)| PeriodTrendRow {
            period,
            days: acc.days,
            page_view: acc.totals.page_view,
            add_to_cart: acc.totals.add_to_cart,
            start_checkout: acc.totals.start_checkout,
            complete_purchase: acc.totals.complete_purchase,
            mean_conversion_rate: acc.rate_sum / acc.days as f64,
        })
        .collect())
}

/// Views, purchases and conversion per (date, category).
pub fn category_trend(records: &[FunnelRecord]) -> AnalysisResult<Vec<CategoryTrendRow>> {
    if records.is_empty() {
        return Err(AnalysisError::NoData { table: "funnel" });
    }
    let mut groups: BTreeMap<(NaiveDate, &str), (u64, u64)> = BTreeMap::new();
    for record in records {
        let entry = groups
            .entry((record.date, record.category.as_str()))
            .or_default();
        entry.0 += u64::from(record.page_view);
        entry.1 += u64::from(record.complete_purchase);
    }

    Ok(groups
        .into_iter()
        .map(|((date, category), (page_view, complete_purchase))| CategoryTrendRow {
            date,
            category: category.to_string(),
            page_view,
            complete_purchase,
            conversion_rate: percent_or_zero(complete_purchase, page_view),
        })
        .collect())
}
