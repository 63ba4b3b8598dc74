//! Funnel aggregation: stage totals, sequential conversion, bottleneck.
//!
//! Every function here is a pure fold over a borrowed table. Rates are
//! percentages taken against the immediately preceding stage; a zero
//! predecessor makes the rate undefined (`None`) instead of NaN.

use crate::{
    error::{AnalysisError, AnalysisResult},
    records::FunnelRecord,
    types::{FunnelStage, Percent},
};
use serde::Serialize;
use std::collections::BTreeMap;

/// `100 * numerator / denominator`, or `None` when the denominator is zero.
pub fn percent(numerator: u64, denominator: u64) -> Option<Percent> {
    (denominator > 0).then(|| numerator as f64 / denominator as f64 * 100.0)
}

/// Same as [`percent`], with 0/0 (and n/0) resolved to 0.
pub fn percent_or_zero(numerator: u64, denominator: u64) -> Percent {
    percent(numerator, denominator).unwrap_or(0.0)
}

// ── Public types ─────────────────────────────────────────────────────────────

/// Summed stage flags, one field per stage in funnel order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StageTotals {
    pub page_view: u64,
    pub add_to_cart: u64,
    pub start_checkout: u64,
    pub complete_purchase: u64,
}

impl StageTotals {
    pub fn get(&self, stage: FunnelStage) -> u64 {
        match stage {
            FunnelStage::PageView => self.page_view,
            FunnelStage::AddToCart => self.add_to_cart,
            FunnelStage::StartCheckout => self.start_checkout,
            FunnelStage::CompletePurchase => self.complete_purchase,
        }
    }

    /// Stage totals in funnel order.
    pub fn iter(&self) -> impl Iterator<Item = (FunnelStage, u64)> + '_ {
        FunnelStage::ALL.into_iter().map(move |stage| (stage, self.get(stage)))
    }

    pub fn add_record(&mut self, record: &FunnelRecord) {
        self.page_view += u64::from(record.page_view);
        self.add_to_cart += u64::from(record.add_to_cart);
        self.start_checkout += u64::from(record.start_checkout);
        self.complete_purchase += u64::from(record.complete_purchase);
    }

    pub fn merge(&mut self, other: &StageTotals) {
        self.page_view += other.page_view;
        self.add_to_cart += other.add_to_cart;
        self.start_checkout += other.start_checkout;
        self.complete_purchase += other.complete_purchase;
    }

    /// Purchases per view, in percent; 0 when nothing was viewed.
    pub fn overall_conversion(&self) -> Percent {
        percent_or_zero(self.complete_purchase, self.page_view)
    }
}

/// Conversion rate of one stage from its predecessor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StageRate {
    pub stage: FunnelStage,
    /// `None` when the previous stage total is zero.
    pub rate: Option<Percent>,
}

/// Rates for every stage after the first, in funnel order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionRates {
    rates: Vec<StageRate>,
}

impl ConversionRates {
    /// Rate for `stage`; `None` for the entry stage or an undefined rate.
    pub fn rate(&self, stage: FunnelStage) -> Option<Percent> {
        self.rates
            .iter()
            .find(|r| r.stage == stage)
            .and_then(|r| r.rate)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StageRate> {
        self.rates.iter()
    }

    pub fn stages(&self) -> Vec<FunnelStage> {
        self.rates.iter().map(|r| r.stage).collect()
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

/// The weakest step of the funnel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bottleneck {
    pub stage: FunnelStage,
    pub rate: Percent,
}

/// Flat `(stage, total, rate)` row for downstream tables.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunnelRow {
    pub stage: FunnelStage,
    pub total: u64,
    pub rate: Option<Percent>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryFunnelRow {
    pub category: String,
    pub page_view: u64,
    pub add_to_cart: u64,
    pub start_checkout: u64,
    pub complete_purchase: u64,
    pub conversion_rate: Percent,
}

// ── Aggregations ─────────────────────────────────────────────────────────────

pub fn stage_totals(records: &[FunnelRecord]) -> AnalysisResult<StageTotals> {
    if records.is_empty() {
        return Err(AnalysisError::NoData { table: "funnel" });
    }
    let mut totals = StageTotals::default();
    for record in records {
        totals.add_record(record);
    }
    Ok(totals)
}

pub fn conversion_rates(totals: &StageTotals) -> ConversionRates {
    let rates = FunnelStage::ALL
        .into_iter()
        .filter_map(|stage| {
            let previous = stage.previous()?;
            Some(StageRate {
                stage,
                rate: percent(totals.get(stage), totals.get(previous)),
            })
        })
        .collect();
    ConversionRates { rates }
}

/// Stage with the lowest defined rate. Ties go to the earliest stage.
pub fn find_bottleneck(rates: &ConversionRates) -> AnalysisResult<Bottleneck> {
    let mut best: Option<Bottleneck> = None;
    for entry in rates.iter() {
        let Some(rate) = entry.rate else { continue };
        match best {
            Some(current) if rate >= current.rate => {}
            _ => {
                best = Some(Bottleneck {
                    stage: entry.stage,
                    rate,
                })
            }
        }
    }
    best.ok_or(AnalysisError::NoData {
        table: "conversion_rates",
    })
}

pub fn funnel_rows(totals: &StageTotals, rates: &ConversionRates) -> Vec<FunnelRow> {
    totals
        .iter()
        .map(|(stage, total)| FunnelRow {
            stage,
            total,
            rate: rates.rate(stage),
        })
        .collect()
}

pub fn overall_conversion(totals: &StageTotals) -> Percent {
    totals.overall_conversion()
}

/// Per-category stage sums, sorted by category name.
pub fn category_funnel(records: &[FunnelRecord]) -> AnalysisResult<Vec<CategoryFunnelRow>> {
    if records.is_empty() {
        return Err(AnalysisError::NoData { table: "funnel" });
    }
    let mut groups: BTreeMap<&str, StageTotals> = BTreeMap::new();
    for record in records {
        groups
            .entry(record.category.as_str())
            .or_default()
            .add_record(record);
    }

    Ok(groups
        .into_iter()
        .map(|(category, totals)| CategoryFunnelRow {
            category: category.to_string(),
            page_view: totals.page_view,
            add_to_cart: totals.add_to_cart,
            start_checkout: totals.start_checkout,
            complete_purchase: totals.complete_purchase,
            conversion_rate: totals.overall_conversion(),
        })
        .collect())
}
