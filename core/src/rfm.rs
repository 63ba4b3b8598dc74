//! RFM quartile scoring and segment summaries.
//!
//! Quartile edges are recomputed from the records passed to each call, so
//! one raw value can score differently against different subsets. The
//! fixed-threshold segment labels carried on each record are a separate
//! scheme (see `segment`) and are never reconciled with these scores.

use crate::{
    error::{AnalysisError, AnalysisResult},
    records::RfmRecord,
    types::Percent,
};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RfmField {
    Recency,
    Frequency,
    Monetary,
}

impl RfmField {
    pub fn value(&self, record: &RfmRecord) -> f64 {
        match self {
            Self::Recency => f64::from(record.recency_days),
            Self::Frequency => f64::from(record.frequency),
            Self::Monetary => record.monetary,
        }
    }

    /// Recency scores in reverse: the most recent customers get 4.
    pub fn reversed(&self) -> bool {
        matches!(self, Self::Recency)
    }
}

// ── Quartiles ────────────────────────────────────────────────────────────────

/// The 0/25/50/75/100% quantiles of `values`, interpolating linearly
/// between order statistics. `values` must be non-empty.
pub fn quartile_edges(values: &[f64]) -> [f64; 5] {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let last = sorted.len() - 1;

    let mut edges = [0.0; 5];
    for (i, edge) in edges.iter_mut().enumerate() {
        let position = last as f64 * i as f64 / 4.0;
        let lo = position.floor() as usize;
        let hi = (lo + 1).min(last);
        let frac = position - lo as f64;
        *edge = sorted[lo] + (sorted[hi] - sorted[lo]) * frac;
    }
    edges
}

/// 0-based bucket of `value`: buckets are right-closed and the first one
/// also holds the minimum. Repeated edges leave the upper bucket empty.
fn bucket(edges: &[f64; 5], value: f64) -> u8 {
    edges[1..4].iter().filter(|&&edge| value > edge).count() as u8
}

/// Quartile label 1–4 for every record, in input order.
pub fn score_quartiles(records: &[RfmRecord], field: RfmField) -> AnalysisResult<Vec<u8>> {
    if records.is_empty() {
        return Err(AnalysisError::NoData { table: "rfm" });
    }
    let values: Vec<f64> = records.iter().map(|r| field.value(r)).collect();
    let edges = quartile_edges(&values);
    log::debug!("rfm: {field:?} quartile edges {edges:?}");

    Ok(values
        .iter()
        .map(|&v| {
            let b = bucket(&edges, v);
            if field.reversed() {
                4 - b
            } else {
                b + 1
            }
        })
        .collect())
}

// ── Scores ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RfmScore {
    pub r: u8,
    pub f: u8,
    pub m: u8,
}

impl RfmScore {
    /// R, F and M digits concatenated, e.g. "412". A grouping key only.
    pub fn combined(&self) -> String {
        format!("{}{}{}", self.r, self.f, self.m)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCustomer {
    pub record: RfmRecord,
    pub score: RfmScore,
}

/// Flat row of the scored table: the raw record plus its scores.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredRow<'a> {
    pub customer_id: &'a str,
    pub recency_days: u32,
    pub frequency: u32,
    pub monetary: f64,
    pub segment: &'a str,
    pub r_score: u8,
    pub f_score: u8,
    pub m_score: u8,
    pub rfm_score: String,
}

impl ScoredCustomer {
    pub fn combined_score(&self) -> String {
        self.score.combined()
    }

    pub fn row(&self) -> ScoredRow<'_> {
        ScoredRow {
            customer_id: &self.record.customer_id,
            recency_days: self.record.recency_days,
            frequency: self.record.frequency,
            monetary: self.record.monetary,
            segment: &self.record.segment,
            r_score: self.score.r,
            f_score: self.score.f,
            m_score: self.score.m,
            rfm_score: self.combined_score(),
        }
    }
}

pub fn combined_score(customer: &ScoredCustomer) -> String {
    customer.combined_score()
}

/// Pair each record with its R, F and M quartile scores.
pub fn score_customers(records: &[RfmRecord]) -> AnalysisResult<Vec<ScoredCustomer>> {
    let r = score_quartiles(records, RfmField::Recency)?;
    let f = score_quartiles(records, RfmField::Frequency)?;
    let m = score_quartiles(records, RfmField::Monetary)?;

    Ok(records
        .iter()
        .enumerate()
        .map(|(i, record)| ScoredCustomer {
            record: record.clone(),
            score: RfmScore {
                r: r[i],
                f: f[i],
                m: m[i],
            },
        })
        .collect())
}

// ── Summaries ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentSummary {
    pub segment: String,
    pub customer_count: usize,
    pub avg_recency: f64,
    pub avg_frequency: f64,
    pub avg_monetary: f64,
    pub total_monetary: f64,
    pub percentage: Percent,
}

#[derive(Default)]
struct SegmentAccumulator {
    count: usize,
    recency: f64,
    frequency: f64,
    monetary: f64,
}

/// Per-label summary, sorted by label. Labels outside the fixed segment
/// set are kept verbatim as their own group.
pub fn segment_summary(records: &[RfmRecord]) -> AnalysisResult<Vec<SegmentSummary>> {
    if records.is_empty() {
        return Err(AnalysisError::NoData { table: "rfm" });
    }
    let mut groups: BTreeMap<&str, SegmentAccumulator> = BTreeMap::new();
    for record in records {
        let acc = groups.entry(record.segment.as_str()).or_default();
        acc.count += 1;
        acc.recency += f64::from(record.recency_days);
        acc.frequency += f64::from(record.frequency);
        acc.monetary += record.monetary;
    }

    let total = records.len() as f64;
    Ok(groups
        .into_iter()
        .map(|(segment, acc)| {
            let n = acc.count as f64;
            SegmentSummary {
                segment: segment.to_string(),
                customer_count: acc.count,
                avg_recency: acc.recency / n,
                avg_frequency: acc.frequency / n,
                avg_monetary: acc.monetary / n,
                total_monetary: acc.monetary,
                percentage: n / total * 100.0,
            }
        })
        .collect())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreSummary {
    pub rfm_score: String,
    pub customer_count: usize,
    pub total_monetary: f64,
}

/// Customer count and monetary sum per composite score, sorted by score.
pub fn score_summary(scored: &[ScoredCustomer]) -> Vec<ScoreSummary> {
    let mut groups: BTreeMap<String, (usize, f64)> = BTreeMap::new();
    for customer in scored {
        let entry = groups.entry(customer.combined_score()).or_default();
        entry.0 += 1;
        entry.1 += customer.record.monetary;
    }
    groups
        .into_iter()
        .map(|(rfm_score, (customer_count, total_monetary))| ScoreSummary {
            rfm_score,
            customer_count,
            total_monetary,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_interpolate_between_order_statistics() {
        let edges = quartile_edges(&[4.0, 1.0, 3.0, 2.0, 5.0]);
        assert_eq!(edges, [1.0, 2.0, 3.0, 4.0, 5.0]);

        let edges = quartile_edges(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(edges, [1.0, 1.75, 2.5, 3.25, 4.0]);
    }

    #[test]
    fn buckets_are_right_closed() {
        let edges = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(bucket(&edges, 1.0), 0);
        assert_eq!(bucket(&edges, 2.0), 0);
        assert_eq!(bucket(&edges, 2.5), 1);
        assert_eq!(bucket(&edges, 4.0), 2);
        assert_eq!(bucket(&edges, 5.0), 3);
    }
}
