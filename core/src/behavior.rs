//! Session behaviour aggregates.

use crate::{
    error::{AnalysisError, AnalysisResult},
    records::{calendar_date, BehaviorRecord},
};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// Session length buckets, in seconds: (0,300], (300,600], (600,1200], (1200,∞).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum SessionLength {
    #[serde(rename = "Short")]
    Short,
    #[serde(rename = "Medium")]
    Medium,
    #[serde(rename = "Long")]
    Long,
    #[serde(rename = "Very Long")]
    VeryLong,
}

impl SessionLength {
    /// `None` for non-positive (or NaN) durations.
    pub fn of(duration_seconds: f64) -> Option<Self> {
        if duration_seconds.is_nan() || duration_seconds <= 0.0 {
            None
        } else if duration_seconds <= 300.0 {
            Some(Self::Short)
        } else if duration_seconds <= 600.0 {
            Some(Self::Medium)
        } else if duration_seconds <= 1200.0 {
            Some(Self::Long)
        } else {
            Some(Self::VeryLong)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummaryRow {
    pub return_visitor: bool,
    pub sessions: usize,
    pub avg_session_duration: f64,
    pub avg_pages_viewed: f64,
    pub avg_bounce_rate: f64,
    pub avg_purchase_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionLengthRow {
    pub session_category: SessionLength,
    pub sessions: usize,
    pub avg_purchase_value: f64,
    /// Share of returning visitors in the bucket, 0..1.
    pub return_visitor_share: f64,
}

/// Per-day session activity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyBehaviorRow {
    #[serde(serialize_with = "calendar_date::serialize")]
    pub date: NaiveDate,
    pub sessions: usize,
    pub avg_session_duration: f64,
    pub avg_pages_viewed: f64,
    pub avg_bounce_rate: f64,
    /// Share of returning visitors that day, 0..1.
    pub return_visitor_share: f64,
    pub total_purchase_value: f64,
}

#[derive(Default)]
struct SessionAccumulator {
    sessions: usize,
    duration: f64,
    pages: f64,
    bounce: f64,
    purchase: f64,
    returning: usize,
}

impl SessionAccumulator {
    fn add(&mut self, record: &BehaviorRecord) {
        self.sessions += 1;
        self.duration += record.session_duration;
        self.pages += f64::from(record.pages_viewed);
        self.bounce += record.bounce_rate;
        self.purchase += record.purchase_value;
        self.returning += usize::from(record.return_visitor);
    }

    fn mean(&self, sum: f64) -> f64 {
        sum / self.sessions as f64
    }

    fn returning_share(&self) -> f64 {
        self.returning as f64 / self.sessions as f64
    }
}

/// Averages split by the returning-visitor flag (new visitors first).
pub fn session_summary(records: &[BehaviorRecord]) -> AnalysisResult<Vec<SessionSummaryRow>> {
    if records.is_empty() {
        return Err(AnalysisError::NoData { table: "behavior" });
    }
    let mut groups: BTreeMap<bool, SessionAccumulator> = BTreeMap::new();
    for record in records {
        groups.entry(record.return_visitor).or_default().add(record);
    }

    Ok(groups
        .into_iter()
        .map(|(return_visitor, acc)| SessionSummaryRow {
            return_visitor,
            sessions: acc.sessions,
            avg_session_duration: acc.mean(acc.duration),
            avg_pages_viewed: acc.mean(acc.pages),
            avg_bounce_rate: acc.mean(acc.bounce),
            avg_purchase_value: acc.mean(acc.purchase),
        })
        .collect())
}

/// Per session-length bucket; buckets without sessions are left out.
pub fn session_length_summary(
    records: &[BehaviorRecord],
) -> AnalysisResult<Vec<SessionLengthRow>> {
    if records.is_empty() {
        return Err(AnalysisError::NoData { table: "behavior" });
    }
    let mut groups: BTreeMap<SessionLength, SessionAccumulator> = BTreeMap::new();
    for record in records {
        if let Some(bucket) = SessionLength::of(record.session_duration) {
            groups.entry(bucket).or_default().add(record);
        }
    }

    Ok(groups
        .into_iter()
        .map(|(session_category, acc)| SessionLengthRow {
            session_category,
            sessions: acc.sessions,
            avg_purchase_value: acc.mean(acc.purchase),
            return_visitor_share: acc.returning_share(),
        })
        .collect())
}

/// Sessions per calendar date, ascending. Purchase value is summed, the
/// other measures are averaged.
pub fn daily_behavior(records: &[BehaviorRecord]) -> AnalysisResult<Vec<DailyBehaviorRow>> {
    if records.is_empty() {
        return Err(AnalysisError::NoData { table: "behavior" });
    }
    let mut days: BTreeMap<NaiveDate, SessionAccumulator> = BTreeMap::new();
    for record in records {
        days.entry(record.date).or_default().add(record);
    }

    Ok(days
        .into_iter()
        .map(|(date, acc)| DailyBehaviorRow {
            date,
            sessions: acc.sessions,
            avg_session_duration: acc.mean(acc.duration),
            avg_pages_viewed: acc.mean(acc.pages),
            avg_bounce_rate: acc.mean(acc.bounce),
            return_visitor_share: acc.returning_share(),
            total_purchase_value: acc.purchase,
        })
        .collect())
}
