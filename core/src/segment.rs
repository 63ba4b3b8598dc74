//! Fixed-threshold customer segments.
//!
//! Assignment looks at raw recency / frequency / monetary values, never at
//! quartile scores, and is evaluated once when a record is created.
//! Thresholds are checked in priority order; the first match wins.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const CHAMPION_MAX_RECENCY: u32 = 30;
pub const CHAMPION_MIN_FREQUENCY: u32 = 3;
pub const CHAMPION_MIN_MONETARY: f64 = 200.0;
pub const LOYAL_MAX_RECENCY: u32 = 60;
pub const LOYAL_MIN_FREQUENCY: u32 = 2;
pub const AT_RISK_MAX_RECENCY: u32 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Segment {
    #[serde(rename = "Champions")]
    Champions,
    #[serde(rename = "Loyal Customers")]
    LoyalCustomers,
    #[serde(rename = "At Risk")]
    AtRisk,
    #[serde(rename = "Lost")]
    Lost,
}

impl Segment {
    pub const ALL: [Segment; 4] = [
        Segment::Champions,
        Segment::LoyalCustomers,
        Segment::AtRisk,
        Segment::Lost,
    ];

    pub fn classify(recency_days: u32, frequency: u32, monetary: f64) -> Self {
        if recency_days <= CHAMPION_MAX_RECENCY
            && frequency >= CHAMPION_MIN_FREQUENCY
            && monetary >= CHAMPION_MIN_MONETARY
        {
            Self::Champions
        } else if recency_days <= LOYAL_MAX_RECENCY && frequency >= LOYAL_MIN_FREQUENCY {
            Self::LoyalCustomers
        } else if recency_days <= AT_RISK_MAX_RECENCY {
            Self::AtRisk
        } else {
            Self::Lost
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Champions => "Champions",
            Self::LoyalCustomers => "Loyal Customers",
            Self::AtRisk => "At Risk",
            Self::Lost => "Lost",
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Segment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|seg| seg.label() == s.trim())
            .ok_or_else(|| anyhow::anyhow!("Unknown segment label: {s}"))
    }
}
