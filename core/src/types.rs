//! Shared primitive types used across the analysis layer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A percentage in [0, 100] for well-formed input.
pub type Percent = f64;

/// Stable customer identifier as it appears in the RFM table.
pub type CustomerId = String;

/// One step of the purchase funnel.
///
/// Order is fixed: view → cart → checkout → purchase. Conversion rates are
/// always taken against the immediately preceding variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunnelStage {
    PageView,
    AddToCart,
    StartCheckout,
    CompletePurchase,
}

impl FunnelStage {
    pub const ALL: [FunnelStage; 4] = [
        FunnelStage::PageView,
        FunnelStage::AddToCart,
        FunnelStage::StartCheckout,
        FunnelStage::CompletePurchase,
    ];

    /// Column name in the raw funnel table.
    pub fn column(&self) -> &'static str {
        match self {
            Self::PageView => "page_view",
            Self::AddToCart => "add_to_cart",
            Self::StartCheckout => "start_checkout",
            Self::CompletePurchase => "complete_purchase",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::PageView => "View",
            Self::AddToCart => "Cart",
            Self::StartCheckout => "Checkout",
            Self::CompletePurchase => "Purchase",
        }
    }

    /// The stage this one converts from. `None` for the entry stage.
    pub fn previous(&self) -> Option<FunnelStage> {
        match self {
            Self::PageView => None,
            Self::AddToCart => Some(Self::PageView),
            Self::StartCheckout => Some(Self::AddToCart),
            Self::CompletePurchase => Some(Self::StartCheckout),
        }
    }
}

impl fmt::Display for FunnelStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Regrouping granularity for period trends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    /// ISO-8601 week, keyed by ISO year and week number.
    Week,
    /// Calendar month, keyed by year and month.
    Month,
}

/// Key of one period-trend row. Ordering follows the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PeriodKey {
    Week { iso_year: i32, week: u32 },
    Month { year: i32, month: u32 },
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Week { iso_year, week } => write!(f, "{iso_year}-W{week:02}"),
            Self::Month { year, month } => write!(f, "{year}-{month:02}"),
        }
    }
}

impl Serialize for PeriodKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
