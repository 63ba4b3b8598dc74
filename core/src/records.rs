//! Row types of the four raw tables.
//!
//! Field order matches the column order of the CSV files so that writing
//! a table and reading it back yields the same header.

use crate::types::{CustomerId, FunnelStage};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One visit/session and how far it progressed through the funnel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunnelRecord {
    #[serde(with = "calendar_date")]
    pub date: NaiveDate,
    #[serde(with = "flag")]
    pub page_view: bool,
    #[serde(with = "flag")]
    pub add_to_cart: bool,
    #[serde(with = "flag")]
    pub start_checkout: bool,
    #[serde(with = "flag")]
    pub complete_purchase: bool,
    pub session_id: u64,
    pub user_id: String,
    pub product_id: String,
    pub category: String,
    pub device_type: String,
    pub source: String,
}

impl FunnelRecord {
    pub fn reached(&self, stage: FunnelStage) -> bool {
        match stage {
            FunnelStage::PageView => self.page_view,
            FunnelStage::AddToCart => self.add_to_cart,
            FunnelStage::StartCheckout => self.start_checkout,
            FunnelStage::CompletePurchase => self.complete_purchase,
        }
    }
}

/// One customer's recency / frequency / monetary profile.
///
/// `segment` is assigned once when the record is created and is carried
/// verbatim; labels outside the fixed set are legal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RfmRecord {
    pub customer_id: CustomerId,
    pub recency_days: u32,
    pub frequency: u32,
    pub monetary: f64,
    pub segment: String,
    #[serde(with = "calendar_date")]
    pub last_purchase_date: NaiveDate,
}

/// One browsing session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviorRecord {
    pub session_id: String,
    pub user_id: String,
    /// Seconds.
    pub session_duration: f64,
    pub pages_viewed: u32,
    /// Fraction in [0, 1].
    pub bounce_rate: f64,
    #[serde(with = "flag")]
    pub return_visitor: bool,
    pub purchase_value: f64,
    #[serde(with = "calendar_date")]
    pub date: NaiveDate,
}

/// One order line of the sales ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub order_id: u64,
    pub customer_id: u32,
    pub product_id: u32,
    pub product_name: String,
    pub category: String,
    #[serde(with = "calendar_date")]
    pub order_date: NaiveDate,
    pub quantity: u32,
    pub unit_price: f64,
    /// `unit_price * quantity`, rounded to cents.
    pub total_amount: f64,
    pub payment_method: String,
    pub customer_city: String,
    pub customer_age: u32,
    pub customer_gender: String,
    #[serde(with = "flag")]
    pub is_returned: bool,
    /// 1..=5 stars.
    pub rating: u8,
}

/// Boolean-like columns: written as 0/1, read from 0/1, 0.0/1.0 or true/false.
pub(crate) mod flag {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| de::Error::custom(format!("not a flag value: {raw:?}")))
    }

    pub(crate) fn parse(raw: &str) -> Option<bool> {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("true") {
            return Some(true);
        }
        if trimmed.eq_ignore_ascii_case("false") {
            return Some(false);
        }
        match trimmed.parse::<f64>() {
            Ok(v) if v == 0.0 => Some(false),
            Ok(v) if v == 1.0 => Some(true),
            _ => None,
        }
    }
}

/// Calendar dates: written as YYYY-MM-DD, read from YYYY-MM-DD with an
/// optional trailing time part ("2024-01-01 00:00:00").
pub(crate) mod calendar_date {
    use chrono::NaiveDate;
    use serde::{de, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| de::Error::custom(format!("not a date: {raw:?}")))
    }

    pub(crate) fn parse(raw: &str) -> Option<NaiveDate> {
        let day = raw.trim().get(..10)?;
        NaiveDate::parse_from_str(day, FORMAT).ok()
    }
}
