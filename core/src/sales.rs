//! Order-ledger aggregates.

use crate::{
    error::{AnalysisError, AnalysisResult},
    records::SalesRecord,
    types::Percent,
};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySalesRow {
    pub category: String,
    pub orders: usize,
    pub units: u64,
    pub revenue: f64,
    pub avg_order_value: f64,
    pub avg_rating: f64,
    /// Returned orders over all orders in the category.
    pub return_rate: Percent,
}

#[derive(Default)]
struct CategoryAccumulator {
    orders: usize,
    units: u64,
    revenue: f64,
    rating: u64,
    returned: usize,
}

/// Per-category order volume, revenue, rating and returns, highest revenue
/// first (ties by category name).
pub fn category_sales(records: &[SalesRecord]) -> AnalysisResult<Vec<CategorySalesRow>> {
    if records.is_empty() {
        return Err(AnalysisError::NoData { table: "sales" });
    }
    let mut groups: BTreeMap<&str, CategoryAccumulator> = BTreeMap::new();
    for record in records {
        let acc = groups.entry(record.category.as_str()).or_default();
        acc.orders += 1;
        acc.units += u64::from(record.quantity);
        acc.revenue += record.total_amount;
        acc.rating += u64::from(record.rating);
        acc.returned += usize::from(record.is_returned);
    }

    let mut rows: Vec<CategorySalesRow> = groups
        .into_iter()
        .map(|(category, acc)| {
            let n = acc.orders as f64;
            CategorySalesRow {
                category: category.to_string(),
                orders: acc.orders,
                units: acc.units,
                revenue: acc.revenue,
                avg_order_value: acc.revenue / n,
                avg_rating: acc.rating as f64 / n,
                return_rate: acc.returned as f64 / n * 100.0,
            }
        })
        .collect();
    // Stable sort keeps the alphabetical order among equal revenues.
    rows.sort_by(|a, b| b.revenue.total_cmp(&a.revenue));
    Ok(rows)
}
