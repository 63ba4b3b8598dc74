//! Per-category order summary.

use chrono::NaiveDate;
use shopfunnel_core::{error::AnalysisError, records::SalesRecord, sales::category_sales};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn order(id: u64, category: &str, quantity: u32, total: f64, rating: u8, returned: bool) -> SalesRecord {
    SalesRecord {
        order_id: id,
        customer_id: 100 + id as u32,
        product_id: 1,
        product_name: "Item".into(),
        category: category.into(),
        order_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        quantity,
        unit_price: total / f64::from(quantity),
        total_amount: total,
        payment_method: "Credit Card".into(),
        customer_city: "Ankara".into(),
        customer_age: 30,
        customer_gender: "Female".into(),
        is_returned: returned,
        rating,
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn categories_are_ranked_by_revenue() {
    let records = vec![
        order(1, "Books", 2, 40.0, 5, false),
        order(2, "Electronics", 1, 1500.0, 4, true),
        order(3, "Books", 1, 20.0, 3, false),
        order(4, "Electronics", 2, 500.0, 2, false),
    ];
    let rows = category_sales(&records).unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].category, "Electronics");
    assert_eq!(rows[0].orders, 2);
    assert_eq!(rows[0].units, 3);
    assert_eq!(rows[0].revenue, 2000.0);
    assert_eq!(rows[0].avg_order_value, 1000.0);
    assert_eq!(rows[0].avg_rating, 3.0);
    assert_eq!(rows[0].return_rate, 50.0);

    assert_eq!(rows[1].category, "Books");
    assert_eq!(rows[1].revenue, 60.0);
    assert_eq!(rows[1].avg_rating, 4.0);
    assert_eq!(rows[1].return_rate, 0.0);
}

#[test]
fn equal_revenue_keeps_name_order() {
    let records = vec![
        order(1, "Sports", 1, 100.0, 4, false),
        order(2, "Apparel", 1, 100.0, 4, false),
    ];
    let rows = category_sales(&records).unwrap();
    let names: Vec<&str> = rows.iter().map(|r| r.category.as_str()).collect();
    assert_eq!(names, vec!["Apparel", "Sports"]);
}

#[test]
fn empty_ledger_is_no_data() {
    assert!(matches!(
        category_sales(&[]),
        Err(AnalysisError::NoData { table: "sales" })
    ));
}
