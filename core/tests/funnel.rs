//! Funnel aggregation: totals, sequential rates, bottleneck.

use chrono::NaiveDate;
use shopfunnel_core::{
    error::AnalysisError,
    funnel::{
        category_funnel, conversion_rates, find_bottleneck, funnel_rows, stage_totals, StageTotals,
    },
    records::FunnelRecord,
    types::FunnelStage,
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn visit(depth: usize, category: &str) -> FunnelRecord {
    FunnelRecord {
        date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        page_view: depth >= 1,
        add_to_cart: depth >= 2,
        start_checkout: depth >= 3,
        complete_purchase: depth >= 4,
        session_id: 1,
        user_id: "user_1000".into(),
        product_id: "prod_100".into(),
        category: category.into(),
        device_type: "Mobile".into(),
        source: "Direct".into(),
    }
}

/// Records whose totals are {view: 1000, cart: 300, checkout: 180, purchase: 144}.
fn reference_records() -> Vec<FunnelRecord> {
    let mut records = Vec::new();
    records.extend((0..144).map(|_| visit(4, "Books")));
    records.extend((0..36).map(|_| visit(3, "Books")));
    records.extend((0..120).map(|_| visit(2, "Apparel")));
    records.extend((0..700).map(|_| visit(1, "Apparel")));
    records
}

fn totals(view: u64, cart: u64, checkout: u64, purchase: u64) -> StageTotals {
    StageTotals {
        page_view: view,
        add_to_cart: cart,
        start_checkout: checkout,
        complete_purchase: purchase,
    }
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn stage_totals_sum_each_flag_in_order() {
    let t = stage_totals(&reference_records()).unwrap();
    assert_eq!(t, totals(1000, 300, 180, 144));

    let order: Vec<FunnelStage> = t.iter().map(|(stage, _)| stage).collect();
    assert_eq!(order, FunnelStage::ALL.to_vec());
}

#[test]
fn reference_funnel_rates_and_bottleneck() {
    let rates = conversion_rates(&totals(1000, 300, 180, 144));

    assert!(close(rates.rate(FunnelStage::AddToCart).unwrap(), 30.0));
    assert!(close(rates.rate(FunnelStage::StartCheckout).unwrap(), 60.0));
    assert!(close(rates.rate(FunnelStage::CompletePurchase).unwrap(), 80.0));

    let bottleneck = find_bottleneck(&rates).unwrap();
    assert_eq!(bottleneck.stage, FunnelStage::AddToCart);
    assert!(close(bottleneck.rate, 30.0));
}

/// Keys are the stage order minus the entry stage.
#[test]
fn rate_keys_skip_entry_stage() {
    let rates = conversion_rates(&totals(10, 5, 2, 1));
    assert_eq!(
        rates.stages(),
        vec![
            FunnelStage::AddToCart,
            FunnelStage::StartCheckout,
            FunnelStage::CompletePurchase
        ]
    );
    assert_eq!(rates.rate(FunnelStage::PageView), None);
}

#[test]
fn rates_stay_within_percent_range_for_monotone_input() {
    for (v, c, k, p) in [(1000, 300, 180, 144), (5, 5, 5, 5), (7, 0, 0, 0), (9, 3, 1, 0)] {
        let rates = conversion_rates(&totals(v, c, k, p));
        for entry in rates.iter() {
            if let Some(rate) = entry.rate {
                assert!(
                    (0.0..=100.0).contains(&rate),
                    "{} rate {rate} out of range",
                    entry.stage
                );
            }
        }
    }
}

#[test]
fn all_equal_rates_pick_first_stage() {
    let rates = conversion_rates(&totals(1000, 500, 250, 125));
    let bottleneck = find_bottleneck(&rates).unwrap();
    assert_eq!(bottleneck.stage, FunnelStage::AddToCart);
    assert!(close(bottleneck.rate, 50.0));
}

#[test]
fn strictly_lowest_rate_wins() {
    // cart 50%, checkout 90%, purchase 20%
    let rates = conversion_rates(&totals(200, 100, 90, 18));
    let bottleneck = find_bottleneck(&rates).unwrap();
    assert_eq!(bottleneck.stage, FunnelStage::CompletePurchase);
    assert!(close(bottleneck.rate, 20.0));
}

/// A zero predecessor makes the rate undefined instead of NaN.
#[test]
fn zero_predecessor_yields_undefined_rate() {
    let rates = conversion_rates(&totals(10, 0, 0, 0));
    assert_eq!(rates.rate(FunnelStage::AddToCart), Some(0.0));
    assert_eq!(rates.rate(FunnelStage::StartCheckout), None);
    assert_eq!(rates.rate(FunnelStage::CompletePurchase), None);

    let bottleneck = find_bottleneck(&rates).unwrap();
    assert_eq!(bottleneck.stage, FunnelStage::AddToCart);
    assert_eq!(bottleneck.rate, 0.0);
}

#[test]
fn no_defined_rate_reports_no_data() {
    let rates = conversion_rates(&StageTotals::default());
    assert!(rates.iter().all(|r| r.rate.is_none()));
    assert!(matches!(
        find_bottleneck(&rates),
        Err(AnalysisError::NoData { .. })
    ));
}

#[test]
fn empty_table_reports_no_data() {
    assert!(matches!(
        stage_totals(&[]),
        Err(AnalysisError::NoData { table: "funnel" })
    ));
    assert!(matches!(
        category_funnel(&[]),
        Err(AnalysisError::NoData { .. })
    ));
}

#[test]
fn funnel_rows_flatten_totals_and_rates() {
    let t = totals(1000, 300, 180, 144);
    let rows = funnel_rows(&t, &conversion_rates(&t));

    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0].stage, FunnelStage::PageView);
    assert_eq!(rows[0].total, 1000);
    assert_eq!(rows[0].rate, None);
    assert_eq!(rows[3].total, 144);
    assert!(close(rows[3].rate.unwrap(), 80.0));
}

#[test]
fn category_funnel_groups_and_sorts_by_name() {
    let rows = category_funnel(&reference_records()).unwrap();
    let names: Vec<&str> = rows.iter().map(|r| r.category.as_str()).collect();
    assert_eq!(names, vec!["Apparel", "Books"]);

    let books = &rows[1];
    assert_eq!(books.page_view, 180);
    assert_eq!(books.complete_purchase, 144);
    assert!(close(books.conversion_rate, 80.0));

    let apparel = &rows[0];
    assert_eq!(apparel.complete_purchase, 0);
    assert_eq!(apparel.conversion_rate, 0.0);
}

#[test]
fn aggregation_does_not_touch_input() {
    let records = reference_records();
    let before = records.clone();
    let first = stage_totals(&records).unwrap();
    let second = stage_totals(&records).unwrap();
    assert_eq!(first, second);
    assert_eq!(records, before);
}
