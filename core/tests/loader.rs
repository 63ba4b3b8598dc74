//! CSV round trips through the loader and the exporters.

use chrono::NaiveDate;
use shopfunnel_core::{
    config::AnalysisConfig,
    error::AnalysisError,
    export::{write_processed, write_raw},
    generator::generate,
    loader::{
        load_behavior, load_funnel, load_processed, load_raw, load_rfm, load_sales, DataPaths,
    },
    pipeline::process,
};
use std::fs;
use tempfile::TempDir;

// ── Helpers ──────────────────────────────────────────────────────────────────

fn temp_paths() -> (TempDir, DataPaths) {
    let dir = tempfile::tempdir().unwrap();
    let paths = DataPaths::new(dir.path().join("raw"), dir.path().join("processed"));
    (dir, paths)
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn raw_tables_survive_a_round_trip() {
    let (_dir, paths) = temp_paths();
    let raw = generate(&AnalysisConfig::default_test().generation).unwrap();

    write_raw(&paths, &raw).unwrap();
    let loaded = load_raw(&paths).unwrap();

    assert_eq!(loaded.funnel, raw.funnel);
    assert_eq!(loaded.rfm, raw.rfm);
    assert_eq!(loaded.behavior, raw.behavior);
    assert_eq!(loaded.sales, raw.sales);
    assert_eq!(loaded.describe(), raw.describe());
}

#[test]
fn funnel_reader_accepts_timestamps_and_float_flags() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("funnel_data.csv");
    fs::write(
        &path,
        "date,page_view,add_to_cart,start_checkout,complete_purchase,session_id,user_id,product_id,category,device_type,source\n\
         2024-01-01 00:00:00,1.0,1.0,0.0,0.0,1,user_1001,prod_101,Books,Mobile,Google\n\
         2024-01-02,1,true,true,false,2,user_1002,prod_102,Sports,Desktop,Direct\n",
    )
    .unwrap();

    let rows = load_funnel(&path).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    assert!(rows[0].add_to_cart);
    assert!(!rows[0].start_checkout);
    assert!(rows[1].start_checkout);
    assert_eq!(rows[1].category, "Sports");
}

#[test]
fn rfm_and_behavior_readers_parse_their_columns() {
    let dir = tempfile::tempdir().unwrap();
    let rfm_path = dir.path().join("rfm_data.csv");
    let behavior_path = dir.path().join("user_behavior.csv");
    fs::write(
        &rfm_path,
        "customer_id,recency_days,frequency,monetary,segment,last_purchase_date\n\
         customer_1,12,5,640.5,Champions,2024-12-19 00:00:00\n\
         customer_2,200,1,15.0,VIP,2024-06-14\n",
    )
    .unwrap();
    fs::write(
        &behavior_path,
        "session_id,user_id,session_duration,pages_viewed,bounce_rate,return_visitor,purchase_value,date\n\
         session_1,user_4321,312.75,9,0.18,1,120.4,2024-03-05\n",
    )
    .unwrap();

    let rfm = load_rfm(&rfm_path).unwrap();
    assert_eq!(rfm[0].frequency, 5);
    // Unknown labels are carried verbatim.
    assert_eq!(rfm[1].segment, "VIP");

    let behavior = load_behavior(&behavior_path).unwrap();
    assert_eq!(behavior[0].pages_viewed, 9);
    assert!(behavior[0].return_visitor);
    assert_eq!(behavior[0].session_duration, 312.75);
}

#[test]
fn sales_reader_parses_the_order_ledger() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ecommerce_sales.csv");
    fs::write(
        &path,
        "order_id,customer_id,product_id,product_name,category,order_date,quantity,unit_price,total_amount,payment_method,customer_city,customer_age,customer_gender,is_returned,rating\n\
         1,512,17,Yoga Mat,Sports,2023-07-14 00:00:00,3,120.5,361.5,Credit Card,Izmir,34,Female,0,4\n\
         2,233,88,Novel,Books,2023-02-01,1,45.0,45.0,Cash on Delivery,Konya,61,Male,1,2\n",
    )
    .unwrap();

    let rows = load_sales(&path).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].order_date, NaiveDate::from_ymd_opt(2023, 7, 14).unwrap());
    assert_eq!(rows[0].quantity, 3);
    assert_eq!(rows[0].total_amount, 361.5);
    assert!(!rows[0].is_returned);
    assert!(rows[1].is_returned);
    assert_eq!(rows[1].payment_method, "Cash on Delivery");
}

#[test]
fn missing_raw_file_is_a_csv_error() {
    let (_dir, paths) = temp_paths();
    let err = load_raw(&paths).unwrap_err();
    assert!(matches!(err, AnalysisError::Csv(_)), "got {err:?}");
}

#[test]
fn malformed_flag_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("funnel_data.csv");
    fs::write(
        &path,
        "date,page_view,add_to_cart,start_checkout,complete_purchase,session_id,user_id,product_id,category,device_type,source\n\
         2024-01-01,yes,0,0,0,1,user_1001,prod_101,Books,Mobile,Google\n",
    )
    .unwrap();
    assert!(matches!(load_funnel(&path), Err(AnalysisError::Csv(_))));
}

#[test]
fn processed_tables_load_back_by_name() {
    let (_dir, paths) = temp_paths();
    let raw = generate(&AnalysisConfig::default_test().generation).unwrap();
    let out = process(&raw).unwrap();

    let written = write_processed(&paths, &out).unwrap();
    assert_eq!(written.len(), 15);

    let tables = load_processed(&paths.processed_dir).unwrap();
    assert_eq!(tables.len(), 15);

    let stages = &tables["funnel_stages"];
    assert_eq!(stages.headers, vec!["stage", "total", "rate"]);
    assert_eq!(
        stages.column("stage").unwrap(),
        vec!["page_view", "add_to_cart", "start_checkout", "complete_purchase"]
    );
    // The entry stage has no predecessor.
    assert_eq!(stages.column("rate").unwrap()[0], "");

    let daily_funnel = &tables["daily_funnel_summary"];
    assert_eq!(
        daily_funnel.headers,
        vec![
            "date",
            "page_view",
            "add_to_cart",
            "start_checkout",
            "complete_purchase",
            "cart_conversion_rate",
            "checkout_conversion_rate",
            "purchase_conversion_rate",
            "overall_conversion_rate",
        ]
    );
    assert_eq!(daily_funnel.rows.len(), tables["daily_trend"].rows.len());
    assert_eq!(tables["daily_behavior_summary"].column("date").unwrap()[0].len(), 10);
    assert!(!tables["category_sales_summary"].rows.is_empty());

    let kpis = &tables["kpi_dashboard"];
    assert_eq!(kpis.rows.len(), 15);
    assert_eq!(kpis.column("metric").unwrap()[0], "Total Page Views");

    let scored = &tables["rfm_scored"];
    assert_eq!(scored.rows.len(), raw.rfm.len());
    assert!(scored.column("rfm_score").unwrap().iter().all(|s| s.len() == 3));
    assert!(tables["daily_trend"].column("missing").is_none());
}
