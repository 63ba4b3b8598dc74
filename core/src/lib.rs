//! Funnel, RFM and trend analysis for e-commerce sales data.
//!
//! Raw tables are loaded (or generated), folded by the aggregators into
//! typed summaries, then exported as flat CSV rows and a summary report.

pub mod behavior;
pub mod config;
pub mod error;
pub mod export;
pub mod funnel;
pub mod generator;
pub mod kpi;
pub mod loader;
pub mod pipeline;
pub mod records;
pub mod report;
pub mod rfm;
pub mod rng;
pub mod sales;
pub mod segment;
pub mod trend;
pub mod types;
