//! Flat-file access: raw tables in, generic processed tables back.
//!
//! RULE: only loader.rs and export.rs touch the filesystem.
//! Aggregators work on the in-memory tables returned here.

use crate::{
    config::PathConfig,
    error::AnalysisResult,
    records::{BehaviorRecord, FunnelRecord, RfmRecord, SalesRecord},
};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const FUNNEL_FILE: &str = "funnel_data.csv";
pub const RFM_FILE: &str = "rfm_data.csv";
pub const BEHAVIOR_FILE: &str = "user_behavior.csv";
pub const SALES_FILE: &str = "ecommerce_sales.csv";

const FUNNEL_COLUMNS: usize = 11;
const RFM_COLUMNS: usize = 6;
const BEHAVIOR_COLUMNS: usize = 8;
const SALES_COLUMNS: usize = 15;

/// Fixed relative locations of the raw and processed tables.
#[derive(Debug, Clone)]
pub struct DataPaths {
    pub raw_dir: PathBuf,
    pub processed_dir: PathBuf,
}

impl DataPaths {
    pub fn new(raw_dir: impl Into<PathBuf>, processed_dir: impl Into<PathBuf>) -> Self {
        Self {
            raw_dir: raw_dir.into(),
            processed_dir: processed_dir.into(),
        }
    }

    pub fn from_config(paths: &PathConfig) -> Self {
        Self::new(&paths.raw_dir, &paths.processed_dir)
    }

    pub fn funnel(&self) -> PathBuf {
        self.raw_dir.join(FUNNEL_FILE)
    }

    pub fn rfm(&self) -> PathBuf {
        self.raw_dir.join(RFM_FILE)
    }

    pub fn behavior(&self) -> PathBuf {
        self.raw_dir.join(BEHAVIOR_FILE)
    }

    pub fn sales(&self) -> PathBuf {
        self.raw_dir.join(SALES_FILE)
    }

    pub fn processed(&self, file_name: &str) -> PathBuf {
        self.processed_dir.join(file_name)
    }
}

/// The four raw tables, fully materialized.
#[derive(Debug, Clone, Default)]
pub struct RawData {
    pub funnel: Vec<FunnelRecord>,
    pub rfm: Vec<RfmRecord>,
    pub behavior: Vec<BehaviorRecord>,
    pub sales: Vec<SalesRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableInfo {
    pub name: &'static str,
    pub rows: usize,
    pub columns: usize,
}

impl RawData {
    pub fn describe(&self) -> Vec<TableInfo> {
        vec![
            TableInfo {
                name: "funnel",
                rows: self.funnel.len(),
                columns: FUNNEL_COLUMNS,
            },
            TableInfo {
                name: "behavior",
                rows: self.behavior.len(),
                columns: BEHAVIOR_COLUMNS,
            },
            TableInfo {
                name: "rfm",
                rows: self.rfm.len(),
                columns: RFM_COLUMNS,
            },
            TableInfo {
                name: "sales",
                rows: self.sales.len(),
                columns: SALES_COLUMNS,
            },
        ]
    }
}

/// Deserialize every row of a headed CSV file.
pub fn read_table<T: DeserializeOwned>(path: &Path) -> AnalysisResult<Vec<T>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row?);
    }
    log::debug!("loader: read {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

pub fn load_funnel(path: &Path) -> AnalysisResult<Vec<FunnelRecord>> {
    read_table(path)
}

pub fn load_rfm(path: &Path) -> AnalysisResult<Vec<RfmRecord>> {
    read_table(path)
}

pub fn load_behavior(path: &Path) -> AnalysisResult<Vec<BehaviorRecord>> {
    read_table(path)
}

pub fn load_sales(path: &Path) -> AnalysisResult<Vec<SalesRecord>> {
    read_table(path)
}

pub fn load_raw(paths: &DataPaths) -> AnalysisResult<RawData> {
    let raw = RawData {
        funnel: load_funnel(&paths.funnel())?,
        rfm: load_rfm(&paths.rfm())?,
        behavior: load_behavior(&paths.behavior())?,
        sales: load_sales(&paths.sales())?,
    };
    log::info!(
        "loader: {} funnel rows, {} rfm rows, {} behavior rows, {} sales rows",
        raw.funnel.len(),
        raw.rfm.len(),
        raw.behavior.len(),
        raw.sales.len()
    );
    Ok(raw)
}

/// An untyped processed table: header plus string cells.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.headers.iter().position(|h| h == name)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.get(idx).map(String::as_str).unwrap_or(""))
                .collect(),
        )
    }
}

/// Every `*.csv` in `dir`, keyed by file stem.
pub fn load_processed(dir: &Path) -> AnalysisResult<BTreeMap<String, Table>> {
    let mut tables = BTreeMap::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("csv") {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };

        let mut reader = csv::Reader::from_path(&path)?;
        let headers = reader.headers()?.iter().map(String::from).collect();
        let mut rows = Vec::new();
        for record in reader.records() {
            rows.push(record?.iter().map(String::from).collect());
        }
        tables.insert(stem.to_string(), Table { headers, rows });
    }
    log::info!("loader: {} processed tables from {}", tables.len(), dir.display());
    Ok(tables)
}
