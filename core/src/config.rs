use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Relative directory layout for inputs and outputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathConfig {
    pub raw_dir: String,
    pub processed_dir: String,
    pub reports_dir: String,
}

// ── Generation ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunnelGenConfig {
    pub base_daily_visitors: u32,
    /// Relative swing of daily traffic over the year (0.3 = ±30%).
    pub seasonal_amplitude: f64,
    pub cart_probability: f64,
    pub checkout_probability: f64,
    pub purchase_probability: f64,
    pub categories: Vec<String>,
    pub devices: Vec<String>,
    pub sources: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehaviorGenConfig {
    pub session_count: usize,
    pub mean_session_seconds: f64,
    pub mean_pages_viewed: f64,
    pub returning_probability: f64,
    pub mean_purchase_value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RfmGenConfig {
    pub customer_count: usize,
    pub mean_recency_days: f64,
    /// Poisson mean of repeat orders; every customer has at least one.
    pub mean_repeat_orders: f64,
    pub mean_monetary: f64,
}

/// One product family in the sales catalog; unit prices are drawn
/// uniformly from `[min_price, max_price]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogCategory {
    pub name: String,
    pub products: Vec<String>,
    pub min_price: f64,
    pub max_price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesGenConfig {
    pub order_count: usize,
    pub max_quantity: u32,
    pub return_probability: f64,
    pub catalog: Vec<CatalogCategory>,
    pub cities: Vec<String>,
    pub payment_methods: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub seed: u64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub funnel: FunnelGenConfig,
    pub behavior: BehaviorGenConfig,
    pub rfm: RfmGenConfig,
    pub sales: SalesGenConfig,
}

impl GenerationConfig {
    /// Everything the generators assume: an ordered date range, probabilities
    /// in [0, 1], non-empty pick lists and sane price ranges.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.start_date > self.end_date {
            anyhow::bail!(
                "start_date {} is after end_date {}",
                self.start_date,
                self.end_date
            );
        }

        let probabilities = [
            ("cart_probability", self.funnel.cart_probability),
            ("checkout_probability", self.funnel.checkout_probability),
            ("purchase_probability", self.funnel.purchase_probability),
            ("returning_probability", self.behavior.returning_probability),
            ("return_probability", self.sales.return_probability),
        ];
        for (name, p) in probabilities {
            if !(0.0..=1.0).contains(&p) {
                anyhow::bail!("{name} must be within [0, 1], got {p}");
            }
        }

        let lists = [
            ("categories", &self.funnel.categories),
            ("devices", &self.funnel.devices),
            ("sources", &self.funnel.sources),
            ("cities", &self.sales.cities),
            ("payment_methods", &self.sales.payment_methods),
        ];
        for (name, list) in lists {
            if list.is_empty() {
                anyhow::bail!("{name} must not be empty");
            }
        }

        if self.sales.max_quantity == 0 {
            anyhow::bail!("max_quantity must be at least 1");
        }
        if self.sales.catalog.is_empty() {
            anyhow::bail!("catalog must not be empty");
        }
        for family in &self.sales.catalog {
            if family.products.is_empty() {
                anyhow::bail!("catalog category {} has no products", family.name);
            }
            if !(0.0 <= family.min_price && family.min_price <= family.max_price) {
                anyhow::bail!(
                    "catalog category {} has an invalid price range {}..{}",
                    family.name,
                    family.min_price,
                    family.max_price
                );
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub paths: PathConfig,
    pub generation: GenerationConfig,
}

impl AnalysisConfig {
    /// Load from the config/ directory.
    /// In tests, use AnalysisConfig::default_test().
    pub fn load(config_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{config_dir}/analysis.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: AnalysisConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.generation.validate()
    }

    /// Config with hardcoded defaults for use in unit tests.
    /// Two weeks of traffic and small populations.
    pub fn default_test() -> Self {
        Self {
            paths: PathConfig {
                raw_dir: "data/raw".into(),
                processed_dir: "data/processed".into(),
                reports_dir: "reports".into(),
            },
            generation: GenerationConfig {
                seed: 42,
                start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
                end_date: NaiveDate::from_ymd_opt(2024, 1, 14).unwrap_or_default(),
                funnel: FunnelGenConfig {
                    base_daily_visitors: 40,
                    seasonal_amplitude: 0.3,
                    cart_probability: 0.3,
                    checkout_probability: 0.6,
                    purchase_probability: 0.8,
                    categories: vec!["Electronics".into(), "Apparel".into(), "Books".into()],
                    devices: vec!["Desktop".into(), "Mobile".into()],
                    sources: vec!["Google".into(), "Direct".into(), "Email".into()],
                },
                behavior: BehaviorGenConfig {
                    session_count: 120,
                    mean_session_seconds: 300.0,
                    mean_pages_viewed: 8.0,
                    returning_probability: 0.3,
                    mean_purchase_value: 150.0,
                },
                rfm: RfmGenConfig {
                    customer_count: 80,
                    mean_recency_days: 30.0,
                    mean_repeat_orders: 3.0,
                    mean_monetary: 200.0,
                },
                sales: SalesGenConfig {
                    order_count: 60,
                    max_quantity: 5,
                    return_probability: 0.1,
                    catalog: vec![
                        CatalogCategory {
                            name: "Electronics".into(),
                            products: vec!["Laptop".into(), "Headphones".into()],
                            min_price: 500.0,
                            max_price: 50_000.0,
                        },
                        CatalogCategory {
                            name: "Books".into(),
                            products: vec!["Novel".into(), "Cookbook".into()],
                            min_price: 20.0,
                            max_price: 500.0,
                        },
                    ],
                    cities: vec!["Istanbul".into(), "Ankara".into(), "Izmir".into()],
                    payment_methods: vec!["Credit Card".into(), "Bank Transfer".into()],
                },
            },
        }
    }
}
