//! Synthetic raw tables for demos and tests.
//!
//! Each table draws from its own RNG slot, so the same seed always yields
//! the same rows and changing one generator never shifts another's output.

use crate::{
    config::{BehaviorGenConfig, FunnelGenConfig, GenerationConfig, RfmGenConfig, SalesGenConfig},
    error::AnalysisResult,
    loader::RawData,
    records::{BehaviorRecord, FunnelRecord, RfmRecord, SalesRecord},
    rng::{DatasetRng, DatasetSlot},
    segment::Segment,
};
use chrono::{Datelike, Days, NaiveDate};
use std::f64::consts::PI;

const GENDERS: [&str; 2] = ["Male", "Female"];

/// Generate all four raw tables from `config.seed`.
///
/// The config is validated first; an empty pick list or an inverted date
/// range is reported as an error instead of reaching the samplers.
pub fn generate(config: &GenerationConfig) -> AnalysisResult<RawData> {
    config.validate()?;
    let stream = |slot| DatasetRng::for_slot(config.seed, slot);

    let raw = RawData {
        funnel: generate_funnel(
            &config.funnel,
            config.start_date,
            config.end_date,
            &mut stream(DatasetSlot::Funnel),
        ),
        behavior: generate_behavior(
            &config.behavior,
            config.start_date,
            config.end_date,
            &mut stream(DatasetSlot::Behavior),
        ),
        rfm: generate_rfm(&config.rfm, config.end_date, &mut stream(DatasetSlot::Rfm)),
        sales: generate_sales(
            &config.sales,
            config.start_date,
            config.end_date,
            &mut stream(DatasetSlot::Sales),
        ),
    };
    log::info!(
        "generator: seed={} funnel={} behavior={} rfm={} sales={}",
        config.seed,
        raw.funnel.len(),
        raw.behavior.len(),
        raw.rfm.len(),
        raw.sales.len()
    );
    Ok(raw)
}

fn pick_owned(rng: &mut DatasetRng, items: &[String]) -> String {
    rng.pick(items).cloned().unwrap_or_default()
}

fn day_in_range(rng: &mut DatasetRng, start: NaiveDate, end: NaiveDate) -> NaiveDate {
    let span_days = (end - start).num_days().max(0) as u64;
    let offset = rng.range_inclusive(0, span_days);
    start.checked_add_days(Days::new(offset)).unwrap_or(end)
}

/// Visitors on `date`: the base volume scaled by a yearly sine wave.
pub fn daily_visitors(config: &FunnelGenConfig, date: NaiveDate) -> usize {
    let phase = 2.0 * PI * f64::from(date.ordinal()) / 365.0;
    let factor = 1.0 + config.seasonal_amplitude * phase.sin();
    (f64::from(config.base_daily_visitors) * factor).max(0.0) as usize
}

pub fn generate_funnel(
    config: &FunnelGenConfig,
    start: NaiveDate,
    end: NaiveDate,
    rng: &mut DatasetRng,
) -> Vec<FunnelRecord> {
    let mut records = Vec::new();
    let mut session_id = 1u64;

    for date in start.iter_days().take_while(|d| *d <= end) {
        for _ in 0..daily_visitors(config, date) {
            // Later stages only fire when the previous one did.
            let add_to_cart = rng.chance(config.cart_probability);
            let start_checkout = add_to_cart && rng.chance(config.checkout_probability);
            let complete_purchase = start_checkout && rng.chance(config.purchase_probability);

            records.push(FunnelRecord {
                date,
                page_view: true,
                add_to_cart,
                start_checkout,
                complete_purchase,
                session_id,
                user_id: format!("user_{}", rng.range_inclusive(1000, 9999)),
                product_id: format!("prod_{}", rng.range_inclusive(100, 999)),
                category: pick_owned(rng, &config.categories),
                device_type: pick_owned(rng, &config.devices),
                source: pick_owned(rng, &config.sources),
            });
            session_id += 1;
        }
    }
    records
}

pub fn generate_behavior(
    config: &BehaviorGenConfig,
    start: NaiveDate,
    end: NaiveDate,
    rng: &mut DatasetRng,
) -> Vec<BehaviorRecord> {
    (0..config.session_count)
        .map(|i| {
            let session_duration = rng.exponential(config.mean_session_seconds);
            let pages_viewed = rng.poisson(config.mean_pages_viewed) as u32;
            let bounce_rate = rng.beta_int(2, 8);
            let return_visitor = rng.chance(config.returning_probability);
            let purchase_value = if return_visitor {
                round_cents(rng.exponential(config.mean_purchase_value))
            } else {
                0.0
            };
            let date = day_in_range(rng, start, end);

            BehaviorRecord {
                session_id: format!("session_{}", i + 1),
                user_id: format!("user_{}", rng.range_inclusive(1000, 9999)),
                session_duration,
                pages_viewed,
                bounce_rate,
                return_visitor,
                purchase_value,
                date,
            }
        })
        .collect()
}

pub fn generate_rfm(config: &RfmGenConfig, end: NaiveDate, rng: &mut DatasetRng) -> Vec<RfmRecord> {
    (0..config.customer_count)
        .map(|i| {
            let recency_days = rng.exponential(config.mean_recency_days) as u32;
            let frequency = rng.poisson(config.mean_repeat_orders) as u32 + 1;
            let monetary = round_cents(rng.exponential(config.mean_monetary));

            RfmRecord {
                customer_id: format!("customer_{}", i + 1),
                recency_days,
                frequency,
                monetary,
                segment: Segment::classify(recency_days, frequency, monetary)
                    .label()
                    .to_string(),
                last_purchase_date: end
                    .checked_sub_days(Days::new(u64::from(recency_days)))
                    .unwrap_or(NaiveDate::MIN),
            }
        })
        .collect()
}

pub fn generate_sales(
    config: &SalesGenConfig,
    start: NaiveDate,
    end: NaiveDate,
    rng: &mut DatasetRng,
) -> Vec<SalesRecord> {
    let mut records = Vec::with_capacity(config.order_count);

    for order_id in 1..=config.order_count as u64 {
        let Some(family) = rng.pick(&config.catalog) else {
            break;
        };
        let product_name = pick_owned(rng, &family.products);
        let unit_price = round_cents(rng.uniform(family.min_price, family.max_price));
        let quantity = rng.range_inclusive(1, u64::from(config.max_quantity)) as u32;

        records.push(SalesRecord {
            order_id,
            customer_id: rng.range_inclusive(100, 999) as u32,
            product_id: rng.range_inclusive(1, 99) as u32,
            product_name,
            category: family.name.clone(),
            order_date: day_in_range(rng, start, end),
            quantity,
            unit_price,
            total_amount: round_cents(unit_price * f64::from(quantity)),
            payment_method: pick_owned(rng, &config.payment_methods),
            customer_city: pick_owned(rng, &config.cities),
            customer_age: rng.range_inclusive(18, 69) as u32,
            customer_gender: rng.pick(&GENDERS).copied().unwrap_or_default().to_string(),
            is_returned: rng.chance(config.return_probability),
            rating: rng.range_inclusive(1, 5) as u8,
        });
    }
    log::debug!("generator: {} stream drew {} orders", rng.slot().name(), records.len());
    records
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
