//! Seed data script - populates the database with demo meters and readings
//!
//! Run with: cargo run --bin seed-data
//!
//! This creates:
//! - 6 meters across 3 regions
//! - 30 days of readings per meter, fed through the ingestion pipeline so the
//!   recent windows and predictions are filled in as well

use chrono::{Duration, Utc};
use rand::Rng;
use std::sync::Arc;
use tracing::info;

use meterwatch::{
    config, db,
    events::{self, EventSender},
    inference::{build_classifier, ClassifierKind},
    services::{
        ingestion::{IngestionService, PowerValueInput},
        meters::{CreateMeterRequest, MeterService},
    },
};

const DAYS_OF_READINGS: i64 = 30;

const DEMO_METERS: [(f64, f64, &str, &str); 6] = [
    (24.9384, 60.1699, "Kallio", "Uusimaa"),
    (24.9525, 60.1841, "Vallila", "Uusimaa"),
    (23.7610, 61.4978, "Hervanta", "Pirkanmaa"),
    (23.7871, 61.4981, "Kaleva", "Pirkanmaa"),
    (25.4651, 65.0121, "Toppila", "Pohjois-Pohjanmaa"),
    (25.4723, 65.0593, "Haukipudas", "Pohjois-Pohjanmaa"),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    config::init_tracing("info", false);

    info!("=== meterwatch seed data ===");

    let database_url = config::resolve_database_url();
    let pool = Arc::new(db::establish_connection(&database_url).await?);
    db::run_migrations(&pool).await?;

    let (event_sender, event_rx) = EventSender::channel(256);
    let processor = tokio::spawn(events::process_events(event_rx));
    let event_sender = Arc::new(event_sender);

    let meters = MeterService::new(pool.clone(), event_sender.clone());
    let ingestion = IngestionService::new(
        pool.clone(),
        event_sender.clone(),
        build_classifier(ClassifierKind::Random),
    );

    info!("Registering meters...");
    let mut meter_ids = Vec::with_capacity(DEMO_METERS.len());
    for (longitude, latitude, district, region) in DEMO_METERS {
        let meter = meters
            .register_meter(CreateMeterRequest {
                user_id: None,
                location_longitude: longitude,
                location_latitude: latitude,
                district: district.to_string(),
                region: region.to_string(),
            })
            .await?;
        meter_ids.push(meter.user_id);
    }
    info!("  Registered {} meters", meter_ids.len());

    info!("Feeding readings...");
    let today = Utc::now().date_naive();
    let mut rng = rand::thread_rng();
    let mut flagged = 0usize;
    let mut total = 0usize;
    for &user_id in &meter_ids {
        let baseline: f64 = rng.gen_range(1.5..6.0);
        for day in (0..DAYS_OF_READINGS).rev() {
            let prediction = ingestion
                .add_power_value(PowerValueInput {
                    user_id,
                    power_value: baseline + rng.gen_range(-0.8..0.8),
                    date_logged: Some(today - Duration::days(day)),
                })
                .await?;
            total += 1;
            if prediction.anomaly {
                flagged += 1;
            }
        }
    }
    info!("  Ingested {} readings, {} flagged", total, flagged);

    // close the channel so the processor drains and exits
    drop(meters);
    drop(ingestion);
    drop(event_sender);
    processor.await?;

    info!("=== Seed complete ===");
    Ok(())
}
