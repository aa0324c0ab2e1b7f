use crate::{
    db::DbPool,
    entities::{anomaly_prediction, power_meter, power_value, recent_power_value},
    errors::ServiceError,
    events::{Event, EventSender},
    inference::AnomalyClassifier,
    window::{self, WindowEntry},
};
use chrono::{NaiveDate, Utc};
use metrics::counter;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

/// A single reading as sent by a meter.
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
#[schema(example = json!({
    "user_id": 17,
    "power_value": 3.42
}))]
pub struct PowerValueInput {
    /// Meter identifier
    #[validate(range(min = 1))]
    #[schema(example = 17)]
    pub user_id: i32,
    /// Consumption reading
    #[validate(custom = "validate_finite")]
    #[schema(example = 3.42)]
    pub power_value: f64,
    /// Reading date for backfills; today (UTC) when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_logged: Option<NaiveDate>,
}

fn validate_finite(value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::new("power_value_not_finite"))
    }
}

/// Verdict recorded for a reading.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[schema(example = json!({
    "user_id": 17,
    "anomaly": false,
    "date_predicted": "2024-06-01"
}))]
pub struct PredictionOutput {
    pub user_id: i32,
    pub anomaly: bool,
    pub date_predicted: NaiveDate,
}

/// Accepts readings, keeps each meter's recent window and records a verdict.
#[derive(Clone)]
pub struct IngestionService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
    classifier: Arc<dyn AnomalyClassifier>,
}

impl IngestionService {
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
        classifier: Arc<dyn AnomalyClassifier>,
    ) -> Self {
        Self {
            db_pool,
            event_sender,
            classifier,
        }
    }

    /// Stores the reading, rewrites the meter's recent window and records the
    /// classifier's verdict, all in one transaction.
    #[instrument(skip(self), fields(classifier = self.classifier.name()))]
    pub async fn add_power_value(
        &self,
        input: PowerValueInput,
    ) -> Result<PredictionOutput, ServiceError> {
        input.validate()?;

        let today = Utc::now().date_naive();
        let reading = WindowEntry {
            power_value: input.power_value,
            date_logged: input.date_logged.unwrap_or(today),
        };

        let (updated, anomaly) = match self.record(input.user_id, reading, today).await {
            Ok(outcome) => outcome,
            Err(err) => {
                if matches!(err, ServiceError::DatabaseError(_)) {
                    counter!("meterwatch_db.ingest_failures", 1);
                    warn!(user_id = input.user_id, error = %err, "ingestion rolled back");
                }
                return Err(err);
            }
        };

        counter!("meterwatch_power_values_ingested_total", 1);
        info!(
            user_id = input.user_id,
            power_value = reading.power_value,
            anomaly,
            "power value ingested"
        );

        self.event_sender
            .send_or_log(Event::PowerValueRecorded {
                user_id: input.user_id,
                power_value: reading.power_value,
                window_len: updated.len(),
                date_logged: reading.date_logged,
            })
            .await;

        if anomaly {
            counter!("meterwatch_anomalies_flagged_total", 1);
            self.event_sender
                .send_or_log(Event::AnomalyFlagged {
                    user_id: input.user_id,
                    date_predicted: today,
                })
                .await;
        }

        Ok(PredictionOutput {
            user_id: input.user_id,
            anomaly,
            date_predicted: today,
        })
    }

    /// Persists one reading and its verdict. The meter row is locked first so
    /// concurrent readings for the same meter rewrite its window one at a time.
    async fn record(
        &self,
        user_id: i32,
        reading: WindowEntry,
        today: NaiveDate,
    ) -> Result<(Vec<WindowEntry>, bool), ServiceError> {
        let txn = self.db_pool.begin().await?;

        power_meter::Entity::find_by_id(user_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("power meter {} not found", user_id))
            })?;

        power_value::ActiveModel {
            user_id: Set(user_id),
            power_value: Set(reading.power_value),
            date_logged: Set(reading.date_logged),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let existing: Vec<WindowEntry> = recent_power_value::Entity::find()
            .filter(recent_power_value::Column::UserId.eq(user_id))
            .order_by_asc(recent_power_value::Column::Id)
            .all(&txn)
            .await?
            .into_iter()
            .map(|row| WindowEntry {
                power_value: row.power_value,
                date_logged: row.date_logged,
            })
            .collect();

        let updated = window::advance(existing, reading);
        let anomaly = self.classifier.classify(&window::values(&updated));
        debug!(window_len = updated.len(), anomaly, "window classified");

        anomaly_prediction::ActiveModel {
            user_id: Set(user_id),
            anomaly: Set(anomaly),
            date_predicted: Set(today),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        recent_power_value::Entity::delete_many()
            .filter(recent_power_value::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;

        // never empty: advance always keeps the newest reading
        recent_power_value::Entity::insert_many(updated.iter().map(|entry| {
            recent_power_value::ActiveModel {
                user_id: Set(user_id),
                power_value: Set(entry.power_value),
                date_logged: Set(entry.date_logged),
                ..Default::default()
            }
        }))
        .exec(&txn)
        .await?;

        txn.commit().await?;
        Ok((updated, anomaly))
    }
}
