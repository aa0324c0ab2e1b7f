use crate::{
    db::DbPool,
    entities::{anomaly_prediction, power_meter, power_value, recent_power_value},
    errors::ServiceError,
    events::{Event, EventSender},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    SqlErr, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[schema(example = json!({
    "location_longitude": 24.9384,
    "location_latitude": 60.1699,
    "district": "Kallio",
    "region": "Uusimaa"
}))]
pub struct CreateMeterRequest {
    /// Explicit meter identifier; assigned by the database when omitted
    #[validate(range(min = 1))]
    #[serde(default)]
    pub user_id: Option<i32>,
    #[validate(custom = "validate_longitude")]
    #[schema(example = 24.9384)]
    pub location_longitude: f64,
    #[validate(custom = "validate_latitude")]
    #[schema(example = 60.1699)]
    pub location_latitude: f64,
    #[validate(custom = "validate_place_name")]
    #[schema(example = "Kallio")]
    pub district: String,
    #[validate(custom = "validate_place_name")]
    #[schema(example = "Uusimaa")]
    pub region: String,
}

fn validate_longitude(value: f64) -> Result<(), ValidationError> {
    if (-180.0..=180.0).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::new("longitude_out_of_range"))
    }
}

fn validate_latitude(value: f64) -> Result<(), ValidationError> {
    if (-90.0..=90.0).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::new("latitude_out_of_range"))
    }
}

/// Names are stored trimmed, so the length rule applies to the trimmed value.
fn validate_place_name(value: &str) -> Result<(), ValidationError> {
    let len = value.trim().chars().count();
    if (1..=100).contains(&len) {
        Ok(())
    } else {
        Err(ValidationError::new("place_name_length"))
    }
}

/// A distinct region/district pair in use by at least one meter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Location {
    pub region: String,
    pub district: String,
}

#[derive(Clone)]
pub struct MeterService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl MeterService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Registers a meter at a fixed location.
    #[instrument(skip(self))]
    pub async fn register_meter(
        &self,
        request: CreateMeterRequest,
    ) -> Result<power_meter::Model, ServiceError> {
        request.validate()?;
        let db = self.db_pool.as_ref();

        let mut meter = power_meter::ActiveModel {
            location_longitude: Set(request.location_longitude),
            location_latitude: Set(request.location_latitude),
            district: Set(request.district.trim().to_string()),
            region: Set(request.region.trim().to_string()),
            ..Default::default()
        };

        if let Some(user_id) = request.user_id {
            if power_meter::Entity::find_by_id(user_id).one(db).await?.is_some() {
                return Err(ServiceError::Conflict(format!(
                    "power meter {} already exists",
                    user_id
                )));
            }
            meter.user_id = Set(user_id);
        }

        // a concurrent registration can still win the race for an explicit id
        let meter = meter
            .insert(db)
            .await
            .map_err(|err| insert_error(request.user_id, err))?;
        info!(user_id = meter.user_id, region = %meter.region, "meter registered");

        self.event_sender
            .send_or_log(Event::MeterRegistered {
                user_id: meter.user_id,
                region: meter.region.clone(),
                district: meter.district.clone(),
            })
            .await;

        Ok(meter)
    }

    #[instrument(skip(self))]
    pub async fn get_meter(&self, user_id: i32) -> Result<power_meter::Model, ServiceError> {
        power_meter::Entity::find_by_id(user_id)
            .one(self.db_pool.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("power meter {} not found", user_id)))
    }

    /// Meters ordered by id, optionally narrowed to a region and/or district.
    #[instrument(skip(self))]
    pub async fn list_meters(
        &self,
        region: Option<&str>,
        district: Option<&str>,
    ) -> Result<Vec<power_meter::Model>, ServiceError> {
        let region = region.map(str::trim).filter(|r| !r.is_empty());
        let district = district.map(str::trim).filter(|d| !d.is_empty());

        let mut query = power_meter::Entity::find();
        if let Some(region) = region {
            query = query.filter(power_meter::Column::Region.eq(region));
        }
        if let Some(district) = district {
            query = query.filter(power_meter::Column::District.eq(district));
        }

        let meters = query
            .order_by_asc(power_meter::Column::UserId)
            .all(self.db_pool.as_ref())
            .await?;
        Ok(meters)
    }

    /// Distinct region/district pairs, sorted by region then district.
    #[instrument(skip(self))]
    pub async fn list_locations(&self) -> Result<Vec<Location>, ServiceError> {
        let pairs: Vec<(String, String)> = power_meter::Entity::find()
            .select_only()
            .column(power_meter::Column::Region)
            .column(power_meter::Column::District)
            .distinct()
            .order_by_asc(power_meter::Column::Region)
            .order_by_asc(power_meter::Column::District)
            .into_tuple()
            .all(self.db_pool.as_ref())
            .await?;

        Ok(pairs
            .into_iter()
            .map(|(region, district)| Location { region, district })
            .collect())
    }

    /// Removes a meter together with its readings, window and predictions.
    #[instrument(skip(self))]
    pub async fn delete_meter(&self, user_id: i32) -> Result<(), ServiceError> {
        let txn = self.db_pool.begin().await?;

        power_meter::Entity::find_by_id(user_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("power meter {} not found", user_id)))?;

        // explicit child deletes so sqlite without foreign_keys behaves the same
        power_value::Entity::delete_many()
            .filter(power_value::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;
        recent_power_value::Entity::delete_many()
            .filter(recent_power_value::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;
        anomaly_prediction::Entity::delete_many()
            .filter(anomaly_prediction::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;
        power_meter::Entity::delete_by_id(user_id).exec(&txn).await?;

        txn.commit().await?;
        info!(user_id, "meter deleted");
        Ok(())
    }
}

fn insert_error(user_id: Option<i32>, err: DbErr) -> ServiceError {
    match (err.sql_err(), user_id) {
        (Some(SqlErr::UniqueConstraintViolation(_)), Some(user_id)) => {
            ServiceError::Conflict(format!("power meter {} already exists", user_id))
        }
        _ => ServiceError::DatabaseError(err),
    }
}
