//! Query side of the telemetry tables: the data a dashboard charts.
//!
//! Every query takes a [`MeterSelection`], the same filter the dashboard
//! exposes (one meter, a region with an optional district, or everything).

use crate::{
    db::DbPool,
    entities::{anomaly_prediction, power_meter, power_value, recent_power_value},
    errors::ServiceError,
};
use sea_orm::{
    ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Related,
    Select,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;

pub const DEFAULT_OVERVIEW_LIMIT: u64 = 5;
pub const MAX_OVERVIEW_LIMIT: u64 = 100;

/// Which meters a dashboard query covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeterSelection {
    All,
    Meter(i32),
    Region {
        region: String,
        district: Option<String>,
    },
}

impl MeterSelection {
    /// Builds a selection from optional query parameters. A meter id wins over
    /// a region; a district only makes sense inside a region.
    pub fn from_parts(
        user_id: Option<i32>,
        region: Option<String>,
        district: Option<String>,
    ) -> Result<Self, ServiceError> {
        let region = region
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
        let district = district
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        match (user_id, region, district) {
            (Some(user_id), _, _) => Ok(MeterSelection::Meter(user_id)),
            (None, Some(region), district) => Ok(MeterSelection::Region { region, district }),
            (None, None, Some(_)) => Err(ServiceError::BadRequest(
                "district filter requires a region".to_string(),
            )),
            (None, None, None) => Ok(MeterSelection::All),
        }
    }

    fn apply<E>(&self, select: Select<E>) -> Select<E>
    where
        E: EntityTrait + Related<power_meter::Entity>,
    {
        match self {
            MeterSelection::All => select,
            MeterSelection::Meter(user_id) => select
                .inner_join(power_meter::Entity)
                .filter(power_meter::Column::UserId.eq(*user_id)),
            MeterSelection::Region { region, district } => {
                let select = select
                    .inner_join(power_meter::Entity)
                    .filter(power_meter::Column::Region.eq(region.as_str()));
                match district {
                    Some(district) => {
                        select.filter(power_meter::Column::District.eq(district.as_str()))
                    }
                    None => select,
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AnomalySummary {
    pub anomalies: u64,
    pub normal: u64,
}

/// First rows of every table.
#[derive(Debug, Clone)]
pub struct Overview {
    pub power_meters: Vec<power_meter::Model>,
    pub power_values: Vec<power_value::Model>,
    pub recent_power_values: Vec<recent_power_value::Model>,
    pub anomaly_predictions: Vec<anomaly_prediction::Model>,
}

#[derive(Clone)]
pub struct DashboardService {
    db_pool: Arc<DbPool>,
}

impl DashboardService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    async fn ensure_meter_exists(&self, selection: &MeterSelection) -> Result<(), ServiceError> {
        if let MeterSelection::Meter(user_id) = selection {
            power_meter::Entity::find_by_id(*user_id)
                .one(self.db_pool.as_ref())
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("power meter {} not found", user_id))
                })?;
        }
        Ok(())
    }

    /// Readings over time, ordered by date then insertion.
    #[instrument(skip(self))]
    pub async fn power_history(
        &self,
        selection: &MeterSelection,
    ) -> Result<Vec<power_value::Model>, ServiceError> {
        self.ensure_meter_exists(selection).await?;

        let rows = selection
            .apply(power_value::Entity::find())
            .order_by_asc(power_value::Column::DateLogged)
            .order_by_asc(power_value::Column::Id)
            .all(self.db_pool.as_ref())
            .await?;
        Ok(rows)
    }

    /// The meter's current recent window, oldest first.
    #[instrument(skip(self))]
    pub async fn recent_window(
        &self,
        user_id: i32,
    ) -> Result<Vec<recent_power_value::Model>, ServiceError> {
        self.ensure_meter_exists(&MeterSelection::Meter(user_id))
            .await?;

        let rows = recent_power_value::Entity::find()
            .filter(recent_power_value::Column::UserId.eq(user_id))
            .order_by_asc(recent_power_value::Column::Id)
            .all(self.db_pool.as_ref())
            .await?;
        Ok(rows)
    }

    #[instrument(skip(self))]
    pub async fn predictions(
        &self,
        selection: &MeterSelection,
        anomalies_only: bool,
    ) -> Result<Vec<anomaly_prediction::Model>, ServiceError> {
        self.ensure_meter_exists(selection).await?;

        let mut query = selection.apply(anomaly_prediction::Entity::find());
        if anomalies_only {
            query = query.filter(anomaly_prediction::Column::Anomaly.eq(true));
        }

        let rows = query
            .order_by_asc(anomaly_prediction::Column::DatePredicted)
            .order_by_asc(anomaly_prediction::Column::Id)
            .all(self.db_pool.as_ref())
            .await?;
        Ok(rows)
    }

    #[instrument(skip(self))]
    pub async fn anomaly_summary(
        &self,
        selection: &MeterSelection,
    ) -> Result<AnomalySummary, ServiceError> {
        self.ensure_meter_exists(selection).await?;
        let db = self.db_pool.as_ref();

        let anomalies = selection
            .apply(anomaly_prediction::Entity::find())
            .filter(anomaly_prediction::Column::Anomaly.eq(true))
            .count(db)
            .await?;
        let normal = selection
            .apply(anomaly_prediction::Entity::find())
            .filter(anomaly_prediction::Column::Anomaly.eq(false))
            .count(db)
            .await?;

        Ok(AnomalySummary { anomalies, normal })
    }

    /// The first `limit` rows of each table by primary key.
    #[instrument(skip(self))]
    pub async fn overview(&self, limit: Option<u64>) -> Result<Overview, ServiceError> {
        let limit = clamp_overview_limit(limit);
        let db = self.db_pool.as_ref();

        let power_meters = power_meter::Entity::find()
            .order_by_asc(power_meter::Column::UserId)
            .limit(limit)
            .all(db)
            .await?;
        let power_values = power_value::Entity::find()
            .order_by_asc(power_value::Column::Id)
            .limit(limit)
            .all(db)
            .await?;
        let recent_power_values = recent_power_value::Entity::find()
            .order_by_asc(recent_power_value::Column::Id)
            .limit(limit)
            .all(db)
            .await?;
        let anomaly_predictions = anomaly_prediction::Entity::find()
            .order_by_asc(anomaly_prediction::Column::Id)
            .limit(limit)
            .all(db)
            .await?;

        Ok(Overview {
            power_meters,
            power_values,
            recent_power_values,
            anomaly_predictions,
        })
    }
}

fn clamp_overview_limit(limit: Option<u64>) -> u64 {
    limit
        .unwrap_or(DEFAULT_OVERVIEW_LIMIT)
        .clamp(1, MAX_OVERVIEW_LIMIT)
}
