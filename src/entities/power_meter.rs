use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A monitored meter with a fixed location. `user_id` is the meter identifier
/// used across the wire format and every child table.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "power_meter")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub user_id: i32,
    #[sea_orm(column_type = "Double")]
    pub location_longitude: f64,
    #[sea_orm(column_type = "Double")]
    pub location_latitude: f64,
    pub district: String,
    pub region: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::power_value::Entity")]
    PowerValues,
    #[sea_orm(has_many = "super::recent_power_value::Entity")]
    RecentPowerValues,
    #[sea_orm(has_many = "super::anomaly_prediction::Entity")]
    AnomalyPredictions,
}

impl Related<super::power_value::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PowerValues.def()
    }
}

impl Related<super::recent_power_value::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RecentPowerValues.def()
    }
}

impl Related<super::anomaly_prediction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AnomalyPredictions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
