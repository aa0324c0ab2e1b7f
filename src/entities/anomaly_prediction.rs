use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "anomaly_predictions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub anomaly: bool,
    pub date_predicted: Date,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::power_meter::Entity",
        from = "Column::UserId",
        to = "super::power_meter::Column::UserId",
        on_delete = "Cascade"
    )]
    PowerMeter,
}

impl Related<super::power_meter::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PowerMeter.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
