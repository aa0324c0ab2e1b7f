//! Embedded schema migrations, applied by `db::run_migrations` and the
//! `migration` binary.

use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240601_000001_create_power_meter_table::Migration),
            Box::new(m20240601_000002_create_power_values_table::Migration),
            Box::new(m20240601_000003_create_recent_power_values_table::Migration),
            Box::new(m20240601_000004_create_anomaly_predictions_table::Migration),
        ]
    }
}

mod m20240601_000001_create_power_meter_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000001_create_power_meter_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(PowerMeter::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PowerMeter::UserId)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(PowerMeter::LocationLongitude)
                                .double()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PowerMeter::LocationLatitude)
                                .double()
                                .not_null(),
                        )
                        .col(ColumnDef::new(PowerMeter::District).string_len(100).not_null())
                        .col(ColumnDef::new(PowerMeter::Region).string_len(100).not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_power_meter_region_district")
                        .table(PowerMeter::Table)
                        .col(PowerMeter::Region)
                        .col(PowerMeter::District)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(PowerMeter::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(crate) enum PowerMeter {
        Table,
        UserId,
        LocationLongitude,
        LocationLatitude,
        District,
        Region,
    }
}

mod m20240601_000002_create_power_values_table {

    use super::m20240601_000001_create_power_meter_table::PowerMeter;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000002_create_power_values_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(PowerValues::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PowerValues::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(PowerValues::UserId).integer().not_null())
                        .col(ColumnDef::new(PowerValues::PowerValue).double().not_null())
                        .col(ColumnDef::new(PowerValues::DateLogged).date().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_power_values_user_id")
                                .from(PowerValues::Table, PowerValues::UserId)
                                .to(PowerMeter::Table, PowerMeter::UserId)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_power_values_user_id_date")
                        .table(PowerValues::Table)
                        .col(PowerValues::UserId)
                        .col(PowerValues::DateLogged)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(PowerValues::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum PowerValues {
        Table,
        Id,
        UserId,
        PowerValue,
        DateLogged,
    }
}

mod m20240601_000003_create_recent_power_values_table {

    use super::m20240601_000001_create_power_meter_table::PowerMeter;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000003_create_recent_power_values_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(RecentPowerValues::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(RecentPowerValues::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(RecentPowerValues::UserId).integer().not_null())
                        .col(
                            ColumnDef::new(RecentPowerValues::PowerValue)
                                .double()
                                .not_null(),
                        )
                        .col(ColumnDef::new(RecentPowerValues::DateLogged).date().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_recent_power_values_user_id")
                                .from(RecentPowerValues::Table, RecentPowerValues::UserId)
                                .to(PowerMeter::Table, PowerMeter::UserId)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_recent_power_values_user_id")
                        .table(RecentPowerValues::Table)
                        .col(RecentPowerValues::UserId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(RecentPowerValues::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum RecentPowerValues {
        Table,
        Id,
        UserId,
        PowerValue,
        DateLogged,
    }
}

mod m20240601_000004_create_anomaly_predictions_table {

    use super::m20240601_000001_create_power_meter_table::PowerMeter;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000004_create_anomaly_predictions_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(AnomalyPredictions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(AnomalyPredictions::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(AnomalyPredictions::UserId).integer().not_null())
                        .col(ColumnDef::new(AnomalyPredictions::Anomaly).boolean().not_null())
                        .col(
                            ColumnDef::new(AnomalyPredictions::DatePredicted)
                                .date()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_anomaly_predictions_user_id")
                                .from(AnomalyPredictions::Table, AnomalyPredictions::UserId)
                                .to(PowerMeter::Table, PowerMeter::UserId)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_anomaly_predictions_user_id_date")
                        .table(AnomalyPredictions::Table)
                        .col(AnomalyPredictions::UserId)
                        .col(AnomalyPredictions::DatePredicted)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(AnomalyPredictions::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum AnomalyPredictions {
        Table,
        Id,
        UserId,
        Anomaly,
        DatePredicted,
    }
}
