//! sea-orm entities for the meter telemetry schema.
//!
//! Every child table hangs off `power_meter.user_id`.

pub mod anomaly_prediction;
pub mod power_meter;
pub mod power_value;
pub mod recent_power_value;

pub use anomaly_prediction::Entity as AnomalyPrediction;
pub use power_meter::Entity as PowerMeter;
pub use power_value::Entity as PowerValue;
pub use recent_power_value::Entity as RecentPowerValue;
