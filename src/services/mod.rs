// Write side
pub mod ingestion;
pub mod meters;

// Read side backing the dashboard
pub mod dashboard;
