//! Health-exposure scoring service.
//!
//! Enriches dated locations with weather and air-quality readings, scores
//! each reading on ten environmental risk factors, and rolls scored records
//! up by day, ISO week or month.

pub mod analysis;
pub mod config;
pub mod factors;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod scoring;
pub mod storage;
pub mod verify;
