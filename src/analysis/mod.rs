/// Data organization utilities for scored health records.
///
/// Trend analysis and visualisation are handled by the dashboard that reads
/// the summarised output.
///
/// Submodules:
/// - `periods`: rolls scored records up by day, ISO week or month.

pub mod periods;

pub use periods::aggregate;
