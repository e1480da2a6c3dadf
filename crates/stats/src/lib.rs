//! Reactor statistics for the PRIS engine.
//!
//! Loads the PRIS reactor table once and derives per-country summaries
//! (unit counts, operational capacity, reactor types, latest grid connection)
//! that feed every synthesis prompt.

pub mod dataset;
pub mod summary;

pub use dataset::{Dataset, ReactorUnit, OPERATIONAL_STATUS, REQUIRED_COLUMNS};
pub use summary::{
    format_thousands, CountrySummary, LatestConnection, StatisticsSummarizer, NO_CONNECTED_UNITS,
};
