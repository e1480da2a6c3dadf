//! Per-country aggregate statistics.

use crate::dataset::Dataset;
use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Text shown when no unit of a country has a grid connection date.
pub const NO_CONNECTED_UNITS: &str = "No connected units";

/// Most recent first grid connection among a country's units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatestConnection {
    Date(NaiveDate),
    NoConnectedUnits,
}

impl fmt::Display for LatestConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LatestConnection::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            LatestConnection::NoConnectedUnits => f.write_str(NO_CONNECTED_UNITS),
        }
    }
}

impl Serialize for LatestConnection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Derived statistics for one country. Recomputed on every request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountrySummary {
    pub country: String,
    pub total_units: usize,
    pub operational_units: usize,
    #[serde(rename = "totalCapacityMW")]
    pub total_capacity_mw: f64,
    pub reactor_types: BTreeSet<String>,
    pub latest_connection: LatestConnection,
}

impl CountrySummary {
    /// Capacity with thousands separators and no decimals, e.g. `12,345`.
    pub fn capacity_display(&self) -> String {
        format_thousands(self.total_capacity_mw)
    }
}

impl fmt::Display for CountrySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let types: Vec<&str> = self.reactor_types.iter().map(String::as_str).collect();
        writeln!(f, "Nuclear Power Statistics for {}:", self.country)?;
        writeln!(f, "- Total Units: {}", self.total_units)?;
        writeln!(f, "- Operational Units: {}", self.operational_units)?;
        writeln!(f, "- Total Capacity: {} MW", self.capacity_display())?;
        writeln!(f, "- Reactor Types: {}", types.join(", "))?;
        write!(f, "- Latest Connection: {}", self.latest_connection)
    }
}

/// Computes [`CountrySummary`] values from the shared dataset.
#[derive(Debug, Clone)]
pub struct StatisticsSummarizer {
    dataset: Arc<Dataset>,
}

impl StatisticsSummarizer {
    pub fn new(dataset: Arc<Dataset>) -> Self {
        Self { dataset }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Summarize one country. A country without rows yields an all-zero summary.
    pub fn summarize(&self, country: &str) -> CountrySummary {
        let mut summary = CountrySummary {
            country: country.to_string(),
            total_units: 0,
            operational_units: 0,
            total_capacity_mw: 0.0,
            reactor_types: BTreeSet::new(),
            latest_connection: LatestConnection::NoConnectedUnits,
        };
        let mut latest: Option<NaiveDate> = None;

        for unit in self.dataset.units_for(country) {
            summary.total_units += 1;

            if unit.is_operational() {
                summary.operational_units += 1;
                summary.total_capacity_mw += unit.gross_capacity_mw.unwrap_or(0.0);
            }

            if !unit.reactor_type.is_empty() {
                summary.reactor_types.insert(unit.reactor_type.clone());
            }

            if let Some(date) = unit.first_grid_connection {
                latest = Some(latest.map_or(date, |current| current.max(date)));
            }
        }

        if let Some(date) = latest {
            summary.latest_connection = LatestConnection::Date(date);
        }

        tracing::debug!(
            country,
            total = summary.total_units,
            operational = summary.operational_units,
            "Computed country summary"
        );

        summary
    }

    /// Distinct countries present in the dataset, sorted.
    pub fn countries(&self) -> Vec<String> {
        self.dataset
            .units()
            .iter()
            .map(|u| u.country.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Format a number with `,` thousands separators and zero decimal places.
///
/// Rounding follows the float formatter (ties to even).
pub fn format_thousands(value: f64) -> String {
    let digits = format!("{:.0}", value.abs());
    let negative = value < 0.0 && digits != "0";

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if negative {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::ReactorUnit;

    fn unit(country: &str, status: &str, kind: &str, mw: Option<f64>, date: Option<(i32, u32, u32)>) -> ReactorUnit {
        ReactorUnit {
            country: country.to_string(),
            status: status.to_string(),
            reactor_type: kind.to_string(),
            gross_capacity_mw: mw,
            first_grid_connection: date.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
        }
    }

    fn summarizer() -> StatisticsSummarizer {
        let dataset = Dataset::from_units(vec![
            unit("Canada", "Operational", "PHWR", Some(830.0), Some((1977, 1, 14))),
            unit("Canada", "Operational", "PHWR", Some(934.0), Some((1990, 12, 19))),
            unit("Canada", "Permanent Shutdown", "HWLWR", Some(266.0), Some((1971, 4, 5))),
            unit("Canada", "Planned", "BWR", Some(300.0), None),
            unit("Egypt", "Under Construction", "PWR", Some(1194.0), None),
            unit("Japan", "Operational", "BWR", Some(1100.0), Some((1985, 2, 1))),
        ]);
        StatisticsSummarizer::new(Arc::new(dataset))
    }

    #[test]
    fn test_summarize_country() {
        let summary = summarizer().summarize("Canada");

        assert_eq!(summary.total_units, 4);
        assert_eq!(summary.operational_units, 2);
        assert_eq!(summary.total_capacity_mw, 1764.0);
        assert_eq!(
            summary.reactor_types.iter().cloned().collect::<Vec<_>>(),
            vec!["BWR", "HWLWR", "PHWR"]
        );
        assert_eq!(
            summary.latest_connection,
            LatestConnection::Date(NaiveDate::from_ymd_opt(1990, 12, 19).unwrap())
        );
    }

    #[test]
    fn test_latest_connection_includes_non_operational_units() {
        let dataset = Dataset::from_units(vec![
            unit("China", "Operational", "PWR", Some(1000.0), Some((2010, 1, 1))),
            unit("China", "Permanent Shutdown", "PWR", Some(300.0), Some((2021, 6, 30))),
        ]);
        let summary = StatisticsSummarizer::new(Arc::new(dataset)).summarize("China");

        assert_eq!(summary.latest_connection.to_string(), "2021-06-30");
        assert_eq!(summary.total_capacity_mw, 1000.0);
    }

    #[test]
    fn test_country_without_rows() {
        let summary = summarizer().summarize("Atlantis");

        assert_eq!(summary.total_units, 0);
        assert_eq!(summary.operational_units, 0);
        assert_eq!(summary.total_capacity_mw, 0.0);
        assert!(summary.reactor_types.is_empty());
        assert_eq!(summary.latest_connection, LatestConnection::NoConnectedUnits);
        assert_eq!(summary.latest_connection.to_string(), NO_CONNECTED_UNITS);
    }

    #[test]
    fn test_country_without_connected_units() {
        let summary = summarizer().summarize("Egypt");

        assert_eq!(summary.total_units, 1);
        assert_eq!(summary.operational_units, 0);
        assert_eq!(summary.latest_connection, LatestConnection::NoConnectedUnits);
    }

    #[test]
    fn test_summary_rendering() {
        let dataset = Dataset::from_units(vec![
            unit("Japan", "Operational", "BWR", Some(11000.4), Some((1985, 2, 1))),
            unit("Japan", "Operational", "PWR", Some(1180.0), Some((1991, 6, 7))),
        ]);
        let rendered = StatisticsSummarizer::new(Arc::new(dataset))
            .summarize("Japan")
            .to_string();

        assert_eq!(
            rendered,
            "Nuclear Power Statistics for Japan:\n\
             - Total Units: 2\n\
             - Operational Units: 2\n\
             - Total Capacity: 12,180 MW\n\
             - Reactor Types: BWR, PWR\n\
             - Latest Connection: 1991-06-07"
        );
    }

    #[test]
    fn test_summary_json_shape() {
        let summary = summarizer().summarize("Egypt");
        let json = serde_json::to_value(&summary).unwrap();

        assert_eq!(json["totalUnits"], 1);
        assert_eq!(json["totalCapacityMW"], 0.0);
        assert_eq!(json["latestConnection"], NO_CONNECTED_UNITS);
    }

    #[test]
    fn test_countries_sorted_and_distinct() {
        assert_eq!(summarizer().countries(), vec!["Canada", "Egypt", "Japan"]);
    }

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0.0), "0");
        assert_eq!(format_thousands(999.0), "999");
        assert_eq!(format_thousands(1000.0), "1,000");
        assert_eq!(format_thousands(12345.4), "12,345");
        assert_eq!(format_thousands(1234567.0), "1,234,567");
        assert_eq!(format_thousands(-4321.0), "-4,321");
        assert_eq!(format_thousands(-0.2), "0");
    }
}
