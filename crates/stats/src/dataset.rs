//! Reactor dataset loading.
//!
//! The dataset is a CSV export of the PRIS reactor list, one row per unit.
//! It is read once at startup; any schema problem is reported as
//! `AppError::DataUnavailable` because no synthesis can run without it.

use chrono::{NaiveDate, NaiveDateTime};
use pris_core::{AppError, AppResult};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

pub const COUNTRY_COLUMN: &str = "Country";
pub const STATUS_COLUMN: &str = "Status";
pub const TYPE_COLUMN: &str = "Type";
pub const CAPACITY_COLUMN: &str = "Gross Electrical Capacity [MW]";
pub const GRID_CONNECTION_COLUMN: &str = "First Grid Connection";

/// Columns that must be present in the header row.
pub const REQUIRED_COLUMNS: [&str; 5] = [
    COUNTRY_COLUMN,
    STATUS_COLUMN,
    TYPE_COLUMN,
    CAPACITY_COLUMN,
    GRID_CONNECTION_COLUMN,
];

/// Status value marking a unit as in commercial operation.
pub const OPERATIONAL_STATUS: &str = "Operational";

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];

/// Raw CSV row.
#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(rename = "Country")]
    country: String,

    #[serde(rename = "Status")]
    status: String,

    #[serde(rename = "Type")]
    reactor_type: String,

    #[serde(rename = "Gross Electrical Capacity [MW]")]
    gross_capacity_mw: Option<f64>,

    #[serde(rename = "First Grid Connection")]
    first_grid_connection: Option<String>,
}

/// One reactor unit.
#[derive(Debug, Clone, PartialEq)]
pub struct ReactorUnit {
    pub country: String,
    pub status: String,
    pub reactor_type: String,
    pub gross_capacity_mw: Option<f64>,
    pub first_grid_connection: Option<NaiveDate>,
}

impl ReactorUnit {
    pub fn is_operational(&self) -> bool {
        self.status == OPERATIONAL_STATUS
    }
}

/// The full reactor table, immutable after load.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    units: Vec<ReactorUnit>,
}

impl Dataset {
    /// Load the dataset from a CSV file.
    pub fn load(path: &Path) -> AppResult<Self> {
        tracing::info!("Loading reactor dataset from {:?}", path);

        let file = std::fs::File::open(path).map_err(|e| {
            AppError::DataUnavailable(format!("Cannot open dataset {:?}: {}", path, e))
        })?;

        let dataset = Self::from_reader(file)?;
        tracing::info!("Loaded {} reactor units", dataset.len());
        Ok(dataset)
    }

    /// Parse the dataset from any CSV source.
    pub fn from_reader<R: Read>(reader: R) -> AppResult<Self> {
        let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|column| !headers.iter().any(|h| h == *column))
            .collect();
        if !missing.is_empty() {
            return Err(AppError::DataUnavailable(format!(
                "Dataset is missing required columns: {}",
                missing.join(", ")
            )));
        }

        let mut units = Vec::new();
        for (idx, record) in csv_reader.deserialize::<RawRow>().enumerate() {
            // Header is line 1.
            let line = idx + 2;
            let raw = record.map_err(|e| {
                AppError::DataUnavailable(format!("Malformed dataset row {}: {}", line, e))
            })?;

            let first_grid_connection = match raw.first_grid_connection.as_deref() {
                None | Some("") => None,
                Some(text) => {
                    let parsed = parse_date(text);
                    if parsed.is_none() {
                        tracing::warn!(
                            "Ignoring unrecognized {} value '{}' on row {}",
                            GRID_CONNECTION_COLUMN,
                            text,
                            line
                        );
                    }
                    parsed
                }
            };

            units.push(ReactorUnit {
                country: raw.country,
                status: raw.status,
                reactor_type: raw.reactor_type,
                gross_capacity_mw: raw.gross_capacity_mw,
                first_grid_connection,
            });
        }

        Ok(Self { units })
    }

    /// Build a dataset from already-parsed units.
    pub fn from_units(units: Vec<ReactorUnit>) -> Self {
        Self { units }
    }

    pub fn units(&self) -> &[ReactorUnit] {
        &self.units
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Units belonging to one country (exact match).
    pub fn units_for<'a>(&'a self, country: &'a str) -> impl Iterator<Item = &'a ReactorUnit> {
        self.units.iter().filter(move |u| u.country == country)
    }
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                .map(|dt| dt.date())
        })
}
