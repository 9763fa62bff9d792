use super::DatasetError;
use crate::features::dates::parse_date;
use crate::features::Applicant;
use serde::{Deserialize, Deserializer};
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

pub const REQUIRED_COLUMNS: [&str; 3] = ["id", "application_date", "contracts"];

pub fn read_applicants_from_path<P: AsRef<Path>>(
    path: P,
) -> Result<Vec<Applicant>, DatasetError> {
    let file = std::fs::File::open(path)?;
    read_applicants(file)
}

/// Reads and prepares the applicant batch.
///
/// Identifiers are cleaned batch-wide: if any row lacks a usable integer id,
/// ids are dropped for every row.
pub fn read_applicants<R: Read>(reader: R) -> Result<Vec<Applicant>, DatasetError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    for column in REQUIRED_COLUMNS {
        let present = headers
            .iter()
            .any(|header| header.trim_start_matches('\u{feff}') == column);
        if !present {
            return Err(DatasetError::MissingColumn { column });
        }
    }
    let normalized: csv::StringRecord = headers
        .iter()
        .map(|header| header.trim_start_matches('\u{feff}'))
        .collect();
    csv_reader.set_headers(normalized);

    let mut ids = Vec::new();
    let mut applicants = Vec::new();

    for (index, record) in csv_reader.deserialize::<ApplicantRow>().enumerate() {
        let row = record?;
        let line = index as u64 + 2;

        let application_date = row
            .application_date
            .as_deref()
            .and_then(parse_date)
            .ok_or_else(|| DatasetError::ApplicationDate {
                line,
                value: row.application_date.clone().unwrap_or_default(),
            })?;

        ids.push(row.id.as_deref().and_then(parse_identifier));
        applicants.push(Applicant {
            id: None,
            application_date,
            contracts: row.contracts,
        });
    }

    if ids.iter().all(Option::is_some) {
        for (applicant, id) in applicants.iter_mut().zip(ids) {
            applicant.id = id;
        }
    } else {
        let missing = ids.iter().filter(|id| id.is_none()).count();
        warn!(missing, "identifier column dropped for the whole batch");
    }

    info!(rows = applicants.len(), "applicant dataset prepared");
    Ok(applicants)
}

#[derive(Debug, Deserialize)]
struct ApplicantRow {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    id: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    application_date: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    contracts: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

/// Accepts integral text such as `12` or `12.0`.
fn parse_identifier(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if let Ok(id) = trimmed.parse::<i64>() {
        return Some(id);
    }

    trimmed
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && value.fract() == 0.0)
        .map(|value| value as i64)
}
