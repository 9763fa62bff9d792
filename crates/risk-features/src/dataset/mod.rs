//! CSV boundary: applicant rows in, feature rows out.

mod reader;
mod writer;

pub use reader::{read_applicants, read_applicants_from_path, REQUIRED_COLUMNS};
pub use writer::{write_features, write_features_to_dir, OUTPUT_COLUMNS};

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("dataset io failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("input is missing required column '{column}'")]
    MissingColumn { column: &'static str },
    #[error("line {line}: could not parse application_date '{value}'")]
    ApplicationDate { line: u64, value: String },
}
