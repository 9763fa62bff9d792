//! Contract-history parsing and risk feature calculation.

mod calculator;
pub mod dates;
pub mod domain;
mod parser;
mod table;

pub use calculator::{
    FeatureCalculator, FeatureSettings, DEFAULT_CLAIM_LOOKBACK_DAYS, EXCLUDED_BANK_CODES,
};
pub use domain::{
    Applicant, ApplicantFeatures, ContractHistory, ContractRecord, FeatureRow,
    DEFAULT_CLAIM_COUNT, DEFAULT_LOAN_INTERVAL, DEFAULT_LOAN_SUM,
};
pub use parser::{ParseOptions, RecordParser};
pub use table::FeatureTableBuilder;
