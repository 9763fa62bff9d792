use chrono::{NaiveDate, NaiveDateTime, Utc};
use clap::Args;
use risk_features::config::AppConfig;
use risk_features::dataset;
use risk_features::error::AppError;
use risk_features::features::dates;
use risk_features::features::{
    Applicant, ApplicantFeatures, FeatureCalculator, FeatureSettings, FeatureTableBuilder,
    ParseOptions, RecordParser,
};
use risk_features::telemetry;
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug, Default)]
pub(crate) struct RunArgs {
    /// Applicant CSV to read (overrides CSV_PATH)
    #[arg(long)]
    pub(crate) input: Option<PathBuf>,
    /// Directory for the feature CSV (overrides CSV_DIR)
    #[arg(long)]
    pub(crate) output_dir: Option<PathBuf>,
    /// File name of the feature CSV (overrides OUTPUT_CSV_NAME)
    #[arg(long)]
    pub(crate) output_name: Option<String>,
    /// Processing time in UTC anchoring the claim window (defaults to now)
    #[arg(long, value_parser = parse_reference)]
    pub(crate) as_of: Option<NaiveDateTime>,
}

#[derive(Args, Debug)]
pub(crate) struct InspectArgs {
    /// Raw contract-history payload, single or double quoted JSON
    #[arg(long)]
    pub(crate) contracts: Option<String>,
    /// Application date of the applicant
    #[arg(long, value_parser = parse_application_date)]
    pub(crate) application_date: NaiveDate,
    /// Processing time in UTC anchoring the claim window (defaults to now)
    #[arg(long, value_parser = parse_reference)]
    pub(crate) as_of: Option<NaiveDateTime>,
}

pub(crate) fn run_features(mut args: RunArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(input) = args.input.take() {
        config.dataset.input_path = Some(input);
    }
    if let Some(output_dir) = args.output_dir.take() {
        config.dataset.output_dir = Some(output_dir);
    }
    if let Some(output_name) = args.output_name.take() {
        config.dataset.output_name = output_name;
    }

    telemetry::init(&config.telemetry)?;
    info!(?config.environment, "risk feature pipeline starting");

    let reference = reference_or_now(args.as_of);
    execute(&config, reference)?;
    Ok(())
}

/// Reads, computes, and writes; returns the path of the written CSV.
pub(crate) fn execute(
    config: &AppConfig,
    reference: NaiveDateTime,
) -> Result<PathBuf, AppError> {
    let input = config.dataset.input_path()?;
    let output_dir = config.dataset.output_dir()?;

    let applicants = dataset::read_applicants_from_path(input)?;
    info!(rows = applicants.len(), "applicant dataset ready for analysis");

    let rows = table_builder(config.features.clone(), reference).build(&applicants);
    info!(%reference, "all features calculated");

    let path = dataset::write_features_to_dir(output_dir, &config.dataset.output_name, &rows)?;
    Ok(path)
}

pub(crate) fn run_inspect(args: InspectArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let features = inspect(&args, config.features);
    println!("{}", serde_json::to_string_pretty(&features)?);
    Ok(())
}

fn inspect(args: &InspectArgs, settings: FeatureSettings) -> ApplicantFeatures {
    let reference = reference_or_now(args.as_of);
    let applicant = Applicant {
        id: None,
        application_date: args.application_date,
        contracts: args.contracts.clone(),
    };

    table_builder(settings, reference).features_for_applicant(&applicant)
}

fn table_builder(settings: FeatureSettings, reference: NaiveDateTime) -> FeatureTableBuilder {
    FeatureTableBuilder::new(
        RecordParser::new(ParseOptions::default()),
        FeatureCalculator::new(settings, reference),
    )
}

/// Missing `--as-of` means the current UTC time, matching how offset-aware
/// input dates are normalized.
fn reference_or_now(as_of: Option<NaiveDateTime>) -> NaiveDateTime {
    as_of.unwrap_or_else(|| Utc::now().naive_utc())
}

fn parse_reference(raw: &str) -> Result<NaiveDateTime, String> {
    dates::parse_datetime(raw)
        .ok_or_else(|| format!("failed to parse '{raw}' as a date or date-time"))
}

fn parse_application_date(raw: &str) -> Result<NaiveDate, String> {
    dates::parse_date(raw).ok_or_else(|| format!("failed to parse '{raw}' as a date"))
}
