use super::calculator::FeatureCalculator;
use super::domain::{Applicant, ApplicantFeatures, FeatureRow};
use super::parser::RecordParser;
use tracing::{debug, info};

/// Runs parsing and calculation for a batch of applicants.
#[derive(Debug, Clone)]
pub struct FeatureTableBuilder {
    parser: RecordParser,
    calculator: FeatureCalculator,
}

impl FeatureTableBuilder {
    pub fn new(parser: RecordParser, calculator: FeatureCalculator) -> Self {
        Self { parser, calculator }
    }

    /// One output row per applicant, in input order.
    ///
    /// Applicants are independent: one without usable contract history
    /// always gets the fixed defaults, whatever came before it.
    pub fn build(&self, applicants: &[Applicant]) -> Vec<FeatureRow> {
        let mut without_history = 0usize;
        let rows: Vec<FeatureRow> = applicants
            .iter()
            .map(|applicant| {
                let (features, had_history) = self.features_for(applicant);
                if !had_history {
                    without_history += 1;
                }
                FeatureRow::new(applicant.id, features)
            })
            .collect();

        info!(applicants = rows.len(), without_history, "feature table built");
        rows
    }

    pub fn features_for_applicant(&self, applicant: &Applicant) -> ApplicantFeatures {
        self.features_for(applicant).0
    }

    fn features_for(&self, applicant: &Applicant) -> (ApplicantFeatures, bool) {
        let history = self.parser.parse(applicant.contracts.as_deref());
        if history.is_empty() {
            debug!(id = ?applicant.id, "no usable contract history, using defaults");
            return (ApplicantFeatures::default(), false);
        }

        let features = self
            .calculator
            .calculate(&history, applicant.application_date);
        (features, true)
    }
}
