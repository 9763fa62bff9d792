use super::domain::{
    ApplicantFeatures, ContractHistory, ContractRecord, DEFAULT_CLAIM_COUNT,
    DEFAULT_LOAN_INTERVAL, DEFAULT_LOAN_SUM,
};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use std::collections::HashSet;

pub const DEFAULT_CLAIM_LOOKBACK_DAYS: u32 = 180;

/// Bank codes whose loans do not count toward the external loan sum.
pub const EXCLUDED_BANK_CODES: [&str; 4] = ["LIZ", "LOM", "MKO", "SUG"];

/// Tunables for the feature formulas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSettings {
    pub claim_lookback_days: u32,
    pub excluded_banks: Vec<String>,
}

impl Default for FeatureSettings {
    fn default() -> Self {
        Self {
            claim_lookback_days: DEFAULT_CLAIM_LOOKBACK_DAYS,
            excluded_banks: EXCLUDED_BANK_CODES
                .iter()
                .map(|code| code.to_string())
                .collect(),
        }
    }
}

/// Computes the three risk features for one applicant.
///
/// `reference` stands in for "now" when evaluating the claim lookback
/// window, so a run over the same batch always produces the same output.
#[derive(Debug, Clone)]
pub struct FeatureCalculator {
    settings: FeatureSettings,
    reference: NaiveDateTime,
}

impl FeatureCalculator {
    pub fn new(settings: FeatureSettings, reference: NaiveDateTime) -> Self {
        Self {
            settings,
            reference,
        }
    }

    pub fn calculate(
        &self,
        history: &ContractHistory,
        application_date: NaiveDate,
    ) -> ApplicantFeatures {
        ApplicantFeatures {
            tot_claim_cnt_l180d: self.total_claims(&history.records),
            disb_bank_loan_wo_tbc: self.loan_sum(history),
            day_sinlastloan: self.days_since_last_loan(&history.records, application_date),
        }
    }

    /// Distinct claim ids with a claim date inside the lookback window.
    fn total_claims(&self, records: &[ContractRecord]) -> i64 {
        let lookback = Duration::days(i64::from(self.settings.claim_lookback_days));
        let window_start = self.reference - lookback;

        let claim_ids: HashSet<&str> = records
            .iter()
            .filter(|record| record.is_valid_claim())
            .filter(|record| record.claim_date.is_some_and(|date| date >= window_start))
            .filter_map(|record| record.claim_id.as_deref())
            .collect();

        if claim_ids.is_empty() {
            DEFAULT_CLAIM_COUNT
        } else {
            claim_ids.len() as i64
        }
    }

    /// Sum of loan amounts, skipping excluded and unknown banks.
    fn loan_sum(&self, history: &ContractHistory) -> f64 {
        let loans: Vec<&ContractRecord> = history
            .records
            .iter()
            .filter(|record| record.is_valid_loan() && record.loan_summa.is_some())
            .collect();

        if loans.is_empty() || !history.bank_reported {
            return DEFAULT_LOAN_SUM;
        }

        loans
            .into_iter()
            .filter(|record| !self.is_excluded_bank(record.bank.as_deref()))
            .filter_map(|record| record.loan_summa)
            .sum()
    }

    fn is_excluded_bank(&self, bank: Option<&str>) -> bool {
        match bank {
            Some(code) => self
                .settings
                .excluded_banks
                .iter()
                .any(|excluded| excluded == code),
            None => true,
        }
    }

    /// Whole days between the latest past loan and the application date.
    ///
    /// Contract timestamps keep their time of day; anything after midnight of
    /// the application date counts as a future contract.
    fn days_since_last_loan(
        &self,
        records: &[ContractRecord],
        application_date: NaiveDate,
    ) -> i64 {
        let application_start = application_date.and_time(NaiveTime::MIN);

        records
            .iter()
            .filter(|record| record.is_valid_loan() && record.summa.is_some())
            .filter_map(|record| record.contract_date)
            .filter(|contract_date| *contract_date <= application_start)
            .max()
            .map(|latest| (application_start - latest).num_days())
            .unwrap_or(DEFAULT_LOAN_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    fn at_midnight(date: NaiveDate) -> NaiveDateTime {
        date.and_hms_opt(0, 0, 0).expect("valid time")
    }

    fn calculator() -> FeatureCalculator {
        FeatureCalculator::new(FeatureSettings::default(), at_midnight(ymd(2024, 7, 1)))
    }

    fn claim(id: &str, date: NaiveDate) -> ContractRecord {
        ContractRecord {
            claim_id: Some(id.to_string()),
            claim_date: Some(at_midnight(date)),
            ..ContractRecord::default()
        }
    }

    fn loan(amount: f64, bank: Option<&str>) -> ContractRecord {
        ContractRecord {
            contract_date: Some(at_midnight(ymd(2024, 1, 10))),
            loan_summa: Some(amount),
            bank: bank.map(str::to_string),
            ..ContractRecord::default()
        }
    }

    fn history(records: Vec<ContractRecord>) -> ContractHistory {
        let bank_reported = records.iter().any(|record| record.bank.is_some());
        ContractHistory {
            records,
            bank_reported,
        }
    }

    #[test]
    fn claims_are_deduplicated_by_id() {
        let records = vec![
            claim("A", ymd(2024, 6, 1)),
            claim("A", ymd(2024, 6, 15)),
            claim("B", ymd(2024, 5, 20)),
        ];
        let features = calculator().calculate(&history(records), ymd(2024, 6, 30));
        assert_eq!(features.tot_claim_cnt_l180d, 2);
    }

    #[test]
    fn claims_outside_window_or_incomplete_are_ignored() {
        let records = vec![
            claim("old", ymd(2023, 12, 1)),
            ContractRecord {
                claim_id: Some("no-date".to_string()),
                ..ContractRecord::default()
            },
            ContractRecord {
                claim_date: Some(at_midnight(ymd(2024, 6, 1))),
                ..ContractRecord::default()
            },
        ];
        let features = calculator().calculate(&history(records), ymd(2024, 6, 30));
        assert_eq!(features.tot_claim_cnt_l180d, DEFAULT_CLAIM_COUNT);
    }

    #[test]
    fn claim_window_is_inclusive() {
        // 2024-07-01 minus 180 days.
        let records = vec![claim("edge", ymd(2024, 1, 3))];
        let features = calculator().calculate(&history(records), ymd(2024, 6, 30));
        assert_eq!(features.tot_claim_cnt_l180d, 1);
    }

    #[test]
    fn loan_sum_skips_excluded_and_unknown_banks() {
        let records = vec![
            loan(100.0, Some("LIZ")),
            loan(200.0, Some("OTHER")),
            loan(300.0, None),
        ];
        let features = calculator().calculate(&history(records), ymd(2024, 6, 30));
        assert_eq!(features.disb_bank_loan_wo_tbc, 200.0);
    }

    #[test]
    fn loan_sum_is_zero_when_every_bank_is_excluded() {
        let records = vec![loan(100.0, Some("MKO")), loan(50.0, Some("SUG"))];
        let features = calculator().calculate(&history(records), ymd(2024, 6, 30));
        assert_eq!(features.disb_bank_loan_wo_tbc, 0.0);
    }

    #[test]
    fn loan_sum_defaults_without_bank_field_or_loans() {
        let no_bank = ContractHistory {
            records: vec![loan(100.0, None)],
            bank_reported: false,
        };
        let features = calculator().calculate(&no_bank, ymd(2024, 6, 30));
        assert_eq!(features.disb_bank_loan_wo_tbc, DEFAULT_LOAN_SUM);

        let without_amount = ContractRecord {
            loan_summa: None,
            ..loan(0.0, Some("OTHER"))
        };
        let features =
            calculator().calculate(&history(vec![without_amount]), ymd(2024, 6, 30));
        assert_eq!(features.disb_bank_loan_wo_tbc, DEFAULT_LOAN_SUM);
    }

    #[test]
    fn custom_exclusion_list_is_honored() {
        let settings = FeatureSettings {
            excluded_banks: vec!["OTHER".to_string()],
            ..FeatureSettings::default()
        };
        let calculator = FeatureCalculator::new(settings, at_midnight(ymd(2024, 7, 1)));
        let records = vec![loan(100.0, Some("LIZ")), loan(200.0, Some("OTHER"))];
        let features = calculator.calculate(&history(records), ymd(2024, 6, 30));
        assert_eq!(features.disb_bank_loan_wo_tbc, 100.0);
    }

    #[test]
    fn days_since_last_loan_ignores_future_contracts() {
        let application_date = ymd(2024, 6, 30);
        let records = vec![
            ContractRecord {
                contract_date: Some(at_midnight(application_date + Duration::days(5))),
                summa: Some(1000.0),
                ..ContractRecord::default()
            },
            ContractRecord {
                contract_date: Some(at_midnight(application_date - Duration::days(10))),
                summa: Some(500.0),
                ..ContractRecord::default()
            },
        ];
        let features = calculator().calculate(&history(records), application_date);
        assert_eq!(features.day_sinlastloan, 10);
    }

    #[test]
    fn contract_later_on_application_day_counts_as_future() {
        let application_date = ymd(2024, 6, 30);
        let records = vec![ContractRecord {
            contract_date: application_date.and_hms_opt(15, 45, 0),
            summa: Some(10.0),
            ..ContractRecord::default()
        }];
        let features = calculator().calculate(&history(records), application_date);
        assert_eq!(features.day_sinlastloan, DEFAULT_LOAN_INTERVAL);
    }

    #[test]
    fn midnight_contract_on_application_day_counts_as_zero_days() {
        let application_date = ymd(2024, 6, 30);
        let records = vec![ContractRecord {
            contract_date: Some(at_midnight(application_date)),
            summa: Some(10.0),
            ..ContractRecord::default()
        }];
        let features = calculator().calculate(&history(records), application_date);
        assert_eq!(features.day_sinlastloan, 0);
    }

    #[test]
    fn partial_days_since_a_timed_contract_round_down() {
        let application_date = ymd(2024, 6, 30);
        let records = vec![
            ContractRecord {
                contract_date: ymd(2024, 6, 20).and_hms_opt(15, 0, 0),
                summa: Some(1.0),
                ..ContractRecord::default()
            },
            ContractRecord {
                contract_date: application_date.and_hms_opt(15, 45, 0),
                summa: Some(1.0),
                ..ContractRecord::default()
            },
        ];
        let features = calculator().calculate(&history(records), application_date);
        assert_eq!(features.day_sinlastloan, 9);
    }

    #[test]
    fn days_since_last_loan_requires_summa() {
        let records = vec![loan(100.0, Some("OTHER"))];
        let features = calculator().calculate(&history(records), ymd(2024, 6, 30));
        assert_eq!(features.day_sinlastloan, DEFAULT_LOAN_INTERVAL);
    }

    #[test]
    fn features_are_computed_independently() {
        let records = vec![
            claim("A", ymd(2024, 6, 1)),
            ContractRecord {
                contract_date: Some(at_midnight(ymd(2024, 6, 20))),
                summa: Some(10.0),
                ..ContractRecord::default()
            },
        ];
        let features = calculator().calculate(&history(records), ymd(2024, 6, 30));
        assert_eq!(features.tot_claim_cnt_l180d, 1);
        assert_eq!(features.disb_bank_loan_wo_tbc, DEFAULT_LOAN_SUM);
        assert_eq!(features.day_sinlastloan, 10);
    }
}
