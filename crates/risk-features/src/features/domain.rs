use chrono::{NaiveDate, NaiveDateTime};
use serde::{Serialize, Serializer};

/// Claim count reported when no valid claim falls inside the lookback window.
pub const DEFAULT_CLAIM_COUNT: i64 = -3;
/// Loan sum reported when no qualifying loan amount exists.
pub const DEFAULT_LOAN_SUM: f64 = -1.0;
/// Loan interval reported when no qualifying past loan exists.
pub const DEFAULT_LOAN_INTERVAL: i64 = -1;

/// One prepared applicant row.
#[derive(Debug, Clone, PartialEq)]
pub struct Applicant {
    /// `None` for every applicant once the batch lost its identifier column.
    pub id: Option<i64>,
    pub application_date: NaiveDate,
    pub contracts: Option<String>,
}

/// Typed view over one embedded contract entry.
///
/// Only the fields the features read are kept. Each one is either present or
/// absent; empty strings, `null` and unparseable values are all absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContractRecord {
    pub claim_id: Option<String>,
    pub claim_date: Option<NaiveDateTime>,
    pub contract_date: Option<NaiveDateTime>,
    pub loan_summa: Option<f64>,
    pub summa: Option<f64>,
    pub bank: Option<String>,
}

impl ContractRecord {
    pub fn is_valid_claim(&self) -> bool {
        self.claim_id.is_some() && self.claim_date.is_some()
    }

    pub fn is_valid_loan(&self) -> bool {
        self.contract_date.is_some()
    }
}

/// All contract records of one applicant, in source order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContractHistory {
    pub records: Vec<ContractRecord>,
    /// Whether any source entry carried a `bank` key, even an empty one.
    pub bank_reported: bool,
}

impl ContractHistory {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ApplicantFeatures {
    pub tot_claim_cnt_l180d: i64,
    #[serde(serialize_with = "serialize_amount")]
    pub disb_bank_loan_wo_tbc: f64,
    pub day_sinlastloan: i64,
}

impl Default for ApplicantFeatures {
    fn default() -> Self {
        Self {
            tot_claim_cnt_l180d: DEFAULT_CLAIM_COUNT,
            disb_bank_loan_wo_tbc: DEFAULT_LOAN_SUM,
            day_sinlastloan: DEFAULT_LOAN_INTERVAL,
        }
    }
}

/// Output row; column order follows field order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureRow {
    pub id: Option<i64>,
    pub tot_claim_cnt_l180d: i64,
    #[serde(serialize_with = "serialize_amount")]
    pub disb_bank_loan_wo_tbc: f64,
    pub day_sinlastloan: i64,
}

impl FeatureRow {
    pub fn new(id: Option<i64>, features: ApplicantFeatures) -> Self {
        Self {
            id,
            tot_claim_cnt_l180d: features.tot_claim_cnt_l180d,
            disb_bank_loan_wo_tbc: features.disb_bank_loan_wo_tbc,
            day_sinlastloan: features.day_sinlastloan,
        }
    }

    pub fn features(&self) -> ApplicantFeatures {
        ApplicantFeatures {
            tot_claim_cnt_l180d: self.tot_claim_cnt_l180d,
            disb_bank_loan_wo_tbc: self.disb_bank_loan_wo_tbc,
            day_sinlastloan: self.day_sinlastloan,
        }
    }
}

/// Whole amounts are written without a fractional part.
fn serialize_amount<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}
