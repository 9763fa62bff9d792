use super::dates::parse_datetime;
use super::domain::{ContractHistory, ContractRecord};
use chrono::NaiveDateTime;
use serde_json::{Map, Value};
use tracing::debug;

/// Local switches for how raw contract text is normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Treat `'` as a string delimiter by rewriting it to `"` before parsing.
    pub relaxed_quotes: bool,
    /// Treat empty and whitespace-only strings as absent values.
    pub empty_as_absent: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            relaxed_quotes: true,
            empty_as_absent: true,
        }
    }
}

/// Turns one applicant's embedded contract text into typed records.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordParser {
    options: ParseOptions,
}

impl RecordParser {
    pub fn new(options: ParseOptions) -> Self {
        Self { options }
    }

    /// Never fails: absent, blank, or malformed text yields an empty history.
    ///
    /// Relaxed quoting is a plain character substitution, so a literal `'`
    /// inside a value breaks the payload and the whole history is dropped.
    pub fn parse(&self, raw: Option<&str>) -> ContractHistory {
        let Some(text) = raw.map(str::trim).filter(|text| !text.is_empty()) else {
            return ContractHistory::default();
        };

        let normalized = if self.options.relaxed_quotes {
            text.replace('\'', "\"")
        } else {
            text.to_string()
        };

        let entries = match serde_json::from_str::<Value>(&normalized) {
            Ok(Value::Object(entry)) => vec![entry],
            Ok(Value::Array(values)) => values
                .into_iter()
                .filter_map(|value| match value {
                    Value::Object(entry) => Some(entry),
                    _ => None,
                })
                .collect(),
            Ok(other) => {
                debug!(
                    kind = json_kind(&other),
                    "contract payload is not a record list"
                );
                return ContractHistory::default();
            }
            Err(err) => {
                debug!(error = %err, "contract payload could not be parsed");
                return ContractHistory::default();
            }
        };

        if entries.iter().all(Map::is_empty) {
            return ContractHistory::default();
        }

        let bank_reported = entries.iter().any(|entry| entry.contains_key("bank"));
        let records = entries
            .iter()
            .map(|entry| self.record_from_entry(entry))
            .collect();

        ContractHistory {
            records,
            bank_reported,
        }
    }

    fn record_from_entry(&self, entry: &Map<String, Value>) -> ContractRecord {
        ContractRecord {
            claim_id: self.text_field(entry, "claim_id"),
            claim_date: self.date_field(entry, "claim_date"),
            contract_date: self.date_field(entry, "contract_date"),
            loan_summa: self.amount_field(entry, "loan_summa"),
            summa: self.amount_field(entry, "summa"),
            bank: self.text_field(entry, "bank"),
        }
    }

    fn text_field(&self, entry: &Map<String, Value>, key: &str) -> Option<String> {
        match entry.get(key)? {
            Value::String(text) => self.present(text).map(str::to_string),
            Value::Number(number) => Some(number.to_string()),
            Value::Bool(flag) => Some(flag.to_string()),
            _ => None,
        }
    }

    fn date_field(&self, entry: &Map<String, Value>, key: &str) -> Option<NaiveDateTime> {
        match entry.get(key)? {
            Value::String(text) => self.present(text).and_then(parse_datetime),
            _ => None,
        }
    }

    fn amount_field(&self, entry: &Map<String, Value>, key: &str) -> Option<f64> {
        let amount = match entry.get(key)? {
            Value::Number(number) => number.as_f64(),
            Value::String(text) => self
                .present(text)
                .and_then(|text| text.trim().parse::<f64>().ok()),
            _ => None,
        };
        amount.filter(|value| value.is_finite())
    }

    fn present<'a>(&self, text: &'a str) -> Option<&'a str> {
        if self.options.empty_as_absent && text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
