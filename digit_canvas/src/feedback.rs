use crate::prediction::Digit;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A correctness judgement on one prediction. Sent once, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedbackRecord {
    pub prediction: Digit,
    pub correct: bool,
    pub true_label: Option<Digit>,
}

impl FeedbackRecord {
    pub fn new(prediction: Digit, correct: bool, true_label: Option<Digit>) -> Self {
        // A confirmed prediction is its own label.
        let true_label = match (correct, true_label) {
            (true, _) => Some(prediction),
            (false, label) => label,
        };
        Self {
            prediction,
            correct,
            true_label,
        }
    }

    pub(crate) fn to_wire(self) -> FeedbackPayload {
        FeedbackPayload {
            prediction: self.prediction,
            correct: u8::from(self.correct),
            true_label: self.true_label,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct FeedbackPayload {
    prediction: Digit,
    correct: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    true_label: Option<Digit>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigitStats {
    pub digit: Digit,
    #[serde(default)]
    pub correct: u64,
    #[serde(default)]
    pub incorrect: u64,
}

impl DigitStats {
    pub fn total(&self) -> u64 {
        self.correct + self.incorrect
    }
}

#[derive(Debug, Deserialize)]
struct Counts {
    #[serde(default)]
    correct: u64,
    #[serde(default)]
    incorrect: u64,
}

/// The stats endpoint answers either keyed by digit or as a list of rows.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StatsWire {
    Rows(Vec<DigitStats>),
    Keyed(BTreeMap<String, Counts>),
}

/// Per-digit feedback counts, sorted by digit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FeedbackStats {
    rows: Vec<DigitStats>,
}

impl FeedbackStats {
    pub fn from_json(body: &str) -> Result<Self, String> {
        let wire: StatsWire = serde_json::from_str(body).map_err(|e| e.to_string())?;
        let mut rows = match wire {
            StatsWire::Rows(rows) => rows,
            StatsWire::Keyed(map) => map
                .into_iter()
                .map(|(key, counts)| {
                    let digit = key
                        .trim()
                        .parse::<u8>()
                        .ok()
                        .and_then(Digit::new)
                        .ok_or_else(|| format!("{key} is not a digit"))?;
                    Ok(DigitStats {
                        digit,
                        correct: counts.correct,
                        incorrect: counts.incorrect,
                    })
                })
                .collect::<Result<Vec<_>, String>>()?,
        };
        rows.sort_by_key(|row| row.digit);
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[DigitStats] {
        &self.rows
    }

    pub fn get(&self, digit: Digit) -> Option<&DigitStats> {
        self.rows.iter().find(|row| row.digit == digit)
    }
}
