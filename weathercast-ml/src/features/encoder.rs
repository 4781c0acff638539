//! Categorical encoder for the weather condition label.
//!
//! Vocabulary order is lexicographic, so the code of a label depends only on
//! the set of labels seen during fitting, never on row order. Code 0 (the
//! smallest label) doubles as the fallback class for labels that were not in
//! the training vocabulary: serving prefers answering with a biased estimate
//! over refusing the request. Callers can tell the two cases apart through
//! [`Encoded`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Code assigned to labels outside the vocabulary.
pub const FALLBACK_CODE: u32 = 0;

/// Outcome of encoding one label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "code", rename_all = "snake_case")]
pub enum Encoded {
    /// The label is in the vocabulary.
    Known(u32),
    /// The label was never seen during fitting; the fallback class was used.
    Fallback(u32),
}

impl Encoded {
    pub fn code(&self) -> u32 {
        match self {
            Self::Known(code) | Self::Fallback(code) => *code,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }
}

/// Bijection between training-time condition labels and integer codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoricalEncoder {
    classes: Vec<String>,
}

impl CategoricalEncoder {
    /// Fit over the observed labels. Returns `None` when there are none.
    pub fn fit<I, S>(labels: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let classes: BTreeSet<String> = labels
            .into_iter()
            .map(|s| s.as_ref().to_string())
            .collect();
        if classes.is_empty() {
            return None;
        }
        Some(Self {
            classes: classes.into_iter().collect(),
        })
    }

    /// Training-time vocabulary, indexed by code.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Code of a known label.
    pub fn code_of(&self, label: &str) -> Option<u32> {
        self.classes
            .binary_search_by(|c| c.as_str().cmp(label))
            .ok()
            .map(|idx| idx as u32)
    }

    /// Encode a label, substituting the fallback class for unseen labels.
    pub fn encode(&self, label: &str) -> Encoded {
        match self.code_of(label) {
            Some(code) => Encoded::Known(code),
            None => Encoded::Fallback(FALLBACK_CODE),
        }
    }

    /// Label for a code.
    pub fn decode(&self, code: u32) -> Option<&str> {
        self.classes.get(code as usize).map(String::as_str)
    }

    /// Label that unseen inputs are mapped to.
    pub fn fallback_class(&self) -> Option<&str> {
        self.decode(FALLBACK_CODE)
    }

    /// Check the invariants a deserialized encoder must satisfy.
    pub fn validate(&self) -> Result<(), String> {
        if self.classes.is_empty() {
            return Err("encoder vocabulary is empty".to_string());
        }
        if self.classes.windows(2).any(|w| w[0] >= w[1]) {
            return Err("encoder vocabulary is not strictly sorted".to_string());
        }
        Ok(())
    }
}
