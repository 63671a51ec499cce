//! Label → integer codes for categorical fields, with an "Unknown" fallback for drift.

use crate::error::{Result, RiskError};
use crate::records::CategoricalField;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, warn};

pub const UNKNOWN_LABEL: &str = "Unknown";

/// Whether preparation may fit encoders for fields seen for the first time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeMode {
    /// Fit encoders for new fields; already fitted fields are drift-handled.
    Fit,
    /// Encoders must already exist; unseen labels map to Unknown.
    Transform,
}

#[derive(Debug, Clone)]
pub struct CategoricalEncoder {
    /// Known labels; position is the code
    classes: Vec<String>,
    index: HashMap<String, usize>,
    unknown_code: usize,
}

impl CategoricalEncoder {
    /// Codes distinct labels in ascending order, then appends Unknown unless present.
    pub fn fit<'a>(labels: impl IntoIterator<Item = &'a str>) -> Self {
        let distinct: BTreeSet<&str> = labels.into_iter().collect();
        let mut classes: Vec<String> = distinct.into_iter().map(String::from).collect();
        let unknown_code = match classes.iter().position(|c| c == UNKNOWN_LABEL) {
            Some(code) => code,
            None => {
                classes.push(UNKNOWN_LABEL.to_string());
                classes.len() - 1
            }
        };
        let index = classes
            .iter()
            .enumerate()
            .map(|(code, label)| (label.clone(), code))
            .collect();
        Self {
            classes,
            index,
            unknown_code,
        }
    }

    /// Code for `label`, or the Unknown code if it was not seen at fit time.
    pub fn encode(&self, label: &str) -> usize {
        self.lookup(label).unwrap_or(self.unknown_code)
    }

    pub fn lookup(&self, label: &str) -> Option<usize> {
        self.index.get(label).copied()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.lookup(label).is_some()
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn unknown_code(&self) -> usize {
        self.unknown_code
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// One encoder per categorical field, created on first fit and never renumbered.
#[derive(Debug, Clone, Default)]
pub struct EncoderRegistry {
    encoders: BTreeMap<CategoricalField, CategoricalEncoder>,
}

impl EncoderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fit `field` on first call; later calls leave the label set untouched and
    /// code unseen labels as Unknown.
    pub fn fit_or_extend<'a>(
        &mut self,
        field: CategoricalField,
        labels: impl IntoIterator<Item = &'a str>,
    ) -> Vec<usize> {
        let labels: Vec<&str> = labels.into_iter().collect();
        let encoder = self.encoders.entry(field).or_insert_with(|| {
            let enc = CategoricalEncoder::fit(labels.iter().copied());
            debug!(field = %field, classes = enc.len(), "fitted categorical encoder");
            enc
        });
        encode_all(field, encoder, &labels)
    }

    /// Code for a single label. Unseen labels get the Unknown code.
    pub fn encode(&self, field: CategoricalField, label: &str) -> Result<usize> {
        self.encoders
            .get(&field)
            .map(|enc| enc.encode(label))
            .ok_or_else(|| RiskError::UnfittedEncoder(field.to_string()))
    }

    /// Encode a whole column according to `mode`.
    pub fn encode_column<'a>(
        &mut self,
        field: CategoricalField,
        labels: impl IntoIterator<Item = &'a str>,
        mode: EncodeMode,
    ) -> Result<Vec<usize>> {
        match mode {
            EncodeMode::Fit => Ok(self.fit_or_extend(field, labels)),
            EncodeMode::Transform => self.transform_column(field, labels),
        }
    }

    /// Encode a column with an already fitted encoder; never mutates.
    pub fn transform_column<'a>(
        &self,
        field: CategoricalField,
        labels: impl IntoIterator<Item = &'a str>,
    ) -> Result<Vec<usize>> {
        let encoder = self
            .encoders
            .get(&field)
            .ok_or_else(|| RiskError::UnfittedEncoder(field.to_string()))?;
        let labels: Vec<&str> = labels.into_iter().collect();
        Ok(encode_all(field, encoder, &labels))
    }

    pub fn get(&self, field: CategoricalField) -> Option<&CategoricalEncoder> {
        self.encoders.get(&field)
    }

    pub fn is_fitted(&self, field: CategoricalField) -> bool {
        self.encoders.contains_key(&field)
    }

    pub fn len(&self) -> usize {
        self.encoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.encoders.is_empty()
    }
}

fn encode_all(field: CategoricalField, encoder: &CategoricalEncoder, labels: &[&str]) -> Vec<usize> {
    let mut unseen = 0usize;
    let codes: Vec<usize> = labels
        .iter()
        .map(|label| match encoder.lookup(label) {
            Some(code) => code,
            None => {
                unseen += 1;
                encoder.unknown_code()
            }
        })
        .collect();
    if unseen > 0 {
        warn!(field = %field, unseen, "unseen labels encoded as Unknown");
    }
    codes
}
