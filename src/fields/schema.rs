// Field schema: label variants and value shapes, compiled to regexes once
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::error::SchemaError;

/// Structure of the text expected right after a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueShape {
    /// Anything up to the end of the line.
    Line,
    /// `101° 12' 34.5 W`: decimal seconds, east or west.
    Coordinate,
    /// `MM/DD/YYYY`
    Date,
    Digits,
    Decimal,
}

impl ValueShape {
    fn capture(self) -> &'static str {
        match self {
            ValueShape::Line => r"(.+?)(?:\n|\z)",
            // ASCII digits only
            ValueShape::Coordinate => r"([0-9]+° [0-9]+' [0-9]+\.[0-9]+ [WE])",
            ValueShape::Date => r"([0-9]{2}/[0-9]{2}/[0-9]{4})",
            ValueShape::Digits => r"([0-9]+)",
            ValueShape::Decimal => r"([0-9]+(?:\.[0-9]+)?|\.[0-9]+)",
        }
    }
}

/// What a matched value means once it leaves the extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Text,
    Date,
    Integer,
    Float,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    /// Tried in order; the first one that matches wins.
    pub labels: Vec<String>,
    pub shape: ValueShape,
    pub kind: ValueKind,
}

impl FieldSpec {
    pub fn new(name: &str, labels: &[&str], shape: ValueShape, kind: ValueKind) -> Self {
        Self {
            name: name.to_string(),
            labels: labels.iter().map(|l| l.to_string()).collect(),
            shape,
            kind,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct CompiledField {
    pub(crate) spec: FieldSpec,
    pub(crate) patterns: Vec<Regex>,
}

/// Immutable, shareable set of fields with one precompiled pattern per label.
#[derive(Debug, Clone)]
pub struct FieldSchema {
    fields: Vec<CompiledField>,
}

impl FieldSchema {
    pub fn new(specs: Vec<FieldSpec>) -> Result<Self, SchemaError> {
        let mut seen = HashSet::new();
        let mut fields = Vec::with_capacity(specs.len());

        for spec in specs {
            if !is_identifier(&spec.name) {
                return Err(SchemaError::InvalidFieldName(spec.name));
            }
            if !seen.insert(spec.name.clone()) {
                return Err(SchemaError::DuplicateField(spec.name));
            }
            if spec.labels.iter().all(|l| l.trim().is_empty()) {
                return Err(SchemaError::NoLabels(spec.name));
            }

            let patterns = spec
                .labels
                .iter()
                .filter(|l| !l.trim().is_empty())
                .map(|label| {
                    label_pattern(label, spec.shape).map_err(|source| SchemaError::Pattern {
                        field: spec.name.clone(),
                        label: label.clone(),
                        source,
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;

            fields.push(CompiledField { spec, patterns });
        }

        Ok(Self { fields })
    }

    /// The well stimulation record layout.
    pub fn well_stimulation() -> Result<Self, SchemaError> {
        Self::new(well_stimulation_fields())
    }

    /// Built-in layout with the label variants of some fields replaced.
    pub fn well_stimulation_with_labels(
        overrides: &BTreeMap<String, Vec<String>>,
    ) -> Result<Self, SchemaError> {
        let mut specs = well_stimulation_fields();
        for (name, labels) in overrides {
            let spec = specs
                .iter_mut()
                .find(|s| &s.name == name)
                .ok_or_else(|| SchemaError::UnknownField(name.clone()))?;
            spec.labels = labels.clone();
        }
        Self::new(specs)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn specs(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().map(|f| &f.spec)
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.specs().find(|s| s.name == name)
    }

    pub(crate) fn compiled(&self) -> &[CompiledField] {
        &self.fields
    }
}

/// `<label><separator><value>`, case-insensitive. Labels match literally, with any run
/// of blanks between their words, and cannot start in the middle of a word.
fn label_pattern(label: &str, shape: ValueShape) -> Result<Regex, regex::Error> {
    let label = label.trim();
    let words: Vec<String> = label.split_whitespace().map(regex::escape).collect();
    let boundary = if label.starts_with(|c: char| c.is_alphanumeric() || c == '_') {
        r"\b"
    } else {
        ""
    };
    let pattern = format!(r"{}{}[:\s]+{}", boundary, words.join(r"[ \t]+"), shape.capture());

    RegexBuilder::new(&pattern).case_insensitive(true).build()
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_lowercase() || c == '_')
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

fn well_stimulation_fields() -> Vec<FieldSpec> {
    use ValueKind as K;
    use ValueShape as S;

    vec![
        // "api" alone would swallow "Number: ..." from "API Number: ...", so it goes last
        FieldSpec::new("api", &["api number", "api#", "api"], S::Line, K::Text),
        FieldSpec::new("longitude", &["longitude"], S::Coordinate, K::Text),
        FieldSpec::new("latitude", &["latitude"], S::Coordinate, K::Text),
        FieldSpec::new("well_name", &["well name"], S::Line, K::Text),
        FieldSpec::new("well_number", &["well number"], S::Line, K::Text),
        FieldSpec::new("county", &["county"], S::Line, K::Text),
        FieldSpec::new("city", &["city"], S::Line, K::Text),
        FieldSpec::new("state", &["state"], S::Line, K::Text),
        FieldSpec::new("zip_code", &["zip code", "zip"], S::Digits, K::Text),
        FieldSpec::new("date_stimulated", &["date stimulated"], S::Date, K::Date),
        FieldSpec::new("stimulated_formation", &["stimulated formation"], S::Line, K::Text),
        FieldSpec::new("top_ft", &["top ft", "top (ft)"], S::Digits, K::Integer),
        FieldSpec::new("bottom_ft", &["bottom ft", "bottom (ft)"], S::Digits, K::Integer),
        FieldSpec::new("stimulation_stages", &["stimulation stages"], S::Digits, K::Integer),
        FieldSpec::new("volume", &["volume"], S::Digits, K::Integer),
        FieldSpec::new("volume_units", &["volume units"], S::Line, K::Text),
        FieldSpec::new("type_treatment", &["type treatment"], S::Line, K::Text),
        FieldSpec::new("acid_percent", &["acid percent", "acid%", "acid %"], S::Decimal, K::Float),
        FieldSpec::new("lbs_proppant", &["lbs proppant"], S::Digits, K::Integer),
        FieldSpec::new(
            "maximum_treatment_pressure",
            &["maximum treatment pressure (psi)", "maximum treatment pressure"],
            S::Digits,
            K::Integer,
        ),
        FieldSpec::new(
            "maximum_treatment_rate",
            &["maximum treatment rate (bbls/min)", "maximum treatment rate"],
            S::Decimal,
            K::Float,
        ),
        FieldSpec::new("details", &["details"], S::Line, K::Text),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let schema = FieldSchema::well_stimulation().unwrap();
        assert_eq!(schema.len(), 22);
        assert_eq!(schema.field("date_stimulated").unwrap().kind, ValueKind::Date);
        assert_eq!(schema.field("zip_code").unwrap().shape, ValueShape::Digits);
        assert_eq!(schema.field("zip_code").unwrap().kind, ValueKind::Text);
        assert_eq!(
            schema.field("acid_percent").unwrap().labels,
            vec!["acid percent", "acid%", "acid %"]
        );
    }

    #[test]
    fn test_patterns_compiled_per_label() {
        let schema = FieldSchema::well_stimulation().unwrap();
        for field in schema.compiled() {
            assert_eq!(field.patterns.len(), field.spec.labels.len(), "{}", field.spec.name);
        }
    }

    #[test]
    fn test_label_metacharacters_are_literal() {
        let re = label_pattern("top (ft)", ValueShape::Digits).unwrap();
        assert_eq!(&re.captures("Top (ft): 8450").unwrap()[1], "8450");
        assert!(re.captures("top ft: 8450").is_none());
    }

    #[test]
    fn test_label_needs_word_start() {
        let re = label_pattern("city", ValueShape::Digits).unwrap();
        assert!(re.captures("capacity: 500").is_none());
        assert_eq!(&re.captures("City: 77001").unwrap()[1], "77001");
    }

    #[test]
    fn test_overrides_replace_labels() {
        let mut overrides = BTreeMap::new();
        overrides.insert("county".to_string(), vec!["parish".to_string(), "county".to_string()]);
        let schema = FieldSchema::well_stimulation_with_labels(&overrides).unwrap();
        assert_eq!(schema.field("county").unwrap().labels, vec!["parish", "county"]);
    }

    #[test]
    fn test_override_of_unknown_field_rejected() {
        let mut overrides = BTreeMap::new();
        overrides.insert("operator".to_string(), vec!["operator".to_string()]);
        let err = FieldSchema::well_stimulation_with_labels(&overrides).unwrap_err();
        assert!(matches!(err, SchemaError::UnknownField(name) if name == "operator"));
    }

    #[test]
    fn test_invalid_specs_rejected() {
        let bad_name = FieldSpec::new("Well Name", &["well name"], ValueShape::Line, ValueKind::Text);
        assert!(matches!(FieldSchema::new(vec![bad_name]), Err(SchemaError::InvalidFieldName(_))));

        let no_labels = FieldSpec::new("county", &[" "], ValueShape::Line, ValueKind::Text);
        assert!(matches!(FieldSchema::new(vec![no_labels]), Err(SchemaError::NoLabels(_))));

        let a = FieldSpec::new("county", &["county"], ValueShape::Line, ValueKind::Text);
        assert!(matches!(
            FieldSchema::new(vec![a.clone(), a]),
            Err(SchemaError::DuplicateField(_))
        ));
    }
}
