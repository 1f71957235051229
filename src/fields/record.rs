// Extracted record: one slot per schema field, absent when nothing matched
use serde::ser::{Serialize, SerializeMap, Serializer};

use super::schema::ValueKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValue {
    pub name: String,
    pub kind: ValueKind,
    pub value: Option<String>,
}

/// Values in schema order. Every schema field is present, matched or not.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtractedRecord {
    fields: Vec<FieldValue>,
}

impl ExtractedRecord {
    pub(crate) fn from_values(fields: Vec<FieldValue>) -> Self {
        Self { fields }
    }

    /// The matched value, or None when the field is absent or not in the schema.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .and_then(|f| f.value.as_deref())
    }

    pub fn fields(&self) -> &[FieldValue] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn matched_count(&self) -> usize {
        self.fields.iter().filter(|f| f.value.is_some()).count()
    }
}

impl Serialize for ExtractedRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for field in &self.fields {
            map.serialize_entry(&field.name, &field.value)?;
        }
        map.end()
    }
}
