// Field extraction: first matching label variant per field wins
use tracing::trace;

use super::record::{ExtractedRecord, FieldValue};
use super::schema::{CompiledField, FieldSchema};

/// Match every field of the schema against the whole text. Pure: the same text
/// always gives the same record.
pub fn extract_fields(text: &str, schema: &FieldSchema) -> ExtractedRecord {
    let values = schema
        .compiled()
        .iter()
        .map(|field| FieldValue {
            name: field.spec.name.clone(),
            kind: field.spec.kind,
            value: match_field(text, field),
        })
        .collect();

    ExtractedRecord::from_values(values)
}

fn match_field(text: &str, field: &CompiledField) -> Option<String> {
    for (label, pattern) in field.spec.labels.iter().zip(&field.patterns) {
        // blank captures (label followed by nothing on its line) don't count
        let value = pattern
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().trim())
            .find(|v| !v.is_empty());

        if let Some(value) = value {
            trace!(field = %field.spec.name, label = %label, value, "field matched");
            return Some(value.to_string());
        }
    }
    None
}
