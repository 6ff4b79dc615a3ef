//! Per-entry previews of a mapping applied to a sample row

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{AttributeDef, HeaderMapping, extract_columns};
use crate::template::{render, scan_tokens};

/// Ephemeral preview of one mapping entry rendered against a sample row.
/// Recomputed per call, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingPreview {
    pub ad_attribute: String,
    pub template: String,
    /// Raw value of the first referenced column only, as a display convenience.
    pub sample_value: String,
    pub transformed_value: String,
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub warnings: Vec<String>,
}

/// Render every mapping entry against a sample row and collect validation
/// state, unknown-attribute warnings, and required-but-empty errors.
pub fn generate_previews(
    mapping: &HeaderMapping,
    sample_row: &HashMap<String, String>,
    known_attributes: &[AttributeDef],
) -> Vec<MappingPreview> {
    mapping
        .iter()
        .map(|entry| {
            let scan = scan_tokens(&entry.template);
            let transformed_value = render(&entry.template, sample_row);

            let sample_value = extract_columns(&entry.template)
                .first()
                .and_then(|column| sample_row.get(column))
                .cloned()
                .unwrap_or_default();

            let known = known_attributes
                .iter()
                .find(|def| def.name.eq_ignore_ascii_case(&entry.attribute));

            let mut warnings = Vec::new();
            if known.is_none() {
                warnings.push(format!(
                    "'{}' is not a known directory attribute",
                    entry.attribute
                ));
            }

            let mut errors: Vec<String> = scan.errors.iter().map(|e| e.to_string()).collect();
            if known.is_some_and(|def| def.required) && transformed_value.is_empty() {
                errors.push(format!(
                    "required attribute '{}' produced an empty value",
                    entry.attribute
                ));
            }

            MappingPreview {
                ad_attribute: entry.attribute.clone(),
                template: entry.template.clone(),
                sample_value,
                transformed_value,
                is_valid: errors.is_empty(),
                error: if errors.is_empty() {
                    None
                } else {
                    Some(errors.join("; "))
                },
                warnings,
            }
        })
        .collect()
}
