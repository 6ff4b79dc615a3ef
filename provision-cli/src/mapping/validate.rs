//! Mapping-level validation

use serde::{Deserialize, Serialize};

use super::{AttributeDef, HeaderMapping};
use crate::template::scan_tokens;

/// Outcome of validating a mapping. Warnings are reserved for preview-level
/// checks; mapping validation only produces errors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Validate a mapping against the set of required attributes.
///
/// Pure and total: malformed input surfaces as messages, never as an error
/// return.
pub fn validate(mapping: &HeaderMapping, required: &[AttributeDef]) -> ValidationReport {
    let mut errors = Vec::new();

    for def in required.iter().filter(|d| d.required) {
        match mapping.get(&def.name) {
            None => errors.push(format!("required attribute '{}' is not mapped", def.name)),
            Some(template) if template.trim().is_empty() => errors.push(format!(
                "required attribute '{}' maps to an empty template",
                def.name
            )),
            Some(_) => {}
        }
    }

    for entry in mapping.iter() {
        for err in scan_tokens(&entry.template).errors {
            errors.push(format!("attribute '{}': {}", entry.attribute, err));
        }
    }

    ValidationReport {
        is_valid: errors.is_empty(),
        errors,
        warnings: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(pairs: &[(&str, &str)]) -> HeaderMapping {
        pairs
            .iter()
            .map(|(a, t)| (a.to_string(), t.to_string()))
            .collect()
    }

    fn required(names: &[&str]) -> Vec<AttributeDef> {
        names.iter().map(|n| AttributeDef::new(n, true)).collect()
    }

    #[test]
    fn test_valid_mapping() {
        let report = validate(
            &mapping(&[("sAMAccountName", "%sAMAccountName%"), ("sn", "%nom%")]),
            &required(&["sAMAccountName", "sn"]),
        );
        assert!(report.is_valid);
        assert!(report.errors.is_empty());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_missing_required_attribute() {
        let report = validate(&mapping(&[("sn", "%nom%")]), &required(&["sAMAccountName"]));
        assert!(!report.is_valid);
        assert!(report.errors[0].contains("sAMAccountName"));
    }

    #[test]
    fn test_blank_required_template() {
        let report = validate(
            &mapping(&[("sAMAccountName", "   ")]),
            &required(&["sAMAccountName"]),
        );
        assert!(!report.is_valid);
        assert!(report.errors[0].contains("empty template"));
    }

    #[test]
    fn test_scenario_c_unknown_transformation() {
        let report = validate(&mapping(&[("mail", "%prenom:frobnicate%")]), &[]);
        assert!(!report.is_valid);
        assert!(report.errors[0].contains("frobnicate"));
    }

    #[test]
    fn test_unpaired_percent_is_error() {
        let report = validate(&mapping(&[("mail", "%prenom")]), &[]);
        assert!(!report.is_valid);
        assert!(report.errors[0].contains("unpaired"));
    }

    #[test]
    fn test_warnings_channel_stays_empty() {
        let report = validate(&mapping(&[("madeUpAttribute", "%col%")]), &[]);
        assert!(report.warnings.is_empty());
    }
}
