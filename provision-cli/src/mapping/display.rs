//! UI-facing projection of mapping entries

use serde::{Deserialize, Serialize};

use super::{HeaderMapping, extract_columns};
use crate::template::scan_tokens;

/// Derived view of one mapping entry, recomputed whenever the template
/// changes; never independently mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingDisplayItem {
    pub ad_attribute: String,
    pub template: String,
    /// Whether the template contains at least one `%` (i.e. is not a literal).
    pub is_template: bool,
    /// Referenced column names, deduplicated, in first-seen order.
    pub estimated_columns: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_required: Option<bool>,
    /// First syntax problem with the template, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<String>,
}

/// Project a mapping into display items.
pub fn to_display_items(mapping: &HeaderMapping) -> Vec<MappingDisplayItem> {
    mapping
        .iter()
        .map(|entry| {
            let scan = scan_tokens(&entry.template);
            MappingDisplayItem {
                ad_attribute: entry.attribute.clone(),
                template: entry.template.clone(),
                is_template: entry.template.contains('%'),
                estimated_columns: extract_columns(&entry.template),
                is_required: None,
                validation: scan.errors.first().map(|e| e.to_string()),
            }
        })
        .collect()
}

/// Rebuild a mapping from display items.
///
/// Items with an empty attribute or an empty template are skipped; the
/// round-trip is only guaranteed for fully filled-in entries.
pub fn from_display_items(items: &[MappingDisplayItem]) -> HeaderMapping {
    items
        .iter()
        .filter(|item| !item.ad_attribute.is_empty() && !item.template.is_empty())
        .map(|item| (item.ad_attribute.clone(), item.template.clone()))
        .collect()
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

    #[test]
    fn test_to_display_items_flags_templates() {
        let items = to_display_items(&mapping(&[
            ("mail", "%prenom%@school.org"),
            ("company", "School"),
        ]));

        assert_eq!(items.len(), 2);
        assert!(items[0].is_template);
        assert_eq!(items[0].estimated_columns, vec!["prenom"]);
        assert!(!items[1].is_template);
        assert!(items[1].estimated_columns.is_empty());
    }

    #[test]
    fn test_to_display_items_reports_syntax_problems() {
        let items = to_display_items(&mapping(&[("mail", "%prenom")]));
        assert!(items[0].validation.as_deref().unwrap().contains("unpaired"));
    }

    #[test]
    fn test_round_trip_preserves_filled_entries() {
        let original = mapping(&[
            ("sAMAccountName", "%sAMAccountName%"),
            ("mail", "%prenom%.%nom%@school.org"),
        ]);
        assert_eq!(from_display_items(&to_display_items(&original)), original);
    }

    #[test]
    fn test_from_display_items_skips_partial_entries() {
        let mut items = to_display_items(&mapping(&[("mail", "%prenom%")]));
        items.push(MappingDisplayItem {
            ad_attribute: String::new(),
            template: "%nom%".to_string(),
            is_template: true,
            estimated_columns: vec!["nom".to_string()],
            is_required: None,
            validation: None,
        });
        items.push(MappingDisplayItem {
            ad_attribute: "sn".to_string(),
            template: String::new(),
            is_template: false,
            estimated_columns: Vec::new(),
            is_required: None,
            validation: None,
        });

        let rebuilt = from_display_items(&items);
        assert_eq!(rebuilt.len(), 1);
        assert_eq!(rebuilt.get("mail"), Some("%prenom%"));
    }
}
