//! Attribute mapping model
//!
//! A [`HeaderMapping`] maps directory attribute names to template strings. All
//! derived views (display items, validation, previews) are recomputed from the
//! mapping; nothing here mutates independently.

mod display;
mod editor;
mod preview;
mod validate;

pub use display::{MappingDisplayItem, from_display_items, to_display_items};
pub use editor::{MappingEditor, MappingEvent, MappingViews};
pub use preview::{MappingPreview, generate_previews};
pub use validate::{ValidationReport, validate};

use serde::{Deserialize, Serialize};

use crate::template::scan_tokens;

/// One attribute-to-template entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingEntry {
    pub attribute: String,
    pub template: String,
}

/// Ordered mapping from directory attribute name to template string.
///
/// Keys are unique and non-empty; insertion order is preserved so previews and
/// display items line up with how the user entered the mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HeaderMapping {
    entries: Vec<MappingEntry>,
}

impl HeaderMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the template for an attribute. Replacing keeps the
    /// entry's original position. Empty attribute names are ignored.
    pub fn set(&mut self, attribute: &str, template: &str) {
        if attribute.is_empty() {
            return;
        }
        match self.entries.iter_mut().find(|e| e.attribute == attribute) {
            Some(entry) => entry.template = template.to_string(),
            None => self.entries.push(MappingEntry {
                attribute: attribute.to_string(),
                template: template.to_string(),
            }),
        }
    }

    pub fn get(&self, attribute: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.attribute == attribute)
            .map(|e| e.template.as_str())
    }

    pub fn remove(&mut self, attribute: &str) {
        self.entries.retain(|e| e.attribute != attribute);
    }

    pub fn iter(&self) -> impl Iterator<Item = &MappingEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, String)> for HeaderMapping {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut mapping = Self::new();
        for (attribute, template) in iter {
            mapping.set(&attribute, &template);
        }
        mapping
    }
}

/// Definition of a known directory attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDef {
    pub name: String,
    pub required: bool,
}

impl AttributeDef {
    pub fn new(name: &str, required: bool) -> Self {
        Self {
            name: name.to_string(),
            required,
        }
    }
}

/// Unique column names referenced by a template, in first-seen order.
pub fn extract_columns(template: &str) -> Vec<String> {
    let mut columns = Vec::new();
    for token in scan_tokens(template).tokens {
        if !token.column.is_empty() && !columns.contains(&token.column) {
            columns.push(token.column);
        }
    }
    columns
}

/// Transformation segment of the first token, if any.
pub fn extract_transformation(template: &str) -> Option<String> {
    scan_tokens(template)
        .tokens
        .into_iter()
        .next()
        .and_then(|t| t.transform)
}

/// Rewrite the first token's transformation, leaving every other token alone.
///
/// `Some(name)` adds or replaces the transformation, `None` strips it. A
/// template without tokens is returned unchanged.
pub fn set_transformation(template: &str, transformation: Option<&str>) -> String {
    let scan = scan_tokens(template);
    let Some(first) = scan.tokens.first() else {
        return template.to_string();
    };

    let replacement = match transformation {
        Some(name) => format!("%{}:{}%", first.column, name),
        None => format!("%{}%", first.column),
    };

    let mut out = String::with_capacity(template.len() + replacement.len());
    out.push_str(&template[..first.start]);
    out.push_str(&replacement);
    out.push_str(&template[first.end..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_replaces_in_place() {
        let mut mapping = HeaderMapping::new();
        mapping.set("mail", "%prenom%@school.org");
        mapping.set("sn", "%nom%");
        mapping.set("mail", "%prenom%.%nom%@school.org");

        let attributes: Vec<_> = mapping.iter().map(|e| e.attribute.as_str()).collect();
        assert_eq!(attributes, vec!["mail", "sn"]);
        assert_eq!(mapping.get("mail"), Some("%prenom%.%nom%@school.org"));
    }

    #[test]
    fn test_set_ignores_empty_attribute() {
        let mut mapping = HeaderMapping::new();
        mapping.set("", "%prenom%");
        assert!(mapping.is_empty());
    }

    #[test]
    fn test_extract_columns_deduplicates() {
        let columns = extract_columns("%prenom%.%nom% (%prenom:first%)");
        assert_eq!(columns, vec!["prenom", "nom"]);
    }

    #[test]
    fn test_extract_columns_first_seen_order() {
        let columns = extract_columns("%nom:uppercase% %prenom%");
        assert_eq!(columns, vec!["nom", "prenom"]);
    }

    #[test]
    fn test_extract_transformation_first_token_only() {
        assert_eq!(
            extract_transformation("%prenom:lowercase%.%nom:uppercase%"),
            Some("lowercase".to_string())
        );
        assert_eq!(extract_transformation("%prenom%.%nom:uppercase%"), None);
        assert_eq!(extract_transformation("no tokens"), None);
    }

    #[test]
    fn test_set_transformation_adds() {
        assert_eq!(
            set_transformation("%prenom%.%nom%", Some("lowercase")),
            "%prenom:lowercase%.%nom%"
        );
    }

    #[test]
    fn test_set_transformation_replaces() {
        assert_eq!(
            set_transformation("%prenom:uppercase%.%nom:uppercase%", Some("trim")),
            "%prenom:trim%.%nom:uppercase%"
        );
    }

    #[test]
    fn test_set_transformation_strips() {
        assert_eq!(
            set_transformation("%prenom:uppercase%.%nom%", None),
            "%prenom%.%nom%"
        );
    }

    #[test]
    fn test_set_transformation_no_tokens_unchanged() {
        assert_eq!(set_transformation("literal", Some("trim")), "literal");
    }
}
