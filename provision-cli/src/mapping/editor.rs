//! Edit reducer for the mapping screen
//!
//! Field edits go through one reducer that mutates the mapping and recomputes
//! every derived view in the same step, so display items and validation can
//! never drift out of sync with the templates they were computed from.

use super::display::{MappingDisplayItem, to_display_items};
use super::validate::{ValidationReport, validate};
use super::{AttributeDef, HeaderMapping, set_transformation};

/// One user edit to the mapping.
#[derive(Debug, Clone)]
pub enum MappingEvent {
    /// Set (or add) the template for an attribute.
    SetTemplate { attribute: String, template: String },
    /// Remove an attribute from the mapping.
    Remove { attribute: String },
    /// Change the first token's transformation for an attribute's template.
    SetTransformation {
        attribute: String,
        transformation: Option<String>,
    },
}

/// Views derived from the mapping, recomputed on every edit.
#[derive(Debug, Clone)]
pub struct MappingViews {
    pub display_items: Vec<MappingDisplayItem>,
    pub validation: ValidationReport,
}

/// Holds the mapping being edited together with its derived views.
#[derive(Debug, Clone)]
pub struct MappingEditor {
    mapping: HeaderMapping,
    known_attributes: Vec<AttributeDef>,
    views: MappingViews,
}

impl MappingEditor {
    pub fn new(mapping: HeaderMapping, known_attributes: Vec<AttributeDef>) -> Self {
        let views = derive_views(&mapping, &known_attributes);
        Self {
            mapping,
            known_attributes,
            views,
        }
    }

    /// Apply one edit and recompute the derived views.
    pub fn apply(&mut self, event: MappingEvent) {
        match event {
            MappingEvent::SetTemplate {
                attribute,
                template,
            } => self.mapping.set(&attribute, &template),
            MappingEvent::Remove { attribute } => self.mapping.remove(&attribute),
            MappingEvent::SetTransformation {
                attribute,
                transformation,
            } => {
                if let Some(template) = self.mapping.get(&attribute) {
                    let rewritten = set_transformation(template, transformation.as_deref());
                    self.mapping.set(&attribute, &rewritten);
                }
            }
        }
        self.views = derive_views(&self.mapping, &self.known_attributes);
    }

    pub fn mapping(&self) -> &HeaderMapping {
        &self.mapping
    }

    pub fn views(&self) -> &MappingViews {
        &self.views
    }
}

fn derive_views(mapping: &HeaderMapping, known_attributes: &[AttributeDef]) -> MappingViews {
    let required: Vec<AttributeDef> = known_attributes
        .iter()
        .filter(|def| def.required)
        .cloned()
        .collect();
    let mut display_items = to_display_items(mapping);
    for item in &mut display_items {
        item.is_required = Some(
            known_attributes
                .iter()
                .any(|def| def.required && def.name == item.ad_attribute),
        );
    }
    MappingViews {
        display_items,
        validation: validate(mapping, &required),
    }
}
