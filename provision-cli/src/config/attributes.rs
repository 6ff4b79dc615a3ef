//! Built-in directory attribute definitions

use crate::mapping::AttributeDef;

/// Well-known directory attributes a mapping can target. Used for preview
/// warnings and for the required-attribute checks during validation.
pub fn well_known_attributes() -> Vec<AttributeDef> {
    vec![
        AttributeDef::new("cn", true),
        AttributeDef::new("sAMAccountName", true),
        AttributeDef::new("givenName", false),
        AttributeDef::new("sn", false),
        AttributeDef::new("displayName", false),
        AttributeDef::new("userPrincipalName", false),
        AttributeDef::new("mail", false),
        AttributeDef::new("description", false),
        AttributeDef::new("department", false),
        AttributeDef::new("company", false),
        AttributeDef::new("title", false),
        AttributeDef::new("telephoneNumber", false),
        AttributeDef::new("physicalDeliveryOfficeName", false),
        AttributeDef::new("employeeNumber", false),
    ]
}
