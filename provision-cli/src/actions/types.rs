//! Action-type identity and canonicalization

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde_json::Value;

/// Canonicalize an action-type representation for identity comparison.
///
/// Numeric input and numeric-leading strings collapse to the plain numeric
/// string form (`"01"`, `"1 "`, and `1` all become `"1"`); anything else is
/// returned as-is, without case folding. Every action-type equality check in
/// the crate must go through here; comparing raw representations directly is
/// the bug class this function exists to remove.
pub fn normalize(raw: &str) -> String {
    let trimmed = raw.trim();
    let digits: String = trimmed
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();

    if !digits.is_empty() {
        match digits.parse::<i64>() {
            Ok(code) => code.to_string(),
            Err(_) => digits,
        }
    } else {
        trimmed.to_string()
    }
}

/// Normalize an action type straight off the wire, where it may be a JSON
/// number or string.
pub fn normalize_value(value: &Value) -> String {
    match value {
        Value::Number(n) => match n.as_i64() {
            Some(code) => code.to_string(),
            None => n.to_string(),
        },
        Value::String(s) => normalize(s),
        other => normalize(&other.to_string()),
    }
}

/// Canonical action kinds detected by analysis.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ActionKind {
    CreateUser,
    UpdateUser,
    DeleteUser,
    MoveUser,
    CreateOu,
    UpdateOu,
    DeleteOu,
    CreateGroup,
    DeleteGroup,
    CreateSecurityGroup,
    CreateDistributionGroup,
    AddUserToGroup,
    CreateTeam,
    CreateStudentFolder,
    CreateClassGroupFolder,
    Error,
    /// Action type the backend sent that we have no mapping for. Kept verbatim
    /// (post-normalization) rather than guessed at.
    Unknown(String),
}

/// Legacy numeric codes still emitted by older backends. The table is known to
/// be partial; codes outside it resolve to [`ActionKind::Unknown`].
static LEGACY_CODES: Lazy<HashMap<&'static str, ActionKind>> = Lazy::new(|| {
    HashMap::from([
        ("1", ActionKind::CreateUser),
        ("2", ActionKind::UpdateUser),
        ("3", ActionKind::DeleteUser),
        ("4", ActionKind::MoveUser),
        ("5", ActionKind::CreateOu),
        ("6", ActionKind::UpdateOu),
        ("7", ActionKind::DeleteOu),
        ("8", ActionKind::CreateGroup),
        ("9", ActionKind::DeleteGroup),
        ("10", ActionKind::AddUserToGroup),
    ])
});

impl ActionKind {
    /// Resolve any action-type representation into a kind.
    pub fn from_action_type(raw: &str) -> Self {
        let normalized = normalize(raw);
        match normalized.as_str() {
            "CREATE_USER" => Self::CreateUser,
            "UPDATE_USER" => Self::UpdateUser,
            "DELETE_USER" => Self::DeleteUser,
            "MOVE_USER" => Self::MoveUser,
            "CREATE_OU" => Self::CreateOu,
            "UPDATE_OU" => Self::UpdateOu,
            "DELETE_OU" => Self::DeleteOu,
            "CREATE_GROUP" => Self::CreateGroup,
            "DELETE_GROUP" => Self::DeleteGroup,
            "CREATE_SECURITY_GROUP" => Self::CreateSecurityGroup,
            "CREATE_DISTRIBUTION_GROUP" => Self::CreateDistributionGroup,
            "ADD_USER_TO_GROUP" => Self::AddUserToGroup,
            "CREATE_TEAM" => Self::CreateTeam,
            "CREATE_STUDENT_FOLDER" => Self::CreateStudentFolder,
            "CREATE_CLASS_GROUP_FOLDER" => Self::CreateClassGroupFolder,
            "ERROR" => Self::Error,
            other => LEGACY_CODES
                .get(other)
                .cloned()
                .unwrap_or_else(|| Self::Unknown(normalized.clone())),
        }
    }

    pub fn canonical_name(&self) -> &str {
        match self {
            Self::CreateUser => "CREATE_USER",
            Self::UpdateUser => "UPDATE_USER",
            Self::DeleteUser => "DELETE_USER",
            Self::MoveUser => "MOVE_USER",
            Self::CreateOu => "CREATE_OU",
            Self::UpdateOu => "UPDATE_OU",
            Self::DeleteOu => "DELETE_OU",
            Self::CreateGroup => "CREATE_GROUP",
            Self::DeleteGroup => "DELETE_GROUP",
            Self::CreateSecurityGroup => "CREATE_SECURITY_GROUP",
            Self::CreateDistributionGroup => "CREATE_DISTRIBUTION_GROUP",
            Self::AddUserToGroup => "ADD_USER_TO_GROUP",
            Self::CreateTeam => "CREATE_TEAM",
            Self::CreateStudentFolder => "CREATE_STUDENT_FOLDER",
            Self::CreateClassGroupFolder => "CREATE_CLASS_GROUP_FOLDER",
            Self::Error => "ERROR",
            Self::Unknown(raw) => raw,
        }
    }
}
