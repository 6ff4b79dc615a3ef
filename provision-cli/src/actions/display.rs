//! Display lookup for action types

use colored::Color;

use super::types::ActionKind;

/// How an action type is presented to the user.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionDisplay {
    pub name: String,
    pub icon: &'static str,
    pub color: Color,
}

/// Look up the display entry for any action-type representation.
///
/// Unknown types fall back to a humanized form of the raw string instead of
/// failing.
pub fn display(action_type: &str) -> ActionDisplay {
    let kind = ActionKind::from_action_type(action_type);
    let (name, icon, color) = match &kind {
        ActionKind::CreateUser => ("Create user", "+", Color::Green),
        ActionKind::UpdateUser => ("Update user", "~", Color::Yellow),
        ActionKind::DeleteUser => ("Delete user", "-", Color::Red),
        ActionKind::MoveUser => ("Move user", ">", Color::Cyan),
        ActionKind::CreateOu => ("Create organizational unit", "+", Color::Green),
        ActionKind::UpdateOu => ("Update organizational unit", "~", Color::Yellow),
        ActionKind::DeleteOu => ("Delete organizational unit", "-", Color::Red),
        ActionKind::CreateGroup => ("Create group", "+", Color::Green),
        ActionKind::DeleteGroup => ("Delete group", "-", Color::Red),
        ActionKind::CreateSecurityGroup => ("Create security group", "+", Color::Green),
        ActionKind::CreateDistributionGroup => ("Create distribution group", "+", Color::Green),
        ActionKind::AddUserToGroup => ("Add user to group", ">", Color::Cyan),
        ActionKind::CreateTeam => ("Create team", "+", Color::Green),
        ActionKind::CreateStudentFolder => ("Create student folder", "+", Color::Green),
        ActionKind::CreateClassGroupFolder => ("Create class group folder", "+", Color::Green),
        ActionKind::Error => ("Error", "!", Color::Red),
        ActionKind::Unknown(raw) => {
            return ActionDisplay {
                name: humanize(raw),
                icon: "?",
                color: Color::White,
            };
        }
    };

    ActionDisplay {
        name: name.to_string(),
        icon,
        color,
    }
}

/// "CREATE_WIDGET" -> "Create widget".
fn humanize(raw: &str) -> String {
    let lowered = raw.replace('_', " ").to_lowercase();
    let mut chars = lowered.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_canonical_type() {
        let entry = display("CREATE_USER");
        assert_eq!(entry.name, "Create user");
        assert_eq!(entry.icon, "+");
        assert_eq!(entry.color, Color::Green);
    }

    #[test]
    fn test_display_legacy_code_matches_canonical() {
        assert_eq!(display("1"), display("CREATE_USER"));
        assert_eq!(display("01"), display("CREATE_USER"));
    }

    #[test]
    fn test_display_unknown_is_humanized() {
        let entry = display("CREATE_WIDGET");
        assert_eq!(entry.name, "Create widget");
        assert_eq!(entry.icon, "?");
    }

    #[test]
    fn test_display_unknown_numeric_code() {
        let entry = display("42");
        assert_eq!(entry.name, "42");
        assert_eq!(entry.icon, "?");
    }
}
