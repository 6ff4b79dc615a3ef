//! Named transformations applied to resolved column values

use std::str::FromStr;

/// A pure string transformation named inside a template token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transformation {
    Uppercase,
    Lowercase,
    Capitalize,
    Trim,
    First,
}

/// All recognized transformation names, for validation messages.
pub const TRANSFORMATION_NAMES: &[&str] =
    &["uppercase", "lowercase", "capitalize", "trim", "first"];

impl Transformation {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Uppercase => "uppercase",
            Self::Lowercase => "lowercase",
            Self::Capitalize => "capitalize",
            Self::Trim => "trim",
            Self::First => "first",
        }
    }

    /// Apply the transformation to a resolved value.
    pub fn apply(&self, value: &str) -> String {
        match self {
            Self::Uppercase => value.to_uppercase(),
            Self::Lowercase => value.to_lowercase(),
            Self::Capitalize => {
                let mut chars = value.chars();
                match chars.next() {
                    Some(first) => {
                        let mut out: String = first.to_uppercase().collect();
                        out.extend(chars.flat_map(|c| c.to_lowercase()));
                        out
                    }
                    None => String::new(),
                }
            }
            Self::Trim => value.trim().to_string(),
            Self::First => value.chars().next().map(String::from).unwrap_or_default(),
        }
    }
}

impl FromStr for Transformation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "uppercase" => Ok(Self::Uppercase),
            "lowercase" => Ok(Self::Lowercase),
            "capitalize" => Ok(Self::Capitalize),
            "trim" => Ok(Self::Trim),
            "first" => Ok(Self::First),
            other => Err(format!("unknown transformation '{}'", other)),
        }
    }
}

impl std::fmt::Display for Transformation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_uppercase() {
        assert_eq!(Transformation::Uppercase.apply("Dupont"), "DUPONT");
    }

    #[test]
    fn test_apply_lowercase() {
        assert_eq!(Transformation::Lowercase.apply("Jean"), "jean");
    }

    #[test]
    fn test_apply_capitalize() {
        assert_eq!(Transformation::Capitalize.apply("dUPONT"), "Dupont");
        assert_eq!(Transformation::Capitalize.apply(""), "");
        assert_eq!(Transformation::Capitalize.apply("élise"), "Élise");
    }

    #[test]
    fn test_apply_trim() {
        assert_eq!(Transformation::Trim.apply("  mail  "), "mail");
    }

    #[test]
    fn test_apply_first() {
        assert_eq!(Transformation::First.apply("Jean"), "J");
        assert_eq!(Transformation::First.apply(""), "");
    }

    #[test]
    fn test_parse_known_names() {
        for name in TRANSFORMATION_NAMES {
            let parsed: Transformation = name.parse().unwrap();
            assert_eq!(parsed.name(), *name);
        }
    }

    #[test]
    fn test_parse_unknown_name() {
        let err = "frobnicate".parse::<Transformation>().unwrap_err();
        assert!(err.contains("frobnicate"));
    }
}
