//! Token scanner for the `%column:transformation%` template language

use super::transform::{TRANSFORMATION_NAMES, Transformation};

/// A single `%...%` token found in a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Referenced column name (may be empty for a degenerate `%%` token).
    pub column: String,
    /// Raw transformation segment, if the token carried one. Kept as the raw
    /// string so the renderer can pass through values when the name is unknown.
    pub transform: Option<String>,
    /// Byte offset of the opening `%`.
    pub start: usize,
    /// Byte offset one past the closing `%`.
    pub end: usize,
}

/// Syntax error found while scanning a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenError {
    pub message: String,
    pub position: usize,
}

impl std::fmt::Display for TokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "at position {}: {}", self.position, self.message)
    }
}

impl std::error::Error for TokenError {}

/// Result of scanning a template: the matched tokens plus any syntax errors.
///
/// Errors never suppress tokens; the renderer substitutes every matched pair
/// best-effort while the validator reports the errors.
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    pub tokens: Vec<Token>,
    pub errors: Vec<TokenError>,
}

impl ScanResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Scan a template left to right, pairing `%` delimiters non-overlapping.
///
/// An odd trailing `%` is reported as an error and left in place as literal
/// text. A token body may contain at most one `:`; the segment after the first
/// `:` is the transformation name, which must be one of the known set.
pub fn scan_tokens(template: &str) -> ScanResult {
    let mut result = ScanResult::default();

    let marks: Vec<usize> = template
        .char_indices()
        .filter(|(_, c)| *c == '%')
        .map(|(i, _)| i)
        .collect();

    for pair in marks.chunks(2) {
        let [open, close] = pair else {
            result.errors.push(TokenError {
                message: "unpaired '%' delimiter".to_string(),
                position: pair[0],
            });
            continue;
        };

        let body = &template[open + 1..*close];
        let colon_count = body.matches(':').count();
        if colon_count > 1 {
            result.errors.push(TokenError {
                message: format!("token '%{}%' contains more than one ':'", body),
                position: *open,
            });
        }

        let (column, transform) = match body.split_once(':') {
            Some((column, transform)) => (column.to_string(), Some(transform.to_string())),
            None => (body.to_string(), None),
        };

        if let Some(name) = &transform {
            if colon_count <= 1 && name.parse::<Transformation>().is_err() {
                result.errors.push(TokenError {
                    message: format!(
                        "unknown transformation '{}' (expected one of: {})",
                        name,
                        TRANSFORMATION_NAMES.join(", ")
                    ),
                    position: *open,
                });
            }
        }

        result.tokens.push(Token {
            column,
            transform,
            start: *open,
            end: close + 1,
        });
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_no_tokens() {
        let result = scan_tokens("plain text");
        assert!(result.tokens.is_empty());
        assert!(result.is_valid());
    }

    #[test]
    fn test_scan_simple_token() {
        let result = scan_tokens("%prenom%");
        assert!(result.is_valid());
        assert_eq!(result.tokens.len(), 1);
        assert_eq!(result.tokens[0].column, "prenom");
        assert_eq!(result.tokens[0].transform, None);
        assert_eq!(result.tokens[0].start, 0);
        assert_eq!(result.tokens[0].end, 8);
    }

    #[test]
    fn test_scan_token_with_transformation() {
        let result = scan_tokens("%nom:uppercase%");
        assert!(result.is_valid());
        assert_eq!(result.tokens[0].column, "nom");
        assert_eq!(result.tokens[0].transform.as_deref(), Some("uppercase"));
    }

    #[test]
    fn test_scan_mixed_literal_and_tokens() {
        let result = scan_tokens("%prenom:lowercase%.%nom:uppercase%@example.org");
        assert!(result.is_valid());
        assert_eq!(result.tokens.len(), 2);
        assert_eq!(result.tokens[0].column, "prenom");
        assert_eq!(result.tokens[1].column, "nom");
    }

    #[test]
    fn test_scan_pairs_left_to_right() {
        // "a%b%c%d%" pairs as (b)(d), with "a" and "c" literal.
        let result = scan_tokens("a%b%c%d%");
        assert!(result.is_valid());
        assert_eq!(result.tokens.len(), 2);
        assert_eq!(result.tokens[0].column, "b");
        assert_eq!(result.tokens[1].column, "d");
    }

    #[test]
    fn test_scan_odd_percent_count() {
        let result = scan_tokens("%prenom% %nom");
        assert!(!result.is_valid());
        assert_eq!(result.tokens.len(), 1);
        assert_eq!(result.tokens[0].column, "prenom");
        assert!(result.errors[0].message.contains("unpaired"));
    }

    #[test]
    fn test_scan_double_colon_is_error() {
        let result = scan_tokens("%nom:uppercase:trim%");
        assert!(!result.is_valid());
        assert!(result.errors[0].message.contains("more than one ':'"));
        // The matched pair is still produced for best-effort rendering.
        assert_eq!(result.tokens.len(), 1);
    }

    #[test]
    fn test_scan_unknown_transformation_is_error() {
        let result = scan_tokens("%prenom:frobnicate%");
        assert!(!result.is_valid());
        assert!(result.errors[0].message.contains("frobnicate"));
        assert_eq!(result.tokens.len(), 1);
    }
}
