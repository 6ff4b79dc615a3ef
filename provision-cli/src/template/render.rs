//! Template rendering against a spreadsheet row

use std::collections::HashMap;

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use super::token::scan_tokens;
use super::transform::Transformation;

/// Hard cap the directory places on `sAMAccountName` length.
pub const DEFAULT_ACCOUNT_MAX_LEN: usize = 20;

/// Column headers probed (case-insensitively) for the given name during
/// account-name synthesis.
const GIVEN_NAME_COLUMNS: &[&str] = &["givenname", "prenom", "firstname", "first_name"];

/// Column headers probed (case-insensitively) for the surname.
const SURNAME_COLUMNS: &[&str] = &["sn", "surname", "nom", "lastname", "last_name"];

/// Render a template against a row of column values.
///
/// Total function: missing columns resolve to the empty string, unknown
/// transformations pass the value through untouched, and unmatched `%` stays
/// literal. Syntax problems are the validator's job, not the renderer's.
pub fn render(template: &str, row: &HashMap<String, String>) -> String {
    render_with_limit(template, row, DEFAULT_ACCOUNT_MAX_LEN)
}

/// Render with an explicit account-name length limit.
pub fn render_with_limit(
    template: &str,
    row: &HashMap<String, String>,
    account_max_len: usize,
) -> String {
    let scan = scan_tokens(template);
    let mut out = String::with_capacity(template.len());
    let mut cursor = 0;

    for token in &scan.tokens {
        out.push_str(&template[cursor..token.start]);

        let mut value = row.get(&token.column).cloned().unwrap_or_default();
        if value.is_empty() && token.column.eq_ignore_ascii_case("samaccountname") {
            value = synthesize_account_name(row, account_max_len);
        }

        if let Some(name) = &token.transform {
            if let Ok(transformation) = name.parse::<Transformation>() {
                value = transformation.apply(&value);
            }
        }

        out.push_str(&value);
        cursor = token.end;
    }

    out.push_str(&template[cursor..]);
    out
}

/// Build an account name from the row's first and last name columns.
///
/// Both names are lowercased, accent-stripped, and reduced to ASCII letters.
/// The full first name is kept and as many surname characters as still fit
/// under `max_len` are appended. A first name that alone reaches the limit is
/// cut at the limit, the directory rejects anything longer.
fn synthesize_account_name(row: &HashMap<String, String>, max_len: usize) -> String {
    let first = clean_name(find_column(row, GIVEN_NAME_COLUMNS).unwrap_or_default());
    let last = clean_name(find_column(row, SURNAME_COLUMNS).unwrap_or_default());

    if first.len() >= max_len {
        return first[..max_len].to_string();
    }

    let room = max_len - first.len();
    let take = last.len().min(room);
    format!("{}{}", first, &last[..take])
}

/// Find the first candidate header present in the row, case-insensitively.
fn find_column<'a>(row: &'a HashMap<String, String>, candidates: &[&str]) -> Option<&'a str> {
    for candidate in candidates {
        let hit = row
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(candidate));
        if let Some((_, value)) = hit {
            return Some(value.as_str());
        }
    }
    None
}

/// Lowercase, strip accents (NFD decomposition minus combining marks), and
/// keep ASCII letters only. "Marie-Ève" becomes "marieeve".
fn clean_name(raw: &str) -> String {
    raw.nfd()
        .filter(|c| !is_combining_mark(*c))
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
