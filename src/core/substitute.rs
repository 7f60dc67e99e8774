//! core::substitute
//!
//! Placeholder substitution on file contents.
//!
//! Two rewrites exist:
//!
//! - `$R{<key>}` tokens are replaced with the id for `<key>`. The key runs
//!   to the first `}`, so several tokens on one line resolve independently.
//! - With an object type, an embedded record type reference such as
//!   `"RecordType": {"attributes": {...}, "DeveloperName": "Vendor"}` becomes
//!   `"RecordTypeId": "<id>"`, looked up as `RecordType.<object>.Vendor`.
//!
//! Text outside a match is never touched. Unresolved keys leave the
//! original text in place and are reported to the caller, which decides
//! whether that is fatal.

use std::sync::OnceLock;

use regex::{Captures, Regex};
use serde::Serialize;

use super::reference::{record_type_key, LookupTable};

static TOKEN_RE: OnceLock<Regex> = OnceLock::new();
static RECORD_TYPE_RE: OnceLock<Regex> = OnceLock::new();

fn token_re() -> &'static Regex {
    TOKEN_RE.get_or_init(|| Regex::new(r"\$R\{([^}]*)\}").expect("valid token pattern"))
}

// One level of nested braces is enough for the `attributes` block.
fn record_type_re() -> &'static Regex {
    RECORD_TYPE_RE.get_or_init(|| {
        Regex::new(
            r#""RecordType"\s*:\s*\{(?:[^{}]|\{[^{}]*\})*?"DeveloperName"\s*:\s*"([^"]*)"(?:[^{}]|\{[^{}]*\})*\}"#,
        )
        .expect("valid record type pattern")
    })
}

/// Which rewrite produced a replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplacementKind {
    /// A `$R{key}` token
    Token,
    /// An embedded record type reference
    RecordType,
}

/// A single resolved substitution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Replacement {
    pub kind: ReplacementKind,
    pub key: String,
    pub id: String,
}

/// Result of rewriting one text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Substitution {
    /// The rewritten text
    pub text: String,
    /// Resolved replacements in document order
    pub replacements: Vec<Replacement>,
    /// Keys with no id, in document order (may repeat)
    pub unresolved: Vec<String>,
}

impl Substitution {
    pub fn is_fully_resolved(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// Replace every `$R{key}` token in `text`.
///
/// # Example
///
/// ```
/// use sfwry::core::reference::LookupTable;
/// use sfwry::core::substitute::substitute_tokens;
///
/// let table: LookupTable = [("Role.CEO", "00E1")].into_iter().collect();
/// let out = substitute_tokens(r#"{"UserRoleId": "$R{Role.CEO}"}"#, &table);
/// assert_eq!(out.text, r#"{"UserRoleId": "00E1"}"#);
/// ```
pub fn substitute_tokens(text: &str, table: &LookupTable) -> Substitution {
    let mut replacements = Vec::new();
    let mut unresolved = Vec::new();

    let rewritten = token_re().replace_all(text, |caps: &Captures| {
        let key = &caps[1];
        match table.get(key) {
            Some(id) => {
                replacements.push(Replacement {
                    kind: ReplacementKind::Token,
                    key: key.to_string(),
                    id: id.to_string(),
                });
                id.to_string()
            }
            None => {
                unresolved.push(key.to_string());
                caps[0].to_string()
            }
        }
    });

    Substitution {
        text: rewritten.into_owned(),
        replacements,
        unresolved,
    }
}

/// Rewrite embedded record type references for `object_type`.
pub fn rewrite_record_types(text: &str, object_type: &str, table: &LookupTable) -> Substitution {
    let mut replacements = Vec::new();
    let mut unresolved = Vec::new();

    let rewritten = record_type_re().replace_all(text, |caps: &Captures| {
        let key = record_type_key(object_type, &caps[1]);
        match table.get(&key) {
            Some(id) => {
                let replaced = format!("\"RecordTypeId\": \"{}\"", id);
                replacements.push(Replacement {
                    kind: ReplacementKind::RecordType,
                    key,
                    id: id.to_string(),
                });
                replaced
            }
            None => {
                unresolved.push(key);
                caps[0].to_string()
            }
        }
    });

    Substitution {
        text: rewritten.into_owned(),
        replacements,
        unresolved,
    }
}

/// Apply token substitution, then the record type rewrite when an object
/// type is given.
pub fn substitute(text: &str, table: &LookupTable, object_type: Option<&str>) -> Substitution {
    let mut result = substitute_tokens(text, table);
    if let Some(object_type) = object_type {
        let rt = rewrite_record_types(&result.text, object_type, table);
        result.text = rt.text;
        result.replacements.extend(rt.replacements);
        result.unresolved.extend(rt.unresolved);
    }
    result
}

/// Whether `text` contains at least one `$R{...}` token.
pub fn contains_tokens(text: &str) -> bool {
    token_re().is_match(text)
}
