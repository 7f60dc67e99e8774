//! Property-based tests for substitution and name selection.
//!
//! These tests use proptest to verify invariants hold across
//! randomly generated inputs.

use proptest::prelude::*;

use sfwry::core::reference::LookupTable;
use sfwry::core::selection::Selection;
use sfwry::core::substitute::{contains_tokens, substitute, substitute_tokens};

/// Text that cannot contain a `$R{` token.
fn plain_text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 {}\":,.\n_-]{0,80}"
}

fn key() -> impl Strategy<Value = String> {
    "(RecordType|Role)\\.[A-Za-z][A-Za-z0-9_]{0,12}"
}

fn id() -> impl Strategy<Value = String> {
    "[0-9A-Za-z]{15,18}"
}

/// A table plus a document built from plain text and tokens for its keys.
fn table_and_document() -> impl Strategy<Value = (LookupTable, String, usize)> {
    prop::collection::btree_map(key(), id(), 1..8).prop_flat_map(|entries| {
        let keys: Vec<String> = entries.keys().cloned().collect();
        let table: LookupTable = entries.into_iter().collect();
        prop::collection::vec((plain_text(), prop::sample::select(keys)), 0..10).prop_map(
            move |parts| {
                let count = parts.len();
                let text: String = parts
                    .into_iter()
                    .map(|(plain, key)| format!("{}$R{{{}}}", plain, key))
                    .collect();
                (table.clone(), text, count)
            },
        )
    })
}

proptest! {
    /// Text without tokens comes back unchanged.
    #[test]
    fn token_free_text_unchanged(text in plain_text()) {
        let table: LookupTable = [("Role.CEO", "00E1")].into_iter().collect();
        let out = substitute(&text, &table, None);
        prop_assert_eq!(&out.text, &text);
        prop_assert!(out.replacements.is_empty());
        prop_assert!(out.unresolved.is_empty());
    }

    /// Every token for a known key is replaced and none survive.
    #[test]
    fn known_keys_fully_substituted((table, text, count) in table_and_document()) {
        let out = substitute_tokens(&text, &table);
        prop_assert!(out.is_fully_resolved());
        prop_assert_eq!(out.replacements.len(), count);
        prop_assert!(!contains_tokens(&out.text));
        for r in &out.replacements {
            prop_assert_eq!(table.get(&r.key), Some(r.id.as_str()));
        }
    }

    /// Substituting an already substituted text changes nothing.
    #[test]
    fn substitution_is_idempotent((table, text, _) in table_and_document()) {
        let once = substitute(&text, &table, Some("Account"));
        let twice = substitute(&once.text, &table, Some("Account"));
        prop_assert_eq!(&twice.text, &once.text);
        prop_assert!(twice.replacements.is_empty());
    }

    /// Unknown keys are reported and left verbatim.
    #[test]
    fn unknown_keys_left_in_place(plain in plain_text(), key in key()) {
        let text = format!("{}$R{{{}}}", plain, key);
        let out = substitute_tokens(&text, &LookupTable::new());
        prop_assert_eq!(&out.text, &text);
        prop_assert_eq!(out.unresolved, vec![key]);
    }

    /// Parsed names are trimmed, non-empty and unique.
    #[test]
    fn selection_names_unique_and_trimmed(raw in "[A-Za-z_ ,]{0,60}") {
        match Selection::parse(Some(&raw)) {
            Selection::All => {
                prop_assert!(raw.trim() == "ALL" || raw.split(',').all(|s| s.trim().is_empty()));
            }
            Selection::Named(names) => {
                prop_assert!(!names.is_empty());
                for (i, name) in names.iter().enumerate() {
                    prop_assert!(!name.is_empty());
                    prop_assert_eq!(name.trim(), name.as_str());
                    prop_assert!(!names[..i].contains(name));
                }
            }
        }
    }
}
