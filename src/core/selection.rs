//! core::selection
//!
//! Parsing of comma-separated name lists with an `ALL` sentinel, shared by
//! `data count -o` and `org limits -l`.

/// Sentinel meaning "every available name".
pub const ALL: &str = "ALL";

/// Which names a report should cover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Everything the org reports.
    All,
    /// Exactly these names, de-duplicated, in first-seen order.
    Named(Vec<String>),
}

impl Selection {
    /// Parse a raw `-o`/`-l` argument.
    ///
    /// Missing, blank, or exactly `ALL` selects everything. Otherwise the
    /// value is split on commas, items are trimmed, empty items dropped and
    /// duplicates removed. A list that trims down to nothing is `All`.
    pub fn parse(raw: Option<&str>) -> Self {
        let raw = match raw.map(str::trim) {
            None | Some("") | Some(ALL) => return Selection::All,
            Some(r) => r,
        };

        let mut names: Vec<String> = Vec::new();
        for item in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            if !names.iter().any(|n| n == item) {
                names.push(item.to_string());
            }
        }

        if names.is_empty() {
            Selection::All
        } else {
            Selection::Named(names)
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_and_blank_mean_all() {
        assert_eq!(Selection::parse(None), Selection::All);
        assert_eq!(Selection::parse(Some("")), Selection::All);
        assert_eq!(Selection::parse(Some("  ")), Selection::All);
        assert_eq!(Selection::parse(Some(",, ,")), Selection::All);
    }

    #[test]
    fn all_sentinel_is_case_sensitive() {
        assert!(Selection::parse(Some("ALL")).is_all());
        assert_eq!(
            Selection::parse(Some("all")),
            Selection::Named(vec!["all".into()])
        );
    }

    #[test]
    fn splits_trims_and_dedupes() {
        assert_eq!(
            Selection::parse(Some("Account, Opportunity,,User ,Account")),
            Selection::Named(vec![
                "Account".into(),
                "Opportunity".into(),
                "User".into()
            ])
        );
    }
}
