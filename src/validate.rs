//! Text normalization and allowlist validation.

use std::collections::BTreeSet;
use std::sync::Arc;

/// Plates authorized out of the box.
pub const DEFAULT_ALLOWLIST: &[&str] = &["H283TX 37", "H283TX37", "QWE456"];

/// Authorization outcome for a recognized plate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum AuthorizationStatus {
    Authorized,
    Denied,
}

impl AuthorizationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AuthorizationStatus::Authorized => "Authorized",
            AuthorizationStatus::Denied => "Denied",
        }
    }
}

impl std::fmt::Display for AuthorizationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static set of canonical plate strings.
///
/// Loaded once at startup and shared read-only. Entries are stored exactly as
/// given: `"H283TX 37"` and `"H283TX37"` are two different plates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Allowlist {
    entries: BTreeSet<String>,
}

impl Allowlist {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, plate: &str) -> bool {
        self.entries.contains(plate)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }
}

impl Default for Allowlist {
    fn default() -> Self {
        Self::new(DEFAULT_ALLOWLIST.iter().copied())
    }
}

/// Canonical form of raw OCR output: leading/trailing whitespace removed.
///
/// Internal whitespace and case are left alone.
pub fn normalize(raw: &str) -> &str {
    raw.trim()
}

/// Classifies recognized text against a shared allowlist.
#[derive(Clone, Debug)]
pub struct PlateValidator {
    allowlist: Arc<Allowlist>,
}

impl PlateValidator {
    pub fn new(allowlist: Arc<Allowlist>) -> Self {
        Self { allowlist }
    }

    pub fn allowlist(&self) -> &Allowlist {
        &self.allowlist
    }

    /// Authorization status of `text` after trimming.
    pub fn validate(&self, text: &str) -> AuthorizationStatus {
        if self.allowlist.contains(normalize(text)) {
            AuthorizationStatus::Authorized
        } else {
            AuthorizationStatus::Denied
        }
    }

    /// Normalize and classify raw OCR output.
    ///
    /// Returns `None` for blank text; such reads never become records.
    pub fn classify(&self, raw: &str) -> Option<(String, AuthorizationStatus)> {
        let text = normalize(raw);
        if text.is_empty() {
            return None;
        }
        Some((text.to_string(), self.validate(text)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_validator() -> PlateValidator {
        PlateValidator::new(Arc::new(Allowlist::default()))
    }

    #[test]
    fn trimmed_text_matches_allowlist() {
        let validator = default_validator();
        assert_eq!(
            validator.validate(" H283TX37 "),
            AuthorizationStatus::Authorized
        );
        assert_eq!(
            validator.validate("H283TX37"),
            AuthorizationStatus::Authorized
        );
        assert_eq!(validator.validate("ZZZ999"), AuthorizationStatus::Denied);
    }

    #[test]
    fn internal_whitespace_is_significant() {
        let validator = default_validator();
        assert_eq!(
            validator.validate("H283TX 37"),
            AuthorizationStatus::Authorized
        );

        let strict = PlateValidator::new(Arc::new(Allowlist::new(["H283TX37"])));
        assert_eq!(strict.validate("H283TX 37"), AuthorizationStatus::Denied);
        assert_eq!(strict.validate("H283TX  37"), AuthorizationStatus::Denied);
    }

    #[test]
    fn case_is_not_folded() {
        let validator = default_validator();
        assert_eq!(validator.validate("qwe456"), AuthorizationStatus::Denied);
    }

    #[test]
    fn blank_text_is_not_classified() {
        let validator = default_validator();
        assert!(validator.classify("").is_none());
        assert!(validator.classify("   \n\t").is_none());
    }

    #[test]
    fn classify_returns_trimmed_text() {
        let validator = default_validator();
        let (text, status) = validator.classify("QWE456\n").expect("classified");
        assert_eq!(text, "QWE456");
        assert_eq!(status, AuthorizationStatus::Authorized);
    }

    #[test]
    fn allowlist_keeps_distinct_spacing_variants() {
        let allowlist = Allowlist::default();
        assert_eq!(allowlist.len(), 3);
        assert!(allowlist.contains("H283TX 37"));
        assert!(allowlist.contains("H283TX37"));
    }
}
