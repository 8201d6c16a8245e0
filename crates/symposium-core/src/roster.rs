//! Roster of known group labels and their informal aliases.
//!
//! The roster is configuration, not code: it is loaded from a JSON file at
//! startup so labels can change without a rebuild. Order is semantic — both
//! the label list and the alias list are scanned top to bottom and the first
//! match wins, so they are sequences rather than maps.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors raised while loading a roster file.
#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("failed to read roster file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse roster JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One informal spelling mapped to its canonical group label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AliasEntry {
    /// Substring to look for in a filename (matched case-insensitively).
    pub pattern: String,
    /// Canonical group label to report when the pattern matches.
    pub canonical: String,
}

/// The table of known group labels and alias spellings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Roster {
    /// Canonical group labels, in match-priority order.
    groups: Vec<String>,
    /// Alias substrings, in match-priority order.
    #[serde(default)]
    aliases: Vec<AliasEntry>,
}

impl Roster {
    pub fn new(groups: Vec<String>, aliases: Vec<AliasEntry>) -> Self {
        Self { groups, aliases }
    }

    /// Parses a roster from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, RosterError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a roster from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, RosterError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Canonical group labels in match-priority order.
    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    /// Alias entries in match-priority order.
    pub fn aliases(&self) -> &[AliasEntry] {
        &self.aliases
    }
}

impl Default for Roster {
    /// Built-in table used when no roster file is configured.
    fn default() -> Self {
        let groups = [
            "ChCG",
            "Team Alpha",
            "Team Beta",
            "Team Gamma",
        ]
        .into_iter()
        .map(String::from)
        .collect();

        let aliases = [
            ("chemgraph", "ChCG"),
            ("chem_cg", "ChCG"),
            ("alpha", "Team Alpha"),
            ("beta", "Team Beta"),
            ("gamma", "Team Gamma"),
        ]
        .into_iter()
        .map(|(pattern, canonical)| AliasEntry {
            pattern: pattern.to_string(),
            canonical: canonical.to_string(),
        })
        .collect();

        Self { groups, aliases }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roster_json() {
        let json = r#"
        {
            "groups": ["ChCG", "Team Alpha"],
            "aliases": [
                { "pattern": "chemgraph", "canonical": "ChCG" }
            ]
        }
        "#;
        let roster = Roster::from_json_str(json).unwrap();
        assert_eq!(roster.groups(), ["ChCG", "Team Alpha"]);
        assert_eq!(roster.aliases().len(), 1);
        assert_eq!(roster.aliases()[0].canonical, "ChCG");
    }

    #[test]
    fn test_aliases_are_optional() {
        let roster = Roster::from_json_str(r#"{ "groups": ["ChCG"] }"#).unwrap();
        assert!(roster.aliases().is_empty());
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let result = Roster::from_json_str("not json");
        assert!(matches!(result, Err(RosterError::Parse(_))));
    }

    #[test]
    fn test_default_roster_has_groups_and_aliases() {
        let roster = Roster::default();
        assert!(!roster.groups().is_empty());
        assert!(!roster.aliases().is_empty());
        // Every alias must point at a label present in the group list.
        for alias in roster.aliases() {
            assert!(
                roster.groups().iter().any(|g| g == &alias.canonical),
                "alias '{}' points at unknown group '{}'",
                alias.pattern,
                alias.canonical
            );
        }
    }
}
