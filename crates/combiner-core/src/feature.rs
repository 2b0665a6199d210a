//! Named attributes that produce aspects (spec §3, §4.4).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FeatureKind {
    Flag,
    Choice,
    Integer,
}

impl Default for FeatureKind {
    fn default() -> Self {
        FeatureKind::Flag
    }
}

impl FeatureKind {
    /// Parse the `"type"` field of a `species_features` entry, defaulting to
    /// [`FeatureKind::Flag`] for anything unrecognized or absent.
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_uppercase().as_str() {
            "CHOICE" => FeatureKind::Choice,
            "INTEGER" => FeatureKind::Integer,
            _ => FeatureKind::Flag,
        }
    }
}

/// A named attribute that can contribute an aspect to a form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feature {
    pub name: String,
    pub kind: FeatureKind,
    /// Alternate names this feature may be referenced by in spawn entries.
    pub keys: Vec<String>,
    pub is_aspect: bool,
    /// Template with placeholder `{{choice}}`, used when `<featName>=<choice>`
    /// appears in a spawn entry's aspect expression.
    pub aspect_format: Option<String>,
}

impl Feature {
    pub fn matches_name(&self, candidate: &str) -> bool {
        self.name.eq_ignore_ascii_case(candidate)
            || self.keys.iter().any(|k| k.eq_ignore_ascii_case(candidate))
    }

    /// Substitute `{{choice}}` in `aspect_format`. Returns `None` when there
    /// is no format template (spec Open Question: an empty/missing template
    /// silently yields an empty aspect that falls through to `base_form`;
    /// kept as-is here — see DESIGN.md).
    pub fn format_aspect(&self, choice: &str) -> Option<String> {
        self.aspect_format
            .as_ref()
            .map(|fmt| fmt.replace("{{choice}}", choice))
    }
}

/// Which entities receive a given feature (`species_feature_assignments`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureAssignment {
    pub name: String,
    pub included_entities: Vec<String>,
}
