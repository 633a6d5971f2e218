//! Project catalog used by the `project` validator.
//!
//! Matching runs in three stages, first hit wins:
//! 1. exact name or id (case-insensitive)
//! 2. substring either way (shortest name first); a query shorter than
//!    [`MIN_SUBSTRING_QUERY`] characters only matches as a whole
//! 3. Jaro-Winkler ranking above [`FUZZY_THRESHOLD`]

use serde::{Deserialize, Serialize};

/// Minimum Jaro-Winkler similarity for a fuzzy project match.
pub const FUZZY_THRESHOLD: f64 = 0.85;

/// Shortest query allowed to match as a fragment of a project name.
pub const MIN_SUBSTRING_QUERY: usize = 3;

/// A project the user can file against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectEntry {
    pub id: String,
    pub name: String,
}

impl ProjectEntry {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// How a catalog lookup matched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatchKind {
    Exact,
    Substring,
    Fuzzy(f64),
}

/// Result of a successful catalog lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectMatch<'a> {
    pub project: &'a ProjectEntry,
    pub kind: MatchKind,
}

/// Ordered list of known projects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectCatalog {
    entries: Vec<ProjectEntry>,
}

impl ProjectCatalog {
    pub fn new(entries: Vec<ProjectEntry>) -> Self {
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[ProjectEntry] {
        &self.entries
    }

    /// Finds the project the user most likely meant.
    pub fn best_match(&self, query: &str) -> Option<ProjectMatch<'_>> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }

        if let Some(project) = self
            .entries
            .iter()
            .find(|p| p.name.to_lowercase() == needle || p.id.to_lowercase() == needle)
        {
            return Some(ProjectMatch {
                project,
                kind: MatchKind::Exact,
            });
        }

        let fragment_ok = needle.chars().count() >= MIN_SUBSTRING_QUERY;
        let substring = self
            .entries
            .iter()
            .filter(|p| {
                let name = p.name.to_lowercase();
                (fragment_ok && name.contains(&needle)) || needle.contains(&name)
            })
            .min_by_key(|p| p.name.len());
        if let Some(project) = substring {
            return Some(ProjectMatch {
                project,
                kind: MatchKind::Substring,
            });
        }

        self.entries
            .iter()
            .map(|p| (p, strsim::jaro_winkler(&needle, &p.name.to_lowercase())))
            .filter(|(_, score)| *score >= FUZZY_THRESHOLD)
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(project, score)| ProjectMatch {
                project,
                kind: MatchKind::Fuzzy(score),
            })
    }

    /// Project names for greetings: up to `limit` names, then "and N more".
    pub fn preview(&self, limit: usize) -> String {
        let shown: Vec<&str> = self.entries.iter().take(limit).map(|p| p.name.as_str()).collect();
        let mut out = shown.join(", ");
        if self.entries.len() > limit {
            out.push_str(&format!(", and {} more", self.entries.len() - limit));
        }
        out
    }
}
