//! The rendered output of a completed intake.

use serde::{Deserialize, Serialize};

/// Tab-separated machine record: one header row, one value row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRecord {
    headers: Vec<String>,
    values: Vec<String>,
}

impl ArtifactRecord {
    /// Builds a record from `(header, value)` pairs. Tabs and line breaks in
    /// values are flattened to spaces so every value stays in its column.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let (headers, values) = pairs
            .into_iter()
            .map(|(header, value)| (header, flatten(&value)))
            .unzip();
        Self { headers, values }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Value under `header`, if present.
    pub fn get(&self, header: &str) -> Option<&str> {
        self.headers
            .iter()
            .position(|h| h == header)
            .map(|i| self.values[i].as_str())
    }

    pub fn to_tsv(&self) -> String {
        format!("{}\n{}\n", self.headers.join("\t"), self.values.join("\t"))
    }
}

fn flatten(value: &str) -> String {
    value.replace(['\t', '\r', '\n'], " ")
}

/// Body for creating an issue in a work tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    pub subject: String,
    pub description: String,
}

/// Immutable result of rendering a confirmed conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub title: String,
    pub subject: String,
    /// Human-readable markdown block.
    pub summary: String,
    pub record: ArtifactRecord,
    /// Canonical id of the first project-valued field, if the schema has one.
    pub project_id: Option<String>,
}

impl Artifact {
    pub fn to_ticket_payload(&self) -> TicketPayload {
        TicketPayload {
            project_id: self.project_id.clone(),
            subject: self.subject.clone(),
            description: self.summary.clone(),
        }
    }

    /// Markdown document: title heading followed by the summary.
    pub fn to_markdown(&self) -> String {
        format!("# {}\n\n{}\n", self.title, self.summary)
    }
}
