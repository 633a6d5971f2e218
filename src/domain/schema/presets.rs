//! Built-in schemas shipped with the crate.

use serde::{Deserialize, Serialize};

const STREET_CLOSURE: &str = include_str!("../../../schemas/street_closure.yaml");
const TICKET_REQUEST: &str = include_str!("../../../schemas/ticket_request.yaml");

/// Selects one of the bundled schema files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaPreset {
    /// Public notification for a street closure.
    #[default]
    StreetClosure,
    /// Work ticket for a project tracker.
    TicketRequest,
}

impl SchemaPreset {
    /// Raw YAML source of the preset.
    pub fn source(&self) -> &'static str {
        match self {
            Self::StreetClosure => STREET_CLOSURE,
            Self::TicketRequest => TICKET_REQUEST,
        }
    }
}
