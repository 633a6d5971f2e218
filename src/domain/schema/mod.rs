//! Schema module - Declarative description of the fields to collect.
//!
//! A schema is loaded once at startup from data-only YAML, validated, and
//! then shared read-only by every session.
//!
//! # Structure
//!
//! - `FieldSpec` / `ValidatorKind` - one slot and how its values are checked
//! - `SchemaDefinition` - the raw YAML document
//! - `FieldSchema` - the validated, ordered schema
//! - `ConfirmationVocabulary` - yes/no/hedge phrases for the confirmation step
//! - `ProjectCatalog` - known projects for fuzzy project matching

mod catalog;
mod definition;
mod field_schema;
mod field_spec;
mod presets;
mod vocabulary;

pub use catalog::{MatchKind, ProjectCatalog, ProjectEntry, ProjectMatch, FUZZY_THRESHOLD, MIN_SUBSTRING_QUERY};
pub use definition::{FieldDefinition, SchemaDefinition};
pub use field_schema::{FieldSchema, SchemaViolation};
pub use field_spec::{FieldSpec, ValidatorKind};
pub use presets::SchemaPreset;
pub use vocabulary::{ConfirmationReply, ConfirmationVocabulary};

pub(crate) use field_schema::placeholders;
