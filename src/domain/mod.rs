//! Domain layer containing the intake logic and its types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (session ids, timestamps, errors)
//! - `schema` - Declarative field schemas, presets and the project catalog
//! - `validation` - Candidate normalization and typed slot values
//! - `conversation` - Session state, phases and the slot-filling engine
//! - `artifact` - Summary, ticket payload and tabular record rendering

pub mod artifact;
pub mod conversation;
pub mod foundation;
pub mod schema;
pub mod validation;
