//! Intake Sherpa - Conversational slot-filling intake
//!
//! Collects a fixed set of fields (a street closure notice, a work ticket)
//! through free-form chat, validates every answer, asks for confirmation,
//! and renders the confirmed values as a summary, ticket payload and
//! tab-separated record.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod logging;
pub mod ports;
