//! Validation module - Turns untrusted candidate strings into typed values.
//!
//! Every value the extractor proposes passes through [`FieldValidator`]
//! before it can reach conversation state.

mod dates;
mod validator;
mod value;

pub use validator::{FieldValidator, ValidationContext, ValidationFailure};
pub use value::{Refinement, SlotValue};

pub(crate) use value::{display_date, display_time};
