//! Typed access to Jira issue field values.
//!
//! Jira returns custom field values as scalars, option objects (`{"value": ...}`),
//! user objects (`{"name": ...}`) or arrays. This crate decodes them into a closed
//! [`FieldValue`] variant and exposes total accessors that degrade to `None` on any
//! shape they do not recognize.

pub mod field_accessors;
pub mod field_value;

pub use field_accessors::{
    format_number, get_assignee, get_number, get_string, is_match, Assignee, ASSIGNEE_FIELD_ID,
};
pub use field_value::{FieldSet, FieldValue};
