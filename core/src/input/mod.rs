//! Request input validation
//!
//! Checks the free-text request submitted by a client (shortcut, automation,
//! HTTP caller) before it is handed to the language model.

mod validate;

pub use validate::{validate_request, InputError, TaskRequest, ValidatedRequest};
