//! Rule matching over canonical event payloads.
//!
//! - [`field::resolve`] walks a dot-separated path into a JSON value.
//! - [`evaluate::evaluate`] applies a rule's operator to the resolved value.

pub mod evaluate;
pub mod field;

pub use evaluate::evaluate;
pub use field::resolve;
