//! JSON view of syrup values.
//!
//! Used by tooling that needs to show or accept messages as text. The mapping
//! is lossless for everything except `undefined` (becomes `null`) and symbols
//! (become strings); see [`to_json`] for the `$`-object conventions.

pub mod convert;
pub mod error;

pub use convert::{from_json, from_json_str, to_json, to_json_string};
pub use error::{JsonError, Result};
