//! Canonical syrup serialization with length-prefixed framing.
//!
//! syrupkit encodes structured values into a deterministic byte format: the
//! same logical value always produces the same bytes, so messages can be
//! hashed, signed and compared byte-wise.
//!
//! # Crate Structure
//!
//! - [`value`]: Value model, canonical ordering, encoder, decoder and serde bridge
//! - [`frame`]: Length-prefixed framing, stream accumulator, `Read`/`Write` adapters
//! - [`json`]: JSON view of values for tooling
//!
//! ```
//! use syrupkit::value::{decode, to_vec, Value};
//!
//! let msg = Value::dictionary([
//!     (Value::symbol("b"), Value::integer(2)),
//!     (Value::symbol("a"), Value::integer(1)),
//! ])
//! .unwrap();
//! let bytes = to_vec(&msg).unwrap();
//! assert_eq!(bytes, b"{1'a1+1'b2+}");
//! assert_eq!(decode(&bytes).unwrap(), msg);
//! ```

/// Re-export value types.
pub mod value {
    pub use syrupkit_value::*;
}

/// Re-export frame types.
pub mod frame {
    pub use syrupkit_frame::*;
}

/// Re-export JSON conversion.
pub mod json {
    pub use syrupkit_json::*;
}

pub use syrupkit_value::{decode, to_vec, Value};
