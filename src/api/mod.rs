//! Purpose: Define the stable public Rust API boundary for husk.
//! Exports: Core types and operations needed by the CLI and library users.
//! Role: Public, additive-only surface; hides internal module layout.
//! Invariants: This module is the only public path to the core modules.

pub use crate::core::decode::{Decoded, decode_str, try_decode};
pub use crate::core::envelope::{peel_str, peel_value};
#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::error::{Error, ErrorKind};
pub use crate::core::flatten::{RESULT_FIELD, Record, coerce_record, flatten_outputs};
pub use crate::core::shape::{Shape, WRAPPER_FIELD, wrapper_payload};
