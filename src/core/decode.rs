//! Purpose: Provide the guarded JSON decode boundary for envelope handling.
//! Exports: `Decoded`, `decode_str`, `try_decode`.
//! Role: Parser boundary that makes every fallback branch explicit.
//! Invariants: All guarded envelope decode attempts in the crate go through here.
//! Invariants: `Decoded::Raw` means the caller keeps its original text unchanged.

use serde_json::Value;

/// Outcome of one guarded decode attempt.
#[derive(Clone, Debug, PartialEq)]
pub enum Decoded {
    /// The text was valid JSON.
    Parsed(Value),
    /// The text was not valid JSON; the caller retains the original.
    Raw,
}

pub fn decode_str(input: &str) -> Decoded {
    match serde_json::from_str(input) {
        Ok(value) => Decoded::Parsed(value),
        Err(_) => Decoded::Raw,
    }
}

pub fn try_decode(input: &str) -> Option<Value> {
    match decode_str(input) {
        Decoded::Parsed(value) => Some(value),
        Decoded::Raw => None,
    }
}
