//! Config phase: raw JSON → validated `AutomationConfig`.

pub mod signature;
pub mod types;
pub mod validate;

pub use signature::{Signature, SignatureError, SolType};
pub use types::*;
pub use validate::{validate, validate_json};
