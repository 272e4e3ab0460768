//! Core domain types.
//!
//! These types represent the pure domain model, independent of any
//! process or runtime concerns.
//!
//! # Structure
//!
//! - `result` - The immutable outcome of one execution (`ShellResult`)
//! - `codes` - Persistent and per-call success-code policy (`ResultCodes`)
//! - `attempts` - Command variant expansion across toolset flavors

pub mod attempts;
mod codes;
mod result;

pub use attempts::{BINARY_MARKER, DEFAULT_FLAVORS, expand, expand_one, invocation};
pub use codes::{DEFAULT_SUCCESS_CODE, ResultCodes};
pub use result::ShellResult;
