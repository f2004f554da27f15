//!
//! # pic21 Internal Utilities Crate
//!
//! Shared-pointer, error-helper, serialization, and ordering utilities
//! used throughout the pic21 layout crates.
//!

pub mod ptr;
pub use ptr::*;

pub mod ser;
pub use ser::*;

pub mod error;
pub use error::*;

pub mod context;
pub use context::*;

pub mod dep_order;
pub use dep_order::*;

pub mod enumstr;
pub use enumstr::*;
