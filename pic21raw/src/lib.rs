//!
//! # Raw Photonic Layout
//!
//! The data model and host-framework layer of pic21.
//! Consists of real-valued geometric primitives, paths and cross-sections,
//! named ports, and components holding instances of other components.
//!
//! Conversion to GDSII is supported via the [Library::to_gds] method.
//!

// Internal modules & re-exports
pub use pic21utils as utils;

pub mod bbox;
pub use bbox::*;

pub mod data;
pub use data::*;

pub mod error;
pub use error::*;

pub mod gds;

pub mod geom;
pub use geom::*;

pub mod library;
pub use library::*;

pub mod ops;

pub mod path;
pub use path::*;

pub mod port;
pub use port::*;

pub mod xsection;
pub use xsection::*;
