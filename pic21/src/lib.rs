//!
//! # pic21 Photonic Layout Kernel
//!
//! Parametric generators for photonic-integrated-circuit layout:
//!
//! * [euler] partial-Euler bends, scaled to a minimum or effective radius
//! * [heater] thermo-optic heaters in five styles
//! * [via] via-array filling of enclosing metal
//! * [cleanup] the flatten, merge and grid-snap pass run before export
//! * [devices] a set of device generators composed from the above
//!
//! Geometry, components and GDSII export live in [raw], re-exported here.
//!

// Internal modules & re-exports
pub use pic21raw as raw;
pub use pic21utils as utils;

pub mod cleanup;
pub mod devices;
pub mod euler;
pub mod fresnel;
pub mod heater;
pub mod tech;
pub mod via;

pub use cleanup::{snap_all_polygons_iteratively, CleanupConfig};
pub use euler::{euler_path, EulerBend};
pub use heater::{HeaterConfig, HeaterStyle};
pub use tech::Tech;
pub use via::ViaArray;
