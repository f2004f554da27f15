//!
//! # Technology Records
//!
//! Write-grid, bend-point density, and the named layer table shared by every generator.
//!

// Crates.io
use serde::{Deserialize, Serialize};

// Local imports
use crate::raw::{Layer, LayerSpec, Layers, LayoutResult};
use crate::utils::SerdeFile;

/// Default layer specs
pub const WG: LayerSpec = LayerSpec::new(1, 0);
pub const SLAB: LayerSpec = LayerSpec::new(2, 0);
pub const HEATER: LayerSpec = LayerSpec::new(11, 0);
pub const ROUTE: LayerSpec = LayerSpec::new(12, 0);
pub const VIA: LayerSpec = LayerSpec::new(13, 0);
pub const PAD: LayerSpec = LayerSpec::new(14, 0);
pub const LABEL: LayerSpec = LayerSpec::new(100, 0);

/// # Technology
///
/// All lengths in micrometers.
///
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tech {
    /// Mask write-grid. Exported vertices are integer multiples of it.
    pub grid_size: f64,
    /// Target spacing between consecutive bend points
    pub bend_points_distance: f64,
    /// Named layer table
    pub layers: Layers,
}
impl Default for Tech {
    fn default() -> Self {
        let mut layers = Layers::default();
        for (name, spec) in [
            ("WG", WG),
            ("SLAB", SLAB),
            ("HEATER", HEATER),
            ("ROUTE", ROUTE),
            ("VIA", VIA),
            ("PAD", PAD),
            ("LABEL", LABEL),
        ] {
            // Names and specs above are distinct, so adding cannot fail
            let _ = layers.add(Layer::new(name, spec));
        }
        Self {
            grid_size: 0.001,
            bend_points_distance: 0.5,
            layers,
        }
    }
}
impl Tech {
    /// Get the [LayerSpec] of layer-name `name`, or fail
    pub fn layer(&self, name: &str) -> LayoutResult<LayerSpec> {
        self.layers.spec(name)
    }
}
impl SerdeFile for Tech {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::SerializationFormat;

    #[test]
    fn default_layers() -> LayoutResult<()> {
        let tech = Tech::default();
        assert_eq!(tech.layers.len(), 7);
        assert_eq!(tech.layer("HEATER")?, HEATER);
        assert_eq!(tech.layer("VIA")?, VIA);
        assert!(tech.layer("M7").is_err());
        Ok(())
    }
    #[test]
    fn tech_serde() -> LayoutResult<()> {
        let tech = Tech::default();
        let yaml = SerializationFormat::Yaml.to_string(&tech)?;
        let back: Tech = SerializationFormat::Yaml.from_str(&yaml)?;
        assert_eq!(back.grid_size, 0.001);
        assert_eq!(back.layer("PAD")?, PAD);

        let json = r#"{
            "grid_size": 0.005,
            "bend_points_distance": 1.0,
            "layers": [{"name": "CORE", "spec": [3, 1]}]
        }"#;
        let custom: Tech = SerializationFormat::Json.from_str(json)?;
        assert_eq!(custom.grid_size, 0.005);
        assert_eq!(custom.layer("CORE")?, LayerSpec::new(3, 1));
        Ok(())
    }
}
