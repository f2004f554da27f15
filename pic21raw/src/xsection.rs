//!
//! # Cross-Sections
//!
//! Sets of offset, layered ribbons swept along a [Path] to produce waveguides and wires.
//!

// Crates.io
use serde::{Deserialize, Serialize};

// Local imports
use crate::{
    data::{Component, LayerSpec},
    error::{LayoutError, LayoutResult},
    path::Path,
    port::Port,
};

/// # Cross-Section Section
///
/// A single ribbon of `width`, centered `offset` to the left of the path centerline.
/// Sections carrying `ports` add an (input, output) port pair at the path ends.
///
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Section {
    pub width: f64,
    #[serde(default)]
    pub offset: f64,
    pub layer: LayerSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ports: Option<(String, String)>,
}
impl Section {
    /// Create a port-less [Section]
    pub fn new(width: f64, offset: f64, layer: LayerSpec) -> Self {
        Self {
            width,
            offset,
            layer,
            ports: None,
        }
    }
    /// Add an (input, output) port-name pair. Consumes and returns `self` for chainability.
    pub fn with_ports(mut self, input: impl Into<String>, output: impl Into<String>) -> Self {
        self.ports = Some((input.into(), output.into()));
        self
    }
}

/// # Cross-Section
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CrossSection {
    pub sections: Vec<Section>,
}
impl CrossSection {
    /// Single-section waveguide of `width` on `layer`, with ports `o1` and `o2`
    pub fn strip(width: f64, layer: LayerSpec) -> Self {
        Self {
            sections: vec![Section::new(width, 0., layer).with_ports("o1", "o2")],
        }
    }
    /// Add a [Section]. Consumes and returns `self` for chainability.
    pub fn add(mut self, section: Section) -> Self {
        self.sections.push(section);
        self
    }
    /// Width of the first (primary) section
    pub fn width(&self) -> Option<f64> {
        self.sections.first().map(|s| s.width)
    }
    /// Extrude `path` into a new [Component] named `name`:
    /// one polygon per section, plus the ports of every port-carrying section.
    pub fn extrude(&self, path: &Path, name: impl Into<String>) -> LayoutResult<Component> {
        let mut comp = Component::new(name);
        self.extrude_into(path, &mut comp)?;
        comp.info = path.info.clone();
        Ok(comp)
    }
    /// Extrude `path` onto existing [Component] `comp`
    pub fn extrude_into(&self, path: &Path, comp: &mut Component) -> LayoutResult<()> {
        if self.sections.is_empty() {
            return Err(LayoutError::param(
                "cross_section",
                "Cross-section has no sections",
            ));
        }
        for section in self.sections.iter() {
            comp.add_polygon(section.layer, path.extrude(section.width, section.offset)?);
            if let Some((input, output)) = &section.ports {
                comp.add_port(Port::new(
                    input.clone(),
                    path.start_offset(section.offset),
                    path.start_angle + 180.,
                    section.width,
                    section.layer,
                )?)?;
                comp.add_port(Port::new(
                    output.clone(),
                    path.end_offset(section.offset),
                    path.end_angle,
                    section.width,
                    section.layer,
                )?)?;
            }
        }
        Ok(())
    }
}
