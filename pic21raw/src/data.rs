//!
//! # Raw Photonic Layout Data Model
//!
//! Defines the primary structures for representation of polygon-and-port layout,
//! including [Component], [Instance], [Layers], and related types.
//!

// Std-Lib
use std::collections::{BTreeMap, HashMap};

// Crates.io
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};

// Local Imports
use crate::{
    bbox::{BoundBox, BoundBoxTrait},
    error::{LayoutError, LayoutResult},
    geom::{Point, Polygon, Transform, TransformTrait},
    port::Port,
    utils::{ErrorContext, ErrorHelper, Ptr},
};

// Create key-types for each internal type stored in [SlotMap]s
new_key_type! {
    /// Keys for [Layer] entries
    pub struct LayerKey;
}

/// # Layer Specification
/// As in seemingly every layout system, this uses two numbers to identify each layer:
/// a major layer-number and a minor datatype-number.
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayerSpec(pub i16, pub i16);
impl LayerSpec {
    pub const fn new(n1: i16, n2: i16) -> Self {
        Self(n1, n2)
    }
    /// Major layer-number
    pub fn layer(&self) -> i16 {
        self.0
    }
    /// Minor datatype-number
    pub fn datatype(&self) -> i16 {
        self.1
    }
}
impl std::fmt::Display for LayerSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "({}, {})", self.0, self.1)
    }
}

/// # Named Layer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Layer {
    /// Layer Name
    pub name: String,
    /// Layer Specification
    pub spec: LayerSpec,
}
impl Layer {
    /// Create a new [Layer] with the given `name` and `spec`
    pub fn new(name: impl Into<String>, spec: LayerSpec) -> Self {
        Self {
            name: name.into(),
            spec,
        }
    }
}

/// # Layer Set & Manager
///
/// Keep track of active layers, and index them by name and spec.
/// Serialized as a plain list of [Layer]s.
///
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<Layer>", into = "Vec<Layer>")]
pub struct Layers {
    slots: SlotMap<LayerKey, Layer>,
    specs: HashMap<LayerSpec, LayerKey>,
    names: HashMap<String, LayerKey>,
    /// Insertion order, for stable iteration and serialization
    order: Vec<LayerKey>,
}
impl Layers {
    /// Add a [Layer] to our slot-map, spec-map, and name-map.
    /// Fails if either its name or its spec is already taken.
    pub fn add(&mut self, layer: Layer) -> LayoutResult<LayerKey> {
        if self.names.contains_key(&layer.name) {
            return Err(LayoutError::param(
                "layers",
                format!("Duplicate layer name `{}`", layer.name),
            ));
        }
        if self.specs.contains_key(&layer.spec) {
            return Err(LayoutError::param(
                "layers",
                format!("Duplicate layer spec {} for `{}`", layer.spec, layer.name),
            ));
        }
        let (name, spec) = (layer.name.clone(), layer.spec);
        let key = self.slots.insert(layer);
        self.specs.insert(spec, key);
        self.names.insert(name, key);
        self.order.push(key);
        Ok(key)
    }
    /// Get the [LayerKey] for `name`
    pub fn keyname(&self, name: &str) -> Option<LayerKey> {
        self.names.get(name).copied()
    }
    /// Get the [LayerKey] for `spec`
    pub fn keyspec(&self, spec: &LayerSpec) -> Option<LayerKey> {
        self.specs.get(spec).copied()
    }
    /// Get a reference to [Layer] from [LayerKey] `key`
    pub fn get(&self, key: LayerKey) -> Option<&Layer> {
        self.slots.get(key)
    }
    /// Get a reference to [Layer] name `name`
    pub fn name(&self, name: &str) -> Option<&Layer> {
        self.slots.get(self.keyname(name)?)
    }
    /// Get the [LayerSpec] for layer-name `name`, or fail
    pub fn spec(&self, name: &str) -> LayoutResult<LayerSpec> {
        self.name(name).map(|l| l.spec).ok_or_else(|| {
            LayoutError::param("layer", format!("Layer `{}` not defined", name))
        })
    }
    /// Get the name of the layer with spec `spec`
    pub fn spec_name(&self, spec: &LayerSpec) -> Option<&str> {
        let key = self.keyspec(spec)?;
        self.slots.get(key).map(|l| l.name.as_str())
    }
    /// Iterate over all [Layer]s, in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Layer> {
        self.order.iter().filter_map(|k| self.slots.get(*k))
    }
    /// Number of layers
    pub fn len(&self) -> usize {
        self.order.len()
    }
    /// Boolean indication of whether we are empty
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
impl TryFrom<Vec<Layer>> for Layers {
    type Error = LayoutError;
    fn try_from(layers: Vec<Layer>) -> LayoutResult<Self> {
        let mut rv = Self::default();
        for layer in layers.into_iter() {
            rv.add(layer)?;
        }
        Ok(rv)
    }
}
impl From<Layers> for Vec<Layer> {
    fn from(layers: Layers) -> Self {
        layers.iter().cloned().collect()
    }
}

/// # Text Label
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Label {
    /// String Value
    pub text: String,
    /// Location
    pub loc: Point,
    /// Layer
    pub layer: LayerSpec,
}
impl Label {
    pub fn new(text: impl Into<String>, loc: Point, layer: LayerSpec) -> Self {
        Self {
            text: text.into(),
            loc,
            layer,
        }
    }
}

/// # Component
///
/// A named layout cell: polygons keyed by layer, child [Instance]s, named [Port]s,
/// [Label]s, and numeric metadata.
///
/// Children are shared by identity, via [Ptr]. Ports are owned values.
///
#[derive(Debug, Clone, Default)]
pub struct Component {
    /// Component Name
    pub name: String,
    /// Polygons, keyed by layer
    pub elems: BTreeMap<LayerSpec, Vec<Polygon>>,
    /// Child Instances
    pub insts: Vec<Instance>,
    /// Ports, keyed by name, in insertion order
    pub ports: IndexMap<String, Port>,
    /// Text Labels
    pub labels: Vec<Label>,
    /// Numeric metadata
    pub info: IndexMap<String, f64>,
}
impl Component {
    /// Create a new and empty [Component]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
    /// Add a [Polygon] on `layer`
    pub fn add_polygon(&mut self, layer: LayerSpec, poly: Polygon) {
        self.elems.entry(layer).or_default().push(poly);
    }
    /// Add several [Polygon]s on `layer`
    pub fn add_polygons(&mut self, layer: LayerSpec, polys: impl IntoIterator<Item = Polygon>) {
        self.elems.entry(layer).or_default().extend(polys);
    }
    /// Get the polygons on `layer`, if any
    pub fn polygons(&self, layer: &LayerSpec) -> &[Polygon] {
        self.elems.get(layer).map(|v| v.as_slice()).unwrap_or(&[])
    }
    /// Layers with at least one polygon, in ascending order
    pub fn layers(&self) -> Vec<LayerSpec> {
        self.elems
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, _)| *k)
            .collect()
    }
    /// Total number of polygons, across all layers
    pub fn num_polygons(&self) -> usize {
        self.elems.values().map(|v| v.len()).sum()
    }
    /// Add a [Port]. Fails if a port of the same name already exists.
    pub fn add_port(&mut self, port: Port) -> LayoutResult<()> {
        if self.ports.contains_key(&port.name) {
            return Err(LayoutError::param(
                "ports",
                format!("Duplicate port `{}` in `{}`", port.name, self.name),
            ));
        }
        self.ports.insert(port.name.clone(), port);
        Ok(())
    }
    /// Get port `name`, or fail
    pub fn port(&self, name: &str) -> LayoutResult<&Port> {
        self.ports.get(name).ok_or_else(|| {
            LayoutError::param(
                "port",
                format!("Port `{}` not found in `{}`", name, self.name),
            )
        })
    }
    /// Add a [Label]
    pub fn add_label(&mut self, label: Label) {
        self.labels.push(label);
    }
    /// Add an [Instance] of `cell`, returning a mutable reference to it for placement
    pub fn add_ref(&mut self, inst_name: impl Into<String>, cell: &Ptr<Component>) -> &mut Instance {
        self.insts.push(Instance::new(inst_name, cell.clone()));
        let idx = self.insts.len() - 1;
        &mut self.insts[idx]
    }
    /// Get instance `name`, or fail
    pub fn inst(&self, name: &str) -> LayoutResult<&Instance> {
        self.insts
            .iter()
            .find(|i| i.inst_name == name)
            .ok_or_else(|| {
                LayoutError::framework(format!("Instance `{}` not found in `{}`", name, self.name))
            })
    }
    /// Copy each of `inst`'s (transformed) ports onto ourselves, with names prefixed by `prefix`
    pub fn add_ports_from(&mut self, inst: &Instance, prefix: &str) -> LayoutResult<()> {
        for port in inst.ports()?.into_iter() {
            let name = format!("{}{}", prefix, port.name);
            self.add_port(port.renamed(name))?;
        }
        Ok(())
    }
    /// Copy all of `other`'s polygons, transformed by `trans`, onto ourselves.
    /// Instances, ports, and labels of `other` are not copied.
    pub fn absorb_polygons(&mut self, other: &Component, trans: &Transform) {
        for (layer, polys) in other.elems.iter() {
            self.add_polygons(*layer, polys.iter().map(|p| p.transform(trans)));
        }
    }
    /// Bounding box of all polygons, including those of child instances
    pub fn bbox(&self) -> LayoutResult<BoundBox> {
        let mut bbox = BoundBox::empty();
        for polys in self.elems.values() {
            bbox = polys.as_slice().union(&bbox);
        }
        for inst in self.insts.iter() {
            let cell = inst.cell.read()?;
            let child = cell.bbox()?;
            if child.is_empty() {
                continue;
            }
            let trans = inst.transform();
            let corners = [
                child.p0,
                Point::new(child.p1.x, child.p0.y),
                child.p1,
                Point::new(child.p0.x, child.p1.y),
            ];
            for c in corners.iter() {
                bbox = c.transform(&trans).union(&bbox);
            }
        }
        Ok(bbox)
    }
    /// Flatten in place: replace every instance by its (transformed) polygons.
    ///
    /// Ports are retained. Labels of children are *not* promoted.
    /// Fails on instance cycles and poisoned cell-pointers.
    pub fn flatten(&mut self) -> LayoutResult<()> {
        let insts = std::mem::take(&mut self.insts);
        let mut flattener = Flattener {
            stack: vec![ErrorContext::Component(self.name.clone())],
            pending: Vec::new(),
        };
        let mut elems = BTreeMap::new();
        for inst in insts.iter() {
            flattener.flatten_inst(inst, &Transform::identity(), &mut elems)?;
        }
        for (layer, polys) in elems.into_iter() {
            self.add_polygons(layer, polys);
        }
        Ok(())
    }
}

/// Internal helper and core logic for [Component::flatten]
struct Flattener {
    /// Context stack, for error reporting
    stack: Vec<ErrorContext>,
    /// Cells currently being visited, for cycle detection
    pending: Vec<Ptr<Component>>,
}
impl Flattener {
    fn flatten_inst(
        &mut self,
        inst: &Instance,
        trans: &Transform,
        elems: &mut BTreeMap<LayerSpec, Vec<Polygon>>,
    ) -> LayoutResult<()> {
        self.stack
            .push(ErrorContext::Instance(inst.inst_name.clone()));
        if self.pending.contains(&inst.cell) {
            return self.fail("Instance hierarchy cycle");
        }
        // Create a new [Transform], cascading the parent's and instance's
        let trans = Transform::cascade(trans, &inst.transform());
        self.pending.push(inst.cell.clone());
        {
            let cell = inst.cell.read()?;
            for (layer, polys) in cell.elems.iter() {
                elems
                    .entry(*layer)
                    .or_default()
                    .extend(polys.iter().map(|p| p.transform(&trans)));
            }
            for child in cell.insts.iter() {
                self.flatten_inst(child, &trans, elems)?;
            }
        }
        self.pending.pop();
        self.stack.pop();
        Ok(())
    }
}
impl ErrorHelper for Flattener {
    type Error = LayoutError;
    fn err(&self, msg: impl Into<String>) -> LayoutError {
        LayoutError::Framework {
            message: msg.into(),
            stack: self.stack.clone(),
        }
    }
}

/// # Instance
///
/// Placement of a shared [Component] within its parent.
/// Vertical reflection is applied first, then counter-clockwise rotation, then translation.
///
#[derive(Debug, Clone)]
pub struct Instance {
    /// Instance Name
    pub inst_name: String,
    /// Cell Definition Reference
    pub cell: Ptr<Component>,
    /// Location of `cell` origin
    /// regardless of rotation or reflection
    pub loc: Point,
    /// Vertical reflection,
    /// applied *before* rotation
    pub reflect_vert: bool,
    /// Angle of rotation (degrees),
    /// Counter-clockwise and applied *after* reflection
    pub angle: f64,
}
impl Instance {
    /// Create a new [Instance] of `cell`, placed at the origin
    pub fn new(inst_name: impl Into<String>, cell: Ptr<Component>) -> Self {
        Self {
            inst_name: inst_name.into(),
            cell,
            loc: Point::default(),
            reflect_vert: false,
            angle: 0.0,
        }
    }
    /// Our placement, as a [Transform]
    pub fn transform(&self) -> Transform {
        Transform::from_instance(&self.loc, self.reflect_vert, self.angle)
    }
    /// Apply `trans` after our current placement
    pub fn apply(&mut self, trans: &Transform) -> &mut Self {
        let total = Transform::cascade(trans, &self.transform());
        let (loc, reflect_vert, angle) = total.to_instance();
        self.loc = loc;
        self.reflect_vert = reflect_vert;
        self.angle = angle;
        self
    }
    /// Translate by (`dx`, `dy`)
    pub fn translate(&mut self, dx: f64, dy: f64) -> &mut Self {
        self.apply(&Transform::translate(dx, dy))
    }
    /// Rotate by `angle` degrees about `center`
    pub fn rotate(&mut self, angle: f64, center: &Point) -> &mut Self {
        self.apply(&Transform::rotate_about(angle, center))
    }
    /// Mirror across the line through `p1` and `p2`
    pub fn mirror(&mut self, p1: &Point, p2: &Point) -> &mut Self {
        self.apply(&Transform::mirror_line(p1, p2))
    }
    /// Mirror across the axis of port `name`, i.e. the line through its center along its orientation.
    /// The port itself stays in place.
    pub fn mirror_port(&mut self, name: &str) -> LayoutResult<&mut Self> {
        let port = self.port(name)?;
        let p2 = port.center + port.direction();
        Ok(self.mirror(&port.center, &p2))
    }
    /// Get our port `name`, transformed into parent coordinates
    pub fn port(&self, name: &str) -> LayoutResult<Port> {
        let cell = self.cell.read()?;
        let port = cell.port(name)?;
        Ok(port.transform(&self.transform()))
    }
    /// Get all our ports, transformed into parent coordinates
    pub fn ports(&self) -> LayoutResult<Vec<Port>> {
        let trans = self.transform();
        let cell = self.cell.read()?;
        Ok(cell.ports.values().map(|p| p.transform(&trans)).collect())
    }
    /// Move so that our port `name` connects to `target`:
    /// centers coincident, orientations opposed.
    pub fn connect(&mut self, name: &str, target: &Port) -> LayoutResult<&mut Self> {
        let port = self.port(name)?;
        let rotation = target.orientation + 180. - port.orientation;
        self.rotate(rotation, &port.center);
        let port = self.port(name)?;
        let delta = target.center - port.center;
        Ok(self.translate(delta.x, delta.y))
    }
}
