//!
//! # GDSII Export Module
//!

// Std-Lib
use std::collections::{HashMap, HashSet};

// Local imports
use crate::{
    data::{Component, Instance, Label, LayerSpec},
    error::{LayoutError, LayoutResult},
    geom::{Point, Polygon},
    library::Library,
    port::Port,
    utils::{DepOrder, DepOrderer, ErrorContext, ErrorHelper, Ptr, Unwrapper},
};

/// Database units per micrometer. The database unit is one nanometer.
pub const DB_PER_UM: f64 = 1000.0;

/// # Export Options
#[derive(Debug, Clone, Default)]
pub struct GdsExportOptions {
    /// Write a text element for each port, on the port's layer
    pub port_labels: bool,
}

/// Dependency-orders [Component]s, children before parents
struct CellOrder;
impl DepOrder for CellOrder {
    type Item = Ptr<Component>;
    type Error = LayoutError;

    fn process(item: &Ptr<Component>, orderer: &mut DepOrderer<Self>) -> LayoutResult<()> {
        // Collect the children first, releasing the lock before recursing
        let children: Vec<Ptr<Component>> = {
            let cell = item.read()?;
            cell.insts.iter().map(|i| i.cell.clone()).collect()
        };
        for child in children.iter() {
            orderer.push(child)?;
        }
        Ok(())
    }
    fn fail() -> LayoutResult<()> {
        Err(LayoutError::framework("Component hierarchy cycle"))
    }
}

/// # GDSII Exporter
///
/// Converts a [Library], and every [Component] reachable from it, to a [gds21::GdsLibrary].
/// Structs are written in dependency order, children first.
/// Cell names are made unique across the whole exported hierarchy.
///
#[derive(Debug)]
pub struct GdsExporter<'lib> {
    lib: &'lib Library,
    opts: GdsExportOptions,
    names: HashMap<Ptr<Component>, String>,
    used: HashSet<String>,
    stack: Vec<ErrorContext>,
}
impl<'lib> GdsExporter<'lib> {
    /// Export with default [GdsExportOptions]
    pub fn export(lib: &'lib Library) -> LayoutResult<gds21::GdsLibrary> {
        Self::export_with_options(lib, GdsExportOptions::default())
    }
    /// Export with options `opts`
    pub fn export_with_options(
        lib: &'lib Library,
        opts: GdsExportOptions,
    ) -> LayoutResult<gds21::GdsLibrary> {
        Self {
            lib,
            opts,
            names: HashMap::new(),
            used: HashSet::new(),
            stack: Vec::new(),
        }
        .export_lib()
    }
    fn export_lib(&mut self) -> LayoutResult<gds21::GdsLibrary> {
        self.stack.push(ErrorContext::Library(self.lib.name.clone()));
        let mut gdslib = gds21::GdsLibrary::new(&self.lib.name);
        // Database unit 1nm, user unit 1um
        gdslib.units = gds21::GdsUnits::new(1e-3, 1e-9);

        let tops: Vec<Ptr<Component>> = self.lib.cells().iter().cloned().collect();
        let ordered = CellOrder::order(&tops)?;
        // Assign unique names before converting, so parents can reference their children
        for cell in ordered.iter() {
            let base = cell.read()?.name.clone();
            let name = self.unique_name(&base);
            self.names.insert(cell.clone(), name);
        }
        for cell in ordered.iter() {
            let strukt = self.export_cell(cell)?;
            gdslib.structs.push(strukt);
        }
        self.stack.pop();
        tracing::debug!(
            "exported {} structs to GDS library `{}`",
            gdslib.structs.len(),
            gdslib.name
        );
        Ok(gdslib)
    }
    fn unique_name(&mut self, base: &str) -> String {
        let mut name = base.to_string();
        let mut i = 1;
        while self.used.contains(&name) {
            name = format!("{}_{}", base, i);
            i += 1;
        }
        self.used.insert(name.clone());
        name
    }
    /// Convert a [Component] to a [gds21::GdsStruct] cell-definition
    fn export_cell(&mut self, ptr: &Ptr<Component>) -> LayoutResult<gds21::GdsStruct> {
        let cell = ptr.read()?;
        self.stack.push(ErrorContext::Component(cell.name.clone()));
        let name = self.names.get(ptr).cloned().unwrapper(self, "Unnamed component")?;
        let mut elems = Vec::new();

        for inst in cell.insts.iter() {
            elems.push(gds21::GdsElement::GdsStructRef(self.export_instance(inst)?));
        }
        for (layer, polys) in cell.elems.iter() {
            self.stack.push(ErrorContext::Layer(layer.to_string()));
            for poly in polys.iter() {
                elems.push(gds21::GdsElement::GdsBoundary(
                    self.export_polygon(poly, layer)?,
                ));
            }
            self.stack.pop();
        }
        for label in cell.labels.iter() {
            elems.push(gds21::GdsElement::GdsTextElem(self.export_label(label)?));
        }
        if self.opts.port_labels {
            for port in cell.ports.values() {
                elems.push(gds21::GdsElement::GdsTextElem(self.export_port(port)?));
            }
        }
        let mut strukt = gds21::GdsStruct::new(name);
        strukt.elems = elems;
        self.stack.pop();
        Ok(strukt)
    }
    /// Convert an [Instance] to a GDS instance, AKA [gds21::GdsStructRef]
    fn export_instance(&mut self, inst: &Instance) -> LayoutResult<gds21::GdsStructRef> {
        self.stack
            .push(ErrorContext::Instance(inst.inst_name.clone()));
        let name = self
            .names
            .get(&inst.cell)
            .cloned()
            .unwrapper(self, "Instance of unknown component")?;
        let strans = if inst.reflect_vert || inst.angle != 0.0 {
            Some(gds21::GdsStrans {
                reflected: inst.reflect_vert,
                angle: if inst.angle != 0.0 {
                    Some(inst.angle)
                } else {
                    None
                },
                ..Default::default()
            })
        } else {
            None
        };
        let sref = gds21::GdsStructRef {
            name,
            xy: self.export_point(&inst.loc)?,
            strans,
            ..Default::default()
        };
        self.stack.pop();
        Ok(sref)
    }
    /// Convert a [Polygon] to a [gds21::GdsBoundary].
    /// Holes are fractured into the exterior, and the first point repeated for closure.
    fn export_polygon(
        &mut self,
        poly: &Polygon,
        layer: &LayerSpec,
    ) -> LayoutResult<gds21::GdsBoundary> {
        let ring = poly.keyholed().points;
        self.assert(ring.len() >= 3, "Polygon with fewer than three points")?;
        let mut xy = ring
            .iter()
            .map(|p| self.export_point(p))
            .collect::<LayoutResult<Vec<_>>>()?;
        xy.push(xy[0].clone());
        Ok(gds21::GdsBoundary {
            layer: layer.layer(),
            datatype: layer.datatype(),
            xy,
            ..Default::default()
        })
    }
    fn export_label(&mut self, label: &Label) -> LayoutResult<gds21::GdsTextElem> {
        Ok(gds21::GdsTextElem {
            string: label.text.clone(),
            layer: label.layer.layer(),
            texttype: label.layer.datatype(),
            xy: self.export_point(&label.loc)?,
            ..Default::default()
        })
    }
    fn export_port(&mut self, port: &Port) -> LayoutResult<gds21::GdsTextElem> {
        self.stack.push(ErrorContext::Port(port.name.clone()));
        let text = gds21::GdsTextElem {
            string: port.name.clone(),
            layer: port.layer.layer(),
            texttype: port.layer.datatype(),
            xy: self.export_point(&port.center)?,
            ..Default::default()
        };
        self.stack.pop();
        Ok(text)
    }
    /// Convert a micrometer-valued [Point] to integer database units
    fn export_point(&self, pt: &Point) -> LayoutResult<gds21::GdsPoint> {
        let x = self.export_coord(pt.x)?;
        let y = self.export_coord(pt.y)?;
        Ok(gds21::GdsPoint::new(x, y))
    }
    fn export_coord(&self, val: f64) -> LayoutResult<i32> {
        let db = (val * DB_PER_UM).round();
        if !db.is_finite() || db > i32::MAX as f64 || db < i32::MIN as f64 {
            return self.fail(format!("Coordinate {} out of GDSII range", val));
        }
        Ok(db as i32)
    }
}
impl ErrorHelper for GdsExporter<'_> {
    type Error = LayoutError;
    fn err(&self, msg: impl Into<String>) -> LayoutError {
        LayoutError::Export {
            message: msg.into(),
            stack: self.stack.clone(),
        }
    }
}
