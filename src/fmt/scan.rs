//! Module-wide affine-map reference collection: the first pass.

use std::collections::BTreeMap;
use std::sync::Arc;

use log::debug;

use crate::affine::MapRef;
use crate::attr::Attribute;
use crate::ir::{Function, Module};
use crate::types::{FunctionType, Type};

/// Identity-keyed table of the affine maps a module references.
///
/// Maps are discovered by one depth-first scan over the functions in
/// module order, signature before body; the first encounter assigns
/// the id. Keying is on node identity: two structurally identical maps
/// built separately are two entries. Structured function bodies are
/// not scanned, so maps that only appear there print inline at each
/// use site.
#[derive(Default)]
pub(crate) struct MapTable {
    ids: BTreeMap<usize, u32>,
    hoisted: Vec<MapRef>,
}

impl MapTable {
    pub(crate) fn scan(module: &Module) -> Self {
        let mut table = MapTable::default();
        for function in &module.functions {
            table.visit_function(function);
        }
        table
    }

    /// Id assigned to `map`, if the scan discovered it.
    pub(crate) fn lookup(&self, map: &MapRef) -> Option<u32> {
        self.ids.get(&Self::key(map)).copied()
    }

    /// Discovered maps, in assigned-id order.
    pub(crate) fn hoisted(&self) -> &[MapRef] {
        &self.hoisted
    }

    fn key(map: &MapRef) -> usize {
        Arc::as_ptr(map) as usize
    }

    fn record(&mut self, map: &MapRef) {
        let key = Self::key(map);
        if self.ids.contains_key(&key) {
            return;
        }
        let id = self.hoisted.len() as u32;
        debug!("hoisting affine map as #map{id}: {map}");
        self.ids.insert(key, id);
        self.hoisted.push(Arc::clone(map));
    }

    fn visit_function(&mut self, function: &Function) {
        self.visit_function_type(function.ty());
        match function {
            Function::Ext(_) | Function::Ml(_) => {}
            Function::Cfg(function) => {
                for block in &function.blocks {
                    for operation in &block.operations {
                        for attribute in &operation.attributes {
                            self.visit_attribute(&attribute.value);
                        }
                    }
                }
            }
        }
    }

    fn visit_function_type(&mut self, ty: &FunctionType) {
        for input in &ty.inputs {
            self.visit_type(input);
        }
        for result in &ty.results {
            self.visit_type(result);
        }
    }

    fn visit_type(&mut self, ty: &Type) {
        match ty {
            Type::AffineInt
            | Type::BF16
            | Type::F16
            | Type::F32
            | Type::F64
            | Type::Integer(_) => {}
            Type::Function(ty) => self.visit_function_type(ty),
            Type::Vector(ty) => self.visit_type(&ty.element),
            Type::Tensor(ty) => self.visit_type(&ty.element),
            Type::UnrankedTensor(element) => self.visit_type(element),
            Type::MemRef(ty) => {
                self.visit_type(&ty.element);
                for map in &ty.layout {
                    self.record(map);
                }
            }
        }
    }

    fn visit_attribute(&mut self, attribute: &Attribute) {
        match attribute {
            Attribute::Bool(_)
            | Attribute::Integer(_)
            | Attribute::Float(_)
            | Attribute::String(_) => {}
            Attribute::Array(elements) => {
                for element in elements {
                    self.visit_attribute(element);
                }
            }
            Attribute::AffineMap(map) => self.record(map),
        }
    }
}
