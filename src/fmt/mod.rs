//! Textual rendering of modules, functions, types, attributes, affine
//! expressions and maps.
//!
//! Printing a module is a two-pass process. A read-only scan
//! ([`scan::MapTable`]) first discovers every affine map referenced
//! through memref types or map-valued attributes and assigns each one a
//! module-scoped id in first-encounter order. Emission then hoists one
//! `#map<id> = …` definition per discovered map — strictly in id
//! order — and renders every use site as `#map<id>`. Maps the table
//! does not know print inline, so detached entities still produce
//! valid standalone text.
//!
//! Within a function, values and blocks are numbered by a separate
//! pass before any text is emitted, so forward references (a branch to
//! a later block) resolve. Printing never fails on malformed IR: a
//! reference to a value the numberer has not seen renders as
//! [`INVALID_VALUE_TOKEN`] and the walk continues.

mod function;
mod scan;

use std::fmt::{self, Display, Formatter, Write};

use crate::affine::{AffineBinaryExpr, AffineExpr, AffineMap, AffineOp, ExprRef, MapRef};
use crate::attr::Attribute;
use crate::ir::operation::OperationRegistry;
use crate::ir::{Function, Module};
use crate::types::{DimSize, FunctionType, Type};

use self::function::{CfgFunctionPrinter, MlFunctionPrinter};
use self::scan::MapTable;

pub use self::function::{INVALID_BLOCK_TOKEN, INVALID_VALUE_TOKEN};

/// Shared emission state: the output sink, the module-scoped affine
/// map table and the optional custom operation printers.
pub(crate) struct Printer<'a> {
    pub(crate) out: &'a mut dyn Write,
    pub(crate) maps: &'a MapTable,
    pub(crate) registry: Option<&'a OperationRegistry>,
}

impl<'a> Printer<'a> {
    pub(crate) fn new(
        out: &'a mut dyn Write,
        maps: &'a MapTable,
        registry: Option<&'a OperationRegistry>,
    ) -> Self {
        Printer {
            out,
            maps,
            registry,
        }
    }

    pub(crate) fn module(&mut self, module: &Module) -> fmt::Result {
        let maps = self.maps;
        for (id, map) in maps.hoisted().iter().enumerate() {
            write!(self.out, "#map{id} = ")?;
            self.affine_map(map)?;
            writeln!(self.out)?;
        }
        for function in &module.functions {
            self.function(function)?;
        }
        Ok(())
    }

    pub(crate) fn function(&mut self, function: &Function) -> fmt::Result {
        match function {
            Function::Ext(function) => {
                write!(self.out, "extfunc ")?;
                self.signature(&function.name, &function.ty)?;
                writeln!(self.out)
            }
            Function::Cfg(function) => CfgFunctionPrinter::new(self, function).print(),
            Function::Ml(function) => MlFunctionPrinter::new(self, function).print(),
        }
    }

    pub(crate) fn signature(&mut self, name: &str, ty: &FunctionType) -> fmt::Result {
        write!(self.out, "@{name}(")?;
        self.type_list(&ty.inputs)?;
        write!(self.out, ")")?;
        match ty.results.as_slice() {
            [] => Ok(()),
            [single] => {
                write!(self.out, " -> ")?;
                self.ty(single)
            }
            results => {
                write!(self.out, " -> (")?;
                self.type_list(results)?;
                write!(self.out, ")")
            }
        }
    }

    pub(crate) fn type_list(&mut self, types: &[Type]) -> fmt::Result {
        let mut first = true;
        for ty in types {
            if !first {
                write!(self.out, ", ")?;
            }
            first = false;
            self.ty(ty)?;
        }
        Ok(())
    }

    pub(crate) fn ty(&mut self, ty: &Type) -> fmt::Result {
        match ty {
            Type::AffineInt => write!(self.out, "affineint"),
            Type::BF16 => write!(self.out, "bf16"),
            Type::F16 => write!(self.out, "f16"),
            Type::F32 => write!(self.out, "f32"),
            Type::F64 => write!(self.out, "f64"),
            Type::Integer(width) => write!(self.out, "i{width}"),
            Type::Function(ty) => {
                write!(self.out, "(")?;
                self.type_list(&ty.inputs)?;
                write!(self.out, ") -> ")?;
                if let [single] = ty.results.as_slice() {
                    self.ty(single)
                } else {
                    write!(self.out, "(")?;
                    self.type_list(&ty.results)?;
                    write!(self.out, ")")
                }
            }
            Type::Vector(ty) => {
                write!(self.out, "vector<")?;
                for dim in &ty.shape {
                    write!(self.out, "{dim}x")?;
                }
                self.ty(&ty.element)?;
                write!(self.out, ">")
            }
            Type::Tensor(ty) => {
                write!(self.out, "tensor<")?;
                for dim in &ty.shape {
                    write!(self.out, "{dim}x")?;
                }
                self.ty(&ty.element)?;
                write!(self.out, ">")
            }
            Type::UnrankedTensor(element) => {
                write!(self.out, "tensor<??")?;
                self.ty(element)?;
                write!(self.out, ">")
            }
            Type::MemRef(ty) => {
                write!(self.out, "memref<")?;
                for dim in &ty.shape {
                    write!(self.out, "{dim}x")?;
                }
                self.ty(&ty.element)?;
                for map in &ty.layout {
                    write!(self.out, ", ")?;
                    self.map_reference(map)?;
                }
                write!(self.out, ", {}>", ty.memory_space)
            }
        }
    }

    pub(crate) fn attribute(&mut self, attribute: &Attribute) -> fmt::Result {
        match attribute {
            Attribute::Bool(value) => {
                write!(self.out, "{}", if *value { "true" } else { "false" })
            }
            Attribute::Integer(value) => write!(self.out, "{value}"),
            Attribute::Float(value) => write!(self.out, "{value}"),
            Attribute::String(value) => write!(self.out, "\"{value}\""),
            Attribute::Array(elements) => {
                write!(self.out, "[")?;
                let mut first = true;
                for element in elements {
                    if !first {
                        write!(self.out, ", ")?;
                    }
                    first = false;
                    self.attribute(element)?;
                }
                write!(self.out, "]")
            }
            Attribute::AffineMap(map) => self.map_reference(map),
        }
    }

    /// Reference form when the map was hoisted, inline otherwise.
    pub(crate) fn map_reference(&mut self, map: &MapRef) -> fmt::Result {
        match self.maps.lookup(map) {
            Some(id) => write!(self.out, "#map{id}"),
            None => self.affine_map(map),
        }
    }

    pub(crate) fn affine_map(&mut self, map: &AffineMap) -> fmt::Result {
        write!(self.out, "(")?;
        for position in 0..map.num_dims() {
            if position != 0 {
                write!(self.out, ", ")?;
            }
            write!(self.out, "d{position}")?;
        }
        write!(self.out, ")")?;

        if map.num_symbols() >= 1 {
            write!(self.out, " [")?;
            for position in 0..map.num_symbols() {
                if position != 0 {
                    write!(self.out, ", ")?;
                }
                write!(self.out, "s{position}")?;
            }
            write!(self.out, "]")?;
        }

        // A well-formed map always has at least one result.
        debug_assert!(!map.results().is_empty());
        write!(self.out, " -> (")?;
        self.expr_list(map.results())?;
        write!(self.out, ")")?;

        if let Some(sizes) = map.range_sizes() {
            write!(self.out, " size (")?;
            self.expr_list(sizes)?;
            write!(self.out, ")")?;
        }
        Ok(())
    }

    fn expr_list(&mut self, exprs: &[ExprRef]) -> fmt::Result {
        let mut first = true;
        for expr in exprs {
            if !first {
                write!(self.out, ", ")?;
            }
            first = false;
            self.affine_expr(expr)?;
        }
        Ok(())
    }

    pub(crate) fn affine_expr(&mut self, expr: &AffineExpr) -> fmt::Result {
        match expr {
            AffineExpr::Dim(position) => write!(self.out, "d{position}"),
            AffineExpr::Symbol(position) => write!(self.out, "s{position}"),
            AffineExpr::Constant(value) => write!(self.out, "{value}"),
            AffineExpr::Binary(binary) => self.affine_binary(binary),
        }
    }

    fn affine_binary(&mut self, expr: &AffineBinaryExpr) -> fmt::Result {
        if expr.op != AffineOp::Add {
            let operator = match expr.op {
                AffineOp::Mul => " * ",
                AffineOp::FloorDiv => " floordiv ",
                AffineOp::CeilDiv => " ceildiv ",
                AffineOp::Mod => " mod ",
                AffineOp::Add => unreachable!(),
            };
            write!(self.out, "(")?;
            self.affine_expr(&expr.lhs)?;
            write!(self.out, "{operator}")?;
            self.affine_expr(&expr.rhs)?;
            return write!(self.out, ")");
        }

        write!(self.out, "(")?;
        self.affine_expr(&expr.lhs)?;

        // Addition of a product with a negative constant factor prints
        // as a subtraction. Only the outermost level of the right-hand
        // side is considered.
        if let AffineExpr::Binary(rhs) = &*expr.rhs {
            if rhs.op == AffineOp::Mul {
                if let AffineExpr::Constant(factor) = &*rhs.rhs {
                    if *factor < 0 {
                        write!(self.out, " - (")?;
                        self.affine_expr(&rhs.lhs)?;
                        return write!(self.out, " * {}))", factor.unsigned_abs());
                    }
                }
            }
        }

        // Addition of a negative constant prints as a subtraction.
        if let AffineExpr::Constant(value) = &*expr.rhs {
            if *value < 0 {
                return write!(self.out, " - {})", value.unsigned_abs());
            }
        }

        write!(self.out, " + ")?;
        self.affine_expr(&expr.rhs)?;
        write!(self.out, ")")
    }
}

impl Display for DimSize {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            DimSize::Fixed(extent) => write!(f, "{extent}"),
            DimSize::Dynamic => write!(f, "?"),
        }
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let maps = MapTable::default();
        Printer::new(f, &maps, None).ty(self)
    }
}

impl Display for Attribute {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let maps = MapTable::default();
        Printer::new(f, &maps, None).attribute(self)
    }
}

impl Display for AffineExpr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let maps = MapTable::default();
        Printer::new(f, &maps, None).affine_expr(self)
    }
}

impl Display for AffineMap {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let maps = MapTable::default();
        Printer::new(f, &maps, None).affine_map(self)
    }
}

impl Module {
    /// Build a formatting helper rendering the whole module: hoisted
    /// affine-map definitions first, then every function. Each render
    /// runs the scan afresh, so repeated prints are byte-identical.
    ///
    /// ```
    /// use polyir::ir::{ExtFunction, Function, Module};
    /// use polyir::types::{FunctionType, Type};
    /// use std::sync::Arc;
    ///
    /// let ty = Arc::new(FunctionType { inputs: vec![Type::F32], results: vec![] });
    /// let module = Module {
    ///     functions: vec![Function::Ext(ExtFunction { name: "sink".into(), ty })],
    /// };
    /// assert_eq!(module.fmt(None).to_string(), "extfunc @sink(f32)\n");
    /// ```
    pub fn fmt<'a>(&'a self, registry: Option<&'a OperationRegistry>) -> impl Display + 'a {
        struct Fmt<'a> {
            module: &'a Module,
            registry: Option<&'a OperationRegistry>,
        }

        impl Display for Fmt<'_> {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                let maps = MapTable::scan(self.module);
                Printer::new(f, &maps, self.registry).module(self.module)
            }
        }

        Fmt {
            module: self,
            registry,
        }
    }
}

impl Function {
    /// Build a formatting helper rendering this function on its own.
    /// Without a surrounding module there is no hoisted-map table, so
    /// affine maps print inline.
    pub fn fmt<'a>(&'a self, registry: Option<&'a OperationRegistry>) -> impl Display + 'a {
        struct Fmt<'a> {
            function: &'a Function,
            registry: Option<&'a OperationRegistry>,
        }

        impl Display for Fmt<'_> {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                let maps = MapTable::default();
                Printer::new(f, &maps, self.registry).function(self.function)
            }
        }

        Fmt {
            function: self,
            registry,
        }
    }
}
